use crate::error::CliError;
use crate::util::canonicalize_cli_file;
use argh::FromArgs;
use rwtex_common::warning::{CollectingWarningSink, TextureWarning};
use rwtex_native::{palette_count, NativeCodec, NativeTexture, TextureStream};
use rwtex_pixels::{ConversionConfig, TextureContext};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(FromArgs, Debug)]
/// Print the header facts and warnings of a native texture
#[argh(subcommand, name = "inspect")]
pub struct InspectCmd {
    /// texture file to read
    #[argh(option, from_str_fn(canonicalize_cli_file))]
    pub input: PathBuf,

    /// warning level: 0 silent, 1 default, 2 includes repairs
    #[argh(option, default = "2")]
    pub warning_level: u32,
}

pub fn handle_inspect_command(cmd: InspectCmd) -> Result<(), CliError> {
    let sink = Arc::new(CollectingWarningSink::new());
    let ctx = TextureContext::new(ConversionConfig::new().with_warning_level(cmd.warning_level))
        .with_warning_sink(sink.clone());

    let mut reader = BufReader::new(File::open(&cmd.input)?);
    let texture = NativeCodec::new()
        .deserialize_any(&ctx, &mut reader)
        .map_err(|source| CliError::File {
            path: cmd.input.display().to_string(),
            source,
        })?;

    let trailing = reader.remaining()?;
    if trailing > 0 {
        ctx.warn(&texture.name, TextureWarning::TrailingData { bytes: trailing });
    }

    print_texture(&texture);
    let warnings = sink.take();
    if !warnings.is_empty() {
        println!("Warnings:");
        for (owner, warning) in warnings {
            println!("  [{owner}] {warning}");
        }
    }
    Ok(())
}

fn print_texture(texture: &NativeTexture) {
    let format = texture.format();
    let pixels = &texture.pixels;

    println!("Platform:    {}", texture.kind);
    println!("Name:        {}", texture.name);
    println!("Mask:        {}", texture.mask_name);
    println!("Size:        {}x{}", texture.width(), texture.height());
    println!(
        "Format:      {} depth {} ({}, {})",
        format.raster_format, format.depth, format.compression, format.color_order
    );
    if format.is_palettized() {
        println!(
            "Palette:     {} ({} stored, {} used)",
            format.palette_type,
            palette_count(format.palette_type),
            pixels.palette_size()
        );
    }
    println!("Mipmaps:     {}", pixels.mip_count());
    for (level, layer) in pixels.layers().iter().enumerate() {
        println!(
            "  {level}: {}x{} ({} bytes)",
            layer.layer_width,
            layer.layer_height,
            layer.data_size()
        );
    }
    println!("Alpha:       {}", pixels.has_alpha());
    println!("Auto mips:   {}", texture.auto_mipmap);
    println!("Cube:        {}", texture.cube_texture);
    println!(
        "Sampler:     filter {} u {} v {}",
        texture.format_info.filter_mode(),
        texture.format_info.u_addressing(),
        texture.format_info.v_addressing()
    );
}
