use crate::error::CliError;
use crate::util::{
    canonicalize_cli_path, find_all_files, handle_process_entry_error, Throughput,
};
use argh::FromArgs;
use bytesize::ByteSize;
use core::str::FromStr;
use rwtex_common::format::{CompressionType, PaletteType, PixelFormat, RasterFormat};
use rwtex_dxt::CompressionQuality;
use rwtex_native::{NativeCodec, NativeTextureKind};
use rwtex_palette::PaletteRuntime;
use rwtex_pixels::{convert_pixel_data, generate_mipmaps, ConversionConfig, TextureContext};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

#[cfg(feature = "multithreaded")]
use rayon::prelude::*;

#[derive(FromArgs, Debug)]
/// Convert every native texture under a directory to another pixel format
#[argh(subcommand, name = "convert")]
pub struct ConvertCmd {
    /// input directory path
    #[argh(option, from_str_fn(canonicalize_cli_path))]
    pub input: PathBuf,

    /// output directory path
    #[argh(option, from_str_fn(canonicalize_cli_path))]
    pub output: PathBuf,

    /// target format: dxt1-dxt5, a raster format (e.g. 8888, 565), or a
    /// palette and its entry format (e.g. pal8:8888, pal4:565)
    #[argh(option)]
    pub format: TargetFormat,

    /// layout to write: d3d8, d3d9 or mobile [default: same as the source]
    #[argh(option)]
    pub platform: Option<NativeTextureKind>,

    /// quantizer for palettized targets: native or neuquant
    #[argh(option, default = "PaletteRuntime::Native")]
    pub palette_runtime: PaletteRuntime,

    /// allow DXT1 blocks with 1-bit alpha
    #[argh(switch)]
    pub dxt_punch_through: bool,

    /// single refinement pass when compressing DXT blocks
    #[argh(switch)]
    pub fast: bool,

    /// build the full mip chain for textures that request automatic mipmaps
    #[argh(switch)]
    pub mipmaps: bool,

    /// warning level: 0 silent, 1 default, 2 includes repairs
    #[argh(option, default = "1")]
    pub warning_level: u32,
}

/// A pixel format named on the command line, resolved per platform when
/// the texture is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormat {
    pub raster_format: Option<RasterFormat>,
    pub palette_type: PaletteType,
    pub compression: CompressionType,
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        if let Some((palette, entry)) = s.split_once(':') {
            let palette_type = PaletteType::from_str(palette)?;
            if !palette_type.is_palettized() {
                return Err(format!("Not a palette type: {palette}"));
            }
            return Ok(Self {
                raster_format: Some(RasterFormat::from_str(entry)?),
                palette_type,
                compression: CompressionType::None,
            });
        }

        if s.starts_with("dxt") {
            let compression = CompressionType::from_str(&s)?;
            return Ok(Self {
                raster_format: None,
                palette_type: PaletteType::None,
                compression,
            });
        }

        Ok(Self {
            raster_format: Some(RasterFormat::from_str(&s)?),
            palette_type: PaletteType::None,
            compression: CompressionType::None,
        })
    }
}

impl TargetFormat {
    /// The stored format in `kind` textures. Compressed targets keep the
    /// source's raster format as their tag.
    fn resolve(
        &self,
        kind: NativeTextureKind,
        source: &PixelFormat,
    ) -> Result<PixelFormat, CliError> {
        let raster_format = self.raster_format.unwrap_or(source.raster_format);
        Ok(kind.pixel_format_for(raster_format, self.palette_type, self.compression)?)
    }
}

pub fn handle_convert_command(cmd: ConvertCmd) -> Result<(), CliError> {
    let mut config = ConversionConfig::new()
        .with_palette_runtime(cmd.palette_runtime)
        .with_dxt_punch_through(cmd.dxt_punch_through)
        .with_warning_level(cmd.warning_level);
    if cmd.fast {
        config = config.with_compression_quality(CompressionQuality::Fast);
    }
    let ctx = TextureContext::new(config);
    let codec = NativeCodec::new();

    println!(
        "Converting textures from {} to {}",
        cmd.input.display(),
        cmd.output.display()
    );

    let mut entries = Vec::new();
    find_all_files(&cmd.input, &mut entries)?;
    println!("Found {} files to process", entries.len());

    let start = Instant::now();
    let bytes_processed = AtomicU64::new(0);
    let process = |entry: &fs::DirEntry| {
        handle_process_entry_error(process_file(
            &ctx,
            &codec,
            &cmd,
            &entry.path(),
            &bytes_processed,
        ));
    };

    #[cfg(feature = "multithreaded")]
    entries.par_iter().for_each(process);
    #[cfg(not(feature = "multithreaded"))]
    entries.iter().for_each(process);

    let elapsed = start.elapsed();
    let total_bytes = bytes_processed.load(Ordering::Relaxed);
    info!(files = entries.len(), bytes = total_bytes, "conversion finished");
    println!("Time taken: {elapsed:.2?}");
    println!("Data processed: {}", ByteSize(total_bytes));
    println!("Throughput: {}", Throughput::measure(total_bytes, elapsed));
    Ok(())
}

fn process_file(
    ctx: &TextureContext,
    codec: &NativeCodec,
    cmd: &ConvertCmd,
    path: &Path,
    bytes_processed: &AtomicU64,
) -> Result<(), CliError> {
    let with_path = |source| CliError::File {
        path: path.display().to_string(),
        source,
    };

    let relative = path.strip_prefix(&cmd.input).unwrap_or(path);
    let target_path = cmd.output.join(relative);

    let mut reader = BufReader::new(File::open(path)?);
    let mut texture = codec.deserialize_any(ctx, &mut reader).map_err(with_path)?;
    let kind = cmd.platform.unwrap_or(texture.kind);
    let target = cmd.format.resolve(kind, texture.format())?;

    let wants_mipmaps = cmd.mipmaps && texture.auto_mipmap;
    if !wants_mipmaps && kind == texture.kind && *texture.format() == target {
        return Err(CliError::Unchanged);
    }

    if wants_mipmaps {
        // Mips are built from raw texels; compressed sources are decoded first.
        if texture.format().is_compressed() {
            convert_pixel_data(ctx, &mut texture.pixels, &PixelFormat::intermediate())
                .map_err(with_path)?;
        }
        let added = generate_mipmaps(ctx, &mut texture.pixels, usize::MAX).map_err(with_path)?;
        debug!(name = %texture.name, added, "generated mipmaps");
        texture.auto_mipmap = false;
    }
    convert_pixel_data(ctx, &mut texture.pixels, &target).map_err(with_path)?;

    if kind != texture.kind {
        texture.kind = kind;
        texture.platform_format = 0;
        if kind != NativeTextureKind::D3d9 {
            texture.cube_texture = false;
        }
    }

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(&target_path)?);
    codec.serialize(&texture, &mut writer).map_err(with_path)?;
    writer.flush()?;

    bytes_processed.fetch_add(fs::metadata(path)?.len(), Ordering::Relaxed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dxt5", None, PaletteType::None, CompressionType::Dxt5)]
    #[case("DXT1", None, PaletteType::None, CompressionType::Dxt1)]
    #[case("565", Some(RasterFormat::Format565), PaletteType::None, CompressionType::None)]
    #[case("pal8:8888", Some(RasterFormat::Format8888), PaletteType::Pal8, CompressionType::None)]
    #[case("pal4:565", Some(RasterFormat::Format565), PaletteType::Pal4, CompressionType::None)]
    fn parses_target_formats(
        #[case] input: &str,
        #[case] raster_format: Option<RasterFormat>,
        #[case] palette_type: PaletteType,
        #[case] compression: CompressionType,
    ) {
        assert_eq!(
            TargetFormat::from_str(input),
            Ok(TargetFormat {
                raster_format,
                palette_type,
                compression,
            })
        );
    }

    #[rstest]
    #[case("none:8888")]
    #[case("dxt9")]
    #[case("pal8:bogus")]
    #[case("rgb")]
    fn rejects_unknown_formats(#[case] input: &str) {
        assert!(TargetFormat::from_str(input).is_err());
    }

    #[test]
    fn mobile_rejects_raw_targets() {
        let target = TargetFormat::from_str("8888").unwrap();
        let source = PixelFormat::compressed(CompressionType::Dxt1, RasterFormat::Format565);
        assert!(target.resolve(NativeTextureKind::S3tcMobile, &source).is_err());
    }
}
