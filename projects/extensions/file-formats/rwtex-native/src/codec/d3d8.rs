//! The D3D8 layout: the DXT number sits at 0x57 and 0x4C only says whether
//! the texture has alpha.

use super::{compressed_format, palette_entry_format, structural, PlatformFields, ResolvedLayout};
use crate::header::NativeHeader;
use crate::texture::NativeTexture;
use rwtex_common::error::{StructuralReason, TextureResult};
use rwtex_common::format::{ColorOrder, CompressionType, PaletteType, PixelFormat};
use rwtex_common::warning::TextureWarning;
use rwtex_pixels::TextureContext;

pub(super) fn resolve(
    ctx: &TextureContext,
    header: &NativeHeader,
    palette_type: PaletteType,
) -> TextureResult<ResolvedLayout> {
    let owner = header.name.as_str();
    let compression = CompressionType::from_dxt_number(header.platform_flags as u32)
        .ok_or_else(|| structural(owner, StructuralReason::UnknownCompression))?;
    let has_alpha = header.platform_format != 0;

    let format = if compression.is_compressed() {
        if palette_type.is_palettized() {
            return Err(structural(owner, StructuralReason::PalettizedCompression));
        }
        compressed_format(compression, header.raster_flags.raster_format(), has_alpha)
    } else if palette_type.is_palettized() {
        PixelFormat::palettized(
            palette_entry_format(header)?,
            palette_type,
            header.depth as u32,
            ColorOrder::Rgba,
        )
    } else {
        let raster_format = header
            .raster_flags
            .raster_format()
            .ok_or_else(|| structural(owner, StructuralReason::InvalidRasterFormat))?;
        let Some(natural_depth) = raster_format.natural_depth() else {
            return Err(structural(owner, StructuralReason::InvalidRasterFormat));
        };

        let mut depth = header.depth as u32;
        if !raster_format.supports_depth(depth) {
            ctx.warn(
                owner,
                TextureWarning::DepthRepaired {
                    declared: depth,
                    repaired: natural_depth,
                },
            );
            depth = natural_depth;
        }
        PixelFormat::raw(raster_format, depth, ColorOrder::Bgra)
    };

    Ok(ResolvedLayout {
        format,
        has_alpha,
        cube_texture: false,
        auto_mipmap: header.raster_flags.auto_mipmap(),
        size_handler: None,
    })
}

pub(super) fn platform_fields(texture: &NativeTexture) -> TextureResult<PlatformFields> {
    Ok(PlatformFields {
        platform_format: texture.pixels.has_alpha() as u32,
        platform_flags: texture.format().compression.dxt_number() as u8,
        size_handler: None,
    })
}
