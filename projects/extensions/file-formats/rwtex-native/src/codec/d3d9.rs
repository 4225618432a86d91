//! The D3D9 layout: 0x4C holds a D3DFORMAT and 0x57 a set of flags.

use super::{compressed_format, palette_entry_format, structural, PlatformFields, ResolvedLayout};
use crate::d3d_format::{
    code_for_compression, code_for_raw, compression_for_code, is_known_code, raw_layout,
    D3dFormatHandler, D3DFMT_P8,
};
use crate::header::NativeHeader;
use crate::texture::NativeTexture;
use bitfield::bitfield;
use rwtex_common::error::{StructuralReason, TextureError, TextureResult};
use rwtex_common::format::{ColorOrder, PaletteType, PixelFormat, RasterFormat};
use rwtex_common::warning::TextureWarning;
use rwtex_pixels::TextureContext;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

bitfield! {
    /// Flags stored at 0x57 by D3D9 textures.
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct D3d9Flags(u8);
    impl Debug;

    pub has_alpha, set_has_alpha: 0;
    pub cube_texture, set_cube_texture: 1;
    pub auto_mipmaps, set_auto_mipmaps: 2;
    pub compressed, set_compressed: 3;
}

pub(super) fn resolve(
    ctx: &TextureContext,
    header: &NativeHeader,
    palette_type: PaletteType,
    handlers: &HashMap<u32, Arc<dyn D3dFormatHandler>>,
) -> TextureResult<ResolvedLayout> {
    let owner = header.name.as_str();
    let flags = D3d9Flags(header.platform_flags);
    let code = header.platform_format;
    let declared = header.raster_flags.raster_format();
    let compression = compression_for_code(code);

    let layout = |format: PixelFormat, size_handler: Option<Arc<dyn D3dFormatHandler>>| {
        ResolvedLayout {
            format,
            has_alpha: flags.has_alpha(),
            cube_texture: flags.cube_texture(),
            auto_mipmap: header.raster_flags.auto_mipmap() || flags.auto_mipmaps(),
            size_handler,
        }
    };

    // The palette entry format is only described by the raster format.
    if palette_type.is_palettized() {
        if compression.is_some() || flags.compressed() {
            return Err(structural(owner, StructuralReason::PalettizedCompression));
        }
        let format = PixelFormat::palettized(
            palette_entry_format(header)?,
            palette_type,
            header.depth as u32,
            ColorOrder::Rgba,
        );
        return Ok(layout(format, None));
    }

    if let Some(compression) = compression {
        return Ok(layout(
            compressed_format(compression, declared, flags.has_alpha()),
            None,
        ));
    }

    if let Some((raster_format, depth, order)) = raw_layout(code) {
        if declared != Some(raster_format) {
            ctx.warn(
                owner,
                TextureWarning::RasterFormatRepaired {
                    declared: declared.unwrap_or(RasterFormat::Default),
                    repaired: raster_format,
                },
            );
        }
        if header.depth as u32 != depth {
            ctx.warn(
                owner,
                TextureWarning::DepthRepaired {
                    declared: header.depth as u32,
                    repaired: depth,
                },
            );
        }
        return Ok(layout(PixelFormat::raw(raster_format, depth, order), None));
    }

    if let Some(handler) = handlers.get(&code) {
        debug!(
            name = owner,
            code,
            handler = handler.name(),
            "sizing mips with external handler"
        );
        let format = PixelFormat::raw(
            declared.unwrap_or(RasterFormat::Default),
            header.depth as u32,
            ColorOrder::Bgra,
        );
        return Ok(layout(format, Some(handler.clone())));
    }

    Err(structural(
        owner,
        if flags.compressed() {
            StructuralReason::UnknownCompression
        } else {
            StructuralReason::UnknownPlatformFormat
        },
    ))
}

pub(super) fn platform_fields(
    texture: &NativeTexture,
    handlers: &HashMap<u32, Arc<dyn D3dFormatHandler>>,
) -> TextureResult<PlatformFields> {
    let format = texture.format();
    let external = (!is_known_code(texture.platform_format))
        .then(|| handlers.get(&texture.platform_format))
        .flatten();

    let code = if external.is_some() {
        texture.platform_format
    } else if let Some(code) = code_for_compression(format.compression) {
        code
    } else if format.is_palettized() {
        D3DFMT_P8
    } else {
        code_for_raw(format.raster_format, format.depth, format.color_order).ok_or_else(|| {
            TextureError::Unsupported(format!(
                "no D3DFORMAT stores {} at depth {} in {} order",
                format.raster_format, format.depth, format.color_order
            ))
        })?
    };

    let mut flags = D3d9Flags::default();
    flags.set_has_alpha(texture.pixels.has_alpha());
    flags.set_cube_texture(texture.cube_texture);
    flags.set_auto_mipmaps(texture.auto_mipmap);
    flags.set_compressed(format.is_compressed());

    Ok(PlatformFields {
        platform_format: code,
        platform_flags: flags.0,
        size_handler: external.cloned(),
    })
}
