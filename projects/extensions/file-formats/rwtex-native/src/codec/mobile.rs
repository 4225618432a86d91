//! S3TC mobile textures: 0x4C holds a GL internal format, bit 0 of 0x57 the
//! alpha flag. Only DXT1, DXT3 and DXT5 rasters exist in this layout.

use super::{compressed_format, structural, PlatformFields, ResolvedLayout};
use crate::header::NativeHeader;
use crate::texture::NativeTexture;
use rwtex_common::error::{StructuralReason, TextureError, TextureResult};
use rwtex_common::format::{CompressionType, PaletteType};

pub const GL_COMPRESSED_RGB_S3TC_DXT1: u32 = 0x83F0;
pub const GL_COMPRESSED_RGBA_S3TC_DXT1: u32 = 0x83F1;
pub const GL_COMPRESSED_RGBA_S3TC_DXT3: u32 = 0x83F2;
pub const GL_COMPRESSED_RGBA_S3TC_DXT5: u32 = 0x83F3;

const ALPHA_FLAG: u8 = 0x01;

pub(super) fn resolve(
    header: &NativeHeader,
    palette_type: PaletteType,
) -> TextureResult<ResolvedLayout> {
    let owner = header.name.as_str();
    let (compression, format_alpha) = match header.platform_format {
        GL_COMPRESSED_RGB_S3TC_DXT1 => (CompressionType::Dxt1, false),
        GL_COMPRESSED_RGBA_S3TC_DXT1 => (CompressionType::Dxt1, true),
        GL_COMPRESSED_RGBA_S3TC_DXT3 => (CompressionType::Dxt3, true),
        GL_COMPRESSED_RGBA_S3TC_DXT5 => (CompressionType::Dxt5, true),
        _ => return Err(structural(owner, StructuralReason::UnknownPlatformFormat)),
    };
    if palette_type.is_palettized() {
        return Err(structural(owner, StructuralReason::PalettizedCompression));
    }

    let has_alpha = format_alpha || header.platform_flags & ALPHA_FLAG != 0;
    Ok(ResolvedLayout {
        format: compressed_format(compression, header.raster_flags.raster_format(), has_alpha),
        has_alpha,
        cube_texture: false,
        auto_mipmap: header.raster_flags.auto_mipmap(),
        size_handler: None,
    })
}

pub(super) fn platform_fields(texture: &NativeTexture) -> TextureResult<PlatformFields> {
    let format = texture.format();
    let has_alpha = texture.pixels.has_alpha();
    let platform_format = match (format.compression, has_alpha) {
        (CompressionType::Dxt1, false) => GL_COMPRESSED_RGB_S3TC_DXT1,
        (CompressionType::Dxt1, true) => GL_COMPRESSED_RGBA_S3TC_DXT1,
        (CompressionType::Dxt3, _) => GL_COMPRESSED_RGBA_S3TC_DXT3,
        (CompressionType::Dxt5, _) => GL_COMPRESSED_RGBA_S3TC_DXT5,
        (compression, _) => {
            return Err(TextureError::Unsupported(format!(
                "{compression} rasters in mobile textures"
            )))
        }
    };

    Ok(PlatformFields {
        platform_format,
        platform_flags: if has_alpha { ALPHA_FLAG } else { 0 },
        size_handler: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    fn header(gl_format: u32, flags: u8) -> NativeHeader {
        NativeHeader {
            platform_id: 12,
            name: "tex".into(),
            platform_format: gl_format,
            platform_flags: flags,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(GL_COMPRESSED_RGB_S3TC_DXT1, 0, CompressionType::Dxt1, false)]
    #[case(GL_COMPRESSED_RGB_S3TC_DXT1, 1, CompressionType::Dxt1, true)]
    #[case(GL_COMPRESSED_RGBA_S3TC_DXT1, 0, CompressionType::Dxt1, true)]
    #[case(GL_COMPRESSED_RGBA_S3TC_DXT3, 0, CompressionType::Dxt3, true)]
    #[case(GL_COMPRESSED_RGBA_S3TC_DXT5, 0, CompressionType::Dxt5, true)]
    fn gl_formats(
        #[case] gl_format: u32,
        #[case] flags: u8,
        #[case] compression: CompressionType,
        #[case] has_alpha: bool,
    ) {
        let layout = resolve(&header(gl_format, flags), PaletteType::None).unwrap();
        assert_eq!(layout.format.compression, compression);
        assert_eq!(layout.has_alpha, has_alpha);
    }

    #[test]
    fn unknown_gl_format_is_structural() {
        let err = resolve(&header(0x8C00, 0), PaletteType::None).unwrap_err();
        assert_eq!(err.reason(), Some(StructuralReason::UnknownPlatformFormat));
    }

    #[test]
    fn palettes_are_rejected() {
        let err = resolve(&header(GL_COMPRESSED_RGBA_S3TC_DXT5, 0), PaletteType::Pal8).unwrap_err();
        assert_eq!(err.reason(), Some(StructuralReason::PalettizedCompression));
    }
}
