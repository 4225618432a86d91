use crate::header::TextureFormatInfo;
use crate::kind::NativeTextureKind;
use rwtex_common::format::{PaletteType, PixelFormat};
use rwtex_pixels::PixelDataTraversal;

/// Raster type of ordinary textures.
pub const RASTER_TYPE_TEXTURE: u8 = 4;

/// Palette entries stored for `palette_type`.
///
/// The D3D runtimes write 32 entries for 4-bit palettes even though only 16
/// are addressable.
#[inline]
pub fn palette_count(palette_type: PaletteType) -> usize {
    match palette_type {
        PaletteType::None => 0,
        PaletteType::Pal4 | PaletteType::Pal4Lsb => 32,
        PaletteType::Pal8 => 256,
    }
}

/// Bytes of the palette block stored for `format`.
#[inline]
pub fn palette_block_size(format: &PixelFormat) -> usize {
    palette_count(format.palette_type) * (format.raster_format.palette_depth() / 8) as usize
}

/// A native texture: its pixels plus the metadata the layouts carry.
#[derive(Debug)]
pub struct NativeTexture {
    pub kind: NativeTextureKind,
    pub name: String,
    pub mask_name: String,
    pub format_info: TextureFormatInfo,
    pub raster_type: u8,
    pub auto_mipmap: bool,
    pub cube_texture: bool,
    /// The stored D3DFORMAT (D3D9) or GL internal format (mobile). Kept so
    /// textures in formats only an external handler sizes can be written back.
    pub platform_format: u32,
    pub pixels: PixelDataTraversal<'static>,
}

impl NativeTexture {
    /// A texture of `kind` over `pixels` with default sampler state.
    pub fn new(
        kind: NativeTextureKind,
        name: impl Into<String>,
        pixels: PixelDataTraversal<'static>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            mask_name: String::new(),
            format_info: TextureFormatInfo::default(),
            raster_type: RASTER_TYPE_TEXTURE,
            auto_mipmap: false,
            cube_texture: false,
            platform_format: 0,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.layer(0).map_or(0, |layer| layer.layer_width)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.layer(0).map_or(0, |layer| layer.layer_height)
    }

    #[inline]
    pub fn format(&self) -> &PixelFormat {
        self.pixels.format()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[rstest]
    #[case(PaletteType::None, 0)]
    #[case(PaletteType::Pal4, 32)]
    #[case(PaletteType::Pal4Lsb, 32)]
    #[case(PaletteType::Pal8, 256)]
    fn palette_counts(#[case] palette_type: PaletteType, #[case] expected: usize) {
        assert_eq!(palette_count(palette_type), expected);
    }

    #[test]
    fn palette_block_uses_entry_depth() {
        let format = PixelFormat::palettized(
            RasterFormat::Format565,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        assert_eq!(palette_block_size(&format), 512);
        let format = PixelFormat::palettized(
            RasterFormat::Format888,
            PaletteType::Pal4,
            4,
            ColorOrder::Rgba,
        );
        assert_eq!(palette_block_size(&format), 128);
    }
}
