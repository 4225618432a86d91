use super::{ColorOrder, CompressionType, PaletteType, RasterFormat};
use crate::error::TextureError;

/// Describes how the texels of a raster are stored.
///
/// Invariant: a compressed format never carries a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub raster_format: RasterFormat,
    /// Bits per texel, including the index width when palettized.
    pub depth: u32,
    /// Row padding granularity in bytes; 0 for compressed rasters.
    pub row_alignment: u32,
    pub color_order: ColorOrder,
    pub palette_type: PaletteType,
    pub compression: CompressionType,
}

impl PixelFormat {
    /// Row alignment used by the Direct3D rasters.
    pub const D3D_ROW_ALIGNMENT: u32 = 4;

    /// An uncompressed, unpalettized format with D3D row alignment.
    pub const fn raw(raster_format: RasterFormat, depth: u32, color_order: ColorOrder) -> Self {
        Self {
            raster_format,
            depth,
            row_alignment: Self::D3D_ROW_ALIGNMENT,
            color_order,
            palette_type: PaletteType::None,
            compression: CompressionType::None,
        }
    }

    /// A palettized format whose palette entries use `raster_format`.
    pub const fn palettized(
        raster_format: RasterFormat,
        palette_type: PaletteType,
        depth: u32,
        color_order: ColorOrder,
    ) -> Self {
        Self {
            raster_format,
            depth,
            row_alignment: Self::D3D_ROW_ALIGNMENT,
            color_order,
            palette_type,
            compression: CompressionType::None,
        }
    }

    /// A block compressed format. The raster format and depth are filled in
    /// with the tag historically associated with the variant.
    pub const fn compressed(compression: CompressionType, raster_format: RasterFormat) -> Self {
        Self {
            raster_format,
            depth: 16,
            row_alignment: 0,
            color_order: ColorOrder::Bgra,
            palette_type: PaletteType::None,
            compression,
        }
    }

    /// 32-bit BGRA; the format compressed rasters are decoded into.
    pub const fn intermediate() -> Self {
        Self::raw(RasterFormat::Format8888, 32, ColorOrder::Bgra)
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.compression.is_compressed()
    }

    #[inline]
    pub fn is_palettized(&self) -> bool {
        self.palette_type.is_palettized()
    }

    pub fn with_row_alignment(mut self, row_alignment: u32) -> Self {
        self.row_alignment = row_alignment;
        self
    }

    /// Checks the combinations a texture can legally describe.
    pub fn validate(&self) -> Result<(), TextureError> {
        if self.is_compressed() {
            if self.is_palettized() {
                return Err(TextureError::Unsupported(format!(
                    "compressed format {} cannot carry a {} palette",
                    self.compression, self.palette_type
                )));
            }
            return Ok(());
        }

        if self.is_palettized() {
            if !self.palette_type.is_valid_depth(self.depth) {
                return Err(TextureError::Unsupported(format!(
                    "{} palette at depth {}",
                    self.palette_type, self.depth
                )));
            }
            if self.raster_format.palette_depth() == 0 {
                return Err(TextureError::Unsupported(format!(
                    "palette entries in raster format {}",
                    self.raster_format
                )));
            }
            return Ok(());
        }

        if !self.raster_format.supports_depth(self.depth) {
            return Err(TextureError::Unsupported(format!(
                "raster format {} at depth {}",
                self.raster_format, self.depth
            )));
        }
        if self.row_alignment != 0 && !self.row_alignment.is_power_of_two() {
            return Err(TextureError::Unsupported(format!(
                "row alignment {}",
                self.row_alignment
            )));
        }
        Ok(())
    }

    /// True when texels of both formats occupy the same bytes: same depth,
    /// row alignment, index addressing and compression.
    #[inline]
    pub fn has_same_byte_layout(&self, other: &Self) -> bool {
        self.depth == other.depth
            && self.row_alignment == other.row_alignment
            && self.palette_type == other.palette_type
            && self.compression == other.compression
    }

    /// True when the color values of both formats are identical, ignoring
    /// index addressing.
    #[inline]
    pub fn has_same_color_encoding(&self, other: &Self) -> bool {
        self.raster_format == other.raster_format && self.color_order == other.color_order
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::intermediate()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    #[test]
    fn compressed_palette_is_rejected() {
        let mut format = PixelFormat::compressed(CompressionType::Dxt1, RasterFormat::Format565);
        assert!(format.validate().is_ok());
        format.palette_type = PaletteType::Pal8;
        assert!(matches!(
            format.validate(),
            Err(TextureError::Unsupported(_))
        ));
    }

    #[rstest]
    #[case(PaletteType::Pal4, 4, true)]
    #[case(PaletteType::Pal4, 8, true)]
    #[case(PaletteType::Pal4Lsb, 4, true)]
    #[case(PaletteType::Pal8, 8, true)]
    #[case(PaletteType::Pal8, 4, false)]
    #[case(PaletteType::Pal4, 16, false)]
    fn palette_depth_combinations(
        #[case] palette_type: PaletteType,
        #[case] depth: u32,
        #[case] valid: bool,
    ) {
        let format = PixelFormat::palettized(
            RasterFormat::Format8888,
            palette_type,
            depth,
            ColorOrder::Rgba,
        );
        assert_eq!(format.validate().is_ok(), valid);
    }

    #[test]
    fn channel_order_does_not_change_byte_layout() {
        let a = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Rgba);
        let b = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Bgra);
        assert!(a.has_same_byte_layout(&b));
        assert!(!a.has_same_color_encoding(&b));
    }
}
