use rwtex_common::error::TextureError;
use rwtex_common::format::{CompressionType, RasterFormat};
use thiserror::Error;

/// Why a texel could not be read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ColorModelError {
    #[error("raster format {raster_format} is not supported at depth {depth}")]
    UnsupportedFormat {
        raster_format: RasterFormat,
        depth: u32,
    },

    #[error("compressed rasters ({0}) have no per-texel color model")]
    Compressed(CompressionType),

    #[error("raster format {0} has no color model")]
    NoColorModel(RasterFormat),

    #[error("palette index {index} is outside a palette of {palette_size} entries")]
    PaletteIndexOutOfRange { index: u32, palette_size: usize },

    #[error("palettized rasters only accept palette indices")]
    PalettizedWrite,

    #[error("palettized raster has no palette data")]
    MissingPalette,

    #[error("raster is not palettized")]
    NotPalettized,

    #[error("texel {x} lies outside the row")]
    OutOfBounds { x: u32 },
}

pub type ColorModelResult<T> = Result<T, ColorModelError>;

impl From<ColorModelError> for TextureError {
    fn from(value: ColorModelError) -> Self {
        match value {
            ColorModelError::PaletteIndexOutOfRange { .. }
            | ColorModelError::OutOfBounds { .. } => TextureError::CorruptData(value.to_string()),
            _ => TextureError::Unsupported(value.to_string()),
        }
    }
}
