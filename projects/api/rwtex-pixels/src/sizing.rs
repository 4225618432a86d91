//! Byte sizes of layers in any pixel format.

use rwtex_color::{raster_data_size, row_size};
use rwtex_common::format::PixelFormat;
use rwtex_dxt::{compressed_data_size, DxtVariant};

/// Bytes a `width` x `height` layer of `format` occupies.
///
/// # Examples
///
/// ```
/// use rwtex_common::format::{ColorOrder, CompressionType, PixelFormat, RasterFormat};
/// use rwtex_pixels::expected_data_size;
///
/// let raw = PixelFormat::raw(RasterFormat::Format565, 16, ColorOrder::Bgra);
/// assert_eq!(expected_data_size(&raw, 3, 2), 16);
///
/// let dxt1 = PixelFormat::compressed(CompressionType::Dxt1, RasterFormat::Format565);
/// assert_eq!(expected_data_size(&dxt1, 8, 8), 32);
/// ```
pub fn expected_data_size(format: &PixelFormat, width: u32, height: u32) -> usize {
    match DxtVariant::from_compression(format.compression) {
        Some(variant) => compressed_data_size(variant, width, height),
        None => raster_data_size(width, height, format.depth, format.row_alignment),
    }
}

/// Bytes per row of an uncompressed layer.
#[inline]
pub fn layer_row_size(format: &PixelFormat, width: u32) -> usize {
    row_size(width, format.depth, format.row_alignment)
}
