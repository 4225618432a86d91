//! Sizes of block compressed rasters.

use crate::variant::DxtVariant;

/// Number of 4x4 blocks covering a `width` x `height` raster.
///
/// # Examples
///
/// ```
/// use rwtex_dxt::block_count;
///
/// assert_eq!(block_count(5, 3), 2);
/// assert_eq!(block_count(4, 4), 1);
/// ```
#[inline]
pub fn block_count(width: u32, height: u32) -> usize {
    width.div_ceil(4) as usize * height.div_ceil(4) as usize
}

/// Bytes of compressed data for a `width` x `height` raster.
#[inline]
pub fn compressed_data_size(variant: DxtVariant, width: u32, height: u32) -> usize {
    block_count(width, height) * variant.block_size()
}

/// Storage dimensions of a raster: the logical dimensions rounded up to multiples of 4.
#[inline]
pub fn storage_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(4) * 4, height.div_ceil(4) * 4)
}
