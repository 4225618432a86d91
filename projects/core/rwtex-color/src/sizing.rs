//! Row and raster size calculations for uncompressed rasters.

/// Rounds `value` up to a multiple of `alignment`. An alignment of 0 or 1 leaves it unchanged.
#[inline]
pub fn align_up(value: usize, alignment: u32) -> usize {
    let alignment = alignment as usize;
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

/// Bytes taken by one row of `width` texels of `depth` bits, including padding.
///
/// # Examples
///
/// ```
/// use rwtex_color::row_size;
///
/// assert_eq!(row_size(3, 4, 4), 4); // 12 bits -> 2 bytes -> padded to 4
/// assert_eq!(row_size(3, 24, 0), 9);
/// ```
#[inline]
pub fn row_size(width: u32, depth: u32, alignment: u32) -> usize {
    let bits = width as usize * depth as usize;
    align_up(bits.div_ceil(8), alignment)
}

/// Bytes taken by a whole raster.
#[inline]
pub fn raster_data_size(width: u32, height: u32, depth: u32, alignment: u32) -> usize {
    row_size(width, depth, alignment) * height as usize
}

/// The bytes of row `y`, or [`None`] if the buffer is too short.
#[inline]
pub fn row_slice(data: &[u8], row_size: usize, y: u32) -> Option<&[u8]> {
    let start = row_size.checked_mul(y as usize)?;
    data.get(start..start.checked_add(row_size)?)
}

/// The mutable bytes of row `y`, or [`None`] if the buffer is too short.
#[inline]
pub fn row_slice_mut(data: &mut [u8], row_size: usize, y: u32) -> Option<&mut [u8]> {
    let start = row_size.checked_mul(y as usize)?;
    data.get_mut(start..start.checked_add(row_size)?)
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    #[rstest]
    #[case(16, 4, 4, 8)]
    #[case(1, 4, 4, 4)]
    #[case(5, 16, 4, 12)]
    #[case(5, 24, 4, 16)]
    #[case(5, 32, 0, 20)]
    #[case(7, 8, 1, 7)]
    fn row_sizes(
        #[case] width: u32,
        #[case] depth: u32,
        #[case] alignment: u32,
        #[case] expected: usize,
    ) {
        assert_eq!(row_size(width, depth, alignment), expected);
    }

    #[test]
    fn row_slices_respect_buffer_length() {
        let data = [0u8, 1, 2, 3, 4, 5];
        assert_eq!(row_slice(&data, 3, 1), Some(&data[3..6]));
        assert_eq!(row_slice(&data, 3, 2), None);
    }

    #[test]
    fn raster_size_multiplies_rows() {
        assert_eq!(raster_data_size(16, 16, 4, 4), 128);
        assert_eq!(raster_data_size(16, 16, 32, 4), 1024);
    }
}
