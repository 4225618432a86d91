//! Raw palette index access.
//!
//! At depth 4, two texels share a byte. [`PaletteType::Pal4`] keeps the even
//! column in the high nibble, [`PaletteType::Pal4Lsb`] keeps it in the low
//! nibble. At depth 8 every texel owns a byte.

use crate::error::{ColorModelError, ColorModelResult};
use rwtex_common::format::PaletteType;

/// Reads the palette index of column `x`.
#[inline]
pub fn read_palette_index(
    row: &[u8],
    x: u32,
    depth: u32,
    palette_type: PaletteType,
) -> ColorModelResult<u8> {
    match (palette_type, depth) {
        (PaletteType::Pal4 | PaletteType::Pal4Lsb, 4) => {
            let byte = *row
                .get(x as usize / 2)
                .ok_or(ColorModelError::OutOfBounds { x })?;
            Ok(read_nibble(byte, x, palette_type == PaletteType::Pal4Lsb))
        }
        (PaletteType::Pal4 | PaletteType::Pal4Lsb | PaletteType::Pal8, 8) => row
            .get(x as usize)
            .copied()
            .ok_or(ColorModelError::OutOfBounds { x }),
        (PaletteType::None, _) => Err(ColorModelError::NotPalettized),
        _ => Err(ColorModelError::UnsupportedFormat {
            raster_format: Default::default(),
            depth,
        }),
    }
}

/// Writes the palette index of column `x`.
#[inline]
pub fn write_palette_index(
    row: &mut [u8],
    x: u32,
    depth: u32,
    palette_type: PaletteType,
    index: u8,
) -> ColorModelResult<()> {
    match (palette_type, depth) {
        (PaletteType::Pal4 | PaletteType::Pal4Lsb, 4) => {
            if index > 0x0F {
                return Err(ColorModelError::PaletteIndexOutOfRange {
                    index: index as u32,
                    palette_size: 16,
                });
            }
            let byte = row
                .get_mut(x as usize / 2)
                .ok_or(ColorModelError::OutOfBounds { x })?;
            *byte = write_nibble(*byte, x, palette_type == PaletteType::Pal4Lsb, index);
            Ok(())
        }
        (PaletteType::Pal4 | PaletteType::Pal4Lsb | PaletteType::Pal8, 8) => {
            let byte = row
                .get_mut(x as usize)
                .ok_or(ColorModelError::OutOfBounds { x })?;
            *byte = index;
            Ok(())
        }
        (PaletteType::None, _) => Err(ColorModelError::NotPalettized),
        _ => Err(ColorModelError::UnsupportedFormat {
            raster_format: Default::default(),
            depth,
        }),
    }
}

/// Extracts the nibble of column `x`. `lsb_first` puts even columns in the low nibble.
#[inline]
pub(crate) fn read_nibble(byte: u8, x: u32, lsb_first: bool) -> u8 {
    let even = x % 2 == 0;
    if even == lsb_first {
        byte & 0x0F
    } else {
        byte >> 4
    }
}

#[inline]
pub(crate) fn write_nibble(byte: u8, x: u32, lsb_first: bool, value: u8) -> u8 {
    let even = x % 2 == 0;
    if even == lsb_first {
        (byte & 0xF0) | (value & 0x0F)
    } else {
        (byte & 0x0F) | ((value & 0x0F) << 4)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    #[rstest]
    #[case(PaletteType::Pal4, [0x1, 0x2])]
    #[case(PaletteType::Pal4Lsb, [0x2, 0x1])]
    fn nibble_order(#[case] palette_type: PaletteType, #[case] expected: [u8; 2]) {
        let row = [0x12u8];
        assert_eq!(read_palette_index(&row, 0, 4, palette_type), Ok(expected[0]));
        assert_eq!(read_palette_index(&row, 1, 4, palette_type), Ok(expected[1]));
    }

    #[rstest]
    #[case(PaletteType::Pal4)]
    #[case(PaletteType::Pal4Lsb)]
    fn writes_leave_neighbour_nibble_untouched(#[case] palette_type: PaletteType) {
        let mut row = [0u8; 2];
        for x in 0..4 {
            write_palette_index(&mut row, x, 4, palette_type, (x + 5) as u8).unwrap();
        }
        for x in 0..4 {
            assert_eq!(
                read_palette_index(&row, x, 4, palette_type),
                Ok((x + 5) as u8)
            );
        }
    }

    #[rstest]
    #[case(PaletteType::Pal4)]
    #[case(PaletteType::Pal4Lsb)]
    fn nibble_writes_reject_indices_above_fifteen(#[case] palette_type: PaletteType) {
        let mut row = [0x55u8];
        assert_eq!(
            write_palette_index(&mut row, 0, 4, palette_type, 20),
            Err(ColorModelError::PaletteIndexOutOfRange {
                index: 20,
                palette_size: 16
            })
        );
        assert_eq!(row, [0x55]);
    }

    #[test]
    fn pal4_high_nibble_layout_is_exact() {
        let mut row = [0u8; 1];
        write_palette_index(&mut row, 0, 4, PaletteType::Pal4, 0xA).unwrap();
        write_palette_index(&mut row, 1, 4, PaletteType::Pal4, 0x3).unwrap();
        assert_eq!(row, [0xA3]);

        let mut row = [0u8; 1];
        write_palette_index(&mut row, 0, 4, PaletteType::Pal4Lsb, 0xA).unwrap();
        write_palette_index(&mut row, 1, 4, PaletteType::Pal4Lsb, 0x3).unwrap();
        assert_eq!(row, [0x3A]);
    }

    #[test]
    fn invalid_combinations_fail() {
        let row = [0u8; 4];
        assert_eq!(
            read_palette_index(&row, 0, 8, PaletteType::None),
            Err(ColorModelError::NotPalettized)
        );
        assert!(read_palette_index(&row, 0, 4, PaletteType::Pal8).is_err());
        assert_eq!(
            read_palette_index(&row, 9, 8, PaletteType::Pal8),
            Err(ColorModelError::OutOfBounds { x: 9 })
        );
    }
}
