//! # RGB565 Color
//!
//! 16-bit colors as stored in the reference colors of every DXT block:
//!
//! - **Red**: 5 bits (bits 15-11)
//! - **Green**: 6 bits (bits 10-5)
//! - **Blue**: 5 bits (bits 4-0)
//!
//! Expansion back to 8 bits replicates the top bits, which gives the same
//! result as `round(value * 255 / max)` for 5 and 6 bit channels.
//!
//! ```rust
//! use rwtex_common::color_565::Color565;
//!
//! let color = Color565::from_raw(0xF800);
//! assert_eq!(color.red(), 255);
//! assert_eq!(color.green(), 0);
//! assert_eq!(color.blue(), 0);
//! ```

use crate::color_8888::Color8888;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Color565 {
    value: u16,
}

impl Color565 {
    #[inline]
    pub fn from_raw(value: u16) -> Self {
        Self { value }
    }

    /// Packs 8-bit channels by truncation.
    #[inline]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            value: ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3),
        }
    }

    /// Packs 8-bit channels with rounding to the nearest representable value.
    #[inline]
    pub fn from_rgb_rounded(r: u8, g: u8, b: u8) -> Self {
        let r = (r as u32 * 31 + 127) / 255;
        let g = (g as u32 * 63 + 127) / 255;
        let b = (b as u32 * 31 + 127) / 255;
        Self {
            value: ((r << 11) | (g << 5) | b) as u16,
        }
    }

    #[inline]
    pub fn raw_value(&self) -> u16 {
        self.value
    }

    #[inline]
    pub fn red(&self) -> u8 {
        let r = (self.value & 0b11111000_00000000) >> 11;
        ((r << 3) | (r >> 2)) as u8
    }

    #[inline]
    pub fn green(&self) -> u8 {
        let g = (self.value & 0b00000111_11100000) >> 5;
        ((g << 2) | (g >> 4)) as u8
    }

    #[inline]
    pub fn blue(&self) -> u8 {
        let b = self.value & 0b00000000_00011111;
        ((b << 3) | (b >> 2)) as u8
    }

    #[inline]
    pub fn greater_than(&self, other: &Self) -> bool {
        self.value > other.value
    }

    /// Expands to an opaque [`Color8888`].
    #[inline]
    pub fn to_color_8888(&self) -> Color8888 {
        Color8888::new(self.red(), self.green(), self.blue(), 255)
    }

    #[inline]
    pub fn from_color_8888(color: Color8888) -> Self {
        Self::from_rgb_rounded(color.r, color.g, color.b)
    }
}
