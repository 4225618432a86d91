//! # Decoded 4x4 Block
//!
//! [`Decoded4x4Block`] is the unpacked form of one DXT block: 16 [`Color8888`]
//! pixels in row-major order.
//!
//! ```text
//! [ 0] [ 1] [ 2] [ 3]
//! [ 4] [ 5] [ 6] [ 7]
//! [ 8] [ 9] [10] [11]
//! [12] [13] [14] [15]
//! ```
//!
//! ```
//! use rwtex_common::color_8888::Color8888;
//! use rwtex_common::decoded_4x4_block::Decoded4x4Block;
//!
//! let red_pixel = Color8888::new(255, 0, 0, 255);
//! let block = Decoded4x4Block::new(red_pixel);
//! assert!(block.has_identical_pixels());
//! ```

use crate::color_8888::Color8888;

/// Represents a decoded 4x4 block of DXT pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded4x4Block {
    /// The 16 pixels in the block (row-major order)
    pub pixels: [Color8888; 16],
}

impl Decoded4x4Block {
    /// Constructs a new decoded block initialised with 16 copies of the provided pixel.
    pub fn new(pixel: Color8888) -> Self {
        Self {
            pixels: [pixel; 16],
        }
    }

    /// Returns the pixel at `(x, y)`, or [`None`] when either coordinate is outside 0-3.
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color8888> {
        if x >= 4 || y >= 4 {
            return None;
        }
        Some(self.pixels[y * 4 + x])
    }

    /// Sets the pixel at `(x, y)`. Out of range coordinates are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Color8888) {
        if x < 4 && y < 4 {
            self.pixels[y * 4 + x] = pixel;
        }
    }

    #[inline]
    pub fn has_identical_pixels(&self) -> bool {
        let first = self.pixels[0];
        self.pixels.iter().all(|pixel| *pixel == first)
    }

    /// True when any pixel is not fully opaque.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.pixels.iter().any(|pixel| pixel.a != 255)
    }
}

impl Default for Decoded4x4Block {
    fn default() -> Self {
        Self::new(Color8888::TRANSPARENT)
    }
}
