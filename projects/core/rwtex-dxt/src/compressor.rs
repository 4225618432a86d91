//! Endpoint fitting for block compression.
//!
//! The codec asks a [`BlockCompressor`] for reference colors and indices,
//! then writes them out in the requested byte order. [`RangeFitCompressor`]
//! is the built-in implementation; callers may plug in their own.

use crate::decode::{alpha_palette, color_palette};
use rwtex_common::color_565::Color565;
use rwtex_common::color_8888::Color8888;

/// Fitted color part of a block. `indices` holds 16 2-bit indices, texel 0 in the lowest bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorBlock {
    pub color0: Color565,
    pub color1: Color565,
    pub indices: u32,
}

/// Fitted interpolated alpha part of a block. `indices` holds 16 3-bit indices in its low 48 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlphaBlock {
    pub alpha0: u8,
    pub alpha1: u8,
    pub indices: u64,
}

/// Chooses reference values and indices for 4x4 blocks.
pub trait BlockCompressor: Send + Sync {
    /// Fits the color part of a block.
    ///
    /// With `punch_through` set, texels with alpha below 128 must map to the
    /// transparent entry of a three color block, and the returned
    /// `color0` must not be greater than `color1`. Without it the block is
    /// decoded in four color mode and `color0` must not be less than `color1`.
    fn compress_color(&self, pixels: &[Color8888; 16], punch_through: bool) -> ColorBlock;

    /// Fits an interpolated alpha block.
    fn compress_alpha(&self, alphas: &[u8; 16]) -> AlphaBlock;
}

/// Effort spent by [`RangeFitCompressor`] per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CompressionQuality {
    /// Single refinement step for the color axis; alpha blocks always use eight value mode.
    Fast,
    /// Full axis refinement; alpha blocks also try six value mode.
    #[default]
    Default,
}

/// Fits endpoints along the principal axis of the block's colors.
///
/// The endpoints are the block texels with the smallest and largest
/// projection onto that axis, so blocks made of at most two 565
/// representable colors are reproduced exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeFitCompressor {
    quality: CompressionQuality,
}

impl RangeFitCompressor {
    pub fn new(quality: CompressionQuality) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> CompressionQuality {
        self.quality
    }

    fn axis_iterations(&self) -> u32 {
        match self.quality {
            CompressionQuality::Fast => 1,
            CompressionQuality::Default => 8,
        }
    }
}

const PUNCH_THROUGH_THRESHOLD: u8 = 128;

fn color_distance(a: Color8888, b: Color8888) -> u32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Principal axis of a point cloud, by power iteration on its covariance.
fn principal_axis(pixels: &[Color8888], iterations: u32) -> [f32; 3] {
    let count = pixels.len() as f32;
    let mut mean = [0f32; 3];
    for p in pixels {
        mean[0] += p.r as f32;
        mean[1] += p.g as f32;
        mean[2] += p.b as f32;
    }
    for m in &mut mean {
        *m /= count;
    }

    let mut cov = [[0f32; 3]; 3];
    for p in pixels {
        let d = [p.r as f32 - mean[0], p.g as f32 - mean[1], p.b as f32 - mean[2]];
        for (i, row) in cov.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell += d[i] * d[j];
            }
        }
    }

    // Seed with the covariance row of the widest channel.
    let widest = (0..3)
        .max_by(|&a, &b| cov[a][a].total_cmp(&cov[b][b]))
        .unwrap_or(0);
    if cov[widest][widest] <= f32::EPSILON {
        return [1.0, 1.0, 1.0];
    }
    let mut axis = cov[widest];
    for _ in 0..iterations {
        let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if len <= f32::EPSILON {
            break;
        }
        let unit = [axis[0] / len, axis[1] / len, axis[2] / len];
        axis = [
            cov[0][0] * unit[0] + cov[0][1] * unit[1] + cov[0][2] * unit[2],
            cov[1][0] * unit[0] + cov[1][1] * unit[1] + cov[1][2] * unit[2],
            cov[2][0] * unit[0] + cov[2][1] * unit[1] + cov[2][2] * unit[2],
        ];
    }
    axis
}

/// The two texels spanning the block along its principal axis.
fn extreme_colors(pixels: &[Color8888], iterations: u32) -> (Color8888, Color8888) {
    let axis = principal_axis(pixels, iterations);
    let project =
        |p: &Color8888| p.r as f32 * axis[0] + p.g as f32 * axis[1] + p.b as f32 * axis[2];

    let mut low = pixels[0];
    let mut high = pixels[0];
    let mut low_dot = project(&low);
    let mut high_dot = low_dot;
    for p in &pixels[1..] {
        let dot = project(p);
        if dot < low_dot {
            low_dot = dot;
            low = *p;
        }
        if dot > high_dot {
            high_dot = dot;
            high = *p;
        }
    }
    (low, high)
}

fn nearest_index(palette: &[Color8888], color: Color8888) -> u32 {
    let mut best = 0;
    let mut best_distance = u32::MAX;
    for (index, candidate) in palette.iter().enumerate() {
        let distance = color_distance(*candidate, color);
        if distance < best_distance {
            best_distance = distance;
            best = index as u32;
        }
    }
    best
}

fn alpha_indices(table: &[u8; 8], alphas: &[u8; 16]) -> (u64, u32) {
    let mut indices = 0u64;
    let mut error = 0u32;
    for (texel, &alpha) in alphas.iter().enumerate() {
        let mut best = 0usize;
        let mut best_distance = u32::MAX;
        for (index, &value) in table.iter().enumerate() {
            let distance = (value as i32 - alpha as i32).unsigned_abs();
            if distance < best_distance {
                best_distance = distance;
                best = index;
            }
        }
        indices |= (best as u64) << (texel * 3);
        error += best_distance * best_distance;
    }
    (indices, error)
}

impl BlockCompressor for RangeFitCompressor {
    fn compress_color(&self, pixels: &[Color8888; 16], punch_through: bool) -> ColorBlock {
        let mut opaque = [Color8888::TRANSPARENT; 16];
        let mut opaque_count = 0;
        for pixel in pixels {
            if !punch_through || pixel.a >= PUNCH_THROUGH_THRESHOLD {
                opaque[opaque_count] = *pixel;
                opaque_count += 1;
            }
        }

        if opaque_count == 0 {
            // Every texel maps to transparent black.
            return ColorBlock {
                color0: Color565::from_raw(0),
                color1: Color565::from_raw(0),
                indices: u32::MAX,
            };
        }

        let (low, high) = extreme_colors(&opaque[..opaque_count], self.axis_iterations());
        let mut color0 = Color565::from_color_8888(high);
        let mut color1 = Color565::from_color_8888(low);

        let has_transparent = opaque_count < 16;
        let three_color = punch_through && has_transparent;
        if three_color == color0.greater_than(&color1) {
            core::mem::swap(&mut color0, &mut color1);
        }

        // Equal endpoints decode as three colors in DXT1, which is harmless
        // since entries 0 to 2 are then identical.
        let palette = color_palette(color0, color1, !three_color);
        let candidates = if three_color { &palette[..3] } else { &palette[..] };

        let mut indices = 0u32;
        for (texel, pixel) in pixels.iter().enumerate() {
            let index = if punch_through && pixel.a < PUNCH_THROUGH_THRESHOLD {
                3
            } else {
                nearest_index(candidates, *pixel)
            };
            indices |= index << (texel * 2);
        }

        ColorBlock {
            color0,
            color1,
            indices,
        }
    }

    fn compress_alpha(&self, alphas: &[u8; 16]) -> AlphaBlock {
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        for &alpha in alphas {
            min = min.min(alpha);
            max = max.max(alpha);
        }

        // Eight value mode spanning the full range.
        let (alpha0, alpha1) = (max, min);
        let (indices, error) = alpha_indices(&alpha_palette(alpha0, alpha1), alphas);
        let mut best = AlphaBlock {
            alpha0,
            alpha1,
            indices,
        };
        if error == 0 || self.quality == CompressionQuality::Fast {
            return best;
        }

        // Six value mode, leaving 0 and 255 to the fixed entries.
        let mut inner_min = u8::MAX;
        let mut inner_max = u8::MIN;
        for &alpha in alphas.iter().filter(|&&a| a != 0 && a != 255) {
            inner_min = inner_min.min(alpha);
            inner_max = inner_max.max(alpha);
        }
        if inner_min <= inner_max {
            let table = alpha_palette(inner_min, inner_max);
            let (inner_indices, inner_error) = alpha_indices(&table, alphas);
            if inner_error < error {
                best = AlphaBlock {
                    alpha0: inner_min,
                    alpha1: inner_max,
                    indices: inner_indices,
                };
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use crate::decode::alpha_palette;
    use crate::test_prelude::*;

    fn two_color_block(a: Color8888, b: Color8888) -> [Color8888; 16] {
        let mut pixels = [a; 16];
        for pixel in pixels.iter_mut().skip(1).step_by(2) {
            *pixel = b;
        }
        pixels
    }

    #[test]
    fn four_color_blocks_keep_color0_greater() {
        let red = Color565::from_raw(0xF800).to_color_8888();
        let blue = Color565::from_raw(0x001F).to_color_8888();
        let block =
            RangeFitCompressor::default().compress_color(&two_color_block(blue, red), false);
        assert!(!block.color1.greater_than(&block.color0));
        assert_eq!(block.color0.raw_value(), 0xF800);
        assert_eq!(block.color1.raw_value(), 0x001F);
        // texel 0 is blue -> color1
        assert_eq!(block.indices & 0b11, 1);
    }

    #[test]
    fn punch_through_uses_transparent_index() {
        let green = Color565::from_raw(0x07E0).to_color_8888();
        let mut pixels = [green; 16];
        pixels[5] = Color8888::new(10, 20, 30, 0);
        let block = RangeFitCompressor::default().compress_color(&pixels, true);
        assert!(!block.color0.greater_than(&block.color1));
        assert_eq!((block.indices >> 10) & 0b11, 3);
        assert_eq!(block.indices & 0b11, 0);
    }

    #[test]
    fn fully_transparent_punch_through_block() {
        let block =
            RangeFitCompressor::default().compress_color(&[Color8888::TRANSPARENT; 16], true);
        assert_eq!(block.indices, u32::MAX);
    }

    #[rstest]
    #[case([255; 16])]
    #[case([0, 255, 0, 255, 0, 255, 0, 255, 0, 255, 0, 255, 0, 255, 0, 255])]
    #[case([17, 200, 17, 200, 17, 200, 17, 200, 17, 200, 17, 200, 17, 200, 17, 200])]
    fn two_alpha_blocks_are_exact(#[case] alphas: [u8; 16]) {
        let fitted = RangeFitCompressor::default().compress_alpha(&alphas);
        let table = alpha_palette(fitted.alpha0, fitted.alpha1);
        for (texel, &alpha) in alphas.iter().enumerate() {
            let index = (fitted.indices >> (texel * 3)) & 0b111;
            assert_eq!(table[index as usize], alpha);
        }
    }

    #[test]
    fn fast_quality_still_reproduces_two_colors() {
        let red = Color565::from_raw(0xF800).to_color_8888();
        let teal = Color565::from_raw(0x0410).to_color_8888();
        let mut pixels = [red; 16];
        pixels[3] = teal;
        let compressor = RangeFitCompressor::new(CompressionQuality::Fast);
        let block = compressor.compress_color(&pixels, false);
        assert_eq!(block.color0.raw_value(), 0xF800);
        assert_eq!(block.color1.raw_value(), 0x0410);
        assert_eq!((block.indices >> 6) & 0b11, 1);
    }

    #[test]
    fn six_value_mode_is_used_for_extremes() {
        let mut alphas = [100u8; 16];
        alphas[0] = 0;
        alphas[1] = 255;
        alphas[2] = 140;
        let fitted = RangeFitCompressor::default().compress_alpha(&alphas);
        assert!(fitted.alpha0 <= fitted.alpha1);
        let table = alpha_palette(fitted.alpha0, fitted.alpha1);
        assert_eq!(table[((fitted.indices) & 0b111) as usize], 0);
        assert_eq!(table[((fitted.indices >> 3) & 0b111) as usize], 255);
    }
}
