//! Pluggable external quantization backend.

use crate::builder::QuantizedImage;
use crate::error::PaletteResult;
use crate::palette::Palette;
use color_quant::NeuQuant;
use rwtex_common::color_8888::Color8888;

/// A third party quantizer. Its palette order and texel mapping are used as is.
pub trait ExternalQuantizer: Send + Sync {
    /// Human readable name, used in logs and errors.
    fn name(&self) -> &str;

    /// Builds a palette of at most `max_colors` entries and maps every texel onto it.
    ///
    /// The returned indices are 8 bits wide, one per texel.
    fn quantize(&self, texels: &[Color8888], max_colors: usize) -> PaletteResult<QuantizedImage>;
}

/// [`ExternalQuantizer`] backed by the NeuQuant neural network quantizer.
#[derive(Debug, Clone, Copy)]
pub struct NeuQuantizer {
    /// Sampling factor, 1 (best) to 30 (fastest).
    pub sample_factor: i32,
}

impl Default for NeuQuantizer {
    fn default() -> Self {
        Self { sample_factor: 10 }
    }
}

impl NeuQuantizer {
    pub fn new(sample_factor: i32) -> Self {
        Self {
            sample_factor: sample_factor.clamp(1, 30),
        }
    }
}

impl ExternalQuantizer for NeuQuantizer {
    fn name(&self) -> &str {
        "neuquant"
    }

    fn quantize(&self, texels: &[Color8888], max_colors: usize) -> PaletteResult<QuantizedImage> {
        let max_colors = max_colors.clamp(1, 256);
        let rgba: Vec<u8> = texels.iter().flat_map(|c| c.to_array()).collect();

        // NeuQuant skips learning entirely when it samples fewer pixels than its factor.
        let sample_factor = if texels.len() < 1024 { 1 } else { self.sample_factor };
        let quantizer = NeuQuant::new(sample_factor, max_colors, &rgba);

        let colors = quantizer
            .color_map_rgba()
            .chunks_exact(4)
            .map(|c| Color8888::new(c[0], c[1], c[2], c[3]))
            .collect();
        let indices = rgba
            .chunks_exact(4)
            .map(|pixel| quantizer.index_of(pixel) as u8)
            .collect();

        tracing::debug!(
            quantizer = self.name(),
            texels = texels.len(),
            max_colors,
            "external quantization finished"
        );
        Ok(QuantizedImage {
            palette: Palette::new(colors),
            indices,
        })
    }
}
