use crate::error::{PaletteError, PaletteResult};
use crate::external::ExternalQuantizer;
use crate::native::NativePalettizer;
use crate::palette::{Palette, PaletteRuntime};
use rwtex_common::color_8888::Color8888;

/// A palette together with one 8-bit index per source texel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuantizedImage {
    pub palette: Palette,
    pub indices: Vec<u8>,
}

/// Builds palettes with the backend selected by a [`PaletteRuntime`].
#[derive(Clone, Copy)]
pub struct PaletteBuilder<'a> {
    runtime: PaletteRuntime,
    external: &'a dyn ExternalQuantizer,
}

impl<'a> PaletteBuilder<'a> {
    pub fn new(runtime: PaletteRuntime, external: &'a dyn ExternalQuantizer) -> Self {
        Self { runtime, external }
    }

    #[inline]
    pub fn runtime(&self) -> PaletteRuntime {
        self.runtime
    }

    /// Quantizes `texels` to at most `max_colors` entries.
    pub fn build(&self, texels: &[Color8888], max_colors: usize) -> PaletteResult<QuantizedImage> {
        if max_colors == 0 || max_colors > 256 {
            return Err(PaletteError::InvalidBudget(max_colors));
        }

        match self.runtime {
            PaletteRuntime::Native => {
                let mut palettizer = NativePalettizer::new();
                for &texel in texels {
                    palettizer.feed_color(texel);
                }
                palettizer.reduce(max_colors);

                let indices = texels
                    .iter()
                    .map(|&texel| palettizer.closest_link(texel) as u8)
                    .collect();
                Ok(QuantizedImage {
                    palette: palettizer.palette(),
                    indices,
                })
            }
            PaletteRuntime::External => {
                let quantized = self.external.quantize(texels, max_colors)?;
                if quantized.palette.len() > max_colors || quantized.indices.len() != texels.len() {
                    return Err(PaletteError::External {
                        name: self.external.name().to_string(),
                        message: format!(
                            "returned {} colors and {} indices for {} texels",
                            quantized.palette.len(),
                            quantized.indices.len(),
                            texels.len()
                        ),
                    });
                }
                let palette_len = quantized.palette.len();
                if let Some((texel, &index)) = quantized
                    .indices
                    .iter()
                    .enumerate()
                    .find(|(_, &index)| index as usize >= palette_len)
                {
                    return Err(PaletteError::External {
                        name: self.external.name().to_string(),
                        message: format!(
                            "index {index} at texel {texel} exceeds {palette_len} colors"
                        ),
                    });
                }
                Ok(quantized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    struct BrokenQuantizer;

    impl ExternalQuantizer for BrokenQuantizer {
        fn name(&self) -> &str {
            "broken"
        }

        fn quantize(
            &self,
            _texels: &[Color8888],
            _max_colors: usize,
        ) -> PaletteResult<QuantizedImage> {
            Ok(QuantizedImage::default())
        }
    }

    #[rstest]
    #[case(0)]
    #[case(257)]
    fn rejects_invalid_budgets(#[case] budget: usize) {
        let builder = PaletteBuilder::new(PaletteRuntime::Native, &BrokenQuantizer);
        assert_eq!(
            builder.build(&[Color8888::default()], budget),
            Err(PaletteError::InvalidBudget(budget))
        );
    }

    #[test]
    fn native_indices_point_at_nearest_colors() {
        let texels = [
            Color8888::new(255, 0, 0, 255),
            Color8888::new(0, 255, 0, 255),
            Color8888::new(255, 0, 0, 255),
            Color8888::new(0, 0, 255, 255),
        ];
        let builder = PaletteBuilder::new(PaletteRuntime::Native, &BrokenQuantizer);
        let quantized = builder.build(&texels, 16).unwrap();
        assert_eq!(quantized.palette.len(), 3);
        assert_eq!(quantized.indices, vec![0, 1, 0, 2]);
    }

    /// Returns a two color palette but points one texel at entry 20.
    struct OutOfRangeQuantizer;

    impl ExternalQuantizer for OutOfRangeQuantizer {
        fn name(&self) -> &str {
            "out-of-range"
        }

        fn quantize(
            &self,
            texels: &[Color8888],
            _max_colors: usize,
        ) -> PaletteResult<QuantizedImage> {
            let mut indices = vec![0u8; texels.len()];
            if let Some(last) = indices.last_mut() {
                *last = 20;
            }
            Ok(QuantizedImage {
                palette: Palette::new(vec![
                    Color8888::new(0, 0, 0, 255),
                    Color8888::new(255, 255, 255, 255),
                ]),
                indices,
            })
        }
    }

    #[test]
    fn external_indices_past_the_palette_are_rejected() {
        let builder = PaletteBuilder::new(PaletteRuntime::External, &OutOfRangeQuantizer);
        let result = builder.build(&[Color8888::default(); 4], 16);
        match result {
            Err(PaletteError::External { name, message }) => {
                assert_eq!(name, "out-of-range");
                assert!(message.contains("index 20"), "{message}");
            }
            other => panic!("expected an external error, got {other:?}"),
        }
    }

    #[test]
    fn inconsistent_external_results_are_rejected() {
        let builder = PaletteBuilder::new(PaletteRuntime::External, &BrokenQuantizer);
        let result = builder.build(&[Color8888::default(); 4], 16);
        assert!(matches!(result, Err(PaletteError::External { .. })));
    }
}
