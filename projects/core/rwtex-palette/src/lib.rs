//! # Palette Quantizer
//!
//! Reduces true color texels to at most 16 or 256 representative colors and
//! maps every texel to an index into that set.
//!
//! Two backends are available, selected by [`PaletteRuntime`]:
//!
//! - [`NativePalettizer`]: a perceptual elimination quantizer working in HSV space.
//! - An [`ExternalQuantizer`] implementation, [`NeuQuantizer`] by default.
//!
//! Both resolve foreign colors onto a built palette with `closest_link`, which
//! is how every mip of a texture ends up sharing the palette of mip 0.
//!
//! ```
//! use rwtex_common::color_8888::Color8888;
//! use rwtex_palette::{NeuQuantizer, PaletteBuilder, PaletteRuntime};
//!
//! let texels = [Color8888::new(255, 0, 0, 255), Color8888::new(0, 0, 255, 255)];
//! let external = NeuQuantizer::default();
//! let builder = PaletteBuilder::new(PaletteRuntime::Native, &external);
//! let quantized = builder.build(&texels, 16)?;
//!
//! assert_eq!(quantized.palette.len(), 2);
//! assert_eq!(quantized.palette.colors[quantized.indices[1] as usize], texels[1]);
//! # Ok::<(), rwtex_palette::PaletteError>(())
//! ```

pub mod builder;
pub mod error;
pub mod external;
pub mod hsv;
pub mod native;
pub mod palette;

pub use builder::{PaletteBuilder, QuantizedImage};
pub use error::{PaletteError, PaletteResult};
pub use external::{ExternalQuantizer, NeuQuantizer};
pub use native::NativePalettizer;
pub use palette::{max_palette_colors, Palette, PaletteRuntime};

#[cfg(test)]
pub mod test_prelude;
