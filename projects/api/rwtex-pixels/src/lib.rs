//! # Pixel Data Conversion
//!
//! A [`PixelDataTraversal`] holds the mip chain of one texture: its layers,
//! their shared [`PixelFormat`](rwtex_common::format::PixelFormat) and, for
//! palettized rasters, the shared palette. [`convert_pixel_data`] moves a
//! whole chain between any two formats:
//!
//! - raw to raw (recolor, palette repack or requantization),
//! - compressed to raw and back through the DXT codec,
//! - raw to palettized through the palette quantizer.
//!
//! Every call receives a [`TextureContext`] carrying the configuration and
//! the allocator, warning sink, block compressor and external quantizer.
//!
//! ```
//! use rwtex_common::format::{ColorOrder, PixelFormat, RasterFormat};
//! use rwtex_pixels::{convert_pixel_data, MipmapLayer, PixelDataTraversal, TextureContext};
//!
//! let texels = [255u8, 0, 0, 255, 0, 255, 0, 255];
//! let rgba = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Rgba);
//! let mut traversal =
//!     PixelDataTraversal::borrowed(rgba, [MipmapLayer::borrowed(&texels, 2, 1)], None);
//!
//! let bgra = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Bgra);
//! let ctx = TextureContext::default();
//! assert!(convert_pixel_data(&ctx, &mut traversal, &bgra)?);
//! assert_eq!(traversal.layer(0).unwrap().data(), &[0, 0, 255, 255, 0, 255, 0, 255]);
//! # Ok::<(), rwtex_common::error::TextureError>(())
//! ```

pub mod config;
pub mod context;
pub mod convert;
pub mod layer;
pub mod mipmaps;
pub mod sizing;
pub mod traversal;

pub use config::ConversionConfig;
pub use context::TextureContext;
pub use convert::{convert_pixel_data, remap_to_palette};
pub use layer::MipmapLayer;
pub use mipmaps::generate_mipmaps;
pub use sizing::{expected_data_size, layer_row_size};
pub use traversal::PixelDataTraversal;

#[cfg(test)]
pub mod test_prelude;
