//! # Color Model Dispatcher
//!
//! Reads and writes individual texels of uncompressed rasters through one
//! uniform interface, whatever their raster format, depth, color order or
//! palette addressing.
//!
//! ```
//! use rwtex_color::ColorDispatcher;
//! use rwtex_common::color_8888::Color8888;
//! use rwtex_common::format::{ColorOrder, PixelFormat, RasterFormat};
//!
//! let format = PixelFormat::raw(RasterFormat::Format565, 16, ColorOrder::Bgra);
//! let dispatcher = ColorDispatcher::new(&format, None, 0)?;
//!
//! let mut row = [0u8; 4];
//! dispatcher.set_rgba(&mut row, 1, Color8888::new(255, 0, 0, 255))?;
//! assert_eq!(row, [0x00, 0x00, 0x00, 0xF8]);
//! # Ok::<(), rwtex_color::ColorModelError>(())
//! ```

pub mod abstract_color;
pub mod dispatcher;
pub mod error;
pub mod layout;
pub mod palette_index;
pub mod scale;
pub mod sizing;

pub use abstract_color::{AbstractColor, ColorF32};
pub use dispatcher::ColorDispatcher;
pub use error::{ColorModelError, ColorModelResult};
pub use palette_index::{read_palette_index, write_palette_index};
pub use sizing::*;

#[cfg(test)]
pub mod test_prelude;
