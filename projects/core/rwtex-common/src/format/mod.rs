//! Pixel format descriptors.

mod color_order;
mod compression;
mod palette_type;
mod pixel_format;
mod raster_flags;
mod raster_format;

pub use color_order::*;
pub use compression::*;
pub use palette_type::*;
pub use pixel_format::*;
pub use raster_flags::*;
pub use raster_format::*;
