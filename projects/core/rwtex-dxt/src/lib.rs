//! # DXT Block Codec
//!
//! Compression and decompression of the five DXT variants. Every variant
//! stores 4x4 texel blocks:
//!
//! - DXT1: two 565 reference colors and 16 2-bit indices (8 bytes).
//! - DXT2/3: 16 explicit 4-bit alphas followed by a DXT1-style color block (16 bytes).
//! - DXT4/5: two reference alphas, 16 3-bit alpha indices and a color block (16 bytes).
//!
//! DXT2 and DXT4 store premultiplied colors; they are un-premultiplied on
//! decode and premultiplied on encode.
//!
//! Multi-byte fields are read and written in a caller-selected
//! [`Endianness`](rwtex_common::endian::Endianness). Endpoint fitting is
//! delegated to a [`BlockCompressor`].

pub mod compressor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod layer;
pub mod size;
pub mod variant;

pub use compressor::{
    AlphaBlock, BlockCompressor, ColorBlock, CompressionQuality, RangeFitCompressor,
};
pub use decode::*;
pub use encode::*;
pub use error::{DxtError, DxtResult};
pub use layer::{compress_layer, decompress_layer};
pub use size::*;
pub use variant::DxtVariant;

#[cfg(test)]
pub mod test_prelude;
