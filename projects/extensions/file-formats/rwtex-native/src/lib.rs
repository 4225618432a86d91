//! # Native Textures
//!
//! Readers and writers for the D3D8, D3D9 and S3TC mobile native texture
//! layouts. A texture is an 88 byte [`NativeHeader`], an optional palette
//! block and a chain of size prefixed mips.
//!
//! [`NativeCodec::deserialize`] validates the header before allocating
//! anything and checks every length against the remaining stream. Damaged
//! mips become [`TextureWarning`](rwtex_common::warning::TextureWarning)s;
//! format violations become structural
//! [`TextureError`](rwtex_common::error::TextureError)s naming the texture.
//!
//! ```
//! use rwtex_native::{NativeCodec, NativeTexture, NativeTextureKind};
//! use rwtex_pixels::{MipmapLayer, PixelDataTraversal, TextureContext};
//! use rwtex_common::format::{CompressionType, PaletteType, RasterFormat};
//! use std::io::Cursor;
//!
//! let kind = NativeTextureKind::D3d9;
//! let format =
//!     kind.pixel_format_for(RasterFormat::Format565, PaletteType::None, CompressionType::None)?;
//! let texels = vec![0u8; 4 * 4 * 2];
//! let pixels = PixelDataTraversal::borrowed(format, [MipmapLayer::borrowed(&texels, 4, 4)], None);
//!
//! let ctx = TextureContext::default();
//! let texture = NativeTexture::new(kind, "grass", pixels.into_owned(ctx.allocator())?);
//!
//! let codec = NativeCodec::new();
//! let mut bytes = Vec::new();
//! codec.serialize(&texture, &mut bytes)?;
//!
//! let read = codec.deserialize_any(&ctx, &mut Cursor::new(bytes))?;
//! assert_eq!(read.name, "grass");
//! assert_eq!((read.width(), read.height()), (4, 4));
//! # Ok::<(), rwtex_common::error::TextureError>(())
//! ```

pub mod codec;
pub mod d3d_format;
pub mod header;
pub mod kind;
pub mod stream;
pub mod texture;

pub use codec::NativeCodec;
pub use d3d_format::D3dFormatHandler;
pub use header::{NativeHeader, TextureFormatInfo, HEADER_SIZE};
pub use kind::NativeTextureKind;
pub use stream::TextureStream;
pub use texture::{palette_count, NativeTexture};

#[cfg(test)]
pub mod test_prelude;
