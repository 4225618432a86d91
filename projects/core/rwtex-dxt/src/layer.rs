//! Whole-layer compression and decompression.
//!
//! Blocks are stored row-major over the storage grid (the logical size
//! rounded up to multiples of 4). Texels outside the logical size are
//! cropped on decode and padded by edge clamping on encode.

use crate::compressor::BlockCompressor;
use crate::decode::decode_block;
use crate::encode::encode_block;
use crate::error::DxtError;
use crate::size::compressed_data_size;
use crate::variant::DxtVariant;
use rwtex_common::color_8888::Color8888;
use rwtex_common::decoded_4x4_block::Decoded4x4Block;
use rwtex_common::endian::Endianness;

/// Decodes every block of a `width` x `height` layer, handing each logical
/// texel to `write` as `(x, y, color)`.
///
/// # Errors
///
/// Fails with [`DxtError::BufferTooSmall`] when `src` holds fewer bytes than
/// the layer needs, or with whatever `write` returns.
pub fn decompress_layer<E: From<DxtError>>(
    variant: DxtVariant,
    src: &[u8],
    width: u32,
    height: u32,
    order: Endianness,
    mut write: impl FnMut(u32, u32, Color8888) -> Result<(), E>,
) -> Result<(), E> {
    let needed = compressed_data_size(variant, width, height);
    if src.len() < needed {
        return Err(DxtError::BufferTooSmall {
            needed,
            actual: src.len(),
        }
        .into());
    }
    tracing::trace!(?variant, width, height, "decompressing layer");

    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);
    let mut chunks = src[..needed].chunks_exact(variant.block_size());
    for block_y in 0..blocks_y {
        for block_x in 0..blocks_x {
            let Some(chunk) = chunks.next() else {
                return Ok(());
            };
            let block = decode_block(variant, chunk, order)?;
            for (texel, color) in block.pixels.iter().enumerate() {
                let x = block_x * 4 + (texel % 4) as u32;
                let y = block_y * 4 + (texel / 4) as u32;
                if x < width && y < height {
                    write(x, y, *color)?;
                }
            }
        }
    }
    Ok(())
}

/// Encodes a `width` x `height` layer into `dst`, pulling texels from `read`.
///
/// `dst` must hold at least [`compressed_data_size`] bytes.
#[allow(clippy::too_many_arguments)]
pub fn compress_layer<E: From<DxtError>>(
    variant: DxtVariant,
    width: u32,
    height: u32,
    compressor: &dyn BlockCompressor,
    punch_through: bool,
    order: Endianness,
    mut read: impl FnMut(u32, u32) -> Result<Color8888, E>,
    dst: &mut [u8],
) -> Result<(), E> {
    let needed = compressed_data_size(variant, width, height);
    if dst.len() < needed {
        return Err(DxtError::BufferTooSmall {
            needed,
            actual: dst.len(),
        }
        .into());
    }
    tracing::trace!(?variant, width, height, punch_through, "compressing layer");

    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);
    let mut chunks = dst[..needed].chunks_exact_mut(variant.block_size());
    for block_y in 0..blocks_y {
        for block_x in 0..blocks_x {
            let Some(chunk) = chunks.next() else {
                return Ok(());
            };
            let mut block = Decoded4x4Block::default();
            for (texel, color) in block.pixels.iter_mut().enumerate() {
                let x = (block_x * 4 + (texel % 4) as u32).min(width - 1);
                let y = (block_y * 4 + (texel / 4) as u32).min(height - 1);
                *color = read(x, y)?;
            }
            encode_block(variant, &block, compressor, punch_through, order, chunk)?;
        }
    }
    Ok(())
}
