//! DXT block encoding.
//!
//! Endpoint selection is left to a [`BlockCompressor`]; this module only
//! prepares the texels (premultiplying for DXT2/4) and lays the fitted
//! fields out in the requested byte order.

use crate::compressor::{BlockCompressor, ColorBlock};
use crate::error::{DxtError, DxtResult};
use crate::variant::DxtVariant;
use rwtex_common::color_8888::Color8888;
use rwtex_common::decoded_4x4_block::Decoded4x4Block;
use rwtex_common::endian::Endianness;

#[inline]
fn ensure_len(dst: &[u8], needed: usize) -> DxtResult<()> {
    if dst.len() < needed {
        return Err(DxtError::BufferTooSmall {
            needed,
            actual: dst.len(),
        });
    }
    Ok(())
}

fn write_color_part(color: ColorBlock, order: Endianness, dst: &mut [u8]) {
    order.write_u16(&mut dst[0..2], color.color0.raw_value());
    order.write_u16(&mut dst[2..4], color.color1.raw_value());
    order.write_u32(&mut dst[4..8], color.indices);
}

fn color_texels(block: &Decoded4x4Block, premultiply: bool) -> [Color8888; 16] {
    let mut pixels = block.pixels;
    if premultiply {
        for pixel in &mut pixels {
            *pixel = pixel.premultiply();
        }
    }
    pixels
}

fn alpha_texels(block: &Decoded4x4Block) -> [u8; 16] {
    let mut alphas = [0u8; 16];
    for (alpha, pixel) in alphas.iter_mut().zip(block.pixels.iter()) {
        *alpha = pixel.a;
    }
    alphas
}

/// Encodes a DXT1 block (8 bytes).
///
/// With `punch_through` set, texels with alpha below 128 become transparent
/// black. Otherwise alpha is discarded.
pub fn encode_dxt1_block(
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    punch_through: bool,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    ensure_len(dst, 8)?;
    let color = compressor.compress_color(&block.pixels, punch_through);
    write_color_part(color, order, dst);
    Ok(())
}

fn encode_explicit_alpha(
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    premultiply: bool,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    ensure_len(dst, 16)?;
    let mut alphas = 0u64;
    for (texel, pixel) in block.pixels.iter().enumerate() {
        let nibble = (pixel.a as u64 * 15 + 127) / 255;
        alphas |= nibble << (texel * 4);
    }
    order.write_uint(&mut dst[0..8], alphas, 8);

    let color = compressor.compress_color(&color_texels(block, premultiply), false);
    write_color_part(color, order, &mut dst[8..16]);
    Ok(())
}

fn encode_interpolated_alpha(
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    premultiply: bool,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    ensure_len(dst, 16)?;
    let alpha = compressor.compress_alpha(&alpha_texels(block));
    dst[0] = alpha.alpha0;
    dst[1] = alpha.alpha1;
    order.write_uint(&mut dst[2..8], alpha.indices & 0xFFFF_FFFF_FFFF, 6);

    let color = compressor.compress_color(&color_texels(block, premultiply), false);
    write_color_part(color, order, &mut dst[8..16]);
    Ok(())
}

/// Encodes a DXT2 block (16 bytes, explicit alpha, premultiplied colors).
pub fn encode_dxt2_block(
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    encode_explicit_alpha(block, compressor, true, order, dst)
}

/// Encodes a DXT3 block (16 bytes, explicit alpha).
pub fn encode_dxt3_block(
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    encode_explicit_alpha(block, compressor, false, order, dst)
}

/// Encodes a DXT4 block (16 bytes, interpolated alpha, premultiplied colors).
pub fn encode_dxt4_block(
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    encode_interpolated_alpha(block, compressor, true, order, dst)
}

/// Encodes a DXT5 block (16 bytes, interpolated alpha).
pub fn encode_dxt5_block(
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    encode_interpolated_alpha(block, compressor, false, order, dst)
}

/// Encodes a single block of the given variant. `punch_through` only affects DXT1.
#[inline]
pub fn encode_block(
    variant: DxtVariant,
    block: &Decoded4x4Block,
    compressor: &dyn BlockCompressor,
    punch_through: bool,
    order: Endianness,
    dst: &mut [u8],
) -> DxtResult<()> {
    match variant {
        DxtVariant::Dxt1 => encode_dxt1_block(block, compressor, punch_through, order, dst),
        DxtVariant::Dxt2 => encode_dxt2_block(block, compressor, order, dst),
        DxtVariant::Dxt3 => encode_dxt3_block(block, compressor, order, dst),
        DxtVariant::Dxt4 => encode_dxt4_block(block, compressor, order, dst),
        DxtVariant::Dxt5 => encode_dxt5_block(block, compressor, order, dst),
    }
}
