//! DXT block decoding.
//!
//! Color interpolation uses the 'ideal' rounding described in the DX9 docs,
//! i.e. `(2 * c0 + c1) / 3` per 8-bit channel after expanding the 565
//! reference colors. Alpha interpolation follows the same scheme with 7 or 5
//! divisions.

use crate::error::{DxtError, DxtResult};
use crate::variant::DxtVariant;
use rwtex_common::color_565::Color565;
use rwtex_common::color_8888::Color8888;
use rwtex_common::decoded_4x4_block::Decoded4x4Block;
use rwtex_common::endian::Endianness;

/// Builds the four colors addressable by a color block.
///
/// In three color mode the fourth entry is transparent black.
pub(crate) fn color_palette(
    color0: Color565,
    color1: Color565,
    four_color: bool,
) -> [Color8888; 4] {
    let c0 = color0.to_color_8888();
    let c1 = color1.to_color_8888();
    let lerp = |a: u8, b: u8, wa: u32, wb: u32| ((wa * a as u32 + wb * b as u32) / (wa + wb)) as u8;
    let mix = |wa: u32, wb: u32| {
        Color8888::new(
            lerp(c0.r, c1.r, wa, wb),
            lerp(c0.g, c1.g, wa, wb),
            lerp(c0.b, c1.b, wa, wb),
            255,
        )
    };

    if four_color {
        [c0, c1, mix(2, 1), mix(1, 2)]
    } else {
        [c0, c1, mix(1, 1), Color8888::TRANSPARENT]
    }
}

/// Builds the eight alphas addressable by an interpolated alpha block.
pub(crate) fn alpha_palette(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let a0 = alpha0 as u16;
    let a1 = alpha1 as u16;
    let mut values = [alpha0, alpha1, 0, 0, 0, 0, 0, 0];
    if alpha0 > alpha1 {
        // 6 interpolated values
        for step in 1..7u16 {
            values[step as usize + 1] = (((7 - step) * a0 + step * a1) / 7) as u8;
        }
    } else {
        // 4 interpolated values, then fixed 0 and 255
        for step in 1..5u16 {
            values[step as usize + 1] = (((5 - step) * a0 + step * a1) / 5) as u8;
        }
        values[6] = 0;
        values[7] = 255;
    }
    values
}

#[inline]
fn ensure_len(src: &[u8], needed: usize) -> DxtResult<()> {
    if src.len() < needed {
        return Err(DxtError::BufferTooSmall {
            needed,
            actual: src.len(),
        });
    }
    Ok(())
}

/// Decodes the 8 byte color part shared by every variant.
fn decode_color_part(src: &[u8], order: Endianness, allow_three_color: bool) -> Decoded4x4Block {
    let color0 = Color565::from_raw(order.read_u16(&src[0..2]));
    let color1 = Color565::from_raw(order.read_u16(&src[2..4]));
    let indices = order.read_u32(&src[4..8]);

    let four_color = !allow_three_color || color0.greater_than(&color1);
    let palette = color_palette(color0, color1, four_color);

    let mut block = Decoded4x4Block::default();
    for (texel, pixel) in block.pixels.iter_mut().enumerate() {
        *pixel = palette[((indices >> (texel * 2)) & 0b11) as usize];
    }
    block
}

fn unpremultiply_block(block: &mut Decoded4x4Block) {
    for pixel in &mut block.pixels {
        *pixel = pixel.unpremultiply();
    }
}

/// Decodes a single DXT1 block (8 bytes).
///
/// When the first reference color is not greater than the second, the block
/// uses three colors plus transparent black.
///
/// # Examples
///
/// ```
/// use rwtex_common::endian::Endianness;
/// use rwtex_dxt::decode_dxt1_block;
///
/// // Pure red (0xF800) with every index pointing at color0.
/// let block = [0x00, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
/// let decoded = decode_dxt1_block(&block, Endianness::Little).unwrap();
/// assert_eq!(decoded.pixels[0].r, 255);
/// assert_eq!(decoded.pixels[15].a, 255);
/// ```
pub fn decode_dxt1_block(src: &[u8], order: Endianness) -> DxtResult<Decoded4x4Block> {
    ensure_len(src, 8)?;
    Ok(decode_color_part(src, order, true))
}

fn decode_explicit_alpha(src: &[u8], order: Endianness) -> Decoded4x4Block {
    let alphas = order.read_uint(&src[0..8], 8);
    let mut block = decode_color_part(&src[8..16], order, false);
    for (texel, pixel) in block.pixels.iter_mut().enumerate() {
        pixel.a = (((alphas >> (texel * 4)) & 0xF) as u8) * 17;
    }
    block
}

fn decode_interpolated_alpha(src: &[u8], order: Endianness) -> Decoded4x4Block {
    let alphas = alpha_palette(src[0], src[1]);
    let indices = order.read_uint(&src[2..8], 6);
    let mut block = decode_color_part(&src[8..16], order, false);
    for (texel, pixel) in block.pixels.iter_mut().enumerate() {
        pixel.a = alphas[((indices >> (texel * 3)) & 0b111) as usize];
    }
    block
}

/// Decodes a single DXT2 block (16 bytes, explicit premultiplied alpha).
pub fn decode_dxt2_block(src: &[u8], order: Endianness) -> DxtResult<Decoded4x4Block> {
    ensure_len(src, 16)?;
    let mut block = decode_explicit_alpha(src, order);
    unpremultiply_block(&mut block);
    Ok(block)
}

/// Decodes a single DXT3 block (16 bytes, explicit alpha).
pub fn decode_dxt3_block(src: &[u8], order: Endianness) -> DxtResult<Decoded4x4Block> {
    ensure_len(src, 16)?;
    Ok(decode_explicit_alpha(src, order))
}

/// Decodes a single DXT4 block (16 bytes, interpolated premultiplied alpha).
pub fn decode_dxt4_block(src: &[u8], order: Endianness) -> DxtResult<Decoded4x4Block> {
    ensure_len(src, 16)?;
    let mut block = decode_interpolated_alpha(src, order);
    unpremultiply_block(&mut block);
    Ok(block)
}

/// Decodes a single DXT5 block (16 bytes, interpolated alpha).
pub fn decode_dxt5_block(src: &[u8], order: Endianness) -> DxtResult<Decoded4x4Block> {
    ensure_len(src, 16)?;
    Ok(decode_interpolated_alpha(src, order))
}

/// Decodes a single block of the given variant.
#[inline]
pub fn decode_block(
    variant: DxtVariant,
    src: &[u8],
    order: Endianness,
) -> DxtResult<Decoded4x4Block> {
    match variant {
        DxtVariant::Dxt1 => decode_dxt1_block(src, order),
        DxtVariant::Dxt2 => decode_dxt2_block(src, order),
        DxtVariant::Dxt3 => decode_dxt3_block(src, order),
        DxtVariant::Dxt4 => decode_dxt4_block(src, order),
        DxtVariant::Dxt5 => decode_dxt5_block(src, order),
    }
}
