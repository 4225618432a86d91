//! Bit-level texel layouts.
//!
//! A [`TexelLayout`] knows where each channel of a `(raster format, depth,
//! color order)` triple lives and moves values in and out of a row.
//! Packed 16-bit texels are little endian with slot 0 in the least
//! significant bits. Byte texels store slot 0 in the first byte.

use crate::abstract_color::AbstractColor;
use crate::error::{ColorModelError, ColorModelResult};
use crate::palette_index::{read_nibble, write_nibble};
use crate::scale::{channel_max, from_normalized, scale_channel, to_normalized};
use rwtex_common::color_8888::Color8888;
use rwtex_common::format::{Channel, ColorOrder, RasterFormat};

/// Where the channels of a texel are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelLayout {
    /// A little endian 16-bit texel. `widths[i]` is the width of slot `i`,
    /// `channels[i]` the channel in that slot. Unused slots have width 0.
    Packed16 {
        widths: [u32; 4],
        channels: [Channel; 4],
    },
    /// One byte per channel. `stride` may exceed the channel count, in which
    /// case the trailing bytes are padding.
    Bytes {
        count: usize,
        stride: usize,
        channels: [Channel; 4],
    },
    /// 4-bit luminance, two texels per byte, even column in the high nibble.
    Lum4,
    Lum8,
    /// Luminance in the low nibble, alpha in the high nibble.
    LumAlpha44,
    /// Luminance in the first byte, alpha in the second.
    LumAlpha88,
}

impl TexelLayout {
    /// Resolves the layout of a raw raster, or the layout of palette entries
    /// when `depth` is the palette entry depth.
    pub fn resolve(
        raster_format: RasterFormat,
        depth: u32,
        color_order: ColorOrder,
    ) -> ColorModelResult<Self> {
        let unsupported = ColorModelError::UnsupportedFormat {
            raster_format,
            depth,
        };
        let slots = color_order.slots();
        let color_slots = color_order.color_slots();
        let three = [color_slots[0], color_slots[1], color_slots[2], Channel::Alpha];

        let layout = match (raster_format, depth) {
            (RasterFormat::Format1555, 16) => Self::Packed16 {
                widths: slot_widths_with_alpha(slots, 5, 1),
                channels: slots,
            },
            (RasterFormat::Format4444, 16) => Self::Packed16 {
                widths: [4; 4],
                channels: slots,
            },
            (RasterFormat::Format565, 16) => Self::Packed16 {
                widths: green_wide(color_slots),
                channels: three,
            },
            (RasterFormat::Format555, 16) => Self::Packed16 {
                widths: [5, 5, 5, 0],
                channels: three,
            },
            (RasterFormat::Format8888, 32) => Self::Bytes {
                count: 4,
                stride: 4,
                channels: slots,
            },
            (RasterFormat::Format888, 24) => Self::Bytes {
                count: 3,
                stride: 3,
                channels: three,
            },
            (RasterFormat::Format888, 32) => Self::Bytes {
                count: 3,
                stride: 4,
                channels: three,
            },
            (RasterFormat::Luminance, 4) => Self::Lum4,
            (RasterFormat::Luminance, 8) => Self::Lum8,
            (RasterFormat::LuminanceAlpha, 8) => Self::LumAlpha44,
            (RasterFormat::LuminanceAlpha, 16) => Self::LumAlpha88,
            (format, _) if !format.has_color_model() => {
                return Err(ColorModelError::NoColorModel(format))
            }
            _ => return Err(unsupported),
        };
        Ok(layout)
    }

    #[inline]
    pub fn is_luminance(&self) -> bool {
        matches!(
            self,
            Self::Lum4 | Self::Lum8 | Self::LumAlpha44 | Self::LumAlpha88
        )
    }

    /// Reads texel `x` as an abstract color.
    pub fn get_color(&self, row: &[u8], x: u32) -> ColorModelResult<AbstractColor> {
        match *self {
            Self::Packed16 { widths, channels } => {
                let raw = read_u16(row, x)? as u32;
                let mut color = Color8888::new(0, 0, 0, 255);
                let mut shift = 0;
                for (width, channel) in widths.into_iter().zip(channels) {
                    if width == 0 {
                        continue;
                    }
                    let value = (raw >> shift) & channel_max(width);
                    set_channel(&mut color, channel, scale_channel(value, width, 8) as u8);
                    shift += width;
                }
                Ok(AbstractColor::Rgba(color))
            }
            Self::Bytes {
                count,
                stride,
                channels,
            } => {
                let start = x as usize * stride;
                let bytes = row
                    .get(start..start + count)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                let mut color = Color8888::new(0, 0, 0, 255);
                for (value, channel) in bytes.iter().zip(channels) {
                    set_channel(&mut color, channel, *value);
                }
                Ok(AbstractColor::Rgba(color))
            }
            Self::Lum4 => {
                let byte = *row
                    .get(x as usize / 2)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                let lum = scale_channel(read_nibble(byte, x, false) as u32, 4, 8) as u8;
                Ok(AbstractColor::Luminance { lum, alpha: 255 })
            }
            Self::Lum8 => {
                let lum = *row
                    .get(x as usize)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                Ok(AbstractColor::Luminance { lum, alpha: 255 })
            }
            Self::LumAlpha44 => {
                let byte = *row
                    .get(x as usize)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                Ok(AbstractColor::Luminance {
                    lum: scale_channel((byte & 0x0F) as u32, 4, 8) as u8,
                    alpha: scale_channel((byte >> 4) as u32, 4, 8) as u8,
                })
            }
            Self::LumAlpha88 => {
                let start = x as usize * 2;
                let bytes = row
                    .get(start..start + 2)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                Ok(AbstractColor::Luminance {
                    lum: bytes[0],
                    alpha: bytes[1],
                })
            }
        }
    }

    /// Writes texel `x`. RGB colors written to luminance layouts are averaged.
    pub fn set_color(&self, row: &mut [u8], x: u32, color: AbstractColor) -> ColorModelResult<()> {
        match *self {
            Self::Packed16 { widths, channels } => {
                let rgba = color.to_rgba();
                let mut raw = unused_bits_mask(widths);
                let mut shift = 0;
                for (width, channel) in widths.into_iter().zip(channels) {
                    if width == 0 {
                        continue;
                    }
                    let value = scale_channel(get_channel(rgba, channel) as u32, 8, width);
                    raw |= value << shift;
                    shift += width;
                }
                write_u16(row, x, raw as u16)
            }
            Self::Bytes {
                count,
                stride,
                channels,
            } => {
                let rgba = color.to_rgba();
                let start = x as usize * stride;
                let bytes = row
                    .get_mut(start..start + stride)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                for (i, byte) in bytes.iter_mut().enumerate() {
                    *byte = if i < count {
                        get_channel(rgba, channels[i])
                    } else {
                        0xFF
                    };
                }
                Ok(())
            }
            Self::Lum4 => {
                let (lum, _) = color.to_luminance();
                let byte = row
                    .get_mut(x as usize / 2)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                *byte = write_nibble(*byte, x, false, scale_channel(lum as u32, 8, 4) as u8);
                Ok(())
            }
            Self::Lum8 => {
                let (lum, _) = color.to_luminance();
                let byte = row
                    .get_mut(x as usize)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                *byte = lum;
                Ok(())
            }
            Self::LumAlpha44 => {
                let (lum, alpha) = color.to_luminance();
                let byte = row
                    .get_mut(x as usize)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                *byte = (scale_channel(lum as u32, 8, 4) as u8)
                    | ((scale_channel(alpha as u32, 8, 4) as u8) << 4);
                Ok(())
            }
            Self::LumAlpha88 => {
                let (lum, alpha) = color.to_luminance();
                let start = x as usize * 2;
                let bytes = row
                    .get_mut(start..start + 2)
                    .ok_or(ColorModelError::OutOfBounds { x })?;
                bytes[0] = lum;
                bytes[1] = alpha;
                Ok(())
            }
        }
    }

    /// Reads texel `x` as `[r, g, b, a]` fractions without an 8-bit round trip.
    pub fn get_normalized(&self, row: &[u8], x: u32) -> ColorModelResult<[f32; 4]> {
        match *self {
            Self::Packed16 { widths, channels } => {
                let raw = read_u16(row, x)? as u32;
                let mut out = [0.0, 0.0, 0.0, 1.0];
                let mut shift = 0;
                for (width, channel) in widths.into_iter().zip(channels) {
                    if width == 0 {
                        continue;
                    }
                    let value = (raw >> shift) & channel_max(width);
                    out[channel_index(channel)] = to_normalized(value, width);
                    shift += width;
                }
                Ok(out)
            }
            _ => {
                let rgba = self.get_color(row, x)?.to_rgba();
                Ok(rgba.to_array().map(|c| to_normalized(c as u32, 8)))
            }
        }
    }

    /// Writes texel `x` from `[r, g, b, a]` fractions.
    pub fn set_normalized(&self, row: &mut [u8], x: u32, color: [f32; 4]) -> ColorModelResult<()> {
        match *self {
            Self::Packed16 { widths, channels } => {
                let mut raw = unused_bits_mask(widths);
                let mut shift = 0;
                for (width, channel) in widths.into_iter().zip(channels) {
                    if width == 0 {
                        continue;
                    }
                    raw |= from_normalized(color[channel_index(channel)], width) << shift;
                    shift += width;
                }
                write_u16(row, x, raw as u16)
            }
            _ => {
                let rgba = Color8888::from_array(color.map(|c| from_normalized(c, 8) as u8));
                self.set_color(row, x, AbstractColor::Rgba(rgba))
            }
        }
    }
}

/// Bits of a packed texel not covered by any slot. 555 keeps its unused top bit set.
#[inline]
fn unused_bits_mask(widths: [u32; 4]) -> u32 {
    let used: u32 = widths.iter().sum();
    0xFFFF & !channel_max(used)
}

/// Slot widths for a 4-slot format where alpha has its own width.
fn slot_widths_with_alpha(slots: [Channel; 4], color_width: u32, alpha_width: u32) -> [u32; 4] {
    slots.map(|channel| match channel {
        Channel::Alpha => alpha_width,
        _ => color_width,
    })
}

/// 565 widths: green gets the 6-bit field wherever it sits.
fn green_wide(color_slots: [Channel; 3]) -> [u32; 4] {
    let mut widths = [0u32; 4];
    for (width, channel) in widths.iter_mut().zip(color_slots) {
        *width = match channel {
            Channel::Green => 6,
            _ => 5,
        };
    }
    widths
}

#[inline]
fn channel_index(channel: Channel) -> usize {
    match channel {
        Channel::Red => 0,
        Channel::Green => 1,
        Channel::Blue => 2,
        Channel::Alpha => 3,
    }
}

#[inline]
fn get_channel(color: Color8888, channel: Channel) -> u8 {
    match channel {
        Channel::Red => color.r,
        Channel::Green => color.g,
        Channel::Blue => color.b,
        Channel::Alpha => color.a,
    }
}

#[inline]
fn set_channel(color: &mut Color8888, channel: Channel, value: u8) {
    match channel {
        Channel::Red => color.r = value,
        Channel::Green => color.g = value,
        Channel::Blue => color.b = value,
        Channel::Alpha => color.a = value,
    }
}

#[inline]
fn read_u16(row: &[u8], x: u32) -> ColorModelResult<u16> {
    let start = x as usize * 2;
    let bytes = row
        .get(start..start + 2)
        .ok_or(ColorModelError::OutOfBounds { x })?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

#[inline]
fn write_u16(row: &mut [u8], x: u32, value: u16) -> ColorModelResult<()> {
    let start = x as usize * 2;
    let bytes = row
        .get_mut(start..start + 2)
        .ok_or(ColorModelError::OutOfBounds { x })?;
    bytes.copy_from_slice(&value.to_le_bytes());
    Ok(())
}
