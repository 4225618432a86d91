//! Channel rescaling between bit widths.
//!
//! A channel is converted to a fraction of its representable maximum and then
//! multiplied by the destination maximum. Integer destinations are rounded to
//! nearest, floating destinations receive the fraction unchanged.

/// Largest value representable in `bits` bits.
#[inline]
pub const fn channel_max(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Rescales `value` from `src_bits` to `dst_bits`, rounding half up.
#[inline]
pub fn scale_channel(value: u32, src_bits: u32, dst_bits: u32) -> u32 {
    if src_bits == dst_bits {
        return value;
    }
    let src_max = channel_max(src_bits) as u64;
    let dst_max = channel_max(dst_bits) as u64;
    if src_max == 0 {
        return 0;
    }
    ((value as u64 * dst_max * 2 + src_max) / (src_max * 2)) as u32
}

/// The fraction `value / max(src_bits)` in `0.0..=1.0`.
#[inline]
pub fn to_normalized(value: u32, src_bits: u32) -> f32 {
    let max = channel_max(src_bits);
    if max == 0 {
        return 0.0;
    }
    (value as f64 / max as f64) as f32
}

/// Converts a fraction into an integer channel of `dst_bits` bits.
#[inline]
pub fn from_normalized(value: f32, dst_bits: u32) -> u32 {
    let max = channel_max(dst_bits) as f64;
    ((value.clamp(0.0, 1.0) as f64) * max).round() as u32
}
