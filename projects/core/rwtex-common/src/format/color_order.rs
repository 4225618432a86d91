use core::fmt;
use derive_enum_all_values::AllValues;

/// A single color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

/// Permutation of channels within a packed texel.
///
/// Slot 0 is the least significant field of a packed 16-bit texel, or the
/// first byte of a byte-aligned texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AllValues)]
pub enum ColorOrder {
    #[default]
    Rgba,
    Bgra,
    Abgr,
    Argb,
    Barg,
}

impl ColorOrder {
    /// The channel stored in each of the four slots.
    #[inline]
    pub const fn slots(self) -> [Channel; 4] {
        use Channel::*;
        match self {
            Self::Rgba => [Red, Green, Blue, Alpha],
            Self::Bgra => [Blue, Green, Red, Alpha],
            Self::Abgr => [Alpha, Blue, Green, Red],
            Self::Argb => [Alpha, Red, Green, Blue],
            Self::Barg => [Blue, Alpha, Red, Green],
        }
    }

    /// The three color slots of a format without alpha, in slot order.
    ///
    /// Alpha is dropped and the remaining channels keep their relative order.
    #[inline]
    pub fn color_slots(self) -> [Channel; 3] {
        let mut out = [Channel::Red; 3];
        let mut idx = 0;
        for channel in self.slots() {
            if channel != Channel::Alpha {
                out[idx] = channel;
                idx += 1;
            }
        }
        out
    }
}

impl fmt::Display for ColorOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
            Self::Abgr => "abgr",
            Self::Argb => "argb",
            Self::Barg => "barg",
        })
    }
}

impl core::str::FromStr for ColorOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgba" => Ok(Self::Rgba),
            "bgra" => Ok(Self::Bgra),
            "abgr" => Ok(Self::Abgr),
            "argb" => Ok(Self::Argb),
            "barg" => Ok(Self::Barg),
            _ => Err(format!(
                "Invalid color order: {s}. Valid options: rgba, bgra, abgr, argb, barg"
            )),
        }
    }
}
