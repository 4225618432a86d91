use core::fmt;
use derive_enum_all_values::AllValues;

/// Channel layout and bit packing of an uncompressed texel.
///
/// The discriminants are the values stored in bits 8-11 of the native raster flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AllValues)]
#[repr(u8)]
pub enum RasterFormat {
    /// No color model; used by rasters that carry no pixels of their own.
    #[default]
    Default = 0,
    Format1555 = 1,
    Format565 = 2,
    Format4444 = 3,
    Luminance = 4,
    Format8888 = 5,
    Format888 = 6,
    Depth16 = 7,
    Depth24 = 8,
    Depth32 = 9,
    Format555 = 10,
    LuminanceAlpha = 11,
}

impl RasterFormat {
    #[inline]
    pub fn from_raw(value: u32) -> Option<Self> {
        Self::all_values()
            .iter()
            .copied()
            .find(|format| format.raw() == value)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Whether texels of this format can be read as colors.
    #[inline]
    pub fn has_color_model(self) -> bool {
        !matches!(
            self,
            Self::Default | Self::Depth16 | Self::Depth24 | Self::Depth32
        )
    }

    /// Whether the format stores an alpha channel.
    #[inline]
    pub fn has_alpha_channel(self) -> bool {
        matches!(
            self,
            Self::Format1555 | Self::Format4444 | Self::Format8888 | Self::LuminanceAlpha
        )
    }

    #[inline]
    pub fn is_luminance(self) -> bool {
        matches!(self, Self::Luminance | Self::LuminanceAlpha)
    }

    /// Bits per palette entry when this format describes a palette.
    pub fn palette_depth(self) -> u32 {
        match self {
            Self::Format8888 | Self::Format888 => 32,
            Self::Format1555 | Self::Format565 | Self::Format4444 | Self::Format555 => 16,
            Self::LuminanceAlpha => 16,
            Self::Luminance => 8,
            Self::Default | Self::Depth16 | Self::Depth24 | Self::Depth32 => 0,
        }
    }

    /// The depth a raw raster of this format is stored at unless stated otherwise.
    pub fn natural_depth(self) -> Option<u32> {
        match self {
            Self::Format1555 | Self::Format565 | Self::Format4444 | Self::Format555 => Some(16),
            Self::Format8888 | Self::Format888 => Some(32),
            Self::Luminance => Some(8),
            Self::LuminanceAlpha => Some(16),
            Self::Depth16 => Some(16),
            Self::Depth24 => Some(24),
            Self::Depth32 => Some(32),
            Self::Default => None,
        }
    }

    /// Whether a raw (non-palettized) texel of this format can be `depth` bits wide.
    pub fn supports_depth(self, depth: u32) -> bool {
        match self {
            Self::Format1555 | Self::Format565 | Self::Format4444 | Self::Format555 => depth == 16,
            Self::Format8888 => depth == 32,
            Self::Format888 => depth == 24 || depth == 32,
            Self::Luminance => depth == 4 || depth == 8,
            Self::LuminanceAlpha => depth == 8 || depth == 16,
            Self::Depth16 => depth == 16,
            Self::Depth24 => depth == 24,
            Self::Depth32 => depth == 32,
            Self::Default => false,
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Format1555 => "1555",
            Self::Format565 => "565",
            Self::Format4444 => "4444",
            Self::Luminance => "lum",
            Self::Format8888 => "8888",
            Self::Format888 => "888",
            Self::Depth16 => "depth16",
            Self::Depth24 => "depth24",
            Self::Depth32 => "depth32",
            Self::Format555 => "555",
            Self::LuminanceAlpha => "lumalpha",
        };
        f.write_str(name)
    }
}

impl core::str::FromStr for RasterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_values()
            .iter()
            .copied()
            .find(|format| format.to_string() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown raster format: {s}"))
    }
}
