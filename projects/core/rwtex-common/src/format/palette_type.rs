use core::fmt;

/// How texels address a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaletteType {
    #[default]
    None,
    /// 16 colors. At depth 4 the even column sits in the high nibble.
    Pal4,
    /// 16 colors. At depth 4 the even column sits in the low nibble.
    Pal4Lsb,
    /// 256 colors, one byte per texel.
    Pal8,
}

impl PaletteType {
    #[inline]
    pub fn is_palettized(self) -> bool {
        self != Self::None
    }

    /// Maximum number of distinct colors the index width can address.
    #[inline]
    pub fn max_colors(self) -> usize {
        match self {
            Self::None => 0,
            Self::Pal4 | Self::Pal4Lsb => 16,
            Self::Pal8 => 256,
        }
    }

    /// Valid `(palette type, depth)` combinations: 4-bit palettes at depth 4
    /// or 8, 8-bit palettes at depth 8.
    #[inline]
    pub fn is_valid_depth(self, depth: u32) -> bool {
        match self {
            Self::None => true,
            Self::Pal4 | Self::Pal4Lsb => depth == 4 || depth == 8,
            Self::Pal8 => depth == 8,
        }
    }

    /// The natural index width of the palette type.
    #[inline]
    pub fn index_depth(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Pal4 | Self::Pal4Lsb => 4,
            Self::Pal8 => 8,
        }
    }
}

impl fmt::Display for PaletteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Pal4 => "pal4",
            Self::Pal4Lsb => "pal4lsb",
            Self::Pal8 => "pal8",
        })
    }
}

impl core::str::FromStr for PaletteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "pal4" => Ok(Self::Pal4),
            "pal4lsb" => Ok(Self::Pal4Lsb),
            "pal8" => Ok(Self::Pal8),
            _ => Err(format!(
                "Invalid palette type: {s}. Valid options: none, pal4, pal4lsb, pal8"
            )),
        }
    }
}
