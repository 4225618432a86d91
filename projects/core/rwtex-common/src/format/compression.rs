use core::fmt;
use derive_enum_all_values::AllValues;

/// Block compression of a raster. The DXT variants are numbered 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AllValues)]
pub enum CompressionType {
    #[default]
    None,
    Dxt1,
    Dxt2,
    Dxt3,
    Dxt4,
    Dxt5,
}

impl CompressionType {
    /// Maps the historical variant number (0 = uncompressed, 1-5 = DXT1-5).
    #[inline]
    pub fn from_dxt_number(number: u32) -> Option<Self> {
        Self::all_values()
            .iter()
            .copied()
            .find(|c| c.dxt_number() == number)
    }

    #[inline]
    pub fn dxt_number(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Dxt1 => 1,
            Self::Dxt2 => 2,
            Self::Dxt3 => 3,
            Self::Dxt4 => 4,
            Self::Dxt5 => 5,
        }
    }

    #[inline]
    pub fn is_compressed(self) -> bool {
        self != Self::None
    }

    /// Bytes per 4x4 block, or 0 when uncompressed.
    #[inline]
    pub fn block_size(self) -> usize {
        match self {
            Self::None => 0,
            Self::Dxt1 => 8,
            _ => 16,
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            other => write!(f, "dxt{}", other.dxt_number()),
        }
    }
}

impl core::str::FromStr for CompressionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_values()
            .iter()
            .copied()
            .find(|c| c.to_string() == s.to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid compression: {s}. Valid options: none, dxt1, dxt2, dxt3, dxt4, dxt5"
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    #[test]
    fn dxt_numbers_round_trip() {
        for &compression in CompressionType::all_values() {
            assert_eq!(
                CompressionType::from_dxt_number(compression.dxt_number()),
                Some(compression)
            );
        }
        assert_eq!(CompressionType::from_dxt_number(6), None);
    }

    #[rstest]
    #[case("none", CompressionType::None)]
    #[case("DXT1", CompressionType::Dxt1)]
    #[case("dxt5", CompressionType::Dxt5)]
    fn parses_names(#[case] name: &str, #[case] expected: CompressionType) {
        assert_eq!(name.parse::<CompressionType>(), Ok(expected));
    }
}
