use crate::error::{DxtError, DxtResult};
use derive_enum_all_values::AllValues;
use rwtex_common::format::{CompressionType, RasterFormat};

/// One of the five DXT block encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum DxtVariant {
    Dxt1,
    Dxt2,
    Dxt3,
    Dxt4,
    Dxt5,
}

impl DxtVariant {
    /// Maps the historical variant number 1-5.
    pub fn from_number(number: u32) -> DxtResult<Self> {
        match number {
            1 => Ok(Self::Dxt1),
            2 => Ok(Self::Dxt2),
            3 => Ok(Self::Dxt3),
            4 => Ok(Self::Dxt4),
            5 => Ok(Self::Dxt5),
            other => Err(DxtError::UnknownVariant(other)),
        }
    }

    #[inline]
    pub fn from_compression(compression: CompressionType) -> Option<Self> {
        match compression {
            CompressionType::None => None,
            CompressionType::Dxt1 => Some(Self::Dxt1),
            CompressionType::Dxt2 => Some(Self::Dxt2),
            CompressionType::Dxt3 => Some(Self::Dxt3),
            CompressionType::Dxt4 => Some(Self::Dxt4),
            CompressionType::Dxt5 => Some(Self::Dxt5),
        }
    }

    #[inline]
    pub fn compression(self) -> CompressionType {
        match self {
            Self::Dxt1 => CompressionType::Dxt1,
            Self::Dxt2 => CompressionType::Dxt2,
            Self::Dxt3 => CompressionType::Dxt3,
            Self::Dxt4 => CompressionType::Dxt4,
            Self::Dxt5 => CompressionType::Dxt5,
        }
    }

    #[inline]
    pub fn number(self) -> u32 {
        self.compression().dxt_number()
    }

    /// Bytes per 4x4 block.
    #[inline]
    pub fn block_size(self) -> usize {
        match self {
            Self::Dxt1 => 8,
            _ => 16,
        }
    }

    /// Whether colors are stored premultiplied by alpha.
    #[inline]
    pub fn is_premultiplied(self) -> bool {
        matches!(self, Self::Dxt2 | Self::Dxt4)
    }

    /// The raster format reported for a raster of this variant.
    ///
    /// DXT1 reports 565, or 1555 when the texture has alpha. The other
    /// variants report 4444. The reported depth is always 16.
    #[inline]
    pub fn virtual_raster_format(self, has_alpha: bool) -> RasterFormat {
        match (self, has_alpha) {
            (Self::Dxt1, false) => RasterFormat::Format565,
            (Self::Dxt1, true) => RasterFormat::Format1555,
            _ => RasterFormat::Format4444,
        }
    }

    /// Depth reported alongside [`DxtVariant::virtual_raster_format`].
    pub const VIRTUAL_DEPTH: u32 = 16;
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    #[test]
    fn unknown_numbers_fail() {
        assert_eq!(DxtVariant::from_number(0), Err(DxtError::UnknownVariant(0)));
        assert_eq!(DxtVariant::from_number(6), Err(DxtError::UnknownVariant(6)));
        for &variant in DxtVariant::all_values() {
            assert_eq!(DxtVariant::from_number(variant.number()), Ok(variant));
        }
    }

    #[rstest]
    #[case(DxtVariant::Dxt1, false, RasterFormat::Format565)]
    #[case(DxtVariant::Dxt1, true, RasterFormat::Format1555)]
    #[case(DxtVariant::Dxt3, false, RasterFormat::Format4444)]
    #[case(DxtVariant::Dxt5, true, RasterFormat::Format4444)]
    fn virtual_formats(
        #[case] variant: DxtVariant,
        #[case] has_alpha: bool,
        #[case] expected: RasterFormat,
    ) {
        assert_eq!(variant.virtual_raster_format(has_alpha), expected);
    }
}
