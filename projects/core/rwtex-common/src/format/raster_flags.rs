use super::{PaletteType, RasterFormat};
use bitfield::bitfield;

bitfield! {
    /// Packed raster format flags as stored in native texture headers.
    ///
    /// Bit layout:
    /// - Bits 0-7: Raster type
    /// - Bits 8-11: [`RasterFormat`]
    /// - Bit 12: Automatic mipmap generation
    /// - Bit 13: 8-bit palette
    /// - Bit 14: 4-bit palette
    /// - Bit 15: Has mipmaps
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RasterFlags(u32);
    impl Debug;
    u32;

    /// Raster type (texture, camera texture, ...)
    pub raster_type, set_raster_type: 7, 0;
    /// Raw [`RasterFormat`] value
    pub format_raw, set_format_raw: 11, 8;
    /// Mipmaps are generated by the runtime
    pub auto_mipmap, set_auto_mipmap: 12;
    /// 8-bit palette present
    pub pal8, set_pal8: 13;
    /// 4-bit palette present
    pub pal4, set_pal4: 14;
    /// More than one mip level is stored
    pub mipmap, set_mipmap: 15;
}

impl RasterFlags {
    #[inline]
    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// The raster format, if the nibble holds a known value.
    #[inline]
    pub fn raster_format(&self) -> Option<RasterFormat> {
        RasterFormat::from_raw(self.format_raw())
    }

    #[inline]
    pub fn set_raster_format(&mut self, format: RasterFormat) {
        self.set_format_raw(format.raw());
    }

    /// The palette type, or [`None`] when both palette bits are set.
    pub fn palette_type(&self) -> Option<PaletteType> {
        match (self.pal4(), self.pal8()) {
            (false, false) => Some(PaletteType::None),
            (true, false) => Some(PaletteType::Pal4),
            (false, true) => Some(PaletteType::Pal8),
            (true, true) => None,
        }
    }

    pub fn set_palette_type(&mut self, palette_type: PaletteType) {
        self.set_pal4(matches!(palette_type, PaletteType::Pal4 | PaletteType::Pal4Lsb));
        self.set_pal8(palette_type == PaletteType::Pal8);
    }
}
