//! The per-texel color model of one pixel format.

use crate::abstract_color::{luminance_of, AbstractColor, ColorF32};
use crate::error::{ColorModelError, ColorModelResult};
use crate::layout::TexelLayout;
use crate::palette_index::{read_palette_index, write_palette_index};
use rwtex_common::color_8888::Color8888;
use rwtex_common::format::{PaletteType, PixelFormat, RasterFormat};

/// A resolved palette: entry layout, bytes per entry and entry count.
#[derive(Debug, Clone, Copy)]
struct PaletteView<'p> {
    data: &'p [u8],
    layout: TexelLayout,
    entry_size: usize,
    size: usize,
}

/// Reads and writes texels of one [`PixelFormat`].
///
/// For palettized formats color reads resolve the palette index and then
/// read the entry using the palette's raster format. Color writes are
/// refused on palettized rows; indices go through
/// [`ColorDispatcher::set_palette_index`].
#[derive(Debug, Clone, Copy)]
pub struct ColorDispatcher<'p> {
    raster_format: RasterFormat,
    depth: u32,
    palette_type: PaletteType,
    /// `None` for formats without a color model.
    layout: Option<TexelLayout>,
    palette: Option<PaletteView<'p>>,
}

impl<'p> ColorDispatcher<'p> {
    /// Creates a dispatcher for `format`.
    ///
    /// # Parameters
    ///
    /// - `format`: The pixel format of the rows passed to this dispatcher.
    /// - `palette`: Palette bytes, required when `format` is palettized.
    /// - `palette_size`: Number of valid entries in `palette`.
    ///
    /// # Errors
    ///
    /// Fails for compressed formats, unsupported `(raster format, depth)`
    /// pairs, and palettized formats without palette data.
    pub fn new(
        format: &PixelFormat,
        palette: Option<&'p [u8]>,
        palette_size: usize,
    ) -> ColorModelResult<Self> {
        if format.is_compressed() {
            return Err(ColorModelError::Compressed(format.compression));
        }

        let mut dispatcher = Self {
            raster_format: format.raster_format,
            depth: format.depth,
            palette_type: format.palette_type,
            layout: None,
            palette: None,
        };

        if format.is_palettized() {
            if !format.palette_type.is_valid_depth(format.depth) {
                return Err(ColorModelError::UnsupportedFormat {
                    raster_format: format.raster_format,
                    depth: format.depth,
                });
            }
            let data = palette.ok_or(ColorModelError::MissingPalette)?;
            let entry_depth = format.raster_format.palette_depth();
            let layout =
                TexelLayout::resolve(format.raster_format, entry_depth, format.color_order)?;
            let entry_size = (entry_depth / 8) as usize;
            // Never trust an entry count the buffer cannot hold.
            let size = palette_size.min(data.len() / entry_size.max(1));
            dispatcher.palette = Some(PaletteView {
                data,
                layout,
                entry_size,
                size,
            });
            return Ok(dispatcher);
        }

        match TexelLayout::resolve(format.raster_format, format.depth, format.color_order) {
            Ok(layout) => dispatcher.layout = Some(layout),
            Err(ColorModelError::NoColorModel(_)) => {}
            Err(e) => return Err(e),
        }
        Ok(dispatcher)
    }

    #[inline]
    pub fn is_palettized(&self) -> bool {
        self.palette.is_some()
    }

    /// Number of usable palette entries, or 0 when not palettized.
    #[inline]
    pub fn palette_size(&self) -> usize {
        self.palette.map_or(0, |p| p.size)
    }

    /// Reads texel `x` of `row` as an abstract color.
    pub fn get_color(&self, row: &[u8], x: u32) -> ColorModelResult<AbstractColor> {
        if let Some(palette) = &self.palette {
            let index = read_palette_index(row, x, self.depth, self.palette_type)?;
            return Self::palette_entry(palette, index);
        }
        self.direct_layout()?.get_color(row, x)
    }

    /// Writes texel `x` of `row`. Refused for palettized formats.
    pub fn set_color(&self, row: &mut [u8], x: u32, color: AbstractColor) -> ColorModelResult<()> {
        if self.palette.is_some() {
            return Err(ColorModelError::PalettizedWrite);
        }
        self.direct_layout()?.set_color(row, x, color)
    }

    /// Reads texel `x` as RGBA; luminance expands to grey.
    #[inline]
    pub fn get_rgba(&self, row: &[u8], x: u32) -> ColorModelResult<Color8888> {
        Ok(self.get_color(row, x)?.to_rgba())
    }

    #[inline]
    pub fn set_rgba(&self, row: &mut [u8], x: u32, color: Color8888) -> ColorModelResult<()> {
        self.set_color(row, x, AbstractColor::Rgba(color))
    }

    /// Reads texel `x` as `(luminance, alpha)`; RGB averages its channels.
    #[inline]
    pub fn get_luminance(&self, row: &[u8], x: u32) -> ColorModelResult<(u8, u8)> {
        Ok(self.get_color(row, x)?.to_luminance())
    }

    #[inline]
    pub fn set_luminance(
        &self,
        row: &mut [u8],
        x: u32,
        lum: u8,
        alpha: u8,
    ) -> ColorModelResult<()> {
        self.set_color(row, x, AbstractColor::Luminance { lum, alpha })
    }

    /// Reads texel `x` as fractions of each channel's maximum.
    pub fn get_rgba_normalized(&self, row: &[u8], x: u32) -> ColorModelResult<ColorF32> {
        let channels = match &self.palette {
            Some(palette) => {
                let index = read_palette_index(row, x, self.depth, self.palette_type)?;
                let entry = Self::entry_bytes(palette, index)?;
                palette.layout.get_normalized(entry, 0)?
            }
            None => self.direct_layout()?.get_normalized(row, x)?,
        };
        Ok(channels.into())
    }

    pub fn set_rgba_normalized(
        &self,
        row: &mut [u8],
        x: u32,
        color: ColorF32,
    ) -> ColorModelResult<()> {
        if self.palette.is_some() {
            return Err(ColorModelError::PalettizedWrite);
        }
        self.direct_layout()?.set_normalized(row, x, color.into())
    }

    /// Reads the raw palette index of texel `x`.
    #[inline]
    pub fn get_palette_index(&self, row: &[u8], x: u32) -> ColorModelResult<u8> {
        read_palette_index(row, x, self.depth, self.palette_type)
    }

    /// Writes the raw palette index of texel `x`, validating it against the palette size.
    pub fn set_palette_index(&self, row: &mut [u8], x: u32, index: u8) -> ColorModelResult<()> {
        let palette = self.palette.as_ref().ok_or(ColorModelError::NotPalettized)?;
        if index as usize >= palette.size {
            return Err(ColorModelError::PaletteIndexOutOfRange {
                index: index as u32,
                palette_size: palette.size,
            });
        }
        write_palette_index(row, x, self.depth, self.palette_type, index)
    }

    /// Reads palette entry `index` as an RGBA color.
    pub fn palette_color(&self, index: u8) -> ColorModelResult<Color8888> {
        let palette = self.palette.as_ref().ok_or(ColorModelError::NotPalettized)?;
        Ok(Self::palette_entry(palette, index)?.to_rgba())
    }

    /// Luminance of texel `x` computed from RGB as an unweighted average.
    #[inline]
    pub fn get_average_luminance(&self, row: &[u8], x: u32) -> ColorModelResult<u8> {
        Ok(luminance_of(self.get_rgba(row, x)?))
    }

    fn direct_layout(&self) -> ColorModelResult<&TexelLayout> {
        self.layout
            .as_ref()
            .ok_or(ColorModelError::NoColorModel(self.raster_format))
    }

    fn entry_bytes<'a>(palette: &'a PaletteView<'_>, index: u8) -> ColorModelResult<&'a [u8]> {
        let index = index as usize;
        if index >= palette.size {
            return Err(ColorModelError::PaletteIndexOutOfRange {
                index: index as u32,
                palette_size: palette.size,
            });
        }
        let start = index * palette.entry_size;
        palette
            .data
            .get(start..start + palette.entry_size)
            .ok_or(ColorModelError::PaletteIndexOutOfRange {
                index: index as u32,
                palette_size: palette.size,
            })
    }

    fn palette_entry(palette: &PaletteView<'_>, index: u8) -> ColorModelResult<AbstractColor> {
        let entry = Self::entry_bytes(palette, index)?;
        palette.layout.get_color(entry, 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    const TEST_COLORS: [Color8888; 4] = [
        Color8888::new(0, 0, 0, 255),
        Color8888::new(255, 255, 255, 0),
        Color8888::new(255, 0, 128, 64),
        Color8888::new(17, 34, 51, 255),
    ];

    /// Expected read-back of `color` after storing it in `format`.
    fn quantize(format: RasterFormat, depth: u32, color: Color8888) -> Color8888 {
        let q = |v: u8, bits: u32| scale_channel(scale_channel(v as u32, 8, bits), bits, 8) as u8;
        match (format, depth) {
            (RasterFormat::Format1555, _) => {
                Color8888::new(q(color.r, 5), q(color.g, 5), q(color.b, 5), q(color.a, 1))
            }
            (RasterFormat::Format565, _) => {
                Color8888::new(q(color.r, 5), q(color.g, 6), q(color.b, 5), 255)
            }
            (RasterFormat::Format555, _) => {
                Color8888::new(q(color.r, 5), q(color.g, 5), q(color.b, 5), 255)
            }
            (RasterFormat::Format4444, _) => {
                Color8888::new(q(color.r, 4), q(color.g, 4), q(color.b, 4), q(color.a, 4))
            }
            (RasterFormat::Format8888, _) => color,
            (RasterFormat::Format888, _) => Color8888::new(color.r, color.g, color.b, 255),
            (RasterFormat::Luminance, 4) => {
                let l = q(luminance_of(color), 4);
                Color8888::new(l, l, l, 255)
            }
            (RasterFormat::Luminance, _) => {
                let l = luminance_of(color);
                Color8888::new(l, l, l, 255)
            }
            (RasterFormat::LuminanceAlpha, 8) => {
                let l = q(luminance_of(color), 4);
                Color8888::new(l, l, l, q(color.a, 4))
            }
            (RasterFormat::LuminanceAlpha, _) => {
                let l = luminance_of(color);
                Color8888::new(l, l, l, color.a)
            }
            _ => unreachable!(),
        }
    }

    #[rstest]
    #[case(RasterFormat::Format1555, 16)]
    #[case(RasterFormat::Format565, 16)]
    #[case(RasterFormat::Format555, 16)]
    #[case(RasterFormat::Format4444, 16)]
    #[case(RasterFormat::Format8888, 32)]
    #[case(RasterFormat::Format888, 24)]
    #[case(RasterFormat::Format888, 32)]
    #[case(RasterFormat::Luminance, 4)]
    #[case(RasterFormat::Luminance, 8)]
    #[case(RasterFormat::LuminanceAlpha, 8)]
    #[case(RasterFormat::LuminanceAlpha, 16)]
    fn set_then_get_returns_representable_color(
        #[case] raster_format: RasterFormat,
        #[case] depth: u32,
    ) {
        for &order in ColorOrder::all_values() {
            let format = PixelFormat::raw(raster_format, depth, order);
            let dispatcher = ColorDispatcher::new(&format, None, 0).unwrap();
            let mut row = vec![0u8; row_size(4, depth, 4)];

            for (x, color) in TEST_COLORS.iter().enumerate() {
                dispatcher.set_rgba(&mut row, x as u32, *color).unwrap();
            }
            for (x, color) in TEST_COLORS.iter().enumerate() {
                assert_eq!(
                    dispatcher.get_rgba(&row, x as u32).unwrap(),
                    quantize(raster_format, depth, *color),
                    "{raster_format} depth {depth} order {order} texel {x}"
                );
            }
        }
    }

    #[test]
    fn palettized_reads_go_through_palette() {
        let palette = [
            10u8, 20, 30, 255, // entry 0
            40, 50, 60, 128, // entry 1
        ];
        let format = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal4,
            4,
            ColorOrder::Rgba,
        );
        let dispatcher = ColorDispatcher::new(&format, Some(&palette), 2).unwrap();

        let row = [0x01u8];
        assert_eq!(
            dispatcher.get_rgba(&row, 0).unwrap(),
            Color8888::new(10, 20, 30, 255)
        );
        assert_eq!(
            dispatcher.get_rgba(&row, 1).unwrap(),
            Color8888::new(40, 50, 60, 128)
        );
    }

    #[test]
    fn out_of_range_index_fails() {
        let palette = [0u8; 8];
        let format = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        let dispatcher = ColorDispatcher::new(&format, Some(&palette), 2).unwrap();

        assert_eq!(
            dispatcher.get_rgba(&[5u8], 0),
            Err(ColorModelError::PaletteIndexOutOfRange {
                index: 5,
                palette_size: 2
            })
        );
        let mut row = [0u8];
        assert!(dispatcher.set_palette_index(&mut row, 0, 2).is_err());
        assert!(dispatcher.set_palette_index(&mut row, 0, 1).is_ok());
        assert_eq!(row, [1]);
    }

    #[test]
    fn palette_size_is_clamped_to_buffer() {
        let palette = [0u8; 8];
        let format = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        let dispatcher = ColorDispatcher::new(&format, Some(&palette), 256).unwrap();
        assert_eq!(dispatcher.palette_size(), 2);
    }

    #[test]
    fn palettized_rows_refuse_color_writes() {
        let palette = [0u8; 64];
        let format = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        let dispatcher = ColorDispatcher::new(&format, Some(&palette), 16).unwrap();
        let mut row = [0u8; 4];
        assert_eq!(
            dispatcher.set_rgba(&mut row, 0, Color8888::default()),
            Err(ColorModelError::PalettizedWrite)
        );
    }

    #[test]
    fn depth_formats_fail_on_get_color() {
        let format = PixelFormat::raw(RasterFormat::Depth16, 16, ColorOrder::Rgba);
        let dispatcher = ColorDispatcher::new(&format, None, 0).unwrap();
        assert_eq!(
            dispatcher.get_color(&[0u8; 2], 0),
            Err(ColorModelError::NoColorModel(RasterFormat::Depth16))
        );
    }

    #[test]
    fn unsupported_depth_fails_on_creation() {
        let format = PixelFormat::raw(RasterFormat::Format565, 32, ColorOrder::Rgba);
        assert!(ColorDispatcher::new(&format, None, 0).is_err());
    }

    #[test]
    fn missing_palette_fails_on_creation() {
        let format = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        assert_eq!(
            ColorDispatcher::new(&format, None, 0).unwrap_err(),
            ColorModelError::MissingPalette
        );
    }

    #[test]
    fn luminance_from_rgb_is_average() {
        let format = PixelFormat::raw(RasterFormat::Luminance, 8, ColorOrder::Rgba);
        let dispatcher = ColorDispatcher::new(&format, None, 0).unwrap();
        let mut row = [0u8; 4];
        dispatcher
            .set_rgba(&mut row, 0, Color8888::new(30, 60, 90, 255))
            .unwrap();
        assert_eq!(row[0], 60);
        assert_eq!(dispatcher.get_luminance(&row, 0).unwrap(), (60, 255));
    }

    #[test]
    fn float_colors_map_to_channel_extremes() {
        let format = PixelFormat::raw(RasterFormat::Format1555, 16, ColorOrder::Bgra);
        let dispatcher = ColorDispatcher::new(&format, None, 0).unwrap();
        let mut row = [0u8; 2];
        dispatcher
            .set_rgba_normalized(&mut row, 0, ColorF32::new(1.0, 0.0, 1.0, 0.0))
            .unwrap();
        assert_eq!(
            dispatcher.get_rgba(&row, 0).unwrap(),
            Color8888::new(255, 0, 255, 0)
        );
        assert_eq!(
            dispatcher.get_rgba_normalized(&row, 0).unwrap(),
            ColorF32::new(1.0, 0.0, 1.0, 0.0)
        );
    }
}
