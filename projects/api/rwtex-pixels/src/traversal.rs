//! The mip chain of one texture together with its shared format and palette.

use crate::layer::MipmapLayer;
use crate::sizing::{expected_data_size, layer_row_size};
use rwtex_color::{row_slice, ColorDispatcher};
use rwtex_common::allocate::{PixelAllocator, TexelBuffer};
use rwtex_common::color_8888::Color8888;
use rwtex_common::error::{TextureError, TextureResult};
use rwtex_common::format::PixelFormat;
use rwtex_dxt::{decompress_layer, DxtVariant};
use rwtex_palette::Palette;

/// Ordered mip layers (index 0 is the largest) sharing one [`PixelFormat`]
/// and, when palettized, one palette.
///
/// Every buffer is tagged owned or borrowed. Owned buffers are released when
/// the traversal is dropped; borrowed ones are left to the caller.
#[derive(Debug)]
pub struct PixelDataTraversal<'a> {
    pub(crate) layers: Vec<MipmapLayer<'a>>,
    pub(crate) format: PixelFormat,
    pub(crate) palette: Option<TexelBuffer<'a>>,
    pub(crate) palette_size: usize,
    pub(crate) has_alpha: bool,
}

impl<'a> PixelDataTraversal<'a> {
    /// An empty traversal of `format`.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            layers: Vec::new(),
            format,
            palette: None,
            palette_size: 0,
            has_alpha: false,
        }
    }

    /// A traversal over caller owned buffers. Nothing is copied until a
    /// conversion needs to write.
    pub fn borrowed(
        format: PixelFormat,
        layers: impl IntoIterator<Item = MipmapLayer<'a>>,
        palette: Option<(&'a [u8], usize)>,
    ) -> Self {
        let mut traversal = Self::new(format);
        traversal.layers.extend(layers);
        if let Some((data, size)) = palette {
            traversal.set_palette(TexelBuffer::Borrowed(data), size);
        }
        traversal
    }

    #[inline]
    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    #[inline]
    pub fn layers(&self) -> &[MipmapLayer<'a>] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, level: usize) -> Option<&MipmapLayer<'a>> {
        self.layers.get(level)
    }

    #[inline]
    pub fn mip_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn push_layer(&mut self, layer: MipmapLayer<'a>) {
        self.layers.push(layer);
    }

    /// Drops every layer after the first `count`.
    pub fn truncate_layers(&mut self, count: usize) {
        self.layers.truncate(count);
    }

    #[inline]
    pub fn palette_data(&self) -> Option<&[u8]> {
        self.palette.as_ref().map(|p| p.as_slice())
    }

    #[inline]
    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    pub fn set_palette(&mut self, palette: TexelBuffer<'a>, palette_size: usize) {
        self.palette = Some(palette);
        self.palette_size = palette_size;
    }

    pub fn clear_palette(&mut self) {
        self.palette = None;
        self.palette_size = 0;
    }

    /// Cached result of the last alpha scan.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn set_has_alpha(&mut self, has_alpha: bool) {
        self.has_alpha = has_alpha;
    }

    /// True when the engine owns every buffer of this traversal.
    pub fn is_newly_allocated(&self) -> bool {
        self.layers.iter().all(|layer| layer.texels.is_owned())
            && self.palette.as_ref().map_or(true, |palette| palette.is_owned())
    }

    /// A color dispatcher for the texels of this traversal.
    pub fn dispatcher(&self) -> TextureResult<ColorDispatcher<'_>> {
        Ok(ColorDispatcher::new(
            &self.format,
            self.palette_data(),
            self.palette_size,
        )?)
    }

    /// The palette decoded to RGBA, or [`None`] when not palettized.
    pub fn palette_colors(&self) -> TextureResult<Option<Palette>> {
        if !self.format.is_palettized() {
            return Ok(None);
        }
        let dispatcher = self.dispatcher()?;
        let colors = (0..dispatcher.palette_size())
            .map(|index| dispatcher.palette_color(index as u8))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Palette::new(colors)))
    }

    /// Checks that every layer holds at least the bytes its dimensions require.
    pub fn validate_layer_sizes(&self) -> TextureResult<()> {
        for (level, layer) in self.layers.iter().enumerate() {
            let expected = expected_data_size(&self.format, layer.width, layer.height);
            if layer.data_size() < expected {
                return Err(TextureError::CorruptData(format!(
                    "mip {level} holds {} bytes, {expected} required",
                    layer.data_size()
                )));
            }
        }
        Ok(())
    }

    /// Scans every texel for alpha below the maximum.
    pub fn calculate_has_alpha(&self) -> TextureResult<bool> {
        if let Some(variant) = DxtVariant::from_compression(self.format.compression) {
            for layer in &self.layers {
                let mut found = false;
                decompress_layer::<TextureError>(
                    variant,
                    layer.data(),
                    layer.layer_width,
                    layer.layer_height,
                    Default::default(),
                    |_, _, color| {
                        found |= color.a != 255;
                        Ok(())
                    },
                )?;
                if found {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        if !self.format.raster_format.has_alpha_channel() {
            return Ok(false);
        }

        let dispatcher = self.dispatcher()?;
        for layer in &self.layers {
            let row_size = layer_row_size(&self.format, layer.width);
            for y in 0..layer.layer_height {
                let row = row_slice(layer.data(), row_size, y).ok_or_else(|| {
                    TextureError::CorruptData(format!("row {y} lies outside the texel buffer"))
                })?;
                for x in 0..layer.layer_width {
                    if dispatcher.get_rgba(row, x)?.a != 255 {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    /// Rescans and caches the alpha flag.
    pub fn refresh_has_alpha(&mut self) -> TextureResult<bool> {
        self.has_alpha = self.calculate_has_alpha()?;
        Ok(self.has_alpha)
    }

    /// Reads every logical texel of mip `level` as RGBA, row-major.
    pub fn read_layer_rgba(&self, level: usize) -> TextureResult<Vec<Color8888>> {
        let layer = self.layers.get(level).ok_or_else(|| {
            TextureError::Unsupported(format!("mip {level} does not exist"))
        })?;
        let count = layer.layer_width as usize * layer.layer_height as usize;

        if let Some(variant) = DxtVariant::from_compression(self.format.compression) {
            let mut texels = vec![Color8888::TRANSPARENT; count];
            let width = layer.layer_width as usize;
            decompress_layer::<TextureError>(
                variant,
                layer.data(),
                layer.layer_width,
                layer.layer_height,
                Default::default(),
                |x, y, color| {
                    texels[y as usize * width + x as usize] = color;
                    Ok(())
                },
            )?;
            return Ok(texels);
        }

        let mut texels = Vec::with_capacity(count);
        let dispatcher = self.dispatcher()?;
        let row_size = layer_row_size(&self.format, layer.width);
        for y in 0..layer.layer_height {
            let row = row_slice(layer.data(), row_size, y).ok_or_else(|| {
                TextureError::CorruptData(format!("row {y} lies outside the texel buffer"))
            })?;
            for x in 0..layer.layer_width {
                texels.push(dispatcher.get_rgba(row, x)?);
            }
        }
        Ok(texels)
    }

    /// A copy of this traversal that owns all of its buffers.
    pub fn to_owned_traversal(
        &self,
        allocator: &dyn PixelAllocator,
    ) -> TextureResult<PixelDataTraversal<'static>> {
        let layers = self
            .layers
            .iter()
            .map(|layer| layer.to_owned_layer(allocator))
            .collect::<Result<Vec<_>, _>>()?;
        let palette = match &self.palette {
            Some(palette) => Some(TexelBuffer::copy_from(allocator, palette.as_slice())?),
            None => None,
        };
        Ok(PixelDataTraversal {
            layers,
            format: self.format,
            palette,
            palette_size: self.palette_size,
            has_alpha: self.has_alpha,
        })
    }

    /// Converts into a traversal that owns all of its buffers, copying only
    /// the borrowed ones.
    pub fn into_owned(
        self,
        allocator: &dyn PixelAllocator,
    ) -> TextureResult<PixelDataTraversal<'static>> {
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in self.layers {
            layers.push(MipmapLayer {
                texels: layer.texels.into_owned(allocator)?,
                width: layer.width,
                height: layer.height,
                layer_width: layer.layer_width,
                layer_height: layer.layer_height,
            });
        }
        let palette = match self.palette {
            Some(palette) => Some(palette.into_owned(allocator)?),
            None => None,
        };
        Ok(PixelDataTraversal {
            layers,
            format: self.format,
            palette,
            palette_size: self.palette_size,
            has_alpha: self.has_alpha,
        })
    }
}
