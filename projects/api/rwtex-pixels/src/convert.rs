//! Converts a whole mip chain between pixel formats.
//!
//! A conversion runs in up to three stages:
//!
//! 1. A compressed source is decompressed into [`PixelFormat::intermediate`].
//! 2. Raw texels are recolored, repacked or requantized into the target format.
//! 3. A compressed target is compressed from the raw texels.
//!
//! When the byte layout of source and target is identical, stage 2 rewrites
//! the texels in place and allocates nothing (unless a borrowed buffer has
//! to be copied first).
//!
//! Every stage builds its layers before replacing the old ones, so an error
//! leaves the traversal in its previous format. The only exception is the
//! in-place rewrite, which converts mip by mip; its buffers are prepared
//! before the first texel is touched.
//!
//! Index rasters of the same depth and row alignment are byte-identical at
//! depth 8, so repacking between them only retags the format.

use crate::context::TextureContext;
use crate::layer::MipmapLayer;
use crate::sizing::layer_row_size;
use crate::traversal::PixelDataTraversal;
use rwtex_color::{
    read_palette_index, row_slice, row_slice_mut, write_palette_index, ColorDispatcher,
};
use rwtex_common::allocate::TexelBuffer;
use rwtex_common::endian::Endianness;
use rwtex_common::error::{StructuralReason, Subsystem, TextureError, TextureResult};
use rwtex_common::format::PixelFormat;
use rwtex_dxt::{
    compress_layer, compressed_data_size, decompress_layer, storage_dimensions, DxtVariant,
};
use rwtex_palette::{max_palette_colors, Palette};
use tracing::debug;

/// Converts every mip of `traversal` to `dst`.
///
/// Returns `Ok(false)` when nothing had to be done: the traversal is empty,
/// already in `dst`, or its first mip could not be decompressed. In the last
/// case the traversal is left untouched.
///
/// # Errors
///
/// - [`TextureError::Unsupported`] when `dst` is not a valid format or a
///   texel cannot be represented (for example depth-only rasters).
/// - [`TextureError::CorruptData`] when texel buffers are shorter than their
///   dimensions require.
/// - [`TextureError::AllocationExhausted`] when the allocator fails.
pub fn convert_pixel_data(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    dst: &PixelFormat,
) -> TextureResult<bool> {
    dst.validate()?;
    let src = traversal.format;
    if traversal.is_empty() || src == *dst {
        return Ok(false);
    }
    if src.is_compressed() && src.compression == dst.compression {
        return Ok(false);
    }
    debug!(
        src = ?src,
        dst = ?dst,
        mips = traversal.mip_count(),
        "converting pixel data"
    );

    if src.is_compressed() {
        if !decompress_chain(ctx, traversal)? {
            return Ok(false);
        }
        if traversal.format == *dst {
            return Ok(true);
        }
    }

    match DxtVariant::from_compression(dst.compression) {
        Some(variant) => compress_chain(ctx, traversal, variant)?,
        None => convert_raw(ctx, traversal, dst)?,
    }
    Ok(true)
}

/// Remaps every mip of `traversal` onto an existing palette.
///
/// `palette` holds `palette_size` entries encoded in `dst.raster_format`.
/// Each texel receives the index of its closest palette entry, and a copy of
/// the palette becomes the traversal's palette. Compressed sources are
/// decompressed first.
pub fn remap_to_palette(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    dst: &PixelFormat,
    palette: &[u8],
    palette_size: usize,
) -> TextureResult<()> {
    dst.validate()?;
    if !dst.is_palettized() {
        return Err(TextureError::Unsupported(format!(
            "remapping onto a palette needs a palettized target, got {}",
            dst.palette_type
        )));
    }
    if palette_size == 0 || palette_size > max_palette_colors(dst.palette_type) {
        return Err(TextureError::Unsupported(format!(
            "{palette_size} palette entries for a {} target",
            dst.palette_type
        )));
    }
    let entry_size = (dst.raster_format.palette_depth() / 8) as usize;
    let palette_bytes = palette.get(..palette_size * entry_size).ok_or_else(|| {
        TextureError::CorruptData(format!(
            "palette of {palette_size} entries needs {} bytes, {} given",
            palette_size * entry_size,
            palette.len()
        ))
    })?;
    if traversal.is_empty() {
        return Ok(());
    }

    if traversal.format.is_compressed() && !decompress_chain(ctx, traversal)? {
        return Err(TextureError::structural(
            Subsystem::Conversion,
            "pixel data",
            StructuralReason::DecompressionFailed,
        ));
    }
    traversal.validate_layer_sizes()?;

    let dispatcher = ColorDispatcher::new(dst, Some(palette_bytes), palette_size)?;
    let target = Palette::new(
        (0..palette_size)
            .map(|index| dispatcher.palette_color(index as u8))
            .collect::<Result<Vec<_>, _>>()?,
    );

    let layers = {
        let src_dispatcher = traversal.dispatcher()?;
        let src_format = traversal.format;
        let mut layers = Vec::with_capacity(traversal.layers.len());
        for layer in &traversal.layers {
            let row_size = layer_row_size(&src_format, layer.width);
            let data = layer.data();
            layers.push(index_layer(ctx, dst, layer, |x, y| {
                let color = src_dispatcher.get_rgba(src_row(data, row_size, y)?, x)?;
                Ok(target.closest_link(color) as u8)
            })?);
        }
        layers
    };

    let palette = TexelBuffer::copy_from(ctx.allocator(), palette_bytes)?;
    commit(traversal, layers, *dst, Some((palette, palette_size)))?;
    debug!(palette_size, "remapped pixel data onto palette");
    Ok(())
}

/// Decompresses every mip into the intermediate format.
///
/// Returns `Ok(false)` without touching the traversal when mip 0 cannot be
/// decoded. Failures on later mips, and allocation failures, are errors.
fn decompress_chain(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
) -> TextureResult<bool> {
    let Some(variant) = DxtVariant::from_compression(traversal.format.compression) else {
        return Ok(false);
    };
    let target = PixelFormat::intermediate();

    let mut layers = Vec::with_capacity(traversal.layers.len());
    for (level, layer) in traversal.layers.iter().enumerate() {
        match decompress_one(ctx, variant, &target, layer) {
            Ok(decoded) => layers.push(decoded),
            Err(err) if level == 0 && !err.is_allocation_exhausted() => {
                debug!(%err, "first mip could not be decompressed");
                return Ok(false);
            }
            Err(err) => return Err(err),
        }
    }

    traversal.layers = layers;
    traversal.format = target;
    traversal.clear_palette();
    traversal.refresh_has_alpha()?;
    Ok(true)
}

fn decompress_one<'x>(
    ctx: &TextureContext,
    variant: DxtVariant,
    target: &PixelFormat,
    layer: &MipmapLayer<'_>,
) -> TextureResult<MipmapLayer<'x>> {
    let (width, height) = (layer.layer_width, layer.layer_height);
    let row_size = layer_row_size(target, width);
    let dispatcher = ColorDispatcher::new(target, None, 0)?;

    let mut alloc = ctx.allocator().allocate(row_size * height as usize)?;
    let out = alloc.as_mut_slice();
    decompress_layer::<TextureError>(
        variant,
        layer.data(),
        width,
        height,
        Endianness::Little,
        |x, y, color| {
            dispatcher.set_rgba(dst_row(out, row_size, y)?, x, color)?;
            Ok(())
        },
    )?;
    Ok(MipmapLayer::owned(alloc, width, height))
}

/// Compresses every raw mip. Palettized sources are resolved through their palette.
fn compress_chain(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    variant: DxtVariant,
) -> TextureResult<()> {
    traversal.validate_layer_sizes()?;
    let has_alpha = traversal.calculate_has_alpha()?;
    let punch_through =
        variant == DxtVariant::Dxt1 && ctx.config().dxt_punch_through && has_alpha;
    let keeps_alpha = match variant {
        DxtVariant::Dxt1 => punch_through,
        _ => has_alpha,
    };

    let layers = {
        let dispatcher = traversal.dispatcher()?;
        let src_format = traversal.format;
        let mut layers = Vec::with_capacity(traversal.layers.len());
        for layer in &traversal.layers {
            let (width, height) = (layer.layer_width, layer.layer_height);
            let (storage_width, storage_height) = storage_dimensions(width, height);
            let row_size = layer_row_size(&src_format, layer.width);
            let data = layer.data();

            let mut alloc = ctx
                .allocator()
                .allocate(compressed_data_size(variant, width, height))?;
            compress_layer::<TextureError>(
                variant,
                width,
                height,
                ctx.block_compressor(),
                punch_through,
                Endianness::Little,
                |x, y| Ok(dispatcher.get_rgba(src_row(data, row_size, y)?, x)?),
                alloc.as_mut_slice(),
            )?;
            layers.push(
                MipmapLayer::owned(alloc, storage_width, storage_height)
                    .with_layer_size(width, height),
            );
        }
        layers
    };

    traversal.layers = layers;
    traversal.format = PixelFormat::compressed(
        variant.compression(),
        variant.virtual_raster_format(keeps_alpha),
    );
    traversal.clear_palette();
    traversal.has_alpha = keeps_alpha;
    debug!(?variant, punch_through, "compressed pixel data");
    Ok(())
}

/// Raw to raw conversion.
fn convert_raw(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    dst: &PixelFormat,
) -> TextureResult<()> {
    traversal.validate_layer_sizes()?;
    let src = traversal.format;

    if !dst.is_palettized() {
        return recolor(ctx, traversal, dst);
    }
    if src.is_palettized()
        && src.has_same_color_encoding(dst)
        && traversal.palette_size <= max_palette_colors(dst.palette_type)
    {
        return repack(ctx, traversal, dst);
    }
    requantize(ctx, traversal, dst)
}

/// Rewrites every texel through two dispatchers. No palette on the target.
fn recolor(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    dst: &PixelFormat,
) -> TextureResult<()> {
    let src = traversal.format;
    let dst_dispatcher = ColorDispatcher::new(dst, None, 0)?;

    if src.has_same_byte_layout(dst) && !src.is_palettized() {
        let alpha_neutral = src.raster_format == dst.raster_format;
        let src_dispatcher = ColorDispatcher::new(&src, None, 0)?;
        for layer in traversal.layers.iter_mut() {
            layer.texels.make_mut(ctx.allocator())?;
        }
        for layer in traversal.layers.iter_mut() {
            let row_size = layer_row_size(&src, layer.width);
            let (width, height) = (layer.layer_width, layer.layer_height);
            let data = layer.texels.make_mut(ctx.allocator())?;
            for y in 0..height {
                let row = dst_row(data, row_size, y)?;
                for x in 0..width {
                    let color = src_dispatcher.get_color(row, x)?;
                    dst_dispatcher.set_color(row, x, color)?;
                }
            }
        }
        debug!(alpha_neutral, "recolored pixel data in place");
        traversal.format = *dst;
        traversal.clear_palette();
        // Permuting channels cannot change any alpha value.
        if alpha_neutral {
            return Ok(());
        }
        update_alpha(traversal)
    } else {
        let layers = {
            let src_dispatcher = traversal.dispatcher()?;
            let mut layers = Vec::with_capacity(traversal.layers.len());
            for layer in &traversal.layers {
                let src_row_size = layer_row_size(&src, layer.width);
                let dst_row_size = layer_row_size(dst, layer.width);
                let data = layer.data();

                let mut alloc = ctx
                    .allocator()
                    .allocate(dst_row_size * layer.height as usize)?;
                let out = alloc.as_mut_slice();
                for y in 0..layer.layer_height {
                    let row = src_row(data, src_row_size, y)?;
                    let target = dst_row(out, dst_row_size, y)?;
                    for x in 0..layer.layer_width {
                        let color = src_dispatcher.get_color(row, x)?;
                        dst_dispatcher.set_color(target, x, color)?;
                    }
                }
                layers.push(layer_like(layer, TexelBuffer::Owned(alloc)));
            }
            layers
        };
        commit(traversal, layers, *dst, None)?;
        debug!("recolored pixel data into new buffers");
        Ok(())
    }
}

/// Changes only the index width or nibble order. The palette is kept and
/// alpha is unaffected.
fn repack(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    dst: &PixelFormat,
) -> TextureResult<()> {
    let src = traversal.format;
    let palette_size = traversal.palette_size;

    if src.depth == 8 && dst.depth == 8 && src.row_alignment == dst.row_alignment {
        for layer in &traversal.layers {
            let row_size = layer_row_size(&src, layer.width);
            let data = layer.data();
            for y in 0..layer.layer_height {
                let row = src_row(data, row_size, y)?;
                for x in 0..layer.layer_width {
                    checked_index(row, x, &src, palette_size, y)?;
                }
            }
        }
        traversal.format = *dst;
        debug!(
            from = %src.palette_type,
            to = %dst.palette_type,
            "retagged palette indices in place"
        );
        return Ok(());
    }

    let mut layers = Vec::with_capacity(traversal.layers.len());
    for layer in &traversal.layers {
        let row_size = layer_row_size(&src, layer.width);
        let data = layer.data();
        layers.push(index_layer(ctx, dst, layer, |x, y| {
            checked_index(src_row(data, row_size, y)?, x, &src, palette_size, y)
        })?);
    }

    traversal.layers = layers;
    traversal.format = *dst;
    debug!(from = %src.palette_type, to = %dst.palette_type, "repacked palette indices");
    Ok(())
}

/// Reads the index at column `x` and rejects it when it lies past the palette.
fn checked_index(
    row: &[u8],
    x: u32,
    src: &PixelFormat,
    palette_size: usize,
    y: u32,
) -> TextureResult<u8> {
    let index = read_palette_index(row, x, src.depth, src.palette_type)?;
    if index as usize >= palette_size {
        return Err(TextureError::CorruptData(format!(
            "palette index {index} at ({x}, {y}) exceeds {palette_size} entries"
        )));
    }
    Ok(index)
}

/// Builds a new palette from mip 0 and maps every mip onto it.
fn requantize(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    dst: &PixelFormat,
) -> TextureResult<()> {
    let texels = traversal.read_layer_rgba(0)?;
    let quantized = ctx
        .palette_builder()
        .build(&texels, max_palette_colors(dst.palette_type))?;
    let palette_size = quantized.palette.len();
    let palette = encode_palette(ctx, dst, &quantized.palette)?;

    let layers = {
        let src_dispatcher = traversal.dispatcher()?;
        let src_format = traversal.format;
        let mut layers = Vec::with_capacity(traversal.layers.len());
        for (level, layer) in traversal.layers.iter().enumerate() {
            if level == 0 {
                let width = layer.layer_width as usize;
                layers.push(index_layer(ctx, dst, layer, |x, y| {
                    Ok(quantized.indices[y as usize * width + x as usize])
                })?);
                continue;
            }
            let row_size = layer_row_size(&src_format, layer.width);
            let data = layer.data();
            layers.push(index_layer(ctx, dst, layer, |x, y| {
                let color = src_dispatcher.get_rgba(src_row(data, row_size, y)?, x)?;
                Ok(quantized.palette.closest_link(color) as u8)
            })?);
        }
        layers
    };

    commit(traversal, layers, *dst, Some((palette, palette_size)))?;
    debug!(
        palette_size,
        runtime = %ctx.config().palette_runtime,
        "requantized pixel data"
    );
    Ok(())
}

/// Encodes `palette` into the entry format of `dst`.
fn encode_palette<'x>(
    ctx: &TextureContext,
    dst: &PixelFormat,
    palette: &Palette,
) -> TextureResult<TexelBuffer<'x>> {
    let entry_format = PixelFormat::raw(
        dst.raster_format,
        dst.raster_format.palette_depth(),
        dst.color_order,
    )
    .with_row_alignment(0);
    let dispatcher = ColorDispatcher::new(&entry_format, None, 0)?;
    let entry_size = (entry_format.depth / 8) as usize;

    let mut alloc = ctx.allocator().allocate(entry_size * palette.len())?;
    for (entry, color) in alloc
        .as_mut_slice()
        .chunks_exact_mut(entry_size)
        .zip(palette.colors.iter())
    {
        dispatcher.set_rgba(entry, 0, *color)?;
    }
    Ok(TexelBuffer::Owned(alloc))
}

/// Allocates an index raster shaped like `layer` and fills it from `index_of`.
fn index_layer<'x>(
    ctx: &TextureContext,
    dst: &PixelFormat,
    layer: &MipmapLayer<'_>,
    mut index_of: impl FnMut(u32, u32) -> TextureResult<u8>,
) -> TextureResult<MipmapLayer<'x>> {
    let row_size = layer_row_size(dst, layer.width);
    let mut alloc = ctx.allocator().allocate(row_size * layer.height as usize)?;
    let out = alloc.as_mut_slice();
    for y in 0..layer.layer_height {
        let row = dst_row(out, row_size, y)?;
        for x in 0..layer.layer_width {
            write_palette_index(row, x, dst.depth, dst.palette_type, index_of(x, y)?)?;
        }
    }
    Ok(layer_like(layer, TexelBuffer::Owned(alloc)))
}

fn layer_like<'x>(layer: &MipmapLayer<'_>, texels: TexelBuffer<'x>) -> MipmapLayer<'x> {
    MipmapLayer {
        texels,
        width: layer.width,
        height: layer.height,
        layer_width: layer.layer_width,
        layer_height: layer.layer_height,
    }
}

/// Installs rebuilt layers, format and palette, then rescans alpha. When the
/// rescan fails, the previous state is put back before returning the error.
fn commit<'a>(
    traversal: &mut PixelDataTraversal<'a>,
    layers: Vec<MipmapLayer<'a>>,
    format: PixelFormat,
    palette: Option<(TexelBuffer<'a>, usize)>,
) -> TextureResult<()> {
    let old_layers = core::mem::replace(&mut traversal.layers, layers);
    let old_format = core::mem::replace(&mut traversal.format, format);
    let old_palette = traversal.palette.take();
    let old_palette_size = traversal.palette_size;
    match palette {
        Some((data, size)) => traversal.set_palette(data, size),
        None => traversal.clear_palette(),
    }

    if let Err(err) = update_alpha(traversal) {
        traversal.layers = old_layers;
        traversal.format = old_format;
        traversal.palette = old_palette;
        traversal.palette_size = old_palette_size;
        return Err(err);
    }
    Ok(())
}

/// Rescans alpha when the new format can hold it.
fn update_alpha(traversal: &mut PixelDataTraversal<'_>) -> TextureResult<()> {
    if traversal.format.raster_format.has_alpha_channel() {
        traversal.refresh_has_alpha()?;
    } else {
        traversal.has_alpha = false;
    }
    Ok(())
}

#[inline]
fn src_row(data: &[u8], row_size: usize, y: u32) -> TextureResult<&[u8]> {
    row_slice(data, row_size, y)
        .ok_or_else(|| TextureError::CorruptData(format!("row {y} lies outside the texel buffer")))
}

#[inline]
fn dst_row(data: &mut [u8], row_size: usize, y: u32) -> TextureResult<&mut [u8]> {
    row_slice_mut(data, row_size, y)
        .ok_or_else(|| TextureError::CorruptData(format!("row {y} lies outside the texel buffer")))
}

#[cfg(test)]
mod tests {
    use super::commit;
    use crate::test_prelude::*;
    use rwtex_palette::{ExternalQuantizer, Palette, PaletteResult, QuantizedImage};

    fn rgba_layer(width: u32, height: u32, texel: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&texel(x, y));
            }
        }
        data
    }

    fn rgba_format() -> PixelFormat {
        PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Rgba)
    }

    #[test]
    fn same_format_is_not_an_update() {
        let data = rgba_layer(4, 4, |_, _| [1, 2, 3, 4]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 4, 4)],
            None,
        );
        let ctx = TextureContext::default();
        assert!(!convert_pixel_data(&ctx, &mut traversal, &rgba_format()).unwrap());
        assert!(!traversal.is_newly_allocated());
    }

    #[test]
    fn empty_traversal_is_not_an_update() {
        let mut traversal = PixelDataTraversal::new(rgba_format());
        let dst = PixelFormat::raw(RasterFormat::Format565, 16, ColorOrder::Bgra);
        assert!(!convert_pixel_data(&TextureContext::default(), &mut traversal, &dst).unwrap());
    }

    #[test]
    fn invalid_target_is_rejected() {
        let mut traversal = PixelDataTraversal::new(rgba_format());
        let dst = PixelFormat::raw(RasterFormat::Format565, 32, ColorOrder::Bgra);
        assert!(matches!(
            convert_pixel_data(&TextureContext::default(), &mut traversal, &dst),
            Err(TextureError::Unsupported(_))
        ));
    }

    #[test]
    fn same_layout_rewrites_owned_buffers_without_allocating() {
        let allocator = Arc::new(CountingAllocator::new(DefaultAllocator));
        let ctx = TextureContext::default().with_allocator(allocator.clone());

        let data = rgba_layer(4, 2, |x, y| [x as u8, y as u8, 200, 255]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 4, 2)],
            None,
        )
        .into_owned(ctx.allocator())
        .unwrap();
        let before = allocator.allocations();

        let bgra = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Bgra);
        assert!(convert_pixel_data(&ctx, &mut traversal, &bgra).unwrap());
        assert_eq!(allocator.allocations(), before);
        assert_eq!(&traversal.layer(0).unwrap().data()[..4], &[200, 0, 0, 255]);
    }

    #[test]
    fn borrowed_texels_are_copied_before_writing() {
        let data = rgba_layer(2, 2, |_, _| [10, 20, 30, 255]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 2, 2)],
            None,
        );
        let bgra = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Bgra);
        assert!(convert_pixel_data(&TextureContext::default(), &mut traversal, &bgra).unwrap());
        assert!(traversal.is_newly_allocated());
        assert_eq!(&data[..4], &[10, 20, 30, 255]);
        assert_eq!(&traversal.layer(0).unwrap().data()[..4], &[30, 20, 10, 255]);
    }

    #[test]
    fn opaque_target_clears_alpha_flag() {
        let data = rgba_layer(2, 2, |_, _| [10, 20, 30, 7]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 2, 2)],
            None,
        );
        traversal.refresh_has_alpha().unwrap();
        assert!(traversal.has_alpha());

        let dst = PixelFormat::raw(RasterFormat::Format565, 16, ColorOrder::Bgra);
        convert_pixel_data(&TextureContext::default(), &mut traversal, &dst).unwrap();
        assert!(!traversal.has_alpha());
        assert_eq!(traversal.layer(0).unwrap().data_size(), 8);
    }

    #[rstest]
    #[case(CompressionType::Dxt1)]
    #[case(CompressionType::Dxt3)]
    #[case(CompressionType::Dxt5)]
    fn compressing_sets_virtual_tag_and_storage_size(#[case] compression: CompressionType) {
        let data = rgba_layer(6, 5, |x, _| if x < 3 { [255, 0, 0, 255] } else { [0, 0, 255, 255] });
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 6, 5)],
            None,
        );
        let dst = PixelFormat::compressed(compression, RasterFormat::Format565);
        assert!(convert_pixel_data(&TextureContext::default(), &mut traversal, &dst).unwrap());

        let layer = traversal.layer(0).unwrap();
        assert_eq!((layer.width, layer.height), (8, 8));
        assert_eq!((layer.layer_width, layer.layer_height), (6, 5));
        assert_eq!(traversal.format().row_alignment, 0);
        assert_eq!(traversal.format().depth, 16);
        assert!(!traversal.has_alpha());
        let variant = DxtVariant::from_compression(compression).unwrap();
        assert_eq!(
            traversal.format().raster_format,
            variant.virtual_raster_format(false)
        );
    }

    #[test]
    fn undecodable_first_mip_leaves_traversal_untouched() {
        // Too short for a single DXT5 block.
        let data = [0u8; 8];
        let format = PixelFormat::compressed(CompressionType::Dxt5, RasterFormat::Format4444);
        let mut traversal =
            PixelDataTraversal::borrowed(format, [MipmapLayer::borrowed(&data, 4, 4)], None);
        let ctx = TextureContext::default();
        assert!(!convert_pixel_data(&ctx, &mut traversal, &rgba_format()).unwrap());
        assert_eq!(*traversal.format(), format);
        assert!(!traversal.is_newly_allocated());
    }

    #[test]
    fn recompressing_to_the_same_variant_is_not_an_update() {
        let data = [0u8; 8];
        let format = PixelFormat::compressed(CompressionType::Dxt1, RasterFormat::Format565);
        let mut traversal =
            PixelDataTraversal::borrowed(format, [MipmapLayer::borrowed(&data, 4, 4)], None);
        let dst = PixelFormat::compressed(CompressionType::Dxt1, RasterFormat::Format1555);
        assert!(!convert_pixel_data(&TextureContext::default(), &mut traversal, &dst).unwrap());
    }

    #[test]
    fn pal8_to_pal4_repacks_indices_and_keeps_palette() {
        let palette = [
            255u8, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
        ];
        let indices = [0u8, 1, 2, 1];
        let src = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        )
        .with_row_alignment(1);
        let mut traversal = PixelDataTraversal::borrowed(
            src,
            [MipmapLayer::borrowed(&indices, 4, 1)],
            Some((&palette, 3)),
        );

        let dst = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal4,
            4,
            ColorOrder::Rgba,
        )
        .with_row_alignment(1);
        assert!(convert_pixel_data(&TextureContext::default(), &mut traversal, &dst).unwrap());
        assert_eq!(traversal.layer(0).unwrap().data(), &[0x01, 0x21]);
        assert_eq!(traversal.palette_data(), Some(&palette[..]));
        assert_eq!(traversal.palette_size(), 3);
    }

    #[test]
    fn repack_rejects_index_outside_palette() {
        let palette = [0u8; 8];
        let indices = [0u8, 5];
        let src = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        )
        .with_row_alignment(1);
        let mut traversal = PixelDataTraversal::borrowed(
            src,
            [MipmapLayer::borrowed(&indices, 2, 1)],
            Some((&palette, 2)),
        );
        let dst = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal4Lsb,
            4,
            ColorOrder::Rgba,
        );
        assert!(matches!(
            convert_pixel_data(&TextureContext::default(), &mut traversal, &dst),
            Err(TextureError::CorruptData(_))
        ));
        assert_eq!(*traversal.format(), src);
    }

    #[test]
    fn remap_uses_given_palette_for_every_mip() {
        let mip0 = rgba_layer(2, 2, |x, _| {
            if x == 0 {
                [250, 5, 5, 255]
            } else {
                [5, 5, 250, 255]
            }
        });
        let mip1 = rgba_layer(1, 1, |_, _| [5, 5, 240, 255]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&mip0, 2, 2), MipmapLayer::borrowed(&mip1, 1, 1)],
            None,
        );
        let palette = [
            0u8, 0, 255, 255, // blue
            255, 0, 0, 255, // red
        ];
        let dst = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        remap_to_palette(&TextureContext::default(), &mut traversal, &dst, &palette, 2).unwrap();

        assert_eq!(&traversal.layer(0).unwrap().data()[..2], &[1, 0]);
        assert_eq!(traversal.layer(1).unwrap().data()[0], 0);
        assert_eq!(traversal.palette_size(), 2);
        assert!(traversal.is_newly_allocated());
    }

    #[test]
    fn remap_rejects_oversized_palette() {
        let mut traversal = PixelDataTraversal::new(rgba_format());
        let dst = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal4,
            4,
            ColorOrder::Rgba,
        );
        let palette = [0u8; 17 * 4];
        assert!(matches!(
            remap_to_palette(&TextureContext::default(), &mut traversal, &dst, &palette, 17),
            Err(TextureError::Unsupported(_))
        ));
    }

    #[test]
    fn pal4_to_pal8_at_depth_eight_retags_without_allocating() {
        let allocator = Arc::new(CountingAllocator::new(DefaultAllocator));
        let ctx = TextureContext::default().with_allocator(allocator.clone());
        let palette = [
            255u8, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
        ];
        let indices = [0u8, 1, 2, 1];
        let src = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal4,
            8,
            ColorOrder::Rgba,
        );
        let mut traversal = PixelDataTraversal::borrowed(
            src,
            [MipmapLayer::borrowed(&indices, 4, 1)],
            Some((&palette, 3)),
        )
        .into_owned(ctx.allocator())
        .unwrap();
        let before = allocator.allocations();

        let dst = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        assert!(convert_pixel_data(&ctx, &mut traversal, &dst).unwrap());
        assert_eq!(allocator.allocations(), before);
        assert_eq!(*traversal.format(), dst);
        assert_eq!(&traversal.layer(0).unwrap().data()[..4], &indices);
        assert_eq!(traversal.palette_data(), Some(&palette[..]));
        assert_eq!(traversal.palette_size(), 3);
    }

    #[test]
    fn retag_rejects_index_outside_palette() {
        let palette = [0u8; 8];
        let indices = [0u8, 5, 0, 0];
        let src = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal8,
            8,
            ColorOrder::Rgba,
        );
        let mut traversal = PixelDataTraversal::borrowed(
            src,
            [MipmapLayer::borrowed(&indices, 2, 1)],
            Some((&palette, 2)),
        );
        let dst = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal4,
            8,
            ColorOrder::Rgba,
        );
        assert!(matches!(
            convert_pixel_data(&TextureContext::default(), &mut traversal, &dst),
            Err(TextureError::CorruptData(_))
        ));
        assert_eq!(*traversal.format(), src);
    }

    #[test]
    fn channel_permutation_keeps_cached_alpha_flag() {
        let data = rgba_layer(2, 2, |_, _| [10, 20, 30, 255]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 2, 2)],
            None,
        );
        // A rescan would find every texel opaque and clear the flag.
        traversal.set_has_alpha(true);

        let bgra = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Bgra);
        assert!(convert_pixel_data(&TextureContext::default(), &mut traversal, &bgra).unwrap());
        assert!(traversal.has_alpha());
    }

    #[test]
    fn in_place_raster_format_change_rescans_alpha() {
        let data = rgba_layer(2, 2, |_, _| [10, 20, 30, 7]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 2, 2)],
            None,
        );
        traversal.refresh_has_alpha().unwrap();
        assert!(traversal.has_alpha());

        let dst = PixelFormat::raw(RasterFormat::Format888, 32, ColorOrder::Rgba);
        assert!(convert_pixel_data(&TextureContext::default(), &mut traversal, &dst).unwrap());
        assert!(!traversal.has_alpha());
    }

    /// Answers with a two color palette and points the last texel at entry 20.
    struct OutOfRangeQuantizer;

    impl ExternalQuantizer for OutOfRangeQuantizer {
        fn name(&self) -> &str {
            "out-of-range"
        }

        fn quantize(
            &self,
            texels: &[Color8888],
            _max_colors: usize,
        ) -> PaletteResult<QuantizedImage> {
            let mut indices = vec![0u8; texels.len()];
            if let Some(last) = indices.last_mut() {
                *last = 20;
            }
            Ok(QuantizedImage {
                palette: Palette::new(vec![
                    Color8888::new(0, 0, 0, 255),
                    Color8888::new(255, 255, 255, 255),
                ]),
                indices,
            })
        }
    }

    #[test]
    fn external_indices_past_the_palette_leave_traversal_untouched() {
        let config = ConversionConfig::new().with_palette_runtime(PaletteRuntime::External);
        let ctx =
            TextureContext::new(config).with_external_quantizer(Arc::new(OutOfRangeQuantizer));
        let data = rgba_layer(4, 2, |x, y| [x as u8 * 60, y as u8 * 90, 0, 255]);
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 4, 2)],
            None,
        );

        let dst = PixelFormat::palettized(
            RasterFormat::Format8888,
            PaletteType::Pal4,
            4,
            ColorOrder::Rgba,
        );
        assert!(matches!(
            convert_pixel_data(&ctx, &mut traversal, &dst),
            Err(TextureError::CorruptData(_))
        ));
        assert_eq!(*traversal.format(), rgba_format());
        assert_eq!(traversal.layer(0).unwrap().data(), &data[..]);
        assert_eq!(traversal.palette_data(), None);
        assert!(!traversal.is_newly_allocated());
    }

    #[test]
    fn failed_alpha_rescan_restores_previous_state() {
        let data = rgba_layer(2, 2, |_, _| [1, 2, 3, 4]);
        let truncated = [0u8; 4];
        let mut traversal = PixelDataTraversal::borrowed(
            rgba_format(),
            [MipmapLayer::borrowed(&data, 2, 2)],
            None,
        );

        let bgra = PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Bgra);
        let result = commit(
            &mut traversal,
            vec![MipmapLayer::borrowed(&truncated, 2, 2)],
            bgra,
            None,
        );
        assert!(matches!(result, Err(TextureError::CorruptData(_))));
        assert_eq!(*traversal.format(), rgba_format());
        assert_eq!(traversal.layer(0).unwrap().data(), &data[..]);
    }
}
