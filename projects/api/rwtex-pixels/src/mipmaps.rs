//! Mip chain generation for raw rasters.

use crate::context::TextureContext;
use crate::layer::MipmapLayer;
use crate::sizing::layer_row_size;
use crate::traversal::PixelDataTraversal;
use rwtex_color::{row_slice_mut, write_palette_index};
use rwtex_common::color_8888::Color8888;
use rwtex_common::error::{TextureError, TextureResult};
use tracing::debug;

/// Appends mips to `traversal` until it holds `max_levels` layers or the
/// last one is 1x1. Each new mip is a 2x2 box filter of the previous one.
///
/// Palettized traversals map the filtered colors back onto their palette.
/// Returns the number of layers added.
///
/// # Errors
///
/// Compressed traversals are [`TextureError::Unsupported`]; convert them to
/// a raw format first.
pub fn generate_mipmaps(
    ctx: &TextureContext,
    traversal: &mut PixelDataTraversal<'_>,
    max_levels: usize,
) -> TextureResult<usize> {
    if traversal.format.is_compressed() {
        return Err(TextureError::Unsupported(format!(
            "mipmap generation for {} rasters",
            traversal.format.compression
        )));
    }
    if traversal.is_empty() {
        return Ok(0);
    }
    traversal.validate_layer_sizes()?;
    let palette = traversal.palette_colors()?;

    let mut added = 0;
    while traversal.mip_count() < max_levels {
        let level = traversal.mip_count() - 1;
        let Some(last) = traversal.layer(level) else {
            break;
        };
        let (width, height) = (last.layer_width, last.layer_height);
        if width == 0 || height == 0 || (width == 1 && height == 1) {
            break;
        }
        let (next_width, next_height) = ((width / 2).max(1), (height / 2).max(1));

        let source = traversal.read_layer_rgba(level)?;
        let filtered = box_filter(&source, width, height, next_width, next_height);

        let format = traversal.format;
        let row_size = layer_row_size(&format, next_width);
        let mut alloc = ctx.allocator().allocate(row_size * next_height as usize)?;
        {
            let dispatcher = traversal.dispatcher()?;
            let out = alloc.as_mut_slice();
            for y in 0..next_height {
                let row = row_slice_mut(out, row_size, y).ok_or_else(|| {
                    TextureError::CorruptData(format!("row {y} lies outside the texel buffer"))
                })?;
                for x in 0..next_width {
                    let color = filtered[(y * next_width + x) as usize];
                    match &palette {
                        Some(palette) => write_palette_index(
                            row,
                            x,
                            format.depth,
                            format.palette_type,
                            palette.closest_link(color) as u8,
                        )?,
                        None => dispatcher.set_rgba(row, x, color)?,
                    }
                }
            }
        }

        traversal.push_layer(MipmapLayer::owned(alloc, next_width, next_height));
        added += 1;
    }

    debug!(added, mips = traversal.mip_count(), "generated mipmaps");
    Ok(added)
}

/// Averages each 2x2 footprint of `source`. Footprints crossing the edge of
/// an odd-sized source reuse the last row or column.
fn box_filter(
    source: &[Color8888],
    width: u32,
    height: u32,
    next_width: u32,
    next_height: u32,
) -> Vec<Color8888> {
    let texel = |x: u32, y: u32| source[(y.min(height - 1) * width + x.min(width - 1)) as usize];
    let mut out = Vec::with_capacity((next_width * next_height) as usize);
    for y in 0..next_height {
        for x in 0..next_width {
            let footprint = [
                texel(x * 2, y * 2),
                texel(x * 2 + 1, y * 2),
                texel(x * 2, y * 2 + 1),
                texel(x * 2 + 1, y * 2 + 1),
            ];
            let mut sums = [0u32; 4];
            for color in footprint {
                for (sum, channel) in sums.iter_mut().zip(color.to_array()) {
                    *sum += channel as u32;
                }
            }
            out.push(Color8888::from_array(sums.map(|sum| ((sum + 2) / 4) as u8)));
        }
    }
    out
}
