//! Reading and writing native textures.
//!
//! The header is interpreted by one module per [`NativeTextureKind`]. The
//! palette block and the mip chain are shared by all layouts.

mod d3d8;
mod d3d9;
mod mobile;

use crate::d3d_format::D3dFormatHandler;
use crate::header::{NativeHeader, HEADER_SIZE};
use crate::kind::NativeTextureKind;
use crate::stream::TextureStream;
use crate::texture::{palette_block_size, NativeTexture};
use byteorder::{LittleEndian, WriteBytesExt};
use core::fmt;
use rwtex_common::allocate::{TexelAlloc, TexelBuffer};
use rwtex_common::error::{StructuralReason, Subsystem, TextureError, TextureResult};
use rwtex_common::format::{CompressionType, PixelFormat, RasterFlags, RasterFormat};
use rwtex_common::warning::TextureWarning;
use rwtex_dxt::{storage_dimensions, DxtVariant};
use rwtex_pixels::{expected_data_size, MipmapLayer, PixelDataTraversal, TextureContext};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, trace};

/// Reads and writes the native texture layouts.
///
/// Holds the external [`D3dFormatHandler`]s consulted for D3DFORMATs the
/// D3D9 layout does not know. Everything else is dispatched on
/// [`NativeTextureKind`].
#[derive(Clone, Default)]
pub struct NativeCodec {
    format_handlers: HashMap<u32, Arc<dyn D3dFormatHandler>>,
}

impl fmt::Debug for NativeCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.format_handlers.keys().collect();
        codes.sort();
        f.debug_struct("NativeCodec")
            .field("format_handlers", &codes)
            .finish()
    }
}

impl NativeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for the D3DFORMAT `d3d_format`.
    ///
    /// Handlers are only consulted for codes the D3D9 layout does not know.
    pub fn with_format_handler(
        mut self,
        d3d_format: u32,
        handler: Arc<dyn D3dFormatHandler>,
    ) -> Self {
        self.format_handlers.insert(d3d_format, handler);
        self
    }

    #[inline]
    pub fn format_handler(&self, d3d_format: u32) -> Option<&Arc<dyn D3dFormatHandler>> {
        self.format_handlers.get(&d3d_format)
    }

    /// Reads a texture of whichever layout the platform id names.
    pub fn deserialize_any<S: TextureStream + ?Sized>(
        &self,
        ctx: &TextureContext,
        stream: &mut S,
    ) -> TextureResult<NativeTexture> {
        let kind = NativeTextureKind::detect(stream)?;
        self.deserialize(ctx, kind, stream)
    }

    /// Reads a texture of layout `kind`.
    ///
    /// Damaged or surplus mips are reported through the context's warning
    /// sink and skipped. The stream is left after the last declared mip.
    ///
    /// # Errors
    ///
    /// - [`StructuralReason::PlatformMismatch`] when the platform id is not
    ///   the one of `kind`. Nothing is allocated in that case.
    /// - [`StructuralReason::InvalidPaletteType`] and
    ///   [`StructuralReason::InvalidPaletteDepth`] for impossible palettes.
    /// - [`StructuralReason::UnknownCompression`],
    ///   [`StructuralReason::PalettizedCompression`],
    ///   [`StructuralReason::UnknownPlatformFormat`] and
    ///   [`StructuralReason::InvalidRasterFormat`] for formats the layout
    ///   cannot describe.
    /// - [`StructuralReason::UnexpectedEndOfStream`] when the stream ends
    ///   early. The check happens before the buffer is allocated.
    /// - [`StructuralReason::EmptyTexture`] when no mip could be read.
    /// - [`TextureError::AllocationExhausted`] when the allocator fails.
    pub fn deserialize<S: TextureStream + ?Sized>(
        &self,
        ctx: &TextureContext,
        kind: NativeTextureKind,
        stream: &mut S,
    ) -> TextureResult<NativeTexture> {
        let header = read_header(stream)?;
        let owner = header.name.as_str();
        if header.platform_id != kind.platform_id() {
            return Err(structural(owner, StructuralReason::PlatformMismatch));
        }

        let palette_type = header
            .raster_flags
            .palette_type()
            .ok_or_else(|| structural(owner, StructuralReason::InvalidPaletteType))?;
        if !palette_type.is_valid_depth(header.depth as u32) {
            return Err(structural(owner, StructuralReason::InvalidPaletteDepth));
        }

        let layout = match kind {
            NativeTextureKind::D3d8 => d3d8::resolve(ctx, &header, palette_type)?,
            NativeTextureKind::D3d9 => {
                d3d9::resolve(ctx, &header, palette_type, &self.format_handlers)?
            }
            NativeTextureKind::S3tcMobile => mobile::resolve(&header, palette_type)?,
        };
        debug!(
            name = owner,
            %kind,
            width = header.width,
            height = header.height,
            mips = header.mip_count,
            format = ?layout.format,
            "parsed native texture header"
        );

        let mut pixels = PixelDataTraversal::new(layout.format);
        if layout.format.is_palettized() {
            let mut palette = read_block(ctx, stream, palette_block_size(&layout.format), owner)?;
            read_exact(stream, palette.as_mut_slice(), owner)?;
            pixels.set_palette(TexelBuffer::Owned(palette), palette_type.max_colors());
        }

        read_mipmaps(ctx, &header, &layout, &mut pixels, stream)?;
        if pixels.is_empty() {
            return Err(structural(owner, StructuralReason::EmptyTexture));
        }

        let mut auto_mipmap = layout.auto_mipmap;
        if auto_mipmap && pixels.mip_count() != 1 {
            ctx.warn(
                owner,
                TextureWarning::InvalidAutoMipmap {
                    mip_count: pixels.mip_count() as u32,
                },
            );
            auto_mipmap = false;
        }
        pixels.set_has_alpha(layout.has_alpha);

        Ok(NativeTexture {
            kind,
            name: header.name,
            mask_name: header.mask_name,
            format_info: header.format_info,
            raster_type: header.raster_type,
            auto_mipmap,
            cube_texture: layout.cube_texture,
            platform_format: header.platform_format,
            pixels,
        })
    }

    /// Writes `texture` in the layout named by its `kind`.
    ///
    /// # Errors
    ///
    /// [`TextureError::Unsupported`] when the layout cannot store the
    /// texture's pixel format or dimensions, [`TextureError::CorruptData`]
    /// when a mip does not hold the bytes its dimensions require.
    pub fn serialize<W: Write + ?Sized>(
        &self,
        texture: &NativeTexture,
        out: &mut W,
    ) -> TextureResult<()> {
        let pixels = &texture.pixels;
        let format = *pixels.format();
        if pixels.is_empty() {
            return Err(structural(&texture.name, StructuralReason::EmptyTexture));
        }

        let fields = match texture.kind {
            NativeTextureKind::D3d8 => d3d8::platform_fields(texture)?,
            NativeTextureKind::D3d9 => d3d9::platform_fields(texture, &self.format_handlers)?,
            NativeTextureKind::S3tcMobile => mobile::platform_fields(texture)?,
        };
        if fields.size_handler.is_none() {
            format.validate()?;
        }

        let too_large = |what: &str| {
            TextureError::Unsupported(format!(
                "{what} of '{}' exceeds its header field",
                texture.name
            ))
        };
        let mut raster_flags = RasterFlags::default();
        raster_flags.set_raster_type(texture.raster_type as u32);
        raster_flags.set_raster_format(format.raster_format);
        raster_flags.set_palette_type(format.palette_type);
        raster_flags.set_auto_mipmap(texture.auto_mipmap);
        raster_flags.set_mipmap(pixels.mip_count() > 1);

        let header = NativeHeader {
            platform_id: texture.kind.platform_id(),
            format_info: texture.format_info,
            name: texture.name.clone(),
            mask_name: texture.mask_name.clone(),
            raster_flags,
            platform_format: fields.platform_format,
            width: u16::try_from(texture.width()).map_err(|_| too_large("width"))?,
            height: u16::try_from(texture.height()).map_err(|_| too_large("height"))?,
            depth: u8::try_from(format.depth).map_err(|_| too_large("depth"))?,
            mip_count: u8::try_from(pixels.mip_count()).map_err(|_| too_large("mip count"))?,
            raster_type: texture.raster_type,
            platform_flags: fields.platform_flags,
        };
        out.write_all(&header.to_bytes())?;

        if format.is_palettized() {
            let size = palette_block_size(&format);
            let data = pixels.palette_data().unwrap_or_default();
            let stored = &data[..data.len().min(size)];
            out.write_all(stored)?;
            out.write_all(&vec![0u8; size - stored.len()])?;
        }

        for (level, layer) in pixels.layers().iter().enumerate() {
            let expected = match &fields.size_handler {
                Some(handler) => handler.format_data_size(layer.layer_width, layer.layer_height),
                None => expected_data_size(&format, layer.layer_width, layer.layer_height),
            };
            if layer.data_size() != expected {
                return Err(TextureError::CorruptData(format!(
                    "mip {level} of '{}' holds {} bytes, {expected} expected",
                    texture.name,
                    layer.data_size()
                )));
            }
            let size = u32::try_from(expected).map_err(|_| too_large("mip size"))?;
            out.write_u32::<LittleEndian>(size)?;
            out.write_all(layer.data())?;
        }

        debug!(
            name = %texture.name,
            kind = %texture.kind,
            mips = pixels.mip_count(),
            "wrote native texture"
        );
        Ok(())
    }
}

/// A header interpreted by one platform.
pub(crate) struct ResolvedLayout {
    pub(crate) format: PixelFormat,
    pub(crate) has_alpha: bool,
    pub(crate) cube_texture: bool,
    pub(crate) auto_mipmap: bool,
    /// Replaces the built-in size formula for external D3DFORMATs.
    pub(crate) size_handler: Option<Arc<dyn D3dFormatHandler>>,
}

impl core::fmt::Debug for ResolvedLayout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolvedLayout")
            .field("format", &self.format)
            .field("has_alpha", &self.has_alpha)
            .field("cube_texture", &self.cube_texture)
            .field("auto_mipmap", &self.auto_mipmap)
            .field("size_handler", &self.size_handler.is_some())
            .finish()
    }
}

impl ResolvedLayout {
    fn data_size(&self, width: u32, height: u32) -> usize {
        match &self.size_handler {
            Some(handler) => handler.format_data_size(width, height),
            None => expected_data_size(&self.format, width, height),
        }
    }

    fn layer(&self, texels: TexelAlloc, width: u32, height: u32) -> MipmapLayer<'static> {
        if self.format.is_compressed() {
            let (storage_width, storage_height) = storage_dimensions(width, height);
            MipmapLayer::owned(texels, storage_width, storage_height).with_layer_size(width, height)
        } else {
            MipmapLayer::owned(texels, width, height)
        }
    }
}

/// The values a platform stores at 0x4C and 0x57.
pub(crate) struct PlatformFields {
    pub(crate) platform_format: u32,
    pub(crate) platform_flags: u8,
    pub(crate) size_handler: Option<Arc<dyn D3dFormatHandler>>,
}

/// Reads every declared mip. Stops parsing at the first zero sized, damaged
/// or surplus mip and walks the rest so the stream ends after the texture.
fn read_mipmaps<S: TextureStream + ?Sized>(
    ctx: &TextureContext,
    header: &NativeHeader,
    layout: &ResolvedLayout,
    pixels: &mut PixelDataTraversal<'static>,
    stream: &mut S,
) -> TextureResult<()> {
    let owner = header.name.as_str();
    let mut stopped = false;
    let mut reached_smallest = false;

    for level in 0..header.mip_count as u32 {
        let (width, height) = mip_dimensions(header.width as u32, header.height as u32, level);
        let declared = read_u32(stream, owner)?;

        if stopped || reached_smallest {
            ctx.warn(
                owner,
                if declared == 0 {
                    TextureWarning::ZeroSizedMipmap { level }
                } else {
                    TextureWarning::MipmapRuleViolation { level }
                },
            );
            skip(stream, declared as u64, owner)?;
            stopped = true;
            continue;
        }

        if declared == 0 {
            ctx.warn(owner, TextureWarning::ZeroSizedMipmap { level });
            stopped = true;
            continue;
        }

        let expected = layout.data_size(width, height);
        if declared as usize != expected {
            ctx.warn(
                owner,
                TextureWarning::DamagedMipmap {
                    level,
                    declared,
                    expected: u32::try_from(expected).unwrap_or(u32::MAX),
                },
            );
            skip(stream, declared as u64, owner)?;
            stopped = true;
            continue;
        }

        let mut texels = read_block(ctx, stream, expected, owner)?;
        read_exact(stream, texels.as_mut_slice(), owner)?;
        trace!(level, width, height, bytes = expected, "read mip");
        pixels.push_layer(layout.layer(texels, width, height));
        reached_smallest = width == 1 && height == 1;
    }
    Ok(())
}

/// Dimensions of mip `level`. Levels past the first never shrink below 1x1.
fn mip_dimensions(width: u32, height: u32, level: u32) -> (u32, u32) {
    if level == 0 {
        return (width, height);
    }
    let shrink = |size: u32| size.checked_shr(level).unwrap_or(0).max(1);
    (shrink(width), shrink(height))
}

#[inline]
fn structural(owner: &str, reason: StructuralReason) -> TextureError {
    TextureError::structural(Subsystem::NativeTexture, owner, reason)
}

fn stream_error(owner: &str, err: io::Error) -> TextureError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        structural(owner, StructuralReason::UnexpectedEndOfStream)
    } else {
        TextureError::Io(err)
    }
}

fn ensure_available<S: TextureStream + ?Sized>(
    stream: &mut S,
    count: u64,
    owner: &str,
) -> TextureResult<()> {
    stream
        .check_read_ahead(count)
        .map_err(|err| stream_error(owner, err))
}

/// Allocates a buffer for `size` bytes the stream is known to hold.
fn read_block<S: TextureStream + ?Sized>(
    ctx: &TextureContext,
    stream: &mut S,
    size: usize,
    owner: &str,
) -> TextureResult<TexelAlloc> {
    ensure_available(stream, size as u64, owner)?;
    Ok(ctx.allocator().allocate(size)?)
}

fn read_exact<S: TextureStream + ?Sized>(
    stream: &mut S,
    buf: &mut [u8],
    owner: &str,
) -> TextureResult<()> {
    ensure_available(stream, buf.len() as u64, owner)?;
    stream
        .read_exact(buf)
        .map_err(|err| stream_error(owner, err))
}

fn read_u32<S: TextureStream + ?Sized>(stream: &mut S, owner: &str) -> TextureResult<u32> {
    let mut bytes = [0u8; 4];
    read_exact(stream, &mut bytes, owner)?;
    Ok(u32::from_le_bytes(bytes))
}

fn skip<S: TextureStream + ?Sized>(stream: &mut S, count: u64, owner: &str) -> TextureResult<()> {
    ensure_available(stream, count, owner)?;
    stream.skip(count).map_err(|err| stream_error(owner, err))
}

fn read_header<S: TextureStream + ?Sized>(stream: &mut S) -> TextureResult<NativeHeader> {
    let mut bytes = [0u8; HEADER_SIZE];
    read_exact(stream, &mut bytes, "")?;
    Ok(NativeHeader::parse(&bytes))
}

/// The raster format of a palette's entries. Only formats with a palette
/// entry size can describe one.
fn palette_entry_format(header: &NativeHeader) -> TextureResult<RasterFormat> {
    match header.raster_flags.raster_format() {
        Some(raster_format) if raster_format.palette_depth() != 0 => Ok(raster_format),
        _ => Err(structural(&header.name, StructuralReason::InvalidRasterFormat)),
    }
}

/// The format of a block compressed raster. Keeps the declared raster
/// format when it names colors, otherwise reports the variant's virtual one.
fn compressed_format(
    compression: CompressionType,
    declared: Option<RasterFormat>,
    has_alpha: bool,
) -> PixelFormat {
    let raster_format = match declared {
        Some(raster_format) if raster_format.has_color_model() => raster_format,
        _ => DxtVariant::from_compression(compression).map_or(RasterFormat::Default, |variant| {
            variant.virtual_raster_format(has_alpha)
        }),
    };
    PixelFormat::compressed(compression, raster_format)
}
