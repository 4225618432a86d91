use crate::d3d_format::code_for_raw;
use crate::stream::TextureStream;
use core::fmt;
use derive_enum_all_values::AllValues;
use rwtex_common::error::{StructuralReason, Subsystem, TextureError, TextureResult};
use rwtex_common::format::{ColorOrder, CompressionType, PaletteType, PixelFormat, RasterFormat};

/// Platform id written by the D3D8 runtime.
pub const PLATFORM_D3D8: u32 = 8;
/// Platform id written by the D3D9 runtime.
pub const PLATFORM_D3D9: u32 = 9;
/// Platform id of S3TC compressed mobile textures.
pub const PLATFORM_S3TC_MOBILE: u32 = 12;

/// The native texture layouts this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum NativeTextureKind {
    D3d8,
    D3d9,
    S3tcMobile,
}

impl NativeTextureKind {
    pub fn from_platform_id(platform_id: u32) -> Option<Self> {
        match platform_id {
            PLATFORM_D3D8 => Some(Self::D3d8),
            PLATFORM_D3D9 => Some(Self::D3d9),
            PLATFORM_S3TC_MOBILE => Some(Self::S3tcMobile),
            _ => None,
        }
    }

    #[inline]
    pub fn platform_id(self) -> u32 {
        match self {
            Self::D3d8 => PLATFORM_D3D8,
            Self::D3d9 => PLATFORM_D3D9,
            Self::S3tcMobile => PLATFORM_S3TC_MOBILE,
        }
    }

    /// Peeks the platform id at the current stream position without consuming it.
    ///
    /// # Errors
    ///
    /// [`StructuralReason::UnexpectedEndOfStream`] when fewer than four bytes
    /// remain and [`StructuralReason::PlatformMismatch`] for unknown ids.
    pub fn detect<S: TextureStream + ?Sized>(stream: &mut S) -> TextureResult<Self> {
        let start = stream.tell()?;
        let mut id = [0u8; 4];
        if stream.check_read_ahead(4).is_err() {
            return Err(TextureError::structural(
                Subsystem::NativeTexture,
                "",
                StructuralReason::UnexpectedEndOfStream,
            ));
        }
        stream.read_exact(&mut id)?;
        stream.seek(start)?;

        Self::from_platform_id(u32::from_le_bytes(id)).ok_or_else(|| {
            TextureError::structural(
                Subsystem::NativeTexture,
                "",
                StructuralReason::PlatformMismatch,
            )
        })
    }

    /// Whether this layout stores palettes.
    #[inline]
    pub fn supports_palettes(self) -> bool {
        !matches!(self, Self::S3tcMobile)
    }

    /// Whether this layout can store `compression`.
    pub fn supports_compression(self, compression: CompressionType) -> bool {
        match self {
            Self::D3d8 | Self::D3d9 => true,
            Self::S3tcMobile => matches!(
                compression,
                CompressionType::Dxt1 | CompressionType::Dxt3 | CompressionType::Dxt5
            ),
        }
    }

    /// The pixel format a texture of this layout uses for the given
    /// description. Palettes are stored RGBA, raw texels BGRA.
    ///
    /// # Errors
    ///
    /// [`TextureError::Unsupported`] when the layout cannot store it.
    pub fn pixel_format_for(
        self,
        raster_format: RasterFormat,
        palette_type: PaletteType,
        compression: CompressionType,
    ) -> TextureResult<PixelFormat> {
        let unsupported = || {
            TextureError::Unsupported(format!(
                "{raster_format} {palette_type} {compression} rasters in {self} textures"
            ))
        };

        if compression.is_compressed() {
            if palette_type.is_palettized() || !self.supports_compression(compression) {
                return Err(unsupported());
            }
            return Ok(PixelFormat::compressed(compression, raster_format));
        }
        if self == Self::S3tcMobile {
            return Err(unsupported());
        }

        if palette_type.is_palettized() {
            if raster_format.palette_depth() == 0 {
                return Err(unsupported());
            }
            return Ok(PixelFormat::palettized(
                raster_format,
                palette_type,
                palette_type.index_depth(),
                ColorOrder::Rgba,
            ));
        }

        let depth = raster_format.natural_depth().ok_or_else(unsupported)?;
        if self == Self::D3d9 && code_for_raw(raster_format, depth, ColorOrder::Bgra).is_none() {
            return Err(unsupported());
        }
        Ok(PixelFormat::raw(raster_format, depth, ColorOrder::Bgra))
    }
}

impl fmt::Display for NativeTextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::D3d8 => "d3d8",
            Self::D3d9 => "d3d9",
            Self::S3tcMobile => "mobile",
        })
    }
}

impl core::str::FromStr for NativeTextureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "d3d8" => Ok(Self::D3d8),
            "d3d9" => Ok(Self::D3d9),
            "mobile" | "s3tc" => Ok(Self::S3tcMobile),
            _ => Err(format!(
                "Unknown platform: {s}. Valid options: d3d8, d3d9, mobile"
            )),
        }
    }
}
