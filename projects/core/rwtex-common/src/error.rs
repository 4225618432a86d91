//! Error types shared by every rwtex crate.
//!
//! [`TextureError`] is the one error type returned by the public entry
//! points. Component crates convert their own errors into it, keeping the
//! distinction between unsupported combinations, corrupt data and
//! resource exhaustion.

use crate::allocate::AllocateError;
use core::fmt;
use thiserror::Error;

/// The part of the engine that raised a structural error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    NativeTexture,
    Conversion,
    Palette,
    BlockCodec,
    ColorModel,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NativeTexture => "native texture",
            Self::Conversion => "conversion",
            Self::Palette => "palette",
            Self::BlockCodec => "block codec",
            Self::ColorModel => "color model",
        })
    }
}

/// Machine readable reason for a structural error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralReason {
    /// The stream belongs to another platform.
    PlatformMismatch,
    /// The palette type cannot be used at the declared depth.
    InvalidPaletteDepth,
    /// Both palette bits are set.
    InvalidPaletteType,
    /// The compression tag is not one of the known variants.
    UnknownCompression,
    /// A compressed raster declares a palette.
    PalettizedCompression,
    /// The platform format code is unknown and no handler is registered for it.
    UnknownPlatformFormat,
    /// The raster format or depth has no meaning for this platform.
    InvalidRasterFormat,
    /// Not a single mip level could be read.
    EmptyTexture,
    /// The stream ends before the declared data.
    UnexpectedEndOfStream,
    /// The raster could not be decompressed.
    DecompressionFailed,
}

impl StructuralReason {
    /// Stable code for callers that match on reasons textually.
    pub fn code(self) -> &'static str {
        match self {
            Self::PlatformMismatch => "platform-mismatch",
            Self::InvalidPaletteDepth => "invalid-palette-depth",
            Self::InvalidPaletteType => "invalid-palette-type",
            Self::UnknownCompression => "unknown-compression",
            Self::PalettizedCompression => "palettized-compression",
            Self::UnknownPlatformFormat => "unknown-platform-format",
            Self::InvalidRasterFormat => "invalid-raster-format",
            Self::EmptyTexture => "empty-texture",
            Self::UnexpectedEndOfStream => "unexpected-end-of-stream",
            Self::DecompressionFailed => "decompression-failed",
        }
    }
}

impl fmt::Display for StructuralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An error returned by the texture engine.
#[derive(Debug, Error)]
pub enum TextureError {
    /// A fatal format violation in the object named by `owner`.
    #[error("{subsystem} error in '{owner}': {reason}")]
    Structural {
        subsystem: Subsystem,
        owner: String,
        reason: StructuralReason,
    },

    /// The allocator could not provide memory.
    #[error("allocation exhausted: {0}")]
    AllocationExhausted(#[from] AllocateError),

    /// The requested combination of formats or parameters is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Texel or palette data is inconsistent with its format.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TextureError {
    pub fn structural(
        subsystem: Subsystem,
        owner: impl Into<String>,
        reason: StructuralReason,
    ) -> Self {
        Self::Structural {
            subsystem,
            owner: owner.into(),
            reason,
        }
    }

    /// The reason code of a structural error.
    pub fn reason(&self) -> Option<StructuralReason> {
        match self {
            Self::Structural { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    #[inline]
    pub fn is_allocation_exhausted(&self) -> bool {
        matches!(self, Self::AllocationExhausted(_))
    }
}

pub type TextureResult<T> = Result<T, TextureError>;
