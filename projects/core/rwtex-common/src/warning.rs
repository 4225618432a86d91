//! Non-fatal diagnostics raised while repairing damaged input.
//!
//! Warnings never abort the caller. They are pushed into a [`WarningSink`]
//! together with the name of the object being processed.

use crate::format::RasterFormat;
use core::fmt;
use std::sync::Mutex;

/// A repair or anomaly noticed while reading or converting a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureWarning {
    /// A mip declared a byte size different from the one its dimensions require.
    /// Its bytes were skipped and no further mips were read.
    DamagedMipmap {
        level: u32,
        declared: u32,
        expected: u32,
    },
    /// A mip declared zero bytes.
    ZeroSizedMipmap { level: u32 },
    /// A mip after a damaged or empty one was skipped.
    MipmapRuleViolation { level: u32 },
    /// Automatic mipmap generation was requested with a mip count other than one.
    InvalidAutoMipmap { mip_count: u32 },
    /// The raster format in the header disagreed with the platform format code.
    RasterFormatRepaired {
        declared: RasterFormat,
        repaired: RasterFormat,
    },
    /// The depth in the header disagreed with the platform format code.
    DepthRepaired { declared: u32, repaired: u32 },
    /// Data remained in the stream after the last declared mip.
    TrailingData { bytes: u64 },
}

impl TextureWarning {
    /// Stable key identifying the warning kind.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::DamagedMipmap { .. } => "damaged-mipmap",
            Self::ZeroSizedMipmap { .. } => "zero-sized-mipmap",
            Self::MipmapRuleViolation { .. } => "mipmap-rule-violation",
            Self::InvalidAutoMipmap { .. } => "invalid-auto-mipmap",
            Self::RasterFormatRepaired { .. } => "raster-format-repaired",
            Self::DepthRepaired { .. } => "depth-repaired",
            Self::TrailingData { .. } => "trailing-data",
        }
    }

    /// The warning level at which this warning is reported. Level 1 warnings
    /// describe lost data, level 2 warnings describe silent repairs.
    pub fn level(&self) -> u32 {
        match self {
            Self::DamagedMipmap { .. }
            | Self::ZeroSizedMipmap { .. }
            | Self::MipmapRuleViolation { .. } => 1,
            Self::InvalidAutoMipmap { .. }
            | Self::RasterFormatRepaired { .. }
            | Self::DepthRepaired { .. }
            | Self::TrailingData { .. } => 2,
        }
    }
}

impl fmt::Display for TextureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DamagedMipmap {
                level,
                declared,
                expected,
            } => write!(
                f,
                "mipmap {level} is damaged: declares {declared} bytes, expected {expected}"
            ),
            Self::ZeroSizedMipmap { level } => write!(f, "mipmap {level} is empty"),
            Self::MipmapRuleViolation { level } => {
                write!(f, "mipmap {level} skipped after an invalid mipmap")
            }
            Self::InvalidAutoMipmap { mip_count } => write!(
                f,
                "automatic mipmaps cleared for a texture with {mip_count} mipmaps"
            ),
            Self::RasterFormatRepaired { declared, repaired } => {
                write!(f, "raster format {declared} repaired to {repaired}")
            }
            Self::DepthRepaired { declared, repaired } => {
                write!(f, "depth {declared} repaired to {repaired}")
            }
            Self::TrailingData { bytes } => write!(f, "{bytes} bytes of trailing data"),
        }
    }
}

/// Receives warnings. Implementations must not fail or panic.
pub trait WarningSink: Send + Sync {
    fn push_warning(&self, owner: &str, warning: &TextureWarning);
}

/// Forwards warnings to `tracing` at `WARN` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn push_warning(&self, owner: &str, warning: &TextureWarning) {
        tracing::warn!(owner, key = warning.message_key(), "{warning}");
    }
}

/// Discards all warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreWarnings;

impl WarningSink for IgnoreWarnings {
    fn push_warning(&self, _owner: &str, _warning: &TextureWarning) {}
}

/// Records warnings for later inspection.
#[derive(Debug, Default)]
pub struct CollectingWarningSink {
    warnings: Mutex<Vec<(String, TextureWarning)>>,
}

impl CollectingWarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all warnings recorded so far.
    pub fn take(&self) -> Vec<(String, TextureWarning)> {
        match self.warnings.lock() {
            Ok(mut guard) => core::mem::take(&mut *guard),
            Err(poisoned) => core::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Copies of the recorded warnings, without their owners.
    pub fn warnings(&self) -> Vec<TextureWarning> {
        match self.warnings.lock() {
            Ok(guard) => guard.iter().map(|(_, w)| w.clone()).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(_, w)| w.clone())
                .collect(),
        }
    }
}

impl WarningSink for CollectingWarningSink {
    fn push_warning(&self, owner: &str, warning: &TextureWarning) {
        let mut guard = match self.warnings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((owner.to_string(), warning.clone()));
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;

    #[test]
    fn collecting_sink_records_owner_and_warning() {
        let sink = CollectingWarningSink::new();
        sink.push_warning("tree", &TextureWarning::ZeroSizedMipmap { level: 2 });

        let taken = sink.take();
        assert_eq!(
            taken,
            vec![(
                "tree".to_string(),
                TextureWarning::ZeroSizedMipmap { level: 2 }
            )]
        );
        assert!(sink.warnings().is_empty());
    }

    #[rstest]
    #[case(
        TextureWarning::DamagedMipmap { level: 1, declared: 4, expected: 8 },
        "damaged-mipmap",
        1
    )]
    #[case(TextureWarning::InvalidAutoMipmap { mip_count: 3 }, "invalid-auto-mipmap", 2)]
    fn message_keys_and_levels(
        #[case] warning: TextureWarning,
        #[case] key: &str,
        #[case] level: u32,
    ) {
        assert_eq!(warning.message_key(), key);
        assert_eq!(warning.level(), level);
    }
}
