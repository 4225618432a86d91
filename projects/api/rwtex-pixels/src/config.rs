//! Conversion settings.

use rwtex_dxt::CompressionQuality;
use rwtex_palette::PaletteRuntime;

/// Settings read by the conversion pipeline at call time.
///
/// ```
/// use rwtex_palette::PaletteRuntime;
/// use rwtex_pixels::ConversionConfig;
///
/// let config = ConversionConfig::new()
///     .with_palette_runtime(PaletteRuntime::External)
///     .with_dxt_punch_through(true);
/// assert_eq!(config.palette_runtime, PaletteRuntime::External);
/// assert_eq!(config.warning_level, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Backend used whenever a new palette has to be built.
    pub palette_runtime: PaletteRuntime,
    /// Allow DXT1 compression to encode alpha below 128 as transparent texels.
    pub dxt_punch_through: bool,
    /// Highest [`TextureWarning::level`](rwtex_common::warning::TextureWarning::level)
    /// forwarded to the warning sink. 0 silences all warnings.
    pub warning_level: u32,
    /// Effort spent by the bundled block compressor.
    pub compression_quality: CompressionQuality,
}

impl ConversionConfig {
    pub fn new() -> Self {
        Self {
            palette_runtime: PaletteRuntime::Native,
            dxt_punch_through: false,
            warning_level: 1,
            compression_quality: CompressionQuality::Default,
        }
    }

    pub fn with_palette_runtime(mut self, runtime: PaletteRuntime) -> Self {
        self.palette_runtime = runtime;
        self
    }

    pub fn with_dxt_punch_through(mut self, enabled: bool) -> Self {
        self.dxt_punch_through = enabled;
        self
    }

    /// Sets the warning level; values above 2 are clamped.
    pub fn with_warning_level(mut self, level: u32) -> Self {
        self.warning_level = level.min(2);
        self
    }

    pub fn with_compression_quality(mut self, quality: CompressionQuality) -> Self {
        self.compression_quality = quality;
        self
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::new()
    }
}
