//! Collaborators shared by every conversion and (de)serialization call.

use crate::config::ConversionConfig;
use rwtex_common::allocate::{DefaultAllocator, PixelAllocator};
use rwtex_common::warning::{TextureWarning, TracingWarningSink, WarningSink};
use rwtex_dxt::{BlockCompressor, RangeFitCompressor};
use rwtex_palette::{ExternalQuantizer, NeuQuantizer, PaletteBuilder};
use std::sync::Arc;

/// Bundles the configuration with the allocator, warning sink, block
/// compressor and external quantizer used by the engine.
///
/// The context is `Send + Sync`, so independent conversions may run on
/// worker threads sharing one context.
#[derive(Clone)]
pub struct TextureContext {
    config: ConversionConfig,
    allocator: Arc<dyn PixelAllocator>,
    warnings: Arc<dyn WarningSink>,
    compressor: Arc<dyn BlockCompressor>,
    quantizer: Arc<dyn ExternalQuantizer>,
}

impl TextureContext {
    /// A context with the default collaborators: heap allocation, `tracing`
    /// warnings, the range fit block compressor and NeuQuant.
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            allocator: Arc::new(DefaultAllocator),
            warnings: Arc::new(TracingWarningSink),
            compressor: Arc::new(RangeFitCompressor::new(config.compression_quality)),
            quantizer: Arc::new(NeuQuantizer::default()),
        }
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn PixelAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_warning_sink(mut self, warnings: Arc<dyn WarningSink>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_block_compressor(mut self, compressor: Arc<dyn BlockCompressor>) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn with_external_quantizer(mut self, quantizer: Arc<dyn ExternalQuantizer>) -> Self {
        self.quantizer = quantizer;
        self
    }

    #[inline]
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    #[inline]
    pub fn allocator(&self) -> &dyn PixelAllocator {
        self.allocator.as_ref()
    }

    #[inline]
    pub fn block_compressor(&self) -> &dyn BlockCompressor {
        self.compressor.as_ref()
    }

    #[inline]
    pub fn external_quantizer(&self) -> &dyn ExternalQuantizer {
        self.quantizer.as_ref()
    }

    /// A palette builder using the configured runtime.
    pub fn palette_builder(&self) -> PaletteBuilder<'_> {
        PaletteBuilder::new(self.config.palette_runtime, self.quantizer.as_ref())
    }

    /// Forwards `warning` to the sink if the configured warning level includes it.
    pub fn warn(&self, owner: &str, warning: TextureWarning) {
        if warning.level() <= self.config.warning_level {
            self.warnings.push_warning(owner, &warning);
        }
    }
}

impl Default for TextureContext {
    fn default() -> Self {
        Self::new(ConversionConfig::default())
    }
}

impl core::fmt::Debug for TextureContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TextureContext")
            .field("config", &self.config)
            .field("quantizer", &self.quantizer.name())
            .finish_non_exhaustive()
    }
}
