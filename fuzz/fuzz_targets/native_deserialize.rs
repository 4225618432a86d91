#![no_main]

// Parses arbitrary bytes as a native texture under a small allocation
// budget, then writes back whatever parsed.

use libfuzzer_sys::fuzz_target;
use rwtex_common::allocate::BudgetAllocator;
use rwtex_common::warning::IgnoreWarnings;
use rwtex_native::NativeCodec;
use rwtex_pixels::{ConversionConfig, TextureContext};
use std::io::Cursor;
use std::sync::Arc;

const BUDGET: usize = 16 * 1024 * 1024;

fuzz_target!(|data: &[u8]| {
    let ctx = TextureContext::new(ConversionConfig::new().with_warning_level(2))
        .with_allocator(Arc::new(BudgetAllocator::new(BUDGET)))
        .with_warning_sink(Arc::new(IgnoreWarnings));

    let codec = NativeCodec::new();
    let mut stream = Cursor::new(data);
    if let Ok(texture) = codec.deserialize_any(&ctx, &mut stream) {
        assert!(!texture.pixels.is_empty());
        assert!(stream.position() as usize <= data.len());

        let mut out = Vec::new();
        let _ = codec.serialize(&texture, &mut out);
    }
});
