//! Integration tests for whole mip chain conversion

use rwtex_common::allocate::{BudgetAllocator, CountingAllocator, DefaultAllocator};
use rwtex_common::error::TextureError;
use rwtex_common::format::{ColorOrder, CompressionType, PaletteType, PixelFormat, RasterFormat};
use rwtex_palette::PaletteRuntime;
use rwtex_pixels::{
    convert_pixel_data, ConversionConfig, MipmapLayer, PixelDataTraversal, TextureContext,
};
use std::sync::Arc;

const DISTINCT_COLORS: [[u8; 4]; 8] = [
    [255, 0, 0, 255],
    [0, 255, 0, 255],
    [0, 0, 255, 255],
    [255, 255, 0, 255],
    [0, 255, 255, 255],
    [255, 0, 255, 255],
    [255, 255, 255, 255],
    [0, 0, 0, 255],
];

fn rgba() -> PixelFormat {
    PixelFormat::raw(RasterFormat::Format8888, 32, ColorOrder::Rgba)
}

fn rgba_image(width: u32, height: u32, texel: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| texel(x, y))
        .collect()
}

#[test]
fn pal4_without_alpha_expands_to_opaque_8888() {
    // 16 palette entries in 888 (stored as 32-bit, no alpha channel).
    let palette: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 255 - i * 16, i, 0]).collect();
    // Two texels per byte, 8 bytes per row.
    let indices: Vec<u8> = (0..16 * 8).map(|i| (i as u8).wrapping_mul(37)).collect();
    let src =
        PixelFormat::palettized(RasterFormat::Format888, PaletteType::Pal4, 4, ColorOrder::Bgra);
    let mut traversal = PixelDataTraversal::borrowed(
        src,
        [MipmapLayer::borrowed(&indices, 16, 16)],
        Some((&palette, 16)),
    );

    let ctx = TextureContext::default();
    assert!(convert_pixel_data(&ctx, &mut traversal, &rgba()).expect("conversion should succeed"));

    let layer = traversal.layer(0).unwrap();
    assert_eq!(layer.data_size(), 16 * 16 * 4);
    assert!(layer.data().chunks_exact(4).all(|texel| texel[3] == 255));
    assert_eq!(traversal.palette_data(), None);
    assert!(!traversal.has_alpha());
}

#[test]
fn channel_order_round_trip_restores_original_bytes() {
    let layouts = [
        (RasterFormat::Format8888, 32),
        (RasterFormat::Format4444, 16),
        (RasterFormat::Format1555, 16),
        (RasterFormat::Format565, 16),
    ];
    let original: Vec<u8> = (0..8 * 8 * 4).map(|i| (i * 7 + 3) as u8).collect();

    for (raster_format, depth) in layouts {
        for &a in ColorOrder::all_values() {
            for &b in ColorOrder::all_values() {
                if a == b {
                    continue;
                }
                let format_a = PixelFormat::raw(raster_format, depth, a);
                let format_b = PixelFormat::raw(raster_format, depth, b);
                let width = 32 / depth * 8;
                let mut traversal = PixelDataTraversal::borrowed(
                    format_a,
                    [MipmapLayer::borrowed(&original, width, 8)],
                    None,
                );

                let ctx = TextureContext::default();
                assert!(convert_pixel_data(&ctx, &mut traversal, &format_b).unwrap());
                assert!(convert_pixel_data(&ctx, &mut traversal, &format_a).unwrap());
                assert_eq!(
                    traversal.layer(0).unwrap().data(),
                    &original[..],
                    "{raster_format} {a} -> {b} -> {a}"
                );
            }
        }
    }
}

#[test]
fn dxt_round_trip_of_representable_colors_is_exact() {
    let original = rgba_image(8, 8, |x, y| {
        if (x + y) % 2 == 0 {
            [255, 0, 0, 255]
        } else {
            [0, 0, 255, 255]
        }
    });

    for compression in [
        CompressionType::Dxt1,
        CompressionType::Dxt2,
        CompressionType::Dxt3,
        CompressionType::Dxt4,
        CompressionType::Dxt5,
    ] {
        let mut traversal =
            PixelDataTraversal::borrowed(rgba(), [MipmapLayer::borrowed(&original, 8, 8)], None);
        let ctx = TextureContext::default();

        let compressed = PixelFormat::compressed(compression, RasterFormat::Format565);
        assert!(convert_pixel_data(&ctx, &mut traversal, &compressed).unwrap());
        assert_eq!(traversal.format().compression, compression);
        assert_eq!(traversal.layer(0).unwrap().data_size(), 4 * compression.block_size());

        assert!(convert_pixel_data(&ctx, &mut traversal, &rgba()).unwrap());
        assert_eq!(traversal.layer(0).unwrap().data(), &original[..], "{compression}");
    }
}

#[test]
fn native_quantizer_round_trip_keeps_distinct_colors() {
    let original = rgba_image(16, 16, |x, y| DISTINCT_COLORS[((x / 2 + y) % 8) as usize]);

    let targets = [
        (PaletteType::Pal4, 4),
        (PaletteType::Pal4Lsb, 4),
        (PaletteType::Pal8, 8),
    ];
    for (palette_type, depth) in targets {
        let mut traversal =
            PixelDataTraversal::borrowed(rgba(), [MipmapLayer::borrowed(&original, 16, 16)], None);
        let config = ConversionConfig::new().with_palette_runtime(PaletteRuntime::Native);
        let ctx = TextureContext::new(config);

        let palettized = PixelFormat::palettized(
            RasterFormat::Format8888,
            palette_type,
            depth,
            ColorOrder::Bgra,
        );
        assert!(convert_pixel_data(&ctx, &mut traversal, &palettized).unwrap());
        assert_eq!(traversal.palette_size(), DISTINCT_COLORS.len());

        assert!(convert_pixel_data(&ctx, &mut traversal, &rgba()).unwrap());
        assert_eq!(traversal.layer(0).unwrap().data(), &original[..], "{palette_type}");
    }
}

#[test]
fn external_quantizer_produces_a_valid_palette() {
    let original = rgba_image(32, 32, |x, y| DISTINCT_COLORS[((x + y) % 4) as usize]);
    let mut traversal =
        PixelDataTraversal::borrowed(rgba(), [MipmapLayer::borrowed(&original, 32, 32)], None);
    let config = ConversionConfig::new().with_palette_runtime(PaletteRuntime::External);
    let ctx = TextureContext::new(config);

    let pal8 =
        PixelFormat::palettized(RasterFormat::Format8888, PaletteType::Pal8, 8, ColorOrder::Bgra);
    assert!(convert_pixel_data(&ctx, &mut traversal, &pal8).unwrap());
    assert!(traversal.palette_size() > 0 && traversal.palette_size() <= 256);
    assert_eq!(traversal.layer(0).unwrap().data_size(), 32 * 32);
    assert!(traversal.dispatcher().is_ok());
}

#[test]
fn compressed_source_can_be_quantized_directly() {
    let original = rgba_image(8, 8, |x, _| DISTINCT_COLORS[(x / 4) as usize]);
    let mut traversal =
        PixelDataTraversal::borrowed(rgba(), [MipmapLayer::borrowed(&original, 8, 8)], None);
    let ctx = TextureContext::default();

    let dxt1 = PixelFormat::compressed(CompressionType::Dxt1, RasterFormat::Format565);
    convert_pixel_data(&ctx, &mut traversal, &dxt1).unwrap();

    let pal8 =
        PixelFormat::palettized(RasterFormat::Format8888, PaletteType::Pal8, 8, ColorOrder::Bgra);
    assert!(convert_pixel_data(&ctx, &mut traversal, &pal8).unwrap());
    assert_eq!(traversal.palette_size(), 2);
    assert!(!traversal.format().is_compressed());
}

#[test]
fn allocation_failure_is_reported_and_format_kept() {
    let original = rgba_image(8, 8, |_, _| [1, 2, 3, 255]);
    let mut traversal =
        PixelDataTraversal::borrowed(rgba(), [MipmapLayer::borrowed(&original, 8, 8)], None);
    let ctx = TextureContext::default().with_allocator(Arc::new(BudgetAllocator::new(16)));

    let rgb565 = PixelFormat::raw(RasterFormat::Format565, 16, ColorOrder::Bgra);
    let err = convert_pixel_data(&ctx, &mut traversal, &rgb565).unwrap_err();
    assert!(matches!(err, TextureError::AllocationExhausted(_)));
    assert_eq!(*traversal.format(), rgba());
}

#[test]
fn every_mip_gets_its_own_buffer() {
    let mip0 = rgba_image(4, 4, |_, _| [9, 9, 9, 255]);
    let mip1 = rgba_image(2, 2, |_, _| [9, 9, 9, 255]);
    let mip2 = rgba_image(1, 1, |_, _| [9, 9, 9, 255]);
    let mut traversal = PixelDataTraversal::borrowed(
        rgba(),
        [
            MipmapLayer::borrowed(&mip0, 4, 4),
            MipmapLayer::borrowed(&mip1, 2, 2),
            MipmapLayer::borrowed(&mip2, 1, 1),
        ],
        None,
    );
    let allocator = Arc::new(CountingAllocator::new(DefaultAllocator));
    let ctx = TextureContext::default().with_allocator(allocator.clone());

    let lum = PixelFormat::raw(RasterFormat::Luminance, 8, ColorOrder::Rgba);
    assert!(convert_pixel_data(&ctx, &mut traversal, &lum).unwrap());
    assert_eq!(allocator.allocations(), 3);
    assert!(traversal.is_newly_allocated());
    assert_eq!(traversal.layer(1).unwrap().data(), &[9, 9, 0, 0, 9, 9, 0, 0]);
}
