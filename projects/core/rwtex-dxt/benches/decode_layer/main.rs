use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rwtex_common::color_8888::Color8888;
use rwtex_common::endian::Endianness;
use rwtex_dxt::{
    compress_layer, compressed_data_size, decompress_layer, DxtError, DxtVariant,
    RangeFitCompressor,
};
use std::hint::black_box;

const SIZE: u32 = 512;

fn gradient(x: u32, y: u32) -> Color8888 {
    Color8888::new(
        (x & 0xFF) as u8,
        (y & 0xFF) as u8,
        ((x ^ y) & 0xFF) as u8,
        ((x + y) & 0xFF) as u8,
    )
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("DXT Layer (512x512)");

    for variant in [DxtVariant::Dxt1, DxtVariant::Dxt3, DxtVariant::Dxt5] {
        let size = compressed_data_size(variant, SIZE, SIZE);
        let mut encoded = vec![0u8; size];
        let mut decoded = vec![0u8; (SIZE * SIZE * 4) as usize];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("compress_{variant:?}"), |b| {
            b.iter(|| {
                compress_layer::<DxtError>(
                    variant,
                    SIZE,
                    SIZE,
                    &RangeFitCompressor::default(),
                    false,
                    Endianness::Little,
                    |x, y| Ok(gradient(x, y)),
                    black_box(&mut encoded),
                )
            })
        });

        group.bench_function(format!("decompress_{variant:?}"), |b| {
            b.iter(|| {
                decompress_layer::<DxtError>(
                    variant,
                    black_box(&encoded),
                    SIZE,
                    SIZE,
                    Endianness::Little,
                    |x, y, color| {
                        let offset = ((y * SIZE + x) * 4) as usize;
                        decoded[offset..offset + 4].copy_from_slice(&color.to_array());
                        Ok(())
                    },
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
