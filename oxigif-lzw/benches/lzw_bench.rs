//! Performance benchmarks for oxigif-lzw
//!
//! - Compression/decompression throughput
//! - Comparison with weezl
//! - Different palette depths and image sizes

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxigif_lzw::{compress, decompress};
use std::hint::black_box;

mod test_data {
    /// Random indices below `2^bits` (worst compression)
    pub fn noise(size: usize, bits: u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        let mask = ((1u16 << bits) - 1) as u8;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8 & mask);
        }
        data
    }

    /// Diagonal gradient, typical of quantized photographs
    pub fn gradient(side: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                data.push((((x * 255 / side) + (y * 255 / side)) / 2) as u8);
            }
        }
        data
    }

    /// Flat areas, typical of animations and diagrams
    pub fn flat(side: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                data.push(((x / 32 + y / 32) % 4) as u8);
            }
        }
        data
    }
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    for side in [64usize, 256, 512] {
        let data = test_data::gradient(side);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("oxigif", side), &data, |b, data| {
            b.iter(|| compress(black_box(data), 8).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("weezl", side), &data, |b, data| {
            b.iter(|| {
                weezl::encode::Encoder::new(weezl::BitOrder::Lsb, 8)
                    .encode(black_box(data))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    for side in [64usize, 256, 512] {
        let data = test_data::gradient(side);
        let compressed = compress(&data, 8).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("oxigif", side), &compressed, |b, compressed| {
            b.iter(|| decompress(black_box(compressed), 8, data.len()).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("weezl", side), &compressed, |b, compressed| {
            b.iter(|| {
                weezl::decode::Decoder::new(weezl::BitOrder::Lsb, 8)
                    .decode(black_box(compressed))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_palette_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette_depth");
    let size = 256 * 256;
    for bits in [2u8, 4, 8] {
        let data = test_data::noise(size, bits);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("noise", bits), &data, |b, data| {
            b.iter(|| compress(black_box(data), bits).unwrap())
        });
    }
    let flat = test_data::flat(256);
    group.bench_function("flat", |b| b.iter(|| compress(black_box(&flat), 2).unwrap()));
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_palette_depth);
criterion_main!(benches);
