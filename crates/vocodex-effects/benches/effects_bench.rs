//! Criterion benchmarks for vocodex effects
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vocodex_core::Effect;
use vocodex_effects::{Compressor, Echo, Limiter, Tremolo};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.9
        })
        .collect()
}

fn bench_effect<E: Effect>(c: &mut Criterion, name: &str, mut effect: E) {
    let mut group = c.benchmark_group(name);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut output = vec![0.0; block_size];
                b.iter(|| {
                    effect.process_block(black_box(&input), &mut output);
                    black_box(output[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_compressor(c: &mut Criterion) {
    bench_effect(c, "Compressor", Compressor::new(SAMPLE_RATE));
}

fn bench_limiter(c: &mut Criterion) {
    let mut effect = Limiter::new(SAMPLE_RATE);
    effect.set_lookahead_ms(5.0);
    bench_effect(c, "Limiter", effect);
}

fn bench_echo(c: &mut Criterion) {
    let mut effect = Echo::new(SAMPLE_RATE);
    effect.set_feedback(0.5);
    bench_effect(c, "Echo", effect);
}

fn bench_tremolo(c: &mut Criterion) {
    let mut effect = Tremolo::new(SAMPLE_RATE);
    effect.set_depth(0.8);
    bench_effect(c, "Tremolo", effect);
}

criterion_group!(
    benches,
    bench_compressor,
    bench_limiter,
    bench_echo,
    bench_tremolo
);
criterion_main!(benches);
