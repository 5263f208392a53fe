//! Criterion benchmarks for vocodex-core DSP primitives
//!
//! Run with: cargo bench -p vocodex-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vocodex_core::{AsymmetricSmoother, Biquad, Oscillator, Waveshape};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_bandpass(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bandpass");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let mut band = Biquad::bandpass(1100.0, 12.0, SAMPLE_RATE);
                b.iter(|| {
                    for &sample in &input {
                        black_box(band.process(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    for shape in [Waveshape::Saw, Waveshape::Square, Waveshape::Triangle, Waveshape::Sine] {
        group.bench_function(format!("{shape:?}/256"), |b| {
            let mut osc = Oscillator::new(SAMPLE_RATE);
            osc.set_waveshape(shape);
            osc.set_frequency(140.0);
            b.iter(|| {
                for _ in 0..256 {
                    black_box(osc.advance());
                }
            });
        });
    }

    group.finish();
}

fn bench_smoother(c: &mut Criterion) {
    c.bench_function("AsymmetricSmoother/256", |b| {
        let mut s = AsymmetricSmoother::new(SAMPLE_RATE, 5.0, 50.0);
        b.iter(|| {
            s.set_target(black_box(0.8));
            for _ in 0..256 {
                black_box(s.advance());
            }
        });
    });
}

criterion_group!(benches, bench_bandpass, bench_oscillator, bench_smoother);
criterion_main!(benches);
