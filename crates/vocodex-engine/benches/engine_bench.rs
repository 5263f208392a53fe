//! Criterion benchmarks for the vocoder graph
//!
//! Run with: cargo bench -p vocodex-engine
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use vocodex_config::EngineConfig;
use vocodex_engine::{ModulatorSource, SourceCommand, VocoderProcessor};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            let w = 2.0 * std::f32::consts::PI * t;
            0.3 * (w * 150.0).sin() + 0.2 * (w * 600.0).sin() + 0.1 * (w * 1100.0).sin()
        })
        .collect()
}

fn bench_live(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vocoder/live");

    for &block_size in BLOCK_SIZES {
        let mut config = EngineConfig::default();
        config.engine.block_size = block_size;
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let (mut processor, _control) = VocoderProcessor::new(&config);
                let mut output = vec![0.0; block_size];
                b.iter(|| {
                    processor.process(black_box(&input), &mut output);
                    black_box(output[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vocoder/file");
    let modulator: Arc<[f32]> = Arc::from(generate_test_signal(48000));

    for &block_size in BLOCK_SIZES {
        let mut config = EngineConfig::default();
        config.engine.block_size = block_size;

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let (mut processor, control) = VocoderProcessor::new(&config);
                control.send(SourceCommand::LoadModulator(Arc::clone(&modulator)));
                control.send(SourceCommand::SetSource(ModulatorSource::File));
                control.send(SourceCommand::SetFilePlaying(true));
                let mut output = vec![0.0; block_size];
                b.iter(|| {
                    processor.process(&[], &mut output);
                    black_box(output[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_band_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vocoder/bands");
    let input = generate_test_signal(256);

    for &bands in &[8usize, 16, 20, 32] {
        let mut config = EngineConfig::default();
        config.bands.frequencies = (0..bands)
            .map(|i| 100.0 * (140.0_f32).powf(i as f32 / (bands - 1) as f32))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(bands), &bands, |b, _| {
            let (mut processor, _control) = VocoderProcessor::new(&config);
            let mut output = vec![0.0; 256];
            b.iter(|| {
                processor.process(black_box(&input), &mut output);
                black_box(output[0])
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_live, bench_file, bench_band_count);
criterion_main!(benches);
