//! Audio ingestion command.

use super::common::{check_bit_depth, load_config, print_level};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use vocodex_io::{DecodedAudio, WavSpec, write_wav};

#[derive(Args)]
pub struct DecodeArgs {
    /// Input audio file (WAV, MP3, AAC/M4A)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Target sample rate. Defaults to the engine's working rate.
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: DecodeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let bit_depth = check_bit_depth(args.bit_depth)?;
    let sample_rate = match args.sample_rate {
        Some(rate) if rate > 0 => rate,
        Some(_) => anyhow::bail!("Sample rate must be above 0"),
        None => load_config(config_path)?.engine.sample_rate,
    };

    println!("Decoding {}...", args.input.display());
    let decoded = DecodedAudio::from_file(&args.input)
        .with_context(|| format!("decoding {}", args.input.display()))?;
    println!(
        "  {} channel(s) at {} Hz, {:.2}s",
        decoded.source_channels,
        decoded.sample_rate,
        decoded.duration_secs()
    );

    let samples = decoded.into_working_rate(sample_rate);
    println!("  -> {} samples at {} Hz", samples.len(), sample_rate);

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: bit_depth,
    };
    write_wav(&args.output, &samples, spec)
        .with_context(|| format!("writing {}", args.output.display()))?;

    print_level("Output:", &samples);
    println!("Wrote {}", args.output.display());
    Ok(())
}
