//! Offline vocoding command.

use super::common::{VoiceArgs, check_bit_depth, load_config, print_level};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use vocodex_engine::{VocoderEngine, Waveform};
use vocodex_io::{WavSpec, decode_file, write_wav};

/// Frames rendered per progress update.
const RENDER_CHUNK: usize = 4096;

#[derive(Args)]
pub struct ProcessArgs {
    /// Modulator audio file (voice)
    #[arg(value_name = "MODULATOR")]
    modulator: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Carrier audio file. Selects the external carrier unless --waveform
    /// says otherwise.
    #[arg(long, value_name = "FILE")]
    carrier: Option<PathBuf>,

    #[command(flatten)]
    voice: VoiceArgs,

    /// Seconds rendered past the end of the modulator for the echo tail
    #[arg(long, default_value = "0.5")]
    tail: f32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let bit_depth = check_bit_depth(args.bit_depth)?;
    let config = load_config(config_path)?;
    let sample_rate = config.engine.sample_rate;

    println!("Reading {}...", args.modulator.display());
    let modulator = decode_file(&args.modulator, sample_rate)
        .with_context(|| format!("decoding {}", args.modulator.display()))?;
    if modulator.is_empty() {
        anyhow::bail!("{} contains no audio", args.modulator.display());
    }
    println!(
        "  {} samples at {} Hz, {:.2}s",
        modulator.len(),
        sample_rate,
        modulator.len() as f32 / sample_rate as f32
    );

    let mut engine = VocoderEngine::with_cpal(config)?;
    engine.create();

    if let Some(carrier_path) = &args.carrier {
        println!("Reading carrier {}...", carrier_path.display());
        engine
            .load_carrier_file(carrier_path)
            .with_context(|| format!("decoding {}", carrier_path.display()))?;
        if args.voice.waveform.is_none() {
            engine.set_waveform(Waveform::ExternalCarrier);
        }
    }
    args.voice.apply(&mut engine);

    let input = modulator.clone();
    engine.load_modulator_data(modulator);
    engine.set_file_looping(false);
    engine.snap_params()?;

    let p = engine.params();
    println!(
        "Vocoding: {} at {:.1} Hz, intensity {:.2}, vibrato {:.2}, tremolo {:.2}, echo {:.2}",
        p.waveform(),
        p.pitch_hz(),
        p.intensity(),
        p.vibrato(),
        p.tremolo(),
        p.echo()
    );

    let tail = (args.tail.max(0.0) * sample_rate as f32) as usize;
    let total = input.len() + tail;
    let mut output = vec![0.0; total];

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    for chunk in output.chunks_mut(RENDER_CHUNK) {
        engine.render_offline(&[], chunk)?;
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("done");
    engine.destroy();

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: bit_depth,
    };
    write_wav(&args.output, &output, spec)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("\nStats:");
    print_level("Input:", &input);
    print_level("Output:", &output);
    println!("\nWrote {}", args.output.display());
    Ok(())
}
