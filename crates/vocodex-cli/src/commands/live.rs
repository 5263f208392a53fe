//! Real-time vocoding command.

use super::common::{VoiceArgs, load_config};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use vocodex_engine::{CaptureError, METER_RATE_HZ, MeterTicker, VocoderEngine, Waveform};

#[derive(Args)]
pub struct LiveArgs {
    /// Input device name (partial match)
    #[arg(long)]
    input_device: Option<String>,

    /// Output device name (partial match)
    #[arg(long)]
    output_device: Option<String>,

    /// Device buffer size in frames
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Play this file as the modulator instead of the microphone
    #[arg(long, value_name = "FILE")]
    modulator: Option<PathBuf>,

    /// Carrier audio file. Selects the external carrier unless --waveform
    /// says otherwise.
    #[arg(long, value_name = "FILE")]
    carrier: Option<PathBuf>,

    #[command(flatten)]
    voice: VoiceArgs,
}

pub fn run(args: LiveArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.input_device.is_some() {
        config.devices.input_device = args.input_device;
    }
    if args.output_device.is_some() {
        config.devices.output_device = args.output_device;
    }
    if let Some(buffer_size) = args.buffer_size {
        config.devices.buffer_size = buffer_size;
    }

    let name_or_default = |name: &Option<String>| name.clone().unwrap_or_else(|| "default".into());
    println!("Live vocoding");
    println!("  Input:  {}", name_or_default(&config.devices.input_device));
    println!("  Output: {}", name_or_default(&config.devices.output_device));
    println!("  Sample rate: {} Hz", config.engine.sample_rate);
    println!("  Buffer size: {} frames", config.devices.buffer_size);

    let mut engine = VocoderEngine::with_cpal(config)?;
    engine.create();

    if let Some(carrier_path) = &args.carrier {
        engine
            .load_carrier_file(carrier_path)
            .with_context(|| format!("decoding {}", carrier_path.display()))?;
        if args.voice.waveform.is_none() {
            engine.set_waveform(Waveform::ExternalCarrier);
        }
    }
    args.voice.apply(&mut engine);

    match &args.modulator {
        Some(path) => {
            engine
                .load_modulator_file(path)
                .with_context(|| format!("decoding {}", path.display()))?;
            println!("  Modulator: {}", path.display());
        }
        None => match engine.start_capture() {
            Ok(()) => println!("  Modulator: microphone"),
            Err(CaptureError::PermissionDenied) => {
                anyhow::bail!("Microphone access was denied. Allow it in the system settings.")
            }
            Err(e) => return Err(e).context("opening the capture device"),
        },
    }

    if !engine.start() {
        anyhow::bail!("Could not open the output device");
    }
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let vu = ProgressBar::new(100);
    vu.set_style(
        ProgressStyle::default_bar()
            .template("VU [{bar:40.green/red}] {msg}")?
            .progress_chars("=> "),
    );
    let ticker = engine.meter().map(|reader| {
        let vu = vu.clone();
        MeterTicker::spawn(reader, METER_RATE_HZ, move |level, _scope| {
            vu.set_position((level * 100.0) as u64);
            vu.set_message(format!("{level:.2}"));
        })
    });

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    drop(ticker);
    vu.finish_and_clear();
    println!("Stopping...");
    engine.destroy();
    println!("Done!");
    Ok(())
}
