//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::Path;
use vocodex_config::EngineConfig;
use vocodex_core::{linear_to_db, peak_abs, rms};
use vocodex_engine::{ParamTarget, VocoderEngine, Waveform};

/// Carrier waveform for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliWaveform {
    Saw,
    Square,
    Triangle,
    Sine,
    /// Use the file given with --carrier
    External,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Saw => Waveform::Saw,
            CliWaveform::Square => Waveform::Square,
            CliWaveform::Triangle => Waveform::Triangle,
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::External => Waveform::ExternalCarrier,
        }
    }
}

/// Pad-assignable parameter for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliParam {
    Pitch,
    Intensity,
    Vibrato,
    Echo,
    Tremolo,
}

impl From<CliParam> for ParamTarget {
    fn from(p: CliParam) -> Self {
        match p {
            CliParam::Pitch => ParamTarget::Pitch,
            CliParam::Intensity => ParamTarget::Intensity,
            CliParam::Vibrato => ParamTarget::Vibrato,
            CliParam::Echo => ParamTarget::Echo,
            CliParam::Tremolo => ParamTarget::Tremolo,
        }
    }
}

/// Performance parameters shared by `process` and `live`.
#[derive(Args, Debug, Clone)]
pub struct VoiceArgs {
    /// Carrier waveform
    #[arg(short, long, value_enum)]
    pub waveform: Option<CliWaveform>,

    /// Carrier pitch in Hz (50-400)
    #[arg(long)]
    pub pitch: Option<f32>,

    /// Band gain intensity (0.2-3.0)
    #[arg(long)]
    pub intensity: Option<f32>,

    /// Vibrato depth (0-1)
    #[arg(long)]
    pub vibrato: Option<f32>,

    /// Tremolo depth (0-1)
    #[arg(long)]
    pub tremolo: Option<f32>,

    /// Echo amount (0-1)
    #[arg(long)]
    pub echo: Option<f32>,

    /// Noise gate threshold (0-1)
    #[arg(long)]
    pub noise_threshold: Option<f32>,

    /// Pad position as X,Y in [0,1], applied before the explicit values
    #[arg(long, value_parser = parse_pad, allow_hyphen_values = true)]
    pub pad: Option<(f32, f32)>,

    /// Parameter on the pad's X axis
    #[arg(long, value_enum, default_value = "pitch")]
    pub x_param: CliParam,

    /// Parameter on the pad's Y axis
    #[arg(long, value_enum, default_value = "intensity")]
    pub y_param: CliParam,
}

impl VoiceArgs {
    /// Push these settings into a created engine.
    pub fn apply(&self, engine: &mut VocoderEngine) {
        engine.set_axis_params(self.x_param.into(), self.y_param.into());
        if let Some((x, y)) = self.pad {
            engine.update_pad(x, y);
        }
        if let Some(w) = self.waveform {
            engine.set_waveform(w.into());
        }
        if let Some(hz) = self.pitch {
            engine.set_pitch(hz);
        }
        if let Some(ratio) = self.intensity {
            engine.set_intensity(ratio);
        }
        if let Some(v) = self.vibrato {
            engine.set_vibrato(v);
        }
        if let Some(v) = self.tremolo {
            engine.set_tremolo(v);
        }
        if let Some(v) = self.echo {
            engine.set_echo(v);
        }
        if let Some(v) = self.noise_threshold {
            engine.set_noise_threshold(v);
        }
    }
}

/// Parse an `X,Y` pad position for clap's `value_parser`.
pub fn parse_pad(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid pad position: '{}' (expected X,Y)", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|_| format!("Invalid pad coordinate: '{}'", v.trim()))
    };
    let (x, y) = (parse(x)?, parse(y)?);
    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
        return Err(format!("Pad position {x},{y} is outside [0,1]"));
    }
    Ok((x, y))
}

/// Load the engine config from `path`, or the platform default.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = EngineConfig::load_or_default(path).with_context(|| match path {
        Some(p) => format!("loading config {}", p.display()),
        None => "loading default config".to_string(),
    })?;
    Ok(config)
}

/// Validate a WAV bit depth argument.
pub fn check_bit_depth(bits: u16) -> anyhow::Result<u16> {
    match bits {
        16 | 24 | 32 => Ok(bits),
        other => anyhow::bail!("Unsupported bit depth {other} (use 16, 24 or 32)"),
    }
}

/// Print RMS and peak in dBFS for a labelled buffer.
pub fn print_level(label: &str, samples: &[f32]) {
    println!(
        "  {label:<8} RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(samples)),
        linear_to_db(peak_abs(samples))
    );
}
