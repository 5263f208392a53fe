//! Audio device listing command.

use clap::Args;
use serde::Serialize;
use vocodex_io::AudioDevice;
use vocodex_io::backend::AudioBackend;
use vocodex_io::cpal_backend::CpalBackend;

#[derive(Args)]
pub struct DevicesArgs {
    /// Print the listing as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DeviceEntry<'a> {
    name: &'a str,
    input: bool,
    output: bool,
    default_sample_rate: u32,
    is_default_input: bool,
    is_default_output: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let devices = backend.list_devices()?;
    let default_input = backend.default_input_device()?;
    let default_output = backend.default_output_device()?;
    let is_named = |device: &AudioDevice, default: &Option<AudioDevice>| {
        default.as_ref().is_some_and(|d| d.name == device.name)
    };

    if args.json {
        let entries: Vec<DeviceEntry<'_>> = devices
            .iter()
            .map(|d| DeviceEntry {
                name: &d.name,
                input: d.is_input,
                output: d.is_output,
                default_sample_rate: d.default_sample_rate,
                is_default_input: d.is_input && is_named(d, &default_input),
                is_default_output: d.is_output && is_named(d, &default_output),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("No audio devices found.");
        return Ok(());
    }

    println!("Available Audio Devices");
    println!("=======================\n");

    let inputs: Vec<_> = devices.iter().filter(|d| d.is_input).collect();
    if !inputs.is_empty() {
        println!("Input Devices:");
        for device in &inputs {
            let marker = if is_named(device, &default_input) {
                " [default]"
            } else {
                ""
            };
            println!(
                "  {} ({} Hz){}",
                device.name, device.default_sample_rate, marker
            );
        }
        println!();
    }

    let outputs: Vec<_> = devices.iter().filter(|d| d.is_output).collect();
    if !outputs.is_empty() {
        println!("Output Devices:");
        for device in &outputs {
            let marker = if is_named(device, &default_output) {
                " [default]"
            } else {
                ""
            };
            println!(
                "  {} ({} Hz){}",
                device.name, device.default_sample_rate, marker
            );
        }
        println!();
    }

    println!(
        "Total: {} input(s), {} output(s)",
        inputs.len(),
        outputs.len()
    );
    println!();
    println!("Tip: Use a partial name with --input-device/--output-device:");
    println!("  vocodex live --input-device \"USB\" --output-device \"USB\"");

    Ok(())
}
