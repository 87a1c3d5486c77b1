//! Read or set the attenuation of a Mini-Circuits USB attenuator.

use clap::Parser;
use hidapi::HidApi;
use minicircuits_hid::cli::{exit_status, DeviceArgs};
use minicircuits_hid::{AttenuatorClient, Result};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "minicircuits-attenuator")]
#[command(version, about = "Interact with Mini-Circuits USB attenuators.", long_about = None)]
struct Cli {
    #[command(flatten)]
    device: DeviceArgs,

    /// Attenuation to set in dB. Prints the current attenuation if omitted.
    value: Option<f64>,
}

fn run(cli: &Cli) -> Result<()> {
    let hid_api = HidApi::new()?;
    let mut atten = AttenuatorClient::open(&hid_api, &cli.device.open_options())?;
    println!("Part number: {}", atten.get_part_number()?);
    println!("Serial: {}", atten.get_serial()?);
    match cli.value {
        Some(value) => {
            println!("Setting attenuation to: {} dB", value);
            atten.set_attenuation(value)?;
        }
        None => println!("Current attenuation: {} dB", atten.get_attenuation()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.device.init_logging();
    exit_status(run(&cli))
}
