//! Continuously read power and temperature from a Mini-Circuits USB power sensor.

use clap::Parser;
use hidapi::HidApi;
use minicircuits_hid::cli::{exit_status, DeviceArgs};
use minicircuits_hid::{MeasurementMode, PowerSensorClient, Result};
use std::process::ExitCode;
use std::{thread, time::Duration};

#[derive(Parser)]
#[command(name = "minicircuits-powersensor")]
#[command(version, about = "Interact with Mini-Circuits USB power sensors.", long_about = None)]
struct Cli {
    #[command(flatten)]
    device: DeviceArgs,

    /// Measurement mode: low-noise, fast-sampling or fastest-sampling
    #[arg(long, default_value = "low-noise")]
    mode: String,

    /// Signal frequency in Hz
    #[arg(long, default_value_t = 10e6)]
    freq: f64,

    /// Seconds between readings
    #[arg(long, default_value_t = 0.5)]
    interval: f64,

    /// Stop after this many readings (runs until interrupted if omitted)
    #[arg(long)]
    count: Option<u64>,
}

fn run(cli: &Cli) -> Result<()> {
    let mode: MeasurementMode = cli.mode.parse()?;
    let interval = Duration::try_from_secs_f64(cli.interval).map_err(|e| {
        minicircuits_hid::Error::InvalidConfiguration(format!(
            "invalid interval {}: {}",
            cli.interval, e
        ))
    })?;

    let hid_api = HidApi::new()?;
    let mut sensor = PowerSensorClient::open(&hid_api, &cli.device.open_options())?;

    if cli.device.verbose > 0 {
        println!("Model name: {}", sensor.get_model_name()?);
        println!("Serial: {}", sensor.get_serial()?);
        println!("Firmware version: {}", sensor.get_firmware_version()?);
        println!("Setting measurement mode...");
    }

    sensor.set_measurement_mode(mode)?;

    if cli.device.verbose > 0 {
        println!("Target signal frequency: {}", cli.freq);
    }

    let mut readings = 0u64;
    while cli.count.map_or(true, |n| readings < n) {
        let temp = sensor.get_temperature()?;
        let power = sensor.get_power(cli.freq)?;
        println!("{} C / {} dBm", temp, power);
        readings += 1;
        thread::sleep(interval);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.device.init_logging();
    exit_status(run(&cli))
}
