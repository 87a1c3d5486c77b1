//! Read or set the active port of a Mini-Circuits USB RF switch.

use clap::Parser;
use hidapi::HidApi;
use minicircuits_hid::cli::{exit_status, DeviceArgs};
use minicircuits_hid::{Result, SwitchClient};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "minicircuits-switch")]
#[command(version, about = "Interact with Mini-Circuits USB switches.", long_about = None)]
struct Cli {
    #[command(flatten)]
    device: DeviceArgs,

    /// Port (1-4) to connect to COM. Prints the current port if omitted.
    value: Option<u8>,
}

fn run(cli: &Cli) -> Result<()> {
    let hid_api = HidApi::new()?;
    let mut sw = SwitchClient::open(&hid_api, &cli.device.open_options())?;
    println!("Part number: {}", sw.get_part_number()?);
    println!("Serial: {}", sw.get_serial()?);
    match cli.value {
        Some(port) => {
            println!("Setting switch port to: {}", port);
            sw.set_active_port(port)?;
        }
        None => println!("Current switch port: {}", sw.get_active_port()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.device.init_logging();
    exit_status(run(&cli))
}
