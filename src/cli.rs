//! Argument and logging helpers shared by the command-line tools.

use crate::device::EngineConfig;
use crate::error::Result;
use crate::locator::OpenOptions;
use std::process::ExitCode;
use std::time::Duration;

/// Parse a string as a hex (`0x` prefix) or decimal u16
pub fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u16>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Device selection options shared by all tools
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Open the device with this serial number
    #[arg(long)]
    pub serial: Option<String>,

    /// USB vendor ID
    #[arg(long, value_parser = parse_hex_u16, default_value = "0x20ce")]
    pub vid: u16,

    /// USB product ID (defaults to the instrument class)
    #[arg(long, value_parser = parse_hex_u16)]
    pub pid: Option<u16>,

    /// Response timeout in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub timeout_ms: u64,
}

impl DeviceArgs {
    /// Converts the arguments to [`OpenOptions`].
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            vid: self.vid,
            pid: self.pid,
            serial: self.serial.clone(),
            engine: EngineConfig::default()
                .with_response_timeout(Duration::from_millis(self.timeout_ms)),
        }
    }

    /// Initialize logger: warnings by default, more with each -v.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
}

/// Prints a failure and maps it to the process exit status.
pub fn exit_status(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
