//! # minicircuits-hid
//!
//! A Rust crate for controlling Mini-Circuits USB RF test instruments (power
//! sensors, programmable attenuators and RF switches) via their USB HID
//! interfaces.
//!
//! This crate uses the `hidapi` crate for cross-platform USB HID communication.
//!
//! ## Features
//!
//! *   Device opening by VID/PID (`open` with default `OpenOptions`).
//! *   Selection by on-device serial number when several instruments of the same
//!     class are connected (`OpenOptions::serial`).
//! *   Power sensors (`PowerSensorClient`):
//!     *   Model name, serial number, firmware version.
//!     *   Measurement mode (`MeasurementMode`).
//!     *   Power readings at a given signal frequency, sensor temperature.
//! *   Attenuators (`AttenuatorClient`): part number, serial number, reading and
//!     setting the attenuation at quarter-dB resolution.
//! *   Switches (`SwitchClient`): part number, serial number, reading and
//!     setting the active port (1-4).
//! *   Bounded, cancellable transactions (`EngineConfig`, `CancelToken`).
//!
//! ## Protocol
//!
//! Every operation is one transaction: a 64-byte command frame (command code in
//! byte 0, parameters after it, zero padding) is written, and the device answers
//! with a 64-byte frame whose byte 0 echoes the command. A response with a
//! different byte 0 is reported as `Error::ProtocolDesync`.
//!
//! **Windows:** frames are written with a leading zero report ID and without
//! their last byte (`FrameAlignment::ReportIdShifted`). This layout is selected
//! automatically on Windows hosts and can be forced with
//! `EngineConfig::with_alignment`. It has not been verified on every Windows
//! version.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use hidapi::HidApi;
//! use minicircuits_hid::{AttenuatorClient, OpenOptions, Result};
//!
//! fn main() -> Result<()> {
//!     // Optional: Initialize logging
//!     // env_logger::init();
//!
//!     let hid_api = HidApi::new()?;
//!     let mut atten = AttenuatorClient::open(&hid_api, &OpenOptions::default())?;
//!     println!("Part number: {}", atten.get_part_number()?);
//!
//!     atten.set_attenuation(23.25)?;
//!     println!("Current attenuation: {} dB", atten.get_attenuation()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Working with Multiple Devices
//!
//! Mini-Circuits devices do not report their serial numbers consistently
//! through the HID descriptor, so selecting by serial opens each matching
//! device in turn and asks it over the vendor protocol:
//!
//! ```no_run
//! # use hidapi::HidApi;
//! # use minicircuits_hid::{SwitchClient, OpenOptions, Result};
//! # fn main() -> Result<()> {
//! let hid_api = HidApi::new()?;
//! let mut sw = SwitchClient::open(&hid_api, &OpenOptions::new().serial("11912040031"))?;
//! sw.set_active_port(2)?;
//! # Ok(())
//! # }
//! ```
//!
//! Devices already held by another process are skipped.
//!
//! ## Hardware Setup Notes
//!
//! *   **Linux udev Rules:** Grant user permission to the HID devices. Create `/etc/udev/rules.d/85-minicircuits.rules`:
//!     ```udev
//!     ATTR{idVendor}=="20ce", MODE="660", GROUP="plugdev"
//!     ```
//!     Add your user to `plugdev` (`sudo usermod -a -G plugdev <username>`) and reload:
//!     `sudo udevadm control --reload-rules && sudo udevadm trigger`
//!
//! ## License
//!
//! This project is licensed under the MIT license.

// Make internal modules private, re-export public types
mod consts;
mod error;
mod identity;

pub mod attenuator;
#[cfg(feature = "cli")]
pub mod cli;
pub mod decode;
pub mod device;
pub mod frame;
pub mod locator;
pub mod mock;
pub mod power_sensor;
pub mod switch;
pub mod transport;

pub use attenuator::{encode_attenuation, AttenuatorClient};
pub use device::{CancelToken, Device, EngineConfig};
pub use error::{Error, Result};
pub use frame::{CommandFrame, FrameAlignment, ResponseFrame};
pub use identity::PartInfo;
pub use locator::{open_device, OpenOptions};
pub use power_sensor::{encode_frequency, MeasurementMode, PowerSensorClient};
pub use switch::{SwitchClient, SwitchPort};
pub use transport::{DeviceEntry, HidBackend, HidTransport};
// Re-export only essential public constants
pub use consts::{
    ATTENUATOR_PID, DEFAULT_POLL_INTERVAL, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_SETTLE_DELAY,
    FRAME_SIZE, POWER_SENSOR_PID, SWITCH_PID, VENDOR_ID,
};

/// Command codes, per instrument class.
pub mod commands {
    pub use crate::consts::{attenuator, power_sensor, switch, switch_attenuator};
}
