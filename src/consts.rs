//! Internal constants: USB IDs, command codes and timing defaults.

use std::time::Duration;

// Default Vendor/Product IDs
/// Mini-Circuits vendor ID, shared by every instrument class.
pub const VENDOR_ID: u16 = 0x20CE;

/// Product ID of the USB power sensors (verified: PWR-6GHS).
pub const POWER_SENSOR_PID: u16 = 0x11;
/// Product ID of the USB RF switches (verified: USB-SP4T-63).
pub const SWITCH_PID: u16 = 0x22;
/// Product ID of the USB programmable attenuators (verified: RUDAT-6000-60, RCDAT-6000-110).
pub const ATTENUATOR_PID: u16 = 0x23;

// --- Framing ---
/// Size of every command and response frame.
pub const FRAME_SIZE: usize = 64;
/// Largest parameter payload that fits after the command byte.
pub const MAX_PARAMS: usize = FRAME_SIZE - 1;
/// Number of ASCII characters in a power or temperature reading.
pub const ASCII_DECIMAL_LEN: usize = 6;

// --- Timing ---
/// Delay between writing a command and the first poll for its response.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);
/// Upper bound on the response poll loop.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
/// Sleep between two empty non-blocking reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Printed with device open failures.
pub const INSTALL_HINT: &str = "\
You may need to grant your user access to Mini-Circuits USB devices.
On Linux, create /etc/udev/rules.d/85-minicircuits.rules containing:

    ATTR{idVendor}==\"20ce\", MODE=\"660\", GROUP=\"plugdev\"

make sure your user is a member of the plugdev group:

    sudo usermod -a -G plugdev <username>

then reload the rules:

    sudo udevadm control --reload-rules && sudo udevadm trigger";

// --- Power Sensor Commands ---
pub mod power_sensor {
    pub const GET_MODEL_NAME: u8 = 104;
    pub const GET_SERIAL: u8 = 105;
    pub const SET_MEASUREMENT_MODE: u8 = 15;
    pub const READ_POWER: u8 = 102;
    pub const GET_TEMPERATURE: u8 = 103;
    pub const GET_FIRMWARE_VERSION: u8 = 99;

    /// Frequencies above this are sent in MHz, at or below it in kHz.
    pub const KHZ_LIMIT_HZ: f64 = 65.535e6;
    pub const UNITS_KHZ: u8 = b'k';
    pub const UNITS_MHZ: u8 = b'M';
}

// --- Commands shared by switches and attenuators ---
pub mod switch_attenuator {
    pub const GET_PART_NUMBER: u8 = 40;
    pub const GET_SERIAL_NUMBER: u8 = 41;
}

// --- Attenuator Commands ---
pub mod attenuator {
    pub const GET_ATTENUATION: u8 = 18;
    pub const SET_ATTENUATION: u8 = 19;
    /// Attenuation resolution is a quarter dB.
    pub const STEPS_PER_DB: f64 = 4.0;
}

// --- Switch Commands ---
pub mod switch {
    // Setting the port has no command code of its own: the port number is sent as the code.
    pub const GET_SWITCH_PORT: u8 = 15;
    pub const MIN_PORT: u8 = 1;
    pub const MAX_PORT: u8 = 4;
}
