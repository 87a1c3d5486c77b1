//! USB power sensors (PWR series).

use crate::consts::power_sensor::{
    GET_FIRMWARE_VERSION, GET_MODEL_NAME, GET_SERIAL, GET_TEMPERATURE, KHZ_LIMIT_HZ, READ_POWER,
    SET_MEASUREMENT_MODE, UNITS_KHZ, UNITS_MHZ,
};
use crate::consts::{ASCII_DECIMAL_LEN, POWER_SENSOR_PID};
use crate::decode::{parse_ascii_decimal, parse_firmware_version, parse_null_terminated_string};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::locator::{open_device, OpenOptions};
use crate::transport::{HidBackend, HidTransport};
use hidapi::HidDevice;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Averaging mode of the sensor. Faster modes trade accuracy for speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementMode {
    #[default]
    LowNoise,
    FastSampling,
    FastestSampling,
}

impl MeasurementMode {
    /// Value sent to the device.
    pub fn code(self) -> u8 {
        match self {
            MeasurementMode::LowNoise => 0,
            MeasurementMode::FastSampling => 1,
            MeasurementMode::FastestSampling => 2,
        }
    }

    /// Name accepted by `FromStr` and printed by `Display`.
    pub fn name(self) -> &'static str {
        match self {
            MeasurementMode::LowNoise => "low-noise",
            MeasurementMode::FastSampling => "fast-sampling",
            MeasurementMode::FastestSampling => "fastest-sampling",
        }
    }
}

impl FromStr for MeasurementMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low-noise" => Ok(MeasurementMode::LowNoise),
            "fast-sampling" => Ok(MeasurementMode::FastSampling),
            "fastest-sampling" => Ok(MeasurementMode::FastestSampling),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown measurement mode '{}' (expected low-noise, fast-sampling or fastest-sampling)",
                other
            ))),
        }
    }
}

impl fmt::Display for MeasurementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encodes a signal frequency in Hz as `[high byte, low byte, units]`.
///
/// Frequencies up to 65.535 MHz are sent in kHz (`'k'`), higher ones in MHz
/// (`'M'`). The scaled value is rounded half-to-even and must fit in 16 bits.
pub fn encode_frequency(freq_hz: f64) -> Result<[u8; 3]> {
    if !freq_hz.is_finite() || freq_hz < 0.0 {
        return Err(Error::InvalidConfiguration(format!(
            "frequency {} Hz is not a valid frequency",
            freq_hz
        )));
    }
    let (scale, units) = if freq_hz > KHZ_LIMIT_HZ {
        (1e6, UNITS_MHZ)
    } else {
        (1e3, UNITS_KHZ)
    };
    let scaled = (freq_hz / scale).round_ties_even();
    if scaled > f64::from(u16::MAX) {
        return Err(Error::InvalidConfiguration(format!(
            "frequency {} Hz is too high to encode",
            freq_hz
        )));
    }
    let [high, low] = (scaled as u16).to_be_bytes();
    Ok([high, low, units])
}

/// Client for a USB power sensor (default PID `0x11`).
#[derive(Debug)]
pub struct PowerSensorClient<T: HidTransport = HidDevice> {
    device: Device<T>,
}

impl<T: HidTransport> PowerSensorClient<T> {
    /// Opens a power sensor, by serial number if `options.serial` is set.
    pub fn open<B>(backend: &B, options: &OpenOptions) -> Result<Self>
    where
        B: HidBackend<Transport = T>,
    {
        let device = open_device(backend, options, POWER_SENSOR_PID, read_serial)?;
        Ok(Self::from_device(device))
    }

    /// Wraps an already opened device.
    pub fn from_device(device: Device<T>) -> Self {
        Self { device }
    }

    /// The underlying transaction engine.
    pub fn device(&self) -> &Device<T> {
        &self.device
    }

    /// Mutable access to the transaction engine.
    pub fn device_mut(&mut self) -> &mut Device<T> {
        &mut self.device
    }

    /// Model name, e.g. `PWR-6GHS`.
    pub fn get_model_name(&mut self) -> Result<String> {
        let response = self.device.transact(GET_MODEL_NAME, &[])?;
        parse_null_terminated_string(response.as_bytes())
    }

    /// Serial number as reported over the vendor protocol.
    pub fn get_serial(&mut self) -> Result<String> {
        read_serial(&mut self.device)
    }

    /// Selects the averaging mode used for later power readings.
    pub fn set_measurement_mode(&mut self, mode: MeasurementMode) -> Result<()> {
        debug!("Setting measurement mode {}", mode);
        self.device.transact(SET_MEASUREMENT_MODE, &[mode.code()])?;
        Ok(())
    }

    /// Measures power in dBm, compensated for a signal at `freq_hz`.
    pub fn get_power(&mut self, freq_hz: f64) -> Result<f64> {
        let params = encode_frequency(freq_hz)?;
        let response = self.device.transact(READ_POWER, &params)?;
        parse_ascii_decimal(response.as_bytes(), 1, ASCII_DECIMAL_LEN)
    }

    /// Sensor temperature in degrees Celsius.
    pub fn get_temperature(&mut self) -> Result<f64> {
        let response = self.device.transact(GET_TEMPERATURE, &[])?;
        parse_ascii_decimal(response.as_bytes(), 1, ASCII_DECIMAL_LEN)
    }

    /// Two-character firmware revision, e.g. `B4`.
    pub fn get_firmware_version(&mut self) -> Result<String> {
        let response = self.device.transact(GET_FIRMWARE_VERSION, &[])?;
        parse_firmware_version(response.as_bytes())
    }

    /// Closes the device.
    pub fn close(self) {
        drop(self.device);
    }
}

fn read_serial<T: HidTransport>(device: &mut Device<T>) -> Result<String> {
    let response = device.transact(GET_SERIAL, &[])?;
    parse_null_terminated_string(response.as_bytes())
}
