//! Programmable attenuators (RUDAT / RCDAT series).

use crate::consts::attenuator::{GET_ATTENUATION, SET_ATTENUATION, STEPS_PER_DB};
use crate::consts::ATTENUATOR_PID;
use crate::decode::parse_fixed_point_attenuation;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::identity::{self, PartInfo};
use crate::locator::{open_device, OpenOptions};
use crate::transport::{HidBackend, HidTransport};
use hidapi::HidDevice;
use log::debug;

/// Encodes an attenuation in dB as (whole dB, quarter-dB steps).
///
/// The fractional part is truncated to the quarter-dB grid, so `23.3` becomes
/// `(23, 1)` like `23.25`. Values outside `[0, 256)` are rejected.
pub fn encode_attenuation(db: f64) -> Result<(u8, u8)> {
    if !db.is_finite() || !(0.0..256.0).contains(&db) {
        return Err(Error::InvalidConfiguration(format!(
            "attenuation {} dB out of range (0-255.75)",
            db
        )));
    }
    let whole = db.trunc();
    let steps = ((db - whole) * STEPS_PER_DB) as u8;
    Ok((whole as u8, steps))
}

/// Client for a USB programmable attenuator (default PID `0x23`).
#[derive(Debug)]
pub struct AttenuatorClient<T: HidTransport = HidDevice> {
    device: Device<T>,
}

impl<T: HidTransport> AttenuatorClient<T> {
    /// Opens an attenuator, by serial number if `options.serial` is set.
    pub fn open<B>(backend: &B, options: &OpenOptions) -> Result<Self>
    where
        B: HidBackend<Transport = T>,
    {
        let device = open_device(backend, options, ATTENUATOR_PID, identity::read_serial_number)?;
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

    /// Model name, e.g. `RUDAT-6000-30`.
    pub fn get_part_number(&mut self) -> Result<String> {
        identity::read_part_number(&mut self.device)
    }

    /// Serial number as reported over the vendor protocol.
    pub fn get_serial(&mut self) -> Result<String> {
        identity::read_serial_number(&mut self.device)
    }

    /// Part number and serial in one call.
    pub fn identify(&mut self) -> Result<PartInfo> {
        identity::read_part_info(&mut self.device)
    }

    /// Current attenuation in dB.
    pub fn get_attenuation(&mut self) -> Result<f64> {
        let response = self.device.transact(GET_ATTENUATION, &[])?;
        parse_fixed_point_attenuation(response.as_bytes())
    }

    /// Sets the attenuation in dB, truncated to quarter-dB resolution.
    pub fn set_attenuation(&mut self, db: f64) -> Result<()> {
        let (whole, steps) = encode_attenuation(db)?;
        debug!("Setting attenuation {} dB as ({}, {})", db, whole, steps);
        self.device.transact(SET_ATTENUATION, &[whole, steps])?;
        Ok(())
    }

    /// Closes the device.
    pub fn close(self) {
        drop(self.device);
    }
}
