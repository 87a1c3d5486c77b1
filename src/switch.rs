//! RF switches (USB-SP4T series).

use crate::consts::switch::{GET_SWITCH_PORT, MAX_PORT, MIN_PORT};
use crate::consts::SWITCH_PID;
use crate::decode::parse_active_port;
use crate::device::Device;
use crate::error::{malformed, Error, Result};
use crate::identity::{self, PartInfo};
use crate::locator::{open_device, OpenOptions};
use crate::transport::{HidBackend, HidTransport};
use hidapi::HidDevice;
use std::fmt;

/// A switch port connected to COM, 1-indexed (1-4).
/// Use `SwitchPort::new(num)` to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchPort(u8);

impl SwitchPort {
    /// Creates a port, returning `Error::InvalidPort` outside 1-4.
    pub fn new(port: u8) -> Result<Self> {
        if (MIN_PORT..=MAX_PORT).contains(&port) {
            Ok(SwitchPort(port))
        } else {
            Err(Error::InvalidPort(port))
        }
    }

    /// Port number, 1-4.
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SwitchPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client for a USB RF switch (default PID `0x22`).
#[derive(Debug)]
pub struct SwitchClient<T: HidTransport = HidDevice> {
    device: Device<T>,
}

impl<T: HidTransport> SwitchClient<T> {
    /// Opens a switch, by serial number if `options.serial` is set.
    pub fn open<B>(backend: &B, options: &OpenOptions) -> Result<Self>
    where
        B: HidBackend<Transport = T>,
    {
        let device = open_device(backend, options, SWITCH_PID, identity::read_serial_number)?;
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

    /// Model name, e.g. `USB-1SP4T-A18`.
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

    /// Connects `port` (1-4) to COM. The port number itself is the command code.
    pub fn set_active_port(&mut self, port: u8) -> Result<()> {
        let port = SwitchPort::new(port)?;
        self.device.transact(port.number(), &[])?;
        Ok(())
    }

    /// Returns the port currently connected to COM.
    pub fn get_active_port(&mut self) -> Result<SwitchPort> {
        let response = self.device.transact(GET_SWITCH_PORT, &[])?;
        let port = parse_active_port(response.as_bytes())?;
        SwitchPort::new(port)
            .map_err(|_| malformed(response.as_bytes(), format!("active port {} out of range", port)))
    }

    /// Closes the device.
    pub fn close(self) {
        drop(self.device);
    }
}
