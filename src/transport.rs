//! The HID transport seam and its `hidapi` implementation.

use crate::error::Result;
use crate::frame::FrameAlignment;
use hidapi::{HidApi, HidDevice};
use log::trace;
use std::ffi::{CStr, CString};

/// One HID device as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub vendor_id: u16,
    pub product_id: u16,
    /// The unique, platform-specific path to the HID device.
    pub path: CString,
}

/// An opened HID session bound to one physical device.
///
/// The session is closed when the value is dropped.
pub trait HidTransport {
    /// Writes one output report, returning the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Reads one input report into `buf`. In non-blocking mode this returns
    /// `Ok(0)` when nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()>;

    /// How command frames must be laid out for this transport.
    fn frame_alignment(&self) -> FrameAlignment {
        FrameAlignment::detect()
    }
}

/// Enumerates and opens HID devices.
pub trait HidBackend {
    type Transport: HidTransport;

    fn enumerate(&self) -> Result<Vec<DeviceEntry>>;

    /// Opens the first device with the given IDs. **Warning:** Ambiguous if multiple devices match.
    fn open(&self, vid: u16, pid: u16) -> Result<Self::Transport>;

    fn open_path(&self, path: &CStr) -> Result<Self::Transport>;
}

impl HidTransport for HidDevice {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(HidDevice::write(self, data)?)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(HidDevice::read(self, buf)?)
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()> {
        Ok(self.set_blocking_mode(!nonblocking)?)
    }
}

impl HidBackend for HidApi {
    type Transport = HidDevice;

    fn enumerate(&self) -> Result<Vec<DeviceEntry>> {
        // hid_api.refresh_devices() needs &mut; the list is the one taken at HidApi::new().
        Ok(self
            .device_list()
            .map(|info| {
                trace!(
                    "Enumerated HID device: VID={:04X}, PID={:04X}, Path={:?}",
                    info.vendor_id(),
                    info.product_id(),
                    info.path()
                );
                DeviceEntry {
                    vendor_id: info.vendor_id(),
                    product_id: info.product_id(),
                    path: info.path().to_owned(),
                }
            })
            .collect())
    }

    fn open(&self, vid: u16, pid: u16) -> Result<HidDevice> {
        Ok(HidApi::open(self, vid, pid)?)
    }

    fn open_path(&self, path: &CStr) -> Result<HidDevice> {
        Ok(HidApi::open_path(self, path)?)
    }
}
