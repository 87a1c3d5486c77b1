//! Finding and opening an instrument, optionally by its serial number.

use crate::consts::VENDOR_ID;
use crate::device::{Device, EngineConfig};
use crate::error::{Error, Result};
use crate::transport::HidBackend;
use log::{debug, warn};

/// Which device to open and how to talk to it.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// USB vendor ID (default [`VENDOR_ID`]).
    pub vid: u16,
    /// USB product ID. `None` uses the instrument class default.
    pub pid: Option<u16>,
    /// Serial number to look for. Mini-Circuits devices don't report reliable
    /// HID serial numbers, so every candidate is opened and asked over the
    /// vendor protocol.
    pub serial: Option<String>,
    /// Timing and alignment for the opened device.
    pub engine: EngineConfig,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            vid: VENDOR_ID,
            pid: None,
            serial: None,
            engine: EngineConfig::default(),
        }
    }
}

impl OpenOptions {
    /// Default options: Mini-Circuits VID, class PID, no serial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the vendor ID.
    pub fn vid(mut self, vid: u16) -> Self {
        self.vid = vid;
        self
    }

    /// Overrides the product ID.
    pub fn pid(mut self, pid: u16) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Selects the device with this serial number.
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    /// Sets the transaction engine configuration.
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

/// Opens the device selected by `options`.
///
/// Without a serial number the first device matching VID/PID is opened. With
/// one, every matching device is opened in enumeration order and queried with
/// `read_serial` until one answers with the requested serial; that handle is
/// returned and the others are closed again. Devices that cannot be opened
/// (typically because another process holds them) or that fail to answer are
/// skipped.
pub fn open_device<B, F>(
    backend: &B,
    options: &OpenOptions,
    default_pid: u16,
    mut read_serial: F,
) -> Result<Device<B::Transport>>
where
    B: HidBackend,
    F: FnMut(&mut Device<B::Transport>) -> Result<String>,
{
    let vid = options.vid;
    let pid = options.pid.unwrap_or(default_pid);

    let Some(target) = options.serial.as_deref() else {
        let transport = backend.open(vid, pid).map_err(|e| Error::DeviceOpen {
            vid,
            pid,
            reason: e.to_string(),
        })?;
        debug!("Opened device: VID={:04X}, PID={:04X}", vid, pid);
        return Device::new(transport, options.engine.clone());
    };

    let candidates: Vec<_> = backend
        .enumerate()?
        .into_iter()
        .filter(|entry| entry.vendor_id == vid && entry.product_id == pid)
        .collect();
    debug!(
        "Searching {} candidate(s) with VID={:04X}, PID={:04X} for serial '{}'",
        candidates.len(),
        vid,
        pid,
        target
    );

    for entry in &candidates {
        let transport = match backend.open_path(&entry.path) {
            Ok(t) => t,
            Err(e) => {
                debug!("Skipping {:?}, cannot open: {}", entry.path, e);
                continue;
            }
        };
        let mut device = match Device::new(transport, options.engine.clone()) {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping {:?}, cannot set up device: {}", entry.path, e);
                continue;
            }
        };
        match read_serial(&mut device) {
            Ok(serial) if serial == target => {
                debug!("Found serial '{}' at {:?}", target, entry.path);
                return Ok(device);
            }
            Ok(serial) => {
                debug!("Device at {:?} has serial '{}', closing", entry.path, serial);
            }
            Err(e @ Error::Cancelled { .. }) => return Err(e),
            Err(e) => {
                warn!("Skipping {:?}, serial query failed: {}", entry.path, e);
            }
        }
        // `device` is dropped here, which closes the handle.
    }

    Err(Error::SerialNotFound {
        serial: target.to_string(),
        candidates: candidates.len(),
    })
}
