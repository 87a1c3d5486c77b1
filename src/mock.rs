//! In-memory HID devices for tests.
//!
//! A [`MockDevice`] answers each written frame through a responder closure and
//! records everything written to it. [`MockBackend`] enumerates and opens a set
//! of mock devices the way `HidApi` does for real ones.

use crate::consts::FRAME_SIZE;
use crate::error::{Error, Result};
use crate::frame::FrameAlignment;
use crate::transport::{DeviceEntry, HidBackend, HidTransport};
use hidapi::HidError;
use std::collections::VecDeque;
use std::ffi::{CStr, CString};
use std::sync::{Arc, Mutex, MutexGuard};

/// Produces the response to one frame (as the device sees it), or `None` to stay silent.
pub type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>> + Send>;

/// Builds a 64-byte response: `command`, then `payload`, then zeros.
pub fn response(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; FRAME_SIZE];
    buf[0] = command;
    buf[1..1 + payload.len()].copy_from_slice(payload);
    buf
}

/// Responder that echoes the command byte with an empty payload.
pub fn echo() -> Responder {
    Box::new(|frame| Some(response(frame[0], &[])))
}

fn hid_error(message: String) -> Error {
    Error::Hid(HidError::HidApiError { message })
}

struct MockState {
    entry: DeviceEntry,
    alignment: FrameAlignment,
    responder: Responder,
    busy: bool,
    nonblocking_fails: bool,
    open: bool,
    open_count: usize,
    nonblocking: bool,
    empty_reads: usize,
    pending_empty_reads: usize,
    writes: Vec<Vec<u8>>,
    pending: VecDeque<Vec<u8>>,
}

/// A scriptable device. Clones share state, so a test can keep one clone and
/// inspect it after the library has opened and used another.
#[derive(Clone)]
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    /// A closed device that echoes every command.
    pub fn new(vendor_id: u16, product_id: u16, path: &str) -> Self {
        let path = CString::new(path).unwrap_or_default();
        Self {
            state: Arc::new(Mutex::new(MockState {
                entry: DeviceEntry {
                    vendor_id,
                    product_id,
                    path,
                },
                alignment: FrameAlignment::Native,
                responder: echo(),
                busy: false,
                nonblocking_fails: false,
                open: false,
                open_count: 0,
                nonblocking: false,
                empty_reads: 0,
                pending_empty_reads: 0,
                writes: Vec::new(),
                pending: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the responder.
    pub fn with_responder<F>(self, responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        self.lock().responder = Box::new(responder);
        self
    }

    /// Answers `serial_command` with `serial` and echoes everything else.
    pub fn with_serial(self, serial_command: u8, serial: &str) -> Self {
        let serial = serial.as_bytes().to_vec();
        self.with_responder(move |frame| {
            if frame[0] == serial_command {
                Some(response(frame[0], &serial))
            } else {
                Some(response(frame[0], &[]))
            }
        })
    }

    /// Never answers.
    pub fn silent(self) -> Self {
        self.with_responder(|_| None)
    }

    /// Fails every open attempt, like a device held by another process.
    pub fn busy(self) -> Self {
        self.lock().busy = true;
        self
    }

    /// Opens, but rejects the switch to non-blocking reads.
    pub fn failing_nonblocking(self) -> Self {
        self.lock().nonblocking_fails = true;
        self
    }

    /// Expects frames in this layout; the leading report ID is stripped before
    /// the responder sees a shifted frame.
    pub fn with_alignment(self, alignment: FrameAlignment) -> Self {
        self.lock().alignment = alignment;
        self
    }

    /// Returns `count` empty reads before delivering each response.
    pub fn with_empty_reads(self, count: usize) -> Self {
        self.lock().empty_reads = count;
        self
    }

    /// Enumeration entry for this device.
    pub fn entry(&self) -> DeviceEntry {
        self.lock().entry.clone()
    }

    /// Raw buffers written to the device, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// Whether a handle is currently open.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// How many times the device has been opened.
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }

    /// Whether the last open handle was switched to non-blocking reads.
    pub fn is_nonblocking(&self) -> bool {
        self.lock().nonblocking
    }

    /// Opens the device directly, bypassing a backend.
    pub fn open(&self) -> Result<MockHandle> {
        let mut state = self.lock();
        if state.busy {
            return Err(hid_error(format!(
                "Device {:?} is already open",
                state.entry.path
            )));
        }
        state.open = true;
        state.open_count += 1;
        Ok(MockHandle {
            state: Arc::clone(&self.state),
        })
    }
}

/// An open session on a [`MockDevice`]. Dropping it closes the device.
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Path of the underlying device.
    pub fn path(&self) -> CString {
        self.lock().entry.path.clone()
    }
}

impl std::fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHandle").field("path", &self.path()).finish()
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.lock().open = false;
    }
}

impl HidTransport for MockHandle {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut state = self.lock();
        state.writes.push(data.to_vec());
        let device_view = match state.alignment {
            FrameAlignment::Native => data.to_vec(),
            FrameAlignment::ReportIdShifted => {
                let mut frame = data.get(1..).unwrap_or_default().to_vec();
                frame.resize(FRAME_SIZE, 0);
                frame
            }
        };
        if let Some(reply) = (state.responder)(&device_view) {
            state.pending.push_back(reply);
            state.pending_empty_reads = state.empty_reads;
        }
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.lock();
        if !state.nonblocking {
            return Err(hid_error(
                "blocking read on mock device would hang".to_string(),
            ));
        }
        if state.pending_empty_reads > 0 {
            state.pending_empty_reads -= 1;
            return Ok(0);
        }
        match state.pending.pop_front() {
            Some(reply) => {
                let len = reply.len().min(buf.len());
                buf[..len].copy_from_slice(&reply[..len]);
                Ok(len)
            }
            None => Ok(0),
        }
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()> {
        let mut state = self.lock();
        if state.nonblocking_fails {
            return Err(hid_error(format!(
                "Cannot change blocking mode of {:?}",
                state.entry.path
            )));
        }
        state.nonblocking = nonblocking;
        Ok(())
    }

    fn frame_alignment(&self) -> FrameAlignment {
        self.lock().alignment
    }
}

/// A set of mock devices that can be enumerated and opened.
#[derive(Clone, Default)]
pub struct MockBackend {
    devices: Vec<MockDevice>,
}

impl MockBackend {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device to the enumeration list.
    pub fn add_device(&mut self, device: MockDevice) {
        self.devices.push(device);
    }

    /// Builder form of [`add_device`](Self::add_device).
    pub fn with_device(mut self, device: MockDevice) -> Self {
        self.add_device(device);
        self
    }

    /// Number of devices the backend enumerates.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl HidBackend for MockBackend {
    type Transport = MockHandle;

    fn enumerate(&self) -> Result<Vec<DeviceEntry>> {
        Ok(self.devices.iter().map(MockDevice::entry).collect())
    }

    fn open(&self, vid: u16, pid: u16) -> Result<MockHandle> {
        self.devices
            .iter()
            .find(|d| {
                let entry = d.entry();
                entry.vendor_id == vid && entry.product_id == pid
            })
            .ok_or_else(|| hid_error(format!("No device with VID={vid:04X} PID={pid:04X}")))?
            .open()
    }

    fn open_path(&self, path: &CStr) -> Result<MockHandle> {
        self.devices
            .iter()
            .find(|d| d.entry().path.as_c_str() == path)
            .ok_or_else(|| hid_error(format!("No device at {path:?}")))?
            .open()
    }
}
