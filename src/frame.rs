//! Fixed-size command and response frames, and how they are put on the wire.

use crate::consts::{FRAME_SIZE, MAX_PARAMS};
use crate::error::{Error, Result};

/// A 64-byte command frame: command code, parameters, zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame([u8; FRAME_SIZE]);

impl CommandFrame {
    /// Builds a frame, failing with `Error::FrameOverflow` if `params` does not fit.
    pub fn new(command: u8, params: &[u8]) -> Result<Self> {
        if params.len() > MAX_PARAMS {
            return Err(Error::FrameOverflow {
                max: MAX_PARAMS,
                actual: params.len(),
            });
        }
        let mut buf = [0u8; FRAME_SIZE];
        buf[0] = command;
        buf[1..1 + params.len()].copy_from_slice(params);
        Ok(CommandFrame(buf))
    }

    #[inline]
    pub fn command(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }
}

/// A response frame as read from the device (at most 64 bytes).
///
/// Byte 0 is the echo of the command code. The frame may be shorter than 64
/// bytes if the transport returned a short report; decoders check the length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    data: [u8; FRAME_SIZE],
    len: usize,
}

impl ResponseFrame {
    /// Copies up to 64 bytes out of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let len = bytes.len().min(FRAME_SIZE);
        let mut data = [0u8; FRAME_SIZE];
        data[..len].copy_from_slice(&bytes[..len]);
        ResponseFrame { data, len }
    }

    /// The echoed command code, or 0 for an empty frame.
    #[inline]
    pub fn command(&self) -> u8 {
        if self.len == 0 {
            0
        } else {
            self.data[0]
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// How a command frame is laid out in the buffer handed to the HID write call.
///
/// **Note:** `ReportIdShifted` reproduces a workaround known to be needed on
/// Windows, where the HID stack treats the first byte as a report ID. Its exact
/// byte semantics have not been confirmed against hardware on every Windows
/// version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAlignment {
    /// The frame is written as-is.
    Native,
    /// A zero report ID is prepended and the last frame byte is dropped.
    ReportIdShifted,
}

impl FrameAlignment {
    /// Alignment required by the host this process runs on.
    pub fn detect() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Alignment required by the given OS name (as in `std::env::consts::OS`).
    pub fn for_os(os: &str) -> Self {
        if os.eq_ignore_ascii_case("windows") {
            FrameAlignment::ReportIdShifted
        } else {
            FrameAlignment::Native
        }
    }

    /// Produces the bytes to write for `frame`. The output is always 64 bytes.
    pub fn encode(self, frame: &CommandFrame) -> [u8; FRAME_SIZE] {
        match self {
            FrameAlignment::Native => *frame.as_bytes(),
            FrameAlignment::ReportIdShifted => {
                let mut out = [0u8; FRAME_SIZE];
                out[1..].copy_from_slice(&frame.as_bytes()[..FRAME_SIZE - 1]);
                out
            }
        }
    }
}

impl Default for FrameAlignment {
    fn default() -> Self {
        Self::detect()
    }
}
