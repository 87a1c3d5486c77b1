use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to Mini-Circuits HID instruments.
///
/// Argument errors (`FrameOverflow`, `InvalidConfiguration`, `InvalidPort`) are
/// raised before anything is written to the device.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying HID API layer.
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
    /// General I/O error during device communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The transport could not open the requested device.
    #[error("Failed to open device VID={vid:04X} PID={pid:04X}: {reason}\n\n{hint}", hint = crate::consts::INSTALL_HINT)]
    DeviceOpen {
        /// Vendor ID that was requested.
        vid: u16,
        /// Product ID that was requested.
        pid: u16,
        /// Error reported by the transport.
        reason: String,
    },
    /// No enumerated device answered with the requested serial number.
    #[error("Serial number not found: {serial} ({candidates} candidate device(s) checked)")]
    SerialNotFound {
        /// The serial number that was searched for.
        serial: String,
        /// Number of devices with a matching VID/PID that were enumerated.
        candidates: usize,
    },
    /// The response did not echo the command that was sent.
    #[error("Invalid response from device: expected echo of command {expected}, got {actual} (raw: {response:02X?})")]
    ProtocolDesync {
        /// Command code that was sent.
        expected: u8,
        /// Byte 0 of the response.
        actual: u8,
        /// The full raw response, for diagnosis.
        response: Vec<u8>,
    },
    /// More parameter bytes were supplied than fit in a frame.
    #[error("Command data length is limited to {max} parameter bytes, got {actual}")]
    FrameOverflow {
        /// Maximum number of parameter bytes.
        max: usize,
        /// Number of parameter bytes supplied.
        actual: usize,
    },
    /// A response frame could not be decoded.
    #[error("Malformed response to command {command}: {message}")]
    MalformedResponse {
        /// Command code the response belongs to.
        command: u8,
        /// What was wrong with it.
        message: String,
    },
    /// A caller-supplied setting is outside the accepted domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Switch port outside 1-4.
    #[error("Invalid switch port: {0} (expected 1-4)")]
    InvalidPort(u8),
    /// The device did not answer within the configured time.
    #[error("Timeout waiting for response to command {command} after {timeout:?}")]
    ResponseTimeout {
        /// Command code that was sent.
        command: u8,
        /// The configured response timeout.
        timeout: Duration,
    },
    /// The transaction was cancelled through its `CancelToken`.
    #[error("Transaction for command {command} was cancelled")]
    Cancelled {
        /// Command code of the interrupted transaction.
        command: u8,
    },
}

/// Result type alias for instrument operations.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn malformed(frame: &[u8], message: impl Into<String>) -> Error {
    Error::MalformedResponse {
        command: frame.first().copied().unwrap_or(0),
        message: message.into(),
    }
}
