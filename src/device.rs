//! The transaction engine: one command frame out, one echoed response frame back.

use crate::consts::{
    DEFAULT_POLL_INTERVAL, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_SETTLE_DELAY, FRAME_SIZE,
};
use crate::error::{Error, Result};
use crate::frame::{CommandFrame, FrameAlignment, ResponseFrame};
use crate::transport::HidTransport;
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shared flag that aborts the response poll loop of a device.
///
/// Clones share the same flag, so a token can be handed to another thread
/// (e.g. a signal handler) and cancelled from there.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the current and every later transaction fail with `Cancelled`.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called since the last reset.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears a previous cancellation so the device can be used again.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Timing and framing settings for a [`Device`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Wait between the write and the first read (default 50 ms).
    pub settle_delay: Duration,
    /// Give up polling after this long (default 2 s).
    pub response_timeout: Duration,
    /// Sleep between two empty reads (default 1 ms).
    pub poll_interval: Duration,
    /// Forces a frame layout. `None` uses the transport's own choice.
    pub alignment: Option<FrameAlignment>,
    /// How many times a desynchronized transaction is re-sent (default 0).
    pub desync_retries: u8,
    /// Aborts a running poll when cancelled.
    pub cancel: CancelToken,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            settle_delay: DEFAULT_SETTLE_DELAY,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            alignment: None,
            desync_retries: 0,
            cancel: CancelToken::new(),
        }
    }
}

impl EngineConfig {
    /// Sets the wait between write and first read.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the response timeout.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Sets the sleep between empty reads.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Forces a frame layout instead of the platform default.
    pub fn with_alignment(mut self, alignment: FrameAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Re-sends a desynchronized transaction up to `retries` times.
    pub fn with_desync_retries(mut self, retries: u8) -> Self {
        self.desync_retries = retries;
        self
    }

    /// Uses `token` for cancellation, e.g. one shared with a Ctrl-C handler.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }
}

// --- Device Handle ---
/// A handle to one opened instrument.
///
/// Transactions need `&mut self`: the protocol has no request IDs, so a handle
/// must never have two transactions in flight. Distinct handles are independent.
#[derive(Debug)]
pub struct Device<T: HidTransport> {
    transport: T,
    config: EngineConfig,
    alignment: FrameAlignment,
}

impl<T: HidTransport> Device<T> {
    /// Wraps an opened transport and switches it to non-blocking reads.
    pub fn new(mut transport: T, config: EngineConfig) -> Result<Self> {
        transport.set_nonblocking(true)?;
        let alignment = config
            .alignment
            .unwrap_or_else(|| transport.frame_alignment());
        if alignment == FrameAlignment::ReportIdShifted {
            debug!("Using report-ID-shifted frame layout (unverified on hardware)");
        }
        Ok(Self {
            transport,
            config,
            alignment,
        })
    }

    /// The engine configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The frame layout chosen when the device was opened.
    pub fn alignment(&self) -> FrameAlignment {
        self.alignment
    }

    /// A clone of the token that cancels this device's transactions.
    pub fn cancel_token(&self) -> CancelToken {
        self.config.cancel.clone()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Releases the underlying transport without closing it.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Sends `command` with `params` and returns the validated response.
    ///
    /// Fails with `FrameOverflow` before any I/O if `params` exceeds 63 bytes,
    /// with `ResponseTimeout` if the device stays silent, and with
    /// `ProtocolDesync` if the response does not echo `command`.
    pub fn transact(&mut self, command: u8, params: &[u8]) -> Result<ResponseFrame> {
        let frame = CommandFrame::new(command, params)?;
        let mut retries_left = self.config.desync_retries;
        loop {
            self.send(&frame)?;
            let response = self.poll_response(command)?;
            if response.command() == command {
                return Ok(response);
            }
            if retries_left > 0 {
                retries_left -= 1;
                warn!(
                    "Response echoed command {} instead of {}, re-sending",
                    response.command(),
                    command
                );
                continue;
            }
            return Err(Error::ProtocolDesync {
                expected: command,
                actual: response.command(),
                response: response.as_bytes().to_vec(),
            });
        }
    }

    fn check_cancelled(&self, command: u8) -> Result<()> {
        if self.config.cancel.is_cancelled() {
            debug!("Transaction for command {} cancelled", command);
            return Err(Error::Cancelled { command });
        }
        Ok(())
    }

    fn send(&mut self, frame: &CommandFrame) -> Result<()> {
        self.check_cancelled(frame.command())?;
        let out_buf = self.alignment.encode(frame);
        trace!(
            "Command {} OUT ({:?}): {:02X?}",
            frame.command(),
            self.alignment,
            &out_buf[..]
        );
        let bytes_written = self.transport.write(&out_buf)?;
        if bytes_written < out_buf.len() {
            warn!(
                "HID write returned unexpected length: {} (expected {})",
                bytes_written,
                out_buf.len()
            );
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "Incomplete HID write",
            )));
        }
        Ok(())
    }

    fn poll_response(&mut self, command: u8) -> Result<ResponseFrame> {
        thread::sleep(self.config.settle_delay);
        let start = Instant::now();
        let mut in_buf = [0u8; FRAME_SIZE];
        loop {
            self.check_cancelled(command)?;
            let bytes_read = self.transport.read(&mut in_buf)?;
            if bytes_read > 0 {
                trace!(
                    "Command {} IN ({} bytes): {:02X?}",
                    command,
                    bytes_read,
                    &in_buf[..bytes_read]
                );
                return Ok(ResponseFrame::from_bytes(&in_buf[..bytes_read]));
            }
            if start.elapsed() >= self.config.response_timeout {
                return Err(Error::ResponseTimeout {
                    command,
                    timeout: self.config.response_timeout,
                });
            }
            thread::sleep(self.config.poll_interval);
        }
    }
}
