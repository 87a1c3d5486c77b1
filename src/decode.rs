//! Decoders for response frames.
//!
//! These are pure functions over the raw bytes of a response (byte 0 is the
//! echoed command). A decoder that needs bytes past the end of the frame fails
//! with `Error::MalformedResponse`.

use crate::consts::attenuator::STEPS_PER_DB;
use crate::error::{malformed, Result};

fn require_len(frame: &[u8], needed: usize) -> Result<()> {
    if frame.len() < needed {
        return Err(malformed(
            frame,
            format!("frame too short ({} bytes, need {})", frame.len(), needed),
        ));
    }
    Ok(())
}

/// Reads a string starting at byte 1 up to the first zero byte or the end of the frame.
/// Each byte is taken as one character.
pub fn parse_null_terminated_string(frame: &[u8]) -> Result<String> {
    require_len(frame, 1)?;
    Ok(frame[1..]
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect())
}

/// Attenuation in dB: whole dB in byte 1, quarter-dB steps in byte 2.
pub fn parse_fixed_point_attenuation(frame: &[u8]) -> Result<f64> {
    require_len(frame, 3)?;
    Ok(f64::from(frame[1]) + f64::from(frame[2]) / STEPS_PER_DB)
}

/// Parses `len` ASCII characters starting at `start` as a decimal number.
///
/// Surrounding whitespace is ignored; anything else that is not part of a
/// floating point literal is an error.
pub fn parse_ascii_decimal(frame: &[u8], start: usize, len: usize) -> Result<f64> {
    require_len(frame, start + len)?;
    let raw = &frame[start..start + len];
    let text = std::str::from_utf8(raw)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| malformed(frame, format!("non-ASCII reading {:02X?}", raw)))?;
    text.trim()
        .parse::<f64>()
        .map_err(|e| malformed(frame, format!("invalid reading {:?}: {}", text, e)))
}

/// Two-character firmware version code from bytes 5 and 6.
pub fn parse_firmware_version(frame: &[u8]) -> Result<String> {
    require_len(frame, 7)?;
    Ok([char::from(frame[5]), char::from(frame[6])].iter().collect())
}

/// Raw active switch port number from byte 1.
pub fn parse_active_port(frame: &[u8]) -> Result<u8> {
    require_len(frame, 2)?;
    Ok(frame[1])
}
