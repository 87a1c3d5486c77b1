//! Part number and serial number queries shared by switches and attenuators.

use crate::consts::switch_attenuator::{GET_PART_NUMBER, GET_SERIAL_NUMBER};
use crate::decode::parse_null_terminated_string;
use crate::device::Device;
use crate::error::Result;
use crate::transport::HidTransport;

/// Part number and serial number of a switch or attenuator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartInfo {
    pub part_number: String,
    pub serial: String,
}

pub(crate) fn read_part_number<T: HidTransport>(device: &mut Device<T>) -> Result<String> {
    let response = device.transact(GET_PART_NUMBER, &[])?;
    parse_null_terminated_string(response.as_bytes())
}

pub(crate) fn read_serial_number<T: HidTransport>(device: &mut Device<T>) -> Result<String> {
    let response = device.transact(GET_SERIAL_NUMBER, &[])?;
    parse_null_terminated_string(response.as_bytes())
}

pub(crate) fn read_part_info<T: HidTransport>(device: &mut Device<T>) -> Result<PartInfo> {
    Ok(PartInfo {
        part_number: read_part_number(device)?,
        serial: read_serial_number(device)?,
    })
}
