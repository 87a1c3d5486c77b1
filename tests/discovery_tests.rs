//! Integration tests for opening instruments, by VID/PID and by serial number.

use minicircuits_hid::commands::{power_sensor, switch_attenuator};
use minicircuits_hid::mock::{MockBackend, MockDevice};
use minicircuits_hid::{
    AttenuatorClient, EngineConfig, Error, FrameAlignment, OpenOptions, PowerSensorClient,
    SwitchClient, ATTENUATOR_PID, POWER_SENSOR_PID, SWITCH_PID, VENDOR_ID,
};
use std::time::Duration;

/// Shows `trace!` frame dumps with `RUST_LOG=trace cargo test`.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast_options() -> OpenOptions {
    init_logging();
    OpenOptions::new().engine(
        EngineConfig::default()
            .with_settle_delay(Duration::ZERO)
            .with_poll_interval(Duration::from_micros(100))
            .with_response_timeout(Duration::from_millis(50))
            .with_alignment(FrameAlignment::Native),
    )
}

fn attenuator(path: &str, serial: &str) -> MockDevice {
    MockDevice::new(VENDOR_ID, ATTENUATOR_PID, path)
        .with_serial(switch_attenuator::GET_SERIAL_NUMBER, serial)
}

#[test]
fn test_serial_scan_keeps_only_the_match() {
    let first = attenuator("/dev/hidraw0", "11111111");
    let second = attenuator("/dev/hidraw1", "22222222");
    let third = attenuator("/dev/hidraw2", "33333333");
    let backend = MockBackend::new()
        .with_device(first.clone())
        .with_device(second.clone())
        .with_device(third.clone());

    let mut atten =
        AttenuatorClient::open(&backend, &fast_options().serial("22222222")).unwrap();

    assert_eq!(
        atten.device().transport().path().to_str().unwrap(),
        "/dev/hidraw1"
    );
    assert!(second.is_open());
    assert!(!first.is_open());
    assert!(!third.is_open());
    // The scan stops at the match.
    assert_eq!(first.open_count(), 1);
    assert_eq!(third.open_count(), 0);
    assert!(second.is_nonblocking());

    assert_eq!(atten.get_serial().unwrap(), "22222222");
    atten.close();
    assert!(!second.is_open());
}

#[test]
fn test_serial_scan_filters_by_vid_and_pid() {
    // Same serial on a switch and on a foreign vendor's device: neither is a candidate.
    let switch = MockDevice::new(VENDOR_ID, SWITCH_PID, "/dev/hidraw0")
        .with_serial(switch_attenuator::GET_SERIAL_NUMBER, "42");
    let foreign = MockDevice::new(0x1234, ATTENUATOR_PID, "/dev/hidraw1")
        .with_serial(switch_attenuator::GET_SERIAL_NUMBER, "42");
    let backend = MockBackend::new()
        .with_device(switch.clone())
        .with_device(foreign.clone());

    match AttenuatorClient::open(&backend, &fast_options().serial("42")) {
        Err(Error::SerialNotFound { serial, candidates }) => {
            assert_eq!(serial, "42");
            assert_eq!(candidates, 0);
        }
        other => panic!("Expected SerialNotFound, got: {:?}", other.map(|_| ())),
    }
    assert_eq!(switch.open_count(), 0);
    assert_eq!(foreign.open_count(), 0);
}

#[test]
fn test_serial_scan_skips_busy_devices() {
    let busy = attenuator("/dev/hidraw0", "22222222").busy();
    let free = attenuator("/dev/hidraw1", "22222222");
    let backend = MockBackend::new()
        .with_device(busy.clone())
        .with_device(free.clone());

    let atten = AttenuatorClient::open(&backend, &fast_options().serial("22222222")).unwrap();
    assert_eq!(
        atten.device().transport().path().to_str().unwrap(),
        "/dev/hidraw1"
    );
    assert!(!busy.is_open());
}

#[test]
fn test_serial_scan_skips_devices_that_reject_nonblocking() {
    let broken = attenuator("/dev/hidraw0", "22222222").failing_nonblocking();
    let target = attenuator("/dev/hidraw1", "22222222");
    let backend = MockBackend::new()
        .with_device(broken.clone())
        .with_device(target.clone());

    let atten = AttenuatorClient::open(&backend, &fast_options().serial("22222222")).unwrap();
    assert_eq!(
        atten.device().transport().path().to_str().unwrap(),
        "/dev/hidraw1"
    );
    assert_eq!(broken.open_count(), 1);
    assert!(!broken.is_open());
    assert!(broken.writes().is_empty());
    assert!(target.is_open());
}

#[test]
fn test_serial_scan_skips_silent_devices() {
    let silent = MockDevice::new(VENDOR_ID, SWITCH_PID, "/dev/hidraw0").silent();
    let target = MockDevice::new(VENDOR_ID, SWITCH_PID, "/dev/hidraw1")
        .with_serial(switch_attenuator::GET_SERIAL_NUMBER, "SW-7");
    let backend = MockBackend::new()
        .with_device(silent.clone())
        .with_device(target.clone());

    let sw = SwitchClient::open(&backend, &fast_options().serial("SW-7")).unwrap();
    assert!(target.is_open());
    assert!(!silent.is_open());
    drop(sw);
    assert!(!target.is_open());
}

#[test]
fn test_serial_not_found_closes_everything() {
    let devices: Vec<_> = (0..3)
        .map(|i| attenuator(&format!("/dev/hidraw{i}"), &format!("SN{i}")))
        .collect();
    let mut backend = MockBackend::new();
    for d in &devices {
        backend.add_device(d.clone());
    }

    match AttenuatorClient::open(&backend, &fast_options().serial("SN9")) {
        Err(Error::SerialNotFound { serial, candidates }) => {
            assert_eq!(serial, "SN9");
            assert_eq!(candidates, 3);
        }
        other => panic!("Expected SerialNotFound, got: {:?}", other.map(|_| ())),
    }
    for d in &devices {
        assert_eq!(d.open_count(), 1);
        assert!(!d.is_open());
    }
}

#[test]
fn test_power_sensor_serial_uses_its_own_command() {
    let sensor = MockDevice::new(VENDOR_ID, POWER_SENSOR_PID, "/dev/hidraw3")
        .with_serial(power_sensor::GET_SERIAL, "PWR-1");
    let backend = MockBackend::new().with_device(sensor.clone());

    PowerSensorClient::open(&backend, &fast_options().serial("PWR-1")).unwrap();
    assert_eq!(sensor.writes()[0][0], power_sensor::GET_SERIAL);
}

#[test]
fn test_open_by_vid_pid() {
    let sw = MockDevice::new(VENDOR_ID, SWITCH_PID, "/dev/hidraw0");
    let backend = MockBackend::new().with_device(sw.clone());

    let client = SwitchClient::open(&backend, &fast_options()).unwrap();
    assert!(sw.is_open());
    assert!(sw.is_nonblocking());
    // Direct open sends nothing.
    assert!(sw.writes().is_empty());
    drop(client);
}

#[test]
fn test_open_with_custom_ids() {
    let dev = MockDevice::new(0x1111, 0x2222, "/dev/hidraw0");
    let backend = MockBackend::new().with_device(dev.clone());

    let options = fast_options().vid(0x1111).pid(0x2222);
    assert!(SwitchClient::open(&backend, &options).is_ok());
}

#[test]
fn test_open_failure_carries_hint() {
    let backend = MockBackend::new();
    match PowerSensorClient::open(&backend, &fast_options()) {
        Err(e @ Error::DeviceOpen { .. }) => {
            if let Error::DeviceOpen { vid, pid, .. } = &e {
                assert_eq!(*vid, VENDOR_ID);
                assert_eq!(*pid, POWER_SENSOR_PID);
            }
            let message = e.to_string();
            assert!(message.contains("VID=20CE PID=0011"), "message: {message}");
            assert!(message.contains("udev"), "message: {message}");
        }
        other => panic!("Expected DeviceOpen, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_busy_device_fails_direct_open() {
    let busy = MockDevice::new(VENDOR_ID, ATTENUATOR_PID, "/dev/hidraw0").busy();
    let backend = MockBackend::new().with_device(busy);
    assert!(matches!(
        AttenuatorClient::open(&backend, &fast_options()),
        Err(Error::DeviceOpen { .. })
    ));
}
