//! Tests for the command/response transaction cycle, driven by mock devices.

use minicircuits_hid::mock::{response, MockDevice};
use minicircuits_hid::{
    CancelToken, Device, EngineConfig, Error, FrameAlignment, ATTENUATOR_PID, FRAME_SIZE,
    VENDOR_ID,
};
use std::time::{Duration, Instant};

/// Shows `trace!` frame dumps with `RUST_LOG=trace cargo test`.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Engine settings that keep tests fast.
fn fast_config() -> EngineConfig {
    init_logging();
    EngineConfig::default()
        .with_settle_delay(Duration::ZERO)
        .with_poll_interval(Duration::from_micros(100))
        .with_response_timeout(Duration::from_millis(200))
        .with_alignment(FrameAlignment::Native)
}

fn mock() -> MockDevice {
    MockDevice::new(VENDOR_ID, ATTENUATOR_PID, "/dev/hidraw-test")
}

#[test]
fn test_transact_writes_one_padded_frame() {
    let dev = mock();
    let mut device = Device::new(dev.open().unwrap(), fast_config()).unwrap();

    let resp = device.transact(19, &[23, 1]).unwrap();
    assert_eq!(resp.command(), 19);
    assert_eq!(resp.len(), FRAME_SIZE);

    let writes = dev.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].len(), FRAME_SIZE);
    assert_eq!(&writes[0][..3], &[19, 23, 1]);
    assert!(writes[0][3..].iter().all(|&b| b == 0));
}

#[test]
fn test_device_switches_to_nonblocking() {
    let dev = mock();
    assert!(!dev.is_nonblocking());
    let _device = Device::new(dev.open().unwrap(), fast_config()).unwrap();
    assert!(dev.is_nonblocking());
}

#[test]
fn test_transact_waits_through_empty_reads() {
    let dev = mock().with_empty_reads(5);
    let mut device = Device::new(dev.open().unwrap(), fast_config()).unwrap();
    assert_eq!(device.transact(18, &[]).unwrap().command(), 18);
}

#[test]
fn test_desync_is_an_error_for_every_command() {
    for command in [0u8, 1, 15, 40, 104, 255] {
        let dev = mock().with_responder(|frame| Some(response(frame[0].wrapping_add(1), &[7])));
        let mut device = Device::new(dev.open().unwrap(), fast_config()).unwrap();

        match device.transact(command, &[]) {
            Err(Error::ProtocolDesync {
                expected,
                actual,
                response,
            }) => {
                assert_eq!(expected, command);
                assert_eq!(actual, command.wrapping_add(1));
                assert_eq!(response.len(), FRAME_SIZE);
                assert_eq!(response[1], 7);
            }
            other => panic!("Expected ProtocolDesync, got: {:?}", other),
        }
        // No retry by default.
        assert_eq!(dev.writes().len(), 1);
    }
}

#[test]
fn test_desync_retry_resends_frame() {
    let mut first = true;
    let dev = mock().with_responder(move |frame| {
        if first {
            first = false;
            Some(response(0x55, &[]))
        } else {
            Some(response(frame[0], &[]))
        }
    });
    let config = fast_config().with_desync_retries(1);
    let mut device = Device::new(dev.open().unwrap(), config).unwrap();

    assert_eq!(device.transact(41, &[]).unwrap().command(), 41);
    assert_eq!(dev.writes().len(), 2);
}

#[test]
fn test_silent_device_times_out() {
    let dev = mock().silent();
    let config = fast_config().with_response_timeout(Duration::from_millis(30));
    let mut device = Device::new(dev.open().unwrap(), config).unwrap();

    let start = Instant::now();
    match device.transact(18, &[]) {
        Err(Error::ResponseTimeout { command, timeout }) => {
            assert_eq!(command, 18);
            assert_eq!(timeout, Duration::from_millis(30));
        }
        other => panic!("Expected ResponseTimeout, got: {:?}", other),
    }
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_cancelled_token_stops_transaction() {
    let dev = mock().silent();
    let token = CancelToken::new();
    let config = fast_config()
        .with_response_timeout(Duration::from_secs(30))
        .with_cancel_token(token.clone());
    let mut device = Device::new(dev.open().unwrap(), config).unwrap();

    let canceller = {
        let token = device.cancel_token();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            token.cancel();
        })
    };
    let result = device.transact(103, &[]);
    canceller.join().unwrap();
    assert!(matches!(result, Err(Error::Cancelled { command: 103 })));

    // Nothing is written while cancelled; reset makes the device usable again.
    let writes_before = dev.writes().len();
    assert!(matches!(device.transact(103, &[]), Err(Error::Cancelled { .. })));
    assert_eq!(dev.writes().len(), writes_before);
    token.reset();
    assert!(!token.is_cancelled());
}

#[test]
fn test_frame_overflow_writes_nothing() {
    let dev = mock();
    let mut device = Device::new(dev.open().unwrap(), fast_config()).unwrap();

    let params = [0u8; FRAME_SIZE];
    assert!(matches!(
        device.transact(1, &params),
        Err(Error::FrameOverflow { max: 63, actual: 64 })
    ));
    assert!(dev.writes().is_empty());

    // 63 parameter bytes still fit.
    assert!(device.transact(1, &params[..63]).is_ok());
}

#[test]
fn test_report_id_shifted_transport() {
    let dev = mock().with_alignment(FrameAlignment::ReportIdShifted);
    let config = EngineConfig {
        alignment: None,
        ..fast_config()
    };
    let mut device = Device::new(dev.open().unwrap(), config).unwrap();
    assert_eq!(device.alignment(), FrameAlignment::ReportIdShifted);

    assert_eq!(device.transact(19, &[23, 1]).unwrap().command(), 19);
    let writes = dev.writes();
    assert_eq!(writes[0].len(), FRAME_SIZE);
    assert_eq!(&writes[0][..4], &[0, 19, 23, 1]);
}

#[test]
fn test_alignment_override_wins() {
    let dev = mock().with_alignment(FrameAlignment::ReportIdShifted);
    let device = Device::new(dev.open().unwrap(), fast_config()).unwrap();
    assert_eq!(device.alignment(), FrameAlignment::Native);
}

#[test]
fn test_short_response_is_returned_as_is() {
    let dev = mock().with_responder(|frame| Some(vec![frame[0], 23]));
    let mut device = Device::new(dev.open().unwrap(), fast_config()).unwrap();

    let resp = device.transact(18, &[]).unwrap();
    assert_eq!(resp.as_bytes(), &[18, 23]);
    assert!(matches!(
        minicircuits_hid::decode::parse_fixed_point_attenuation(resp.as_bytes()),
        Err(Error::MalformedResponse { command: 18, .. })
    ));
}
