use super::*;
use crate::telemetry::{DerivedMetrics, TelemetrySnapshot};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

fn sample_snapshot() -> TelemetrySnapshot {
    TelemetrySnapshot {
        yoke_x: -0.25,
        yoke_y: 0.5,
        elevator_trim_pct: -20.0,
        flaps_handle_index: 2,
        flaps_handle_positions: 5,
        flaps_left_pct: 40.0,
        flaps_right_pct: 40.0,
        throttle_lever_pct: 62.5,
        indicated_airspeed_kt: 97.5,
        g_force: 1.125,
        prop_rpm: 2410.0,
        engine_count: 2,
        gear_down: true,
        parking_brake: true,
        ..TelemetrySnapshot::default()
    }
}

fn sample_derived() -> DerivedMetrics {
    DerivedMetrics {
        angular_acceleration: [0.5, -1.25, 3.0],
        flaps_position_pct: 40.0,
        speed_to_cruise: 0.65,
        speed_to_takeoff: 1.5,
    }
}

/// Inverse of the outbound byte scaling, for checking tolerances.
fn unscale(byte: u8, range: (f64, f64)) -> f64 {
    f64::from(byte) / 255.0 * (range.1 - range.0) + range.0
}

#[test]
fn test_outbound_frame_layout() {
    let snapshot = sample_snapshot();
    let derived = sample_derived();
    let frame = OutboundFrame {
        snapshot: &snapshot,
        derived: &derived,
        data_valid: true,
        connected: true,
        flaps_follow_sim: true,
        throttle_follow_sim: false,
    };
    let buf = frame.encode().unwrap();
    assert_eq!(buf.len(), REPORT_SIZE);

    let mut r = FrameReader::new(&buf);
    assert_eq!(r.take::<u8>().unwrap(), 0x01);
    assert_eq!(r.take::<u8>().unwrap(), LAYOUT_VERSION);
    let flags = FrameFlags::from_bits(r.take::<u32>().unwrap());
    assert!(flags.contains(FrameFlags::DATA_VALID));
    assert!(flags.contains(FrameFlags::CONNECTED));
    assert!(flags.contains(FrameFlags::GEAR_DOWN));
    assert!(flags.contains(FrameFlags::PARKING_BRAKE));
    assert!(flags.contains(FrameFlags::FLAPS_FOLLOW_SIM));
    assert!(!flags.contains(FrameFlags::THROTTLE_FOLLOW_SIM));
    assert!(!flags.contains(FrameFlags::ON_GROUND));

    assert_eq!(r.take::<f32>().unwrap(), 97.5);
    assert_eq!(r.take::<f32>().unwrap(), 0.5);
    assert_eq!(r.take::<f32>().unwrap(), -1.25);
    assert_eq!(r.take::<f32>().unwrap(), 3.0);
    assert_eq!(r.take::<f32>().unwrap(), 1.125);
    assert_eq!(r.take::<u8>().unwrap(), 2);
    assert_eq!(r.take::<u8>().unwrap(), 5);

    let step = |range: (f64, f64)| (range.1 - range.0) / 255.0;
    let flaps = unscale(r.take::<u8>().unwrap(), (0.0, 100.0));
    assert!((flaps - 40.0).abs() <= step((0.0, 100.0)));
    let throttle = unscale(r.take::<u8>().unwrap(), (0.0, 100.0));
    assert!((throttle - 62.5).abs() <= step((0.0, 100.0)));
    let trim = unscale(r.take::<u8>().unwrap(), (-100.0, 100.0));
    assert!((trim + 20.0).abs() <= step((-100.0, 100.0)));
    let to_cruise = unscale(r.take::<u8>().unwrap(), (0.0, 2.0));
    assert!((to_cruise - 0.65).abs() <= step((0.0, 2.0)));
    let to_takeoff = unscale(r.take::<u8>().unwrap(), (0.0, 2.0));
    assert!((to_takeoff - 1.5).abs() <= step((0.0, 2.0)));

    assert_eq!(r.take::<u16>().unwrap(), 2410);
    assert_eq!(r.take::<u8>().unwrap(), 2);
    assert_eq!(r.take::<f32>().unwrap(), -0.25);
    assert_eq!(r.take::<f32>().unwrap(), 0.5);
    assert_eq!(r.take_bytes(3).unwrap(), b"SIM");
    assert!(buf[r.position()..].iter().all(|b| *b == 0));
}

#[test]
fn test_outbound_scaled_fields_clamp() {
    let mut snapshot = sample_snapshot();
    snapshot.throttle_lever_pct = 130.0;
    snapshot.elevator_trim_pct = -180.0;
    let mut derived = sample_derived();
    derived.speed_to_cruise = 3.2;
    let frame = OutboundFrame {
        snapshot: &snapshot,
        derived: &derived,
        data_valid: false,
        connected: false,
        flaps_follow_sim: false,
        throttle_follow_sim: false,
    };
    let buf = frame.encode().unwrap();
    assert_eq!(buf[29], 255);
    assert_eq!(buf[30], 0);
    assert_eq!(buf[31], 255);
    assert_eq!(FrameFlags::from_bits(u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]])).bits() & 1, 0);
}

#[test]
fn test_outbound_nan_fields_encode_as_zero() {
    let mut snapshot = sample_snapshot();
    snapshot.elevator_trim_pct = f64::NAN;
    snapshot.throttle_lever_pct = f64::INFINITY;
    let mut derived = sample_derived();
    derived.flaps_position_pct = f64::NAN;
    let frame = OutboundFrame {
        snapshot: &snapshot,
        derived: &derived,
        data_valid: true,
        connected: true,
        flaps_follow_sim: false,
        throttle_follow_sim: false,
    };
    let buf = frame.encode().unwrap();
    assert_eq!(buf[28], 0);
    assert_eq!(buf[29], 255);
    assert_eq!(buf[30], 0);
    assert_eq!(&buf[44..47], b"SIM");
}

fn inbound_report(flaps: u8, throttle: u16, buttons: u16) -> Vec<u8> {
    let mut raw = vec![0u8; REPORT_SIZE];
    let mut w = FrameWriter::new(&mut raw);
    w.put(0x02u8).unwrap();
    w.put(flaps).unwrap();
    w.put(throttle).unwrap();
    w.put(buttons).unwrap();
    raw
}

#[test]
fn test_inbound_decode() {
    let obs = PeripheralObservation::decode(&inbound_report(3, 2048, 0b101)).unwrap();
    assert_eq!(obs.requested_flaps_index, 3);
    assert_eq!(obs.throttle_axis, 2048);
    assert!(obs.button(0));
    assert!(!obs.button(1));
    assert!(obs.button(2));
    assert!(!obs.button(40));
    assert_eq!(obs.throttle_pct(), Ok(50));
}

#[test]
fn test_inbound_throttle_full_scale() {
    let obs = PeripheralObservation::decode(&inbound_report(0, THROTTLE_AXIS_MAX, 0)).unwrap();
    assert_eq!(obs.throttle_pct(), Ok(100));
    let obs = PeripheralObservation::decode(&inbound_report(0, u16::MAX, 0)).unwrap();
    assert_eq!(obs.throttle_pct(), Ok(100));
}

#[test]
fn test_inbound_rejects_wrong_length() {
    let mut raw = inbound_report(1, 1, 1);
    raw.truncate(3);
    assert_eq!(
        PeripheralObservation::decode(&raw),
        Err(FrameError::WrongLength { expected: REPORT_SIZE, actual: 3 })
    );
    raw.resize(REPORT_SIZE + 1, 0);
    assert!(PeripheralObservation::decode(&raw).is_err());
}

#[test]
fn test_cursor_bounds() {
    let mut buf = [0u8; 3];
    let mut w = FrameWriter::new(&mut buf);
    w.put(0xABCDu16).unwrap();
    assert_eq!(
        w.put(7u16),
        Err(FrameError::Truncated { offset: 2, needed: 2, len: 3 })
    );
    w.put(0x11u8).unwrap();
    assert_eq!(w.put_bytes(b"x"), Err(FrameError::Truncated { offset: 3, needed: 1, len: 3 }));

    let mut r = FrameReader::new(&buf);
    assert_eq!(r.take::<u16>(), Ok(0xABCD));
    assert_eq!(r.take::<u32>(), Err(FrameError::Truncated { offset: 2, needed: 4, len: 3 }));
    assert_eq!(r.take::<u8>(), Ok(0x11));
    assert!(r.skip(1).is_err());
}

#[derive(Default)]
struct QueueLink {
    inbound: Mutex<VecDeque<Vec<u8>>>,
    reception: AtomicBool,
}

impl PeripheralLink for QueueLink {
    fn open(&self) -> Result<(), LinkError> { Ok(()) }
    fn close(&self) {}
    fn set_reception(&self, enabled: bool) { self.reception.store(enabled, Ordering::Relaxed); }
    fn data_available(&self) -> bool { !self.inbound.lock().unwrap().is_empty() }
    fn receive(&self) -> Option<Vec<u8>> { self.inbound.lock().unwrap().pop_front() }
    fn send(&self, _report: &[u8]) {}
}

#[test]
fn test_pump_delivers_waiting_reports() {
    let link = QueueLink::default();
    for i in 0..3u8 {
        link.inbound.lock().unwrap().push_back(vec![i]);
    }
    let mut seen = Vec::new();
    assert_eq!(pump(&link, &mut |raw| seen.push(raw[0])), 3);
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(pump(&link, &mut |_| panic!("queue should be empty")), 0);
}

#[test]
fn test_pump_bounded_per_poll() {
    let link = QueueLink::default();
    for _ in 0..100 {
        link.inbound.lock().unwrap().push_back(vec![0]);
    }
    let first = pump(&link, &mut |_| {});
    assert!(first < 100);
    let mut total = first;
    while total < 100 {
        total += pump(&link, &mut |_| {});
    }
    assert_eq!(total, 100);
}

#[tokio::test]
async fn test_receiver_forwards_and_stops() {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    let link = Arc::new(QueueLink::default());
    link.inbound.lock().unwrap().push_back(inbound_report(1, 0, 0));
    let (tx, mut rx) = mpsc::channel(4);
    let c_tok = CancellationToken::new();
    let worker = tokio::spawn(run_receiver(
        Arc::clone(&link) as Arc<dyn PeripheralLink>,
        tx,
        Duration::from_millis(1),
        c_tok.clone(),
    ));
    let raw = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
    assert_eq!(raw.len(), REPORT_SIZE);
    assert!(link.reception.load(Ordering::Relaxed));
    c_tok.cancel();
    worker.await.unwrap();
    assert!(!link.reception.load(Ordering::Relaxed));
}

#[test]
fn test_udp_link_exchanges_reports() {
    let any: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let device = UdpLink::new(any, "127.0.0.1:9".parse().unwrap());
    device.open().unwrap();
    device.set_reception(true);
    let bridge = UdpLink::new(any, device.local_addr().unwrap());
    bridge.open().unwrap();

    bridge.send(&inbound_report(4, 10, 0));
    let mut received = None;
    for _ in 0..200 {
        if device.data_available() {
            received = device.receive();
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    let raw = received.expect("no datagram arrived");
    assert_eq!(PeripheralObservation::decode(&raw).unwrap().requested_flaps_index, 4);

    device.set_reception(false);
    bridge.send(&inbound_report(5, 10, 0));
    std::thread::sleep(std::time::Duration::from_millis(20));
    assert!(!device.data_available());
    device.close();
    assert!(device.local_addr().is_none());
}

#[test]
fn test_udp_link_flags_oversized_datagram() {
    let any: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let device = UdpLink::new(any, "127.0.0.1:9".parse().unwrap());
    device.open().unwrap();
    device.set_reception(true);
    let sender = std::net::UdpSocket::bind(any).unwrap();
    sender.send_to(&[7u8; 100], device.local_addr().unwrap()).unwrap();

    let mut waiting = false;
    for _ in 0..200 {
        if device.data_available() {
            waiting = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(waiting);
    if let Some(raw) = device.receive() {
        assert!(matches!(
            PeripheralObservation::decode(&raw),
            Err(FrameError::WrongLength { expected: REPORT_SIZE, .. })
        ));
    }
}
