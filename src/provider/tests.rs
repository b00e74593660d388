use super::{ControlEvent, DataPeriod, ProviderError, ProviderEvent, SyntheticProvider, TelemetryProvider};
use crate::telemetry::{SimVar, TelemetrySnapshot};
use strum::IntoEnumIterator;

fn subscribe_all(provider: &mut SyntheticProvider) {
    for var in SimVar::iter() {
        provider.add_to_subscription(var).unwrap();
    }
}

#[test]
fn test_synthetic_open_is_deferred() {
    let mut provider = SyntheticProvider::new();
    assert!(provider.drain_events().is_empty());
    provider.open("test").unwrap();
    assert_eq!(provider.add_to_subscription(SimVar::GForce), Err(ProviderError::NotConnected));
    assert_eq!(provider.drain_events(), vec![ProviderEvent::Open]);
    provider.add_to_subscription(SimVar::GForce).unwrap();
}

#[test]
fn test_synthetic_failing_opens() {
    let mut provider = SyntheticProvider::new().with_failing_opens(2);
    assert_eq!(provider.open("test"), Err(ProviderError::Unavailable));
    assert_eq!(provider.open("test"), Err(ProviderError::Unavailable));
    assert!(provider.open("test").is_ok());
}

#[test]
fn test_synthetic_delivers_full_width_payload() {
    let mut provider = SyntheticProvider::new();
    provider.open("test").unwrap();
    provider.drain_events();
    subscribe_all(&mut provider);
    provider.request_periodic_data(DataPeriod::Second).unwrap();
    let events = provider.drain_events();
    // a delivery is the only event of its drain so the poll stays short
    let [ProviderEvent::Data(values)] = events.as_slice() else {
        panic!("expected a single data event, got {events:?}");
    };
    let snapshot = TelemetrySnapshot::from_values(values).unwrap();
    assert!(snapshot.on_ground);
    assert_eq!(snapshot.flaps_handle_index, 1);
    // period of one second has not elapsed yet
    assert_eq!(provider.drain_events(), vec![ProviderEvent::Null]);
}

#[test]
fn test_synthetic_applies_control_events() {
    let mut provider = SyntheticProvider::new();
    assert_eq!(provider.transmit(ControlEvent::FlapsSet(2)), Err(ProviderError::NotConnected));
    provider.open("test").unwrap();
    provider.drain_events();
    subscribe_all(&mut provider);
    provider.transmit(ControlEvent::FlapsSet(3)).unwrap();
    provider.transmit(ControlEvent::ThrottleSet(40)).unwrap();
    assert!(matches!(provider.transmit(ControlEvent::FlapsSet(9)), Err(ProviderError::Rejected(_))));
    provider.request_periodic_data(DataPeriod::SimFrame).unwrap();
    let events = provider.drain_events();
    let Some(ProviderEvent::Data(values)) = events.first() else {
        panic!("expected data, got {events:?}");
    };
    let snapshot = TelemetrySnapshot::from_values(values).unwrap();
    assert_eq!(snapshot.flaps_handle_index, 3);
    assert_eq!(snapshot.throttle_lever_pct, 40.0);
}

#[test]
fn test_synthetic_session_ends_and_drops_subscription() {
    let mut provider = SyntheticProvider::new().with_session_length(1);
    provider.open("test").unwrap();
    provider.drain_events();
    subscribe_all(&mut provider);
    provider.request_periodic_data(DataPeriod::Once).unwrap();
    assert!(matches!(provider.drain_events().first(), Some(ProviderEvent::Data(_))));
    assert_eq!(provider.drain_events(), vec![ProviderEvent::Quit]);
    assert_eq!(provider.close(), Err(ProviderError::NotConnected));
    provider.open("test").unwrap();
    provider.drain_events();
    assert_eq!(provider.request_periodic_data(DataPeriod::Once), Err(ProviderError::Rejected("empty subscription".into())));
}
