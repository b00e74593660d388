use crate::warn;
use std::env;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_APP_NAME: &str = "sim-hid-bridge";
const DEFAULT_LINK_BIND: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 34560));
const DEFAULT_LINK_PEER: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 34561));
const DEFAULT_CONSOLE_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 1337));

/// Runtime settings of the bridge, read from `BRIDGE_*` environment variables.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Name under which the session with the provider is opened.
    pub app_name: String,
    /// Poll interval while data is flowing.
    pub poll_short: Duration,
    /// Poll interval while connected but idle.
    pub poll_normal: Duration,
    /// Poll interval while no session exists.
    pub poll_long: Duration,
    /// Minimum time between two reports sent to the peripheral.
    pub min_send_interval: Duration,
    /// Poll interval of the peripheral receive worker.
    pub receive_interval: Duration,
    /// Arbiter lock length in inbound reports, per surface.
    pub flaps_cooldown: u16,
    pub throttle_cooldown: u16,
    /// UDP endpoints of the peripheral link; `None` runs without a peripheral.
    pub link_bind: Option<SocketAddr>,
    pub link_peer: SocketAddr,
    /// Listen address of the diagnostic console.
    pub console_addr: SocketAddr,
    /// Capacity of the queue between receive worker and dispatch loop.
    pub inbound_queue: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_name: String::from(DEFAULT_APP_NAME),
            poll_short: Duration::from_millis(1),
            poll_normal: Duration::from_millis(10),
            poll_long: Duration::from_millis(500),
            min_send_interval: Duration::from_millis(20),
            receive_interval: Duration::from_millis(5),
            flaps_cooldown: 10,
            throttle_cooldown: 10,
            link_bind: Some(DEFAULT_LINK_BIND),
            link_peer: DEFAULT_LINK_PEER,
            console_addr: DEFAULT_CONSOLE_ADDR,
            inbound_queue: 64,
        }
    }
}

impl BridgeConfig {
    /// Builds the configuration from the process environment.
    ///
    /// Unset variables keep their default; unparsable ones keep their default
    /// and produce a warning.
    pub fn from_env() -> Self { Self::from_lookup(|key| env::var(key).ok()) }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let ms = |key: &str, default: Duration| {
            Duration::from_millis(parse_or(&lookup, key, default.as_millis().try_into().unwrap_or(u64::MAX)))
        };
        let link_bind = match lookup("BRIDGE_LINK_BIND").as_deref() {
            Some("off" | "none" | "") => None,
            _ => Some(parse_or(&lookup, "BRIDGE_LINK_BIND", DEFAULT_LINK_BIND)),
        };
        Self {
            app_name: lookup("BRIDGE_APP_NAME").unwrap_or(d.app_name),
            poll_short: ms("BRIDGE_POLL_SHORT_MS", d.poll_short),
            poll_normal: ms("BRIDGE_POLL_NORMAL_MS", d.poll_normal),
            poll_long: ms("BRIDGE_POLL_LONG_MS", d.poll_long),
            min_send_interval: ms("BRIDGE_SEND_INTERVAL_MS", d.min_send_interval),
            receive_interval: ms("BRIDGE_RECEIVE_INTERVAL_MS", d.receive_interval),
            flaps_cooldown: parse_or(&lookup, "BRIDGE_FLAPS_COOLDOWN", d.flaps_cooldown),
            throttle_cooldown: parse_or(&lookup, "BRIDGE_THROTTLE_COOLDOWN", d.throttle_cooldown),
            link_bind,
            link_peer: parse_or(&lookup, "BRIDGE_LINK_PEER", d.link_peer),
            console_addr: parse_or(&lookup, "BRIDGE_CONSOLE_ADDR", d.console_addr),
            inbound_queue: parse_or(&lookup, "BRIDGE_INBOUND_QUEUE", d.inbound_queue).max(1),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value '{raw}' for {key}, using default.");
            default
        }),
    }
}
