use crate::dispatch::{BridgeView, ConnectionState};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Upstream {
    #[prost(oneof = "UpstreamContent", tags = "1, 2, 3")]
    pub content: Option<UpstreamContent>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ping {
    #[prost(string, optional, tag = "1")]
    pub echo: Option<String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Downstream {
    #[prost(oneof = "DownstreamContent", tags = "1, 2, 3, 4")]
    pub content: Option<DownstreamContent>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Pong {
    #[prost(string, optional, tag = "1")]
    pub echo: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeAction {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ListActions {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionResult {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub output: String,
    /// False if no action is registered under `name`.
    #[prost(bool, tag = "3")]
    pub found: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionList {
    #[prost(string, repeated, tag = "1")]
    pub names: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(enumeration = "LinkState", tag = "2")]
    pub state: i32,
    #[prost(bool, tag = "3")]
    pub data_valid: bool,
    #[prost(uint64, tag = "4")]
    pub reports_sent: u64,
}

impl Status {
    pub(crate) fn from_view(view: &BridgeView) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            state: LinkState::from(view.state) as i32,
            data_valid: view.data_valid,
            reports_sent: view.reports_sent,
        }
    }
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum DownstreamContent {
    #[prost(message, tag = "1")]
    Pong(Pong),
    #[prost(message, tag = "2")]
    ActionResult(ActionResult),
    #[prost(message, tag = "3")]
    ActionList(ActionList),
    #[prost(message, tag = "4")]
    Status(Status),
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum UpstreamContent {
    #[prost(message, tag = "1")]
    Ping(Ping),
    #[prost(message, tag = "2")]
    InvokeAction(InvokeAction),
    #[prost(message, tag = "3")]
    ListActions(ListActions),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LinkState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl LinkState {
    /// String value of the enum field names used in the `ProtoBuf` definition.
    pub fn as_str_name(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl From<ConnectionState> for LinkState {
    fn from(value: ConnectionState) -> Self {
        match value {
            ConnectionState::Disconnected => Self::Disconnected,
            ConnectionState::Connecting => Self::Connecting,
            ConnectionState::Connected => Self::Connected,
        }
    }
}
