use crate::console_communication::bridge_messages::{
    ActionList, ActionResult, DownstreamContent, LinkState, Pong, Status, UpstreamContent,
};
use crate::console_communication::console_endpoint::{ConsoleEndpoint, ConsoleEvent};
use crate::diagnostics::DiagnosticRegistry;
use crate::dispatch::{BridgeView, ConnectionState};
use crate::event;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Interval in which connection state changes are pushed to the console.
const STATUS_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Serves diagnostic action requests from the console and pushes connection
/// status changes to it.
pub struct ConsoleMessenger {
    endpoint: Arc<ConsoleEndpoint>,
    handle: JoinHandle<()>,
}

impl ConsoleMessenger {
    /// Starts the console endpoint on `addr` and the request handler.
    ///
    /// # Arguments
    /// * `addr` – Listen address of the console endpoint.
    /// * `registry` – Actions the console may invoke.
    /// * `view` – Published dispatch state, used for status pushes.
    /// * `c_tok` – Stops the handler once cancelled.
    ///
    /// # Errors
    /// The bind error of the endpoint.
    pub(crate) fn start(
        addr: SocketAddr,
        registry: Arc<DiagnosticRegistry>,
        view: watch::Receiver<BridgeView>,
        c_tok: CancellationToken,
    ) -> Result<Self, std::io::Error> {
        let endpoint = Arc::new(ConsoleEndpoint::start(addr)?);
        let mut receiver = endpoint.upstream_event_receiver().resubscribe();
        let endpoint_local = endpoint.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(STATUS_CHECK_INTERVAL);
            let mut last_state: Option<ConnectionState> = None;
            loop {
                tokio::select! {
                    () = c_tok.cancelled() => break,
                    event = receiver.recv() => match event {
                        Ok(ConsoleEvent::Connected) => {
                            last_state = Some(Self::push_status(&endpoint_local, &view));
                        }
                        Ok(ConsoleEvent::Disconnected) => {}
                        Ok(ConsoleEvent::Message(content)) => {
                            if let Some(reply) = Self::handle_request(&registry, content) {
                                endpoint_local.send_downstream(reply);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = ticker.tick() => {
                        let state = view.borrow().state;
                        if endpoint_local.is_console_connected() && last_state != Some(state) {
                            last_state = Some(Self::push_status(&endpoint_local, &view));
                        }
                    }
                }
            }
        });

        Ok(Self { endpoint, handle })
    }

    /// Builds the reply to one console request.
    pub(crate) fn handle_request(
        registry: &DiagnosticRegistry,
        content: UpstreamContent,
    ) -> Option<DownstreamContent> {
        match content {
            UpstreamContent::Ping(ping) => Some(DownstreamContent::Pong(Pong { echo: ping.echo })),
            UpstreamContent::InvokeAction(request) => {
                let output = registry.invoke(&request.name);
                Some(DownstreamContent::ActionResult(ActionResult {
                    found: output.is_some(),
                    output: output.unwrap_or_else(|| format!("unknown action '{}'", request.name)),
                    name: request.name,
                }))
            }
            UpstreamContent::ListActions(_) => {
                Some(DownstreamContent::ActionList(ActionList { names: registry.names() }))
            }
        }
    }

    fn push_status(endpoint: &ConsoleEndpoint, view: &watch::Receiver<BridgeView>) -> ConnectionState {
        let current = *view.borrow();
        event!("Pushing console status '{}'.", LinkState::from(current.state).as_str_name());
        endpoint.send_downstream(DownstreamContent::Status(Status::from_view(&current)));
        current.state
    }

    pub(crate) fn local_addr(&self) -> SocketAddr { self.endpoint.local_addr() }

    /// Waits for the request handler to stop after cancellation.
    pub(crate) async fn join(self) {
        let _ = self.handle.await;
    }
}
