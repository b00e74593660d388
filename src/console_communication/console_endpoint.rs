use super::bridge_messages;
use crate::{error, info, warn};
use prost::Message;
use std::io::{Cursor, ErrorKind};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::net::tcp::{ReadHalf, WriteHalf};
use tokio::sync::broadcast;
use tokio::sync::oneshot;

/// Upper bound of a single framed console message.
const MAX_MESSAGE_LEN: u32 = 64 * 1024;

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    Connected,
    Disconnected,
    Message(bridge_messages::UpstreamContent),
}

pub(crate) struct ConsoleEndpoint {
    downstream_sender: broadcast::Sender<Option<Vec<u8>>>,
    upstream_event_receiver: broadcast::Receiver<ConsoleEvent>,
    close_oneshot_sender: Option<oneshot::Sender<()>>,
    local_addr: SocketAddr,
}

impl ConsoleEndpoint {
    async fn handle_connection_rx(
        socket: &mut ReadHalf<'_>,
        upstream_event_sender: &broadcast::Sender<ConsoleEvent>,
    ) -> Result<(), std::io::Error> {
        loop {
            let length = socket.read_u32().await?;
            if length > MAX_MESSAGE_LEN {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("console message of {length} bytes exceeds limit"),
                ));
            }

            let mut buffer = vec![0u8; length as usize];
            socket.read_exact(&mut buffer).await?;

            if let Ok(bridge_messages::Upstream { content: Some(content) }) =
                bridge_messages::Upstream::decode(&mut Cursor::new(buffer))
            {
                let _ = upstream_event_sender.send(ConsoleEvent::Message(content));
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn handle_connection_tx(
        socket: &mut WriteHalf<'_>,
        downstream_receiver: &mut broadcast::Receiver<Option<Vec<u8>>>,
    ) -> Result<(), std::io::Error> {
        while let Ok(Some(message_buffer)) = downstream_receiver.recv().await {
            socket.write_u32(message_buffer.len() as u32).await?;
            socket.write_all(&message_buffer).await?;
        }

        Ok(())
    }

    /// Binds the console listener and starts accepting connections.
    ///
    /// # Errors
    /// The bind error if `addr` cannot be listened on.
    pub(crate) fn start(addr: SocketAddr) -> Result<Self, std::io::Error> {
        let std_listener = std::net::TcpListener::bind(addr)?;
        std_listener.set_nonblocking(true)?;
        let listener = TcpListener::from_std(std_listener)?;
        let local_addr = listener.local_addr()?;

        let downstream_sender = broadcast::Sender::new(10);
        let upstream_event_sender = broadcast::Sender::new(10);
        let (close_oneshot_sender, mut close_oneshot_receiver) = oneshot::channel();
        let inst = Self {
            downstream_sender: downstream_sender.clone(),
            upstream_event_receiver: upstream_event_sender.subscribe(),
            close_oneshot_sender: Some(close_oneshot_sender),
            local_addr,
        };
        info!("Diagnostic console listening on {local_addr}.");

        tokio::spawn(async move {
            loop {
                let accept = tokio::select! {
                    accept = listener.accept() => accept,
                    _ = &mut close_oneshot_receiver => break
                };

                match accept {
                    Ok((mut socket, peer)) => {
                        let upstream_event_sender_local = upstream_event_sender.clone();
                        let mut downstream_receiver = downstream_sender.subscribe();
                        let _ = upstream_event_sender.send(ConsoleEvent::Connected);
                        info!("Console connected from {peer}.");

                        tokio::spawn(async move {
                            let (mut rx_socket, mut tx_socket) = socket.split();

                            let result = tokio::select! {
                                res = ConsoleEndpoint::handle_connection_tx(&mut tx_socket, &mut downstream_receiver) => res,
                                res = ConsoleEndpoint::handle_connection_rx(&mut rx_socket, &upstream_event_sender_local) => res
                            };

                            let _ = upstream_event_sender_local.send(ConsoleEvent::Disconnected);
                            match result {
                                Err(e)
                                    if e.kind() == ErrorKind::UnexpectedEof
                                        || e.kind() == ErrorKind::ConnectionReset
                                        || e.kind() == ErrorKind::ConnectionAborted =>
                                {
                                    info!("Console {peer} disconnected.");
                                    return;
                                }
                                Err(e) => {
                                    warn!("Closing connection to console due to {e:?}");
                                }
                                _ => {}
                            }
                            let _ = socket.shutdown().await;
                        });
                    }
                    Err(e) => {
                        error!("Console listener failed: {e}");
                        break;
                    }
                }
            }
        });
        Ok(inst)
    }

    pub(crate) fn send_downstream(&self, msg: bridge_messages::DownstreamContent) {
        let _ = self.downstream_sender.send(Some(
            bridge_messages::Downstream { content: Some(msg) }.encode_to_vec(),
        ));
    }

    pub(crate) fn is_console_connected(&self) -> bool { self.downstream_sender.receiver_count() > 0 }

    pub(crate) fn upstream_event_receiver(&self) -> &broadcast::Receiver<ConsoleEvent> {
        &self.upstream_event_receiver
    }

    pub(crate) fn local_addr(&self) -> SocketAddr { self.local_addr }
}

impl Drop for ConsoleEndpoint {
    fn drop(&mut self) {
        if let Some(sender) = self.close_oneshot_sender.take() {
            let _ = sender.send(());
        }
        let _ = self.downstream_sender.send(None);
    }
}
