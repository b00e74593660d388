use super::ConsoleMessenger;
use super::bridge_messages::{
    Downstream, DownstreamContent, InvokeAction, LinkState, ListActions, Ping, Upstream, UpstreamContent,
};
use crate::diagnostics::DiagnosticRegistry;
use crate::dispatch::BridgeView;
use prost::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

fn registry() -> DiagnosticRegistry {
    let mut registry = DiagnosticRegistry::new();
    registry.register("connection", || String::from("state: Connected"));
    registry
}

#[test]
fn test_invoke_known_and_unknown_action() {
    let registry = registry();
    let reply = ConsoleMessenger::handle_request(
        &registry,
        UpstreamContent::InvokeAction(InvokeAction { name: String::from("connection") }),
    );
    let Some(DownstreamContent::ActionResult(result)) = reply else { panic!("unexpected reply {reply:?}") };
    assert!(result.found);
    assert_eq!(result.output, "state: Connected");

    let reply = ConsoleMessenger::handle_request(
        &registry,
        UpstreamContent::InvokeAction(InvokeAction { name: String::from("reboot") }),
    );
    let Some(DownstreamContent::ActionResult(result)) = reply else { panic!("unexpected reply {reply:?}") };
    assert!(!result.found);
    assert_eq!(result.name, "reboot");
}

#[test]
fn test_list_and_ping() {
    let registry = registry();
    let reply = ConsoleMessenger::handle_request(&registry, UpstreamContent::ListActions(ListActions {}));
    assert_eq!(
        reply,
        Some(DownstreamContent::ActionList(super::bridge_messages::ActionList {
            names: vec![String::from("connection"), String::from("help")]
        }))
    );
    let reply = ConsoleMessenger::handle_request(
        &registry,
        UpstreamContent::Ping(Ping { echo: Some(String::from("hi")) }),
    );
    assert!(matches!(reply, Some(DownstreamContent::Pong(p)) if p.echo.as_deref() == Some("hi")));
}

async fn read_downstream(stream: &mut TcpStream) -> Downstream {
    let len = stream.read_u32().await.unwrap();
    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await.unwrap();
    Downstream::decode(buf.as_slice()).unwrap()
}

#[tokio::test]
async fn test_console_round_trip_over_tcp() {
    let (_view_tx, view_rx) = watch::channel(BridgeView::default());
    let c_tok = CancellationToken::new();
    let messenger =
        ConsoleMessenger::start("127.0.0.1:0".parse().unwrap(), Arc::new(registry()), view_rx, c_tok.clone())
            .unwrap();
    let mut stream = TcpStream::connect(messenger.local_addr()).await.unwrap();

    let request = Upstream {
        content: Some(UpstreamContent::InvokeAction(InvokeAction { name: String::from("connection") })),
    }
    .encode_to_vec();
    stream.write_u32(u32::try_from(request.len()).unwrap()).await.unwrap();
    stream.write_all(&request).await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match read_downstream(&mut stream).await.content {
                Some(DownstreamContent::ActionResult(result)) => break result,
                Some(DownstreamContent::Status(status)) => {
                    assert_eq!(status.state, LinkState::Disconnected as i32);
                }
                other => panic!("unexpected message {other:?}"),
            }
        }
    })
    .await
    .unwrap();
    assert!(result.found);
    assert_eq!(result.output, "state: Connected");

    c_tok.cancel();
    messenger.join().await;
}
