#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod config;
mod console_communication;
mod control;
mod diagnostics;
mod dispatch;
mod logger;
mod peripheral;
mod provider;
mod telemetry;
mod util;

use crate::config::BridgeConfig;
use crate::console_communication::ConsoleMessenger;
use crate::diagnostics::DiagnosticRegistry;
use crate::dispatch::{BridgeView, DispatchLoop};
use crate::logger::{ConsoleLog, LogSink};
use crate::peripheral::{PeripheralLink, UdpLink, run_receiver};
use crate::provider::SyntheticProvider;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let config = BridgeConfig::from_env();
    info!("Starting bridge as '{}'.", config.app_name);
    let c_tok = CancellationToken::new();

    let log: Arc<dyn LogSink> = Arc::new(ConsoleLog);
    let mut dispatch = DispatchLoop::new(config.clone(), SyntheticProvider::new(), log);
    let mut receiver_handle: Option<JoinHandle<()>> = None;

    if let Some(bind) = config.link_bind {
        let link: Arc<dyn PeripheralLink> = Arc::new(UdpLink::new(bind, config.link_peer));
        match link.open() {
            Ok(()) => {
                info!("Peripheral link bound to {bind}, sending to {}.", config.link_peer);
                let (tx, rx) = mpsc::channel(config.inbound_queue);
                receiver_handle = Some(tokio::spawn(run_receiver(
                    Arc::clone(&link),
                    tx,
                    config.receive_interval,
                    c_tok.clone(),
                )));
                dispatch = dispatch.with_link(link, rx);
            }
            Err(e) => warn!("Peripheral link on {bind} unavailable ({e}), running without peripheral."),
        }
    } else {
        info!("Peripheral link disabled.");
    }

    let mut registry = DiagnosticRegistry::new();
    BridgeView::register_actions(&dispatch.view(), &mut registry);
    let console = match ConsoleMessenger::start(
        config.console_addr,
        Arc::new(registry),
        dispatch.view(),
        c_tok.clone(),
    ) {
        Ok(console) => Some(console),
        Err(e) => {
            error!("Diagnostic console on {} unavailable: {e}", config.console_addr);
            None
        }
    };

    let dispatch_handle = tokio::spawn(dispatch.run(c_tok.clone()));

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Waiting for the shutdown signal failed: {e}");
    }
    info!("Shutdown requested.");
    c_tok.cancel();

    if let Err(e) = dispatch_handle.await {
        error!("Dispatch loop ended abnormally: {e}");
    }
    if let Some(handle) = receiver_handle {
        if let Err(e) = handle.await {
            error!("Peripheral receiver ended abnormally: {e}");
        }
    }
    if let Some(console) = console {
        console.join().await;
    }
    info!("Bridge stopped.");
}
