use super::link::PeripheralLink;
use crate::{event, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Upper bound of reports handed over per poll, so a flooding device cannot
/// starve the shutdown check.
const MAX_REPORTS_PER_POLL: usize = 32;

/// Moves every waiting report from `link` into `on_data`.
///
/// Returns the number of reports delivered.
pub fn pump(link: &dyn PeripheralLink, on_data: &mut impl FnMut(Vec<u8>)) -> usize {
    let mut delivered = 0;
    while delivered < MAX_REPORTS_PER_POLL && link.data_available() {
        let Some(raw) = link.receive() else { break };
        on_data(raw);
        delivered += 1;
    }
    delivered
}

/// Receive worker of the peripheral link.
///
/// Polls the link for inbound reports and forwards the raw bytes to the
/// dispatch loop through `tx`; decoding happens on the dispatch side so that
/// all core state has a single writer. Reception is enabled on entry and
/// disabled, together with closing the link, once `c_tok` is cancelled.
pub async fn run_receiver(
    link: Arc<dyn PeripheralLink>,
    tx: mpsc::Sender<Vec<u8>>,
    poll_interval: Duration,
    c_tok: CancellationToken,
) {
    link.set_reception(true);
    let mut dropped_streak = false;
    let mut forward = |raw: Vec<u8>| match tx.try_send(raw) {
        Ok(()) => dropped_streak = false,
        Err(mpsc::error::TrySendError::Full(_)) => {
            if !dropped_streak {
                warn!("Inbound peripheral queue full, dropping reports.");
                dropped_streak = true;
            }
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            event!("Inbound peripheral queue closed, report discarded.");
        }
    };
    while !c_tok.is_cancelled() {
        pump(link.as_ref(), &mut forward);
        tokio::time::sleep(poll_interval).await;
    }
    link.set_reception(false);
    link.close();
    info!("Peripheral receiver stopped.");
}
