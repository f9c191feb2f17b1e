//! Progressive trace reveal
//!
//! Replays a finished trace one step at a time so a client can animate it.
//! The pause between steps is cosmetic; order is the only guarantee.

use crate::models::TraceStep;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Send `steps` in order, sleeping `delay` between consecutive steps.
///
/// The replay stops early if the receiver is dropped.
pub fn reveal(steps: Vec<TraceStep>, delay: Duration) -> mpsc::Receiver<TraceStep> {
    spawn_reveal(steps, delay).0
}

/// Like [`reveal`], also returning the replay task, which yields the number
/// of steps delivered.
fn spawn_reveal(
    steps: Vec<TraceStep>,
    delay: Duration,
) -> (mpsc::Receiver<TraceStep>, JoinHandle<usize>) {
    let (tx, rx) = mpsc::channel(steps.len().max(1));

    let task = tokio::spawn(async move {
        let mut sent = 0;
        for step in steps {
            if sent > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if tx.send(step).await.is_err() {
                debug!(revealed = sent, "Trace reveal receiver dropped");
                break;
            }
            sent += 1;
        }
        sent
    });

    (rx, task)
}
