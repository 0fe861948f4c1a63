use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::monitoring::domain::backend_monitor::BackendMonitor;
use crate::monitoring::domain::backend_status::BackendStatus;
use crate::monitoring::domain::detection_summary::DetectionSummary;
use crate::shared::cancellation::wait_unless_cancelled;

/// Messages sent from the poller thread.
#[derive(Debug, Clone)]
pub enum MonitorMessage {
    Status(BackendStatus),
    Summary(DetectionSummary),
    /// One endpoint failed this round; polling continues.
    Unavailable(String),
    Stopped,
}

/// Spawn a background poller for `/status` and `/summary`. Polls immediately,
/// then every `interval`. Returns the channel receiver and cancellation token.
pub fn spawn(
    monitor: Box<dyn BackendMonitor>,
    interval: Duration,
) -> (Receiver<MonitorMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<MonitorMessage>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        run_poller(&tx, &cancelled_clone, monitor.as_ref(), interval);
        let _ = tx.send(MonitorMessage::Stopped);
    });

    (rx, cancelled)
}

fn run_poller(
    tx: &Sender<MonitorMessage>,
    cancelled: &AtomicBool,
    monitor: &dyn BackendMonitor,
    interval: Duration,
) {
    loop {
        let status = match monitor.status() {
            Ok(status) => MonitorMessage::Status(status),
            Err(e) => MonitorMessage::Unavailable(e.to_string()),
        };
        let summary = match monitor.summary() {
            Ok(summary) => MonitorMessage::Summary(summary),
            Err(e) => MonitorMessage::Unavailable(e.to_string()),
        };
        if cancelled.load(Ordering::Relaxed) {
            return;
        }
        if tx.send(status).is_err() || tx.send(summary).is_err() {
            return;
        }
        if !wait_unless_cancelled(interval, cancelled) {
            return;
        }
    }
}
