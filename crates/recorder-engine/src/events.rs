//! Event delivery from engine worker threads to the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use tracing::warn;

use recorder_ipc::{OutputSignal, SessionEvent};

/// Cloneable producer handle over the session's event channel.
///
/// Producers are engine worker-thread callbacks; every emit is a
/// non-blocking `try_send`. Events sharing a `(kind, id)` pair retain
/// enqueue order because they all pass through the one channel.
#[derive(Clone)]
pub struct EventBridge {
    tx: Sender<SessionEvent>,
    meters_enabled: Arc<AtomicBool>,
}

impl EventBridge {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self {
            tx,
            meters_enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enable or disable level-meter event delivery.
    pub fn set_meters_enabled(&self, enabled: bool) {
        self.meters_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn meters_enabled(&self) -> bool {
        self.meters_enabled.load(Ordering::SeqCst)
    }

    /// Emit a sink lifecycle event.
    pub fn emit_output(&self, signal: OutputSignal, code: i64) {
        self.push(SessionEvent::output(signal, code));
    }

    /// Emit a level-meter sample for the named endpoint.
    ///
    /// Suppressed at emission time while meters are disabled, so
    /// re-enabling never flushes a stale burst.
    pub fn emit_level(&self, endpoint: &str, magnitude: f32) {
        if !self.meters_enabled() {
            return;
        }
        self.push(SessionEvent::level(endpoint, magnitude));
    }

    /// Emit a size-change notification for the named endpoint.
    pub fn emit_source_resized(&self, endpoint: &str) {
        self.push(SessionEvent::source_resized(endpoint));
    }

    fn push(&self, event: SessionEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Drain pending events on the host control thread, invoking `handler`
/// once per event in enqueue order. Returns the number handled.
pub fn drain_events(rx: &Receiver<SessionEvent>, mut handler: impl FnMut(SessionEvent)) -> usize {
    let mut handled = 0;
    for event in rx.try_iter() {
        handler(event);
        handled += 1;
    }
    handled
}
