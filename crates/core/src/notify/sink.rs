use std::sync::{Arc, Mutex};

use crate::io::output::NotificationSender;
use crate::types::{Notification, NotificationEvent};

/// Receives user-facing notifications from the runtime.
///
/// No de-duplication happens here; one-shot behaviour comes from the
/// state machine gate.
pub trait NotificationSink: Send {
    fn push(&self, notification: Notification);

    /// Surface a state machine event.
    fn notify(&self, event: NotificationEvent) {
        self.push(Notification::from(event));
    }
}

/// Forwards notifications into a bounded channel, dropping when full.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: NotificationSender,
}

impl ChannelSink {
    pub fn new(tx: NotificationSender) -> Self {
        Self { tx }
    }
}

impl NotificationSink for ChannelSink {
    fn push(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            tracing::warn!(error = %e, "notification channel unavailable, notification dropped");
        }
    }
}

/// Collects notifications in memory. Handy for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything pushed so far, oldest first.
    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn push(&self, notification: Notification) {
        if let Ok(mut v) = self.received.lock() {
            v.push(notification);
        }
    }
}
