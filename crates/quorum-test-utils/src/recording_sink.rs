// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink that records every emission for assertion.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use quorum_core::NotificationSink;

/// One recorded emission.
#[derive(Debug, Clone)]
pub struct Emission {
    pub channel: String,
    pub event: String,
    pub payload: serde_json::Value,
}

/// A sink that keeps everything emitted through it.
#[derive(Default, Clone)]
pub struct RecordingSink {
    emissions: Arc<Mutex<Vec<Emission>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All emissions so far, in order.
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions.lock().expect("emissions lock poisoned").clone()
    }

    /// Emissions with the given event name.
    pub fn named(&self, event: &str) -> Vec<Emission> {
        self.emissions()
            .into_iter()
            .filter(|e| e.event == event)
            .collect()
    }

    /// Poll until at least one emission with `event` exists, or time out.
    ///
    /// Worker loops emit asynchronously, so tests wait rather than sleep
    /// fixed amounts.
    pub async fn wait_for(&self, event: &str, timeout: Duration) -> Option<Emission> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(found) = self.named(event).into_iter().next() {
                return Some(found);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, channel: &str, event: &str, payload: serde_json::Value) {
        self.emissions
            .lock()
            .expect("emissions lock poisoned")
            .push(Emission {
                channel: channel.to_string(),
                event: event.to_string(),
                payload,
            });
    }
}
