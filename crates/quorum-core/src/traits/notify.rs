// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink collaborator interface.
//!
//! State changes (QR ready, session ready, new message, vote recorded) are
//! pushed to observers fire-and-forget. Absence of a sink must not affect
//! core correctness, so the default implementation is a no-op.

/// Fire-and-forget observer of core state changes.
///
/// Implementations must not block; `emit` is called from session worker
/// loops and failures are the sink's own problem.
pub trait NotificationSink: Send + Sync {
    /// Emits `event` with `payload` on the given channel (the session key).
    fn emit(&self, channel: &str, event: &str, payload: serde_json::Value);
}

/// The default sink: discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn emit(&self, _channel: &str, _event: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_discards() {
        let sink = NoopSink;
        sink.emit("s1", "ready", serde_json::json!({}));
    }
}
