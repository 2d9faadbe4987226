// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-tenant session registry.
//!
//! One live transport handle per session key, ever. The registry owns the
//! handle map; a per-session worker task consumes that handle's event
//! stream and drives the qr_pending → connected → disconnected lifecycle.
//! Terminal disconnects tear the entry down, so the next request for the
//! same key builds a fresh handle and re-authenticates from scratch.
//!
//! Lock discipline: DashMap shard guards are never held across an await.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use quorum_core::types::QrArtifact;
use quorum_core::{
    DisconnectReason, NotificationSink, QuorumError, SendKind, SessionKey, SessionStatus,
    Transport, TransportEvent, TransportFactory,
};
use quorum_storage::Database;
use quorum_storage::queries::sessions;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{drainer, votes};

/// Mutable per-session state, owned by the worker and read by snapshots.
#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    ready: bool,
    qr: Option<QrArtifact>,
}

/// Point-in-time view of one session, for status surfaces.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub ready: bool,
    pub qr: Option<QrArtifact>,
}

struct SessionHandle {
    transport: Arc<dyn Transport>,
    state: Arc<Mutex<SessionState>>,
}

struct RegistryInner {
    db: Database,
    factory: Arc<dyn TransportFactory>,
    sink: Arc<dyn NotificationSink>,
    data_dir: PathBuf,
    sessions: DashMap<SessionKey, SessionHandle>,
}

/// The registry: session lookup, creation, send entry points, teardown.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

impl SessionRegistry {
    pub fn new(
        db: Database,
        factory: Arc<dyn TransportFactory>,
        sink: Arc<dyn NotificationSink>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                db,
                factory,
                sink,
                data_dir,
                sessions: DashMap::new(),
            }),
        }
    }

    /// Ensure a live handle exists for `key`, creating one if needed.
    ///
    /// Creation is atomic per key via the map's entry lock: two concurrent
    /// callers never produce two handles.
    pub fn ensure_session(&self, key: &SessionKey) -> Result<(), QuorumError> {
        if self.inner.sessions.contains_key(key) {
            return Ok(());
        }

        match self.inner.sessions.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(()),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                info!(session = %key, "creating transport session");
                let (transport, events) = self
                    .inner
                    .factory
                    .create(key, &self.inner.data_dir)?;
                let state = Arc::new(Mutex::new(SessionState::default()));
                entry.insert(SessionHandle {
                    transport: Arc::clone(&transport),
                    state: Arc::clone(&state),
                });

                tokio::spawn(session_worker(
                    Arc::clone(&self.inner),
                    key.clone(),
                    state,
                    events,
                ));

                // Initialization may block on authentication; detach it.
                let init_key = key.clone();
                tokio::spawn(async move {
                    if let Err(e) = transport.initialize().await {
                        error!(session = %init_key, error = %e, "transport initialization failed");
                    }
                });
                Ok(())
            }
        }
    }

    /// Accept an outbound item for `key`.
    ///
    /// The item always lands in the durable queue first; if the session is
    /// ready it drains immediately, which preserves insertion order behind
    /// anything still parked.
    pub async fn send(
        &self,
        key: &SessionKey,
        recipient: &str,
        kind: SendKind,
        payload: &str,
    ) -> Result<(), QuorumError> {
        self.ensure_session(key)?;
        let id =
            quorum_storage::queries::queue::enqueue(&self.inner.db, key, recipient, kind, payload)
                .await?;
        debug!(session = %key, id, kind = %kind, "outbound item queued");

        let handle = self.inner.sessions.get(key).map(|h| {
            let ready = h.state.lock().map(|s| s.ready).unwrap_or(false);
            (Arc::clone(&h.transport), ready)
        });
        if let Some((transport, true)) = handle {
            drainer::drain(&self.inner.db, transport.as_ref(), key).await?;
        }
        Ok(())
    }

    /// Current view of one session, if a handle exists.
    pub fn snapshot(&self, key: &SessionKey) -> Option<SessionSnapshot> {
        self.inner.sessions.get(key).map(|h| {
            let state = h.state.lock().expect("session state poisoned");
            SessionSnapshot {
                status: state.status,
                ready: state.ready,
                qr: state.qr.clone(),
            }
        })
    }

    /// Session keys with a live handle.
    pub fn active_keys(&self) -> Vec<SessionKey> {
        self.inner.sessions.iter().map(|e| e.key().clone()).collect()
    }

    /// Tear one session down: destroy the transport, drop the handle, and
    /// persist the disconnect.
    pub async fn teardown(&self, key: &SessionKey, reason: DisconnectReason) {
        let Some((_, handle)) = self.inner.sessions.remove(key) else {
            return;
        };
        info!(session = %key, reason = %reason, "tearing down session");
        if let Err(e) = handle.transport.destroy().await {
            warn!(session = %key, error = %e, "transport destroy failed");
        }
        if let Err(e) = sessions::mark_disconnected(&self.inner.db, key, &reason).await {
            warn!(session = %key, error = %e, "failed to persist disconnect");
        }
    }

    /// Tear every session down. Used on process shutdown.
    pub async fn shutdown(&self) {
        for key in self.active_keys() {
            self.teardown(&key, DisconnectReason::Other("SHUTDOWN".into()))
                .await;
        }
    }

    /// The shared database handle backing this registry.
    pub fn database(&self) -> &Database {
        &self.inner.db
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Uninitialized,
            ready: false,
            qr: None,
        }
    }
}

/// Per-session event loop. Runs until the stream closes or the session is
/// torn down by a terminal disconnect.
async fn session_worker(
    inner: Arc<RegistryInner>,
    key: SessionKey,
    state: Arc<Mutex<SessionState>>,
    mut events: mpsc::Receiver<TransportEvent>,
) {
    debug!(session = %key, "session worker started");
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Qr(payload) => {
                // A late QR after ready is stale; the transport already
                // authenticated on an earlier one.
                let stale = state.lock().map(|s| s.ready).unwrap_or(false);
                if stale {
                    debug!(session = %key, "ignoring stale QR after ready");
                    continue;
                }
                let artifact = crate::qr::render(&payload);
                if let Ok(mut s) = state.lock() {
                    s.status = SessionStatus::QrPending;
                    s.qr = Some(artifact);
                }
                info!(session = %key, "QR issued, awaiting scan");
                inner.sink.emit(
                    key.as_str(),
                    "qr",
                    serde_json::json!({ "qr": payload }),
                );
                if let Err(e) =
                    sessions::upsert_status(&inner.db, &key, SessionStatus::QrPending).await
                {
                    warn!(session = %key, error = %e, "failed to persist qr_pending status");
                }
            }
            TransportEvent::Authenticated => {
                debug!(session = %key, "transport authenticated");
            }
            TransportEvent::Ready => {
                if let Ok(mut s) = state.lock() {
                    s.status = SessionStatus::Connected;
                    s.ready = true;
                    s.qr = None;
                }
                info!(session = %key, "session ready");
                inner
                    .sink
                    .emit(key.as_str(), "ready", serde_json::json!({}));
                if let Err(e) = sessions::mark_connected(&inner.db, &key).await {
                    warn!(session = %key, error = %e, "failed to persist connected status");
                }

                let transport = inner
                    .sessions
                    .get(&key)
                    .map(|h| Arc::clone(&h.transport));
                if let Some(transport) = transport {
                    match drainer::drain(&inner.db, transport.as_ref(), &key).await {
                        Ok(0) => {}
                        Ok(n) => info!(session = %key, delivered = n, "pending queue drained"),
                        Err(e) => warn!(session = %key, error = %e, "queue drain failed"),
                    }
                }
            }
            TransportEvent::Message(msg) => {
                debug!(session = %key, chat = msg.chat_id.as_deref().unwrap_or("?"), "inbound message");
                let payload = serde_json::to_value(&msg).unwrap_or_default();
                inner.sink.emit(key.as_str(), "new-message", payload.clone());
                inner.sink.emit(key.as_str(), "chat-updated", payload);
            }
            TransportEvent::VoteUpdate(vote) => {
                if let Err(e) =
                    votes::resolve(&inner.db, inner.sink.as_ref(), &key, &vote).await
                {
                    warn!(session = %key, error = %e, "vote resolution failed");
                }
            }
            TransportEvent::Disconnected(reason) => {
                if let Ok(mut s) = state.lock() {
                    s.status = SessionStatus::Disconnected;
                    s.ready = false;
                }
                warn!(session = %key, reason = %reason, "session disconnected");
                inner.sink.emit(
                    key.as_str(),
                    "disconnected",
                    serde_json::json!({ "reason": reason.to_string() }),
                );
                if let Err(e) = sessions::mark_disconnected(&inner.db, &key, &reason).await {
                    warn!(session = %key, error = %e, "failed to persist disconnect");
                }
                if reason.is_terminal() {
                    destroy_and_remove(&inner, &key).await;
                    break;
                }
            }
            TransportEvent::Closed => {
                if let Ok(mut s) = state.lock() {
                    s.status = SessionStatus::Disconnected;
                    s.ready = false;
                }
                warn!(session = %key, "transport surface closed");
                let reason = DisconnectReason::PageClosed;
                inner.sink.emit(
                    key.as_str(),
                    "disconnected",
                    serde_json::json!({ "reason": reason.to_string() }),
                );
                if let Err(e) = sessions::mark_disconnected(&inner.db, &key, &reason).await {
                    warn!(session = %key, error = %e, "failed to persist disconnect");
                }
                destroy_and_remove(&inner, &key).await;
                break;
            }
        }
    }
    debug!(session = %key, "session worker stopped");
}

async fn destroy_and_remove(inner: &RegistryInner, key: &SessionKey) {
    let handle = inner.sessions.remove(key);
    if let Some((_, handle)) = handle {
        if let Err(e) = handle.transport.destroy().await {
            warn!(session = %key, error = %e, "transport destroy failed");
        }
    }
    info!(session = %key, "session handle removed, next request starts fresh");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_uninitialized() {
        let state = SessionState::default();
        assert_eq!(state.status, SessionStatus::Uninitialized);
        assert!(!state.ready);
        assert!(state.qr.is_none());
    }
}
