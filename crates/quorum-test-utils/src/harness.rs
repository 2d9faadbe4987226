// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end test harness.
//!
//! Assembles a registry over a temp SQLite database, the mock transport
//! factory, and a recording sink, so tests drive real session lifecycles
//! without external services.

use std::sync::Arc;
use std::time::Duration;

use quorum_core::{QuorumError, SessionKey, TransportEvent, TransportFactory};
use quorum_engine::SessionRegistry;
use quorum_storage::Database;

use crate::mock_transport::{MockSession, MockTransportFactory};
use crate::recording_sink::RecordingSink;

pub struct TestHarness {
    pub db: Database,
    pub factory: Arc<MockTransportFactory>,
    pub sink: RecordingSink,
    pub registry: SessionRegistry,
    // Keeps the temp database directory alive for the harness lifetime.
    _dir: tempfile::TempDir,
}

impl TestHarness {
    pub async fn new() -> Result<Self, QuorumError> {
        let dir = tempfile::TempDir::new().map_err(|e| QuorumError::Storage {
            source: Box::new(e),
        })?;
        let db_path = dir.path().join("quorum-test.db");
        let db = Database::open(db_path.to_str().ok_or_else(|| {
            QuorumError::Internal("non-utf8 temp path".into())
        })?)
        .await?;

        let factory = Arc::new(MockTransportFactory::new());
        let factory_dyn: Arc<dyn TransportFactory> = factory.clone();
        let sink = RecordingSink::new();
        let registry = SessionRegistry::new(
            db.clone(),
            factory_dyn,
            Arc::new(sink.clone()),
            dir.path().join("sessions"),
        );

        Ok(Self {
            db,
            factory,
            sink,
            registry,
            _dir: dir,
        })
    }

    /// Create the session for `key` and return its mock endpoints.
    pub fn start_session(&self, key: &SessionKey) -> Result<MockSession, QuorumError> {
        self.registry.ensure_session(key)?;
        self.factory
            .session(key)
            .ok_or_else(|| QuorumError::Internal(format!("no mock session for {key}")))
    }

    /// Drive a session to ready and wait for the worker to catch up.
    pub async fn connect(&self, key: &SessionKey) -> Result<MockSession, QuorumError> {
        let session = self.start_session(key)?;
        session
            .events
            .send(TransportEvent::Ready)
            .await
            .map_err(|e| QuorumError::Internal(format!("event channel closed: {e}")))?;
        self.wait_ready(key, Duration::from_secs(2)).await?;
        Ok(session)
    }

    /// Poll until the registry reports the session ready.
    pub async fn wait_ready(&self, key: &SessionKey, timeout: Duration) -> Result<(), QuorumError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self
                .registry
                .snapshot(key)
                .is_some_and(|s| s.ready)
            {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(QuorumError::Timeout { duration: timeout });
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Poll until the registry no longer holds a handle for `key`.
    pub async fn wait_removed(
        &self,
        key: &SessionKey,
        timeout: Duration,
    ) -> Result<(), QuorumError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.registry.snapshot(key).is_none() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(QuorumError::Timeout { duration: timeout });
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
