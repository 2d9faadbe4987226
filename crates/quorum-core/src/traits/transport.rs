// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport collaborator interface.
//!
//! A transport handle is one tenant's live connection to the external chat
//! platform. The core never implements protocol details; it drives the
//! handle and consumes the event stream the factory hands back.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::QuorumError;
use crate::event::TransportEvent;
use crate::types::{OutboundMedia, SessionKey};

/// One live transport handle bound to a single session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Starts asynchronous initialization (authentication, connection).
    ///
    /// Returns once initialization is underway; readiness is signalled
    /// later via [`TransportEvent::Ready`] on the event stream.
    async fn initialize(&self) -> Result<(), QuorumError>;

    /// Sends a plain text message.
    async fn send_text(&self, recipient: &str, body: &str) -> Result<(), QuorumError>;

    /// Sends an interactive poll.
    ///
    /// Returns the transport-assigned message id of the poll message, which
    /// callers persist to correlate later vote events.
    async fn send_poll(
        &self,
        recipient: &str,
        question: &str,
        options: &[String],
    ) -> Result<String, QuorumError>;

    /// Sends media with an optional caption.
    async fn send_media(
        &self,
        recipient: &str,
        media: OutboundMedia,
        caption: Option<&str>,
    ) -> Result<(), QuorumError>;

    /// Tears the handle down, releasing transport-side resources.
    ///
    /// Best-effort: callers log failures and discard the handle regardless.
    async fn destroy(&self) -> Result<(), QuorumError>;
}

/// Constructs transport handles bound to per-session credential storage.
pub trait TransportFactory: Send + Sync {
    /// Creates a fresh handle for `session_key`, with durable credentials
    /// rooted under `data_dir`, plus the private event stream for that
    /// handle. At most one live handle per key is the registry's job, not
    /// the factory's.
    fn create(
        &self,
        session_key: &SessionKey,
        data_dir: &Path,
    ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), QuorumError>;
}
