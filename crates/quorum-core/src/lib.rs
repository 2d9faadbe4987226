// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Quorum messaging gateway.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Quorum workspace: the transport and
//! notification-sink collaborator interfaces, the transport event model,
//! and the storage row shapes.

pub mod error;
pub mod event;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::QuorumError;
pub use event::{InboundMessage, SelectedOption, TransportEvent, VoteEvent};
pub use types::{DisconnectReason, QueueStatus, SendKind, SessionKey, SessionStatus};

pub use traits::{NoopSink, NotificationSink, Transport, TransportFactory};
