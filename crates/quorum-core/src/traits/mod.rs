// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the boundaries of the core.
//!
//! The chat transport and the notification sink are external systems; the
//! core consumes them only through these interfaces.

pub mod notify;
pub mod transport;

pub use notify::{NoopSink, NotificationSink};
pub use transport::{Transport, TransportFactory};
