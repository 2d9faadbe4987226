// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session engine for the Quorum messaging gateway.
//!
//! Owns the multi-tenant session registry, the pending-queue drainer, and
//! poll-vote resolution. The engine is transport-agnostic: it drives any
//! [`quorum_core::Transport`] the factory produces and persists everything
//! through quorum-storage.

pub mod drainer;
pub mod ident;
pub mod qr;
pub mod registry;
pub mod votes;

pub use registry::{SessionRegistry, SessionSnapshot};
