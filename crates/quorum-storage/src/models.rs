// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types persisted by this crate.
//!
//! The shapes live in quorum-core so the engine can use them without a
//! storage dependency; this module re-exports them under the storage crate
//! for query-module signatures.

pub use quorum_core::types::{PollRecord, QueueItem, SessionRecord, VoterRecord};
