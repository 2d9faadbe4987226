// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Quorum: session lifecycle rows, the durable send
//! queue, poll records, and the voter ledger.
//!
//! Single-writer design: one [`Database`] handle per process, all access
//! funneled through tokio-rusqlite's background thread. Query modules are
//! free functions taking `&Database` so callers never touch rusqlite types.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
