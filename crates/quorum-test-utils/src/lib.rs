// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Quorum integration tests.
//!
//! Provides mock collaborators and harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockTransportFactory`] / [`MockTransport`] - Scriptable transport with
//!   injectable events and captured sends
//! - [`RecordingSink`] - Notification sink that records every emission
//! - [`TestHarness`] - Registry + temp database + mocks, fully assembled

pub mod harness;
pub mod mock_transport;
pub mod recording_sink;

pub use harness::TestHarness;
pub use mock_transport::{MockSession, MockTransport, MockTransportFactory, SentItem};
pub use recording_sink::{Emission, RecordingSink};
