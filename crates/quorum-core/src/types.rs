// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Quorum workspace.
//!
//! Storage row models live here (the storage crate re-exports them) so that
//! the engine and the persistence layer agree on one set of shapes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique, stable identifier for one tenant's transport session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(pub String);

impl SessionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        SessionKey(s.to_string())
    }
}

/// Connection state of a session, as persisted in the `sessions` table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    QrPending,
    Connected,
    Disconnected,
}

/// Why a session's transport surface went away.
///
/// Terminal reasons tear the session down entirely; a later request must
/// construct a fresh handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Explicit logout on the transport side.
    Logout,
    /// The transport surface navigated away from the session.
    Navigation,
    /// Abnormal low-level termination of the transport surface.
    PageClosed,
    /// Transport-reported reason with no special handling.
    Other(String),
}

impl DisconnectReason {
    /// Terminal reasons require full teardown; no automatic reconnect.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DisconnectReason::Logout | DisconnectReason::Navigation | DisconnectReason::PageClosed
        )
    }
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisconnectReason::Logout => write!(f, "LOGOUT"),
            DisconnectReason::Navigation => write!(f, "NAVIGATION"),
            DisconnectReason::PageClosed => write!(f, "PAGE_CLOSED"),
            DisconnectReason::Other(reason) => write!(f, "{reason}"),
        }
    }
}

/// Delivery state of a queued outbound item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    /// Claimed by a drain that has not finished delivering it yet.
    Sending,
    Sent,
    Failed,
}

/// Payload classification of a queued outbound item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum SendKind {
    Text,
    Poll,
    Media,
}

/// A row in the `sessions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_key: String,
    pub status: String,
    pub last_connected_at: Option<String>,
    pub last_disconnected_at: Option<String>,
    pub last_disconnect_reason: Option<String>,
    pub updated_at: String,
}

/// A row in the `send_queue` table: one outbound message awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: i64,
    pub session_key: String,
    pub recipient: String,
    /// One of `text`, `poll`, `media`. Unknown kinds are treated as text.
    pub kind: String,
    /// Opaque encoded payload; decoded by the drainer according to `kind`.
    pub payload: String,
    pub status: String,
    pub created_at: String,
}

/// A row in the `poll_records` table: a previously sent poll awaiting a vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRecord {
    /// Canonical long message id.
    pub message_id: String,
    /// Derived short id (final `_`-separated segment of `message_id`).
    pub message_id_short: String,
    pub session_key: String,
    pub recipient: Option<String>,
    /// JSON array of option labels, in send order.
    pub options: String,
    /// External business key, if any.
    pub correlation_id: Option<String>,
    /// Monotonic: once true it never reverts.
    pub answered: bool,
    /// JSON array of accepted labels.
    pub answer_labels: Option<String>,
    /// JSON of the raw selection from the winning vote event.
    pub answer_raw: Option<String>,
    pub order_number: Option<String>,
    pub answered_at: Option<String>,
}

impl PollRecord {
    /// Parse the stored option labels; malformed JSON yields an empty list.
    pub fn option_labels(&self) -> Vec<String> {
        serde_json::from_str(&self.options).unwrap_or_default()
    }
}

/// A row in the `poll_voters` table: one voter's participation in a poll.
///
/// Unique per (`session_key`, `poll_message_id`, `voter`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterRecord {
    pub session_key: String,
    pub poll_message_id: String,
    pub voter: String,
    /// JSON array of the labels the voter selected.
    pub option_labels: String,
    pub order_number: Option<String>,
    pub source: Option<String>,
    pub voted_at: String,
}

/// A rendered QR artifact for a session awaiting authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrArtifact {
    /// The raw payload issued by the transport.
    pub payload: String,
    /// Terminal-friendly unicode rendering; empty if rendering failed.
    pub rendered: String,
}

/// Outbound media resolved by the drainer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMedia {
    /// Fetch via the transport's URL-media constructor.
    Url(String),
    /// Inline decoded bytes with filename and mime type.
    Bytes {
        data: Vec<u8>,
        filename: String,
        mime_type: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_status_round_trips_through_strings() {
        for status in [
            SessionStatus::Uninitialized,
            SessionStatus::QrPending,
            SessionStatus::Connected,
            SessionStatus::Disconnected,
        ] {
            let s = status.to_string();
            assert_eq!(SessionStatus::from_str(&s).expect("should parse back"), status);
        }
        assert_eq!(SessionStatus::QrPending.to_string(), "qr_pending");
    }

    #[test]
    fn terminal_disconnect_reasons() {
        assert!(DisconnectReason::Logout.is_terminal());
        assert!(DisconnectReason::Navigation.is_terminal());
        assert!(DisconnectReason::PageClosed.is_terminal());
        assert!(!DisconnectReason::Other("CONNECTION_LOST".into()).is_terminal());
    }

    #[test]
    fn disconnect_reason_display() {
        assert_eq!(DisconnectReason::PageClosed.to_string(), "PAGE_CLOSED");
        assert_eq!(
            DisconnectReason::Other("TIMED_OUT".into()).to_string(),
            "TIMED_OUT"
        );
    }

    #[test]
    fn poll_record_option_labels_tolerates_bad_json() {
        let mut record = PollRecord {
            message_id: "m1".into(),
            message_id_short: "1".into(),
            session_key: "s1".into(),
            recipient: None,
            options: r#"["Yes","No"]"#.into(),
            correlation_id: None,
            answered: false,
            answer_labels: None,
            answer_raw: None,
            order_number: None,
            answered_at: None,
        };
        assert_eq!(record.option_labels(), vec!["Yes", "No"]);

        record.options = "not json".into();
        assert!(record.option_labels().is_empty());
    }

    #[test]
    fn send_kind_parses_db_strings() {
        assert_eq!(SendKind::from_str("poll").unwrap(), SendKind::Poll);
        assert!(SendKind::from_str("carrier-pigeon").is_err());
    }
}
