// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport event model.
//!
//! The external transport delivers events per session, possibly duplicated
//! and out of order. Vote events arrive with several redundant identifier
//! encodings; rather than probing loosely-typed fields throughout the core,
//! the whole shape is deserialized once at the boundary into [`VoteEvent`]
//! and normalized by the engine's identifier functions.

use serde::{Deserialize, Serialize};

use crate::types::DisconnectReason;

/// One event delivered on a session's inbound stream.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A QR payload was issued for authentication.
    Qr(String),
    /// The transport authenticated; observability only.
    Authenticated,
    /// The session is fully connected and can send.
    Ready,
    /// An inbound chat message.
    Message(InboundMessage),
    /// A vote was cast on a previously sent poll.
    VoteUpdate(VoteEvent),
    /// The transport reported a disconnect with a reason.
    Disconnected(DisconnectReason),
    /// Abnormal low-level termination of the transport surface, distinct
    /// from the transport's own disconnect event.
    Closed,
}

/// An inbound chat message, as much of it as the core observes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundMessage {
    pub id: Option<String>,
    #[serde(alias = "chatId")]
    pub chat_id: Option<String>,
    pub sender: Option<String>,
    pub body: Option<String>,
    pub timestamp: Option<i64>,
}

/// A composite message key as the transport serializes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageKey {
    #[serde(alias = "_serialized")]
    pub serialized: Option<String>,
    pub id: Option<String>,
}

/// One entry of a vote's raw selection.
///
/// The transport emits selections in several shapes: `{name}` objects,
/// integer indices into the poll's option list, or bare label strings.
/// Anything else is kept as raw JSON and stringified as a last resort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedOption {
    Named { name: String },
    Index(i64),
    Label(String),
    Other(serde_json::Value),
}

/// A poll-vote event as delivered by the transport.
///
/// Identifier fields are redundant and any subset may be present; the
/// engine probes them in a fixed order. Voter identity likewise appears
/// under several names depending on the chat kind and transport version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteEvent {
    /// Key of the poll-creation message, when the transport attaches it.
    #[serde(alias = "pollCreationMessageKey")]
    pub creation_key: Option<MessageKey>,
    /// Alternate parent-key form.
    #[serde(alias = "parentMessageKey")]
    pub parent_key: Option<MessageKey>,
    /// Quoted-stanza id, the weakest correlation form.
    #[serde(alias = "quotedStanzaID")]
    pub quoted_stanza_id: Option<String>,

    /// Raw selection; may be absent or malformed.
    #[serde(alias = "selectedOptions")]
    pub selected: Vec<SelectedOption>,

    // Voter-identity candidates, probed in declaration order.
    pub sender: Option<String>,
    pub author: Option<String>,
    pub from: Option<String>,
    #[serde(alias = "voterId")]
    pub voter_id: Option<String>,
    pub participant: Option<String>,

    /// The chat the vote arrived in; used to infer the voter in direct chats.
    #[serde(alias = "chatId")]
    pub chat_id: Option<String>,
    /// Business correlation key carried on the vote itself, if any.
    #[serde(alias = "correlationId")]
    pub correlation_id: Option<String>,
    pub timestamp: Option<i64>,
}

impl VoteEvent {
    /// First present, non-empty voter-identity field.
    pub fn voter_identity(&self) -> Option<&str> {
        [
            &self.sender,
            &self.author,
            &self.from,
            &self.voter_id,
            &self.participant,
        ]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .find(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_event_deserializes_wire_aliases() {
        let json = r#"{
            "pollCreationMessageKey": {"_serialized": "true_123@c.us_ABC_1", "id": "ABC"},
            "selectedOptions": [{"name": "Yes"}, 1, "No"],
            "voterId": "456@c.us",
            "chatId": "123@c.us"
        }"#;
        let vote: VoteEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            vote.creation_key.as_ref().unwrap().serialized.as_deref(),
            Some("true_123@c.us_ABC_1")
        );
        assert_eq!(vote.selected.len(), 3);
        assert!(matches!(vote.selected[0], SelectedOption::Named { ref name } if name == "Yes"));
        assert!(matches!(vote.selected[1], SelectedOption::Index(1)));
        assert!(matches!(vote.selected[2], SelectedOption::Label(ref l) if l == "No"));
        assert_eq!(vote.voter_identity(), Some("456@c.us"));
    }

    #[test]
    fn voter_identity_probe_order_and_empty_filtering() {
        let vote = VoteEvent {
            sender: Some(String::new()),
            author: Some("author@c.us".into()),
            from: Some("from@c.us".into()),
            ..VoteEvent::default()
        };
        assert_eq!(vote.voter_identity(), Some("author@c.us"));

        let empty = VoteEvent::default();
        assert_eq!(empty.voter_identity(), None);
    }

    #[test]
    fn malformed_selection_entries_fall_back_to_raw_json() {
        let json = r#"{"selected": [{"weird": true}]}"#;
        let vote: VoteEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(vote.selected[0], SelectedOption::Other(_)));
    }
}
