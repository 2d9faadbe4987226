// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier normalization for vote events.
//!
//! Transport ids come in long composite form (`true_123@c.us_ABC123`) and
//! several partial encodings. Everything here is pure string work so the
//! resolution path in [`crate::votes`] stays readable.

use std::sync::LazyLock;

use quorum_core::{SelectedOption, VoteEvent};
use regex::Regex;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// The final `_`-separated segment of a composite message id.
///
/// Returns `None` for empty input; an id with no underscores is its own
/// short form.
pub fn short_id(id: &str) -> Option<&str> {
    if id.is_empty() {
        return None;
    }
    id.rsplit('_').next()
}

/// The id of the poll a vote refers to, probing the event's redundant
/// identifier fields in fixed order: creation key (serialized, then raw id),
/// parent key (same order), then the quoted-stanza id.
pub fn parent_poll_id(vote: &VoteEvent) -> Option<&str> {
    let key_fields = [&vote.creation_key, &vote.parent_key];
    for key in key_fields.into_iter().flatten() {
        for candidate in [&key.serialized, &key.id] {
            if let Some(v) = candidate.as_deref() {
                if !v.is_empty() {
                    return Some(v);
                }
            }
        }
    }
    vote.quoted_stanza_id.as_deref().filter(|v| !v.is_empty())
}

/// Normalize a raw selection into option labels.
///
/// Integer indices resolve against the poll's stored option list.
/// Unresolvable entries are stringified as a last resort so the selection
/// is never silently lost.
pub fn selected_labels(selected: &[SelectedOption], options: &[String]) -> Vec<String> {
    selected
        .iter()
        .filter_map(|entry| match entry {
            SelectedOption::Named { name } => Some(name.clone()),
            SelectedOption::Index(i) => Some(
                usize::try_from(*i)
                    .ok()
                    .and_then(|i| options.get(i))
                    .cloned()
                    .unwrap_or_else(|| i.to_string()),
            ),
            SelectedOption::Label(label) => Some(label.clone()),
            SelectedOption::Other(value) => Some(value.to_string()),
        })
        .filter(|label| !label.is_empty())
        .collect()
}

/// First run of digits in a correlation id, as the business order number.
pub fn order_number(correlation_id: &str) -> Option<&str> {
    DIGITS.find(correlation_id).map(|m| m.as_str())
}

/// Direct (one-to-one) chats carry the `@c.us` suffix; groups use `@g.us`.
pub fn is_direct_chat(chat_id: &str) -> bool {
    chat_id.ends_with("@c.us")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::event::MessageKey;

    #[test]
    fn short_id_takes_the_final_segment() {
        assert_eq!(short_id("true_123@c.us_ABC123"), Some("ABC123"));
        assert_eq!(short_id("ABC123"), Some("ABC123"));
        assert_eq!(short_id(""), None);
    }

    #[test]
    fn parent_poll_id_probe_order() {
        let mut vote = VoteEvent {
            creation_key: Some(MessageKey {
                serialized: Some("true_1@c.us_A".into()),
                id: Some("A".into()),
            }),
            parent_key: Some(MessageKey {
                serialized: Some("true_1@c.us_B".into()),
                id: None,
            }),
            quoted_stanza_id: Some("C".into()),
            ..VoteEvent::default()
        };
        assert_eq!(parent_poll_id(&vote), Some("true_1@c.us_A"));

        vote.creation_key = Some(MessageKey {
            serialized: Some(String::new()),
            id: Some("A".into()),
        });
        assert_eq!(parent_poll_id(&vote), Some("A"));

        vote.creation_key = None;
        assert_eq!(parent_poll_id(&vote), Some("true_1@c.us_B"));

        vote.parent_key = None;
        assert_eq!(parent_poll_id(&vote), Some("C"));

        vote.quoted_stanza_id = None;
        assert_eq!(parent_poll_id(&vote), None);
    }

    #[test]
    fn selected_labels_resolves_all_shapes() {
        let options = vec!["Yes".to_string(), "No".to_string()];
        let selected = vec![
            SelectedOption::Named { name: "Yes".into() },
            SelectedOption::Index(1),
            SelectedOption::Index(9),
            SelectedOption::Label("Maybe".into()),
            SelectedOption::Other(serde_json::json!({"weird": true})),
        ];
        assert_eq!(
            selected_labels(&selected, &options),
            vec!["Yes", "No", "9", "Maybe", r#"{"weird":true}"#]
        );
    }

    #[test]
    fn order_number_extracts_first_digit_run() {
        assert_eq!(order_number("confirm:10000013"), Some("10000013"));
        assert_eq!(order_number("ORD-042-B7"), Some("042"));
        assert_eq!(order_number("no digits"), None);
    }

    #[test]
    fn chat_kind_by_suffix() {
        assert!(is_direct_chat("123@c.us"));
        assert!(!is_direct_chat("123@g.us"));
    }
}
