// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-answer-wins vote resolution.
//!
//! Concurrent votes on the same poll race through [`polls::claim_answer`]'s
//! conditional UPDATE; exactly one caller wins, records the winning voter,
//! and publishes the result. Votes arriving after a poll is answered are
//! dropped, so vote changes never overwrite the recorded answer.

use chrono::Utc;
use quorum_core::{NotificationSink, QuorumError, SessionKey, VoteEvent};
use quorum_storage::Database;
use quorum_storage::models::VoterRecord;
use quorum_storage::queries::{polls, voters};
use tracing::{debug, info};

use crate::ident;

/// Resolve one inbound vote event against the session's poll records.
pub async fn resolve(
    db: &Database,
    sink: &dyn NotificationSink,
    key: &SessionKey,
    vote: &VoteEvent,
) -> Result<(), QuorumError> {
    let Some(parent_id) = ident::parent_poll_id(vote) else {
        debug!(session = %key, "vote event carries no poll identifier, ignoring");
        return Ok(());
    };
    let parent_short = ident::short_id(parent_id);

    let Some(poll) = polls::find_poll(db, key, Some(parent_id), parent_short).await? else {
        debug!(session = %key, parent_id, "vote refers to an unknown poll, ignoring");
        return Ok(());
    };

    if poll.answered {
        debug!(session = %key, message_id = %poll.message_id, "poll already answered, vote dropped");
        return Ok(());
    }

    let labels = ident::selected_labels(&vote.selected, &poll.option_labels());
    if labels.is_empty() {
        debug!(session = %key, message_id = %poll.message_id, "vote carries no selection, ignoring");
        return Ok(());
    }

    let answer_labels = serde_json::to_string(&labels)
        .map_err(|e| QuorumError::Internal(format!("failed to encode answer labels: {e}")))?;
    let answer_raw = serde_json::to_string(&vote.selected)
        .map_err(|e| QuorumError::Internal(format!("failed to encode raw selection: {e}")))?;

    let correlation_id = poll
        .correlation_id
        .clone()
        .or_else(|| vote.correlation_id.clone());
    let order = correlation_id
        .as_deref()
        .and_then(ident::order_number)
        .map(str::to_string);

    let won = polls::claim_answer(
        db,
        &poll.message_id,
        &answer_labels,
        &answer_raw,
        order.as_deref(),
    )
    .await?;
    if !won {
        info!(session = %key, message_id = %poll.message_id, "lost answer race, vote dropped");
        return Ok(());
    }

    // Voter identity: the event's own fields first; in a direct chat the
    // counterparty is the only possible voter, so the poll's recipient
    // stands in when the event omits them.
    let voter = vote.voter_identity().map(str::to_string).or_else(|| {
        let direct = vote.chat_id.as_deref().is_some_and(ident::is_direct_chat);
        if direct {
            poll.recipient.clone()
        } else {
            None
        }
    });

    if let Some(voter) = &voter {
        let record = VoterRecord {
            session_key: key.as_str().to_string(),
            poll_message_id: poll.message_id.clone(),
            voter: voter.clone(),
            option_labels: answer_labels.clone(),
            order_number: order.clone(),
            source: Some("vote_update".to_string()),
            voted_at: Utc::now().to_rfc3339(),
        };
        // Insert-if-absent keeps a redelivered winning vote idempotent.
        let fresh = voters::record_voter(db, &record).await?;
        if !fresh {
            debug!(session = %key, message_id = %poll.message_id, voter = %voter, "voter already recorded");
        }
    } else {
        debug!(session = %key, message_id = %poll.message_id, "no voter identity, voter not recorded");
    }

    info!(
        session = %key,
        message_id = %poll.message_id,
        labels = %answer_labels,
        "poll answered"
    );
    sink.emit(
        key.as_str(),
        "poll_vote",
        serde_json::json!({
            "correlationId": correlation_id,
            "orderNumber": order,
            "recipient": poll.recipient,
            "messageId": poll.message_id,
            "labels": labels,
            "voter": voter,
        }),
    );
    Ok(())
}
