// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Poll records and the first-answer-wins claim.
//!
//! [`claim_answer`] is the single synchronization point for vote resolution:
//! the conditional UPDATE flips `answered` atomically, so exactly one caller
//! per poll ever observes a claim.

use quorum_core::{QuorumError, SessionKey};

use crate::database::Database;
use crate::models::PollRecord;

/// Persist a freshly sent poll. Replaces any stale row with the same id.
pub async fn insert_poll(db: &Database, record: &PollRecord) -> Result<(), QuorumError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO poll_records
                     (message_id, message_id_short, session_key, recipient,
                      options, correlation_id, answered)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                (
                    &record.message_id,
                    &record.message_id_short,
                    &record.session_key,
                    &record.recipient,
                    &record.options,
                    &record.correlation_id,
                ),
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one poll by its canonical message id.
pub async fn get_poll(
    db: &Database,
    message_id: &str,
) -> Result<Option<PollRecord>, QuorumError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("{POLL_COLUMNS} WHERE message_id = ?1"))?;
            let mut rows = stmt.query_map([&message_id], row_to_poll)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Locate the poll a vote refers to, within one session.
///
/// Vote events carry message ids in several shapes, so lookup probes in
/// order: exact long id, long-id suffix match on the short form, then the
/// stored short id.
pub async fn find_poll(
    db: &Database,
    key: &SessionKey,
    parent_id: Option<&str>,
    parent_short: Option<&str>,
) -> Result<Option<PollRecord>, QuorumError> {
    let session_key = key.as_str().to_string();
    let parent_id = parent_id.map(str::to_string);
    let parent_short = parent_short.map(str::to_string);
    db.connection()
        .call(move |conn| {
            if let Some(id) = &parent_id {
                let mut stmt = conn.prepare(&format!(
                    "{POLL_COLUMNS} WHERE session_key = ?1 AND message_id = ?2"
                ))?;
                let mut rows = stmt.query_map((&session_key, id), row_to_poll)?;
                if let Some(row) = rows.next().transpose()? {
                    return Ok(Some(row));
                }
            }
            if let Some(short) = &parent_short {
                let mut stmt = conn.prepare(&format!(
                    "{POLL_COLUMNS} WHERE session_key = ?1 AND message_id LIKE '%' || ?2 LIMIT 1"
                ))?;
                let mut rows = stmt.query_map((&session_key, short), row_to_poll)?;
                if let Some(row) = rows.next().transpose()? {
                    return Ok(Some(row));
                }

                let mut stmt = conn.prepare(&format!(
                    "{POLL_COLUMNS} WHERE session_key = ?1 AND message_id_short = ?2 LIMIT 1"
                ))?;
                let mut rows = stmt.query_map((&session_key, short), row_to_poll)?;
                if let Some(row) = rows.next().transpose()? {
                    return Ok(Some(row));
                }
            }
            Ok(None)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically claim the answer for an unanswered poll.
///
/// Returns `true` only for the caller whose UPDATE flipped `answered`;
/// every later caller gets `false` and must treat the poll as resolved.
pub async fn claim_answer(
    db: &Database,
    message_id: &str,
    answer_labels: &str,
    answer_raw: &str,
    order_number: Option<&str>,
) -> Result<bool, QuorumError> {
    let message_id = message_id.to_string();
    let answer_labels = answer_labels.to_string();
    let answer_raw = answer_raw.to_string();
    let order_number = order_number.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE poll_records
                 SET answered = 1,
                     answer_labels = ?2,
                     answer_raw = ?3,
                     order_number = COALESCE(?4, order_number),
                     answered_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE message_id = ?1 AND answered = 0",
                (&message_id, &answer_labels, &answer_raw, &order_number),
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

const POLL_COLUMNS: &str = "SELECT message_id, message_id_short, session_key, recipient, \
     options, correlation_id, answered, answer_labels, answer_raw, order_number, answered_at \
     FROM poll_records";

fn row_to_poll(row: &rusqlite::Row<'_>) -> Result<PollRecord, rusqlite::Error> {
    Ok(PollRecord {
        message_id: row.get(0)?,
        message_id_short: row.get(1)?,
        session_key: row.get(2)?,
        recipient: row.get(3)?,
        options: row.get(4)?,
        correlation_id: row.get(5)?,
        answered: row.get::<_, i64>(6)? != 0,
        answer_labels: row.get(7)?,
        answer_raw: row.get(8)?,
        order_number: row.get(9)?,
        answered_at: row.get(10)?,
    })
}
