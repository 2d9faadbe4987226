// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-poll voter ledger.

use quorum_core::{QuorumError, SessionKey};

use crate::database::Database;
use crate::models::VoterRecord;

/// Record one voter's participation.
///
/// Idempotent on (`session_key`, `poll_message_id`, `voter`): a repeat vote
/// from the same voter is ignored and the first recorded selection stands.
/// Returns `true` if a new row was written.
pub async fn record_voter(db: &Database, record: &VoterRecord) -> Result<bool, QuorumError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "INSERT OR IGNORE INTO poll_voters
                     (session_key, poll_message_id, voter, option_labels,
                      order_number, source, voted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (
                    &record.session_key,
                    &record.poll_message_id,
                    &record.voter,
                    &record.option_labels,
                    &record.order_number,
                    &record.source,
                    &record.voted_at,
                ),
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All recorded voters for one poll, in insertion order.
pub async fn voters_for_poll(
    db: &Database,
    key: &SessionKey,
    poll_message_id: &str,
) -> Result<Vec<VoterRecord>, QuorumError> {
    let session_key = key.as_str().to_string();
    let poll_message_id = poll_message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_key, poll_message_id, voter, option_labels,
                        order_number, source, voted_at
                 FROM poll_voters
                 WHERE session_key = ?1 AND poll_message_id = ?2
                 ORDER BY rowid ASC",
            )?;
            let rows = stmt
                .query_map((&session_key, &poll_message_id), |row| {
                    Ok(VoterRecord {
                        session_key: row.get(0)?,
                        poll_message_id: row.get(1)?,
                        voter: row.get(2)?,
                        option_labels: row.get(3)?,
                        order_number: row.get(4)?,
                        source: row.get(5)?,
                        voted_at: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
