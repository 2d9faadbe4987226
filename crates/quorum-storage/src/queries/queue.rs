// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The durable outbound send queue.
//!
//! Items accepted while a session is not ready park here and are drained in
//! insertion order once the transport reports ready.

use quorum_core::{QuorumError, SendKind, SessionKey};

use crate::database::Database;
use crate::models::QueueItem;

/// Park one outbound item. Returns the row id.
pub async fn enqueue(
    db: &Database,
    key: &SessionKey,
    recipient: &str,
    kind: SendKind,
    payload: &str,
) -> Result<i64, QuorumError> {
    let session_key = key.as_str().to_string();
    let recipient = recipient.to_string();
    let kind = kind.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO send_queue (session_key, recipient, kind, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                (&session_key, &recipient, &kind, &payload),
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Pending items for one session, oldest first. Drain order is insertion order.
pub async fn pending_items(
    db: &Database,
    key: &SessionKey,
) -> Result<Vec<QueueItem>, QuorumError> {
    let session_key = key.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_key, recipient, kind, payload, status, created_at
                 FROM send_queue
                 WHERE session_key = ?1 AND status = 'pending'
                 ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([&session_key], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim one item for delivery. Returns false when another drain already
/// claimed it; the conditional UPDATE keeps concurrent drains from sending
/// the same item twice.
pub async fn claim_item(db: &Database, id: i64) -> Result<bool, QuorumError> {
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE send_queue
                 SET status = 'sending', updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND status = 'pending'",
                [id],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition one claimed item to sent.
pub async fn mark_sent(db: &Database, id: i64) -> Result<(), QuorumError> {
    set_status(db, id, "sent").await
}

/// Transition one claimed item to failed. Failed items are never retried.
pub async fn mark_failed(db: &Database, id: i64) -> Result<(), QuorumError> {
    set_status(db, id, "failed").await
}

async fn set_status(db: &Database, id: i64, status: &'static str) -> Result<(), QuorumError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE send_queue
                 SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                (status, id),
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_item(row: &rusqlite::Row<'_>) -> Result<QueueItem, rusqlite::Error> {
    Ok(QueueItem {
        id: row.get(0)?,
        session_key: row.get(1)?,
        recipient: row.get(2)?,
        kind: row.get(3)?,
        payload: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_db() -> (Database, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn drain_order_is_insertion_order() {
        let (db, _dir) = setup_db().await;
        let key = SessionKey::from("s1");

        let first = enqueue(&db, &key, "123@c.us", SendKind::Text, r#"{"text":"one"}"#)
            .await
            .unwrap();
        let second = enqueue(&db, &key, "123@c.us", SendKind::Text, r#"{"text":"two"}"#)
            .await
            .unwrap();
        assert!(second > first);

        let items = pending_items(&db, &key).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, first);
        assert_eq!(items[1].id, second);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sent_and_failed_items_leave_the_pending_set() {
        let (db, _dir) = setup_db().await;
        let key = SessionKey::from("s1");

        let a = enqueue(&db, &key, "r", SendKind::Text, "{}").await.unwrap();
        let b = enqueue(&db, &key, "r", SendKind::Poll, "{}").await.unwrap();
        let c = enqueue(&db, &key, "r", SendKind::Media, "{}").await.unwrap();

        mark_sent(&db, a).await.unwrap();
        mark_failed(&db, b).await.unwrap();

        let items = pending_items(&db, &key).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, c);
        assert_eq!(items[0].kind, "media");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn only_one_claim_succeeds_per_item() {
        let (db, _dir) = setup_db().await;
        let key = SessionKey::from("s1");

        let id = enqueue(&db, &key, "r", SendKind::Text, "{}").await.unwrap();
        assert!(claim_item(&db, id).await.unwrap());
        assert!(!claim_item(&db, id).await.unwrap());

        // A claimed item is out of the pending set until marked.
        assert!(pending_items(&db, &key).await.unwrap().is_empty());

        mark_sent(&db, id).await.unwrap();
        assert!(!claim_item(&db, id).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn queues_are_scoped_per_session() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, &SessionKey::from("a"), "r", SendKind::Text, "{}")
            .await
            .unwrap();
        enqueue(&db, &SessionKey::from("b"), "r", SendKind::Text, "{}")
            .await
            .unwrap();

        let items = pending_items(&db, &SessionKey::from("a")).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].session_key, "a");

        db.close().await.unwrap();
    }
}
