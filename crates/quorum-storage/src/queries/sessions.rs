// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle rows.

use quorum_core::{DisconnectReason, QuorumError, SessionKey, SessionStatus};

use crate::database::Database;
use crate::models::SessionRecord;

/// Insert or update a session's status. Creates the row on first sight.
pub async fn upsert_status(
    db: &Database,
    key: &SessionKey,
    status: SessionStatus,
) -> Result<(), QuorumError> {
    let session_key = key.as_str().to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (session_key, status)
                 VALUES (?1, ?2)
                 ON CONFLICT(session_key) DO UPDATE SET
                     status = excluded.status,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                (&session_key, &status),
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a session connected and stamp `last_connected_at`.
pub async fn mark_connected(db: &Database, key: &SessionKey) -> Result<(), QuorumError> {
    let session_key = key.as_str().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (session_key, status, last_connected_at)
                 VALUES (?1, 'connected', strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(session_key) DO UPDATE SET
                     status = 'connected',
                     last_connected_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                [&session_key],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a session disconnected, recording the transport-reported reason.
pub async fn mark_disconnected(
    db: &Database,
    key: &SessionKey,
    reason: &DisconnectReason,
) -> Result<(), QuorumError> {
    let session_key = key.as_str().to_string();
    let reason = reason.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions
                     (session_key, status, last_disconnected_at, last_disconnect_reason)
                 VALUES (?1, 'disconnected', strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), ?2)
                 ON CONFLICT(session_key) DO UPDATE SET
                     status = 'disconnected',
                     last_disconnected_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     last_disconnect_reason = excluded.last_disconnect_reason,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                (&session_key, &reason),
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one session row, if it exists.
pub async fn get_session(
    db: &Database,
    key: &SessionKey,
) -> Result<Option<SessionRecord>, QuorumError> {
    let session_key = key.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_key, status, last_connected_at, last_disconnected_at,
                        last_disconnect_reason, updated_at
                 FROM sessions WHERE session_key = ?1",
            )?;
            let mut rows = stmt.query_map([&session_key], row_to_session)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All known sessions, most recently updated first.
pub async fn list_sessions(db: &Database) -> Result<Vec<SessionRecord>, QuorumError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT session_key, status, last_connected_at, last_disconnected_at,
                        last_disconnect_reason, updated_at
                 FROM sessions ORDER BY updated_at DESC",
            )?;
            let rows = stmt
                .query_map([], row_to_session)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<SessionRecord, rusqlite::Error> {
    Ok(SessionRecord {
        session_key: row.get(0)?,
        status: row.get(1)?,
        last_connected_at: row.get(2)?,
        last_disconnected_at: row.get(3)?,
        last_disconnect_reason: row.get(4)?,
        updated_at: row.get(5)?,
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
    async fn upsert_creates_then_updates() {
        let (db, _dir) = setup_db().await;
        let key = SessionKey::from("tenant-a");

        upsert_status(&db, &key, SessionStatus::QrPending).await.unwrap();
        let row = get_session(&db, &key).await.unwrap().unwrap();
        assert_eq!(row.status, "qr_pending");

        upsert_status(&db, &key, SessionStatus::Connected).await.unwrap();
        let row = get_session(&db, &key).await.unwrap().unwrap();
        assert_eq!(row.status, "connected");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn disconnect_records_reason() {
        let (db, _dir) = setup_db().await;
        let key = SessionKey::from("tenant-b");

        mark_connected(&db, &key).await.unwrap();
        let row = get_session(&db, &key).await.unwrap().unwrap();
        assert!(row.last_connected_at.is_some());

        mark_disconnected(&db, &key, &DisconnectReason::Logout)
            .await
            .unwrap();
        let row = get_session(&db, &key).await.unwrap().unwrap();
        assert_eq!(row.status, "disconnected");
        assert_eq!(row.last_disconnect_reason.as_deref(), Some("LOGOUT"));
        // The connect timestamp survives the disconnect.
        assert!(row.last_connected_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_returns_all_sessions() {
        let (db, _dir) = setup_db().await;
        upsert_status(&db, &SessionKey::from("a"), SessionStatus::Connected)
            .await
            .unwrap();
        upsert_status(&db, &SessionKey::from("b"), SessionStatus::QrPending)
            .await
            .unwrap();

        let rows = list_sessions(&db).await.unwrap();
        assert_eq!(rows.len(), 2);

        assert!(get_session(&db, &SessionKey::from("missing"))
            .await
            .unwrap()
            .is_none());

        db.close().await.unwrap();
    }
}
