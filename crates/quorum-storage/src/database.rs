// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use quorum_core::QuorumError;
use tokio_rusqlite::Connection;

/// Handle to the single process-wide SQLite database.
///
/// Cloning is cheap; all clones share the same background connection thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode, apply PRAGMAs,
    /// and run all pending migrations.
    pub async fn open(path: &str) -> Result<Self, QuorumError> {
        Self::open_with_wal(path, true).await
    }

    /// Like [`Database::open`], with journaling mode under the caller's
    /// control (`storage.wal_mode` in the config).
    pub async fn open_with_wal(path: &str, wal_mode: bool) -> Result<Self, QuorumError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| QuorumError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| QuorumError::Storage {
                source: Box::new(e),
            })?;

        let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(move |conn| {
            let pragmas = [
                ("journal_mode", journal_mode),
                ("synchronous", "NORMAL"),
                ("foreign_keys", "ON"),
                ("busy_timeout", "5000"),
            ];
            for (pragma, value) in pragmas {
                conn.pragma_update(None, pragma, value)
                    .map_err(|e| QuorumError::Storage {
                        source: Box::new(e),
                    })?;
            }
            crate::migrations::run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => QuorumError::Internal(format!("database setup failed: {other}")),
        })?;

        tracing::debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection, for query modules.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the database, flushing pending writes.
    pub async fn close(self) -> Result<(), QuorumError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> QuorumError {
    QuorumError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/quorum.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        // All four tables should exist after migrations.
        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('sessions', 'send_queue', 'poll_records', 'poll_voters')",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 4);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn wal_mode_can_be_disabled() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("quorum.db");
        let db = Database::open_with_wal(db_path.to_str().unwrap(), false)
            .await
            .unwrap();

        let mode: String = db
            .connection()
            .call(|conn| {
                let m = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
                Ok::<_, rusqlite::Error>(m)
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "delete");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("quorum.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();

        // Migrations must not re-apply on a second open.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
