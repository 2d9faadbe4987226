// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `quorum status` command implementation.
//!
//! Prints the persisted state of every known session.

use quorum_config::QuorumConfig;
use quorum_core::QuorumError;
use quorum_storage::Database;
use quorum_storage::queries::sessions;

pub async fn run(config: &QuorumConfig) -> Result<(), QuorumError> {
    let db = Database::open(&config.storage.database_path).await?;
    let rows = sessions::list_sessions(&db).await?;

    if rows.is_empty() {
        println!("no sessions recorded");
    } else {
        println!(
            "{:<24} {:<14} {:<26} {:<26} {}",
            "SESSION", "STATUS", "LAST CONNECTED", "LAST DISCONNECTED", "REASON"
        );
        for row in rows {
            println!(
                "{:<24} {:<14} {:<26} {:<26} {}",
                row.session_key,
                row.status,
                row.last_connected_at.as_deref().unwrap_or("-"),
                row.last_disconnected_at.as_deref().unwrap_or("-"),
                row.last_disconnect_reason.as_deref().unwrap_or("-"),
            );
        }
    }

    db.close().await?;
    Ok(())
}
