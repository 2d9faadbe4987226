// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `quorum serve` command implementation.
//!
//! Opens the database, assembles the session registry, and runs until
//! interrupted. Transport backends plug in through
//! [`quorum_core::TransportFactory`]; this build compiles none in, so serve
//! restores persisted session rows for visibility and waits for shutdown.

use quorum_config::QuorumConfig;
use quorum_core::QuorumError;
use quorum_storage::queries::sessions;
use quorum_storage::Database;
use tracing::{info, warn};

pub async fn run(config: &QuorumConfig) -> Result<(), QuorumError> {
    info!(service = %config.service.name, "starting gateway");

    let db =
        Database::open_with_wal(&config.storage.database_path, config.storage.wal_mode).await?;
    info!(
        path = %config.storage.database_path,
        wal = config.storage.wal_mode,
        "database ready"
    );

    let known = sessions::list_sessions(&db).await?;
    for row in &known {
        info!(
            session = %row.session_key,
            status = %row.status,
            "persisted session"
        );
    }
    if known.is_empty() {
        info!("no persisted sessions");
    }

    // Transport backends plug in as TransportFactory implementations wired
    // into a SessionRegistry here. None are compiled into this build, so
    // serve only holds the database open.
    warn!("no transport backend compiled in; sessions cannot connect");

    tokio::signal::ctrl_c().await.map_err(|e| {
        QuorumError::Internal(format!("failed to listen for shutdown signal: {e}"))
    })?;
    info!("shutdown signal received");

    db.close().await?;
    Ok(())
}
