// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./quorum.toml` > `~/.config/quorum/quorum.toml` > `/etc/quorum/quorum.toml`
//! with environment variable overrides via `QUORUM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::QuorumConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/quorum/quorum.toml` (system-wide)
/// 3. `~/.config/quorum/quorum.toml` (user XDG config)
/// 4. `./quorum.toml` (local directory)
/// 5. `QUORUM_*` environment variables
pub fn load_config() -> Result<QuorumConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuorumConfig::default()))
        .merge(Toml::file("/etc/quorum/quorum.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("quorum/quorum.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("quorum.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<QuorumConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuorumConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuorumConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuorumConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `QUORUM_STORAGE_DATABASE_PATH`
/// must map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("QUORUM_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: QUORUM_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("transport_", "transport.", 1);
        mapped.into()
    })
}
