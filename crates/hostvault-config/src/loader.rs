// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hostvault.toml` > `~/.config/hostvault/hostvault.toml`
//! > `/etc/hostvault/hostvault.toml`, with environment variable overrides via
//! the `HOSTVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HostvaultConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/hostvault/hostvault.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "hostvault.toml";

/// Per-user config file under the XDG config dir, if one can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hostvault/hostvault.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hostvault/hostvault.toml`
/// 3. `~/.config/hostvault/hostvault.toml`
/// 4. `./hostvault.toml`
/// 5. `HOSTVAULT_*` environment variables
pub fn load_config() -> Result<HostvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<HostvaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HostvaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HostvaultConfig, figment::Error> {
    tracing::debug!(path = %path.display(), "loading config file");
    Figment::new()
        .merge(Serialized::defaults(HostvaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HostvaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `HOSTVAULT_VAULT_DATA_DIR` to `vault.data_dir`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores.
fn env_provider() -> Env {
    Env::prefixed("HOSTVAULT_")
        .ignore(&["MASTER_PASSWORD", "NEW_MASTER_PASSWORD"])
        .map(|key| key.as_str().replacen("vault_", "vault.", 1).into())
}
