// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier): compiled defaults,
//! `/etc/coffer/coffer.toml`, `~/.config/coffer/coffer.toml`, `./coffer.toml`,
//! then `COFFER_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CofferConfig;

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "COFFER_";

/// Config sections, used to map `COFFER_<SECTION>_<KEY>` to `<section>.<key>`.
const SECTIONS: [&str; 4] = ["vault", "legacy", "storage", "log"];

/// Env keys under the prefix that are not configuration (the passphrase).
const NON_CONFIG_ENV_KEYS: [&str; 1] = ["vault_key"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/coffer/coffer.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "coffer.toml";

/// Per-user config file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coffer").join("coffer.toml"))
}

/// Load configuration from the standard file hierarchy with env var overrides.
pub fn load_config() -> Result<CofferConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CofferConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CofferConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full hierarchy before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CofferConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `COFFER_LEGACY_SALT` -> `legacy.salt`, `COFFER_VAULT_KDF_MEMORY_COST` ->
/// `vault.kdf_memory_cost`.
///
/// Only the section prefix is split; `Env::split("_")` would break keys that
/// contain underscores.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .ignore(&NON_CONFIG_ENV_KEYS)
        .map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_on_section_prefix_only() {
        assert_eq!(map_env_key("vault_kdf_memory_cost"), "vault.kdf_memory_cost");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("log_level"), "log.level");
        assert_eq!(map_env_key("legacy_salt"), "legacy.salt");
        assert_eq!(map_env_key("LOG_LEVEL"), "log.level");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
