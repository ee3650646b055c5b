// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of silently falling back to a default.

use coffer_core::KdfParams;
use serde::{Deserialize, Serialize};

/// Top-level Coffer configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CofferConfig {
    /// Key hierarchy settings for new vaults.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Parameters of the legacy single-key scheme, used only by migration.
    #[serde(default)]
    pub legacy: LegacyConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Key hierarchy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// RSA modulus size for the master keypair (default: 4096).
    #[serde(default = "default_rsa_bits")]
    pub rsa_bits: usize,
}

impl VaultConfig {
    /// The Argon2id parameters new keystore records are written with.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_cost: self.kdf_memory_cost,
            iterations: self.kdf_iterations,
            parallelism: self.kdf_parallelism,
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            rsa_bits: default_rsa_bits(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

fn default_rsa_bits() -> usize {
    4096
}

/// Legacy scheme configuration.
///
/// Both values must match what the legacy data was written with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyConfig {
    /// Fixed PBKDF2 salt shared by every legacy vault.
    #[serde(default = "default_legacy_salt")]
    pub salt: String,

    /// PBKDF2-HMAC-SHA256 iteration count.
    #[serde(default = "default_legacy_iterations")]
    pub iterations: u32,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            salt: default_legacy_salt(),
            iterations: default_legacy_iterations(),
        }
    }
}

fn default_legacy_salt() -> String {
    "planificador-vault-2024".to_string()
}

fn default_legacy_iterations() -> u32 {
    480_000
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the vault database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("coffer").join("vault.db").display().to_string())
        .unwrap_or_else(|| "coffer-vault.db".to_string())
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log level for coffer crates (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
