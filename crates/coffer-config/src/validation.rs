// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::CofferConfig;

/// Smallest accepted Argon2id memory cost (32 MiB).
pub const MIN_KDF_MEMORY_COST: u32 = 32768;

/// Smallest accepted RSA modulus.
pub const MIN_RSA_BITS: usize = 2048;

/// Largest accepted RSA modulus.
pub const MAX_RSA_BITS: usize = 8192;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing on the first.
pub fn validate_config(config: &CofferConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let vault = &config.vault;
    if vault.kdf_memory_cost < MIN_KDF_MEMORY_COST {
        fail(format!(
            "vault.kdf_memory_cost must be at least {MIN_KDF_MEMORY_COST} (32 MiB), got {}",
            vault.kdf_memory_cost
        ));
    }
    if vault.kdf_iterations < 2 {
        fail(format!(
            "vault.kdf_iterations must be at least 2, got {}",
            vault.kdf_iterations
        ));
    }
    if vault.kdf_parallelism < 1 {
        fail(format!(
            "vault.kdf_parallelism must be at least 1, got {}",
            vault.kdf_parallelism
        ));
    }
    if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&vault.rsa_bits) || vault.rsa_bits % 8 != 0 {
        fail(format!(
            "vault.rsa_bits must be a multiple of 8 between {MIN_RSA_BITS} and {MAX_RSA_BITS}, got {}",
            vault.rsa_bits
        ));
    }

    if config.legacy.salt.is_empty() {
        fail("legacy.salt must not be empty".to_string());
    }
    if config.legacy.iterations == 0 {
        fail("legacy.iterations must be greater than zero".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
