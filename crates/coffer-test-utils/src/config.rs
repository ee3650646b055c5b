// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration tuned for test speed.

use coffer_config::model::{LegacyConfig, VaultConfig};
use coffer_config::CofferConfig;

/// A config with the weakest parameters the crypto primitives accept.
///
/// These values are below the validated minimums and must never reach a real
/// vault; they are built directly rather than through the loader.
pub fn fast_config() -> CofferConfig {
    CofferConfig {
        vault: VaultConfig {
            kdf_memory_cost: 1024,
            kdf_iterations: 1,
            kdf_parallelism: 1,
            rsa_bits: 2048,
        },
        legacy: LegacyConfig {
            iterations: 1000,
            ..LegacyConfig::default()
        },
        ..CofferConfig::default()
    }
}
