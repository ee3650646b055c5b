// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via `COFFER_VAULT_KEY` or a TTY prompt.

use coffer_core::{CofferError, VaultStore};
use secrecy::SecretString;
use tracing::info;

use crate::vault::Vault;

/// Environment variable holding the master password for unattended use.
pub const VAULT_KEY_ENV_VAR: &str = "COFFER_VAULT_KEY";

const NO_PASSPHRASE: &str =
    "set COFFER_VAULT_KEY or run interactively to enter the master password";

fn env_passphrase() -> Option<SecretString> {
    std::env::var(VAULT_KEY_ENV_VAR)
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

fn read_line(prompt: &str) -> Result<String, CofferError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map_err(|e| CofferError::Passphrase(format!("failed to read passphrase: {e}")))
}

fn stdin_is_terminal() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

/// Get the master password.
///
/// `COFFER_VAULT_KEY` wins; otherwise the user is prompted when stdin is a
/// terminal.
pub fn get_vault_passphrase() -> Result<SecretString, CofferError> {
    if let Some(key) = env_passphrase() {
        return Ok(key);
    }

    if stdin_is_terminal() {
        let passphrase = read_line("Master password: ")?;
        if passphrase.is_empty() {
            return Err(CofferError::Passphrase("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(CofferError::Passphrase(NO_PASSPHRASE.to_string()))
}

/// Get a new master password, prompting twice on a terminal.
pub fn get_vault_passphrase_with_confirm() -> Result<SecretString, CofferError> {
    if let Some(key) = env_passphrase() {
        return Ok(key);
    }

    if stdin_is_terminal() {
        let first = zeroize::Zeroizing::new(read_line("New master password: ")?);
        let second = zeroize::Zeroizing::new(read_line("Confirm master password: ")?);
        if first != second {
            return Err(CofferError::Passphrase("passphrases do not match".to_string()));
        }
        if first.is_empty() {
            return Err(CofferError::Passphrase("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(first.to_string()));
    }

    Err(CofferError::Passphrase(NO_PASSPHRASE.to_string()))
}

/// Unlock at process start when a vault exists.
///
/// Returns `Ok(false)` without asking for a password when no vault has been
/// set up.
pub async fn vault_startup_check<S: VaultStore>(vault: &Vault<S>) -> Result<bool, CofferError> {
    if !vault.is_setup().await? {
        info!("no vault found, run setup or migrate first");
        return Ok(false);
    }

    let passphrase = get_vault_passphrase()?;
    vault.unlock(&passphrase).await?;
    Ok(true)
}
