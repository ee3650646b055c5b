// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Every command opens the SQLite store named in the config, works through a
//! fresh [`Vault`], and locks it again before returning.

use std::fmt;

use coffer_config::CofferConfig;
use coffer_core::{CofferError, VaultStore};
use coffer_storage::SqliteVaultStore;
use coffer_vault::{
    get_vault_passphrase, get_vault_passphrase_with_confirm, vault_startup_check, CredentialInput,
    CredentialView, MigrationReport, Vault,
};
use secrecy::SecretString;
use tracing::info;

async fn open_vault(config: &CofferConfig) -> Result<Vault<SqliteVaultStore>, CofferError> {
    let store = SqliteVaultStore::open(&config.storage).await?;
    Ok(Vault::new(store, config))
}

/// Open and unlock, or [`CofferError::NotInitialized`] when there is no vault.
async fn unlocked_vault(config: &CofferConfig) -> Result<Vault<SqliteVaultStore>, CofferError> {
    let vault = open_vault(config).await?;
    if !vault_startup_check(&vault).await? {
        return Err(CofferError::NotInitialized);
    }
    Ok(vault)
}

async fn finish(vault: Vault<SqliteVaultStore>) -> Result<(), CofferError> {
    vault.lock().await;
    vault.store().close().await
}

/// `coffer setup`
pub async fn run_setup(config: &CofferConfig) -> Result<(), CofferError> {
    let vault = open_vault(config).await?;
    // Refuse before asking for a password nobody will use.
    if vault.is_setup().await? {
        return Err(CofferError::AlreadyInitialized);
    }
    let password = get_vault_passphrase_with_confirm()?;
    vault.setup(&password).await?;
    finish(vault).await
}

/// `coffer unlock`
pub async fn run_unlock(config: &CofferConfig) -> Result<(), CofferError> {
    let vault = unlocked_vault(config).await?;
    finish(vault).await
}

/// `coffer migrate`
pub async fn run_migrate(config: &CofferConfig) -> Result<MigrationReport, CofferError> {
    let vault = open_vault(config).await?;
    if vault.is_setup().await? {
        return Err(CofferError::AlreadyInitialized);
    }
    let password = get_vault_passphrase()?;
    let report = vault.run_migration(&password).await?;
    finish(vault).await?;
    Ok(report)
}

/// Output of `coffer status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub database_path: String,
    pub initialized: bool,
    pub credentials: usize,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "database:    {}", self.database_path)?;
        let state = if self.initialized {
            "initialized"
        } else {
            "not initialized (run `coffer setup` or `coffer migrate`)"
        };
        writeln!(f, "vault:       {state}")?;
        writeln!(f, "credentials: {}", self.credentials)
    }
}

/// `coffer status`. Needs no password.
pub async fn run_status(config: &CofferConfig) -> Result<StatusReport, CofferError> {
    let store = SqliteVaultStore::open(&config.storage).await?;
    let report = StatusReport {
        database_path: config.storage.database_path.clone(),
        initialized: store.load_keystore().await?.is_some(),
        credentials: store.load_credentials().await?.len(),
    };
    store.close().await?;
    Ok(report)
}

/// Build the input for `coffer put`, prompting without echo for each secret
/// attribute whose flag is set.
pub fn read_credential_input(
    id: String,
    username: Option<String>,
    notes: Option<String>,
    password: bool,
    pin: bool,
    extra: bool,
) -> Result<CredentialInput, CofferError> {
    let ask = |wanted: bool, prompt: &str| -> Result<Option<SecretString>, CofferError> {
        if !wanted {
            return Ok(None);
        }
        rpassword::prompt_password(prompt)
            .map(|value| Some(SecretString::from(value)))
            .map_err(|e| CofferError::Passphrase(format!("failed to read {prompt}: {e}")))
    };

    Ok(CredentialInput {
        id,
        username: username.map(SecretString::from),
        notes: notes.map(SecretString::from),
        password: ask(password, "Password: ")?,
        pin: ask(pin, "PIN: ")?,
        extra: ask(extra, "Extra: ")?,
    })
}

/// `coffer put`
pub async fn run_put(config: &CofferConfig, input: CredentialInput) -> Result<(), CofferError> {
    let vault = unlocked_vault(config).await?;
    let sealed = vault.seal_credential(&input)?;
    vault.store().upsert_credential(&sealed).await?;
    info!(credential_id = %input.id, "credential stored");
    finish(vault).await
}

/// `coffer show`
pub async fn run_show(
    config: &CofferConfig,
    id: &str,
    reveal: bool,
) -> Result<CredentialView, CofferError> {
    let vault = unlocked_vault(config).await?;
    let secrets = vault
        .store()
        .get_credential(id)
        .await?
        .ok_or_else(|| CofferError::CredentialNotFound(id.to_string()))?;
    let view = vault.reveal_credential(&secrets, reveal)?;
    finish(vault).await?;
    Ok(view)
}

/// `coffer public-key`. Needs no password.
pub async fn run_public_key(config: &CofferConfig) -> Result<String, CofferError> {
    let vault = open_vault(config).await?;
    let pem = vault.public_key_pem().await?;
    vault.store().close().await?;
    Ok(pem)
}

/// Plain-text rendering of a credential view; absent attributes are skipped.
pub fn render_view(view: &CredentialView) -> String {
    let rows = [
        ("username", &view.username),
        ("password", &view.password),
        ("pin", &view.pin),
        ("extra", &view.extra),
        ("notes", &view.notes),
    ];
    let mut out = format!("id:       {}\n", view.id);
    for (name, value) in rows {
        if let Some(value) = value {
            out.push_str(&format!("{:<9} {value}\n", format!("{name}:")));
        }
    }
    out
}
