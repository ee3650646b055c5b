// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault boundary used by the rest of the application.
//!
//! A [`Vault`] owns one [`VaultSession`] and borrows persistence from a
//! [`VaultStore`]. Setup, unlock, lock and migration serialize on the session's
//! transition lock; field operations only need the held key material and run
//! concurrently.

use coffer_config::model::{LegacyConfig, VaultConfig};
use coffer_config::CofferConfig;
use coffer_core::{CofferError, CredentialSecrets, VaultStore};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::credential::{self, CredentialInput, CredentialView};
use crate::field;
use crate::keystore;
use crate::migration::{self, MigrationReport};
use crate::session::VaultSession;

/// Envelope-encrypted credential vault over a storage backend.
pub struct Vault<S> {
    store: S,
    session: VaultSession,
    vault_config: VaultConfig,
    legacy_config: LegacyConfig,
}

impl<S> std::fmt::Debug for Vault<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("session", &self.session)
            .field("rsa_bits", &self.vault_config.rsa_bits)
            .finish_non_exhaustive()
    }
}

impl<S: VaultStore> Vault<S> {
    /// A `Locked` vault over `store`.
    pub fn new(store: S, config: &CofferConfig) -> Self {
        Self {
            store,
            session: VaultSession::new(),
            vault_config: config.vault.clone(),
            legacy_config: config.legacy.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether a keystore record has been persisted.
    pub async fn is_setup(&self) -> Result<bool, CofferError> {
        Ok(self.store.load_keystore().await?.is_some())
    }

    /// Whether key material is currently held.
    pub fn is_unlocked(&self) -> bool {
        self.session.is_unlocked()
    }

    /// Create the key hierarchy under `password`, persist its record and
    /// unlock.
    ///
    /// Fails with [`CofferError::AlreadyInitialized`] if a record exists.
    pub async fn setup(&self, password: &SecretString) -> Result<(), CofferError> {
        let transition = self.session.begin_transition().await;

        if self.store.load_keystore().await?.is_some() {
            return Err(CofferError::AlreadyInitialized);
        }

        let (record, keys) = keystore::create(
            password,
            &self.vault_config.kdf_params(),
            self.vault_config.rsa_bits,
        )?;
        self.store.insert_keystore(&record).await?;
        transition.install(keys);

        info!(rsa_bits = self.vault_config.rsa_bits, "vault created and unlocked");
        Ok(())
    }

    /// Recover the key material with `password`.
    ///
    /// Material held from an earlier unlock is discarded first, so a failed
    /// attempt always leaves the vault `Locked`.
    pub async fn unlock(&self, password: &SecretString) -> Result<(), CofferError> {
        let transition = self.session.begin_transition().await;
        transition.clear();

        let record = self
            .store
            .load_keystore()
            .await?
            .ok_or(CofferError::NotInitialized)?;

        match keystore::open(&record, password) {
            Ok(keys) => {
                transition.install(keys);
                info!("vault unlocked");
                Ok(())
            }
            Err(e) => {
                warn!("vault unlock failed");
                Err(e)
            }
        }
    }

    /// Discard held key material. Idempotent.
    pub async fn lock(&self) {
        self.session.lock().await;
    }

    /// Encrypt one field value under the DEK.
    ///
    /// Fails with [`CofferError::VaultLocked`] while locked, even for an
    /// empty value.
    pub fn encrypt_field(&self, plaintext: &str) -> Result<String, CofferError> {
        let keys = self.session.keys()?;
        let stored = field::encrypt_field(keys.data_key(), plaintext)?;
        debug!(empty = plaintext.is_empty(), "field encrypted");
        Ok(stored)
    }

    /// Decrypt one stored field value.
    pub fn decrypt_field(&self, stored: &str) -> Result<SecretString, CofferError> {
        let keys = self.session.keys()?;
        let value = field::decrypt_field(keys.data_key(), stored)?;
        debug!(empty = stored.is_empty(), "field decrypted");
        Ok(value)
    }

    /// Move legacy Fernet data to the hybrid scheme and unlock.
    ///
    /// All-or-nothing: see [`crate::migration`].
    pub async fn run_migration(&self, password: &SecretString) -> Result<MigrationReport, CofferError> {
        migration::run(
            &self.store,
            &self.session,
            password,
            &self.vault_config,
            &self.legacy_config,
        )
        .await
    }

    /// Encrypt every present attribute of a credential for storage.
    pub fn seal_credential(&self, input: &CredentialInput) -> Result<CredentialSecrets, CofferError> {
        let keys = self.session.keys()?;
        credential::seal(keys.data_key(), input)
    }

    /// Decrypt a stored credential for display, masking secrets unless
    /// `show_secrets` is set.
    pub fn reveal_credential(
        &self,
        secrets: &CredentialSecrets,
        show_secrets: bool,
    ) -> Result<CredentialView, CofferError> {
        let keys = self.session.keys()?;
        credential::reveal(keys.data_key(), secrets, show_secrets)
    }

    /// The stored public key PEM. Available while locked.
    pub async fn public_key_pem(&self) -> Result<String, CofferError> {
        self.store
            .load_keystore()
            .await?
            .map(|record| record.public_key)
            .ok_or(CofferError::NotInitialized)
    }
}
