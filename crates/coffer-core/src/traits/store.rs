// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for the keystore record and encrypted credential fields.

use async_trait::async_trait;

use crate::error::CofferError;
use crate::types::{CredentialSecrets, KeystoreRecord};

/// Storage backend owned by the calling layer.
///
/// The vault core reads and writes opaque blobs through this trait but never
/// locks storage itself. Implementations must make
/// [`commit_migration`](VaultStore::commit_migration) atomic.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Returns the keystore record, or `None` if the vault was never set up.
    async fn load_keystore(&self) -> Result<Option<KeystoreRecord>, CofferError>;

    /// Persists the first keystore record.
    ///
    /// Fails with [`CofferError::AlreadyInitialized`] if one already exists.
    async fn insert_keystore(&self, record: &KeystoreRecord) -> Result<(), CofferError>;

    /// Returns the encrypted attributes of every stored credential.
    async fn load_credentials(&self) -> Result<Vec<CredentialSecrets>, CofferError>;

    /// Replaces the encrypted attributes of the given credentials and inserts
    /// the keystore record as a single transaction.
    ///
    /// On error, no credential and no keystore record may have changed.
    async fn commit_migration(
        &self,
        credentials: &[CredentialSecrets],
        record: &KeystoreRecord,
    ) -> Result<(), CofferError>;
}
