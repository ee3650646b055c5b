// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the VaultStore trait.

use async_trait::async_trait;
use coffer_config::model::StorageConfig;
use coffer_core::{CofferError, CredentialSecrets, KeystoreRecord, VaultStore};
use tracing::debug;

use crate::database::{flatten_tr_err, Database};
use crate::queries;

/// SQLite-backed vault storage.
#[derive(Clone)]
pub struct SqliteVaultStore {
    db: Database,
}

impl SqliteVaultStore {
    /// Open the database named by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, CofferError> {
        let db = Database::open(&config.database_path).await?;
        Ok(Self { db })
    }

    /// Store a credential's encrypted attributes, replacing any previous ones.
    pub async fn upsert_credential(&self, credential: &CredentialSecrets) -> Result<(), CofferError> {
        queries::credentials::upsert(&self.db, credential).await
    }

    pub async fn get_credential(&self, id: &str) -> Result<Option<CredentialSecrets>, CofferError> {
        queries::credentials::get(&self.db, id).await
    }

    pub async fn delete_credential(&self, id: &str) -> Result<bool, CofferError> {
        queries::credentials::delete(&self.db, id).await
    }

    pub async fn close(&self) -> Result<(), CofferError> {
        self.db.close().await
    }
}

#[async_trait]
impl VaultStore for SqliteVaultStore {
    async fn load_keystore(&self) -> Result<Option<KeystoreRecord>, CofferError> {
        queries::keystore::load(&self.db).await
    }

    async fn insert_keystore(&self, record: &KeystoreRecord) -> Result<(), CofferError> {
        queries::keystore::insert(&self.db, record).await
    }

    async fn load_credentials(&self) -> Result<Vec<CredentialSecrets>, CofferError> {
        queries::credentials::list(&self.db).await
    }

    async fn commit_migration(
        &self,
        credentials: &[CredentialSecrets],
        record: &KeystoreRecord,
    ) -> Result<(), CofferError> {
        let credentials = credentials.to_vec();
        let record = record.clone();
        let count = credentials.len();

        self.db
            .connection()
            .call(move |conn| -> Result<(), CofferError> {
                let tx = conn.transaction().map_err(CofferError::storage)?;
                for credential in &credentials {
                    queries::credentials::upsert_row(&tx, credential)
                        .map_err(CofferError::storage)?;
                }
                // Inserted last so an existing record rolls the whole batch back.
                queries::keystore::insert_row(&tx, &record)?;
                tx.commit().map_err(CofferError::storage)
            })
            .await
            .map_err(flatten_tr_err)?;

        debug!(credentials = count, "migration committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_core::KdfParams;

    async fn open_store() -> (SqliteVaultStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("vault.db").display().to_string(),
        };
        (SqliteVaultStore::open(&config).await.unwrap(), dir)
    }

    fn record(tag: &str) -> KeystoreRecord {
        KeystoreRecord {
            public_key: format!("pk-{tag}"),
            wrapped_private_key: "salt.nonce.tag.ct".to_string(),
            wrapped_data_key: "dek".to_string(),
            kdf_params: Some(KdfParams {
                memory_cost: 65536,
                iterations: 3,
                parallelism: 4,
            }),
        }
    }

    fn credential(id: &str, password: &str) -> CredentialSecrets {
        let mut c = CredentialSecrets::new(id);
        c.password = Some(password.to_string());
        c
    }

    #[tokio::test]
    async fn keystore_roundtrip_and_single_insert() {
        let (store, _dir) = open_store().await;
        assert!(store.load_keystore().await.unwrap().is_none());

        store.insert_keystore(&record("a")).await.unwrap();
        assert_eq!(store.load_keystore().await.unwrap(), Some(record("a")));

        assert!(matches!(
            store.insert_keystore(&record("b")).await,
            Err(CofferError::AlreadyInitialized)
        ));
        assert_eq!(store.load_keystore().await.unwrap(), Some(record("a")));
    }

    #[tokio::test]
    async fn record_without_params_reads_back_as_none() {
        let (store, _dir) = open_store().await;
        let legacy_shape = KeystoreRecord {
            kdf_params: None,
            ..record("a")
        };
        store.insert_keystore(&legacy_shape).await.unwrap();
        let loaded = store.load_keystore().await.unwrap().unwrap();
        assert_eq!(loaded.kdf_params, None);
        assert_eq!(loaded.effective_kdf_params(), KdfParams::default());
    }

    #[tokio::test]
    async fn credential_upsert_get_delete() {
        let (store, _dir) = open_store().await;
        store.upsert_credential(&credential("bank", "v1")).await.unwrap();
        store.upsert_credential(&credential("bank", "v2")).await.unwrap();
        store.upsert_credential(&credential("alpha", "x")).await.unwrap();

        assert_eq!(
            store.get_credential("bank").await.unwrap(),
            Some(credential("bank", "v2"))
        );
        let ids: Vec<_> = store
            .load_credentials()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["alpha", "bank"]);

        assert!(store.delete_credential("bank").await.unwrap());
        assert!(!store.delete_credential("bank").await.unwrap());
        assert!(store.get_credential("bank").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_migration_writes_everything() {
        let (store, _dir) = open_store().await;
        store.upsert_credential(&credential("bank", "legacy")).await.unwrap();

        store
            .commit_migration(&[credential("bank", "hybrid")], &record("a"))
            .await
            .unwrap();

        assert_eq!(
            store.get_credential("bank").await.unwrap(),
            Some(credential("bank", "hybrid"))
        );
        assert_eq!(store.load_keystore().await.unwrap(), Some(record("a")));
    }

    #[tokio::test]
    async fn commit_migration_rolls_back_on_existing_record() {
        let (store, _dir) = open_store().await;
        store.upsert_credential(&credential("bank", "legacy")).await.unwrap();
        store.insert_keystore(&record("a")).await.unwrap();

        let err = store
            .commit_migration(&[credential("bank", "hybrid")], &record("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, CofferError::AlreadyInitialized));

        assert_eq!(
            store.get_credential("bank").await.unwrap(),
            Some(credential("bank", "legacy"))
        );
        assert_eq!(store.load_keystore().await.unwrap(), Some(record("a")));
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("vault.db").display().to_string(),
        };

        let store = SqliteVaultStore::open(&config).await.unwrap();
        store.insert_keystore(&record("a")).await.unwrap();
        store.close().await.unwrap();
        drop(store);

        let reopened = SqliteVaultStore::open(&config).await.unwrap();
        assert_eq!(reopened.load_keystore().await.unwrap(), Some(record("a")));
    }
}
