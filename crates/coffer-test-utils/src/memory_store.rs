// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage backend for deterministic vault tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use coffer_core::{CofferError, CredentialSecrets, KeystoreRecord, VaultStore};
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    keystore: Option<KeystoreRecord>,
    credentials: BTreeMap<String, CredentialSecrets>,
}

/// A [`VaultStore`] backed by a mutex-guarded map.
///
/// [`fail_next_commit`](MemoryStore::fail_next_commit) makes the next
/// `commit_migration` return a storage error without touching state.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_next_commit: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with credentials, e.g. legacy fixtures.
    pub fn with_credentials(credentials: impl IntoIterator<Item = CredentialSecrets>) -> Self {
        let credentials = credentials
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Self {
            state: Mutex::new(State {
                keystore: None,
                credentials,
            }),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Insert or replace one credential.
    pub async fn put_credential(&self, credential: CredentialSecrets) {
        self.state
            .lock()
            .await
            .credentials
            .insert(credential.id.clone(), credential);
    }

    pub async fn credential(&self, id: &str) -> Option<CredentialSecrets> {
        self.state.lock().await.credentials.get(id).cloned()
    }

    /// All credentials ordered by id.
    pub async fn credentials(&self) -> Vec<CredentialSecrets> {
        self.state.lock().await.credentials.values().cloned().collect()
    }

    pub async fn keystore(&self) -> Option<KeystoreRecord> {
        self.state.lock().await.keystore.clone()
    }

    /// Overwrite the stored record, bypassing the insert-once rule.
    pub async fn replace_keystore(&self, record: Option<KeystoreRecord>) {
        self.state.lock().await.keystore = record;
    }

    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    async fn load_keystore(&self) -> Result<Option<KeystoreRecord>, CofferError> {
        Ok(self.keystore().await)
    }

    async fn insert_keystore(&self, record: &KeystoreRecord) -> Result<(), CofferError> {
        let mut state = self.state.lock().await;
        if state.keystore.is_some() {
            return Err(CofferError::AlreadyInitialized);
        }
        state.keystore = Some(record.clone());
        Ok(())
    }

    async fn load_credentials(&self) -> Result<Vec<CredentialSecrets>, CofferError> {
        Ok(self.credentials().await)
    }

    async fn commit_migration(
        &self,
        credentials: &[CredentialSecrets],
        record: &KeystoreRecord,
    ) -> Result<(), CofferError> {
        let mut state = self.state.lock().await;
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(CofferError::storage("injected commit failure"));
        }
        if state.keystore.is_some() {
            return Err(CofferError::AlreadyInitialized);
        }
        for credential in credentials {
            state
                .credentials
                .insert(credential.id.clone(), credential.clone());
        }
        state.keystore = Some(record.clone());
        Ok(())
    }
}
