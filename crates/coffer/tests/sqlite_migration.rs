// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legacy migration through the vault boundary against a real SQLite store.

use coffer_core::{CofferError, CredentialSecrets, VaultStore};
use coffer_storage::SqliteVaultStore;
use coffer_test_utils::fast_config;
use coffer_vault::legacy::LegacyCipher;
use coffer_vault::Vault;
use secrecy::SecretString;

const MASTER: &str = "Tr0ub4dor&3";

async fn seeded_vault(
    dir: &tempfile::TempDir,
    corrupt: bool,
) -> (Vault<SqliteVaultStore>, Vec<CredentialSecrets>) {
    let mut config = fast_config();
    config.storage.database_path = dir.path().join("vault.db").display().to_string();

    let cipher =
        LegacyCipher::derive(&SecretString::from(MASTER.to_string()), &config.legacy).unwrap();

    let mut bank = CredentialSecrets::new("bank");
    bank.username = Some(cipher.encrypt("alice"));
    bank.password = Some(cipher.encrypt("hunter2"));

    let mut mail = CredentialSecrets::new("mail");
    mail.password = Some(cipher.encrypt("correct horse"));
    mail.notes = Some(if corrupt {
        "gAAAAAcorrupted".to_string()
    } else {
        cipher.encrypt("recovery codes")
    });

    let store = SqliteVaultStore::open(&config.storage).await.unwrap();
    for credential in [&bank, &mail] {
        store.upsert_credential(credential).await.unwrap();
    }
    (Vault::new(store, &config), vec![bank, mail])
}

#[tokio::test]
async fn corrupted_field_leaves_sqlite_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, seeded) = seeded_vault(&dir, true).await;

    let err = vault
        .run_migration(&SecretString::from(MASTER.to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CofferError::MigrationAborted { failed: 1, total: 2 }
    ));

    assert!(!vault.is_unlocked());
    assert!(vault.store().load_keystore().await.unwrap().is_none());
    assert_eq!(vault.store().load_credentials().await.unwrap(), seeded);
}

#[tokio::test]
async fn valid_store_migrates_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, seeded) = seeded_vault(&dir, false).await;
    let password = SecretString::from(MASTER.to_string());

    let report = vault.run_migration(&password).await.unwrap();
    assert_eq!(report.migrated_credentials, 2);
    assert_eq!(report.migrated_fields, 4);
    assert!(vault.store().load_keystore().await.unwrap().is_some());

    let bank = vault.store().get_credential("bank").await.unwrap().unwrap();
    assert_ne!(bank.password, seeded[0].password);

    vault.lock().await;
    vault.unlock(&password).await.unwrap();
    let view = vault.reveal_credential(&bank, true).unwrap();
    assert_eq!(view.password.as_deref(), Some("hunter2"));
}
