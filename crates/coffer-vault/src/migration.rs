// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot migration from the legacy Fernet scheme to the hybrid key
//! hierarchy.
//!
//! The run is all-or-nothing: every legacy field is decrypted before anything
//! is generated or written, and the re-encrypted fields are committed together
//! with the new keystore record in a single storage transaction.

use coffer_config::model::{LegacyConfig, VaultConfig};
use coffer_core::{CofferError, CredentialSecrets, VaultStore, CREDENTIAL_FIELDS};
use secrecy::SecretString;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::field;
use crate::keystore;
use crate::legacy::LegacyCipher;
use crate::session::VaultSession;

/// Outcome of a successful migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Credentials whose attributes were rewritten.
    pub migrated_credentials: usize,
    /// Attributes re-encrypted under the new DEK. Values that decrypt to an
    /// empty string are cleared and not counted.
    pub migrated_fields: usize,
}

/// Legacy plaintext of one credential, in `CREDENTIAL_FIELDS` order.
///
/// `None` keeps the stored value untouched (absent or empty).
struct Decrypted {
    source: CredentialSecrets,
    values: [Option<Zeroizing<String>>; 5],
}

pub(crate) async fn run<S: VaultStore + ?Sized>(
    store: &S,
    session: &VaultSession,
    password: &SecretString,
    vault_config: &VaultConfig,
    legacy_config: &LegacyConfig,
) -> Result<MigrationReport, CofferError> {
    let transition = session.begin_transition().await;

    if store.load_keystore().await?.is_some() {
        return Err(CofferError::AlreadyInitialized);
    }

    let cipher = LegacyCipher::derive(password, legacy_config)?;
    let credentials = store.load_credentials().await?;
    let total = credentials.len();
    info!(total, "starting legacy migration");

    let decrypted = decrypt_all(&cipher, credentials);
    let failed = decrypted.iter().filter(|d| d.is_none()).count();
    if failed > 0 {
        warn!(failed, total, "legacy migration aborted, nothing written");
        return Err(CofferError::MigrationAborted { failed, total });
    }
    let decrypted: Vec<Decrypted> = decrypted.into_iter().flatten().collect();

    let (record, keys) = keystore::create(
        password,
        &vault_config.kdf_params(),
        vault_config.rsa_bits,
    )?;

    let mut migrated_fields = 0;
    let mut updated = Vec::with_capacity(decrypted.len());
    for Decrypted { mut source, values } in decrypted {
        for (slot, value) in source.fields_mut().into_iter().zip(values.iter()) {
            match value {
                // An empty legacy value is dropped rather than stored.
                Some(plaintext) if plaintext.is_empty() => *slot = None,
                Some(plaintext) => {
                    *slot = Some(field::encrypt_field(keys.data_key(), plaintext)?);
                    migrated_fields += 1;
                }
                None => {}
            }
        }
        updated.push(source);
    }

    store.commit_migration(&updated, &record).await?;
    transition.install(keys);

    let report = MigrationReport {
        migrated_credentials: updated.len(),
        migrated_fields,
    };
    info!(
        credentials = report.migrated_credentials,
        fields = report.migrated_fields,
        "legacy migration complete, vault unlocked"
    );
    Ok(report)
}

/// Decrypt every present attribute, logging failures by credential id and
/// attribute name only.
fn decrypt_all(
    cipher: &LegacyCipher,
    credentials: Vec<CredentialSecrets>,
) -> Vec<Option<Decrypted>> {
    credentials
        .into_iter()
        .map(|source| {
            let mut values: [Option<Zeroizing<String>>; 5] = Default::default();
            let mut ok = true;
            for ((name, stored), value) in CREDENTIAL_FIELDS
                .iter()
                .zip(source.fields())
                .zip(values.iter_mut())
            {
                let Some(token) = stored.as_deref().filter(|t| !t.is_empty()) else {
                    continue;
                };
                match cipher.decrypt(token) {
                    Ok(plaintext) => *value = Some(plaintext),
                    Err(_) => {
                        warn!(credential_id = %source.id, field = *name, "legacy field failed to decrypt");
                        ok = false;
                    }
                }
            }
            ok.then_some(Decrypted { source, values })
        })
        .collect()
}
