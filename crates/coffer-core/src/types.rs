// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted record types shared by the vault core and storage backends.
//!
//! Everything here is either public or already encrypted; none of these
//! types ever carries plaintext key material.

use serde::{Deserialize, Serialize};

/// Argon2id cost parameters used to derive the key-wrapping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Parallelism lanes.
    pub parallelism: u32,
}

/// Parameters assumed for keystore records written without stored KDF parameters.
impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            iterations: 2,
            parallelism: 4,
        }
    }
}

/// The single persisted key record of a vault.
///
/// - `public_key`: SubjectPublicKeyInfo PEM, stored in clear.
/// - `wrapped_private_key`: `salt.nonce.tag.ciphertext`, URL-safe base64 parts.
/// - `wrapped_data_key`: URL-safe base64 RSA-OAEP ciphertext of the DEK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreRecord {
    pub public_key: String,
    pub wrapped_private_key: String,
    pub wrapped_data_key: String,
    /// `None` means [`KdfParams::default`].
    #[serde(default)]
    pub kdf_params: Option<KdfParams>,
}

impl KeystoreRecord {
    /// The KDF parameters that unwrap this record's private key.
    pub fn effective_kdf_params(&self) -> KdfParams {
        self.kdf_params.unwrap_or_default()
    }
}

/// Names of the sensitive attributes stored on a credential, in column order.
pub const CREDENTIAL_FIELDS: [&str; 5] = ["username", "password", "pin", "extra", "notes"];

/// The encrypted attributes of one stored credential.
///
/// Each attribute is an opaque stored blob; `None` (or an empty string) means
/// the attribute was never set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecrets {
    pub id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub pin: Option<String>,
    pub extra: Option<String>,
    pub notes: Option<String>,
}

impl CredentialSecrets {
    /// Create an empty credential with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Borrow the sensitive attributes in [`CREDENTIAL_FIELDS`] order.
    pub fn fields(&self) -> [&Option<String>; 5] {
        [
            &self.username,
            &self.password,
            &self.pin,
            &self.extra,
            &self.notes,
        ]
    }

    /// Mutably borrow the sensitive attributes in [`CREDENTIAL_FIELDS`] order.
    pub fn fields_mut(&mut self) -> [&mut Option<String>; 5] {
        [
            &mut self.username,
            &mut self.password,
            &mut self.pin,
            &mut self.extra,
            &mut self.notes,
        ]
    }

    /// Number of attributes holding a non-empty blob.
    pub fn present_field_count(&self) -> usize {
        self.fields()
            .iter()
            .filter(|f| f.as_deref().is_some_and(|v| !v.is_empty()))
            .count()
    }
}
