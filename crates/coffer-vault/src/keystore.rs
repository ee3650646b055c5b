// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Creation and opening of the keystore record.
//!
//! Key hierarchy:
//! - A random 256-bit DEK encrypts every sensitive field.
//! - The DEK is wrapped with the RSA public key (OAEP).
//! - The RSA private key is sealed with AES-256-GCM under a key derived from
//!   the master password via Argon2id, with a fresh salt per vault.
//!
//! Only wrapped forms ever leave this module in a [`KeystoreRecord`].

use coffer_core::{CofferError, KdfParams, KeystoreRecord};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::blob::{self, SealedParts, WrappedKeyBlob};
use crate::crypto::{self, KEY_LEN};
use crate::kdf;
use crate::keywrap::{self, MasterKeyPair};

/// Decrypted key material held by an unlocked session.
pub struct SessionKeys {
    keypair: MasterKeyPair,
    data_key: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("keypair", &self.keypair)
            .field("data_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionKeys {
    pub fn new(keypair: MasterKeyPair, data_key: Zeroizing<[u8; KEY_LEN]>) -> Self {
        Self { keypair, data_key }
    }

    /// The DEK used for field encryption.
    pub fn data_key(&self) -> &[u8; KEY_LEN] {
        &self.data_key
    }

    pub fn keypair(&self) -> &MasterKeyPair {
        &self.keypair
    }
}

/// Generate a fresh keypair and DEK and wrap them under `password`.
///
/// Returns the persistable record together with the material it protects, so
/// the caller can unlock its session without a second key derivation.
pub fn create(
    password: &SecretString,
    params: &KdfParams,
    rsa_bits: usize,
) -> Result<(KeystoreRecord, SessionKeys), CofferError> {
    let keypair = MasterKeyPair::generate(rsa_bits)?;
    let data_key = crypto::generate_random_key()?;
    let keys = SessionKeys::new(keypair, data_key);
    let record = seal_record(&keys, password, params)?;
    debug!(rsa_bits, "keystore record created");
    Ok((record, keys))
}

/// Wrap existing key material into a record under `password`.
pub fn seal_record(
    keys: &SessionKeys,
    password: &SecretString,
    params: &KdfParams,
) -> Result<KeystoreRecord, CofferError> {
    let salt = kdf::generate_salt()?;
    let wrapping_key = kdf::derive_key(password.expose_secret().as_bytes(), &salt, params)?;

    let private_pem = keys.keypair.private_pem()?;
    let (sealed, nonce) = crypto::seal(&wrapping_key, private_pem.as_bytes())?;
    let wrapped_private_key = WrappedKeyBlob {
        salt: salt.to_vec(),
        sealed: SealedParts::from_sealed(sealed, nonce)?,
    }
    .encode();

    let wrapped_dek = keywrap::wrap_data_key(&keys.data_key, keys.keypair.public())?;

    Ok(KeystoreRecord {
        public_key: keys.keypair.public_pem()?,
        wrapped_private_key,
        wrapped_data_key: blob::encode_b64(&wrapped_dek),
        kdf_params: Some(*params),
    })
}

/// Recover the key material from `record` with `password`.
///
/// Every failure (bad password, tampered blob, malformed layout, mismatched
/// public key) is reported as [`CofferError::WrongPasswordOrCorruptedData`].
pub fn open(record: &KeystoreRecord, password: &SecretString) -> Result<SessionKeys, CofferError> {
    open_inner(record, password).map_err(|e| {
        debug!(kind = error_kind(&e), "keystore open failed");
        CofferError::WrongPasswordOrCorruptedData
    })
}

fn open_inner(record: &KeystoreRecord, password: &SecretString) -> Result<SessionKeys, CofferError> {
    let wrapped = WrappedKeyBlob::decode(&record.wrapped_private_key)?;
    let wrapping_key = kdf::derive_key(
        password.expose_secret().as_bytes(),
        &wrapped.salt,
        &record.effective_kdf_params(),
    )?;

    let pem_bytes = crypto::open(&wrapping_key, &wrapped.sealed.nonce, &wrapped.sealed.to_sealed())?;
    let pem = std::str::from_utf8(&pem_bytes)
        .map_err(|_| CofferError::MalformedBlob("private key is not UTF-8 PEM".to_string()))?;
    let keypair = MasterKeyPair::from_private_pem(pem)?;

    let stored_public = keywrap::public_key_from_pem(&record.public_key)?;
    if &stored_public != keypair.public() {
        return Err(CofferError::Crypto(
            "stored public key does not match the private key".to_string(),
        ));
    }

    let wrapped_dek = blob::decode_b64(&record.wrapped_data_key, "wrapped data key")?;
    let data_key = keypair.unwrap_data_key(&wrapped_dek)?;

    Ok(SessionKeys::new(keypair, data_key))
}

/// Coarse failure class for debug logs; never includes data.
fn error_kind(err: &CofferError) -> &'static str {
    match err {
        CofferError::MalformedBlob(_) => "malformed",
        CofferError::DecryptionFailed => "authentication",
        CofferError::Crypto(_) => "crypto",
        _ => "other",
    }
}
