// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encryption of individual sensitive string fields under the DEK.

use coffer_core::CofferError;
use secrecy::SecretString;

use crate::blob::{self, SealedParts};
use crate::crypto::{self, KEY_LEN};

/// Encrypt one field value into its stored `nonce.tag.ciphertext` form.
///
/// An empty value is stored as an empty string and never reaches the cipher.
pub fn encrypt_field(data_key: &[u8; KEY_LEN], plaintext: &str) -> Result<String, CofferError> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }
    let (sealed, nonce) = crypto::seal(data_key, plaintext.as_bytes())?;
    Ok(blob::encode_field(&SealedParts::from_sealed(sealed, nonce)?))
}

/// Decrypt a stored field value.
///
/// An empty stored value decrypts to an empty string. Authentication failure
/// is [`CofferError::DecryptionFailed`]; no substitute value is ever returned.
pub fn decrypt_field(data_key: &[u8; KEY_LEN], stored: &str) -> Result<SecretString, CofferError> {
    if stored.is_empty() {
        return Ok(SecretString::from(String::new()));
    }
    let parts = blob::decode_field(stored)?;
    let plaintext = crypto::open(data_key, &parts.nonce, &parts.to_sealed())?;
    let value = String::from_utf8(plaintext.to_vec())
        .map_err(|_| CofferError::MalformedBlob("decrypted field is not valid UTF-8".to_string()))?;
    Ok(SecretString::from(value))
}
