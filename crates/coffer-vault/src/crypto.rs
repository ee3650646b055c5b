// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open.
//!
//! Every call to [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.
//! There is no nonce counter anywhere in the crate.

use coffer_core::CofferError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Size of a symmetric key in bytes.
pub const KEY_LEN: usize = 32;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = NONCE_LEN;

fn less_safe_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, CofferError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| CofferError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` with a random nonce.
///
/// Returns `(ciphertext || tag, nonce)`.
pub fn seal(
    key: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_SIZE]), CofferError> {
    let key = less_safe_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| CofferError::Crypto("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| CofferError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt `ciphertext || tag` under `key`.
///
/// The tag is verified before any plaintext is returned. Any mismatch yields
/// [`CofferError::DecryptionFailed`]; callers decide how to surface it.
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CofferError> {
    let key = less_safe_key(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let len = key
        .open_in_place(Nonce::assume_unique_for_key(*nonce), Aad::empty(), &mut in_out)
        .map_err(|_| CofferError::DecryptionFailed)?
        .len();
    in_out.truncate(len);

    Ok(in_out)
}

/// Generate a random 256-bit key.
pub fn generate_random_key() -> Result<Zeroizing<[u8; KEY_LEN]>, CofferError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    SystemRandom::new()
        .fill(&mut key[..])
        .map_err(|_| CofferError::Crypto("failed to generate random key".to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key, b"secret api key value").unwrap();
        let decrypted = open(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(decrypted.as_slice(), b"secret api key value");
    }

    #[test]
    fn same_plaintext_seals_differently() {
        let key = generate_random_key().unwrap();
        let (ct1, nonce1) = seal(&key, b"same input twice").unwrap();
        let (ct2, nonce2) = seal(&key, b"same input twice").unwrap();
        assert_ne!(nonce1, nonce2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn ciphertext_carries_tag() {
        let key = generate_random_key().unwrap();
        let (ciphertext, _) = seal(&key, b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_still_authenticates() {
        let key = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key, b"").unwrap();
        assert_eq!(ciphertext.len(), TAG_LEN);
        assert!(open(&key, &nonce, &ciphertext).unwrap().is_empty());
    }

    #[test]
    fn wrong_key_fails() {
        let key1 = generate_random_key().unwrap();
        let key2 = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key1, b"secret data").unwrap();
        assert!(matches!(
            open(&key2, &nonce, &ciphertext),
            Err(CofferError::DecryptionFailed)
        ));
    }

    #[test]
    fn every_single_bit_flip_is_detected() {
        let key = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key, b"do not tamper").unwrap();

        for byte in 0..ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = ciphertext.clone();
                tampered[byte] ^= 1 << bit;
                assert!(open(&key, &nonce, &tampered).is_err());
            }
        }
    }

    #[test]
    fn flipped_nonce_is_detected() {
        let key = generate_random_key().unwrap();
        let (ciphertext, mut nonce) = seal(&key, b"nonce bound").unwrap();
        nonce[0] ^= 0x80;
        assert!(open(&key, &nonce, &ciphertext).is_err());
    }
}
