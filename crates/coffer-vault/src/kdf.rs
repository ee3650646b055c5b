// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id derivation of the key-wrapping key from the master password.

use coffer_core::{CofferError, KdfParams};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::crypto::KEY_LEN;

/// Size of a freshly generated salt in bytes.
pub const SALT_LEN: usize = 16;

/// Derive a 32-byte key from `password` and `salt` with Argon2id v0x13.
///
/// Deterministic for identical inputs. Stored salts are accepted at any
/// length Argon2 allows, so records written elsewhere still unlock.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CofferError> {
    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CofferError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut output[..])
        .map_err(|e| CofferError::Crypto(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random salt for a new vault.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CofferError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| CofferError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost so the suite stays fast.
    const FAST: KdfParams = KdfParams {
        memory_cost: 1024,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn same_inputs_same_key() {
        let key1 = derive_key(b"test passphrase", &[1u8; 16], &FAST).unwrap();
        let key2 = derive_key(b"test passphrase", &[1u8; 16], &FAST).unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn password_salt_and_params_all_matter() {
        let base = derive_key(b"passphrase one", &[2u8; 16], &FAST).unwrap();

        let other_password = derive_key(b"passphrase two", &[2u8; 16], &FAST).unwrap();
        let other_salt = derive_key(b"passphrase one", &[3u8; 16], &FAST).unwrap();
        let other_params = derive_key(
            b"passphrase one",
            &[2u8; 16],
            &KdfParams {
                iterations: 2,
                ..FAST
            },
        )
        .unwrap();

        assert_ne!(*base, *other_password);
        assert_ne!(*base, *other_salt);
        assert_ne!(*base, *other_params);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let bad = KdfParams {
            memory_cost: 1,
            iterations: 0,
            parallelism: 1,
        };
        let err = derive_key(b"pw", &[0u8; 16], &bad).unwrap_err();
        assert!(matches!(err, CofferError::Crypto(_)));
    }

    #[test]
    fn too_short_salt_is_rejected() {
        assert!(derive_key(b"pw", &[0u8; 4], &FAST).is_err());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
