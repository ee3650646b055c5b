// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The legacy single-key scheme, kept only to read data for migration.
//!
//! Fields were Fernet tokens under a key derived with PBKDF2-HMAC-SHA256 from
//! the master password and one fixed, vault-independent salt.

use std::num::NonZeroU32;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use coffer_config::model::LegacyConfig;
use coffer_core::CofferError;
use fernet::Fernet;
use ring::pbkdf2;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

const LEGACY_KEY_LEN: usize = 32;

/// Fernet cipher keyed from the master password.
pub struct LegacyCipher {
    fernet: Fernet,
}

impl std::fmt::Debug for LegacyCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl LegacyCipher {
    /// Derive the legacy key from `password` with the configured salt and
    /// iteration count.
    pub fn derive(password: &SecretString, config: &LegacyConfig) -> Result<Self, CofferError> {
        let iterations = NonZeroU32::new(config.iterations).ok_or_else(|| {
            CofferError::Config("legacy.iterations must be non-zero".to_string())
        })?;

        let mut raw = Zeroizing::new([0u8; LEGACY_KEY_LEN]);
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            config.salt.as_bytes(),
            password.expose_secret().as_bytes(),
            &mut raw[..],
        );

        let encoded = Zeroizing::new(URL_SAFE.encode(&raw[..]));
        let fernet = Fernet::new(&encoded)
            .ok_or_else(|| CofferError::Crypto("invalid legacy Fernet key".to_string()))?;
        Ok(Self { fernet })
    }

    /// Decrypt one legacy token.
    ///
    /// Any failure (wrong password, tampering, bad encoding) is
    /// [`CofferError::DecryptionFailed`].
    pub fn decrypt(&self, token: &str) -> Result<Zeroizing<String>, CofferError> {
        let bytes = Zeroizing::new(
            self.fernet
                .decrypt(token)
                .map_err(|_| CofferError::DecryptionFailed)?,
        );
        let text = std::str::from_utf8(&bytes).map_err(|_| CofferError::DecryptionFailed)?;
        Ok(Zeroizing::new(text.to_string()))
    }

    /// Produce a legacy token. Only fixtures and tests write this format.
    pub fn encrypt(&self, plaintext: &str) -> String {
        self.fernet.encrypt(plaintext.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LegacyConfig {
        LegacyConfig {
            iterations: 1000,
            ..LegacyConfig::default()
        }
    }

    #[test]
    fn roundtrip_under_same_password() {
        let cipher = LegacyCipher::derive(&SecretString::from("pw".to_string()), &fast_config()).unwrap();
        let token = cipher.encrypt("hunter2");
        assert_eq!(cipher.decrypt(&token).unwrap().as_str(), "hunter2");
    }

    #[test]
    fn same_password_derives_same_key() {
        let config = fast_config();
        let a = LegacyCipher::derive(&SecretString::from("pw".to_string()), &config).unwrap();
        let b = LegacyCipher::derive(&SecretString::from("pw".to_string()), &config).unwrap();
        let token = a.encrypt("shared");
        assert_eq!(b.decrypt(&token).unwrap().as_str(), "shared");
    }

    #[test]
    fn wrong_password_fails() {
        let config = fast_config();
        let right = LegacyCipher::derive(&SecretString::from("pw".to_string()), &config).unwrap();
        let wrong = LegacyCipher::derive(&SecretString::from("nope".to_string()), &config).unwrap();
        let token = right.encrypt("hunter2");
        assert!(matches!(
            wrong.decrypt(&token),
            Err(CofferError::DecryptionFailed)
        ));
    }

    #[test]
    fn salt_is_part_of_the_key() {
        let a = LegacyCipher::derive(&SecretString::from("pw".to_string()), &fast_config()).unwrap();
        let other_salt = LegacyConfig {
            salt: "another-salt".to_string(),
            ..fast_config()
        };
        let b = LegacyCipher::derive(&SecretString::from("pw".to_string()), &other_salt).unwrap();
        assert!(b.decrypt(&a.encrypt("x")).is_err());
    }

    #[test]
    fn garbage_token_fails() {
        let cipher = LegacyCipher::derive(&SecretString::from("pw".to_string()), &fast_config()).unwrap();
        assert!(matches!(
            cipher.decrypt("not-a-token"),
            Err(CofferError::DecryptionFailed)
        ));
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = LegacyConfig {
            iterations: 0,
            ..LegacyConfig::default()
        };
        assert!(matches!(
            LegacyCipher::derive(&SecretString::from("pw".to_string()), &config),
            Err(CofferError::Config(_))
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let cipher = LegacyCipher::derive(&SecretString::from("pw".to_string()), &fast_config()).unwrap();
        assert!(format!("{cipher:?}").contains("[REDACTED]"));
    }
}
