// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sealing credential attributes for storage and revealing them with masking.

use coffer_core::{CofferError, CredentialSecrets};
use secrecy::{ExposeSecret, SecretString};

use crate::crypto::KEY_LEN;
use crate::field;

/// Shown in place of a stored password or extra value when secrets are hidden.
pub const SECRET_MASK: &str = "••••••••";

/// Shown in place of a stored PIN when secrets are hidden.
pub const PIN_MASK: &str = "••••";

/// Plaintext attributes of a credential about to be stored.
#[derive(Default)]
pub struct CredentialInput {
    pub id: String,
    pub username: Option<SecretString>,
    pub password: Option<SecretString>,
    pub pin: Option<SecretString>,
    pub extra: Option<SecretString>,
    pub notes: Option<SecretString>,
}

impl CredentialInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialInput")
            .field("id", &self.id)
            .field("values", &"[REDACTED]")
            .finish()
    }
}

/// Decrypted view of a credential, with hidden attributes masked.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialView {
    pub id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub pin: Option<String>,
    pub extra: Option<String>,
    pub notes: Option<String>,
    /// Whether password, pin and extra hold real values rather than masks.
    pub revealed: bool,
}

impl std::fmt::Debug for CredentialView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialView")
            .field("id", &self.id)
            .field("revealed", &self.revealed)
            .finish_non_exhaustive()
    }
}

/// Encrypt every present attribute of `input`.
///
/// Absent attributes stay `None`; empty ones are stored as empty strings.
pub(crate) fn seal(
    data_key: &[u8; KEY_LEN],
    input: &CredentialInput,
) -> Result<CredentialSecrets, CofferError> {
    let seal_one = |value: &Option<SecretString>| -> Result<Option<String>, CofferError> {
        value
            .as_ref()
            .map(|v| field::encrypt_field(data_key, v.expose_secret()))
            .transpose()
    };

    Ok(CredentialSecrets {
        id: input.id.clone(),
        username: seal_one(&input.username)?,
        password: seal_one(&input.password)?,
        pin: seal_one(&input.pin)?,
        extra: seal_one(&input.extra)?,
        notes: seal_one(&input.notes)?,
    })
}

/// Decrypt `secrets` for display.
///
/// Username and notes are always decrypted. Password, pin and extra are
/// decrypted only when `show_secrets` is set and are otherwise replaced by a
/// mask when present, without touching the cipher.
pub(crate) fn reveal(
    data_key: &[u8; KEY_LEN],
    secrets: &CredentialSecrets,
    show_secrets: bool,
) -> Result<CredentialView, CofferError> {
    let open = |stored: &Option<String>| -> Result<Option<String>, CofferError> {
        stored
            .as_deref()
            .map(|blob| field::decrypt_field(data_key, blob).map(|s| s.expose_secret().to_string()))
            .transpose()
    };
    let hidden = |stored: &Option<String>, mask: &str| -> Result<Option<String>, CofferError> {
        if show_secrets {
            open(stored)
        } else {
            Ok(stored
                .as_deref()
                .filter(|blob| !blob.is_empty())
                .map(|_| mask.to_string()))
        }
    };

    Ok(CredentialView {
        id: secrets.id.clone(),
        username: open(&secrets.username)?,
        password: hidden(&secrets.password, SECRET_MASK)?,
        pin: hidden(&secrets.pin, PIN_MASK)?,
        extra: hidden(&secrets.extra, SECRET_MASK)?,
        notes: open(&secrets.notes)?,
        revealed: show_secrets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;

    fn sample() -> CredentialInput {
        CredentialInput {
            username: Some(SecretString::from("alice".to_string())),
            password: Some(SecretString::from("hunter2".to_string())),
            pin: Some(SecretString::from("1234".to_string())),
            notes: Some(SecretString::from("bank portal".to_string())),
            ..CredentialInput::new("bank")
        }
    }

    #[test]
    fn seal_encrypts_only_present_attributes() {
        let key = crypto::generate_random_key().unwrap();
        let sealed = seal(&key, &sample()).unwrap();

        assert_eq!(sealed.id, "bank");
        assert_eq!(sealed.present_field_count(), 4);
        assert!(sealed.extra.is_none());
        assert_ne!(sealed.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn hidden_reveal_masks_secrets() {
        let key = crypto::generate_random_key().unwrap();
        let sealed = seal(&key, &sample()).unwrap();
        let view = reveal(&key, &sealed, false).unwrap();

        assert_eq!(view.username.as_deref(), Some("alice"));
        assert_eq!(view.notes.as_deref(), Some("bank portal"));
        assert_eq!(view.password.as_deref(), Some(SECRET_MASK));
        assert_eq!(view.pin.as_deref(), Some(PIN_MASK));
        assert_eq!(view.extra, None);
        assert!(!view.revealed);
    }

    #[test]
    fn full_reveal_decrypts_everything() {
        let key = crypto::generate_random_key().unwrap();
        let sealed = seal(&key, &sample()).unwrap();
        let view = reveal(&key, &sealed, true).unwrap();

        assert_eq!(view.password.as_deref(), Some("hunter2"));
        assert_eq!(view.pin.as_deref(), Some("1234"));
        assert!(view.revealed);
    }

    #[test]
    fn hidden_reveal_does_not_decrypt_masked_values() {
        let key = crypto::generate_random_key().unwrap();
        let mut sealed = seal(&key, &sample()).unwrap();
        sealed.password = Some("garbage".to_string());

        assert!(reveal(&key, &sealed, false).is_ok());
        assert!(reveal(&key, &sealed, true).is_err());
    }

    #[test]
    fn debug_output_hides_values() {
        let key = crypto::generate_random_key().unwrap();
        let view = reveal(&key, &seal(&key, &sample()).unwrap(), true).unwrap();
        let rendered = format!("{view:?}{:?}", sample());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("alice"));
    }
}
