// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Coffer credential vault.
//!
//! Provides the shared error type, the persisted record types (keystore record
//! and encrypted credential attributes), and the [`VaultStore`] trait that
//! storage backends implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::CofferError;
pub use traits::VaultStore;
pub use types::{CredentialSecrets, KdfParams, KeystoreRecord, CREDENTIAL_FIELDS};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_do_not_leak_details() {
        let wrong = CofferError::WrongPasswordOrCorruptedData.to_string();
        assert!(wrong.contains("invalid master password"));
        assert!(wrong.contains("corrupted"));

        let aborted = CofferError::MigrationAborted {
            failed: 2,
            total: 7,
        }
        .to_string();
        assert!(aborted.contains("2 of 7"));
    }

    #[test]
    fn storage_helper_boxes_source() {
        let err = CofferError::storage(std::io::Error::other("disk gone"));
        assert!(matches!(err, CofferError::Storage { .. }));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn record_without_kdf_params_uses_historical_defaults() {
        let json = r#"{
            "public_key": "pk",
            "wrapped_private_key": "a.b.c.d",
            "wrapped_data_key": "e"
        }"#;
        let record: KeystoreRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kdf_params, None);
        assert_eq!(
            record.effective_kdf_params(),
            KdfParams {
                memory_cost: 65536,
                iterations: 2,
                parallelism: 4,
            }
        );
    }

    #[test]
    fn credential_field_accessors_follow_column_order() {
        let mut cred = CredentialSecrets::new("c1");
        cred.pin = Some("blob-pin".into());
        cred.notes = Some(String::new());

        assert_eq!(CREDENTIAL_FIELDS[2], "pin");
        assert_eq!(cred.fields()[2].as_deref(), Some("blob-pin"));
        assert_eq!(cred.present_field_count(), 1);

        *cred.fields_mut()[0] = Some("blob-user".into());
        assert_eq!(cred.username.as_deref(), Some("blob-user"));
        assert_eq!(cred.present_field_count(), 2);
    }
}
