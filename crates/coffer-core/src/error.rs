// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Coffer credential vault.

use thiserror::Error;

/// The primary error type used across the vault core, storage, and CLI.
///
/// Messages never include plaintext field values or key material.
#[derive(Debug, Error)]
pub enum CofferError {
    /// Setup or migration attempted while a keystore record already exists.
    #[error("vault is already initialized -- use unlock instead")]
    AlreadyInitialized,

    /// Unlock attempted before any keystore record was created.
    #[error("vault is not initialized -- run setup or migrate first")]
    NotInitialized,

    /// The master password is wrong or the keystore record is corrupted.
    ///
    /// The two causes are deliberately indistinguishable.
    #[error("invalid master password or corrupted keystore data")]
    WrongPasswordOrCorruptedData,

    /// A field operation was attempted while the session is locked.
    #[error("vault is locked -- unlock first")]
    VaultLocked,

    /// A stored blob does not have the expected shape.
    #[error("malformed blob: {0}")]
    MalformedBlob(String),

    /// AEAD authentication failed for an encrypted field.
    #[error("decryption failed -- ciphertext or tag does not authenticate")]
    DecryptionFailed,

    /// One or more legacy credentials could not be decrypted; nothing was committed.
    #[error("migration aborted: {failed} of {total} credentials failed to decrypt, no changes were made")]
    MigrationAborted { failed: usize, total: usize },

    /// Primitive failures: RNG, key generation, invalid KDF parameters.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Configuration errors (invalid TOML, out-of-range parameters).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No stored credential has the requested id.
    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    /// No master password could be obtained from the environment or a terminal.
    #[error("passphrase unavailable: {0}")]
    Passphrase(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CofferError {
    /// Wrap any storage-layer error.
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        CofferError::Storage { source: err.into() }
    }
}
