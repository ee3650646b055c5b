// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope encryption for the Coffer credential vault.
//!
//! Sensitive fields are sealed with AES-256-GCM under a random data-encryption
//! key (DEK). The DEK is wrapped with an RSA public key (OAEP-SHA256), and the
//! RSA private key is sealed under a key derived from the master password with
//! Argon2id. Unlocking recovers the DEK into a process-wide [`VaultSession`];
//! locking discards it.
//!
//! Vaults written by the legacy single-key Fernet scheme are moved over with
//! [`Vault::run_migration`], which either rewrites every field or nothing.

pub mod blob;
pub mod credential;
pub mod crypto;
pub mod field;
pub mod kdf;
pub mod keystore;
pub mod keywrap;
pub mod legacy;
pub mod migration;
pub mod prompt;
pub mod session;
pub mod vault;

pub use credential::{CredentialInput, CredentialView, PIN_MASK, SECRET_MASK};
pub use migration::MigrationReport;
pub use prompt::{get_vault_passphrase, get_vault_passphrase_with_confirm, vault_startup_check};
pub use session::VaultSession;
pub use vault::Vault;
