// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Coffer credential vault.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer connection via
//! `tokio-rusqlite`. [`SqliteVaultStore`] implements
//! [`coffer_core::VaultStore`] on top of the typed query modules.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteVaultStore;
