// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the vault core and its collaborators.

pub mod store;

pub use store::VaultStore;
