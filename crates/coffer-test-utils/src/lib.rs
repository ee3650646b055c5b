// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Coffer integration tests.
//!
//! - [`MemoryStore`] - in-memory [`coffer_core::VaultStore`] with commit
//!   failure injection
//! - [`fast_config`] - configuration with cheap KDF and RSA settings

pub mod config;
pub mod memory_store;

pub use config::fast_config;
pub use memory_store::MemoryStore;
