// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Locked` / `Unlocked` session state machine.
//!
//! State changes (setup, unlock, lock, migration) must hold a
//! [`SessionTransition`], which serializes them on an async mutex. Field
//! operations only clone the `Arc` of the held material under a short read
//! lock and then run concurrently.

use std::sync::{Arc, PoisonError, RwLock};

use coffer_core::CofferError;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::keystore::SessionKeys;

/// Process-wide session holding decrypted key material once unlocked.
#[derive(Default)]
pub struct VaultSession {
    transition: Mutex<()>,
    keys: RwLock<Option<Arc<SessionKeys>>>,
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("unlocked", &self.is_unlocked())
            .finish()
    }
}

impl VaultSession {
    /// A new session starts `Locked`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether key material is currently held.
    pub fn is_unlocked(&self) -> bool {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Shared handle to the held material, or [`CofferError::VaultLocked`].
    ///
    /// A concurrent lock does not invalidate a handle already taken; the
    /// material is dropped once the last handle goes away.
    pub fn keys(&self) -> Result<Arc<SessionKeys>, CofferError> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CofferError::VaultLocked)
    }

    /// Wait for exclusive access to change the session state.
    pub async fn begin_transition(&self) -> SessionTransition<'_> {
        SessionTransition {
            _guard: self.transition.lock().await,
            session: self,
        }
    }

    /// Discard held key material. Idempotent.
    pub async fn lock(&self) {
        let transition = self.begin_transition().await;
        if transition.clear() {
            info!("vault locked");
        }
    }

    fn swap(&self, next: Option<Arc<SessionKeys>>) -> Option<Arc<SessionKeys>> {
        let mut slot = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, next)
    }
}

/// Exclusive right to change the session state, held for the whole of a
/// setup, unlock, lock, or migration.
pub struct SessionTransition<'a> {
    _guard: MutexGuard<'a, ()>,
    session: &'a VaultSession,
}

impl SessionTransition<'_> {
    /// Move to `Unlocked` with `keys`, replacing any previous material.
    pub fn install(&self, keys: SessionKeys) {
        self.session.swap(Some(Arc::new(keys)));
    }

    /// Move to `Locked`. Returns whether material was held.
    pub fn clear(&self) -> bool {
        self.session.swap(None).is_some()
    }
}
