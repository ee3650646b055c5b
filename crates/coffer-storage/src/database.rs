// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection setup: PRAGMAs, WAL mode, migrations, and shutdown checkpoint.
//!
//! Every statement runs on tokio-rusqlite's single background thread. Do not
//! open a second connection for writes.

use std::path::Path;

use coffer_core::CofferError;
use tracing::debug;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = FULL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA secure_delete = ON;";

/// Handle to the vault database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub async fn open(path: &str) -> Result<Self, CofferError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(CofferError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(CofferError::storage)?;

        conn.call(|conn| -> Result<(), CofferError> {
            conn.execute_batch(PRAGMAS).map_err(CofferError::storage)?;
            crate::migrations::run_migrations(conn)
        })
        .await
        .map_err(flatten_tr_err)?;

        debug!(path, "vault database opened");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main file is self-contained.
    pub async fn close(&self) -> Result<(), CofferError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CofferError {
    CofferError::Storage {
        source: Box::new(e),
    }
}

/// Unwrap a domain error raised inside a `call` closure.
pub fn flatten_tr_err(e: tokio_rusqlite::Error<CofferError>) -> CofferError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => CofferError::storage(other),
    }
}
