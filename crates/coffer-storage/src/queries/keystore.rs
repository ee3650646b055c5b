// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keystore record queries.

use coffer_core::{CofferError, KdfParams, KeystoreRecord};
use rusqlite::{params, Connection, OptionalExtension};

use crate::database::Database;

/// Primary key of the one keystore row.
pub const KEYSTORE_ID: &str = "primary";

/// Load the keystore record, if any.
pub async fn load(db: &Database) -> Result<Option<KeystoreRecord>, CofferError> {
    db.connection()
        .call(|conn| -> Result<Option<KeystoreRecord>, rusqlite::Error> { select(conn) })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert the keystore record; [`CofferError::AlreadyInitialized`] if present.
pub async fn insert(db: &Database, record: &KeystoreRecord) -> Result<(), CofferError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| insert_row(conn, &record))
        .await
        .map_err(crate::database::flatten_tr_err)
}

pub(crate) fn select(conn: &Connection) -> Result<Option<KeystoreRecord>, rusqlite::Error> {
    conn.query_row(
        "SELECT public_key, wrapped_private_key, wrapped_data_key,
                kdf_memory_cost, kdf_iterations, kdf_parallelism
         FROM keystore WHERE id = ?1",
        params![KEYSTORE_ID],
        |row| {
            let memory_cost: Option<u32> = row.get(3)?;
            let iterations: Option<u32> = row.get(4)?;
            let parallelism: Option<u32> = row.get(5)?;
            let kdf_params = match (memory_cost, iterations, parallelism) {
                (Some(memory_cost), Some(iterations), Some(parallelism)) => Some(KdfParams {
                    memory_cost,
                    iterations,
                    parallelism,
                }),
                _ => None,
            };
            Ok(KeystoreRecord {
                public_key: row.get(0)?,
                wrapped_private_key: row.get(1)?,
                wrapped_data_key: row.get(2)?,
                kdf_params,
            })
        },
    )
    .optional()
}

/// Insert on an open connection or transaction.
pub(crate) fn insert_row(conn: &Connection, record: &KeystoreRecord) -> Result<(), CofferError> {
    let kdf = record.kdf_params;
    let result = conn.execute(
        "INSERT INTO keystore (id, public_key, wrapped_private_key, wrapped_data_key,
                               kdf_memory_cost, kdf_iterations, kdf_parallelism)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            KEYSTORE_ID,
            record.public_key,
            record.wrapped_private_key,
            record.wrapped_data_key,
            kdf.map(|p| p.memory_cost),
            kdf.map(|p| p.iterations),
            kdf.map(|p| p.parallelism),
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(CofferError::AlreadyInitialized)
        }
        Err(e) => Err(CofferError::storage(e)),
    }
}
