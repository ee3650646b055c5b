// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted credential queries.
//!
//! Values are opaque blobs; nothing here can read them.

use coffer_core::{CofferError, CredentialSecrets};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::database::Database;

const COLUMNS: &str =
    "id, username_encrypted, password_encrypted, pin_encrypted, extra_encrypted, notes_encrypted";

fn from_row(row: &Row<'_>) -> Result<CredentialSecrets, rusqlite::Error> {
    Ok(CredentialSecrets {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        pin: row.get(3)?,
        extra: row.get(4)?,
        notes: row.get(5)?,
    })
}

/// All credentials ordered by id.
pub async fn list(db: &Database) -> Result<Vec<CredentialSecrets>, CofferError> {
    db.connection()
        .call(|conn| -> Result<Vec<CredentialSecrets>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM credentials ORDER BY id"))?;
            let rows = stmt.query_map([], from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One credential by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<CredentialSecrets>, CofferError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<CredentialSecrets>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM credentials WHERE id = ?1"),
                params![id],
                from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a credential or replace all of its attributes.
pub async fn upsert(db: &Database, credential: &CredentialSecrets) -> Result<(), CofferError> {
    let credential = credential.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> { upsert_row(conn, &credential) })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a credential. Returns whether a row existed.
pub async fn delete(db: &Database, id: &str) -> Result<bool, CofferError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            Ok(conn.execute("DELETE FROM credentials WHERE id = ?1", params![id])? > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub(crate) fn upsert_row(conn: &Connection, c: &CredentialSecrets) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO credentials (id, username_encrypted, password_encrypted, pin_encrypted,
                                  extra_encrypted, notes_encrypted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
             username_encrypted = excluded.username_encrypted,
             password_encrypted = excluded.password_encrypted,
             pin_encrypted = excluded.pin_encrypted,
             extra_encrypted = excluded.extra_encrypted,
             notes_encrypted = excluded.notes_encrypted,
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        params![c.id, c.username, c.password, c.pin, c.extra, c.notes],
    )?;
    Ok(())
}
