// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Item rows: the financial events themselves. Amounts travel as text
//! end to end so no value ever rounds through binary floating point.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{map_sqlite, StoreError};
use crate::models::{Item, ItemFilter, ItemInput, Kind};
use crate::store::{filter_binds, read_amount, read_ts, read_uuid, ITEM_FILTER_WHERE};

const COLUMNS: &str =
    "id, kind, title, amount, currency, occurred_at, category_id, metadata, created_at, updated_at";

fn from_row(row: &Row<'_>) -> Result<Item, StoreError> {
    let id: String = row.get(0)?;
    let kind: String = row.get(1)?;
    let title: String = row.get(2)?;
    let amount: String = row.get(3)?;
    let currency: String = row.get(4)?;
    let occurred_at: String = row.get(5)?;
    let category_id: Option<String> = row.get(6)?;
    let metadata: String = row.get(7)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Item {
        id: read_uuid("items.id", &id)?,
        kind: Kind::parse(&kind)
            .ok_or_else(|| StoreError::Corrupt(format!("bad kind in items.kind: '{kind}'")))?,
        title,
        amount: read_amount(&amount)?,
        currency,
        occurred_at: read_ts("items.occurred_at", &occurred_at)?,
        category_id: category_id
            .map(|c| read_uuid("items.category_id", &c))
            .transpose()?,
        metadata: serde_json::from_str(&metadata)
            .map_err(|_| StoreError::Corrupt("bad json in items.metadata".into()))?,
        created_at: read_ts("items.created_at", &created_at)?,
        updated_at: read_ts("items.updated_at", &updated_at)?,
    })
}

fn category_exists(conn: &Connection, category: Uuid) -> Result<(), StoreError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM categories WHERE id = ?1",
            params![category.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(StoreError::invalid("category does not exist"));
    }
    Ok(())
}

fn metadata_text(input: &ItemInput) -> Result<String, StoreError> {
    serde_json::to_string(&input.metadata)
        .map_err(|e| StoreError::invalid(format!("invalid metadata: {e}")))
}

pub fn create(conn: &Connection, input: &ItemInput) -> Result<Uuid, StoreError> {
    if let Some(category) = input.category_id {
        category_exists(conn, category)?;
    }
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO items
             (id, kind, title, amount, currency, occurred_at, category_id, metadata,
              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id.to_string(),
            input.kind.as_str(),
            input.title,
            input.amount.to_string(),
            input.currency,
            input.occurred_at.to_rfc3339(),
            input.category_id.map(|c| c.to_string()),
            metadata_text(input)?,
            now,
            now
        ],
    )
    .map_err(map_sqlite)?;
    Ok(id)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Item, StoreError> {
    let sql = format!("SELECT {COLUMNS} FROM items WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id.to_string()])?;
    match rows.next()? {
        Some(row) => from_row(row),
        None => Err(StoreError::ItemNotFound),
    }
}

/// Newest first; an empty result is a valid page, not an error.
pub fn list(conn: &Connection, filter: &ItemFilter) -> Result<Vec<Item>, StoreError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM items\n{ITEM_FILTER_WHERE}\nORDER BY occurred_at DESC\nLIMIT ?5 OFFSET ?6"
    );
    let mut stmt = conn.prepare(&sql)?;
    let binds = filter_binds(filter);
    let mut rows = stmt.query(params![
        binds[0],
        binds[1],
        binds[2],
        binds[3],
        filter.limit,
        filter.offset
    ])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(from_row(row)?);
    }
    Ok(items)
}

pub fn update(conn: &Connection, id: Uuid, input: &ItemInput) -> Result<(), StoreError> {
    if let Some(category) = input.category_id {
        category_exists(conn, category)?;
    }
    let rows = conn
        .execute(
            "UPDATE items
             SET kind = ?1, title = ?2, amount = ?3, currency = ?4, occurred_at = ?5,
                 category_id = ?6, metadata = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                input.kind.as_str(),
                input.title,
                input.amount.to_string(),
                input.currency,
                input.occurred_at.to_rfc3339(),
                input.category_id.map(|c| c.to_string()),
                metadata_text(input)?,
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )
        .map_err(map_sqlite)?;
    if rows == 0 {
        return Err(StoreError::ItemNotFound);
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: Uuid) -> Result<(), StoreError> {
    let rows = conn
        .execute("DELETE FROM items WHERE id = ?1", params![id.to_string()])
        .map_err(map_sqlite)?;
    if rows == 0 {
        return Err(StoreError::ItemNotFound);
    }
    Ok(())
}
