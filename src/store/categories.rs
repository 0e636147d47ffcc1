// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category rows: hierarchical labels attached to items. Parents are
//! verified before any write and re-parenting walks the ancestor chain
//! so the hierarchy stays a forest.

use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{map_sqlite, StoreError};
use crate::models::{Category, CategoryInput};
use crate::store::{read_ts, read_uuid};

const COLUMNS: &str = "id, name, description, parent_id, created_at, updated_at";

type RawRow = (String, String, Option<String>, Option<String>, String, String);

fn from_row(raw: RawRow) -> Result<Category, StoreError> {
    let (id, name, description, parent_id, created_at, updated_at) = raw;
    Ok(Category {
        id: read_uuid("categories.id", &id)?,
        name,
        description,
        parent_id: parent_id
            .map(|p| read_uuid("categories.parent_id", &p))
            .transpose()?,
        created_at: read_ts("categories.created_at", &created_at)?,
        updated_at: read_ts("categories.updated_at", &updated_at)?,
    })
}

fn parent_exists(conn: &Connection, parent: Uuid) -> Result<(), StoreError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM categories WHERE id = ?1",
            params![parent.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(StoreError::invalid("parent category does not exist"));
    }
    Ok(())
}

/// Re-parenting `id` under `parent` must not close a loop: walk up from
/// the proposed parent and refuse if `id` appears among its ancestors.
fn reject_cycle(conn: &Connection, id: Uuid, parent: Uuid) -> Result<(), StoreError> {
    let target = id.to_string();
    let mut seen = HashSet::new();
    let mut cursor = Some(parent.to_string());
    while let Some(current) = cursor {
        if current == target {
            return Err(StoreError::invalid("category cannot be its own ancestor"));
        }
        if !seen.insert(current.clone()) {
            break;
        }
        cursor = conn
            .query_row(
                "SELECT parent_id FROM categories WHERE id = ?1",
                params![current],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
    }
    Ok(())
}

pub fn create(conn: &Connection, input: &CategoryInput) -> Result<Uuid, StoreError> {
    if let Some(parent) = input.parent_id {
        parent_exists(conn, parent)?;
    }
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO categories (id, name, description, parent_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            input.name,
            input.description,
            input.parent_id.map(|p| p.to_string()),
            now,
            now
        ],
    )
    .map_err(map_sqlite)?;
    Ok(id)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Category, StoreError> {
    let sql = format!("SELECT {COLUMNS} FROM categories WHERE id = ?1");
    let raw = conn
        .query_row(&sql, params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .optional()?;
    match raw {
        Some(raw) => from_row(raw),
        None => Err(StoreError::CategoryNotFound),
    }
}

pub fn list(conn: &Connection) -> Result<Vec<Category>, StoreError> {
    let sql = format!("SELECT {COLUMNS} FROM categories");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut categories = Vec::new();
    while let Some(row) = rows.next()? {
        let id: String = row.get(0)?;
        let name: String = row.get(1)?;
        let description: Option<String> = row.get(2)?;
        let parent_id: Option<String> = row.get(3)?;
        let created_at: String = row.get(4)?;
        let updated_at: String = row.get(5)?;
        categories.push(from_row((
            id, name, description, parent_id, created_at, updated_at,
        ))?);
    }
    if categories.is_empty() {
        return Err(StoreError::NoCategoriesFound);
    }
    Ok(categories)
}

pub fn update(conn: &Connection, id: Uuid, input: &CategoryInput) -> Result<(), StoreError> {
    if let Some(parent) = input.parent_id {
        parent_exists(conn, parent)?;
        reject_cycle(conn, id, parent)?;
    }
    let rows = conn
        .execute(
            "UPDATE categories
             SET name = ?1, description = ?2, parent_id = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                input.name,
                input.description,
                input.parent_id.map(|p| p.to_string()),
                Utc::now().to_rfc3339(),
                id.to_string()
            ],
        )
        .map_err(map_sqlite)?;
    if rows == 0 {
        return Err(StoreError::CategoryNotFound);
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: Uuid) -> Result<(), StoreError> {
    let rows = conn
        .execute(
            "DELETE FROM categories WHERE id = ?1",
            params![id.to_string()],
        )
        .map_err(map_sqlite)?;
    if rows == 0 {
        return Err(StoreError::CategoryNotFound);
    }
    Ok(())
}
