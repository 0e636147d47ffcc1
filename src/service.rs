// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Business layer between the HTTP handlers and the store. Adapts wire
//! payloads into validated models and filters, routes reads and writes
//! through the shared [`Db`] handle, and tags every failure with the
//! operation that raised it.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::Db;
use crate::error::{ServiceError, StoreError};
use crate::models::{
    Category, CategoryInput, CategoryPayload, Item, ItemFilter, ItemInput, ItemPayload, Kind,
};
use crate::store;

static CURRENCY: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Z]{3}$").unwrap());

/// Cheaply cloneable service handle; one per process, shared by every
/// request task.
#[derive(Clone)]
pub struct Ledger {
    db: Db,
}

impl Ledger {
    pub fn new(db: Db) -> Ledger {
        Ledger { db }
    }

    // --- categories ---

    pub async fn create_category(&self, payload: CategoryPayload) -> Result<Uuid, ServiceError> {
        let op = "create category";
        let input = validate_category(payload).map_err(ServiceError::wrap(op))?;
        self.db
            .write(move |conn| store::categories::create(conn, &input))
            .await
            .map_err(ServiceError::wrap(op))
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, ServiceError> {
        self.db
            .read(move |conn| store::categories::get(conn, id))
            .await
            .map_err(ServiceError::wrap("get category"))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        self.db
            .read(store::categories::list)
            .await
            .map_err(ServiceError::wrap("list categories"))
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        payload: CategoryPayload,
    ) -> Result<(), ServiceError> {
        let op = "update category";
        let input = validate_category(payload).map_err(ServiceError::wrap(op))?;
        self.db
            .write(move |conn| store::categories::update(conn, id, &input))
            .await
            .map_err(ServiceError::wrap(op))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), ServiceError> {
        self.db
            .write(move |conn| store::categories::delete(conn, id))
            .await
            .map_err(ServiceError::wrap("delete category"))
    }

    // --- items ---

    pub async fn create_item(&self, payload: ItemPayload) -> Result<Uuid, ServiceError> {
        let op = "create item";
        let input = validate_item(payload).map_err(ServiceError::wrap(op))?;
        self.db
            .write(move |conn| store::items::create(conn, &input))
            .await
            .map_err(ServiceError::wrap(op))
    }

    pub async fn get_item(&self, id: Uuid) -> Result<Item, ServiceError> {
        self.db
            .read(move |conn| store::items::get(conn, id))
            .await
            .map_err(ServiceError::wrap("get item"))
    }

    pub async fn list_items(&self, filter: ItemFilter) -> Result<Vec<Item>, ServiceError> {
        self.db
            .read(move |conn| store::items::list(conn, &filter))
            .await
            .map_err(ServiceError::wrap("list items"))
    }

    pub async fn update_item(&self, id: Uuid, payload: ItemPayload) -> Result<(), ServiceError> {
        let op = "update item";
        let input = validate_item(payload).map_err(ServiceError::wrap(op))?;
        self.db
            .write(move |conn| store::items::update(conn, id, &input))
            .await
            .map_err(ServiceError::wrap(op))
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), ServiceError> {
        self.db
            .write(move |conn| store::items::delete(conn, id))
            .await
            .map_err(ServiceError::wrap("delete item"))
    }

    // --- analytics ---

    pub async fn sum(&self, filter: ItemFilter) -> Result<Decimal, ServiceError> {
        self.db
            .read(move |conn| store::analytics::sum(conn, &filter))
            .await
            .map_err(ServiceError::wrap("analytics sum"))
    }

    pub async fn avg(&self, filter: ItemFilter) -> Result<Decimal, ServiceError> {
        self.db
            .read(move |conn| store::analytics::avg(conn, &filter))
            .await
            .map_err(ServiceError::wrap("analytics avg"))
    }

    pub async fn count(&self, filter: ItemFilter) -> Result<i64, ServiceError> {
        self.db
            .read(move |conn| store::analytics::count(conn, &filter))
            .await
            .map_err(ServiceError::wrap("analytics count"))
    }

    pub async fn median(&self, filter: ItemFilter) -> Result<Decimal, ServiceError> {
        self.db
            .read(move |conn| store::analytics::median(conn, &filter))
            .await
            .map_err(ServiceError::wrap("analytics median"))
    }

    pub async fn percentile(&self, filter: ItemFilter, p: f64) -> Result<Decimal, ServiceError> {
        self.db
            .read(move |conn| store::analytics::percentile(conn, &filter, p))
            .await
            .map_err(ServiceError::wrap("analytics percentile"))
    }
}

fn validate_category(payload: CategoryPayload) -> Result<CategoryInput, StoreError> {
    if payload.name.is_empty() {
        return Err(StoreError::invalid("name must not be empty"));
    }
    if payload.description.is_empty() {
        return Err(StoreError::invalid("description must not be empty"));
    }
    Ok(CategoryInput {
        name: payload.name,
        description: Some(payload.description),
        parent_id: payload.parent_id,
    })
}

fn validate_item(payload: ItemPayload) -> Result<ItemInput, StoreError> {
    let kind = Kind::parse(&payload.kind)
        .ok_or_else(|| StoreError::invalid(format!("invalid kind '{}'", payload.kind)))?;
    if payload.title.is_empty() {
        return Err(StoreError::invalid("title must not be empty"));
    }
    let amount = payload
        .amount
        .parse::<Decimal>()
        .map_err(|_| StoreError::invalid(format!("invalid amount '{}'", payload.amount)))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(StoreError::invalid("amount must not be negative"));
    }
    if !CURRENCY.is_match(&payload.currency) {
        return Err(StoreError::invalid(
            "currency must be a three-letter uppercase code",
        ));
    }
    Ok(ItemInput {
        kind,
        title: payload.title,
        amount,
        currency: payload.currency,
        occurred_at: payload.occurred_at,
        category_id: payload.category_id,
        metadata: payload.metadata.unwrap_or_default(),
    })
}
