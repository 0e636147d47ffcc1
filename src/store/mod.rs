// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analytics;
pub mod categories;
pub mod items;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::ItemFilter;

/// Shared predicate block: one prepared statement serves every filter
/// shape, an absent field binds NULL and imposes no restriction.
pub(crate) const ITEM_FILTER_WHERE: &str = "\
WHERE (?1 IS NULL OR occurred_at >= ?1)
  AND (?2 IS NULL OR occurred_at <= ?2)
  AND (?3 IS NULL OR category_id = ?3)
  AND (?4 IS NULL OR kind = ?4)";

/// Bind values for [`ITEM_FILTER_WHERE`], in placeholder order.
/// Timestamps normalize to UTC RFC 3339 so text comparison is
/// chronological.
pub(crate) fn filter_binds(filter: &ItemFilter) -> [Option<String>; 4] {
    [
        filter.from.map(|t| t.to_rfc3339()),
        filter.to.map(|t| t.to_rfc3339()),
        filter.category_id.map(|c| c.to_string()),
        filter.kind.map(|k| k.as_str().to_string()),
    ]
}

pub(crate) fn read_ts(column: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt(format!("bad timestamp in {column}: '{raw}'")))
}

pub(crate) fn read_uuid(column: &str, raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::Corrupt(format!("bad uuid in {column}: '{raw}'")))
}

pub(crate) fn read_amount(raw: &str) -> Result<Decimal, StoreError> {
    raw.parse::<Decimal>()
        .map_err(|_| StoreError::Corrupt(format!("bad amount: '{raw}'")))
}
