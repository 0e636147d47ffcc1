// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a recorded financial event. Stored as lowercase text
/// with a CHECK constraint pinning the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Income,
    Expense,
    Refund,
    Transfer,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
            Kind::Refund => "refund",
            Kind::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Kind> {
        match s {
            "income" => Some(Kind::Income),
            "expense" => Some(Kind::Expense),
            "refund" => Some(Kind::Refund),
            "transfer" => Some(Kind::Transfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Wire body for POST/PUT on categories. Both `name` and `description`
/// are required by the HTTP contract even though description is nullable
/// at rest.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub kind: Kind,
    pub title: String,
    // Serialized as a JSON string both directions to preserve full precision.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing an item, already validated.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub kind: Kind,
    pub title: String,
    pub amount: Decimal,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Wire body for POST/PUT on items. `kind` and `amount` arrive as raw
/// strings so the service can reject them with a field-level message
/// instead of a generic body error; an absent `metadata` becomes `{}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPayload {
    pub kind: String,
    pub title: String,
    pub amount: String,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Conjunction of optional predicates selecting a subset of items.
/// An absent field leaves that dimension unconstrained. `limit`, `offset`
/// and `sort_by` apply to listing only; analytics ignores them.
#[derive(Debug, Clone)]
pub struct ItemFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub kind: Option<Kind>,
    pub limit: i64,
    pub offset: i64,
    // Accepted for contract compatibility; listing always orders by
    // occurred_at descending.
    pub sort_by: String,
}

impl Default for ItemFilter {
    fn default() -> Self {
        ItemFilter {
            from: None,
            to: None,
            category_id: None,
            kind: None,
            limit: 20,
            offset: 0,
            sort_by: "occurred_at".to_string(),
        }
    }
}
