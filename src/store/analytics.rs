// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregates over the filtered item set. Everything except `COUNT(*)`
//! is computed in decimal on this side of the connection: SQLite's own
//! SUM/AVG would coerce the text amounts through floats.

use rusqlite::{params, Connection};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::models::ItemFilter;
use crate::store::{filter_binds, read_amount, ITEM_FILTER_WHERE};

pub fn count(conn: &Connection, filter: &ItemFilter) -> Result<i64, StoreError> {
    let sql = format!("SELECT COUNT(*) FROM items\n{ITEM_FILTER_WHERE}");
    let binds = filter_binds(filter);
    let n = conn.query_row(
        &sql,
        params![binds[0], binds[1], binds[2], binds[3]],
        |row| row.get(0),
    )?;
    Ok(n)
}

pub fn sum(conn: &Connection, filter: &ItemFilter) -> Result<Decimal, StoreError> {
    let mut total = Decimal::ZERO;
    fold_amounts(conn, filter, |amount| total += amount)?;
    Ok(total)
}

pub fn avg(conn: &Connection, filter: &ItemFilter) -> Result<Decimal, StoreError> {
    let mut total = Decimal::ZERO;
    let mut n: i64 = 0;
    fold_amounts(conn, filter, |amount| {
        total += amount;
        n += 1;
    })?;
    if n == 0 {
        return Ok(Decimal::ZERO);
    }
    Ok(total / Decimal::from(n))
}

pub fn median(conn: &Connection, filter: &ItemFilter) -> Result<Decimal, StoreError> {
    percentile(conn, filter, 0.5)
}

pub fn percentile(conn: &Connection, filter: &ItemFilter, p: f64) -> Result<Decimal, StoreError> {
    let mut values = Vec::new();
    fold_amounts(conn, filter, |amount| values.push(amount))?;
    percentile_cont(&mut values, p)
}

/// Streams amounts row by row; sum and avg never materialize the set.
fn fold_amounts<F>(conn: &Connection, filter: &ItemFilter, mut f: F) -> Result<(), StoreError>
where
    F: FnMut(Decimal),
{
    let sql = format!("SELECT amount FROM items\n{ITEM_FILTER_WHERE}");
    let mut stmt = conn.prepare(&sql)?;
    let binds = filter_binds(filter);
    let mut rows = stmt.query(params![binds[0], binds[1], binds[2], binds[3]])?;
    while let Some(row) = rows.next()? {
        let raw: String = row.get(0)?;
        f(read_amount(&raw)?);
    }
    Ok(())
}

/// Continuous percentile: sort ascending, take the rank `h = p * (n - 1)`
/// and linearly interpolate between the two adjacent order statistics.
/// The rank is computed in decimal, not f64, so positions like
/// 0.9 * 10 land exactly on 9 instead of 9.000000000000002.
///
/// An empty input yields zero; a whole-number rank returns the stored
/// value verbatim, scale included. An interpolated result is normalized:
/// the rank arithmetic pads trailing zeros (0.25 over [1, 2] multiplies
/// out to 1.50), and the contract renders that as "1.5".
pub fn percentile_cont(values: &mut [Decimal], p: f64) -> Result<Decimal, StoreError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(StoreError::invalid("percentile must be between 0 and 1"));
    }
    if values.is_empty() {
        return Ok(Decimal::ZERO);
    }
    values.sort_unstable();
    let n = values.len();
    if n == 1 {
        return Ok(values[0]);
    }
    let p = Decimal::from_f64(p)
        .ok_or_else(|| StoreError::invalid("percentile must be between 0 and 1"))?;
    let h = p * Decimal::from(n - 1);
    let floor = h.floor();
    let frac = h - floor;
    let lo = floor.to_usize().unwrap_or(n - 1).min(n - 1);
    if frac.is_zero() {
        return Ok(values[lo]);
    }
    let hi = (lo + 1).min(n - 1);
    Ok((values[lo] + frac * (values[hi] - values[lo])).normalize())
}
