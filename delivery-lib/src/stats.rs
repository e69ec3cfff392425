//! Aggregations over dashboard statistic series.
//!
//! The statistics server returns loosely shaped rows, so every helper takes
//! [`Record`]s and tolerates the field aliases seen in the wild (`total` or
//! `amount`, `count` or `value`, ...).

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;

use crate::model::Record;
use crate::model::Value;
use crate::model::timestamp;
use crate::table::TableRow;

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub total: f64,
    pub orders_count: u64,
}

/// Order count for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyCount {
    pub hour: u8,
    pub count: u64,
}

impl TableRow for DailyTotal {
    fn value(&self, field: &str) -> Value {
        match field {
            "date" => Value::from(&self.date),
            "total" => Value::from(self.total),
            "orders_count" => Value::from(self.orders_count as i64),
            _ => Value::Null,
        }
    }
}

impl TableRow for HourlyCount {
    fn value(&self, field: &str) -> Value {
        match field {
            "hour" => Value::from(self.hour as i64),
            "count" => Value::from(self.count as i64),
            _ => Value::Null,
        }
    }
}

/// Sums sales rows per day, sorted by date.
///
/// The day comes from `date`, else `created_at`; rows with neither are
/// skipped. Each row adds `total` (or `amount`) to the day's total and
/// `orders_count` (or `count`, else 1) to its order count.
pub fn group_sales_by_date(sales: &[Record]) -> Vec<DailyTotal> {
    let mut days: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in sales {
        let Some(date) = day_of(row, "date").or_else(|| day_of(row, "created_at")) else {
            continue;
        };
        let entry = days.entry(date).or_default();
        entry.0 += first_number(row, &["total", "amount"]).unwrap_or(0.0);
        entry.1 += first_number(row, &["orders_count", "count"])
            .map(|n| n.max(0.0) as u64)
            .unwrap_or(1);
    }
    collect_days(days)
}

/// Counts orders per `created_at` day and sums `total_price` (or `total`),
/// sorted by date.
pub fn group_orders_by_day(orders: &[Record]) -> Vec<DailyTotal> {
    let mut days: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in orders {
        let Some(date) = day_of(row, "created_at") else {
            continue;
        };
        let entry = days.entry(date).or_default();
        entry.0 += first_number(row, &["total_price", "total"]).unwrap_or(0.0);
        entry.1 += 1;
    }
    collect_days(days)
}

/// Spreads `{hour, count}` rows over exactly 24 buckets.
///
/// Hours outside `0..=23` or not integral are ignored. A later row for the
/// same hour replaces the earlier count.
pub fn format_orders_by_hour(rows: &[Record]) -> Vec<HourlyCount> {
    let mut hours: Vec<HourlyCount> = (0..24).map(|hour| HourlyCount { hour, count: 0 }).collect();
    for row in rows {
        let Some(hour) = row.get("hour").and_then(hour_of) else {
            continue;
        };
        hours[hour].count = first_number(row, &["count", "value"])
            .map(|n| n.max(0.0) as u64)
            .unwrap_or(0);
    }
    hours
}

/// Keeps the most recent state row per motorcycle, in order of first
/// appearance.
///
/// The motorcycle is identified by `motorcycle_id`, `motorcycleId` or `id`.
/// Rows without a parseable `timestamp` count as the epoch, and ties keep
/// the earlier row.
pub fn last_state_per_motorcycle(states: &[Record]) -> Vec<Record> {
    let mut latest: Vec<(Record, i64)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for row in states {
        let id = ["motorcycle_id", "motorcycleId", "id"]
            .iter()
            .filter_map(|field| row.get(field))
            .find(|v| !v.is_null())
            .map(Value::to_string)
            .unwrap_or_default();
        let ts = row.get("timestamp").map(epoch_millis).unwrap_or(0);

        match slots.get(&id) {
            Some(&slot) => {
                if ts > latest[slot].1 {
                    latest[slot] = (row.clone(), ts);
                }
            }
            None => {
                slots.insert(id, latest.len());
                latest.push((row.clone(), ts));
            }
        }
    }

    latest.into_iter().map(|(row, _)| row).collect()
}

fn collect_days(days: BTreeMap<String, (f64, u64)>) -> Vec<DailyTotal> {
    days.into_iter()
        .map(|(date, (total, orders_count))| DailyTotal {
            date,
            total,
            orders_count,
        })
        .collect()
}

/// First ten characters of a date-ish field.
fn day_of(row: &Record, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.chars().take(10).collect()),
        Value::DateTime(dt) => Some(dt.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

/// The first field among `fields` that is present and not null, as a number.
fn first_number(row: &Record, fields: &[&str]) -> Option<f64> {
    let value = fields
        .iter()
        .filter_map(|field| row.get(field))
        .find(|v| !v.is_null())?;
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn hour_of(value: &Value) -> Option<usize> {
    let hour = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    (hour.fract() == 0.0 && (0.0..=23.0).contains(&hour)).then_some(hour as usize)
}

fn epoch_millis(value: &Value) -> i64 {
    match value {
        Value::DateTime(dt) => dt.and_utc().timestamp_millis(),
        Value::String(s) => timestamp::parse(s)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0),
        Value::Int(ms) => *ms,
        _ => 0,
    }
}
