//! Snapshot JSON parsing.
//!
//! The feed is one JSON object mapping entity name to its records:
//!
//! ```json
//! { "Afghanistan": [ { "date": "2020-1-22", "confirmed": 0, "deaths": 0, "recovered": 0 } ] }
//! ```
//!
//! Object order is kept: it is the encounter order rankings fall back to on ties.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::domain::{DailyRecord, EntitySeries, Snapshot};
use crate::error::AppError;

/// Parse a snapshot document.
///
/// Dates may omit zero padding (`2020-1-22`). Missing or `null` counters
/// read as 0. Anything else malformed fails with exit code 3.
pub fn parse_snapshot(json: &str) -> Result<Snapshot, AppError> {
    let raw: RawSnapshot =
        serde_json::from_str(json).map_err(|e| AppError::new(3, format!("Malformed snapshot JSON: {e}")))?;

    let mut entities = Vec::with_capacity(raw.0.len());
    for (name, rows) in raw.0 {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
                .map_err(|e| AppError::new(3, format!("Invalid date '{}' for '{name}': {e}", row.date)))?;
            records.push(DailyRecord {
                date,
                confirmed: row.confirmed.unwrap_or(0),
                deaths: row.deaths.unwrap_or(0),
                recovered: row.recovered.unwrap_or(0),
            });
        }
        entities.push(EntitySeries::new(name, records));
    }

    Snapshot::from_entries(entities)
}

/// Read and parse a snapshot file.
pub fn read_snapshot_file(path: &Path) -> Result<Snapshot, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read snapshot '{}': {e}", path.display())))?;
    parse_snapshot(&text)
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    #[serde(default)]
    confirmed: Option<u64>,
    #[serde(default)]
    deaths: Option<u64>,
    #[serde(default)]
    recovered: Option<u64>,
}

/// Entries in document order.
struct RawSnapshot(Vec<(String, Vec<RawRecord>)>);

impl<'de> Deserialize<'de> for RawSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawSnapshot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of entity name to daily records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, records)) = map.next_entry::<String, Vec<RawRecord>>()? {
                    entries.push((name, records));
                }
                Ok(RawSnapshot(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
