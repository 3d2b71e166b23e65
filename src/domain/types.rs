//! Shared domain types.
//!
//! The snapshot types are read-only once built: the engine borrows them and
//! produces fresh `DerivedSeries` values per request.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which cumulative counter a view is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Confirmed, Metric::Deaths, Metric::Recovered];

    /// Field name in the upstream JSON feed.
    pub fn data_name(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recovered",
        }
    }

    /// Human-readable label for chart titles and tables.
    pub fn title(self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed",
            Metric::Deaths => "Deaths",
            Metric::Recovered => "Recovered",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Derived view the presentation layer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    /// Raw cumulative values per date.
    Total,
    /// Non-negative day-over-day deltas.
    Daily,
    /// 7-day trailing average of the daily deltas.
    Week,
    /// Weekly average rescaled to "per million inhabitants".
    PerMillion,
    /// Latest cumulative value for the top-N entities.
    Bar,
    /// Deaths / confirmed, in percent, for the highest-rate entities.
    Mortality,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::Total,
        ViewKind::Daily,
        ViewKind::Week,
        ViewKind::PerMillion,
        ViewKind::Bar,
        ViewKind::Mortality,
    ];

    /// Stable short name (used in chart names and export files).
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Total => "total",
            ViewKind::Daily => "active",
            ViewKind::Week => "week",
            ViewKind::PerMillion => "per_1m",
            ViewKind::Bar => "bar",
            ViewKind::Mortality => "mortality",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Total => "Total",
            ViewKind::Daily => "Daily",
            ViewKind::Week => "7-day rolling average",
            ViewKind::PerMillion => "Daily per million inhabitants",
            ViewKind::Bar => "Top countries",
            ViewKind::Mortality => "Mortality rate",
        }
    }

    /// Mortality is always deaths over confirmed; every other view reads one metric.
    pub fn uses_metric(self) -> bool {
        !matches!(self, ViewKind::Mortality)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A concrete chart: view plus metric, with a stable name and a display title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartKind {
    pub view: ViewKind,
    pub metric: Metric,
}

impl ChartKind {
    pub fn new(view: ViewKind, metric: Metric) -> Self {
        Self { view, metric }
    }

    /// Stable identity, e.g. `confirmed_week` or `mortality`.
    pub fn name(&self) -> String {
        if self.view.uses_metric() {
            format!("{}_{}", self.metric.data_name(), self.view.name())
        } else {
            self.view.name().to_string()
        }
    }

    pub fn title(&self) -> String {
        if self.view.uses_metric() {
            format!("{} – {}", self.metric.title(), self.view.title())
        } else {
            self.view.title().to_string()
        }
    }
}

/// One date's cumulative observation for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

impl DailyRecord {
    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Confirmed => self.confirmed,
            Metric::Deaths => self.deaths,
            Metric::Recovered => self.recovered,
        }
    }
}

/// An entity (country or region) and its date-ascending records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySeries {
    pub name: String,
    pub records: Vec<DailyRecord>,
}

impl EntitySeries {
    pub fn new(name: impl Into<String>, records: Vec<DailyRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Last record of the series (the "latest" observation).
    pub fn latest(&self) -> Option<&DailyRecord> {
        self.records.last()
    }

    pub fn values(&self, metric: Metric) -> Vec<u64> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }
}

/// One fetched copy of the full dataset.
///
/// Entities keep their encounter order from the source document; that order
/// is what ranking ties fall back to.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entities: Vec<EntitySeries>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    /// Build a snapshot, validating the fetch-layer contract.
    ///
    /// Entity names must be unique and each series must be strictly
    /// date-ascending. A violation is a malformed feed (exit code 3).
    pub fn from_entries(entities: Vec<EntitySeries>) -> Result<Self, AppError> {
        let mut index = HashMap::with_capacity(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            for pair in entity.records.windows(2) {
                if pair[1].date <= pair[0].date {
                    return Err(AppError::new(
                        3,
                        format!(
                            "Series for '{}' is not date-ascending ({} followed by {}).",
                            entity.name, pair[0].date, pair[1].date
                        ),
                    ));
                }
            }
            if index.insert(entity.name.clone(), idx).is_some() {
                return Err(AppError::new(
                    3,
                    format!("Duplicate entity '{}' in snapshot.", entity.name),
                ));
            }
        }
        Ok(Self { entities, index })
    }

    /// Case-sensitive lookup by source identifier.
    pub fn get(&self, name: &str) -> Option<&EntitySeries> {
        self.index.get(name).map(|&idx| &self.entities[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitySeries> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Most recent date across all entities.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.entities
            .iter()
            .filter_map(|e| e.latest().map(|r| r.date))
            .max()
    }
}

/// X coordinate of a derived sample: a calendar date or a day ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SeriesX {
    Date(NaiveDate),
    /// 1-based day number since the series' first displayed sample.
    Day(u32),
}

impl SeriesX {
    /// Numeric position for plotting (days since CE for dates).
    pub fn as_f64(self) -> f64 {
        match self {
            SeriesX::Date(d) => f64::from(chrono::Datelike::num_days_from_ce(&d)),
            SeriesX::Day(n) => f64::from(n),
        }
    }
}

impl fmt::Display for SeriesX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesX::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            SeriesX::Day(n) => write!(f, "{n}"),
        }
    }
}

/// Engine output for one entity: ordered `(x, y)` samples plus an optional
/// secondary series aligned to the same x values.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub label: String,
    pub x: Vec<SeriesX>,
    pub y: Vec<f64>,
    pub secondary: Option<DerivedSecondary>,
}

/// A second line drawn against the same x values (e.g. recovered next to confirmed).
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSecondary {
    pub label: String,
    pub y: Vec<f64>,
}

impl DerivedSeries {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            x: Vec::new(),
            y: Vec::new(),
            secondary: None,
        }
    }

    pub fn push(&mut self, x: SeriesX, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (SeriesX, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// An entity ranked by its latest cumulative value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntity {
    pub name: String,
    pub value: u64,
}

/// An entity ranked by its latest mortality rate (fraction in `[0, 1]`).
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRate {
    pub name: String,
    pub rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(y: i32, m: u32, d: u32, confirmed: u64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            confirmed,
            deaths: 0,
            recovered: 0,
        }
    }

    #[test]
    fn snapshot_rejects_unordered_series() {
        let series = EntitySeries::new("X", vec![rec(2020, 3, 2, 1), rec(2020, 3, 1, 2)]);
        let err = Snapshot::from_entries(vec![series]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn snapshot_rejects_duplicate_names() {
        let a = EntitySeries::new("X", vec![rec(2020, 3, 1, 1)]);
        let b = EntitySeries::new("X", vec![rec(2020, 3, 1, 1)]);
        assert!(Snapshot::from_entries(vec![a, b]).is_err());
    }

    #[test]
    fn snapshot_keeps_encounter_order() {
        let names = ["Zeta", "Alpha", "Mid"];
        let entries = names
            .iter()
            .map(|n| EntitySeries::new(*n, vec![rec(2020, 3, 1, 1)]))
            .collect();
        let snapshot = Snapshot::from_entries(entries).unwrap();
        let got: Vec<&str> = snapshot.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(got, names);
        assert!(snapshot.get("alpha").is_none());
        assert!(snapshot.get("Alpha").is_some());
    }

    #[test]
    fn chart_names_are_stable() {
        assert_eq!(ChartKind::new(ViewKind::Week, Metric::Confirmed).name(), "confirmed_week");
        assert_eq!(ChartKind::new(ViewKind::Bar, Metric::Deaths).name(), "deaths_bar");
        assert_eq!(ChartKind::new(ViewKind::Mortality, Metric::Deaths).name(), "mortality");
    }

    #[test]
    fn metric_cycle_wraps() {
        assert_eq!(Metric::Recovered.next(), Metric::Confirmed);
        assert_eq!(Metric::Confirmed.prev(), Metric::Recovered);
    }
}
