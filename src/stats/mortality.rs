//! Mortality (deaths / confirmed) rates and rankings.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::domain::{DailyRecord, RankedRate, Snapshot};

/// Entities left out of mortality rankings.
///
/// The cruise ship's tiny, closed population produces a rate that dwarfs
/// every country; it stays in all other rankings.
pub const MORTALITY_EXCLUDED: &[&str] = &["MS Zaandam"];

/// `deaths / confirmed`, or `None` when nothing is confirmed yet.
///
/// Clamped to 1.0: a feed correction can briefly report more deaths than
/// confirmed cases.
pub fn mortality_rate(confirmed: u64, deaths: u64) -> Option<f64> {
    if confirmed == 0 {
        return None;
    }
    Some((deaths as f64 / confirmed as f64).min(1.0))
}

/// Per-date mortality in percent, skipping dates with no confirmed cases.
pub fn mortality_series(records: &[DailyRecord]) -> Vec<(NaiveDate, f64)> {
    records
        .iter()
        .filter_map(|r| mortality_rate(r.confirmed, r.deaths).map(|rate| (r.date, rate * 100.0)))
        .collect()
}

/// Entities with the highest latest mortality rate, descending.
pub fn top_mortality_rates(snapshot: &Snapshot, n: usize) -> Vec<RankedRate> {
    let mut ranked: Vec<RankedRate> = snapshot
        .iter()
        .filter(|e| !MORTALITY_EXCLUDED.contains(&e.name.as_str()))
        .filter_map(|e| {
            let latest = e.latest()?;
            let rate = mortality_rate(latest.confirmed, latest.deaths)?;
            Some(RankedRate {
                name: e.name.clone(),
                rate,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.rate.partial_cmp(&a.rate).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    ranked
}
