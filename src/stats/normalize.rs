//! Cumulative counters to daily deltas.

use chrono::NaiveDate;

use crate::domain::{DailyRecord, Metric};

/// What to do with records whose cumulative value is still below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadingZeros {
    Keep,
    /// Drop everything before the first record with a value of at least 1.
    Skip,
}

/// Day-over-day increase of a cumulative counter.
///
/// The first value is its own delta. A regression (the source reporting a
/// lower total than the day before) yields 0, never a negative delta.
pub fn deltas(values: &[u64]) -> Vec<u64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<u64> = None;
    for &v in values {
        out.push(match prev {
            None => v,
            Some(p) => v.saturating_sub(p),
        });
        prev = Some(v);
    }
    out
}

/// Index of the first record where the counter has started (value >= 1).
pub fn first_started(values: &[u64]) -> Option<usize> {
    values.iter().position(|&v| v >= 1)
}

/// Deltas of `metric` over `records`, optionally without the leading zero run.
pub fn normalize(records: &[DailyRecord], metric: Metric, leading: LeadingZeros) -> Vec<u64> {
    dated_deltas(records, metric, leading)
        .into_iter()
        .map(|(_, d)| d)
        .collect()
}

/// Same as [`normalize`], keeping each delta's date.
pub fn dated_deltas(records: &[DailyRecord], metric: Metric, leading: LeadingZeros) -> Vec<(NaiveDate, u64)> {
    let values: Vec<u64> = records.iter().map(|r| r.value(metric)).collect();
    let start = match leading {
        LeadingZeros::Keep => 0,
        LeadingZeros::Skip => match first_started(&values) {
            Some(idx) => idx,
            None => return Vec::new(),
        },
    };

    // Deltas are taken over the full series so the first kept record is
    // measured against its real predecessor (always 0 when skipping).
    deltas(&values)
        .into_iter()
        .zip(records)
        .skip(start)
        .map(|(d, r)| (r.date, d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(values: &[u64]) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyRecord {
                date: start + chrono::Duration::days(i as i64),
                confirmed: v,
                deaths: 0,
                recovered: 0,
            })
            .collect()
    }

    #[test]
    fn regression_clamps_to_zero() {
        assert_eq!(deltas(&[10, 7, 12]), vec![10, 0, 5]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(deltas(&[]).is_empty());
        assert!(normalize(&[], Metric::Confirmed, LeadingZeros::Skip).is_empty());
    }

    #[test]
    fn all_zero_input_depends_on_mode() {
        let recs = records(&[0, 0, 0]);
        assert!(normalize(&recs, Metric::Confirmed, LeadingZeros::Skip).is_empty());
        assert_eq!(normalize(&recs, Metric::Confirmed, LeadingZeros::Keep), vec![0, 0, 0]);
    }

    #[test]
    fn leading_zeros_are_skipped_but_later_zeros_kept() {
        let recs = records(&[0, 0, 4, 4, 9]);
        let got = dated_deltas(&recs, Metric::Confirmed, LeadingZeros::Skip);
        assert_eq!(got.len(), 3);
        assert_eq!(got[0], (recs[2].date, 4));
        assert_eq!(got[1].1, 0);
        assert_eq!(got[2].1, 5);
    }

    #[test]
    fn deltas_never_negative_on_noisy_input() {
        let values = [5, 3, 3, 8, 1, 0, 20, 19];
        assert!(deltas(&values).iter().all(|&d| d <= 20));
        assert_eq!(deltas(&values), vec![5, 0, 0, 5, 0, 0, 20, 0]);
    }

    #[test]
    fn summed_deltas_reconstruct_monotonic_totals() {
        let values = [3, 5, 9, 9, 14];
        let sum: u64 = deltas(&values).iter().skip(1).sum();
        assert_eq!(sum, values[4] - values[0]);
    }

    #[test]
    fn summed_deltas_are_lossy_after_regression() {
        // 10 -> 7 is a correction. Clamping discards the -3, so the summed
        // deltas exceed the first-to-last growth.
        let values = [10, 7, 12];
        let sum: u64 = deltas(&values).iter().skip(1).sum();
        assert_eq!(sum, 5);
        assert!(sum >= values[2] - values[0]);
    }
}
