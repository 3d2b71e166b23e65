//! Top-N selection by latest cumulative value.

use crate::domain::{EntitySeries, Metric, RankedEntity, Snapshot};

pub const DEFAULT_TOP_N: usize = 10;

/// Entities with the highest latest value of `metric`, descending.
///
/// Ties keep snapshot encounter order (stable sort). Entities with an empty
/// series have no latest value and are left out.
pub fn top_series<'a>(snapshot: &'a Snapshot, metric: Metric, n: usize) -> Vec<&'a EntitySeries> {
    let mut ranked: Vec<(&EntitySeries, u64)> = snapshot
        .iter()
        .filter_map(|e| e.latest().map(|r| (e, r.value(metric))))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(n).map(|(e, _)| e).collect()
}

/// `(name, latest value)` pairs for the top `n` entities, descending.
pub fn top_n(snapshot: &Snapshot, metric: Metric, n: usize) -> Vec<RankedEntity> {
    top_series(snapshot, metric, n)
        .into_iter()
        .filter_map(|e| {
            e.latest().map(|r| RankedEntity {
                name: e.name.clone(),
                value: r.value(metric),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyRecord;
    use chrono::NaiveDate;

    fn entity(name: &str, totals: &[u64]) -> EntitySeries {
        let start = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
        let records = totals
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyRecord {
                date: start + chrono::Duration::days(i as i64),
                confirmed: v,
                deaths: v / 10,
                recovered: 0,
            })
            .collect();
        EntitySeries::new(name, records)
    }

    #[test]
    fn ranks_by_last_record_descending() {
        let snapshot = Snapshot::from_entries(vec![
            entity("A", &[1, 50]),
            entity("B", &[100, 90]),
            entity("C", &[5, 500]),
        ])
        .unwrap();
        let top = top_n(&snapshot, Metric::Confirmed, 2);
        assert_eq!(
            top,
            vec![
                RankedEntity { name: "C".into(), value: 500 },
                RankedEntity { name: "B".into(), value: 90 },
            ]
        );
    }

    #[test]
    fn ties_keep_encounter_order() {
        let snapshot = Snapshot::from_entries(vec![
            entity("Zed", &[10]),
            entity("Big", &[99]),
            entity("Alf", &[10]),
            entity("Mid", &[10]),
        ])
        .unwrap();
        let names: Vec<String> = top_n(&snapshot, Metric::Confirmed, 10)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Big", "Zed", "Alf", "Mid"]);
    }

    #[test]
    fn empty_series_are_skipped() {
        let snapshot = Snapshot::from_entries(vec![entity("Empty", &[]), entity("One", &[1])]).unwrap();
        let top = top_n(&snapshot, Metric::Deaths, 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "One");
    }
}
