//! Export derived series to CSV.
//!
//! One row per sample: `label,x,y,secondary`. Dates are ISO-8601, day
//! ordinals are plain integers, `secondary` is empty when the series has none.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{DerivedSeries, RankedEntity};
use crate::error::AppError;

const HEADER: [&str; 4] = ["label", "x", "y", "secondary"];

/// Write line-view series to a CSV file.
pub fn write_series_csv(path: &Path, series: &[DerivedSeries]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(file, series)
}

/// Write a bar view as `label,x,y,secondary` with `x` the rank (1 = first bar).
pub fn write_bars_csv(path: &Path, bars: &[RankedEntity]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_bars(file, bars)
}

fn write_series<W: Write>(out: W, series: &[DerivedSeries]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER).map_err(header_error)?;
    for s in series {
        for (idx, (x, y)) in s.points().enumerate() {
            let secondary = s
                .secondary
                .as_ref()
                .and_then(|sec| sec.y.get(idx))
                .map(|v| v.to_string())
                .unwrap_or_default();
            wtr.write_record([s.label.clone(), x.to_string(), y.to_string(), secondary])
                .map_err(row_error)?;
        }
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

fn write_bars<W: Write>(out: W, bars: &[RankedEntity]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER).map_err(header_error)?;
    for (idx, bar) in bars.iter().enumerate() {
        wtr.write_record([bar.name.clone(), (idx + 1).to_string(), bar.value.to_string(), String::new()])
            .map_err(row_error)?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

fn header_error(e: csv::Error) -> AppError {
    AppError::new(2, format!("Failed to write export CSV header: {e}"))
}

fn row_error(e: csv::Error) -> AppError {
    AppError::new(2, format!("Failed to write export CSV row: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DerivedSecondary, SeriesX};
    use chrono::NaiveDate;

    fn series() -> DerivedSeries {
        let mut s = DerivedSeries::new("Korea, South");
        s.push(SeriesX::Date(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()), 10.0);
        s.push(SeriesX::Date(NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()), 12.5);
        s.secondary = Some(DerivedSecondary {
            label: "Recovered".into(),
            y: vec![1.0, 2.0],
        });
        s
    }

    #[test]
    fn writes_series_rows() {
        let mut out = Vec::new();
        write_series(&mut out, &[series()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "label,x,y,secondary\n\"Korea, South\",2020-03-01,10,1\n\"Korea, South\",2020-03-02,12.5,2\n"
        );
    }

    #[test]
    fn day_ordinals_and_missing_secondary() {
        let mut s = DerivedSeries::new("Italy");
        s.push(SeriesX::Day(1), 4.0);
        let mut out = Vec::new();
        write_series(&mut out, &[s]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "label,x,y,secondary\nItaly,1,4,\n");
    }

    #[test]
    fn writes_bars_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        let bars = vec![
            RankedEntity { name: "Chile".into(), value: 5 },
            RankedEntity { name: "Peru".into(), value: 9 },
        ];
        write_bars_csv(&path, &bars).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "label,x,y,secondary\nChile,1,5,\nPeru,2,9,\n");
    }
}
