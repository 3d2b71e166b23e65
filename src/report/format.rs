//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - output changes are localized (the golden tests below pin them)

use chrono::NaiveDate;

use crate::domain::{RankedEntity, RankedRate};
use crate::stats::EntitySummary;

/// Table of entities ranked by a cumulative value.
pub fn format_rankings(title: &str, rows: &[RankedEntity]) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    push_row(&mut out, format!("{:>3} {:<24} {:>14}", "#", "country", "value"));
    push_row(&mut out, format!("{:-<3} {:-<24} {:-<14}", "", "", ""));
    for (idx, row) in rows.iter().enumerate() {
        push_row(
            &mut out,
            format!(
                "{:>3} {:<24} {:>14}",
                idx + 1,
                truncate(&row.name, 24),
                fmt_thousands(row.value)
            ),
        );
    }
    out
}

/// Table of entities ranked by mortality rate.
pub fn format_mortality(rows: &[RankedRate]) -> String {
    let mut out = String::new();
    out.push_str("Mortality rate (deaths / confirmed):\n");
    push_row(&mut out, format!("{:>3} {:<24} {:>8}", "#", "country", "rate"));
    push_row(&mut out, format!("{:-<3} {:-<24} {:-<8}", "", "", ""));
    for (idx, row) in rows.iter().enumerate() {
        push_row(
            &mut out,
            format!(
                "{:>3} {:<24} {:>7.2}%",
                idx + 1,
                truncate(&row.name, 24),
                row.rate * 100.0
            ),
        );
    }
    out
}

/// Latest numbers for one entity.
pub fn format_summary(title: &str, s: &EntitySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{title} ({})\n", fmt_date(s.date)));
    out.push_str(&format!(
        "Confirmed: {} (+{})\n",
        fmt_thousands(s.confirmed),
        fmt_thousands(s.new_confirmed)
    ));
    out.push_str(&format!(
        "Deaths:    {} (+{})\n",
        fmt_thousands(s.deaths),
        fmt_thousands(s.new_deaths)
    ));
    out.push_str(&format!(
        "Recovered: {} (+{})\n",
        fmt_thousands(s.recovered),
        fmt_thousands(s.new_recovered)
    ));
    match s.mortality_pct {
        Some(pct) => out.push_str(&format!("Mortality: {pct:.2}%\n")),
        None => out.push_str("Mortality: n/a\n"),
    }
    out
}

/// Compact tick label: `4500 -> 4.5K`, `4000 -> 4K`, `2_100_000 -> 2.1M`.
pub fn fmt_compact(v: f64) -> String {
    let (scaled, suffix) = if v >= 1e9 {
        (v / 1e9, "B")
    } else if v >= 1e6 {
        (v / 1e6, "M")
    } else if v >= 1e3 {
        (v / 1e3, "K")
    } else {
        (v, "")
    };
    let rounded = (scaled * 10.0).round() / 10.0;
    let text = format!("{rounded:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}{suffix}")
}

/// `1234567 -> 1,234,567`.
pub fn fmt_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Day and month, the way update stamps are shown (`01 Apr 2020`).
pub fn fmt_date(d: NaiveDate) -> String {
    d.format("%d %b %Y").to_string()
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_ticks() {
        assert_eq!(fmt_compact(4500.0), "4.5K");
        assert_eq!(fmt_compact(4000.0), "4K");
        assert_eq!(fmt_compact(2_100_000.0), "2.1M");
        assert_eq!(fmt_compact(1_300_000_000.0), "1.3B");
        assert_eq!(fmt_compact(12.0), "12");
        assert_eq!(fmt_compact(2.5), "2.5");
        assert_eq!(fmt_compact(0.0), "0");
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(fmt_thousands(0), "0");
        assert_eq!(fmt_thousands(999), "999");
        assert_eq!(fmt_thousands(1000), "1,000");
        assert_eq!(fmt_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn truncates_long_names() {
        assert_eq!(truncate("Italy", 8), "Italy");
        assert_eq!(truncate("Saint Vincent and the Grenadines", 10), "Saint Vin.");
    }

    #[test]
    fn rankings_table() {
        let rows = vec![
            RankedEntity { name: "US".into(), value: 1_234_567 },
            RankedEntity { name: "Italy".into(), value: 98_765 },
        ];
        let expected = "\
Top confirmed:
  # country                           value
--- ------------------------ --------------
  1 US                            1,234,567
  2 Italy                            98,765
";
        assert_eq!(format_rankings("Top confirmed:", &rows), expected);
    }

    #[test]
    fn mortality_table() {
        let rows = vec![RankedRate { name: "Belgium".into(), rate: 0.1625 }];
        let expected = "\
Mortality rate (deaths / confirmed):
  # country                      rate
--- ------------------------ --------
  1 Belgium                    16.25%
";
        assert_eq!(format_mortality(&rows), expected);
    }

    #[test]
    fn summary_block() {
        let s = EntitySummary {
            name: "Italy".into(),
            date: NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
            confirmed: 110_574,
            deaths: 13_155,
            recovered: 16_847,
            new_confirmed: 4_053,
            new_deaths: 837,
            new_recovered: 1_118,
            mortality_pct: Some(11.897),
        };
        let expected = "\
🇮🇹 Italy (01 Apr 2020)
Confirmed: 110,574 (+4,053)
Deaths:    13,155 (+837)
Recovered: 16,847 (+1,118)
Mortality: 11.90%
";
        assert_eq!(format_summary("🇮🇹 Italy", &s), expected);
    }
}
