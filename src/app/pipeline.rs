//! Shared "snapshot -> view" logic used by the CLI, chat and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! settings -> snapshot source -> assembler -> view
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;
use tracing::debug;

use crate::cli::SourceArgs;
use crate::config::Settings;
use crate::data::{FileSource, SnapshotCache, SnapshotSource, TimeseriesClient};
use crate::domain::{ChartKind, Country, Snapshot};
use crate::error::AppError;
use crate::stats::{AssemblerConfig, DisplayThreshold, Scope, SeriesAssembler, Unavailable, View, ViewRequest};

/// A single assembled chart, ready to print or draw.
#[derive(Debug, Clone)]
pub struct ChartOutput {
    pub title: String,
    pub view: View,
    /// Latest date in the snapshot the view was built from.
    pub updated: Option<NaiveDate>,
}

/// Pick the snapshot source for a command: a local file, or the cached remote feed.
pub fn open_source(args: &SourceArgs, settings: &Settings) -> Result<Box<dyn SnapshotSource>, AppError> {
    if let Some(path) = &args.input {
        debug!(path = %path.display(), "using snapshot file");
        return Ok(Box::new(FileSource::new(path.clone())));
    }

    let dir = args.cache_dir.clone().unwrap_or_else(|| settings.cache_dir.clone());
    let client = TimeseriesClient::new(settings.data_url.clone(), settings.http_timeout)?;
    let cache = SnapshotCache::new(client, dir, settings.cache_ttl).offline(args.offline);
    Ok(Box::new(cache))
}

/// Assembler tunables: settings, then command-line overrides.
pub fn assembler_config(args: &SourceArgs, settings: &Settings, top: Option<usize>) -> AssemblerConfig {
    AssemblerConfig {
        top_n: top.unwrap_or(settings.top_n).max(1),
        threshold: args.threshold.map(DisplayThreshold::new).unwrap_or(settings.threshold),
        ..AssemblerConfig::default()
    }
}

/// Resolve a user-supplied country name to a snapshot key and a display title.
///
/// Tracked keys (`RUSSIA`) map to their server id; anything else is matched
/// against snapshot names, exactly first and then ignoring case.
pub fn resolve_entity(name: &str, snapshot: &Snapshot) -> (String, String) {
    if let Some(country) = Country::by_key(name) {
        return (country.server_id.to_string(), country.display());
    }
    if snapshot.get(name).is_some() {
        return (name.to_string(), name.to_string());
    }
    let found = snapshot
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
        .map(|e| e.name.clone())
        .unwrap_or_else(|| name.to_string());
    (found.clone(), found)
}

/// Assemble one chart. Unavailable views become errors at this level:
/// the CLI has nothing else to show.
pub fn build_chart(
    assembler: &SeriesAssembler<'_>,
    snapshot: &Snapshot,
    chart: ChartKind,
    scope: Scope,
    title: String,
) -> Result<ChartOutput, AppError> {
    let request = ViewRequest { chart, scope };
    let view = assembler
        .assemble(Some(snapshot), &request)
        .map_err(|reason| match reason {
            Unavailable::NoSnapshot => AppError::new(4, reason.to_string()),
            Unavailable::UnknownEntity(_) => AppError::new(2, reason.to_string()),
        })?;

    Ok(ChartOutput {
        title,
        view,
        updated: snapshot.latest_date(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyRecord, EntitySeries, Metric, ViewKind};
    use crate::stats::PopulationLookup;

    struct Flat;

    impl PopulationLookup for Flat {
        fn population(&self, _name: &str) -> u64 {
            10_000_000
        }
    }

    fn snapshot() -> Snapshot {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let one = |name: &str| {
            EntitySeries::new(
                name,
                vec![DailyRecord {
                    date,
                    confirmed: 10,
                    deaths: 1,
                    recovered: 0,
                }],
            )
        };
        Snapshot::from_entries(vec![one("Korea, South"), one("Russia")]).unwrap()
    }

    #[test]
    fn resolves_keys_and_names() {
        let s = snapshot();
        assert_eq!(resolve_entity("russia", &s), ("Russia".to_string(), "🇷🇺 Russia".to_string()));
        assert_eq!(resolve_entity("korea, south", &s).0, "Korea, South");
        assert_eq!(resolve_entity("Atlantis", &s).0, "Atlantis");
    }

    #[test]
    fn overrides_win_over_settings() {
        let settings = Settings::default();
        let args = SourceArgs {
            threshold: Some(1),
            ..SourceArgs::default()
        };
        let config = assembler_config(&args, &settings, Some(3));
        assert_eq!(config.top_n, 3);
        assert_eq!(config.threshold, DisplayThreshold::new(1));

        let config = assembler_config(&SourceArgs::default(), &settings, None);
        assert_eq!(config.top_n, settings.top_n);
        assert_eq!(config.threshold, settings.threshold);
    }

    #[test]
    fn unknown_entity_is_a_usage_error() {
        let pop = Flat;
        let assembler = SeriesAssembler::new(&pop, AssemblerConfig::default());
        let err = build_chart(
            &assembler,
            &snapshot(),
            ChartKind::new(ViewKind::Daily, Metric::Confirmed),
            Scope::Entity("Atlantis".into()),
            "x".into(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn chart_carries_update_date() {
        let pop = Flat;
        let assembler = SeriesAssembler::new(&pop, AssemblerConfig::default());
        let out = build_chart(
            &assembler,
            &snapshot(),
            ChartKind::new(ViewKind::Bar, Metric::Deaths),
            Scope::World,
            "Top".into(),
        )
        .unwrap();
        assert_eq!(out.updated, NaiveDate::from_ymd_opt(2020, 5, 1));
        assert!(matches!(out.view, View::Bars(ref bars) if bars.len() == 2));
    }
}
