//! Command-line parsing for the COVID-19 charts tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Metric, ViewKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "COVID-19 time-series charts (terminal + chat)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chart the most affected countries.
    World(WorldArgs),
    /// Chart a single country.
    Country(CountryArgs),
    /// Print ranking tables (useful for scripting).
    Rank(RankArgs),
    /// Answer chat commands read line by line from stdin.
    Chat(ChatArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same snapshot source and views as the other commands,
    /// rendered with Ratatui.
    Tui(SourceArgs),
}

/// Where the snapshot comes from and how it is filtered.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Read the snapshot from a local JSON file instead of the remote feed.
    #[arg(long, value_name = "JSON")]
    pub input: Option<PathBuf>,

    /// Only use the cached snapshot; never touch the network.
    #[arg(long)]
    pub offline: bool,

    /// Cache directory (overrides COVID_CACHE_DIR).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Minimum value drawn in averaged and per-capita views (overrides COVID_DISPLAY_THRESHOLD).
    #[arg(long)]
    pub threshold: Option<u64>,
}

/// Which chart to draw and where to put it.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Derived view.
    #[arg(long, value_enum, default_value_t = ViewKind::Total)]
    pub view: ViewKind,

    /// Counter the view is computed from (ignored by `mortality`).
    #[arg(long, value_enum, default_value_t = Metric::Confirmed)]
    pub metric: Metric,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the view to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct WorldArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub chart: ChartArgs,

    /// Number of countries (overrides COVID_TOP_N).
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct CountryArgs {
    /// Tracked country key (e.g. RUSSIA) or snapshot entity name (e.g. "Korea, South").
    pub name: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub chart: ChartArgs,
}

#[derive(Debug, Args, Clone)]
pub struct RankArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Counter to rank by.
    #[arg(long, value_enum, default_value_t = Metric::Confirmed)]
    pub metric: Metric,

    /// Rank by mortality rate instead.
    #[arg(long)]
    pub mortality: bool,

    /// Number of rows (overrides COVID_TOP_N).
    #[arg(long)]
    pub top: Option<usize>,

    /// Export the ranking to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// User id the messages come from (preferences are kept per user).
    #[arg(long, default_value_t = 0)]
    pub user: i64,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_world_chart() {
        let cli = Cli::parse_from(["covid", "world", "--view", "per-million", "--metric", "deaths", "--top", "5"]);
        let Command::World(args) = cli.command else {
            panic!("expected world");
        };
        assert_eq!(args.chart.view, ViewKind::PerMillion);
        assert_eq!(args.chart.metric, Metric::Deaths);
        assert_eq!(args.top, Some(5));
    }

    #[test]
    fn parses_country_with_source_flags() {
        let cli = Cli::parse_from(["covid", "country", "ITALY", "--view", "week", "--offline", "--threshold", "1"]);
        let Command::Country(args) = cli.command else {
            panic!("expected country");
        };
        assert_eq!(args.name, "ITALY");
        assert_eq!(args.chart.view, ViewKind::Week);
        assert!(args.source.offline);
        assert_eq!(args.source.threshold, Some(1));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
