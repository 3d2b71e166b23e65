//! Chat command parsing.
//!
//! Every chart is reachable two ways: a slash command (`/cases_week`,
//! `/ITALY_fatal_daily`) and the label of the reply-keyboard button that sends
//! it (`🌏 Cases AVG`, `🇮🇹 Daily Fatal`).

use crate::domain::{ChartKind, Country, Metric, TRACKED_COUNTRIES, ViewKind};

/// World button labels start with this globe.
pub const WORLD_MARK: &str = "🌏";

/// Keyboard labels may carry a leading left-to-right mark.
const LRM: char = '\u{200e}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`, `/help`.
    Help,
    /// `/country`: show the country picker.
    PickCountry,
    /// `/stats`: show the chart keyboard for the user's country.
    Menu,
    /// Country picked from the inline keyboard (callback data is the key).
    SelectCountry(&'static Country),
    World(ChartKind),
    Country {
        country: &'static Country,
        chart: ChartKind,
    },
}

const WORLD_COMMANDS: [(&str, ViewKind, Metric); 9] = [
    ("cases", ViewKind::Total, Metric::Confirmed),
    ("fatal", ViewKind::Total, Metric::Deaths),
    ("cases_week", ViewKind::Week, Metric::Confirmed),
    ("fatal_week", ViewKind::Week, Metric::Deaths),
    ("cases_per_1m", ViewKind::PerMillion, Metric::Confirmed),
    ("fatal_per_1m", ViewKind::PerMillion, Metric::Deaths),
    ("cases_bar", ViewKind::Bar, Metric::Confirmed),
    ("fatal_bar", ViewKind::Bar, Metric::Deaths),
    ("mortality", ViewKind::Mortality, Metric::Deaths),
];

/// Reply-keyboard labels for world charts (without the globe).
pub const WORLD_LABELS: [(&str, ViewKind, Metric); 8] = [
    ("Cases AVG", ViewKind::Week, Metric::Confirmed),
    ("Fatal AVG", ViewKind::Week, Metric::Deaths),
    ("Cases per 1M", ViewKind::PerMillion, Metric::Confirmed),
    ("Cases", ViewKind::Total, Metric::Confirmed),
    ("Fatal", ViewKind::Total, Metric::Deaths),
    ("Cases (bar)", ViewKind::Bar, Metric::Confirmed),
    ("Fatal (bar)", ViewKind::Bar, Metric::Deaths),
    ("Mortality", ViewKind::Mortality, Metric::Deaths),
];

const COUNTRY_SUFFIXES: [(&str, ViewKind, Metric); 8] = [
    ("cases_total", ViewKind::Total, Metric::Confirmed),
    ("fatal_total", ViewKind::Total, Metric::Deaths),
    ("cases_daily", ViewKind::Daily, Metric::Confirmed),
    ("fatal_daily", ViewKind::Daily, Metric::Deaths),
    ("cases_week", ViewKind::Week, Metric::Confirmed),
    ("fatal_week", ViewKind::Week, Metric::Deaths),
    ("cases_per_1m", ViewKind::PerMillion, Metric::Confirmed),
    ("mortality", ViewKind::Mortality, Metric::Deaths),
];

/// Reply-keyboard labels for country charts (after the flag).
pub const COUNTRY_LABELS: [(&str, ViewKind, Metric); 4] = [
    ("Total Cases", ViewKind::Total, Metric::Confirmed),
    ("Total Fatal", ViewKind::Total, Metric::Deaths),
    ("Daily Cases", ViewKind::Daily, Metric::Confirmed),
    ("Daily Fatal", ViewKind::Daily, Metric::Deaths),
];

/// Recognise a message or callback payload. `None` means "no option selected".
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim().trim_start_matches(LRM).trim();

    if let Some(cmd) = text.strip_prefix('/') {
        // Group chats address bots as `/cmd@BotName`.
        let cmd = cmd.split('@').next().unwrap_or(cmd);
        return parse_slash(cmd);
    }

    if let Some((mark, label)) = text.split_once(' ') {
        let label = label.trim();
        if mark == WORLD_MARK {
            return lookup(&WORLD_LABELS, label).map(|(v, m)| Command::World(ChartKind::new(v, m)));
        }
        if let Some(country) = Country::by_flag(mark) {
            return lookup(&COUNTRY_LABELS, label).map(|(v, m)| Command::Country {
                country,
                chart: ChartKind::new(v, m),
            });
        }
        return None;
    }

    Country::by_key(text).map(Command::SelectCountry)
}

fn parse_slash(cmd: &str) -> Option<Command> {
    match cmd {
        "start" | "help" => return Some(Command::Help),
        "country" => return Some(Command::PickCountry),
        "stats" => return Some(Command::Menu),
        _ => {}
    }

    if let Some((view, metric)) = lookup(&WORLD_COMMANDS, cmd) {
        return Some(Command::World(ChartKind::new(view, metric)));
    }

    // Keys never contain '_', so the first '_' splits key from chart.
    let (key, suffix) = cmd.split_once('_')?;
    let country = Country::by_key(key)?;
    lookup(&COUNTRY_SUFFIXES, suffix).map(|(view, metric)| Command::Country {
        country,
        chart: ChartKind::new(view, metric),
    })
}

fn lookup(table: &[(&str, ViewKind, Metric)], token: &str) -> Option<(ViewKind, Metric)> {
    table
        .iter()
        .find(|(name, _, _)| *name == token)
        .map(|&(_, view, metric)| (view, metric))
}

/// Slash commands for one country, for help texts.
pub fn country_commands(country: &Country) -> Vec<String> {
    COUNTRY_SUFFIXES
        .iter()
        .map(|(suffix, _, _)| format!("/{}_{suffix}", country.key))
        .collect()
}

/// Every key in the tracked table is usable as a command prefix.
pub fn tracked_keys() -> impl Iterator<Item = &'static str> {
    TRACKED_COUNTRIES.iter().map(|c| c.key)
}
