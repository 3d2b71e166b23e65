//! Answers chat commands with text, charts and keyboards.

use tracing::{debug, warn};

use crate::bot::command::{Command, country_commands, parse_command};
use crate::bot::keyboard::{Keyboard, country_picker, menu_keyboard};
use crate::data::{PreferenceStore, SnapshotSource};
use crate::domain::{ChartKind, Country, Snapshot};
use crate::plot::{render_bar_chart, render_line_chart};
use crate::report::{fmt_date, format_summary};
use crate::stats::{Scope, SeriesAssembler, View, ViewRequest};

pub const WELCOME: &str = "\
Welcome to the COVID-19 charts bot. I visualize statistics related to COVID-19.

Send /stats to get charts for the whole world or your country.
Send /country to select your country.";

pub const NO_OPTION: &str = "No option selected";

/// One answer to one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Rendered chart, sent as a preformatted block.
    pub chart: Option<String>,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chart: None,
            keyboard: None,
        }
    }

    fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Chart size for replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: usize,
    pub height: usize,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self { width: 72, height: 18 }
    }
}

pub struct ChatSession<'p, S> {
    source: S,
    assembler: SeriesAssembler<'p>,
    prefs: PreferenceStore,
    size: ChartSize,
}

impl<'p, S: SnapshotSource> ChatSession<'p, S> {
    pub fn new(source: S, assembler: SeriesAssembler<'p>, size: ChartSize) -> Self {
        Self {
            source,
            assembler,
            prefs: PreferenceStore::new(),
            size,
        }
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    /// Handle one message (or inline-button payload) from `user`.
    pub fn handle(&mut self, user: i64, text: &str) -> Reply {
        let Some(command) = parse_command(text) else {
            debug!(user, text, "unrecognised message");
            return Reply::text(NO_OPTION);
        };

        match command {
            Command::Help => {
                let country = self.prefs.get(user);
                let commands = country_commands(country).join("\n");
                Reply::text(format!("{WELCOME}\n\nCommands for {}:\n{commands}", country.display()))
            }
            Command::PickCountry => Reply::text("Select your country").with_keyboard(country_picker()),
            Command::Menu => {
                let country = self.prefs.get(user);
                Reply::text("Select keyboard option").with_keyboard(menu_keyboard(country))
            }
            Command::SelectCountry(country) => {
                self.prefs.set(user, country);
                Reply::text(format!("Selected option: {}", country.display())).with_keyboard(menu_keyboard(country))
            }
            Command::World(chart) => self.chart_reply(chart, Scope::World, format!("World: {}", chart.title())),
            Command::Country { country, chart } => self.country_reply(country, chart),
        }
    }

    fn fetch(&mut self) -> Option<Snapshot> {
        match self.source.fetch_snapshot() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "snapshot unavailable");
                None
            }
        }
    }

    fn country_reply(&mut self, country: &'static Country, chart: ChartKind) -> Reply {
        let title = format!("{}: {}", country.display(), chart.title());
        let snapshot = self.fetch();
        let mut reply = self.render(snapshot.as_ref(), chart, Scope::Entity(country.server_id.to_string()), title);
        if reply.chart.is_some() {
            if let Ok(summary) = self.assembler.summary(snapshot.as_ref(), country.server_id) {
                reply.text = format_summary(&country.display(), &summary);
            }
        }
        reply
    }

    fn chart_reply(&mut self, chart: ChartKind, scope: Scope, title: String) -> Reply {
        let snapshot = self.fetch();
        self.render(snapshot.as_ref(), chart, scope, title)
    }

    fn render(&self, snapshot: Option<&Snapshot>, chart: ChartKind, scope: Scope, title: String) -> Reply {
        let request = ViewRequest { chart, scope };
        let view = match self.assembler.assemble(snapshot, &request) {
            Ok(view) => view,
            Err(reason) => return Reply::text(reason.to_string()),
        };

        let rendered = match &view {
            View::Lines(lines) => render_line_chart(&title, lines, self.size.width, self.size.height),
            View::Bars(bars) => render_bar_chart(&title, bars, self.size.width),
        };
        let updated = snapshot
            .and_then(Snapshot::latest_date)
            .map(|d| format!("Updated {}", fmt_date(d)))
            .unwrap_or_default();

        Reply {
            text: updated,
            chart: Some(rendered),
            keyboard: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyRecord, EntitySeries};
    use crate::error::AppError;
    use crate::stats::{AssemblerConfig, PopulationLookup};
    use chrono::NaiveDate;

    struct NoPopulation;

    impl PopulationLookup for NoPopulation {
        fn population(&self, _name: &str) -> u64 {
            0
        }
    }

    struct Fixed(Option<Snapshot>);

    impl SnapshotSource for Fixed {
        fn fetch_snapshot(&mut self) -> Result<Snapshot, AppError> {
            self.0.clone().ok_or_else(|| AppError::new(4, "offline"))
        }
    }

    fn snapshot() -> Snapshot {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let series = |name: &str, scale: u64| {
            let records = (0..5u64)
                .map(|i| DailyRecord {
                    date: start + chrono::Duration::days(i as i64),
                    confirmed: scale * (i + 1) * 10,
                    deaths: scale * i,
                    recovered: scale * i * 2,
                })
                .collect();
            EntitySeries::new(name, records)
        };
        Snapshot::from_entries(vec![series("Italy", 3), series("Spain", 2)]).unwrap()
    }

    fn session(snapshot: Option<Snapshot>) -> ChatSession<'static, Fixed> {
        static POP: NoPopulation = NoPopulation;
        ChatSession::new(
            Fixed(snapshot),
            SeriesAssembler::new(&POP, AssemblerConfig::default()),
            ChartSize::default(),
        )
    }

    #[test]
    fn unknown_text_gets_fallback() {
        let mut s = session(Some(snapshot()));
        assert_eq!(s.handle(1, "what's up"), Reply::text(NO_OPTION));
    }

    #[test]
    fn help_and_picker() {
        let mut s = session(None);
        let help = s.handle(1, "/start").text;
        assert!(help.starts_with(WELCOME));
        assert!(help.contains("\n/US_cases_total\n"));
        let picker = s.handle(1, "/country");
        assert!(matches!(picker.keyboard, Some(Keyboard::Inline(_))));
    }

    #[test]
    fn selecting_a_country_updates_the_menu() {
        let mut s = session(None);
        assert_eq!(s.handle(5, "/stats").keyboard, Some(menu_keyboard(Country::default_country())));

        let reply = s.handle(5, "ITALY");
        assert_eq!(reply.text, "Selected option: 🇮🇹 Italy");
        assert_eq!(s.prefs().get(5).key, "ITALY");

        let italy = Country::by_key("ITALY").unwrap();
        assert_eq!(s.handle(5, "/stats").keyboard, Some(menu_keyboard(italy)));
    }

    #[test]
    fn world_chart_reply() {
        let mut s = session(Some(snapshot()));
        let reply = s.handle(1, "🌏 Cases");
        assert_eq!(reply.text, "Updated 05 Mar 2020");
        let chart = reply.chart.unwrap();
        assert!(chart.starts_with("World: Confirmed – Total\n"));
        assert!(chart.contains("* Italy  + Spain"));
    }

    #[test]
    fn country_chart_reply_carries_summary() {
        let mut s = session(Some(snapshot()));
        let reply = s.handle(1, "/ITALY_cases_total");
        assert!(reply.text.starts_with("🇮🇹 Italy (05 Mar 2020)\nConfirmed: 150 (+30)"));
        assert!(reply.chart.unwrap().contains("+ Italy Recovered"));
    }

    #[test]
    fn missing_data_is_reported_not_fatal() {
        let mut s = session(None);
        assert_eq!(s.handle(1, "/cases_bar"), Reply::text("Data is not available right now."));

        let mut s = session(Some(snapshot()));
        assert_eq!(s.handle(1, "/RUSSIA_cases_total"), Reply::text("No data for 'Russia'."));
    }

    #[test]
    fn per_capita_without_population_is_empty_not_an_error() {
        let mut s = session(Some(snapshot()));
        let reply = s.handle(1, "/cases_per_1m");
        assert!(reply.chart.unwrap().ends_with("(no data)\n"));
    }
}
