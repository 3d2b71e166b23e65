//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads settings
//! - installs logging
//! - fetches (or reads) the snapshot
//! - assembles the requested view and prints it
//! - writes optional exports

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bot::{ChartSize, ChatSession, Keyboard, Reply};
use crate::cli::{ChartArgs, ChatArgs, Command, CountryArgs, RankArgs, WorldArgs};
use crate::config::Settings;
use crate::data::PopulationTable;
use crate::error::AppError;
use crate::stats::{Scope, SeriesAssembler, View, top_mortality_rates, top_n};

pub mod pipeline;

use pipeline::ChartOutput;

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `covid` (or `covid --offline`) to behave like `covid tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; log lines would corrupt the screen.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging();
    }

    let settings = Settings::from_env()?;

    match cli.command {
        Command::World(args) => handle_world(args, &settings),
        Command::Country(args) => handle_country(args, &settings),
        Command::Rank(args) => handle_rank(args, &settings),
        Command::Chat(args) => handle_chat(args, &settings),
        Command::Tui(args) => crate::tui::run(args, settings),
    }
}

/// Log to stderr so stdout stays clean for charts. `RUST_LOG` overrides the level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_world(args: WorldArgs, settings: &Settings) -> Result<(), AppError> {
    let snapshot = pipeline::open_source(&args.source, settings)?.fetch_snapshot()?;
    let population = PopulationTable::builtin()?;
    let config = pipeline::assembler_config(&args.source, settings, args.top);
    let assembler = SeriesAssembler::new(&population, config);

    let chart = crate::domain::ChartKind::new(args.chart.view, args.chart.metric);
    let title = format!("World: {}", chart.title());
    let out = pipeline::build_chart(&assembler, &snapshot, chart, Scope::World, title)?;
    print_chart(&out, &args.chart)
}

fn handle_country(args: CountryArgs, settings: &Settings) -> Result<(), AppError> {
    let snapshot = pipeline::open_source(&args.source, settings)?.fetch_snapshot()?;
    let population = PopulationTable::builtin()?;
    let config = pipeline::assembler_config(&args.source, settings, None);
    let assembler = SeriesAssembler::new(&population, config);

    let (entity, label) = pipeline::resolve_entity(&args.name, &snapshot);
    let chart = crate::domain::ChartKind::new(args.chart.view, args.chart.metric);
    let title = format!("{label}: {}", chart.title());
    let out = pipeline::build_chart(&assembler, &snapshot, chart, Scope::Entity(entity.clone()), title)?;
    print_chart(&out, &args.chart)?;

    if let Ok(summary) = assembler.summary(Some(&snapshot), &entity) {
        println!("{}", crate::report::format_summary(&label, &summary));
    }
    Ok(())
}

fn handle_rank(args: RankArgs, settings: &Settings) -> Result<(), AppError> {
    let snapshot = pipeline::open_source(&args.source, settings)?.fetch_snapshot()?;
    let n = args.top.unwrap_or(settings.top_n).max(1);

    if args.mortality {
        let rows = top_mortality_rates(&snapshot, n);
        println!("{}", crate::report::format_mortality(&rows));
        if let Some(path) = &args.export {
            let bars: Vec<_> = rows
                .iter()
                .map(|r| crate::domain::RankedEntity {
                    name: r.name.clone(),
                    // Basis points keep two decimals of the percentage in an integer column.
                    value: (r.rate * 10_000.0).round() as u64,
                })
                .collect();
            crate::io::write_bars_csv(path, &bars)?;
        }
        return Ok(());
    }

    let rows = top_n(&snapshot, args.metric, n);
    let title = format!("Top {n} by {}:", args.metric.title().to_lowercase());
    println!("{}", crate::report::format_rankings(&title, &rows));
    if let Some(path) = &args.export {
        crate::io::write_bars_csv(path, &rows)?;
    }
    Ok(())
}

fn handle_chat(args: ChatArgs, settings: &Settings) -> Result<(), AppError> {
    let source = pipeline::open_source(&args.source, settings)?;
    let population = PopulationTable::builtin()?;
    let config = pipeline::assembler_config(&args.source, settings, None);
    let size = ChartSize {
        width: args.width,
        height: args.height,
    };
    let mut session = ChatSession::new(source, SeriesAssembler::new(&population, config), size);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read stdin: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }
        info!(user = args.user, text = %line, "chat message");
        let reply = session.handle(args.user, &line);
        write!(stdout, "{}", format_reply(&reply))
            .and_then(|_| stdout.flush())
            .map_err(|e| AppError::new(2, format!("Failed to write reply: {e}")))?;
    }
    Ok(())
}

fn print_chart(out: &ChartOutput, args: &ChartArgs) -> Result<(), AppError> {
    let rendered = match &out.view {
        View::Lines(lines) => crate::plot::render_line_chart(&out.title, lines, args.width, args.height),
        View::Bars(bars) => crate::plot::render_bar_chart(&out.title, bars, args.width),
    };
    println!("{rendered}");
    if let Some(date) = out.updated {
        println!("Updated {}", crate::report::fmt_date(date));
    }

    if let Some(path) = &args.export {
        match &out.view {
            View::Lines(lines) => crate::io::write_series_csv(path, lines)?,
            View::Bars(bars) => crate::io::write_bars_csv(path, bars)?,
        }
    }
    Ok(())
}

/// Plain-text rendering of a chat reply for the terminal.
fn format_reply(reply: &Reply) -> String {
    let mut out = String::new();
    if !reply.text.is_empty() {
        out.push_str(&reply.text);
        if !reply.text.ends_with('\n') {
            out.push('\n');
        }
    }
    if let Some(chart) = &reply.chart {
        out.push_str(chart);
    }
    if let Some(keyboard) = &reply.keyboard {
        let kind = match keyboard {
            Keyboard::Reply(_) => "keyboard",
            Keyboard::Inline(_) => "buttons",
        };
        for row in keyboard.rows() {
            let labels: Vec<&str> = row.iter().map(|b| b.label.as_str()).collect();
            out.push_str(&format!("[{kind}] {}\n", labels.join(" | ")));
        }
    }
    out.push('\n');
    out
}

/// Rewrite argv so `covid` defaults to `covid tui`.
///
/// Rules:
/// - `covid`                      -> `covid tui`
/// - `covid --offline ...`        -> `covid tui --offline ...`
/// - `covid --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "world" | "country" | "rank" | "chat" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
