//! `covid-charts` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - the aggregation engine is testable without spawning processes
//! - the chat front-end and the terminal UI share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod bot;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod stats;
pub mod tui;
