//! Chat front-end: command parsing, keyboards and the session that answers.
//!
//! Transport (webhooks, photo upload) lives outside this crate; `covid chat`
//! drives a session from stdin instead.

pub mod command;
pub mod keyboard;
pub mod session;

pub use command::*;
pub use keyboard::*;
pub use session::*;
