//! Terminal styles for the storylab CLI.
//!
//! Code asks for styles by meaning (`TITLE`, `MUTED`, ...), never by color.
//! `console` drops the escape codes when stdout is not a terminal, so tests
//! and pipes see plain text.

use console::Style;
use once_cell::sync::Lazy;

pub static TITLE: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static MUTED: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static ID: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static HEADING: Lazy<Style> = Lazy::new(|| Style::new().cyan().bold());
pub static SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().green());
pub static WARNING: Lazy<Style> = Lazy::new(|| Style::new().yellow().bold());
pub static ERROR: Lazy<Style> = Lazy::new(|| Style::new().red().bold());
