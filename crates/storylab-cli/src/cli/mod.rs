//! # CLI Behavior
//!
//! This is one client for storylab, not the application itself. It is the
//! only place that knows about terminal I/O and exit codes.
//!
//! ## References
//!
//! Every command that targets a book takes a book reference: a full id, an
//! id prefix, or the title (ignoring case). Chapters, themes, tags, boards and
//! cards are referenced the same way inside that book.
//!
//! ## Identity
//!
//! The acting user comes from `--user`, `STORYLAB_USER`, the config file or
//! `$USER`. `--admin` acts with the admin role, which may read and export any
//! book (by full id) but never modify one it does not own.
//!
//! ## Module Structure
//!
//! - `setup`: argument parsing via clap
//! - `commands`: context wiring and dispatch to the API
//! - `render`: output formatting
//! - `styles`: terminal styles

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
