//! # StoryLab Architecture
//!
//! StoryLab is a **UI-agnostic outlining library** for novelists. Users own
//! books; books hold parts, chapters, themes, tags, characters, corkboard
//! boards and cards, and a theme × chapter presence grid.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (storylab-cli crate)                             │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, binds the caller identity     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Ownership checks, CRUD logic, structured results         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait with snapshot reads and transactions     │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two pieces sit beside the layers and are used by the commands:
//!
//! - [`rank`]: fractional indexing. Produces strings that sort between two
//!   neighbours so a card can move without renumbering its siblings.
//! - [`template`]: exports a whole book as a portable document whose
//!   cross references are array positions, and imports it back as a full
//!   destructive replace inside one transaction.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust values and returns
//! `Result<CmdResult>`. It never writes to stdout/stderr and never exits the
//! process. Diagnostics go through `tracing`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Book`, `Chapter`, `Card`, ...)
//! - [`identity`]: The authenticated caller and its permission checks
//! - [`rank`]: LexoRank-style rank strings
//! - [`template`]: Book template encode/decode
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod rank;
pub mod store;
pub mod template;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
