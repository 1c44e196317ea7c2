//! # StoryLab CLI
//!
//! The binary is thin: this file calls [`cli::run`] and turns an error into
//! `Error: ...` on stderr and exit status 1. Everything user facing lives in
//! `src/cli/`:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/storylab-cli/src/cli/)                │
//! │  - clap argument parsing (setup.rs)                      │
//! │  - config, logging, store wiring + dispatch (commands.rs)│
//! │  - terminal rendering (render.rs, styles.rs)             │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  API Layer (crates/storylab/src/api.rs)                  │
//! │  - resolves book / chapter / card references to ids      │
//! │  - returns structured `CmdResult` values                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The library never prints. Its diagnostics are `tracing` events, which the
//! CLI sends to stderr through `tracing-subscriber` (filter from
//! `STORYLAB_LOG` or `RUST_LOG`, `-v` for debug).
//!
//! End-to-end tests in `tests/` drive the built binary with `assert_cmd`,
//! pointing it at a temporary data directory through `STORYLAB_DATA_DIR`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
