use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use storylab::model::NumberingMode;

/// "v0.3.0" for tagged builds, "v0.3.0\ndev: abc1234 2026-01-15 14:30" otherwise.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "storylab",
    bin_name = "storylab",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Outline novels: parts, chapters, theme grids, corkboards and templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Act as this user
    #[arg(long, global = true, help_heading = "Options")]
    pub user: Option<String>,

    /// Directory holding the book records
    #[arg(long, global = true, help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Act with the admin role (read any book, modify none you do not own)
    #[arg(long, global = true, help_heading = "Options")]
    pub admin: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, list, show, update and delete books
    #[command(subcommand, display_order = 1)]
    Book(BookCommands),

    /// Show parts and chapters in order
    #[command(display_order = 2)]
    Outline { book: String },

    /// Add a part
    #[command(display_order = 10)]
    Part { book: String, title: String },

    /// Add a chapter, optionally inside a part
    #[command(display_order = 11)]
    Chapter {
        book: String,
        title: String,
        #[arg(long)]
        part: Option<String>,
    },

    /// Add a theme row to the grid
    #[command(display_order = 12)]
    Theme {
        book: String,
        name: String,
        #[arg(long)]
        color: Option<String>,
    },

    /// Add a tag
    #[command(display_order = 13)]
    Tag {
        book: String,
        name: String,
        #[arg(long)]
        color: Option<String>,
    },

    /// Attach a tag to a chapter
    #[command(display_order = 14)]
    TagChapter {
        book: String,
        tag: String,
        chapter: String,
    },

    /// Add a character
    #[command(display_order = 15)]
    Character {
        book: String,
        name: String,
        #[arg(long)]
        role: Option<String>,
    },

    /// Set how strongly a theme is present in a chapter (0 clears the cell)
    #[command(display_order = 16)]
    Grid {
        book: String,
        chapter: String,
        theme: String,
        intensity: u8,
        #[arg(long)]
        note: Option<String>,
    },

    /// Manage corkboards
    #[command(subcommand, display_order = 20)]
    Board(BoardCommands),

    /// Add, move and list index cards
    #[command(subcommand, display_order = 21)]
    Card(CardCommands),

    /// Export a book as a template file
    #[command(display_order = 30)]
    Export {
        book: String,
        /// Print the JSON instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Replace a book's content with a template ("-" reads stdin)
    #[command(display_order = 31)]
    Import { book: String, file: PathBuf },

    /// Compute rank strings
    #[command(subcommand, display_order = 40)]
    Rank(RankCommands),

    /// Show or generate configuration
    #[command(subcommand, display_order = 41)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum BookCommands {
    /// Create a book
    #[command(alias = "n")]
    New {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// numeric, roman, words or none
        #[arg(long)]
        numbering: Option<NumberingMode>,
    },

    /// List your books
    #[command(alias = "ls")]
    List,

    /// Show a book and its content counts
    Show { book: String },

    /// Change title, description or numbering mode
    Update(BookUpdateArgs),

    /// Delete a book and everything in it
    #[command(alias = "rm")]
    Delete { book: String },

    /// Create a new book from a template file ("-" reads stdin)
    FromTemplate { file: PathBuf },
}

#[derive(Args, Debug)]
pub struct BookUpdateArgs {
    pub book: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,
    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
    #[arg(long)]
    pub numbering: Option<NumberingMode>,
}

#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Add a board
    Add { book: String, name: String },

    /// Respace the ranks of a board's cards (no --board: unfiled cards)
    Rebalance {
        book: String,
        #[arg(long)]
        board: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CardCommands {
    /// Add a card at the end of a board
    Add {
        book: String,
        title: String,
        #[arg(long)]
        board: Option<String>,
        #[arg(long)]
        chapter: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },

    /// Move a card to a board (no --board: unfiled), between neighbours
    #[command(alias = "mv")]
    Move {
        book: String,
        card: String,
        #[arg(long)]
        board: Option<String>,
        /// Place right after this card
        #[arg(long)]
        after: Option<String>,
        /// Place right before this card
        #[arg(long)]
        before: Option<String>,
    },

    /// List the cards of a board in order (no --board: unfiled cards)
    #[command(alias = "ls")]
    List {
        book: String,
        #[arg(long)]
        board: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RankCommands {
    /// Print a rank sorting strictly between two ranks
    Between {
        #[arg(long)]
        prev: Option<String>,
        #[arg(long)]
        next: Option<String>,
    },

    /// Print COUNT evenly spaced ranks
    Spread { count: usize },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print a commented sample config file
    Gen,

    /// Print the default config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_card_move() {
        let cli = Cli::try_parse_from([
            "storylab", "card", "move", "voyage", "Storm", "--board", "Plot", "--after", "Calm",
        ])
        .unwrap();
        match cli.command {
            Commands::Card(CardCommands::Move {
                card, board, after, before, ..
            }) => {
                assert_eq!(card, "Storm");
                assert_eq!(board.as_deref(), Some("Plot"));
                assert_eq!(after.as_deref(), Some("Calm"));
                assert!(before.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parses_numbering_mode() {
        let cli = Cli::try_parse_from(["storylab", "book", "new", "Voyage", "--numbering", "roman"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Book(BookCommands::New {
                numbering: Some(NumberingMode::Roman),
                ..
            })
        ));
        assert!(
            Cli::try_parse_from(["storylab", "book", "new", "V", "--numbering", "hex"]).is_err()
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["storylab", "book", "list", "--user", "ana", "-v"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("ana"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_description_flags_conflict() {
        assert!(Cli::try_parse_from([
            "storylab",
            "book",
            "update",
            "V",
            "--description",
            "x",
            "--clear-description",
        ])
        .is_err());
    }
}
