//! # CLI Layer
//!
//! The only place in the workspace that:
//! - knows about stdout and stderr
//! - installs the logging subscriber
//! - reads files named on the command line
//!
//! ## Responsibilities
//!
//! 1. **Logging**: `tracing-subscriber` with an `EnvFilter` from `STORYLAB_LOG`
//!    or `RUST_LOG`, default `storylab=warn`, `-v` for debug, on stderr
//! 2. **Context**: config file + env, then `--data-dir` / `--user` on top,
//!    then a [`FileStore`] wrapped in the API facade
//! 3. **Dispatch**: one API call per subcommand
//! 4. **Output**: rendered listings followed by the command messages

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use storylab::api::{ApiSettings, StoryLabApi};
use storylab::commands::books::BookUpdate;
use storylab::commands::CmdResult;
use storylab::config::{default_config_path, StoryLabConfig};
use storylab::identity::Identity;
use storylab::rank;
use storylab::store::fs::FileStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::render::{
    render_book_detail, render_book_list, render_cards, render_messages, render_outline,
};
use super::setup::{
    BoardCommands, BookCommands, BookUpdateArgs, CardCommands, Cli, Commands, ConfigCommands,
    RankCommands,
};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Rank(action) => handle_rank(&action),
        Commands::Config(action) => handle_config(&action, &config),
        command => {
            let mut api = build_api(cli.admin, &config)?;
            dispatch(&mut api, command)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("storylab=debug")
    } else {
        EnvFilter::try_from_env("STORYLAB_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("storylab=warn"))
    };
    // A second init (tests calling run twice) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<StoryLabConfig> {
    let mut config = StoryLabConfig::load()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(user) = &cli.user {
        config.user = Some(user.clone());
    }
    Ok(config)
}

fn build_api(admin: bool, config: &StoryLabConfig) -> Result<StoryLabApi<FileStore>> {
    let data_dir = config.data_dir()?;
    let user = config.user();
    let identity = if admin {
        Identity::admin(user)
    } else {
        Identity::author(user)
    };
    debug!(data_dir = %data_dir.display(), user = %identity.user_id, "opening store");

    let store = FileStore::new(data_dir);
    Ok(StoryLabApi::new(store, identity).with_settings(ApiSettings::from(config)))
}

fn dispatch(api: &mut StoryLabApi<FileStore>, command: Commands) -> Result<()> {
    match command {
        Commands::Book(action) => handle_book(api, action),
        Commands::Outline { book } => {
            let result = api.outline(&book)?;
            print!("{}", render_outline(&result.outline));
            print_messages(&result);
            Ok(())
        }
        Commands::Part { book, title } => print_result(api.add_part(&book, &title)?),
        Commands::Chapter { book, title, part } => {
            print_result(api.add_chapter(&book, &title, part.as_deref())?)
        }
        Commands::Theme { book, name, color } => print_result(api.add_theme(&book, &name, color)?),
        Commands::Tag { book, name, color } => print_result(api.add_tag(&book, &name, color)?),
        Commands::TagChapter { book, tag, chapter } => {
            print_result(api.tag_chapter(&book, &tag, &chapter)?)
        }
        Commands::Character { book, name, role } => {
            print_result(api.add_character(&book, &name, role)?)
        }
        Commands::Grid {
            book,
            chapter,
            theme,
            intensity,
            note,
        } => print_result(api.set_grid_cell(&book, &chapter, &theme, intensity, note)?),
        Commands::Board(action) => handle_board(api, action),
        Commands::Card(action) => handle_card(api, action),
        Commands::Export { book, stdout } => {
            let result = api.export_template(&book, stdout)?;
            if stdout {
                if let Some(export) = &result.export {
                    println!("{}", export.json);
                }
                return Ok(());
            }
            print_result(result)
        }
        Commands::Import { book, file } => {
            let text = read_input(&file)?;
            print_result(api.import_template(&book, &text)?)
        }
        Commands::Rank(action) => handle_rank(&action),
        Commands::Config(action) => bail!("unexpected config command {:?}", action),
    }
}

fn handle_book(api: &mut StoryLabApi<FileStore>, action: BookCommands) -> Result<()> {
    match action {
        BookCommands::New {
            title,
            description,
            numbering,
        } => print_result(api.create_book(&title, description, numbering)?),
        BookCommands::List => {
            let result = api.list_books()?;
            print!("{}", render_book_list(&result.books));
            print_messages(&result);
            Ok(())
        }
        BookCommands::Show { book } => {
            let result = api.show_book(&book)?;
            if let Some(book) = result.books.first() {
                print!("{}", render_book_detail(book, result.counts.as_ref()));
            }
            print_messages(&result);
            Ok(())
        }
        BookCommands::Update(args) => {
            let book = args.book.clone();
            print_result(api.update_book(&book, book_update(args))?)
        }
        BookCommands::Delete { book } => print_result(api.delete_book(&book)?),
        BookCommands::FromTemplate { file } => {
            let text = read_input(&file)?;
            print_result(api.create_from_template(&text)?)
        }
    }
}

fn book_update(args: BookUpdateArgs) -> BookUpdate {
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.map(Some)
    };
    BookUpdate {
        title: args.title,
        description,
        numbering_mode: args.numbering,
    }
}

fn handle_board(api: &mut StoryLabApi<FileStore>, action: BoardCommands) -> Result<()> {
    match action {
        BoardCommands::Add { book, name } => print_result(api.add_board(&book, &name)?),
        BoardCommands::Rebalance { book, board } => {
            let result = api.rebalance_board(&book, board.as_deref())?;
            print!("{}", render_cards(&result.cards));
            print_messages(&result);
            Ok(())
        }
    }
}

fn handle_card(api: &mut StoryLabApi<FileStore>, action: CardCommands) -> Result<()> {
    let result = match action {
        CardCommands::Add {
            book,
            title,
            board,
            chapter,
            body,
        } => api.add_card(&book, &title, board.as_deref(), chapter.as_deref(), body)?,
        CardCommands::Move {
            book,
            card,
            board,
            after,
            before,
        } => api.move_card(
            &book,
            &card,
            board.as_deref(),
            after.as_deref(),
            before.as_deref(),
        )?,
        CardCommands::List { book, board } => api.list_cards(&book, board.as_deref())?,
    };
    print!("{}", render_cards(&result.cards));
    print_messages(&result);
    Ok(())
}

fn handle_rank(action: &RankCommands) -> Result<()> {
    match action {
        RankCommands::Between { prev, next } => {
            for r in [prev, next].into_iter().flatten() {
                if !rank::is_well_formed(r) {
                    bail!("'{}' is not a well-formed rank", r);
                }
            }
            println!("{}", rank::rank_between(prev.as_deref(), next.as_deref()));
        }
        RankCommands::Spread { count } => {
            for r in rank::rebalance(*count) {
                println!("{}", r);
            }
        }
    }
    Ok(())
}

fn handle_config(action: &ConfigCommands, config: &StoryLabConfig) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let data_dir = config.data_dir()?;
            println!("data_dir = {}", data_dir.display());
            println!("user = {}", config.user());
            println!("rank_warn_length = {}", config.rank_warn_length);
            println!("export_dir = {}", config.export_dir().display());
        }
        ConfigCommands::Gen => print!("{}", StoryLabConfig::sample_toml()),
        ConfigCommands::Path => match default_config_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("could not determine a config directory"),
        },
    }
    Ok(())
}

/// Reads a template from `path`, or from stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read template from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read template {}", path.display()))
}

fn print_result(result: CmdResult) -> Result<()> {
    print_messages(&result);
    Ok(())
}

fn print_messages(result: &CmdResult) {
    print!("{}", render_messages(&result.messages));
}
