//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every storylab operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Binds the caller**: one [`Identity`] per API value, passed to every command
//! - **Normalizes inputs**: turns user references (`"voyage"`, `"3f2a"`,
//!   a full UUID) into ids
//! - **Carries settings**: rank warning length, export directory
//! - **Dispatches** to the command function and returns its `CmdResult`
//!
//! Business logic stays in `commands/*.rs`; nothing here prints or exits.
//!
//! ## References
//!
//! Books are looked up among the caller's own books; child entities (parts,
//! chapters, themes, tags, boards, cards) inside the referenced book. A
//! reference matches by full id, id prefix, or name/title ignoring case, and
//! must match exactly one row.
//!
//! ## Generic Over DataStore
//!
//! `StoryLabApi<S: DataStore>` is generic over the storage backend:
//! - Production: `StoryLabApi<FileStore>`
//! - Testing: `StoryLabApi<InMemoryStore>`

use std::path::PathBuf;

use uuid::Uuid;

use crate::commands::books::BookUpdate;
use crate::commands::corkboard::{NewCard, Placement};
use crate::commands::helpers::{resolve_book, resolve_entity, Entity};
use crate::commands::{self, CmdResult};
use crate::config::{StoryLabConfig, DEFAULT_RANK_WARN_LENGTH};
use crate::error::Result;
use crate::identity::Identity;
use crate::model::NumberingMode;
use crate::store::DataStore;

/// Settings the commands need from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub rank_warn_length: usize,
    /// `None` keeps exports in memory only.
    pub export_dir: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            rank_warn_length: DEFAULT_RANK_WARN_LENGTH,
            export_dir: None,
        }
    }
}

impl From<&StoryLabConfig> for ApiSettings {
    fn from(config: &StoryLabConfig) -> Self {
        Self {
            rank_warn_length: config.rank_warn_length,
            export_dir: Some(config.export_dir()),
        }
    }
}

/// The main API facade for storylab operations.
pub struct StoryLabApi<S: DataStore> {
    store: S,
    identity: Identity,
    settings: ApiSettings,
}

impl<S: DataStore> StoryLabApi<S> {
    pub fn new(store: S, identity: Identity) -> Self {
        Self {
            store,
            identity,
            settings: ApiSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ApiSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    // --- Books ---

    pub fn create_book(
        &mut self,
        title: &str,
        description: Option<String>,
        numbering_mode: Option<NumberingMode>,
    ) -> Result<CmdResult> {
        commands::books::create(
            &mut self.store,
            &self.identity,
            title,
            description,
            numbering_mode,
        )
    }

    pub fn list_books(&self) -> Result<CmdResult> {
        commands::books::list(&self.store, &self.identity)
    }

    pub fn show_book(&self, book: &str) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::books::show(&self.store, &self.identity, &book_id)
    }

    pub fn update_book(&mut self, book: &str, update: BookUpdate) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::books::update(&mut self.store, &self.identity, &book_id, update)
    }

    pub fn delete_book(&mut self, book: &str) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::books::delete(&mut self.store, &self.identity, &book_id)
    }

    // --- Outline ---

    pub fn add_part(&mut self, book: &str, title: &str) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::outline::add_part(&mut self.store, &self.identity, &book_id, title)
    }

    pub fn add_chapter(&mut self, book: &str, title: &str, part: Option<&str>) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let part_id = self.optional_entity(&book_id, Entity::Part, part)?;
        commands::outline::add_chapter(&mut self.store, &self.identity, &book_id, title, part_id)
    }

    pub fn add_theme(&mut self, book: &str, name: &str, color: Option<String>) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::outline::add_theme(&mut self.store, &self.identity, &book_id, name, color)
    }

    pub fn add_tag(&mut self, book: &str, name: &str, color: Option<String>) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::outline::add_tag(&mut self.store, &self.identity, &book_id, name, color)
    }

    pub fn tag_chapter(&mut self, book: &str, tag: &str, chapter: &str) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let tag_id = self.entity(&book_id, Entity::Tag, tag)?;
        let chapter_id = self.entity(&book_id, Entity::Chapter, chapter)?;
        commands::outline::tag_chapter(
            &mut self.store,
            &self.identity,
            &book_id,
            &tag_id,
            &chapter_id,
        )
    }

    pub fn add_character(
        &mut self,
        book: &str,
        name: &str,
        role: Option<String>,
    ) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::outline::add_character(&mut self.store, &self.identity, &book_id, name, role)
    }

    pub fn set_grid_cell(
        &mut self,
        book: &str,
        chapter: &str,
        theme: &str,
        intensity: u8,
        note: Option<String>,
    ) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let chapter_id = self.entity(&book_id, Entity::Chapter, chapter)?;
        let theme_id = self.entity(&book_id, Entity::Theme, theme)?;
        commands::outline::set_grid_cell(
            &mut self.store,
            &self.identity,
            &book_id,
            &chapter_id,
            &theme_id,
            intensity,
            note,
        )
    }

    pub fn outline(&self, book: &str) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::outline::list_outline(&self.store, &self.identity, &book_id)
    }

    // --- Corkboard ---

    pub fn add_board(&mut self, book: &str, name: &str) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::corkboard::add_board(&mut self.store, &self.identity, &book_id, name)
    }

    pub fn add_card(
        &mut self,
        book: &str,
        title: &str,
        board: Option<&str>,
        chapter: Option<&str>,
        body: Option<String>,
    ) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let fields = NewCard {
            board_id: self.optional_entity(&book_id, Entity::Board, board)?,
            chapter_id: self.optional_entity(&book_id, Entity::Chapter, chapter)?,
            body,
            ..Default::default()
        };
        commands::corkboard::add_card(
            &mut self.store,
            &self.identity,
            &book_id,
            title,
            fields,
            self.settings.rank_warn_length,
        )
    }

    /// Moves `card` into the lane of `board` (`None`: the unfiled lane),
    /// after and/or before the given neighbour cards.
    pub fn move_card(
        &mut self,
        book: &str,
        card: &str,
        board: Option<&str>,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let card_id = self.entity(&book_id, Entity::Card, card)?;
        let placement = Placement {
            board_id: self.optional_entity(&book_id, Entity::Board, board)?,
            after: self.optional_entity(&book_id, Entity::Card, after)?,
            before: self.optional_entity(&book_id, Entity::Card, before)?,
        };
        commands::corkboard::move_card(
            &mut self.store,
            &self.identity,
            &book_id,
            &card_id,
            placement,
            self.settings.rank_warn_length,
        )
    }

    pub fn list_cards(&self, book: &str, board: Option<&str>) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let board_id = self.optional_entity(&book_id, Entity::Board, board)?;
        commands::corkboard::list_cards(&self.store, &self.identity, &book_id, board_id)
    }

    pub fn rebalance_board(&mut self, book: &str, board: Option<&str>) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let board_id = self.optional_entity(&book_id, Entity::Board, board)?;
        commands::corkboard::rebalance_board(&mut self.store, &self.identity, &book_id, board_id)
    }

    // --- Templates ---

    /// Exports a book. Written to the export directory unless `in_memory`.
    pub fn export_template(&self, book: &str, in_memory: bool) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        let out_dir = if in_memory {
            None
        } else {
            self.settings.export_dir.as_deref()
        };
        commands::template::export(&self.store, &self.identity, &book_id, out_dir)
    }

    pub fn import_template(&mut self, book: &str, text: &str) -> Result<CmdResult> {
        let book_id = self.book_id(book)?;
        commands::template::import(&mut self.store, &self.identity, &book_id, text)
    }

    pub fn create_from_template(&mut self, text: &str) -> Result<CmdResult> {
        commands::template::create_from_template(&mut self.store, &self.identity, text)
    }

    // --- Reference resolution ---

    fn book_id(&self, reference: &str) -> Result<Uuid> {
        resolve_book(&self.store, &self.identity, reference)
    }

    fn entity(&self, book_id: &Uuid, entity: Entity, reference: &str) -> Result<Uuid> {
        let snapshot = self.store.snapshot(book_id)?;
        self.identity.ensure_reader(&snapshot.book)?;
        resolve_entity(&snapshot.tables, entity, reference)
    }

    fn optional_entity(
        &self,
        book_id: &Uuid,
        entity: Entity,
        reference: Option<&str>,
    ) -> Result<Option<Uuid>> {
        reference
            .map(|r| self.entity(book_id, entity, r))
            .transpose()
    }
}
