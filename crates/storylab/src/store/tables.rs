//! Ordered range reads and point lookups over a book's rows.
//!
//! Every ordered read uses a stable sort, so rows with equal keys keep the
//! order in which they were inserted.

use crate::model::{
    Board, BookTables, Card, Chapter, Character, GridCell, Part, Tag, TagLink, Theme,
};
use uuid::Uuid;

impl BookTables {
    /// Parts by `sort_order`.
    pub fn parts_ordered(&self) -> Vec<&Part> {
        let mut rows: Vec<&Part> = self.parts.iter().collect();
        rows.sort_by_key(|p| p.sort_order);
        rows
    }

    /// Chapters by `sort_order`.
    pub fn chapters_ordered(&self) -> Vec<&Chapter> {
        let mut rows: Vec<&Chapter> = self.chapters.iter().collect();
        rows.sort_by_key(|c| c.sort_order);
        rows
    }

    /// Themes by `row_order`, then name.
    pub fn themes_ordered(&self) -> Vec<&Theme> {
        let mut rows: Vec<&Theme> = self.themes.iter().collect();
        rows.sort_by(|a, b| a.row_order.cmp(&b.row_order).then_with(|| a.name.cmp(&b.name)));
        rows
    }

    pub fn tags_ordered(&self) -> Vec<&Tag> {
        let mut rows: Vec<&Tag> = self.tags.iter().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn characters_ordered(&self) -> Vec<&Character> {
        let mut rows: Vec<&Character> = self.characters.iter().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn boards_ordered(&self) -> Vec<&Board> {
        let mut rows: Vec<&Board> = self.boards.iter().collect();
        rows.sort_by_key(|b| b.sort_order);
        rows
    }

    /// All cards by rank, across lanes.
    pub fn cards_ordered(&self) -> Vec<&Card> {
        let mut rows: Vec<&Card> = self.cards.iter().collect();
        rows.sort_by(|a, b| a.rank.cmp(&b.rank));
        rows
    }

    /// The cards of one lane by rank. `None` is the lane of unfiled cards.
    pub fn lane(&self, board_id: Option<Uuid>) -> Vec<&Card> {
        let mut rows: Vec<&Card> = self
            .cards
            .iter()
            .filter(|c| c.board_id == board_id)
            .collect();
        rows.sort_by(|a, b| a.rank.cmp(&b.rank));
        rows
    }

    /// Grid cells in storage order.
    pub fn grid_cells(&self) -> &[GridCell] {
        &self.grid_cells
    }

    pub fn tag_links(&self) -> &[TagLink] {
        &self.tag_links
    }

    pub fn part(&self, id: &Uuid) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == *id)
    }

    pub fn chapter(&self, id: &Uuid) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == *id)
    }

    pub fn theme(&self, id: &Uuid) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == *id)
    }

    pub fn tag(&self, id: &Uuid) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == *id)
    }

    pub fn board(&self, id: &Uuid) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == *id)
    }

    pub fn card(&self, id: &Uuid) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == *id)
    }

    pub fn grid_cell_at(&self, chapter_id: &Uuid, theme_id: &Uuid) -> Option<&GridCell> {
        self.grid_cells
            .iter()
            .find(|g| g.chapter_id == *chapter_id && g.theme_id == *theme_id)
    }
}
