use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::validate::check_intensity;
use super::TemplateDocument;
use crate::error::Result;
use crate::identity::Identity;
use crate::model::{
    Board, Book, Card, Chapter, Character, GridCell, Part, TableCounts, Tag, Theme,
};
use crate::rank;
use crate::store::{DataStore, Transaction};

/// What an import changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows deleted from the target book before recreating.
    pub removed: TableCounts,
    /// Rows created from the template.
    pub created: TableCounts,
    /// Grid cells skipped because their chapter or theme did not resolve.
    pub dropped_grid_cells: usize,
}

/// Replaces the content of `book_id` with the template's content.
///
/// The caller must own the book. Everything happens in one transaction: on
/// any error the book is left exactly as it was.
pub fn import<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    doc: &TemplateDocument,
) -> Result<ImportSummary> {
    let summary = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        replace_content(tx, doc)
    })?;

    info!(
        book_id = %book_id,
        parts = summary.created.parts,
        chapters = summary.created.chapters,
        cards = summary.created.cards,
        grid_cells = summary.created.grid_cells,
        dropped_grid_cells = summary.dropped_grid_cells,
        "imported template"
    );
    Ok(summary)
}

/// Creates a new book owned by the caller and fills it from the template.
///
/// The new book takes the template's title, description and numbering mode.
/// If the import fails the new book is removed again.
pub fn create_from_template<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    doc: &TemplateDocument,
) -> Result<(Book, ImportSummary)> {
    let mut book = Book::new(identity.user_id.clone(), doc.book.title.clone());
    book.description = doc.book.description.clone().flatten();
    book.numbering_mode = doc.book.numbering_mode;
    store.create_book(&book)?;

    match import(store, identity, &book.id, doc) {
        Ok(summary) => {
            let book = store.get_book(&book.id)?;
            Ok((book, summary))
        }
        Err(e) => {
            if let Err(cleanup) = store.delete_book(&book.id) {
                warn!(book_id = %book.id, error = %cleanup, "failed to remove book after failed import");
            }
            Err(e)
        }
    }
}

fn replace_content(tx: &mut Transaction, doc: &TemplateDocument) -> Result<ImportSummary> {
    let mut summary = ImportSummary {
        removed: clear(tx)?,
        ..Default::default()
    };
    let book_id = tx.book().id;

    let part_ids: Vec<Uuid> = doc
        .parts
        .iter()
        .map(|p| tx.insert_part(Part::new(book_id, p.title.clone(), p.sort_order)))
        .collect();

    let mut chapter_ids = Vec::with_capacity(doc.chapters.len());
    for c in &doc.chapters {
        let mut chapter = Chapter::new(book_id, c.title.clone(), c.sort_order);
        chapter.part_id = resolve(&part_ids, c.part_index);
        chapter.synopsis = c.synopsis.clone();
        chapter.content = c.content.clone();
        chapter_ids.push(tx.insert_chapter(chapter)?);
    }

    let theme_ids: Vec<Uuid> = doc
        .themes
        .iter()
        .map(|t| {
            let mut theme = Theme::new(book_id, t.name.clone(), t.row_order);
            theme.color = t.color.clone();
            tx.insert_theme(theme)
        })
        .collect();

    let tags = doc
        .tags
        .iter()
        .map(|t| {
            let mut tag = Tag::new(book_id, t.name.clone());
            tag.color = t.color.clone();
            tag
        })
        .collect();
    summary.created.tags = tx.insert_tags(tags);

    let characters = doc
        .characters
        .iter()
        .map(|c| {
            let mut character = Character::new(book_id, c.name.clone());
            character.role = c.role.clone();
            character.description = c.description.clone();
            character
        })
        .collect();
    summary.created.characters = tx.insert_characters(characters);

    let board_ids: Vec<Uuid> = doc
        .boards
        .iter()
        .map(|b| tx.insert_board(Board::new(book_id, b.name.clone(), b.sort_order)))
        .collect();

    // Highest rank seen per lane, for cards that arrive without a usable one.
    let mut lane_tail: HashMap<Option<Uuid>, String> = HashMap::new();
    for (i, c) in doc.cards.iter().enumerate() {
        let board_id = resolve(&board_ids, c.board_index);
        let card_rank = match &c.rank {
            Some(r) if rank::is_well_formed(r) => r.clone(),
            other => {
                if let Some(bad) = other {
                    warn!(book_id = %book_id, index = i, rank = %bad, "replacing malformed card rank");
                }
                rank::rank_between(lane_tail.get(&board_id).map(String::as_str), None)
            }
        };
        let tail = lane_tail.entry(board_id).or_default();
        if card_rank > *tail {
            *tail = card_rank.clone();
        }

        let mut card = Card::new(book_id, c.title.clone(), card_rank);
        card.board_id = board_id;
        card.chapter_id = resolve(&chapter_ids, c.chapter_index);
        card.part_id = resolve(&part_ids, c.part_index);
        card.body = c.body.clone();
        card.color = c.color.clone();
        tx.insert_card(card)?;
        summary.created.cards += 1;
    }

    // One cell per chapter × theme position; a later entry replaces an earlier one.
    let mut cells: Vec<GridCell> = Vec::new();
    let mut positions: HashMap<(Uuid, Uuid), usize> = HashMap::new();
    for (i, g) in doc.grid_cells.iter().enumerate() {
        check_intensity(i, g.intensity)?;
        let chapter_id = resolve(&chapter_ids, g.chapter_index);
        let theme_id = resolve(&theme_ids, g.theme_index);
        let (Some(chapter_id), Some(theme_id)) = (chapter_id, theme_id) else {
            warn!(
                book_id = %book_id,
                index = i,
                chapter_index = ?g.chapter_index,
                theme_index = ?g.theme_index,
                "dropping grid cell with dangling reference"
            );
            summary.dropped_grid_cells += 1;
            continue;
        };
        let mut cell = GridCell::new(book_id, chapter_id, theme_id, g.intensity);
        cell.note = g.note.clone();
        match positions.get(&(chapter_id, theme_id)) {
            Some(&slot) => {
                debug!(book_id = %book_id, index = i, "grid cell replaces an earlier one at the same position");
                cells[slot] = cell;
            }
            None => {
                positions.insert((chapter_id, theme_id), cells.len());
                cells.push(cell);
            }
        }
    }
    for cell in cells {
        tx.insert_grid_cell(cell)?;
        summary.created.grid_cells += 1;
    }

    if let Some(description) = &doc.book.description {
        tx.book_mut().description = description.clone();
    }

    summary.created.parts = part_ids.len();
    summary.created.chapters = chapter_ids.len();
    summary.created.themes = theme_ids.len();
    summary.created.boards = board_ids.len();
    Ok(summary)
}

/// Deletes every child row of the transaction's book, dependents first.
fn clear(tx: &mut Transaction) -> Result<TableCounts> {
    Ok(TableCounts {
        grid_cells: tx.delete_grid_cells(),
        cards: tx.delete_cards(),
        boards: tx.delete_boards()?,
        tag_links: tx.delete_tag_links(),
        tags: tx.delete_tags()?,
        characters: tx.delete_characters(),
        chapters: tx.delete_chapters()?,
        parts: tx.delete_parts()?,
        themes: tx.delete_themes()?,
    })
}

/// Resolves a document index through an index map built during import.
fn resolve(ids: &[Uuid], index: Option<i64>) -> Option<Uuid> {
    let index = usize::try_from(index?).ok()?;
    ids.get(index).copied()
}
