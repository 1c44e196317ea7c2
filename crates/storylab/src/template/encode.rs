use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    BoardTemplate, BookTemplate, CardTemplate, ChapterTemplate, CharacterTemplate,
    GridCellTemplate, PartTemplate, TagTemplate, TemplateDocument, ThemeTemplate,
    TEMPLATE_VERSION,
};
use crate::error::Result;
use crate::store::{DataStore, Snapshot};

/// Maps a row id to its position in the document array being built.
type IndexMap = HashMap<Uuid, usize>;

/// Builds a template from the current state of a book.
///
/// Fails with `BookNotFound` if the book does not exist. The book is read in
/// one snapshot, so the document is internally consistent.
pub fn encode<S: DataStore>(store: &S, book_id: &Uuid) -> Result<TemplateDocument> {
    let snapshot = store.snapshot(book_id)?;
    Ok(encode_snapshot(&snapshot))
}

pub fn encode_snapshot(snapshot: &Snapshot) -> TemplateDocument {
    let book = &snapshot.book;
    let tables = &snapshot.tables;

    let mut part_index = IndexMap::new();
    let parts: Vec<PartTemplate> = tables
        .parts_ordered()
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            part_index.insert(p.id, i);
            PartTemplate {
                title: p.title.clone(),
                sort_order: p.sort_order,
            }
        })
        .collect();

    let mut chapter_index = IndexMap::new();
    let chapters: Vec<ChapterTemplate> = tables
        .chapters_ordered()
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            chapter_index.insert(c.id, i);
            ChapterTemplate {
                title: c.title.clone(),
                sort_order: c.sort_order,
                part_index: lookup(&part_index, c.part_id),
                synopsis: c.synopsis.clone(),
                content: c.content.clone(),
            }
        })
        .collect();

    let mut theme_index = IndexMap::new();
    let themes: Vec<ThemeTemplate> = tables
        .themes_ordered()
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            theme_index.insert(t.id, i);
            ThemeTemplate {
                name: t.name.clone(),
                color: t.color.clone(),
                row_order: t.row_order,
            }
        })
        .collect();

    let tags = tables
        .tags_ordered()
        .into_iter()
        .map(|t| TagTemplate {
            name: t.name.clone(),
            color: t.color.clone(),
        })
        .collect();

    let characters = tables
        .characters_ordered()
        .into_iter()
        .map(|c| CharacterTemplate {
            name: c.name.clone(),
            role: c.role.clone(),
            description: c.description.clone(),
        })
        .collect();

    let mut board_index = IndexMap::new();
    let boards: Vec<BoardTemplate> = tables
        .boards_ordered()
        .into_iter()
        .enumerate()
        .map(|(i, b)| {
            board_index.insert(b.id, i);
            BoardTemplate {
                name: b.name.clone(),
                sort_order: b.sort_order,
            }
        })
        .collect();

    let cards = tables
        .cards_ordered()
        .into_iter()
        .map(|c| CardTemplate {
            title: c.title.clone(),
            body: c.body.clone(),
            color: c.color.clone(),
            rank: Some(c.rank.clone()),
            board_index: lookup(&board_index, c.board_id),
            chapter_index: lookup(&chapter_index, c.chapter_id),
            part_index: lookup(&part_index, c.part_id),
        })
        .collect();

    let mut grid_cells = Vec::with_capacity(tables.grid_cells().len());
    for cell in tables.grid_cells() {
        let chapter = lookup(&chapter_index, Some(cell.chapter_id));
        let theme = lookup(&theme_index, Some(cell.theme_id));
        if chapter.is_none() || theme.is_none() {
            warn!(book_id = %book.id, cell_id = %cell.id, "skipping grid cell with dangling reference");
            continue;
        }
        grid_cells.push(GridCellTemplate {
            chapter_index: chapter,
            theme_index: theme,
            intensity: cell.intensity,
            note: cell.note.clone(),
        });
    }

    debug!(book_id = %book.id, "encoded book template");

    TemplateDocument {
        version: TEMPLATE_VERSION,
        book: BookTemplate {
            title: book.title.clone(),
            description: Some(book.description.clone()),
            numbering_mode: book.numbering_mode,
        },
        parts,
        chapters,
        themes,
        tags,
        characters,
        boards,
        cards,
        grid_cells,
    }
}

fn lookup(map: &IndexMap, id: Option<Uuid>) -> Option<i64> {
    id.and_then(|id| map.get(&id))
        .and_then(|&i| i64::try_from(i).ok())
}
