use crate::error::{Result, StoryError};
use crate::model::{
    Board, Book, BookRecord, BookTables, Card, Chapter, Character, GridCell, Part, Tag, TagLink,
    Theme,
};
use uuid::Uuid;

/// A working copy of one book, handed to [`DataStore::transaction`](super::DataStore::transaction).
///
/// Nothing done here is visible to other readers until the closure returns
/// `Ok` and the store commits the copy.
#[derive(Debug)]
pub struct Transaction {
    book: Book,
    tables: BookTables,
    dirty: bool,
}

impl Transaction {
    pub(crate) fn begin(record: BookRecord) -> Self {
        Self {
            book: record.book,
            tables: record.tables,
            dirty: false,
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn into_record(self) -> BookRecord {
        BookRecord {
            book: self.book,
            tables: self.tables,
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut Book {
        self.dirty = true;
        &mut self.book
    }

    /// Read access to the working copy, see [`BookTables`] for ordered reads.
    pub fn tables(&self) -> &BookTables {
        &self.tables
    }

    pub fn card_mut(&mut self, id: &Uuid) -> Result<&mut Card> {
        self.dirty = true;
        self.tables
            .cards
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or(StoryError::EntityNotFound { kind: "Card", id: *id })
    }

    // --- Inserts ---

    pub fn insert_part(&mut self, mut part: Part) -> Uuid {
        part.book_id = self.book.id;
        let id = part.id;
        self.tables.parts.push(part);
        self.dirty = true;
        id
    }

    pub fn insert_chapter(&mut self, mut chapter: Chapter) -> Result<Uuid> {
        if let Some(part_id) = chapter.part_id {
            self.require("Part", part_id, self.tables.part(&part_id).is_some())?;
        }
        chapter.book_id = self.book.id;
        let id = chapter.id;
        self.tables.chapters.push(chapter);
        self.dirty = true;
        Ok(id)
    }

    pub fn insert_theme(&mut self, mut theme: Theme) -> Uuid {
        theme.book_id = self.book.id;
        let id = theme.id;
        self.tables.themes.push(theme);
        self.dirty = true;
        id
    }

    pub fn insert_tags(&mut self, tags: Vec<Tag>) -> usize {
        let count = tags.len();
        let book_id = self.book.id;
        self.tables.tags.extend(tags.into_iter().map(|mut t| {
            t.book_id = book_id;
            t
        }));
        self.dirty = true;
        count
    }

    pub fn insert_tag_link(&mut self, tag_id: Uuid, chapter_id: Uuid) -> Result<Uuid> {
        self.require("Tag", tag_id, self.tables.tag(&tag_id).is_some())?;
        self.require("Chapter", chapter_id, self.tables.chapter(&chapter_id).is_some())?;
        let link = TagLink {
            id: Uuid::new_v4(),
            book_id: self.book.id,
            tag_id,
            chapter_id,
        };
        let id = link.id;
        self.tables.tag_links.push(link);
        self.dirty = true;
        Ok(id)
    }

    pub fn insert_characters(&mut self, characters: Vec<Character>) -> usize {
        let count = characters.len();
        let book_id = self.book.id;
        self.tables
            .characters
            .extend(characters.into_iter().map(|mut c| {
                c.book_id = book_id;
                c
            }));
        self.dirty = true;
        count
    }

    pub fn insert_board(&mut self, mut board: Board) -> Uuid {
        board.book_id = self.book.id;
        let id = board.id;
        self.tables.boards.push(board);
        self.dirty = true;
        id
    }

    pub fn insert_card(&mut self, mut card: Card) -> Result<Uuid> {
        if let Some(board_id) = card.board_id {
            self.require("Board", board_id, self.tables.board(&board_id).is_some())?;
        }
        if let Some(chapter_id) = card.chapter_id {
            self.require("Chapter", chapter_id, self.tables.chapter(&chapter_id).is_some())?;
        }
        if let Some(part_id) = card.part_id {
            self.require("Part", part_id, self.tables.part(&part_id).is_some())?;
        }
        card.book_id = self.book.id;
        let id = card.id;
        self.tables.cards.push(card);
        self.dirty = true;
        Ok(id)
    }

    pub fn insert_grid_cell(&mut self, mut cell: GridCell) -> Result<Uuid> {
        self.require("Chapter", cell.chapter_id, self.tables.chapter(&cell.chapter_id).is_some())?;
        self.require("Theme", cell.theme_id, self.tables.theme(&cell.theme_id).is_some())?;
        cell.book_id = self.book.id;
        let id = cell.id;
        self.tables.grid_cells.push(cell);
        self.dirty = true;
        Ok(id)
    }

    pub fn grid_cell_mut(&mut self, chapter_id: &Uuid, theme_id: &Uuid) -> Option<&mut GridCell> {
        let cell = self
            .tables
            .grid_cells
            .iter_mut()
            .find(|g| g.chapter_id == *chapter_id && g.theme_id == *theme_id)?;
        self.dirty = true;
        Some(cell)
    }

    /// Removes the grid cell at a chapter × theme position, if any.
    pub fn remove_grid_cell(&mut self, chapter_id: &Uuid, theme_id: &Uuid) -> bool {
        let before = self.tables.grid_cells.len();
        self.tables
            .grid_cells
            .retain(|g| !(g.chapter_id == *chapter_id && g.theme_id == *theme_id));
        let removed = self.tables.grid_cells.len() != before;
        self.dirty |= removed;
        removed
    }

    // --- Bulk deletes (whole book, per entity type) ---

    pub fn delete_grid_cells(&mut self) -> usize {
        self.dirty = true;
        std::mem::take(&mut self.tables.grid_cells).len()
    }

    pub fn delete_cards(&mut self) -> usize {
        self.dirty = true;
        std::mem::take(&mut self.tables.cards).len()
    }

    pub fn delete_boards(&mut self) -> Result<usize> {
        if self.tables.cards.iter().any(|c| c.board_id.is_some()) {
            return Err(still_referenced("boards", "cards"));
        }
        self.dirty = true;
        Ok(std::mem::take(&mut self.tables.boards).len())
    }

    pub fn delete_tag_links(&mut self) -> usize {
        self.dirty = true;
        std::mem::take(&mut self.tables.tag_links).len()
    }

    pub fn delete_tags(&mut self) -> Result<usize> {
        if !self.tables.tag_links.is_empty() {
            return Err(still_referenced("tags", "tag links"));
        }
        self.dirty = true;
        Ok(std::mem::take(&mut self.tables.tags).len())
    }

    pub fn delete_characters(&mut self) -> usize {
        self.dirty = true;
        std::mem::take(&mut self.tables.characters).len()
    }

    pub fn delete_chapters(&mut self) -> Result<usize> {
        if !self.tables.grid_cells.is_empty() {
            return Err(still_referenced("chapters", "grid cells"));
        }
        if !self.tables.tag_links.is_empty() {
            return Err(still_referenced("chapters", "tag links"));
        }
        if self.tables.cards.iter().any(|c| c.chapter_id.is_some()) {
            return Err(still_referenced("chapters", "cards"));
        }
        self.dirty = true;
        Ok(std::mem::take(&mut self.tables.chapters).len())
    }

    pub fn delete_parts(&mut self) -> Result<usize> {
        if self.tables.chapters.iter().any(|c| c.part_id.is_some()) {
            return Err(still_referenced("parts", "chapters"));
        }
        if self.tables.cards.iter().any(|c| c.part_id.is_some()) {
            return Err(still_referenced("parts", "cards"));
        }
        self.dirty = true;
        Ok(std::mem::take(&mut self.tables.parts).len())
    }

    pub fn delete_themes(&mut self) -> Result<usize> {
        if !self.tables.grid_cells.is_empty() {
            return Err(still_referenced("themes", "grid cells"));
        }
        self.dirty = true;
        Ok(std::mem::take(&mut self.tables.themes).len())
    }

    fn require(&self, kind: &'static str, id: Uuid, exists: bool) -> Result<()> {
        if exists {
            Ok(())
        } else {
            Err(StoryError::EntityNotFound { kind, id })
        }
    }
}

fn still_referenced(table: &str, by: &str) -> StoryError {
    StoryError::Store(format!("cannot delete {}: still referenced by {}", table, by))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;

    fn tx() -> Transaction {
        Transaction::begin(BookRecord {
            book: Book::new(UserId::new("ana"), "Working Copy"),
            tables: BookTables::default(),
        })
    }

    #[test]
    fn test_inserts_stamp_book_id() {
        let mut tx = tx();
        let stray = Uuid::new_v4();
        tx.insert_part(Part::new(stray, "One", 0));
        assert_eq!(tx.tables().parts[0].book_id, tx.book().id);
        assert!(tx.is_dirty());
    }

    #[test]
    fn test_insert_rejects_missing_parent() {
        let mut tx = tx();
        let book_id = tx.book().id;
        let chapter = Chapter::new(book_id, "Orphan", 0).in_part(Uuid::new_v4());
        let err = tx.insert_chapter(chapter).unwrap_err();
        assert!(matches!(err, StoryError::EntityNotFound { kind: "Part", .. }));
        assert!(tx.tables().chapters.is_empty());
    }

    #[test]
    fn test_delete_order_is_enforced() {
        let mut tx = tx();
        let book_id = tx.book().id;
        let part = tx.insert_part(Part::new(book_id, "One", 0));
        let chapter = tx
            .insert_chapter(Chapter::new(book_id, "Ch", 0).in_part(part))
            .unwrap();
        let theme = tx.insert_theme(Theme::new(book_id, "Loss", 0));
        tx.insert_grid_cell(GridCell::new(book_id, chapter, theme, 2))
            .unwrap();

        assert!(tx.delete_parts().is_err());
        assert!(tx.delete_themes().is_err());
        assert!(tx.delete_chapters().is_err());

        assert_eq!(tx.delete_grid_cells(), 1);
        assert_eq!(tx.delete_chapters().unwrap(), 1);
        assert_eq!(tx.delete_parts().unwrap(), 1);
        assert_eq!(tx.delete_themes().unwrap(), 1);
        assert_eq!(tx.tables().counts().total(), 0);
    }

    #[test]
    fn test_remove_grid_cell() {
        let mut tx = tx();
        let book_id = tx.book().id;
        let chapter = tx.insert_chapter(Chapter::new(book_id, "Ch", 0)).unwrap();
        let theme = tx.insert_theme(Theme::new(book_id, "Loss", 0));
        tx.insert_grid_cell(GridCell::new(book_id, chapter, theme, 1))
            .unwrap();

        assert!(tx.remove_grid_cell(&chapter, &theme));
        assert!(!tx.remove_grid_cell(&chapter, &theme));
    }
}
