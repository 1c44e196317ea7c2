use super::mem_backend::MemBackend;
use super::story_store::StoryStore;

pub type InMemoryStore = StoryStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        StoryStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{
        Board, Book, Card, Chapter, Character, GridCell, Part, Tag, Theme, UserId,
    };
    use crate::rank;
    use crate::store::DataStore;
    use uuid::Uuid;

    /// Ids of the rows created by [`StoreFixture::with_sample_book`], in
    /// creation order.
    #[derive(Debug, Clone, Default)]
    pub struct SampleIds {
        pub parts: Vec<Uuid>,
        pub chapters: Vec<Uuid>,
        pub themes: Vec<Uuid>,
        pub boards: Vec<Uuid>,
        pub cards: Vec<Uuid>,
    }

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_empty_book(&mut self, owner: &str, title: &str) -> Book {
            let book = Book::new(UserId::new(owner), title);
            self.store.create_book(&book).unwrap();
            book
        }

        /// A book with 2 parts, 3 chapters (the last one outside any part),
        /// 2 themes, a full chapter × theme grid, 2 tags, 2 characters and
        /// a board holding 3 cards.
        pub fn with_sample_book(&mut self, owner: &str, title: &str) -> (Book, SampleIds) {
            let book = self.with_empty_book(owner, title);
            let id = book.id;
            let ids = self
                .store
                .transaction(&id, |tx| {
                    let mut ids = SampleIds::default();
                    ids.parts.push(tx.insert_part(Part::new(id, "Act One", 0)));
                    ids.parts.push(tx.insert_part(Part::new(id, "Act Two", 1)));

                    let mut opening = Chapter::new(id, "Opening", 0).in_part(ids.parts[0]);
                    opening.synopsis = Some("The ship leaves port".to_string());
                    ids.chapters.push(tx.insert_chapter(opening)?);
                    ids.chapters.push(
                        tx.insert_chapter(Chapter::new(id, "Storm", 1).in_part(ids.parts[1]))?,
                    );
                    ids.chapters
                        .push(tx.insert_chapter(Chapter::new(id, "Epilogue", 2))?);

                    ids.themes.push(tx.insert_theme(Theme::new(id, "Loss", 0)));
                    ids.themes.push(tx.insert_theme(Theme::new(id, "Home", 1)));

                    for (c, chapter) in ids.chapters.iter().enumerate() {
                        for theme in &ids.themes {
                            let intensity = (c % 3) as u8 + 1;
                            tx.insert_grid_cell(GridCell::new(id, *chapter, *theme, intensity))?;
                        }
                    }

                    tx.insert_tags(vec![Tag::new(id, "draft"), Tag::new(id, "action")]);
                    let mut captain = Character::new(id, "Captain Vey");
                    captain.role = Some("protagonist".to_string());
                    tx.insert_characters(vec![captain, Character::new(id, "Ada")]);

                    ids.boards.push(tx.insert_board(Board::new(id, "Plot", 0)));

                    let ranks = rank::rebalance(3);
                    for (n, r) in ranks.iter().enumerate() {
                        let mut card = Card::new(id, format!("Beat {}", n + 1), r.clone())
                            .on_board(ids.boards[0]);
                        card.chapter_id = ids.chapters.get(n).copied();
                        if n == 0 {
                            card.part_id = Some(ids.parts[0]);
                        }
                        ids.cards.push(tx.insert_card(card)?);
                    }
                    Ok(ids)
                })
                .unwrap();
            (book, ids)
        }
    }
}
