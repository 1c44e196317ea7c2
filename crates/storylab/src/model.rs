//! # Domain Model
//!
//! A [`Book`] is owned by exactly one user and is the unit of storage: every
//! other entity carries the `book_id` of the book it belongs to and lives in
//! that book's [`BookTables`].
//!
//! ```text
//! Book
//! ├── parts        Part { sort_order }
//! ├── chapters     Chapter { part_id?, sort_order }
//! ├── themes       Theme { row_order }
//! ├── tags         Tag
//! ├── tag_links    TagLink { tag_id, chapter_id }
//! ├── characters   Character
//! ├── boards       Board { sort_order }
//! ├── cards        Card { board_id?, chapter_id?, part_id?, rank }
//! └── grid_cells   GridCell { chapter_id, theme_id, intensity }
//! ```
//!
//! References between child entities are plain ids. The store does not
//! enforce them, so readers must tolerate ids that no longer resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How chapter headings are numbered when the manuscript is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingMode {
    #[default]
    Numeric,
    Roman,
    Words,
    None,
}

impl std::str::FromStr for NumberingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "numeric" => Ok(Self::Numeric),
            "roman" => Ok(Self::Roman),
            "words" => Ok(Self::Words),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown numbering mode '{}' (expected numeric, roman, words or none)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub owner: UserId,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub numbering_mode: NumberingMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn new(owner: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            title: title.into(),
            description: None,
            numbering_mode: NumberingMode::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub sort_order: i64,
}

impl Part {
    pub fn new(book_id: Uuid, title: impl Into<String>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            title: title.into(),
            sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub book_id: Uuid,
    pub part_id: Option<Uuid>,
    pub title: String,
    pub synopsis: Option<String>,
    pub content: Option<String>,
    pub sort_order: i64,
}

impl Chapter {
    pub fn new(book_id: Uuid, title: impl Into<String>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            part_id: None,
            title: title.into(),
            synopsis: None,
            content: None,
            sort_order,
        }
    }

    pub fn in_part(mut self, part_id: Uuid) -> Self {
        self.part_id = Some(part_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub row_order: i64,
}

impl Theme {
    pub fn new(book_id: Uuid, name: impl Into<String>, row_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            name: name.into(),
            color: None,
            row_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl Tag {
    pub fn new(book_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            name: name.into(),
            color: None,
        }
    }
}

/// Assignment of a tag to a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLink {
    pub id: Uuid,
    pub book_id: Uuid,
    pub tag_id: Uuid,
    pub chapter_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
}

impl Character {
    pub fn new(book_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            name: name.into(),
            role: None,
            description: None,
        }
    }
}

/// A corkboard. Its cards form one lane ordered by rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub book_id: Uuid,
    pub name: String,
    pub sort_order: i64,
}

impl Board {
    pub fn new(book_id: Uuid, name: impl Into<String>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            name: name.into(),
            sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub book_id: Uuid,
    pub board_id: Option<Uuid>,
    pub chapter_id: Option<Uuid>,
    pub part_id: Option<Uuid>,
    pub title: String,
    pub body: Option<String>,
    pub color: Option<String>,
    /// Fractional sort key within the board lane, see [`crate::rank`].
    pub rank: String,
}

impl Card {
    pub fn new(book_id: Uuid, title: impl Into<String>, rank: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            board_id: None,
            chapter_id: None,
            part_id: None,
            title: title.into(),
            body: None,
            color: None,
            rank: rank.into(),
        }
    }

    pub fn on_board(mut self, board_id: Uuid) -> Self {
        self.board_id = Some(board_id);
        self
    }
}

/// Presence of a theme in a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: Uuid,
    pub book_id: Uuid,
    pub chapter_id: Uuid,
    pub theme_id: Uuid,
    /// 1 (touched on) to 3 (dominant).
    pub intensity: u8,
    pub note: Option<String>,
}

impl GridCell {
    pub const MAX_INTENSITY: u8 = 3;

    pub fn new(book_id: Uuid, chapter_id: Uuid, theme_id: Uuid, intensity: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            chapter_id,
            theme_id,
            intensity,
            note: None,
        }
    }
}

/// All child rows of one book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTables {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub themes: Vec<Theme>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub tag_links: Vec<TagLink>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub grid_cells: Vec<GridCell>,
}

/// Row counts per entity type, used for summaries and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub parts: usize,
    pub chapters: usize,
    pub themes: usize,
    pub tags: usize,
    pub tag_links: usize,
    pub characters: usize,
    pub boards: usize,
    pub cards: usize,
    pub grid_cells: usize,
}

impl TableCounts {
    pub fn total(&self) -> usize {
        self.parts
            + self.chapters
            + self.themes
            + self.tags
            + self.tag_links
            + self.characters
            + self.boards
            + self.cards
            + self.grid_cells
    }
}

impl BookTables {
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            parts: self.parts.len(),
            chapters: self.chapters.len(),
            themes: self.themes.len(),
            tags: self.tags.len(),
            tag_links: self.tag_links.len(),
            characters: self.characters.len(),
            boards: self.boards.len(),
            cards: self.cards.len(),
            grid_cells: self.grid_cells.len(),
        }
    }
}

/// What the storage backends persist for one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub book: Book,
    #[serde(default)]
    pub tables: BookTables,
}

/// Turns a title into a lowercase, dash separated file name fragment.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "book".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Long Night"), "the-long-night");
        assert_eq!(slugify("  Odd -- Spacing!! "), "odd-spacing");
        assert_eq!(slugify("Ünïcode Tale"), "ünïcode-tale");
        assert_eq!(slugify("***"), "book");
    }

    #[test]
    fn test_numbering_mode_parse() {
        assert_eq!("Roman".parse::<NumberingMode>(), Ok(NumberingMode::Roman));
        assert!("arabic".parse::<NumberingMode>().is_err());
    }

    #[test]
    fn test_numbering_mode_serializes_lowercase() {
        let json = serde_json::to_string(&NumberingMode::Words).unwrap();
        assert_eq!(json, "\"words\"");
    }

    #[test]
    fn test_book_record_tolerates_missing_tables() {
        let book = Book::new(UserId::new("ana"), "Draft");
        let json = serde_json::json!({ "book": book });
        let record: BookRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.tables.counts().total(), 0);
    }

    #[test]
    fn test_counts_total() {
        let book_id = Uuid::new_v4();
        let tables = BookTables {
            parts: vec![Part::new(book_id, "One", 0)],
            chapters: vec![
                Chapter::new(book_id, "A", 0),
                Chapter::new(book_id, "B", 1),
            ],
            ..Default::default()
        };
        let counts = tables.counts();
        assert_eq!(counts.parts, 1);
        assert_eq!(counts.chapters, 2);
        assert_eq!(counts.total(), 3);
    }
}
