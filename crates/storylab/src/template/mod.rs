//! # Book Templates
//!
//! A template is a self-contained JSON snapshot of one book's content that can
//! be imported into any other book, in this store or another one.
//!
//! ## Positional References
//!
//! Rows inside a template never carry database ids. A reference to another
//! row is its position in the corresponding array:
//!
//! ```text
//! parts:     [ {title: "Act One"}, {title: "Act Two"} ]
//! chapters:  [ {title: "Opening", partIndex: 0}, {title: "Epilogue", partIndex: null} ]
//! gridCells: [ {chapterIndex: 0, themeIndex: 1, intensity: 2} ]
//! ```
//!
//! Because ids are regenerated on import, a template can be imported into a
//! different database without collisions, and importing it twice yields two
//! independent copies.
//!
//! ## Dangling References
//!
//! An index that is null, negative or past the end of its array does not
//! resolve. The policy differs by entity:
//!
//! - chapters and cards keep the row and leave the reference empty;
//! - grid cells are dropped, since a cell without both its chapter and its
//!   theme has no position in the grid.
//!
//! ## Import Is a Replace
//!
//! [`decode::import`] deletes every child row of the target book before
//! recreating the template's rows, inside one transaction. It is not a merge.
//! The book's description is overwritten when the template carries the key
//! (an explicit `null` clears it); the title and numbering mode are kept.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::NumberingMode;

pub mod decode;
pub mod encode;
pub mod validate;


pub use decode::{create_from_template, import, ImportSummary};
pub use encode::{encode, encode_snapshot};
pub use validate::{parse_document, validate};

/// Version written by [`encode`]. Documents without a version are read as 1.
pub const TEMPLATE_VERSION: u32 = 1;

fn default_version() -> u32 {
    TEMPLATE_VERSION
}

fn default_intensity() -> u8 {
    1
}

/// Distinguishes a missing key (`None`) from an explicit `null` (`Some(None)`).
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub book: BookTemplate,
    #[serde(default)]
    pub parts: Vec<PartTemplate>,
    #[serde(default)]
    pub chapters: Vec<ChapterTemplate>,
    #[serde(default)]
    pub themes: Vec<ThemeTemplate>,
    #[serde(default)]
    pub tags: Vec<TagTemplate>,
    #[serde(default)]
    pub characters: Vec<CharacterTemplate>,
    #[serde(default)]
    pub boards: Vec<BoardTemplate>,
    #[serde(default)]
    pub cards: Vec<CardTemplate>,
    #[serde(default)]
    pub grid_cells: Vec<GridCellTemplate>,
}

impl TemplateDocument {
    /// An empty template for a book with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            version: TEMPLATE_VERSION,
            book: BookTemplate {
                title: title.into(),
                description: None,
                numbering_mode: NumberingMode::default(),
            },
            parts: Vec::new(),
            chapters: Vec::new(),
            themes: Vec::new(),
            tags: Vec::new(),
            characters: Vec::new(),
            boards: Vec::new(),
            cards: Vec::new(),
            grid_cells: Vec::new(),
        }
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTemplate {
    pub title: String,
    /// `None`: key absent. `Some(None)`: explicit null.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub numbering_mode: NumberingMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartTemplate {
    pub title: String,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterTemplate {
    pub title: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub part_index: Option<i64>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTemplate {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub row_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagTemplate {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterTemplate {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTemplate {
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTemplate {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Missing or malformed ranks are replaced on import with a rank after the
    /// highest one already placed in the lane.
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub board_index: Option<i64>,
    #[serde(default)]
    pub chapter_index: Option<i64>,
    #[serde(default)]
    pub part_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCellTemplate {
    #[serde(default)]
    pub chapter_index: Option<i64>,
    #[serde(default)]
    pub theme_index: Option<i64>,
    #[serde(default = "default_intensity")]
    pub intensity: u8,
    #[serde(default)]
    pub note: Option<String>,
}
