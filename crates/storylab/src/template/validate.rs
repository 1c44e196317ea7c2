//! Structural validation of untrusted template input.
//!
//! Runs before anything touches the store. Errors name the offending field
//! path (`book.title`, `cards`, `chapters[2]`) so a user can fix the file.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{GridCellTemplate, TemplateDocument, TEMPLATE_VERSION};
use crate::error::{Result, StoryError};
use crate::model::GridCell;

const ARRAY_FIELDS: [&str; 8] = [
    "parts",
    "chapters",
    "themes",
    "characters",
    "tags",
    "boards",
    "cards",
    "gridCells",
];

/// Parses template JSON text. Syntax errors are reported at path `$`.
pub fn parse_document(text: &str) -> Result<TemplateDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| StoryError::invalid_template("$", e.to_string()))?;
    validate(&value)
}

/// Checks the shape of a template value and converts it to a document.
pub fn validate(value: &Value) -> Result<TemplateDocument> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoryError::invalid_template("$", "expected an object"))?;

    let book = match obj.get("book") {
        Some(Value::Object(book)) => book,
        Some(_) => return Err(StoryError::invalid_template("book", "expected an object")),
        None => return Err(StoryError::invalid_template("book", "missing")),
    };
    match book.get("title") {
        Some(Value::String(_)) => {}
        Some(_) => {
            return Err(StoryError::invalid_template(
                "book.title",
                "expected a string",
            ))
        }
        None => return Err(StoryError::invalid_template("book.title", "missing")),
    }

    for field in ARRAY_FIELDS {
        match obj.get(field) {
            None | Some(Value::Null) | Some(Value::Array(_)) => {}
            Some(_) => return Err(StoryError::invalid_template(field, "expected an array")),
        }
    }

    let version = match obj.get("version") {
        None | Some(Value::Null) => TEMPLATE_VERSION,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| StoryError::invalid_template("version", "expected a positive integer"))?,
    };
    if version == 0 || version > TEMPLATE_VERSION {
        return Err(StoryError::invalid_template(
            "version",
            format!("unsupported template version {}", version),
        ));
    }

    let grid_cells: Vec<GridCellTemplate> = records(obj, "gridCells")?;
    for (i, cell) in grid_cells.iter().enumerate() {
        check_intensity(i, cell.intensity)?;
    }

    Ok(TemplateDocument {
        version,
        book: serde_json::from_value(Value::Object(book.clone()))
            .map_err(|e| StoryError::invalid_template("book", e.to_string()))?,
        parts: records(obj, "parts")?,
        chapters: records(obj, "chapters")?,
        themes: records(obj, "themes")?,
        tags: records(obj, "tags")?,
        characters: records(obj, "characters")?,
        boards: records(obj, "boards")?,
        cards: records(obj, "cards")?,
        grid_cells,
    })
}

/// Grid cell intensities run from 0 to [`GridCell::MAX_INTENSITY`].
pub(crate) fn check_intensity(index: usize, intensity: u8) -> Result<()> {
    if intensity > GridCell::MAX_INTENSITY {
        return Err(StoryError::invalid_template(
            format!("gridCells[{}].intensity", index),
            format!(
                "expected 0 to {}, got {}",
                GridCell::MAX_INTENSITY,
                intensity
            ),
        ));
    }
    Ok(())
}

fn records<T: DeserializeOwned>(obj: &Map<String, Value>, field: &str) -> Result<Vec<T>> {
    let Some(Value::Array(items)) = obj.get(field) else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item.clone()).map_err(|e| {
                StoryError::invalid_template(format!("{}[{}]", field, i), e.to_string())
            })
        })
        .collect()
}
