use std::fs;
use std::path::Path;

use tracing::info;
use uuid::Uuid;

use crate::commands::{CmdMessage, CmdResult, TemplateExport};
use crate::error::Result;
use crate::identity::Identity;
use crate::model::slugify;
use crate::store::DataStore;
use crate::template::{self, ImportSummary};

/// Encodes a book as a template.
///
/// With `out_dir` the document is written to `<out_dir>/<slug>-template.json`;
/// without it the JSON is only returned.
pub fn export<S: DataStore>(
    store: &S,
    identity: &Identity,
    book_id: &Uuid,
    out_dir: Option<&Path>,
) -> Result<CmdResult> {
    let snapshot = store.snapshot(book_id)?;
    identity.ensure_reader(&snapshot.book)?;

    let doc = template::encode_snapshot(&snapshot);
    let json = doc.to_json_pretty()?;
    let file_name = format!("{}-template.json", slugify(&snapshot.book.title));

    let mut result = CmdResult::default();
    let path = match out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(&file_name);
            fs::write(&path, &json)?;
            result.add_message(CmdMessage::success(format!(
                "Exported {} to {}",
                snapshot.book.title,
                path.display()
            )));
            Some(path)
        }
        None => None,
    };
    info!(
        book_id = %book_id,
        chapters = doc.chapters.len(),
        cards = doc.cards.len(),
        grid_cells = doc.grid_cells.len(),
        "exported template"
    );

    result.export = Some(TemplateExport {
        file_name,
        json,
        path,
    });
    Ok(result)
}

/// Replaces the content of an existing book with a template given as JSON
/// text.
pub fn import<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    text: &str,
) -> Result<CmdResult> {
    let doc = template::parse_document(text)?;
    let summary = template::import(store, identity, book_id, &doc)?;
    let book = store.get_book(book_id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Imported template into {}: {}",
        book.title,
        describe(&summary)
    )));
    add_drop_warning(&mut result, &summary);
    result.import = Some(summary);
    Ok(result.with_books(vec![book]))
}

/// Creates a new book from a template given as JSON text.
pub fn create_from_template<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    text: &str,
) -> Result<CmdResult> {
    let doc = template::parse_document(text)?;
    let (book, summary) = template::create_from_template(store, identity, &doc)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Created book {} ({}) from template: {}",
        book.title,
        book.id,
        describe(&summary)
    )));
    add_drop_warning(&mut result, &summary);
    result.import = Some(summary);
    Ok(result.with_books(vec![book]))
}

fn describe(summary: &ImportSummary) -> String {
    let c = &summary.created;
    format!(
        "{} parts, {} chapters, {} themes, {} cards, {} grid cells",
        c.parts, c.chapters, c.themes, c.cards, c.grid_cells
    )
}

fn add_drop_warning(result: &mut CmdResult, summary: &ImportSummary) {
    if summary.dropped_grid_cells > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {} grid cells that referenced a missing chapter or theme",
            summary.dropped_grid_cells
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::error::StoryError;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_export_without_dir_returns_json() {
        let mut fixture = StoreFixture::new();
        let (book, _) = fixture.with_sample_book("ana", "The Long Voyage");
        let res = export(&fixture.store, &Identity::admin("root"), &book.id, None).unwrap();

        let export = res.export.unwrap();
        assert_eq!(export.file_name, "the-long-voyage-template.json");
        assert!(export.path.is_none());
        assert_eq!(
            template::parse_document(&export.json).unwrap(),
            template::encode(&fixture.store, &book.id).unwrap()
        );
    }

    #[test]
    fn test_export_writes_file() {
        let mut fixture = StoreFixture::new();
        let (book, _) = fixture.with_sample_book("ana", "Voyage");
        let dir = tempfile::tempdir().unwrap();

        let res = export(
            &fixture.store,
            &Identity::author("ana"),
            &book.id,
            Some(dir.path()),
        )
        .unwrap();
        let path = dir.path().join("voyage-template.json");
        assert_eq!(res.export.unwrap().path, Some(path.clone()));
        assert!(fs::read_to_string(path).unwrap().contains("\"gridCells\""));
    }

    #[test]
    fn test_export_requires_read_access() {
        let mut fixture = StoreFixture::new();
        let (book, _) = fixture.with_sample_book("ana", "Voyage");
        let err = export(&fixture.store, &Identity::author("bob"), &book.id, None).unwrap_err();
        assert!(matches!(err, StoryError::Unauthorized { .. }));
    }

    #[test]
    fn test_import_reports_dropped_cells() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Target");
        let text = r#"{
            "book": { "title": "Source" },
            "chapters": [ { "title": "One" } ],
            "themes": [ { "name": "Loss" } ],
            "gridCells": [ { "chapterIndex": 0, "themeIndex": 3 } ]
        }"#;

        let res = import(&mut fixture.store, &Identity::author("ana"), &book.id, text).unwrap();
        assert_eq!(res.import.unwrap().dropped_grid_cells, 1);
        assert!(res.messages[0].content.starts_with("Imported template into Target"));
        assert_eq!(res.messages[1].level, MessageLevel::Warning);
    }

    #[test]
    fn test_import_rejects_invalid_text_before_touching_store() {
        let mut fixture = StoreFixture::new();
        let (book, _) = fixture.with_sample_book("ana", "Voyage");
        let before = fixture.store.snapshot(&book.id).unwrap().tables;

        let err = import(
            &mut fixture.store,
            &Identity::author("ana"),
            &book.id,
            r#"{ "book": { "title": "T" }, "cards": 3 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::InvalidTemplate { ref path, .. } if path == "cards"));
        assert_eq!(fixture.store.snapshot(&book.id).unwrap().tables, before);
    }

    #[test]
    fn test_create_from_template_text() {
        let mut fixture = StoreFixture::new();
        let text = r#"{ "book": { "title": "Fresh", "description": "New" },
                        "parts": [ { "title": "Only" } ] }"#;
        let res = create_from_template(&mut fixture.store, &Identity::author("cy"), text).unwrap();

        let book = &res.books[0];
        assert_eq!(book.title, "Fresh");
        assert_eq!(book.owner.as_str(), "cy");
        assert_eq!(res.import.unwrap().created.parts, 1);
        assert_eq!(fixture.store.list_books(&book.owner).unwrap().len(), 1);
    }
}
