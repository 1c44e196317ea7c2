//! Outline commands: the structure of a book and the theme grid.
//!
//! New parts, chapters and themes are appended after the existing ones of
//! their kind. Chapters are ordered book-wide, not per part.

use tracing::debug;
use uuid::Uuid;

use super::helpers::short_id;
use crate::commands::{CmdMessage, CmdResult, OutlineSection};
use crate::error::{Result, StoryError};
use crate::identity::Identity;
use crate::model::{Chapter, Character, GridCell, Part, Tag, Theme};
use crate::store::DataStore;

pub fn add_part<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    title: &str,
) -> Result<CmdResult> {
    let title = required("part title", title)?;
    let id = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let sort_order = next_order(tx.tables().parts.iter().map(|p| p.sort_order));
        Ok(tx.insert_part(Part::new(*book_id, title.clone(), sort_order)))
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added part {} ({})", title, id)));
    Ok(result)
}

pub fn add_chapter<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    title: &str,
    part_id: Option<Uuid>,
) -> Result<CmdResult> {
    let title = required("chapter title", title)?;
    let id = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let sort_order = next_order(tx.tables().chapters.iter().map(|c| c.sort_order));
        let mut chapter = Chapter::new(*book_id, title.clone(), sort_order);
        chapter.part_id = part_id;
        tx.insert_chapter(chapter)
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added chapter {} ({})",
        title, id
    )));
    Ok(result)
}

pub fn add_theme<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    name: &str,
    color: Option<String>,
) -> Result<CmdResult> {
    let name = required("theme name", name)?;
    let id = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let row_order = next_order(tx.tables().themes.iter().map(|t| t.row_order));
        let mut theme = Theme::new(*book_id, name.clone(), row_order);
        theme.color = color;
        Ok(tx.insert_theme(theme))
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added theme {} ({})", name, id)));
    Ok(result)
}

pub fn add_tag<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    name: &str,
    color: Option<String>,
) -> Result<CmdResult> {
    let name = required("tag name", name)?;
    let mut result = CmdResult::default();
    let created = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        if let Some(existing) = tx
            .tables()
            .tags
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(&name))
        {
            return Ok(Err(existing.id));
        }
        let mut tag = Tag::new(*book_id, name.clone());
        tag.color = color;
        let id = tag.id;
        tx.insert_tags(vec![tag]);
        Ok(Ok(id))
    })?;

    match created {
        Ok(id) => result.add_message(CmdMessage::success(format!("Added tag {} ({})", name, id))),
        Err(id) => result.add_message(CmdMessage::info(format!(
            "Tag {} already exists ({})",
            name, id
        ))),
    }
    Ok(result)
}

pub fn tag_chapter<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    tag_id: &Uuid,
    chapter_id: &Uuid,
) -> Result<CmdResult> {
    let linked = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let exists = tx
            .tables()
            .tag_links()
            .iter()
            .any(|l| l.tag_id == *tag_id && l.chapter_id == *chapter_id);
        if exists {
            return Ok(false);
        }
        tx.insert_tag_link(*tag_id, *chapter_id)?;
        Ok(true)
    })?;

    let mut result = CmdResult::default();
    if linked {
        result.add_message(CmdMessage::success("Tagged chapter"));
    } else {
        result.add_message(CmdMessage::info("Chapter already has that tag"));
    }
    Ok(result)
}

pub fn add_character<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    name: &str,
    role: Option<String>,
) -> Result<CmdResult> {
    let name = required("character name", name)?;
    store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let mut character = Character::new(*book_id, name.clone());
        character.role = role;
        Ok(tx.insert_characters(vec![character]))
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added character {}", name)));
    Ok(result)
}

/// Sets the presence of a theme in a chapter.
///
/// Intensity 0 removes the cell; 1 to 3 creates or updates it.
pub fn set_grid_cell<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    chapter_id: &Uuid,
    theme_id: &Uuid,
    intensity: u8,
    note: Option<String>,
) -> Result<CmdResult> {
    if intensity > GridCell::MAX_INTENSITY {
        return Err(StoryError::InvalidInput(format!(
            "intensity must be between 0 and {}, got {}",
            GridCell::MAX_INTENSITY,
            intensity
        )));
    }

    let message = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        if intensity == 0 {
            return Ok(if tx.remove_grid_cell(chapter_id, theme_id) {
                CmdMessage::success("Removed grid cell")
            } else {
                CmdMessage::info("No grid cell to remove")
            });
        }
        if let Some(cell) = tx.grid_cell_mut(chapter_id, theme_id) {
            cell.intensity = intensity;
            if note.is_some() {
                cell.note = note;
            }
            return Ok(CmdMessage::success(format!(
                "Updated grid cell to intensity {}",
                intensity
            )));
        }
        let mut cell = GridCell::new(*book_id, *chapter_id, *theme_id, intensity);
        cell.note = note;
        tx.insert_grid_cell(cell)?;
        Ok(CmdMessage::success(format!(
            "Set grid cell to intensity {}",
            intensity
        )))
    })?;

    debug!(book_id = %book_id, chapter_id = %chapter_id, theme_id = %theme_id, intensity, "grid cell");
    let mut result = CmdResult::default();
    result.add_message(message);
    Ok(result)
}

/// Parts in order, each with its chapters. Chapters outside any part (or in
/// a part that no longer exists) come last in a section without a part.
pub fn list_outline<S: DataStore>(
    store: &S,
    identity: &Identity,
    book_id: &Uuid,
) -> Result<CmdResult> {
    let snapshot = store.snapshot(book_id)?;
    identity.ensure_reader(&snapshot.book)?;
    let tables = &snapshot.tables;
    let chapters = tables.chapters_ordered();

    let mut outline: Vec<OutlineSection> = tables
        .parts_ordered()
        .into_iter()
        .map(|part| OutlineSection {
            part: Some(part.clone()),
            chapters: chapters
                .iter()
                .filter(|c| c.part_id == Some(part.id))
                .map(|c| (*c).clone())
                .collect(),
        })
        .collect();

    let loose: Vec<Chapter> = chapters
        .iter()
        .filter(|c| c.part_id.and_then(|id| tables.part(&id)).is_none())
        .map(|c| (*c).clone())
        .collect();
    if !loose.is_empty() {
        outline.push(OutlineSection {
            part: None,
            chapters: loose,
        });
    }

    let mut result = CmdResult {
        outline,
        ..Default::default()
    };
    if result.outline.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Book {} has no chapters yet.",
            short_id(book_id)
        )));
    }
    Ok(result)
}

fn next_order(existing: impl Iterator<Item = i64>) -> i64 {
    existing.max().map_or(0, |max| max + 1)
}

fn required(what: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoryError::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    fn ana() -> Identity {
        Identity::author("ana")
    }

    #[test]
    fn test_add_part_and_chapters_append() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        add_part(&mut fixture.store, &ana(), &book.id, "Act One").unwrap();
        let part_id = fixture.store.snapshot(&book.id).unwrap().tables.parts[0].id;

        add_chapter(&mut fixture.store, &ana(), &book.id, "First", Some(part_id)).unwrap();
        add_chapter(&mut fixture.store, &ana(), &book.id, "Second", None).unwrap();

        let snap = fixture.store.snapshot(&book.id).unwrap();
        let chapters = snap.tables.chapters_ordered();
        assert_eq!(chapters[0].title, "First");
        assert_eq!(chapters[0].part_id, Some(part_id));
        assert_eq!(chapters[1].sort_order, 1);
    }

    #[test]
    fn test_add_chapter_to_missing_part() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        let err = add_chapter(
            &mut fixture.store,
            &ana(),
            &book.id,
            "Lost",
            Some(Uuid::new_v4()),
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::EntityNotFound { kind: "Part", .. }));
        assert!(fixture.store.snapshot(&book.id).unwrap().tables.chapters.is_empty());
    }

    #[test]
    fn test_outline_changes_require_owner() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        let bob = Identity::author("bob");

        assert!(matches!(
            add_part(&mut fixture.store, &bob, &book.id, "Sneaky"),
            Err(StoryError::Unauthorized { .. })
        ));
        assert!(matches!(
            add_theme(&mut fixture.store, &bob, &book.id, "Envy", None),
            Err(StoryError::Unauthorized { .. })
        ));
        assert_eq!(
            fixture.store.snapshot(&book.id).unwrap().tables.counts().total(),
            0
        );
    }

    #[test]
    fn test_add_tag_is_unique_by_name() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        add_tag(&mut fixture.store, &ana(), &book.id, "draft", None).unwrap();
        let res = add_tag(&mut fixture.store, &ana(), &book.id, "Draft", None).unwrap();
        assert_eq!(res.messages[0].level, crate::commands::MessageLevel::Info);
        assert_eq!(fixture.store.snapshot(&book.id).unwrap().tables.tags.len(), 1);
    }

    #[test]
    fn test_tag_chapter_once() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let tag_id = fixture.store.snapshot(&book.id).unwrap().tables.tags[0].id;

        tag_chapter(&mut fixture.store, &ana(), &book.id, &tag_id, &ids.chapters[1]).unwrap();
        tag_chapter(&mut fixture.store, &ana(), &book.id, &tag_id, &ids.chapters[1]).unwrap();

        let snap = fixture.store.snapshot(&book.id).unwrap();
        assert_eq!(snap.tables.tag_links().len(), 1);
        assert_eq!(snap.tables.tag_links()[0].chapter_id, ids.chapters[1]);
    }

    #[test]
    fn test_add_character() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        add_character(
            &mut fixture.store,
            &ana(),
            &book.id,
            "Mara",
            Some("antagonist".to_string()),
        )
        .unwrap();
        let snap = fixture.store.snapshot(&book.id).unwrap();
        assert_eq!(snap.tables.characters[0].role.as_deref(), Some("antagonist"));
    }

    #[test]
    fn test_set_grid_cell_upserts_and_removes() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let (chapter, theme) = (ids.chapters[0], ids.themes[1]);

        set_grid_cell(
            &mut fixture.store,
            &ana(),
            &book.id,
            &chapter,
            &theme,
            3,
            Some("peak".to_string()),
        )
        .unwrap();
        let snap = fixture.store.snapshot(&book.id).unwrap();
        let cell = snap.tables.grid_cell_at(&chapter, &theme).unwrap();
        assert_eq!(cell.intensity, 3);
        assert_eq!(cell.note.as_deref(), Some("peak"));
        assert_eq!(snap.tables.grid_cells().len(), 6);

        set_grid_cell(&mut fixture.store, &ana(), &book.id, &chapter, &theme, 0, None).unwrap();
        let snap = fixture.store.snapshot(&book.id).unwrap();
        assert!(snap.tables.grid_cell_at(&chapter, &theme).is_none());
        assert_eq!(snap.tables.grid_cells().len(), 5);
    }

    #[test]
    fn test_set_grid_cell_rejects_bad_intensity() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let err = set_grid_cell(
            &mut fixture.store,
            &ana(),
            &book.id,
            &ids.chapters[0],
            &ids.themes[0],
            4,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::InvalidInput(_)));
    }

    #[test]
    fn test_set_grid_cell_needs_existing_theme() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let err = set_grid_cell(
            &mut fixture.store,
            &ana(),
            &book.id,
            &ids.chapters[0],
            &Uuid::new_v4(),
            2,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::EntityNotFound { kind: "Theme", .. }));
    }

    #[test]
    fn test_list_outline_groups_chapters() {
        let mut fixture = StoreFixture::new();
        let (book, _) = fixture.with_sample_book("ana", "Voyage");
        let res = list_outline(&fixture.store, &Identity::admin("root"), &book.id).unwrap();

        assert_eq!(res.outline.len(), 3);
        assert_eq!(res.outline[0].part.as_ref().unwrap().title, "Act One");
        assert_eq!(res.outline[0].chapters[0].title, "Opening");
        assert_eq!(res.outline[1].chapters[0].title, "Storm");
        assert!(res.outline[2].part.is_none());
        assert_eq!(res.outline[2].chapters[0].title, "Epilogue");
    }

    #[test]
    fn test_list_outline_empty_book() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        let res = list_outline(&fixture.store, &ana(), &book.id).unwrap();
        assert!(res.outline.is_empty());
        assert!(res.messages[0].content.contains("no chapters yet"));
    }
}
