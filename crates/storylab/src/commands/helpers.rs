use crate::error::{Result, StoryError};
use crate::identity::Identity;
use crate::model::{Book, BookTables};
use crate::store::DataStore;
use uuid::Uuid;

/// Child entities that can be referenced by name or id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Part,
    Chapter,
    Theme,
    Tag,
    Board,
    Card,
}

impl Entity {
    fn kind(self) -> &'static str {
        match self {
            Entity::Part => "part",
            Entity::Chapter => "chapter",
            Entity::Theme => "theme",
            Entity::Tag => "tag",
            Entity::Board => "board",
            Entity::Card => "card",
        }
    }
}

/// Loads a book the caller owns.
pub fn owned_book<S: DataStore>(store: &S, identity: &Identity, book_id: &Uuid) -> Result<Book> {
    let book = store.get_book(book_id)?;
    identity.ensure_owner(&book)?;
    Ok(book)
}

/// Turns a user supplied book reference into a book id.
///
/// A full UUID is taken as is. Anything else must match exactly one of the
/// caller's books, either as an id prefix or as the title (ignoring case).
pub fn resolve_book<S: DataStore>(store: &S, identity: &Identity, reference: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(reference) {
        return Ok(id);
    }
    let books = store.list_books(&identity.user_id)?;
    resolve_in(
        "book",
        books.iter().map(|b| (b.id, b.title.as_str())),
        reference,
    )
}

/// Resolves `reference` against `(id, name)` rows by full id, id prefix or
/// case-insensitive name. Exactly one row must match.
pub fn resolve_in<'a, I>(kind: &'static str, rows: I, reference: &str) -> Result<Uuid>
where
    I: IntoIterator<Item = (Uuid, &'a str)>,
{
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(StoryError::InvalidInput(format!("empty {} reference", kind)));
    }
    let exact = Uuid::parse_str(reference).ok();
    let prefix = reference.to_ascii_lowercase();

    let mut matches: Vec<Uuid> = Vec::new();
    for (id, name) in rows {
        let hit = exact == Some(id)
            || id.to_string().starts_with(&prefix)
            || name.eq_ignore_ascii_case(reference);
        if hit && !matches.contains(&id) {
            matches.push(id);
        }
    }

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(StoryError::InvalidInput(format!(
            "no {} matches '{}'",
            kind, reference
        ))),
        many => Err(StoryError::InvalidInput(format!(
            "'{}' matches {} {}s, use more of the id",
            reference,
            many.len(),
            kind
        ))),
    }
}

/// Resolves a child entity reference inside one book's tables.
pub fn resolve_entity(tables: &BookTables, entity: Entity, reference: &str) -> Result<Uuid> {
    let kind = entity.kind();
    match entity {
        Entity::Part => {
            let rows = tables.parts.iter().map(|p| (p.id, p.title.as_str()));
            resolve_in(kind, rows, reference)
        }
        Entity::Chapter => {
            let rows = tables.chapters.iter().map(|c| (c.id, c.title.as_str()));
            resolve_in(kind, rows, reference)
        }
        Entity::Theme => {
            let rows = tables.themes.iter().map(|t| (t.id, t.name.as_str()));
            resolve_in(kind, rows, reference)
        }
        Entity::Tag => {
            let rows = tables.tags.iter().map(|t| (t.id, t.name.as_str()));
            resolve_in(kind, rows, reference)
        }
        Entity::Board => {
            let rows = tables.boards.iter().map(|b| (b.id, b.name.as_str()));
            resolve_in(kind, rows, reference)
        }
        Entity::Card => {
            let rows = tables.cards.iter().map(|c| (c.id, c.title.as_str()));
            resolve_in(kind, rows, reference)
        }
    }
}

/// First eight characters of an id, as shown in listings.
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}
