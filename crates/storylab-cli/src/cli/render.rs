//! # Rendering
//!
//! Turns `CmdResult` pieces into terminal text. Width math stays here and is
//! Unicode aware; colors come from [`super::styles`].

use chrono::{DateTime, Utc};
use storylab::commands::helpers::short_id;
use storylab::commands::{CmdMessage, MessageLevel, OutlineSection};
use storylab::model::{Book, Card, TableCounts};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::styles::{ERROR, HEADING, ID, MUTED, SUCCESS, TITLE, WARNING};

pub const LINE_WIDTH: usize = 80;
const ELLIPSIS: &str = "…";

/// Cuts `text` to at most `width` columns, marking the cut with an ellipsis.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(ELLIPSIS.width());
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str(ELLIPSIS);
    out
}

fn pad_to_width(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let styled = match message.level {
            MessageLevel::Info => MUTED.apply_to(&message.content).to_string(),
            MessageLevel::Success => SUCCESS.apply_to(&message.content).to_string(),
            MessageLevel::Warning => WARNING.apply_to(&message.content).to_string(),
            MessageLevel::Error => ERROR.apply_to(&message.content).to_string(),
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}

/// One line per book: short id, title, last update.
pub fn render_book_list(books: &[Book]) -> String {
    const TIME_WIDTH: usize = 16;
    let title_width = LINE_WIDTH - 8 - TIME_WIDTH - 4;

    let mut out = String::new();
    for book in books {
        let title = pad_to_width(&truncate_to_width(&book.title, title_width), title_width);
        out.push_str(&format!(
            "{}  {}  {}\n",
            ID.apply_to(short_id(&book.id)),
            TITLE.apply_to(title),
            MUTED.apply_to(timestamp(&book.updated_at)),
        ));
    }
    out
}

pub fn render_book_detail(book: &Book, counts: Option<&TableCounts>) -> String {
    let mut out = format!(
        "{} {}\n",
        TITLE.apply_to(&book.title),
        MUTED.apply_to(format!("({})", book.id))
    );
    if let Some(description) = &book.description {
        out.push_str(description);
        out.push('\n');
    }
    out.push_str(&format!(
        "{}\n",
        MUTED.apply_to(format!(
            "owner {} · numbering {:?} · updated {}",
            book.owner,
            book.numbering_mode,
            timestamp(&book.updated_at)
        ))
    ));

    if let Some(c) = counts {
        let rows = [
            ("parts", c.parts),
            ("chapters", c.chapters),
            ("themes", c.themes),
            ("tags", c.tags),
            ("characters", c.characters),
            ("boards", c.boards),
            ("cards", c.cards),
            ("grid cells", c.grid_cells),
        ];
        out.push('\n');
        for (label, n) in rows {
            out.push_str(&format!("  {} {}\n", pad_to_width(label, 12), n));
        }
    }
    out
}

/// Parts as headings, chapters numbered through the whole book.
pub fn render_outline(sections: &[OutlineSection]) -> String {
    let mut out = String::new();
    let mut number = 0;
    for section in sections {
        let heading = match &section.part {
            Some(part) => part.title.clone(),
            None => "(no part)".to_string(),
        };
        out.push_str(&format!("{}\n", HEADING.apply_to(heading)));
        for chapter in &section.chapters {
            number += 1;
            let mut line = format!("  {:>3}. {}", number, chapter.title);
            if let Some(synopsis) = chapter.synopsis.as_deref().filter(|s| !s.is_empty()) {
                let room = LINE_WIDTH.saturating_sub(line.width() + 3);
                line.push_str(&format!(
                    " {}",
                    MUTED.apply_to(format!("- {}", truncate_to_width(synopsis, room)))
                ));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// Cards in lane order with their ranks.
pub fn render_cards(cards: &[Card]) -> String {
    let rank_width = cards.iter().map(|c| c.rank.len()).max().unwrap_or(0);
    let title_width = LINE_WIDTH.saturating_sub(8 + rank_width + 4);

    let mut out = String::new();
    for card in cards {
        out.push_str(&format!(
            "{}  {}  {}\n",
            ID.apply_to(short_id(&card.id)),
            MUTED.apply_to(pad_to_width(&card.rank, rank_width)),
            truncate_to_width(&card.title, title_width),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use storylab::model::{Chapter, Part, UserId};

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Voyage", 10), "Voyage");
        assert_eq!(truncate_to_width("The Long Voyage", 8), "The Lon…");
        assert_eq!(truncate_to_width("船の長い航海", 5), "船の…");
    }

    #[test]
    fn test_book_list_line() {
        console::set_colors_enabled(false);
        let book = Book::new(UserId::new("ana"), "Voyage");
        let out = render_book_list(&[book.clone()]);
        assert!(out.starts_with(&short_id(&book.id)));
        assert!(out.contains("Voyage"));
        assert!(out.trim_end().width() <= LINE_WIDTH);
    }

    #[test]
    fn test_outline_numbers_chapters_across_parts() {
        console::set_colors_enabled(false);
        let book = Book::new(UserId::new("ana"), "Voyage");
        let part = Part::new(book.id, "Departure", 0);
        let sections = vec![
            OutlineSection {
                part: Some(part.clone()),
                chapters: vec![Chapter::new(book.id, "Harbour", 0).in_part(part.id)],
            },
            OutlineSection {
                part: None,
                chapters: vec![Chapter::new(book.id, "Epilogue", 1)],
            },
        ];
        let out = render_outline(&sections);
        assert!(out.contains("Departure\n    1. Harbour\n"));
        assert!(out.contains("(no part)\n    2. Epilogue\n"));
    }

    #[test]
    fn test_messages_one_per_line() {
        console::set_colors_enabled(false);
        let out = render_messages(&[CmdMessage::success("Done"), CmdMessage::warning("Careful")]);
        assert_eq!(out, "Done\nCareful\n");
    }
}
