//! Corkboard commands.
//!
//! Every board is one lane of cards ordered by rank; cards without a board
//! form their own lane. Adding or moving a card computes a single new rank
//! from its neighbours and never touches the other cards. When ranks grow
//! past the configured length the result carries a warning suggesting
//! [`rebalance_board`].

use tracing::{debug, info};
use uuid::Uuid;

use super::helpers::short_id;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, StoryError};
use crate::identity::Identity;
use crate::model::{Board, Card};
use crate::rank;
use crate::store::{DataStore, Transaction};

/// Where a card goes: a lane, and optionally the cards it sits between.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placement {
    pub board_id: Option<Uuid>,
    /// The card that should end up right before the moved one.
    pub after: Option<Uuid>,
    /// The card that should end up right after the moved one.
    pub before: Option<Uuid>,
}

/// Optional fields of a new card.
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub board_id: Option<Uuid>,
    pub chapter_id: Option<Uuid>,
    pub part_id: Option<Uuid>,
    pub body: Option<String>,
    pub color: Option<String>,
}

pub fn add_board<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    name: &str,
) -> Result<CmdResult> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(StoryError::InvalidInput("board name cannot be empty".to_string()));
    }
    let id = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let sort_order = tx
            .tables()
            .boards
            .iter()
            .map(|b| b.sort_order)
            .max()
            .map_or(0, |max| max + 1);
        Ok(tx.insert_board(Board::new(*book_id, name.clone(), sort_order)))
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added board {} ({})", name, id)));
    Ok(result)
}

/// Appends a card at the end of its lane.
pub fn add_card<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    title: &str,
    fields: NewCard,
    rank_warn_length: usize,
) -> Result<CmdResult> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(StoryError::InvalidInput("card title cannot be empty".to_string()));
    }
    let card = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let last = tx
            .tables()
            .lane(fields.board_id)
            .last()
            .map(|c| c.rank.clone());
        let mut card = Card::new(*book_id, title, rank::rank_between(last.as_deref(), None));
        card.board_id = fields.board_id;
        card.chapter_id = fields.chapter_id;
        card.part_id = fields.part_id;
        card.body = fields.body;
        card.color = fields.color;
        tx.insert_card(card.clone())?;
        Ok(card)
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Added card {} ({})",
        card.title, card.id
    )));
    warn_if_long(&mut result, &card, rank_warn_length);
    Ok(result.with_cards(vec![card]))
}

/// Moves a card into a lane, between optional neighbours.
///
/// With only `after`, the card lands right after it; with only `before`, right
/// before it; with neither, at the end of the lane. Neighbours must already be
/// in the target lane.
pub fn move_card<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    card_id: &Uuid,
    placement: Placement,
    rank_warn_length: usize,
) -> Result<CmdResult> {
    let card = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let new_rank = rank_for(tx, card_id, placement)?;
        let card = tx.card_mut(card_id)?;
        card.board_id = placement.board_id;
        card.rank = new_rank;
        Ok(card.clone())
    })?;
    debug!(book_id = %book_id, card_id = %card_id, rank = %card.rank, "moved card");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Moved card {}", card.title)));
    warn_if_long(&mut result, &card, rank_warn_length);
    Ok(result.with_cards(vec![card]))
}

/// Cards of one lane in rank order.
pub fn list_cards<S: DataStore>(
    store: &S,
    identity: &Identity,
    book_id: &Uuid,
    board_id: Option<Uuid>,
) -> Result<CmdResult> {
    let snapshot = store.snapshot(book_id)?;
    identity.ensure_reader(&snapshot.book)?;
    if let Some(id) = board_id {
        if snapshot.tables.board(&id).is_none() {
            return Err(StoryError::EntityNotFound { kind: "Board", id });
        }
    }

    let cards: Vec<Card> = snapshot
        .tables
        .lane(board_id)
        .into_iter()
        .cloned()
        .collect();
    let mut result = CmdResult::default();
    if cards.is_empty() {
        result.add_message(CmdMessage::info("No cards in this lane."));
    }
    Ok(result.with_cards(cards))
}

/// Gives every card of a lane a fresh, evenly spaced rank, keeping the order.
pub fn rebalance_board<S: DataStore>(
    store: &mut S,
    identity: &Identity,
    book_id: &Uuid,
    board_id: Option<Uuid>,
) -> Result<CmdResult> {
    let cards = store.transaction(book_id, |tx| {
        identity.ensure_owner(tx.book())?;
        let ids: Vec<Uuid> = tx.tables().lane(board_id).iter().map(|c| c.id).collect();
        let ranks = rank::rebalance(ids.len());
        let mut cards = Vec::with_capacity(ids.len());
        for (id, new_rank) in ids.iter().zip(ranks) {
            let card = tx.card_mut(id)?;
            card.rank = new_rank;
            cards.push(card.clone());
        }
        Ok(cards)
    })?;
    info!(book_id = %book_id, cards = cards.len(), "rebalanced lane");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Rebalanced {} cards",
        cards.len()
    )));
    Ok(result.with_cards(cards))
}

/// Computes the moved card's new rank from its neighbours in the target lane.
fn rank_for(tx: &Transaction, card_id: &Uuid, placement: Placement) -> Result<String> {
    let tables = tx.tables();
    if tables.card(card_id).is_none() {
        return Err(StoryError::EntityNotFound {
            kind: "Card",
            id: *card_id,
        });
    }
    if let Some(id) = placement.board_id {
        if tables.board(&id).is_none() {
            return Err(StoryError::EntityNotFound { kind: "Board", id });
        }
    }

    let lane: Vec<&Card> = tables
        .lane(placement.board_id)
        .into_iter()
        .filter(|c| c.id != *card_id)
        .collect();
    let position = |id: Uuid| -> Result<usize> {
        lane.iter().position(|c| c.id == id).ok_or_else(|| {
            StoryError::InvalidInput(format!(
                "card {} is not a neighbour in the target lane",
                short_id(&id)
            ))
        })
    };

    let (prev, next) = match (placement.after, placement.before) {
        (None, None) => (lane.last().copied(), None),
        (Some(after), None) => {
            let i = position(after)?;
            (Some(lane[i]), lane.get(i + 1).copied())
        }
        (None, Some(before)) => {
            let i = position(before)?;
            (i.checked_sub(1).map(|p| lane[p]), Some(lane[i]))
        }
        (Some(after), Some(before)) => (Some(lane[position(after)?]), Some(lane[position(before)?])),
    };

    Ok(rank::rank_between(
        prev.map(|c| c.rank.as_str()),
        next.map(|c| c.rank.as_str()),
    ))
}

fn warn_if_long(result: &mut CmdResult, card: &Card, limit: usize) {
    if card.rank.len() > limit {
        result.add_message(CmdMessage::warning(format!(
            "Card ranks in this lane are getting long ({} characters); consider rebalancing the board",
            card.rank.len()
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::StoreFixture;

    const WARN: usize = 12;

    fn ana() -> Identity {
        Identity::author("ana")
    }

    fn titles(res: &CmdResult) -> Vec<&str> {
        res.cards.iter().map(|c| c.title.as_str()).collect()
    }

    fn lane_titles(fixture: &StoreFixture, book_id: &Uuid, board: Option<Uuid>) -> Vec<String> {
        list_cards(&fixture.store, &ana(), book_id, board)
            .unwrap()
            .cards
            .into_iter()
            .map(|c| c.title)
            .collect()
    }

    #[test]
    fn test_add_card_appends_to_lane() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let board = Some(ids.boards[0]);

        let res = add_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            "Beat 4",
            NewCard {
                board_id: board,
                ..Default::default()
            },
            WARN,
        )
        .unwrap();
        assert_eq!(titles(&res), ["Beat 4"]);
        assert_eq!(
            lane_titles(&fixture, &book.id, board),
            ["Beat 1", "Beat 2", "Beat 3", "Beat 4"]
        );
    }

    #[test]
    fn test_first_card_in_empty_lane_gets_initial_rank() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        let res = add_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            "Loose",
            NewCard::default(),
            WARN,
        )
        .unwrap();
        assert_eq!(res.cards[0].rank, rank::initial_rank());
        assert_eq!(res.cards[0].board_id, None);
    }

    #[test]
    fn test_add_card_to_missing_board() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        let err = add_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            "Nowhere",
            NewCard {
                board_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
            WARN,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::EntityNotFound { kind: "Board", .. }));
    }

    #[test]
    fn test_move_card_between_neighbours() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let board = Some(ids.boards[0]);

        // Beat 3 to the front, before Beat 1.
        move_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            &ids.cards[2],
            Placement {
                board_id: board,
                after: None,
                before: Some(ids.cards[0]),
            },
            WARN,
        )
        .unwrap();
        assert_eq!(
            lane_titles(&fixture, &book.id, board),
            ["Beat 3", "Beat 1", "Beat 2"]
        );

        // Beat 1 right after Beat 2, i.e. to the end.
        move_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            &ids.cards[0],
            Placement {
                board_id: board,
                after: Some(ids.cards[1]),
                before: None,
            },
            WARN,
        )
        .unwrap();
        assert_eq!(
            lane_titles(&fixture, &book.id, board),
            ["Beat 3", "Beat 2", "Beat 1"]
        );
    }

    #[test]
    fn test_move_after_keeps_following_cards_after() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let board = Some(ids.boards[0]);

        move_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            &ids.cards[2],
            Placement {
                board_id: board,
                after: Some(ids.cards[0]),
                before: None,
            },
            WARN,
        )
        .unwrap();
        assert_eq!(
            lane_titles(&fixture, &book.id, board),
            ["Beat 1", "Beat 3", "Beat 2"]
        );
    }

    #[test]
    fn test_move_card_to_other_lane() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let board = Some(ids.boards[0]);

        move_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            &ids.cards[1],
            Placement::default(),
            WARN,
        )
        .unwrap();
        assert_eq!(lane_titles(&fixture, &book.id, board), ["Beat 1", "Beat 3"]);
        assert_eq!(lane_titles(&fixture, &book.id, None), ["Beat 2"]);
    }

    #[test]
    fn test_move_rejects_neighbour_from_other_lane() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let before = fixture.store.snapshot(&book.id).unwrap().tables;

        let err = move_card(
            &mut fixture.store,
            &ana(),
            &book.id,
            &ids.cards[0],
            Placement {
                board_id: None,
                after: Some(ids.cards[1]),
                before: None,
            },
            WARN,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::InvalidInput(_)));
        assert_eq!(fixture.store.snapshot(&book.id).unwrap().tables, before);
    }

    #[test]
    fn test_move_card_requires_owner() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let err = move_card(
            &mut fixture.store,
            &Identity::admin("root"),
            &book.id,
            &ids.cards[0],
            Placement::default(),
            WARN,
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::Unauthorized { .. }));
    }

    #[test]
    fn test_repeated_front_inserts_warn_and_rebalance_fixes() {
        let mut fixture = StoreFixture::new();
        let (book, ids) = fixture.with_sample_book("ana", "Voyage");
        let board = Some(ids.boards[0]);

        // Keep moving the last card in front of the first one. Ranks grow
        // towards the lower end until they cross the warning length.
        let mut warned = false;
        for _ in 0..200 {
            let lane = list_cards(&fixture.store, &ana(), &book.id, board).unwrap().cards;
            let first = lane[0].id;
            let second = lane[1].id;
            let res = move_card(
                &mut fixture.store,
                &ana(),
                &book.id,
                &lane[2].id,
                Placement {
                    board_id: board,
                    after: Some(first),
                    before: Some(second),
                },
                4,
            )
            .unwrap();
            if res.messages.iter().any(|m| m.level == MessageLevel::Warning) {
                warned = true;
                break;
            }
        }
        assert!(warned);

        let order_before = lane_titles(&fixture, &book.id, board);
        let res = rebalance_board(&mut fixture.store, &ana(), &book.id, board).unwrap();
        assert_eq!(res.cards.len(), 3);
        assert!(res.cards.iter().all(|c| c.rank.len() == 1));
        assert_eq!(lane_titles(&fixture, &book.id, board), order_before);
    }

    #[test]
    fn test_list_cards_unknown_board() {
        let mut fixture = StoreFixture::new();
        let book = fixture.with_empty_book("ana", "Draft");
        let err = list_cards(&fixture.store, &ana(), &book.id, Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, StoryError::EntityNotFound { kind: "Board", .. }));
    }

    #[test]
    fn test_add_board_appends() {
        let mut fixture = StoreFixture::new();
        let (book, _) = fixture.with_sample_book("ana", "Voyage");
        add_board(&mut fixture.store, &ana(), &book.id, "Subplot").unwrap();
        let snap = fixture.store.snapshot(&book.id).unwrap();
        let boards: Vec<_> = snap
            .tables
            .boards_ordered()
            .into_iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(boards, ["Plot", "Subplot"]);
    }
}
