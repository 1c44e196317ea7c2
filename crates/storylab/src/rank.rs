//! # Rank Strings
//!
//! Cards on a corkboard lane are ordered by a `rank` string and nothing else.
//! Moving a card computes one new rank that sorts between its new neighbours;
//! no sibling is ever rewritten.
//!
//! ## Alphabet
//!
//! Ranks use the ASCII range `'0'..='z'` and compare byte-wise, which for this
//! range is the same as `str` ordering. `'U'` is the midpoint and the rank of
//! the first item in an empty lane.
//!
//! ## Well-formed Ranks
//!
//! A rank is well-formed when it is non-empty, uses only alphabet characters
//! and does not end with `'0'`. Nothing sorts strictly between `"a"` and
//! `"a0"`, so a trailing minimum character eats the gap in front of it.
//! Every rank produced by [`rank_between`] (except the fallback below) and by
//! [`rebalance`] is well-formed.
//!
//! ## Inverted Neighbours
//!
//! If a caller passes `prev >= next` the lane is already corrupt. Reordering
//! must keep working, so instead of failing we log the anomaly and return
//! `next + '0'`. The lane should then be rebalanced with [`rebalance`].
//!
//! ## Inserting at the Front
//!
//! Before a rank whose first character is above `'1'` the new rank is the
//! single character halfway down to `'0'`. Before `"1..."` that character
//! would be `'0'` itself, and a lone `"0"` is not well-formed: nothing could
//! ever be placed in front of it, and `"00"` sorts above it. So when `next`
//! starts with `'0'` or `'1'` it is walked position by position against an
//! all-`'0'` lower bound (`"1"` gives `"0U"`, `"0U"` gives `"0B"`).
//!
//! ## Outside the Alphabet
//!
//! Bytes of `next` above `'z'` are read as `'z'`, so a stray non-alphabet
//! neighbour still yields an alphabet rank below it. Template import replaces
//! malformed ranks before they reach a lane.
//!
//! ## Growth
//!
//! Repeated insertion at the same boundary makes ranks longer by roughly one
//! character per six insertions. [`rebalance`] hands out fresh, evenly spaced
//! ranks of equal length for a whole lane.

use tracing::warn;

pub const MIN_CHAR: u8 = b'0';
pub const MAX_CHAR: u8 = b'z';
pub const MID_CHAR: u8 = b'U';

const BASE: u128 = (MAX_CHAR - MIN_CHAR + 1) as u128;

/// Rank for the first item of an empty sequence.
pub fn initial_rank() -> String {
    char::from(MID_CHAR).to_string()
}

/// Returns a rank that sorts strictly between `prev` and `next`.
///
/// Either neighbour may be absent: `prev = None` inserts at the start,
/// `next = None` at the end, both absent yields [`initial_rank`].
pub fn rank_between(prev: Option<&str>, next: Option<&str>) -> String {
    match (prev, next) {
        (None, None) => initial_rank(),
        (None, Some(next)) => rank_before(next),
        (Some(prev), None) => rank_after(prev),
        (Some(prev), Some(next)) if prev >= next => {
            warn!(prev, next, "rank anomaly: prev does not sort before next");
            let mut fallback = next.to_string();
            fallback.push(char::from(MIN_CHAR));
            fallback
        }
        (Some(prev), Some(next)) => rank_inside(prev.as_bytes(), next.as_bytes()),
    }
}

/// Produces `count` strictly increasing ranks of equal length, evenly spread
/// over the alphabet.
pub fn rebalance(count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }

    let slots = count as u128 + 1;
    let mut width = 1usize;
    let mut space = BASE;
    // Keep at least two positions between neighbours so that bumping a value
    // off a trailing '0' never collides with the next one.
    while space < slots * 2 {
        width += 1;
        space *= BASE;
    }
    let step = space / slots;

    (1..=count as u128)
        .map(|k| {
            let mut value = k * step;
            if value % BASE == 0 {
                value += 1;
            }
            encode(value, width)
        })
        .collect()
}

pub fn is_well_formed(rank: &str) -> bool {
    let bytes = rank.as_bytes();
    match bytes.last() {
        None => false,
        Some(&last) if last == MIN_CHAR => false,
        Some(_) => bytes.iter().all(|b| (MIN_CHAR..=MAX_CHAR).contains(b)),
    }
}

fn midpoint(lo: u8, hi: u8) -> u8 {
    ((u16::from(lo) + u16::from(hi)) / 2) as u8
}

fn rank_before(next: &str) -> String {
    match next.as_bytes().first() {
        Some(&first) if first > MIN_CHAR + 1 => {
            char::from(midpoint(MIN_CHAR, first.min(MAX_CHAR))).to_string()
        }
        // A single '0' would not be well formed: walk `next` against an
        // all-minimum lower bound instead.
        Some(_) if is_well_formed(next) => rank_inside(&[], next.as_bytes()),
        _ => {
            let mut rank = String::with_capacity(next.len() + 1);
            rank.push(char::from(MIN_CHAR));
            rank.push_str(next);
            rank
        }
    }
}

fn rank_after(prev: &str) -> String {
    let bytes = prev.as_bytes();
    if let Some(&last) = bytes.last() {
        if last < MAX_CHAR {
            let mid = midpoint(last, MAX_CHAR);
            if mid > last {
                let mut out = bytes[..bytes.len() - 1].to_vec();
                out.push(mid);
                return into_string(out);
            }
        }
    }
    let mut rank = prev.to_string();
    rank.push(char::from(MID_CHAR));
    rank
}

fn rank_inside(prev: &[u8], next: &[u8]) -> String {
    let len = prev.len().max(next.len());
    let mut out = Vec::with_capacity(len + 1);
    // Once we have stepped below `next` at some position, `next` no longer
    // bounds the remaining positions.
    let mut upper_released = false;

    for i in 0..len {
        let lo = prev.get(i).copied().unwrap_or(MIN_CHAR);
        let hi = if upper_released {
            MAX_CHAR
        } else {
            next.get(i).copied().unwrap_or(MAX_CHAR).min(MAX_CHAR)
        };

        if u16::from(hi) > u16::from(lo) + 1 {
            out.push(midpoint(lo, hi));
            return into_string(out);
        }
        if hi != lo {
            upper_released = true;
        }
        out.push(lo);
    }

    out.push(MID_CHAR);
    into_string(out)
}

fn encode(mut value: u128, width: usize) -> String {
    let mut digits = vec![MIN_CHAR; width];
    for slot in digits.iter_mut().rev() {
        *slot = MIN_CHAR + (value % BASE) as u8;
        value /= BASE;
    }
    into_string(digits)
}

fn into_string(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
