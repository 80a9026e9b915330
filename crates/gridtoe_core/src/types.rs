//! Core domain types shared across the rules engine.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two seats at the table.
///
/// Seats are fixed for a match; which glyph a seat draws with is a
/// [`Settings`](crate::Settings) concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Player {
    /// Player one (always opens a round).
    #[display("Player 1")]
    One,
    /// Player two.
    #[display("Player 2")]
    Two,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Both seats, in turn order.
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Square {
    /// Empty square.
    #[default]
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl Square {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// Zero-based cell address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[display("({row}, {col})")]
pub struct Coord {
    /// Row index, top to bottom.
    pub row: usize,
    /// Column index, left to right.
    pub col: usize,
}

impl Coord {
    /// Creates a coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parses `"row col"` or `"row,col"` input, zero-based.
    #[instrument]
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty());
        let row = parts.next()?.parse().ok()?;
        let col = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { row, col })
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// The glyph a player draws with (`X`, `O`, or any short string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Wraps a glyph. Surrounding whitespace is trimmed.
    pub fn new(glyph: impl AsRef<str>) -> Self {
        Self(glyph.as_ref().trim().to_string())
    }

    /// Returns the glyph text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the glyph is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Symbol {
    fn from(glyph: &str) -> Self {
        Self::new(glyph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_alternates() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent().opponent(), Player::Two);
    }

    #[test]
    fn test_coord_parse() {
        assert_eq!(Coord::parse("1 2"), Some(Coord::new(1, 2)));
        assert_eq!(Coord::parse(" 0,3 "), Some(Coord::new(0, 3)));
        assert_eq!(Coord::parse("4"), None);
        assert_eq!(Coord::parse("a b"), None);
        assert_eq!(Coord::parse("1 2 3"), None);
    }

    #[test]
    fn test_symbol_serializes_as_plain_string() {
        let json = serde_json::to_string(&Symbol::new(" X ")).unwrap();
        assert_eq!(json, "\"X\"");
    }
}
