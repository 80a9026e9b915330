//! Square N×N board storage.

use crate::{Coord, MoveError, Player, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// An N×N grid of squares stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    squares: Vec<Square>,
}

impl Board {
    /// Creates an empty board with `size` rows and columns.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            squares: vec![Square::Empty; size * size],
        }
    }

    /// Side length of the board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if `coord` addresses a cell on this board.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.size && coord.col < self.size
    }

    /// Gets the square at `coord`, or `None` when out of range.
    pub fn get(&self, coord: Coord) -> Option<Square> {
        self.index(coord).map(|i| self.squares[i])
    }

    /// Checks if the square at `coord` is on the board and empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        matches!(self.get(coord), Some(Square::Empty))
    }

    /// Places `player`'s mark at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfBounds`] or [`MoveError::SquareOccupied`];
    /// the board is unchanged on error.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn place(&mut self, coord: Coord, player: Player) -> Result<(), MoveError> {
        let index = self
            .index(coord)
            .ok_or(MoveError::OutOfBounds(coord, self.size))?;
        if self.squares[index] != Square::Empty {
            debug!(%coord, "Square occupied");
            return Err(MoveError::SquareOccupied(coord));
        }
        self.squares[index] = Square::Occupied(player);
        Ok(())
    }

    /// Returns a copy of this board with `player`'s mark at `coord`.
    ///
    /// # Errors
    ///
    /// Same as [`Board::place`].
    #[instrument(skip(self))]
    pub fn with_move(&self, coord: Coord, player: Player) -> Result<Self, MoveError> {
        let mut next = self.clone();
        next.place(coord, player)?;
        Ok(next)
    }

    /// True when no empty squares remain.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|&s| s != Square::Empty)
    }

    /// True when no marks have been placed.
    pub fn is_blank(&self) -> bool {
        self.squares.iter().all(|&s| s == Square::Empty)
    }

    /// Number of marks `player` has on the board.
    pub fn count(&self, player: Player) -> usize {
        self.squares
            .iter()
            .filter(|&&s| s == Square::Occupied(player))
            .count()
    }

    /// All empty cells in row-major order.
    pub fn empty_squares(&self) -> Vec<Coord> {
        self.coords().filter(|&c| self.is_empty(c)).collect()
    }

    /// All cells in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Coord::new(row, col)))
    }

    /// Rows of squares, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Square]> {
        // chunks(0) panics, and a 0×0 board has no rows anyway
        self.squares.chunks(self.size.max(1))
    }

    /// Formats the board as a text grid.
    ///
    /// `glyph` maps each occupant to the text drawn in its cell; empty
    /// cells show `.`.
    pub fn render<F>(&self, glyph: F) -> String
    where
        F: Fn(Player) -> String,
    {
        let cells: Vec<String> = self
            .squares
            .iter()
            .map(|s| match s {
                Square::Empty => ".".to_string(),
                Square::Occupied(p) => glyph(*p),
            })
            .collect();
        let width = cells.iter().map(|c| c.chars().count()).max().unwrap_or(1);

        let mut out = String::new();
        out.push_str(&" ".repeat(4));
        for col in 0..self.size {
            out.push_str(&format!("{:>width$} ", col, width = width));
        }
        out.push('\n');
        for (row, chunk) in cells.chunks(self.size.max(1)).enumerate() {
            out.push_str(&format!("{:>2}  ", row));
            for cell in chunk {
                out.push_str(&format!("{:>width$} ", cell, width = width));
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord).then(|| coord.row * self.size + coord.col)
    }
}
