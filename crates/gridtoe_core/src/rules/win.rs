//! Win detection for arbitrary board sizes and win lengths.

use crate::{Board, Coord, Player, Square, WinningLine};
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, instrument};

/// Scan direction for candidate lines, in scan priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    /// Left to right along a row.
    Horizontal,
    /// Top to bottom along a column.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Direction {
    /// Row and column step for this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (1, -1),
        }
    }

    /// Cells of the run of `len` starting at `start`, or `None` if any
    /// cell would fall off an N×N board.
    fn run(self, start: Coord, len: usize, size: usize) -> Option<Vec<Coord>> {
        let (dr, dc) = self.delta();
        let span = len.checked_sub(1)? as isize;
        let end_row = start.row as isize + dr * span;
        let end_col = start.col as isize + dc * span;
        let in_range = |v: isize| (0..size as isize).contains(&v);
        if !in_range(end_row) || !in_range(end_col) {
            return None;
        }
        Some(
            (0..len as isize)
                .map(|i| {
                    Coord::new(
                        (start.row as isize + dr * i) as usize,
                        (start.col as isize + dc * i) as usize,
                    )
                })
                .collect(),
        )
    }
}

/// Every in-bounds run of `win_length` cells on a `size`×`size` board.
///
/// Directions are visited in [`Direction`] order; within a direction,
/// start cells are visited row-major.
pub fn candidate_lines(size: usize, win_length: usize) -> impl Iterator<Item = Vec<Coord>> {
    Direction::iter().flat_map(move |dir| {
        (0..size).flat_map(move |row| {
            (0..size).filter_map(move |col| dir.run(Coord::new(row, col), win_length, size))
        })
    })
}

/// Finds the first winning run on `board`.
///
/// Returns `None` when `win_length` is zero or larger than the board.
#[instrument(skip(board), fields(size = board.size()))]
pub fn find_winning_line(board: &Board, win_length: usize) -> Option<(Player, WinningLine)> {
    if win_length == 0 || win_length > board.size() {
        return None;
    }

    for cells in candidate_lines(board.size(), win_length) {
        let Some(Square::Occupied(player)) = board.get(cells[0]) else {
            continue;
        };
        if cells
            .iter()
            .all(|&c| board.get(c) == Some(Square::Occupied(player)))
        {
            debug!(?player, start = %cells[0], "Winning line found");
            return Some((player, WinningLine::new(cells)));
        }
    }

    None
}
