/*
 *  Cogs, the chess rules behind the Tongs tuner.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Cogs is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Cogs is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Cogs. If not, see <https://www.gnu.org/licenses/>.
 */

use crate::bitboards::Bitboard;
use crate::fen::FenError;
use crate::pieces::Color;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const NUM_SQUARES: usize = 64;

/// A square of the 8x8 board, `a1` is 0, `b1` is 1 and `h8` is 63.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[must_use]
pub struct ChessSquare(u8);

impl ChessSquare {
    pub fn new(idx: usize) -> Self {
        debug_assert!(idx < NUM_SQUARES);
        Self(idx as u8)
    }

    pub fn from_rank_file(rank: usize, file: usize) -> Self {
        debug_assert!(rank < 8 && file < 8);
        Self::new(rank * 8 + file)
    }

    pub fn idx(self) -> usize {
        self.0 as usize
    }

    pub fn rank(self) -> usize {
        self.idx() / 8
    }

    pub fn file(self) -> usize {
        self.idx() % 8
    }

    /// Mirrors the square vertically, e.g. `a1` becomes `a8`.
    pub fn flip(self) -> Self {
        Self(self.0 ^ 56)
    }

    pub fn flip_if(self, flip: bool) -> Self {
        if flip {
            self.flip()
        } else {
            self
        }
    }

    /// The rank as seen from `color`'s side of the board, starting at 0.
    pub fn relative_rank(self, color: Color) -> usize {
        match color {
            Color::White => self.rank(),
            Color::Black => 7 - self.rank(),
        }
    }

    pub fn bb(self) -> Bitboard {
        Bitboard::single(self)
    }

    pub fn is_light(self) -> bool {
        (self.rank() + self.file()) % 2 == 1
    }

    /// Moves the square by `(rank_delta, file_delta)`, returning `None` when leaving the board.
    pub fn offset(self, rank_delta: isize, file_delta: isize) -> Option<Self> {
        let rank = self.rank() as isize + rank_delta;
        let file = self.file() as isize + file_delta;
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Self::from_rank_file(rank as usize, file as usize))
        } else {
            None
        }
    }

    pub fn iter() -> impl Iterator<Item = ChessSquare> {
        (0..NUM_SQUARES).map(Self::new)
    }
}

impl Display for ChessSquare {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{0}{1}",
            (b'a' + self.file() as u8) as char,
            self.rank() + 1
        )
    }
}

impl FromStr for ChessSquare {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(FenError::InvalidSquare(s.to_string()));
        };
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(FenError::InvalidSquare(s.to_string()));
        }
        Ok(Self::from_rank_file(
            rank as usize - '1' as usize,
            file as usize - 'a' as usize,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names_test() {
        assert_eq!(ChessSquare::new(0).to_string(), "a1");
        assert_eq!(ChessSquare::new(63).to_string(), "h8");
        assert_eq!(ChessSquare::from_str("e4").unwrap(), ChessSquare::from_rank_file(3, 4));
        for sq in ChessSquare::iter() {
            assert_eq!(ChessSquare::from_str(&sq.to_string()).unwrap(), sq);
        }
        assert!(ChessSquare::from_str("i1").is_err());
        assert!(ChessSquare::from_str("a9").is_err());
        assert!(ChessSquare::from_str("a").is_err());
        assert!(ChessSquare::from_str("a12").is_err());
    }

    #[test]
    fn flip_and_relative_rank_test() {
        let e2 = ChessSquare::from_str("e2").unwrap();
        assert_eq!(e2.flip().to_string(), "e7");
        assert_eq!(e2.flip().flip(), e2);
        assert_eq!(e2.relative_rank(Color::White), 1);
        assert_eq!(e2.flip().relative_rank(Color::Black), 1);
        assert!(!ChessSquare::new(0).is_light());
        assert!(ChessSquare::new(63).flip().is_light());
        assert_eq!(ChessSquare::new(0).offset(-1, 0), None);
        assert_eq!(ChessSquare::new(0).offset(1, 1).map(|s| s.idx()), Some(9));
    }
}
