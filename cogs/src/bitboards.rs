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

use crate::pieces::Color;
use crate::squares::ChessSquare;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
#[must_use]
pub struct Bitboard(pub u64);

pub const A_FILE: Bitboard = Bitboard(0x0101_0101_0101_0101);
pub const FIRST_RANK: Bitboard = Bitboard(0xff);

const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const ROOK_DIRECTIONS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    pub fn single(square: ChessSquare) -> Self {
        Self(1 << square.idx())
    }

    pub fn file(file: usize) -> Self {
        Self(A_FILE.0 << file)
    }

    pub fn rank(rank: usize) -> Self {
        Self(FIRST_RANK.0 << (rank * 8))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn has_set_bit(self) -> bool {
        self.0 != 0
    }

    pub fn is_bit_set_at(self, square: ChessSquare) -> bool {
        (self.0 >> square.idx()) & 1 == 1
    }

    pub fn num_ones(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_single_piece(self) -> bool {
        self.0.is_power_of_two()
    }

    pub fn lsb(self) -> Option<ChessSquare> {
        self.has_set_bit()
            .then(|| ChessSquare::new(self.0.trailing_zeros() as usize))
    }

    pub fn pop_lsb(&mut self) -> Option<ChessSquare> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    pub fn ones(self) -> impl Iterator<Item = ChessSquare> {
        let mut bb = self;
        std::iter::from_fn(move || bb.pop_lsb())
    }

    pub fn north(self) -> Self {
        Self(self.0 << 8)
    }

    pub fn south(self) -> Self {
        Self(self.0 >> 8)
    }

    pub fn east(self) -> Self {
        Self((self.0 << 1) & !A_FILE.0)
    }

    pub fn west(self) -> Self {
        Self((self.0 >> 1) & !Self::file(7).0)
    }

    /// One rank towards the opponent of `color`.
    pub fn forward(self, color: Color) -> Self {
        match color {
            Color::White => self.north(),
            Color::Black => self.south(),
        }
    }

    /// All squares on the same file or further towards the opponent, excluding the original squares.
    pub fn front_span(self, color: Color) -> Self {
        let mut res = Self::EMPTY;
        let mut bb = self.forward(color);
        while bb.has_set_bit() {
            res |= bb;
            bb = bb.forward(color);
        }
        res
    }

    pub fn pawn_attacks(self, color: Color) -> Self {
        let forward = self.forward(color);
        forward.east() | forward.west()
    }
}

fn leaper_attacks(square: ChessSquare, offsets: &[(isize, isize)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(dr, df) in offsets {
        if let Some(target) = square.offset(dr, df) {
            res |= target.bb();
        }
    }
    res
}

fn slider_attacks(square: ChessSquare, blockers: Bitboard, directions: &[(isize, isize)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(dr, df) in directions {
        let mut current = square;
        while let Some(next) = current.offset(dr, df) {
            res |= next.bb();
            if blockers.is_bit_set_at(next) {
                break;
            }
            current = next;
        }
    }
    res
}

pub fn knight_attacks(square: ChessSquare) -> Bitboard {
    leaper_attacks(square, &KNIGHT_OFFSETS)
}

pub fn king_attacks(square: ChessSquare) -> Bitboard {
    leaper_attacks(square, &KING_OFFSETS)
}

pub fn pawn_attacks(square: ChessSquare, color: Color) -> Bitboard {
    square.bb().pawn_attacks(color)
}

pub fn bishop_attacks(square: ChessSquare, blockers: Bitboard) -> Bitboard {
    slider_attacks(square, blockers, &BISHOP_DIRECTIONS)
}

pub fn rook_attacks(square: ChessSquare, blockers: Bitboard) -> Bitboard {
    slider_attacks(square, blockers, &ROOK_DIRECTIONS)
}

pub fn queen_attacks(square: ChessSquare, blockers: Bitboard) -> Bitboard {
    bishop_attacks(square, blockers) | rook_attacks(square, blockers)
}
