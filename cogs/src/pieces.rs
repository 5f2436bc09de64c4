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

use derive_more::Display;
use strum_macros::{EnumIter, FromRepr};

pub const NUM_COLORS: usize = 2;
pub const NUM_CHESS_PIECES: usize = 6;

/// The sum of the phase values of the starting material. Positions with more material are clamped to this.
pub const MAX_PHASE: usize = 24;

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, EnumIter, FromRepr, Display)]
#[must_use]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    pub fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn ascii_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, EnumIter, FromRepr)]
#[must_use]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn non_king_pieces() -> impl Iterator<Item = PieceType> {
        [Self::Pawn, Self::Knight, Self::Bishop, Self::Rook, Self::Queen].into_iter()
    }

    pub fn non_pawn_pieces() -> impl Iterator<Item = PieceType> {
        [Self::Knight, Self::Bishop, Self::Rook, Self::Queen, Self::King].into_iter()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    /// Uppercase, as used for white pieces in FENs.
    pub fn ascii_char(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    pub fn from_ascii_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(Self::Pawn),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'R' => Some(Self::Rook),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }

    /// A rough material value in centipawns, only used for move ordering and quiescence stand pat scores.
    pub fn material_value(self) -> i32 {
        [100, 300, 300, 500, 900, 0][self.idx()]
    }

    pub fn phase_value(self) -> usize {
        [0, 1, 1, 2, 4, 0][self.idx()]
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct ColoredPiece {
    pub piece: PieceType,
    pub color: Color,
}

impl ColoredPiece {
    pub fn new(color: Color, piece: PieceType) -> Self {
        Self { piece, color }
    }

    pub fn from_ascii_char(c: char) -> Option<Self> {
        let piece = PieceType::from_ascii_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self { piece, color })
    }

    pub fn ascii_char(self) -> char {
        let c = self.piece.ascii_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn char_conversion_test() {
        for piece in PieceType::iter() {
            for color in Color::iter() {
                let colored = ColoredPiece::new(color, piece);
                assert_eq!(
                    ColoredPiece::from_ascii_char(colored.ascii_char()),
                    Some(colored)
                );
            }
        }
        assert_eq!(ColoredPiece::from_ascii_char('x'), None);
        assert_eq!(
            ColoredPiece::from_ascii_char('n'),
            Some(ColoredPiece::new(Color::Black, PieceType::Knight))
        );
    }

    #[test]
    fn phase_of_starting_material_test() {
        let phase: usize = PieceType::iter()
            .map(|p| {
                let count = match p {
                    PieceType::Pawn => 8,
                    PieceType::Knight | PieceType::Bishop | PieceType::Rook => 2,
                    PieceType::Queen | PieceType::King => 1,
                };
                p.phase_value() * count * NUM_COLORS
            })
            .sum();
        assert_eq!(phase, MAX_PHASE);
    }
}
