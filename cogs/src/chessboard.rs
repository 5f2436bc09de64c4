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
use crate::pieces::{Color, ColoredPiece, PieceType, MAX_PHASE, NUM_CHESS_PIECES, NUM_COLORS};
use crate::squares::ChessSquare;
use std::fmt::{Display, Formatter};
use strum::IntoEnumIterator;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const WHITE_KINGSIDE: u8 = 1;
pub const WHITE_QUEENSIDE: u8 = 2;
pub const BLACK_KINGSIDE: u8 = 4;
pub const BLACK_QUEENSIDE: u8 = 8;

/// A chess position. Constructed from a FEN, see [`Chessboard::from_fen`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct Chessboard {
    pub(crate) piece_bbs: [Bitboard; NUM_CHESS_PIECES],
    pub(crate) color_bbs: [Bitboard; NUM_COLORS],
    pub(crate) active_player: Color,
    pub(crate) castling: u8,
    pub(crate) ep_square: Option<ChessSquare>,
    pub(crate) halfmove_clock: usize,
    pub(crate) fullmove_number: usize,
}

impl Chessboard {
    pub(crate) fn empty() -> Self {
        Self {
            piece_bbs: [Bitboard::EMPTY; NUM_CHESS_PIECES],
            color_bbs: [Bitboard::EMPTY; NUM_COLORS],
            active_player: Color::White,
            castling: 0,
            ep_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn startpos() -> Self {
        // the start position is always valid
        match Self::from_fen(START_FEN) {
            Ok(pos) => pos,
            Err(err) => unreachable!("invalid start position: {err}"),
        }
    }

    pub fn active_player(&self) -> Color {
        self.active_player
    }

    pub fn castling_rights(&self) -> u8 {
        self.castling
    }

    pub fn halfmove_clock(&self) -> usize {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> usize {
        self.fullmove_number
    }

    pub fn piece_bb(&self, piece: PieceType) -> Bitboard {
        self.piece_bbs[piece.idx()]
    }

    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.color_bbs[color.idx()]
    }

    pub fn colored_piece_bb(&self, color: Color, piece: PieceType) -> Bitboard {
        self.piece_bb(piece) & self.color_bb(color)
    }

    pub fn occupied_bb(&self) -> Bitboard {
        self.color_bbs[0] | self.color_bbs[1]
    }

    pub fn piece_on(&self, square: ChessSquare) -> Option<ColoredPiece> {
        let color = Color::iter().find(|c| self.color_bb(*c).is_bit_set_at(square))?;
        let piece = PieceType::iter().find(|p| self.piece_bb(*p).is_bit_set_at(square))?;
        Some(ColoredPiece::new(color, piece))
    }

    pub(crate) fn place_piece(&mut self, square: ChessSquare, piece: ColoredPiece) {
        debug_assert!(self.piece_on(square).is_none());
        self.piece_bbs[piece.piece.idx()] |= square.bb();
        self.color_bbs[piece.color.idx()] |= square.bb();
    }

    pub(crate) fn remove_piece(&mut self, square: ChessSquare, piece: ColoredPiece) {
        debug_assert_eq!(self.piece_on(square), Some(piece));
        self.piece_bbs[piece.piece.idx()] ^= square.bb();
        self.color_bbs[piece.color.idx()] ^= square.bb();
    }

    pub fn king_square(&self, color: Color) -> Option<ChessSquare> {
        self.colored_piece_bb(color, PieceType::King).lsb()
    }

    /// The game phase in `0..=MAX_PHASE`, where `MAX_PHASE` means all the non-pawn material is still on the board.
    pub fn phase(&self) -> usize {
        PieceType::iter()
            .map(|piece| self.piece_bb(piece).num_ones() * piece.phase_value())
            .sum::<usize>()
            .min(MAX_PHASE)
    }
}

impl Display for Chessboard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_fen())
    }
}
