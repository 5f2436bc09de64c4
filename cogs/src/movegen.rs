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

//! Attack generation and legal capture generation. Quiet moves are never needed by the tuner, so they don't exist here.

use crate::bitboards::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
    Bitboard,
};
use crate::chessboard::{
    Chessboard, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE,
};
use crate::pieces::PieceType::*;
use crate::pieces::{Color, ColoredPiece, PieceType};
use crate::squares::ChessSquare;
use std::fmt::{Display, Formatter};
use strum::IntoEnumIterator;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct Capture {
    pub from: ChessSquare,
    pub to: ChessSquare,
    pub piece: PieceType,
    pub victim: PieceType,
    /// Captures onto the last rank always promote to a queen.
    pub promotion: Option<PieceType>,
    pub is_ep: bool,
}

impl Display for Capture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0}{1}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.ascii_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

/// Castling rights that are lost when a piece leaves or arrives at each of these squares.
const CASTLING_SQUARES: [(usize, u8); 6] = [
    (0, WHITE_QUEENSIDE),
    (4, WHITE_KINGSIDE | WHITE_QUEENSIDE),
    (7, WHITE_KINGSIDE),
    (56, BLACK_QUEENSIDE),
    (60, BLACK_KINGSIDE | BLACK_QUEENSIDE),
    (63, BLACK_KINGSIDE),
];

impl Chessboard {
    /// The squares attacked by `piece` of `color` standing on `square`, given the current occupancy.
    pub fn attacks_from(&self, square: ChessSquare, piece: PieceType, color: Color) -> Bitboard {
        let blockers = self.occupied_bb();
        match piece {
            Pawn => pawn_attacks(square, color),
            Knight => knight_attacks(square),
            Bishop => bishop_attacks(square, blockers),
            Rook => rook_attacks(square, blockers),
            Queen => queen_attacks(square, blockers),
            King => king_attacks(square),
        }
    }

    /// All squares attacked by at least one piece of `color`.
    pub fn attacked_by(&self, color: Color) -> Bitboard {
        let mut res = self.colored_piece_bb(color, Pawn).pawn_attacks(color);
        for piece in PieceType::non_pawn_pieces() {
            for square in self.colored_piece_bb(color, piece).ones() {
                res |= self.attacks_from(square, piece, color);
            }
        }
        res
    }

    pub fn is_attacked(&self, square: ChessSquare, by: Color) -> bool {
        let blockers = self.occupied_bb();
        let them = |piece| self.colored_piece_bb(by, piece);
        // attacks are symmetric, so look from the target square with the opposite pawn direction
        (pawn_attacks(square, by.other()) & them(Pawn)).has_set_bit()
            || (knight_attacks(square) & them(Knight)).has_set_bit()
            || (king_attacks(square) & them(King)).has_set_bit()
            || (bishop_attacks(square, blockers) & (them(Bishop) | them(Queen))).has_set_bit()
            || (rook_attacks(square, blockers) & (them(Rook) | them(Queen))).has_set_bit()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_attacked(king, color.other()))
    }

    pub fn pseudolegal_captures(&self) -> Vec<Capture> {
        let us = self.active_player;
        let them = self.color_bb(us.other());
        let mut res = vec![];
        for piece in PieceType::iter() {
            for from in self.colored_piece_bb(us, piece).ones() {
                let targets = self.attacks_from(from, piece, us) & them;
                for to in targets.ones() {
                    let Some(victim) = self.piece_on(to) else {
                        continue;
                    };
                    let promotion = (piece == Pawn && to.relative_rank(us) == 7).then_some(Queen);
                    res.push(Capture {
                        from,
                        to,
                        piece,
                        victim: victim.piece,
                        promotion,
                        is_ep: false,
                    });
                }
            }
        }
        if let Some(ep) = self.ep_square {
            let attackers = pawn_attacks(ep, us.other()) & self.colored_piece_bb(us, Pawn);
            for from in attackers.ones() {
                res.push(Capture {
                    from,
                    to: ep,
                    piece: Pawn,
                    victim: Pawn,
                    promotion: None,
                    is_ep: true,
                });
            }
        }
        res
    }

    /// Returns the resulting position, or `None` if the capture would leave the own king in check.
    /// Kings can never be captured in a legal position, so a capture of a king is rejected as well.
    pub fn make_capture(&self, capture: Capture) -> Option<Self> {
        if capture.victim == King {
            return None;
        }
        let us = self.active_player;
        let mut res = self.clone();
        let victim_square = if capture.is_ep {
            let square = capture.to.offset(if us == Color::White { -1 } else { 1 }, 0)?;
            if self.piece_on(square) != Some(ColoredPiece::new(us.other(), Pawn)) {
                return None;
            }
            square
        } else {
            capture.to
        };
        res.remove_piece(victim_square, ColoredPiece::new(us.other(), capture.victim));
        res.remove_piece(capture.from, ColoredPiece::new(us, capture.piece));
        let arriving = capture.promotion.unwrap_or(capture.piece);
        res.place_piece(capture.to, ColoredPiece::new(us, arriving));
        for (square, rights) in CASTLING_SQUARES {
            if capture.from.idx() == square || capture.to.idx() == square {
                res.castling &= !rights;
            }
        }
        res.ep_square = None;
        res.halfmove_clock = 0;
        if us == Color::Black {
            res.fullmove_number += 1;
        }
        res.active_player = us.other();
        (!res.is_in_check(us)).then_some(res)
    }

    pub fn legal_captures(&self) -> Vec<Capture> {
        self.pseudolegal_captures()
            .into_iter()
            .filter(|capture| self.make_capture(*capture).is_some())
            .collect()
    }
}
