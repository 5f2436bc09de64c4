/*
 *  Tongs, a tuner for hand-crafted evaluation weights.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Tongs is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Tongs is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Tongs. If not, see <https://www.gnu.org/licenses/>.
 */

//! Code shared by the chess evaluation functions.

use crate::manifest::FeatureSubSet;
use crate::params::{Float, PhaseType, Weights};
use cogs::bitboards::Bitboard;
use cogs::pieces::Color::White;
use cogs::pieces::PieceType::{Bishop, Pawn};
use cogs::pieces::{Color, PieceType};
use cogs::squares::{ChessSquare, NUM_SQUARES};
use cogs::Chessboard;
use strum::IntoEnumIterator;

pub mod altair_eval;
pub mod altair_values;
pub mod material_only_eval;

/// Piece square tables are written down from white's point of view with `a8` first, like a diagram.
pub fn psqt_idx(square: ChessSquare, color: Color) -> usize {
    square.flip_if(color == White).idx()
}

/// Material advantage at which a pawnless side is still expected to be able to win.
const PAWNLESS_WINNING_MARGIN: i32 = 300;

/// Scales down the endgame half of the score in positions that are hard to win even with more material.
///
/// This isn't a tunable feature: it's fixed per position and only multiplies the linear evaluation.
pub fn endgame_scale(pos: &Chessboard) -> Float {
    let material = |color: Color| -> i32 {
        PieceType::non_king_pieces()
            .map(|p| pos.colored_piece_bb(color, p).num_ones() as i32 * p.material_value())
            .sum()
    };
    let diff = material(Color::White) - material(Color::Black);
    let stronger = if diff >= 0 { Color::White } else { Color::Black };
    if diff != 0
        && pos.colored_piece_bb(stronger, Pawn).is_zero()
        && diff.abs() <= PAWNLESS_WINNING_MARGIN
    {
        return 0.25;
    }
    if is_opposite_colored_bishop_ending(pos) {
        return 0.5;
    }
    1.0
}

fn is_opposite_colored_bishop_ending(pos: &Chessboard) -> bool {
    let only_bishops = PieceType::non_king_pieces()
        .filter(|p| *p != Pawn && *p != Bishop)
        .all(|p| pos.piece_bb(p).is_zero());
    let white = pos.colored_piece_bb(Color::White, Bishop);
    let black = pos.colored_piece_bb(Color::Black, Bishop);
    if !only_bishops || !white.is_single_piece() || !black.is_single_piece() {
        return false;
    }
    let light = |bb: Bitboard| bb.lsb().is_some_and(|sq| sq.is_light());
    light(white) != light(black)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FileOpenness {
    Open,
    SemiOpen,
    Closed,
}

/// Openness of `file` from `color`'s perspective: semi-open means there are only enemy pawns on it.
pub fn file_openness(pos: &Chessboard, file: usize, color: Color) -> FileOpenness {
    let file = Bitboard::file(file);
    let our_pawns = pos.colored_piece_bb(color, Pawn) & file;
    let their_pawns = pos.colored_piece_bb(color.other(), Pawn) & file;
    if our_pawns.has_set_bit() {
        FileOpenness::Closed
    } else if their_pawns.has_set_bit() {
        FileOpenness::SemiOpen
    } else {
        FileOpenness::Open
    }
}

/// Moves the average of each piece square table into the material value of that piece, for both phases.
///
/// Pawns can't stand on the first or last rank, so those entries don't count towards the average.
/// The king has no material value and is skipped.
pub fn rebalance_psqts<F: FeatureSubSet>(weights: &mut Weights, material: F, psqts: F) {
    let material_start = material.start_idx();
    let psqt_start = psqts.start_idx();
    for piece in PieceType::non_king_pieces() {
        let table = psqt_start + piece.idx() * NUM_SQUARES;
        let squares: Vec<usize> = (0..NUM_SQUARES)
            .filter(|sq| piece != Pawn || (1..=6).contains(&(sq / 8)))
            .collect();
        for phase in PhaseType::iter() {
            let avg = squares
                .iter()
                .map(|sq| weights[table + sq].get(phase))
                .sum::<Float>()
                / squares.len() as Float;
            for sq in &squares {
                *weights[table + sq].get_mut(phase) -= avg;
            }
            *weights[material_start + piece.idx()].get_mut(phase) += avg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psqt_idx_test() {
        let a8 = ChessSquare::new(56);
        assert_eq!(psqt_idx(a8, Color::White), 0);
        assert_eq!(psqt_idx(a8.flip(), Color::Black), 0);
        let e2 = ChessSquare::new(12);
        assert_eq!(psqt_idx(e2, Color::White), 52);
        assert_eq!(psqt_idx(e2.flip(), Color::Black), 52);
    }

    #[test]
    fn endgame_scale_test() {
        let scale = |fen: &str| endgame_scale(&Chessboard::from_fen(fen).unwrap());
        assert_eq!(scale(cogs::START_FEN), 1.0);
        // a lone minor piece against a pawnless king
        assert_eq!(scale("4k3/8/8/8/8/8/8/3BK3 w - - 0 1"), 0.25);
        // rook against bishop
        assert_eq!(scale("4k3/8/8/8/2b5/8/8/3RK3 w - - 0 1"), 0.25);
        // a queen is enough
        assert_eq!(scale("4k3/8/8/8/8/8/8/3QK3 w - - 0 1"), 1.0);
        // the stronger side has pawns
        assert_eq!(scale("4k3/8/8/5n2/8/8/P7/3BK3 w - - 0 1"), 1.0);
        assert_eq!(scale("4k3/p7/4b3/8/8/8/P7/2BK4 w - - 0 1"), 0.5);
        // same colored bishops
        assert_eq!(scale("4k3/p7/5b2/8/8/8/P7/2BK4 w - - 0 1"), 1.0);
        assert_eq!(scale("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), 1.0);
    }

    #[test]
    fn file_openness_test() {
        let pos = Chessboard::from_fen("4k3/p7/8/8/8/8/1P6/4K3 w - - 0 1").unwrap();
        assert_eq!(file_openness(&pos, 0, Color::White), FileOpenness::SemiOpen);
        assert_eq!(file_openness(&pos, 0, Color::Black), FileOpenness::Closed);
        assert_eq!(file_openness(&pos, 1, Color::Black), FileOpenness::SemiOpen);
        assert_eq!(file_openness(&pos, 7, Color::White), FileOpenness::Open);
    }
}
