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

//! A capture-only search used to resolve tactically unstable positions before they get evaluated.

use crate::chessboard::Chessboard;
use crate::movegen::Capture;
use crate::pieces::PieceType;
use log::trace;
use strum::IntoEnumIterator;

const MAX_QSEARCH_DEPTH: usize = 32;

const SCORE_INF: i32 = 1_000_000;

impl Chessboard {
    /// The material difference from the perspective of the side to move.
    pub fn material_balance(&self) -> i32 {
        let us = self.active_player();
        PieceType::iter()
            .map(|piece| {
                let ours = self.colored_piece_bb(us, piece).num_ones() as i32;
                let theirs = self.colored_piece_bb(us.other(), piece).num_ones() as i32;
                (ours - theirs) * piece.material_value()
            })
            .sum()
    }

    /// Runs a material-only quiescence search and returns the position at the end of the principal variation.
    /// If standing pat is best, that's the position itself.
    pub fn quiesce(&self) -> Chessboard {
        let (score, leaf) = qsearch(self, -SCORE_INF, SCORE_INF, 0);
        trace!("Quiescence search of '{self}' ended in '{leaf}' with score {score}");
        leaf
    }
}

fn mvv_lva(capture: &Capture) -> i32 {
    capture.victim.material_value() * 16 - capture.piece.idx() as i32
}

fn qsearch(pos: &Chessboard, mut alpha: i32, beta: i32, ply: usize) -> (i32, Chessboard) {
    let stand_pat = pos.material_balance();
    let mut best_leaf = pos.clone();
    if stand_pat >= beta {
        return (stand_pat, best_leaf);
    }
    alpha = alpha.max(stand_pat);
    if ply >= MAX_QSEARCH_DEPTH {
        return (alpha, best_leaf);
    }
    let mut captures = pos.pseudolegal_captures();
    captures.sort_by_key(|c| -mvv_lva(c));
    for capture in captures {
        let Some(child) = pos.make_capture(capture) else {
            continue;
        };
        let (score, leaf) = qsearch(&child, -beta, -alpha, ply + 1);
        let score = -score;
        if score > alpha {
            alpha = score;
            best_leaf = leaf;
            if alpha >= beta {
                break;
            }
        }
    }
    (alpha, best_leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chessboard::START_FEN;

    #[test]
    fn quiet_position_test() {
        let pos = Chessboard::from_fen(START_FEN).unwrap();
        assert_eq!(pos.material_balance(), 0);
        assert_eq!(pos.quiesce(), pos);
    }

    #[test]
    fn hanging_piece_test() {
        // white can win a free queen
        let pos = Chessboard::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(pos.material_balance(), 100 - 900);
        let leaf = pos.quiesce();
        assert_eq!(leaf.as_fen(), "4k3/8/8/3P4/8/8/8/4K3 b - - 0 1");
        assert_eq!(leaf.material_balance(), -100);
    }

    #[test]
    fn defended_piece_test() {
        // taking the defended pawn loses the queen, so standing pat is best
        let pos = Chessboard::from_fen("4k3/8/2p5/3p4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        assert_eq!(pos.quiesce(), pos);
        // a defended queen is still worth a rook
        let pos = Chessboard::from_fen("4k3/8/2p5/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let leaf = pos.quiesce();
        assert_eq!(leaf.as_fen(), "4k3/8/8/3p4/8/8/8/4K3 w - - 0 2");
    }
}
