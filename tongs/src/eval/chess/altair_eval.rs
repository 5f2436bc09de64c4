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

//! The hand-crafted evaluation of the Altair engine, restricted to the terms that are linear in their weights.

use crate::eval::chess::altair_values::*;
use crate::eval::chess::{endgame_scale, file_openness, psqt_idx, rebalance_psqts, FileOpenness};
use crate::eval::Evaluator;
use crate::manifest::{EvalParams, FeatureSubSet, Shape, Storage};
use crate::params::{
    push_initial_parameter, push_initial_parameter_array, push_initial_parameter_array_2d,
    push_initial_parameter_double_array, push_initial_parameter_double_array_2d, Weights,
};
use crate::trace::Tracer;
use cogs::bitboards::{king_attacks, Bitboard};
use cogs::pieces::PieceType::*;
use cogs::pieces::{PieceType, NUM_CHESS_PIECES};
use cogs::squares::NUM_SQUARES;
use cogs::{Chessboard, Color};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use AltairFeature::*;

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumIter)]
pub enum AltairFeature {
    PieceValues,
    PieceSquareTables,
    PassedPawns,
    IsolatedPawn,
    DoubledPawn,
    PawnPhalanx,
    PieceThreat,
    RookSemiOpenFile,
    RookOpenFile,
    KingSemiOpenFile,
    KingOpenFile,
    BishopPair,
    Tempo,
    Mobility,
    KingRingAttacks,
    CaptureBonus,
}

impl FeatureSubSet for AltairFeature {
    fn ordinal(self) -> usize {
        self as usize
    }

    fn shape(self) -> Shape {
        match self {
            PieceValues | Mobility | KingRingAttacks => Shape::Array(NUM_CHESS_PIECES),
            PieceSquareTables => Shape::Array2d(NUM_CHESS_PIECES, NUM_SQUARES),
            PassedPawns | PawnPhalanx => Shape::Array(8),
            PieceThreat => Shape::Array2d(NUM_CHESS_PIECES, NUM_CHESS_PIECES),
            IsolatedPawn | DoubledPawn | RookSemiOpenFile | RookOpenFile | KingSemiOpenFile
            | KingOpenFile | BishopPair | Tempo | CaptureBonus => Shape::Single,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PieceValues => "PIECE_VALUES",
            PieceSquareTables => "PIECE_SQUARE_TABLES",
            PassedPawns => "PASSED_PAWNS",
            IsolatedPawn => "ISOLATED_PAWN",
            DoubledPawn => "DOUBLED_PAWN",
            PawnPhalanx => "PAWN_PHALANX",
            PieceThreat => "PIECE_THREAT",
            RookSemiOpenFile => "ROOK_SEMI_OPEN_FILE",
            RookOpenFile => "ROOK_OPEN_FILE",
            KingSemiOpenFile => "KING_SEMI_OPEN_FILE",
            KingOpenFile => "KING_OPEN_FILE",
            BishopPair => "BISHOP_PAIR",
            Tempo => "TEMPO",
            Mobility => "MOBILITY",
            KingRingAttacks => "KING_RING_ATTACKS",
            CaptureBonus => "CAPTURE_BONUS",
        }
    }

    fn storage(self) -> Storage {
        match self {
            PieceSquareTables | Mobility => Storage::Split,
            _ => Storage::Packed,
        }
    }

    fn row_name(self, row: usize) -> Option<&'static str> {
        match self {
            PieceSquareTables | PieceThreat => PieceType::from_repr(row).map(PieceType::name),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct AltairEval {
    params: EvalParams<AltairFeature>,
}

impl Evaluator for AltairEval {
    type Feature = AltairFeature;
    type Board = Chessboard;
    const NAME: &'static str = "altair";
    const INCLUDES_ADDITIONAL_SCORE: bool = true;

    fn new(params: EvalParams<AltairFeature>) -> Self {
        Self { params }
    }

    fn params(&self) -> &EvalParams<AltairFeature> {
        &self.params
    }

    fn push_initial_values(feature: AltairFeature, weights: &mut Weights) {
        match feature {
            PieceValues => push_initial_parameter_array(weights, &PIECE_VALUES),
            PieceSquareTables => push_initial_parameter_double_array_2d(
                weights,
                &PIECE_SQUARE_TABLES_MID,
                &PIECE_SQUARE_TABLES_END,
            ),
            PassedPawns => push_initial_parameter_array(weights, &PASSED_PAWNS),
            IsolatedPawn => push_initial_parameter(weights, ISOLATED_PAWN),
            DoubledPawn => push_initial_parameter(weights, DOUBLED_PAWN),
            PawnPhalanx => push_initial_parameter_array(weights, &PAWN_PHALANX),
            PieceThreat => push_initial_parameter_array_2d(weights, &PIECE_THREAT),
            RookSemiOpenFile => push_initial_parameter(weights, ROOK_SEMI_OPEN_FILE),
            RookOpenFile => push_initial_parameter(weights, ROOK_OPEN_FILE),
            KingSemiOpenFile => push_initial_parameter(weights, KING_SEMI_OPEN_FILE),
            KingOpenFile => push_initial_parameter(weights, KING_OPEN_FILE),
            BishopPair => push_initial_parameter(weights, BISHOP_PAIR),
            Tempo => push_initial_parameter(weights, TEMPO),
            Mobility => push_initial_parameter_double_array(weights, &MOBILITY_MID, &MOBILITY_END),
            KingRingAttacks => push_initial_parameter_array(weights, &KING_RING_ATTACKS),
            CaptureBonus => push_initial_parameter(weights, CAPTURE_BONUS),
        }
    }

    fn eval_and_trace(&self, pos: &Chessboard, tracer: &mut Tracer<AltairFeature>) {
        tracer.set_phase(pos.phase());
        tracer.set_endgame_scale(endgame_scale(pos));
        for color in Color::iter() {
            material_and_psqt(pos, color, tracer);
            pawn_structure(pos, color, tracer);
            pieces(pos, color, tracer);
        }
        let us = pos.active_player();
        tracer.add_single(us, Tempo, 1);
        tracer.add_single(us, CaptureBonus, pos.legal_captures().len() as i32);
    }

    fn rebalance(weights: &mut Weights) {
        rebalance_psqts(weights, PieceValues, PieceSquareTables);
    }
}

fn material_and_psqt(pos: &Chessboard, color: Color, tracer: &mut Tracer<AltairFeature>) {
    for piece in PieceType::iter() {
        let bb = pos.colored_piece_bb(color, piece);
        tracer.add(color, PieceValues, piece.idx(), bb.num_ones() as i32);
        for square in bb.ones() {
            let idx = psqt_idx(square, color);
            tracer.add_2d(color, PieceSquareTables, piece.idx(), idx, 1);
        }
    }
}

fn pawn_structure(pos: &Chessboard, color: Color, tracer: &mut Tracer<AltairFeature>) {
    let ours = pos.colored_piece_bb(color, Pawn);
    let theirs = pos.colored_piece_bb(color.other(), Pawn);
    for square in ours.ones() {
        let rank = square.relative_rank(color);
        let front = square.bb().front_span(color);
        if (theirs & (front | front.east() | front.west())).is_zero() {
            tracer.add(color, PassedPawns, rank, 1);
        }
        let file = Bitboard::file(square.file());
        if (ours & (file.east() | file.west())).is_zero() {
            tracer.add_single(color, IsolatedPawn, 1);
        }
        if (ours & front).has_set_bit() {
            tracer.add_single(color, DoubledPawn, 1);
        }
        // only look to the east so that each pair is counted once
        if (ours & square.bb().east()).has_set_bit() {
            tracer.add(color, PawnPhalanx, rank, 1);
        }
    }
}

fn pieces(pos: &Chessboard, color: Color, tracer: &mut Tracer<AltairFeature>) {
    let them = color.other();
    let own = pos.color_bb(color);
    let enemy_pawn_attacks = pos.colored_piece_bb(them, Pawn).pawn_attacks(them);
    let king_ring = pos
        .king_square(them)
        .map_or(Bitboard::EMPTY, |king| king_attacks(king) | king.bb());
    for piece in PieceType::iter() {
        for square in pos.colored_piece_bb(color, piece).ones() {
            let attacks = pos.attacks_from(square, piece, color);
            for victim in PieceType::iter() {
                let threats = attacks & pos.colored_piece_bb(them, victim);
                let count = threats.num_ones() as i32;
                tracer.add_2d(color, PieceThreat, piece.idx(), victim.idx(), count);
            }
            if piece != Pawn && piece != King {
                let mobility = (attacks & !own & !enemy_pawn_attacks).num_ones() as i32;
                tracer.add(color, Mobility, piece.idx(), mobility);
                let ring_attacks = (attacks & king_ring).num_ones() as i32;
                tracer.add(color, KingRingAttacks, piece.idx(), ring_attacks);
            }
            let file_features = match piece {
                Rook => Some((RookOpenFile, RookSemiOpenFile)),
                King => Some((KingOpenFile, KingSemiOpenFile)),
                _ => None,
            };
            if let Some((open, semi_open)) = file_features {
                match file_openness(pos, square.file(), color) {
                    FileOpenness::Open => tracer.add_single(color, open, 1),
                    FileOpenness::SemiOpen => tracer.add_single(color, semi_open, 1),
                    FileOpenness::Closed => {}
                }
            }
        }
    }
    if pos.colored_piece_bb(color, Bishop).num_ones() >= 2 {
        tracer.add_single(color, BishopPair, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvalResult;
    use crate::manifest::Layout;
    use crate::params::{Float, PhasedWeight};
    use cogs::START_FEN;

    const POSITIONS: [&str; 6] = [
        START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbqkb1r/pp1p1ppp/5n2/2pPp3/4P3/8/PPP2PPP/RNBQKBNR w KQkq e6 0 4",
        "4k3/p7/4b3/8/8/8/P7/2BK4 b - - 0 1",
        "1K1k4/1P6/8/8/8/8/r7/2R5 w - - 0 1",
    ];

    fn idx(feature: AltairFeature, offset: usize) -> usize {
        Layout::<AltairFeature>::new().offset(feature) + offset
    }

    fn linear_eval(weights: &Weights, res: &EvalResult) -> Float {
        weights
            .iter()
            .zip(res.coefficients.iter())
            .map(|(w, c)| {
                *c as Float * (res.phase * w.mg + (1.0 - res.phase) * res.endgame_scale * w.eg)
            })
            .sum()
    }

    #[test]
    fn alignment_test() {
        let num_weights = AltairEval::initial_parameters().len();
        assert_eq!(num_weights, 463);
        assert_eq!(num_weights, AltairEval::num_weights());
        let eval = AltairEval::builtin();
        for fen in POSITIONS {
            let res = eval.evaluate_fen(fen).unwrap();
            assert_eq!(res.coefficients.len(), num_weights, "{fen}");
        }
    }

    #[test]
    fn startpos_symmetry_test() {
        let eval = AltairEval::builtin();
        let res = eval.evaluate_fen(START_FEN).unwrap();
        for (i, c) in res.coefficients.iter().enumerate() {
            let expected = if i == idx(Tempo, 0) { 1 } else { 0 };
            assert_eq!(*c, expected, "coefficient {i}");
        }
        assert_eq!(res.score, TEMPO.mg() as Float);
        let res = eval
            .evaluate_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1")
            .unwrap();
        assert_eq!(res.coefficients[idx(Tempo, 0)], -1);
    }

    #[test]
    fn sign_test() {
        let eval = AltairEval::builtin();
        let res = eval
            .evaluate_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
            .unwrap();
        let c = &res.coefficients;
        assert_eq!(c[idx(PieceValues, Pawn.idx())], 1);
        assert_eq!(c[idx(PassedPawns, 1)], 1);
        assert_eq!(c[idx(IsolatedPawn, 0)], 1);
        assert_eq!(c[idx(KingSemiOpenFile, 0)], -1);
        assert_eq!(c[idx(KingOpenFile, 0)], 0);
        assert_eq!(c[idx(PieceSquareTables, 52)], 1);
        let res = eval
            .evaluate_fen("4k3/4p3/8/8/8/8/8/4K3 w - - 0 1")
            .unwrap();
        let c = &res.coefficients;
        assert_eq!(c[idx(PieceValues, Pawn.idx())], -1);
        assert_eq!(c[idx(PassedPawns, 1)], -1);
        assert_eq!(c[idx(IsolatedPawn, 0)], -1);
        assert_eq!(c[idx(KingSemiOpenFile, 0)], 1);
        assert_eq!(c[idx(PieceSquareTables, 52)], -1);
        assert_eq!(c[idx(Tempo, 0)], 1);
    }

    #[test]
    fn pieces_test() {
        let eval = AltairEval::builtin();
        // the white rook attacks the black knight on an open file, white has the bishop pair
        let res = eval
            .evaluate_fen("4k3/8/8/8/n7/8/8/R1BBK3 w - - 0 1")
            .unwrap();
        let c = &res.coefficients;
        assert_eq!(c[idx(RookOpenFile, 0)], 1);
        assert_eq!(c[idx(BishopPair, 0)], 1);
        assert_eq!(c[idx(PieceThreat, Rook.idx() * 6 + Knight.idx())], 1);
        // Rxa4 and Bxa4
        assert_eq!(c[idx(CaptureBonus, 0)], 2);
        // rook: a2, a3, a4, b1
        assert_eq!(c[idx(Mobility, Rook.idx())], 4);
        let res = eval
            .evaluate_fen("4k3/8/8/8/n7/8/8/R1BBK3 b - - 0 1")
            .unwrap();
        assert_eq!(res.coefficients[idx(CaptureBonus, 0)], 0);
    }

    #[test]
    fn pawn_structure_test() {
        let eval = AltairEval::builtin();
        // white has doubled pawns on the c file and a phalanx on d4/e4, black's pawn on d5 blocks the passers
        let res = eval
            .evaluate_fen("4k3/8/8/3p4/2PPP3/2P5/8/4K3 w - - 0 1")
            .unwrap();
        let c = &res.coefficients;
        assert_eq!(c[idx(DoubledPawn, 0)], 1);
        // c4-d4 and d4-e4, a black pawn on d5 doesn't matter
        assert_eq!(c[idx(PawnPhalanx, 3)], 2);
        // only the black pawn is isolated
        assert_eq!(c[idx(IsolatedPawn, 0)], -1);
        // black's d5 pawn stops c4, c3 and e4 from being passers, d5 itself is blocked by c4, d4 and e4
        assert_eq!(c[idx(PassedPawns, 3)], 0);
        assert_eq!(c[idx(PassedPawns, 2)], 0);
        assert_eq!(c[idx(PassedPawns, 4)], 0);
    }

    #[test]
    fn static_score_matches_linear_eval_test() {
        let weights = AltairEval::initial_parameters();
        let eval = AltairEval::builtin();
        for fen in POSITIONS {
            let res = eval.evaluate_fen(fen).unwrap();
            assert!(
                (linear_eval(&weights, &res) - res.score).abs() < 1e-6,
                "{fen}: {0} vs {1}",
                linear_eval(&weights, &res),
                res.score
            );
        }
    }

    fn weights_with_psqts() -> Weights {
        let mut weights = AltairEval::initial_parameters();
        let start = idx(PieceSquareTables, 0);
        for i in 0..NUM_CHESS_PIECES * NUM_SQUARES {
            let mg = ((i * 37) % 61) as Float - 30.0 + 0.25;
            let eg = ((i * 11) % 23) as Float - 11.5;
            weights[start + i] = PhasedWeight::new(mg, eg);
        }
        weights
    }

    #[test]
    fn rebalancing_preserves_linear_eval_test() {
        let weights = weights_with_psqts();
        let mut rebalanced = weights.clone();
        AltairEval::rebalance(&mut rebalanced);
        assert_ne!(weights, rebalanced);
        let eval = AltairEval::builtin();
        for fen in POSITIONS {
            let res = eval.evaluate_fen(fen).unwrap();
            let before = linear_eval(&weights, &res);
            let after = linear_eval(&rebalanced, &res);
            assert!((before - after).abs() < 1e-6, "{fen}: {before} vs {after}");
        }
        // the average of every non-king table is now zero
        for piece in PieceType::non_king_pieces() {
            let start = idx(PieceSquareTables, piece.idx() * NUM_SQUARES);
            let squares = if piece == Pawn { 8..56 } else { 0..64 };
            let sum: Float = squares.map(|sq| rebalanced[start + sq].mg).sum();
            assert!(sum.abs() < 1e-6, "{piece:?}");
        }
    }

    #[test]
    fn rebalancing_preserves_eval_test() {
        const FILE_BONUS: [Float; 8] = [-3.0, -2.0, -1.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let mut weights = AltairEval::initial_parameters();
        let start = idx(PieceSquareTables, 0);
        for piece in PieceType::iter() {
            for sq in 0..NUM_SQUARES {
                // integer averages, so rounding the rebalanced weights doesn't change anything
                let bonus = 5.0 * piece.idx() as Float + FILE_BONUS[sq % 8];
                weights[start + piece.idx() * NUM_SQUARES + sq] = PhasedWeight::new(bonus, -bonus);
            }
        }
        let mut rebalanced = weights.clone();
        AltairEval::rebalance(&mut rebalanced);
        let original = AltairEval::with_weights(&weights);
        let rebalanced = AltairEval::with_weights(&rebalanced);
        for fen in POSITIONS {
            let before = original.evaluate_fen(fen).unwrap().score;
            let after = rebalanced.evaluate_fen(fen).unwrap().score;
            assert!((before - after).abs() < 1e-6, "{fen}: {before} vs {after}");
        }
    }

    #[test]
    fn quiescent_eval_test() {
        let eval = AltairEval::builtin();
        let fen = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1";
        let static_eval = eval.evaluate_fen(fen).unwrap();
        let quiet_eval = eval.evaluate_fen_quiescent(fen).unwrap();
        assert_eq!(static_eval.coefficients[idx(PieceValues, Queen.idx())], -1);
        assert_eq!(quiet_eval.coefficients[idx(PieceValues, Queen.idx())], 0);
        assert!(quiet_eval.score > static_eval.score);
    }

    #[test]
    fn print_parameters_test() {
        let printed = AltairEval::print_parameters(&AltairEval::initial_parameters());
        let mut expected_order = vec![];
        for feature in AltairFeature::iter() {
            let name = feature.name();
            let decl = match feature.storage() {
                Storage::Packed => format!("const {name}:"),
                Storage::Split => format!("const {name}_MID:"),
            };
            let pos = printed.find(&decl);
            assert!(pos.is_some(), "{decl} is missing");
            expected_order.push(pos);
        }
        assert!(expected_order.windows(2).all(|w| w[0] < w[1]));
        assert!(printed.contains("const PIECE_SQUARE_TABLES_END: [[i32; 64]; 6] = ["));
        assert!(printed.contains("    // knight\n"));
        assert!(printed.contains("const TEMPO: PackedScore = S(  26,   25);"));
        assert!(printed.contains("const MOBILITY_MID: [i32; 6] = [\n        0,     6,     3,     2,     1,     0,\n];"));
    }
}
