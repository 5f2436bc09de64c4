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

//! A simple material-only eval that tunes piece weights.

use crate::eval::Evaluator;
use crate::manifest::{EvalParams, FeatureSubSet, Shape};
use crate::packed::{s, PackedScore};
use crate::params::{push_initial_parameter_array, Weights};
use crate::trace::Tracer;
use cogs::pieces::{PieceType, NUM_CHESS_PIECES};
use cogs::{Chessboard, Color};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Classical piece values, the same in both phases.
pub const PIECE_VALUES: [PackedScore; NUM_CHESS_PIECES - 1] = [
    s(100, 100),
    s(300, 300),
    s(300, 300),
    s(500, 500),
    s(900, 900),
];

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumIter)]
pub enum MaterialFeature {
    PieceValues,
}

impl FeatureSubSet for MaterialFeature {
    fn ordinal(self) -> usize {
        self as usize
    }

    fn shape(self) -> Shape {
        Shape::Array(NUM_CHESS_PIECES - 1)
    }

    fn name(self) -> &'static str {
        "PIECE_VALUES"
    }
}

#[derive(Debug)]
pub struct MaterialEval {
    params: EvalParams<MaterialFeature>,
}

impl Evaluator for MaterialEval {
    type Feature = MaterialFeature;
    type Board = Chessboard;
    const NAME: &'static str = "material";

    fn new(params: EvalParams<MaterialFeature>) -> Self {
        Self { params }
    }

    fn params(&self) -> &EvalParams<MaterialFeature> {
        &self.params
    }

    fn push_initial_values(feature: MaterialFeature, weights: &mut Weights) {
        match feature {
            MaterialFeature::PieceValues => push_initial_parameter_array(weights, &PIECE_VALUES),
        }
    }

    fn eval_and_trace(&self, pos: &Chessboard, tracer: &mut Tracer<MaterialFeature>) {
        tracer.set_phase(pos.phase());
        for color in Color::iter() {
            for piece in PieceType::non_king_pieces() {
                let num_pieces = pos.colored_piece_bb(color, piece).num_ones() as i32;
                tracer.add(color, MaterialFeature::PieceValues, piece.idx(), num_pieces);
            }
        }
    }
}
