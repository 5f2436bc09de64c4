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

use crate::manifest::{EvalParams, FeatureSubSet, Layout, Shape, Storage};
use crate::params::{Coefficients, Float, PhaseType, PhasedWeight, Weights};
use crate::trace::Tracer;
use cogs::{Board, FenError};
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use strum::IntoEnumIterator;

pub mod chess;

/// Everything the tuner needs to know about one evaluated position.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    pub coefficients: Coefficients,
    /// The static evaluation from white's perspective, in centipawns.
    pub score: Float,
    /// Multiplies the endgame half of the score, `1.0` for positions that aren't drawish.
    pub endgame_scale: Float,
    /// `1.0` in the opening, `0.0` with only pawns and kings left.
    pub phase: Float,
}

/// An evaluation function that can be tuned.
///
/// Implementations describe their features with a [`FeatureSubSet`] enum and report every scoring decision
/// to a [`Tracer`]. Everything else, from building the initial parameters to printing the result, is derived
/// from the manifest.
pub trait Evaluator: Sized + Send + Sync {
    type Feature: FeatureSubSet;

    type Board: Board;

    const NAME: &'static str;

    /// Set when the evaluation contains terms that aren't traced.
    /// The difference between the static score and the linear evaluation is then kept as a constant
    /// offset for each position instead of being reported as a mismatch.
    const INCLUDES_ADDITIONAL_SCORE: bool = false;

    fn new(params: EvalParams<Self::Feature>) -> Self;

    fn params(&self) -> &EvalParams<Self::Feature>;

    /// Appends the built-in values of `feature`, which must be exactly `feature.num_features()` weights.
    fn push_initial_values(feature: Self::Feature, weights: &mut Weights);

    fn eval_and_trace(&self, pos: &Self::Board, tracer: &mut Tracer<Self::Feature>);

    /// Shifts weight between linearly redundant features before printing. Must not change any evaluation.
    fn rebalance(_weights: &mut Weights) {}

    fn num_weights() -> usize {
        Self::Feature::total_num_features()
    }

    fn layout() -> Layout<Self::Feature> {
        Layout::new()
    }

    fn initial_parameters() -> Weights {
        let mut weights = Weights(Vec::with_capacity(Self::num_weights()));
        for feature in Self::Feature::iter() {
            let before = weights.len();
            Self::push_initial_values(feature, &mut weights);
            assert_eq!(
                weights.len() - before,
                feature.num_features(),
                "wrong number of initial values for {feature:?}"
            );
        }
        weights
    }

    fn builtin() -> Self {
        Self::with_weights(&Self::initial_parameters())
    }

    fn with_weights(weights: &Weights) -> Self {
        Self::new(EvalParams::from_weights(weights))
    }

    fn evaluate(&self, pos: &Self::Board) -> EvalResult {
        let mut tracer = Tracer::new(self.params());
        self.eval_and_trace(pos, &mut tracer);
        tracer.finish()
    }

    fn evaluate_fen(&self, fen: &str) -> Result<EvalResult, FenError> {
        let pos = Self::Board::from_fen(fen)?;
        Ok(self.evaluate(&pos))
    }

    /// Like [`Self::evaluate_fen`], but resolves all captures first.
    fn evaluate_fen_quiescent(&self, fen: &str) -> Result<EvalResult, FenError> {
        let pos = Self::Board::from_fen(fen)?.quiesce();
        Ok(self.evaluate(&pos))
    }

    fn print_parameters(weights: &Weights) -> String {
        let mut weights = weights.clone();
        Self::rebalance(&mut weights);
        FormatWeights::<Self::Feature>::new(&weights).to_string()
    }
}

/// Displays weights in the same shape the evaluation function declares its constants.
pub struct FormatWeights<'a, F: FeatureSubSet> {
    weights: &'a Weights,
    _phantom: PhantomData<F>,
}

impl<'a, F: FeatureSubSet> FormatWeights<'a, F> {
    pub fn new(weights: &'a Weights) -> Self {
        Self {
            weights,
            _phantom: PhantomData,
        }
    }
}

impl<F: FeatureSubSet> Display for FormatWeights<'_, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let layout = Layout::<F>::new();
        assert_eq!(self.weights.len(), layout.num_weights());
        for (i, feature) in F::iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_feature(f, feature, &self.weights[layout.range(feature)])?;
        }
        Ok(())
    }
}

const TAB: &str = "    ";

const VALUES_PER_LINE: usize = 8;

fn write_rows(f: &mut Formatter<'_>, cells: &[String], indent: &str) -> std::fmt::Result {
    for line in cells.chunks(VALUES_PER_LINE) {
        writeln!(f, "{indent}{},", line.join(", "))?;
    }
    Ok(())
}

fn write_array_2d(
    f: &mut Formatter<'_>,
    feature: impl FeatureSubSet,
    cells: &[String],
    cols: usize,
) -> std::fmt::Result {
    for (row, values) in cells.chunks(cols).enumerate() {
        if let Some(name) = feature.row_name(row) {
            writeln!(f, "{TAB}// {name}")?;
        }
        if cols <= VALUES_PER_LINE {
            writeln!(f, "{TAB}[{}],", values.join(", "))?;
        } else {
            writeln!(f, "{TAB}[")?;
            write_rows(f, values, &TAB.repeat(2))?;
            writeln!(f, "{TAB}],")?;
        }
    }
    Ok(())
}

fn write_feature(
    f: &mut Formatter<'_>,
    feature: impl FeatureSubSet,
    weights: &[PhasedWeight],
) -> std::fmt::Result {
    let name = feature.name();
    match feature.storage() {
        Storage::Packed => {
            let cells: Vec<String> = weights.iter().map(|w| w.rounded().to_string()).collect();
            write_declaration(f, feature, name, "PackedScore", &cells)
        }
        Storage::Split => {
            for (phase, suffix) in PhaseType::iter().zip(["MID", "END"]) {
                let cells: Vec<String> = weights
                    .iter()
                    .map(|w| format!("{:5}", w.get(phase).round() as i32))
                    .collect();
                write_declaration(f, feature, &format!("{name}_{suffix}"), "i32", &cells)?;
            }
            Ok(())
        }
    }
}

fn write_declaration(
    f: &mut Formatter<'_>,
    feature: impl FeatureSubSet,
    name: &str,
    typ: &str,
    cells: &[String],
) -> std::fmt::Result {
    match feature.shape() {
        Shape::Single => writeln!(f, "const {name}: {typ} = {};", cells[0].trim_start()),
        Shape::Array(n) => {
            writeln!(f, "const {name}: [{typ}; {n}] = [")?;
            write_rows(f, cells, TAB)?;
            writeln!(f, "];")
        }
        Shape::Array2d(rows, cols) => {
            writeln!(f, "#[rustfmt::skip]")?;
            writeln!(f, "const {name}: [[{typ}; {cols}]; {rows}] = [")?;
            write_array_2d(f, feature, cells, cols)?;
            writeln!(f, "];")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::tests::ToyFeature;

    #[test]
    fn format_weights_test() {
        let weights = Weights(
            (0..12)
                .map(|i| PhasedWeight::new(i as Float, -2.0 * i as Float))
                .collect(),
        );
        let formatted = FormatWeights::<ToyFeature>::new(&weights).to_string();
        let expected = "const MATERIAL: [PackedScore; 3] = [
    S(   0,    0), S(   1,   -2), S(   2,   -4),
];

#[rustfmt::skip]
const TABLE_MID: [[i32; 4]; 2] = [
    [    3,     4,     5,     6],
    [    7,     8,     9,    10],
];
#[rustfmt::skip]
const TABLE_END: [[i32; 4]; 2] = [
    [   -6,    -8,   -10,   -12],
    [  -14,   -16,   -18,   -20],
];

const BONUS: PackedScore = S(  11,  -22);
";
        assert_eq!(formatted, expected);
    }
}
