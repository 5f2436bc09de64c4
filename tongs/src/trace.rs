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

//! A trace records how often each feature occurred for each side while evaluating a position.
//!
//! Evaluation functions never touch the trace directly. Instead, they report every decision to a [`Tracer`],
//! which adds the weight to the running score and increments the trace at the same time. This makes it
//! impossible to score a feature without tracing it.

use crate::eval::EvalResult;
use crate::manifest::{EvalParams, FeatureSubSet, Layout, Shape};
use crate::packed::PackedScore;
use crate::params::{
    push_coefficient, push_coefficient_array, push_coefficient_array_2d, Coefficients, Float,
    PhaseType,
};
use cogs::pieces::MAX_PHASE;
use cogs::Color;
use strum::IntoEnumIterator;

/// Dense `[white, black]` counts for every weight, in manifest order.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Trace {
    counts: Vec<[i32; 2]>,
}

impl Trace {
    pub fn new(num_weights: usize) -> Self {
        Self {
            counts: vec![[0; 2]; num_weights],
        }
    }

    pub fn increment(&mut self, idx: usize, color: Color, count: i32) {
        self.counts[idx][color.idx()] += count;
    }

    pub fn counts(&self, idx: usize) -> [i32; 2] {
        self.counts[idx]
    }

    /// Flattens the trace into white minus black counts.
    pub fn coefficients<F: FeatureSubSet>(&self, layout: &Layout<F>) -> Coefficients {
        debug_assert_eq!(self.counts.len(), layout.num_weights());
        let mut res = Coefficients(Vec::with_capacity(self.counts.len()));
        for feature in F::iter() {
            let counts = &self.counts[layout.range(feature)];
            match feature.shape() {
                Shape::Single => push_coefficient(&mut res, counts[0]),
                Shape::Array(_) => push_coefficient_array(&mut res, counts),
                Shape::Array2d(_, cols) => push_coefficient_array_2d(&mut res, counts, cols),
            }
        }
        res
    }
}

pub struct Tracer<'a, F: FeatureSubSet> {
    params: &'a EvalParams<F>,
    trace: Trace,
    scores: [PackedScore; 2],
    phase: usize,
    endgame_scale: Float,
}

impl<'a, F: FeatureSubSet> Tracer<'a, F> {
    pub fn new(params: &'a EvalParams<F>) -> Self {
        Self {
            params,
            trace: Trace::new(params.layout().num_weights()),
            scores: [PackedScore::default(); 2],
            phase: MAX_PHASE,
            endgame_scale: 1.0,
        }
    }

    pub fn params(&self) -> &EvalParams<F> {
        self.params
    }

    /// Scores `count` occurrences of entry `idx` of `feature` for `color` and records them.
    pub fn add(&mut self, color: Color, feature: F, idx: usize, count: i32) {
        if count == 0 {
            return;
        }
        self.scores[color.idx()] += self.params.get(feature, idx) * count;
        let offset = self.params.layout().offset(feature);
        self.trace.increment(offset + idx, color, count);
    }

    pub fn add_single(&mut self, color: Color, feature: F, count: i32) {
        self.add(color, feature, 0, count);
    }

    pub fn add_2d(&mut self, color: Color, feature: F, row: usize, col: usize, count: i32) {
        let Shape::Array2d(rows, cols) = feature.shape() else {
            panic!("{feature:?} is not a 2D feature");
        };
        debug_assert!(row < rows && col < cols);
        self.add(color, feature, row * cols + col, count);
    }

    pub fn set_phase(&mut self, phase: usize) {
        self.phase = phase.min(MAX_PHASE);
    }

    pub fn set_endgame_scale(&mut self, scale: Float) {
        debug_assert!((0.0..=1.0).contains(&scale));
        self.endgame_scale = scale;
    }

    pub fn score(&self, color: Color) -> PackedScore {
        self.scores[color.idx()]
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The tapered score from white's perspective, with the endgame half scaled down in drawish positions.
    pub fn tapered_score(&self) -> Float {
        let score = self.score(Color::White) - self.score(Color::Black);
        let phase = self.phase as Float / MAX_PHASE as Float;
        PhaseType::iter()
            .map(|p| match p {
                PhaseType::Mg => phase * score.mg() as Float,
                PhaseType::Eg => (1.0 - phase) * self.endgame_scale * score.eg() as Float,
            })
            .sum()
    }

    pub fn finish(self) -> EvalResult {
        EvalResult {
            score: self.tapered_score(),
            coefficients: self.trace.coefficients(self.params.layout()),
            endgame_scale: self.endgame_scale,
            phase: self.phase as Float / MAX_PHASE as Float,
        }
    }
}
