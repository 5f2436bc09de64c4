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

//! The parameter vector that gets tuned and the coefficient vector that describes a single position.
//!
//! Both are only ever built by walking a feature manifest in order, see [`crate::manifest`].
//! The `push_*` functions come in pairs so that every shape has one function for each side.

use crate::packed::PackedScore;
use derive_more::{Add, AddAssign, Deref, DerefMut, Div, Mul, Neg, Sub, SubAssign};
use std::fmt::{Display, Formatter};
use strum_macros::EnumIter;

pub type Float = f64;

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumIter)]
pub enum PhaseType {
    Mg,
    Eg,
}

/// One tunable `(mg, eg)` pair.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Add, AddAssign, Sub, SubAssign, Mul, Div, Neg,
)]
pub struct PhasedWeight {
    pub mg: Float,
    pub eg: Float,
}

impl PhasedWeight {
    pub fn new(mg: Float, eg: Float) -> Self {
        Self { mg, eg }
    }

    pub fn splat(value: Float) -> Self {
        Self::new(value, value)
    }

    pub fn get(self, phase: PhaseType) -> Float {
        match phase {
            PhaseType::Mg => self.mg,
            PhaseType::Eg => self.eg,
        }
    }

    pub fn get_mut(&mut self, phase: PhaseType) -> &mut Float {
        match phase {
            PhaseType::Mg => &mut self.mg,
            PhaseType::Eg => &mut self.eg,
        }
    }

    pub fn map(self, f: impl Fn(Float) -> Float) -> Self {
        Self::new(f(self.mg), f(self.eg))
    }

    pub fn zip_with(self, other: Self, f: impl Fn(Float, Float) -> Float) -> Self {
        Self::new(f(self.mg, other.mg), f(self.eg, other.eg))
    }

    /// Rounds both halves to the nearest integer that fits into a [`PackedScore`].
    pub fn rounded(self) -> PackedScore {
        let round = |x: Float| x.round().clamp(i16::MIN as Float, i16::MAX as Float) as i16;
        PackedScore::new(round(self.mg), round(self.eg))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deref, DerefMut)]
pub struct Weights(pub Vec<PhasedWeight>);

pub type Gradient = Weights;

impl Weights {
    pub fn zeroed(num_weights: usize) -> Self {
        Self(vec![PhasedWeight::default(); num_weights])
    }

    pub fn add_scaled(&mut self, other: &Self, factor: Float) {
        debug_assert_eq!(self.len(), other.len());
        for (w, rhs) in self.iter_mut().zip(other.iter()) {
            *w += *rhs * factor;
        }
    }
}

impl Display for Weights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, w) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({0:.2}, {1:.2})", w.mg, w.eg)?;
        }
        write!(f, "]")
    }
}

/// White count minus black count for every weight, in manifest order.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deref, DerefMut)]
pub struct Coefficients(pub Vec<i16>);

/// A built-in evaluation constant before it has been turned into a [`PhasedWeight`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InitialValue {
    Tapered(PackedScore),
    /// Used for both phases.
    Untapered(i32),
}

impl From<PackedScore> for InitialValue {
    fn from(value: PackedScore) -> Self {
        Self::Tapered(value)
    }
}

impl From<i32> for InitialValue {
    fn from(value: i32) -> Self {
        Self::Untapered(value)
    }
}

impl From<InitialValue> for PhasedWeight {
    fn from(value: InitialValue) -> Self {
        match value {
            InitialValue::Tapered(score) => {
                PhasedWeight::new(score.mg() as Float, score.eg() as Float)
            }
            InitialValue::Untapered(value) => PhasedWeight::splat(value as Float),
        }
    }
}

pub fn push_initial_parameter(params: &mut Weights, value: impl Into<InitialValue>) {
    params.push(value.into().into());
}

pub fn push_initial_parameter_array<T: Copy + Into<InitialValue>>(
    params: &mut Weights,
    values: &[T],
) {
    for value in values {
        push_initial_parameter(params, *value);
    }
}

pub fn push_initial_parameter_array_2d<T: Copy + Into<InitialValue>, const N: usize>(
    params: &mut Weights,
    values: &[[T; N]],
) {
    for row in values {
        push_initial_parameter_array(params, row);
    }
}

/// For evaluation functions that store the midgame and endgame constants in separate arrays.
pub fn push_initial_parameter_double(params: &mut Weights, mg: i32, eg: i32) {
    params.push(PhasedWeight::new(mg as Float, eg as Float));
}

pub fn push_initial_parameter_double_array(params: &mut Weights, mg: &[i32], eg: &[i32]) {
    assert_eq!(mg.len(), eg.len());
    for (mg, eg) in mg.iter().zip(eg.iter()) {
        push_initial_parameter_double(params, *mg, *eg);
    }
}

pub fn push_initial_parameter_double_array_2d<const N: usize>(
    params: &mut Weights,
    mg: &[[i32; N]],
    eg: &[[i32; N]],
) {
    assert_eq!(mg.len(), eg.len());
    for (mg, eg) in mg.iter().zip(eg.iter()) {
        push_initial_parameter_double_array(params, mg, eg);
    }
}

fn to_coefficient(count: i32) -> i16 {
    debug_assert!(
        i16::try_from(count).is_ok(),
        "coefficient {count} doesn't fit into an i16"
    );
    count.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// `counts` is indexed by color, white first.
pub fn push_coefficient(coefficients: &mut Coefficients, counts: [i32; 2]) {
    coefficients.push(to_coefficient(counts[0] - counts[1]));
}

pub fn push_coefficient_array(coefficients: &mut Coefficients, counts: &[[i32; 2]]) {
    for c in counts {
        push_coefficient(coefficients, *c);
    }
}

/// `counts` is a row-major flattened 2D array with rows of length `row_len`.
pub fn push_coefficient_array_2d(
    coefficients: &mut Coefficients,
    counts: &[[i32; 2]],
    row_len: usize,
) {
    debug_assert_eq!(counts.len() % row_len, 0);
    for row in counts.chunks_exact(row_len) {
        push_coefficient_array(coefficients, row);
    }
}
