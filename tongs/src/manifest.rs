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

//! The feature manifest: one ordered list of every tunable feature of an evaluation function.
//!
//! The initial parameters, the coefficients of each position, the conversion back into evaluation
//! parameters and the printed output are all produced by iterating over the manifest, so they can't disagree
//! about which index belongs to which feature.

use crate::packed::PackedScore;
use crate::params::Weights;
use std::fmt::Debug;
use std::marker::PhantomData;
use strum::IntoEnumIterator;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Shape {
    Single,
    Array(usize),
    /// `(rows, columns)`, stored row-major.
    Array2d(usize, usize),
}

impl Shape {
    pub fn len(self) -> usize {
        match self {
            Shape::Single => 1,
            Shape::Array(n) => n,
            Shape::Array2d(rows, cols) => rows * cols,
        }
    }

    pub fn row_len(self) -> usize {
        match self {
            Shape::Single => 1,
            Shape::Array(n) => n,
            Shape::Array2d(_, cols) => cols,
        }
    }
}

/// How the evaluation function declares the constants of a feature.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Storage {
    /// A single array of [`PackedScore`]s.
    Packed,
    /// Two arrays, `NAME_MID` and `NAME_END`.
    Split,
}

/// Implemented by an enum listing all features of an evaluation function in declaration order.
pub trait FeatureSubSet: Debug + Copy + Eq + Send + Sync + IntoEnumIterator + 'static {
    /// The position of this variant in the enum, `self as usize`.
    fn ordinal(self) -> usize;

    fn shape(self) -> Shape;

    /// The name of the constant in the printed output, e.g. `PIECE_VALUES`.
    fn name(self) -> &'static str;

    fn storage(self) -> Storage {
        Storage::Packed
    }

    /// An optional comment printed in front of each row of a 2D feature.
    fn row_name(self, _row: usize) -> Option<&'static str> {
        None
    }

    fn num_features(self) -> usize {
        self.shape().len()
    }

    fn start_idx(self) -> usize {
        Self::iter()
            .take_while(|x| *x != self)
            .map(|x| x.num_features())
            .sum()
    }

    fn total_num_features() -> usize {
        Self::iter().map(|f| f.num_features()).sum()
    }
}

/// Precomputed start indices of all features, so that the hot evaluation loop doesn't have to call
/// [`FeatureSubSet::start_idx`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Layout<F: FeatureSubSet> {
    offsets: Vec<usize>,
    total: usize,
    _phantom: PhantomData<F>,
}

impl<F: FeatureSubSet> Default for Layout<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FeatureSubSet> Layout<F> {
    pub fn new() -> Self {
        let mut offsets = vec![];
        let mut total = 0;
        for (i, feature) in F::iter().enumerate() {
            assert_eq!(i, feature.ordinal(), "wrong ordinal for {feature:?}");
            offsets.push(total);
            total += feature.num_features();
        }
        Self {
            offsets,
            total,
            _phantom: PhantomData,
        }
    }

    pub fn offset(&self, feature: F) -> usize {
        self.offsets[feature.ordinal()]
    }

    pub fn range(&self, feature: F) -> std::ops::Range<usize> {
        let start = self.offset(feature);
        start..start + feature.num_features()
    }

    pub fn num_weights(&self) -> usize {
        self.total
    }
}

/// The integer weights an evaluation function actually uses, indexed by feature.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EvalParams<F: FeatureSubSet> {
    values: Vec<PackedScore>,
    layout: Layout<F>,
}

impl<F: FeatureSubSet> EvalParams<F> {
    /// Rounds every weight to the nearest integer.
    pub fn from_weights(weights: &Weights) -> Self {
        let layout = Layout::new();
        assert_eq!(
            weights.len(),
            layout.num_weights(),
            "the number of weights doesn't match the feature manifest"
        );
        let values = weights.iter().map(|w| w.rounded()).collect();
        Self { values, layout }
    }

    pub fn layout(&self) -> &Layout<F> {
        &self.layout
    }

    pub fn single(&self, feature: F) -> PackedScore {
        self.get(feature, 0)
    }

    pub fn get(&self, feature: F, idx: usize) -> PackedScore {
        debug_assert!(idx < feature.num_features(), "{feature:?}[{idx}]");
        self.values[self.layout.offset(feature) + idx]
    }

    pub fn get_2d(&self, feature: F, row: usize, col: usize) -> PackedScore {
        self.get(feature, row * feature.shape().row_len() + col)
    }
}
