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

use crate::error::{ConfigError, Res, TuneError};
use crate::params::Float;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Adam,
    /// Plain gradient descent with a fixed step size
    Sgd,
}

impl Display for OptimizerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizerKind::Adam => write!(f, "adam"),
            OptimizerKind::Sgd => write!(f, "sgd"),
        }
    }
}

/// Everything that influences a tuning run. Missing fields in a config file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunerConfig {
    pub thread_count: usize,
    /// The `K` in `sigmoid(K * eval / 400)`. `0` means it is fitted to the dataset.
    pub scaling_constant: Float,
    /// Start from all zero weights instead of the built-in values of the evaluation function.
    pub retune_from_zero: bool,
    pub max_epoch: usize,
    /// Resolve captures before evaluating each position.
    pub enable_quiescence_search: bool,
    pub print_data_entries: bool,
    /// Log the loading progress every this many positions, `0` disables it.
    pub data_load_print_interval: usize,
    pub learning_rate: Float,
    /// Divide the learning rate by `lr_drop_ratio` every this many epochs, `0` disables it.
    pub lr_drop_interval: usize,
    pub lr_drop_ratio: Float,
    /// Stop once the loss improves by less than this between two epochs, `0` disables it.
    pub convergence_threshold: Float,
    /// Re-fit a fitted scaling constant every this many epochs, `0` disables it.
    pub k_refit_interval: usize,
    pub print_interval: usize,
    pub optimizer: OptimizerKind,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            thread_count: 8,
            scaling_constant: 0.0,
            retune_from_zero: false,
            max_epoch: 5000,
            enable_quiescence_search: false,
            print_data_entries: false,
            data_load_print_interval: 10_000,
            learning_rate: 1.0,
            lr_drop_interval: 0,
            lr_drop_ratio: 1.0,
            convergence_threshold: 0.0,
            k_refit_interval: 0,
            print_interval: 100,
            optimizer: OptimizerKind::Adam,
        }
    }
}

impl TunerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Res<Self> {
        let json = fs::read_to_string(path).map_err(|source| TuneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| TuneError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json(&self) -> String {
        // a struct of plain numbers and enums always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_count == 0 {
            return Err(ConfigError::NoThreads);
        }
        if self.scaling_constant < 0.0 || self.scaling_constant.is_nan() {
            return Err(ConfigError::NegativeScalingConstant(self.scaling_constant));
        }
        if self.max_epoch == 0 {
            return Err(ConfigError::NoEpochs);
        }
        if self.learning_rate <= 0.0 || self.learning_rate.is_nan() {
            return Err(ConfigError::NonPositiveLearningRate(self.learning_rate));
        }
        if self.lr_drop_ratio <= 0.0 || self.lr_drop_ratio.is_nan() {
            return Err(ConfigError::NonPositiveDropRatio(self.lr_drop_ratio));
        }
        if self.convergence_threshold < 0.0 || self.convergence_threshold.is_nan() {
            return Err(ConfigError::NegativeConvergenceThreshold(
                self.convergence_threshold,
            ));
        }
        Ok(())
    }
}
