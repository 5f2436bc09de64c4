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

use cogs::FenError;
use std::path::PathBuf;
use thiserror::Error;

pub type Res<T> = Result<T, TuneError>;

/// A single line of a dataset couldn't be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing game outcome")]
    MissingOutcome,
    #[error("'{0}' is not a valid game outcome, expected '1-0', '0-1', '1/2-1/2' or a number between 0 and 1")]
    InvalidOutcome(String),
    #[error("unexpected '{0}' after the game outcome")]
    TrailingInput(String),
    #[error(transparent)]
    Fen(#[from] FenError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("the thread count must be at least 1")]
    NoThreads,
    #[error("the scaling constant must not be negative, but it's {0}")]
    NegativeScalingConstant(f64),
    #[error("the maximum number of epochs must be at least 1")]
    NoEpochs,
    #[error("the learning rate must be positive, but it's {0}")]
    NonPositiveLearningRate(f64),
    #[error("the learning rate drop ratio must be positive, but it's {0}")]
    NonPositiveDropRatio(f64),
    #[error("the convergence threshold must not be negative, but it's {0}")]
    NegativeConvergenceThreshold(f64),
}

#[derive(Debug, Error)]
pub enum TuneError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("couldn't parse the config file '{path}': {source}")]
    ConfigFile {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("error in line {line}: couldn't parse '{record}': {source}")]
    Record {
        line: usize,
        record: String,
        source: RecordError,
    },
    #[error("the dataset doesn't contain any positions")]
    EmptyDataset,
    #[error("couldn't build the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("couldn't read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
