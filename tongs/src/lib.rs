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

//! Tunes the weights of hand-crafted evaluation functions by minimizing the error between their predicted
//! win rate and the outcome of the game each position was taken from.
//!
//! Each evaluation function declares its features in a [`manifest::FeatureSubSet`] and reports every term it
//! scores to a [`trace::Tracer`]. Because every term is a weight times a feature count, the gradient of the loss
//! can be computed directly from the recorded counts, see [`gd`].

use crate::config::TunerConfig;
use crate::error::{Res, TuneError};
use crate::eval::chess::altair_eval::AltairEval;
use crate::eval::chess::material_only_eval::MaterialEval;
use crate::eval::Evaluator;
use crate::gd::{optimize, TuneResult};
use crate::load_data::{Dataset, DatasetLoader};
use clap::ValueEnum;
use log::{debug, info};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt::{Display, Formatter};
use std::path::Path;

pub mod config;
pub mod error;
pub mod eval;
pub mod gd;
pub mod load_data;
pub mod manifest;
pub mod packed;
pub mod params;
pub mod trace;

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum EvalKind {
    /// Only piece values
    Material,
    #[default]
    Altair,
}

impl Display for EvalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalKind::Material => write!(f, "{}", MaterialEval::NAME),
            EvalKind::Altair => write!(f, "{}", AltairEval::NAME),
        }
    }
}

#[derive(Debug)]
pub struct Tuned {
    pub eval_name: &'static str,
    pub num_positions: usize,
    pub result: TuneResult,
    /// The tuned weights in the format of the evaluation function's constants.
    pub formatted: String,
}

fn build_pool(config: &TunerConfig) -> Res<ThreadPool> {
    config.validate()?;
    Ok(ThreadPoolBuilder::new()
        .num_threads(config.thread_count)
        .build()?)
}

fn tune_with<E: Evaluator>(
    config: &TunerConfig,
    load: impl FnOnce(&DatasetLoader<E>) -> Res<Dataset>,
) -> Res<Tuned> {
    #[cfg(debug_assertions)]
    log::warn!("Running in debug mode. Run in release mode for increased performance.");
    let pool = build_pool(config)?;
    info!(
        "Tuning the {0} eval with {1} weights on {2} threads",
        E::NAME,
        E::num_weights(),
        config.thread_count
    );
    let dataset = load(&DatasetLoader::new(config, &pool))?;
    if dataset.is_empty() {
        return Err(TuneError::EmptyDataset);
    }
    let initial = E::initial_parameters();
    let result = optimize(&dataset, &initial, config, &pool, |epoch, weights| {
        debug!(
            "Weights after {epoch} epochs:\n{}",
            E::print_parameters(weights)
        )
    });
    info!(
        "Finished after {0} epochs, loss: {1}",
        result.losses.len(),
        result.final_loss
    );
    Ok(Tuned {
        eval_name: E::NAME,
        num_positions: dataset.len(),
        formatted: E::print_parameters(&result.weights),
        result,
    })
}

/// Loads every file, then tunes `E` on the union of all positions.
pub fn tune<E: Evaluator>(files: &[impl AsRef<Path>], config: &TunerConfig) -> Res<Tuned> {
    tune_with::<E>(config, |loader| loader.load_from_files(files))
}

pub fn tune_from_str<E: Evaluator>(annotated_fens: &str, config: &TunerConfig) -> Res<Tuned> {
    tune_with::<E>(config, |loader| loader.load_from_str(annotated_fens))
}

pub fn run(kind: EvalKind, files: &[impl AsRef<Path>], config: &TunerConfig) -> Res<Tuned> {
    match kind {
        EvalKind::Material => tune::<MaterialEval>(files, config),
        EvalKind::Altair => tune::<AltairEval>(files, config),
    }
}
