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

//! Gradient descent on the mean squared error between predicted win rates and game outcomes.

use crate::config::{OptimizerKind, TunerConfig};
use crate::load_data::{Dataset, Entry};
use crate::params::{Float, Gradient, PhasedWeight, Weights};
use derive_more::Display;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fmt::Formatter;

/// The result of calling the eval function.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub struct CpScore(pub Float);

impl std::fmt::Display for CpScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}cp", self.0)
    }
}

/// The wr prediction, based on the CpScore (between 0 and 1).
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub struct WrScore(Float);

/// `WrScore` is used for the converted score returned by the eval, `Outcome` for the actual outcome
pub type Outcome = WrScore;

impl WrScore {
    pub fn new(val: Float) -> Self {
        assert!((0.0..=1.0).contains(&val));
        Self(val)
    }

    pub fn get(self) -> Float {
        self.0
    }
}

impl std::fmt::Display for WrScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// K, which stretches the sigmoid horizontally. A smaller K means that a larger eval is necessary
/// to count as "surely won/lost".
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Display)]
pub struct ScalingFactor(pub Float);

/// Used when fitting K goes wrong, which can happen for degenerate datasets.
pub const FALLBACK_SCALING_FACTOR: ScalingFactor = ScalingFactor(2.5);

pub fn sigmoid(x: Float) -> Float {
    1.0 / (1.0 + (-x).exp())
}

pub fn cp_to_wr(cp: CpScore, k: ScalingFactor) -> WrScore {
    WrScore(sigmoid(k.0 * cp.0 / 400.0))
}

pub fn sample_loss(wr_prediction: WrScore, outcome: Outcome) -> Float {
    let delta = wr_prediction.0 - outcome.0;
    delta * delta
}

/// The tapered dot product of the weights and the coefficients of an entry, not including its additional score.
pub fn linear_eval(weights: &Weights, entry: &Entry) -> CpScore {
    let sum = entry
        .coefficients
        .iter()
        .fold(PhasedWeight::default(), |acc, c| {
            acc + weights[c.index as usize] * c.value as Float
        });
    CpScore(entry.phase * sum.mg + (1.0 - entry.phase) * entry.endgame_scale * sum.eg)
}

/// The eval the prediction is based on.
pub fn cp_eval_for_weights(weights: &Weights, entry: &Entry) -> CpScore {
    CpScore(linear_eval(weights, entry).0 + entry.additional_score)
}

pub fn wr_prediction_for_weights(weights: &Weights, entry: &Entry, k: ScalingFactor) -> WrScore {
    cp_to_wr(cp_eval_for_weights(weights, entry), k)
}

/// One contiguous shard per thread of the pool.
fn shard_size(dataset: &Dataset, pool: &ThreadPool) -> usize {
    dataset.len().div_ceil(pool.current_num_threads()).max(1)
}

pub fn loss(weights: &Weights, dataset: &Dataset, k: ScalingFactor, pool: &ThreadPool) -> Float {
    let shard_size = shard_size(dataset, pool);
    let partial_sums: Vec<Float> = pool.install(|| {
        dataset
            .entries()
            .par_chunks(shard_size)
            .map(|shard| {
                shard
                    .iter()
                    .map(|entry| {
                        sample_loss(wr_prediction_for_weights(weights, entry, k), entry.outcome)
                    })
                    .sum::<Float>()
            })
            .collect()
    });
    // summed in shard order so that the result doesn't depend on scheduling
    partial_sums.into_iter().sum::<Float>() / dataset.len() as Float
}

/// Computes the loss and its gradient:
/// The loss of a single sample is `(sigmoid(K * eval / 400) - outcome) ^ 2`,
/// so per the chain rule, the derivative with respect to the eval is
/// `2 * K / 400 * (prediction - outcome) * prediction * (1 - prediction)`.
/// The eval is linear in each weight, with the coefficient multiplied by the phase for the midgame half
/// and by the remaining phase and the endgame scale for the endgame half.
pub fn loss_and_gradient(
    weights: &Weights,
    dataset: &Dataset,
    k: ScalingFactor,
    pool: &ThreadPool,
) -> (Float, Gradient) {
    let num_weights = weights.len();
    // constant factors have been moved outside the loop
    let constant_factor = 2.0 * k.0 / 400.0 / dataset.len() as Float;
    let shard_size = shard_size(dataset, pool);
    let partial: Vec<(Float, Gradient)> = pool.install(|| {
        dataset
            .entries()
            .par_chunks(shard_size)
            .map(|shard| {
                let mut loss = 0.0;
                let mut grad = Gradient::zeroed(num_weights);
                for entry in shard {
                    let prediction = wr_prediction_for_weights(weights, entry, k);
                    loss += sample_loss(prediction, entry.outcome);
                    let prediction = prediction.0;
                    let scaled_delta = constant_factor
                        * (prediction - entry.outcome.0)
                        * prediction
                        * (1.0 - prediction);
                    let mg_factor = scaled_delta * entry.phase;
                    let eg_factor = scaled_delta * (1.0 - entry.phase) * entry.endgame_scale;
                    for c in &entry.coefficients {
                        let g = &mut grad[c.index as usize];
                        g.mg += mg_factor * c.value as Float;
                        g.eg += eg_factor * c.value as Float;
                    }
                }
                (loss, grad)
            })
            .collect()
    });
    let mut loss = 0.0;
    let mut gradient = Gradient::zeroed(num_weights);
    for (shard_loss, shard_grad) in partial {
        loss += shard_loss;
        gradient.add_scaled(&shard_grad, 1.0);
    }
    (loss / dataset.len() as Float, gradient)
}

/// Line search with decimal refinement: scans `[0, 10]` in steps of 1, then repeatedly narrows the range
/// around the best value and divides the step by 10.
pub fn find_optimal_k(weights: &Weights, dataset: &Dataset, pool: &ThreadPool) -> ScalingFactor {
    let error = |k: Float| loss(weights, dataset, ScalingFactor(k), pool);
    let mut start = 0.0;
    let mut end = 10.0;
    let mut step = 1.0;
    let mut best = error(start);
    for _ in 0..10 {
        let mut current = start - step;
        while current < end {
            current += step;
            let e = error(current);
            if e < best || (e - best).abs() < 1e-10 {
                best = e;
                start = current;
            }
        }
        debug!("Searching K: best so far {start:.10}, loss {best:.8}");
        end = start + step;
        start -= step;
        step /= 10.0;
    }
    let k = start + 10.0 * step;
    if k > 0.0 {
        ScalingFactor(k)
    } else {
        warn!("Couldn't fit a positive K (got {k}), using {FALLBACK_SCALING_FACTOR} instead");
        FALLBACK_SCALING_FACTOR
    }
}

pub trait Optimizer {
    fn new(num_weights: usize, learning_rate: Float) -> Self
    where
        Self: Sized;

    // can be less than 1 to increase the lr.
    fn lr_drop(&mut self, factor: Float);

    fn step(&mut self, weights: &mut Weights, gradient: &Gradient, iteration: usize);
}

pub struct SimpleGDOptimizer {
    pub alpha: Float,
}

impl Optimizer for SimpleGDOptimizer {
    fn new(_num_weights: usize, learning_rate: Float) -> Self {
        Self {
            alpha: learning_rate,
        }
    }

    fn lr_drop(&mut self, factor: Float) {
        self.alpha /= factor;
    }

    fn step(&mut self, weights: &mut Weights, gradient: &Gradient, _iteration: usize) {
        weights.add_scaled(gradient, -self.alpha);
    }
}

#[derive(Debug, Copy, Clone)]
pub struct AdamHyperParams {
    /// Learning rate multiplier, an upper bound on the step size.
    pub alpha: Float,
    /// Exponential decay of the moving average of the gradient
    pub beta1: Float,
    /// Exponential decay of the moving average of the uncentered variance of the gradient
    pub beta2: Float,
    /// Offset to avoid division by zero
    pub epsilon: Float,
}

impl AdamHyperParams {
    pub fn new(alpha: Float) -> Self {
        Self {
            alpha,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

#[derive(Debug)]
pub struct Adam {
    pub hyper_params: AdamHyperParams,
    /// first moment (exponentially moving average)
    m: Weights,
    /// second moment (exponentially moving average)
    v: Weights,
}

impl Optimizer for Adam {
    fn new(num_weights: usize, learning_rate: Float) -> Self {
        Self {
            hyper_params: AdamHyperParams::new(learning_rate),
            m: Weights::zeroed(num_weights),
            v: Weights::zeroed(num_weights),
        }
    }

    fn lr_drop(&mut self, factor: Float) {
        self.hyper_params.alpha /= factor;
    }

    fn step(&mut self, weights: &mut Weights, gradient: &Gradient, iteration: usize) {
        debug_assert_eq!(weights.len(), self.m.len());
        let iteration = iteration as i32 + 1;
        let AdamHyperParams {
            alpha,
            beta1,
            beta2,
            epsilon,
        } = self.hyper_params;
        for i in 0..gradient.len() {
            let g = gradient[i];
            // biased since the values are initialized to 0, so the exponential moving average is wrong
            self.m[i] = self.m[i] * beta1 + g * (1.0 - beta1);
            self.v[i] = self.v[i] * beta2 + g.zip_with(g, |a, b| a * b) * (1.0 - beta2);
            let unbiased_m = self.m[i] / (1.0 - beta1.powi(iteration));
            let unbiased_v = self.v[i] / (1.0 - beta2.powi(iteration));
            weights[i] -= unbiased_m.zip_with(unbiased_v, |m, v| alpha * m / (v.sqrt() + epsilon));
        }
    }
}

#[derive(Debug, Clone)]
pub struct TuneResult {
    pub weights: Weights,
    pub scaling_factor: ScalingFactor,
    /// The loss at the start of each epoch.
    pub losses: Vec<Float>,
    /// The loss of `weights`, after the last update.
    pub final_loss: Float,
}

fn make_optimizer(config: &TunerConfig, num_weights: usize) -> Box<dyn Optimizer> {
    match config.optimizer {
        OptimizerKind::Adam => Box::new(Adam::new(num_weights, config.learning_rate)),
        OptimizerKind::Sgd => Box::new(SimpleGDOptimizer::new(
            num_weights,
            config.learning_rate,
        )),
    }
}

/// Runs the epoch loop of `config` on `dataset`.
///
/// `initial` are the built-in weights. Tuning starts from them unless `retune_from_zero` is set,
/// and K is always fitted on them. `on_progress` is called every `print_interval` epochs.
pub fn optimize(
    dataset: &Dataset,
    initial: &Weights,
    config: &TunerConfig,
    pool: &ThreadPool,
    mut on_progress: impl FnMut(usize, &Weights),
) -> TuneResult {
    assert_eq!(dataset.num_weights(), initial.len());
    let fit_k = config.scaling_constant == 0.0;
    let mut k = if fit_k {
        let k = find_optimal_k(initial, dataset, pool);
        info!("Using the fitted scaling factor K = {0:.6}", k.0);
        k
    } else {
        ScalingFactor(config.scaling_constant)
    };
    let mut weights = if config.retune_from_zero {
        Weights::zeroed(initial.len())
    } else {
        initial.clone()
    };
    let mut optimizer = make_optimizer(config, weights.len());
    let mut losses = Vec::with_capacity(config.max_epoch);
    let mut prev_loss: Option<Float> = None;

    for epoch in 0..config.max_epoch {
        if fit_k
            && config.k_refit_interval > 0
            && epoch > 0
            && epoch % config.k_refit_interval == 0
        {
            k = find_optimal_k(&weights, dataset, pool);
            info!("Epoch {epoch}: refitted K = {0:.6}", k.0);
        }
        let (loss, gradient) = loss_and_gradient(&weights, dataset, k, pool);
        losses.push(loss);
        debug!(
            "Epoch {epoch}, loss: {loss}, loss got smaller by: 1/1_000_000 * {0}",
            (prev_loss.unwrap_or(loss) - loss) * 1_000_000.0
        );
        if let Some(prev) = prev_loss {
            if config.convergence_threshold > 0.0 && (prev - loss).abs() < config.convergence_threshold
            {
                info!("Converged after {epoch} epochs, loss {loss}");
                break;
            }
        }
        prev_loss = Some(loss);
        optimizer.step(&mut weights, &gradient, epoch);

        let completed = epoch + 1;
        if config.print_interval > 0 && completed % config.print_interval == 0 {
            info!("Epoch {completed} complete, loss: {loss}");
            on_progress(completed, &weights);
        }
        if config.lr_drop_interval > 0 && completed % config.lr_drop_interval == 0 {
            optimizer.lr_drop(config.lr_drop_ratio);
            debug!("Changed the learning rate after {completed} epochs");
        }
    }
    let final_loss = loss(&weights, dataset, k, pool);
    TuneResult {
        weights,
        scaling_factor: k,
        losses,
        final_loss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_data::Coefficient;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rayon::ThreadPoolBuilder;

    fn pool(threads: usize) -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(threads).build().unwrap()
    }

    fn entry(coefficients: &[(u32, i16)], outcome: Float, phase: Float) -> Entry {
        Entry {
            coefficients: coefficients
                .iter()
                .map(|&(index, value)| Coefficient { index, value })
                .collect(),
            score: 0.0,
            outcome: Outcome::new(outcome),
            phase,
            endgame_scale: 1.0,
            additional_score: 0.0,
        }
    }

    fn random_entries(rng: &mut StdRng, num_entries: usize, num_weights: usize) -> Vec<Entry> {
        (0..num_entries)
            .map(|_| {
                let coefficients = (0..num_weights as u32)
                    .map(|index| Coefficient {
                        index,
                        value: rng.gen_range(-2..=2),
                    })
                    .filter(|c| c.value != 0)
                    .collect();
                Entry {
                    coefficients,
                    score: 0.0,
                    outcome: Outcome::new(rng.gen_range(0.0..=1.0)),
                    phase: rng.gen_range(0.0..=1.0),
                    endgame_scale: 1.0,
                    additional_score: 0.0,
                }
            })
            .collect()
    }

    fn test_config(optimizer: OptimizerKind, learning_rate: Float, max_epoch: usize) -> TunerConfig {
        TunerConfig {
            thread_count: 2,
            scaling_constant: 400.0,
            retune_from_zero: true,
            max_epoch,
            learning_rate,
            print_interval: 0,
            optimizer,
            ..Default::default()
        }
    }

    #[test]
    pub fn simple_loss_test() {
        let pool = pool(2);
        let weights = Weights::zeroed(42);
        for outcome in [0.0, 0.5, 1.0] {
            let dataset = Dataset::from_entries(42, vec![entry(&[], outcome, 0.5); 3]);
            for k in 1..100 {
                let loss = loss(&weights, &dataset, ScalingFactor(k as Float), &pool);
                if outcome == 0.5 {
                    assert_eq!(loss, 0.0);
                } else {
                    assert!((loss - 0.25).abs() <= 0.0001);
                }
            }
        }
    }

    #[test]
    pub fn linear_eval_test() {
        let weights = Weights(vec![PhasedWeight::new(100.0, 200.0), PhasedWeight::new(-10.0, 30.0)]);
        let mut e = entry(&[(0, 2), (1, -1)], 0.5, 0.25);
        // mg = 210, eg = 370
        assert_eq!(linear_eval(&weights, &e), CpScore(0.25 * 210.0 + 0.75 * 370.0));
        e.endgame_scale = 0.5;
        e.additional_score = 7.0;
        assert_eq!(linear_eval(&weights, &e), CpScore(0.25 * 210.0 + 0.75 * 0.5 * 370.0));
        assert_eq!(
            cp_eval_for_weights(&weights, &e),
            CpScore(0.25 * 210.0 + 0.75 * 0.5 * 370.0 + 7.0)
        );
    }

    #[test]
    pub fn compute_gradient_test() {
        let pool = pool(1);
        let weights = Weights::zeroed(2);
        // K = 400 means sigmoid(eval), so the prediction is 0.5 and the derivative of the sigmoid is 0.25
        let k = ScalingFactor(400.0);
        for (outcome, sign) in [(0.0, 1.0), (0.5, 0.0), (1.0, -1.0)] {
            let mut e = entry(&[(0, 1)], outcome, 1.0);
            let dataset = Dataset::from_entries(2, vec![e.clone()]);
            let (loss, gradient) = loss_and_gradient(&weights, &dataset, k, &pool);
            assert_eq!(loss, (0.5 - outcome) * (0.5 - outcome));
            assert_eq!(gradient[0], PhasedWeight::new(sign * 0.25, 0.0));
            assert_eq!(gradient[1], PhasedWeight::default());

            e.phase = 0.5;
            e.endgame_scale = 0.5;
            let dataset = Dataset::from_entries(2, vec![e]);
            let (_, gradient) = loss_and_gradient(&weights, &dataset, k, &pool);
            assert_eq!(gradient[0], PhasedWeight::new(sign * 0.125, sign * 0.0625));
        }
    }

    #[test]
    pub fn gradient_matches_finite_differences_test() {
        let pool = pool(3);
        let mut rng = StdRng::seed_from_u64(42);
        let num_weights = 4;
        let mut entries = random_entries(&mut rng, 50, num_weights);
        for e in entries.iter_mut() {
            e.endgame_scale = rng.gen_range(0.25..=1.0);
            e.additional_score = rng.gen_range(-50.0..50.0);
        }
        let dataset = Dataset::from_entries(num_weights, entries);
        let weights = Weights(
            (0..num_weights)
                .map(|_| PhasedWeight::new(rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0)))
                .collect(),
        );
        let k = ScalingFactor(1.3);
        let (_, gradient) = loss_and_gradient(&weights, &dataset, k, &pool);
        let h = 1e-3;
        for i in 0..num_weights {
            for phase in [crate::params::PhaseType::Mg, crate::params::PhaseType::Eg] {
                let mut plus = weights.clone();
                *plus[i].get_mut(phase) += h;
                let mut minus = weights.clone();
                *minus[i].get_mut(phase) -= h;
                let numeric = (loss(&plus, &dataset, k, &pool) - loss(&minus, &dataset, k, &pool)) / (2.0 * h);
                let analytic = gradient[i].get(phase);
                assert!(
                    (numeric - analytic).abs() <= 1e-9 + 1e-4 * analytic.abs(),
                    "weight {i} {phase:?}: {numeric} vs {analytic}"
                );
            }
        }
    }

    #[test]
    // testcase that contains only 1 position with only 1 feature
    pub fn trivial_test() {
        let pool = pool(1);
        let k = ScalingFactor(400.0);
        for feature in [1, 2, -1] {
            for initial_weight in [0.0, 0.1, -1.2] {
                for outcome in [0.0, 0.5, 1.0, 0.9] {
                    let mut weights = Weights(vec![PhasedWeight::splat(initial_weight)]);
                    let dataset = Dataset::from_entries(1, vec![entry(&[(0, feature)], outcome, 1.0)]);
                    let mut optimizer = SimpleGDOptimizer::new(1, 1.0);
                    for i in 0..1000 {
                        let (old_loss, grad) = loss_and_gradient(&weights, &dataset, k, &pool);
                        optimizer.step(&mut weights, &grad, i);
                        assert!(loss(&weights, &dataset, k, &pool) <= old_loss + 1e-12);
                    }
                    let loss = loss(&weights, &dataset, k, &pool);
                    assert!(
                        loss <= 0.01,
                        "loss {loss}, initial weight {initial_weight}, weights {weights}, feature {feature}, outcome {outcome}"
                    );
                    // the endgame half has a phase of zero and can't change
                    assert_eq!(weights[0].eg, initial_weight);
                }
            }
        }
    }

    #[test]
    pub fn two_positions_test() {
        let pool = pool(2);
        let win = entry(&[(0, 1), (1, -1)], 1.0, 1.0);
        let lose = entry(&[(0, -1), (1, 1)], 0.0, 1.0);
        let dataset = Dataset::from_entries(2, vec![win, lose]);
        for (optimizer, lr) in [(OptimizerKind::Adam, 1.0), (OptimizerKind::Sgd, 100.0)] {
            let mut config = test_config(optimizer, lr, 1000);
            config.scaling_constant = 40.0;
            let res = optimize(&dataset, &Weights::zeroed(2), &config, &pool, |_, _| {});
            assert_eq!(res.losses.len(), 1000);
            assert_eq!(res.scaling_factor, ScalingFactor(40.0));
            let remaining_loss = loss(&res.weights, &dataset, res.scaling_factor, &pool);
            assert!(remaining_loss <= 0.01, "{optimizer}: {remaining_loss}");
            // the last update happens after the last entry of `losses` was computed
            assert_eq!(res.final_loss, remaining_loss);
            assert!(res.final_loss < res.losses[999]);
            assert!(res.losses[0] > remaining_loss);
            assert!(res.weights[0].mg >= 1.0);
            assert!(res.weights[1].mg <= -1.0);
        }
    }

    #[test]
    pub fn find_k_test() {
        let pool = pool(4);
        let true_k = ScalingFactor(1.7);
        let weights = Weights(vec![PhasedWeight::new(50.0, 50.0)]);
        let entries = (-8..=8)
            .map(|c| {
                let mut e = entry(&[(0, c)], 0.5, 1.0);
                e.outcome = cp_to_wr(linear_eval(&weights, &e), true_k);
                e
            })
            .collect();
        let dataset = Dataset::from_entries(1, entries);
        let k = find_optimal_k(&weights, &dataset, &pool);
        assert!((k.0 - true_k.0).abs() < 1e-3, "{k}");
    }

    #[test]
    pub fn degenerate_k_test() {
        let pool = pool(1);
        // every eval is zero, so K doesn't matter
        let dataset = Dataset::from_entries(1, vec![entry(&[], 1.0, 1.0), entry(&[], 0.0, 0.5)]);
        let k = find_optimal_k(&Weights::zeroed(1), &dataset, &pool);
        assert!(k.0 > 0.0);
    }

    #[test]
    pub fn k_refit_test() {
        let pool = pool(2);
        let mut rng = StdRng::seed_from_u64(7);
        let true_weights = Weights(vec![PhasedWeight::splat(100.0), PhasedWeight::splat(300.0)]);
        let mut entries = random_entries(&mut rng, 100, 2);
        for e in entries.iter_mut() {
            e.outcome = cp_to_wr(linear_eval(&true_weights, e), ScalingFactor(1.0));
        }
        let dataset = Dataset::from_entries(2, entries);
        // the ratio of the initial weights is wrong, so tuning changes the best K
        let initial = Weights(vec![PhasedWeight::splat(100.0); 2]);
        let mut config = test_config(OptimizerKind::Adam, 5.0, 21);
        config.scaling_constant = 0.0;
        config.retune_from_zero = false;
        config.k_refit_interval = 20;
        config.print_interval = 20;
        let mut refit_weights = None;
        let res = optimize(&dataset, &initial, &config, &pool, |_, w| {
            refit_weights = Some(w.clone())
        });
        let refit_weights = refit_weights.unwrap();
        let initial_k = find_optimal_k(&initial, &dataset, &pool);
        assert_eq!(res.scaling_factor, find_optimal_k(&refit_weights, &dataset, &pool));
        assert!(
            (res.scaling_factor.0 - initial_k.0).abs() > 0.01,
            "{} vs {initial_k}",
            res.scaling_factor
        );

        config.k_refit_interval = 0;
        let res = optimize(&dataset, &initial, &config, &pool, |_, _| {});
        assert_eq!(res.scaling_factor, initial_k);
    }

    #[test]
    pub fn lr_drop_test() {
        let mut adam = Adam::new(3, 2.0);
        adam.lr_drop(4.0);
        assert_eq!(adam.hyper_params.alpha, 0.5);
        let mut sgd = SimpleGDOptimizer::new(3, 2.0);
        sgd.lr_drop(0.5);
        assert_eq!(sgd.alpha, 4.0);
    }

    #[test]
    pub fn adam_one_weight_test() {
        let pool = pool(1);
        for outcome in [0.0, 0.5, 1.0] {
            let dataset = Dataset::from_entries(1, vec![entry(&[(0, 1)], outcome, 1.0)]);
            let config = test_config(OptimizerKind::Adam, 1.0, 20);
            let res = optimize(&dataset, &Weights::zeroed(1), &config, &pool, |_, _| {});
            let weight = res.weights[0].mg;
            if outcome == 0.5 {
                assert_eq!(weight, 0.0);
            } else {
                assert_eq!(weight.signum(), (outcome - 0.5).signum());
                assert!(weight.abs() >= 5.0);
            }
        }
    }

    #[test]
    pub fn convergence_test() {
        let pool = pool(2);
        let mut config = test_config(OptimizerKind::Sgd, 1.0, 10_000);
        config.convergence_threshold = 1e-7;
        let dataset = Dataset::from_entries(
            1,
            vec![entry(&[(0, 1)], 1.0, 1.0), entry(&[(0, 1)], 0.0, 1.0)],
        );
        // the optimum is a weight of zero, which is where we start
        let res = optimize(&dataset, &Weights::zeroed(1), &config, &pool, |_, _| {});
        assert_eq!(res.losses.len(), 2);
        assert_eq!(res.final_loss, 0.25);
    }

    #[test]
    pub fn progress_and_retune_test() {
        let pool = pool(2);
        let dataset = Dataset::from_entries(1, vec![entry(&[(0, 1)], 1.0, 1.0)]);
        let initial = Weights(vec![PhasedWeight::new(3.0, 4.0)]);
        let mut config = test_config(OptimizerKind::Adam, 1.0, 10);
        config.retune_from_zero = false;
        config.print_interval = 3;
        let mut reported = vec![];
        let res = optimize(&dataset, &initial, &config, &pool, |epoch, w| {
            reported.push((epoch, w[0].eg))
        });
        assert_eq!(reported, vec![(3, 4.0), (6, 4.0), (9, 4.0)]);
        assert!(res.weights[0].mg > 3.0);
    }

    #[test]
    pub fn determinism_test() {
        let mut rng = StdRng::seed_from_u64(1234);
        let dataset = Dataset::from_entries(5, random_entries(&mut rng, 333, 5));
        let mut config = test_config(OptimizerKind::Adam, 5.0, 50);
        config.thread_count = 3;
        config.scaling_constant = 0.0;
        let initial = Weights(vec![PhasedWeight::new(10.0, -20.0); 5]);
        let first = optimize(&dataset, &initial, &config, &pool(3), |_, _| {});
        let second = optimize(&dataset, &initial, &config, &pool(3), |_, _| {});
        assert_eq!(first.weights, second.weights);
        assert_eq!(first.losses, second.losses);
        assert_eq!(first.scaling_factor, second.scaling_factor);
    }

    #[test]
    pub fn recover_weights_from_zero_test() {
        let pool = pool(4);
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let true_weights = Weights(vec![
            PhasedWeight::new(100.0, 150.0),
            PhasedWeight::new(300.0, 250.0),
            PhasedWeight::new(500.0, 600.0),
        ]);
        let k = ScalingFactor(1.0);
        let mut entries = random_entries(&mut rng, 200, 3);
        for e in entries.iter_mut() {
            e.outcome = cp_to_wr(linear_eval(&true_weights, e), k);
        }
        let dataset = Dataset::from_entries(3, entries);
        let mut config = test_config(OptimizerKind::Adam, 5.0, 3000);
        config.scaling_constant = k.0;
        config.lr_drop_interval = 1000;
        config.lr_drop_ratio = 4.0;
        let res = optimize(&dataset, &true_weights, &config, &pool, |_, _| {});
        for (tuned, expected) in res.weights.iter().zip(true_weights.iter()) {
            assert!((tuned.mg - expected.mg).abs() <= 10.0, "{tuned:?} vs {expected:?}");
            assert!((tuned.eg - expected.eg).abs() <= 10.0, "{tuned:?} vs {expected:?}");
        }
        assert!(res.final_loss < res.losses[0] / 100.0);
    }
}
