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

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;
use log::info;
use std::path::PathBuf;
use std::process::exit;
use tongs::config::{OptimizerKind, TunerConfig};
use tongs::params::Float;
use tongs::{run, EvalKind};

/// Tunes the weights of a hand-crafted chess evaluation function on a set of positions labeled with game outcomes.
///
/// Every line of an input file is a FEN followed by the outcome, such as `[1-0]`, `0.5` or `| 1/2-1/2`.
/// Options given on the command line override the config file, which overrides the defaults.
#[derive(Parser, Debug)]
#[command(author = "ToTheAnd", version, about, long_about = None)]
struct CommandLineArgs {
    /// Files with annotated FENs
    files: Vec<PathBuf>,
    /// The evaluation function to tune
    #[arg(long, short, default_value_t)]
    eval: EvalKind,
    /// A JSON file with tuner options, missing options take their default value
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    #[arg(long, short)]
    thread_count: Option<usize>,
    /// K in `sigmoid(K * eval / 400)`, 0 fits it to the dataset
    #[arg(long, short = 'k')]
    scaling_constant: Option<Float>,
    #[arg(long)]
    retune_from_zero: Option<bool>,
    #[arg(long)]
    max_epoch: Option<usize>,
    #[arg(long, short = 'q')]
    enable_quiescence_search: Option<bool>,
    #[arg(long)]
    print_data_entries: Option<bool>,
    #[arg(long)]
    data_load_print_interval: Option<usize>,
    #[arg(long, short)]
    learning_rate: Option<Float>,
    #[arg(long)]
    lr_drop_interval: Option<usize>,
    #[arg(long)]
    lr_drop_ratio: Option<Float>,
    #[arg(long)]
    convergence_threshold: Option<Float>,
    #[arg(long)]
    k_refit_interval: Option<usize>,
    #[arg(long)]
    print_interval: Option<usize>,
    #[arg(long)]
    optimizer: Option<OptimizerKind>,
}

impl CommandLineArgs {
    fn tuner_config(&self) -> anyhow::Result<TunerConfig> {
        let mut config = match &self.config {
            Some(path) => TunerConfig::from_file(path)?,
            None => TunerConfig::default(),
        };
        macro_rules! apply {
            ($($name:ident),*) => {
                $(if let Some(value) = self.$name {
                    config.$name = value;
                })*
            };
        }
        apply!(
            thread_count,
            scaling_constant,
            retune_from_zero,
            max_epoch,
            enable_quiescence_search,
            print_data_entries,
            data_load_print_interval,
            learning_rate,
            lr_drop_interval,
            lr_drop_ratio,
            convergence_threshold,
            k_refit_interval,
            print_interval,
            optimizer
        );
        config.validate()?;
        Ok(config)
    }
}

fn tune(args: &CommandLineArgs) -> anyhow::Result<()> {
    let config = args.tuner_config().context("invalid tuner options")?;
    if args.print_config {
        println!("{}", config.to_json());
        return Ok(());
    }
    info!("Tuner options: {}", config.to_json());
    if args.files.is_empty() {
        bail!("no input files given");
    }
    for file in &args.files {
        if !file.is_file() {
            bail!("'{}' is not a file", file.display());
        }
    }
    let tuned = run(args.eval, &args.files, &config)
        .with_context(|| format!("couldn't tune the {} eval", args.eval))?;
    println!(
        "Tuned {0} weights of the {1} eval on {2} positions, final loss {3:.8}, scaling factor {4:.4}:\n",
        tuned.result.weights.len(),
        tuned.eval_name.bold(),
        tuned.num_positions,
        tuned.result.final_loss,
        tuned.result.scaling_factor.0,
    );
    println!("{}", tuned.formatted);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CommandLineArgs::parse();
    if let Err(err) = tune(&args) {
        eprintln!("{0} {err:#}", "Error:".red().bold());
        exit(1);
    }
}
