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

//! Reading annotated FENs and turning them into [`Entry`]s.

use crate::config::TunerConfig;
use crate::error::{RecordError, Res, TuneError};
use crate::eval::{EvalResult, Evaluator};
use crate::gd::{linear_eval, CpScore, Outcome};
use crate::params::{Float, Weights};
use cogs::FenError;
use colored::Colorize;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fs;
use std::path::Path;

const WDL_MAP: [(&str, Float); 4] = [
    ("0-1", 0.0),
    ("1/2-1/2", 0.5),
    ("0.5-0.5", 0.5),
    ("1-0", 1.0),
];

const IGNORED: [char; 8] = ['[', ']', '(', ')', '"', '\'', ';', '|'];

/// Static scores that differ from the linear evaluation by more than this are reported.
const MISMATCH_TOLERANCE: Float = 1.0;

pub fn parse_outcome(token: &str) -> Result<Outcome, RecordError> {
    let wdl = token.trim_matches(&IGNORED[..]);
    if let Some((_, value)) = WDL_MAP.iter().find(|(key, _)| *key == wdl) {
        return Ok(Outcome::new(*value));
    }
    match wdl.parse::<Float>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(Outcome::new(value)),
        _ => Err(RecordError::InvalidOutcome(token.to_string())),
    }
}

/// The board, color, castling and en passant fields.
const NUM_REQUIRED_FEN_FIELDS: usize = 4;

const NUM_MOVE_COUNTERS: usize = 2;

fn is_separator(token: &str) -> bool {
    token.chars().all(|c| IGNORED.contains(&c))
}

fn is_move_counter(token: &str) -> bool {
    token.parse::<u32>().is_ok()
}

/// Splits a line into the FEN and the outcome.
///
/// The FEN is read forwards: the four required fields, followed by up to two move counters.
/// The outcome is the next token, or the one after it if that token is a `|` separator or an EPD opcode.
/// Only separators may follow the outcome.
pub fn split_record(line: &str) -> Result<(String, Outcome), RecordError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < NUM_REQUIRED_FEN_FIELDS {
        return Err(FenError::TooFewFields(line.trim().to_string()).into());
    }
    let num_counters = tokens[NUM_REQUIRED_FEN_FIELDS..]
        .iter()
        .take(NUM_MOVE_COUNTERS)
        .take_while(|token| is_move_counter(token))
        .count();
    let (fen, rest) = tokens.split_at(NUM_REQUIRED_FEN_FIELDS + num_counters);
    let mut rest = rest.iter();
    let first = rest.next().ok_or(RecordError::MissingOutcome)?;
    let outcome = match parse_outcome(first) {
        Ok(outcome) => outcome,
        // skip up to one token between the end of the fen and the outcome
        Err(err) => match rest.next() {
            Some(next) => parse_outcome(next).map_err(|next_err| {
                if is_separator(first) {
                    next_err
                } else {
                    err
                }
            })?,
            None if is_separator(first) => return Err(RecordError::MissingOutcome),
            None => return Err(err),
        },
    };
    if let Some(extra) = rest.find(|token| !is_separator(token)) {
        return Err(RecordError::TrailingInput(extra.to_string()));
    }
    Ok((fen.join(" "), outcome))
}

/// A nonzero coefficient.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Coefficient {
    pub index: u32,
    pub value: i16,
}

/// A position, reduced to what the optimizer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Sorted by index.
    pub coefficients: Vec<Coefficient>,
    pub score: Float,
    pub outcome: Outcome,
    pub phase: Float,
    pub endgame_scale: Float,
    /// The part of the static score that isn't explained by the coefficients. Added to every prediction.
    pub additional_score: Float,
}

impl Entry {
    pub fn new(res: EvalResult, outcome: Outcome) -> Self {
        let coefficients = res
            .coefficients
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0)
            .map(|(index, value)| Coefficient {
                index: index as u32,
                value: *value,
            })
            .collect();
        Self {
            coefficients,
            score: res.score,
            outcome,
            phase: res.phase,
            endgame_scale: res.endgame_scale,
            additional_score: 0.0,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Dataset {
    num_weights: usize,
    entries: Vec<Entry>,
}

impl Dataset {
    pub fn new(num_weights: usize) -> Self {
        Self {
            num_weights,
            entries: vec![],
        }
    }

    pub fn from_entries(num_weights: usize, entries: Vec<Entry>) -> Self {
        debug_assert!(entries
            .iter()
            .all(|e| e.coefficients.iter().all(|c| (c.index as usize) < num_weights)));
        Self {
            num_weights,
            entries,
        }
    }

    pub fn num_weights(&self) -> usize {
        self.num_weights
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn union(&mut self, mut other: Dataset) {
        assert_eq!(self.num_weights, other.num_weights);
        self.entries.append(&mut other.entries);
    }
}

/// Evaluates every record with the built-in weights of `E`.
pub struct DatasetLoader<'a, E: Evaluator> {
    eval: E,
    initial_weights: Weights,
    config: &'a TunerConfig,
    pool: &'a ThreadPool,
}

impl<'a, E: Evaluator> DatasetLoader<'a, E> {
    pub fn new(config: &'a TunerConfig, pool: &'a ThreadPool) -> Self {
        let initial_weights = E::initial_parameters();
        Self {
            eval: E::with_weights(&initial_weights),
            initial_weights,
            config,
            pool,
        }
    }

    fn parse_line(&self, line_no: usize, line: &str) -> Res<(Entry, bool)> {
        let record_error = |source: RecordError| TuneError::Record {
            line: line_no,
            record: line.to_string(),
            source,
        };
        let (fen, outcome) = split_record(line).map_err(record_error)?;
        let res = if self.config.enable_quiescence_search {
            self.eval.evaluate_fen_quiescent(&fen)
        } else {
            self.eval.evaluate_fen(&fen)
        };
        let mut entry = Entry::new(res.map_err(|err| record_error(err.into()))?, outcome);
        let CpScore(linear) = linear_eval(&self.initial_weights, &entry);
        let mut mismatch = false;
        if E::INCLUDES_ADDITIONAL_SCORE {
            entry.additional_score = entry.score - linear;
        } else if (entry.score - linear).abs() > MISMATCH_TOLERANCE {
            debug!(
                "Line {line_no}: the static eval of '{fen}' is {0:.1}, but the coefficients give {linear:.1}",
                entry.score
            );
            mismatch = true;
        }
        if self.config.print_data_entries {
            info!(
                "Line {line_no}: '{fen}', outcome {0}, score {1:.1}, phase {2:.3}, endgame scale {3:.2}, {4} nonzero coefficients",
                entry.outcome,
                entry.score,
                entry.phase,
                entry.endgame_scale,
                entry.coefficients.len()
            );
        }
        Ok((entry, mismatch))
    }

    pub fn load_from_str(&self, annotated_fens: &str) -> Res<Dataset> {
        let lines: Vec<(usize, &str)> = annotated_fens
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .collect();
        let chunk_size = match self.config.data_load_print_interval {
            0 => lines.len().max(1),
            n => n,
        };
        let mut dataset = Dataset::new(E::num_weights());
        let mut num_mismatches = 0;
        for chunk in lines.chunks(chunk_size) {
            let parsed: Vec<Res<(Entry, bool)>> = self.pool.install(|| {
                chunk
                    .par_iter()
                    .map(|(line_no, line)| self.parse_line(*line_no, line))
                    .collect()
            });
            // report the first error in the file, not whichever thread failed first
            for res in parsed {
                let (entry, mismatch) = res?;
                num_mismatches += mismatch as usize;
                dataset.push(entry);
            }
            if self.config.data_load_print_interval > 0 {
                info!("Loading...  Loaded {} positions so far", dataset.len());
            }
        }
        if num_mismatches > 0 {
            warn!(
                "{0} of {1} positions have a static eval that doesn't match their coefficients, the tuned weights might be wrong",
                num_mismatches.to_string().red(),
                dataset.len()
            );
        }
        Ok(dataset)
    }

    pub fn load_from_file(&self, path: &Path) -> Res<Dataset> {
        let text = fs::read_to_string(path).map_err(|source| TuneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = self.load_from_str(&text)?;
        info!(
            "Loaded {0} positions from '{1}'",
            dataset.len(),
            path.display().to_string().bold()
        );
        Ok(dataset)
    }

    pub fn load_from_files(&self, paths: &[impl AsRef<Path>]) -> Res<Dataset> {
        let mut dataset = Dataset::new(E::num_weights());
        for path in paths {
            dataset.union(self.load_from_file(path.as_ref())?);
        }
        Ok(dataset)
    }
}
