/*
 *  Cogs, the chess rules behind the Tongs tuner.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Cogs is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Cogs is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Cogs. If not, see <https://www.gnu.org/licenses/>.
 */

//! The chess rules needed to turn a FEN into something an evaluation function can look at.
//!
//! This is deliberately not a full move generator: the tuner only ever needs static positions,
//! plus capture generation for the optional quiescence step and the capture-count feature.

use std::fmt::Debug;

pub mod bitboards;
pub mod chessboard;
pub mod fen;
pub mod movegen;
pub mod pieces;
pub mod quiescence;
pub mod squares;

pub use chessboard::{Chessboard, START_FEN};
pub use fen::FenError;
pub use pieces::{Color, PieceType};

/// What the tuner needs from a board representation.
/// Evaluation functions are free to rely on the concrete type, but the data loading code only uses this.
pub trait Board: Debug + Clone + Send + Sync + 'static {
    fn from_fen(fen: &str) -> Result<Self, FenError>;

    fn as_fen(&self) -> String;

    fn active_player(&self) -> Color;

    /// Resolves pending captures, returning the position that should be evaluated instead.
    fn quiesce(&self) -> Self;
}

impl Board for Chessboard {
    fn from_fen(fen: &str) -> Result<Self, FenError> {
        Chessboard::from_fen(fen)
    }

    fn as_fen(&self) -> String {
        Chessboard::as_fen(self)
    }

    fn active_player(&self) -> Color {
        Chessboard::active_player(self)
    }

    fn quiesce(&self) -> Self {
        Chessboard::quiesce(self)
    }
}
