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

//! The built-in weights of [`super::altair_eval::AltairEval`].

use crate::packed::{s, PackedScore};
use cogs::pieces::NUM_CHESS_PIECES;
use cogs::squares::NUM_SQUARES;

pub const PIECE_VALUES: [PackedScore; NUM_CHESS_PIECES] = [
    s(100, 128),
    s(382, 354),
    s(409, 348),
    s(592, 685),
    s(1448, 1268),
    s(0, 0),
];

pub const PIECE_SQUARE_TABLES_MID: [[i32; NUM_SQUARES]; NUM_CHESS_PIECES] =
    [[0; NUM_SQUARES]; NUM_CHESS_PIECES];

pub const PIECE_SQUARE_TABLES_END: [[i32; NUM_SQUARES]; NUM_CHESS_PIECES] =
    [[0; NUM_SQUARES]; NUM_CHESS_PIECES];

/// Indexed by the relative rank of the pawn.
pub const PASSED_PAWNS: [PackedScore; 8] = [
    s(0, 0),
    s(-2, 13),
    s(-1, 24),
    s(-8, 56),
    s(9, 85),
    s(15, 159),
    s(26, 204),
    s(0, 0),
];

pub const ISOLATED_PAWN: PackedScore = s(-10, 1);

pub const DOUBLED_PAWN: PackedScore = s(-7, -37);

pub const PAWN_PHALANX: [PackedScore; 8] = [
    s(0, 0),
    s(2, -2),
    s(21, 4),
    s(24, 15),
    s(41, 72),
    s(27, 162),
    s(-67, 453),
    s(0, 0),
];

/// `[attacker][victim]`
#[rustfmt::skip]
pub const PIECE_THREAT: [[PackedScore; NUM_CHESS_PIECES]; NUM_CHESS_PIECES] = [
    [s( 10,  10), s( 79,  30), s( 67,  70), s(109,   1), s( 70,  36), s(198,  18)],
    [s( 11,  24), s( 20,  20), s( 50,  53), s( 75,  27), s( 65,  15), s(134,  33)],
    [s(  8,  25), s( 41,  60), s( 20,  20), s( 56,  42), s( 65,  69), s( 79,  84)],
    [s( -7,  26), s(  7,  33), s( 12,  39), s( 10,  10), s( 66,  50), s(138,  33)],
    [s( -6,  15), s(  4,  14), s(  1,  39), s( -5,  36), s( 10,  10), s( 80, 109)],
    [s(  0,   0), s(  0,   0), s(  0,   0), s(  0,   0), s(  0,   0), s(  0,   0)],
];

pub const ROOK_SEMI_OPEN_FILE: PackedScore = s(19, 7);

pub const ROOK_OPEN_FILE: PackedScore = s(42, 2);

pub const KING_SEMI_OPEN_FILE: PackedScore = s(-21, 1);

pub const KING_OPEN_FILE: PackedScore = s(-13, -10);

pub const BISHOP_PAIR: PackedScore = s(27, 72);

pub const TEMPO: PackedScore = s(26, 25);

/// Per reachable square that isn't attacked by an enemy pawn.
pub const MOBILITY_MID: [i32; NUM_CHESS_PIECES] = [0, 6, 3, 2, 1, 0];

pub const MOBILITY_END: [i32; NUM_CHESS_PIECES] = [0, 2, 3, 1, 0, 0];

/// Per attacked square around the enemy king, indexed by the attacking piece.
pub const KING_RING_ATTACKS: [PackedScore; NUM_CHESS_PIECES] = [
    s(0, 0),
    s(13, -10),
    s(17, -4),
    s(26, -7),
    s(19, 12),
    s(0, 0),
];

/// Per legal capture of the side to move.
pub const CAPTURE_BONUS: PackedScore = s(0, 0);
