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

//! FEN parsing and printing.
//!
//! Parsing is strict about the board, color, castling and en passant fields because silently substituting
//! defaults would hide broken datasets. Only the two move counters are optional.

use crate::bitboards::Bitboard;
use crate::chessboard::{
    Chessboard, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE, WHITE_QUEENSIDE,
};
use crate::pieces::{Color, ColoredPiece, PieceType};
use crate::squares::ChessSquare;
use std::str::FromStr;
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FenError {
    #[error("the FEN '{0}' has fewer than 4 fields (board, player, castling, en passant)")]
    TooFewFields(String),
    #[error("the FEN '{0}' has more than 6 fields")]
    TooManyFields(String),
    #[error("the board '{0}' must consist of exactly 8 ranks separated by '/'")]
    InvalidRankCount(String),
    #[error("rank {rank} of the board describes {len} squares instead of 8")]
    InvalidRankLength { rank: usize, len: usize },
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("invalid side to move '{0}', expected 'w' or 'b'")]
    InvalidColor(String),
    #[error("invalid castling rights '{0}'")]
    InvalidCastling(String),
    #[error("invalid en passant square '{0}'")]
    InvalidEnPassant(String),
    #[error("invalid square '{0}'")]
    InvalidSquare(String),
    #[error("{color} has {count} kings, but there must be exactly one")]
    KingCount { color: Color, count: usize },
    #[error("there is a pawn on the back rank square {0}")]
    PawnOnBackRank(ChessSquare),
    #[error("the side not to move is in check")]
    OpponentInCheck,
}

impl Chessboard {
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields(fen.to_string()));
        } else if fields.len() > 6 {
            return Err(FenError::TooManyFields(fen.to_string()));
        }
        let mut board = Self::empty();
        board.read_pieces(fields[0])?;
        board.active_player = match fields[1] {
            "w" | "W" => Color::White,
            "b" | "B" => Color::Black,
            other => return Err(FenError::InvalidColor(other.to_string())),
        };
        board.castling = parse_castling(fields[2])?;
        board.ep_square = parse_ep_square(fields[3], board.active_player)?;
        board.halfmove_clock = fields
            .get(4)
            .and_then(|clock| clock.parse().ok())
            .unwrap_or(0);
        board.fullmove_number = fields
            .get(5)
            .and_then(|num| num.parse().ok())
            .filter(|num| *num > 0)
            .unwrap_or(1);
        board.verify_position_legal()?;
        Ok(board)
    }

    fn read_pieces(&mut self, pieces: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = pieces.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRankCount(pieces.to_string()));
        }
        // FENs start with the 8th rank
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as usize;
                    continue;
                }
                let piece = ColoredPiece::from_ascii_char(c).ok_or(FenError::InvalidPiece(c))?;
                if file >= 8 {
                    return Err(FenError::InvalidRankLength {
                        rank: rank + 1,
                        len: file + 1,
                    });
                }
                self.place_piece(ChessSquare::from_rank_file(rank, file), piece);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::InvalidRankLength {
                    rank: rank + 1,
                    len: file,
                });
            }
        }
        Ok(())
    }

    fn verify_position_legal(&self) -> Result<(), FenError> {
        for color in Color::iter() {
            let count = self.colored_piece_bb(color, PieceType::King).num_ones();
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }
        let back_ranks = Bitboard::rank(0) | Bitboard::rank(7);
        if let Some(square) = (self.piece_bb(PieceType::Pawn) & back_ranks).lsb() {
            return Err(FenError::PawnOnBackRank(square));
        }
        if self.is_in_check(self.active_player.other()) {
            return Err(FenError::OpponentInCheck);
        }
        Ok(())
    }

    pub fn as_fen(&self) -> String {
        let mut res = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_on(ChessSquare::from_rank_file(rank, file)) {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            res += &empty.to_string();
                            empty = 0;
                        }
                        res.push(piece.ascii_char());
                    }
                }
            }
            if empty > 0 {
                res += &empty.to_string();
            }
            if rank > 0 {
                res.push('/');
            }
        }
        res.push(' ');
        res.push(self.active_player.ascii_char());
        res.push(' ');
        if self.castling == 0 {
            res.push('-');
        }
        for (flag, c) in CASTLING_CHARS {
            if self.castling & flag != 0 {
                res.push(c);
            }
        }
        res.push(' ');
        match self.ep_square {
            None => res.push('-'),
            Some(square) => res += &square.to_string(),
        }
        res + &format!(" {0} {1}", self.halfmove_clock, self.fullmove_number)
    }
}

impl FromStr for Chessboard {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

const CASTLING_CHARS: [(u8, char); 4] = [
    (WHITE_KINGSIDE, 'K'),
    (WHITE_QUEENSIDE, 'Q'),
    (BLACK_KINGSIDE, 'k'),
    (BLACK_QUEENSIDE, 'q'),
];

fn parse_castling(castling: &str) -> Result<u8, FenError> {
    if castling == "-" {
        return Ok(0);
    }
    let mut res = 0;
    for c in castling.chars() {
        let Some((flag, _)) = CASTLING_CHARS.iter().find(|(_, name)| *name == c) else {
            return Err(FenError::InvalidCastling(castling.to_string()));
        };
        if res & flag != 0 {
            return Err(FenError::InvalidCastling(castling.to_string()));
        }
        res |= flag;
    }
    Ok(res)
}

fn parse_ep_square(ep: &str, active_player: Color) -> Result<Option<ChessSquare>, FenError> {
    if ep == "-" {
        return Ok(None);
    }
    let square =
        ChessSquare::from_str(ep).map_err(|_| FenError::InvalidEnPassant(ep.to_string()))?;
    // the square behind the pawn that just moved two squares
    if square.relative_rank(active_player) != 5 {
        return Err(FenError::InvalidEnPassant(ep.to_string()));
    }
    Ok(Some(square))
}
