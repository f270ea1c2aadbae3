/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Errors produced when decoding positions, squares, or moves from text.
///
/// None of these are fatal: they are reported at the protocol boundary and the engine keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("invalid piece character {0:?}")]
    InvalidPiece(char),

    #[error("invalid square {0:?}: expected a file a-h followed by a rank 1-8")]
    InvalidSquare(String),

    #[error("invalid side to move {0:?}: expected 'w' or 'b'")]
    InvalidSideToMove(String),

    #[error("invalid castling rights {0:?}")]
    InvalidCastling(String),

    #[error("invalid move clock {0:?}")]
    InvalidClock(String),

    #[error("position is missing the {0} king")]
    MissingKing(&'static str),

    #[error("invalid move {0:?}: expected UCI notation such as e2e4 or e7e8q")]
    InvalidMove(String),

    #[error("illegal move {mv:?} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}
