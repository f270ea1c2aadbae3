/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation, move generation, and draw detection.
mod board;

/// Commands the engine understands beyond the UCI protocol.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Counting of leaf nodes, for validating move generation.
mod perft;

/// Piece-Square tables.
pub mod psqt;

/// Scores of positions, including mate scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Tunable constants.
mod tune;

/// Misc utility constants.
mod utils;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use perft::*;
pub use score::*;
pub use search::*;
pub use utils::*;
