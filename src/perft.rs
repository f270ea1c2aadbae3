/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Board, Move};

/// Perform a perft at the specified depth, counting the number of legal move sequences (leaf nodes) of that length.
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
///
/// The board is returned to its original state.
///
/// # Example
/// ```
/// # use newt::{perft, Board};
/// let mut board = Board::new();
/// assert_eq!(perft(&mut board, 3), 8902);
/// assert_eq!(board, Board::new());
/// ```
pub fn perft(board: &mut Board, depth: usize) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if depth == 1 {
        return board.get_legal_moves().len() as u64;
    } else
    // Recursion limit; return 1, since we're fathoming this node.
    if depth == 0 {
        return 1;
    }

    board.get_legal_moves().into_iter().fold(0, |nodes, mv| {
        board.make(mv);
        let new_nodes = perft(board, depth - 1);
        board.undo();

        nodes + new_nodes
    })
}

/// Perform a split perft ("divide"), returning the number of leaf nodes reachable after each legal move at the root.
///
/// Summing the counts gives [`perft`] at the same depth.
pub fn divide(board: &mut Board, depth: usize) -> Vec<(Move, u64)> {
    board
        .get_legal_moves()
        .into_iter()
        .map(|mv| {
            board.make(mv);
            let nodes = perft(board, depth.saturating_sub(1));
            board.undo();

            (mv, nodes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    #[test]
    fn test_divide_sums_to_perft() {
        let mut board = Board::from_fen(FEN_KIWIPETE).unwrap();
        let split = divide(&mut board, 2);

        assert_eq!(split.len(), 48);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), perft(&mut board, 2));
    }

    #[test]
    fn test_perft_depth_zero() {
        assert_eq!(perft(&mut Board::new(), 0), 1);
    }

    #[test]
    fn test_divide_startpos() {
        let mut board = Board::new();
        let split = divide(&mut board, 1);

        assert_eq!(split.len(), 20);
        assert!(split.iter().all(|&(_, nodes)| nodes == 1));
    }
}
