/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Bitboard, Board, Color, PieceKind};

impl Board {
    /// Returns `true` if the game is drawn by insufficient material, the fifty-move rule, or threefold repetition.
    pub fn is_draw(&self) -> bool {
        self.is_draw_by_fifty_move_rule()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
    }

    /// Returns `true` if 100 plies have passed since the last pawn move or capture.
    #[inline(always)]
    pub const fn is_draw_by_fifty_move_rule(&self) -> bool {
        self.data.halfmove_clock >= 100
    }

    /// Returns `true` if neither side has enough material to force checkmate.
    ///
    /// Covered cases are King vs King, King and one minor piece vs King, King and Bishop vs King and Bishop
    /// with both Bishops on the same square color, and King and two Knights vs King.
    ///
    /// # Example
    /// ```
    /// # use newt::Board;
    /// assert!(Board::from_fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1").unwrap().is_insufficient_material());
    /// assert!(!Board::from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 0 1").unwrap().is_insufficient_material());
    /// ```
    pub fn is_insufficient_material(&self) -> bool {
        let heavy_or_pawns = self.kind(PieceKind::Pawn)
            | self.kind(PieceKind::Rook)
            | self.kind(PieceKind::Queen);
        if heavy_or_pawns.is_nonempty() {
            return false;
        }

        let knights = |color| self.pieces(color, PieceKind::Knight).population();
        let bishops = |color| self.pieces(color, PieceKind::Bishop).population();
        let minors = |color| knights(color) + bishops(color);

        let (white, black) = (Color::White, Color::Black);
        match (minors(white), minors(black)) {
            (0, 0) | (1, 0) | (0, 1) => true,

            (2, 0) => knights(white) == 2,
            (0, 2) => knights(black) == 2,

            (1, 1) if bishops(white) == 1 && bishops(black) == 1 => {
                let bishops = self.kind(PieceKind::Bishop);
                !bishops.intersects(Bitboard::LIGHT_SQUARES)
                    || !bishops.intersects(Bitboard::DARK_SQUARES)
            }

            _ => false,
        }
    }

    /// Returns `true` if the current position has occurred at least three times.
    ///
    /// Only positions since the last irreversible move (pawn move or capture) are considered,
    /// since no earlier position can be repeated.
    pub fn is_threefold_repetition(&self) -> bool {
        let key = self.key();
        let window = self.data.halfmove_clock as usize;

        let previous = self
            .history
            .iter()
            .rev()
            .take(window)
            .filter(|data| data.key == key)
            .count();

        previous >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insufficient(fen: &str) -> bool {
        Board::from_fen(fen).unwrap().is_insufficient_material()
    }

    #[test]
    fn test_insufficient_material() {
        assert!(insufficient("4k3/8/8/8/8/8/8/4K3 w - - 0 1"));
        assert!(insufficient("4k3/8/8/8/8/8/8/4KB2 w - - 0 1"));
        assert!(insufficient("4kn2/8/8/8/8/8/8/4K3 w - - 0 1"));
        assert!(insufficient("4k3/8/8/8/8/8/8/3NKN2 w - - 0 1"));

        // Bishops on the same color (c1 and f8 are both dark)
        assert!(insufficient("5b1k/8/8/8/8/8/8/2B1K3 w - - 0 1"));
        // Bishops on opposite colors
        assert!(!insufficient("4k1b1/8/8/8/8/8/8/2B1K3 w - - 0 1"));

        assert!(!insufficient("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/3BKB2 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/3BKN2 w - - 0 1"));
        assert!(!insufficient("4kn2/8/8/8/8/8/8/4KN2 w - - 0 1"));
        assert!(!insufficient("4k3/8/8/8/8/8/8/4KQ2 w - - 0 1"));
    }

    #[test]
    fn test_fifty_move_rule() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 99 80").unwrap();
        assert!(!board.is_draw_by_fifty_move_rule());

        let board = Board::from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 100 80").unwrap();
        assert!(board.is_draw_by_fifty_move_rule());
        assert!(board.is_draw());
    }

    #[test]
    fn test_threefold_repetition() {
        let mut board = Board::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

        // Start position has now occurred twice
        for mv in shuffle {
            board.make_uci(mv).unwrap();
        }
        assert!(!board.is_threefold_repetition());

        // And now three times
        for mv in shuffle {
            board.make_uci(mv).unwrap();
        }
        assert!(board.is_threefold_repetition());
        assert!(board.is_draw());

        board.undo();
        assert!(!board.is_threefold_repetition());
    }

    #[test]
    fn test_pawn_moves_reset_repetitions() {
        let mut board = Board::new();
        for mv in ["g1f3", "g8f6", "f3g1", "f6g8", "e2e4", "e7e5"] {
            board.make_uci(mv).unwrap();
        }
        for mv in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            board.make_uci(mv).unwrap();
        }
        // The start position occurred twice, but only before the pawn moves
        assert!(!board.is_threefold_repetition());
    }
}
