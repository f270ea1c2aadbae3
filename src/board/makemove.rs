/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Color, File, Move, MoveKind, Piece, PieceKind, Square};

impl Board {
    /// Applies `mv` to the board, pushing the current state onto the history stack.
    ///
    /// The move is assumed to be pseudo-legal for the side to move. It may leave the mover's King in check;
    /// callers that need legality check [`Board::is_in_check`] afterwards and call [`Board::undo`] if so.
    ///
    /// # Panics
    /// If there is no piece on the move's origin square.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Color, Move, MoveKind, Piece, Square};
    /// let mut board = Board::new();
    /// board.make(Move::new(Square::E2, Square::E4, MoveKind::PawnDoublePush));
    ///
    /// assert_eq!(board.piece_at(Square::E4), Some(Piece::WHITE_PAWN));
    /// assert_eq!(board.ep_square(), Some(Square::E3));
    /// assert_eq!(board.side_to_move(), Color::Black);
    /// assert_eq!(board.history_len(), 1);
    /// ```
    pub fn make(&mut self, mv: Move) {
        let color = self.side_to_move();
        let (from, to) = (mv.from(), mv.to());
        let piece = self
            .piece_at(from)
            .expect("a move was made from an empty square");

        self.history.push(self.data);

        // Old castling rights and en passant square leave the key, and are re-added once updated
        self.data.key.hash_castling(&self.data.castling);
        self.data.key.hash_optional_ep_square(self.data.ep_square);
        self.data.ep_square = None;
        self.data.captured = None;
        self.data.last_move = Some(mv);

        let victim = if mv.is_en_passant() {
            Some((Piece::new(!color, PieceKind::Pawn), en_passant_victim(mv)))
        } else {
            self.piece_at(to).map(|victim| (victim, to))
        };

        if let Some((victim, square)) = victim {
            self.remove_piece(victim, square);
            self.data.captured = Some(victim);

            // Capturing a Rook on its original square takes away that side of the opponent's castling
            if victim.kind() == PieceKind::Rook {
                self.revoke_rook_right(!color, square);
            }
        }

        self.remove_piece(piece, from);
        let placed = match mv.promotion() {
            Some(kind) => Piece::new(color, kind),
            None => piece,
        };
        self.add_piece(placed, to);

        match mv.kind() {
            MoveKind::Castle => {
                let rook = Piece::new(color, PieceKind::Rook);
                let (rook_from, rook_to) = castling_rook_squares(mv);
                self.remove_piece(rook, rook_from);
                self.add_piece(rook, rook_to);
            }
            // The skipped square lies halfway between the origin and destination
            MoveKind::PawnDoublePush => self.data.ep_square = Some(Square((from.0 + to.0) / 2)),
            _ => {}
        }

        match piece.kind() {
            PieceKind::King => self.data.castling[color.index()] = super::Castling::NONE,
            PieceKind::Rook => self.revoke_rook_right(color, from),
            _ => {}
        }

        if piece.kind() == PieceKind::Pawn || victim.is_some() {
            self.data.halfmove_clock = 0;
        } else {
            self.data.halfmove_clock = self.data.halfmove_clock.saturating_add(1);
        }

        if color == Color::Black {
            self.data.fullmove_number = self.data.fullmove_number.saturating_add(1);
        }

        self.data.side_to_move = !color;
        self.data.key.flip_side_to_move();
        self.data.key.hash_castling(&self.data.castling);
        self.data.key.hash_optional_ep_square(self.data.ep_square);
    }

    /// Reverts the most recent call to [`Board::make`].
    ///
    /// # Panics
    /// If no moves have been made.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Move, MoveKind, Square};
    /// let mut board = Board::new();
    /// let before = board.clone();
    ///
    /// board.make(Move::new(Square::G1, Square::F3, MoveKind::Normal));
    /// board.undo();
    /// assert_eq!(board, before);
    /// ```
    pub fn undo(&mut self) {
        let prev = self
            .history
            .pop()
            .expect("undo was called with no moves to undo");
        let mv = self
            .data
            .last_move
            .expect("a state on the history stack has no move that produced it");

        let color = prev.side_to_move;
        let (from, to) = (mv.from(), mv.to());

        // Bitboards are reversed with raw toggles; every score is restored along with `prev`
        let placed = match mv.promotion() {
            Some(kind) => Piece::new(color, kind),
            None => self
                .piece_at(to)
                .expect("the moved piece is missing from its destination"),
        };
        let moved = match mv.promotion() {
            Some(_) => Piece::new(color, PieceKind::Pawn),
            None => placed,
        };
        self.toggle(placed, to);
        self.toggle(moved, from);

        if mv.is_castle() {
            let rook = Piece::new(color, PieceKind::Rook);
            let (rook_from, rook_to) = castling_rook_squares(mv);
            self.toggle(rook, rook_to);
            self.toggle(rook, rook_from);
        }

        if let Some(victim) = self.data.captured {
            let square = if mv.is_en_passant() {
                en_passant_victim(mv)
            } else {
                to
            };
            self.toggle(victim, square);
        }

        self.data = prev;
    }

    /// Revokes `color`'s right to castle with the Rook that started on `square`, if that is a Rook's home square.
    fn revoke_rook_right(&mut self, color: Color, square: Square) {
        let rights = &mut self.data.castling[color.index()];
        if square == Square::H1.rank_relative_to(color) {
            rights.kingside = false;
        } else if square == Square::A1.rank_relative_to(color) {
            rights.queenside = false;
        }
    }
}

/// The square of the Pawn captured by an en passant move: the destination's file, on the origin's rank.
#[inline(always)]
fn en_passant_victim(mv: Move) -> Square {
    Square::new(mv.to().file(), mv.from().rank())
}

/// Where the Rook starts and lands for a castling move, based on the King's destination.
#[inline(always)]
pub(crate) fn castling_rook_squares(mv: Move) -> (Square, Square) {
    let rank = mv.to().rank();
    if mv.to().file() == File::G {
        (Square::new(File::H, rank), Square::new(File::F, rank))
    } else {
        (Square::new(File::A, rank), Square::new(File::D, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Castling, FEN_KIWIPETE};

    fn assert_scores_match_scratch(board: &Board) {
        assert_eq!(board.data.material, board.compute_material(), "material of {board:?}");
        assert_eq!(board.data.psqt, board.compute_psqt(), "psqt of {board:?}");
        assert_eq!(board.key(), board.compute_key(), "key of {board:?}");
    }

    #[test]
    fn test_kiwipete_castling_moves_rook() {
        let mut board = Board::from_fen(FEN_KIWIPETE).unwrap();
        let before = board.clone();

        board.make(Move::new(Square::E1, Square::G1, MoveKind::Castle));
        assert_eq!(board.piece_at(Square::G1), Some(Piece::WHITE_KING));
        assert_eq!(board.piece_at(Square::F1), Some(Piece::WHITE_ROOK));
        assert_eq!(board.piece_at(Square::E1), None);
        assert_eq!(board.piece_at(Square::H1), None);
        assert_eq!(board.castling(Color::White), Castling::NONE);
        assert_eq!(board.castling(Color::Black), Castling::ALL);
        assert_scores_match_scratch(&board);

        board.undo();
        assert_eq!(board, before);
    }

    #[test]
    fn test_en_passant_removes_passed_pawn() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let before = board.clone();

        board.make(Move::new(Square::E5, Square::F6, MoveKind::EnPassant));
        assert_eq!(board.piece_at(Square::F6), Some(Piece::WHITE_PAWN));
        assert_eq!(board.piece_at(Square::F5), None);
        assert_eq!(board.captured(), Some(Piece::BLACK_PAWN));
        assert_eq!(board.halfmove_clock(), 0);
        assert_scores_match_scratch(&board);

        board.undo();
        assert_eq!(board, before);
    }

    #[test]
    fn test_promotion_capture_updates_material() {
        let mut board = Board::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let white = board.material(Color::White);
        let black = board.material(Color::Black);

        board.make(Move::new_promotion(Square::A7, Square::B8, PieceKind::Queen));
        assert_eq!(board.piece_at(Square::B8), Some(Piece::WHITE_QUEEN));
        assert_eq!(board.material(Color::White), white + 900 - 100);
        assert_eq!(board.material(Color::Black), black - 500);
        assert_scores_match_scratch(&board);

        board.undo();
        assert_eq!(board.piece_at(Square::A7), Some(Piece::WHITE_PAWN));
        assert_eq!(board.piece_at(Square::B8), Some(Piece::BLACK_ROOK));
    }

    #[test]
    fn test_rook_moves_and_captures_revoke_rights() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        // Rook takes rook on h8: White loses kingside (rook left h1), Black loses kingside (rook captured)
        board.make(Move::new(Square::H1, Square::H8, MoveKind::Normal));
        assert_eq!(board.castling(Color::White), Castling::new(false, true));
        assert_eq!(board.castling(Color::Black), Castling::new(false, true));
        assert_scores_match_scratch(&board);

        board.make(Move::new(Square::E8, Square::D7, MoveKind::Normal));
        assert_eq!(board.castling(Color::Black), Castling::NONE);
        assert_scores_match_scratch(&board);
    }

    #[test]
    fn test_clocks() {
        let mut board = Board::new();
        board.make(Move::new(Square::G1, Square::F3, MoveKind::Normal));
        assert_eq!(board.halfmove_clock(), 1);
        assert_eq!(board.fullmove_number(), 1);

        board.make(Move::new(Square::G8, Square::F6, MoveKind::Normal));
        assert_eq!(board.halfmove_clock(), 2);
        assert_eq!(board.fullmove_number(), 2);

        board.make(Move::new(Square::E2, Square::E3, MoveKind::Normal));
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.ep_square(), None);
    }

    #[test]
    fn test_clocks_saturate() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 65535 65535").unwrap();
        board.make(Move::new(Square::E8, Square::D8, MoveKind::Normal));
        assert_eq!(board.halfmove_clock(), u16::MAX);
        assert_eq!(board.fullmove_number(), u16::MAX);
        assert!(board.is_draw_by_fifty_move_rule());

        board.undo();
        assert_eq!(board.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 65535 65535");
    }

    #[test]
    #[should_panic(expected = "no moves to undo")]
    fn test_undo_without_history_panics() {
        Board::new().undo();
    }
}
