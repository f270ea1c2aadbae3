/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, pawn_double_pushes, pawn_pushes,
    queen_attacks, rook_attacks, Bitboard, Board, BoardError, Color, Move, MoveKind, MoveList,
    PieceKind, Square,
};

/// Which moves [`Board::get_pseudo_legal_moves`] should produce.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MoveCategory {
    /// Every pseudo-legal move, including castling.
    #[default]
    All,

    /// Captures, en passant captures, and every promotion (capturing or not).
    Captures,
}

/// Squares a `color` piece of `kind` on `square` attacks, given the board's `occupied` squares.
#[inline(always)]
pub const fn attacks_for(kind: PieceKind, color: Color, square: Square, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Pawn => pawn_attacks(color, square),
        PieceKind::Knight => knight_attacks(square),
        PieceKind::Bishop => bishop_attacks(square, occupied),
        PieceKind::Rook => rook_attacks(square, occupied),
        PieceKind::Queen => queen_attacks(square, occupied),
        PieceKind::King => king_attacks(square),
    }
}

impl Board {
    /// Generates every pseudo-legal move of `category` for the side to move.
    ///
    /// Moves are not filtered for legality: some may leave the mover's King in check.
    /// See [`Board::get_legal_moves`].
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, MoveCategory};
    /// let board = Board::new();
    /// assert_eq!(board.get_pseudo_legal_moves(MoveCategory::All).len(), 20);
    /// assert!(board.get_pseudo_legal_moves(MoveCategory::Captures).is_empty());
    /// ```
    pub fn get_pseudo_legal_moves(&self, category: MoveCategory) -> MoveList {
        let mut moves = MoveList::new();
        let color = self.side_to_move();

        let targets = match category {
            MoveCategory::All => !self.side(color),
            MoveCategory::Captures => self.side(!color),
        };

        self.generate_pawn_moves(&mut moves, color, category);

        let occupied = self.occupied();
        for kind in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ] {
            for from in self.pieces(color, kind) {
                for to in attacks_for(kind, color, from, occupied) & targets {
                    moves.push(Move::new(from, to, MoveKind::Normal));
                }
            }
        }

        if category == MoveCategory::All {
            self.generate_castling(&mut moves, color);
        }

        moves
    }

    fn generate_pawn_moves(&self, moves: &mut MoveList, color: Color, category: MoveCategory) {
        let empty = !self.occupied();
        let enemies = self.side(!color);
        let last_rank = match color {
            Color::White => Bitboard::RANK_8,
            Color::Black => Bitboard::RANK_1,
        };

        for from in self.pieces(color, PieceKind::Pawn) {
            let single = pawn_pushes(color, from) & empty;

            // Quiet pushes only count as "captures" when they promote
            if category == MoveCategory::All || single.intersects(last_rank) {
                for to in single {
                    push_pawn_move(moves, from, to, MoveKind::Normal, last_rank);
                }
            }

            if category == MoveCategory::All && single.is_nonempty() {
                for to in pawn_double_pushes(color, from) & empty {
                    moves.push(Move::new(from, to, MoveKind::PawnDoublePush));
                }
            }

            let attacks = pawn_attacks(color, from);
            for to in attacks & enemies {
                push_pawn_move(moves, from, to, MoveKind::Normal, last_rank);
            }

            if let Some(ep) = self.ep_square() {
                if attacks.contains(ep) {
                    moves.push(Move::new(from, ep, MoveKind::EnPassant));
                }
            }
        }
    }

    /// Castling is generated only if the right remains, every square between King and Rook is empty,
    /// and no square the King starts on, crosses, or lands on is attacked.
    fn generate_castling(&self, moves: &mut MoveList, color: Color) {
        let rights = self.castling(color);
        if !rights.any() {
            return;
        }

        let occupied = self.occupied();
        let attacked = self.get_attacking_bb(!color);
        let rel = |square: Square| square.rank_relative_to(color);
        let king = rel(Square::E1);

        if rights.kingside {
            let between = Bitboard::from_iter([rel(Square::F1), rel(Square::G1)]);
            let path = king.bitboard() | between;
            if !between.intersects(occupied) && !path.intersects(attacked) {
                moves.push(Move::new(king, rel(Square::G1), MoveKind::Castle));
            }
        }

        if rights.queenside {
            let between = Bitboard::from_iter([rel(Square::B1), rel(Square::C1), rel(Square::D1)]);
            let path = Bitboard::from_iter([king, rel(Square::D1), rel(Square::C1)]);
            if !between.intersects(occupied) && !path.intersects(attacked) {
                moves.push(Move::new(king, rel(Square::C1), MoveKind::Castle));
            }
        }
    }

    /// Every square attacked by `color`, with sliding rays stopped by pieces of either color.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Color, Square};
    /// let board = Board::new();
    /// let attacks = board.get_attacking_bb(Color::White);
    /// assert!(attacks.contains(Square::F3));
    /// assert!(!attacks.contains(Square::E4));
    /// ```
    pub fn get_attacking_bb(&self, color: Color) -> Bitboard {
        let occupied = self.occupied();
        let mut attacks = Bitboard::EMPTY_BOARD;

        for kind in PieceKind::all() {
            for square in self.pieces(color, kind) {
                attacks |= attacks_for(kind, color, square, occupied);
            }
        }

        attacks
    }

    /// Returns `true` if any piece of `attacker` attacks `square`.
    ///
    /// Looks outward from `square` as each kind of piece, and checks whether an `attacker` piece of that kind is found.
    pub fn is_attacked_by(&self, square: Square, attacker: Color) -> bool {
        let occupied = self.occupied();
        let queens = self.pieces(attacker, PieceKind::Queen);

        // A pawn of `attacker` hits `square` exactly when a pawn of the other color on `square` would hit it
        pawn_attacks(!attacker, square).intersects(self.pieces(attacker, PieceKind::Pawn))
            || knight_attacks(square).intersects(self.pieces(attacker, PieceKind::Knight))
            || king_attacks(square).intersects(self.pieces(attacker, PieceKind::King))
            || bishop_attacks(square, occupied)
                .intersects(self.pieces(attacker, PieceKind::Bishop) | queens)
            || rook_attacks(square, occupied)
                .intersects(self.pieces(attacker, PieceKind::Rook) | queens)
    }

    /// Returns `true` if `color`'s King is attacked.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_attacked_by(king, !color))
    }

    /// Returns `true` if `mv`, made from this position, would capture something.
    #[inline(always)]
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.is_en_passant() || self.side(!self.side_to_move()).contains(mv.to())
    }

    /// Generates every legal move for the side to move.
    ///
    /// Each pseudo-legal move is made, checked for leaving the mover in check, and undone.
    pub fn get_legal_moves(&mut self) -> MoveList {
        let color = self.side_to_move();
        let mut legal = MoveList::new();

        for mv in self.get_pseudo_legal_moves(MoveCategory::All) {
            self.make(mv);
            if !self.is_in_check(color) {
                legal.push(mv);
            }
            self.undo();
        }

        legal
    }

    /// Returns `true` if the side to move has at least one legal move.
    pub fn has_legal_moves(&mut self) -> bool {
        let color = self.side_to_move();

        self.get_pseudo_legal_moves(MoveCategory::All)
            .into_iter()
            .any(|mv| {
                self.make(mv);
                let legal = !self.is_in_check(color);
                self.undo();
                legal
            })
    }

    /// The side to move is in check and has no legal moves.
    pub fn is_checkmate(&mut self) -> bool {
        self.is_in_check(self.side_to_move()) && !self.has_legal_moves()
    }

    /// The side to move is not in check but has no legal moves.
    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check(self.side_to_move()) && !self.has_legal_moves()
    }

    /// Finds the pseudo-legal move written as `mv` in UCI notation, such as `e2e4` or `e7e8q`.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, MoveKind};
    /// let board = Board::new();
    /// let mv = board.parse_move("e2e4").unwrap();
    /// assert_eq!(mv.kind(), MoveKind::PawnDoublePush);
    ///
    /// assert!(board.parse_move("e2e5").is_err());
    /// assert!(board.parse_move("hello").is_err());
    /// ```
    pub fn parse_move(&self, mv: &str) -> Result<Move, BoardError> {
        if !(4..=5).contains(&mv.len()) || !mv.is_ascii() {
            return Err(BoardError::InvalidMove(mv.to_string()));
        }

        Square::from_uci(&mv[0..2]).map_err(|_| BoardError::InvalidMove(mv.to_string()))?;
        Square::from_uci(&mv[2..4]).map_err(|_| BoardError::InvalidMove(mv.to_string()))?;
        if let Some(promotion) = mv[4..].chars().next() {
            if !matches!(promotion, 'n' | 'b' | 'r' | 'q') {
                return Err(BoardError::InvalidMove(mv.to_string()));
            }
        }

        self.get_pseudo_legal_moves(MoveCategory::All)
            .into_iter()
            .find(|candidate| *candidate == mv)
            .ok_or_else(|| BoardError::IllegalMove {
                mv: mv.to_string(),
                fen: self.to_fen(),
            })
    }

    /// Parses `mv` with [`Board::parse_move`] and makes it, rejecting moves that leave the mover in check.
    ///
    /// On error, the board is unchanged.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Piece, Square};
    /// let mut board = Board::new();
    /// board.make_uci("g1f3").unwrap();
    /// assert_eq!(board.piece_at(Square::F3), Some(Piece::WHITE_KNIGHT));
    /// assert!(board.make_uci("f3g1").is_err());
    /// ```
    pub fn make_uci(&mut self, mv: &str) -> Result<(), BoardError> {
        let parsed = self.parse_move(mv)?;
        let color = self.side_to_move();

        self.make(parsed);
        if self.is_in_check(color) {
            self.undo();
            return Err(BoardError::IllegalMove {
                mv: mv.to_string(),
                fen: self.to_fen(),
            });
        }

        Ok(())
    }
}

#[inline(always)]
fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, kind: MoveKind, last_rank: Bitboard) {
    if last_rank.contains(to) {
        for promotion in PieceKind::promotions() {
            moves.push(Move::new_promotion(from, to, promotion));
        }
    } else {
        moves.push(Move::new(from, to, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    fn legal_moves(fen: &str) -> Vec<String> {
        let mut board = Board::from_fen(fen).unwrap();
        board
            .get_legal_moves()
            .into_iter()
            .map(|mv| mv.to_string())
            .collect()
    }

    #[test]
    fn test_promotions_expand_to_four_moves() {
        // One quiet promotion and one capturing promotion
        let board = Board::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = board.get_pseudo_legal_moves(MoveCategory::All);
        let promotions: Vec<_> = moves.iter().filter(|mv| mv.is_promotion()).collect();
        assert_eq!(promotions.len(), 8);

        let pushes: Vec<_> = promotions.iter().filter(|mv| mv.to() == Square::A8).collect();
        assert_eq!(pushes.len(), 4);
        assert_eq!(
            pushes.iter().map(|mv| mv.to_string()).collect::<Vec<_>>(),
            ["a7a8q", "a7a8r", "a7a8b", "a7a8n"]
        );
    }

    #[test]
    fn test_captures_category() {
        let board = Board::from_fen("1n2k3/P7/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut captures: Vec<_> = board
            .get_pseudo_legal_moves(MoveCategory::Captures)
            .into_iter()
            .map(|mv| mv.to_string())
            .collect();
        captures.sort();

        let mut expected = vec![
            "a7a8q", "a7a8r", "a7a8b", "a7a8n", "a7b8q", "a7b8r", "a7b8b", "a7b8n", "e4d5",
        ];
        expected.sort();
        assert_eq!(captures, expected);
    }

    #[test]
    fn test_en_passant_is_generated() {
        let moves = legal_moves("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert!(moves.contains(&String::from("e5f6")));
        assert!(!moves.contains(&String::from("e5d6")));
    }

    #[test]
    fn test_castling_requires_empty_and_safe_path() {
        // Both sides available
        let moves = legal_moves("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(moves.contains(&String::from("e1g1")));
        assert!(moves.contains(&String::from("e1c1")));

        // Knight on b1 blocks queenside, even though the King never crosses b1
        let moves = legal_moves("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        assert!(moves.contains(&String::from("e1g1")));
        assert!(!moves.contains(&String::from("e1c1")));

        // Rook on f8 attacks the transit square f1
        let moves = legal_moves("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1");
        assert!(!moves.contains(&String::from("e1g1")));
        assert!(moves.contains(&String::from("e1c1")));

        // In check: no castling at all
        let moves = legal_moves("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1");
        assert!(!moves.contains(&String::from("e1g1")));
        assert!(!moves.contains(&String::from("e1c1")));

        // b1 attacked does not matter for queenside
        let moves = legal_moves("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(moves.contains(&String::from("e1c1")));
    }

    #[test]
    fn test_check_matches_attack_bitboard() {
        let fens = [
            FEN_KIWIPETE,
            "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1",
            "4k3/8/8/8/1b6/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/3n4/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/3p4/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/5P2/4K3 b - - 0 1",
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        ];

        for fen in fens {
            let mut board = Board::from_fen(fen).unwrap();
            for color in Color::all() {
                let expected = board
                    .pieces(color, PieceKind::King)
                    .intersects(board.get_attacking_bb(!color));
                assert_eq!(board.is_in_check(color), expected, "{color:?} in {fen}");
            }

            let mover = board.side_to_move();
            for mv in board.get_legal_moves() {
                board.make(mv);
                assert!(!board.is_in_check(mover), "{mv} leaves {mover:?} in check in {fen}");
                board.undo();
            }
        }
    }

    #[test]
    fn test_checkmate_and_stalemate() {
        let mut mated =
            Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(mated.is_checkmate());
        assert!(!mated.is_stalemate());

        let mut stalemated = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(stalemated.is_stalemate());
        assert!(!stalemated.is_checkmate());
    }

    #[test]
    fn test_make_uci_rejects_illegal_moves() {
        // The King may not step onto the rook's rank, but may capture the undefended rook
        let mut board = Board::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1").unwrap();
        let before = board.clone();

        assert!(matches!(
            board.make_uci("e1e2"),
            Err(BoardError::IllegalMove { .. })
        ));
        assert_eq!(board, before);

        assert!(matches!(
            board.make_uci("e1e9"),
            Err(BoardError::InvalidMove(_))
        ));
        assert!(board.make_uci("e1d2").is_ok());
        assert_eq!(board.captured(), Some(crate::Piece::BLACK_ROOK));
    }
}
