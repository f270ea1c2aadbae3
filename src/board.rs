/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod bitboard;
mod draw;
mod error;
mod fen;
mod makemove;
mod movegen;
mod moves;
mod piece;
mod square;
mod tables;
mod zobrist;

use std::fmt;

pub use bitboard::*;
pub use error::*;
pub use movegen::*;
pub use moves::*;
pub use piece::*;
pub use square::*;
pub use tables::*;
pub use zobrist::*;

use crate::psqt::{self, Tapered};

/// Castling rights of a single player.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Castling {
    pub kingside: bool,
    pub queenside: bool,
}

impl Castling {
    pub const ALL: Self = Self::new(true, true);
    pub const NONE: Self = Self::new(false, false);

    #[inline(always)]
    pub const fn new(kingside: bool, queenside: bool) -> Self {
        Self {
            kingside,
            queenside,
        }
    }

    /// Returns `true` if either right is still available.
    #[inline(always)]
    pub const fn any(&self) -> bool {
        self.kingside || self.queenside
    }

    /// Index into lists of 4 elements. Used for Zobrist hashing.
    #[inline(always)]
    pub(crate) const fn index(&self) -> usize {
        (self.kingside as usize) | (self.queenside as usize) << 1
    }
}

/// Everything about a position that is not piece placement.
///
/// One of these exists per ply: the current one lives in [`Board`], and every one before it
/// is pushed onto the board's history by [`Board::make`] and popped by [`Board::undo`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PosData {
    pub(crate) side_to_move: Color,
    pub(crate) castling: [Castling; Color::COUNT],

    /// The square a pawn skipped over on the previous move, if it double-pushed.
    pub(crate) ep_square: Option<Square>,

    /// Plies since the last pawn move or capture.
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,

    /// The piece captured by the move that produced this state.
    pub(crate) captured: Option<Piece>,

    /// The move that produced this state.
    pub(crate) last_move: Option<Move>,

    /// Sum of [`PieceKind::value`] per color.
    pub(crate) material: [i32; Color::COUNT],

    /// Sum of [`psqt::value`] per color.
    pub(crate) psqt: [Tapered; Color::COUNT],

    pub(crate) key: ZobristKey,
}

impl Default for PosData {
    fn default() -> Self {
        Self {
            side_to_move: Color::White,
            castling: [Castling::NONE; Color::COUNT],
            ep_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            captured: None,
            last_move: None,
            material: [0; Color::COUNT],
            psqt: [Tapered::ZERO; Color::COUNT],
            key: ZobristKey::default(),
        }
    }
}

/// A chess position, along with the history needed to undo every move made on it.
///
/// Pieces are stored as one [`Bitboard`] per color and kind, plus one aggregate per color.
/// Material, piece-square scores, and the Zobrist key are maintained incrementally by [`Board::make`].
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    pieces: [[Bitboard; PieceKind::COUNT]; Color::COUNT],
    sides: [Bitboard; Color::COUNT],
    pub(crate) data: PosData,
    pub(crate) history: Vec<PosData>,
}

impl Board {
    /// A board with no pieces and default metadata.
    pub(crate) fn empty() -> Self {
        Self {
            pieces: [[Bitboard::EMPTY_BOARD; PieceKind::COUNT]; Color::COUNT],
            sides: [Bitboard::EMPTY_BOARD; Color::COUNT],
            data: PosData::default(),
            history: Vec::with_capacity(256),
        }
    }

    /// The standard starting position.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, FEN_STARTPOS};
    /// assert_eq!(Board::new().to_fen(), FEN_STARTPOS);
    /// ```
    pub fn new() -> Self {
        use PieceKind::*;
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Self::empty();
        for (file, kind) in File::iter().zip(back_rank) {
            board.toggle(Piece::new(Color::White, kind), Square::new(file, Rank::ONE));
            board.toggle(Piece::WHITE_PAWN, Square::new(file, Rank::TWO));
            board.toggle(Piece::BLACK_PAWN, Square::new(file, Rank::SEVEN));
            board.toggle(Piece::new(Color::Black, kind), Square::new(file, Rank::EIGHT));
        }
        board.data.castling = [Castling::ALL; Color::COUNT];
        board.refresh();

        board
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.data.side_to_move
    }

    #[inline(always)]
    pub const fn castling(&self, color: Color) -> Castling {
        self.data.castling[color.index()]
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> &[Castling; Color::COUNT] {
        &self.data.castling
    }

    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.data.ep_square
    }

    #[inline(always)]
    pub const fn halfmove_clock(&self) -> u16 {
        self.data.halfmove_clock
    }

    #[inline(always)]
    pub const fn fullmove_number(&self) -> u16 {
        self.data.fullmove_number
    }

    /// The piece captured by the last move made, if any.
    #[inline(always)]
    pub const fn captured(&self) -> Option<Piece> {
        self.data.captured
    }

    #[inline(always)]
    pub const fn last_move(&self) -> Option<Move> {
        self.data.last_move
    }

    #[inline(always)]
    pub const fn material(&self, color: Color) -> i32 {
        self.data.material[color.index()]
    }

    #[inline(always)]
    pub const fn psqt(&self, color: Color) -> Tapered {
        self.data.psqt[color.index()]
    }

    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.data.key
    }

    #[inline(always)]
    pub const fn data(&self) -> &PosData {
        &self.data
    }

    /// Number of moves made and not yet undone.
    #[inline(always)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline(always)]
    pub fn history(&self) -> &[PosData] {
        &self.history
    }

    /// Squares occupied by `color`'s pieces of `kind`.
    #[inline(always)]
    pub const fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[color.index()][kind.index()]
    }

    /// Squares occupied by pieces of `kind`, of either color.
    #[inline(always)]
    pub const fn kind(&self, kind: PieceKind) -> Bitboard {
        self.pieces(Color::White, kind)
            .or(self.pieces(Color::Black, kind))
    }

    /// Squares occupied by any of `color`'s pieces.
    #[inline(always)]
    pub const fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    #[inline(always)]
    pub const fn occupied(&self) -> Bitboard {
        self.sides[0].or(self.sides[1])
    }

    /// The square of `color`'s King, if it has one.
    #[inline(always)]
    pub const fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, PieceKind::King).lsb()
    }

    /// Returns `true` if `color` has nothing left but its King.
    #[inline(always)]
    pub fn is_lone_king(&self, color: Color) -> bool {
        self.side(color) == self.pieces(color, PieceKind::King)
    }

    /// Fetches the [`Piece`] on `square`, if there is one.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Piece, Square};
    /// let board = Board::new();
    /// assert_eq!(board.piece_at(Square::E1), Some(Piece::WHITE_KING));
    /// assert_eq!(board.piece_at(Square::E4), None);
    /// ```
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let color = if self.side(Color::White).contains(square) {
            Color::White
        } else if self.side(Color::Black).contains(square) {
            Color::Black
        } else {
            return None;
        };

        PieceKind::all()
            .into_iter()
            .find(|&kind| self.pieces(color, kind).contains(square))
            .map(|kind| Piece::new(color, kind))
    }

    /// Iterates over every occupied square and the piece on it, from a1 to h8.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied()
            .into_iter()
            .filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Material per color, computed from scratch.
    pub fn compute_material(&self) -> [i32; Color::COUNT] {
        let mut material = [0; Color::COUNT];
        for (_, piece) in self.iter() {
            material[piece.color().index()] += piece.kind().value();
        }
        material
    }

    /// Piece-square scores per color, computed from scratch.
    pub fn compute_psqt(&self) -> [Tapered; Color::COUNT] {
        let mut scores = [Tapered::ZERO; Color::COUNT];
        for (square, piece) in self.iter() {
            scores[piece.color().index()] += psqt::value(piece, square);
        }
        scores
    }

    /// The Zobrist key of this position, computed from scratch.
    pub fn compute_key(&self) -> ZobristKey {
        ZobristKey::from_parts(
            self.iter(),
            self.ep_square(),
            self.castling_rights(),
            self.side_to_move(),
        )
    }

    /// Recomputes every incrementally-maintained score after the board was set up by hand.
    pub(crate) fn refresh(&mut self) {
        self.data.material = self.compute_material();
        self.data.psqt = self.compute_psqt();
        self.data.key = self.compute_key();
    }

    /// Flips `piece` on `square` in the bitboards, without touching any scores.
    #[inline(always)]
    pub(crate) fn toggle(&mut self, piece: Piece, square: Square) {
        let bb = square.bitboard();
        self.pieces[piece.color().index()][piece.kind().index()] ^= bb;
        self.sides[piece.color().index()] ^= bb;
    }

    /// Places `piece` on the empty `square`, updating material, piece-square scores, and the key.
    #[inline(always)]
    pub(crate) fn add_piece(&mut self, piece: Piece, square: Square) {
        debug_assert!(!self.occupied().contains(square), "{square} is occupied");
        self.toggle(piece, square);

        let color = piece.color().index();
        self.data.material[color] += piece.kind().value();
        self.data.psqt[color] += psqt::value(piece, square);
        self.data.key.hash_piece(square, piece);
    }

    /// Removes `piece` from `square`, updating material, piece-square scores, and the key.
    #[inline(always)]
    pub(crate) fn remove_piece(&mut self, piece: Piece, square: Square) {
        debug_assert!(
            self.pieces(piece.color(), piece.kind()).contains(square),
            "{piece:?} is not on {square}"
        );
        self.toggle(piece, square);

        let color = piece.color().index();
        self.data.material[color] -= piece.kind().value();
        self.data.psqt[color] -= psqt::value(piece, square);
        self.data.key.hash_piece(square, piece);
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    /// Prints the board with rank 8 on top, alongside the rest of the position's state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let c = self
                    .piece_at(Square::new(file, rank))
                    .map(|p| p.char())
                    .unwrap_or('.');
                write!(f, " {c}")?;
            }

            match rank {
                Rank::EIGHT => write!(f, "        FEN: {}", self.to_fen())?,
                Rank::SEVEN => write!(f, "       Side: {}", self.side_to_move().name())?,
                Rank::SIX => write!(f, "   Castling: {}", self.castling_fen())?,
                Rank::FIVE => {
                    let ep = self.ep_square().map(|sq| sq.to_string());
                    write!(f, "         EP: {}", ep.as_deref().unwrap_or("-"))?
                }
                Rank::FOUR => write!(f, "  Half-move: {}", self.halfmove_clock())?,
                Rank::THREE => write!(f, "  Full-move: {}", self.fullmove_number())?,
                Rank::TWO => write!(f, "        Key: {}", self.key())?,
                _ => {}
            }
            writeln!(f)?;
        }
        write!(f, " +----------------\n   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    /// Formats the board as its FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_scores() {
        let board = Board::new();
        assert_eq!(board.material(Color::White), board.material(Color::Black));
        assert_eq!(board.psqt(Color::White), board.psqt(Color::Black));
        assert_eq!(board.material(Color::White), 8 * 100 + 2 * 320 + 2 * 330 + 2 * 500 + 900);
        assert_eq!(board.key(), board.compute_key());
    }

    #[test]
    fn test_sides_are_unions_of_pieces() {
        let board = Board::new();
        for color in Color::all() {
            let union = PieceKind::all()
                .into_iter()
                .fold(Bitboard::EMPTY_BOARD, |acc, kind| acc | board.pieces(color, kind));
            assert_eq!(union, board.side(color));
        }
        assert!(!board.side(Color::White).intersects(board.side(Color::Black)));
        assert_eq!(board.occupied().population(), 32);
    }

    #[test]
    fn test_piece_at() {
        let board = Board::new();
        assert_eq!(board.piece_at(Square::D8), Some(Piece::BLACK_QUEEN));
        assert_eq!(board.piece_at(Square::G1), Some(Piece::WHITE_KNIGHT));
        assert_eq!(board.piece_at(Square::H7), Some(Piece::BLACK_PAWN));
        assert_eq!(board.piece_at(Square::D5), None);
        assert_eq!(board.king_square(Color::Black), Some(Square::E8));
    }
}
