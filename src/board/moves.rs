/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{PieceKind, Square};

/// Maximum possible number of moves in a given chess position.
///
/// Found [here](<https://www.chessprogramming.org/Chess_Position#cite_note-4>)
pub const MAX_NUM_MOVES: usize = 218;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// The category of a [`Move`].
///
/// Quiet moves and captures share [`MoveKind::Normal`]; whether a normal move captures
/// is decided by the occupancy of the destination square when the move is made.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MoveKind {
    /// A piece moves from one square to another, possibly capturing whatever stands there.
    Normal,

    /// A Pawn advances two squares from its starting rank.
    PawnDoublePush,

    /// A Pawn captures an enemy Pawn that just double-pushed past it.
    EnPassant,

    /// The King moves two squares toward a Rook, which jumps over it.
    Castle,

    /// A Pawn reaches the last rank and becomes another piece. See [`Move::promotion`].
    Promotion,
}

/// Represents a move made on a chess board.
///
/// Internally encoded using the following bit pattern:
/// ```text
///     0000 000000 000000
///      |     |      +- Source square of the move.
///      |     +- Target square of the move.
///      +- Special flags for the kind of move (see below).
/// ```
///
/// Flags are `0` normal, `1` double push, `2` en passant, `3` castle,
/// and `4..=7` promotion to Knight, Bishop, Rook, Queen respectively.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    const SRC_MASK: u16 = 0b0000_0000_0011_1111;
    const DST_MASK: u16 = 0b0000_1111_1100_0000;
    const DST_BITS: u16 = 6;
    const FLG_BITS: u16 = 12;

    const FLAG_NORMAL: u16 = 0;
    const FLAG_DOUBLE_PUSH: u16 = 1;
    const FLAG_EN_PASSANT: u16 = 2;
    const FLAG_CASTLE: u16 = 3;
    const FLAG_PROMOTE_KNIGHT: u16 = 4;

    /// Creates a new [`Move`] of the provided kind.
    ///
    /// Use [`Move::new_promotion`] for promotions.
    ///
    /// # Example
    /// ```
    /// # use newt::{Move, MoveKind, Square};
    /// let e2e4 = Move::new(Square::E2, Square::E4, MoveKind::PawnDoublePush);
    /// assert_eq!(e2e4.from(), Square::E2);
    /// assert_eq!(e2e4.to(), Square::E4);
    /// assert_eq!(e2e4.kind(), MoveKind::PawnDoublePush);
    /// assert_eq!(e2e4.to_string(), "e2e4");
    /// ```
    #[inline(always)]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        let flag = match kind {
            MoveKind::Normal => Self::FLAG_NORMAL,
            MoveKind::PawnDoublePush => Self::FLAG_DOUBLE_PUSH,
            MoveKind::EnPassant => Self::FLAG_EN_PASSANT,
            MoveKind::Castle => Self::FLAG_CASTLE,
            // Callers wanting a promotion should use `new_promotion`; default to a Queen.
            MoveKind::Promotion => Self::FLAG_PROMOTE_KNIGHT + 3,
        };
        Self::from_parts(from, to, flag)
    }

    /// Creates a promotion to `promotion`, which must be a Knight, Bishop, Rook, or Queen.
    ///
    /// # Example
    /// ```
    /// # use newt::{Move, MoveKind, PieceKind, Square};
    /// let mv = Move::new_promotion(Square::E7, Square::E8, PieceKind::Knight);
    /// assert_eq!(mv.kind(), MoveKind::Promotion);
    /// assert_eq!(mv.promotion(), Some(PieceKind::Knight));
    /// assert_eq!(mv.to_string(), "e7e8n");
    /// ```
    #[inline(always)]
    pub const fn new_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        debug_assert!(
            !matches!(promotion, PieceKind::Pawn | PieceKind::King),
            "Pawns may only promote to a Knight, Bishop, Rook, or Queen"
        );
        let offset = promotion as u16 - PieceKind::Knight as u16;
        Self::from_parts(from, to, Self::FLAG_PROMOTE_KNIGHT + offset)
    }

    #[inline(always)]
    const fn from_parts(from: Square, to: Square, flag: u16) -> Self {
        Self(flag << Self::FLG_BITS | (to.0 as u16) << Self::DST_BITS | from.0 as u16)
    }

    /// The square this move starts on.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square((self.0 & Self::SRC_MASK) as u8)
    }

    /// The square this move ends on.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square(((self.0 & Self::DST_MASK) >> Self::DST_BITS) as u8)
    }

    #[inline(always)]
    const fn flag(&self) -> u16 {
        self.0 >> Self::FLG_BITS
    }

    /// The [`MoveKind`] of this move.
    #[inline(always)]
    pub const fn kind(&self) -> MoveKind {
        match self.flag() {
            Self::FLAG_NORMAL => MoveKind::Normal,
            Self::FLAG_DOUBLE_PUSH => MoveKind::PawnDoublePush,
            Self::FLAG_EN_PASSANT => MoveKind::EnPassant,
            Self::FLAG_CASTLE => MoveKind::Castle,
            _ => MoveKind::Promotion,
        }
    }

    /// The piece this move promotes to, if it is a promotion.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        match self.flag() {
            4 => Some(PieceKind::Knight),
            5 => Some(PieceKind::Bishop),
            6 => Some(PieceKind::Rook),
            7 => Some(PieceKind::Queen),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn is_castle(&self) -> bool {
        self.flag() == Self::FLAG_CASTLE
    }

    #[inline(always)]
    pub const fn is_en_passant(&self) -> bool {
        self.flag() == Self::FLAG_EN_PASSANT
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.flag() >= Self::FLAG_PROMOTE_KNIGHT
    }
}

impl fmt::Display for Move {
    /// Formats the move in UCI notation, such as `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promotion) = self.promotion() {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    /// Formats the move in UCI notation, followed by its kind.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({:?})", self.kind())
    }
}

impl<T: AsRef<str>> PartialEq<T> for Move {
    fn eq(&self, other: &T) -> bool {
        self.to_string() == other.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_promotion_round_trips() {
        for kind in PieceKind::promotions() {
            let mv = Move::new_promotion(Square::B2, Square::A1, kind);
            assert_eq!(mv.from(), Square::B2);
            assert_eq!(mv.to(), Square::A1);
            assert_eq!(mv.kind(), MoveKind::Promotion);
            assert_eq!(mv.promotion(), Some(kind));
            assert!(mv.is_promotion());
        }
    }

    #[test]
    fn test_non_promotions_have_no_promotion_piece() {
        for kind in [
            MoveKind::Normal,
            MoveKind::PawnDoublePush,
            MoveKind::EnPassant,
            MoveKind::Castle,
        ] {
            let mv = Move::new(Square::H8, Square::A1, kind);
            assert_eq!(mv.kind(), kind);
            assert_eq!(mv.promotion(), None);
            assert_eq!(mv.from(), Square::H8);
            assert_eq!(mv.to(), Square::A1);
        }
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(Square::E1, Square::G1, MoveKind::Castle), "e1g1");
        assert_eq!(
            Move::new_promotion(Square::A2, Square::A1, PieceKind::Rook),
            "a2a1r"
        );
    }
}
