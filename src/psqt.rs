/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::{AddAssign, SubAssign};

use crate::{Color, Piece, PieceKind, Square};

// Middle-game and end-game tables from [PeSTO](https://www.chessprogramming.org/PeSTO%27s_Evaluation_Function#Source_Code),
// written as seen from White with rank 8 on top.

#[rustfmt::skip]
const PAWN_MG: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,  0,   0,
     98, 134,  61,  95,  68, 126, 34, -11,
     -6,   7,  26,  31,  65,  56, 25, -20,
    -14,  13,   6,  21,  23,  12, 17, -23,
    -27,  -2,  -5,  12,  17,   6, 10, -25,
    -26,  -4,  -4, -10,   3,   3, 33, -12,
    -35,  -1, -20, -23, -15,  24, 38, -22,
      0,   0,   0,   0,   0,   0,  0,   0,
]);

#[rustfmt::skip]
const PAWN_EG: Psqt = Psqt::new([
      0,   0,   0,   0,   0,   0,   0,   0,
    178, 173, 158, 134, 147, 132, 165, 187,
     94, 100,  85,  67,  56,  53,  82,  84,
     32,  24,  13,   5,  -2,   4,  17,  17,
     13,   9,  -3,  -7,  -7,  -8,   3,  -1,
      4,   7,  -6,   1,   0,  -5,  -1,  -8,
     13,   8,   8,  10,  13,   0,   2,  -7,
      0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
const KNIGHT_MG: Psqt = Psqt::new([
    -167, -89, -34, -49,  61, -97, -15, -107,
     -73, -41,  72,  36,  23,  62,   7,  -17,
     -47,  60,  37,  65,  84, 129,  73,   44,
      -9,  17,  19,  53,  37,  69,  18,   22,
     -13,   4,  16,  13,  28,  19,  21,   -8,
     -23,  -9,  12,  10,  19,  17,  25,  -16,
     -29, -53, -12,  -3,  -1,  18, -14,  -19,
    -105, -21, -58, -33, -17, -28, -19,  -23,
]);

#[rustfmt::skip]
const KNIGHT_EG: Psqt = Psqt::new([
    -58, -38, -13, -28, -31, -27, -63, -99,
    -25,  -8, -25,  -2,  -9, -25, -24, -52,
    -24, -20,  10,   9,  -1,  -9, -19, -41,
    -17,   3,  22,  22,  22,  11,   8, -18,
    -18,  -6,  16,  25,  16,  17,   4, -18,
    -23,  -3,  -1,  15,  10,  -3, -20, -22,
    -42, -20, -10,  -5,  -2, -20, -23, -44,
    -29, -51, -23, -15, -22, -18, -50, -64,
]);

#[rustfmt::skip]
const BISHOP_MG: Psqt = Psqt::new([
    -29,   4, -82, -37, -25, -42,   7,  -8,
    -26,  16, -18, -13,  30,  59,  18, -47,
    -16,  37,  43,  40,  35,  50,  37,  -2,
     -4,   5,  19,  50,  37,  37,   7,  -2,
     -6,  13,  13,  26,  34,  12,  10,   4,
      0,  15,  15,  15,  14,  27,  18,  10,
      4,  15,  16,   0,   7,  21,  33,   1,
    -33,  -3, -14, -21, -13, -12, -39, -21,
]);

#[rustfmt::skip]
const BISHOP_EG: Psqt = Psqt::new([
    -14, -21, -11,  -8, -7,  -9, -17, -24,
     -8,  -4,   7, -12, -3, -13,  -4, -14,
      2,  -8,   0,  -1, -2,   6,   0,   4,
     -3,   9,  12,   9, 14,  10,   3,   2,
     -6,   3,  13,  19,  7,  10,  -3,  -9,
    -12,  -3,   8,  10, 13,   3,  -7, -15,
    -14, -18,  -7,  -1,  4,  -9, -15, -27,
    -23,  -9, -23,  -5, -9, -16,  -5, -17,
]);

#[rustfmt::skip]
const ROOK_MG: Psqt = Psqt::new([
     32,  42,  32,  51, 63,  9,  31,  43,
     27,  32,  58,  62, 80, 67,  26,  44,
     -5,  19,  26,  36, 17, 45,  61,  16,
    -24, -11,   7,  26, 24, 35,  -8, -20,
    -36, -26, -12,  -1,  9, -7,   6, -23,
    -45, -25, -16, -17,  3,  0,  -5, -33,
    -44, -16, -20,  -9, -1, 11,  -6, -71,
    -19, -13,   1,  17, 16,  7, -37, -26,
]);

#[rustfmt::skip]
const ROOK_EG: Psqt = Psqt::new([
    13, 10, 18, 15, 12,  12,   8,   5,
    11, 13, 13, 11, -3,   3,   8,   3,
     7,  7,  7,  5,  4,  -3,  -5,  -3,
     4,  3, 13,  1,  2,   1,  -1,   2,
     3,  5,  8,  4, -5,  -6,  -8, -11,
    -4,  0, -5, -1, -7, -12,  -8, -16,
    -6, -6,  0,  2, -9,  -9, -11,  -3,
    -9,  2,  3, -1, -5, -13,   4, -20,
]);

#[rustfmt::skip]
const QUEEN_MG: Psqt = Psqt::new([
    -28,   0,  29,  12,  59,  44,  43,  45,
    -24, -39,  -5,   1, -16,  57,  28,  54,
    -13, -17,   7,   8,  29,  56,  47,  57,
    -27, -27, -16, -16,  -1,  17,  -2,   1,
     -9, -26,  -9, -10,  -2,  -4,   3,  -3,
    -14,   2, -11,  -2,  -5,   2,  14,   5,
    -35,  -8,  11,   2,   8,  15,  -3,   1,
     -1, -18,  -9,  10, -15, -25, -31, -50,
]);

#[rustfmt::skip]
const QUEEN_EG: Psqt = Psqt::new([
     -9,  22,  22,  27,  27,  19,  10,  20,
    -17,  20,  32,  41,  58,  25,  30,   0,
    -20,   6,   9,  49,  47,  35,  19,   9,
      3,  22,  24,  45,  57,  40,  57,  36,
    -18,  28,  19,  47,  31,  34,  39,  23,
    -16, -27,  15,   6,   9,  17,  10,   5,
    -22, -23, -30, -16, -16, -23, -36, -32,
    -33, -28, -22, -43,  -5, -32, -20, -41,
]);

#[rustfmt::skip]
const KING_MG: Psqt = Psqt::new([
    -65,  23,  16, -15, -56, -34,   2,  13,
     29,  -1, -20,  -7,  -8,  -4, -38, -29,
     -9,  24,   2, -16, -20,   6,  22, -22,
    -17, -20, -12, -27, -30, -25, -14, -36,
    -49,  -1, -27, -39, -46, -44, -33, -51,
    -14, -14, -22, -46, -44, -30, -15, -27,
      1,   7,  -8, -64, -43, -16,   9,   8,
    -15,  36,  12, -54,   8, -28,  24,  14,
]);

#[rustfmt::skip]
const KING_EG: Psqt = Psqt::new([
    -74, -35, -18, -18, -11,  15,   4, -17,
    -12,  17,  14,  17,  17,  38,  23,  11,
     10,  17,  23,  15,  20,  45,  44,  13,
     -8,  22,  24,  27,  26,  33,  26,   3,
    -18,  -4,  21,  24,  27,  23,   9, -11,
    -19,  -3,  11,  21,  23,  16,   7,  -9,
    -27, -11,   4,  13,  14,   4,  -5, -17,
    -53, -34, -21, -11, -28, -14, -24, -43,
]);

/// Positional bonus for `piece` standing on `square`, from the piece owner's perspective.
///
/// Material is not included; see [`PieceKind::value`].
///
/// # Example
/// ```
/// # use newt::{psqt, Piece, Square};
/// // A knight in the center is worth more than one in the corner
/// assert!(psqt::value(Piece::WHITE_KNIGHT, Square::E4).mg > psqt::value(Piece::WHITE_KNIGHT, Square::A1).mg);
/// // Both colors see the same table, mirrored
/// assert_eq!(
///     psqt::value(Piece::WHITE_PAWN, Square::E4),
///     psqt::value(Piece::BLACK_PAWN, Square::E5)
/// );
/// ```
#[inline(always)]
pub const fn value(piece: Piece, square: Square) -> Tapered {
    let (mg, eg) = Psqt::tables_for(piece.kind());
    Tapered {
        mg: mg.get_relative(square, piece.color()),
        eg: eg.get_relative(square, piece.color()),
    }
}

/// A pair of middle-game and end-game scores, blended by how far the game has progressed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Tapered {
    pub mg: i32,
    pub eg: i32,
}

impl Tapered {
    pub const ZERO: Self = Self { mg: 0, eg: 0 };

    /// Interpolates from `mg` to `eg` by `endgame_weight`, which is in `[0, 100]`.
    ///
    /// # Example
    /// ```
    /// # use newt::psqt::Tapered;
    /// let score = Tapered { mg: 20, eg: -20 };
    /// assert_eq!(score.lerp(0), 20);
    /// assert_eq!(score.lerp(50), 0);
    /// assert_eq!(score.lerp(100), -20);
    /// ```
    #[inline(always)]
    pub const fn lerp(self, endgame_weight: i32) -> i32 {
        self.mg + (self.eg - self.mg) * endgame_weight / 100
    }
}

impl AddAssign for Tapered {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.mg += rhs.mg;
        self.eg += rhs.eg;
    }
}

impl SubAssign for Tapered {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        self.mg -= rhs.mg;
        self.eg -= rhs.eg;
    }
}

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables), indexed from White's perspective.
#[derive(Debug)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// The middle-game and end-game tables for `kind`.
    #[inline(always)]
    pub const fn tables_for(kind: PieceKind) -> (&'static Self, &'static Self) {
        match kind {
            PieceKind::Pawn => (&PAWN_MG, &PAWN_EG),
            PieceKind::Knight => (&KNIGHT_MG, &KNIGHT_EG),
            PieceKind::Bishop => (&BISHOP_MG, &BISHOP_EG),
            PieceKind::Rook => (&ROOK_MG, &ROOK_EG),
            PieceKind::Queen => (&QUEEN_MG, &QUEEN_EG),
            PieceKind::King => (&KING_MG, &KING_EG),
        }
    }

    const fn new(table: [i32; Square::COUNT]) -> Self {
        let mut flipped = table;

        let mut i = 0;
        while i < table.len() {
            // Tables are written rank 8 first, so flip the rank to index by LERF square
            flipped[i] = table[i ^ 56];
            i += 1;
        }

        Self(flipped)
    }

    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Value at `square` for a piece of `color`. Black reads the table mirrored vertically.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, color: Color) -> i32 {
        self.get(square.rank_relative_to(color))
    }
}
