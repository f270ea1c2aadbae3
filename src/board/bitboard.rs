/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Not};

use super::{File, Rank, Square};

/// A [`Bitboard`] represents a set of squares as the bits of a `u64`.
///
/// Bit `i` is set if and only if [`Square`] `i` is in the set.
/// Squares follow [Little-Endian Rank-File Mapping (LERF)](https://www.chessprogramming.org/Square_Mapping_Considerations#Little-Endian_Rank-File_Mapping),
/// so a bitboard of the first rank looks like this when printed with rank 8 on top:
/// ```text
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 00000000
/// 11111111
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Bitboard(pub(crate) u64);

impl Bitboard {
    pub const FILE_A: Self = Self(0x0101010101010101);
    pub const FILE_H: Self = Self(0x8080808080808080);
    pub const NOT_FILE_A: Self = Self(0xfefefefefefefefe);
    pub const NOT_FILE_H: Self = Self(0x7f7f7f7f7f7f7f7f);
    pub const RANK_1: Self = Self(0x00000000000000FF);
    pub const RANK_2: Self = Self(0x000000000000FF00);
    pub const RANK_7: Self = Self(0x00FF000000000000);
    pub const RANK_8: Self = Self(0xFF00000000000000);
    pub const LIGHT_SQUARES: Self = Self(0x55AA55AA55AA55AA);
    pub const DARK_SQUARES: Self = Self(0xAA55AA55AA55AA55);
    pub const EMPTY_BOARD: Self = Self(0);
    pub const FULL_BOARD: Self = Self(u64::MAX);

    /// Constructs a new [`Bitboard`] from the provided bit pattern.
    ///
    /// # Example
    /// ```
    /// # use newt::Bitboard;
    /// let board = Bitboard::new(255);
    /// assert_eq!(board, Bitboard::RANK_1);
    /// ```
    #[inline(always)]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Constructs a [`Bitboard`] with only `square` set.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// assert_eq!(Bitboard::from_square(Square::H8).inner(), 0x8000000000000000);
    /// ```
    #[inline(always)]
    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.0)
    }

    /// The inner `u64`.
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    /// Returns `true` if `self` and `other` share at least one square.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// assert!(Bitboard::RANK_1.intersects(Square::E1.bitboard()));
    /// assert!(!Bitboard::RANK_1.intersects(Bitboard::RANK_8));
    /// ```
    #[inline(always)]
    pub const fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if `square` is in this set.
    #[inline(always)]
    pub const fn contains(&self, square: Square) -> bool {
        self.0 & (1 << square.0) != 0
    }

    /// Number of squares in this set.
    ///
    /// # Example
    /// ```
    /// # use newt::Bitboard;
    /// assert_eq!(Bitboard::FILE_A.population(), 8);
    /// ```
    #[inline(always)]
    pub const fn population(&self) -> u8 {
        self.0.count_ones() as u8
    }

    /// The lowest set square, if any.
    #[inline(always)]
    pub const fn lsb(&self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square(self.0.trailing_zeros() as u8))
        }
    }

    /// Removes and returns the lowest set square, if any.
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let lsb = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(lsb)
    }

    /// Adds every square of `other` to this set.
    #[inline(always)]
    pub fn set(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Removes every square of `other` from this set.
    #[inline(always)]
    pub fn clear(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Shifts every square one rank up, dropping anything that leaves the board.
    #[inline(always)]
    pub const fn north(self) -> Self {
        Self(self.0 << 8)
    }

    #[inline(always)]
    pub const fn south(self) -> Self {
        Self(self.0 >> 8)
    }

    /// Shifts every square one file right. Squares on the h-file are masked off before shifting,
    /// so nothing wraps onto the a-file.
    #[inline(always)]
    pub const fn east(self) -> Self {
        Self((self.0 & Self::NOT_FILE_H.0) << 1)
    }

    #[inline(always)]
    pub const fn west(self) -> Self {
        Self((self.0 & Self::NOT_FILE_A.0) >> 1)
    }

    /// Shifts every square one rank forward from `color`'s perspective.
    #[inline(always)]
    pub const fn forward(self, color: super::Color) -> Self {
        match color {
            super::Color::White => self.north(),
            super::Color::Black => self.south(),
        }
    }

    /// `const` analog of `|`.
    #[inline(always)]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `const` analog of `&`.
    #[inline(always)]
    pub const fn and(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// An iterator over the squares in this set, from lowest to highest.
    #[inline(always)]
    pub const fn iter(&self) -> BitboardIter {
        BitboardIter(*self)
    }
}

macro_rules! impl_bitwise_op {
    ($op:ident, $op_assign:ident, $func:ident, $func_assign:ident) => {
        impl std::ops::$op for Bitboard {
            type Output = Self;
            #[inline(always)]
            fn $func(self, rhs: Self) -> Self::Output {
                Self(std::ops::$op::$func(self.0, rhs.0))
            }
        }

        impl std::ops::$op_assign for Bitboard {
            #[inline(always)]
            fn $func_assign(&mut self, rhs: Self) {
                std::ops::$op_assign::$func_assign(&mut self.0, rhs.0);
            }
        }
    };
}

impl_bitwise_op!(BitAnd, BitAndAssign, bitand, bitand_assign);
impl_bitwise_op!(BitOr, BitOrAssign, bitor, bitor_assign);
impl_bitwise_op!(BitXor, BitXorAssign, bitxor, bitxor_assign);

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY_BOARD, |bb, sq| bb | sq.bitboard())
    }
}

impl fmt::Display for Bitboard {
    /// Prints the board with rank 8 on top, using `X` for set squares and `.` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let c = if self.contains(Square::new(file, rank)) {
                    'X'
                } else {
                    '.'
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, " +----------------\n   a b c d e f g h")
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitboard(0x{:016X})", self.0)
    }
}

/// Iterates over the squares of a [`Bitboard`], lowest first.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_lsb()
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.population() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;
    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
