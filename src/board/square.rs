/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use super::{Bitboard, BoardError, Color};

/// Represents a single square on a `8x8` chess board.
///
/// Squares use [Little-Endian Rank-File Mapping (LERF)](https://www.chessprogramming.org/Square_Mapping_Considerations#Little-Endian_Rank-File_Mapping):
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

/// Defines a `const` for every square, in index order.
macro_rules! impl_square_consts {
    ($($name:ident),* $(,)?) => {
        impl Square {
            impl_square_consts!(@step 0u8 $(, $name)*);
        }
    };
    (@step $idx:expr, $name:ident $(, $rest:ident)*) => {
        pub const $name: Self = Self($idx);
        impl_square_consts!(@step $idx + 1u8 $(, $rest)*);
    };
    (@step $idx:expr) => {};
}

#[rustfmt::skip]
impl_square_consts!(
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
);

impl Square {
    pub const MAX: u8 = 63;
    pub const COUNT: usize = 64;

    /// Returns an iterator over all squares, from `a1` to `h8`.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// let mut iter = Square::iter();
    /// assert_eq!(iter.len(), 64);
    /// assert_eq!(iter.next().unwrap(), Square::A1);
    /// assert_eq!(iter.last().unwrap(), Square::H8);
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..=Self::MAX).map(Self)
    }

    /// Creates a new [`Square`] from the provided [`File`] and [`Rank`].
    ///
    /// # Example
    /// ```
    /// # use newt::{Square, File, Rank};
    /// assert_eq!(Square::new(File::C, Rank::FOUR), Square::C4);
    /// ```
    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(rank.0 << 3 | file.0)
    }

    /// Creates a new [`Square`] from an index, without bounds checking in release builds.
    ///
    /// # Panics
    /// In debug builds, if `index` is greater than `63`.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT, "Square index must be between [0,64)");
        Self(index as u8)
    }

    /// The [`File`] of this square.
    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 & 0b111)
    }

    /// The [`Rank`] of this square.
    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Index of this square, for use in arrays of length [`Square::COUNT`].
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is a light square (`h1` is light, `a1` is dark).
    #[inline(always)]
    pub const fn is_light(&self) -> bool {
        (self.file().0 + self.rank().0) % 2 == 1
    }

    /// Mirrors this square vertically if `color` is Black.
    ///
    /// # Example
    /// ```
    /// # use newt::{Color, Square};
    /// assert_eq!(Square::E2.rank_relative_to(Color::White), Square::E2);
    /// assert_eq!(Square::E2.rank_relative_to(Color::Black), Square::E7);
    /// ```
    #[inline(always)]
    pub const fn rank_relative_to(self, color: Color) -> Self {
        match color {
            Color::White => self,
            Color::Black => Self(self.0 ^ 56),
        }
    }

    /// Attempt to offset this [`Square`] by the file and rank deltas.
    ///
    /// Returns `None` if the result would fall off the board.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::C4.offset(1, 1), Some(Square::D5));
    /// assert_eq!(Square::A1.offset(-1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file().0 as i8 + file_delta;
        let rank = self.rank().0 as i8 + rank_delta;

        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            return None;
        }

        Some(Self((rank as u8) << 3 | file as u8))
    }

    /// The square one rank "behind" this one, from `color`'s perspective.
    ///
    /// Used to find the pawn captured en passant, which sits behind the destination square.
    #[inline(always)]
    pub const fn backward(&self, color: Color) -> Option<Self> {
        self.offset(0, -color.negation_multiplier())
    }

    /// Number of files plus ranks between `self` and `other`.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::C5.distance_manhattan(Square::B4), 2);
    /// assert_eq!(Square::A1.distance_manhattan(Square::H8), 14);
    /// ```
    #[inline(always)]
    pub const fn distance_manhattan(&self, other: Self) -> u8 {
        self.file().0.abs_diff(other.file().0) + self.rank().0.abs_diff(other.rank().0)
    }

    /// [Manhattan distance](https://www.chessprogramming.org/Center_Distance) to the nearest of the four center squares.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::E5.center_distance(), 0);
    /// assert_eq!(Square::C6.center_distance(), 2);
    /// assert_eq!(Square::A1.center_distance(), 6);
    /// ```
    #[inline(always)]
    pub const fn center_distance(&self) -> u8 {
        let (file, rank) = (self.file().0, self.rank().0);
        let file_dist = if file < 4 { 3 - file } else { file - 4 };
        let rank_dist = if rank < 4 { 3 - rank } else { rank - 4 };
        file_dist + rank_dist
    }

    /// Alias for [`Bitboard::from_square`].
    #[inline(always)]
    pub const fn bitboard(&self) -> Bitboard {
        Bitboard::from_square(*self)
    }

    /// Parses a [`Square`] from UCI notation, such as `e4`.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::from_uci("c4").unwrap(), Square::C4);
    /// assert!(Square::from_uci("z0").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self, BoardError> {
        let err = || BoardError::InvalidSquare(square.to_string());

        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(err());
        };

        let file = File::from_char(file).ok_or_else(err)?;
        let rank = Rank::from_char(rank).ok_or_else(err)?;

        Ok(Self::new(file, rank))
    }
}

impl FromStr for Square {
    type Err = BoardError;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}

/// One of the eight files (columns) of the board.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
#[repr(transparent)]
pub struct File(pub(crate) u8);

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);

    pub const COUNT: usize = 8;

    /// Iterates `a` through `h`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Parses a file character (`a`-`h`).
    #[inline(always)]
    pub fn from_char(file: char) -> Option<Self> {
        matches!(file, 'a'..='h').then(|| Self(file as u8 - b'a'))
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'a') as char
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// One of the eight ranks (rows) of the board.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
#[repr(transparent)]
pub struct Rank(pub(crate) u8);

impl Rank {
    pub const ONE: Self = Self(0);
    pub const TWO: Self = Self(1);
    pub const THREE: Self = Self(2);
    pub const FOUR: Self = Self(3);
    pub const FIVE: Self = Self(4);
    pub const SIX: Self = Self(5);
    pub const SEVEN: Self = Self(6);
    pub const EIGHT: Self = Self(7);

    pub const COUNT: usize = 8;

    /// Iterates `1` through `8`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Parses a rank character (`1`-`8`).
    #[inline(always)]
    pub fn from_char(rank: char) -> Option<Self> {
        matches!(rank, '1'..='8').then(|| Self(rank as u8 - b'1'))
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'1') as char
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_consts_follow_lerf() {
        assert_eq!(Square::A1.index(), 0);
        assert_eq!(Square::H1.index(), 7);
        assert_eq!(Square::E4.index(), 28);
        assert_eq!(Square::A8.index(), 56);
        assert_eq!(Square::H8.index(), 63);
    }

    #[test]
    fn test_square_uci_round_trip() {
        for square in Square::iter() {
            assert_eq!(Square::from_uci(&square.to_string()), Ok(square));
        }

        assert!(Square::from_uci("").is_err());
        assert!(Square::from_uci("e").is_err());
        assert!(Square::from_uci("e9").is_err());
        assert!(Square::from_uci("i1").is_err());
        assert!(Square::from_uci("e44").is_err());
    }

    #[test]
    fn test_square_colors() {
        assert!(!Square::A1.is_light());
        assert!(Square::H1.is_light());
        assert!(Square::D1.is_light());
        assert!(!Square::D8.is_light());
    }

    #[test]
    fn test_backward() {
        assert_eq!(Square::E6.backward(Color::White), Some(Square::E5));
        assert_eq!(Square::E3.backward(Color::Black), Some(Square::E4));
        assert_eq!(Square::E1.backward(Color::White), None);
    }
}
