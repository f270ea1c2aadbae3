/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{Castling, Color, Piece, Square};

/// Keys used for hashing positions, generated once at compile time.
const KEYS: ZobristKeys = ZobristKeys::new();

/// A 64-bit hash of a position, used for repetition detection.
///
/// Two positions with the same pieces on the same squares, the same side to move,
/// the same castling rights, and the same en passant square have the same key.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct ZobristKey(u64);

impl ZobristKey {
    /// Computes a key from scratch out of the components of a position.
    pub fn from_parts(
        pieces: impl IntoIterator<Item = (Square, Piece)>,
        ep_square: Option<Square>,
        castling: &[Castling; Color::COUNT],
        side_to_move: Color,
    ) -> Self {
        let mut key = Self::default();

        for (square, piece) in pieces {
            key.hash_piece(square, piece);
        }
        key.hash_optional_ep_square(ep_square);
        key.hash_castling(castling);
        key.hash_side_to_move(side_to_move);

        key
    }

    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Toggles `piece` on `square` in or out of this key.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut key = ZobristKey::default();
    /// key.hash_piece(Square::D7, Piece::BLACK_PAWN);
    /// assert_ne!(key, ZobristKey::default());
    ///
    /// key.hash_piece(Square::D7, Piece::BLACK_PAWN);
    /// assert_eq!(key, ZobristKey::default());
    /// ```
    #[inline(always)]
    pub fn hash_piece(&mut self, square: Square, piece: Piece) {
        self.0 ^= KEYS.pieces[square.index()][piece.index()];
    }

    #[inline(always)]
    pub fn hash_optional_ep_square(&mut self, ep_square: Option<Square>) {
        if let Some(square) = ep_square {
            self.0 ^= KEYS.ep_files[square.file().index()];
        }
    }

    /// Toggles the combined castling rights of both players.
    ///
    /// Call once with the old rights and once with the new rights to update a key.
    #[inline(always)]
    pub fn hash_castling(&mut self, castling: &[Castling; Color::COUNT]) {
        let index = castling[Color::White.index()].index() << 2 | castling[Color::Black.index()].index();
        self.0 ^= KEYS.castling[index];
    }

    /// Toggles the side-to-move key. White's key is `0`, so this only changes the key for Black.
    #[inline(always)]
    pub fn hash_side_to_move(&mut self, color: Color) {
        if color == Color::Black {
            self.0 ^= KEYS.black_to_move;
        }
    }

    /// Toggles the side-to-move key unconditionally, as when a move passes the turn.
    #[inline(always)]
    pub fn flip_side_to_move(&mut self) {
        self.0 ^= KEYS.black_to_move;
    }
}

impl fmt::Display for ZobristKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl fmt::Debug for ZobristKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZobristKey({self})")
    }
}

struct ZobristKeys {
    pieces: [[u64; Piece::COUNT]; Square::COUNT],
    /// En passant is hashed by file, since the rank follows from the side to move.
    ep_files: [u64; 8],
    /// One key per combination of both players' castling rights.
    castling: [u64; 16],
    black_to_move: u64,
}

impl ZobristKeys {
    const fn new() -> Self {
        let mut pieces = [[0; Piece::COUNT]; Square::COUNT];
        let mut ep_files = [0; 8];
        let mut castling = [0; 16];
        let mut prng = XoShiRo::new();

        let mut i = 0;
        while i < Square::COUNT {
            let mut j = 0;
            while j < Piece::COUNT {
                let key;
                (key, prng) = prng.next_const();
                pieces[i][j] = key;
                j += 1;
            }
            i += 1;
        }

        i = 0;
        while i < ep_files.len() {
            let key;
            (key, prng) = prng.next_const();
            ep_files[i] = key;
            i += 1;
        }

        // The key for "no rights at all" stays 0
        i = 1;
        while i < castling.len() {
            let key;
            (key, prng) = prng.next_const();
            castling[i] = key;
            i += 1;
        }

        let (black_to_move, _) = prng.next_const();

        Self {
            pieces,
            ep_files,
            castling,
            black_to_move,
        }
    }
}

/// Four arbitrary seeds, fixed so keys are identical between compilations.
const SEEDS: [u64; 4] = [
    0x91C5AB3CEBFD5A71,
    0x06BA253B9DD897CD,
    0x8015B5E59CC275E9,
    0xF8F427FC5411DE53,
];

/// A `const` [xoshiro256**](https://prng.di.unimi.it/xoshiro256starstar.c) generator.
struct XoShiRo([u64; 4]);

impl XoShiRo {
    const fn new() -> Self {
        Self(SEEDS)
    }

    /// Returns the next number in the sequence along with the advanced generator.
    const fn next_const(self) -> (u64, Self) {
        let mut s = self.0;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        (result, Self(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_distinct() {
        let mut all = Vec::new();
        for square in KEYS.pieces {
            all.extend(square);
        }
        all.extend(KEYS.ep_files);
        all.extend(&KEYS.castling[1..]);
        all.push(KEYS.black_to_move);

        let count = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), count);
        assert!(!all.contains(&0));
    }

    #[test]
    fn test_side_to_move_changes_key() {
        let castling = [Castling::default(); Color::COUNT];
        let white = ZobristKey::from_parts(std::iter::empty(), None, &castling, Color::White);
        let black = ZobristKey::from_parts(std::iter::empty(), None, &castling, Color::Black);
        assert_eq!(white, ZobristKey::default());
        assert_ne!(white, black);
    }
}
