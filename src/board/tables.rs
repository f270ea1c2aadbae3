/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Bitboard, Color, Square};

/// Deltas for the movement of the Knight.
const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Deltas for the movement of the King.
const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const KING_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&KING_DELTAS);
const KNIGHT_ATTACKS: [Bitboard; Square::COUNT] = generate_leaper_mobility(&KNIGHT_DELTAS);

const PAWN_PUSHES: [[Bitboard; Square::COUNT]; Color::COUNT] = [
    generate_pawn_pushes(Color::White, 1),
    generate_pawn_pushes(Color::Black, 1),
];
const PAWN_DOUBLE_PUSHES: [[Bitboard; Square::COUNT]; Color::COUNT] = [
    generate_pawn_pushes(Color::White, 2),
    generate_pawn_pushes(Color::Black, 2),
];
const PAWN_ATTACKS: [[Bitboard; Square::COUNT]; Color::COUNT] = [
    generate_pawn_attacks(Color::White),
    generate_pawn_attacks(Color::Black),
];

/// Every square on the same file as the index square, excluding the index square.
const FILE_MASKS: [Bitboard; Square::COUNT] = generate_line_masks(0, 1);
/// Every square on the same rank as the index square, excluding the index square.
const RANK_MASKS: [Bitboard; Square::COUNT] = generate_line_masks(1, 0);
/// The a1-h8 direction diagonal through the index square, excluding the index square.
const DIAG_MASKS: [Bitboard; Square::COUNT] = generate_line_masks(1, 1);
/// The h1-a8 direction diagonal through the index square, excluding the index square.
const ANTI_DIAG_MASKS: [Bitboard; Square::COUNT] = generate_line_masks(-1, 1);

/// Squares a King on `square` attacks.
#[inline(always)]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square.index()]
}

/// Squares a Knight on `square` attacks.
#[inline(always)]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square.index()]
}

/// The square a `color` Pawn on `square` may push to, ignoring occupancy.
#[inline(always)]
pub const fn pawn_pushes(color: Color, square: Square) -> Bitboard {
    PAWN_PUSHES[color.index()][square.index()]
}

/// The square a `color` Pawn on `square` may double-push to, ignoring occupancy.
///
/// Empty unless `square` is on `color`'s Pawn starting rank.
#[inline(always)]
pub const fn pawn_double_pushes(color: Color, square: Square) -> Bitboard {
    PAWN_DOUBLE_PUSHES[color.index()][square.index()]
}

/// Squares a `color` Pawn on `square` attacks.
#[inline(always)]
pub const fn pawn_attacks(color: Color, square: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][square.index()]
}

#[inline(always)]
pub const fn file_mask(square: Square) -> Bitboard {
    FILE_MASKS[square.index()]
}

#[inline(always)]
pub const fn rank_mask(square: Square) -> Bitboard {
    RANK_MASKS[square.index()]
}

#[inline(always)]
pub const fn diag_mask(square: Square) -> Bitboard {
    DIAG_MASKS[square.index()]
}

#[inline(always)]
pub const fn anti_diag_mask(square: Square) -> Bitboard {
    ANTI_DIAG_MASKS[square.index()]
}

/// Squares a Rook on `square` attacks, given the board's `occupied` squares.
///
/// Each ray runs up to and including the first occupied square, or to the edge of the board.
///
/// # Example
/// ```
/// # use newt::{rook_attacks, Bitboard, Square};
/// let blockers = Square::D6.bitboard() | Square::F4.bitboard();
/// let attacks = rook_attacks(Square::D4, blockers);
/// assert!(attacks.contains(Square::D6));
/// assert!(!attacks.contains(Square::D7));
/// assert!(attacks.contains(Square::F4));
/// assert!(!attacks.contains(Square::G4));
/// assert!(attacks.contains(Square::A4));
/// assert!(attacks.contains(Square::D1));
/// ```
#[inline(always)]
pub const fn rook_attacks(square: Square, occupied: Bitboard) -> Bitboard {
    line_attacks(square, occupied, file_mask(square))
        .or(line_attacks(square, occupied, rank_mask(square)))
}

/// Squares a Bishop on `square` attacks, given the board's `occupied` squares.
#[inline(always)]
pub const fn bishop_attacks(square: Square, occupied: Bitboard) -> Bitboard {
    line_attacks(square, occupied, diag_mask(square))
        .or(line_attacks(square, occupied, anti_diag_mask(square)))
}

/// Squares a Queen on `square` attacks, given the board's `occupied` squares.
#[inline(always)]
pub const fn queen_attacks(square: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(square, occupied).or(bishop_attacks(square, occupied))
}

/// Casts rays in both directions from `square` along `mask`, stopping at (and including) the first blocker.
///
/// Uses [Hyperbola Quintessence](https://www.chessprogramming.org/Hyperbola_Quintessence):
/// subtracting the slider from the masked occupancy flips every bit up to the first blocker.
/// The same trick on the bit-reversed board handles the opposite direction.
#[inline(always)]
const fn line_attacks(square: Square, occupied: Bitboard, mask: Bitboard) -> Bitboard {
    let slider = square.bitboard().inner();
    let occ = occupied.inner() & mask.inner();

    let forward = occ.wrapping_sub(slider.wrapping_mul(2));
    let reverse = occ
        .reverse_bits()
        .wrapping_sub(slider.reverse_bits().wrapping_mul(2))
        .reverse_bits();

    Bitboard::new((forward ^ reverse) & mask.inner())
}

const fn generate_leaper_mobility(deltas: &[(i8, i8)]) -> [Bitboard; Square::COUNT] {
    let mut boards = [Bitboard::EMPTY_BOARD; Square::COUNT];
    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut j = 0;
        while j < deltas.len() {
            let (df, dr) = deltas[j];
            if let Some(to) = square.offset(df, dr) {
                boards[i] = boards[i].or(to.bitboard());
            }
            j += 1;
        }
        i += 1;
    }
    boards
}

const fn generate_pawn_pushes(color: Color, distance: i8) -> [Bitboard; Square::COUNT] {
    let mut boards = [Bitboard::EMPTY_BOARD; Square::COUNT];
    let start_rank = match color {
        Color::White => 1,
        Color::Black => 6,
    };

    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);

        // Double pushes are only available from the starting rank
        let allowed = distance == 1 || square.rank().0 == start_rank;
        if allowed {
            if let Some(to) = square.offset(0, distance * color.negation_multiplier()) {
                boards[i] = to.bitboard();
            }
        }
        i += 1;
    }
    boards
}

const fn generate_pawn_attacks(color: Color) -> [Bitboard; Square::COUNT] {
    let mut boards = [Bitboard::EMPTY_BOARD; Square::COUNT];
    let mut i = 0;
    while i < Square::COUNT {
        // Shifting with the edge masks stops captures from wrapping around the board
        let forward = Square::from_index_unchecked(i).bitboard().forward(color);
        boards[i] = forward.east().or(forward.west());
        i += 1;
    }
    boards
}

/// Builds the line through every square along `(df, dr)` and its opposite, excluding the square itself.
const fn generate_line_masks(df: i8, dr: i8) -> [Bitboard; Square::COUNT] {
    let mut boards = [Bitboard::EMPTY_BOARD; Square::COUNT];
    let mut i = 0;
    while i < Square::COUNT {
        let from = Square::from_index_unchecked(i);
        let mut mask = Bitboard::EMPTY_BOARD;

        let mut to = from;
        while let Some(next) = to.offset(df, dr) {
            mask = mask.or(next.bitboard());
            to = next;
        }

        to = from;
        while let Some(next) = to.offset(-df, -dr) {
            mask = mask.or(next.bitboard());
            to = next;
        }

        boards[i] = mask;
        i += 1;
    }
    boards
}
