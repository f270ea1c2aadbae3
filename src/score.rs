/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use uci_parser::UciScore;

use crate::MAX_DEPTH;

/// A numerical representation of the evaluation of a position / move, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Scores are always relative to the side to move. Mate scores count down from [`Self::MATE`]
/// by the number of plies it takes to deliver mate, so shorter mates score higher.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Largest possible score ever achievable.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Score of mate in the current position.
    pub const MATE: Self = Self(Self::INF.0 - 1);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Lowest possible score for mate.
    ///
    /// This is only obtainable if mate is possible in [`MAX_DEPTH`] plies.
    pub const LOWEST_MATE: Self = Self(Self::MATE.0 - MAX_DEPTH as i32);

    /// Score of the side to move being checkmated, `ply` plies from the root.
    ///
    /// # Example
    /// ```
    /// # use newt::Score;
    /// assert!(Score::mated_in(1) < Score::mated_in(3));
    /// assert!(Score::mated_in(1).is_mate());
    /// ```
    #[inline(always)]
    pub const fn mated_in(ply: i32) -> Self {
        Self(-(Self::MATE.0 - ply))
    }

    /// Returns `true` if the score is a mate score.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::LOWEST_MATE.0
    }

    /// Converts this [`Score`] into a [`UciScore`],
    /// determining whether it is a centipawns score or a mate score.
    ///
    /// Used when sending the `info score` message.
    #[inline(always)]
    pub fn into_uci(self) -> UciScore {
        if self.is_mate() {
            UciScore::mate(self.moves_to_mate())
        } else {
            UciScore::cp(self.0)
        }
    }

    /// Returns the number of plies (half moves) this score is from mate.
    #[inline(always)]
    pub const fn plies_to_mate(&self) -> i32 {
        Self::MATE.0 - self.0.abs()
    }

    /// Returns the number of moves (full moves) this score is from mate.
    ///
    /// Positive if the side to move delivers mate, negative if it gets mated.
    ///
    /// # Example
    /// ```
    /// # use newt::Score;
    /// // We mate on our next move (1 ply)
    /// assert_eq!((Score::MATE - 1).moves_to_mate(), 1);
    /// // We mate with our second move (3 plies)
    /// assert_eq!((Score::MATE - 3).moves_to_mate(), 2);
    /// // We get mated after our move and their reply (2 plies)
    /// assert_eq!(Score::mated_in(2).moves_to_mate(), -1);
    /// ```
    #[inline(always)]
    pub const fn moves_to_mate(&self) -> i32 {
        let plies = self.plies_to_mate();

        // The mating side must make the final move itself, which rounds its count up
        let relative_to_side = if self.0 > 0 { plies + 1 } else { -plies };

        relative_to_side / 2
    }

    /// The score in pawns rather than centipawns.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl From<Score> for UciScore {
    #[inline(always)]
    fn from(value: Score) -> Self {
        value.into_uci()
    }
}

impl std::ops::Sub<i32> for Score {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: i32) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(
                f,
                "{} (mate in {} plies, {} moves)",
                self.0,
                self.plies_to_mate(),
                self.moves_to_mate()
            )
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores() {
        let plies = 3;

        let our_mate = Score::MATE - plies;
        assert_eq!(our_mate.plies_to_mate(), plies);
        assert!(our_mate.is_mate());

        let their_mate = Score::mated_in(plies);
        assert_eq!(their_mate, -our_mate);
        assert_eq!(their_mate.plies_to_mate(), plies);

        assert!(!Score(900).is_mate());
        assert!(!Score::DRAW.is_mate());
        assert!(Score::LOWEST_MATE.is_mate());
        assert!(!(Score::LOWEST_MATE - 1).is_mate());
    }

    #[test]
    fn test_shorter_mates_score_higher() {
        for ply in 1..MAX_DEPTH as i32 {
            assert!(Score::MATE - ply > Score::MATE - (ply + 1));
            assert!(Score::mated_in(ply) < Score::mated_in(ply + 1));
        }
    }
}
