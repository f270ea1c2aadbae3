/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{psqt, tune, Board, Color, File, PieceKind, Rank, Score, Square};

/// Material of both sides in the starting position, Kings excluded.
const INITIAL_MATERIAL: i32 = 2
    * (PieceKind::Pawn.value() * 8
        + PieceKind::Knight.value() * 2
        + PieceKind::Bishop.value() * 2
        + PieceKind::Rook.value() * 2
        + PieceKind::Queen.value());

/// Encapsulates the logic of scoring a chess position.
///
/// The score is material plus piece-square bonuses, both of which the [`Board`] keeps up to date
/// as moves are made. Piece-square bonuses are blended from middle-game to end-game tables as
/// material comes off the board, and a side facing a lone King is rewarded for cornering it.
///
/// Positions are evaluated from the side-to-move's perspective:
/// if it is Black's turn, a position that is good for Black has a positive score.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    board: &'a Board,

    /// How far the game has progressed, in `[0, 100]`. `0` is a full board, `100` is bare Kings.
    pub(crate) endgame_weight: i32,
}

impl<'a> Evaluator<'a> {
    #[inline(always)]
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            endgame_weight: endgame_weight(board),
        }
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Evaluator, Score};
    /// assert_eq!(Evaluator::new(&Board::new()).eval(), Score::DRAW);
    ///
    /// // White is up a queen, so Black to move is losing
    /// let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
    /// assert!(Evaluator::new(&board).eval() < Score::DRAW);
    /// ```
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.eval_for(self.board.side_to_move())
    }

    /// Evaluate this position from `color`'s perspective.
    #[inline(always)]
    pub fn eval_for(&self, color: Color) -> Score {
        let side = |c: Color| self.board.material(c) + self.positional(c) + self.mop_up(c);
        Score(side(color) - side(!color))
    }

    /// Piece-square score of `color`, tapered by the endgame weight.
    #[inline(always)]
    fn positional(&self, color: Color) -> i32 {
        self.board.psqt(color).lerp(self.endgame_weight)
    }

    /// Bonus for `color` when the opponent has only a King left: push it to the edge and walk up to it.
    fn mop_up(&self, color: Color) -> i32 {
        if !self.board.is_lone_king(!color)
            || self.board.material(color) < PieceKind::Rook.value()
        {
            return 0;
        }

        let (Some(ours), Some(theirs)) = (
            self.board.king_square(color),
            self.board.king_square(!color),
        ) else {
            return 0;
        };

        let edge = theirs.center_distance() as i32 * tune::mop_up_edge_bonus!();
        let proximity =
            (14 - ours.distance_manhattan(theirs) as i32) * tune::mop_up_proximity_bonus!();
        edge + proximity
    }

    /// Contribution of the piece on `square`, from White's perspective.
    ///
    /// Only used when printing the evaluator.
    fn value_at(&self, square: Square) -> Option<Score> {
        self.board.piece_at(square).map(|piece| {
            let positional = psqt::value(piece, square).lerp(self.endgame_weight);
            let value = piece.kind().value() + positional;
            Score(value * piece.color().negation_multiplier() as i32)
        })
    }
}

impl fmt::Display for Evaluator<'_> {
    /// Prints every piece's contribution to the score (in pawns, White positive), then the total.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        divider(f)?;
        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;
            for file in File::iter() {
                let piece = self.board.piece_at(Square::new(file, rank));
                write!(f, "   {}   |", piece.map(|p| p.char()).unwrap_or(' '))?;
            }
            writeln!(f)?;

            write!(f, "  |")?;
            for file in File::iter() {
                match self.value_at(Square::new(file, rank)) {
                    Some(value) => write!(f, "{:^7}|", format!("{:+.2}", value.normalize()))?,
                    None => write!(f, "       |")?,
                }
            }
            writeln!(f)?;
            divider(f)?;
        }
        for file in File::iter() {
            write!(f, "       {file}")?;
        }
        writeln!(f)?;

        let color = self.board.side_to_move();
        let score = self.eval_for(color);
        let winning_side = if score > Score::DRAW {
            Some(color)
        } else if score < Score::DRAW {
            Some(!color)
        } else {
            None
        };

        writeln!(f)?;
        for c in Color::all() {
            writeln!(
                f,
                "{:>5}: material {:>5}, positional {:>5}, mop-up {:>4}",
                c.name(),
                self.board.material(c),
                self.positional(c),
                self.mop_up(c)
            )?;
        }
        writeln!(f, "Endgame weight: {}%", self.endgame_weight)?;
        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score} ({} to move)", color.name())
    }
}

/// Share of the starting material that has been traded off, in `[0, 100]`.
///
/// Promotions can push material above the starting amount, which counts as a full board.
#[inline(always)]
fn endgame_weight(board: &Board) -> i32 {
    let remaining = board.material(Color::White) + board.material(Color::Black);
    (INITIAL_MATERIAL - remaining).max(0) * 100 / INITIAL_MATERIAL
}

fn divider(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "  +")?;
    for _ in File::iter() {
        write!(f, "-------+")?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_is_symmetric() {
        // The same position with colors swapped and the board mirrored
        let white = Board::from_fen("4k3/pp6/8/8/3N4/8/1B6/4K3 w - - 0 1").unwrap();
        let black = Board::from_fen("4k3/1b6/8/3n4/8/8/PP6/4K3 b - - 0 1").unwrap();

        let white_eval = Evaluator::new(&white).eval();
        let black_eval = Evaluator::new(&black).eval();
        assert_eq!(white_eval, black_eval);
        assert_eq!(Evaluator::new(&white).eval_for(Color::Black), -white_eval);
    }

    #[test]
    fn test_eval_counts_psqt() {
        // Same material, but the central knight is better placed
        let center = Board::from_fen("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let corner = Board::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
        assert!(Evaluator::new(&center).eval() > Evaluator::new(&corner).eval());
    }

    #[test]
    fn test_endgame_weight() {
        assert_eq!(Evaluator::new(&Board::new()).endgame_weight, 0);

        let bare = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(Evaluator::new(&bare).endgame_weight, 100);

        let rooks = Board::from_fen("r3k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let weight = Evaluator::new(&rooks).endgame_weight;
        assert!(weight > 80 && weight < 100, "{weight}");
    }

    #[test]
    fn test_king_centralizes_in_the_endgame() {
        // With pawns only, the central King is better, though it would be exposed in the middle-game
        let center = Board::from_fen("4k3/pppp4/8/8/4K3/8/PPPP4/8 w - - 0 1").unwrap();
        let corner = Board::from_fen("4k3/pppp4/8/8/8/8/PPPP4/6K1 w - - 0 1").unwrap();
        assert!(Evaluator::new(&center).eval() > Evaluator::new(&corner).eval());
    }

    #[test]
    fn test_mop_up_drives_lone_king_to_the_edge() {
        let edge = Board::from_fen("k7/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let center = Board::from_fen("8/8/8/4k3/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(Evaluator::new(&edge).eval() > Evaluator::new(&center).eval());

        // Closing in with the King helps too
        let near = Board::from_fen("k7/8/1K6/8/8/8/8/3Q4 w - - 0 1").unwrap();
        let far = Board::from_fen("k7/8/8/8/8/8/8/3Q2K1 w - - 0 1").unwrap();
        assert!(Evaluator::new(&near).eval() > Evaluator::new(&far).eval());

        // Nothing to mop up while the defender still has material
        let defended = Board::from_fen("k7/p7/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let eval = Evaluator::new(&defended);
        assert_eq!(eval.mop_up(Color::White), 0);
        assert_eq!(eval.mop_up(Color::Black), 0);
    }
}
