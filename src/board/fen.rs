/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use super::{Board, BoardError, Castling, Color, File, Piece, PieceKind, Rank, Square};

impl Board {
    /// Decodes a [FEN](https://www.chessprogramming.org/Forsyth-Edwards_Notation) string.
    ///
    /// The halfmove clock and fullmove number may be omitted, defaulting to `0` and `1`.
    /// Castling rights whose King or Rook is not on its original square are dropped.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, Color, Square};
    /// let board = Board::from_fen("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2").unwrap();
    /// assert_eq!(board.side_to_move(), Color::White);
    /// assert_eq!(board.ep_square(), Some(Square::E6));
    /// assert_eq!(board.fullmove_number(), 2);
    ///
    /// assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let invalid = |reason: &str| BoardError::InvalidFen {
            fen: fen.to_string(),
            reason: reason.to_string(),
        };

        let mut fields = fen.split_ascii_whitespace();
        let placement = fields.next().ok_or_else(|| invalid("empty string"))?;
        let side = fields
            .next()
            .ok_or_else(|| invalid("missing side to move"))?;
        let castling = fields
            .next()
            .ok_or_else(|| invalid("missing castling rights"))?;
        let ep = fields
            .next()
            .ok_or_else(|| invalid("missing en passant square"))?;
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");
        if fields.next().is_some() {
            return Err(invalid("too many fields"));
        }

        let mut board = Self::empty();
        board.place_pieces(placement).map_err(|e| match e {
            BoardError::InvalidFen { reason, .. } => invalid(&reason),
            other => other,
        })?;

        for color in Color::all() {
            match board.pieces(color, PieceKind::King).population() {
                0 => return Err(BoardError::MissingKing(color.name())),
                1 => {}
                _ => return Err(invalid("more than one king per side")),
            }
        }

        board.data.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(BoardError::InvalidSideToMove(side.to_string())),
        };

        board.data.castling = parse_castling(castling)?;
        board.sanitize_castling();

        board.data.ep_square = match ep {
            "-" => None,
            _ => {
                let square = Square::from_uci(ep)?;
                // The skipped square is behind the pawn that just moved, so it depends on who moves next
                let expected = match board.data.side_to_move {
                    Color::White => Rank::SIX,
                    Color::Black => Rank::THREE,
                };
                if square.rank() != expected {
                    return Err(invalid("en passant square is on the wrong rank"));
                }

                // The rank check above keeps both neighbours on the board
                let mover = !board.data.side_to_move;
                let pushed_to = square.backward(board.data.side_to_move);
                let pushed_from = square.backward(mover);
                let pawn = Piece::new(mover, PieceKind::Pawn);
                if pushed_to.and_then(|sq| board.piece_at(sq)) != Some(pawn) {
                    return Err(invalid("no pawn could have just moved past the en passant square"));
                }
                if board.piece_at(square).is_some()
                    || pushed_from.and_then(|sq| board.piece_at(sq)).is_some()
                {
                    return Err(invalid("en passant square or the square behind it is occupied"));
                }
                Some(square)
            }
        };

        board.data.halfmove_clock = halfmove
            .parse()
            .map_err(|_| BoardError::InvalidClock(halfmove.to_string()))?;
        board.data.fullmove_number = fullmove
            .parse()
            .map_err(|_| BoardError::InvalidClock(fullmove.to_string()))?;

        board.refresh();
        Ok(board)
    }

    /// Encodes this position as a FEN string.
    ///
    /// # Example
    /// ```
    /// # use newt::{Board, FEN_KIWIPETE};
    /// let board = Board::from_fen(FEN_KIWIPETE).unwrap();
    /// assert_eq!(board.to_fen(), FEN_KIWIPETE);
    /// ```
    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(64);

        for rank in Rank::iter().rev() {
            let mut empty = 0;
            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank != Rank::ONE {
                placement.push('/');
            }
        }

        let ep = self
            .ep_square()
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| String::from("-"));

        format!(
            "{placement} {} {} {ep} {} {}",
            self.side_to_move(),
            self.castling_fen(),
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }

    /// The castling field of this position's FEN, such as `KQkq` or `-`.
    pub fn castling_fen(&self) -> String {
        let [white, black] = self.data.castling;
        let mut s = String::with_capacity(4);
        for (right, c) in [
            (white.kingside, 'K'),
            (white.queenside, 'Q'),
            (black.kingside, 'k'),
            (black.queenside, 'q'),
        ] {
            if right {
                s.push(c);
            }
        }

        if s.is_empty() {
            s.push('-');
        }
        s
    }

    /// Places the pieces described by the first field of a FEN onto this (empty) board.
    fn place_pieces(&mut self, placement: &str) -> Result<(), BoardError> {
        let invalid = |reason: &str| BoardError::InvalidFen {
            fen: placement.to_string(),
            reason: reason.to_string(),
        };

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != Rank::COUNT {
            return Err(invalid("placement must have exactly 8 ranks"));
        }

        // FEN lists rank 8 first
        for (rank, pieces) in Rank::iter().rev().zip(ranks) {
            let mut file = 0;
            for c in pieces.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(invalid("empty-square counts must be 1 through 8"));
                    }
                    file += skip as u8;
                } else {
                    let piece = Piece::from_uci(c)?;
                    if file >= File::COUNT as u8 {
                        return Err(invalid("a rank has more than 8 squares"));
                    }
                    let square = Square::new(File(file), rank);
                    if piece.kind() == PieceKind::Pawn
                        && (rank == Rank::ONE || rank == Rank::EIGHT)
                    {
                        return Err(invalid("pawns cannot stand on the first or last rank"));
                    }
                    self.toggle(piece, square);
                    file += 1;
                }
            }

            if file as usize != File::COUNT {
                return Err(invalid("every rank must describe exactly 8 squares"));
            }
        }

        Ok(())
    }

    /// Drops any castling right whose King or Rook has left its original square.
    fn sanitize_castling(&mut self) {
        for color in Color::all() {
            let king = Square::E1.rank_relative_to(color);
            let kingside_rook = Square::H1.rank_relative_to(color);
            let queenside_rook = Square::A1.rank_relative_to(color);

            let king_home = self.pieces(color, PieceKind::King).contains(king);
            let rooks = self.pieces(color, PieceKind::Rook);

            let rights = &mut self.data.castling[color.index()];
            rights.kingside &= king_home && rooks.contains(kingside_rook);
            rights.queenside &= king_home && rooks.contains(queenside_rook);
        }
    }
}

/// Parses the castling field of a FEN. Each of `KQkq` may appear at most once.
fn parse_castling(castling: &str) -> Result<[Castling; Color::COUNT], BoardError> {
    let err = || BoardError::InvalidCastling(castling.to_string());
    let mut rights = [Castling::NONE; Color::COUNT];

    if castling == "-" {
        return Ok(rights);
    }

    for c in castling.chars() {
        let (color, kingside) = match c {
            'K' => (Color::White, true),
            'Q' => (Color::White, false),
            'k' => (Color::Black, true),
            'q' => (Color::Black, false),
            _ => return Err(err()),
        };

        let rights = &mut rights[color.index()];
        let right = if kingside {
            &mut rights.kingside
        } else {
            &mut rights.queenside
        };

        if *right {
            return Err(err());
        }
        *right = true;
    }

    Ok(rights)
}

impl FromStr for Board {
    type Err = BoardError;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}
