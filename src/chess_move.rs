//! Moves and their UCI-like text form.
//!
//! Normal moves are `<from><to>` with an optional trailing promotion letter
//! and up to three duel groups separated by `:`. `0000` is the pass move and
//! `P@sq` the drop form, which only the parser produces; the engine never
//! generates drops. A duel group may be skipped (`:`), incomplete (`:2`), or
//! complete (`:21`, `:10+`).

use lazy_static::lazy_static;
use regex::Regex;

use std::fmt;

use crate::duel::Duel;
use crate::errors::ParseError;
use crate::fen::{encode_fen_piece, parse_fen_piece};
use crate::piece::{Piece, PieceType};
use crate::square::{Square, INVALID_SQUARE};

lazy_static! {
    static ref RE_NORMAL_MOVE: Regex =
        Regex::new(r"^[a-hA-H][1-8][a-hA-H][1-8][kqbnrpKQBNRP]?(:([0-2]([1-2]|0[+-])?)?){0,3}$")
            .unwrap();
    static ref RE_DROP_MOVE: Regex = Regex::new(r"^[kqbnrpKQBNRP]@[a-hA-H][1-8]$").unwrap();
}

/// A move, including the duels that resulted from it. `duels[0]` belongs to
/// the primary capture, the rest to additional pieces felled by an elephant
/// rampage. `piece` carries the promotion target, or the dropped piece for
/// drop moves.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Option<Piece>,
    pub duels: [Duel; 3],
}

impl Move {
    /// The pass move, written `0000`.
    pub fn pass() -> Move {
        Move {
            from: INVALID_SQUARE,
            to: INVALID_SQUARE,
            piece: None,
            duels: [Duel::default(); 3],
        }
    }

    /// A plain from/to move with no promotion and no duels.
    pub fn new(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            piece: None,
            duels: [Duel::default(); 3],
        }
    }

    pub fn is_pass(&self) -> bool {
        self.from == INVALID_SQUARE && self.to == INVALID_SQUARE
    }

    pub fn is_drop(&self) -> bool {
        self.from == INVALID_SQUARE && self.to != INVALID_SQUARE
    }
}

/// Parses a UCI string into a move.
pub fn parse_uci(uci: &str) -> Result<Move, ParseError> {
    if uci == "0000" {
        return Ok(Move::pass());
    }
    if RE_NORMAL_MOVE.is_match(uci) {
        let mut result = Move::new(Square::from_name(&uci[0..2])?, Square::from_name(&uci[2..4])?);
        let bytes = uci.as_bytes();
        let mut duel_start = 4;
        if bytes.len() > 4 && bytes[4] != b':' {
            let piece = parse_fen_piece(bytes[4] as char)?;
            if piece.piece_type() == PieceType::Pawn {
                return Err(ParseError("invalid UCI: promotion to pawn".to_string()));
            }
            result.piece = Some(piece);
            duel_start = 5;
        }
        if bytes.len() > duel_start {
            for (number, duel) in uci[duel_start + 1..].split(':').enumerate() {
                result.duels[number] = Duel::parse(duel)?;
            }
        }
        return Ok(result);
    }
    if RE_DROP_MOVE.is_match(uci) {
        let mut result = Move::new(INVALID_SQUARE, Square::from_name(&uci[2..4])?);
        result.piece = Some(parse_fen_piece(uci.as_bytes()[0] as char)?);
        return Ok(result);
    }
    Err(ParseError(format!("invalid UCI {:?}", uci)))
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pass() {
            return write!(f, "0000");
        }
        if self.is_drop() {
            let piece = self.piece.expect("drop move without a piece");
            return write!(f, "{}@{}", encode_fen_piece(piece), self.to);
        }
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.piece {
            write!(f, "{}", encode_fen_piece(piece))?;
        }
        let num_duels = self
            .duels
            .iter()
            .rposition(|d| d.is_started())
            .map_or(0, |i| i + 1);
        for duel in &self.duels[..num_duels] {
            write!(f, ":{}", duel)?;
        }
        Ok(())
    }
}
