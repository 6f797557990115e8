//! Per-piece attack masks.
//!
//! `attack_mask` returns the squares a piece *threatens*, which is not the
//! same as the squares it can move to: pawn advances are absent (only the
//! diagonal attacks appear), while teleporting Reaper pieces threaten their
//! whole range regardless of blockers. Dispatch is a single match over
//! `PieceName`; the army-specific rules live in the match arms rather than
//! in any piece hierarchy.

use crate::bitmask::{each_square_in_mask, mask_rank, MASK_EMPTY, TABLES};
use crate::game::Game;
use crate::piece::{other_color, Color, Piece, PieceName};
use crate::square::Square;

fn pawn_attack_mask(from: Square, color: Color) -> u64 {
    let dy = match color {
        Color::White => -1,
        Color::Black => 1,
    };
    let mut result = MASK_EMPTY;
    for dx in [-1, 1] {
        if let Some(target) = from.offset(dx, dy) {
            result |= target.mask();
        }
    }
    result
}

impl Game {
    /// The squares threatened by the piece at `from`, or an empty mask for
    /// an empty square.
    pub(crate) fn attack_mask(&self, from: Square) -> u64 {
        let piece = match self.piece_at(from) {
            Some(p) => p,
            None => return MASK_EMPTY,
        };
        let t = &*TABLES;
        let addr = from.addr as usize;
        let occupied = self.board.occupied_mask();
        let enemy_kings = self.kings_mask(other_color(piece.color()));
        match piece.name() {
            // The abdicated Empowered queen moves like a king.
            PieceName::BasicKing
            | PieceName::ClassicKing
            | PieceName::TwoKingsKing
            | PieceName::EmpoweredQueen => t.dist1[addr],
            PieceName::BasicQueen => {
                t.diag_attacks(from, occupied) | t.orth_attacks(from, occupied)
            }
            PieceName::BasicBishop => t.diag_attacks(from, occupied),
            PieceName::BasicKnight | PieceName::AnimalsKnight => t.knight[addr],
            PieceName::BasicRook => t.orth_attacks(from, occupied),
            PieceName::BasicPawn | PieceName::NemesisPawn => {
                pawn_attack_mask(from, piece.color())
            }
            // The Nemesis only ever lands on empty squares or enemy kings.
            PieceName::NemesisQueen => {
                let queen = t.diag_attacks(from, occupied) | t.orth_attacks(from, occupied);
                queen & (!occupied | enemy_kings)
            }
            PieceName::EmpoweredBishop | PieceName::EmpoweredKnight | PieceName::EmpoweredRook => {
                self.empowered_attack_mask(from, piece)
            }
            // The Reaper teleports: anywhere but the far rank, and never onto
            // an enemy king.
            PieceName::ReaperQueen => {
                let far_rank = match piece.color() {
                    Color::White => mask_rank(0),
                    Color::Black => mask_rank(7),
                };
                !far_rank & !enemy_kings
            }
            // The Ghost teleports to any unoccupied square and never captures.
            PieceName::ReaperRook => !occupied,
            PieceName::AnimalsQueen => t.orth_attacks(from, occupied) | t.knight[addr],
            PieceName::AnimalsBishop => t.diag_attacks(from, occupied) & t.dist2[addr],
            // The Elephant tramples through blockers, so its reach ignores
            // occupancy entirely.
            PieceName::AnimalsRook => t.orth[addr] & t.dist3[addr],
        }
    }

    /// Empowered minor pieces share movement with 4-adjacent friendly
    /// empowered pieces, themselves included.
    fn empowered_attack_mask(&self, from: Square, piece: Piece) -> u64 {
        let t = &*TABLES;
        let addr = from.addr as usize;
        let occupied = self.board.occupied_mask();
        let sources = (t.adjacent[addr] | from.mask()) & self.board.color_mask(piece.color());
        let mut result = MASK_EMPTY;
        each_square_in_mask(sources, |sq| {
            if let Some(neighbor) = self.piece_at(sq) {
                match neighbor.name() {
                    PieceName::EmpoweredBishop => result |= t.diag_attacks(from, occupied),
                    PieceName::EmpoweredKnight => result |= t.knight[addr],
                    PieceName::EmpoweredRook => result |= t.orth_attacks(from, occupied),
                    _ => {}
                }
            }
        });
        result
    }

    /// Union of `attack_mask` over every square of `sources`.
    pub(crate) fn full_attack_mask(&self, sources: u64) -> u64 {
        let mut result = MASK_EMPTY;
        each_square_in_mask(sources, |sq| {
            result |= self.attack_mask(sq);
        });
        result
    }
}
