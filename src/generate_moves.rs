//! Legal move generation.
//!
//! The generator emits a superset of the pseudo-legal moves as a per-origin
//! target mask (attack squares, pawn advances, Nemesis sidesteps, castle
//! targets) plus the special whirlwind and pass encodings, then filters every
//! candidate through the validator. Using a mask per origin means no
//! candidate is ever emitted twice, which keeps the counts honest against
//! the bruteforce oracle.

use crate::bitmask::{each_square_in_mask, TABLES};
use crate::chess_move::Move;
use crate::duel::Duel;
use crate::game::{Game, GameStatus};
use crate::piece::{Army, Color, Piece, PieceName, PieceType};

const PROMOTION_TYPES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

impl Game {
    fn candidate_moves(&self) -> Vec<Move> {
        let mut result = Vec::with_capacity(64);
        if self.game_state != GameStatus::InProgress {
            return result;
        }
        let t = &*TABLES;
        let own = self.board.color_mask(self.to_move);
        let origins = if self.king_turn {
            own & self.board.piece_type_mask(PieceType::King)
        } else {
            own
        };
        let last_rank = match self.to_move {
            Color::White => 0,
            Color::Black => 7,
        };
        each_square_in_mask(origins, |from| {
            let piece = match self.piece_at(from) {
                Some(p) => p,
                None => return,
            };
            let mut targets = self.attack_mask(from);
            if piece.piece_type() == PieceType::Pawn {
                let forward: i8 = match self.to_move {
                    Color::White => -1,
                    Color::Black => 1,
                };
                let initial_rank = match self.to_move {
                    Color::White => 6,
                    Color::Black => 1,
                };
                if let Some(one) = from.offset(0, forward) {
                    targets |= one.mask();
                    if from.y() == initial_rank {
                        if let Some(two) = from.offset(0, 2 * forward) {
                            targets |= two.mask();
                        }
                    }
                }
                if piece.name() == PieceName::NemesisPawn {
                    targets |= t.dist1[from.addr as usize];
                }
            }
            if piece.name() == PieceName::ClassicKing && from.x() == 4 {
                for dx in [-2, 2] {
                    if let Some(castle_target) = from.offset(dx, 0) {
                        targets |= castle_target.mask();
                    }
                }
            }
            if piece.name() == PieceName::TwoKingsKing {
                result.push(Move::new(from, from));
            }
            targets &= !from.mask();
            each_square_in_mask(targets, |to| {
                if piece.piece_type() == PieceType::Pawn && to.y() == last_rank {
                    for promotion in PROMOTION_TYPES {
                        let mut candidate = Move::new(from, to);
                        candidate.piece =
                            Some(Piece::new(promotion, Army::None, self.to_move));
                        result.push(candidate);
                    }
                } else {
                    result.push(Move::new(from, to));
                }
            });
        });
        if self.king_turn {
            result.push(Move::pass());
        }
        result
    }

    /// Every legal move in the position, without duels attached. Challenges
    /// are enumerated separately by `generate_duels`.
    pub fn generate_legal_moves(&self) -> Vec<Move> {
        self.candidate_moves()
            .into_iter()
            .filter(|m| self.validate_legal_move(*m).is_ok())
            .collect()
    }

    /// Early-exit probe used by the game-state decision.
    pub(crate) fn has_legal_move(&self) -> bool {
        self.candidate_moves()
            .into_iter()
            .any(|m| self.validate_legal_move(m).is_ok())
    }

    /// All valid duel assignments for an already-validated move, the no-duel
    /// variant included. Every slot option is run through `validate_duels`,
    /// so this cannot drift from what the applier accepts.
    pub fn generate_duels(&self, m: Move) -> Vec<Move> {
        let mut options = vec![Duel::default()];
        for challenge in 0..=2u8 {
            for response in 0..=2u8 {
                if response == 0 {
                    options.push(Duel::new(challenge, 0, true));
                    options.push(Duel::new(challenge, 0, false));
                } else {
                    options.push(Duel::new(challenge, response, false));
                }
            }
        }
        let mut result = Vec::new();
        for &first in &options {
            for &second in &options {
                for &third in &options {
                    let mut candidate = m;
                    candidate.duels = [first, second, third];
                    if self.validate_duels(candidate).is_ok() {
                        result.push(candidate);
                    }
                }
            }
        }
        result
    }
}
