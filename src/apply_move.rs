//! Move application.
//!
//! `apply_move` never mutates the receiver: a `Game` is a plain value, so the
//! applier copies it, edits the copy and returns it. The applier assumes the
//! move already validated; all rule questions live in the validator.
//!
//! Capture resolution is shared between the live applier and duel validation
//! through the `MoveExecution` record. The same walk runs in both cases; the
//! validator simply runs it against a throwaway copy of the board and keeps
//! the stone arithmetic, while the applier keeps everything.

use crate::bitmask::{each_square_in_mask, TABLES};
use crate::chess_move::Move;
use crate::duel::Duel;
use crate::errors::IllegalMoveError;
use crate::game::Game;
use crate::board::Board;
use crate::piece::{color_index, other_color, Army, Color, Piece, PieceName, PieceType};
use crate::square::{Square, INVALID_SQUARE};

/// Shared state of one move's capture resolution: the saved en passant
/// square, both players' running stone counts, the duel slots consumed so
/// far, and whether the attacking piece is still alive.
pub(crate) struct MoveExecution {
    ep_square: Square,
    attacker_stones: i32,
    defender_stones: i32,
    duels: [Duel; 3],
    next_duel: usize,
    is_capture: bool,
    attacker_survives: bool,
}

impl MoveExecution {
    fn new(game: &Game, m: Move, attacker: Color) -> MoveExecution {
        MoveExecution {
            ep_square: game.ep_square,
            attacker_stones: game.stones[color_index(attacker)],
            defender_stones: game.stones[color_index(other_color(attacker))],
            duels: m.duels,
            next_duel: 0,
            is_capture: false,
            attacker_survives: true,
        }
    }
}

/// Duels are ranked by type; a lower-ranked attacker pays a toll to respond.
/// Kings never appear here because kings never duel.
fn duel_rank(piece_type: PieceType) -> i32 {
    match piece_type {
        PieceType::Pawn => 1,
        PieceType::Bishop | PieceType::Knight => 2,
        PieceType::Rook => 3,
        PieceType::Queen => 4,
        PieceType::King => 0,
    }
}

impl Game {
    /// Applies a validated move, returning the successor position with the
    /// game status brought up to date.
    pub fn apply_move(&self, m: Move) -> Game {
        let mut next = self.apply_move_impl(m);
        next.update_game_state();
        next
    }

    /// The applier without the game-status update. Legality checking uses
    /// this directly so that status recomputation (which itself generates
    /// moves) cannot recurse.
    pub(crate) fn apply_move_impl(&self, m: Move) -> Game {
        let mut next = *self;
        if m.is_drop() {
            if let Some(piece) = m.piece {
                next.board.set_piece_at(m.to, piece);
            }
            return next;
        }

        // Turn and clock bookkeeping happens before capture handling.
        let mover = self.to_move;
        if !self.king_turn {
            next.halfmove_clock += 1;
            next.ep_square = INVALID_SQUARE;
        }
        if self.army_of(mover) == Army::TwoKings && !self.king_turn {
            next.king_turn = true;
        } else {
            next.king_turn = false;
            next.to_move = other_color(mover);
        }
        if mover == Color::Black && next.to_move == Color::White {
            next.fullmove_number += 1;
        }

        if m.is_pass() {
            return next;
        }

        let piece = match self.piece_at(m.from) {
            Some(p) => p,
            None => return next,
        };

        let mut exec = MoveExecution::new(self, m, piece.color());
        // The move validated already, so resolution cannot fail here.
        let _ = self.resolve_captures(&mut next.board, m, piece, &mut exec);
        next.stones[color_index(piece.color())] = exec.attacker_stones;
        next.stones[color_index(other_color(piece.color()))] = exec.defender_stones;

        // Piece placement. A Tiger that captured anything vanishes from both
        // squares, and an attacker that lost a duel is destroyed.
        let tiger_vanishes = piece.name() == PieceName::AnimalsBishop && exec.is_capture;
        next.board.clear_piece_at(m.from);
        if exec.attacker_survives && !tiger_vanishes {
            let placed_type = match m.piece {
                Some(promotion) => promotion.piece_type(),
                None => piece.piece_type(),
            };
            next.board
                .set_piece_at(m.to, Piece::new(placed_type, Army::None, piece.color()));
        }

        let dx = m.to.x() as i8 - m.from.x() as i8;
        let dy = m.to.y() as i8 - m.from.y() as i8;
        let is_pawn = piece.piece_type() == PieceType::Pawn;

        // A double step leaves the traversed square capturable en passant.
        if is_pawn && dx == 0 && dy.abs() == 2 {
            next.ep_square = m.from.offset(0, dy / 2).unwrap();
        }

        // Castling relocates the rook beside the king.
        if piece.piece_type() == PieceType::King && dy == 0 && dx.abs() == 2 {
            let (rook_from, rook_to) = if m.to.x() == 2 {
                (Square::from_coords(0, m.from.y()), Square::from_coords(3, m.from.y()))
            } else {
                (Square::from_coords(7, m.from.y()), Square::from_coords(5, m.from.y()))
            };
            if let Some(rook) = next.board.piece_at(rook_from) {
                next.board.clear_piece_at(rook_from);
                next.board.set_piece_at(rook_to, rook);
            }
        }

        // Any Classic King move forfeits both rights on its rank; any move
        // leaving a corner forfeits that corner's right.
        if piece.name() == PieceName::ClassicKing {
            next.castling_rights &= !crate::bitmask::mask_rank(m.from.y());
        }
        next.castling_rights &= !m.from.mask();

        if exec.is_capture || is_pawn {
            next.halfmove_clock = 0;
        }
        next
    }

    /// Runs the capture phase of a move against `board`: the rampage walk,
    /// the whirlwind sweep, the en passant victim, or the single capture at
    /// the destination. Duel errors surface here so that `validate_duels`
    /// and the live applier cannot disagree.
    pub(crate) fn resolve_captures(
        &self,
        board: &mut Board,
        m: Move,
        attacker: Piece,
        exec: &mut MoveExecution,
    ) -> Result<(), IllegalMoveError> {
        let t = &*TABLES;
        if m.from == m.to {
            // Whirlwind: every adjacent piece falls, friend or enemy, except
            // kings and enemy Ghosts. No duels happen.
            let mut swept = Vec::new();
            each_square_in_mask(t.dist1[m.from.addr as usize] & board.occupied_mask(), |sq| {
                swept.push(sq)
            });
            for sq in swept {
                let target = match board.piece_at(sq) {
                    Some(p) => p.with_army(self.army_of(p.color())),
                    None => continue,
                };
                if target.piece_type() == PieceType::King {
                    continue;
                }
                let is_enemy = target.color() != attacker.color();
                if is_enemy && target.name() == PieceName::ReaperRook {
                    continue;
                }
                board.clear_piece_at(sq);
                exec.is_capture = true;
                if is_enemy && target.piece_type() == PieceType::Pawn {
                    exec.attacker_stones = (exec.attacker_stones + 1).min(6);
                }
            }
            return Ok(());
        }
        if attacker.name() == PieceName::AnimalsRook {
            // Rampage: unit steps from the origin, felling everything on the
            // way, stopping early only if a duel kills the Elephant.
            let dx = (m.to.x() as i8 - m.from.x() as i8).signum();
            let dy = (m.to.y() as i8 - m.from.y() as i8).signum();
            let mut cur = m.from;
            loop {
                cur = match cur.offset(dx, dy) {
                    Some(next) => next,
                    None => break,
                };
                self.handle_capture(board, cur, attacker, exec)?;
                if !exec.attacker_survives || cur == m.to {
                    break;
                }
            }
            return Ok(());
        }
        let is_diagonal = (m.to.x() as i8 - m.from.x() as i8).abs() == 1
            && (m.to.y() as i8 - m.from.y() as i8).abs() == 1;
        if attacker.piece_type() == PieceType::Pawn && is_diagonal && m.to == exec.ep_square {
            // The en passant victim sits one reversed forward-step behind
            // the destination.
            let backward = match attacker.color() {
                Color::White => 1,
                Color::Black => -1,
            };
            let victim = m.to.offset(0, backward).unwrap();
            return self.handle_capture(board, victim, attacker, exec);
        }
        self.handle_capture(board, m.to, attacker, exec)
    }

    /// Resolves a single capture, including its duel. An empty square is a
    /// no-op. Every felled piece consumes one duel slot in order.
    fn handle_capture(
        &self,
        board: &mut Board,
        sq: Square,
        attacker: Piece,
        exec: &mut MoveExecution,
    ) -> Result<(), IllegalMoveError> {
        let target = match board.piece_at(sq) {
            Some(p) => p.with_army(self.army_of(p.color())),
            None => return Ok(()),
        };
        let is_enemy = target.color() != attacker.color();
        let duel = if exec.next_duel < 3 {
            exec.duels[exec.next_duel]
        } else {
            Duel::default()
        };
        exec.next_duel += 1;

        let mut survived_duel = true;
        if duel.is_started() {
            if !is_enemy
                || target.piece_type() == PieceType::King
                || attacker.piece_type() == PieceType::King
                || !duel.is_complete()
            {
                return Err(IllegalMoveError::NotDuelable);
            }
            let challenge = duel.challenge() as i32;
            let response = duel.response() as i32;
            if challenge > exec.defender_stones {
                return Err(IllegalMoveError::NotEnoughStones);
            }
            exec.defender_stones -= challenge;
            let mut cost = response;
            if duel_rank(attacker.piece_type()) < duel_rank(target.piece_type()) {
                // Outranked attackers pay a toll to respond at all.
                cost += 1;
            }
            if cost > exec.attacker_stones {
                return Err(IllegalMoveError::NotEnoughStones);
            }
            exec.attacker_stones -= cost;
            if response == 0 {
                if duel.gain() {
                    exec.attacker_stones = (exec.attacker_stones + 1).min(6);
                } else {
                    exec.defender_stones = (exec.defender_stones - 1).max(0);
                }
            }
            if challenge > response {
                survived_duel = false;
            }
        }

        board.clear_piece_at(sq);
        exec.is_capture = true;
        if !survived_duel {
            exec.attacker_survives = false;
        } else if is_enemy && target.piece_type() == PieceType::Pawn {
            // Capturing an enemy pawn earns a stone, but only when the
            // attacking piece outlives the duel.
            exec.attacker_stones = (exec.attacker_stones + 1).min(6);
        }
        Ok(())
    }

    /// Checks the duels attached to a move by running capture resolution
    /// against a throwaway board. Fails when a duel targets a king or a
    /// friendly piece, bids exceed the available stones, or the move carries
    /// more duels than it fells pieces.
    pub fn validate_duels(&self, m: Move) -> Result<(), IllegalMoveError> {
        let mut consumed = 0;
        if !m.is_pass() && !m.is_drop() {
            if let Some(piece) = self.piece_at(m.from) {
                let mut board = self.board;
                let mut exec = MoveExecution::new(self, m, piece.color());
                self.resolve_captures(&mut board, m, piece, &mut exec)?;
                consumed = exec.next_duel.min(3);
            }
        }
        for duel in &m.duels[consumed..] {
            if duel.is_started() {
                return Err(IllegalMoveError::TooManyDuels);
            }
        }
        Ok(())
    }
}
