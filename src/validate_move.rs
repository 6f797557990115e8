//! Move validation.
//!
//! `validate_pseudo_legal_move` applies the reach and capture rules in a
//! fixed order and reports the first failure; `validate_legal_move` then
//! plays the move on a copy and rejects it if the mover's kings end up
//! threatened. The move generator funnels its candidates through the same
//! functions, which is what keeps it and the bruteforce oracle in exact
//! agreement.

use crate::bitmask::{mask_rank, single_step_mask, KINGSIDE_MASK, QUEENSIDE_MASK, TABLES};
use crate::chess_move::Move;
use crate::errors::IllegalMoveError;
use crate::game::{Game, GameStatus};
use crate::piece::{other_color, Army, Color, Piece, PieceName, PieceType};
use crate::square::Square;

impl Game {
    pub fn validate_pseudo_legal_move(&self, m: Move) -> Result<(), IllegalMoveError> {
        if self.game_state != GameStatus::InProgress {
            return Err(IllegalMoveError::GameOver);
        }
        if m.is_drop() {
            return Err(IllegalMoveError::IllegalDrop);
        }
        if m.is_pass() {
            if !self.king_turn {
                return Err(IllegalMoveError::IllegalPass);
            }
            if m.duels.iter().any(|d| d.is_started()) {
                return Err(IllegalMoveError::TooManyDuels);
            }
            return Ok(());
        }
        if !m.from.is_valid() || !m.to.is_valid() {
            return Err(IllegalMoveError::NotMovablePiece);
        }
        let piece = match self.piece_at(m.from) {
            Some(p) if p.color() == self.to_move => p,
            _ => return Err(IllegalMoveError::NotMovablePiece),
        };
        if self.king_turn && piece.piece_type() != PieceType::King {
            return Err(IllegalMoveError::IllegalKingTurn);
        }

        self.validate_promotion(m, piece)?;

        let dx = m.to.x() as i8 - m.from.x() as i8;
        let dy = m.to.y() as i8 - m.from.y() as i8;
        if piece.piece_type() == PieceType::King && dy == 0 && dx.abs() == 2 {
            return self.validate_castle(m, piece);
        }
        if m.from == m.to {
            return self.validate_whirlwind(m, piece);
        }

        if piece.piece_type() == PieceType::Pawn {
            self.validate_pawn_shape(m, piece, dx, dy)?;
        } else if self.attack_mask(m.from) & m.to.mask() == 0 {
            return Err(IllegalMoveError::UnreachableSquare);
        }

        self.validate_capture(m, piece)?;
        if piece.name() == PieceName::AnimalsRook {
            self.validate_rampage(m, piece)?;
        }
        self.validate_duels(m)
    }

    /// Pseudo-legality plus the self-check test: the move is played on a
    /// copy and the mover's kings must come out unthreatened.
    pub fn validate_legal_move(&self, m: Move) -> Result<(), IllegalMoveError> {
        self.validate_pseudo_legal_move(m)?;
        let next = self.apply_move_impl(m);
        if next.is_in_check(self.to_move) {
            return Err(IllegalMoveError::MoveIntoCheck);
        }
        Ok(())
    }

    /// A promotion is required exactly when a pawn reaches its last rank,
    /// may not target a pawn or a king, and a Two Kings pawn may not become
    /// a queen.
    fn validate_promotion(&self, m: Move, piece: Piece) -> Result<(), IllegalMoveError> {
        let last_rank = match self.to_move {
            Color::White => 0,
            Color::Black => 7,
        };
        let reaches_last_rank = piece.piece_type() == PieceType::Pawn && m.to.y() == last_rank;
        match m.piece {
            Some(promotion) => {
                if !reaches_last_rank {
                    return Err(IllegalMoveError::IllegalPromotion);
                }
                match promotion.piece_type() {
                    PieceType::Pawn | PieceType::King => {
                        return Err(IllegalMoveError::IllegalPromotion)
                    }
                    PieceType::Queen if piece.army() == Army::TwoKings => {
                        return Err(IllegalMoveError::IllegalPromotion)
                    }
                    _ => {}
                }
            }
            None => {
                if reaches_last_rank {
                    return Err(IllegalMoveError::IllegalPromotion);
                }
            }
        }
        Ok(())
    }

    fn validate_castle(&self, m: Move, piece: Piece) -> Result<(), IllegalMoveError> {
        if piece.name() != PieceName::ClassicKing || m.from.x() != 4 {
            return Err(IllegalMoveError::IllegalCastle);
        }
        let (corner_x, side_mask) = if m.to.x() == 2 {
            (0, QUEENSIDE_MASK)
        } else {
            (7, KINGSIDE_MASK)
        };
        let corner = Square::from_coords(corner_x, m.from.y());
        if self.castling_rights & corner.mask() == 0 {
            return Err(IllegalMoveError::IllegalCastle);
        }
        if self.board.occupied_mask() & side_mask & mask_rank(m.from.y()) != 0 {
            return Err(IllegalMoveError::IllegalCastle);
        }
        // The king may not castle out of, through, or into an attack.
        let enemy_attacks =
            self.full_attack_mask(self.board.color_mask(other_color(piece.color())));
        let transit = Square::from_coords((m.from.x() + m.to.x()) / 2, m.from.y());
        if enemy_attacks & (m.from.mask() | transit.mask() | m.to.mask()) != 0 {
            return Err(IllegalMoveError::IllegalCastle);
        }
        if m.duels.iter().any(|d| d.is_started()) {
            return Err(IllegalMoveError::NotDuelable);
        }
        Ok(())
    }

    fn validate_whirlwind(&self, m: Move, piece: Piece) -> Result<(), IllegalMoveError> {
        if piece.name() != PieceName::TwoKingsKing {
            return Err(IllegalMoveError::IllegalWhirlwindAttack);
        }
        // A whirlwind beside a friendly king would fell it.
        if TABLES.dist1[m.from.addr as usize] & self.kings_mask(piece.color()) != 0 {
            return Err(IllegalMoveError::IllegalWhirlwindAttack);
        }
        if m.duels.iter().any(|d| d.is_started()) {
            return Err(IllegalMoveError::NotDuelable);
        }
        Ok(())
    }

    /// Pawn reach: single and double advances onto empty squares, diagonal
    /// captures of enemies or the en passant square, and for Nemesis pawns
    /// any empty neighbor that closes in on an enemy king.
    fn validate_pawn_shape(
        &self,
        m: Move,
        piece: Piece,
        dx: i8,
        dy: i8,
    ) -> Result<(), IllegalMoveError> {
        let forward: i8 = match piece.color() {
            Color::White => -1,
            Color::Black => 1,
        };
        let occupied = self.board.occupied_mask();
        if dx == 0 && dy == forward {
            if occupied & m.to.mask() != 0 {
                return Err(IllegalMoveError::UnreachableSquare);
            }
            return Ok(());
        }
        if dx == 0 && dy == 2 * forward {
            let initial_rank = match piece.color() {
                Color::White => 6,
                Color::Black => 1,
            };
            if m.from.y() != initial_rank {
                return Err(IllegalMoveError::UnreachableSquare);
            }
            let traversed = m.from.offset(0, forward).unwrap();
            if occupied & (traversed.mask() | m.to.mask()) != 0 {
                return Err(IllegalMoveError::UnreachableSquare);
            }
            return Ok(());
        }
        if dx.abs() == 1 && dy == forward {
            let enemy = self.board.color_mask(other_color(piece.color()));
            if enemy & m.to.mask() != 0 || m.to == self.ep_square {
                return Ok(());
            }
        }
        if piece.name() == PieceName::NemesisPawn && m.from.distance(m.to) == 1 {
            let toward_kings =
                single_step_mask(m.from, self.kings_mask(other_color(piece.color())));
            if toward_kings & m.to.mask() != 0 && occupied & m.to.mask() == 0 {
                return Ok(());
            }
        }
        Err(IllegalMoveError::UnreachableSquare)
    }

    /// Builds the non-capturable mask for this attacker and intersects it
    /// with the squares the move touches. The teleporting Reaper pieces only
    /// ever touch their destination.
    fn validate_capture(&self, m: Move, piece: Piece) -> Result<(), IllegalMoveError> {
        let name = piece.name();
        let own = self.board.color_mask(piece.color());
        let enemy_color = other_color(piece.color());
        let enemy = self.board.color_mask(enemy_color);
        let kings = self.board.piece_type_mask(PieceType::King);
        let mut non_capturable = match name {
            // The Wild Horse may take friendly pieces but no king at all.
            PieceName::AnimalsKnight => (own | enemy) & kings,
            // The Elephant tramples friendlies, but never a friendly king.
            PieceName::AnimalsRook => own & kings,
            _ => own,
        };
        if piece.piece_type() != PieceType::King && self.army_of(enemy_color) == Army::Nemesis {
            non_capturable |= enemy & self.board.piece_type_mask(PieceType::Queen);
        }
        if self.army_of(enemy_color) == Army::Reaper {
            non_capturable |= enemy & self.board.piece_type_mask(PieceType::Rook);
        }
        if self.army_of(enemy_color) == Army::Animals {
            // An Elephant is safe from anything farther than two squares.
            non_capturable |= enemy
                & self.board.piece_type_mask(PieceType::Rook)
                & !TABLES.dist2[m.from.addr as usize];
        }
        let visited = match name {
            PieceName::ReaperQueen | PieceName::ReaperRook => m.to.mask(),
            _ => TABLES.between[m.from.addr as usize][m.to.addr as usize] | m.to.mask(),
        };
        if visited & non_capturable != 0 {
            return Err(IllegalMoveError::IllegalCapture);
        }
        Ok(())
    }

    /// The Elephant may end a capturing move short of three squares only
    /// when forced: against the board edge or on a blocking friendly piece.
    fn validate_rampage(&self, m: Move, piece: Piece) -> Result<(), IllegalMoveError> {
        let distance = m.from.distance(m.to);
        if distance >= 3 {
            return Ok(());
        }
        let visited =
            TABLES.between[m.from.addr as usize][m.to.addr as usize] | m.to.mask();
        if visited & self.board.occupied_mask() == 0 {
            return Ok(());
        }
        let dx = (m.to.x() as i8 - m.from.x() as i8).signum();
        let dy = (m.to.y() as i8 - m.from.y() as i8).signum();
        if m.to.offset(dx, dy).is_none() {
            return Ok(());
        }
        if self.board.color_mask(piece.color()) & m.to.mask() != 0 {
            return Ok(());
        }
        Err(IllegalMoveError::IllegalRampage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_move::parse_uci;
    use crate::epd::parse_epd;

    fn check(epd: &str, uci: &str, expected: Result<(), IllegalMoveError>) {
        let game = parse_epd(epd).unwrap();
        let m = parse_uci(uci).unwrap();
        assert_eq!(
            game.validate_legal_move(m),
            expected,
            "move {} on {}",
            uci,
            epd
        );
    }

    const START_CC: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 cc 33";

    #[test]
    fn game_over_rejects_everything() {
        // Stalemated black: white already won.
        let epd = "k7/2Q5/8/8/8/8/8/4K3 b - - 0 1 cc 33";
        check(epd, "a8a7", Err(IllegalMoveError::GameOver));
        check(epd, "0000", Err(IllegalMoveError::GameOver));
    }

    #[test]
    fn drops_are_rejected() {
        check(START_CC, "P@e4", Err(IllegalMoveError::IllegalDrop));
    }

    #[test]
    fn pass_needs_a_king_turn() {
        check(START_CC, "0000", Err(IllegalMoveError::IllegalPass));
        let king_turn = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR K KQkq - 0 1 kc 33";
        check(king_turn, "0000", Ok(()));
    }

    #[test]
    fn only_own_pieces_move() {
        check(START_CC, "e7e5", Err(IllegalMoveError::NotMovablePiece));
        check(START_CC, "e4e5", Err(IllegalMoveError::NotMovablePiece));
    }

    #[test]
    fn king_turn_restricts_to_kings() {
        let king_turn = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR K KQkq - 0 1 kc 33";
        check(king_turn, "e2e4", Err(IllegalMoveError::IllegalKingTurn));
    }

    #[test]
    fn castle_rules() {
        // Blocked path.
        check(START_CC, "e1g1", Err(IllegalMoveError::IllegalCastle));
        // No right left.
        check(
            "4k3/8/8/8/8/8/8/R3K3 w - - 0 1 cc 33",
            "e1c1",
            Err(IllegalMoveError::IllegalCastle),
        );
        // Castling out of check.
        check(
            "4k3/4r3/8/8/8/8/8/R3K3 w KQ - 0 1 cc 33",
            "e1c1",
            Err(IllegalMoveError::IllegalCastle),
        );
        // Wrong army: a Two Kings king cannot castle.
        check(
            "4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1 kc 33",
            "e1c1",
            Err(IllegalMoveError::IllegalCastle),
        );
        // A clean queenside castle works.
        check("4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1 cc 33", "e1c1", Ok(()));
        // Duels never attach to a castle.
        check(
            "4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1 cc 33",
            "e1c1:10+",
            Err(IllegalMoveError::NotDuelable),
        );
    }

    #[test]
    fn whirlwind_rules() {
        // Only a Warrior King spins.
        check(START_CC, "e1e1", Err(IllegalMoveError::IllegalWhirlwindAttack));
        // Adjacent friendly king forbids it.
        let two_kings = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR w KQkq - 0 1 kc 33";
        check(two_kings, "d1d1", Err(IllegalMoveError::IllegalWhirlwindAttack));
        // A lone Warrior King may spin on a normal turn.
        check("4k3/8/8/8/3K4/8/8/8 w - - 0 1 kc 33", "d4d4", Ok(()));
    }

    #[test]
    fn promotion_rules() {
        let about_to_promote = "4k3/7P/8/8/8/8/8/4K3 w - - 0 1 cc 33";
        check(about_to_promote, "h7h8", Err(IllegalMoveError::IllegalPromotion));
        check(about_to_promote, "h7h8k", Err(IllegalMoveError::IllegalPromotion));
        check(about_to_promote, "h7h8q", Ok(()));
        check(START_CC, "e2e4q", Err(IllegalMoveError::IllegalPromotion));
        // Two Kings pawns never become queens.
        let two_kings = "4k3/7P/8/8/8/8/8/3KK3 w - - 0 1 kc 33";
        check(two_kings, "h7h8q", Err(IllegalMoveError::IllegalPromotion));
        check(two_kings, "h7h8r", Ok(()));
    }

    #[test]
    fn unreachable_squares() {
        check(START_CC, "e2e5", Err(IllegalMoveError::UnreachableSquare));
        check(START_CC, "b1b3", Err(IllegalMoveError::UnreachableSquare));
        check(START_CC, "e1e3", Err(IllegalMoveError::UnreachableSquare));
        // Two-step from a non-initial rank.
        check(
            "4k3/8/8/8/4P3/8/8/4K3 w - - 0 1 cc 33",
            "e4e6",
            Err(IllegalMoveError::UnreachableSquare),
        );
        // Diagonal pawn move without a capture.
        check(START_CC, "e2d3", Err(IllegalMoveError::UnreachableSquare));
    }

    #[test]
    fn nemesis_pawn_sidesteps() {
        // The black king is on e8; a white Nemesis pawn may slide diagonally
        // forward toward it, but not away from it.
        let epd = "4k3/8/8/8/4P3/8/8/4K3 w - - 0 1 nc 33";
        check(epd, "e4d5", Ok(()));
        check(epd, "e4e5", Ok(()));
        check(epd, "e4f5", Ok(()));
        check(epd, "e4d3", Err(IllegalMoveError::UnreachableSquare));
        check(epd, "e4f3", Err(IllegalMoveError::UnreachableSquare));
        // Sideways toward nothing is still unreachable.
        check(epd, "e4d4", Err(IllegalMoveError::UnreachableSquare));
        // A classic pawn gets none of this.
        check(
            "4k3/8/8/8/4P3/8/8/4K3 w - - 0 1 cc 33",
            "e4d5",
            Err(IllegalMoveError::UnreachableSquare),
        );
    }

    #[test]
    fn illegal_captures() {
        // Capturing your own piece.
        check(START_CC, "d1e2", Err(IllegalMoveError::IllegalCapture));
        // The Ghost can never be captured.
        check(
            "4k3/8/8/r2R4/8/8/8/4K3 w - - 0 1 cr 33",
            "d5a5",
            Err(IllegalMoveError::IllegalCapture),
        );
        // The Nemesis queen falls only to kings.
        check(
            "4k3/8/8/q2R4/8/8/8/4K3 w - - 0 1 cn 33",
            "d5a5",
            Err(IllegalMoveError::IllegalCapture),
        );
        // An Elephant three squares away is out of reach.
        check(
            "4k3/8/8/r2R4/8/8/8/4K3 w - - 0 1 ca 33",
            "d5a5",
            Err(IllegalMoveError::IllegalCapture),
        );
        // Two squares away it is fair game.
        check("4k3/8/8/1r1R4/8/8/8/4K3 w - - 0 1 ca 33", "d5b5", Ok(()));
    }

    #[test]
    fn rampage_rules() {
        // A one-step capture with room to continue is illegal.
        let epd = "4k3/8/8/8/8/8/p7/R3K3 w - - 0 1 ac 33";
        check(epd, "a1a2", Err(IllegalMoveError::IllegalRampage));
        // Stopping two short with a trampled square behind is illegal too.
        check(epd, "a1a3", Err(IllegalMoveError::IllegalRampage));
        // The full three squares are always allowed.
        check(epd, "a1a4", Ok(()));
    }

    #[test]
    fn rampage_stops_at_the_edge() {
        // Elephant on a6 takes the pawn on a7 and stops on a8: the edge
        // justifies the short rampage.
        let epd = "4k3/p7/R7/8/8/8/8/4K3 w - - 0 1 ac 33";
        check(epd, "a6a8", Ok(()));
        // Quiet elephant moves need no justification.
        check(epd, "a6b6", Ok(()));
    }

    #[test]
    fn duel_stone_limits() {
        // The defender cannot bid more than it has.
        check(
            "4k3/8/8/4p3/3P4/8/8/4K3 w - - 0 1 cc 31",
            "d4e5:20+",
            Err(IllegalMoveError::NotEnoughStones),
        );
        // Nor the attacker.
        check(
            "4k3/8/8/4p3/3P4/8/8/4K3 w - - 0 1 cc 13",
            "d4e5:02",
            Err(IllegalMoveError::NotEnoughStones),
        );
        // The outranked attacker's toll counts against it.
        check(
            "4k3/8/8/4r3/3P4/8/8/4K3 w - - 0 1 cc 03",
            "d4e5:11",
            Err(IllegalMoveError::NotEnoughStones),
        );
    }

    #[test]
    fn duel_targets() {
        // Kings never duel, in either direction.
        check(
            "4k3/8/8/8/8/3p4/4K3/8 w - - 0 1 cc 33",
            "e2d3:10+",
            Err(IllegalMoveError::NotDuelable),
        );
        // A quiet move cannot carry duels.
        check(START_CC, "e2e4:00+", Err(IllegalMoveError::TooManyDuels));
        // One capture cannot carry two duels.
        check(
            "4k3/8/8/4p3/3P4/8/8/4K3 w - - 0 1 cc 33",
            "d4e5:11:11",
            Err(IllegalMoveError::TooManyDuels),
        );
        // An incomplete duel cannot be applied.
        check(
            "4k3/8/8/4p3/3P4/8/8/4K3 w - - 0 1 cc 33",
            "d4e5:1",
            Err(IllegalMoveError::NotDuelable),
        );
    }

    #[test]
    fn moving_into_check_is_rejected() {
        // The bishop is pinned against the king by the rook.
        check(
            "4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1 cc 33",
            "e2d3",
            Err(IllegalMoveError::MoveIntoCheck),
        );
        // The same bishop may slide along the pin line... nowhere, but the
        // king can step aside.
        check("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1 cc 33", "e1d1", Ok(()));
    }
}
