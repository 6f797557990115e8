//! The game value.
//!
//! A `Game` holds everything the rules need: the board, both armies, stone
//! counts, the side to move, the king-turn flag for the Two Kings army,
//! castling rights as a mask of the four corner squares, the en passant
//! square, the move clocks and the variant flag. Games are plain values;
//! `apply_move` returns a new one and never aliases board state between
//! positions.

use crate::bitmask::mask_rank;
use crate::board::Board;
use crate::fen::{parse_fen, FEN_DEFAULT};
use crate::piece::{color_index, other_color, Army, Color, Piece, PieceType};
use crate::square::{Square, INVALID_SQUARE};

pub const CASTLE_WHITE_KINGSIDE: u64 = 1u64 << 63; // h1
pub const CASTLE_WHITE_QUEENSIDE: u64 = 1u64 << 56; // a1
pub const CASTLE_BLACK_KINGSIDE: u64 = 1u64 << 7; // h8
pub const CASTLE_BLACK_QUEENSIDE: u64 = 1u64; // a8
pub const CASTLE_KINGSIDE: u64 = CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_KINGSIDE;
pub const CASTLE_QUEENSIDE: u64 = CASTLE_WHITE_QUEENSIDE | CASTLE_BLACK_QUEENSIDE;

/// Whether the game is in progress, and the winner once it isn't.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GameStatus {
    InProgress,
    WhiteWins,
    BlackWins,
    Draw,
}

fn win_for(color: Color) -> GameStatus {
    match color {
        Color::White => GameStatus::WhiteWins,
        Color::Black => GameStatus::BlackWins,
    }
}

/// Chess 2 proper, or the classic-rules variant that keeps the same engine
/// plumbing but no midline invasion.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum GameVariant {
    Chess2,
    Classic,
}

#[derive(Copy, Clone, Debug)]
pub struct Game {
    pub(crate) board: Board,
    pub(crate) flags: GameVariant,
    pub(crate) castling_rights: u64,
    pub(crate) armies: [Army; 2],
    pub(crate) stones: [i32; 2],
    pub(crate) to_move: Color,
    pub(crate) king_turn: bool,
    pub(crate) game_state: GameStatus,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) ep_square: Square,
}

impl Game {
    /// A new game with the provided armies: default position, three stones
    /// each, full castling rights. Two Kings sides start with their queen
    /// replaced by a second king.
    pub fn from_armies(white: Army, black: Army) -> Game {
        let mut board = parse_fen(FEN_DEFAULT).expect("default FEN must parse");
        if white == Army::TwoKings {
            board.replace_pieces(Color::White, PieceType::Queen, PieceType::King);
        }
        if black == Army::TwoKings {
            board.replace_pieces(Color::Black, PieceType::Queen, PieceType::King);
        }
        Game {
            board,
            flags: GameVariant::Chess2,
            castling_rights: CASTLE_KINGSIDE | CASTLE_QUEENSIDE,
            armies: [white, black],
            stones: [3, 3],
            to_move: Color::White,
            king_turn: false,
            game_state: GameStatus::InProgress,
            halfmove_clock: 0,
            fullmove_number: 0,
            ep_square: INVALID_SQUARE,
        }
    }

    pub fn game_state(&self) -> GameStatus {
        self.game_state
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn king_turn(&self) -> bool {
        self.king_turn
    }

    pub fn armies(&self) -> [Army; 2] {
        self.armies
    }

    pub fn stones(&self) -> [i32; 2] {
        self.stones
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// The fullmove number as printed: the internal count is zero-based.
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number + 1
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn army_of(&self, color: Color) -> Army {
        self.armies[color_index(color)]
    }

    /// The piece at a square with the owner's army filled in.
    pub fn piece_at(&self, s: Square) -> Option<Piece> {
        self.board
            .piece_at(s)
            .map(|p| p.with_army(self.army_of(p.color())))
    }

    pub fn kings_mask(&self, color: Color) -> u64 {
        self.board.kings_mask(color)
    }

    /// True when any enemy piece threatens one of `color`'s kings.
    pub fn is_in_check(&self, color: Color) -> bool {
        let enemy = other_color(color);
        let threatened = self.full_attack_mask(self.board.color_mask(enemy));
        threatened & self.kings_mask(color) != 0
    }

    /// Re-derives the game status. Called after every applied move and after
    /// parsing a position: fifty reversible plies draw, a midline invasion
    /// wins for the player who just moved, and a side to move without a
    /// legal move loses.
    pub(crate) fn update_game_state(&mut self) {
        if self.game_state != GameStatus::InProgress {
            return;
        }
        if self.halfmove_clock >= 50 {
            self.game_state = GameStatus::Draw;
            return;
        }
        if self.flags == GameVariant::Chess2 {
            let mover = if self.king_turn {
                self.to_move
            } else {
                other_color(self.to_move)
            };
            let kings = self.kings_mask(mover);
            if kings != 0 && self.kings_invaded(mover, kings) {
                self.game_state = win_for(mover);
                return;
            }
        }
        if !self.has_legal_move() {
            self.game_state = win_for(other_color(self.to_move));
        }
    }

    /// Midline invasion test. A Two Kings player needs every king across;
    /// everyone else needs just one.
    fn kings_invaded(&self, mover: Color, kings: u64) -> bool {
        let invasion_zone = match mover {
            Color::White => mask_rank(0) | mask_rank(1) | mask_rank(2) | mask_rank(3),
            Color::Black => mask_rank(4) | mask_rank(5) | mask_rank(6) | mask_rank(7),
        };
        if self.army_of(mover) == Army::TwoKings {
            kings & !invasion_zone == 0
        } else {
            kings & invasion_zone != 0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_move::parse_uci;
    use crate::epd::parse_epd;
    use crate::fen::encode_fen;

    #[test]
    fn from_armies_replaces_two_kings_queen() {
        let game = Game::from_armies(Army::TwoKings, Army::Nemesis);
        assert_eq!(
            encode_fen(&game.board),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR"
        );
        let game = Game::from_armies(Army::Nemesis, Army::TwoKings);
        assert_eq!(
            encode_fen(&game.board),
            "rnbkkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn from_armies_initial_state() {
        let game = Game::from_armies(Army::Classic, Army::Animals);
        assert_eq!(game.stones(), [3, 3]);
        assert_eq!(game.to_move(), Color::White);
        assert!(!game.king_turn());
        assert_eq!(game.game_state(), GameStatus::InProgress);
        assert_eq!(game.fullmove_number(), 1);
        assert_eq!(game.castling_rights, CASTLE_KINGSIDE | CASTLE_QUEENSIDE);
        assert!(!game.ep_square.is_valid());
    }

    #[test]
    fn elephant_rampage_threatens_king() {
        let game = parse_epd("4k3/8/8/8/8/8/8/2rK4 b - - 0 1 ca 33").unwrap();
        assert!(game.is_in_check(Color::White));
        assert!(!game.is_in_check(Color::Black));
    }

    #[test]
    fn ghost_never_gives_check() {
        // A Ghost only reaches unoccupied squares, so kings are safe from it.
        let game = parse_epd("4k3/8/8/3r4/3K4/8/8/4K3 w - - 0 1 kr 33").unwrap();
        assert!(!game.is_in_check(Color::White));
    }

    #[test]
    fn midline_invasion_wins() {
        let game = parse_epd("4k3/8/8/8/4K3/8/8/8 w - - 0 1 cc 33").unwrap();
        let next = game.apply_move(parse_uci("e4e5").unwrap());
        assert_eq!(next.game_state(), GameStatus::WhiteWins);
    }

    #[test]
    fn two_kings_need_both_across() {
        let game = parse_epd("4k3/8/8/8/3KK3/8/8/8 w - - 0 1 kc 33").unwrap();
        let halfway = game.apply_move(parse_uci("d4d5").unwrap());
        assert_eq!(halfway.game_state(), GameStatus::InProgress);
        assert!(halfway.king_turn());
        let across = halfway.apply_move(parse_uci("e4e5").unwrap());
        assert_eq!(across.game_state(), GameStatus::WhiteWins);
    }

    #[test]
    fn fifty_reversible_plies_draw() {
        let game = parse_epd("4k3/8/8/8/8/8/8/R3K3 w - - 49 30 cc 33").unwrap();
        let next = game.apply_move(parse_uci("a1a2").unwrap());
        assert_eq!(next.game_state(), GameStatus::Draw);
    }

    #[test]
    fn checkmate_loses() {
        let game = parse_epd(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3 cc 33",
        )
        .unwrap();
        assert_eq!(game.game_state(), GameStatus::BlackWins);
    }

    #[test]
    fn stalemate_also_loses() {
        let game = parse_epd("k7/2Q5/8/8/8/8/8/4K3 b - - 0 1 cc 33").unwrap();
        assert_eq!(game.game_state(), GameStatus::WhiteWins);
    }
}
