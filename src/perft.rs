//! Perft: the move-count oracle.
//!
//! `perft` counts the legal move sequences at every depth using the real
//! generator; `perft_bruteforce` does the same by validating every possible
//! from/to pair (plus promotions and the pass). The two must agree exactly,
//! which is the main correctness harness for the move generator. Challenges
//! are never issued while counting moves.

use crate::chess_move::Move;
use crate::game::Game;
use crate::piece::{Army, Color, Piece, PieceType};
use crate::square::Square;

const PROMOTIONS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// Calls `send` once for every move a bruteforce search should try: each
/// from/to pair, the four promotion variants where a pawn could be reaching
/// its last rank, and the pass. Drop moves are not emitted.
pub fn bruteforce_move_list(mut send: impl FnMut(Move)) {
    for from in 0..64u8 {
        for to in 0..64u8 {
            let candidate = Move::new(Square { addr: from }, Square { addr: to });
            send(candidate);
            let from_y = from / 8;
            let to_y = to / 8;
            if (to_y == 0 && from_y == 1) || (to_y == 7 && from_y == 6) {
                for promotion in PROMOTIONS {
                    let mut promoted = candidate;
                    promoted.piece = Some(Piece::new(promotion, Army::None, Color::White));
                    send(promoted);
                }
            }
        }
    }
    send(Move::pass());
}

/// Node counts per depth, using the move generator.
pub fn perft(game: &Game, depth: usize) -> Vec<u64> {
    if depth == 0 {
        return Vec::new();
    }
    let mut results = vec![0u64; depth];
    do_perft(game, depth, &mut results, &|g| g.generate_legal_moves());
    results
}

/// Node counts per depth, trying every square combination through the
/// validator instead of the generator.
pub fn perft_bruteforce(game: &Game, depth: usize) -> Vec<u64> {
    if depth == 0 {
        return Vec::new();
    }
    let mut results = vec![0u64; depth];
    do_perft(game, depth, &mut results, &|g| {
        let mut moves = Vec::with_capacity(64);
        bruteforce_move_list(|candidate| {
            if g.validate_legal_move(candidate).is_ok() {
                moves.push(candidate);
            }
        });
        moves
    });
    results
}

fn do_perft(game: &Game, depth: usize, results: &mut [u64], get_moves: &dyn Fn(&Game) -> Vec<Move>) {
    let moves = get_moves(game);
    let level = results.len() - depth;
    results[level] += moves.len() as u64;
    if depth == 1 {
        return;
    }
    for m in moves {
        let child = game.apply_move(m);
        do_perft(&child, depth - 1, results, get_moves);
    }
}
