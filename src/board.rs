//! Piece placement.
//!
//! A board is eight bitboards: one mask per piece type plus one occupancy
//! mask per color. The invariants are that the per-type masks are pairwise
//! disjoint, the color masks are disjoint, and the union of the type masks
//! equals the union of the color masks. Pieces are stored without their army;
//! the game re-injects it on read-back.

use crate::piece::{color_index, piece_type_from_index, piece_type_index, Army, Color, Piece, PieceType};
use crate::square::Square;

#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Board {
    pub(crate) pieces: [u64; 6],
    pub(crate) colors: [u64; 2],
}

impl Board {
    /// The piece at the given square, or `None` when the square is empty.
    /// The returned piece always carries `Army::None`.
    pub fn piece_at(&self, s: Square) -> Option<Piece> {
        let square_mask = s.mask();
        if (self.colors[0] | self.colors[1]) & square_mask == 0 {
            return None;
        }
        let color = if self.colors[0] & square_mask != 0 {
            Color::White
        } else {
            Color::Black
        };
        for (idx, mask) in self.pieces.iter().enumerate() {
            if mask & square_mask != 0 {
                return Some(Piece::new(piece_type_from_index(idx), Army::None, color));
            }
        }
        None
    }

    /// Places a piece, clearing whatever was on the square first.
    pub fn set_piece_at(&mut self, s: Square, p: Piece) {
        self.clear_piece_at(s);
        let square_mask = s.mask();
        self.colors[color_index(p.color())] |= square_mask;
        self.pieces[piece_type_index(p.piece_type())] |= square_mask;
    }

    /// Empties the square.
    pub fn clear_piece_at(&mut self, s: Square) {
        let square_mask = s.mask();
        for mask in self.pieces.iter_mut() {
            *mask &= !square_mask;
        }
        self.colors[0] &= !square_mask;
        self.colors[1] &= !square_mask;
    }

    /// Converts every piece of the given color and `find` type into the
    /// `replace` type. Realizes the Two Kings queen-to-king substitution.
    pub fn replace_pieces(&mut self, color: Color, find: PieceType, replace: PieceType) {
        let mask = self.colors[color_index(color)] & self.pieces[piece_type_index(find)];
        self.pieces[piece_type_index(find)] &= !mask;
        self.pieces[piece_type_index(replace)] |= mask;
    }

    pub fn occupied_mask(&self) -> u64 {
        self.colors[0] | self.colors[1]
    }

    pub fn color_mask(&self, color: Color) -> u64 {
        self.colors[color_index(color)]
    }

    pub fn piece_type_mask(&self, piece_type: PieceType) -> u64 {
        self.pieces[piece_type_index(piece_type)]
    }

    pub fn kings_mask(&self, color: Color) -> u64 {
        self.color_mask(color) & self.piece_type_mask(PieceType::King)
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut union = 0u64;
        for (i, a) in self.pieces.iter().enumerate() {
            for b in self.pieces.iter().skip(i + 1) {
                assert_eq!(a & b, 0, "piece type masks overlap");
            }
            union |= a;
        }
        assert_eq!(self.colors[0] & self.colors[1], 0, "color masks overlap");
        assert_eq!(union, self.colors[0] | self.colors[1], "type/color mismatch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sq(name: &str) -> Square {
        Square::from_name(name).unwrap()
    }

    #[test]
    fn set_clear_and_read_back() {
        let mut board = Board::default();
        let piece = Piece::new(PieceType::Knight, Army::Animals, Color::Black);
        board.set_piece_at(sq("g8"), piece);
        board.check_invariants();
        let got = board.piece_at(sq("g8")).unwrap();
        // The army is not stored on the board.
        assert_eq!(got, piece.with_army(Army::None));
        assert!(board.piece_at(sq("g1")).is_none());

        // Setting over an occupied square replaces the piece entirely.
        let pawn = Piece::new(PieceType::Pawn, Army::None, Color::White);
        board.set_piece_at(sq("g8"), pawn);
        board.check_invariants();
        assert_eq!(board.piece_at(sq("g8")).unwrap(), pawn);

        board.clear_piece_at(sq("g8"));
        board.check_invariants();
        assert!(board.piece_at(sq("g8")).is_none());
    }

    #[test]
    fn replace_pieces_swaps_only_matching_color() {
        let mut board = Board::default();
        board.set_piece_at(sq("d1"), Piece::new(PieceType::Queen, Army::None, Color::White));
        board.set_piece_at(sq("d8"), Piece::new(PieceType::Queen, Army::None, Color::Black));
        board.replace_pieces(Color::White, PieceType::Queen, PieceType::King);
        board.check_invariants();
        assert_eq!(board.piece_at(sq("d1")).unwrap().piece_type(), PieceType::King);
        assert_eq!(board.piece_at(sq("d8")).unwrap().piece_type(), PieceType::Queen);
    }

    #[test]
    fn random_edit_sequences_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let types = [
            PieceType::King,
            PieceType::Queen,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
            PieceType::Pawn,
        ];
        let mut board = Board::default();
        for _ in 0..2000 {
            let square = Square {
                addr: rng.gen_range(0..64),
            };
            if rng.gen_bool(0.3) {
                board.clear_piece_at(square);
            } else {
                let piece_type = types[rng.gen_range(0..types.len())];
                let color = if rng.gen_bool(0.5) { Color::White } else { Color::Black };
                board.set_piece_at(square, Piece::new(piece_type, Army::None, color));
            }
            board.check_invariants();
        }
    }
}
