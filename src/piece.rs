//! Piece identity.
//!
//! A `Piece` is a single packed byte: bits 0..4 hold the `PieceType`, bits
//! 4..7 the `Army`, and bit 7 the `Color`. Boards store pieces with
//! `Army::None`; the owning game re-injects the army when the piece is read
//! back, because the army is a property of the player rather than the board.
//!
//! `PieceName` is the derived variant tag used by the attack and validation
//! layers. Army/type combinations with no special rules collapse to a basic
//! name equal to the bare type, so dispatch is a single flat match.

use std::fmt;

const TYPE_MASK: u8 = 0x0f;
const ARMY_MASK: u8 = 0x70;
const COLOR_MASK: u8 = 0x80;

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PieceType {
    King = 0x01,
    Queen = 0x02,
    Bishop = 0x03,
    Knight = 0x04,
    Rook = 0x05,
    Pawn = 0x06,
}

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Army {
    None = 0x00,
    Classic = 0x10,
    Nemesis = 0x20,
    Empowered = 0x30,
    Reaper = 0x40,
    TwoKings = 0x50,
    Animals = 0x60,
}

#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Color {
    White = 0x00,
    Black = 0x80,
}

/// Index into the per-type board mask array.
pub fn piece_type_index(t: PieceType) -> usize {
    t as usize - 1
}

pub fn piece_type_from_index(idx: usize) -> PieceType {
    match idx {
        0 => PieceType::King,
        1 => PieceType::Queen,
        2 => PieceType::Bishop,
        3 => PieceType::Knight,
        4 => PieceType::Rook,
        5 => PieceType::Pawn,
        _ => panic!("invalid piece type index"),
    }
}

/// 0 for white, 1 for black.
pub fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

pub fn other_color(color: Color) -> Color {
    match color {
        Color::White => Color::Black,
        Color::Black => Color::White,
    }
}

/// The dispatch tag for attack and capture rules: the cross product of army
/// and type, collapsed so that combinations without special rules fall back
/// to the basic name of the bare type.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PieceName {
    BasicKing,
    BasicQueen,
    BasicBishop,
    BasicKnight,
    BasicRook,
    BasicPawn,
    ClassicKing,
    NemesisQueen,
    NemesisPawn,
    EmpoweredQueen,
    EmpoweredBishop,
    EmpoweredKnight,
    EmpoweredRook,
    ReaperQueen,
    ReaperRook,
    TwoKingsKing,
    AnimalsQueen,
    AnimalsBishop,
    AnimalsKnight,
    AnimalsRook,
}

impl fmt::Display for PieceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceName::BasicKing => "king",
            PieceName::BasicQueen => "queen",
            PieceName::BasicBishop => "bishop",
            PieceName::BasicKnight => "knight",
            PieceName::BasicRook => "rook",
            PieceName::BasicPawn => "pawn",
            PieceName::ClassicKing => "Classic King",
            PieceName::NemesisQueen => "Nemesis",
            PieceName::NemesisPawn => "Nemesis Pawn",
            PieceName::EmpoweredQueen => "Abdicated Queen",
            PieceName::EmpoweredBishop => "Empowered Bishop",
            PieceName::EmpoweredKnight => "Empowered Knight",
            PieceName::EmpoweredRook => "Empowered Rook",
            PieceName::ReaperQueen => "Reaper",
            PieceName::ReaperRook => "Ghost",
            PieceName::TwoKingsKing => "Warrior King",
            PieceName::AnimalsQueen => "Jungle Queen",
            PieceName::AnimalsBishop => "Tiger",
            PieceName::AnimalsKnight => "Wild Horse",
            PieceName::AnimalsRook => "Elephant",
        };
        write!(f, "{}", name)
    }
}

/// A single piece: army, color and type packed into one byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    repr: u8,
}

impl Piece {
    pub fn new(piece_type: PieceType, army: Army, color: Color) -> Piece {
        Piece {
            repr: piece_type as u8 | army as u8 | color as u8,
        }
    }

    /// Returns a copy with the army replaced.
    pub fn with_army(&self, army: Army) -> Piece {
        Piece::new(self.piece_type(), army, self.color())
    }

    pub fn piece_type(&self) -> PieceType {
        match self.repr & TYPE_MASK {
            0x01 => PieceType::King,
            0x02 => PieceType::Queen,
            0x03 => PieceType::Bishop,
            0x04 => PieceType::Knight,
            0x05 => PieceType::Rook,
            0x06 => PieceType::Pawn,
            _ => panic!("corrupt piece byte"),
        }
    }

    pub fn army(&self) -> Army {
        match self.repr & ARMY_MASK {
            0x00 => Army::None,
            0x10 => Army::Classic,
            0x20 => Army::Nemesis,
            0x30 => Army::Empowered,
            0x40 => Army::Reaper,
            0x50 => Army::TwoKings,
            0x60 => Army::Animals,
            _ => panic!("corrupt piece byte"),
        }
    }

    pub fn color(&self) -> Color {
        if self.repr & COLOR_MASK == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// The dispatch name: army-specific where the combination has special
    /// rules, otherwise the basic name of the bare type.
    pub fn name(&self) -> PieceName {
        match (self.army(), self.piece_type()) {
            (Army::Classic, PieceType::King) => PieceName::ClassicKing,
            (Army::Nemesis, PieceType::Queen) => PieceName::NemesisQueen,
            (Army::Nemesis, PieceType::Pawn) => PieceName::NemesisPawn,
            (Army::Empowered, PieceType::Queen) => PieceName::EmpoweredQueen,
            (Army::Empowered, PieceType::Bishop) => PieceName::EmpoweredBishop,
            (Army::Empowered, PieceType::Knight) => PieceName::EmpoweredKnight,
            (Army::Empowered, PieceType::Rook) => PieceName::EmpoweredRook,
            (Army::Reaper, PieceType::Queen) => PieceName::ReaperQueen,
            (Army::Reaper, PieceType::Rook) => PieceName::ReaperRook,
            (Army::TwoKings, PieceType::King) => PieceName::TwoKingsKing,
            (Army::Animals, PieceType::Queen) => PieceName::AnimalsQueen,
            (Army::Animals, PieceType::Bishop) => PieceName::AnimalsBishop,
            (Army::Animals, PieceType::Knight) => PieceName::AnimalsKnight,
            (Army::Animals, PieceType::Rook) => PieceName::AnimalsRook,
            (_, t) => match t {
                PieceType::King => PieceName::BasicKing,
                PieceType::Queen => PieceName::BasicQueen,
                PieceType::Bishop => PieceName::BasicBishop,
                PieceType::Knight => PieceName::BasicKnight,
                PieceType::Rook => PieceName::BasicRook,
                PieceType::Pawn => PieceName::BasicPawn,
            },
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = match self.color() {
            Color::White => "white",
            Color::Black => "black",
        };
        write!(f, "{} {}", color, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_fields_round_trip() {
        let p = Piece::new(PieceType::Rook, Army::Animals, Color::Black);
        assert_eq!(p.piece_type(), PieceType::Rook);
        assert_eq!(p.army(), Army::Animals);
        assert_eq!(p.color(), Color::Black);
        assert_eq!(p.name(), PieceName::AnimalsRook);

        let q = p.with_army(Army::None);
        assert_eq!(q.piece_type(), PieceType::Rook);
        assert_eq!(q.army(), Army::None);
        assert_eq!(q.color(), Color::Black);
        assert_eq!(q.name(), PieceName::BasicRook);
    }

    #[test]
    fn names_collapse_to_basic() {
        // A Reaper pawn has no special rules, so it dispatches as a pawn.
        let p = Piece::new(PieceType::Pawn, Army::Reaper, Color::White);
        assert_eq!(p.name(), PieceName::BasicPawn);
        // A Classic queen is just a queen.
        let q = Piece::new(PieceType::Queen, Army::Classic, Color::White);
        assert_eq!(q.name(), PieceName::BasicQueen);
        // The Two Kings army's king is the Warrior King.
        let k = Piece::new(PieceType::King, Army::TwoKings, Color::Black);
        assert_eq!(k.name(), PieceName::TwoKingsKing);
    }

    #[test]
    fn display_names() {
        let p = Piece::new(PieceType::Bishop, Army::Animals, Color::White);
        assert_eq!(p.to_string(), "white Tiger");
        let q = Piece::new(PieceType::Rook, Army::Reaper, Color::Black);
        assert_eq!(q.to_string(), "black Ghost");
    }

    #[test]
    fn color_helpers() {
        assert_eq!(color_index(Color::White), 0);
        assert_eq!(color_index(Color::Black), 1);
        assert_eq!(other_color(Color::White), Color::Black);
        assert_eq!(other_color(Color::Black), Color::White);
    }
}
