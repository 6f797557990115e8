//! Full game state serialization.
//!
//! An EPD line is eight space-separated fields:
//!
//! ```text
//! <fen> <to-move> <castle> <ep> <halfmove> <fullmove> <armies> <stones>
//! ```
//!
//! `<to-move>` is `w`/`b`, or `K`/`k` when that side is in its king-turn
//! (which only a Two Kings player can be). Armies are two letters from
//! `cnerka`, stones two digits from 0 to 6. The fullmove number is printed
//! one-based but stored zero-based.

use crate::errors::ParseError;
use crate::fen::{encode_fen, parse_fen};
use crate::game::{
    Game, GameStatus, GameVariant, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE,
    CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE,
};
use crate::piece::{color_index, Army, Color};
use crate::square::{Square, INVALID_SQUARE};

pub fn army_symbol(army: Army) -> char {
    match army {
        Army::Classic => 'c',
        Army::Nemesis => 'n',
        Army::Empowered => 'e',
        Army::Reaper => 'r',
        Army::TwoKings => 'k',
        Army::Animals => 'a',
        Army::None => '-',
    }
}

/// The army named by an EPD letter, if any.
pub fn find_army_symbol(symbol: char) -> Option<Army> {
    match symbol {
        'c' => Some(Army::Classic),
        'n' => Some(Army::Nemesis),
        'e' => Some(Army::Empowered),
        'r' => Some(Army::Reaper),
        'k' => Some(Army::TwoKings),
        'a' => Some(Army::Animals),
        _ => None,
    }
}

pub fn encode_epd(game: &Game) -> String {
    let mut out = encode_fen(&game.board);
    out.push(' ');
    out.push(match (game.to_move, game.king_turn) {
        (Color::White, false) => 'w',
        (Color::Black, false) => 'b',
        (Color::White, true) => 'K',
        (Color::Black, true) => 'k',
    });
    out.push(' ');
    if game.castling_rights == 0 {
        out.push('-');
    } else {
        if game.castling_rights & CASTLE_WHITE_KINGSIDE != 0 {
            out.push('K');
        }
        if game.castling_rights & CASTLE_WHITE_QUEENSIDE != 0 {
            out.push('Q');
        }
        if game.castling_rights & CASTLE_BLACK_KINGSIDE != 0 {
            out.push('k');
        }
        if game.castling_rights & CASTLE_BLACK_QUEENSIDE != 0 {
            out.push('q');
        }
    }
    out.push(' ');
    if game.ep_square.is_valid() {
        out.push_str(&game.ep_square.to_string());
    } else {
        out.push('-');
    }
    out.push_str(&format!(
        " {} {} {}{} {}{}",
        game.halfmove_clock,
        game.fullmove_number + 1,
        army_symbol(game.armies[0]),
        army_symbol(game.armies[1]),
        game.stones[0],
        game.stones[1],
    ));
    out
}

pub fn parse_epd(epd: &str) -> Result<Game, ParseError> {
    let fields: Vec<&str> = epd.split_ascii_whitespace().collect();
    if fields.len() != 8 {
        return Err(ParseError(format!(
            "EPD must have 8 fields, found {}",
            fields.len()
        )));
    }

    let board = parse_fen(fields[0])?;

    let (to_move, king_turn) = match fields[1] {
        "w" => (Color::White, false),
        "b" => (Color::Black, false),
        "K" => (Color::White, true),
        "k" => (Color::Black, true),
        other => return Err(ParseError(format!("invalid to-move field {:?}", other))),
    };

    let mut castling_rights = 0u64;
    if fields[2] != "-" {
        for c in fields[2].chars() {
            castling_rights |= match c {
                'K' => CASTLE_WHITE_KINGSIDE,
                'Q' => CASTLE_WHITE_QUEENSIDE,
                'k' => CASTLE_BLACK_KINGSIDE,
                'q' => CASTLE_BLACK_QUEENSIDE,
                _ => return Err(ParseError(format!("invalid castling field {:?}", fields[2]))),
            };
        }
    }

    let ep_square = if fields[3] == "-" {
        INVALID_SQUARE
    } else {
        let square = Square::from_name(fields[3])?;
        if square.y() != 2 && square.y() != 5 {
            return Err(ParseError(format!(
                "en passant square {} not on rank 3 or 6",
                square
            )));
        }
        square
    };

    let halfmove_clock: u32 = fields[4]
        .parse()
        .map_err(|_| ParseError(format!("invalid halfmove clock {:?}", fields[4])))?;
    let fullmove: u32 = fields[5]
        .parse()
        .map_err(|_| ParseError(format!("invalid fullmove number {:?}", fields[5])))?;
    if fullmove < 1 {
        return Err(ParseError("fullmove number must be at least 1".to_string()));
    }

    let army_chars: Vec<char> = fields[6].chars().collect();
    if army_chars.len() != 2 {
        return Err(ParseError(format!("invalid armies field {:?}", fields[6])));
    }
    let mut armies = [Army::None; 2];
    for (idx, &c) in army_chars.iter().enumerate() {
        armies[idx] = find_army_symbol(c)
            .ok_or_else(|| ParseError(format!("unknown army {:?}", c)))?;
    }

    let stone_chars: Vec<char> = fields[7].chars().collect();
    if stone_chars.len() != 2 {
        return Err(ParseError(format!("invalid stones field {:?}", fields[7])));
    }
    let mut stones = [0i32; 2];
    for (idx, &c) in stone_chars.iter().enumerate() {
        if !('0'..='6').contains(&c) {
            return Err(ParseError(format!("invalid stone count {:?}", c)));
        }
        stones[idx] = c as i32 - '0' as i32;
    }

    if king_turn && armies[color_index(to_move)] != Army::TwoKings {
        return Err(ParseError(
            "king-turn to-move requires the Two Kings army".to_string(),
        ));
    }

    let mut game = Game {
        board,
        flags: GameVariant::Chess2,
        castling_rights,
        armies,
        stones,
        to_move,
        king_turn,
        game_state: GameStatus::InProgress,
        halfmove_clock,
        fullmove_number: fullmove - 1,
        ep_square,
    };
    game.update_game_state();
    Ok(game)
}
