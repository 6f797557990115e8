//! Line-delimited JSON adapter.
//!
//! Each stdin line is a request: `{"armies": "ck"}` starts a fresh game,
//! `{"epd": "..."}` loads one, and an optional `"move"` is validated and
//! applied. The response carries the resulting EPD, the sorted legal moves,
//! the game-over state and winner, and - after a move - the duel variants
//! available for it. Errors come back as `{"error": "..."}`.

use std::io::{self, BufRead};

use serde::Deserialize;
use serde_json::{json, Value};

use chess_two::chess_move::parse_uci;
use chess_two::epd::{encode_epd, find_army_symbol, parse_epd};
use chess_two::game::{Game, GameStatus};

#[derive(Deserialize, Default)]
#[serde(default)]
struct Request {
    armies: String,
    epd: String,
    #[serde(rename = "move")]
    move_text: String,
}

fn format_game(game: &Game) -> Value {
    let mut legal_moves: Vec<String> = game
        .generate_legal_moves()
        .iter()
        .map(|m| m.to_string())
        .collect();
    legal_moves.sort();
    let winner = match game.game_state() {
        GameStatus::InProgress => Value::Null,
        GameStatus::WhiteWins => json!("white"),
        GameStatus::BlackWins => json!("black"),
        GameStatus::Draw => json!("draw"),
    };
    json!({
        "epd": encode_epd(game),
        "legal_moves": legal_moves,
        "game_over": game.game_state() != GameStatus::InProgress,
        "winner": winner,
    })
}

fn handle_line(line: &str) -> Value {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(_) => return json!({"error": "invalid JSON input"}),
    };
    if !request.armies.is_empty() && !request.epd.is_empty() {
        return json!({"error": "either `epd` or `armies` must be provided, but not both"});
    }
    let game = if !request.armies.is_empty() {
        let symbols: Vec<char> = request.armies.chars().collect();
        if symbols.len() != 2 {
            return json!({"error": "invalid armies"});
        }
        match (find_army_symbol(symbols[0]), find_army_symbol(symbols[1])) {
            (Some(white), Some(black)) => Game::from_armies(white, black),
            _ => return json!({"error": "invalid armies"}),
        }
    } else {
        match parse_epd(&request.epd) {
            Ok(game) => game,
            Err(err) => return json!({"error": err.to_string()}),
        }
    };
    if request.move_text.is_empty() {
        return format_game(&game);
    }
    let m = match parse_uci(&request.move_text) {
        Ok(m) => m,
        Err(err) => return json!({"error": err.to_string()}),
    };
    if let Err(err) = game.validate_legal_move(m) {
        return json!({"error": format!("illegal move: {}", err)});
    }
    let next = game.apply_move(m);
    let mut available_duels: Vec<String> = game
        .generate_duels(m)
        .iter()
        .map(|variant| variant.to_string())
        .collect();
    available_duels.sort();
    let mut response = format_game(&next);
    response["available_duels"] = json!(available_duels);
    response
}

fn main() {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        println!("{}", handle_line(&line));
    }
}
