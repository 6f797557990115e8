//! Line-oriented perft checker.
//!
//! Reads EPD lines from stdin, optionally suffixed with `; n1/n2/...`
//! expected counts, runs perft to the requested depth and echoes each line
//! with its counts. Mismatches and parse failures go to stderr and make the
//! process exit with 1; an I/O failure exits with 2.

use std::io::{self, BufRead};
use std::process;

use chess_two::epd::parse_epd;
use chess_two::perft::{perft, perft_bruteforce};

fn main() {
    let mut max_depth: usize = 2;
    let mut bruteforce = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-d" | "--depth" => {
                max_depth = match args.next().and_then(|v| v.parse().ok()) {
                    Some(depth) => depth,
                    None => {
                        eprintln!("--depth requires a number");
                        process::exit(2);
                    }
                };
            }
            "-b" | "--brute-force" => bruteforce = true,
            other => {
                eprintln!("unknown argument {:?}", other);
                process::exit(2);
            }
        }
    }

    let stdin = io::stdin();
    let mut failed = false;
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("error reading: {}", err);
                process::exit(2);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match run_perft(&line, max_depth, bruteforce) {
            Ok(result) => println!("{}", result),
            Err(err) => {
                eprintln!("{} (epd: {})", err, line);
                failed = true;
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

/// Runs one input line: an EPD, optionally followed by a semicolon and a
/// slash-delimited list of expected counts per depth.
fn run_perft(input: &str, max_depth: usize, bruteforce: bool) -> Result<String, String> {
    let mut parts = input.splitn(2, ';');
    let epd = parts.next().unwrap_or("").trim();
    let mut check_values: Vec<u64> = Vec::new();
    if let Some(rest) = parts.next() {
        for token in rest.trim().split('/') {
            let value = token
                .trim()
                .parse()
                .map_err(|_| format!("invalid perft value {:?}", token))?;
            check_values.push(value);
        }
    }

    let game = parse_epd(epd).map_err(|err| err.to_string())?;
    let result = if bruteforce {
        perft_bruteforce(&game, max_depth)
    } else {
        perft(&game, max_depth)
    };
    for (depth_idx, expected) in check_values.iter().take(result.len()).enumerate() {
        if *expected != result[depth_idx] {
            return Err(format!(
                "expected {}, found {} at depth {}",
                expected,
                result[depth_idx],
                depth_idx + 1
            ));
        }
    }
    // Preserve deeper but unchecked counts from the input.
    let counts = if result.len() < check_values.len() {
        check_values
    } else {
        result
    };
    let rendered: Vec<String> = counts.iter().map(|v| v.to_string()).collect();
    Ok(format!("{} ; {}", epd, rendered.join("/")))
}
