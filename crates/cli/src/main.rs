//! Local REPL over the host layer. Plays both games in a single room with an
//! in-memory store, the same way the chat platform drives the handlers.
//!
//! Lines look like `farkle roll` or `gems take w b g`. `player <name>`
//! switches the speaking identity so one terminal can seat a whole table.

use parlor_core::rng::{RandomSource, RngState};
use parlor_host::{Caller, MemoryStore, Session, SessionConfig};
use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

const ROOM: &str = "local";

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn print_help() {
    println!("Commands:");
    println!("  player <name>          speak as <name> (default: player1)");
    println!("  farkle <verb> [args]   dice game: new/join/start/single/rule/roll/select/bank/");
    println!("                         status/end/stats/board");
    println!("  gems <verb> [args]     gem game: new/join/start/take/reserve/buy/patron/");
    println!("                         status/mine/end/stats");
    println!("  help                   this text");
    println!("  quit                   leave");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut session = Session::new(MemoryStore::new(), SessionConfig::default());
    let mut rng = RngState::from_entropy();
    let mut caller = Caller::new("player1", "player1");

    println!("parlor — local table. `help` lists commands.");
    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        print!("{}> ", caller.name);
        if out.flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = parts.split_first() else {
            continue;
        };

        match head {
            "quit" | "exit" => break,
            "help" | "?" => print_help(),
            "player" => match rest.first() {
                Some(name) => {
                    caller = Caller::new(*name, *name);
                    println!("Speaking as {name}.");
                }
                None => println!("usage: player <name>"),
            },
            "farkle" | "gems" => {
                let Some((&verb, args)) = rest.split_first() else {
                    println!("usage: {head} <verb> [args]");
                    continue;
                };
                let reply = dispatch(&mut session, head, &caller, verb, args, &mut rng);
                println!("{}", reply);
            }
            other => println!("unknown command: {other} (try `help`)"),
        }
    }
}

fn dispatch(
    session: &mut Session<MemoryStore>,
    module: &str,
    caller: &Caller,
    verb: &str,
    args: &[&str],
    rng: &mut dyn RandomSource,
) -> String {
    let now = now_secs();
    let reply = if module == "farkle" {
        session.handle_farkle(ROOM, caller, verb, args, now, rng)
    } else {
        session.handle_gems(ROOM, caller, verb, args, now, rng)
    };
    reply.text
}
