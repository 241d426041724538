use parlor_core::rng::ScriptedSource;
use parlor_host::{BlobStore, Caller, MemoryStore, Session, SessionConfig};
use serde_json::Value;

fn session() -> Session<MemoryStore> {
    Session::new(MemoryStore::new(), SessionConfig::default())
}

fn alice() -> Caller {
    Caller::new("u1", "Alice")
}

fn bob() -> Caller {
    Caller::new("u2", "Bob")
}

/// Drive a two-player dice game to its conclusion through the command
/// surface. Every call reloads state from the store, so this also covers
/// blob round-tripping.
fn play_farkle_to_the_end(session: &mut Session<MemoryStore>, now: u64) {
    let mut rng = ScriptedSource::default();
    session.handle_farkle("room", &alice(), "new", &["100"], now, &mut rng);
    session.handle_farkle("room", &bob(), "join", &[], now, &mut rng);

    // Shuffle value 1 keeps the two seats in join order.
    let mut rng = ScriptedSource::new([1]);
    session.handle_farkle("room", &alice(), "start", &[], now, &mut rng);

    let mut rng = ScriptedSource::with_faces([1, 5, 2, 2, 3, 6]);
    session.handle_farkle("room", &alice(), "roll", &[], now, &mut rng);
    session.handle_farkle("room", &alice(), "select", &["1"], now, &mut rng);
    let reply = session.handle_farkle("room", &alice(), "bank", &[], now, &mut rng);
    assert!(reply.text.contains("target is reached"), "{}", reply.text);

    // Bob's final turn busts, settling the game.
    let mut rng = ScriptedSource::with_faces([2, 2, 3, 3, 4, 6]);
    let reply = session.handle_farkle("room", &bob(), "roll", &[], now, &mut rng);
    assert!(reply.concluded, "{}", reply.text);
    assert!(reply.text.contains("👑"), "{}", reply.text);
    assert!(reply.text.contains("Honor:"), "{}", reply.text);
}

#[test]
fn farkle_game_survives_the_store_between_commands() {
    let mut session = session();
    let mut rng = ScriptedSource::default();
    session.handle_farkle("room", &alice(), "new", &[], 0, &mut rng);
    let reply = session.handle_farkle("room", &bob(), "join", &[], 1, &mut rng);
    assert!(reply.text.contains("2 players"), "{}", reply.text);

    // A different room is untouched.
    let reply = session.handle_farkle("other", &bob(), "status", &[], 2, &mut rng);
    assert!(reply.text.contains("No dice game"), "{}", reply.text);
}

#[test]
fn concluded_farkle_game_persists_stats_and_honor() {
    let mut session = session();
    play_farkle_to_the_end(&mut session, 0);

    let mut rng = ScriptedSource::default();
    let reply = session.handle_farkle("room", &alice(), "stats", &[], 1, &mut rng);
    // Winner: +15 base, no overflow at exactly the target, +4 cut of the pot.
    assert!(reply.text.contains("1 games, 1 wins, 1019 honor"), "{}", reply.text);
    let reply = session.handle_farkle("room", &bob(), "stats", &[], 1, &mut rng);
    assert!(reply.text.contains("1 games, 0 wins, 979 honor"), "{}", reply.text);

    // The room is free for a new table.
    let reply = session.handle_farkle("room", &alice(), "new", &[], 2, &mut rng);
    assert!(reply.text.contains("opens a dice table"), "{}", reply.text);
}

#[test]
fn concluded_rooms_are_cleared_from_the_store() {
    let mut session = session();
    play_farkle_to_the_end(&mut session, 0);
    assert!(session.store().get("farkle:game:room").is_none());

    // Ending an unstarted lobby clears its key too.
    let mut rng = ScriptedSource::default();
    session.handle_farkle("room", &alice(), "new", &[], 1, &mut rng);
    let reply = session.handle_farkle("room", &alice(), "end", &[], 2, &mut rng);
    assert!(reply.text.contains("table is closed"), "{}", reply.text);
    assert!(session.store().get("farkle:game:room").is_none());
}

#[test]
fn solo_run_lands_on_the_leaderboard() {
    let mut session = session();
    let mut rng = ScriptedSource::default();
    session.handle_farkle("room", &alice(), "single", &["1"], 0, &mut rng);
    let mut rng = ScriptedSource::with_faces([1, 1, 1, 2, 3, 4]);
    session.handle_farkle("room", &alice(), "roll", &[], 0, &mut rng);
    session.handle_farkle("room", &alice(), "select", &["111"], 0, &mut rng);
    let mut rng = ScriptedSource::default();
    let reply = session.handle_farkle("room", &alice(), "bank", &[], 0, &mut rng);
    assert!(reply.concluded);
    assert!(reply.text.contains("spot #1"), "{}", reply.text);

    let reply = session.handle_farkle("room", &bob(), "board", &[], 1, &mut rng);
    assert!(reply.text.contains("Alice — 1000"), "{}", reply.text);
}

#[test]
fn corrupted_blob_starts_fresh_with_a_notice() {
    let mut store = MemoryStore::new();
    store.put("farkle:game:room", "{not valid json".to_string());
    let mut session = Session::new(store, SessionConfig::default());

    let mut rng = ScriptedSource::default();
    let reply = session.handle_farkle("room", &alice(), "status", &[], 0, &mut rng);
    assert!(reply.text.contains("could not be read"), "{}", reply.text);
    assert!(reply.text.contains("No dice game"), "{}", reply.text);

    // The fresh state was written back; no second notice.
    let reply = session.handle_farkle("room", &alice(), "status", &[], 1, &mut rng);
    assert!(!reply.text.contains("could not be read"), "{}", reply.text);
}

#[test]
fn idle_games_expire_before_dispatch() {
    let mut session = Session::new(
        MemoryStore::new(),
        SessionConfig {
            idle_timeout_secs: 60,
        },
    );
    let mut rng = ScriptedSource::default();
    session.handle_farkle("room", &alice(), "new", &[], 0, &mut rng);
    session.handle_farkle("room", &bob(), "join", &[], 10, &mut rng);

    // An hour later the lobby is gone and the room is reusable at once.
    let reply = session.handle_farkle("room", &alice(), "status", &[], 3600, &mut rng);
    assert!(reply.text.contains("idle too long"), "{}", reply.text);
    assert!(reply.text.contains("No dice game"), "{}", reply.text);
    let reply = session.handle_farkle("room", &alice(), "new", &[], 3601, &mut rng);
    assert!(reply.text.contains("opens a dice table"), "{}", reply.text);
}

#[test]
fn parse_errors_come_back_as_text() {
    let mut session = session();
    let mut rng = ScriptedSource::default();
    let reply = session.handle_farkle("room", &alice(), "dance", &[], 0, &mut rng);
    assert_eq!(reply.text, "unknown command: dance");
    let reply = session.handle_gems("room", &alice(), "take", &["w"], 0, &mut rng);
    assert!(reply.text.contains("usage: take"), "{}", reply.text);
}

#[test]
fn engine_errors_do_not_touch_state() {
    let mut session = session();
    let mut rng = ScriptedSource::default();
    session.handle_farkle("room", &alice(), "new", &[], 0, &mut rng);
    let before = session.store().get("farkle:game:room");
    let reply = session.handle_farkle("room", &bob(), "start", &[], 5, &mut rng);
    assert!(reply.text.contains("initiator"), "{}", reply.text);
    assert_eq!(session.store().get("farkle:game:room"), before);
}

/// Edit the stored blob directly, the way a platform migration might.
fn patch_gems_blob(session: &mut Session<MemoryStore>, edit: impl FnOnce(&mut Value)) {
    let blob = session.store().get("gems:game:room").unwrap();
    let mut value: Value = serde_json::from_str(&blob).unwrap();
    edit(&mut value);
    // Session only exposes a read view; rebuild it around the edited store.
    let mut store = MemoryStore::new();
    for key in ["gems:game:room"] {
        store.put(key, serde_json::to_string(&value).unwrap());
    }
    *session = Session::new(store, SessionConfig::default());
}

#[test]
fn pending_patron_choice_blocks_the_session() {
    let mut session = session();
    let mut rng = ScriptedSource::default();
    session.handle_gems("room", &alice(), "new", &[], 0, &mut rng);
    session.handle_gems("room", &bob(), "join", &[], 0, &mut rng);
    session.handle_gems("room", &alice(), "start", &[], 0, &mut rng);

    // Rig the board: two patrons both satisfied by the current player.
    let current = {
        let blob = session.store().get("gems:game:room").unwrap();
        let value: Value = serde_json::from_str(&blob).unwrap();
        let index = value["game"]["current_index"].as_u64().unwrap() as usize;
        value["game"]["player_order"][index]
            .as_str()
            .unwrap()
            .to_string()
    };
    patch_gems_blob(&mut session, |value| {
        let game = &mut value["game"];
        game["patrons"] = serde_json::json!(["N01", "N06"]);
        for player in game["players"].as_array_mut().unwrap() {
            if player["user_id"] == serde_json::json!(current.clone()) {
                player["bonuses"] = serde_json::json!({
                    "white": 4, "blue": 4, "green": 3, "red": 0, "black": 0
                });
            }
        }
    });

    let actor = if current == "u1" { alice() } else { bob() };
    let reply = session.handle_gems("room", &actor, "take", &["w", "b", "g"], 1, &mut rng);
    assert!(reply.text.contains("Several patrons"), "{}", reply.text);

    // Every other verb is refused until the choice lands.
    let reply = session.handle_gems("room", &actor, "take", &["r", "r"], 2, &mut rng);
    assert!(reply.text.contains("choose one"), "{}", reply.text);

    let reply = session.handle_gems("room", &actor, "patron", &["n06"], 3, &mut rng);
    assert!(reply.text.contains("welcomes patron N06"), "{}", reply.text);
    assert!(reply.text.contains("Over to"), "{}", reply.text);
}

#[test]
fn gems_game_plays_through_the_surface() {
    let mut session = session();
    let mut rng = ScriptedSource::default();
    session.handle_gems("room", &alice(), "new", &[], 0, &mut rng);
    session.handle_gems("room", &bob(), "join", &[], 0, &mut rng);
    let reply = session.handle_gems("room", &alice(), "start", &[], 0, &mut rng);
    assert!(reply.text.contains("goes first"), "{}", reply.text);

    let status = session.handle_gems("room", &alice(), "status", &[], 1, &mut rng);
    assert!(status.text.contains("Bank:"), "{}", status.text);
    assert!(status.text.contains("Tier 1"), "{}", status.text);

    // Whoever is up takes tokens; the other is told to wait.
    let first_is_alice = {
        let reply = session.handle_gems("room", &alice(), "take", &["w", "b", "g"], 2, &mut rng);
        !reply.text.contains("not your turn")
    };
    let (second, _first) = if first_is_alice {
        (bob(), alice())
    } else {
        // Alice was refused without consuming the turn.
        let reply = session.handle_gems("room", &bob(), "take", &["w", "b", "g"], 3, &mut rng);
        assert!(reply.text.contains("takes"), "{}", reply.text);
        (alice(), bob())
    };
    let reply = session.handle_gems("room", &second, "take", &["r", "r"], 4, &mut rng);
    assert!(reply.text.contains("takes two red"), "{}", reply.text);

    let mine = session.handle_gems("room", &second, "mine", &[], 5, &mut rng);
    assert!(mine.text.contains("2 red"), "{}", mine.text);
}
