//! Command dispatch against the blob store: load the room's game, run the
//! lazy expiry check, apply the verb, persist, and phrase the reply. Engine
//! errors never mutate state and come back as plain text.

use crate::command::{FarkleCommand, GemsCommand};
use crate::store::BlobStore;
use crate::{farkle_text, gems_text};
use parlor_core::economy::TokenTake;
use parlor_core::farkle::{FarkleConclusion, FarkleGame, RollOutcome, TurnHandoff};
use parlor_core::gems::{GemsConclusion, GemsGame, GemsHandoff};
use parlor_core::outcome::{ConcludeReason, Phase};
use parlor_core::rng::RandomSource;
use parlor_core::stats::{
    settle_honor, FarkleStats, GemsStats, HonorChange, Leaderboard, LeaderboardEntry,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

const FARKLE_BOARD_KEY: &str = "farkle:leaderboard";

fn farkle_game_key(room: &str) -> String {
    format!("farkle:game:{room}")
}

fn farkle_stats_key(user: &str) -> String {
    format!("farkle:stats:{user}")
}

fn gems_game_key(room: &str) -> String {
    format!("gems:game:{room}")
}

fn gems_stats_key(user: &str) -> String {
    format!("gems:stats:{user}")
}

/// Whoever typed the command, as the chat platform identifies them.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: String,
    pub name: String,
    /// Room moderators may force-conclude games they did not open.
    pub privileged: bool,
}

impl Caller {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            privileged: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub concluded: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            concluded: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

/// Whole-game envelope stored per room key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredGame<G> {
    game: G,
    last_activity: u64,
}

pub struct Session<S: BlobStore> {
    store: S,
    config: SessionConfig,
}

impl<S: BlobStore> Session<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one dice-game command for a room. `now_secs` is wall-clock
    /// seconds; the caller owns the clock so tests can replay time.
    pub fn handle_farkle(
        &mut self,
        room: &str,
        caller: &Caller,
        verb: &str,
        args: &[&str],
        now_secs: u64,
        rng: &mut dyn RandomSource,
    ) -> Reply {
        let command = match FarkleCommand::parse(verb, args) {
            Ok(command) => command,
            Err(err) => return Reply::text(err.to_string()),
        };
        let span = tracing::info_span!("farkle", room, caller = %caller.id);
        let _guard = span.enter();

        let key = farkle_game_key(room);
        let (mut stored, mut lines) = self.load_game::<FarkleGame>(&key);
        if let Some(text) = self.expire_farkle(&key, &mut stored, now_secs) {
            lines.push(text);
        }

        match &command {
            FarkleCommand::Status => {
                lines.push(farkle_text::render_status(&stored.game));
                return Reply::text(lines.join("\n"));
            }
            FarkleCommand::Stats => {
                let stats: FarkleStats = self.load_json(&farkle_stats_key(&caller.id));
                lines.push(farkle_text::render_stats(&caller.name, &stats));
                return Reply::text(lines.join("\n"));
            }
            FarkleCommand::Board => {
                let board: Leaderboard = self.load_json(FARKLE_BOARD_KEY);
                lines.push(farkle_text::render_board(&board));
                return Reply::text(lines.join("\n"));
            }
            _ => {}
        }

        match dispatch_farkle(&mut stored.game, caller, command, rng) {
            Ok((text, conclusion)) => {
                lines.push(text);
                let concluded = conclusion.is_some();
                if let Some(conclusion) = conclusion {
                    if let Some(settlement) = self.settle_farkle(&conclusion, now_secs) {
                        lines.push(settlement);
                    }
                }
                if stored.game.phase == Phase::Concluded {
                    self.clear_room(&key);
                } else {
                    stored.last_activity = now_secs;
                    self.save_json(&key, &stored);
                }
                Reply {
                    text: lines.join("\n"),
                    concluded,
                }
            }
            Err(text) => {
                lines.push(text);
                Reply::text(lines.join("\n"))
            }
        }
    }

    /// Handle one gem-game command for a room.
    pub fn handle_gems(
        &mut self,
        room: &str,
        caller: &Caller,
        verb: &str,
        args: &[&str],
        now_secs: u64,
        rng: &mut dyn RandomSource,
    ) -> Reply {
        let command = match GemsCommand::parse(verb, args) {
            Ok(command) => command,
            Err(err) => return Reply::text(err.to_string()),
        };
        let span = tracing::info_span!("gems", room, caller = %caller.id);
        let _guard = span.enter();

        let key = gems_game_key(room);
        let (mut stored, mut lines) = self.load_game::<GemsGame>(&key);
        if let Some(text) = self.expire_gems(&key, &mut stored, now_secs) {
            lines.push(text);
        }

        match &command {
            GemsCommand::Status => {
                lines.push(gems_text::render_status(&stored.game));
                return Reply::text(lines.join("\n"));
            }
            GemsCommand::Mine => {
                let text = match stored.game.player(&caller.id) {
                    Some(player) => gems_text::render_mine(player),
                    None => "You are not seated at this table.".to_string(),
                };
                lines.push(text);
                return Reply::text(lines.join("\n"));
            }
            GemsCommand::Stats => {
                let stats: GemsStats = self.load_json(&gems_stats_key(&caller.id));
                lines.push(gems_text::render_stats(&caller.name, &stats));
                return Reply::text(lines.join("\n"));
            }
            _ => {}
        }

        match dispatch_gems(&mut stored.game, caller, command, rng) {
            Ok((text, conclusion)) => {
                lines.push(text);
                let concluded = conclusion.is_some();
                if let Some(conclusion) = conclusion {
                    self.settle_gems(&conclusion);
                }
                if stored.game.phase == Phase::Concluded {
                    self.clear_room(&key);
                } else {
                    stored.last_activity = now_secs;
                    self.save_json(&key, &stored);
                }
                Reply {
                    text: lines.join("\n"),
                    concluded,
                }
            }
            Err(text) => {
                lines.push(text);
                Reply::text(lines.join("\n"))
            }
        }
    }

    fn expire_farkle(
        &mut self,
        key: &str,
        stored: &mut StoredGame<FarkleGame>,
        now_secs: u64,
    ) -> Option<String> {
        if !self.is_expired(stored.game.is_active(), stored.last_activity, now_secs) {
            return None;
        }
        let played = stored.game.phase == Phase::InProgress;
        let conclusion = stored.game.conclude(ConcludeReason::Expired);
        tracing::info!(key, "idle game expired");
        let mut text = farkle_text::render_conclusion(&conclusion, &[]);
        if played {
            if let Some(settlement) = self.settle_farkle(&conclusion, now_secs) {
                text.push('\n');
                text.push_str(&settlement);
            }
        }
        self.clear_room(key);
        Some(text)
    }

    fn expire_gems(
        &mut self,
        key: &str,
        stored: &mut StoredGame<GemsGame>,
        now_secs: u64,
    ) -> Option<String> {
        if !self.is_expired(stored.game.is_active(), stored.last_activity, now_secs) {
            return None;
        }
        let played = stored.game.phase == Phase::InProgress;
        let conclusion = stored.game.conclude(ConcludeReason::Expired);
        tracing::info!(key, "idle game expired");
        if played {
            self.settle_gems(&conclusion);
        }
        self.clear_room(key);
        Some(gems_text::render_conclusion(&conclusion))
    }

    fn is_expired(&self, active: bool, last_activity: u64, now_secs: u64) -> bool {
        active && now_secs.saturating_sub(last_activity) >= self.config.idle_timeout_secs
    }

    /// Persist honor and lifetime records for a finished multiplayer game, or
    /// the leaderboard entry for a finished single-player run.
    fn settle_farkle(&mut self, conclusion: &FarkleConclusion, now_secs: u64) -> Option<String> {
        if let Some(solo) = &conclusion.solo {
            if solo.best_score <= 0 {
                return None;
            }
            let mut board: Leaderboard = self.load_json(FARKLE_BOARD_KEY);
            let position = board.submit(LeaderboardEntry {
                user_id: solo.user_id.clone(),
                user_name: solo.user_name.clone(),
                score: solo.best_score,
                rule_set: conclusion.rule_set,
                recorded_at: now_secs,
            });
            self.save_json(FARKLE_BOARD_KEY, &board);
            return position.map(|p| format!("{} takes spot #{p} on the board!", solo.user_name));
        }

        if conclusion.results.len() < 2 {
            return None;
        }
        let mut records: HashMap<String, FarkleStats> = conclusion
            .results
            .iter()
            .map(|r| (r.user_id.clone(), self.load_json(&farkle_stats_key(&r.user_id))))
            .collect();
        let honor: HashMap<String, i64> =
            records.iter().map(|(id, s)| (id.clone(), s.honor)).collect();
        let changes = settle_honor(&conclusion.results, conclusion.target_score, &|id| {
            honor.get(id).copied().unwrap_or_default()
        });
        for result in &conclusion.results {
            if let Some(stats) = records.get_mut(&result.user_id) {
                stats.record_game(result.score, result.is_winner);
            }
        }
        for change in &changes {
            if let Some(stats) = records.get_mut(&change.user_id) {
                stats.honor = change.new_honor;
            }
        }
        for (id, stats) in &records {
            self.save_json(&farkle_stats_key(id), stats);
        }
        Some(render_honor(&conclusion.results, &changes))
    }

    fn settle_gems(&mut self, conclusion: &GemsConclusion) {
        if conclusion.results.len() < 2 {
            return;
        }
        for result in &conclusion.results {
            let key = gems_stats_key(&result.user_id);
            let mut stats: GemsStats = self.load_json(&key);
            stats.record_game(result.points, result.rank, result.is_winner);
            self.save_json(&key, &stats);
        }
    }

    fn load_game<G: Default + DeserializeOwned + Serialize>(
        &mut self,
        key: &str,
    ) -> (StoredGame<G>, Vec<String>) {
        match self.store.get(key) {
            None => (
                StoredGame {
                    game: G::default(),
                    last_activity: 0,
                },
                Vec::new(),
            ),
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(stored) => {
                    tracing::debug!(key, "state loaded");
                    (stored, Vec::new())
                }
                Err(err) => {
                    tracing::warn!(key, %err, "corrupted blob, starting fresh");
                    let stored = StoredGame {
                        game: G::default(),
                        last_activity: 0,
                    };
                    self.save_json(key, &stored);
                    (
                        stored,
                        vec!["The saved game here could not be read, so the slate is clean."
                            .to_string()],
                    )
                }
            },
        }
    }

    fn load_json<T: Default + DeserializeOwned>(&self, key: &str) -> T {
        match self.store.get(key) {
            None => T::default(),
            Some(blob) => serde_json::from_str(&blob).unwrap_or_else(|err| {
                tracing::warn!(key, %err, "corrupted record, using defaults");
                T::default()
            }),
        }
    }

    /// Drop a finished room's blob so the key space holds live games only.
    fn clear_room(&mut self, key: &str) {
        tracing::debug!(key, "room cleared");
        self.store.delete(key);
    }

    fn save_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(blob) => {
                tracing::debug!(key, "state saved");
                self.store.put(key, blob);
            }
            Err(err) => tracing::warn!(key, %err, "failed to serialize state"),
        }
    }
}

fn render_honor(
    results: &[parlor_core::farkle::FarkleResult],
    changes: &[HonorChange],
) -> String {
    let parts: Vec<String> = changes
        .iter()
        .map(|c| {
            let name = results
                .iter()
                .find(|r| r.user_id == c.user_id)
                .map(|r| r.user_name.as_str())
                .unwrap_or(c.user_id.as_str());
            format!("{name} {:+} (now {})", c.delta, c.new_honor)
        })
        .collect();
    format!("Honor: {}.", parts.join(", "))
}

fn farkle_conclusion_of(handoff: &TurnHandoff) -> Option<FarkleConclusion> {
    match handoff {
        TurnHandoff::GameOver(conclusion) => Some(conclusion.clone()),
        _ => None,
    }
}

fn dispatch_farkle(
    game: &mut FarkleGame,
    caller: &Caller,
    command: FarkleCommand,
    rng: &mut dyn RandomSource,
) -> Result<(String, Option<FarkleConclusion>), String> {
    let err = |e: parlor_core::farkle::FarkleError| e.to_string();
    match command {
        FarkleCommand::New { target } => {
            game.open_lobby(&caller.id, &caller.name, target).map_err(err)?;
            Ok((
                format!(
                    "{} opens a dice table — race to {}. `join` to sit down, `start` when everyone is in.",
                    caller.name, game.target_score
                ),
                None,
            ))
        }
        FarkleCommand::Join => {
            let count = game.join(&caller.id, &caller.name).map_err(err)?;
            Ok((format!("{} sits down ({count} players).", caller.name), None))
        }
        FarkleCommand::Start { target } => {
            let first = game.start(&caller.id, target, rng).map_err(err)?;
            let first = first.user_name.clone();
            Ok((
                format!("The dice are out — race to {}. {first} goes first.", game.target_score),
                None,
            ))
        }
        FarkleCommand::Single { attempts } => {
            game.start_solo(&caller.id, &caller.name, attempts).map_err(err)?;
            let max = game.solo.as_ref().map(|s| s.max_attempts).unwrap_or(1);
            Ok((
                format!(
                    "{} starts a solo run ({max} attempt{}). `roll` to begin.",
                    caller.name,
                    if max == 1 { "" } else { "s" }
                ),
                None,
            ))
        }
        FarkleCommand::Rule { number } => {
            let rules = game.set_rule_set(number).map_err(err)?;
            Ok((
                format!(
                    "Playing {} rules ({}).",
                    farkle_text::rule_name(rules),
                    rules.number()
                ),
                None,
            ))
        }
        FarkleCommand::Roll => {
            let outcome = game.roll(&caller.id, rng).map_err(err)?;
            let conclusion = match &outcome {
                RollOutcome::Busted { next, .. } => farkle_conclusion_of(next),
                RollOutcome::Rolled { .. } => None,
            };
            Ok((farkle_text::render_roll(&caller.name, &outcome), conclusion))
        }
        FarkleCommand::Select { faces } => {
            let outcome = game.select(&caller.id, &faces).map_err(err)?;
            Ok((farkle_text::render_select(&caller.name, &outcome), None))
        }
        FarkleCommand::Bank => {
            let outcome = game.bank(&caller.id).map_err(err)?;
            let conclusion = farkle_conclusion_of(&outcome.next);
            Ok((
                farkle_text::render_bank(&caller.name, &outcome, game.target_score),
                conclusion,
            ))
        }
        FarkleCommand::End => {
            if !game.is_active() {
                return Err("There is no game to end.".to_string());
            }
            if game.initiator.as_deref() != Some(caller.id.as_str()) && !caller.privileged {
                return Err(err(parlor_core::farkle::FarkleError::NotInitiator));
            }
            let played = game.phase == Phase::InProgress;
            let conclusion = game.conclude(ConcludeReason::Forced {
                by: caller.name.clone(),
            });
            if !played {
                return Ok(("The table is closed.".to_string(), None));
            }
            Ok((
                farkle_text::render_conclusion(&conclusion, &[]),
                Some(conclusion),
            ))
        }
        FarkleCommand::Status | FarkleCommand::Stats | FarkleCommand::Board => {
            Err("Nothing to do.".to_string())
        }
    }
}

fn gems_conclusion_of(handoff: &Option<GemsHandoff>) -> Option<GemsConclusion> {
    match handoff {
        Some(GemsHandoff::GameOver(conclusion)) => Some(conclusion.clone()),
        _ => None,
    }
}

fn dispatch_gems(
    game: &mut GemsGame,
    caller: &Caller,
    command: GemsCommand,
    rng: &mut dyn RandomSource,
) -> Result<(String, Option<GemsConclusion>), String> {
    let err = |e: parlor_core::gems::GemsError| e.to_string();
    match command {
        GemsCommand::New => {
            game.open_lobby(&caller.id, &caller.name).map_err(err)?;
            Ok((
                format!(
                    "{} opens a gem table. `join` to sit down, `start` when everyone is in.",
                    caller.name
                ),
                None,
            ))
        }
        GemsCommand::Join => {
            let count = game.join(&caller.id, &caller.name).map_err(err)?;
            Ok((format!("{} sits down ({count} players).", caller.name), None))
        }
        GemsCommand::Start => {
            let first = game.start(&caller.id, rng).map_err(err)?;
            let first = first.user_name.clone();
            Ok((
                format!("The tableau is dealt. {first} goes first — `status` shows the board."),
                None,
            ))
        }
        GemsCommand::Take { colors } => {
            let take = match colors.as_slice() {
                [a, b] if a == b => TokenTake::TwoSame(*a),
                [_, _] => {
                    return Err(
                        "Two tokens must be the same color; otherwise take three distinct."
                            .to_string(),
                    )
                }
                [a, b, c] => TokenTake::ThreeDistinct([*a, *b, *c]),
                _ => return Err("Take two of one color or three distinct colors.".to_string()),
            };
            let outcome = game.take(&caller.id, take).map_err(err)?;
            let conclusion = gems_conclusion_of(&outcome.report.handoff);
            Ok((gems_text::render_take(&caller.name, &outcome), conclusion))
        }
        GemsCommand::Reserve { target } => {
            let outcome = game.reserve(&caller.id, target).map_err(err)?;
            let conclusion = gems_conclusion_of(&outcome.report.handoff);
            Ok((gems_text::render_reserve(&caller.name, &outcome), conclusion))
        }
        GemsCommand::Buy { target } => {
            let outcome = game.buy(&caller.id, target).map_err(|e| match e {
                parlor_core::gems::GemsError::CannotAfford { missing } => format!(
                    "You cannot afford that card — still missing {}.",
                    gems_text::counts_line(&missing)
                ),
                other => other.to_string(),
            })?;
            let conclusion = gems_conclusion_of(&outcome.report.handoff);
            Ok((gems_text::render_buy(&caller.name, &outcome), conclusion))
        }
        GemsCommand::Patron { id } => {
            let outcome = game.choose_patron(&caller.id, &id).map_err(err)?;
            let conclusion = gems_conclusion_of(&outcome.report.handoff);
            Ok((
                gems_text::render_patron_choice(&caller.name, &outcome),
                conclusion,
            ))
        }
        GemsCommand::End => {
            if !game.is_active() {
                return Err("There is no game to end.".to_string());
            }
            if game.initiator.as_deref() != Some(caller.id.as_str()) && !caller.privileged {
                return Err(err(parlor_core::gems::GemsError::NotInitiator));
            }
            let played = game.phase == Phase::InProgress;
            let conclusion = game.conclude(ConcludeReason::Forced {
                by: caller.name.clone(),
            });
            if !played {
                return Ok(("The table is closed.".to_string(), None));
            }
            Ok((gems_text::render_conclusion(&conclusion), Some(conclusion)))
        }
        GemsCommand::Status | GemsCommand::Mine | GemsCommand::Stats => {
            Err("Nothing to do.".to_string())
        }
    }
}
