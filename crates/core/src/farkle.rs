//! Farkle: a press-your-luck dice game. Multi-actor rotation with a final
//! round after the target score is reached, or single-actor attempt mode
//! scored by the best attempt.

use crate::dice::{FaceCounts, RuleSet};
use crate::outcome::{ConcludeReason, Phase, PlayerId};
use crate::rng::{roll_face, shuffle, RandomSource};
use crate::scoring;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TARGET_SCORE: i64 = 5000;
pub const DEFAULT_ATTEMPTS: u32 = 1;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub const DICE_PER_TURN: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FarkleError {
    #[error("a game is already running in this room")]
    GameAlreadyRunning,
    #[error("no game is waiting for players")]
    NotWaiting,
    #[error("the game has not started")]
    NotInProgress,
    #[error("the table is full ({MAX_PLAYERS} players max)")]
    TableFull,
    #[error("you already joined this game")]
    AlreadyJoined,
    #[error("at least {MIN_PLAYERS} players are needed to start")]
    NotEnoughPlayers,
    #[error("only the game initiator can do that")]
    NotInitiator,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("a single-player game cannot be joined")]
    SoloGame,
    #[error("rules can only be changed before the game starts")]
    RuleLockedIn,
    #[error("unknown rule set; choose 1 (standard) or 2 (extended)")]
    InvalidRuleSet,
    #[error("you have dice on the table; select scoring dice before rolling again")]
    MustSelectFirst,
    #[error("nothing has been rolled; roll first")]
    NothingRolled,
    #[error("no dice were selected")]
    EmptySelection,
    #[error("die face {0} is not a valid face (1-6)")]
    InvalidFace(u8),
    #[error("the selected dice are not all present in the current roll")]
    SelectionNotInRoll,
    #[error("that selection does not decompose into scoring combinations")]
    SelectionNotScoring,
    #[error("no points accumulated this turn; roll or select first")]
    NothingToBank,
    #[error("no current player; the game state is corrupt")]
    NoCurrentPlayer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarklePlayer {
    pub user_id: PlayerId,
    pub user_name: String,
    pub game_score: i64,
    pub turn_score: i64,
    /// Faces already allocated to scoring combinations this turn.
    pub kept_this_turn: Vec<u8>,
}

impl FarklePlayer {
    fn new(user_id: PlayerId, user_name: String) -> Self {
        Self {
            user_id,
            user_name,
            game_score: 0,
            turn_score: 0,
            kept_this_turn: Vec::new(),
        }
    }

    fn start_turn(&mut self) {
        self.turn_score = 0;
        self.kept_this_turn.clear();
    }

    fn reset_for_attempt(&mut self) {
        self.game_score = 0;
        self.start_turn();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoloState {
    pub max_attempts: u32,
    pub attempt: u32,
    pub attempt_scores: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarkleGame {
    pub phase: Phase,
    pub rule_set: RuleSet,
    pub target_score: i64,
    pub players: Vec<FarklePlayer>,
    /// Fixed seating established by one shuffle at game start.
    pub player_order: Vec<PlayerId>,
    pub current_index: usize,
    pub initiator: Option<PlayerId>,
    /// Faces rolled but not yet allocated to combinations.
    pub current_roll: Vec<u8>,
    /// At least one valid selection has been made since the last roll;
    /// rolling the remaining dice is gated on this.
    pub selected_since_roll: bool,
    pub final_round: bool,
    pub final_round_trigger: Option<PlayerId>,
    /// Turns completed since the trigger, counting the triggering turn.
    pub final_turns_taken: usize,
    pub solo: Option<SoloState>,
}

impl Default for FarkleGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Who acts next after a turn or attempt ends.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnHandoff {
    NextPlayer { user_id: PlayerId, user_name: String },
    NextAttempt { attempt: u32, max_attempts: u32 },
    GameOver(FarkleConclusion),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RollOutcome {
    Rolled {
        faces: Vec<u8>,
        /// The roll reused the dice left on the table rather than a fresh set.
        rerolled_remaining: bool,
    },
    Busted {
        faces: Vec<u8>,
        lost_turn_score: i64,
        next: TurnHandoff,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectFollowup {
    /// All six dice scored; a fresh full roll is available.
    HotDice,
    /// Unscored dice remain on the table.
    Remaining { faces: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOutcome {
    pub scored_faces: Vec<u8>,
    pub points: i64,
    pub turn_score: i64,
    pub followup: SelectFollowup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankOutcome {
    pub banked: i64,
    pub total: i64,
    /// This bank pushed the actor across the target for the first time.
    pub triggered_final_round: bool,
    pub next: TurnHandoff,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarkleResult {
    pub user_id: PlayerId,
    pub user_name: String,
    pub score: i64,
    pub rank: usize,
    pub is_winner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoloConclusion {
    pub user_id: PlayerId,
    pub user_name: String,
    pub attempt_scores: Vec<i64>,
    /// Best attempt, never the sum.
    pub best_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarkleConclusion {
    pub reason: ConcludeReason,
    pub rule_set: RuleSet,
    pub target_score: i64,
    pub results: Vec<FarkleResult>,
    pub solo: Option<SoloConclusion>,
}

impl FarkleGame {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            rule_set: RuleSet::default(),
            target_score: DEFAULT_TARGET_SCORE,
            players: Vec::new(),
            player_order: Vec::new(),
            current_index: 0,
            initiator: None,
            current_roll: Vec::new(),
            selected_since_roll: false,
            final_round: false,
            final_round_trigger: None,
            final_turns_taken: 0,
            solo: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Waiting | Phase::InProgress)
    }

    pub fn player(&self, user_id: &str) -> Option<&FarklePlayer> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn current_player(&self) -> Result<&FarklePlayer, FarkleError> {
        let id = self
            .player_order
            .get(self.current_index)
            .ok_or(FarkleError::NoCurrentPlayer)?;
        self.players
            .iter()
            .find(|p| &p.user_id == id)
            .ok_or(FarkleError::NoCurrentPlayer)
    }

    fn current_player_mut(&mut self) -> Result<&mut FarklePlayer, FarkleError> {
        let id = self
            .player_order
            .get(self.current_index)
            .cloned()
            .ok_or(FarkleError::NoCurrentPlayer)?;
        self.players
            .iter_mut()
            .find(|p| p.user_id == id)
            .ok_or(FarkleError::NoCurrentPlayer)
    }

    fn ensure_turn(&self, user_id: &str) -> Result<(), FarkleError> {
        if self.phase != Phase::InProgress {
            return Err(FarkleError::NotInProgress);
        }
        if self.current_player()?.user_id != user_id {
            return Err(FarkleError::NotYourTurn);
        }
        Ok(())
    }

    /// Open a multiplayer lobby with the caller as initiator.
    pub fn open_lobby(
        &mut self,
        user_id: &str,
        user_name: &str,
        target: Option<i64>,
    ) -> Result<(), FarkleError> {
        if self.is_active() {
            return Err(FarkleError::GameAlreadyRunning);
        }
        let rule_set = self.rule_set;
        *self = Self::new();
        self.rule_set = rule_set;
        self.phase = Phase::Waiting;
        if let Some(target) = target.filter(|&t| t > 0) {
            self.target_score = target;
        }
        self.players
            .push(FarklePlayer::new(user_id.to_string(), user_name.to_string()));
        self.initiator = Some(user_id.to_string());
        Ok(())
    }

    /// Join the waiting lobby. Returns the new player count.
    pub fn join(&mut self, user_id: &str, user_name: &str) -> Result<usize, FarkleError> {
        if self.solo.is_some() {
            return Err(FarkleError::SoloGame);
        }
        if self.phase != Phase::Waiting {
            return Err(FarkleError::NotWaiting);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(FarkleError::TableFull);
        }
        if self.player(user_id).is_some() {
            return Err(FarkleError::AlreadyJoined);
        }
        self.players
            .push(FarklePlayer::new(user_id.to_string(), user_name.to_string()));
        if self.initiator.is_none() {
            self.initiator = Some(user_id.to_string());
        }
        Ok(self.players.len())
    }

    pub fn set_rule_set(&mut self, number: u8) -> Result<RuleSet, FarkleError> {
        if !matches!(self.phase, Phase::Idle | Phase::Waiting | Phase::Concluded) {
            return Err(FarkleError::RuleLockedIn);
        }
        let rules = RuleSet::from_number(number).ok_or(FarkleError::InvalidRuleSet)?;
        self.rule_set = rules;
        Ok(rules)
    }

    /// Start the multiplayer game; seating is shuffled once and never changes.
    pub fn start(
        &mut self,
        user_id: &str,
        target: Option<i64>,
        rng: &mut dyn RandomSource,
    ) -> Result<&FarklePlayer, FarkleError> {
        if self.phase != Phase::Waiting {
            return Err(FarkleError::NotWaiting);
        }
        if self.initiator.as_deref() != Some(user_id) {
            return Err(FarkleError::NotInitiator);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(FarkleError::NotEnoughPlayers);
        }
        if let Some(target) = target.filter(|&t| t > 0) {
            self.target_score = target;
        }
        let mut order: Vec<PlayerId> = self.players.iter().map(|p| p.user_id.clone()).collect();
        shuffle(rng, &mut order);
        self.player_order = order;
        self.current_index = 0;
        self.phase = Phase::InProgress;
        self.current_roll.clear();
        self.selected_since_roll = false;
        self.current_player_mut()?.start_turn();
        self.current_player()
    }

    /// Start a single-actor attempt-mode game.
    pub fn start_solo(
        &mut self,
        user_id: &str,
        user_name: &str,
        attempts: Option<u32>,
    ) -> Result<(), FarkleError> {
        if self.is_active() {
            return Err(FarkleError::GameAlreadyRunning);
        }
        let rule_set = self.rule_set;
        *self = Self::new();
        self.rule_set = rule_set;
        self.solo = Some(SoloState {
            max_attempts: attempts.filter(|&a| a > 0).unwrap_or(DEFAULT_ATTEMPTS),
            attempt: 1,
            attempt_scores: Vec::new(),
        });
        self.players
            .push(FarklePlayer::new(user_id.to_string(), user_name.to_string()));
        self.player_order = vec![user_id.to_string()];
        self.initiator = Some(user_id.to_string());
        self.phase = Phase::InProgress;
        Ok(())
    }

    pub fn roll(
        &mut self,
        user_id: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<RollOutcome, FarkleError> {
        self.ensure_turn(user_id)?;
        if !self.current_roll.is_empty() && !self.selected_since_roll {
            return Err(FarkleError::MustSelectFirst);
        }

        let rerolled_remaining = !self.current_roll.is_empty();
        let dice = if rerolled_remaining {
            self.current_roll.len()
        } else {
            let player = self.current_player_mut()?;
            if player.kept_this_turn.len() >= DICE_PER_TURN {
                // Hot dice: the full set scored, roll all six again.
                player.kept_this_turn.clear();
                DICE_PER_TURN
            } else {
                DICE_PER_TURN - player.kept_this_turn.len()
            }
        };

        let faces: Vec<u8> = (0..dice).map(|_| roll_face(rng)).collect();
        self.current_roll = faces.clone();
        self.selected_since_roll = false;

        if scoring::roll_has_score(&faces, self.rule_set) {
            return Ok(RollOutcome::Rolled {
                faces,
                rerolled_remaining,
            });
        }

        // Bust: the turn's unbanked score is forfeited.
        let player = self.current_player_mut()?;
        let lost = player.turn_score;
        player.turn_score = 0;
        let next = self.pass_on()?;
        Ok(RollOutcome::Busted {
            faces,
            lost_turn_score: lost,
            next,
        })
    }

    pub fn select(&mut self, user_id: &str, faces: &[u8]) -> Result<SelectOutcome, FarkleError> {
        self.ensure_turn(user_id)?;
        if self.current_roll.is_empty() {
            return Err(FarkleError::NothingRolled);
        }
        if faces.is_empty() {
            return Err(FarkleError::EmptySelection);
        }
        if let Some(&bad) = faces.iter().find(|&&f| !(1..=6).contains(&f)) {
            return Err(FarkleError::InvalidFace(bad));
        }
        let roll_counts = FaceCounts::from_faces(&self.current_roll);
        let selection_counts = FaceCounts::from_faces(faces);
        if !roll_counts.contains(&selection_counts) {
            return Err(FarkleError::SelectionNotInRoll);
        }
        let scored = scoring::score_selection(faces, self.rule_set)
            .ok_or(FarkleError::SelectionNotScoring)?;

        let player = self.current_player_mut()?;
        player.turn_score += scored.points;
        player.kept_this_turn.extend(&scored.faces);
        player.kept_this_turn.sort_unstable();
        let turn_score = player.turn_score;

        for &face in &scored.faces {
            if let Some(pos) = self.current_roll.iter().position(|&f| f == face) {
                self.current_roll.remove(pos);
            }
        }
        self.selected_since_roll = true;

        // Kept faces and the table always total six, so an empty table means
        // the whole set scored.
        let followup = if self.current_roll.is_empty() {
            SelectFollowup::HotDice
        } else {
            SelectFollowup::Remaining {
                faces: self.current_roll.clone(),
            }
        };
        Ok(SelectOutcome {
            scored_faces: scored.faces,
            points: scored.points,
            turn_score,
            followup,
        })
    }

    pub fn bank(&mut self, user_id: &str) -> Result<BankOutcome, FarkleError> {
        self.ensure_turn(user_id)?;
        let target = self.target_score;
        let already_final = self.final_round;
        let player = self.current_player_mut()?;
        if player.turn_score == 0 {
            return Err(FarkleError::NothingToBank);
        }
        let banked = player.turn_score;
        player.game_score += banked;
        player.turn_score = 0;
        let total = player.game_score;

        let mut triggered = false;
        if self.solo.is_none() && !already_final && total >= target {
            triggered = true;
            self.final_round = true;
            self.final_round_trigger = Some(user_id.to_string());
        }

        let next = self.pass_on()?;
        Ok(BankOutcome {
            banked,
            total,
            triggered_final_round: triggered,
            next,
        })
    }

    /// Force the game to a conclusion (abort, expiry, or invariant failure).
    pub fn conclude(&mut self, reason: ConcludeReason) -> FarkleConclusion {
        self.phase = Phase::Concluded;
        if self.solo.is_some() {
            self.record_attempt_score();
        }
        self.build_conclusion(reason)
    }

    /// End of a turn, whether banked or busted.
    fn pass_on(&mut self) -> Result<TurnHandoff, FarkleError> {
        self.current_roll.clear();
        self.selected_since_roll = false;

        if self.solo.is_some() {
            self.record_attempt_score();
            if let Some(solo) = self.solo.as_mut() {
                if solo.attempt < solo.max_attempts {
                    solo.attempt += 1;
                    let attempt = solo.attempt;
                    let max_attempts = solo.max_attempts;
                    self.current_player_mut()?.reset_for_attempt();
                    return Ok(TurnHandoff::NextAttempt {
                        attempt,
                        max_attempts,
                    });
                }
            }
            self.phase = Phase::Concluded;
            return Ok(TurnHandoff::GameOver(
                self.build_conclusion(ConcludeReason::AttemptsExhausted),
            ));
        }

        if self.final_round {
            self.final_turns_taken += 1;
            if self.final_turns_taken >= self.players.len() {
                self.phase = Phase::Concluded;
                return Ok(TurnHandoff::GameOver(
                    self.build_conclusion(ConcludeReason::FinalRoundComplete),
                ));
            }
        }
        self.current_index = (self.current_index + 1) % self.player_order.len();
        let next = self.current_player_mut()?;
        next.start_turn();
        Ok(TurnHandoff::NextPlayer {
            user_id: next.user_id.clone(),
            user_name: next.user_name.clone(),
        })
    }

    fn record_attempt_score(&mut self) {
        let score = self
            .players
            .first()
            .map(|p| p.game_score)
            .unwrap_or_default();
        if let Some(solo) = self.solo.as_mut() {
            if (solo.attempt_scores.len() as u32) < solo.attempt {
                solo.attempt_scores.push(score);
            }
        }
    }

    fn build_conclusion(&self, reason: ConcludeReason) -> FarkleConclusion {
        let solo = self.solo.as_ref().map(|solo| {
            let player = self.players.first();
            SoloConclusion {
                user_id: player.map(|p| p.user_id.clone()).unwrap_or_default(),
                user_name: player.map(|p| p.user_name.clone()).unwrap_or_default(),
                attempt_scores: solo.attempt_scores.clone(),
                best_score: solo.attempt_scores.iter().copied().max().unwrap_or(0).max(0),
            }
        });

        let mut ranked: Vec<&FarklePlayer> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.game_score.cmp(&a.game_score));
        let top = ranked.first().map(|p| p.game_score).unwrap_or(0);
        let mut results = Vec::with_capacity(ranked.len());
        let mut rank = 0;
        let mut last_score = i64::MIN;
        for (i, player) in ranked.iter().enumerate() {
            if player.game_score != last_score {
                rank = i + 1;
                last_score = player.game_score;
            }
            results.push(FarkleResult {
                user_id: player.user_id.clone(),
                user_name: player.user_name.clone(),
                score: player.game_score,
                rank,
                is_winner: self.solo.is_none() && player.game_score == top && top > 0,
            });
        }

        FarkleConclusion {
            reason,
            rule_set: self.rule_set,
            target_score: self.target_score,
            results,
            solo,
        }
    }
}
