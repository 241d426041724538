//! Lifetime statistics models and the honor-point settlement applied when a
//! multiplayer dice game concludes. Pure data plus arithmetic; storage is the
//! host's concern.

use crate::dice::RuleSet;
use crate::farkle::FarkleResult;
use crate::outcome::PlayerId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HONOR: i64 = 1000;
pub const LEADERBOARD_CAP: usize = 10;

const WIN_HONOR_BASE: i64 = 15;
const LOSS_HONOR_BASE: i64 = 20;
const HONOR_POINT_STEP: i64 = 250;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FarkleStats {
    pub games: u32,
    pub wins: u32,
    pub total_score: i64,
    pub highest_score: i64,
    pub honor: i64,
}

impl Default for FarkleStats {
    fn default() -> Self {
        Self {
            games: 0,
            wins: 0,
            total_score: 0,
            highest_score: 0,
            honor: DEFAULT_HONOR,
        }
    }
}

impl FarkleStats {
    pub fn record_game(&mut self, score: i64, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
        self.total_score += score;
        self.highest_score = self.highest_score.max(score);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GemsStats {
    pub games: u32,
    pub wins: u32,
    pub total_points: i64,
    /// Finishes at ranks 1 through 4.
    pub rank_counts: [u32; 4],
}

impl GemsStats {
    pub fn record_game(&mut self, points: i64, rank: usize, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
        self.total_points += points;
        if (1..=4).contains(&rank) {
            self.rank_counts[rank - 1] += 1;
        }
    }

    pub fn average_rank(&self) -> Option<f64> {
        let finishes: u32 = self.rank_counts.iter().sum();
        if finishes == 0 {
            return None;
        }
        let weighted: u32 = self
            .rank_counts
            .iter()
            .enumerate()
            .map(|(i, &n)| (i as u32 + 1) * n)
            .sum();
        Some(f64::from(weighted) / f64::from(finishes))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: PlayerId,
    pub user_name: String,
    pub score: i64,
    pub rule_set: RuleSet,
    pub recorded_at: u64,
}

/// Top single-player attempt scores, best first, capped at ten.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Insert an entry at its rank. Returns the 1-based position when the
    /// score made the board.
    pub fn submit(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        if pos >= LEADERBOARD_CAP {
            return None;
        }
        self.entries.insert(pos, entry);
        self.entries.truncate(LEADERBOARD_CAP);
        Some(pos + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HonorChange {
    pub user_id: PlayerId,
    pub delta: i64,
    pub new_honor: i64,
}

/// Honor settlement for a concluded multiplayer dice game. Losers pay a flat
/// base plus one point per 250 short of the target, clamped so honor never
/// drops below zero. Winners gain a flat base, one point per 250 above the
/// target, and an even split of a fifth of the forfeited pot.
pub fn settle_honor(
    results: &[FarkleResult],
    target: i64,
    current_honor: &dyn Fn(&str) -> i64,
) -> Vec<HonorChange> {
    let winners = results.iter().filter(|r| r.is_winner).count() as i64;
    let mut changes = Vec::with_capacity(results.len());
    let mut pot = 0i64;

    for result in results.iter().filter(|r| !r.is_winner) {
        let shortfall = (target - result.score).max(0);
        let base = LOSS_HONOR_BASE + div_ceil(shortfall, HONOR_POINT_STEP);
        let honor = current_honor(&result.user_id).max(0);
        let paid = base.min(honor);
        pot += paid;
        changes.push(HonorChange {
            user_id: result.user_id.clone(),
            delta: -paid,
            new_honor: honor - paid,
        });
    }

    let cut = if winners > 0 { pot / 5 / winners } else { 0 };
    for result in results.iter().filter(|r| r.is_winner) {
        let overflow = (result.score - target).max(0) / HONOR_POINT_STEP;
        let delta = WIN_HONOR_BASE + overflow + cut;
        let honor = current_honor(&result.user_id).max(0);
        changes.push(HonorChange {
            user_id: result.user_id.clone(),
            delta,
            new_honor: honor + delta,
        });
    }
    changes
}

fn div_ceil(n: i64, step: i64) -> i64 {
    (n + step - 1) / step
}
