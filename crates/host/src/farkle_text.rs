//! English transcripts for dice-game outcomes. All reply text funnels through
//! here so the dispatcher stays free of formatting.

use parlor_core::dice::RuleSet;
use parlor_core::farkle::{
    BankOutcome, FarkleConclusion, FarkleGame, RollOutcome, SelectFollowup, SelectOutcome,
    TurnHandoff,
};
use parlor_core::outcome::{ConcludeReason, Phase};
use parlor_core::stats::{FarkleStats, HonorChange, Leaderboard};
use std::fmt::Write;

pub fn faces_line(faces: &[u8]) -> String {
    faces
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn rule_name(rules: RuleSet) -> &'static str {
    match rules {
        RuleSet::Standard => "standard",
        RuleSet::Extended => "extended",
    }
}

pub fn render_roll(name: &str, outcome: &RollOutcome) -> String {
    match outcome {
        RollOutcome::Rolled { faces, .. } => {
            format!("{name} rolls: [ {} ]", faces_line(faces))
        }
        RollOutcome::Busted {
            faces,
            lost_turn_score,
            next,
        } => {
            let mut text = format!(
                "{name} rolls: [ {} ] — nothing scores! {lost} points go up in smoke.",
                faces_line(faces),
                lost = lost_turn_score
            );
            text.push('\n');
            text.push_str(&render_handoff(next));
            text
        }
    }
}

pub fn render_select(name: &str, outcome: &SelectOutcome) -> String {
    let mut text = format!(
        "{name} sets aside [ {} ] for {} points (turn total {}).",
        faces_line(&outcome.scored_faces),
        outcome.points,
        outcome.turn_score
    );
    match &outcome.followup {
        SelectFollowup::HotDice => {
            text.push_str(" Hot dice! All six come back for another roll.");
        }
        SelectFollowup::Remaining { faces } => {
            let _ = write!(text, " On the table: [ {} ].", faces_line(faces));
        }
    }
    text
}

pub fn render_bank(name: &str, outcome: &BankOutcome, target: i64) -> String {
    let mut text = format!(
        "{name} banks {} points for a total of {}.",
        outcome.banked, outcome.total
    );
    if outcome.triggered_final_round {
        let _ = write!(
            text,
            " The {target}-point target is reached — everyone else gets one last turn!"
        );
    }
    text.push('\n');
    text.push_str(&render_handoff(&outcome.next));
    text
}

pub fn render_handoff(handoff: &TurnHandoff) -> String {
    match handoff {
        TurnHandoff::NextPlayer { user_name, .. } => {
            format!("Over to {user_name}.")
        }
        TurnHandoff::NextAttempt {
            attempt,
            max_attempts,
        } => {
            format!("Attempt {attempt} of {max_attempts} begins with six fresh dice.")
        }
        TurnHandoff::GameOver(conclusion) => render_conclusion(conclusion, &[]),
    }
}

pub fn render_conclusion(conclusion: &FarkleConclusion, honor: &[HonorChange]) -> String {
    let mut text = match &conclusion.reason {
        ConcludeReason::FinalRoundComplete => "The game is over!".to_string(),
        ConcludeReason::AttemptsExhausted => "All attempts are in.".to_string(),
        ConcludeReason::Forced { by } => format!("{by} ended the game early."),
        ConcludeReason::Expired => "The game sat idle too long and was closed.".to_string(),
        ConcludeReason::Invariant => {
            "Something went wrong with the table; the game was closed.".to_string()
        }
    };

    if let Some(solo) = &conclusion.solo {
        let _ = write!(
            text,
            "\n{} scored {} (attempts: {}).",
            solo.user_name,
            solo.best_score,
            solo.attempt_scores
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        return text;
    }

    for result in &conclusion.results {
        let crown = if result.is_winner { " 👑" } else { "" };
        let delta = honor
            .iter()
            .find(|h| h.user_id == result.user_id)
            .map(|h| format!(" ({:+} honor, now {})", h.delta, h.new_honor))
            .unwrap_or_default();
        let _ = write!(
            text,
            "\n{}. {} — {} points{crown}{delta}",
            result.rank, result.user_name, result.score
        );
    }
    text
}

pub fn render_status(game: &FarkleGame) -> String {
    match game.phase {
        Phase::Idle | Phase::Concluded => {
            "No dice game here. Say `new` to open a table or `single` to practice.".to_string()
        }
        Phase::Waiting => {
            let names: Vec<_> = game.players.iter().map(|p| p.user_name.as_str()).collect();
            format!(
                "Waiting for players ({}/{}): {}. Target {} under {} rules.",
                game.players.len(),
                parlor_core::farkle::MAX_PLAYERS,
                names.join(", "),
                game.target_score,
                rule_name(game.rule_set)
            )
        }
        Phase::InProgress => {
            let mut text = format!(
                "Race to {} under {} rules.",
                game.target_score,
                rule_name(game.rule_set)
            );
            if game.final_round {
                text.push_str(" Final round!");
            }
            for id in &game.player_order {
                if let Some(p) = game.player(id) {
                    let marker = if game
                        .current_player()
                        .map(|c| c.user_id == p.user_id)
                        .unwrap_or(false)
                    {
                        " ← playing"
                    } else {
                        ""
                    };
                    let _ = write!(
                        text,
                        "\n{}: {} banked, {} this turn{marker}",
                        p.user_name, p.game_score, p.turn_score
                    );
                }
            }
            if !game.current_roll.is_empty() {
                let _ = write!(text, "\nOn the table: [ {} ]", faces_line(&game.current_roll));
            }
            text
        }
    }
}

pub fn render_stats(name: &str, stats: &FarkleStats) -> String {
    format!(
        "{name}: {} games, {} wins, {} honor. Best game {}, {} points lifetime.",
        stats.games, stats.wins, stats.honor, stats.highest_score, stats.total_score
    )
}

pub fn render_board(board: &Leaderboard) -> String {
    if board.entries.is_empty() {
        return "The single-player board is empty. Be the first!".to_string();
    }
    let mut text = "Single-player best scores:".to_string();
    for (i, entry) in board.entries.iter().enumerate() {
        let _ = write!(
            text,
            "\n{}. {} — {} ({} rules)",
            i + 1,
            entry.user_name,
            entry.score,
            rule_name(entry.rule_set)
        );
    }
    text
}
