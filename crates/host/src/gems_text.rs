//! English transcripts for the gem game.

use parlor_core::catalog::{self, CardDef};
use parlor_core::economy::{ColorCounts, GemColor, TokenPool, TokenTake};
use parlor_core::gems::{
    BuyOutcome, GemsConclusion, GemsGame, GemsHandoff, GemsPlayer, PatronEvent, PatronOutcome,
    ReserveOutcome, TakeOutcome, TurnReport,
};
use parlor_core::outcome::{ConcludeReason, Phase};
use parlor_core::stats::GemsStats;
use std::fmt::Write;

pub fn counts_line(counts: &ColorCounts) -> String {
    let parts: Vec<String> = GemColor::ALL
        .iter()
        .filter(|&&c| counts.get(c) > 0)
        .map(|&c| format!("{} {}", counts.get(c), c.name()))
        .collect();
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(", ")
    }
}

pub fn tokens_line(pool: &TokenPool) -> String {
    let mut text = counts_line(&pool.gems);
    if pool.gold > 0 {
        if text == "nothing" {
            text = format!("{} gold", pool.gold);
        } else {
            let _ = write!(text, ", {} gold", pool.gold);
        }
    }
    text
}

fn card_label(card: &CardDef) -> String {
    format!(
        "{} ({} pt, +1 {}, costs {})",
        card.id,
        card.points,
        card.bonus.name(),
        counts_line(&card.cost)
    )
}

fn cap_note(over_cap: Option<u32>) -> String {
    match over_cap {
        Some(total) => {
            format!(" (Careful — {total} tokens in hand; give some back before long.)")
        }
        None => String::new(),
    }
}

fn report_tail(report: &TurnReport) -> String {
    let mut text = String::new();
    match &report.patron {
        PatronEvent::None => {}
        PatronEvent::Awarded { id, points } => {
            let _ = write!(text, "\nA patron arrives! {id} grants {points} prestige.");
        }
        PatronEvent::Pending { choices } => {
            let _ = write!(
                text,
                "\nSeveral patrons are waiting: {}. Choose one with `patron <id>`.",
                choices.join(", ")
            );
            return text;
        }
    }
    if report.triggered_final_round {
        text.push_str("\n15 prestige reached — everyone else gets one last turn!");
    }
    match &report.handoff {
        Some(GemsHandoff::NextPlayer { user_name, .. }) => {
            let _ = write!(text, "\nOver to {user_name}.");
        }
        Some(GemsHandoff::GameOver(conclusion)) => {
            text.push('\n');
            text.push_str(&render_conclusion(conclusion));
        }
        None => {}
    }
    text
}

pub fn render_take(name: &str, outcome: &TakeOutcome) -> String {
    let what = match &outcome.taken {
        TokenTake::ThreeDistinct(colors) => colors
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", "),
        TokenTake::TwoSame(color) => format!("two {}", color.name()),
    };
    format!(
        "{name} takes {what}.{}{}",
        cap_note(outcome.over_cap),
        report_tail(&outcome.report)
    )
}

pub fn render_reserve(name: &str, outcome: &ReserveOutcome) -> String {
    let card = match catalog::card_def(&outcome.card_id) {
        Some(def) if !outcome.from_deck => card_label(def),
        Some(def) => format!("a face-down tier {} card", def.tier),
        None => outcome.card_id.clone(),
    };
    let gold = if outcome.gold_granted {
        " and a gold token"
    } else {
        ""
    };
    format!(
        "{name} reserves {card}{gold}.{}{}",
        cap_note(outcome.over_cap),
        report_tail(&outcome.report)
    )
}

pub fn render_buy(name: &str, outcome: &BuyOutcome) -> String {
    let source = if outcome.from_reserve {
        "from their reserve "
    } else {
        ""
    };
    format!(
        "{name} buys {} {source}paying {} — {} prestige total.{}",
        card_label(outcome.card),
        tokens_line(&TokenPool {
            gems: outcome.payment.gems,
            gold: outcome.payment.gold
        }),
        outcome.total_points,
        report_tail(&outcome.report)
    )
}

pub fn render_patron_choice(name: &str, outcome: &PatronOutcome) -> String {
    format!(
        "{name} welcomes patron {} for {} prestige ({} total).{}",
        outcome.patron.id,
        outcome.patron.points,
        outcome.total_points,
        report_tail(&outcome.report)
    )
}

pub fn render_conclusion(conclusion: &GemsConclusion) -> String {
    let mut text = match &conclusion.reason {
        ConcludeReason::FinalRoundComplete => "The game is over!".to_string(),
        ConcludeReason::Forced { by } => format!("{by} ended the game early."),
        ConcludeReason::Expired => "The game sat idle too long and was closed.".to_string(),
        _ => "The game is over.".to_string(),
    };
    for result in &conclusion.results {
        let crown = if result.is_winner { " 👑" } else { "" };
        let _ = write!(
            text,
            "\n{}. {} — {} prestige, {} cards, {} patrons{crown}",
            result.rank, result.user_name, result.points, result.cards, result.patrons
        );
    }
    text
}

pub fn render_status(game: &GemsGame) -> String {
    match game.phase {
        Phase::Idle | Phase::Concluded => {
            "No gem game here. Say `new` to open a table.".to_string()
        }
        Phase::Waiting => {
            let names: Vec<_> = game.players.iter().map(|p| p.user_name.as_str()).collect();
            format!(
                "Waiting for players ({}/{}): {}.",
                game.players.len(),
                parlor_core::gems::MAX_PLAYERS,
                names.join(", ")
            )
        }
        Phase::InProgress => {
            let mut text = format!("Bank: {}.", tokens_line(&game.bank));
            let _ = write!(text, "\nPatrons on display: {}.", game.patrons.join(", "));
            for tier in (1..=3u8).rev() {
                if let Some(row) = game.tableau.row(tier) {
                    let slots: Vec<String> = row
                        .face_up
                        .iter()
                        .map(|id| match catalog::card_def(id) {
                            Some(def) => card_label(def),
                            None => id.clone(),
                        })
                        .collect();
                    let _ = write!(
                        text,
                        "\nTier {tier} ({} left in the pile): {}",
                        row.pile.len(),
                        slots.join(" | ")
                    );
                }
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
                        "\n{}: {} prestige, {} cards, {} reserved, holding {}{marker}",
                        p.user_name,
                        p.points,
                        p.purchased.len(),
                        p.reserved.len(),
                        tokens_line(&p.tokens)
                    );
                }
            }
            if game.final_round {
                text.push_str("\nFinal round!");
            }
            text
        }
    }
}

pub fn render_mine(player: &GemsPlayer) -> String {
    let mut text = format!(
        "{}: {} prestige. Tokens: {}. Bonuses: {}.",
        player.user_name,
        player.points,
        tokens_line(&player.tokens),
        counts_line(&player.bonuses)
    );
    if player.reserved.is_empty() {
        text.push_str(" Nothing reserved.");
    } else {
        let cards: Vec<String> = player
            .reserved
            .iter()
            .enumerate()
            .map(|(i, id)| match catalog::card_def(id) {
                Some(def) => format!("R{}: {}", i + 1, card_label(def)),
                None => format!("R{}: {id}", i + 1),
            })
            .collect();
        let _ = write!(text, " Reserved — {}.", cards.join(" | "));
    }
    text
}

pub fn render_stats(name: &str, stats: &GemsStats) -> String {
    let avg = stats
        .average_rank()
        .map(|r| format!("{r:.2}"))
        .unwrap_or_else(|| "—".to_string());
    format!(
        "{name}: {} games, {} wins, {} prestige lifetime, average finish {avg}.",
        stats.games, stats.wins, stats.total_points
    )
}
