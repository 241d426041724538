use parlor_core::catalog;
use parlor_core::economy::{ColorCounts, EconomyError, GemColor, TokenPool, TokenTake};
use parlor_core::gems::{
    BuyTarget, GemsError, GemsGame, GemsHandoff, PatronEvent, ReserveTarget, GOLD_SUPPLY,
    RESERVE_CAP, WIN_POINTS,
};
use parlor_core::outcome::{ConcludeReason, Phase};
use parlor_core::rng::ScriptedSource;

fn started_game() -> GemsGame {
    let mut game = GemsGame::new();
    game.open_lobby("alice", "Alice").unwrap();
    game.join("bob", "Bob").unwrap();
    let mut rng = ScriptedSource::default();
    game.start("alice", &mut rng).unwrap();
    game
}

fn current_id(game: &GemsGame) -> String {
    game.current_player().unwrap().user_id.clone()
}

/// Per-color token count across the bank and every player.
fn circulating(game: &GemsGame, color: GemColor) -> u32 {
    let held: u32 = game
        .players
        .iter()
        .map(|p| u32::from(p.tokens.gems.get(color)))
        .sum();
    held + u32::from(game.bank.gems.get(color))
}

#[test]
fn setup_scales_with_the_table() {
    let game = started_game();
    assert_eq!(game.phase, Phase::InProgress);
    assert_eq!(game.bank.gems.white, 4);
    assert_eq!(game.bank.gold, GOLD_SUPPLY);
    assert_eq!(game.patrons.len(), 3);
    for tier in 1..=3 {
        assert_eq!(game.tableau.row(tier).unwrap().face_up.len(), 4);
    }

    let mut bigger = GemsGame::new();
    bigger.open_lobby("a", "A").unwrap();
    bigger.join("b", "B").unwrap();
    bigger.join("c", "C").unwrap();
    bigger.join("d", "D").unwrap();
    assert_eq!(bigger.join("e", "E").unwrap_err(), GemsError::TableFull);
    let mut rng = ScriptedSource::default();
    bigger.start("a", &mut rng).unwrap();
    assert_eq!(bigger.bank.gems.red, 7);
    assert_eq!(bigger.patrons.len(), 5);
}

#[test]
fn take_three_distinct_moves_tokens_and_the_turn() {
    let mut game = started_game();
    let first = current_id(&game);
    let take = TokenTake::ThreeDistinct([GemColor::White, GemColor::Blue, GemColor::Red]);
    let outcome = game.take(&first, take).unwrap();
    assert_eq!(outcome.over_cap, None);
    assert_eq!(outcome.report.patron, PatronEvent::None);
    assert!(matches!(
        outcome.report.handoff,
        Some(GemsHandoff::NextPlayer { .. })
    ));

    let player = game.player(&first).unwrap();
    assert_eq!(player.tokens.gems.white, 1);
    assert_eq!(player.tokens.gems.blue, 1);
    assert_eq!(player.tokens.gems.red, 1);
    assert_eq!(game.bank.gems.white, 3);
    assert_ne!(current_id(&game), first);
}

#[test]
fn take_two_same_needs_a_full_stack() {
    let mut game = started_game();
    let first = current_id(&game);
    game.bank.gems.green = 3;
    let err = game.take(&first, TokenTake::TwoSame(GemColor::Green)).unwrap_err();
    assert_eq!(
        err,
        GemsError::Economy(EconomyError::NeedsFourInBank {
            color: GemColor::Green,
            available: 3
        })
    );
    // Nothing moved and the turn did not pass.
    assert_eq!(game.player(&first).unwrap().tokens.total(), 0);
    assert_eq!(current_id(&game), first);

    game.bank.gems.green = 4;
    game.take(&first, TokenTake::TwoSame(GemColor::Green)).unwrap();
    assert_eq!(game.player(&first).unwrap().tokens.gems.green, 2);
    assert_eq!(game.bank.gems.green, 2);
}

#[test]
fn reserve_grants_gold_until_the_cap() {
    let mut game = started_game();
    let first = current_id(&game);
    let outcome = game
        .reserve(&first, ReserveTarget::FaceUp { tier: 1, slot: 0 })
        .unwrap();
    assert!(outcome.gold_granted);
    assert!(!outcome.from_deck);
    let player = game.player(&first).unwrap();
    assert_eq!(player.reserved, vec![outcome.card_id.clone()]);
    assert_eq!(player.tokens.gold, 1);
    assert_eq!(game.bank.gold, GOLD_SUPPLY - 1);
    // The vacated slot was backfilled.
    assert_eq!(game.tableau.row(1).unwrap().face_up.len(), 4);

    let second = current_id(&game);
    let blind = game
        .reserve(&second, ReserveTarget::Deck { tier: 2 })
        .unwrap();
    assert!(blind.from_deck);
    assert_eq!(catalog::card_def(&blind.card_id).unwrap().tier, 2);

    // A third reservation on top of a full rack is refused.
    let third = current_id(&game);
    let full = vec!["L1_06".to_string(), "L1_07".to_string(), "L1_08".to_string()];
    game.players
        .iter_mut()
        .find(|p| p.user_id == third)
        .unwrap()
        .reserved = full;
    assert_eq!(
        game.reserve(&third, ReserveTarget::Deck { tier: 1 })
            .unwrap_err(),
        GemsError::ReserveLimitReached
    );
    assert_eq!(game.player(&third).unwrap().reserved.len(), RESERVE_CAP);
}

#[test]
fn buy_pays_the_bank_and_grants_the_bonus() {
    let mut game = started_game();
    let first = current_id(&game);
    let card_id = game.tableau.row(1).unwrap().face_up[0].clone();
    let card = catalog::card_def(&card_id).unwrap();

    // Fund the buyer exactly.
    game.players
        .iter_mut()
        .find(|p| p.user_id == first)
        .unwrap()
        .tokens = TokenPool {
        gems: card.cost,
        gold: 0,
    };

    let before_white = circulating(&game, GemColor::White);
    let outcome = game
        .buy(&first, BuyTarget::FaceUp { tier: 1, slot: 0 })
        .unwrap();
    assert_eq!(outcome.card.id, card.id);
    assert_eq!(outcome.payment.gems, card.cost);
    assert_eq!(outcome.total_points, card.points);

    let player = game.player(&first).unwrap();
    assert_eq!(player.tokens.total(), 0);
    assert_eq!(player.bonuses.get(card.bonus), 1);
    assert_eq!(player.purchased, vec![card_id.clone()]);
    assert!(!game.tableau.row(1).unwrap().face_up.contains(&card_id));
    // Token conservation: what the buyer paid is back in the bank.
    assert_eq!(circulating(&game, GemColor::White), before_white);
}

#[test]
fn unaffordable_buy_reports_the_shortfall_and_mutates_nothing() {
    let mut game = started_game();
    let first = current_id(&game);
    let card_id = game.tableau.row(3).unwrap().face_up[0].clone();
    let card = catalog::card_def(&card_id).unwrap();

    let snapshot = game.clone();
    let err = game
        .buy(&first, BuyTarget::FaceUp { tier: 3, slot: 0 })
        .unwrap_err();
    match err {
        GemsError::CannotAfford { missing } => assert_eq!(missing, card.cost),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(game, snapshot);
}

#[test]
fn buying_a_reserved_card_with_gold() {
    let mut game = started_game();
    let first = current_id(&game);
    // L1_06 costs three blue; pay one blue plus two gold.
    let player = game.players.iter_mut().find(|p| p.user_id == first).unwrap();
    player.reserved = vec!["L1_06".to_string()];
    player.tokens = TokenPool {
        gems: ColorCounts::new(0, 1, 0, 0, 0),
        gold: 2,
    };
    let bank_gold = game.bank.gold;

    let outcome = game.buy(&first, BuyTarget::Reserved { index: 0 }).unwrap();
    assert!(outcome.from_reserve);
    assert_eq!(outcome.payment.gems.blue, 1);
    assert_eq!(outcome.payment.gold, 2);
    let player = game.player(&first).unwrap();
    assert!(player.reserved.is_empty());
    assert_eq!(player.tokens.total(), 0);
    assert_eq!(game.bank.gold, bank_gold + 2);

    assert_eq!(
        game.buy(&current_id(&game), BuyTarget::Reserved { index: 0 })
            .unwrap_err(),
        GemsError::NoSuchReservation
    );
}

#[test]
fn single_eligible_patron_awards_automatically() {
    let mut game = started_game();
    let first = current_id(&game);
    game.patrons = vec!["N01".to_string()];
    // N01 wants four white and four blue bonuses.
    game.players
        .iter_mut()
        .find(|p| p.user_id == first)
        .unwrap()
        .bonuses = ColorCounts::new(4, 4, 0, 0, 0);

    let outcome = game
        .take(
            &first,
            TokenTake::ThreeDistinct([GemColor::White, GemColor::Blue, GemColor::Green]),
        )
        .unwrap();
    assert_eq!(
        outcome.report.patron,
        PatronEvent::Awarded {
            id: "N01".to_string(),
            points: 3
        }
    );
    assert!(outcome.report.handoff.is_some());
    let player = game.player(&first).unwrap();
    assert_eq!(player.points, 3);
    assert_eq!(player.patrons, vec!["N01".to_string()]);
    assert!(game.patrons.is_empty());
}

#[test]
fn patron_tie_blocks_the_turn_until_chosen() {
    let mut game = started_game();
    let first = current_id(&game);
    game.patrons = vec!["N01".to_string(), "N06".to_string()];
    game.players
        .iter_mut()
        .find(|p| p.user_id == first)
        .unwrap()
        .bonuses = ColorCounts::new(4, 4, 3, 0, 0);

    let outcome = game
        .take(
            &first,
            TokenTake::ThreeDistinct([GemColor::White, GemColor::Blue, GemColor::Green]),
        )
        .unwrap();
    assert_eq!(
        outcome.report.patron,
        PatronEvent::Pending {
            choices: vec!["N01".to_string(), "N06".to_string()]
        }
    );
    assert!(outcome.report.handoff.is_none());
    // Still this actor's turn, but every other verb is blocked.
    assert_eq!(current_id(&game), first);
    assert_eq!(
        game.take(&first, TokenTake::TwoSame(GemColor::Red))
            .unwrap_err(),
        GemsError::PatronChoicePending
    );
    assert_eq!(
        game.choose_patron(&first, "N09").unwrap_err(),
        GemsError::PatronNotPending
    );
    assert_eq!(
        game.choose_patron("nobody", "N01").unwrap_err(),
        GemsError::NotYourTurn
    );

    let chosen = game.choose_patron(&first, "N06").unwrap();
    assert_eq!(chosen.patron.id, "N06");
    assert_eq!(chosen.total_points, 3);
    assert!(chosen.report.handoff.is_some());
    assert_eq!(game.patrons, vec!["N01".to_string()]);
    assert_ne!(current_id(&game), first);
}

#[test]
fn prestige_threshold_triggers_one_final_round() {
    let mut game = started_game();
    let first = current_id(&game);
    game.players
        .iter_mut()
        .find(|p| p.user_id == first)
        .unwrap()
        .points = WIN_POINTS;

    let outcome = game
        .take(
            &first,
            TokenTake::ThreeDistinct([GemColor::White, GemColor::Blue, GemColor::Green]),
        )
        .unwrap();
    assert!(outcome.report.triggered_final_round);
    assert!(game.final_round);
    assert!(matches!(
        outcome.report.handoff,
        Some(GemsHandoff::NextPlayer { .. })
    ));

    // The other actor's turn is the last one.
    let second = current_id(&game);
    let last = game
        .take(
            &second,
            TokenTake::ThreeDistinct([GemColor::White, GemColor::Blue, GemColor::Green]),
        )
        .unwrap();
    let conclusion = match last.report.handoff {
        Some(GemsHandoff::GameOver(c)) => c,
        other => panic!("unexpected handoff: {other:?}"),
    };
    assert_eq!(conclusion.reason, ConcludeReason::FinalRoundComplete);
    assert_eq!(game.phase, Phase::Concluded);
    let winner = conclusion.results.iter().find(|r| r.is_winner).unwrap();
    assert_eq!(winner.user_id, first);
    assert_eq!(winner.points, WIN_POINTS);
    assert_eq!(winner.rank, 1);
}

#[test]
fn soft_cap_warns_without_blocking() {
    let mut game = started_game();
    let first = current_id(&game);
    game.players
        .iter_mut()
        .find(|p| p.user_id == first)
        .unwrap()
        .tokens = TokenPool {
        gems: ColorCounts::new(2, 2, 2, 2, 0),
        gold: 0,
    };
    let outcome = game
        .take(
            &first,
            TokenTake::ThreeDistinct([GemColor::White, GemColor::Blue, GemColor::Black]),
        )
        .unwrap();
    assert_eq!(outcome.over_cap, Some(11));
    assert_eq!(game.player(&first).unwrap().tokens.total(), 11);
}

#[test]
fn forced_conclusion_clears_pending_choices() {
    let mut game = started_game();
    let first = current_id(&game);
    game.patrons = vec!["N01".to_string(), "N06".to_string()];
    game.players
        .iter_mut()
        .find(|p| p.user_id == first)
        .unwrap()
        .bonuses = ColorCounts::new(4, 4, 3, 0, 0);
    game.take(
        &first,
        TokenTake::ThreeDistinct([GemColor::White, GemColor::Blue, GemColor::Green]),
    )
    .unwrap();
    assert!(game.pending_patrons.is_some());

    let conclusion = game.conclude(ConcludeReason::Expired);
    assert!(game.pending_patrons.is_none());
    assert_eq!(game.phase, Phase::Concluded);
    assert_eq!(conclusion.results.len(), 2);
}
