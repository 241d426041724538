use parlor_core::dice::RuleSet;
use parlor_core::scoring::{roll_has_score, score_selection};

fn points(selection: &[u8], rules: RuleSet) -> Option<i64> {
    score_selection(selection, rules).map(|s| s.points)
}

#[test]
fn lone_ones_and_fives() {
    assert_eq!(points(&[1], RuleSet::Standard), Some(100));
    assert_eq!(points(&[5], RuleSet::Standard), Some(50));
    assert_eq!(points(&[1, 1], RuleSet::Standard), Some(200));
    assert_eq!(points(&[1, 5, 5], RuleSet::Standard), Some(200));
}

#[test]
fn triples() {
    assert_eq!(points(&[1, 1, 1], RuleSet::Standard), Some(1000));
    assert_eq!(points(&[2, 2, 2], RuleSet::Standard), Some(200));
    assert_eq!(points(&[6, 6, 6], RuleSet::Standard), Some(600));
    assert_eq!(points(&[5, 5, 5], RuleSet::Standard), Some(500));
}

#[test]
fn standard_big_kinds_are_flat() {
    assert_eq!(points(&[2, 2, 2, 2], RuleSet::Standard), Some(1000));
    assert_eq!(points(&[3, 3, 3, 3, 3], RuleSet::Standard), Some(2000));
    assert_eq!(points(&[4, 4, 4, 4, 4, 4], RuleSet::Standard), Some(3000));
}

#[test]
fn extended_big_kinds_double_the_triple() {
    assert_eq!(points(&[2, 2, 2, 2], RuleSet::Extended), Some(400));
    assert_eq!(points(&[1, 1, 1, 1], RuleSet::Extended), Some(2000));
    assert_eq!(points(&[3, 3, 3, 3, 3], RuleSet::Extended), Some(1200));
    assert_eq!(points(&[6, 6, 6, 6, 6, 6], RuleSet::Extended), Some(4800));
}

#[test]
fn full_run_and_three_pairs() {
    assert_eq!(points(&[1, 2, 3, 4, 5, 6], RuleSet::Standard), Some(1500));
    assert_eq!(points(&[2, 2, 3, 3, 4, 4], RuleSet::Standard), Some(1500));
    // Pairs of 1s and 5s still score as the three-pairs pattern, not as
    // singles.
    assert_eq!(points(&[1, 1, 5, 5, 4, 4], RuleSet::Standard), Some(1500));
}

#[test]
fn extended_small_runs() {
    assert_eq!(points(&[1, 2, 3, 4, 5], RuleSet::Extended), Some(750));
    assert_eq!(points(&[2, 3, 4, 5, 6], RuleSet::Extended), Some(750));
    // No small run under standard rules: 2,3,4,6 cannot score.
    assert_eq!(points(&[2, 3, 4, 5, 6], RuleSet::Standard), None);
    // A sixth die alongside the run must itself score.
    assert_eq!(points(&[1, 2, 3, 4, 5, 1], RuleSet::Extended), Some(850));
    assert_eq!(points(&[2, 3, 4, 5, 6, 2], RuleSet::Extended), None);
}

#[test]
fn junk_six_is_extended_only() {
    let junk = [2, 2, 3, 4, 6, 6];
    assert_eq!(points(&junk, RuleSet::Extended), Some(500));
    assert_eq!(points(&junk, RuleSet::Standard), None);
}

#[test]
fn mixed_selection_decomposes() {
    // Triple of 2s plus a lone 1 and a lone 5.
    assert_eq!(points(&[2, 2, 2, 1, 5], RuleSet::Standard), Some(350));
    // Full run hiding inside seven-ish picks is impossible; six exact dice
    // take the run branch.
    assert_eq!(points(&[6, 5, 4, 3, 2, 1], RuleSet::Standard), Some(1500));
}

#[test]
fn partial_or_dead_selections_reject_whole() {
    assert_eq!(points(&[2, 2], RuleSet::Standard), None);
    assert_eq!(points(&[1, 2], RuleSet::Standard), None);
    assert_eq!(points(&[3, 4, 6], RuleSet::Extended), None);
    assert_eq!(points(&[], RuleSet::Standard), None);
    assert_eq!(points(&[7], RuleSet::Standard), None);
}

#[test]
fn bust_detection_sees_every_pattern() {
    assert!(roll_has_score(&[1, 2, 2, 3, 3, 4], RuleSet::Standard));
    assert!(roll_has_score(&[5, 2, 2, 3, 3, 4], RuleSet::Standard));
    assert!(roll_has_score(&[4, 4, 4, 2, 3, 6], RuleSet::Standard));
    assert!(roll_has_score(&[1, 2, 3, 4, 5, 6], RuleSet::Standard));
    // Three pairs without 1s, 5s, or triples must not read as a bust.
    assert!(roll_has_score(&[2, 2, 3, 3, 4, 4], RuleSet::Standard));
    // Dead roll under standard rules, consolation under extended.
    assert!(!roll_has_score(&[2, 2, 3, 4, 6, 6], RuleSet::Standard));
    assert!(roll_has_score(&[2, 2, 3, 4, 6, 6], RuleSet::Extended));
    // Fewer than six dice can never be junk-six.
    assert!(!roll_has_score(&[2, 3, 4], RuleSet::Extended));
    assert!(!roll_has_score(&[2, 2, 3, 3], RuleSet::Standard));
}
