use crate::dice::{FaceCounts, RuleSet};

pub const FULL_RUN_SCORE: i64 = 1500;
pub const THREE_PAIRS_SCORE: i64 = 1500;
pub const SMALL_RUN_SCORE: i64 = 750;
pub const JUNK_SIX_SCORE: i64 = 500;
pub const LONE_ONE_SCORE: i64 = 100;
pub const LONE_FIVE_SCORE: i64 = 50;

/// A validated selection: the points earned and the faces consumed, sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionScore {
    pub points: i64,
    pub faces: Vec<u8>,
}

/// Bust detection over a fresh roll: true iff the roll contains at least one
/// scoring combination under the active rule set.
pub fn roll_has_score(roll: &[u8], rules: RuleSet) -> bool {
    let counts = FaceCounts::from_faces(roll);
    if rules == RuleSet::Extended && is_junk_six(&counts, roll.len()) {
        return true;
    }
    if counts.get(1) > 0 || counts.get(5) > 0 {
        return true;
    }
    if (1..=6).any(|face| counts.get(face) >= 3) {
        return true;
    }
    if counts.has_run(1, 6) {
        return true;
    }
    // Three pairs with no 1s, 5s, or triples (e.g. 2,2,3,3,4,4) still scores.
    roll.len() == 6 && counts.pair_count() == 3
}

/// Exact greedy decomposition of a player-chosen sub-multiset. Returns `None`
/// unless every chosen die belongs to a recognized pattern: partial or mixed
/// selections are rejected as a whole.
pub fn score_selection(selection: &[u8], rules: RuleSet) -> Option<SelectionScore> {
    if selection.is_empty() || selection.iter().any(|&f| !(1..=6).contains(&f)) {
        return None;
    }
    let original = FaceCounts::from_faces(selection);
    let mut counts = original;
    let len = selection.len();

    // Full-set patterns consume the whole selection atomically.
    if rules == RuleSet::Extended && len == 6 && is_junk_six(&counts, len) {
        return Some(SelectionScore {
            points: JUNK_SIX_SCORE,
            faces: original.faces(),
        });
    }
    if rules == RuleSet::Extended && len == 5 {
        if counts.is_exact_run(1, 5) || counts.is_exact_run(2, 6) {
            return Some(SelectionScore {
                points: SMALL_RUN_SCORE,
                faces: original.faces(),
            });
        }
    }
    if len == 6 && counts.has_run(1, 6) {
        return Some(SelectionScore {
            points: FULL_RUN_SCORE,
            faces: original.faces(),
        });
    }
    if len == 6 && counts.pair_count() == 3 {
        return Some(SelectionScore {
            points: THREE_PAIRS_SCORE,
            faces: original.faces(),
        });
    }

    let mut points = 0i64;

    // Runs first, since they spread across faces that the of-a-kind pass
    // would otherwise strand.
    if counts.has_run(1, 6) {
        points += FULL_RUN_SCORE;
        for face in 1..=6 {
            counts.remove(face, 1);
        }
    }
    if rules == RuleSet::Extended {
        if counts.has_run(1, 5) {
            points += SMALL_RUN_SCORE;
            for face in 1..=5 {
                counts.remove(face, 1);
            }
        } else if counts.has_run(2, 6) {
            points += SMALL_RUN_SCORE;
            for face in 2..=6 {
                counts.remove(face, 1);
            }
        }
    }

    // Largest of-a-kind groups first.
    for group in (3..=6u8).rev() {
        for face in 1..=6u8 {
            if counts.get(face) >= group {
                points += kind_score(group, face, rules);
                counts.remove(face, group);
            }
        }
    }

    // Leftover lone 1s and 5s score individually.
    let ones = counts.get(1);
    if ones > 0 {
        points += i64::from(ones) * LONE_ONE_SCORE;
        counts.remove(1, ones);
    }
    let fives = counts.get(5);
    if fives > 0 {
        points += i64::from(fives) * LONE_FIVE_SCORE;
        counts.remove(5, fives);
    }

    if points == 0 || !counts.is_empty() {
        return None;
    }
    Some(SelectionScore {
        points,
        faces: original.faces(),
    })
}

fn kind_score(group: u8, face: u8, rules: RuleSet) -> i64 {
    let face = i64::from(face);
    let triple = if face == 1 { 1000 } else { face * 100 };
    match (group, rules) {
        (3, _) => triple,
        (4, RuleSet::Standard) => 1000,
        (5, RuleSet::Standard) => 2000,
        (6, RuleSet::Standard) => 3000,
        (4, RuleSet::Extended) => triple * 2,
        (5, RuleSet::Extended) => triple * 4,
        (6, RuleSet::Extended) => triple * 8,
        _ => 0,
    }
}

/// Extended-rules consolation: six dice with no standard combination at all.
fn is_junk_six(counts: &FaceCounts, len: usize) -> bool {
    if len != 6 {
        return false;
    }
    if counts.get(1) > 0 || counts.get(5) > 0 {
        return false;
    }
    if (1..=6).any(|face| counts.get(face) >= 3) {
        return false;
    }
    if counts.has_run(1, 6) || counts.has_run(1, 5) || counts.has_run(2, 6) {
        return false;
    }
    counts.pair_count() != 3
}
