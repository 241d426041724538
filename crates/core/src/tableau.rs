use crate::catalog;
use crate::rng::{shuffle, RandomSource};
use serde::{Deserialize, Serialize};

pub const TIER_COUNT: u8 = 3;
pub const FACE_UP_SLOTS: usize = 4;

/// One tier: a shuffled draw pile (last element is the top) and its face-up
/// window. A tier whose pile and window are both empty stays empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierRow {
    pub pile: Vec<String>,
    pub face_up: Vec<String>,
}

impl TierRow {
    fn refill(&mut self) {
        while self.face_up.len() < FACE_UP_SLOTS {
            match self.pile.pop() {
                Some(card) => self.face_up.push(card),
                None => break,
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tableau {
    pub tiers: [TierRow; 3],
}

impl Tableau {
    /// Shuffle each tier's catalog cards into a pile and flip the windows.
    pub fn deal(rng: &mut dyn RandomSource) -> Self {
        let mut tableau = Tableau::default();
        for tier in 1..=TIER_COUNT {
            let mut pile = catalog::tier_card_ids(tier);
            shuffle(rng, &mut pile);
            let row = &mut tableau.tiers[(tier - 1) as usize];
            row.pile = pile;
            row.refill();
        }
        tableau
    }

    pub fn row(&self, tier: u8) -> Option<&TierRow> {
        if (1..=TIER_COUNT).contains(&tier) {
            Some(&self.tiers[(tier - 1) as usize])
        } else {
            None
        }
    }

    fn row_mut(&mut self, tier: u8) -> Option<&mut TierRow> {
        if (1..=TIER_COUNT).contains(&tier) {
            Some(&mut self.tiers[(tier - 1) as usize])
        } else {
            None
        }
    }

    /// Remove a face-up card by slot index and immediately backfill the
    /// vacancy from the pile.
    pub fn take_face_up(&mut self, tier: u8, slot: usize) -> Option<String> {
        let row = self.row_mut(tier)?;
        if slot >= row.face_up.len() {
            return None;
        }
        let card = row.face_up.remove(slot);
        row.refill();
        Some(card)
    }

    /// Blind-draw the top of a tier's pile.
    pub fn draw_from_pile(&mut self, tier: u8) -> Option<String> {
        self.row_mut(tier)?.pile.pop()
    }
}
