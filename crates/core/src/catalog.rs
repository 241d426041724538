//! Read-only game content for the gem game: the development card catalog and
//! the patron tiles. Game state stores ids; definitions are never mutated.

use crate::economy::{ColorCounts, GemColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardDef {
    pub id: &'static str,
    pub tier: u8,
    pub points: i64,
    pub bonus: GemColor,
    pub cost: ColorCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatronDef {
    pub id: &'static str,
    pub points: i64,
    /// Permanent bonus counts required, not held tokens.
    pub requirement: ColorCounts,
}

const fn cost(white: u8, blue: u8, green: u8, red: u8, black: u8) -> ColorCounts {
    ColorCounts::new(white, blue, green, red, black)
}

const fn card(id: &'static str, tier: u8, points: i64, bonus: GemColor, c: ColorCounts) -> CardDef {
    CardDef {
        id,
        tier,
        points,
        bonus,
        cost: c,
    }
}

use GemColor::{Black, Blue, Green, Red, White};

pub const CARDS: [CardDef; 90] = [
    // Tier 1 (40 cards)
    card("L1_01", 1, 1, White, cost(0, 0, 0, 4, 0)),
    card("L1_02", 1, 1, Blue, cost(0, 0, 4, 0, 0)),
    card("L1_03", 1, 1, Green, cost(0, 4, 0, 0, 0)),
    card("L1_04", 1, 1, Red, cost(0, 0, 0, 0, 4)),
    card("L1_05", 1, 1, Black, cost(4, 0, 0, 0, 0)),
    card("L1_06", 1, 0, White, cost(0, 3, 0, 0, 0)),
    card("L1_07", 1, 0, White, cost(0, 3, 0, 0, 0)),
    card("L1_08", 1, 0, Blue, cost(0, 0, 3, 0, 0)),
    card("L1_09", 1, 0, Blue, cost(0, 0, 3, 0, 0)),
    card("L1_10", 1, 0, Green, cost(0, 0, 0, 3, 0)),
    card("L1_11", 1, 0, Green, cost(0, 0, 0, 3, 0)),
    card("L1_12", 1, 0, Red, cost(0, 0, 0, 0, 3)),
    card("L1_13", 1, 0, Red, cost(0, 0, 0, 0, 3)),
    card("L1_14", 1, 0, Black, cost(3, 0, 0, 0, 0)),
    card("L1_15", 1, 0, Black, cost(3, 0, 0, 0, 0)),
    card("L1_16", 1, 0, White, cost(0, 0, 2, 2, 0)),
    card("L1_17", 1, 0, Blue, cost(0, 0, 0, 2, 2)),
    card("L1_18", 1, 0, Green, cost(2, 2, 0, 0, 0)),
    card("L1_19", 1, 0, Red, cost(2, 0, 0, 0, 2)),
    card("L1_20", 1, 0, Black, cost(0, 2, 2, 0, 0)),
    card("L1_21", 1, 0, White, cost(0, 1, 1, 1, 2)),
    card("L1_22", 1, 0, Blue, cost(1, 0, 1, 2, 1)),
    card("L1_23", 1, 0, Green, cost(1, 2, 0, 1, 1)),
    card("L1_24", 1, 0, Red, cost(2, 1, 1, 0, 1)),
    card("L1_25", 1, 0, Black, cost(1, 1, 2, 1, 0)),
    card("L1_26", 1, 0, White, cost(0, 1, 1, 1, 1)),
    card("L1_27", 1, 0, Blue, cost(1, 0, 1, 1, 1)),
    card("L1_28", 1, 0, Green, cost(1, 1, 0, 1, 1)),
    card("L1_29", 1, 0, Red, cost(1, 1, 1, 0, 1)),
    card("L1_30", 1, 0, Black, cost(1, 1, 1, 1, 0)),
    card("L1_31", 1, 0, White, cost(0, 2, 0, 1, 0)),
    card("L1_32", 1, 0, White, cost(0, 0, 2, 0, 1)),
    card("L1_33", 1, 0, Blue, cost(0, 0, 2, 1, 0)),
    card("L1_34", 1, 0, Blue, cost(1, 0, 0, 2, 0)),
    card("L1_35", 1, 0, Green, cost(1, 0, 0, 0, 2)),
    card("L1_36", 1, 0, Green, cost(0, 1, 0, 0, 2)),
    card("L1_37", 1, 0, Red, cost(2, 0, 1, 0, 0)),
    card("L1_38", 1, 0, Red, cost(0, 2, 0, 0, 1)),
    card("L1_39", 1, 0, Black, cost(0, 1, 0, 2, 0)),
    card("L1_40", 1, 0, Black, cost(2, 0, 0, 1, 0)),
    // Tier 2 (30 cards)
    card("L2_01", 2, 1, White, cost(0, 2, 0, 2, 3)),
    card("L2_02", 2, 1, White, cost(3, 0, 2, 0, 2)),
    card("L2_03", 2, 1, Blue, cost(2, 0, 3, 0, 2)),
    card("L2_04", 2, 1, Blue, cost(0, 2, 2, 3, 0)),
    card("L2_05", 2, 1, Green, cost(0, 3, 0, 2, 2)),
    card("L2_06", 2, 1, Green, cost(2, 2, 0, 0, 3)),
    card("L2_07", 2, 1, Red, cost(2, 0, 2, 0, 3)),
    card("L2_08", 2, 1, Red, cost(3, 2, 0, 2, 0)),
    card("L2_09", 2, 1, Black, cost(2, 3, 0, 2, 0)),
    card("L2_10", 2, 1, Black, cost(0, 2, 3, 0, 2)),
    card("L2_11", 2, 2, White, cost(0, 5, 0, 0, 0)),
    card("L2_12", 2, 2, White, cost(0, 0, 0, 0, 5)),
    card("L2_13", 2, 2, Blue, cost(5, 0, 0, 0, 0)),
    card("L2_14", 2, 2, Blue, cost(0, 0, 5, 0, 0)),
    card("L2_15", 2, 2, Green, cost(0, 5, 0, 0, 0)),
    card("L2_16", 2, 2, Green, cost(0, 0, 0, 5, 0)),
    card("L2_17", 2, 2, Red, cost(5, 0, 0, 0, 0)),
    card("L2_18", 2, 2, Red, cost(0, 0, 0, 0, 5)),
    card("L2_19", 2, 2, Black, cost(0, 0, 5, 0, 0)),
    card("L2_20", 2, 2, Black, cost(0, 0, 0, 5, 0)),
    card("L2_21", 2, 2, White, cost(6, 0, 0, 0, 0)),
    card("L2_22", 2, 2, Blue, cost(0, 6, 0, 0, 0)),
    card("L2_23", 2, 2, Green, cost(0, 0, 6, 0, 0)),
    card("L2_24", 2, 2, Red, cost(0, 0, 0, 6, 0)),
    card("L2_25", 2, 2, Black, cost(0, 0, 0, 0, 6)),
    card("L2_26", 2, 3, White, cost(0, 3, 3, 0, 5)),
    card("L2_27", 2, 3, Blue, cost(3, 0, 5, 3, 0)),
    card("L2_28", 2, 3, Green, cost(5, 3, 0, 0, 3)),
    card("L2_29", 2, 3, Red, cost(0, 5, 3, 0, 3)),
    card("L2_30", 2, 3, Black, cost(3, 0, 0, 5, 3)),
    // Tier 3 (20 cards)
    card("L3_01", 3, 3, White, cost(0, 3, 3, 5, 3)),
    card("L3_02", 3, 3, Blue, cost(3, 0, 3, 3, 5)),
    card("L3_03", 3, 3, Green, cost(5, 3, 0, 3, 3)),
    card("L3_04", 3, 3, Red, cost(3, 5, 3, 0, 3)),
    card("L3_05", 3, 3, Black, cost(3, 3, 5, 3, 0)),
    card("L3_06", 3, 4, White, cost(0, 0, 0, 0, 7)),
    card("L3_07", 3, 4, Blue, cost(7, 0, 0, 0, 0)),
    card("L3_08", 3, 4, Green, cost(0, 7, 0, 0, 0)),
    card("L3_09", 3, 4, Red, cost(0, 0, 7, 0, 0)),
    card("L3_10", 3, 4, Black, cost(0, 0, 0, 7, 0)),
    card("L3_11", 3, 4, White, cost(0, 0, 3, 6, 3)),
    card("L3_12", 3, 4, Blue, cost(3, 0, 0, 3, 6)),
    card("L3_13", 3, 4, Green, cost(6, 3, 0, 0, 3)),
    card("L3_14", 3, 4, Red, cost(3, 6, 3, 0, 0)),
    card("L3_15", 3, 4, Black, cost(0, 3, 6, 3, 0)),
    card("L3_16", 3, 5, White, cost(0, 0, 0, 3, 7)),
    card("L3_17", 3, 5, Blue, cost(3, 7, 0, 0, 0)),
    card("L3_18", 3, 5, Green, cost(0, 3, 7, 0, 0)),
    card("L3_19", 3, 5, Red, cost(0, 0, 3, 7, 0)),
    card("L3_20", 3, 5, Black, cost(0, 0, 0, 3, 7)),
];

pub const PATRONS: [PatronDef; 10] = [
    PatronDef {
        id: "N01",
        points: 3,
        requirement: cost(4, 4, 0, 0, 0),
    },
    PatronDef {
        id: "N02",
        points: 3,
        requirement: cost(0, 4, 4, 0, 0),
    },
    PatronDef {
        id: "N03",
        points: 3,
        requirement: cost(0, 0, 4, 4, 0),
    },
    PatronDef {
        id: "N04",
        points: 3,
        requirement: cost(0, 0, 0, 4, 4),
    },
    PatronDef {
        id: "N05",
        points: 3,
        requirement: cost(4, 0, 0, 0, 4),
    },
    PatronDef {
        id: "N06",
        points: 3,
        requirement: cost(3, 3, 3, 0, 0),
    },
    PatronDef {
        id: "N07",
        points: 3,
        requirement: cost(0, 3, 3, 3, 0),
    },
    PatronDef {
        id: "N08",
        points: 3,
        requirement: cost(0, 0, 3, 3, 3),
    },
    PatronDef {
        id: "N09",
        points: 3,
        requirement: cost(3, 0, 0, 3, 3),
    },
    PatronDef {
        id: "N10",
        points: 3,
        requirement: cost(3, 3, 0, 0, 3),
    },
];

pub fn card_def(id: &str) -> Option<&'static CardDef> {
    CARDS.iter().find(|c| c.id == id)
}

pub fn patron_def(id: &str) -> Option<&'static PatronDef> {
    PATRONS.iter().find(|p| p.id == id)
}

pub fn tier_card_ids(tier: u8) -> Vec<String> {
    CARDS
        .iter()
        .filter(|c| c.tier == tier)
        .map(|c| c.id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_sizes_match_the_printed_deck() {
        assert_eq!(tier_card_ids(1).len(), 40);
        assert_eq!(tier_card_ids(2).len(), 30);
        assert_eq!(tier_card_ids(3).len(), 20);
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in CARDS.iter().enumerate() {
            assert!(CARDS.iter().skip(i + 1).all(|b| b.id != a.id), "{}", a.id);
        }
    }
}
