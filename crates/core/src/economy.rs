use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Warning threshold on total held tokens. Exceeding it is allowed; the
/// caller surfaces a non-blocking warning asking for a later return.
pub const SOFT_TOKEN_CAP: u32 = 10;

/// Bank supply required before two tokens of one color may be taken.
pub const TWO_SAME_MIN_SUPPLY: u8 = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GemColor {
    White,
    Blue,
    Green,
    Red,
    Black,
}

impl GemColor {
    pub const ALL: [GemColor; 5] = [
        GemColor::White,
        GemColor::Blue,
        GemColor::Green,
        GemColor::Red,
        GemColor::Black,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GemColor::White => "white",
            GemColor::Blue => "blue",
            GemColor::Green => "green",
            GemColor::Red => "red",
            GemColor::Black => "black",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "white" | "w" => Some(GemColor::White),
            "blue" | "b" => Some(GemColor::Blue),
            "green" | "g" => Some(GemColor::Green),
            "red" | "r" => Some(GemColor::Red),
            "black" | "k" => Some(GemColor::Black),
            _ => None,
        }
    }
}

/// Per-color counts without the wildcard. Used for card costs, patron
/// requirements, permanent bonuses, and the gem half of token pools.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorCounts {
    pub white: u8,
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub black: u8,
}

impl ColorCounts {
    pub const fn new(white: u8, blue: u8, green: u8, red: u8, black: u8) -> Self {
        Self {
            white,
            blue,
            green,
            red,
            black,
        }
    }

    pub fn get(&self, color: GemColor) -> u8 {
        match color {
            GemColor::White => self.white,
            GemColor::Blue => self.blue,
            GemColor::Green => self.green,
            GemColor::Red => self.red,
            GemColor::Black => self.black,
        }
    }

    pub fn get_mut(&mut self, color: GemColor) -> &mut u8 {
        match color {
            GemColor::White => &mut self.white,
            GemColor::Blue => &mut self.blue,
            GemColor::Green => &mut self.green,
            GemColor::Red => &mut self.red,
            GemColor::Black => &mut self.black,
        }
    }

    pub fn total(&self) -> u32 {
        GemColor::ALL.iter().map(|&c| u32::from(self.get(c))).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    /// True if this holds at least `requirement` of every color.
    pub fn covers(&self, requirement: &ColorCounts) -> bool {
        GemColor::ALL
            .iter()
            .all(|&c| self.get(c) >= requirement.get(c))
    }
}

/// Tokens held by an actor or the bank: five gem colors plus the gold
/// wildcard. Gold substitutes for any color during payment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPool {
    pub gems: ColorCounts,
    pub gold: u8,
}

impl TokenPool {
    pub fn total(&self) -> u32 {
        self.gems.total() + u32::from(self.gold)
    }

    pub fn add(&mut self, color: GemColor, n: u8) {
        *self.gems.get_mut(color) += n;
    }

    pub fn remove(&mut self, color: GemColor, n: u8) {
        let slot = self.gems.get_mut(color);
        *slot = slot.saturating_sub(n);
    }
}

/// The exact split an actor pays for a cost vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Payment {
    pub gems: ColorCounts,
    pub gold: u8,
}

impl Payment {
    pub fn total(&self) -> u32 {
        self.gems.total() + u32::from(self.gold)
    }
}

/// Deterministic affordability and payment computation. For each color the
/// effective requirement is the cost minus the permanent bonus; held tokens
/// of that color pay first and gold covers any shortfall. Returns `None` when
/// the summed shortfall exceeds held gold. The same function validates
/// affordability and produces the actual transfer.
pub fn payment_for(cost: &ColorCounts, bonuses: &ColorCounts, held: &TokenPool) -> Option<Payment> {
    let mut payment = Payment::default();
    let mut gold_left = held.gold;
    for color in GemColor::ALL {
        let effective = cost.get(color).saturating_sub(bonuses.get(color));
        let have = held.gems.get(color);
        if have >= effective {
            *payment.gems.get_mut(color) = effective;
        } else {
            *payment.gems.get_mut(color) = have;
            let shortfall = effective - have;
            if gold_left < shortfall {
                return None;
            }
            gold_left -= shortfall;
            payment.gold += shortfall;
        }
    }
    Some(payment)
}

/// Per-color amounts still missing after bonuses, held tokens, and gold are
/// exhausted. Used for "cannot afford" messages.
pub fn shortfall_for(cost: &ColorCounts, bonuses: &ColorCounts, held: &TokenPool) -> ColorCounts {
    let mut missing = ColorCounts::default();
    for color in GemColor::ALL {
        let effective = cost.get(color).saturating_sub(bonuses.get(color));
        *missing.get_mut(color) = effective.saturating_sub(held.gems.get(color));
    }
    missing
}

/// A token-taking action: three distinct colors, or two of one color.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenTake {
    ThreeDistinct([GemColor; 3]),
    TwoSame(GemColor),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EconomyError {
    #[error("the bank has no {} tokens left", .0.name())]
    ColorOutOfStock(GemColor),
    #[error(
        "taking two {color} tokens requires at least {min} in the bank (currently {available})",
        color = .color.name(),
        min = TWO_SAME_MIN_SUPPLY
    )]
    NeedsFourInBank { color: GemColor, available: u8 },
    #[error("pick three distinct colors or the same color twice")]
    MalformedTake,
}

/// Validate a take against the bank without mutating anything.
pub fn validate_take(bank: &TokenPool, take: &TokenTake) -> Result<(), EconomyError> {
    match take {
        TokenTake::ThreeDistinct(colors) => {
            if colors[0] == colors[1] || colors[0] == colors[2] || colors[1] == colors[2] {
                return Err(EconomyError::MalformedTake);
            }
            for &color in colors {
                if bank.gems.get(color) == 0 {
                    return Err(EconomyError::ColorOutOfStock(color));
                }
            }
            Ok(())
        }
        TokenTake::TwoSame(color) => {
            let available = bank.gems.get(*color);
            if available < TWO_SAME_MIN_SUPPLY {
                return Err(EconomyError::NeedsFourInBank {
                    color: *color,
                    available,
                });
            }
            Ok(())
        }
    }
}
