//! Verb parsing. Every chat command becomes a closed enum variant before it
//! reaches the dispatcher; anything else is a parse error with reply text.

use parlor_core::economy::GemColor;
use parlor_core::gems::{BuyTarget, ReserveTarget};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownVerb(String),
    #[error("{0}")]
    BadArgument(String),
}

fn bad(msg: impl Into<String>) -> ParseError {
    ParseError::BadArgument(msg.into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarkleCommand {
    New { target: Option<i64> },
    Join,
    Start { target: Option<i64> },
    Single { attempts: Option<u32> },
    Rule { number: u8 },
    Roll,
    Select { faces: Vec<u8> },
    Bank,
    Status,
    End,
    Stats,
    Board,
}

impl FarkleCommand {
    pub fn parse(verb: &str, args: &[&str]) -> Result<Self, ParseError> {
        match verb {
            "new" => Ok(Self::New {
                target: parse_optional_number(args.first(), "target score")?,
            }),
            "join" => Ok(Self::Join),
            "start" => Ok(Self::Start {
                target: parse_optional_number(args.first(), "target score")?,
            }),
            "single" => Ok(Self::Single {
                attempts: parse_optional_number(args.first(), "attempt count")?,
            }),
            "rule" => {
                let raw = args.first().ok_or_else(|| bad("usage: rule <1|2>"))?;
                let number = raw
                    .parse::<u8>()
                    .map_err(|_| bad(format!("not a rule set number: {raw}")))?;
                Ok(Self::Rule { number })
            }
            "roll" => Ok(Self::Roll),
            "select" => {
                // Faces arrive either space-separated or as one digit string.
                let mut faces = Vec::new();
                for arg in args {
                    for ch in arg.chars().filter(|c| !c.is_whitespace() && *c != ',') {
                        let face = ch
                            .to_digit(10)
                            .filter(|&d| (1..=6).contains(&d))
                            .ok_or_else(|| bad(format!("not a die face: {ch}")))?;
                        faces.push(face as u8);
                    }
                }
                if faces.is_empty() {
                    return Err(bad("usage: select <faces>, e.g. select 1 5 5"));
                }
                Ok(Self::Select { faces })
            }
            "bank" => Ok(Self::Bank),
            "status" => Ok(Self::Status),
            "end" => Ok(Self::End),
            "stats" => Ok(Self::Stats),
            "board" => Ok(Self::Board),
            other => Err(ParseError::UnknownVerb(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GemsCommand {
    New,
    Join,
    Start,
    Take { colors: Vec<GemColor> },
    Reserve { target: ReserveTarget },
    Buy { target: BuyTarget },
    Patron { id: String },
    Status,
    Mine,
    End,
    Stats,
}

impl GemsCommand {
    pub fn parse(verb: &str, args: &[&str]) -> Result<Self, ParseError> {
        match verb {
            "new" => Ok(Self::New),
            "join" => Ok(Self::Join),
            "start" => Ok(Self::Start),
            "take" => {
                let mut colors = Vec::new();
                for arg in args {
                    let color = GemColor::from_name(arg)
                        .ok_or_else(|| bad(format!("not a gem color: {arg}")))?;
                    colors.push(color);
                }
                if !(2..=3).contains(&colors.len()) {
                    return Err(bad("usage: take <color> <color> [<color>]"));
                }
                Ok(Self::Take { colors })
            }
            "reserve" => {
                let tier_raw = args
                    .first()
                    .ok_or_else(|| bad("usage: reserve <tier> <slot|deck>"))?;
                let tier = parse_tier(tier_raw)?;
                let target = match args.get(1) {
                    Some(&"deck") | None => ReserveTarget::Deck { tier },
                    Some(raw) => ReserveTarget::FaceUp {
                        tier,
                        slot: parse_slot(raw)?,
                    },
                };
                Ok(Self::Reserve { target })
            }
            "buy" => {
                let first = args
                    .first()
                    .ok_or_else(|| bad("usage: buy <L<tier>> <slot> or buy R<n>"))?;
                let target = parse_buy_target(first, args.get(1).copied())?;
                Ok(Self::Buy { target })
            }
            "patron" => {
                let id = args
                    .first()
                    .ok_or_else(|| bad("usage: patron <id>"))?
                    .to_uppercase();
                Ok(Self::Patron { id })
            }
            "status" => Ok(Self::Status),
            "mine" => Ok(Self::Mine),
            "end" => Ok(Self::End),
            "stats" => Ok(Self::Stats),
            other => Err(ParseError::UnknownVerb(other.to_string())),
        }
    }
}

fn parse_optional_number<T: std::str::FromStr>(
    raw: Option<&&str>,
    what: &str,
) -> Result<Option<T>, ParseError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| bad(format!("not a valid {what}: {raw}"))),
    }
}

fn parse_tier(raw: &str) -> Result<u8, ParseError> {
    let digits = raw.trim_start_matches(['L', 'l']);
    let tier = digits
        .parse::<u8>()
        .map_err(|_| bad(format!("not a tier: {raw}")))?;
    if !(1..=3).contains(&tier) {
        return Err(bad(format!("tier must be 1-3, got {tier}")));
    }
    Ok(tier)
}

/// 1-based slot as typed, 0-based internally.
fn parse_slot(raw: &str) -> Result<usize, ParseError> {
    let slot = raw
        .parse::<usize>()
        .map_err(|_| bad(format!("not a slot number: {raw}")))?;
    if !(1..=4).contains(&slot) {
        return Err(bad(format!("slot must be 1-4, got {slot}")));
    }
    Ok(slot - 1)
}

fn parse_buy_target(first: &str, second: Option<&str>) -> Result<BuyTarget, ParseError> {
    if let Some(rest) = first.strip_prefix(['R', 'r']) {
        let n = rest
            .parse::<usize>()
            .map_err(|_| bad(format!("not a reservation number: {first}")))?;
        if !(1..=3).contains(&n) {
            return Err(bad(format!("reservation must be 1-3, got {n}")));
        }
        return Ok(BuyTarget::Reserved { index: n - 1 });
    }
    let tier = parse_tier(first)?;
    let slot_raw = second.ok_or_else(|| bad("usage: buy <L<tier>> <slot>"))?;
    Ok(BuyTarget::FaceUp {
        tier,
        slot: parse_slot(slot_raw)?,
    })
}
