//! The gem game: an engine-building race over a card tableau. Actors collect
//! tokens, buy development cards for permanent bonuses and prestige, and are
//! visited by patrons once their bonuses cover a requirement. First to the
//! prestige threshold triggers a final round.

use crate::catalog::{self, CardDef, PatronDef};
use crate::economy::{
    payment_for, shortfall_for, validate_take, ColorCounts, EconomyError, GemColor, Payment,
    TokenPool, TokenTake, SOFT_TOKEN_CAP,
};
use crate::outcome::{ConcludeReason, Phase, PlayerId};
use crate::rng::{shuffle, RandomSource};
use crate::tableau::Tableau;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const WIN_POINTS: i64 = 15;
pub const RESERVE_CAP: usize = 3;
pub const GOLD_SUPPLY: u8 = 5;

/// Per-color bank supply scaled to the table size.
pub fn gem_supply_for(players: usize) -> u8 {
    match players {
        0..=2 => 4,
        3 => 5,
        _ => 7,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GemsError {
    #[error("a game is already running in this room")]
    GameAlreadyRunning,
    #[error("no game is waiting for players")]
    NotWaiting,
    #[error("the game has not started")]
    NotInProgress,
    #[error("the table is full ({MAX_PLAYERS} players max)")]
    TableFull,
    #[error("you already joined this game")]
    AlreadyJoined,
    #[error("at least {MIN_PLAYERS} players are needed to start")]
    NotEnoughPlayers,
    #[error("only the game initiator can do that")]
    NotInitiator,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("several patrons are waiting on you; choose one with the patron command")]
    PatronChoicePending,
    #[error("no patron choice is pending")]
    NoPatronPending,
    #[error("that patron is not among your pending visitors")]
    PatronNotPending,
    #[error(transparent)]
    Economy(#[from] EconomyError),
    #[error("you already hold {RESERVE_CAP} reserved cards")]
    ReserveLimitReached,
    #[error("no card in that slot")]
    EmptySlot,
    #[error("tier {0} has no cards left to draw")]
    TierExhausted(u8),
    #[error("no reserved card at that position")]
    NoSuchReservation,
    #[error("you cannot afford that card")]
    CannotAfford { missing: ColorCounts },
    #[error("no current player; the game state is corrupt")]
    NoCurrentPlayer,
    #[error("card {0} is missing from the catalog")]
    UnknownCard(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GemsPlayer {
    pub user_id: PlayerId,
    pub user_name: String,
    pub tokens: TokenPool,
    /// Permanent discounts from purchased cards.
    pub bonuses: ColorCounts,
    pub points: i64,
    pub purchased: Vec<String>,
    pub reserved: Vec<String>,
    pub patrons: Vec<String>,
}

impl GemsPlayer {
    fn new(user_id: PlayerId, user_name: String) -> Self {
        Self {
            user_id,
            user_name,
            tokens: TokenPool::default(),
            bonuses: ColorCounts::default(),
            points: 0,
            purchased: Vec::new(),
            reserved: Vec::new(),
            patrons: Vec::new(),
        }
    }
}

/// A multi-patron tie waiting on the actor's explicit pick. While set, every
/// verb except the patron choice is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingPatrons {
    pub user_id: PlayerId,
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GemsGame {
    pub phase: Phase,
    pub players: Vec<GemsPlayer>,
    pub player_order: Vec<PlayerId>,
    pub current_index: usize,
    pub initiator: Option<PlayerId>,
    pub bank: TokenPool,
    pub tableau: Tableau,
    /// Patron tiles still on display.
    pub patrons: Vec<String>,
    pub pending_patrons: Option<PendingPatrons>,
    pub final_round: bool,
    pub final_round_trigger: Option<PlayerId>,
    pub final_turns_taken: usize,
}

impl Default for GemsGame {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveTarget {
    FaceUp { tier: u8, slot: usize },
    Deck { tier: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyTarget {
    FaceUp { tier: u8, slot: usize },
    Reserved { index: usize },
}

/// What happened on the patron front at the end of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatronEvent {
    None,
    Awarded { id: String, points: i64 },
    Pending { choices: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GemsHandoff {
    NextPlayer { user_id: PlayerId, user_name: String },
    GameOver(GemsConclusion),
}

/// End-of-action bookkeeping shared by every turn-consuming verb. `handoff`
/// is `None` exactly when a pending patron choice blocks the turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub patron: PatronEvent,
    pub triggered_final_round: bool,
    pub handoff: Option<GemsHandoff>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TakeOutcome {
    pub taken: TokenTake,
    /// Total held tokens when the soft cap is exceeded.
    pub over_cap: Option<u32>,
    pub report: TurnReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReserveOutcome {
    pub card_id: String,
    /// Drawn blind from the pile rather than from the face-up window.
    pub from_deck: bool,
    pub gold_granted: bool,
    pub over_cap: Option<u32>,
    pub report: TurnReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuyOutcome {
    pub card: &'static CardDef,
    pub payment: Payment,
    pub from_reserve: bool,
    pub total_points: i64,
    pub report: TurnReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatronOutcome {
    pub patron: &'static PatronDef,
    pub total_points: i64,
    pub report: TurnReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GemsResult {
    pub user_id: PlayerId,
    pub user_name: String,
    pub points: i64,
    pub cards: usize,
    pub patrons: usize,
    pub rank: usize,
    pub is_winner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GemsConclusion {
    pub reason: ConcludeReason,
    pub results: Vec<GemsResult>,
}

impl GemsGame {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            players: Vec::new(),
            player_order: Vec::new(),
            current_index: 0,
            initiator: None,
            bank: TokenPool::default(),
            tableau: Tableau::default(),
            patrons: Vec::new(),
            pending_patrons: None,
            final_round: false,
            final_round_trigger: None,
            final_turns_taken: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Waiting | Phase::InProgress)
    }

    pub fn player(&self, user_id: &str) -> Option<&GemsPlayer> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn current_player(&self) -> Result<&GemsPlayer, GemsError> {
        let id = self
            .player_order
            .get(self.current_index)
            .ok_or(GemsError::NoCurrentPlayer)?;
        self.players
            .iter()
            .find(|p| &p.user_id == id)
            .ok_or(GemsError::NoCurrentPlayer)
    }

    fn current_player_mut(&mut self) -> Result<&mut GemsPlayer, GemsError> {
        let id = self
            .player_order
            .get(self.current_index)
            .cloned()
            .ok_or(GemsError::NoCurrentPlayer)?;
        self.players
            .iter_mut()
            .find(|p| p.user_id == id)
            .ok_or(GemsError::NoCurrentPlayer)
    }

    fn ensure_turn(&self, user_id: &str) -> Result<(), GemsError> {
        if self.phase != Phase::InProgress {
            return Err(GemsError::NotInProgress);
        }
        if self.current_player()?.user_id != user_id {
            return Err(GemsError::NotYourTurn);
        }
        if self.pending_patrons.is_some() {
            return Err(GemsError::PatronChoicePending);
        }
        Ok(())
    }

    pub fn open_lobby(&mut self, user_id: &str, user_name: &str) -> Result<(), GemsError> {
        if self.is_active() {
            return Err(GemsError::GameAlreadyRunning);
        }
        *self = Self::new();
        self.phase = Phase::Waiting;
        self.players
            .push(GemsPlayer::new(user_id.to_string(), user_name.to_string()));
        self.initiator = Some(user_id.to_string());
        Ok(())
    }

    pub fn join(&mut self, user_id: &str, user_name: &str) -> Result<usize, GemsError> {
        if self.phase != Phase::Waiting {
            return Err(GemsError::NotWaiting);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GemsError::TableFull);
        }
        if self.player(user_id).is_some() {
            return Err(GemsError::AlreadyJoined);
        }
        self.players
            .push(GemsPlayer::new(user_id.to_string(), user_name.to_string()));
        Ok(self.players.len())
    }

    /// Deal the tableau, draw patrons, stock the bank, and shuffle seating.
    pub fn start(
        &mut self,
        user_id: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<&GemsPlayer, GemsError> {
        if self.phase != Phase::Waiting {
            return Err(GemsError::NotWaiting);
        }
        if self.initiator.as_deref() != Some(user_id) {
            return Err(GemsError::NotInitiator);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GemsError::NotEnoughPlayers);
        }

        let supply = gem_supply_for(self.players.len());
        self.bank = TokenPool {
            gems: ColorCounts::new(supply, supply, supply, supply, supply),
            gold: GOLD_SUPPLY,
        };
        self.tableau = Tableau::deal(rng);

        let mut tiles: Vec<String> = catalog::PATRONS.iter().map(|p| p.id.to_string()).collect();
        shuffle(rng, &mut tiles);
        tiles.truncate(self.players.len() + 1);
        self.patrons = tiles;

        let mut order: Vec<PlayerId> = self.players.iter().map(|p| p.user_id.clone()).collect();
        shuffle(rng, &mut order);
        self.player_order = order;
        self.current_index = 0;
        self.phase = Phase::InProgress;
        self.current_player()
    }

    pub fn take(&mut self, user_id: &str, take: TokenTake) -> Result<TakeOutcome, GemsError> {
        self.ensure_turn(user_id)?;
        validate_take(&self.bank, &take)?;

        match &take {
            TokenTake::ThreeDistinct(colors) => {
                for &color in colors {
                    self.bank.remove(color, 1);
                }
                let player = self.current_player_mut()?;
                for &color in colors {
                    player.tokens.add(color, 1);
                }
            }
            TokenTake::TwoSame(color) => {
                self.bank.remove(*color, 2);
                self.current_player_mut()?.tokens.add(*color, 2);
            }
        }

        let over_cap = self.cap_warning()?;
        let report = self.finish_action()?;
        Ok(TakeOutcome {
            taken: take,
            over_cap,
            report,
        })
    }

    pub fn reserve(
        &mut self,
        user_id: &str,
        target: ReserveTarget,
    ) -> Result<ReserveOutcome, GemsError> {
        self.ensure_turn(user_id)?;
        if self.current_player()?.reserved.len() >= RESERVE_CAP {
            return Err(GemsError::ReserveLimitReached);
        }

        let (card_id, from_deck) = match target {
            ReserveTarget::FaceUp { tier, slot } => {
                let id = self
                    .tableau
                    .take_face_up(tier, slot)
                    .ok_or(GemsError::EmptySlot)?;
                (id, false)
            }
            ReserveTarget::Deck { tier } => {
                let id = self
                    .tableau
                    .draw_from_pile(tier)
                    .ok_or(GemsError::TierExhausted(tier))?;
                (id, true)
            }
        };

        let gold_granted = self.bank.gold > 0;
        if gold_granted {
            self.bank.gold -= 1;
        }
        let player = self.current_player_mut()?;
        player.reserved.push(card_id.clone());
        if gold_granted {
            player.tokens.gold += 1;
        }

        let over_cap = self.cap_warning()?;
        let report = self.finish_action()?;
        Ok(ReserveOutcome {
            card_id,
            from_deck,
            gold_granted,
            over_cap,
            report,
        })
    }

    pub fn buy(&mut self, user_id: &str, target: BuyTarget) -> Result<BuyOutcome, GemsError> {
        self.ensure_turn(user_id)?;

        // Resolve the card and compute the payment before touching any state.
        let (card_id, from_reserve) = match target {
            BuyTarget::FaceUp { tier, slot } => {
                let row = self.tableau.row(tier).ok_or(GemsError::EmptySlot)?;
                let id = row.face_up.get(slot).cloned().ok_or(GemsError::EmptySlot)?;
                (id, false)
            }
            BuyTarget::Reserved { index } => {
                let player = self.current_player()?;
                let id = player
                    .reserved
                    .get(index)
                    .cloned()
                    .ok_or(GemsError::NoSuchReservation)?;
                (id, true)
            }
        };
        let card = catalog::card_def(&card_id).ok_or_else(|| GemsError::UnknownCard(card_id.clone()))?;
        let player = self.current_player()?;
        let payment = payment_for(&card.cost, &player.bonuses, &player.tokens).ok_or_else(|| {
            GemsError::CannotAfford {
                missing: shortfall_for(&card.cost, &player.bonuses, &player.tokens),
            }
        })?;

        // Apply: lift the card, move the payment to the bank, grant the bonus.
        match target {
            BuyTarget::FaceUp { tier, slot } => {
                self.tableau
                    .take_face_up(tier, slot)
                    .ok_or(GemsError::EmptySlot)?;
            }
            BuyTarget::Reserved { index } => {
                self.current_player_mut()?.reserved.remove(index);
            }
        }
        for color in GemColor::ALL {
            let n = payment.gems.get(color);
            if n > 0 {
                self.bank.add(color, n);
            }
        }
        self.bank.gold += payment.gold;

        let player = self.current_player_mut()?;
        for color in GemColor::ALL {
            player.tokens.remove(color, payment.gems.get(color));
        }
        player.tokens.gold -= payment.gold;
        *player.bonuses.get_mut(card.bonus) += 1;
        player.points += card.points;
        player.purchased.push(card_id);
        let total_points = player.points;

        let report = self.finish_action()?;
        Ok(BuyOutcome {
            card,
            payment,
            from_reserve,
            total_points,
            report,
        })
    }

    /// Resolve a pending multi-patron choice, then finish the blocked turn.
    pub fn choose_patron(&mut self, user_id: &str, id: &str) -> Result<PatronOutcome, GemsError> {
        if self.phase != Phase::InProgress {
            return Err(GemsError::NotInProgress);
        }
        let pending = self
            .pending_patrons
            .as_ref()
            .ok_or(GemsError::NoPatronPending)?;
        if pending.user_id != user_id {
            return Err(GemsError::NotYourTurn);
        }
        if !pending.choices.iter().any(|c| c == id) {
            return Err(GemsError::PatronNotPending);
        }
        let def = catalog::patron_def(id).ok_or_else(|| GemsError::UnknownCard(id.to_string()))?;

        self.pending_patrons = None;
        self.patrons.retain(|p| p != id);
        let player = self.current_player_mut()?;
        player.patrons.push(id.to_string());
        player.points += def.points;
        let total_points = player.points;

        let (triggered, handoff) = self.end_turn()?;
        Ok(PatronOutcome {
            patron: def,
            total_points,
            report: TurnReport {
                patron: PatronEvent::Awarded {
                    id: id.to_string(),
                    points: def.points,
                },
                triggered_final_round: triggered,
                handoff: Some(handoff),
            },
        })
    }

    pub fn conclude(&mut self, reason: ConcludeReason) -> GemsConclusion {
        self.phase = Phase::Concluded;
        self.pending_patrons = None;
        self.build_conclusion(reason)
    }

    fn cap_warning(&self) -> Result<Option<u32>, GemsError> {
        let total = self.current_player()?.tokens.total();
        Ok((total > SOFT_TOKEN_CAP).then_some(total))
    }

    /// Patron evaluation then turn handoff. One eligible patron auto-awards;
    /// several block the turn until the actor picks.
    fn finish_action(&mut self) -> Result<TurnReport, GemsError> {
        let player = self.current_player()?;
        let eligible: Vec<String> = self
            .patrons
            .iter()
            .filter(|id| {
                catalog::patron_def(id)
                    .map(|def| player.bonuses.covers(&def.requirement))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let patron = match eligible.len() {
            0 => PatronEvent::None,
            1 => {
                let id = eligible[0].clone();
                let def =
                    catalog::patron_def(&id).ok_or_else(|| GemsError::UnknownCard(id.clone()))?;
                self.patrons.retain(|p| p != &id);
                let player = self.current_player_mut()?;
                player.patrons.push(id.clone());
                player.points += def.points;
                PatronEvent::Awarded {
                    id,
                    points: def.points,
                }
            }
            _ => {
                let user_id = player.user_id.clone();
                self.pending_patrons = Some(PendingPatrons {
                    user_id,
                    choices: eligible.clone(),
                });
                return Ok(TurnReport {
                    patron: PatronEvent::Pending { choices: eligible },
                    triggered_final_round: false,
                    handoff: None,
                });
            }
        };

        let (triggered, handoff) = self.end_turn()?;
        Ok(TurnReport {
            patron,
            triggered_final_round: triggered,
            handoff: Some(handoff),
        })
    }

    fn end_turn(&mut self) -> Result<(bool, GemsHandoff), GemsError> {
        let mut triggered = false;
        if !self.final_round && self.current_player()?.points >= WIN_POINTS {
            triggered = true;
            self.final_round = true;
            self.final_round_trigger = Some(self.current_player()?.user_id.clone());
        }
        if self.final_round {
            self.final_turns_taken += 1;
            if self.final_turns_taken >= self.players.len() {
                self.phase = Phase::Concluded;
                return Ok((
                    triggered,
                    GemsHandoff::GameOver(
                        self.build_conclusion(ConcludeReason::FinalRoundComplete),
                    ),
                ));
            }
        }
        self.current_index = (self.current_index + 1) % self.player_order.len();
        let next = self.current_player()?;
        Ok((
            triggered,
            GemsHandoff::NextPlayer {
                user_id: next.user_id.clone(),
                user_name: next.user_name.clone(),
            },
        ))
    }

    fn build_conclusion(&self, reason: ConcludeReason) -> GemsConclusion {
        let mut ranked: Vec<&GemsPlayer> = self.players.iter().collect();
        // Prestige first; fewer cards breaks ties.
        ranked.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(a.purchased.len().cmp(&b.purchased.len()))
        });
        let mut results = Vec::with_capacity(ranked.len());
        let mut rank = 0;
        let mut last_key = None;
        for (i, player) in ranked.iter().enumerate() {
            let key = (player.points, player.purchased.len());
            if last_key != Some(key) {
                rank = i + 1;
                last_key = Some(key);
            }
            results.push(GemsResult {
                user_id: player.user_id.clone(),
                user_name: player.user_name.clone(),
                points: player.points,
                cards: player.purchased.len(),
                patrons: player.patrons.len(),
                rank,
                is_winner: rank == 1,
            });
        }
        GemsConclusion { reason, results }
    }
}
