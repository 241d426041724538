use serde::{Deserialize, Serialize};

/// Opaque caller identity supplied by the chat host.
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    /// No game in this room.
    Idle,
    /// Lobby open, accepting entrants.
    Waiting,
    InProgress,
    Concluded,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

/// Why a game ended. Carried on conclusions so the host can phrase the
/// settlement and decide whether statistics should be recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConcludeReason {
    /// Every actor finished one turn after the endgame trigger.
    FinalRoundComplete,
    /// Single-actor mode ran out of attempts.
    AttemptsExhausted,
    /// Initiator or privileged caller forced the end.
    Forced { by: String },
    /// Lazy idle expiry fired on an incoming command.
    Expired,
    /// An internal invariant broke; the game was concluded defensively.
    Invariant,
}
