//! Events a match emits for the caller to persist or broadcast.
//!
//! Events are queued on the [`Match`](crate::Match) in the order they happen
//! and drained with [`Match::take_events`](crate::Match::take_events). The
//! engine never delivers them anywhere itself.

use crate::common::{Coordinate, PlacementError};
use crate::game::{PlayerId, ShotOutcome};
use crate::ship::ShipId;

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FinishCause {
    FleetDestroyed,
    Forfeit,
}

/// Domain events of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// A ship was placed or moved.
    PlacementAccepted {
        player: PlayerId,
        ship: ShipId,
        cells: Vec<Coordinate>,
    },
    PlacementRejected {
        player: PlayerId,
        ship: ShipId,
        reason: PlacementError,
    },
    /// A ship was picked up again.
    ShipRemoved { player: PlayerId, ship: ShipId },
    /// The player's board now holds the whole fleet.
    PlacementComplete { player: PlayerId },
    PlayerReady { player: PlayerId },
    BattleStarted { first_turn: PlayerId },
    ShotFired(ShotOutcome),
    TurnChanged { turn: PlayerId },
    MatchFinished {
        winner: PlayerId,
        cause: FinishCause,
    },
}

impl Event {
    /// True for events that end the match.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::MatchFinished { .. })
    }
}
