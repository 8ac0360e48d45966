//! Matches keyed by id, and the transport-agnostic command interface.
//!
//! The registry is single-writer: callers serialize commands per match, and
//! every command is re-checked against the latest committed state, so the
//! loser of a race gets `NotYourTurn` or `AlreadyFired` back.

use std::collections::HashMap;

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, BoardState};
use crate::common::{Coordinate, GameError};
use crate::config::MatchConfig;
use crate::events::Event;
use crate::game::{Match, MatchId, MatchState, PlayerId, ShotOutcome};
use crate::ship::{Orientation, ShipId};

/// A command from a client, as delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    CreateMatch {
        config: MatchConfig,
        players: [PlayerId; 2],
    },
    PlaceShip {
        match_id: MatchId,
        player: PlayerId,
        ship: ShipId,
        anchor: Coordinate,
        orientation: Orientation,
    },
    RemoveShip {
        match_id: MatchId,
        player: PlayerId,
        ship: ShipId,
    },
    RequestRandomPlacement {
        match_id: MatchId,
        player: PlayerId,
    },
    MarkReady {
        match_id: MatchId,
        player: PlayerId,
    },
    FireShot {
        match_id: MatchId,
        player: PlayerId,
        target: Coordinate,
    },
    Forfeit {
        match_id: MatchId,
        player: PlayerId,
    },
}

impl Command {
    /// The match this command targets. `None` for `CreateMatch`.
    pub fn match_id(&self) -> Option<MatchId> {
        match self {
            Command::CreateMatch { .. } => None,
            Command::PlaceShip { match_id, .. }
            | Command::RemoveShip { match_id, .. }
            | Command::RequestRandomPlacement { match_id, .. }
            | Command::MarkReady { match_id, .. }
            | Command::FireShot { match_id, .. }
            | Command::Forfeit { match_id, .. } => Some(*match_id),
        }
    }
}

/// Successful result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reply {
    Created(MatchId),
    /// The commanding player's board after a placement command.
    Board(BoardState),
    Match(MatchState),
    Shot(ShotOutcome),
}

/// Everything a dispatched command produced: the reply, the events queued
/// while handling it (rejections included) and the match state to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub match_id: Option<MatchId>,
    pub reply: Result<Reply, GameError>,
    pub events: Vec<Event>,
    /// Authoritative state after the command, when the match exists.
    pub state: Option<MatchState>,
}

/// Owns every live match and the random source for random placement.
#[derive(Debug)]
pub struct MatchRegistry<R = SmallRng> {
    matches: HashMap<MatchId, Match>,
    next_id: u64,
    rng: R,
}

impl MatchRegistry<SmallRng> {
    /// Registry with a `SmallRng` seeded from the thread RNG.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_rng(&mut rand::rng()))
    }

    /// Registry with a reproducible random source.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for MatchRegistry<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> MatchRegistry<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            matches: HashMap::new(),
            next_id: 1,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Ids of all live matches, ascending.
    pub fn ids(&self) -> Vec<MatchId> {
        let mut ids: Vec<_> = self.matches.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    /// Drop a match, typically once it is finished and persisted.
    pub fn remove(&mut self, id: MatchId) -> Option<Match> {
        self.matches.remove(&id)
    }

    pub fn create_match(
        &mut self,
        config: MatchConfig,
        players: [PlayerId; 2],
    ) -> Result<MatchId, GameError> {
        let id = MatchId(self.next_id);
        let m = Match::new(id, config, players)?;
        self.next_id += 1;
        self.matches.insert(id, m);
        Ok(id)
    }

    /// Rehydrate a persisted match, replacing any live match with its id.
    pub fn restore(&mut self, state: MatchState) -> Result<MatchId, GameError> {
        let m = Match::from_state(state)?;
        let id = m.id();
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.matches.insert(id, m);
        Ok(id)
    }

    pub fn place_ship(
        &mut self,
        id: MatchId,
        player: &PlayerId,
        ship: ShipId,
        anchor: Coordinate,
        orientation: Orientation,
    ) -> Result<&Board, GameError> {
        self.entry(id)?.place_ship(player, ship, anchor, orientation)
    }

    pub fn remove_ship(
        &mut self,
        id: MatchId,
        player: &PlayerId,
        ship: ShipId,
    ) -> Result<&Board, GameError> {
        self.entry(id)?.remove_ship(player, ship)
    }

    pub fn request_random_placement(
        &mut self,
        id: MatchId,
        player: &PlayerId,
    ) -> Result<&Board, GameError> {
        let m = self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))?;
        m.random_placement(player, &mut self.rng)
    }

    pub fn mark_ready(&mut self, id: MatchId, player: &PlayerId) -> Result<&Match, GameError> {
        let m = self.entry(id)?;
        m.mark_ready(player)?;
        Ok(m)
    }

    pub fn fire_shot(
        &mut self,
        id: MatchId,
        player: &PlayerId,
        target: Coordinate,
    ) -> Result<ShotOutcome, GameError> {
        self.entry(id)?.fire_shot(player, target)
    }

    pub fn forfeit(&mut self, id: MatchId, player: &PlayerId) -> Result<&Match, GameError> {
        let m = self.entry(id)?;
        m.forfeit(player)?;
        Ok(m)
    }

    /// Drain the events queued on a match.
    pub fn take_events(&mut self, id: MatchId) -> Result<Vec<Event>, GameError> {
        Ok(self.entry(id)?.take_events())
    }

    /// Run one command and collect its reply, events and resulting state.
    pub fn dispatch(&mut self, command: Command) -> Dispatch {
        debug!("dispatch {:?}", command);
        let target = command.match_id();
        let reply = match command {
            Command::CreateMatch { config, players } => {
                self.create_match(config, players).map(Reply::Created)
            }
            Command::PlaceShip {
                match_id,
                player,
                ship,
                anchor,
                orientation,
            } => self
                .place_ship(match_id, &player, ship, anchor, orientation)
                .map(|b| Reply::Board(BoardState::from(b))),
            Command::RemoveShip {
                match_id,
                player,
                ship,
            } => self
                .remove_ship(match_id, &player, ship)
                .map(|b| Reply::Board(BoardState::from(b))),
            Command::RequestRandomPlacement { match_id, player } => self
                .request_random_placement(match_id, &player)
                .map(|b| Reply::Board(BoardState::from(b))),
            Command::MarkReady { match_id, player } => self
                .mark_ready(match_id, &player)
                .map(|m| Reply::Match(m.state())),
            Command::FireShot {
                match_id,
                player,
                target,
            } => self.fire_shot(match_id, &player, target).map(Reply::Shot),
            Command::Forfeit { match_id, player } => self
                .forfeit(match_id, &player)
                .map(|m| Reply::Match(m.state())),
        };
        if let Err(err) = &reply {
            if err.is_configuration_problem() {
                warn!("command failed on configuration: {}", err);
            } else {
                debug!("command rejected: {}", err);
            }
        }
        let match_id = match &reply {
            Ok(Reply::Created(id)) => Some(*id),
            _ => target,
        };
        let (events, state) = match match_id.and_then(|id| self.matches.get_mut(&id)) {
            Some(m) => (m.take_events(), Some(m.state())),
            None => (Vec::new(), None),
        };
        Dispatch {
            match_id,
            reply,
            events,
            state,
        }
    }

    fn entry(&mut self, id: MatchId) -> Result<&mut Match, GameError> {
        self.matches.get_mut(&id).ok_or(GameError::UnknownMatch(id))
    }
}
