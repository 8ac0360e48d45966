//! The match state machine: placement, battle, finished.

use core::fmt;
use core::mem;

use log::{debug, info};
use rand::Rng;

use crate::board::{Board, BoardState};
use crate::common::{Coordinate, GameError, PlacementError, ShotResult, StateError};
use crate::config::MatchConfig;
use crate::events::{Event, FinishCause};
use crate::ship::{Orientation, Ship, ShipId, ShipPlacement};
use crate::{shot, win};

/// Stable player identifier supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Registry-assigned match identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a match. No transition leaves `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchStatus {
    Placement,
    Battle,
    Finished,
}

/// A resolved shot, as reported to both players.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotOutcome {
    pub attacker: PlayerId,
    pub coordinate: Coordinate,
    pub result: ShotResult,
    pub sunk_ship: Option<Ship>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Seat {
    player: PlayerId,
    board: Board,
    ready: bool,
}

impl Seat {
    fn new(player: PlayerId, board_size: u8) -> Self {
        Seat {
            player,
            board: Board::new(board_size),
            ready: false,
        }
    }
}

/// One two-player match.
///
/// Seat 0 is the first player and takes the first turn of the battle. All
/// mutation goes through the command methods; every command checks status
/// first, then the player, then the command-specific rules, and a rejected
/// command leaves the match as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    id: MatchId,
    config: MatchConfig,
    seats: [Seat; 2],
    status: MatchStatus,
    current_turn: Option<usize>,
    winner: Option<usize>,
    finish_cause: Option<FinishCause>,
    events: Vec<Event>,
}

impl Match {
    /// Create a match in `Placement` with two empty boards.
    pub fn new(id: MatchId, config: MatchConfig, players: [PlayerId; 2]) -> Result<Self, GameError> {
        config.validate()?;
        let [first, second] = players;
        if first == second {
            return Err(GameError::DuplicatePlayer);
        }
        let n = config.board_size;
        debug!("match {}: created for {} and {}", id, first, second);
        Ok(Match {
            id,
            config,
            seats: [Seat::new(first, n), Seat::new(second, n)],
            status: MatchStatus::Placement,
            current_turn: None,
            winner: None,
            finish_cause: None,
            events: Vec::new(),
        })
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn players(&self) -> [&PlayerId; 2] {
        [&self.seats[0].player, &self.seats[1].player]
    }

    /// The player who shoots first once the battle starts.
    pub fn first_player(&self) -> &PlayerId {
        &self.seats[0].player
    }

    pub fn current_turn(&self) -> Option<&PlayerId> {
        self.current_turn.map(|i| &self.seats[i].player)
    }

    /// The most recent shot of the match, from either player.
    pub fn last_shot(&self) -> Option<ShotOutcome> {
        let turn = self.current_turn?;
        // a hit keeps the turn, a miss passes it
        self.shot_by(turn)
            .filter(|o| o.result == ShotResult::Hit)
            .or_else(|| self.shot_by(1 - turn).filter(|o| o.result == ShotResult::Miss))
    }

    /// The last shot `attacker` fired at the opposing board.
    fn shot_by(&self, attacker: usize) -> Option<ShotOutcome> {
        let board = &self.seats[1 - attacker].board;
        let coordinate = board.last_shot()?;
        let (result, sunk_ship) = match board.ship_at(coordinate) {
            Some(ship) => {
                let sunk = board.is_sunk(ship.id()).then(|| ship.clone());
                (ShotResult::Hit, sunk)
            }
            None => (ShotResult::Miss, None),
        };
        Some(ShotOutcome {
            attacker: self.seats[attacker].player.clone(),
            coordinate,
            result,
            sunk_ship,
        })
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.map(|i| &self.seats[i].player)
    }

    pub fn finish_cause(&self) -> Option<FinishCause> {
        self.finish_cause
    }

    /// The board owned by `player`.
    pub fn board(&self, player: &PlayerId) -> Option<&Board> {
        self.seat_of(player).ok().map(|i| &self.seats[i].board)
    }

    pub fn opponent_of(&self, player: &PlayerId) -> Option<&PlayerId> {
        self.seat_of(player).ok().map(|i| &self.seats[1 - i].player)
    }

    pub fn is_ready(&self, player: &PlayerId) -> bool {
        self.seat_of(player)
            .map(|i| self.seats[i].ready)
            .unwrap_or(false)
    }

    /// True once the player's board holds every ship of the fleet.
    pub fn is_fleet_complete(&self, player: &PlayerId) -> bool {
        self.seat_of(player)
            .map(|i| self.complete(i))
            .unwrap_or(false)
    }

    /// Shots `player` has fired so far.
    pub fn shots_fired(&self, player: &PlayerId) -> usize {
        self.seat_of(player)
            .map(|i| self.seats[1 - i].board.shots_received())
            .unwrap_or(0)
    }

    /// Events queued since the last [`Match::take_events`].
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain the queued events in emission order.
    pub fn take_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    /// Place ship `ship` of the fleet, or move it if it is already placed.
    pub fn place_ship(
        &mut self,
        player: &PlayerId,
        ship: ShipId,
        anchor: Coordinate,
        orientation: Orientation,
    ) -> Result<&Board, GameError> {
        let i = self.placement_seat(player)?;
        let Some(size) = self.config.fleet.size_of(ship) else {
            return Err(self.reject(i, ship, PlacementError::UnknownShip(ship)));
        };
        let proposal = ShipPlacement::new(ship, size, anchor, orientation);
        let was_complete = self.complete(i);
        let validator = self.config.validator();
        if let Err(reason) = validator.place(&mut self.seats[i].board, &proposal) {
            return Err(self.reject(i, ship, reason));
        }
        debug!(
            "match {}: {} placed ship {} at {} {:?}",
            self.id, player, ship, anchor, orientation
        );
        let cells = self.seats[i]
            .board
            .ship(ship)
            .map(|s| s.cells().to_vec())
            .unwrap_or_default();
        self.events.push(Event::PlacementAccepted {
            player: player.clone(),
            ship,
            cells,
        });
        if !was_complete && self.complete(i) {
            self.events.push(Event::PlacementComplete {
                player: player.clone(),
            });
        }
        Ok(&self.seats[i].board)
    }

    /// Take a placed ship back off the board.
    pub fn remove_ship(&mut self, player: &PlayerId, ship: ShipId) -> Result<&Board, GameError> {
        let i = self.placement_seat(player)?;
        if self.config.fleet.size_of(ship).is_none() {
            return Err(self.reject(i, ship, PlacementError::UnknownShip(ship)));
        }
        if self.seats[i].board.remove(ship).is_none() {
            return Err(self.reject(i, ship, PlacementError::ShipNotPlaced(ship)));
        }
        debug!("match {}: {} removed ship {}", self.id, player, ship);
        self.events.push(Event::ShipRemoved {
            player: player.clone(),
            ship,
        });
        Ok(&self.seats[i].board)
    }

    /// Replace the player's board with a random complete layout.
    pub fn random_placement<R: Rng + ?Sized>(
        &mut self,
        player: &PlayerId,
        rng: &mut R,
    ) -> Result<&Board, GameError> {
        let i = self.placement_seat(player)?;
        let board = self
            .config
            .generator()
            .generate(&self.config.fleet, self.config.board_size, rng)?;
        debug!("match {}: random placement for {}", self.id, player);
        self.seats[i].board = board;
        self.events.push(Event::PlacementComplete {
            player: player.clone(),
        });
        Ok(&self.seats[i].board)
    }

    /// Declare the player's fleet final. The second ready player starts the
    /// battle.
    pub fn mark_ready(&mut self, player: &PlayerId) -> Result<(), GameError> {
        let i = self.placement_seat(player)?;
        if !self.complete(i) {
            return Err(GameError::FleetIncomplete {
                placed: self.seats[i].board.occupied_cells(),
                required: self.config.fleet.total_cells(),
            });
        }
        self.seats[i].ready = true;
        debug!("match {}: {} is ready", self.id, player);
        self.events.push(Event::PlayerReady {
            player: player.clone(),
        });
        if self.seats.iter().all(|s| s.ready) {
            self.status = MatchStatus::Battle;
            self.current_turn = Some(0);
            let first_turn = self.seats[0].player.clone();
            info!("match {}: battle started, {} to fire", self.id, first_turn);
            self.events.push(Event::BattleStarted { first_turn });
        }
        Ok(())
    }

    /// Fire at `target` on the opponent's board.
    ///
    /// A hit keeps the turn, a miss passes it. A shot that destroys the
    /// defender's fleet finishes the match with the attacker as winner.
    pub fn fire_shot(&mut self, player: &PlayerId, target: Coordinate) -> Result<ShotOutcome, GameError> {
        if self.status != MatchStatus::Battle {
            return Err(GameError::GameNotInProgress);
        }
        let i = self.seat_of(player)?;
        if self.current_turn != Some(i) {
            return Err(GameError::NotYourTurn);
        }
        let defender = &mut self.seats[1 - i].board;
        let report = shot::resolve(defender, target)?;
        let destroyed = win::is_destroyed(defender);
        let outcome = ShotOutcome {
            attacker: player.clone(),
            coordinate: target,
            result: report.result,
            sunk_ship: report.sunk_ship,
        };
        debug!(
            "match {}: {} fired at {}: {:?}",
            self.id, player, target, outcome.result
        );
        self.events.push(Event::ShotFired(outcome.clone()));
        if destroyed {
            self.finish(i, FinishCause::FleetDestroyed);
        } else if outcome.result == ShotResult::Miss {
            self.current_turn = Some(1 - i);
            self.events.push(Event::TurnChanged {
                turn: self.seats[1 - i].player.clone(),
            });
        }
        Ok(outcome)
    }

    /// Concede. The other player wins.
    pub fn forfeit(&mut self, player: &PlayerId) -> Result<(), GameError> {
        if self.status == MatchStatus::Finished {
            return Err(GameError::GameNotInProgress);
        }
        let i = self.seat_of(player)?;
        debug!("match {}: {} forfeits", self.id, player);
        self.finish(1 - i, FinishCause::Forfeit);
        Ok(())
    }

    /// Persistable snapshot. Queued events are not part of it.
    pub fn state(&self) -> MatchState {
        let seat = |s: &Seat| SeatState {
            player: s.player.clone(),
            board: BoardState::from(&s.board),
            ready: s.ready,
        };
        MatchState {
            id: self.id,
            config: self.config.clone(),
            seats: [seat(&self.seats[0]), seat(&self.seats[1])],
            status: self.status,
            current_turn: self.current_turn().cloned(),
            winner: self.winner().cloned(),
            finish_cause: self.finish_cause,
        }
    }

    /// Rehydrate a match, re-checking every board and status invariant.
    pub fn from_state(state: MatchState) -> Result<Self, GameError> {
        let MatchState {
            id,
            config,
            seats: [a, b],
            status,
            current_turn,
            winner,
            finish_cause,
        } = state;
        config.validate()?;
        if a.player == b.player {
            return Err(GameError::DuplicatePlayer);
        }
        let seats = [restore_seat(&config, a)?, restore_seat(&config, b)?];
        let index_of = |p: Option<PlayerId>| -> Result<Option<usize>, GameError> {
            match p {
                None => Ok(None),
                Some(p) => seats
                    .iter()
                    .position(|s| s.player == p)
                    .map(Some)
                    .ok_or(GameError::UnknownPlayer(p)),
            }
        };
        let current_turn = index_of(current_turn)?;
        let winner = index_of(winner)?;

        let total = config.fleet.total_cells();
        let complete = |s: &Seat| s.board.occupied_cells() == total;
        let shots = seats.iter().map(|s| s.board.shots_received()).sum::<usize>();
        let inconsistent = |what: &'static str| Err(GameError::InvalidState(StateError::Inconsistent(what)));

        if seats.iter().any(|s| s.ready && !complete(s)) {
            return inconsistent("ready player with an incomplete fleet");
        }
        match status {
            MatchStatus::Placement => {
                if seats.iter().all(|s| s.ready) {
                    return inconsistent("both players ready but battle not started");
                }
                if current_turn.is_some() || winner.is_some() || finish_cause.is_some() {
                    return inconsistent("turn or result set during placement");
                }
                if shots > 0 {
                    return inconsistent("shots recorded during placement");
                }
            }
            MatchStatus::Battle => {
                if !seats.iter().all(|s| s.ready) {
                    return inconsistent("battle with a player not ready");
                }
                if current_turn.is_none() {
                    return inconsistent("battle without a current turn");
                }
                if winner.is_some() || finish_cause.is_some() {
                    return inconsistent("result set during battle");
                }
                if seats.iter().any(|s| win::is_destroyed(&s.board)) {
                    return inconsistent("destroyed fleet in an unfinished battle");
                }
            }
            MatchStatus::Finished => {
                let (Some(w), Some(cause)) = (winner, finish_cause) else {
                    return inconsistent("finished match without a result");
                };
                if cause == FinishCause::FleetDestroyed && !win::is_destroyed(&seats[1 - w].board) {
                    return inconsistent("loser's fleet is not destroyed");
                }
                let battled = seats.iter().all(|s| s.ready);
                if shots > 0 && !battled {
                    return inconsistent("shots recorded without a battle");
                }
                if current_turn.is_some() != battled {
                    return inconsistent("turn does not match whether a battle was fought");
                }
            }
        }
        debug!("match {}: restored in {:?}", id, status);
        Ok(Match {
            id,
            config,
            seats,
            status,
            current_turn,
            winner,
            finish_cause,
            events: Vec::new(),
        })
    }

    fn seat_of(&self, player: &PlayerId) -> Result<usize, GameError> {
        self.seats
            .iter()
            .position(|s| &s.player == player)
            .ok_or_else(|| GameError::UnknownPlayer(player.clone()))
    }

    /// Status, player and readiness checks shared by placement commands.
    fn placement_seat(&self, player: &PlayerId) -> Result<usize, GameError> {
        if self.status != MatchStatus::Placement {
            return Err(GameError::GameNotInProgress);
        }
        let i = self.seat_of(player)?;
        if self.seats[i].ready {
            return Err(GameError::AlreadyReady);
        }
        Ok(i)
    }

    fn complete(&self, seat: usize) -> bool {
        self.seats[seat].board.occupied_cells() == self.config.fleet.total_cells()
    }

    fn reject(&mut self, seat: usize, ship: ShipId, reason: PlacementError) -> GameError {
        debug!(
            "match {}: placement of ship {} rejected: {}",
            self.id, ship, reason
        );
        self.events.push(Event::PlacementRejected {
            player: self.seats[seat].player.clone(),
            ship,
            reason,
        });
        reason.into()
    }

    fn finish(&mut self, winner: usize, cause: FinishCause) {
        self.status = MatchStatus::Finished;
        self.winner = Some(winner);
        self.finish_cause = Some(cause);
        let winner = self.seats[winner].player.clone();
        info!("match {}: {} wins ({:?})", self.id, winner, cause);
        self.events.push(Event::MatchFinished { winner, cause });
    }
}

fn restore_seat(config: &MatchConfig, state: SeatState) -> Result<Seat, GameError> {
    if state.board.size != config.board_size {
        return Err(StateError::BoardSizeMismatch {
            expected: config.board_size,
            found: state.board.size,
        }
        .into());
    }
    let board = Board::try_from(state.board)?;
    let validator = config.validator();
    for ship in board.ships() {
        if config.fleet.size_of(ship.id()) != Some(ship.size()) {
            return Err(StateError::FleetMismatch(ship.id()).into());
        }
        validator
            .check(&board, ship)
            .map_err(|reason| StateError::IllegalPlacement {
                ship: ship.id(),
                reason,
            })?;
    }
    Ok(Seat {
        player: state.player,
        board,
        ready: state.ready,
    })
}

/// One player's persisted seat.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeatState {
    pub player: PlayerId,
    pub board: BoardState,
    pub ready: bool,
}

/// Serializable match state for the storage and transport collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchState {
    pub id: MatchId,
    pub config: MatchConfig,
    /// First player first.
    pub seats: [SeatState; 2],
    pub status: MatchStatus,
    pub current_turn: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub finish_cause: Option<FinishCause>,
}
