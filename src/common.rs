//! Common types for the engine: coordinates, shot results and errors.

use core::fmt;
use core::str::FromStr;
use thiserror::Error;

use crate::config::ConfigError;
use crate::game::{MatchId, PlayerId};
use crate::ship::ShipId;

/// A cell on a board, 1-indexed as `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub row: u8,
    pub col: u8,
}

impl Coordinate {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// True if the coordinate lies in `[1, n]×[1, n]`.
    pub fn in_bounds(&self, n: u8) -> bool {
        (1..=n).contains(&self.row) && (1..=n).contains(&self.col)
    }

    /// Zero-based `(row, col)` for indexing a bit grid. Only meaningful for
    /// in-bounds coordinates.
    #[inline]
    pub(crate) fn index(&self) -> (usize, usize) {
        (self.row as usize - 1, self.col as usize - 1)
    }

    /// Inverse of [`Coordinate::index`].
    #[inline]
    pub(crate) fn from_index(row: usize, col: usize) -> Self {
        Self::new(row as u8 + 1, col as u8 + 1)
    }

    /// True if `other` is one of the 8 cells surrounding `self`.
    pub fn is_adjacent(&self, other: &Coordinate) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr.max(dc) == 1
    }
}

impl From<(u8, u8)> for Coordinate {
    fn from((row, col): (u8, u8)) -> Self {
        Self::new(row, col)
    }
}

/// Renders as column letter followed by row number, e.g. `C7`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (1..=26).contains(&self.col) {
            write!(f, "{}{}", (b'A' + self.col - 1) as char, self.row)
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

/// Error parsing a coordinate such as `B10`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid coordinate `{0}`")]
pub struct ParseCoordinateError(String);

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordinateError(s.to_string());
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return Err(err());
        }
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let row: u8 = digits.parse().map_err(|_| err())?;
        if row == 0 {
            return Err(err());
        }
        Ok(Coordinate::new(row, letter as u8 - b'A' + 1))
    }
}

/// Result of a resolved shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotResult {
    Hit,
    Miss,
}

/// Why a single ship placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlacementError {
    #[error("ship placement is out of bounds")]
    OutOfBounds,
    #[error("ship placement overlaps ship {0}")]
    Overlap(ShipId),
    #[error("ship placement touches ship {0}")]
    AdjacencyViolation(ShipId),
    #[error("ship {0} is not part of the fleet")]
    UnknownShip(ShipId),
    #[error("ship {0} is not on the board")]
    ShipNotPlaced(ShipId),
}

/// Why a shot was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShotError {
    #[error("target {0} is out of bounds")]
    OutOfBounds(Coordinate),
    #[error("target {0} was already fired at")]
    AlreadyFired(Coordinate),
}

/// A persisted board or match that violates an engine invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("board size {found} does not match configured size {expected}")]
    BoardSizeMismatch { expected: u8, found: u8 },
    #[error("ship {0} does not form a straight contiguous in-bounds line")]
    MalformedShip(ShipId),
    #[error("ship {0} appears more than once")]
    DuplicateShip(ShipId),
    #[error("ship {0} does not match the fleet")]
    FleetMismatch(ShipId),
    #[error("ship {ship} is placed illegally: {reason}")]
    IllegalPlacement { ship: ShipId, reason: PlacementError },
    #[error("shot at {0} is out of bounds")]
    ShotOutOfBounds(Coordinate),
    #[error("hit recorded on empty cell {0}")]
    HitOnEmptyCell(Coordinate),
    #[error("miss recorded on occupied cell {0}")]
    MissOnShip(Coordinate),
    #[error("cell {0} recorded more than once")]
    DuplicateShot(Coordinate),
    #[error("inconsistent match: {0}")]
    Inconsistent(&'static str),
}

/// Errors returned by match commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("coordinate is out of bounds")]
    OutOfBounds,
    #[error("placement overlaps ship {0}")]
    Overlap(ShipId),
    #[error("placement touches ship {0}")]
    AdjacencyViolation(ShipId),
    #[error("no legal random placement found after {resets} full resets")]
    PlacementInfeasible { resets: u32 },
    #[error("fleet incomplete: {placed} of {required} cells placed")]
    FleetIncomplete { placed: usize, required: usize },
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("{0} was already fired at")]
    AlreadyFired(Coordinate),
    #[error("the match is not accepting this command in its current status")]
    GameNotInProgress,
    #[error("unknown match {0}")]
    UnknownMatch(MatchId),
    #[error("ship {0} is not part of the fleet")]
    UnknownShip(ShipId),
    #[error("ship {0} is not on the board")]
    ShipNotPlaced(ShipId),
    #[error("{0} is not a player in this match")]
    UnknownPlayer(PlayerId),
    #[error("player is already ready")]
    AlreadyReady,
    #[error("a match needs two distinct players")]
    DuplicatePlayer,
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("invalid state: {0}")]
    InvalidState(#[from] StateError),
}

impl GameError {
    /// Errors that point at the match configuration rather than at a player's
    /// input.
    pub fn is_configuration_problem(&self) -> bool {
        matches!(
            self,
            GameError::PlacementInfeasible { .. } | GameError::InvalidConfig(_)
        )
    }
}

impl From<PlacementError> for GameError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::OutOfBounds => GameError::OutOfBounds,
            PlacementError::Overlap(id) => GameError::Overlap(id),
            PlacementError::AdjacencyViolation(id) => GameError::AdjacencyViolation(id),
            PlacementError::UnknownShip(id) => GameError::UnknownShip(id),
            PlacementError::ShipNotPlaced(id) => GameError::ShipNotPlaced(id),
        }
    }
}

impl From<ShotError> for GameError {
    fn from(err: ShotError) -> Self {
        match err {
            ShotError::OutOfBounds(_) => GameError::OutOfBounds,
            ShotError::AlreadyFired(c) => GameError::AlreadyFired(c),
        }
    }
}
