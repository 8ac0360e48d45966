//! Shot resolution against a defending board.

use crate::board::Board;
use crate::common::{Coordinate, ShotError, ShotResult};
use crate::ship::Ship;

/// What a resolved shot did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotReport {
    pub result: ShotResult,
    /// Set when this shot hit the last intact cell of a ship.
    pub sunk_ship: Option<Ship>,
}

impl ShotReport {
    pub fn is_hit(&self) -> bool {
        self.result == ShotResult::Hit
    }
}

/// Fire at `target` on `board`.
///
/// A rejected shot leaves the board untouched.
pub fn resolve(board: &mut Board, target: Coordinate) -> Result<ShotReport, ShotError> {
    if !board.contains(target) {
        return Err(ShotError::OutOfBounds(target));
    }
    if board.has_been_fired_at(target) {
        return Err(ShotError::AlreadyFired(target));
    }
    match board.record_hit(target) {
        Some((ship, sunk)) => Ok(ShotReport {
            result: ShotResult::Hit,
            sunk_ship: sunk.then(|| ship.clone()),
        }),
        None => {
            board.record_miss(target);
            Ok(ShotReport {
                result: ShotResult::Miss,
                sunk_ship: None,
            })
        }
    }
}
