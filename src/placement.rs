//! Legality of a single ship placement.

use crate::board::Board;
use crate::common::PlacementError;
use crate::ship::{Ship, ShipPlacement};

/// Checks proposed placements against a board.
///
/// The rules are bounds, no overlap with another ship and, when the buffer
/// rule is on, no contact with another ship in any of the 8 directions. A
/// ship already on the board under the same id is ignored, so a placement
/// can be re-validated as a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementValidator {
    buffer_rule: bool,
}

impl PlacementValidator {
    pub fn new(buffer_rule: bool) -> Self {
        Self { buffer_rule }
    }

    pub fn buffer_rule(&self) -> bool {
        self.buffer_rule
    }

    /// Compute the ship's cells and check them. Does not touch the board.
    pub fn validate(&self, board: &Board, proposal: &ShipPlacement) -> Result<Ship, PlacementError> {
        let ship = Ship::new(
            proposal.id,
            proposal.size,
            proposal.anchor,
            proposal.orientation,
            board.size(),
        )?;
        self.check(board, &ship)?;
        Ok(ship)
    }

    /// Validate and commit. An already-placed ship with the same id is moved.
    pub fn place(&self, board: &mut Board, proposal: &ShipPlacement) -> Result<(), PlacementError> {
        let ship = self.validate(board, proposal)?;
        board.remove(ship.id());
        board.commit(ship);
        Ok(())
    }

    /// Check an already laid-out ship against every other ship on the board.
    pub(crate) fn check(&self, board: &Board, ship: &Ship) -> Result<(), PlacementError> {
        let id = ship.id();
        for other in board.ships().filter(|other| other.id() != id) {
            if ship.cells().iter().any(|c| other.contains(*c)) {
                return Err(PlacementError::Overlap(other.id()));
            }
        }
        if self.buffer_rule {
            for other in board.ships().filter(|other| other.id() != id) {
                if ship.touches(other) {
                    return Err(PlacementError::AdjacencyViolation(other.id()));
                }
            }
        }
        Ok(())
    }
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::new(true)
    }
}
