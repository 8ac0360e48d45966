//! Random fleet layout.
//!
//! Ships are placed largest first. Each ship gets a fixed budget of random
//! anchor/orientation draws; a draw is accepted when every cell is in bounds
//! and not blocked. Committed ships block their cells and, under the buffer
//! rule, their 8-neighbourhood. If any ship runs out of draws the whole
//! layout is thrown away and started again, up to `max_resets` times.

use log::{debug, warn};
use rand::Rng;

use crate::bitboard::Grid;
use crate::board::Board;
use crate::common::{Coordinate, GameError};
use crate::config::{FleetSpec, DEFAULT_ATTEMPTS_PER_SHIP, DEFAULT_MAX_RESETS};
use crate::ship::{Orientation, Ship, ShipId, ShipSlot};

/// Randomized full-fleet placement with bounded retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomPlacementGenerator {
    attempts_per_ship: u32,
    max_resets: u32,
    buffer_rule: bool,
}

impl RandomPlacementGenerator {
    pub fn new(attempts_per_ship: u32, max_resets: u32) -> Self {
        Self {
            attempts_per_ship,
            max_resets,
            buffer_rule: true,
        }
    }

    pub fn with_buffer_rule(mut self, buffer_rule: bool) -> Self {
        self.buffer_rule = buffer_rule;
        self
    }

    /// Lay out the whole fleet, restarting from an empty board up to
    /// `max_resets` times.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        fleet: &FleetSpec,
        board_size: u8,
        rng: &mut R,
    ) -> Result<Board, GameError> {
        for reset in 0..=self.max_resets {
            match self.generate_once(fleet, board_size, rng) {
                Ok(board) => {
                    if reset > 0 {
                        debug!("random placement succeeded after {} resets", reset);
                    }
                    return Ok(board);
                }
                Err(id) => debug!("random placement stuck on ship {}, resetting", id),
            }
        }
        warn!(
            "random placement gave up after {} resets ({} ships on {}x{})",
            self.max_resets,
            fleet.ship_count(),
            board_size,
            board_size
        );
        Err(GameError::PlacementInfeasible {
            resets: self.max_resets,
        })
    }

    /// One pass over the fleet. On failure returns the ship that could not
    /// be placed.
    pub fn generate_once<R: Rng + ?Sized>(
        &self,
        fleet: &FleetSpec,
        board_size: u8,
        rng: &mut R,
    ) -> Result<Board, ShipId> {
        let mut board = Board::new(board_size);
        let mut blocked = Grid::new(board_size as usize);
        let mut roster: Vec<ShipSlot> = fleet.roster();
        // stable, so equal sizes keep id order
        roster.sort_by(|a, b| b.size.cmp(&a.size));

        for slot in roster {
            let ship = self
                .draw(&slot, board_size, &blocked, rng)
                .ok_or(slot.id)?;
            for c in ship.cells() {
                let (r, col) = c.index();
                let marked = if self.buffer_rule {
                    blocked.set_with_neighbors(r, col)
                } else {
                    blocked.set(r, col)
                };
                debug_assert!(marked.is_ok());
            }
            board.commit(ship);
        }
        Ok(board)
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        slot: &ShipSlot,
        n: u8,
        blocked: &Grid,
        rng: &mut R,
    ) -> Option<Ship> {
        if n == 0 {
            return None;
        }
        for _ in 0..self.attempts_per_ship {
            let anchor = Coordinate::new(rng.random_range(1..=n), rng.random_range(1..=n));
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let Ok(ship) = Ship::new(slot.id, slot.size, anchor, orientation, n) else {
                continue;
            };
            let free = ship.cells().iter().all(|c| {
                let (r, col) = c.index();
                !blocked.get(r, col).unwrap_or(true)
            });
            if free {
                return Some(ship);
            }
        }
        None
    }
}

impl Default for RandomPlacementGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS_PER_SHIP, DEFAULT_MAX_RESETS)
    }
}
