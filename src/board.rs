//! One player's grid: ship occupancy, hits and misses.

use core::fmt;

use crate::bitboard::Grid;
use crate::common::{Coordinate, StateError};
use crate::ship::{Orientation, Ship, ShipId};

/// A ship on the board together with the number of its cells hit so far.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlacedShip {
    ship: Ship,
    hits: u8,
}

impl PlacedShip {
    fn sunk(&self) -> bool {
        self.hits == self.ship.size()
    }
}

/// Main board state: ship placements, hits, misses.
///
/// Writes go through the placement validator and the shot resolver; the
/// board itself only keeps the bookkeeping consistent.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    size: u8,
    ships: Vec<PlacedShip>,
    ship_map: Grid,
    hits: Grid,
    misses: Grid,
    last_shot: Option<Coordinate>,
}

impl Board {
    /// Create an empty `size×size` board.
    pub fn new(size: u8) -> Self {
        let n = size as usize;
        Board {
            size,
            ships: Vec::new(),
            ship_map: Grid::new(n),
            hits: Grid::new(n),
            misses: Grid::new(n),
            last_shot: None,
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.in_bounds(self.size)
    }

    /// Ships in placement order.
    pub fn ships(&self) -> impl Iterator<Item = &Ship> + '_ {
        self.ships.iter().map(|p| &p.ship)
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|p| p.ship.id() == id).map(|p| &p.ship)
    }

    /// The ship covering `coord`, if any.
    pub fn ship_at(&self, coord: Coordinate) -> Option<&Ship> {
        self.position_at(coord).map(|i| &self.ships[i].ship)
    }

    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    /// True once every cell of the given ship has been hit.
    pub fn is_sunk(&self, id: ShipId) -> bool {
        self.ships
            .iter()
            .any(|p| p.ship.id() == id && p.sunk())
    }

    pub fn sunk_ships(&self) -> impl Iterator<Item = &Ship> + '_ {
        self.ships.iter().filter(|p| p.sunk()).map(|p| &p.ship)
    }

    /// Ships with at least one cell not yet hit.
    pub fn ships_afloat(&self) -> usize {
        self.ships.iter().filter(|p| !p.sunk()).count()
    }

    /// Number of cells covered by ships.
    pub fn occupied_cells(&self) -> usize {
        self.ship_map.count_ones()
    }

    pub fn is_occupied(&self, coord: Coordinate) -> bool {
        self.contains(coord) && self.bit(&self.ship_map, coord)
    }

    pub fn is_hit(&self, coord: Coordinate) -> bool {
        self.contains(coord) && self.bit(&self.hits, coord)
    }

    pub fn is_miss(&self, coord: Coordinate) -> bool {
        self.contains(coord) && self.bit(&self.misses, coord)
    }

    /// True if this cell has been fired at, hit or miss.
    pub fn has_been_fired_at(&self, coord: Coordinate) -> bool {
        self.is_hit(coord) || self.is_miss(coord)
    }

    /// Hit coordinates, row-major.
    pub fn hits(&self) -> Vec<Coordinate> {
        Self::coords(&self.hits)
    }

    /// Miss coordinates, row-major.
    pub fn misses(&self) -> Vec<Coordinate> {
        Self::coords(&self.misses)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.count_ones()
    }

    /// Hits plus misses.
    pub fn shots_received(&self) -> usize {
        self.hits.count_ones() + self.misses.count_ones()
    }

    /// The most recent shot fired at this board.
    pub fn last_shot(&self) -> Option<Coordinate> {
        self.last_shot
    }

    /// Cells not yet fired at, row-major.
    pub fn unfired_cells(&self) -> Vec<Coordinate> {
        let n = self.size;
        (1..=n)
            .flat_map(|row| (1..=n).map(move |col| Coordinate::new(row, col)))
            .filter(|c| !self.has_been_fired_at(*c))
            .collect()
    }

    /// Add a ship. The caller has validated it against this board.
    pub(crate) fn commit(&mut self, ship: Ship) {
        for c in ship.cells() {
            let (r, col) = c.index();
            // validated ships are in bounds
            let _ = self.ship_map.set(r, col);
        }
        self.ships.push(PlacedShip { ship, hits: 0 });
    }

    /// Take a ship off the board.
    pub(crate) fn remove(&mut self, id: ShipId) -> Option<Ship> {
        let pos = self.ships.iter().position(|p| p.ship.id() == id)?;
        let placed = self.ships.remove(pos);
        for c in placed.ship.cells() {
            let (r, col) = c.index();
            let _ = self.ship_map.clear(r, col);
        }
        Some(placed.ship)
    }

    /// Record a hit on an occupied, unfired cell. Returns the struck ship and
    /// whether this hit sank it.
    pub(crate) fn record_hit(&mut self, coord: Coordinate) -> Option<(&Ship, bool)> {
        let i = self.position_at(coord)?;
        let (r, c) = coord.index();
        let _ = self.hits.set(r, c);
        self.last_shot = Some(coord);
        let placed = &mut self.ships[i];
        placed.hits += 1;
        let sunk = placed.sunk();
        Some((&placed.ship, sunk))
    }

    /// Record a miss on an in-bounds cell.
    pub(crate) fn record_miss(&mut self, coord: Coordinate) {
        let (r, c) = coord.index();
        let _ = self.misses.set(r, c);
        self.last_shot = Some(coord);
    }

    fn position_at(&self, coord: Coordinate) -> Option<usize> {
        if !self.is_occupied(coord) {
            return None;
        }
        self.ships.iter().position(|p| p.ship.contains(coord))
    }

    fn bit(&self, grid: &Grid, coord: Coordinate) -> bool {
        let (r, c) = coord.index();
        grid.get(r, c).unwrap_or(false)
    }

    fn coords(grid: &Grid) -> Vec<Coordinate> {
        grid.iter_set_bits()
            .map(|(r, c)| Coordinate::from_index(r, c))
            .collect()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{\n  size: {},\n  ship_map: {:?},\n  hits: {:?},\n  misses: {:?},\n  ships: {:?}\n}}",
            self.size, self.ship_map, self.hits, self.misses, self.ships
        )
    }
}

/// Owner's view: `■` ship, `X` hit, `·` miss, `□` water.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 1..=self.size {
            write!(f, " {}", (b'A' + col - 1) as char)?;
        }
        for row in 1..=self.size {
            write!(f, "\n{:>3}", row)?;
            for col in 1..=self.size {
                let c = Coordinate::new(row, col);
                let glyph = if self.is_hit(c) {
                    'X'
                } else if self.is_miss(c) {
                    '·'
                } else if self.is_occupied(c) {
                    '■'
                } else {
                    '□'
                };
                write!(f, " {}", glyph)?;
            }
        }
        Ok(())
    }
}

/// One ship of a serialized board.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipState {
    pub id: ShipId,
    pub orientation: Orientation,
    pub cells: Vec<Coordinate>,
}

/// Serializable board state for saving or syncing games.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardState {
    pub size: u8,
    pub ships: Vec<ShipState>,
    pub hits: Vec<Coordinate>,
    pub misses: Vec<Coordinate>,
    pub last_shot: Option<Coordinate>,
}

impl From<&Board> for BoardState {
    fn from(b: &Board) -> Self {
        BoardState {
            size: b.size,
            ships: b
                .ships()
                .map(|s| ShipState {
                    id: s.id(),
                    orientation: s.orientation(),
                    cells: s.cells().to_vec(),
                })
                .collect(),
            hits: b.hits(),
            misses: b.misses(),
            last_shot: b.last_shot,
        }
    }
}

/// Rebuilds a board, rejecting geometry, overlap and shot inconsistencies.
/// The buffer rule is a match setting and is checked by the match.
impl TryFrom<BoardState> for Board {
    type Error = StateError;

    fn try_from(state: BoardState) -> Result<Self, Self::Error> {
        let mut board = Board::new(state.size);
        for s in &state.ships {
            if board.ship(s.id).is_some() {
                return Err(StateError::DuplicateShip(s.id));
            }
            let ship = Ship::from_cells(s.id, s.orientation, &s.cells, state.size)?;
            if let Some(other) = ship.cells().iter().find_map(|c| board.ship_at(*c)) {
                return Err(StateError::IllegalPlacement {
                    ship: ship.id(),
                    reason: crate::common::PlacementError::Overlap(other.id()),
                });
            }
            board.commit(ship);
        }
        for &c in &state.hits {
            if !board.contains(c) {
                return Err(StateError::ShotOutOfBounds(c));
            }
            if board.is_hit(c) {
                return Err(StateError::DuplicateShot(c));
            }
            board
                .record_hit(c)
                .ok_or(StateError::HitOnEmptyCell(c))?;
        }
        for &c in &state.misses {
            if !board.contains(c) {
                return Err(StateError::ShotOutOfBounds(c));
            }
            if board.has_been_fired_at(c) {
                return Err(StateError::DuplicateShot(c));
            }
            if board.is_occupied(c) {
                return Err(StateError::MissOnShip(c));
            }
            board.record_miss(c);
        }
        if let Some(c) = state.last_shot {
            if !board.has_been_fired_at(c) {
                return Err(StateError::Inconsistent("last shot was never fired"));
            }
        }
        board.last_shot = state.last_shot;
        Ok(board)
    }
}
