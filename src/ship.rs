//! Ship identities, orientation and cell geometry.

use core::fmt;

use crate::common::{Coordinate, PlacementError, StateError};

/// Index of a ship within a fleet roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ShipId(pub u16);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Cells run along a row, columns increasing.
    Horizontal,
    /// Cells run along a column, rows increasing.
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// One slot of a fleet roster: which ship, and how long it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipSlot {
    pub id: ShipId,
    pub size: u8,
}

/// A proposed placement, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipPlacement {
    pub id: ShipId,
    pub size: u8,
    pub anchor: Coordinate,
    pub orientation: Orientation,
}

impl ShipPlacement {
    pub fn new(id: ShipId, size: u8, anchor: Coordinate, orientation: Orientation) -> Self {
        Self {
            id,
            size,
            anchor,
            orientation,
        }
    }
}

/// A ship with concrete cells on an N×N board.
///
/// Cells are contiguous, axis-aligned and strictly increasing along the
/// orientation axis, starting at the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ship {
    id: ShipId,
    orientation: Orientation,
    cells: Vec<Coordinate>,
}

impl Ship {
    /// Lay out a ship of `size` cells from `anchor`. Fails with
    /// `OutOfBounds` if any cell would leave `[1, n]×[1, n]`.
    pub(crate) fn new(
        id: ShipId,
        size: u8,
        anchor: Coordinate,
        orientation: Orientation,
        n: u8,
    ) -> Result<Self, PlacementError> {
        if size == 0 || !anchor.in_bounds(n) {
            return Err(PlacementError::OutOfBounds);
        }
        let start = match orientation {
            Orientation::Horizontal => anchor.col,
            Orientation::Vertical => anchor.row,
        };
        // u16 so a far anchor plus a long ship cannot wrap
        if start as u16 + size as u16 - 1 > n as u16 {
            return Err(PlacementError::OutOfBounds);
        }
        let cells = (0..size)
            .map(|i| match orientation {
                Orientation::Horizontal => Coordinate::new(anchor.row, anchor.col + i),
                Orientation::Vertical => Coordinate::new(anchor.row + i, anchor.col),
            })
            .collect();
        Ok(Ship {
            id,
            orientation,
            cells,
        })
    }

    /// Rebuild a ship from persisted cells, checking the geometry invariant.
    pub(crate) fn from_cells(
        id: ShipId,
        orientation: Orientation,
        cells: &[Coordinate],
        n: u8,
    ) -> Result<Self, StateError> {
        let anchor = *cells.first().ok_or(StateError::MalformedShip(id))?;
        let size = u8::try_from(cells.len()).map_err(|_| StateError::MalformedShip(id))?;
        let ship =
            Ship::new(id, size, anchor, orientation, n).map_err(|_| StateError::MalformedShip(id))?;
        if ship.cells != cells {
            return Err(StateError::MalformedShip(id));
        }
        Ok(ship)
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn size(&self) -> u8 {
        self.cells.len() as u8
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// First cell of the ship.
    pub fn anchor(&self) -> Coordinate {
        self.cells[0]
    }

    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        self.cells.contains(&coord)
    }

    /// True if any cell of `self` is among the 8 neighbours of any cell of
    /// `other`.
    pub fn touches(&self, other: &Ship) -> bool {
        self.cells
            .iter()
            .any(|a| other.cells.iter().any(|b| a.is_adjacent(b)))
    }
}

impl fmt::Display for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ship {} ({} cells, {:?} from {})",
            self.id,
            self.size(),
            self.orientation,
            self.anchor()
        )
    }
}
