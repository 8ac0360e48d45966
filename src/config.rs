//! Fleet and match configuration.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::generator::RandomPlacementGenerator;
use crate::placement::PlacementValidator;
use crate::ship::{ShipId, ShipSlot};

pub const DEFAULT_BOARD_SIZE: u8 = 10;
/// Largest supported board; columns are labelled `A`..`Z`.
pub const MAX_BOARD_SIZE: u8 = 26;
pub const DEFAULT_ATTEMPTS_PER_SHIP: u32 = 1000;
pub const DEFAULT_MAX_RESETS: u32 = 32;
/// Seed of the trial layout run by [`MatchConfig::validate`].
const FEASIBILITY_SEED: u64 = 0x5eab_a771e;

/// `count` ships of length `size`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipClass {
    pub size: u8,
    pub count: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}

impl ShipClass {
    pub fn new(size: u8, count: u8) -> Self {
        Self {
            size,
            count,
            name: None,
        }
    }

    pub fn named(size: u8, count: u8, name: impl Into<String>) -> Self {
        Self {
            size,
            count,
            name: Some(name.into()),
        }
    }

    /// Cells covered by every ship of this class.
    pub fn cells(&self) -> usize {
        self.size as usize * self.count as usize
    }
}

/// Ordered list of ship classes making up one player's fleet.
///
/// The fleet expands into a roster: ship `i` in declaration order (class by
/// class, `count` copies each) has [`ShipId`]`(i)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FleetSpec {
    classes: Vec<ShipClass>,
}

impl FleetSpec {
    pub fn new(classes: Vec<ShipClass>) -> Self {
        Self { classes }
    }

    /// The reference fleet: one 4, two 3s, three 2s, four 1s.
    pub fn standard() -> Self {
        Self::new(vec![
            ShipClass::named(4, 1, "Battleship"),
            ShipClass::named(3, 2, "Cruiser"),
            ShipClass::named(2, 3, "Destroyer"),
            ShipClass::named(1, 4, "Boat"),
        ])
    }

    pub fn classes(&self) -> &[ShipClass] {
        &self.classes
    }

    /// Total cells the whole fleet occupies.
    pub fn total_cells(&self) -> usize {
        self.classes.iter().map(ShipClass::cells).sum()
    }

    /// Number of ships in the fleet.
    pub fn ship_count(&self) -> usize {
        self.classes.iter().map(|c| c.count as usize).sum()
    }

    /// Every ship of the fleet, in id order.
    pub fn roster(&self) -> Vec<ShipSlot> {
        self.classes
            .iter()
            .flat_map(|class| core::iter::repeat(class.size).take(class.count as usize))
            .enumerate()
            .map(|(i, size)| ShipSlot {
                id: ShipId(i as u16),
                size,
            })
            .collect()
    }

    /// The class a ship id belongs to.
    pub fn class_of(&self, id: ShipId) -> Option<&ShipClass> {
        let mut remaining = id.0 as usize;
        for class in &self.classes {
            if remaining < class.count as usize {
                return Some(class);
            }
            remaining -= class.count as usize;
        }
        None
    }

    /// Length of the ship with the given id.
    pub fn size_of(&self, id: ShipId) -> Option<u8> {
        self.class_of(id).map(|c| c.size)
    }

    /// Check the fleet can be laid out on an `n×n` board.
    pub fn validate(&self, n: u8, buffer_rule: bool) -> Result<(), ConfigError> {
        if n == 0 || n > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardSize(n));
        }
        if self.classes.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }
        for (index, class) in self.classes.iter().enumerate() {
            if class.size == 0 {
                return Err(ConfigError::ZeroSize { class: index });
            }
            if class.count == 0 {
                return Err(ConfigError::ZeroCount { class: index });
            }
            if class.size > n {
                return Err(ConfigError::ShipTooLong {
                    size: class.size,
                    board_size: n,
                });
            }
        }
        if self.ship_count() > u16::MAX as usize {
            return Err(ConfigError::TooManyShips(self.ship_count()));
        }
        // With the buffer rule, a ship of length s plus its trailing buffer
        // row and column covers a 2×(s+1) footprint of an (n+1)×(n+1) grid,
        // and footprints of distinct ships are disjoint.
        let (required, available) = if buffer_rule {
            let side = n as usize + 1;
            let footprint = self
                .classes
                .iter()
                .map(|c| 2 * (c.size as usize + 1) * c.count as usize)
                .sum();
            (footprint, side * side)
        } else {
            (self.total_cells(), n as usize * n as usize)
        };
        if required > available {
            return Err(ConfigError::TooDense {
                required,
                available,
            });
        }
        Ok(())
    }
}

impl Default for FleetSpec {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<Vec<ShipClass>> for FleetSpec {
    fn from(classes: Vec<ShipClass>) -> Self {
        Self::new(classes)
    }
}

/// Configuration errors, detected before any match is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board size {0} is outside 1..=26")]
    BoardSize(u8),
    #[error("fleet has no ships")]
    EmptyFleet,
    #[error("ship class {class} has size zero")]
    ZeroSize { class: usize },
    #[error("ship class {class} has count zero")]
    ZeroCount { class: usize },
    #[error("ship of size {size} does not fit a {board_size}x{board_size} board")]
    ShipTooLong { size: u8, board_size: u8 },
    #[error("fleet has {0} ships, more than can be identified")]
    TooManyShips(usize),
    #[error("fleet too dense: needs {required} cells of room, board offers {available}")]
    TooDense { required: usize, available: usize },
    #[error("random placement needs at least one attempt per ship")]
    NoAttempts,
    #[error("fleet could not be laid out after {resets} resets")]
    Infeasible { resets: u32 },
}

/// Per-match rules.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    pub board_size: u8,
    pub fleet: FleetSpec,
    /// Ships may not touch, diagonally included.
    pub buffer_rule: bool,
    pub attempts_per_ship: u32,
    /// Full restarts of random placement before giving up.
    pub max_resets: u32,
}

impl MatchConfig {
    pub fn new(board_size: u8, fleet: FleetSpec) -> Self {
        Self {
            board_size,
            fleet,
            ..Self::default()
        }
    }

    pub fn with_buffer_rule(mut self, buffer_rule: bool) -> Self {
        self.buffer_rule = buffer_rule;
        self
    }

    /// Check the rules, then lay the fleet out once with a fixed seed. The
    /// density bound alone admits fleets no layout exists for.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attempts_per_ship == 0 {
            return Err(ConfigError::NoAttempts);
        }
        self.fleet.validate(self.board_size, self.buffer_rule)?;
        let mut rng = SmallRng::seed_from_u64(FEASIBILITY_SEED);
        self.generator()
            .generate(&self.fleet, self.board_size, &mut rng)
            .map(drop)
            .map_err(|_| ConfigError::Infeasible {
                resets: self.max_resets,
            })
    }

    pub fn validator(&self) -> PlacementValidator {
        PlacementValidator::new(self.buffer_rule)
    }

    pub fn generator(&self) -> RandomPlacementGenerator {
        RandomPlacementGenerator::new(self.attempts_per_ship, self.max_resets)
            .with_buffer_rule(self.buffer_rule)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            fleet: FleetSpec::standard(),
            buffer_rule: true,
            attempts_per_ship: DEFAULT_ATTEMPTS_PER_SHIP,
            max_resets: DEFAULT_MAX_RESETS,
        }
    }
}
