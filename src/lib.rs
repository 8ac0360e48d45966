mod bitboard;
mod board;
#[cfg(feature = "serde")]
pub mod codec;
mod common;
mod config;
mod events;
mod game;
mod generator;
mod logging;
mod placement;
mod registry;
mod ship;
pub mod shot;
pub mod win;

pub use bitboard::{BitGrid, BitGridError, Grid};
pub use board::*;
pub use common::*;
pub use config::*;
pub use events::*;
pub use game::*;
pub use generator::RandomPlacementGenerator;
pub use logging::init_logging;
pub use placement::PlacementValidator;
pub use registry::*;
pub use ship::*;
pub use shot::{resolve as resolve_shot, ShotReport};
pub use win::is_destroyed;
