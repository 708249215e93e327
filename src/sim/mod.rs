//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - World generation and difficulty scaling
//! - Obstacle movement, wrapping, and collision
//! - Scrolling, scoring, and the game-over choreography
//!
//! Design principles:
//! - Fixed timestep only
//! - Seeded RNG only (reproducible rounds)
//! - No rendering or platform dependencies

pub mod collision;
pub mod lane;
pub mod state;
pub mod tick;

pub use collision::{Rect, fell_behind};
pub use lane::{Color, Lane, Obstacle, ObstacleKind, Terrain};
pub use state::{Facing, GameOverProp, GameState, Particle, Phase, Player, ScatteredLetter};
pub use tick::{StepDir, TickInput, tick};
