//! Crossy Roads - an endless road-crossing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, obstacles, scroll, game-over choreography)
//! - `draw`: Per-tick ordered draw list for the rendering collaborator
//! - `config`: Validated startup configuration
//! - `session`: The "run one round" boundary and high-score tracking

pub mod config;
pub mod draw;
pub mod highscores;
pub mod jokes;
pub mod session;
pub mod sim;

pub use config::Config;
pub use highscores::HighScores;
pub use session::Session;

/// Game tuning constants
pub mod consts {
    /// Fixed simulation tick rate
    pub const TICK_HZ: u32 = 60;

    /// World dimensions (abstract units; the renderer scales them)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// One lane row / one player step
    pub const GRID_UNIT: f32 = 50.0;

    /// Player square extent
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Hitbox forgiveness: the collision box is shrunk by this much per side
    pub const HITBOX_MARGIN: f32 = 7.5;

    /// Obstacle band height inside a lane
    pub const OBSTACLE_HEIGHT: f32 = 40.0;
    pub const CAR_WIDTH: f32 = 70.0;
    pub const TRUCK_MIN_WIDTH: f32 = 110.0;
    pub const TRUCK_MAX_WIDTH: f32 = 180.0;
    /// Trains span more than the full track width
    pub const TRAIN_WIDTH: f32 = 900.0;
    pub const TRAIN_BASE_SPEED: f32 = 15.0;

    /// Minimum center-to-center spacing between road obstacles at placement
    pub const MIN_OBSTACLE_CLEARANCE: f32 = 200.0;
    /// Rejection-sampling budget per candidate obstacle
    pub const PLACEMENT_ATTEMPTS: u32 = 10;

    /// Push-scroll threshold: scrolling kicks in when the player's top edge
    /// rises above this y
    pub const SCROLL_THRESHOLD: f32 = 250.0;
    /// Auto-scroll warm-up (2 seconds of play before the world starts moving)
    pub const AUTO_SCROLL_DELAY_TICKS: u64 = 2 * TICK_HZ as u64;
    pub const MAX_AUTO_SCROLL: f32 = 3.0;

    /// Score granted per grid row of forward progress
    pub const SCORE_PER_ROW: u64 = 10;
    /// Score per difficulty level
    pub const LEVEL_THRESHOLD: u64 = 100;

    /// Game-over choreography
    pub const MIN_EXPLOSION_INTERVAL: u32 = 5;
    pub const FALLBACK_EXPLOSION_INTERVAL: u32 = 10;
    pub const INITIAL_BURST_COUNT: usize = 20;
    pub const ITEM_BURST_COUNT: usize = 15;

    /// Bottom warning band height
    pub const DANGER_BAND: f32 = 100.0;
    /// Retry prompt blink half-period (500 ms at 60 Hz)
    pub const PROMPT_BLINK_TICKS: u64 = 30;
}

/// Deterministic hash of a world position.
///
/// Used wherever a stable per-position random pattern is needed (egg
/// speckles) without touching the shared game RNG.
#[inline]
pub fn position_hash(x: f32, y: f32) -> u32 {
    let xi = x.round() as i32 as u32;
    let yi = y.round() as i32 as u32;
    xi.wrapping_mul(2654435761)
        .wrapping_add(yi.wrapping_mul(7919))
        .wrapping_mul(2654435761)
}
