//! Game state and core simulation types
//!
//! Everything one round mutates lives here; a new round is a fresh
//! `GameState`. The round RNG is owned by the state and threaded through
//! every generation call, so a round is reproducible from its seed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::lane::{Color, Lane, Obstacle, Terrain};
use crate::config::Config;
use crate::consts::*;

/// Current phase of a round.
///
/// Strict forward order; the only way out of `Waiting` is the external
/// retry signal, which ends the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Normal gameplay
    Playing,
    /// Collision/fall detected; capture props and set up the sequence
    GameOverInit,
    /// Obstacles pop into eggs one at a time
    Exploding,
    /// Title letters scatter across the screen
    TextReveal,
    /// Terminal: narrator, joke, blinking retry prompt
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

/// The player-controlled character
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub facing: Facing,
}

impl Player {
    pub fn new(world_width: f32, world_height: f32, grid_unit: f32) -> Self {
        Self {
            pos: Vec2::new(
                world_width / 2.0,
                world_height - grid_unit - 5.0,
            ),
            facing: Facing::Right,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PLAYER_SIZE, PLAYER_SIZE)
    }

    /// Forgiving collision region
    pub fn hitbox(&self) -> Rect {
        self.rect().shrink(HITBOX_MARGIN)
    }

    /// One discrete grid step; horizontal position clamps to the world.
    pub fn step(&mut self, dx: f32, dy: f32, world_width: f32) {
        self.pos.x += dx;
        self.pos.y += dy;
        if dx > 0.0 {
            self.facing = Facing::Right;
        } else if dx < 0.0 {
            self.facing = Facing::Left;
        }
        self.pos.x = self.pos.x.clamp(0.0, world_width - PLAYER_SIZE);
    }
}

/// A short-lived visual effect square
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// Remaining life in ticks; non-positive particles are pruned
    pub life: u32,
    /// Shrinks over life, floored at zero
    pub size: f32,
}

impl Particle {
    pub fn spawn(center: Vec2, color: Color, rng: &mut Pcg32) -> Self {
        Self {
            pos: center,
            vel: Vec2::new(
                rng.random_range(-5.0..=5.0),
                rng.random_range(-5.0..=5.0),
            ),
            color,
            life: rng.random_range(30..=60),
            size: rng.random_range(4.0..=8.0),
        }
    }
}

/// An obstacle captured at the moment of death, later transformed into an
/// egg by the choreographer.
#[derive(Debug, Clone)]
pub struct GameOverProp {
    pub obstacle: Obstacle,
    pub is_egg: bool,
}

impl GameOverProp {
    pub fn new(obstacle: Obstacle) -> Self {
        Self {
            obstacle,
            is_egg: false,
        }
    }
}

/// One revealed title character at a random position/color
#[derive(Debug, Clone)]
pub struct ScatteredLetter {
    pub ch: char,
    pub pos: Vec2,
    pub color: Color,
}

/// Complete per-round state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Round seed for reproducibility
    pub seed: u64,
    pub cfg: Config,
    /// The single shared generator for all round randomness
    pub rng: Pcg32,
    /// Ticks since round start
    pub tick_count: u64,
    pub phase: Phase,
    pub player: Player,
    /// Bottom-to-top world strips; frontier is the most negative `y`
    pub lanes: Vec<Lane>,
    /// Forward progress in world units (push-scroll only)
    pub total_scroll: f32,
    /// Fractional auto-scroll carry so integer steps apply without bias
    pub scroll_accumulator: f32,
    pub score: u64,
    pub particles: Vec<Particle>,
    /// Owned by the choreographer from `GameOverInit` onward
    pub props: Vec<GameOverProp>,
    pub letters: Vec<ScatteredLetter>,
    pub joke: Option<String>,
    /// Set when the retry signal ends the round
    pub round_over: bool,
    // Choreography timers
    pub explosion_interval: u32,
    pub explosion_timer: u32,
    pub explosion_index: usize,
    pub reveal_timer: u32,
    pub letter_index: usize,
}

impl GameState {
    /// Create a fresh round. The config must already be validated.
    pub fn new(seed: u64, cfg: Config) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let rows = (cfg.world_height / cfg.grid_unit) as usize + 2;
        let mut lanes = Vec::with_capacity(rows);
        for i in 0..rows {
            let y = cfg.world_height - (i as f32 + 1.0) * cfg.grid_unit;
            // Safe starting zone at the bottom of the world
            let terrain = if i < 4 {
                Terrain::Grass
            } else {
                Terrain::weighted(0, &mut rng)
            };
            lanes.push(Lane::generate(y, terrain, 0, cfg.world_width, &mut rng));
        }

        let player = Player::new(cfg.world_width, cfg.world_height, cfg.grid_unit);

        Self {
            seed,
            cfg,
            rng,
            tick_count: 0,
            phase: Phase::Playing,
            player,
            lanes,
            total_scroll: 0.0,
            scroll_accumulator: 0.0,
            score: 0,
            particles: Vec::new(),
            props: Vec::new(),
            letters: Vec::new(),
            joke: None,
            round_over: false,
            explosion_interval: 0,
            explosion_timer: 0,
            explosion_index: 0,
            reveal_timer: 0,
            letter_index: 0,
        }
    }

    /// Difficulty level, derived from score and never stored
    #[inline]
    pub fn level(&self) -> u32 {
        (self.score / LEVEL_THRESHOLD) as u32
    }

    /// Number of lanes a fresh round starts with
    pub fn initial_lane_count(cfg: &Config) -> usize {
        (cfg.world_height / cfg.grid_unit) as usize + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_round_layout() {
        let cfg = Config::default();
        let state = GameState::new(42, cfg.clone());
        assert_eq!(state.lanes.len(), GameState::initial_lane_count(&cfg));
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.score, 0);
        // Bottom four lanes are the safe starting zone
        for lane in &state.lanes[..4] {
            assert_eq!(lane.terrain, Terrain::Grass);
        }
        // Frontier extends past the top with margin
        let frontier = state.lanes.iter().map(|l| l.y).fold(f32::INFINITY, f32::min);
        assert!(frontier <= -cfg.grid_unit);
    }

    #[test]
    fn test_same_seed_same_world() {
        let cfg = Config::default();
        let a = GameState::new(7, cfg.clone());
        let b = GameState::new(7, cfg);
        for (la, lb) in a.lanes.iter().zip(&b.lanes) {
            assert_eq!(la.terrain, lb.terrain);
            assert_eq!(la.obstacles.len(), lb.obstacles.len());
            for (oa, ob) in la.obstacles.iter().zip(&lb.obstacles) {
                assert_eq!(oa.rect, ob.rect);
                assert_eq!(oa.speed, ob.speed);
            }
        }
    }

    #[test]
    fn test_player_clamps_to_world() {
        let cfg = Config::default();
        let mut state = GameState::new(1, cfg);
        for _ in 0..50 {
            state.player.step(-GRID_UNIT, 0.0, WORLD_WIDTH);
        }
        assert_eq!(state.player.pos.x, 0.0);
        assert_eq!(state.player.facing, Facing::Left);
        for _ in 0..50 {
            state.player.step(GRID_UNIT, 0.0, WORLD_WIDTH);
        }
        assert_eq!(state.player.pos.x, WORLD_WIDTH - PLAYER_SIZE);
        assert_eq!(state.player.facing, Facing::Right);
    }

    #[test]
    fn test_level_derived_from_score() {
        let cfg = Config::default();
        let mut state = GameState::new(1, cfg);
        assert_eq!(state.level(), 0);
        state.score = 250;
        assert_eq!(state.level(), 2);
        state.score = 990;
        assert_eq!(state.level(), 9);
    }
}
