//! Startup configuration
//!
//! Everything here is validated once at startup; the simulation assumes a
//! valid config and never re-checks. Defaults come from `consts`; a JSON
//! file can override them.

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::*;
use crate::jokes;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world_width: f32,
    pub world_height: f32,
    pub grid_unit: f32,
    /// Player top edge above this y triggers push-scroll
    pub scroll_threshold: f32,
    /// Target total duration of the egg-pop sequence, in ticks
    pub explosion_window: u32,
    /// Ticks between scattered title letters
    pub letter_interval: u32,
    /// Title revealed letter-by-letter after a round ends
    pub title: String,
    /// Joke pool for the narrator; must not be empty
    pub jokes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            grid_unit: GRID_UNIT,
            scroll_threshold: SCROLL_THRESHOLD,
            explosion_window: 150,
            letter_interval: 20,
            title: "GAME OVER".to_string(),
            jokes: jokes::default_pool(),
        }
    }
}

impl Config {
    /// Fail fast on configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.grid_unit > 0.0, "grid unit must be positive");
        ensure!(
            self.world_width > 0.0 && self.world_height > 0.0,
            "world dimensions must be positive"
        );
        ensure!(
            self.world_height >= 4.0 * self.grid_unit,
            "world must fit at least the safe starting zone"
        );
        ensure!(
            self.scroll_threshold > 0.0 && self.scroll_threshold < self.world_height,
            "scroll threshold must lie inside the world"
        );
        ensure!(self.explosion_window > 0, "explosion window must be positive");
        ensure!(self.letter_interval > 0, "letter interval must be positive");
        ensure!(!self.title.trim().is_empty(), "title must not be empty");
        ensure!(!self.jokes.is_empty(), "joke pool must not be empty");
        Ok(())
    }

    /// Load overrides from a JSON file and validate the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        log::info!("loaded config overrides from {}", path.display());
        Ok(cfg)
    }
}
