//! Round lifecycle and session-wide bookkeeping
//!
//! A session owns the config, the leaderboard, and a master RNG that
//! derives per-round seeds. Rounds themselves are throwaway `GameState`
//! values; finishing one records its score and the next starts clean.

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::Config;
use crate::highscores::HighScores;
use crate::sim::GameState;

pub struct Session {
    cfg: Config,
    /// Master generator; each round gets its own seed drawn from here
    rng: Pcg32,
    scores: HighScores,
    round: u32,
}

impl Session {
    pub fn new(cfg: Config, seed: u64) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            rng: Pcg32::seed_from_u64(seed),
            scores: HighScores::new(),
            round: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn high_score(&self) -> u64 {
        self.scores.top_score().unwrap_or(0)
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    /// Start a fresh round with its own derived seed.
    pub fn start_round(&mut self) -> GameState {
        self.round += 1;
        let seed = self.rng.random();
        log::info!("round {} starting, seed {seed}", self.round);
        GameState::new(seed, self.cfg.clone())
    }

    /// Record a finished round on the leaderboard and return its score.
    pub fn finish_round(&mut self, state: &GameState) -> u64 {
        if let Some(rank) = self.scores.add_score(state.score, state.level()) {
            log::info!("round {} scored {} (rank {rank})", self.round, state.score);
        } else {
            log::info!("round {} scored {}", self.round, state.score);
        }
        state.score
    }
}
