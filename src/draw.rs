//! Render-agnostic draw list
//!
//! The simulation never draws; each frame the frontend asks for an ordered
//! list of primitives and rasterizes them however it likes. Order in the
//! list is paint order (back to front).

use glam::Vec2;

use crate::consts::*;
use crate::sim::lane::Color;
use crate::sim::{Facing, GameState, ObstacleKind, Phase, Rect, Terrain};

/// Egg body dimensions when a prop has transformed
pub const EGG_WIDTH: f32 = 40.0;
pub const EGG_HEIGHT: f32 = 50.0;
pub const EGG_SPECKLES: usize = 8;

/// One drawable primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Full-width terrain strip
    LaneStrip { y: f32, height: f32, terrain: Terrain },
    Obstacle {
        kind: ObstacleKind,
        rect: Rect,
        color: Color,
        accent: Color,
        moving_right: bool,
    },
    /// A transformed game-over prop; `pos` is the egg's top-left
    Egg { pos: Vec2, speckles: [Vec2; EGG_SPECKLES] },
    Player { rect: Rect, facing: Facing },
    Particle { pos: Vec2, size: f32, color: Color },
    /// Bottom-of-screen warning tint, 0.0..=1.0
    DangerBand { intensity: f32 },
    ScoreBar { score: u64, level: u32, high_score: u64 },
    Letter { ch: char, pos: Vec2, color: Color },
    /// The oversized chicken that delivers the joke
    Narrator { rect: Rect },
    JokeBubble { text: String, anchor: Vec2 },
    RetryPrompt,
}

/// Speckle offsets inside the egg body, derived purely from the egg's
/// position so they stay put without consuming round randomness.
fn egg_speckles(pos: Vec2) -> [Vec2; EGG_SPECKLES] {
    let mut h = crate::position_hash(pos.x, pos.y);
    std::array::from_fn(|i| {
        h = h
            .wrapping_mul(2654435761)
            .wrapping_add(i as u32 * 7919);
        let dx = 6.0 + (h % 997) as f32 / 997.0 * (EGG_WIDTH - 12.0);
        let dy = 8.0 + ((h >> 16) % 997) as f32 / 997.0 * (EGG_HEIGHT - 16.0);
        Vec2::new(pos.x + dx, pos.y + dy)
    })
}

/// Build the frame's paint-ordered primitive list.
pub fn build_draw_list(state: &GameState, high_score: u64) -> Vec<DrawCmd> {
    let cfg = &state.cfg;
    let mut cmds = Vec::new();

    for lane in &state.lanes {
        cmds.push(DrawCmd::LaneStrip {
            y: lane.y,
            height: cfg.grid_unit,
            terrain: lane.terrain,
        });
    }

    if state.phase == Phase::Playing {
        for lane in &state.lanes {
            for ob in &lane.obstacles {
                cmds.push(DrawCmd::Obstacle {
                    kind: ob.kind,
                    rect: ob.rect,
                    color: ob.color,
                    accent: ob.accent,
                    moving_right: ob.speed > 0.0,
                });
            }
        }
        cmds.push(DrawCmd::Player {
            rect: state.player.rect(),
            facing: state.player.facing,
        });
    } else {
        // Frozen props, each either still an obstacle or already an egg
        for prop in &state.props {
            let ob = &prop.obstacle;
            if prop.is_egg {
                let pos = ob.rect.center() - Vec2::new(EGG_WIDTH / 2.0, EGG_HEIGHT / 2.0);
                cmds.push(DrawCmd::Egg {
                    pos,
                    speckles: egg_speckles(pos),
                });
            } else {
                cmds.push(DrawCmd::Obstacle {
                    kind: ob.kind,
                    rect: ob.rect,
                    color: ob.color,
                    accent: ob.accent,
                    moving_right: ob.speed > 0.0,
                });
            }
        }
    }

    for p in &state.particles {
        cmds.push(DrawCmd::Particle {
            pos: p.pos,
            size: p.size,
            color: p.color,
        });
    }

    if state.phase == Phase::Playing {
        let band_top = cfg.world_height - DANGER_BAND;
        let depth = state.player.rect().bottom() - band_top;
        if depth > 0.0 {
            cmds.push(DrawCmd::DangerBand {
                intensity: (depth / DANGER_BAND).clamp(0.0, 1.0),
            });
        }
    }

    // A record in progress shows as the best score immediately
    cmds.push(DrawCmd::ScoreBar {
        score: state.score,
        level: state.level(),
        high_score: high_score.max(state.score),
    });

    for letter in &state.letters {
        cmds.push(DrawCmd::Letter {
            ch: letter.ch,
            pos: letter.pos,
            color: letter.color,
        });
    }

    if state.phase == Phase::Waiting {
        let narrator = Rect::new(50.0, cfg.world_height - 200.0, 80.0, 80.0);
        cmds.push(DrawCmd::Narrator { rect: narrator });
        if let Some(joke) = &state.joke {
            cmds.push(DrawCmd::JokeBubble {
                text: joke.clone(),
                anchor: Vec2::new(narrator.right() + 10.0, narrator.y),
            });
        }
        if (state.tick_count / PROMPT_BLINK_TICKS) % 2 == 0 {
            cmds.push(DrawCmd::RetryPrompt);
        }
    }

    cmds
}
