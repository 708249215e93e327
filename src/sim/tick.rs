//! Fixed timestep simulation tick
//!
//! One call per frame advances the whole round: input, scroll, lane
//! recycling, obstacle motion, collision, and the game-over choreography.
//! The phase machine moves strictly forward; completion transitions fire on
//! the same tick as the event that completes them.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::fell_behind;
use super::lane::{Color, Lane, Terrain};
use super::state::{GameOverProp, GameState, Particle, Phase, ScatteredLetter};
use crate::consts::*;
use crate::jokes;

/// One discrete grid step direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDir {
    Up,
    Down,
    Left,
    Right,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Grid step while playing
    pub step: Option<StepDir>,
    /// Retry signal, honored only in `Waiting`
    pub retry: bool,
}

/// Advance the round by one fixed tick.
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.tick_count += 1;

    match state.phase {
        Phase::Playing => tick_playing(state, input),
        Phase::GameOverInit => enter_game_over(state),
        Phase::Exploding => tick_exploding(state),
        Phase::TextReveal => tick_text_reveal(state),
        Phase::Waiting => {
            if input.retry && !state.round_over {
                state.round_over = true;
                log::info!("round over, final score {}", state.score);
            }
        }
    }

    update_particles(state);
}

fn tick_playing(state: &mut GameState, input: &TickInput) {
    let world_width = state.cfg.world_width;
    let world_height = state.cfg.world_height;
    let grid = state.cfg.grid_unit;
    let threshold = state.cfg.scroll_threshold;
    let level = state.level();

    if let Some(dir) = input.step {
        let (dx, dy) = match dir {
            StepDir::Up => (0.0, -grid),
            StepDir::Down => (0.0, grid),
            StepDir::Left => (-grid, 0.0),
            StepDir::Right => (grid, 0.0),
        };
        state.player.step(dx, dy, world_width);
    }

    // Auto-scroll after the warm-up, in whole units via the fractional
    // accumulator; contributes no score.
    if state.tick_count > AUTO_SCROLL_DELAY_TICKS {
        let speed = (0.5 + 0.1 * level as f32).min(MAX_AUTO_SCROLL);
        state.scroll_accumulator += speed;
        while state.scroll_accumulator >= 1.0 {
            state.player.pos.y += 1.0;
            for lane in &mut state.lanes {
                lane.shift(1.0);
            }
            state.scroll_accumulator -= 1.0;
        }
    }

    // Push-scroll: forward progress past the threshold scrolls the world and
    // is the only source of score.
    if state.player.pos.y < threshold {
        let amount = threshold - state.player.pos.y;
        state.player.pos.y = threshold;
        state.total_scroll += amount;
        state.score = (state.total_scroll / grid).floor() as u64 * SCORE_PER_ROW;
        for lane in &mut state.lanes {
            lane.shift(amount);
        }
    }

    if fell_behind(&state.player.rect(), world_height) {
        state.phase = Phase::GameOverInit;
        return;
    }

    // Drop lanes that scrolled off the bottom, keep the frontier ahead of
    // the visible area with one grid unit of margin.
    state.lanes.retain(|lane| lane.y < world_height);
    let frontier = state
        .lanes
        .iter()
        .map(|lane| lane.y)
        .fold(f32::INFINITY, f32::min);
    if frontier > -grid {
        let terrain = Terrain::weighted(level, &mut state.rng);
        let lane = Lane::generate(frontier - grid, terrain, level, world_width, &mut state.rng);
        state.lanes.push(lane);
    }

    // Obstacle motion, then overlap against the forgiving hitbox
    let hitbox = state.player.hitbox();
    for lane in state.lanes.iter_mut() {
        lane.advance_obstacles(world_width, &mut state.rng);
        for obstacle in &lane.obstacles {
            if hitbox.intersects(&obstacle.rect) {
                state.phase = Phase::GameOverInit;
                return;
            }
        }
    }
}

/// Capture on-screen obstacles as props, size the explosion cadence, emit
/// the initial burst, hand control to `Exploding`.
fn enter_game_over(state: &mut GameState) {
    let world_height = state.cfg.world_height;

    let mut props = Vec::new();
    for lane in state.lanes.iter_mut() {
        for obstacle in lane.obstacles.drain(..) {
            if obstacle.rect.bottom() > 0.0 && obstacle.rect.y < world_height {
                props.push(GameOverProp::new(obstacle));
            }
        }
    }

    state.explosion_interval = if props.is_empty() {
        FALLBACK_EXPLOSION_INTERVAL
    } else {
        (state.cfg.explosion_window / props.len() as u32).max(MIN_EXPLOSION_INTERVAL)
    };
    state.explosion_timer = 0;
    state.explosion_index = 0;
    state.props = props;

    let center = state.player.rect().center();
    spawn_burst(
        &mut state.particles,
        &mut state.rng,
        center,
        [255, 255, 255],
        INITIAL_BURST_COUNT,
    );

    log::info!(
        "game over at score {} ({} props, interval {})",
        state.score,
        state.props.len(),
        state.explosion_interval
    );
    state.phase = Phase::Exploding;
}

/// Pop props into eggs at an even cadence; the last pop advances the phase
/// on the same tick.
fn tick_exploding(state: &mut GameState) {
    if state.explosion_index >= state.props.len() {
        // Nothing captured: pass straight through
        state.phase = Phase::TextReveal;
        state.reveal_timer = 0;
        return;
    }

    state.explosion_timer += 1;
    if state.explosion_timer >= state.explosion_interval {
        let prop = &mut state.props[state.explosion_index];
        prop.is_egg = true;
        let center = prop.obstacle.rect.center();
        let color = prop.obstacle.color;
        spawn_burst(
            &mut state.particles,
            &mut state.rng,
            center,
            color,
            ITEM_BURST_COUNT,
        );
        state.explosion_index += 1;
        state.explosion_timer = 0;

        if state.explosion_index == state.props.len() {
            state.phase = Phase::TextReveal;
            state.reveal_timer = 0;
        }
    }
}

/// Reveal one title slot per interval; spaces consume a slot silently.
/// Consuming the final slot picks the joke and enters `Waiting`.
fn tick_text_reveal(state: &mut GameState) {
    state.reveal_timer += 1;
    if state.reveal_timer % state.cfg.letter_interval != 0 {
        return;
    }

    let world_width = state.cfg.world_width;
    let world_height = state.cfg.world_height;
    let title_len = state.cfg.title.chars().count();

    match state.cfg.title.chars().nth(state.letter_index) {
        Some(ch) => {
            if ch != ' ' {
                let pos = Vec2::new(
                    state.rng.random_range(50.0..world_width - 100.0),
                    state.rng.random_range(50.0..world_height - 100.0),
                );
                let color = [
                    state.rng.random_range(100..=255),
                    state.rng.random_range(50..=255),
                    state.rng.random_range(50..=255),
                ];
                state.letters.push(ScatteredLetter { ch, pos, color });
            }
            state.letter_index += 1;
            if state.letter_index == title_len {
                finish_reveal(state);
            }
        }
        None => finish_reveal(state),
    }
}

fn finish_reveal(state: &mut GameState) {
    let joke = jokes::pick(&state.cfg.jokes, &mut state.rng).to_string();
    state.joke = Some(joke);
    state.phase = Phase::Waiting;
}

fn spawn_burst(
    particles: &mut Vec<Particle>,
    rng: &mut Pcg32,
    center: Vec2,
    color: Color,
    count: usize,
) {
    for _ in 0..count {
        particles.push(Particle::spawn(center, color, rng));
    }
}

/// Particles decay every tick regardless of phase; dead ones are pruned.
fn update_particles(state: &mut GameState) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life = particle.life.saturating_sub(1);
        particle.size = (particle.size - 0.1).max(0.0);
    }
    state.particles.retain(|p| p.life > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::lane::Obstacle;
    use rand::SeedableRng;

    /// A round with all traffic removed, so only the mechanics under test
    /// can end it.
    fn quiet_state() -> GameState {
        let mut state = GameState::new(5, Config::default());
        for lane in &mut state.lanes {
            lane.obstacles.clear();
        }
        state
    }

    fn step(dir: StepDir) -> TickInput {
        TickInput {
            step: Some(dir),
            retry: false,
        }
    }

    #[test]
    fn test_no_auto_scroll_during_warmup() {
        let mut state = quiet_state();
        let start_y = state.player.pos.y;
        for _ in 0..AUTO_SCROLL_DELAY_TICKS {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player.pos.y, start_y);
        // Two more ticks accumulate a full unit at base speed 0.5
        tick(&mut state, &TickInput::default());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.pos.y, start_y + 1.0);
    }

    #[test]
    fn test_auto_scroll_alone_scores_nothing() {
        let mut state = quiet_state();
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.score, 0);
        assert!(state.total_scroll == 0.0);
    }

    #[test]
    fn test_score_monotonic_multiple_of_ten() {
        let mut state = quiet_state();
        let mut last = 0;
        for i in 0..300 {
            // Push forward most ticks, wander sideways occasionally
            let dir = if i % 7 == 0 { StepDir::Left } else { StepDir::Up };
            tick(&mut state, &step(dir));
            assert_eq!(state.phase, Phase::Playing);
            assert!(state.score >= last);
            assert_eq!(state.score % SCORE_PER_ROW, 0);
            last = state.score;
            // Keep freshly spawned traffic out of the way; only the scroll
            // mechanics are under test here
            for lane in &mut state.lanes {
                lane.obstacles.clear();
            }
        }
        assert!(last > 0, "forward progress must score");
    }

    #[test]
    fn test_push_scroll_clamps_player_to_threshold() {
        let mut state = quiet_state();
        let threshold = state.cfg.scroll_threshold;
        for _ in 0..12 {
            tick(&mut state, &step(StepDir::Up));
            assert!(state.player.pos.y >= threshold);
        }
        assert!(state.total_scroll > 0.0);
    }

    #[test]
    fn test_lane_count_stays_topped_up() {
        let mut state = quiet_state();
        let initial = state.lanes.len();
        for _ in 0..500 {
            tick(&mut state, &step(StepDir::Up));
            assert_eq!(state.phase, Phase::Playing);
            // Recycling may be one lane mid-swap but never drains the world
            assert!(state.lanes.len() + 1 >= initial);
            let frontier = state
                .lanes
                .iter()
                .map(|l| l.y)
                .fold(f32::INFINITY, f32::min);
            assert!(frontier <= 0.0);
            for lane in &mut state.lanes {
                lane.obstacles.clear();
            }
        }
    }

    #[test]
    fn test_collision_transitions_on_exact_tick() {
        let mut state = quiet_state();
        let mut rng = Pcg32::seed_from_u64(9);
        let center = state.player.rect().center();
        // Park a car right on the player
        let car = Obstacle::car(center.x - 35.0, center.y - 20.0, 3.0, &mut rng);
        state.lanes[0].obstacles.push(car);

        assert_eq!(state.phase, Phase::Playing);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, Phase::GameOverInit);
        // Next tick runs Init: props captured, burst emitted, Exploding
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, Phase::Exploding);
        assert_eq!(state.props.len(), 1);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_fell_behind_is_fatal() {
        let mut state = quiet_state();
        state.player.pos.y = state.cfg.world_height - PLAYER_SIZE;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, Phase::GameOverInit);
    }

    #[test]
    fn test_grazing_overlap_forgiven_by_hitbox() {
        let mut state = quiet_state();
        let mut rng = Pcg32::seed_from_u64(9);
        let player = state.player.rect();
        // Touches the full box but not the shrunk hitbox; parked (speed
        // epsilon keeps it effectively still for one tick)
        let car = Obstacle::car(player.right() - 5.0, player.y, 0.001, &mut rng);
        state.lanes[0].obstacles.push(car);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_explosion_cadence_three_props() {
        let mut state = quiet_state();
        let mut rng = Pcg32::seed_from_u64(1);
        // Three visible obstacles, one on the player to end the round
        let center = state.player.rect().center();
        let y5 = state.lanes[5].y + 5.0;
        let y6 = state.lanes[6].y + 5.0;
        state.lanes[0]
            .obstacles
            .push(Obstacle::car(center.x - 20.0, center.y - 20.0, 0.001, &mut rng));
        state.lanes[5]
            .obstacles
            .push(Obstacle::car(100.0, y5, 0.001, &mut rng));
        state.lanes[6]
            .obstacles
            .push(Obstacle::car(400.0, y6, 0.001, &mut rng));

        tick(&mut state, &TickInput::default()); // Playing -> GameOverInit
        tick(&mut state, &TickInput::default()); // Init -> Exploding
        assert_eq!(state.phase, Phase::Exploding);
        assert_eq!(state.props.len(), 3);
        assert_eq!(state.explosion_interval, 50);

        // 150 ticks after entering Exploding: all three popped, phase moved
        // on the final tick
        for i in 1..=150u32 {
            tick(&mut state, &TickInput::default());
            let expected_eggs = (i / 50) as usize;
            let eggs = state.props.iter().filter(|p| p.is_egg).count();
            assert_eq!(eggs, expected_eggs, "at tick {i}");
        }
        assert!(state.props.iter().all(|p| p.is_egg));
        assert_eq!(state.phase, Phase::TextReveal);
    }

    #[test]
    fn test_empty_capture_skips_exploding() {
        let mut state = quiet_state();
        state.player.pos.y = state.cfg.world_height - PLAYER_SIZE;
        tick(&mut state, &TickInput::default()); // -> GameOverInit
        tick(&mut state, &TickInput::default()); // Init: zero props
        assert_eq!(state.phase, Phase::Exploding);
        assert_eq!(state.explosion_interval, FALLBACK_EXPLOSION_INTERVAL);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, Phase::TextReveal);
    }

    fn reveal_state(title: &str) -> GameState {
        let mut cfg = Config::default();
        cfg.title = title.to_string();
        let mut state = GameState::new(3, cfg);
        state.phase = Phase::TextReveal;
        state.reveal_timer = 0;
        state
    }

    #[test]
    fn test_text_reveal_nine_letters_no_spaces() {
        let mut state = reveal_state("CLUCKED!!");
        for _ in 0..179 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, Phase::TextReveal);
        tick(&mut state, &TickInput::default());
        // Completes at exactly tick 180 with all nine letters and a joke
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.letters.len(), 9);
        let joke = state.joke.as_deref().expect("joke chosen");
        assert!(state.cfg.jokes.iter().any(|j| j == joke));
    }

    #[test]
    fn test_text_reveal_skips_spaces() {
        // "GAME OVER": nine slots, eight visible letters; the space consumes
        // its slot, so the reveal still completes at exactly tick 180
        let mut state = reveal_state("GAME OVER");
        for _ in 0..179 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, Phase::TextReveal);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.letters.len(), 8);
        assert!(state.letters.iter().all(|l| l.ch != ' '));
    }

    #[test]
    fn test_scattered_letters_in_bounds() {
        let mut state = reveal_state("GAME OVER");
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        for letter in &state.letters {
            assert!(letter.pos.x >= 50.0 && letter.pos.x <= state.cfg.world_width - 100.0);
            assert!(letter.pos.y >= 50.0 && letter.pos.y <= state.cfg.world_height - 100.0);
        }
    }

    #[test]
    fn test_waiting_only_exits_on_retry() {
        let mut state = reveal_state("X");
        for _ in 0..20 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, Phase::Waiting);
        for _ in 0..100 {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.round_over);
        tick(
            &mut state,
            &TickInput {
                step: None,
                retry: true,
            },
        );
        assert!(state.round_over);
        assert_eq!(state.phase, Phase::Waiting);
    }

    #[test]
    fn test_particles_decay_and_prune() {
        let mut state = quiet_state();
        state.player.pos.y = state.cfg.world_height - PLAYER_SIZE;
        tick(&mut state, &TickInput::default());
        tick(&mut state, &TickInput::default()); // burst emitted
        let count = state.particles.len();
        assert_eq!(count, INITIAL_BURST_COUNT);
        // Max particle life is 60 ticks; all gone afterwards
        for _ in 0..61 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.particles.is_empty());
    }
}
