//! Lane and obstacle generation
//!
//! Each lane populates itself at construction time from the shared round RNG,
//! given the difficulty level active at spawn. Road lanes use rejection
//! sampling to keep obstacles apart; rail lanes carry a single full-width
//! train; grass is safe.

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::collision::Rect;
use crate::consts::*;

/// RGB color triple handed to the renderer
pub type Color = [u8; 3];

const CAR_COLORS: &[Color] = &[
    [220, 20, 60],
    [0, 100, 255],
    [255, 215, 0],
    [255, 69, 0],
    [148, 0, 211],
    [50, 205, 50],
    [0, 255, 255],
];

const TRUCK_COLORS: &[Color] = &[
    [220, 220, 220],
    [255, 250, 240],
    [47, 79, 79],
    [139, 69, 19],
    [70, 130, 180],
];

const TRUCK_CAB: Color = [30, 60, 150];
const TRAIN_BODY: Color = [40, 40, 40];
const TRAIN_STRIPE: Color = [220, 20, 20];

/// Discrete base speed magnitudes/directions for road lanes
const BASE_SPEEDS: &[f32] = &[-5.0, -4.0, -3.0, 3.0, 4.0, 5.0];

/// Lane terrain category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Grass,
    Road,
    Rail,
}

impl Terrain {
    /// Weighted terrain draw for a newly spawned frontier lane.
    ///
    /// Rail grows with level (capped at 0.3), grass shrinks (floored at
    /// 0.1), road fills the remaining probability mass.
    pub fn weighted(level: u32, rng: &mut Pcg32) -> Self {
        let rail_chance = (0.1 + 0.02 * level as f32).min(0.3);
        let grass_chance = (0.4 - 0.03 * level as f32).max(0.1);
        let roll: f32 = rng.random_range(0.0..1.0);
        if roll < rail_chance {
            Terrain::Rail
        } else if roll < 1.0 - grass_chance {
            Terrain::Road
        } else {
            Terrain::Grass
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Car,
    Truck,
    Train,
}

/// A moving entity confined to one lane's vertical band.
///
/// Wraps around the horizontal edges instead of despawning; direction and
/// speed never change after creation.
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub rect: Rect,
    /// Signed horizontal speed, units per tick; never zero
    pub speed: f32,
    /// Visual variant, chosen at creation and immutable after
    pub color: Color,
    /// Secondary color (car roof, truck cab, train stripe)
    pub accent: Color,
}

impl Obstacle {
    pub(crate) fn car(x: f32, y: f32, speed: f32, rng: &mut Pcg32) -> Self {
        let color = *CAR_COLORS.choose(rng).unwrap_or(&CAR_COLORS[0]);
        let accent = color.map(|c| c.saturating_add(40));
        Self {
            kind: ObstacleKind::Car,
            rect: Rect::new(x, y, CAR_WIDTH, OBSTACLE_HEIGHT),
            speed,
            color,
            accent,
        }
    }

    fn truck(x: f32, y: f32, width: f32, speed: f32, rng: &mut Pcg32) -> Self {
        let color = *TRUCK_COLORS.choose(rng).unwrap_or(&TRUCK_COLORS[0]);
        Self {
            kind: ObstacleKind::Truck,
            rect: Rect::new(x, y, width, OBSTACLE_HEIGHT),
            speed,
            color,
            accent: TRUCK_CAB,
        }
    }

    fn train(x: f32, y: f32, speed: f32) -> Self {
        Self {
            kind: ObstacleKind::Train,
            rect: Rect::new(x, y, TRAIN_WIDTH, OBSTACLE_HEIGHT),
            speed,
            color: TRAIN_BODY,
            accent: TRAIN_STRIPE,
        }
    }

    /// Advance one tick; wrap around the world edges with a small random
    /// jitter so traffic does not re-enter in lockstep.
    pub fn advance(&mut self, world_width: f32, rng: &mut Pcg32) {
        self.rect.x += self.speed;
        if self.speed > 0.0 && self.rect.x > world_width {
            let jitter: f32 = rng.random_range(10.0..=100.0);
            self.rect.x = -(self.rect.w + jitter);
        } else if self.speed < 0.0 && self.rect.right() < 0.0 {
            let jitter: f32 = rng.random_range(10.0..=100.0);
            self.rect.x = world_width + jitter;
        }
    }
}

/// One fixed-height horizontal strip of the playfield
#[derive(Debug, Clone)]
pub struct Lane {
    /// Top edge; the lane covers `[y, y + GRID_UNIT)`
    pub y: f32,
    pub terrain: Terrain,
    /// Base obstacle speed for this lane (set even for grass)
    pub speed: f32,
    pub obstacles: Vec<Obstacle>,
}

impl Lane {
    /// Build a fully-populated lane for the given difficulty level.
    pub fn generate(y: f32, terrain: Terrain, level: u32, world_width: f32, rng: &mut Pcg32) -> Self {
        let base = *BASE_SPEEDS.choose(rng).unwrap_or(&BASE_SPEEDS[0]);
        let speed = base * (1.0 + 0.1 * level as f32);

        let mut lane = Self {
            y,
            terrain,
            speed,
            obstacles: Vec::new(),
        };

        match terrain {
            Terrain::Grass => {}
            Terrain::Road => lane.populate_road(level, world_width, rng),
            Terrain::Rail => lane.populate_rail(level, world_width, rng),
        }
        lane
    }

    /// How many obstacles a road lane asks for at this level.
    ///
    /// Monotonic non-decreasing congestion curve, bucketed:
    /// level < 3 mostly one, < 6 one or two, then two or three.
    fn road_count(level: u32, rng: &mut Pcg32) -> usize {
        if level < 3 {
            if rng.random_bool(0.8) { 1 } else { 2 }
        } else if level < 6 {
            rng.random_range(1..=2)
        } else {
            rng.random_range(2..=3)
        }
    }

    fn populate_road(&mut self, level: u32, world_width: f32, rng: &mut Pcg32) {
        let count = Self::road_count(level, rng);
        let obstacle_y = self.y + 5.0;
        let mut centers: Vec<f32> = Vec::with_capacity(count);

        for _ in 0..count {
            // Rejection sampling: a candidate that cannot find clearance
            // within the attempt budget is skipped, never forced.
            for _attempt in 0..PLACEMENT_ATTEMPTS {
                let is_car = rng.random_bool(0.7);
                let width = if is_car {
                    CAR_WIDTH
                } else {
                    rng.random_range(TRUCK_MIN_WIDTH..=TRUCK_MAX_WIDTH)
                };
                let x: f32 = rng.random_range(0.0..world_width);
                let center = x + width / 2.0;
                if centers
                    .iter()
                    .all(|&c| (center - c).abs() >= MIN_OBSTACLE_CLEARANCE)
                {
                    let obstacle = if is_car {
                        Obstacle::car(x, obstacle_y, self.speed, rng)
                    } else {
                        Obstacle::truck(x, obstacle_y, width, self.speed, rng)
                    };
                    self.obstacles.push(obstacle);
                    centers.push(center);
                    break;
                }
            }
        }
    }

    fn populate_rail(&mut self, level: u32, world_width: f32, rng: &mut Pcg32) {
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed = direction * TRAIN_BASE_SPEED * (1.0 + 0.05 * level as f32);
        // Enter fully off-screen on the side opposite the travel direction
        let x = if speed > 0.0 {
            -TRAIN_WIDTH
        } else {
            world_width + 200.0
        };
        self.obstacles.push(Obstacle::train(x, self.y + 5.0, speed));
    }

    /// Shift the lane and everything on it vertically (world scroll)
    pub fn shift(&mut self, dy: f32) {
        self.y += dy;
        for obstacle in &mut self.obstacles {
            obstacle.rect.y += dy;
        }
    }

    /// Advance all obstacles one tick
    pub fn advance_obstacles(&mut self, world_width: f32, rng: &mut Pcg32) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(world_width, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    #[test]
    fn test_grass_lane_is_empty() {
        for seed in 0..20 {
            let lane = Lane::generate(100.0, Terrain::Grass, 5, WORLD_WIDTH, &mut rng(seed));
            assert!(lane.obstacles.is_empty());
            assert!(lane.speed.abs() > 0.0);
        }
    }

    #[test]
    fn test_road_count_buckets() {
        for seed in 0..200 {
            let mut r = rng(seed);
            assert!((1..=2).contains(&Lane::road_count(0, &mut r)));
            assert!((1..=2).contains(&Lane::road_count(2, &mut r)));
            assert!((1..=2).contains(&Lane::road_count(3, &mut r)));
            assert!((1..=2).contains(&Lane::road_count(5, &mut r)));
            assert!((2..=3).contains(&Lane::road_count(6, &mut r)));
            assert!((2..=3).contains(&Lane::road_count(7, &mut r)));
        }
    }

    #[test]
    fn test_low_level_roads_mostly_single() {
        let mut r = rng(7);
        let singles = (0..1000)
            .filter(|_| Lane::road_count(0, &mut r) == 1)
            .count();
        // 80% weighted; allow generous slack
        assert!(singles > 700, "got {singles} single-obstacle draws");
    }

    #[test]
    fn test_rail_lane_has_one_offscreen_train() {
        for seed in 0..50 {
            let lane = Lane::generate(200.0, Terrain::Rail, 4, WORLD_WIDTH, &mut rng(seed));
            assert_eq!(lane.obstacles.len(), 1);
            let train = &lane.obstacles[0];
            assert_eq!(train.kind, ObstacleKind::Train);
            assert_eq!(train.rect.w, TRAIN_WIDTH);
            assert_eq!(train.speed.abs(), TRAIN_BASE_SPEED * 1.2);
            if train.speed > 0.0 {
                assert!(train.rect.right() <= 0.0);
            } else {
                assert!(train.rect.x >= WORLD_WIDTH);
            }
        }
    }

    #[test]
    fn test_obstacles_stay_in_lane_band() {
        let mut r = rng(11);
        let lane = Lane::generate(300.0, Terrain::Road, 8, WORLD_WIDTH, &mut r);
        for o in &lane.obstacles {
            assert!(o.rect.y >= lane.y && o.rect.bottom() <= lane.y + GRID_UNIT);
        }
    }

    #[test]
    fn test_wrap_right_preserves_speed_and_direction() {
        let mut r = rng(3);
        let mut car = Obstacle::car(WORLD_WIDTH - 1.0, 105.0, 4.0, &mut r);
        car.advance(WORLD_WIDTH, &mut r);
        // Crossed the edge: re-enters fully left of the left edge with jitter
        assert!(car.rect.right() <= -10.0);
        assert!(car.rect.right() >= -100.0);
        assert_eq!(car.speed, 4.0);
    }

    #[test]
    fn test_wrap_left_preserves_speed_and_direction() {
        let mut r = rng(3);
        let mut car = Obstacle::car(-CAR_WIDTH, 105.0, -3.0, &mut r);
        car.advance(WORLD_WIDTH, &mut r);
        assert!(car.rect.x >= WORLD_WIDTH + 10.0);
        assert!(car.rect.x <= WORLD_WIDTH + 100.0);
        assert_eq!(car.speed, -3.0);
    }

    #[test]
    fn test_terrain_weights_clamp_at_high_level() {
        // At level 20 rail is capped at 0.3 and grass floored at 0.1;
        // sample and sanity-check the mix stays roughly in range.
        let mut r = rng(99);
        let mut rail = 0;
        let mut grass = 0;
        let n = 5000;
        for _ in 0..n {
            match Terrain::weighted(20, &mut r) {
                Terrain::Rail => rail += 1,
                Terrain::Grass => grass += 1,
                Terrain::Road => {}
            }
        }
        let rail_frac = rail as f32 / n as f32;
        let grass_frac = grass as f32 / n as f32;
        assert!((0.25..0.35).contains(&rail_frac), "rail {rail_frac}");
        assert!((0.07..0.13).contains(&grass_frac), "grass {grass_frac}");
    }

    proptest! {
        #[test]
        fn prop_road_clearance_invariant(seed in any::<u64>(), level in 0u32..12) {
            let mut r = rng(seed);
            let lane = Lane::generate(250.0, Terrain::Road, level, WORLD_WIDTH, &mut r);
            let centers: Vec<f32> = lane.obstacles.iter().map(|o| o.rect.center().x).collect();
            for i in 0..centers.len() {
                for j in (i + 1)..centers.len() {
                    prop_assert!((centers[i] - centers[j]).abs() >= MIN_OBSTACLE_CLEARANCE);
                }
            }
        }

        #[test]
        fn prop_road_speed_scales_linearly(seed in any::<u64>(), level in 0u32..12) {
            let mut r = rng(seed);
            let lane = Lane::generate(250.0, Terrain::Road, level, WORLD_WIDTH, &mut r);
            let magnitude = lane.speed.abs() / (1.0 + 0.1 * level as f32);
            prop_assert!(BASE_SPEEDS.iter().any(|b| (b.abs() - magnitude).abs() < 1e-4));
            for o in &lane.obstacles {
                prop_assert_eq!(o.speed, lane.speed);
                prop_assert!(o.speed.abs() > 0.0);
            }
        }

        #[test]
        fn prop_crowded_lane_degrades_not_errors(seed in any::<u64>()) {
            // High level asks for up to 3 obstacles; clearance may reject
            // some, but generation always succeeds with 0..=3.
            let mut r = rng(seed);
            let lane = Lane::generate(250.0, Terrain::Road, 9, WORLD_WIDTH, &mut r);
            prop_assert!(lane.obstacles.len() <= 3);
        }
    }
}
