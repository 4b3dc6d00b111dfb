//! Obstacles: the hazards scrolling in from the right
//!
//! Each kind carries its geometry, score value, and spawn weight in a static
//! profile table. The field owns spawning (difficulty-paced interval with a
//! minimum gap rule), per-frame advancement, culling, pass-scoring, and the
//! player hit test.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{self, Inset, Rect};
use super::player::Player;
use crate::consts::*;

/// Closed set of obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    #[default]
    SmallHazard,
    LargeHazard,
    Flyer,
    Crate,
}

/// Static per-kind data
#[derive(Debug, Clone, Copy)]
pub struct ObstacleProfile {
    pub width: f32,
    pub height: f32,
    pub baseline_y: f32,
    pub points: u32,
    pub footprint: Inset,
    /// Cosmetic vertical bob; collision sees the bobbed position
    pub bob_amplitude: f32,
    pub bob_speed: f32,
    pub bob_phased: bool,
}

const SMALL_HAZARD: ObstacleProfile = ObstacleProfile {
    width: 40.0,
    height: 25.0,
    baseline_y: 60.0,
    points: 10,
    footprint: Inset::new(8.0, 5.0, 24.0, 15.0),
    bob_amplitude: 2.0,
    bob_speed: 0.01,
    bob_phased: false,
};

const LARGE_HAZARD: ObstacleProfile = ObstacleProfile {
    width: 60.0,
    height: 45.0,
    baseline_y: 60.0,
    points: 20,
    footprint: Inset::new(10.0, 8.0, 40.0, 25.0),
    bob_amplitude: 2.0,
    bob_speed: 0.01,
    bob_phased: false,
};

const FLYER: ObstacleProfile = ObstacleProfile {
    width: 30.0,
    height: 20.0,
    baseline_y: 120.0,
    points: 15,
    footprint: Inset::new(5.0, 4.0, 20.0, 12.0),
    bob_amplitude: 10.0,
    bob_speed: 0.05,
    bob_phased: true,
};

const CRATE: ObstacleProfile = ObstacleProfile {
    width: 35.0,
    height: 35.0,
    baseline_y: 60.0,
    points: 5,
    footprint: Inset::new(3.0, 3.0, 29.0, 29.0),
    bob_amplitude: 0.0,
    bob_speed: 0.0,
    bob_phased: false,
};

impl ObstacleKind {
    /// Spawn-table order; weights below index into this
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::SmallHazard,
        ObstacleKind::LargeHazard,
        ObstacleKind::Flyer,
        ObstacleKind::Crate,
    ];

    pub fn profile(self) -> &'static ObstacleProfile {
        match self {
            ObstacleKind::SmallHazard => &SMALL_HAZARD,
            ObstacleKind::LargeHazard => &LARGE_HAZARD,
            ObstacleKind::Flyer => &FLYER,
            ObstacleKind::Crate => &CRATE,
        }
    }

    /// Flyers test "player high enough to reach"; ground kinds test
    /// "player cleared the top"
    pub fn is_airborne(self) -> bool {
        matches!(self, ObstacleKind::Flyer)
    }

    /// Permissive tag lookup; unknown tags fall back to the small hazard
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "small" => ObstacleKind::SmallHazard,
            "large" => ObstacleKind::LargeHazard,
            "flyer" => ObstacleKind::Flyer,
            "crate" => ObstacleKind::Crate,
            _ => ObstacleKind::default(),
        }
    }
}

/// Initial spawn weights, biased toward harder kinds as difficulty rises
const BASE_WEIGHTS: [f32; 4] = [0.4, 0.3, 0.2, 0.1];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    base_y: f32,
    bob_phase: f32,
    pub is_active: bool,
    /// Set once the player has crossed this obstacle (scored exactly once)
    pub passed: bool,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, bob_phase: f32) -> Self {
        let baseline = kind.profile().baseline_y;
        Self {
            kind,
            x,
            y: baseline,
            base_y: baseline,
            bob_phase,
            is_active: true,
            passed: false,
        }
    }

    pub fn width(&self) -> f32 {
        self.kind.profile().width
    }

    /// Advance leftward and bob; retire once fully past the left edge
    pub fn update(&mut self, dt_ms: f32, game_speed: f32, now_ms: f64) {
        if !self.is_active {
            return;
        }

        self.x -= SCROLL_SPEED * game_speed * (dt_ms / FRAME_MS);

        let profile = self.kind.profile();
        if profile.bob_amplitude > 0.0 {
            let t = now_ms as f32 * profile.bob_speed + self.bob_phase;
            self.y = self.base_y + t.sin() * profile.bob_amplitude;
        }

        if self.x + profile.width < CULL_X {
            self.is_active = false;
        }
    }

    /// Inset collision footprint at the current position
    pub fn footprint(&self) -> Rect {
        self.kind.profile().footprint.at(self.x, self.y)
    }

    /// Hit test against the player's effective vertical position.
    ///
    /// Horizontal overlap uses the narrowed central span of both actors;
    /// vertical resolution then applies the per-kind clearance tolerance.
    pub fn hits_player(&self, player: &Player, now_ms: f64) -> bool {
        if !self.is_active || !player.is_alive {
            return false;
        }

        let profile = self.kind.profile();
        if !collision::core_spans_overlap(self.x, profile.width, player.x, PLAYER_WIDTH) {
            return false;
        }

        let effective_y = player.effective_y(now_ms);
        if self.kind.is_airborne() {
            // Player too low to reach the flyer
            if effective_y < self.y - FLYER_CLEAR_TOLERANCE {
                return false;
            }
        } else {
            // Player cleared the top of the hazard
            if effective_y > self.y + profile.height + GROUND_CLEAR_TOLERANCE {
                return false;
            }
        }

        true
    }
}

/// Owns all live obstacles plus the spawn policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
    spawn_timer_ms: f32,
    spawn_interval_ms: f32,
    difficulty: u32,
    weights: [f32; 4],
    view_width: f32,
}

impl ObstacleField {
    pub fn new(view_width: f32) -> Self {
        Self {
            obstacles: Vec::new(),
            spawn_timer_ms: 0.0,
            spawn_interval_ms: OBSTACLE_BASE_INTERVAL_MS,
            difficulty: 1,
            weights: BASE_WEIGHTS,
            view_width,
        }
    }

    pub fn set_view_width(&mut self, view_width: f32) {
        self.view_width = view_width;
    }

    /// Advance spawn timing and every live obstacle, then cull
    pub fn update(
        &mut self,
        dt_ms: f32,
        game_speed: f32,
        difficulty: u32,
        now_ms: f64,
        rng: &mut Pcg32,
    ) {
        self.difficulty = difficulty;

        self.spawn_timer_ms += dt_ms;
        if self.spawn_timer_ms >= self.spawn_interval_ms {
            self.try_spawn(rng);
            // Timer resets and the interval re-rolls even when the gap rule
            // skipped the spawn
            self.spawn_timer_ms = 0.0;
            self.reroll_interval(rng);
        }

        for obstacle in &mut self.obstacles {
            obstacle.update(dt_ms, game_speed, now_ms);
        }
        self.obstacles.retain(|o| o.is_active);
    }

    fn try_spawn(&mut self, rng: &mut Pcg32) {
        let spawn_x = self.view_width + SPAWN_MARGIN;

        if let Some(last) = self.obstacles.last() {
            if spawn_x - last.x < MIN_SPAWN_GAP {
                return;
            }
        }

        let kind = self.draw_kind(rng);
        let bob_phase = if kind.profile().bob_phased {
            rng.random_range(0.0..std::f32::consts::TAU)
        } else {
            0.0
        };

        log::debug!("spawn {kind:?} at x={spawn_x}");
        self.obstacles.push(Obstacle::new(kind, spawn_x, bob_phase));
    }

    /// Weighted draw over the current spawn table
    fn draw_kind(&self, rng: &mut Pcg32) -> ObstacleKind {
        let roll: f32 = rng.random();
        let mut cumulative = 0.0;
        for (kind, weight) in ObstacleKind::ALL.iter().zip(self.weights) {
            cumulative += weight;
            if roll <= cumulative {
                return *kind;
            }
        }
        ObstacleKind::default()
    }

    /// `clamp(base * difficultyFactor, min, max)` with ±20% variation
    fn reroll_interval(&mut self, rng: &mut Pcg32) {
        let difficulty_factor = (1.0 - (self.difficulty as f32 - 1.0) * 0.1).max(0.3);
        let interval = (OBSTACLE_BASE_INTERVAL_MS * difficulty_factor)
            .clamp(OBSTACLE_MIN_INTERVAL_MS, OBSTACLE_MAX_INTERVAL_MS);
        self.spawn_interval_ms = interval * rng.random_range(0.8..=1.2);
    }

    /// Shift spawn weights toward harder kinds past the difficulty thresholds
    pub fn increase_difficulty(&mut self) {
        self.difficulty += 1;

        if self.difficulty > 3 {
            self.weights[1] += 0.1; // large
            self.weights[2] += 0.05; // flyer
            self.weights[0] -= 0.15; // small
        }
        if self.difficulty > 5 {
            self.weights[3] += 0.1; // crate
            self.weights[0] -= 0.1;
        }
    }

    /// First obstacle hitting the player, in spawn order; at most one hit
    /// is resolved per frame
    pub fn check_hit(&self, player: &Player, now_ms: f64) -> Option<ObstacleKind> {
        self.obstacles
            .iter()
            .find(|o| o.hits_player(player, now_ms))
            .map(|o| o.kind)
    }

    /// Flag newly crossed obstacles and return their score values
    pub fn collect_passed(&mut self, player_x: f32) -> Vec<u32> {
        let mut awarded = Vec::new();
        for obstacle in &mut self.obstacles {
            if obstacle.is_active && !obstacle.passed && obstacle.x + obstacle.width() < player_x {
                obstacle.passed = true;
                awarded.push(obstacle.kind.profile().points);
            }
        }
        awarded
    }

    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.spawn_timer_ms = 0.0;
        self.spawn_interval_ms = OBSTACLE_BASE_INTERVAL_MS;
        self.difficulty = 1;
        self.weights = BASE_WEIGHTS;
    }
}
