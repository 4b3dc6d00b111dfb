//! Power-ups: floating pickups the player collects for effects and points
//!
//! Spawned on a fixed interval from a rarity-weighted table, they drift left
//! with the world, float sinusoidally around a baseline, and are pulled
//! toward the player while the magnet effect runs. Collection uses the full
//! inset footprint (unlike obstacle hits, which use the narrowed core).

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{self, Rect};
use super::player::{EffectKind, Player};
use crate::consts::*;

const FLOAT_AMPLITUDE: f32 = 15.0;
const FLOAT_SPEED: f32 = 0.03;
/// Magnet pull engages between these center distances
const MAGNET_DEAD_ZONE: f32 = 10.0;

/// Spawn-weight tier; flavor only, no mechanics beyond the weight itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Closed set of power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerUpKind {
    #[default]
    Coin,
    DoubleJump,
    Speed,
    Shield,
    Magnet,
    Life,
}

/// Static per-kind data
#[derive(Debug, Clone, Copy)]
pub struct PowerUpProfile {
    /// Square sprite edge length
    pub size: f32,
    pub points: u32,
    pub rarity: Rarity,
    pub weight: f32,
    /// Timed player effect this pickup activates; `None` for instant kinds
    pub effect: Option<EffectKind>,
}

impl PowerUpKind {
    /// Spawn-table order, most common first
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Coin,
        PowerUpKind::DoubleJump,
        PowerUpKind::Speed,
        PowerUpKind::Shield,
        PowerUpKind::Magnet,
        PowerUpKind::Life,
    ];

    pub fn profile(self) -> PowerUpProfile {
        match self {
            PowerUpKind::Coin => PowerUpProfile {
                size: 20.0,
                points: 25,
                rarity: Rarity::Common,
                weight: 0.4,
                effect: None,
            },
            PowerUpKind::DoubleJump => PowerUpProfile {
                size: 30.0,
                points: 50,
                rarity: Rarity::Common,
                weight: 0.25,
                effect: Some(EffectKind::DoubleJump),
            },
            PowerUpKind::Speed => PowerUpProfile {
                size: 30.0,
                points: 40,
                rarity: Rarity::Common,
                weight: 0.2,
                effect: Some(EffectKind::Speed),
            },
            PowerUpKind::Shield => PowerUpProfile {
                size: 30.0,
                points: 75,
                rarity: Rarity::Uncommon,
                weight: 0.1,
                effect: Some(EffectKind::Shield),
            },
            PowerUpKind::Magnet => PowerUpProfile {
                size: 30.0,
                points: 100,
                rarity: Rarity::Rare,
                weight: 0.04,
                effect: Some(EffectKind::Magnet),
            },
            PowerUpKind::Life => PowerUpProfile {
                size: 30.0,
                points: 200,
                rarity: Rarity::Legendary,
                weight: 0.01,
                effect: None,
            },
        }
    }

    /// Permissive tag lookup; unknown tags fall back to the coin
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "coin" => PowerUpKind::Coin,
            "jump" => PowerUpKind::DoubleJump,
            "speed" => PowerUpKind::Speed,
            "shield" => PowerUpKind::Shield,
            "magnet" => PowerUpKind::Magnet,
            "life" => PowerUpKind::Life,
            _ => PowerUpKind::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub x: f32,
    pub y: f32,
    base_y: f32,
    float_phase: f32,
    pub is_active: bool,
    pub collected: bool,
    linger_ms: f32,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, x: f32, float_phase: f32) -> Self {
        Self {
            kind,
            x,
            y: POWERUP_BASELINE_Y,
            base_y: POWERUP_BASELINE_Y,
            float_phase,
            is_active: true,
            collected: false,
            linger_ms: 0.0,
        }
    }

    pub fn size(&self) -> f32 {
        self.kind.profile().size
    }

    /// Advance leftward, float, and follow the magnet; collected pickups
    /// only run down their linger timer
    pub fn update(&mut self, dt_ms: f32, game_speed: f32, now_ms: f64, magnet_target: Option<Vec2>) {
        if !self.is_active {
            return;
        }

        if self.collected {
            self.linger_ms -= dt_ms;
            if self.linger_ms <= 0.0 {
                self.is_active = false;
            }
            return;
        }

        self.x -= SCROLL_SPEED * game_speed * (dt_ms / FRAME_MS);

        // The float re-bases y every frame, so the magnet's vertical pull
        // below never accumulates - only the horizontal component does
        self.y = self.base_y
            + (now_ms as f32 * FLOAT_SPEED + self.float_phase).sin() * FLOAT_AMPLITUDE;

        if let Some(target) = magnet_target {
            self.apply_magnet(target);
        }

        if self.x + self.size() < CULL_X {
            self.is_active = false;
        }
    }

    /// Linear pull toward the player: zero at the radius edge, capped close in
    fn apply_magnet(&mut self, target: Vec2) {
        let size = self.size();
        let center = Vec2::new(self.x + size / 2.0, self.y + size / 2.0);
        let delta = target - center;
        let distance = delta.length();

        if distance < MAGNET_RANGE && distance > MAGNET_DEAD_ZONE {
            let pull = (MAGNET_RANGE - distance) / MAGNET_RANGE * MAGNET_MAX_PULL;
            self.x += delta.x / distance * pull;
            self.y += delta.y / distance * pull;
        }
    }

    /// Inset collision footprint (5 units off every edge)
    pub fn footprint(&self) -> Rect {
        let size = self.size();
        Rect::new(self.x + 5.0, self.y + 5.0, size - 10.0, size - 10.0)
    }

    /// Full footprint overlap against the player's effective position
    pub fn collides_with(&self, player: &Player, now_ms: f64) -> bool {
        if !self.is_active || self.collected || !player.is_alive {
            return false;
        }
        collision::rects_overlap(&self.footprint(), &player.footprint(now_ms))
    }

    /// Mark collected; the entity lingers briefly before despawning
    pub fn collect(&mut self) {
        self.collected = true;
        self.linger_ms = COLLECT_LINGER_MS;
    }
}

/// Owns all live power-ups plus the fixed-interval spawn timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpField {
    pub powerups: Vec<PowerUp>,
    spawn_timer_ms: f32,
    view_width: f32,
}

impl PowerUpField {
    pub fn new(view_width: f32) -> Self {
        Self {
            powerups: Vec::new(),
            spawn_timer_ms: 0.0,
            view_width,
        }
    }

    pub fn set_view_width(&mut self, view_width: f32) {
        self.view_width = view_width;
    }

    pub fn update(
        &mut self,
        dt_ms: f32,
        game_speed: f32,
        player: &Player,
        now_ms: f64,
        rng: &mut Pcg32,
    ) {
        self.spawn_timer_ms += dt_ms;
        if self.spawn_timer_ms >= POWERUP_INTERVAL_MS {
            self.spawn(rng);
            self.spawn_timer_ms = 0.0;
        }

        let magnet_target = player.effects.magnet.active.then(|| player.center());
        for powerup in &mut self.powerups {
            powerup.update(dt_ms, game_speed, now_ms, magnet_target);
        }
        self.powerups.retain(|p| p.is_active);
    }

    fn spawn(&mut self, rng: &mut Pcg32) {
        let kind = self.draw_kind(rng);
        let phase = rng.random_range(0.0..std::f32::consts::TAU);
        let x = self.view_width + SPAWN_MARGIN;
        log::debug!("spawn {kind:?} at x={x}");
        self.powerups.push(PowerUp::new(kind, x, phase));
    }

    /// Weighted draw over the rarity table; no difficulty coupling
    fn draw_kind(&self, rng: &mut Pcg32) -> PowerUpKind {
        let roll: f32 = rng.random();
        let mut cumulative = 0.0;
        for kind in PowerUpKind::ALL {
            cumulative += kind.profile().weight;
            if roll <= cumulative {
                return kind;
            }
        }
        PowerUpKind::default()
    }

    /// Collect every power-up overlapping the player this frame; returns
    /// (kind, points) per collection
    pub fn check_collisions(&mut self, player: &Player, now_ms: f64) -> Vec<(PowerUpKind, u32)> {
        let mut collected = Vec::new();
        for powerup in &mut self.powerups {
            if powerup.collides_with(player, now_ms) {
                powerup.collect();
                collected.push((powerup.kind, powerup.kind.profile().points));
            }
        }
        collected
    }

    pub fn reset(&mut self) {
        self.powerups.clear();
        self.spawn_timer_ms = 0.0;
    }
}
