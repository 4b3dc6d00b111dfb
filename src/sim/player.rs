//! Player physics and state machine
//!
//! Vertical motion has two regimes. A jump runs as a scripted, fixed-length
//! window (ascend 30% / hover 40% / descend 30%) whose offset is derived from
//! elapsed time since the jump started - the stored `y` does not move while
//! the window runs, so collision checks must go through [`Player::effective_y`].
//! Outside a window, plain per-update gravity integration applies, clamped at
//! the ground baseline.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Inset, Rect};
use crate::consts::*;

/// Collision footprint relative to the sprite's bottom-left corner
pub const PLAYER_FOOTPRINT: Inset = Inset::new(10.0, 5.0, 40.0, 30.0);

/// Timed effects granted by power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    DoubleJump,
    Shield,
    Speed,
    Magnet,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::DoubleJump,
        EffectKind::Shield,
        EffectKind::Speed,
        EffectKind::Magnet,
    ];

    /// Lifetime of the effect once activated (ms)
    pub fn duration_ms(self) -> f32 {
        match self {
            EffectKind::DoubleJump => 10_000.0,
            EffectKind::Shield => 8_000.0,
            EffectKind::Speed => 6_000.0,
            EffectKind::Magnet => 12_000.0,
        }
    }
}

/// One effect slot: active flag plus remaining time
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EffectSlot {
    pub active: bool,
    pub time_left_ms: f32,
}

/// Active timed effects, one slot per kind
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub double_jump: EffectSlot,
    pub shield: EffectSlot,
    pub speed: EffectSlot,
    pub magnet: EffectSlot,
}

impl ActiveEffects {
    pub fn slot(&self, kind: EffectKind) -> &EffectSlot {
        match kind {
            EffectKind::DoubleJump => &self.double_jump,
            EffectKind::Shield => &self.shield,
            EffectKind::Speed => &self.speed,
            EffectKind::Magnet => &self.magnet,
        }
    }

    pub fn slot_mut(&mut self, kind: EffectKind) -> &mut EffectSlot {
        match kind {
            EffectKind::DoubleJump => &mut self.double_jump,
            EffectKind::Shield => &mut self.shield,
            EffectKind::Speed => &mut self.speed,
            EffectKind::Magnet => &mut self.magnet,
        }
    }
}

/// Which jump a jump command produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Ground,
    Double,
}

/// Outcome of resolving an obstacle hit against the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Invulnerable or already dead - nothing happens
    Ignored,
    /// Shield consumed, brief invulnerability granted, no damage
    ShieldAbsorbed,
    /// Player is down; the session schedules the life loss
    Damaged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    /// Height above the ground baseline
    pub y: f32,
    pub velocity_y: f32,
    pub ground_y: f32,
    pub is_grounded: bool,
    pub is_jumping: bool,
    /// Latched at the start of a ground jump if the double-jump effect is
    /// active then; collecting the effect mid-air does not set it
    pub can_double_jump: bool,
    pub has_double_jumped: bool,
    pub is_alive: bool,
    pub is_invulnerable: bool,
    pub invulnerability_ms: f32,
    pub effects: ActiveEffects,
    /// Game-clock timestamp of the current scripted window, if one is running
    jump_started_at: Option<f64>,
    jump_window_ms: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            x: PLAYER_X,
            y: GROUND_Y,
            velocity_y: 0.0,
            ground_y: GROUND_Y,
            is_grounded: true,
            is_jumping: false,
            can_double_jump: false,
            has_double_jumped: false,
            is_alive: true,
            is_invulnerable: false,
            invulnerability_ms: 0.0,
            effects: ActiveEffects::default(),
            jump_started_at: None,
            jump_window_ms: JUMP_WINDOW_MS,
        }
    }

    /// Handle an edge-triggered jump command at game time `now_ms`
    pub fn jump(&mut self, now_ms: f64) -> Option<JumpKind> {
        if !self.is_alive {
            return None;
        }

        if self.is_grounded {
            self.velocity_y = JUMP_POWER;
            self.is_grounded = false;
            self.is_jumping = true;
            self.has_double_jumped = false;
            self.can_double_jump = self.effects.double_jump.active;
            self.jump_started_at = Some(now_ms);
            self.jump_window_ms = JUMP_WINDOW_MS;
            Some(JumpKind::Ground)
        } else if self.can_double_jump && !self.has_double_jumped {
            // Weaker impulse, shorter window, same three-phase profile
            self.velocity_y = DOUBLE_JUMP_POWER;
            self.has_double_jumped = true;
            self.can_double_jump = false;
            self.jump_started_at = Some(now_ms);
            self.jump_window_ms = DOUBLE_JUMP_WINDOW_MS;
            Some(JumpKind::Double)
        } else {
            None
        }
    }

    /// Advance physics and timers; returns the effects that expired this frame
    pub fn update(&mut self, dt_ms: f32, now_ms: f64) -> Vec<EffectKind> {
        self.step_physics(now_ms);

        let mut expired = Vec::new();
        for kind in EffectKind::ALL {
            let slot = self.effects.slot_mut(kind);
            if slot.active {
                slot.time_left_ms -= dt_ms;
                if slot.time_left_ms <= 0.0 {
                    slot.active = false;
                    slot.time_left_ms = 0.0;
                    expired.push(kind);
                }
            }
        }

        if self.is_invulnerable {
            self.invulnerability_ms -= dt_ms;
            if self.invulnerability_ms <= 0.0 {
                self.is_invulnerable = false;
                self.invulnerability_ms = 0.0;
            }
        }

        expired
    }

    fn step_physics(&mut self, now_ms: f64) {
        if !self.is_alive {
            return;
        }

        if self.is_jumping {
            if let Some(start) = self.jump_started_at {
                if (now_ms - start) as f32 >= self.jump_window_ms {
                    self.is_jumping = false;
                    self.jump_started_at = None;
                    self.land();
                }
                // y is frozen while the scripted window runs
                return;
            }
        }

        if !self.is_grounded {
            self.velocity_y += GRAVITY;
        }
        self.y += self.velocity_y;

        if self.y <= self.ground_y {
            self.y = self.ground_y;
            self.velocity_y = 0.0;
            if !self.is_grounded {
                self.land();
            }
            self.is_grounded = true;
            self.can_double_jump = false;
        }
    }

    fn land(&mut self) {
        self.is_grounded = true;
        self.is_jumping = false;
        self.y = self.ground_y;
        self.velocity_y = 0.0;
        self.can_double_jump = false;
    }

    /// Vertical position as collision sees it: during a scripted window the
    /// offset is reconstructed from elapsed fraction, otherwise plain `y`
    pub fn effective_y(&self, now_ms: f64) -> f32 {
        if self.is_jumping {
            if let Some(start) = self.jump_started_at {
                let progress = (now_ms - start) as f32 / self.jump_window_ms;
                if (0.0..=1.0).contains(&progress) {
                    return self.y + jump_arc_offset(progress);
                }
            }
        }
        self.y
    }

    /// Collision footprint at the effective vertical position
    pub fn footprint(&self, now_ms: f64) -> Rect {
        PLAYER_FOOTPRINT.at(self.x, self.effective_y(now_ms))
    }

    /// Sprite center at the stored (not effective) position; magnet target
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + PLAYER_WIDTH / 2.0, self.y + PLAYER_HEIGHT / 2.0)
    }

    pub fn activate(&mut self, kind: EffectKind) {
        let slot = self.effects.slot_mut(kind);
        slot.active = true;
        slot.time_left_ms = kind.duration_ms();
    }

    pub fn deactivate(&mut self, kind: EffectKind) {
        let slot = self.effects.slot_mut(kind);
        slot.active = false;
        slot.time_left_ms = 0.0;
    }

    /// Resolve an obstacle hit against shield/invulnerability state
    pub fn collide_with_obstacle(&mut self) -> HitOutcome {
        if self.is_invulnerable || !self.is_alive {
            return HitOutcome::Ignored;
        }

        if self.effects.shield.active {
            self.deactivate(EffectKind::Shield);
            self.make_invulnerable(SHIELD_GRACE_MS);
            return HitOutcome::ShieldAbsorbed;
        }

        self.is_alive = false;
        HitOutcome::Damaged
    }

    pub fn make_invulnerable(&mut self, duration_ms: f32) {
        self.is_invulnerable = true;
        self.invulnerability_ms = duration_ms;
    }

    /// Back on the ground for the next life, briefly invulnerable
    pub fn respawn(&mut self) {
        self.is_alive = true;
        self.is_jumping = false;
        self.is_grounded = true;
        self.y = self.ground_y;
        self.velocity_y = 0.0;
        self.jump_started_at = None;
        self.make_invulnerable(RESPAWN_INVULN_MS);
    }

    /// Fresh state for a new session
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Offset of the scripted jump arc at progress `[0, 1]`:
/// linear ascend to the peak, hold, linear descend
pub fn jump_arc_offset(progress: f32) -> f32 {
    if progress <= 0.3 {
        JUMP_RISE * (progress / 0.3)
    } else if progress <= 0.7 {
        JUMP_RISE
    } else {
        JUMP_RISE * (1.0 - (progress - 0.7) / 0.3)
    }
}
