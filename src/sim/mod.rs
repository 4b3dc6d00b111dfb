//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Advanced only through [`tick::update`] with explicit frame deltas
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod obstacle;
pub mod player;
pub mod powerup;
pub mod state;
pub mod tick;

pub use collision::{Inset, Rect, center_distance, core_spans_overlap, rects_overlap};
pub use obstacle::{Obstacle, ObstacleField, ObstacleKind};
pub use player::{ActiveEffects, EffectKind, HitOutcome, JumpKind, Player};
pub use powerup::{PowerUp, PowerUpField, PowerUpKind, Rarity};
pub use state::{GameEvent, GamePhase, GameSession, RngState, Scheduled, ScheduledAction};
pub use tick::{FrameInput, update};
