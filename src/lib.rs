//! Rooftop Rush - a side-scrolling jump-and-dodge runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, spawning, collisions)
//! - `settings`: Audio/display preferences
//! - `highscores`: LocalStorage-backed leaderboard
//!
//! Rendering, audio playback, and raw input capture are host concerns; the
//! simulation only reads a per-frame [`sim::FrameInput`] and emits
//! [`sim::GameEvent`]s for the host to act on.

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Reference frame length (ms); entity advancement normalizes dt to this
    pub const FRAME_MS: f32 = 16.67;

    /// World dimensions - entities spawn just past the right edge
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Entities are retired once fully past this x
    pub const CULL_X: f32 = -50.0;

    /// Player placement and sprite bounds
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    pub const GROUND_Y: f32 = 60.0;

    /// Player physics (per-frame units)
    pub const GRAVITY: f32 = 0.06;
    pub const JUMP_POWER: f32 = -50.0;
    pub const DOUBLE_JUMP_POWER: f32 = -25.0;

    /// Scripted jump windows (ms) and peak rise height
    pub const JUMP_WINDOW_MS: f32 = 1200.0;
    pub const DOUBLE_JUMP_WINDOW_MS: f32 = 800.0;
    pub const JUMP_RISE: f32 = 140.0;

    /// Base leftward scroll of every spawned entity, per frame
    pub const SCROLL_SPEED: f32 = 5.0;

    /// Obstacle spawn pacing (ms)
    pub const OBSTACLE_BASE_INTERVAL_MS: f32 = 2000.0;
    pub const OBSTACLE_MIN_INTERVAL_MS: f32 = 800.0;
    pub const OBSTACLE_MAX_INTERVAL_MS: f32 = 3000.0;
    /// Minimum x gap to the previously spawned obstacle
    pub const MIN_SPAWN_GAP: f32 = 200.0;

    /// Power-up spawn pacing (ms) and float baseline
    pub const POWERUP_INTERVAL_MS: f32 = 5000.0;
    pub const POWERUP_BASELINE_Y: f32 = 120.0;
    /// Collected power-ups linger this long before despawning (ms)
    pub const COLLECT_LINGER_MS: f32 = 300.0;

    /// Magnet attraction radius and per-frame pull cap
    pub const MAGNET_RANGE: f32 = 150.0;
    pub const MAGNET_MAX_PULL: f32 = 8.0;

    /// Vertical collision tolerances
    pub const GROUND_CLEAR_TOLERANCE: f32 = 10.0;
    pub const FLYER_CLEAR_TOLERANCE: f32 = 20.0;

    /// Session pacing
    pub const START_LIVES: u32 = 3;
    pub const LEVEL_UP_INTERVAL_MS: f32 = 30_000.0;
    pub const LEVEL_SPEED_STEP: f32 = 0.1;
    pub const SPEED_EFFECT_MULTIPLIER: f32 = 1.5;

    /// Delay between a hit registering and the life actually being lost (ms)
    pub const LIFE_LOSS_DELAY_MS: f32 = 500.0;
    /// Invulnerability after respawn / after a shield absorbs a hit (ms)
    pub const RESPAWN_INVULN_MS: f32 = 2000.0;
    pub const SHIELD_GRACE_MS: f32 = 1000.0;
}
