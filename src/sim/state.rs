//! Session state and core simulation types
//!
//! The session owns the player, both entity fields, all score/life/level
//! bookkeeping, the seeded RNG, and the outbound event queue. Hosts construct
//! it once and drive it through [`super::tick::update`]; there is no ambient
//! lookup anywhere in the core.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacle::ObstacleField;
use super::player::{EffectKind, Player};
use super::powerup::{PowerUpField, PowerUpKind};
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not yet started; updates are no-ops
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen; resuming continues with entity state intact
    Paused,
    /// Run ended; only a restart leaves this phase
    GameOver,
}

/// Notifications drained by the host after every update.
///
/// The core never touches audio, DOM, or storage itself; these cover the
/// whole outbound surface (sounds, display refreshes, persistence requests).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped,
    DoubleJumped,
    PowerUpActivated(EffectKind),
    PowerUpExpired(EffectKind),
    PowerUpCollected { kind: PowerUpKind, points: u32 },
    /// The player crossed an obstacle; score-tick feedback
    ObstaclePassed { points: u32 },
    ScoreChanged(u32),
    LivesChanged(u32),
    PlayerHit,
    LifeLost { remaining: u32 },
    ExtraLife,
    LevelUp { level: u32 },
    /// Effective game speed changed; drives the background scroll
    SpeedMultiplier(f32),
    /// Score beat the stored best; persist it
    NewHighScore(u32),
    GameOver { score: u32 },
}

/// Deferred consequences, evaluated inside the per-frame update so the
/// whole simulation stays steppable without wall-clock timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Grace delay between a hit registering and the life being lost
    ResolveLifeLoss,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scheduled {
    pub delay_ms: f32,
    pub action: ScheduledAction,
}

/// RNG seed wrapper; a session reseeds from this on every start
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession {
    pub rng_state: RngState,
    pub phase: GamePhase,
    pub player: Player,
    pub obstacles: ObstacleField,
    pub powerups: PowerUpField,
    /// Monotonic; only the award paths touch it
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    pub level: u32,
    pub difficulty: u32,
    pub base_speed: f32,
    pub speed_multiplier: f32,
    /// base_speed * speed_multiplier, refreshed at the top of each frame
    pub game_speed: f32,
    pub game_time_ms: f64,
    pub level_timer_ms: f32,
    pub(crate) pending: Vec<Scheduled>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        Self {
            rng_state,
            phase: GamePhase::Menu,
            player: Player::new(),
            obstacles: ObstacleField::new(VIEW_WIDTH),
            powerups: PowerUpField::new(VIEW_WIDTH),
            score: 0,
            high_score: 0,
            lives: START_LIVES,
            level: 1,
            difficulty: 1,
            base_speed: 1.0,
            speed_multiplier: 1.0,
            game_speed: 1.0,
            game_time_ms: 0.0,
            level_timer_ms: 0.0,
            pending: Vec::new(),
            events: Vec::new(),
            rng: rng_state.to_rng(),
        }
    }

    /// Begin (or restart) a run: fresh variables, cleared fields, reseeded RNG
    pub fn start(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.difficulty = 1;
        self.base_speed = 1.0;
        self.speed_multiplier = 1.0;
        self.game_speed = 1.0;
        self.game_time_ms = 0.0;
        self.level_timer_ms = 0.0;
        self.pending.clear();

        self.player.reset();
        self.obstacles.reset();
        self.powerups.reset();
        self.rng = self.rng_state.to_rng();

        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::LivesChanged(self.lives));
        self.events.push(GameEvent::SpeedMultiplier(self.game_speed));
        log::info!("session started (seed {})", self.rng_state.seed);
    }

    /// Change the seed used by the next `start`
    pub fn reseed(&mut self, seed: u64) {
        self.rng_state = RngState::new(seed);
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Propagate a host viewport resize to the spawn edges
    pub fn set_view_width(&mut self, view_width: f32) {
        self.obstacles.set_view_width(view_width);
        self.powerups.set_view_width(view_width);
    }

    /// Host API: take everything emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn schedule(&mut self, delay_ms: f32, action: ScheduledAction) {
        self.pending.push(Scheduled { delay_ms, action });
    }

    pub(crate) fn add_score(&mut self, points: u32) {
        self.score += points;
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    pub(crate) fn add_life(&mut self) {
        self.lives += 1;
        self.events.push(GameEvent::LivesChanged(self.lives));
        self.events.push(GameEvent::ExtraLife);
    }

    /// Set the multiplier (speed effect on/off) and notify the background
    pub(crate) fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
        self.game_speed = self.base_speed * self.speed_multiplier;
        self.events.push(GameEvent::SpeedMultiplier(self.game_speed));
    }

    /// The deferred consequence of an unshielded hit
    pub(crate) fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LivesChanged(self.lives));
        self.events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });

        if self.lives == 0 {
            self.game_over();
        } else {
            self.player.respawn();
            log::info!("life lost, {} remaining", self.lives);
        }
    }

    /// Terminal transition; fires at most once per run
    pub(crate) fn game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;

        if self.score > self.high_score {
            self.high_score = self.score;
            self.events.push(GameEvent::NewHighScore(self.score));
        }
        self.events.push(GameEvent::GameOver { score: self.score });
        log::info!("game over at score {}", self.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_resets_session() {
        let mut session = GameSession::new(42);
        session.score = 500;
        session.lives = 1;
        session.level = 7;

        session.start();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, START_LIVES);
        assert_eq!(session.level, 1);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ScoreChanged(0)));
        assert!(events.contains(&GameEvent::LivesChanged(START_LIVES)));
    }

    #[test]
    fn test_pause_resume_cycle() {
        let mut session = GameSession::new(1);
        session.start();

        session.pause();
        assert_eq!(session.phase, GamePhase::Paused);
        // Pausing again is a no-op
        session.pause();
        assert_eq!(session.phase, GamePhase::Paused);

        session.resume();
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_lose_life_respawns_until_exhausted() {
        let mut session = GameSession::new(9);
        session.start();
        session.drain_events();

        session.lose_life();
        assert_eq!(session.lives, 2);
        assert!(session.player.is_alive);
        assert!(session.player.is_invulnerable);
        assert_eq!(session.phase, GamePhase::Playing);

        session.lose_life();
        session.lose_life();
        assert_eq!(session.lives, 0);
        assert_eq!(session.phase, GamePhase::GameOver);

        let events = session.drain_events();
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_high_score_persist_request() {
        let mut session = GameSession::new(5);
        session.start();
        session.high_score = 100;
        session.add_score(150);
        session.drain_events();

        session.game_over();
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::NewHighScore(150)));
        assert_eq!(session.high_score, 150);

        // A second call changes nothing
        session.game_over();
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_speed_multiplier_notifies_background() {
        let mut session = GameSession::new(2);
        session.start();
        session.base_speed = 1.2;
        session.drain_events();

        session.set_speed_multiplier(1.5);
        assert!((session.game_speed - 1.8).abs() < 1e-6);
        let events = session.drain_events();
        assert!(matches!(events[0], GameEvent::SpeedMultiplier(s) if (s - 1.8).abs() < 1e-6));
    }
}
