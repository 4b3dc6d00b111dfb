//! Per-frame simulation update
//!
//! One call advances the whole session by the elapsed frame time: clock and
//! speed bookkeeping, player physics, both entity fields, collision
//! resolution, deferred consequences, and the level-up check. Components are
//! called strictly sequentially, movement always before collision, so hits
//! are evaluated against post-movement positions.

use super::player::{EffectKind, HitOutcome, JumpKind};
use super::powerup::PowerUpKind;
use super::state::{GameEvent, GamePhase, GameSession, ScheduledAction};
use crate::consts::*;

/// Input commands for a single frame (edge-triggered, pre-debounced by the
/// input collaborator)
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Jump command; the ~100 ms cooldown is applied upstream
    pub jump: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the session by `dt_ms` of elapsed frame time.
///
/// Outside the `Playing` phase this is a silent no-op, except the pause
/// toggle which also works from `Paused`.
pub fn update(session: &mut GameSession, input: &FrameInput, dt_ms: f32) {
    if input.pause {
        match session.phase {
            GamePhase::Playing => {
                session.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => session.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if session.phase != GamePhase::Playing {
        return;
    }

    session.game_time_ms += dt_ms as f64;
    let now_ms = session.game_time_ms;
    session.game_speed = session.base_speed * session.speed_multiplier;

    if input.jump {
        match session.player.jump(now_ms) {
            Some(JumpKind::Ground) => session.events.push(GameEvent::Jumped),
            Some(JumpKind::Double) => session.events.push(GameEvent::DoubleJumped),
            None => {}
        }
    }

    let expired = session.player.update(dt_ms, now_ms);
    for kind in expired {
        if kind == EffectKind::Speed {
            session.set_speed_multiplier(1.0);
        }
        session.events.push(GameEvent::PowerUpExpired(kind));
    }

    let game_speed = session.game_speed;
    let difficulty = session.difficulty;
    session
        .obstacles
        .update(dt_ms, game_speed, difficulty, now_ms, &mut session.rng);
    session
        .powerups
        .update(dt_ms, game_speed, &session.player, now_ms, &mut session.rng);

    resolve_obstacle_hit(session, now_ms);
    score_passed_obstacles(session);
    resolve_powerup_collisions(session, now_ms);

    run_scheduled_actions(session, dt_ms);
    if session.phase != GamePhase::Playing {
        return;
    }

    session.level_timer_ms += dt_ms;
    if session.level_timer_ms >= LEVEL_UP_INTERVAL_MS {
        level_up(session);
    }
}

/// At most one obstacle hit is resolved per frame, first match in spawn order
fn resolve_obstacle_hit(session: &mut GameSession, now_ms: f64) {
    if session.obstacles.check_hit(&session.player, now_ms).is_none() {
        return;
    }

    match session.player.collide_with_obstacle() {
        HitOutcome::Ignored => {}
        HitOutcome::ShieldAbsorbed => {
            session.events.push(GameEvent::PlayerHit);
            session.events.push(GameEvent::PowerUpExpired(EffectKind::Shield));
        }
        HitOutcome::Damaged => {
            session.events.push(GameEvent::PlayerHit);
            session.schedule(LIFE_LOSS_DELAY_MS, ScheduledAction::ResolveLifeLoss);
        }
    }
}

fn score_passed_obstacles(session: &mut GameSession) {
    let player_x = session.player.x;
    for points in session.obstacles.collect_passed(player_x) {
        session.add_score(points);
        session.events.push(GameEvent::ObstaclePassed { points });
    }
}

fn resolve_powerup_collisions(session: &mut GameSession, now_ms: f64) {
    let collected = session.powerups.check_collisions(&session.player, now_ms);
    for (kind, points) in collected {
        session.add_score(points);
        session.events.push(GameEvent::PowerUpCollected { kind, points });
        log::debug!("collected {kind:?} (+{points})");

        match kind.profile().effect {
            Some(effect) => {
                session.player.activate(effect);
                if effect == EffectKind::Speed {
                    session.set_speed_multiplier(SPEED_EFFECT_MULTIPLIER);
                }
                session.events.push(GameEvent::PowerUpActivated(effect));
            }
            None => {
                if kind == PowerUpKind::Life {
                    session.add_life();
                }
            }
        }
    }
}

/// Count down deferred consequences and fire the due ones
fn run_scheduled_actions(session: &mut GameSession, dt_ms: f32) {
    let mut due = Vec::new();
    session.pending.retain_mut(|scheduled| {
        scheduled.delay_ms -= dt_ms;
        if scheduled.delay_ms <= 0.0 {
            due.push(scheduled.action);
            false
        } else {
            true
        }
    });

    for action in due {
        match action {
            ScheduledAction::ResolveLifeLoss => session.lose_life(),
        }
    }
}

fn level_up(session: &mut GameSession) {
    session.level_timer_ms = 0.0;
    session.level += 1;
    session.difficulty += 1;
    session.base_speed += LEVEL_SPEED_STEP;
    session.game_speed = session.base_speed * session.speed_multiplier;
    session.obstacles.increase_difficulty();

    session.events.push(GameEvent::LevelUp {
        level: session.level,
    });
    session
        .events
        .push(GameEvent::SpeedMultiplier(session.game_speed));
    log::info!(
        "level {} (difficulty {}, base speed {:.1})",
        session.level,
        session.difficulty,
        session.base_speed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::{Obstacle, ObstacleKind};
    use crate::sim::powerup::PowerUp;

    fn playing_session() -> GameSession {
        let mut session = GameSession::new(12345);
        session.start();
        session.drain_events();
        session
    }

    fn step(session: &mut GameSession, frames: u32) {
        let input = FrameInput::default();
        for _ in 0..frames {
            update(session, &input, FRAME_MS);
        }
    }

    fn jump(session: &mut GameSession) {
        let input = FrameInput {
            jump: true,
            ..Default::default()
        };
        update(session, &input, FRAME_MS);
    }

    /// A crate whose narrowed core overlaps the player's this frame, after
    /// the frame's leftward advancement
    fn crate_on_player(session: &GameSession) -> Obstacle {
        Obstacle::new(ObstacleKind::Crate, session.player.x + 12.0 + 5.0, 0.0)
    }

    #[test]
    fn test_update_is_noop_outside_playing() {
        let mut session = GameSession::new(1);
        assert_eq!(session.phase, GamePhase::Menu);

        step(&mut session, 10);
        assert_eq!(session.game_time_ms, 0.0);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let mut session = playing_session();
        step(&mut session, 5);
        let frozen_at = session.game_time_ms;

        let pause = FrameInput {
            pause: true,
            ..Default::default()
        };
        update(&mut session, &pause, FRAME_MS);
        assert_eq!(session.phase, GamePhase::Paused);

        // Paused frames advance nothing
        step(&mut session, 20);
        assert_eq!(session.game_time_ms, frozen_at);

        // Toggle resumes with entity state intact and time continuing
        update(&mut session, &pause, FRAME_MS);
        assert_eq!(session.phase, GamePhase::Playing);
        step(&mut session, 1);
        assert!(session.game_time_ms > frozen_at);
    }

    #[test]
    fn test_jump_command_emits_event_and_completes() {
        let mut session = playing_session();
        jump(&mut session);
        assert!(session.drain_events().contains(&GameEvent::Jumped));
        assert!(session.player.is_jumping);

        // Past the scripted window the player is back on the ground
        step(&mut session, 73);
        assert!(session.player.is_grounded);
        assert_eq!(session.player.velocity_y, 0.0);
        assert_eq!(session.player.y, session.player.ground_y);
    }

    #[test]
    fn test_crate_passing_scores_exactly_once() {
        let mut session = playing_session();
        session
            .obstacles
            .obstacles
            .push(Obstacle::new(ObstacleKind::Crate, 200.0, 0.0));

        // Each frame moves it 5 units left at game speed 1
        step(&mut session, 1);
        let moved = &session.obstacles.obstacles[0];
        assert!((moved.x - 195.0).abs() < 1e-3);

        // 27 more frames: x = 60, so x + 35 < 100 and the pass is awarded
        step(&mut session, 27);
        assert_eq!(session.score, 5);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ObstaclePassed { points: 5 }));
        assert!(events.contains(&GameEvent::ScoreChanged(5)));

        // Never again for the same obstacle
        step(&mut session, 5);
        assert_eq!(session.score, 5);
    }

    #[test]
    fn test_hit_defers_life_loss_then_respawns() {
        let mut session = playing_session();
        let crate_hit = crate_on_player(&session);
        session.obstacles.obstacles.push(crate_hit);

        step(&mut session, 1);
        assert!(session.drain_events().contains(&GameEvent::PlayerHit));
        assert!(!session.player.is_alive);
        assert_eq!(session.lives, START_LIVES, "loss is deferred");

        // Grace delay elapses inside the frame loop, no wall clock involved
        step(&mut session, 31);
        assert_eq!(session.lives, START_LIVES - 1);
        assert!(session.player.is_alive);
        assert!(session.player.is_invulnerable);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::LifeLost {
            remaining: START_LIVES - 1
        }));
    }

    #[test]
    fn test_invulnerable_player_ignores_obstacles() {
        let mut session = playing_session();
        session.player.make_invulnerable(5_000.0);
        session.obstacles.obstacles.push(crate_on_player(&session));

        step(&mut session, 1);
        assert!(session.player.is_alive);
        assert!(!session.drain_events().contains(&GameEvent::PlayerHit));
    }

    #[test]
    fn test_shield_absorbs_hit_without_life_loss() {
        let mut session = playing_session();
        session.player.activate(EffectKind::Shield);
        session.obstacles.obstacles.push(crate_on_player(&session));

        step(&mut session, 1);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::PlayerHit));
        assert!(events.contains(&GameEvent::PowerUpExpired(EffectKind::Shield)));
        assert!(!session.player.effects.shield.active);
        assert!(session.player.is_invulnerable);
        assert!(session.player.is_alive);

        // Well past the grace delay: no life was ever scheduled to drop
        step(&mut session, 40);
        assert_eq!(session.lives, START_LIVES);
    }

    #[test]
    fn test_last_life_game_over_fires_once_then_noops() {
        let mut session = playing_session();
        session.lives = 1;
        session.obstacles.obstacles.push(crate_on_player(&session));

        // Hit frame plus the deferred loss
        step(&mut session, 32);
        assert_eq!(session.phase, GamePhase::GameOver);
        let events = session.drain_events();
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        // Dead session: no time passes, nothing is emitted
        let frozen_at = session.game_time_ms;
        step(&mut session, 10);
        assert_eq!(session.game_time_ms, frozen_at);
        assert!(session.drain_events().is_empty());
    }

    /// Phase chosen so the pickup floats near the bottom of its band while
    /// the ascending player sweeps through it
    fn reachable_powerup(kind: PowerUpKind) -> PowerUp {
        PowerUp::new(kind, 150.0, 0.21)
    }

    #[test]
    fn test_life_powerup_is_instant() {
        let mut session = playing_session();
        session
            .powerups
            .powerups
            .push(reachable_powerup(PowerUpKind::Life));

        jump(&mut session);
        step(&mut session, 12);
        assert_eq!(session.lives, START_LIVES + 1);
        assert_eq!(session.score, 200);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ExtraLife));
        assert!(events.contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::Life,
            points: 200
        }));
        // Instant effect: no timer slot was started
        for kind in EffectKind::ALL {
            assert!(!session.player.effects.slot(kind).active);
        }
    }

    #[test]
    fn test_speed_powerup_scales_and_reverts() {
        let mut session = playing_session();
        session
            .powerups
            .powerups
            .push(reachable_powerup(PowerUpKind::Speed));

        jump(&mut session);
        step(&mut session, 12);
        assert!(session.player.effects.speed.active);
        assert!((session.speed_multiplier - SPEED_EFFECT_MULTIPLIER).abs() < 1e-6);
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::PowerUpActivated(EffectKind::Speed)));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::SpeedMultiplier(s) if (s - 1.5).abs() < 1e-6))
        );

        // Effect runs out, multiplier reverts, expiry is announced
        step(&mut session, 365);
        assert!(!session.player.effects.speed.active);
        assert!((session.speed_multiplier - 1.0).abs() < 1e-6);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::PowerUpExpired(EffectKind::Speed))
        );
    }

    #[test]
    fn test_level_up_after_interval() {
        let mut session = playing_session();
        // Nobody is dodging in this test; spawned hazards must not end the run
        session.player.make_invulnerable(40_000.0);

        // 1799 frames: 29,989 ms, still level 1
        step(&mut session, 1799);
        assert_eq!(session.level, 1);

        step(&mut session, 1);
        assert_eq!(session.level, 2);
        assert_eq!(session.difficulty, 2);
        assert!((session.base_speed - 1.1).abs() < 1e-6);
        assert_eq!(session.level_timer_ms, 0.0);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::LevelUp { level: 2 })
        );
    }

    #[test]
    fn test_score_is_monotonic() {
        let mut session = playing_session();
        let mut last = 0;
        for frame in 0..3000 {
            let input = FrameInput {
                jump: frame % 50 == 0,
                ..Default::default()
            };
            update(&mut session, &input, FRAME_MS);
            assert!(session.score >= last);
            last = session.score;
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = GameSession::new(99999);
        let mut b = GameSession::new(99999);
        a.start();
        b.start();

        for frame in 0..2400u32 {
            let input = FrameInput {
                jump: frame % 70 == 0,
                ..Default::default()
            };
            update(&mut a, &input, FRAME_MS);
            update(&mut b, &input, FRAME_MS);
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.game_time_ms, b.game_time_ms);
        assert_eq!(a.obstacles.obstacles.len(), b.obstacles.obstacles.len());
        for (oa, ob) in a.obstacles.obstacles.iter().zip(&b.obstacles.obstacles) {
            assert_eq!(oa.kind, ob.kind);
            assert_eq!(oa.x, ob.x);
        }
        assert_eq!(a.powerups.powerups.len(), b.powerups.powerups.len());
        assert_eq!(a.player.y, b.player.y);
    }

    mod frame_partition {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The scripted jump lands identically no matter how the window
            /// is sliced into frames
            #[test]
            fn jump_completes_under_any_frame_sizes(
                dts in prop::collection::vec(1.0f32..200.0, 8..64)
            ) {
                let mut session = playing_session();
                jump(&mut session);

                // The window opened one frame in; run until it has fully elapsed
                let mut i = 0;
                while session.game_time_ms < (FRAME_MS + JUMP_WINDOW_MS + 1.0) as f64 {
                    let dt = dts[i % dts.len()];
                    update(&mut session, &FrameInput::default(), dt);
                    i += 1;
                }

                prop_assert!(session.player.is_grounded);
                prop_assert!(!session.player.is_jumping);
                prop_assert_eq!(session.player.velocity_y, 0.0);
                prop_assert_eq!(session.player.y, session.player.ground_y);
            }

            /// Entity advancement is rate-true: x drops by
            /// speed * game_speed * dt/16.67 regardless of slicing
            #[test]
            fn advancement_is_rate_true(dt in 1.0f32..50.0) {
                let mut session = playing_session();
                session
                    .obstacles
                    .obstacles
                    .push(Obstacle::new(ObstacleKind::Crate, 900.0, 0.0));

                update(&mut session, &FrameInput::default(), dt);
                let expected = 900.0 - SCROLL_SPEED * (dt / FRAME_MS);
                prop_assert!((session.obstacles.obstacles[0].x - expected).abs() < 1e-3);
            }
        }
    }
}
