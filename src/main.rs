//! Neon Horde headless demo
//!
//! Drives the simulation core without a host UI: boots through the stage
//! machine, spawns wave-scaled enemies, runs broad-phase queries, exercises
//! the pause countdown, and posts overlay frames to the render thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use neon_horde::consts::{BULLET_RADIUS, MAX_ENEMY_RADIUS, MAX_SUBSTEPS, SIM_DT};
use neon_horde::host::StubSession;
use neon_horde::overlay::{MapEntity, MinimapFrame, OverlayFrame, spawn_overlay_renderer};
use neon_horde::pause::{PauseController, ToggleTrigger};
use neon_horde::stage::{RunState, Substate};
use neon_horde::wave::create_enemy_instance;
use neon_horde::{Action, GameStage, SpatialHash, reduce};

const WORLD_SIZE: f32 = 2000.0;
const DEMO_SECONDS: f32 = 180.0;
const SPAWNS_PER_WAVE: usize = 12;
/// Simulated host frame cadence (20 Hz) driving the fixed-step accumulator
const FRAME_DT: f32 = 0.05;

/// Drain the accumulator in fixed steps, capped per frame. When the cap is
/// hit the remaining backlog is dropped rather than chased.
fn step_simulation(mut stage: GameStage, accumulator: &mut f32) -> GameStage {
    let mut substeps = 0;
    while *accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        stage = reduce(stage, Action::Tick(SIM_DT));
        *accumulator -= SIM_DT;
        substeps += 1;
    }
    if *accumulator >= SIM_DT {
        *accumulator = 0.0;
    }
    stage
}

fn demo_finished(run: &RunState) -> bool {
    run.stats.time >= DEMO_SECONDS || run.substate == Substate::GameOver
}

struct DemoEnemy {
    pos: Vec2,
    radius: f32,
    color: [u8; 4],
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xBAD5EED);
    let mut rng = Pcg32::seed_from_u64(seed);
    log::info!("starting demo run with seed {seed}");

    let frames_rendered = Arc::new(AtomicU64::new(0));
    let frame_counter = Arc::clone(&frames_rendered);
    let overlay = spawn_overlay_renderer(move |_surface| {
        frame_counter.fetch_add(1, Ordering::Relaxed);
    });
    overlay.init(1280, 720);

    let mut stage = GameStage::Boot { progress: 0.0 };
    stage = reduce(stage, Action::BootComplete);
    stage = reduce(stage, Action::StartNewRun);
    stage = reduce(stage, Action::SkipTutorial);

    let mut hash = SpatialHash::new((MAX_ENEMY_RADIUS + BULLET_RADIUS) * 2.0);
    let mut enemies: Vec<DemoEnemy> = Vec::new();
    let mut spawned_for_wave = 0;
    let player = Vec2::splat(WORLD_SIZE / 2.0);
    let mut nearby = Vec::new();

    let mut clock = 0.0f64;
    let mut demo_paused_once = false;
    let mut pause = PauseController::new(
        StubSession::default(),
        vec!["stats".into(), "options".into()],
        vec!["resume".into(), "quit".into()],
    );

    let mut accumulator = 0.0f32;
    while let GameStage::Gameplay(run) = &stage {
        if demo_finished(run) {
            break;
        }

        // Exercise the pause menu and resume countdown once, mid-run
        if run.stats.time >= 30.0 && !demo_paused_once {
            demo_paused_once = true;
            pause.host_mut().wave = run.wave.index;
            pause.host_mut().score = run.stats.score;
            pause.toggle_pause(clock, ToggleTrigger::User);
            pause.toggle_pause(clock + 2.0, ToggleTrigger::User);
            pause.update(clock + 6.0);
            for event in pause.drain_events() {
                log::info!("pause event: {event:?}");
            }
        }

        // Top the wave up to its spawn quota
        if spawned_for_wave < SPAWNS_PER_WAVE {
            let instance = create_enemy_instance(run.wave.index, &mut rng);
            log::debug!(
                "wave {} spawn: {} (elite: {}) hp {} dmg {}",
                run.wave.index,
                instance.archetype.name,
                instance.is_elite,
                instance.stats.hp,
                instance.stats.damage,
            );
            enemies.push(DemoEnemy {
                pos: Vec2::new(
                    rng.random::<f32>() * WORLD_SIZE,
                    rng.random::<f32>() * WORLD_SIZE,
                ),
                radius: instance.stats.radius,
                color: instance.stats.color,
            });
            spawned_for_wave += 1;
        }

        hash.reset();
        for (id, enemy) in enemies.iter().enumerate() {
            hash.insert_enemy(id, enemy.pos, enemy.radius);
        }
        nearby.clear();
        hash.query_enemies(player, 200.0, &mut nearby);

        let wave_before = run.wave.index;
        accumulator += FRAME_DT;
        stage = step_simulation(stage, &mut accumulator);
        clock += f64::from(FRAME_DT);

        if let GameStage::Gameplay(run) = &stage {
            if run.wave.index != wave_before {
                log::info!(
                    "wave {} reached: score {} kills {} threats near player {}",
                    run.wave.index,
                    run.stats.score,
                    run.stats.kills,
                    nearby.len(),
                );
                spawned_for_wave = 0;
            }

            // Level-ups in the demo always take the first option
            if run.level_up.is_some() {
                stage = reduce(stage, Action::ResolveLevelUp(0));
                stage = reduce(stage, Action::Resume);
            }
        }

        if let GameStage::Gameplay(run) = &stage {
            let mut minimap = MinimapFrame::empty(WORLD_SIZE, WORLD_SIZE);
            minimap.player.x = player.x;
            minimap.player.y = player.y;
            minimap.enemies = enemies
                .iter()
                .map(|e| MapEntity::at(e.pos.x, e.pos.y, e.radius, e.color))
                .collect();
            minimap.detail_level = if run.wave.index >= 3 { 2 } else { 1 };
            overlay.post_frame(OverlayFrame {
                width: 1280,
                height: 720,
                particles: Vec::new(),
                minimap,
            });
        }
    }

    stage = reduce(stage, Action::FinishRun);
    if let GameStage::Results(summary) = &stage {
        log::info!(
            "run finished: wave {} score {} kills {} level {} after {:.1}s",
            summary.wave,
            summary.score,
            summary.kills,
            summary.level,
            summary.time,
        );
        match serde_json::to_string(summary) {
            Ok(json) => println!("{json}"),
            Err(err) => log::warn!("failed to serialize run summary: {err}"),
        }
    }

    overlay.shutdown();
    log::info!(
        "overlay rendered {} frames",
        frames_rendered.load(Ordering::Relaxed)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gameplay() -> GameStage {
        let stage = reduce(GameStage::Boot { progress: 0.0 }, Action::BootComplete);
        let stage = reduce(stage, Action::StartNewRun);
        reduce(stage, Action::SkipTutorial)
    }

    #[test]
    fn test_step_simulation_caps_substeps_and_drops_backlog() {
        let mut accumulator = 10.0;
        let stage = step_simulation(gameplay(), &mut accumulator);
        let GameStage::Gameplay(run) = &stage else {
            panic!("expected gameplay");
        };
        let expected = SIM_DT * MAX_SUBSTEPS as f32;
        assert!((run.stats.time - expected).abs() < 1e-5);
        assert_eq!(accumulator, 0.0);
    }

    #[test]
    fn test_step_simulation_keeps_sub_step_remainder() {
        let mut accumulator = SIM_DT * 2.5;
        let stage = step_simulation(gameplay(), &mut accumulator);
        let GameStage::Gameplay(run) = &stage else {
            panic!("expected gameplay");
        };
        assert!((run.stats.time - SIM_DT * 2.0).abs() < 1e-5);
        assert!((accumulator - SIM_DT * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_demo_stops_on_game_over() {
        let stage = reduce(gameplay(), Action::GameOver);
        let GameStage::Gameplay(run) = &stage else {
            panic!("expected gameplay");
        };
        assert!(run.stats.time < DEMO_SECONDS);
        assert!(demo_finished(run));
    }
}
