//! Stage reducer
//!
//! `reduce` folds one action into the stage tree and returns the next stage.
//! It never throws: unhandled action/state combinations are silent no-ops by
//! design, enforced by exhaustive matching rather than runtime checks.

use super::state::*;
use crate::consts::*;

/// Every action the stage tree understands
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    BootProgress(f32),
    BootComplete,
    StartNewRun,
    ContinueRun,
    AdvanceTutorial,
    SkipTutorial,
    Pause,
    Resume,
    SetCountdown(Option<u8>),
    RegisterEvent(ActiveEvent),
    QueueLevelUp,
    ResolveLevelUp(usize),
    PushNotification(DropNotification),
    TickNotifications(f32),
    Tick(f32),
    GameOver,
    FinishRun,
    ReturnToMenu,
}

/// Fold one action into the stage tree
pub fn reduce(stage: GameStage, action: Action) -> GameStage {
    match (stage, action) {
        (GameStage::Boot { .. }, Action::BootProgress(value)) => GameStage::Boot {
            progress: value.clamp(0.0, 1.0),
        },
        (GameStage::Boot { .. }, Action::BootComplete) => GameStage::StartMenu {
            can_continue: false,
        },

        (GameStage::StartMenu { .. }, Action::StartNewRun) => GameStage::Tutorial { step: 0 },
        // Continuing from the menu always starts a fresh run; no save-state
        // restoration is wired to this path (flagged open question)
        (GameStage::StartMenu { .. }, Action::ContinueRun) => {
            GameStage::Gameplay(RunState::new())
        }

        (GameStage::Tutorial { step }, Action::AdvanceTutorial) => {
            if step + 1 >= TUTORIAL_STEPS {
                GameStage::Gameplay(RunState::new())
            } else {
                GameStage::Tutorial { step: step + 1 }
            }
        }
        (GameStage::Tutorial { .. }, Action::SkipTutorial) => GameStage::Gameplay(RunState::new()),

        (GameStage::Gameplay(run), action) => reduce_gameplay(run, action),

        (GameStage::Results(_), Action::ReturnToMenu) => GameStage::StartMenu {
            can_continue: true,
        },

        // Exhaustive ignore: anything else leaves the stage unchanged
        (stage, _) => stage,
    }
}

fn reduce_gameplay(mut run: RunState, action: Action) -> GameStage {
    match action {
        Action::Pause => {
            if run.substate == Substate::Running {
                run.substate = Substate::Paused;
            }
            GameStage::Gameplay(run)
        }
        Action::Resume => {
            // A pending level-up keeps the run paused until resolved
            if run.substate == Substate::Paused && run.level_up.is_none() {
                run.substate = Substate::Running;
            }
            GameStage::Gameplay(run)
        }
        Action::SetCountdown(value) => {
            run.countdown = value;
            GameStage::Gameplay(run)
        }
        Action::RegisterEvent(event) => {
            run.event = Some(event);
            GameStage::Gameplay(run)
        }
        Action::QueueLevelUp => {
            if run.level_up.is_none() {
                run.level_up = Some(LevelUpPrompt::default());
                run.substate = Substate::Paused;
            }
            GameStage::Gameplay(run)
        }
        Action::ResolveLevelUp(_chosen) => {
            if run.level_up.take().is_some() {
                run.stats.level += 1;
                run.resources.xp = 0.0;
                run.resources.xp_goal *= XP_GOAL_GROWTH;
                run.notifications.push(DropNotification {
                    text: format!("Level {}", run.stats.level),
                    rarity: Rarity::Rare,
                    ttl: 3.0,
                });
            }
            GameStage::Gameplay(run)
        }
        Action::PushNotification(notification) => {
            run.notifications.push(notification);
            GameStage::Gameplay(run)
        }
        Action::TickNotifications(delta) => {
            // Insertion order of survivors is preserved
            for notification in &mut run.notifications {
                notification.ttl -= delta;
            }
            run.notifications.retain(|n| n.ttl > 0.0);
            GameStage::Gameplay(run)
        }
        Action::Tick(delta) => GameStage::Gameplay(tick_run(run, delta)),
        Action::GameOver => {
            run.substate = Substate::GameOver;
            GameStage::Gameplay(run)
        }
        Action::FinishRun => GameStage::Results(RunSummary::from_run(&run)),
        Action::ReturnToMenu => GameStage::StartMenu {
            can_continue: true,
        },
        _ => GameStage::Gameplay(run),
    }
}

/// One gameplay tick. No-op unless the run is actually running.
fn tick_run(mut run: RunState, delta: f32) -> RunState {
    if run.substate != Substate::Running {
        return run;
    }

    // 1. Time, xp trickle, score, kill estimate
    run.stats.time += delta;
    let wave_index = run.wave.index as f32;
    let xp_gain = (18.0 - wave_index).round().max(5.0);
    let xp = run.resources.xp + xp_gain;
    run.stats.score += 25;
    run.stats.kills += (1.0 + wave_index * 0.3).round() as u32;

    // 2. Wave progress and rollover
    let progress = (run.wave.progress + delta / run.wave.goal).min(1.0);
    if progress >= 1.0 {
        run.wave.index += 1;
        run.wave.progress = 0.0;
        run.wave.goal *= WAVE_GOAL_GROWTH;
        run.wave.boss_countdown = run.wave.boss_countdown.saturating_sub(1);

        let rarity = if run.wave.index % 5 == 0 {
            Rarity::Epic
        } else {
            Rarity::Rare
        };
        run.notifications.push(DropNotification {
            text: format!("Wave {} reached", run.wave.index),
            rarity,
            ttl: 4.0,
        });

        if run.event.is_none() {
            run.event = maybe_spawn_event(run.wave.index);
        }
    } else {
        run.wave.progress = progress;
    }

    // 3. Event decay
    if let Some(event) = &mut run.event {
        event.duration -= delta;
        if event.duration <= 0.0 {
            run.event = None;
        }
    }

    // 4. Incoming damage: shield absorbs first, then hp; passive regen only
    // while still alive
    let pressure = if run.event.is_some() {
        EVENT_PRESSURE
    } else {
        1.0
    };
    let damage = (delta * (0.4 + run.wave.index as f32 * 0.15) * pressure).round();
    let absorbed = run.resources.shield.min(damage);
    run.resources.shield -= absorbed;
    let mut hp = run.resources.hp - (damage - absorbed);
    if hp > 0.0 {
        let regen = if matches!(
            run.event,
            Some(ActiveEvent {
                kind: EventKind::Blessing,
                ..
            })
        ) {
            3.0
        } else {
            1.0
        };
        hp = (hp + regen).min(run.resources.max_hp);
    }

    // 5. Level-up threshold
    let level_up_pending = run.level_up.is_none() && xp >= run.resources.xp_goal;

    // 6. Death wins over the level-up prompt in the same tick
    if hp <= 0.0 {
        run.resources.hp = 0.0;
        run.resources.xp = xp;
        run.substate = Substate::GameOver;
        return run;
    }
    run.resources.hp = hp;

    // 7. Commit xp: pinned visually full while a prompt is pending,
    // wrapped modulo the goal otherwise
    if level_up_pending {
        run.level_up = Some(LevelUpPrompt::default());
        run.substate = Substate::Paused;
        run.resources.xp = run.resources.xp_goal;
    } else {
        run.resources.xp = xp % run.resources.xp_goal;
    }

    run
}

/// Deterministic environmental event roll on wave rollover.
///
/// The checks are exclusive returns, not cumulative probability: a wave index
/// divisible by none of {3, 5, 7, 11} spawns nothing. Gameplay balance
/// assumes this exact formula.
fn maybe_spawn_event(wave_index: u32) -> Option<ActiveEvent> {
    let hash = (wave_index * 13) % 100;
    if hash % 3 == 0 {
        Some(ActiveEvent {
            kind: EventKind::Storm,
            duration: 12.0,
        })
    } else if hash % 5 == 0 {
        Some(ActiveEvent {
            kind: EventKind::Fog,
            duration: 10.0,
        })
    } else if hash % 7 == 0 {
        Some(ActiveEvent {
            kind: EventKind::Hazard,
            duration: 8.0,
        })
    } else if hash % 11 == 0 {
        Some(ActiveEvent {
            kind: EventKind::Blessing,
            duration: 9.0,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_gameplay() -> GameStage {
        let stage = GameStage::Boot { progress: 0.0 };
        let stage = reduce(stage, Action::BootComplete);
        let stage = reduce(stage, Action::StartNewRun);
        reduce(stage, Action::SkipTutorial)
    }

    fn unwrap_run(stage: GameStage) -> RunState {
        match stage {
            GameStage::Gameplay(run) => run,
            other => panic!("expected gameplay, got {other:?}"),
        }
    }

    #[test]
    fn test_boot_progress_clamps() {
        let stage = reduce(GameStage::Boot { progress: 0.0 }, Action::BootProgress(1.7));
        assert_eq!(stage, GameStage::Boot { progress: 1.0 });
        let stage = reduce(stage, Action::BootProgress(-0.3));
        assert_eq!(stage, GameStage::Boot { progress: 0.0 });
    }

    #[test]
    fn test_new_run_initial_state() {
        let run = unwrap_run(fresh_gameplay());
        assert_eq!(run.wave.index, 1);
        assert_eq!(run.resources.hp, 120.0);
        assert_eq!(run.stats.level, 1);
        assert_eq!(run.substate, Substate::Running);
    }

    #[test]
    fn test_tutorial_advances_into_gameplay() {
        let stage = reduce(GameStage::Tutorial { step: 0 }, Action::AdvanceTutorial);
        assert_eq!(stage, GameStage::Tutorial { step: 1 });
        let stage = reduce(stage, Action::AdvanceTutorial);
        let stage = reduce(stage, Action::AdvanceTutorial);
        assert!(matches!(stage, GameStage::Gameplay(_)));
    }

    #[test]
    fn test_unhandled_actions_are_no_ops() {
        let menu = GameStage::StartMenu {
            can_continue: false,
        };
        assert_eq!(reduce(menu.clone(), Action::Tick(1.0)), menu);
        assert_eq!(reduce(menu.clone(), Action::Pause), menu);

        let boot = GameStage::Boot { progress: 0.5 };
        assert_eq!(reduce(boot.clone(), Action::StartNewRun), boot);
    }

    #[test]
    fn test_pause_idempotent() {
        let stage = fresh_gameplay();
        let once = reduce(stage.clone(), Action::Pause);
        let twice = reduce(once.clone(), Action::Pause);
        assert_eq!(once, twice);
        assert_eq!(unwrap_run(once).substate, Substate::Paused);
    }

    #[test]
    fn test_resume_blocked_while_level_up_pending() {
        let stage = reduce(fresh_gameplay(), Action::QueueLevelUp);
        let run = unwrap_run(stage.clone());
        assert_eq!(run.substate, Substate::Paused);
        assert!(run.level_up.is_some());

        let run = unwrap_run(reduce(stage, Action::Resume));
        assert_eq!(run.substate, Substate::Paused);
    }

    #[test]
    fn test_resolve_level_up() {
        let stage = reduce(fresh_gameplay(), Action::QueueLevelUp);
        let run = unwrap_run(reduce(stage, Action::ResolveLevelUp(0)));
        assert_eq!(run.stats.level, 2);
        assert_eq!(run.resources.xp, 0.0);
        assert!((run.resources.xp_goal - 135.0).abs() < 1e-4);
        assert!(run.level_up.is_none());
        let last = run.notifications.last().unwrap();
        assert_eq!(last.ttl, 3.0);
    }

    #[test]
    fn test_tick_rolls_wave_and_emits_rare_notification() {
        let run = unwrap_run(reduce(fresh_gameplay(), Action::Tick(60.0)));
        assert_eq!(run.wave.index, 2);
        assert_eq!(run.wave.progress, 0.0);
        assert!((run.wave.goal - 72.0).abs() < 1e-4);
        assert_eq!(run.wave.boss_countdown, 4);

        let wave_notes: Vec<_> = run
            .notifications
            .iter()
            .filter(|n| n.text.starts_with("Wave"))
            .collect();
        assert_eq!(wave_notes.len(), 1);
        // 2 % 5 != 0
        assert_eq!(wave_notes[0].rarity, Rarity::Rare);
        // (2 * 13) % 100 = 26, divisible by none of {3,5,7,11}
        assert!(run.event.is_none());
    }

    #[test]
    fn test_tick_no_op_while_paused() {
        let stage = reduce(fresh_gameplay(), Action::Pause);
        let before = unwrap_run(stage.clone());
        let after = unwrap_run(reduce(stage, Action::Tick(5.0)));
        assert_eq!(before, after);
    }

    #[test]
    fn test_tick_deterministic() {
        // The event roll is hash-based, not random-based, so identical
        // inputs must yield identical outputs
        let stage = fresh_gameplay();
        let a = reduce(stage.clone(), Action::Tick(60.0));
        let b = reduce(stage, Action::Tick(60.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_event_spawns_on_divisible_wave() {
        // Rolling into wave 3: (3 * 13) % 100 = 39, 39 % 3 == 0 -> storm
        let mut run = RunState::new();
        run.wave.index = 2;
        run.wave.progress = 0.99;
        let run = tick_run(run, 1.0);
        assert_eq!(run.wave.index, 3);
        let event = run.event.expect("storm should spawn");
        assert_eq!(event.kind, EventKind::Storm);
    }

    #[test]
    fn test_shield_absorbs_before_hp() {
        let mut run = RunState::new();
        run.wave.index = 10;
        let hp_before = run.resources.hp;
        let run = tick_run(run, 1.0);
        // damage = round(1 * (0.4 + 10*0.15)) = 2, absorbed by shield
        assert_eq!(run.resources.shield, STARTING_SHIELD - 2.0);
        // hp regenerates +1, clamped to max
        assert_eq!(run.resources.hp, hp_before.min(run.resources.max_hp));
    }

    #[test]
    fn test_game_over_wins_over_level_up() {
        let mut run = RunState::new();
        run.resources.hp = 1.0;
        run.resources.shield = 0.0;
        run.resources.xp = run.resources.xp_goal - 1.0;
        // damage = round(1 * 0.55) = 1 -> hp hits 0 in the same tick the
        // xp threshold is crossed
        let run = tick_run(run, 1.0);
        assert_eq!(run.substate, Substate::GameOver);
        assert!(run.level_up.is_none());
        assert_eq!(run.resources.hp, 0.0);
    }

    #[test]
    fn test_level_up_pauses_and_pins_xp() {
        let mut run = RunState::new();
        run.resources.xp = run.resources.xp_goal - 1.0;
        let run = tick_run(run, 0.5);
        assert_eq!(run.substate, Substate::Paused);
        assert!(run.level_up.is_some());
        assert_eq!(run.resources.xp, run.resources.xp_goal);
    }

    #[test]
    fn test_notifications_expire_in_order() {
        let mut run = RunState::new();
        run.notifications = vec![
            DropNotification {
                text: "a".into(),
                rarity: Rarity::Common,
                ttl: 0.5,
            },
            DropNotification {
                text: "b".into(),
                rarity: Rarity::Rare,
                ttl: 2.0,
            },
            DropNotification {
                text: "c".into(),
                rarity: Rarity::Epic,
                ttl: 1.5,
            },
        ];
        let run = unwrap_run(reduce(
            GameStage::Gameplay(run),
            Action::TickNotifications(1.0),
        ));
        let texts: Vec<_> = run.notifications.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn test_finish_run_and_return_to_menu() {
        let stage = reduce(fresh_gameplay(), Action::Tick(1.0));
        let stage = reduce(stage, Action::FinishRun);
        let GameStage::Results(summary) = &stage else {
            panic!("expected results");
        };
        assert_eq!(summary.wave, 1);
        assert_eq!(summary.score, 25);

        let stage = reduce(stage, Action::ReturnToMenu);
        assert_eq!(
            stage,
            GameStage::StartMenu {
                can_continue: true
            }
        );
    }

    #[test]
    fn test_continue_run_starts_fresh() {
        let menu = GameStage::StartMenu {
            can_continue: true,
        };
        let run = unwrap_run(reduce(menu, Action::ContinueRun));
        assert_eq!(run, RunState::new());
    }
}
