//! Tests for the simulation engine: detection, combat, lifecycle and timers.

use glam::Vec3;

use skirmish_arena::{Aabb, Arena};
use skirmish_core::commands::SimCommand;
use skirmish_core::components::*;
use skirmish_core::config::AiConfig;
use skirmish_core::constants::FIXED_DT;
use skirmish_core::enums::*;
use skirmish_core::events::SimEvent;
use skirmish_core::state::{ActorView, SimSnapshot};
use skirmish_core::types::{ActorId, Affiliation};

use crate::engine::{ArenaSimulation, SimConfig, SimulationEngine};
use crate::error::SimError;
use crate::systems::weapons::try_fire;
use crate::timers::TimerAction;
use crate::world_setup::{default_weapon, ActorSpec};

const DT: f32 = 0.1;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn engine_with(arena: Arena) -> ArenaSimulation {
    init_tracing();
    SimulationEngine::new(SimConfig::default(), arena).unwrap()
}

/// A bot that never walks, so geometry stays exactly as set up.
fn rooted_config() -> AiConfig {
    let mut config = AiConfig::default();
    config.navigation.ground_speed = 0.0;
    config
}

fn rooted_bot(position: Vec3) -> ActorSpec {
    ActorSpec::bot("sentry", 0, position).with_config(rooted_config())
}

fn view(snapshot: &SimSnapshot, id: ActorId) -> &ActorView {
    snapshot.actors.iter().find(|a| a.id == id).unwrap()
}

fn run_frames(engine: &mut ArenaSimulation, frames: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..frames {
        engine.frame(DT);
        events.extend(engine.drain_events());
    }
    events
}

fn count(events: &[SimEvent], pred: impl Fn(&SimEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

fn wall_arena() -> Arena {
    let mut arena = Arena::flat(200.0);
    arena.add_wall(Aabb::new(Vec3::new(-5.0, 0.0, 9.0), Vec3::new(5.0, 4.0, 10.0)));
    arena
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let build = || {
        let mut engine = engine_with(Arena::flat(100.0));
        engine
            .spawn(ActorSpec::bot("red", 0, Vec3::new(0.0, 0.0, -15.0)))
            .unwrap();
        engine
            .spawn(ActorSpec::bot("blue", 1, Vec3::new(3.0, 0.0, 15.0)).with_yaw(std::f32::consts::PI))
            .unwrap();
        engine
    };
    let mut engine_a = build();
    let mut engine_b = build();

    for _ in 0..200 {
        let snap_a = engine_a.frame(DT);
        let snap_b = engine_b.frame(DT);

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

// ---- Perception ----

#[test]
fn test_unobstructed_hostile_detected_on_first_frame() {
    let mut engine = engine_with(Arena::flat(200.0));
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    let player = engine
        .spawn(ActorSpec::player("alice", 1, Vec3::new(0.0, 0.0, 50.0)))
        .unwrap();

    let snap = engine.frame(DT);
    let me = view(&snap, bot);
    assert!(me.is_seeing_target);
    assert_eq!(me.known_target, Some(player));

    let mut events = engine.drain_events();
    events.extend(run_frames(&mut engine, 20));
    assert_eq!(
        count(&events, |e| matches!(e, SimEvent::TargetDetected { .. })),
        1,
        "detection fires exactly once"
    );
    assert!(events.contains(&SimEvent::StateChanged {
        actor: bot,
        from: AiState::Patrol,
        to: AiState::Follow,
    }));
}

#[test]
fn test_occluded_target_lost_after_timeout() {
    let mut engine = engine_with(wall_arena());
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    let player = engine
        .spawn(ActorSpec::player("alice", 1, Vec3::new(15.0, 0.0, 20.0)))
        .unwrap();

    let snap = engine.frame(DT);
    assert_eq!(view(&snap, bot).known_target, Some(player));
    engine.drain_events();

    // Step behind the wall
    engine.queue_command(SimCommand::MoveActor {
        actor: player,
        position: Vec3::new(0.0, 0.0, 20.0),
        yaw: 0.0,
    });

    let mut lost_at = Vec::new();
    for _ in 0..50 {
        let snap = engine.frame(DT);
        let events = engine.drain_events();
        let lost = count(&events, |e| *e == SimEvent::TargetLost { actor: bot });
        for _ in 0..lost {
            lost_at.push(snap.time.elapsed_secs);
        }
    }

    assert_eq!(lost_at.len(), 1, "target lost exactly once");
    // Last seen at t = 0.1 with a 4 s timeout
    assert!(lost_at[0] > 4.05, "lost too early at {}", lost_at[0]);
    assert!(lost_at[0] < 4.35, "lost too late at {}", lost_at[0]);
}

#[test]
fn test_dead_target_forgotten_next_frame() {
    let mut engine = engine_with(Arena::flat(200.0));
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    let player = engine
        .spawn(ActorSpec::player("alice", 1, Vec3::new(0.0, 0.0, 80.0)))
        .unwrap();

    engine.frame(DT);
    engine.drain_events();

    engine.queue_command(SimCommand::Damage {
        target: player,
        source: None,
        amount: 1000.0,
    });
    let snap = engine.frame(DT);
    let events = engine.drain_events();

    assert!(view(&snap, player).dead);
    assert_eq!(view(&snap, bot).known_target, None);
    assert!(events.contains(&SimEvent::TargetLost { actor: bot }));
    assert!(events.contains(&SimEvent::Killed {
        victim: player,
        killer: None,
        cause: DeathCause::Environment,
    }));
}

#[test]
fn test_ignore_detection_range_command() {
    let mut engine = engine_with(Arena::flat(200.0));
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    let player = engine
        .spawn(ActorSpec::player("alice", 1, Vec3::new(0.0, 0.0, 150.0)))
        .unwrap();

    let snap = engine.frame(DT);
    assert_eq!(view(&snap, bot).known_target, None, "beyond default range");

    engine.queue_command(SimCommand::SetIgnoreDetectionRange { enabled: true });
    let snap = engine.frame(DT);
    assert_eq!(view(&snap, bot).known_target, Some(player));

    let entity = engine.entity(bot).unwrap();
    let detection = engine.world().get::<&DetectionState>(entity).unwrap();
    assert_eq!(detection.detection_range, 1000.0);
}

#[test]
fn test_auto_random_target_picks_nearest_hostile() {
    let mut engine = engine_with(wall_arena());
    let mut config = rooted_config();
    config.detection.auto_random_target = true;
    let bot = engine
        .spawn(ActorSpec::bot("hunter", 0, Vec3::ZERO).with_config(config))
        .unwrap();
    // Hidden behind the wall and out of range respectively
    let near = engine
        .spawn(ActorSpec::player("near", 1, Vec3::new(0.0, 0.0, 20.0)))
        .unwrap();
    engine
        .spawn(ActorSpec::player("far", 1, Vec3::new(0.0, 0.0, -150.0)))
        .unwrap();

    let events = run_frames(&mut engine, 60);
    let snap = engine.snapshot();
    assert_eq!(view(&snap, bot).known_target, Some(near));
    assert!(
        count(&events, |e| matches!(e, SimEvent::TargetLost { .. })) == 0,
        "auto target never times out"
    );
}

// ---- Damage reaction ----

#[test]
fn test_damage_reaction_targets_attacker() {
    let mut engine = engine_with(Arena::flat(200.0));
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    let player = engine
        .spawn(ActorSpec::player("sniper", 1, Vec3::new(0.0, 0.0, 150.0)))
        .unwrap();

    engine.frame(DT);
    engine.queue_command(SimCommand::Damage {
        target: bot,
        source: Some(player),
        amount: 10.0,
    });
    run_frames(&mut engine, 30);
    assert_eq!(
        view(&engine.snapshot(), bot).known_target,
        None,
        "reaction waits for the known-target timeout"
    );

    run_frames(&mut engine, 15);
    assert_eq!(view(&engine.snapshot(), bot).known_target, Some(player));
}

#[test]
fn test_damage_reaction_dropped_after_death() {
    let mut engine = engine_with(Arena::flat(200.0));
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    let player = engine
        .spawn(ActorSpec::player("sniper", 1, Vec3::new(0.0, 0.0, 150.0)))
        .unwrap();

    engine.frame(DT);
    engine.queue_command(SimCommand::Damage {
        target: bot,
        source: Some(player),
        amount: 10.0,
    });
    engine.frame(DT);
    engine.queue_command(SimCommand::Damage {
        target: bot,
        source: None,
        amount: 1000.0,
    });

    let events = run_frames(&mut engine, 50);
    assert!(events.contains(&SimEvent::Respawned {
        actor: bot,
        position: Vec3::ZERO,
    }));
    let snap = engine.snapshot();
    assert!(!view(&snap, bot).dead);
    assert_eq!(view(&snap, bot).known_target, None, "stale reaction ignored");
}

#[test]
fn test_self_damage_schedules_no_reaction() {
    let mut engine = engine_with(Arena::flat(200.0));
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    engine.frame(DT);

    engine.queue_command(SimCommand::Damage {
        target: bot,
        source: Some(bot),
        amount: 5.0,
    });
    engine.frame(DT);

    let entity = engine.entity(bot).unwrap();
    let pending = engine.timers().count(entity, TimerAction::DamageReaction { attacker: bot });
    assert_eq!(pending, 0);
    let detection = engine.world().get::<&DetectionState>(entity).unwrap();
    assert!(!detection.damage_reaction_pending);
}

// ---- Combat ----

#[test]
fn test_bots_engage_and_kill() {
    let mut engine = engine_with(Arena::flat(100.0));
    let red = engine
        .spawn(ActorSpec::bot("red", 0, Vec3::new(0.0, 0.0, -10.0)))
        .unwrap();
    let blue = engine
        .spawn(ActorSpec::bot("blue", 1, Vec3::new(0.0, 0.0, 10.0)).with_yaw(std::f32::consts::PI))
        .unwrap();

    let events = run_frames(&mut engine, 100);

    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::ShotFired { hit: Some(_), .. }
    )));
    let kills: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Killed { victim, killer, .. } => Some((*victim, *killer)),
            _ => None,
        })
        .collect();
    assert!(!kills.is_empty(), "someone died");
    for (victim, killer) in kills {
        assert!(victim == red || victim == blue);
        assert!(killer.is_some() && killer != Some(victim));
    }
    let snap = engine.snapshot();
    assert!(view(&snap, red).kills + view(&snap, blue).kills >= 1);
}

#[test]
fn test_teammates_are_not_targeted() {
    let mut engine = engine_with(Arena::flat(100.0));
    let a = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();
    engine
        .spawn(ActorSpec::bot("buddy", 0, Vec3::new(0.0, 0.0, 10.0)))
        .unwrap();

    let events = run_frames(&mut engine, 20);
    assert_eq!(view(&engine.snapshot(), a).known_target, None);
    assert_eq!(count(&events, |e| matches!(e, SimEvent::ShotFired { .. })), 0);
}

#[test]
fn test_equip_weapon_updates_ranges() {
    let mut engine = engine_with(Arena::flat(100.0));
    let bot = engine.spawn(rooted_bot(Vec3::ZERO)).unwrap();

    let weapon = WeaponBinding {
        name: "shotgun".into(),
        attack_range: 8.0,
        stop_range: 3.0,
        ..default_weapon()
    };
    engine.queue_command(SimCommand::EquipWeapon { actor: bot, weapon });
    engine.frame(DT);

    let entity = engine.entity(bot).unwrap();
    let combat = engine.world().get::<&CombatState>(entity).unwrap();
    assert_eq!(combat.dynamic_attack_range, 8.0);
    assert_eq!(combat.dynamic_stop_attack_range, 3.0);
    assert_eq!(engine.world().get::<&WeaponBinding>(entity).unwrap().name, "shotgun");
}

#[test]
fn test_try_fire_cadence_and_swap_delay() {
    let weapon = WeaponBinding {
        shot_interval: 0.5,
        swap_delay: 1.0,
        ..default_weapon()
    };
    let mut runtime = WeaponRuntime {
        last_shot_at: None,
        equipped_at: 2.0,
    };

    assert!(!try_fire(&mut runtime, &weapon, 2.5), "still swapping");
    assert!(try_fire(&mut runtime, &weapon, 3.0));
    assert!(!try_fire(&mut runtime, &weapon, 3.2));
    assert!(try_fire(&mut runtime, &weapon, 3.5));
    assert_eq!(runtime.last_shot_at, Some(3.5));
}

// ---- Navigation ----

#[test]
fn test_patrol_walks_and_jumps_obstacle() {
    let mut arena = Arena::flat(100.0);
    arena.add_wall(Aabb::new(Vec3::new(-5.0, 0.0, 9.0), Vec3::new(5.0, 1.0, 10.0)));
    arena.add_link(Aabb::new(Vec3::new(-5.0, 0.0, 7.0), Vec3::new(5.0, 2.0, 12.0)));
    let mut engine = engine_with(arena);

    let bot = engine
        .spawn(ActorSpec::bot("runner", 0, Vec3::ZERO).with_patrol(vec![Vec3::new(0.0, 0.0, 20.0)]))
        .unwrap();

    let events = run_frames(&mut engine, 50);
    assert!(count(&events, |e| matches!(e, SimEvent::Jumped { actor, .. } if *actor == bot)) >= 1);

    let snap = engine.snapshot();
    let me = view(&snap, bot);
    assert!(me.position.z > 12.0, "cleared the wall, at {:?}", me.position);
    assert!(me.position.y.abs() < 0.01);

    let entity = engine.entity(bot).unwrap();
    let body = engine.world().get::<&Body>(entity).unwrap();
    assert!(body.grounded && !body.airborne);
}

#[test]
fn test_jumping_bot_faces_away_from_obstacle() {
    let mut arena = Arena::flat(100.0);
    arena.add_wall(Aabb::new(Vec3::new(-5.0, 0.0, 9.0), Vec3::new(5.0, 1.0, 10.0)));
    arena.add_link(Aabb::new(Vec3::new(-5.0, 0.0, 7.0), Vec3::new(5.0, 2.0, 12.0)));
    let mut engine = engine_with(arena);

    // Diagonal route, so the walking heading differs from the wall's facing
    let bot = engine
        .spawn(ActorSpec::bot("runner", 0, Vec3::new(-2.0, 0.0, 0.0)).with_patrol(vec![Vec3::new(2.0, 0.0, 20.0)]))
        .unwrap();
    let entity = engine.entity(bot).unwrap();

    let mut walking_yaw = None;
    let mut was_jumping = false;
    let mut turned_mid_air = false;
    let mut landed = false;
    for _ in 0..50 {
        engine.frame(DT);
        let body = *engine.world().get::<&Body>(entity).unwrap();
        let jump = *engine.world().get::<&JumpState>(entity).unwrap();

        if body.airborne {
            assert!(jump.jumping_link);
            if was_jumping {
                // Combat ran with the bot already in the air
                assert!(body.yaw.abs() < 0.01, "yaw {} while over the wall", body.yaw);
                turned_mid_air = true;
            }
            was_jumping = true;
        } else {
            assert!(!jump.jumping_link);
            if was_jumping {
                landed = true;
            } else if body.position.z > 1.0 {
                walking_yaw = Some(body.yaw);
            }
        }
    }

    let walking_yaw = walking_yaw.unwrap();
    assert!(walking_yaw.abs() > 0.1, "walking yaw {walking_yaw}");
    assert!(turned_mid_air);
    assert!(landed);
}

#[test]
fn test_jump_timers_use_physics_step_time() {
    let mut arena = Arena::flat(100.0);
    arena.add_wall(Aabb::new(Vec3::new(-5.0, 0.0, 9.0), Vec3::new(5.0, 1.0, 10.0)));
    arena.add_link(Aabb::new(Vec3::new(-5.0, 0.0, 7.0), Vec3::new(5.0, 2.0, 12.0)));
    let mut engine = engine_with(arena);

    // Starts on the link facing the wall, so it takes off on the first step
    let bot = engine
        .spawn(ActorSpec::bot("runner", 0, Vec3::new(0.0, 0.0, 7.5)).with_patrol(vec![Vec3::new(0.0, 0.0, 20.0)]))
        .unwrap();
    let entity = engine.entity(bot).unwrap();

    let frame = 8.0 * FIXED_DT;
    engine.frame(frame);
    let events = engine.drain_events();
    assert_eq!(count(&events, |e| matches!(e, SimEvent::Jumped { .. })), 1);

    let cfg = AiConfig::default().navigation;
    let now = engine.time().elapsed_secs;
    let check = engine.timers().next_deadline(entity, TimerAction::ObstacleCheck).unwrap();
    let took_off = check - cfg.delay_obstacle_check;
    assert!(took_off > 0.0 && took_off < now - 0.5 * frame, "took off at {took_off}, frame ended at {now}");

    let rearm = engine.timers().next_deadline(entity, TimerAction::JumpRearm).unwrap();
    assert!((rearm - check - cfg.jump_cooldown).abs() < 1e-4);
}

#[test]
fn test_assign_patrol_path_starts_at_closest_node() {
    let mut engine = engine_with(Arena::flat(100.0));
    let bot = engine.spawn(rooted_bot(Vec3::new(9.0, 0.0, 0.0))).unwrap();

    engine.queue_command(SimCommand::AssignPatrolPath {
        actor: bot,
        nodes: vec![
            Vec3::new(-10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, 20.0),
        ],
        direction: PatrolDirection::Reverse,
    });
    engine.frame(DT);

    let entity = engine.entity(bot).unwrap();
    let route = engine.world().get::<&PatrolRoute>(entity).unwrap();
    assert_eq!(route.index, 1);
    assert_eq!(route.direction, PatrolDirection::Reverse);
}

// ---- Lifecycle ----

#[test]
fn test_respawn_with_invulnerability() {
    let mut engine = engine_with(Arena::flat(100.0));
    let bot = engine.spawn(rooted_bot(Vec3::new(1.0, 0.0, 2.0))).unwrap();
    let player = engine
        .spawn(ActorSpec::player("alice", 1, Vec3::new(0.0, 0.0, -150.0)))
        .unwrap();
    engine.frame(DT);

    engine.queue_command(SimCommand::Damage {
        target: bot,
        source: Some(player),
        amount: 500.0,
    });
    engine.frame(DT);
    let snap = engine.snapshot();
    assert!(view(&snap, bot).dead);
    assert_eq!(view(&snap, player).kills, 1);

    let events = run_frames(&mut engine, 35);
    assert!(events.contains(&SimEvent::Respawned {
        actor: bot,
        position: Vec3::new(1.0, 0.0, 2.0),
    }));
    let snap = engine.snapshot();
    assert!(!view(&snap, bot).dead);
    assert_eq!(view(&snap, bot).ai_state, Some(AiState::Follow));

    engine.queue_command(SimCommand::Damage {
        target: bot,
        source: None,
        amount: 50.0,
    });
    let snap = engine.frame(DT);
    assert!(view(&snap, bot).health > 99.0, "invulnerable after respawn");

    run_frames(&mut engine, 25);
    engine.queue_command(SimCommand::Damage {
        target: bot,
        source: None,
        amount: 50.0,
    });
    engine.frame(DT);
    let events = engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::Damaged { target, amount, .. } if *target == bot && *amount == 50.0
    )));
}

#[test]
fn test_kill_height_poll() {
    let mut engine = engine_with(Arena::flat(100.0));
    let player = engine
        .spawn(ActorSpec::player("faller", 0, Vec3::ZERO))
        .unwrap();
    engine.frame(DT);

    engine.queue_command(SimCommand::MoveActor {
        actor: player,
        position: Vec3::new(0.0, -60.0, 0.0),
        yaw: 0.0,
    });
    let events = run_frames(&mut engine, 5);
    assert!(events.contains(&SimEvent::Killed {
        victim: player,
        killer: None,
        cause: DeathCause::Environment,
    }));
}

#[test]
fn test_passive_heal_caps_at_max() {
    let mut engine = engine_with(Arena::flat(100.0));
    let player = engine
        .spawn(ActorSpec::player("alice", 0, Vec3::ZERO))
        .unwrap();
    engine.queue_command(SimCommand::Damage {
        target: player,
        source: None,
        amount: 7.0,
    });
    engine.frame(DT);
    assert_eq!(view(&engine.snapshot(), player).health, 93.0);

    run_frames(&mut engine, 25);
    assert_eq!(view(&engine.snapshot(), player).health, 100.0);
}

#[test]
fn test_pause_freezes_everything() {
    let mut engine = engine_with(Arena::flat(100.0));
    let bot = engine
        .spawn(ActorSpec::bot("runner", 0, Vec3::ZERO).with_patrol(vec![Vec3::new(0.0, 0.0, 40.0)]))
        .unwrap();
    run_frames(&mut engine, 5);

    engine.queue_command(SimCommand::Pause);
    let before = engine.frame(DT);
    assert_eq!(before.phase, SimPhase::Paused);
    for _ in 0..10 {
        let snap = engine.frame(DT);
        assert_eq!(snap.time, before.time);
        assert_eq!(view(&snap, bot).position, view(&before, bot).position);
    }

    engine.queue_command(SimCommand::Resume);
    let after = engine.frame(DT);
    assert_eq!(after.phase, SimPhase::Running);
    assert!(view(&after, bot).position.z > view(&before, bot).position.z);
}

// ---- Errors ----

#[test]
fn test_invalid_team_rejected() {
    let mut engine = engine_with(Arena::flat(10.0));
    let err = engine
        .spawn(ActorSpec::bot("lost", 5, Vec3::ZERO))
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidTeam {
            team: Affiliation(5),
            team_count: 2
        }
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = AiConfig::default();
    config.combat.muzzle_max_cast_attempts = 0;

    let result = SimulationEngine::new(
        SimConfig {
            ai: config.clone(),
            ..Default::default()
        },
        Arena::flat(10.0),
    );
    assert!(matches!(result, Err(SimError::Config(_))));

    let mut engine = engine_with(Arena::flat(10.0));
    let err = engine
        .spawn(ActorSpec::bot("broken", 0, Vec3::ZERO).with_config(config))
        .unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
}

#[test]
fn test_unknown_actor_command_is_ignored() {
    let mut engine = engine_with(Arena::flat(10.0));
    assert!(matches!(
        engine.entity(ActorId(99)),
        Err(SimError::UnknownActor(ActorId(99)))
    ));

    engine.queue_command(SimCommand::Damage {
        target: ActorId(99),
        source: None,
        amount: 10.0,
    });
    engine.frame(DT);
    assert!(engine.drain_events().is_empty());
}

// ---- Config ----

#[test]
fn test_sim_config_from_partial_json() {
    let config: SimConfig = serde_json::from_str(r#"{ "seed": 7 }"#).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.team_count, 2);
    assert_eq!(config.ai, AiConfig::default());
}
