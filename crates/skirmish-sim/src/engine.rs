//! Simulation engine: the frame loop of the combat AI.
//!
//! `SimulationEngine` owns the hecs ECS world, the timer queue and the
//! environment, processes host commands, runs all systems and produces
//! `SimSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::{HashMap, VecDeque};

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use skirmish_ai::fsm::{on_weapon_switched, release_settle};
use skirmish_ai::query::Environment;
use skirmish_arena::Arena;
use skirmish_core::commands::SimCommand;
use skirmish_core::components::*;
use skirmish_core::config::AiConfig;
use skirmish_core::constants::{DEFAULT_TEAM_COUNT, FIXED_DT, MAX_PHYSICS_STEPS_PER_FRAME};
use skirmish_core::enums::SimPhase;
use skirmish_core::events::SimEvent;
use skirmish_core::state::SimSnapshot;
use skirmish_core::types::{ActorId, SimTime};

use crate::error::{Result, SimError};
use crate::systems;
use crate::timers::{DueTimer, TimerAction, TimerQueue};
use crate::world_setup::{self, ActorSpec};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Number of teams. Every other team is hostile.
    pub team_count: u32,
    /// Profile for actors spawned without their own.
    pub ai: AiConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            team_count: DEFAULT_TEAM_COUNT,
            ai: AiConfig::default(),
        }
    }
}

/// Engine running on the built-in box arena.
pub type ArenaSimulation = SimulationEngine<Arena>;

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine<E> {
    world: World,
    env: E,
    time: SimTime,
    phase: SimPhase,
    rng: ChaCha8Rng,
    timers: TimerQueue,
    command_queue: VecDeque<SimCommand>,
    events: Vec<SimEvent>,
    physics_accumulator: f32,
    next_actor_id: u32,
    team_count: u32,
    default_ai: AiConfig,
    actors: HashMap<ActorId, Entity>,
}

impl<E: Environment> SimulationEngine<E> {
    /// Create a new simulation engine over `env`.
    pub fn new(config: SimConfig, env: E) -> Result<Self> {
        config.ai.validate()?;
        Ok(Self {
            world: World::new(),
            env,
            time: SimTime::default(),
            phase: SimPhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            timers: TimerQueue::new(),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            physics_accumulator: 0.0,
            next_actor_id: 0,
            team_count: config.team_count,
            default_ai: config.ai,
            actors: HashMap::new(),
        })
    }

    /// Bring a new actor into the world and start its first life.
    pub fn spawn(&mut self, spec: ActorSpec) -> Result<ActorId> {
        let id = ActorId(self.next_actor_id);
        let now = self.time.elapsed_secs;
        let entity = world_setup::spawn_actor(
            &mut self.world,
            id,
            spec,
            self.team_count,
            &self.default_ai,
            now,
        )?;
        self.next_actor_id += 1;
        self.actors.insert(id, entity);

        let (config, is_bot) = {
            let mut query = self
                .world
                .query_one::<(&AiConfig, Option<&Bot>)>(entity)
                .map_err(|_| SimError::UnknownActor(id))?;
            let (config, bot) = query.get().ok_or(SimError::UnknownActor(id))?;
            (config.clone(), bot.is_some())
        };
        systems::health::schedule_life_timers(&mut self.timers, entity, 0, &config, is_bot, now);
        Ok(id)
    }

    /// Queue a host command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one frame of `dt` seconds and return the
    /// resulting snapshot.
    pub fn frame(&mut self, dt: f32) -> SimSnapshot {
        self.process_commands();

        if self.phase == SimPhase::Running {
            let dt = dt.max(0.0);
            self.time.advance(dt);
            self.fire_timers();
            self.run_systems(dt);
            self.run_physics(dt);
        }

        self.snapshot()
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SimSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.time, self.phase)
    }

    /// Get the current simulation phase.
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Entity of an actor.
    pub fn entity(&self, id: ActorId) -> Result<Entity> {
        self.actors
            .get(&id)
            .copied()
            .ok_or(SimError::UnknownActor(id))
    }

    /// Pending timers, for tests and diagnostics.
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    fn process_commands(&mut self) {
        while let Some(cmd) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(cmd) {
                warn!(%err, "command rejected");
            }
        }
    }

    fn handle_command(&mut self, cmd: SimCommand) -> Result<()> {
        let now = self.time.elapsed_secs;
        match cmd {
            SimCommand::Pause => {
                self.phase = SimPhase::Paused;
            }
            SimCommand::Resume => {
                self.phase = SimPhase::Running;
            }
            SimCommand::SetIgnoreDetectionRange { enabled } => {
                self.default_ai.detection.ignore_detection_range = enabled;
                systems::perception::set_ignore_detection_range(&mut self.world, enabled);
            }
            SimCommand::AssignPatrolPath {
                actor,
                nodes,
                direction,
            } => {
                let entity = self.entity(actor)?;
                let position = self
                    .world
                    .get::<&Body>(entity)
                    .map_err(|_| SimError::UnknownActor(actor))?
                    .position;
                let mut route = self
                    .world
                    .get::<&mut PatrolRoute>(entity)
                    .map_err(|_| SimError::UnknownActor(actor))?;
                *route = world_setup::patrol_route(nodes, direction, position);
            }
            SimCommand::EquipWeapon { actor, weapon } => {
                let entity = self.entity(actor)?;
                if let Ok(mut combat) = self.world.get::<&mut CombatState>(entity) {
                    on_weapon_switched(&mut combat, &weapon);
                }
                if let Ok(mut runtime) = self.world.get::<&mut WeaponRuntime>(entity) {
                    runtime.equipped_at = now;
                }
                self.world
                    .insert_one(entity, weapon)
                    .map_err(|_| SimError::UnknownActor(actor))?;
            }
            SimCommand::Damage {
                target,
                source,
                amount,
            } => {
                let entity = self.entity(target)?;
                systems::health::apply_damage(
                    &mut self.world,
                    entity,
                    source,
                    amount,
                    now,
                    &mut self.timers,
                    &mut self.events,
                );
            }
            SimCommand::MoveActor {
                actor,
                position,
                yaw,
            } => {
                let entity = self.entity(actor)?;
                let mut body = self
                    .world
                    .get::<&mut Body>(entity)
                    .map_err(|_| SimError::UnknownActor(actor))?;
                body.position = position;
                body.yaw = yaw;
            }
        }
        Ok(())
    }

    /// Run every timer whose deadline has passed.
    fn fire_timers(&mut self) {
        let now = self.time.elapsed_secs;
        while let Some(due) = self.timers.pop_due(now) {
            if self.timer_is_live(&due) {
                self.dispatch_timer(due, now);
            }
        }
    }

    /// The actor still exists and is in the same life; only respawn runs while dead.
    fn timer_is_live(&self, due: &DueTimer) -> bool {
        let Ok(mut query) = self.world.query_one::<(&Life, &Health)>(due.entity) else {
            return false;
        };
        query.get().is_some_and(|(life, health)| {
            life.generation == due.generation
                && (due.action == TimerAction::Respawn || !health.dead)
        })
    }

    fn dispatch_timer(&mut self, due: DueTimer, now: f32) {
        let entity = due.entity;
        match due.action {
            TimerAction::DamageReaction { attacker } => {
                let roster = systems::roster::build(&self.world);
                systems::perception::react_to_attacker(&mut self.world, entity, attacker, &roster, now);
            }
            TimerAction::SettleRelease => {
                if let Ok(mut combat) = self.world.get::<&mut CombatState>(entity) {
                    release_settle(&mut combat);
                }
            }
            TimerAction::ObstacleCheck => {
                if let Ok(mut jump) = self.world.get::<&mut JumpState>(entity) {
                    jump.obstacle_check = true;
                }
            }
            TimerAction::JumpRearm => {
                if let Ok(mut jump) = self.world.get::<&mut JumpState>(entity) {
                    jump.armed = true;
                }
            }
            TimerAction::KillHeightPoll => {
                systems::health::poll_kill_height(
                    &mut self.world,
                    entity,
                    now,
                    &mut self.timers,
                    &mut self.events,
                );
            }
            TimerAction::PassiveHeal => {
                systems::health::passive_heal(&mut self.world, entity, now, &mut self.timers);
            }
            TimerAction::AcquireTarget => {
                let roster = systems::roster::build(&self.world);
                systems::perception::acquire_target(&mut self.world, entity, &roster, now);
            }
            TimerAction::Respawn => {
                systems::health::respawn(
                    &mut self.world,
                    entity,
                    now,
                    &mut self.timers,
                    &mut self.events,
                );
            }
            TimerAction::InvulnerabilityEnd => {
                systems::health::end_invulnerability(&mut self.world, entity);
            }
        }
    }

    /// Run the per-frame systems in order.
    fn run_systems(&mut self, dt: f32) {
        let now = self.time.elapsed_secs;

        // 1. Collision volumes and the roster snapshot for this frame
        systems::colliders::run(&self.world, &mut self.env);
        let roster = systems::roster::build(&self.world);
        systems::navigation::sync_agents(&mut self.world);

        // 2. Perception
        let perception_events = systems::perception::run(&mut self.world, &roster, &self.env, now);

        // 3. Combat state machine
        systems::combat::apply_perception_events(&mut self.world, perception_events, &mut self.events);
        let requests = systems::combat::run(
            &mut self.world,
            &roster,
            &self.env,
            &mut self.rng,
            &mut self.timers,
            now,
            dt,
            &mut self.events,
        );

        // 4. Weapons
        let hits = systems::weapons::run(&mut self.world, requests, &roster, &self.env, now, &mut self.events);
        for hit in hits {
            if let Some(&entity) = self.actors.get(&hit.target) {
                systems::health::apply_damage(
                    &mut self.world,
                    entity,
                    Some(hit.source),
                    hit.amount,
                    now,
                    &mut self.timers,
                    &mut self.events,
                );
            }
        }

        // 5. Navigation agents
        systems::navigation::run(&mut self.world, &self.env, dt);
    }

    /// Fixed-step movement, at most `MAX_PHYSICS_STEPS_PER_FRAME` steps per frame.
    fn run_physics(&mut self, dt: f32) {
        let now = self.time.elapsed_secs;
        self.physics_accumulator += dt;

        let mut steps = 0;
        while self.physics_accumulator >= FIXED_DT {
            if steps == MAX_PHYSICS_STEPS_PER_FRAME {
                // Drop the backlog
                self.physics_accumulator = 0.0;
                break;
            }
            self.physics_accumulator -= FIXED_DT;
            // Time at the end of this step within the frame
            let step_time = now - self.physics_accumulator;
            systems::locomotion::step(
                &mut self.world,
                &self.env,
                &mut self.timers,
                step_time,
                FIXED_DT,
                &mut self.events,
            );
            steps += 1;
        }
    }
}
