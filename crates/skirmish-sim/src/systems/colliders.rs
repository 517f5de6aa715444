//! Mirror actor bodies into the environment's collision volumes.

use hecs::World;

use skirmish_ai::query::ActorColliders;
use skirmish_core::components::{ActorInfo, Body, Health};
use skirmish_core::constants::{ACTOR_HEIGHT, ACTOR_RADIUS};

/// Living actors get a hit volume at their current position; dead ones lose it.
pub fn run(world: &World, env: &mut impl ActorColliders) {
    let mut query = world.query::<(&ActorInfo, &Body, &Health)>();
    for (_entity, (info, body, health)) in query.iter() {
        if health.dead {
            env.remove_actor(info.id);
        } else {
            env.upsert_actor(info.id, body.position, ACTOR_RADIUS, ACTOR_HEIGHT);
        }
    }
}
