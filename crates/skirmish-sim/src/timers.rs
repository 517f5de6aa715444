//! Deferred one-shot actions.
//!
//! Every "wait N seconds then do X" behaviour is an entry in one global
//! queue keyed by deadline. Each entry remembers the entity and the life
//! generation it was scheduled in; the engine drops entries whose actor is
//! gone or has died since.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hecs::Entity;
use skirmish_core::types::ActorId;

/// What to do when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Point the bot at whoever damaged it.
    DamageReaction { attacker: ActorId },
    /// Clear the "stop to aim" latch.
    SettleRelease,
    /// Start checking for mid-air obstacle bumps.
    ObstacleCheck,
    /// Allow the next obstacle jump.
    JumpRearm,
    /// Kill the actor if it fell below the kill height, else poll again.
    KillHeightPoll,
    /// Regenerate a little health, then schedule the next tick.
    PassiveHeal,
    /// Auto-random-target acquisition at the start of a life.
    AcquireTarget,
    Respawn,
    InvulnerabilityEnd,
}

/// A scheduled action that is now due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueTimer {
    pub entity: Entity,
    pub generation: u32,
    pub action: TimerAction,
}

#[derive(Debug)]
struct Scheduled {
    deadline: f32,
    seq: u64,
    timer: DueTimer,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    /// Reversed so the max-heap pops the earliest deadline first; ties fire
    /// in scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .total_cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of pending timers.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: f32, entity: Entity, generation: u32, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            deadline,
            seq,
            timer: DueTimer {
                entity,
                generation,
                action,
            },
        });
    }

    /// Pop the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: f32) -> Option<DueTimer> {
        if self.heap.peek()?.deadline > now {
            return None;
        }
        self.heap.pop().map(|s| s.timer)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pending timers of one kind for one entity.
    pub fn count(&self, entity: Entity, action: TimerAction) -> usize {
        self.heap
            .iter()
            .filter(|s| s.timer.entity == entity && s.timer.action == action)
            .count()
    }

    /// Earliest deadline of one kind of timer for one entity.
    pub fn next_deadline(&self, entity: Entity, action: TimerAction) -> Option<f32> {
        self.heap
            .iter()
            .filter(|s| s.timer.entity == entity && s.timer.action == action)
            .map(|s| s.deadline)
            .min_by(f32::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_deadline_then_schedule_order() {
        let mut world = hecs::World::new();
        let a = world.spawn((1u8,));
        let b = world.spawn((2u8,));

        let mut q = TimerQueue::new();
        q.schedule(2.0, a, 0, TimerAction::Respawn);
        q.schedule(1.0, b, 0, TimerAction::JumpRearm);
        q.schedule(1.0, a, 0, TimerAction::SettleRelease);

        assert!(q.pop_due(0.5).is_none());
        let first = q.pop_due(1.0).unwrap();
        assert_eq!((first.entity, first.action), (b, TimerAction::JumpRearm));
        let second = q.pop_due(1.0).unwrap();
        assert_eq!(second.action, TimerAction::SettleRelease);
        assert!(q.pop_due(1.5).is_none());
        assert_eq!(q.count(a, TimerAction::Respawn), 1);
        assert_eq!(q.pop_due(5.0).unwrap().action, TimerAction::Respawn);
        assert!(q.is_empty());
    }
}
