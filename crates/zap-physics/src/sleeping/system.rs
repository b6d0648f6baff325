use super::grouping::CollisionGrouping;
use crate::api::config::SleepConfig;
use crate::api::types::BodyId;
use crate::core::body::Body;
use crate::core::id_table::IdTable;

/// Puts collision groups to sleep once every member has rested long enough,
/// and wakes the whole group as soon as one member moves.
///
/// Sleeping keeps velocities. The contacts of a resting stack are balanced
/// by those small velocities and their warm-start impulses; zeroing them
/// would make the stack jolt when it wakes.
#[derive(Debug, Default)]
pub struct SleepingSystem {
    grouping: CollisionGrouping,
}

impl SleepingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bodies: &mut IdTable<BodyId, Body>, config: &SleepConfig, dt: f32) {
        let groups = self.grouping.update(bodies);
        if !config.enabled {
            return;
        }
        let slots = bodies.as_mut_slice();
        for group in groups {
            let mut resting = true;
            for &slot in group {
                let body = &mut slots[slot];
                if body.is_static() {
                    continue;
                }
                if is_idle(body, config) {
                    body.idle_time += dt;
                } else {
                    body.idle_time = 0.0;
                }
                if body.idle_time < config.time {
                    resting = false;
                }
            }

            for &slot in group {
                let body = &mut slots[slot];
                if body.is_static() {
                    continue;
                }
                if resting && !body.is_sleeping() {
                    body.sleep();
                } else if !resting && body.is_sleeping() {
                    body.wake_up();
                }
            }
        }
    }

    /// Groups from the last update, as body slots.
    pub fn groups(&self) -> &[Vec<usize>] {
        self.grouping.groups()
    }
}

fn is_idle(body: &Body, config: &SleepConfig) -> bool {
    body.vel.length_squared() < config.velocity * config.velocity
        && body.ang_vel * body.ang_vel < config.angular_velocity * config.angular_velocity
}
