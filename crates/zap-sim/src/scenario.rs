use clap::ValueEnum;
use glam::Vec2;
use zap_physics::tools::factories;
use zap_physics::{Body, Explosion, JointDesc, PhysicsError, World};

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// One ball dropped on the ground.
    Drop,
    /// A column of boxes.
    Stack,
    /// Pendulum chain hanging from a fixed point.
    Pendulum,
    /// Box pyramid hit by a ball.
    Pyramid,
    /// Loose boxes scattered by a blast.
    Explosion,
}

impl Scenario {
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Drop => "drop",
            Scenario::Stack => "stack",
            Scenario::Pendulum => "pendulum",
            Scenario::Pyramid => "pyramid",
            Scenario::Explosion => "explosion",
        }
    }

    /// Populate an empty world.
    pub fn build(self, world: &mut World) -> Result<(), PhysicsError> {
        match self {
            Scenario::Drop => {
                ground(world)?;
                world.add_body(factories::circle(Vec2::new(0.0, 12.0), 1.0, 1.0));
            }
            Scenario::Stack => {
                ground(world)?;
                for body in factories::line_of_rectangles(Vec2::new(-1.0, 1.0), Vec2::new(0.0, 2.05), 8, 2.0, 2.0, 1.0)? {
                    world.add_body(body);
                }
            }
            Scenario::Pendulum => {
                let pivot = Vec2::new(0.0, 30.0);
                let mut prev = None;
                for i in 1..=5 {
                    let pos = pivot + Vec2::new(3.0 * i as f32, 0.0);
                    let link = world.add_body(factories::circle(pos, 0.5, 1.0));
                    let desc = match prev {
                        None => JointDesc::background_distance(link, pos, pivot),
                        Some(prev) => factories::distance_joint(world, prev, link)?,
                    };
                    world.add_joint(desc)?;
                    prev = Some(link);
                }
            }
            Scenario::Pyramid => {
                ground(world)?;
                let rows = 6;
                for row in 0..rows {
                    let start = Vec2::new(-((rows - row) as f32) * 1.1, 1.0 + row as f32 * 2.05);
                    for body in factories::line_of_rectangles(start, Vec2::new(2.2, 0.0), rows - row, 2.0, 2.0, 1.0)? {
                        world.add_body(body);
                    }
                }
                world.add_body(
                    factories::circle(Vec2::new(-30.0, 6.0), 1.5, 4.0).with_velocity(Vec2::new(40.0, 5.0)),
                );
            }
            Scenario::Explosion => {
                ground(world)?;
                for i in 0..5 {
                    for j in 0..4 {
                        let corner = Vec2::new(-6.0 + i as f32 * 2.5, 1.0 + j as f32 * 2.05);
                        world.add_body(factories::rectangle(corner, 2.0, 2.0, 1.0, 0.0)?);
                    }
                }
                world.apply_effect(&Explosion::new(Vec2::new(0.0, 0.5), 15.0, 1.5));
            }
        }
        Ok(())
    }
}

fn ground(world: &mut World) -> Result<(), PhysicsError> {
    world.add_body(Body::rectangle(Vec2::ZERO, 80.0, 2.0, 0.0)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_builds() {
        for scenario in Scenario::value_variants() {
            let mut world = World::default();
            scenario.build(&mut world).unwrap();
            assert!(world.body_count() > 0, "{} is empty", scenario.name());
        }
    }

    #[test]
    fn pendulum_links_every_bob() {
        let mut world = World::default();
        Scenario::Pendulum.build(&mut world).unwrap();
        assert_eq!(world.joint_count(), 5);
        assert_eq!(world.joints().filter(|(_, j)| j.is_background()).count(), 1);
    }
}
