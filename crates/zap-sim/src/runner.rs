use anyhow::{Context, Result};
use zap_physics::{BodyState, SimConfig, Statistics, World};

use crate::scenario::Scenario;

const WINDOW: usize = 40;

/// Steps one scenario and keeps running averages of what happens.
pub struct SimRunner {
    world: World,
    stats: Statistics,
    scenario: Scenario,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub steps: u64,
    pub bodies: usize,
    pub sleeping: usize,
    pub kinetic_energy: f32,
    pub checksum: u64,
}

impl SimRunner {
    pub fn new(scenario: Scenario, config: SimConfig) -> Result<Self> {
        let mut world = World::new(config);
        scenario
            .build(&mut world)
            .with_context(|| format!("building scenario `{}`", scenario.name()))?;

        let mut stats = Statistics::new();
        for name in ["energy", "contacts", "joint_error", "groups"] {
            stats.track(name, WINDOW);
        }
        Ok(Self {
            world,
            stats,
            scenario,
        })
    }

    /// Run one fixed step and record it.
    pub fn tick(&mut self) {
        self.world.step();
        self.stats.put("energy", self.world.kinetic_energy());
        self.stats.put("contacts", self.world.contact_pairs().len() as f32);
        self.stats.put("joint_error", self.world.joint_error());
        self.stats.put("groups", self.world.groups().len() as f32);
    }

    /// Run `steps` steps, logging the averages every `report_every` steps.
    pub fn run(&mut self, steps: u64, report_every: u64) -> RunReport {
        for _ in 0..steps {
            self.tick();
            let n = self.world.step_count();
            if report_every > 0 && n % report_every == 0 {
                self.log_report();
            }
        }
        self.report()
    }

    fn log_report(&self) {
        let averages: Vec<String> = self
            .stats
            .iter()
            .map(|(name, mean)| format!("{}={:.4}", name, mean))
            .collect();
        log::info!(
            "{} step {} t={:.2}s {}",
            self.scenario.name(),
            self.world.step_count(),
            self.world.time(),
            averages.join(" ")
        );
    }

    pub fn report(&self) -> RunReport {
        let snapshot = self.world.snapshot();
        RunReport {
            steps: self.world.step_count(),
            bodies: snapshot.len(),
            sleeping: snapshot.iter().filter(|s| s.sleeping != 0).count(),
            kinetic_energy: self.world.kinetic_energy(),
            checksum: checksum(&snapshot),
        }
    }
}

/// FNV-1a over the raw snapshot bytes.
pub fn checksum(states: &[BodyState]) -> u64 {
    BodyState::as_bytes(states)
        .iter()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ *byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_runs_share_a_checksum() {
        let run = || {
            let mut runner = SimRunner::new(Scenario::Pyramid, SimConfig::default()).unwrap();
            runner.run(60, 0)
        };
        let (a, b) = (run(), run());
        assert_eq!(a, b);
        assert_eq!(a.steps, 60);
    }

    #[test]
    fn checksum_sees_every_byte() {
        let mut states = vec![BodyState::default(); 2];
        let before = checksum(&states);
        states[1].ang_vel = 1.0;
        assert_ne!(before, checksum(&states));
    }

    #[test]
    fn dropped_ball_ends_up_asleep() {
        let mut runner = SimRunner::new(Scenario::Drop, SimConfig::default()).unwrap();
        let report = runner.run(400, 0);
        assert_eq!(report.bodies, 2);
        assert_eq!(report.sleeping, 1, "{:?}", report);
    }
}
