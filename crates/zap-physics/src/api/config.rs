use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Global simulation constants, fixed at `World` construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds (default: 1/40).
    pub dt: f32,
    /// Gravity in meters per second squared. Scaled by `units_per_meter`.
    pub gravity: Vec2,
    /// World units per meter (default: 10).
    pub units_per_meter: f32,
    /// Solver passes over every contact and joint per step (default: 25).
    pub solver_iterations: u32,
    /// Baumgarte factor for position correction, around [0.05, 0.2].
    pub position_correction: f32,
    /// Penetration depth the contact solver leaves alone.
    pub allowed_penetration: f32,
    /// Slack added to every broadphase extent.
    pub bounding_margin: f32,
    /// Friction used for bodies that do not set their own.
    pub friction: f32,
    /// Restitution used for bodies that do not set their own.
    pub restitution: f32,
    /// Air drag coefficient. Zero disables air friction.
    pub air_friction: f32,
    /// Wind velocity. `None` disables wind.
    pub wind: Option<Vec2>,
    /// Force clamp for springs.
    pub spring_max_force: f32,
    /// Cap on fixed steps run by one `World::advance` call.
    pub max_steps_per_frame: u32,
    pub sleep: SleepConfig,
    pub safety: SafetyConfig,
}

/// Thresholds for putting collision groups to sleep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepConfig {
    pub enabled: bool,
    /// Seconds every body of a group must stay idle before the group sleeps.
    pub time: f32,
    pub velocity: f32,
    pub angular_velocity: f32,
}

/// Bounds for the advisory body check run on `World::add_body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub enabled: bool,
    pub min_mass: f32,
    pub max_mass: f32,
    pub min_area: f32,
    pub max_area: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 40.0,
            gravity: Vec2::new(0.0, -9.81),
            units_per_meter: 10.0,
            solver_iterations: 25,
            position_correction: 0.1,
            allowed_penetration: 0.09,
            bounding_margin: 0.1,
            friction: 0.8,
            restitution: 0.0,
            air_friction: 1e-6,
            wind: None,
            spring_max_force: 500.0,
            max_steps_per_frame: 10,
            sleep: SleepConfig::default(),
            safety: SafetyConfig::default(),
        }
    }
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: 0.5,
            velocity: 0.05,
            angular_velocity: 0.005,
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_mass: 0.01,
            max_mass: 100.0,
            min_area: 0.0,
            max_area: 100_000.0,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Gravity in world units.
    pub fn scaled_gravity(&self) -> Vec2 {
        self.gravity * self.units_per_meter
    }

    pub fn inv_dt(&self) -> f32 {
        1.0 / self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = SimConfig::from_json("{}").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let json = r#"{
            "solver_iterations": 10,
            "gravity": [0.0, -20.0],
            "wind": [3.0, 0.0],
            "sleep": { "time": 1.5 }
        }"#;
        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.solver_iterations, 10);
        assert_eq!(config.gravity, Vec2::new(0.0, -20.0));
        assert_eq!(config.wind, Some(Vec2::new(3.0, 0.0)));
        assert_eq!(config.sleep.time, 1.5);
        assert!(config.sleep.enabled);
        assert!((config.dt - 0.025).abs() < 1e-7);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = SimConfig::from_json("{ \"dt\": \"fast\" }").unwrap_err();
        assert!(matches!(err, PhysicsError::Config(_)), "got {:?}", err);
    }

    #[test]
    fn gravity_scales_with_units() {
        let config = SimConfig::default();
        let g = config.scaled_gravity();
        assert!((g.y + 98.1).abs() < 1e-4, "g.y = {}", g.y);
    }
}
