//! Game configuration parsing from TOML files.

mod controller;
mod physics;

pub use controller::*;
pub use physics::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration: gameplay tuning plus the physics world it runs in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub controller: ControllerConfig,
    pub physics: PhysicsWorldConfig,
}

impl GameConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: GameConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded game config");
        Ok(config)
    }

    /// Parse and validate configuration text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        if !(p.fixed_dt > 0.0) {
            return Err(ConfigError::Invalid("physics.fixed_dt must be positive".into()));
        }
        if p.max_substeps == 0 {
            return Err(ConfigError::Invalid("physics.max_substeps must be at least 1".into()));
        }
        if p.solver_iterations == 0 {
            return Err(ConfigError::Invalid(
                "physics.solver_iterations must be at least 1".into(),
            ));
        }
        let m = &p.materials;
        for (name, mat) in [
            ("default", &m.default),
            ("robot_obstacle", &m.robot_obstacle),
            ("robot_wall", &m.robot_wall),
            ("obstacle_obstacle", &m.obstacle_obstacle),
        ] {
            if mat.friction < 0.0 || mat.restitution < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "physics.materials.{name}: friction and restitution must be non-negative"
                )));
            }
            if mat.restitution > 0.0 {
                tracing::warn!(
                    material = name,
                    restitution = mat.restitution,
                    "non-zero restitution stacks with resolver bounces"
                );
            }
        }

        let c = &self.controller;
        if c.body.mass <= 0.0 || c.body.radius <= 0.0 {
            return Err(ConfigError::Invalid(
                "controller.body mass and radius must be positive".into(),
            ));
        }
        if c.bhop.ground_cap > c.bhop.air_cap {
            return Err(ConfigError::Invalid(
                "controller.bhop.ground_cap must not exceed air_cap".into(),
            ));
        }
        if c.bounds.min_y >= c.bounds.max_y {
            return Err(ConfigError::Invalid(
                "controller.bounds.min_y must be below max_y".into(),
            ));
        }
        if c.collision.slow_speed > c.collision.stun_speed {
            return Err(ConfigError::Invalid(
                "controller.collision.slow_speed must not exceed stun_speed".into(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "Failed to parse {}: {}", path.display(), e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}
