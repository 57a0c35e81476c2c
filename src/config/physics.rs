//! Physics world configuration: gravity, solver settings and the contact
//! material table the collision resolver is tuned against.

use glam::Vec3;
use serde::Deserialize;

use crate::backend::MaterialTag;

/// Friction/restitution/stiffness profile for one pair of surface types.
///
/// Restitution stays at zero for every shipped pair: bounces off walls and
/// obstacles are produced by the collision resolver, not by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ContactMaterial {
    pub friction: f32,
    #[serde(default)]
    pub restitution: f32,
    /// Contact spring stiffness. Higher is harder.
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,
    /// Number of steps over which penetration is relaxed away.
    #[serde(default = "default_relaxation")]
    pub relaxation: f32,
}

fn default_stiffness() -> f32 {
    1e7
}

fn default_relaxation() -> f32 {
    3.0
}

impl ContactMaterial {
    pub const fn new(friction: f32) -> Self {
        Self {
            friction,
            restitution: 0.0,
            stiffness: 1e7,
            relaxation: 3.0,
        }
    }

    pub const fn soft(mut self, stiffness: f32, relaxation: f32) -> Self {
        self.stiffness = stiffness;
        self.relaxation = relaxation;
        self
    }

    /// Fraction of the current penetration pushed out in one step of length `dt`.
    pub fn correction_rate(&self, dt: f32) -> f32 {
        let relax = (4.0 / (1.0 + 4.0 * self.relaxation.max(0.0))).min(1.0);
        // k·h² / (1 + k·h²): stiff springs approach 1, soft ones let the contact sink.
        let kh2 = self.stiffness.max(0.0) * dt * dt;
        relax * kh2 / (1.0 + kh2)
    }
}

/// The four named pairings. Any pair not listed uses `default`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContactMaterials {
    pub default: ContactMaterial,
    pub robot_obstacle: ContactMaterial,
    pub robot_wall: ContactMaterial,
    pub obstacle_obstacle: ContactMaterial,
}

impl Default for ContactMaterials {
    fn default() -> Self {
        Self {
            default: ContactMaterial::new(0.25),
            robot_obstacle: ContactMaterial::new(0.2).soft(2e5, 30.0),
            robot_wall: ContactMaterial::new(0.3).soft(1e5, 50.0),
            obstacle_obstacle: ContactMaterial::new(0.25).soft(1e7, 5.0),
        }
    }
}

impl ContactMaterials {
    /// Contact material for a pair of surfaces. Symmetric in its arguments.
    pub fn lookup(&self, a: MaterialTag, b: MaterialTag) -> &ContactMaterial {
        use MaterialTag::*;
        match (a, b) {
            (Robot, Obstacle) | (Obstacle, Robot) => &self.robot_obstacle,
            (Robot, Wall) | (Wall, Robot) => &self.robot_wall,
            (Obstacle, Obstacle) => &self.obstacle_obstacle,
            _ => &self.default,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsWorldConfig {
    pub gravity: Vec3,
    pub solver_iterations: u32,
    /// Penetration (in metres) the solver leaves alone.
    pub solver_tolerance: f32,
    pub fixed_dt: f32,
    pub max_substeps: u32,
    pub materials: ContactMaterials,
}

impl Default for PhysicsWorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -12.0, 0.0),
            solver_iterations: 12,
            solver_tolerance: 0.005,
            fixed_dt: 1.0 / 60.0,
            max_substeps: 4,
            materials: ContactMaterials::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup_is_symmetric() {
        let m = ContactMaterials::default();
        let ab = m.lookup(MaterialTag::Robot, MaterialTag::Wall);
        let ba = m.lookup(MaterialTag::Wall, MaterialTag::Robot);
        assert_eq!(ab, ba);
        assert_relative_eq!(ab.friction, 0.3);
        assert_relative_eq!(ab.stiffness, 1e5);
    }

    #[test]
    fn test_unlisted_pairs_use_default() {
        let m = ContactMaterials::default();
        assert_eq!(m.lookup(MaterialTag::Robot, MaterialTag::Default), &m.default);
        assert_eq!(m.lookup(MaterialTag::Wall, MaterialTag::Obstacle), &m.default);
    }

    #[test]
    fn test_robot_pairs_are_softer_than_default() {
        let cfg = PhysicsWorldConfig::default();
        let dt = cfg.fixed_dt;
        let m = &cfg.materials;
        for soft in [m.robot_obstacle, m.robot_wall] {
            assert!(soft.correction_rate(dt) < m.default.correction_rate(dt));
            assert_eq!(soft.restitution, 0.0);
        }
    }
}
