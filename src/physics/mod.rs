//! Rapier-backed physics world.
//!
//! [`PhysicsWorld`] owns the rapier sets and pipeline, builds the course's
//! bodies and colliders, and implements [`PhysicsBackend`] for the
//! controller. Contact materials are applied per solver contact by
//! [`MaterialHooks`].

mod materials;
mod stepper;

pub use materials::{material_of, MaterialHooks, PairTuning};
pub use stepper::FixedStepper;

use std::collections::HashMap;
use std::num::NonZeroUsize;

use glam::{Quat, Vec3};
use nalgebra::{Quaternion, UnitQuaternion};
use rapier3d::pipeline::ActiveHooks;
use rapier3d::prelude::*;

use crate::backend::{
    MaterialTag, PhysicsBackend, RayHit, RigidBodyHandle as BodyHandle, RigidBodyState,
};
use crate::config::{BodyConfig, PhysicsWorldConfig};

/// One touching pair after a step.
///
/// `normal` points from `a` toward `b`. Static geometry has no body. The
/// pre-step velocities are sampled before the solver runs, so listeners see
/// the impact speed rather than the resolved one.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub body_a: Option<BodyHandle>,
    pub body_b: Option<BodyHandle>,
    pub material_a: MaterialTag,
    pub material_b: MaterialTag,
    pub normal: Vec3,
    pub pre_velocity_a: Vec3,
    pub pre_velocity_b: Vec3,
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_rotation(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn from_rotation(q: &UnitQuaternion<Real>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Per-axis mask for angular quantities, zero on locked rotation axes.
fn rotation_mask(body: &RigidBody) -> Vec3 {
    let locked = body.locked_axes();
    let free = |axis: LockedAxes| if locked.contains(axis) { 0.0 } else { 1.0 };
    Vec3::new(
        free(LockedAxes::ROTATION_LOCKED_X),
        free(LockedAxes::ROTATION_LOCKED_Y),
        free(LockedAxes::ROTATION_LOCKED_Z),
    )
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    hooks: MaterialHooks,
}

impl PhysicsWorld {
    pub fn new(config: &PhysicsWorldConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_dt;
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations as usize).unwrap_or(NonZeroUsize::MIN);
        integration_parameters.normalized_allowed_linear_error = config.solver_tolerance;

        Self {
            gravity: to_vector(config.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            hooks: MaterialHooks::new(&config.materials, config.fixed_dt),
        }
    }

    fn tagged(builder: ColliderBuilder, material: MaterialTag) -> ColliderBuilder {
        builder
            .user_data(material.to_bits())
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
    }

    fn add_static(&mut self, builder: ColliderBuilder, material: MaterialTag) -> ColliderHandle {
        let handle = self
            .collider_set
            .insert(Self::tagged(builder, material).build());
        // Ray queries see new geometry before the first step.
        self.query_pipeline.update(&self.collider_set);
        handle
    }

    /// Infinite floor at y = 0.
    pub fn add_ground(&mut self) -> ColliderHandle {
        self.add_static(ColliderBuilder::halfspace(Vector::y_axis()), MaterialTag::Default)
    }

    /// Immovable axis-aligned box.
    pub fn add_static_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        material: MaterialTag,
    ) -> ColliderHandle {
        let builder = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(to_vector(center));
        self.add_static(builder, material)
    }

    /// Dynamic sphere. `upright` bodies may only yaw.
    #[allow(clippy::too_many_arguments)]
    pub fn add_ball(
        &mut self,
        position: Vec3,
        radius: f32,
        mass: f32,
        linear_damping: f32,
        angular_damping: f32,
        upright: bool,
        material: MaterialTag,
    ) -> BodyHandle {
        let mut builder = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .linear_damping(linear_damping)
            .angular_damping(angular_damping)
            .can_sleep(false);
        if upright {
            builder = builder.enabled_rotations(false, true, false);
        }
        let handle = self.rigid_body_set.insert(builder.build());
        let collider = Self::tagged(ColliderBuilder::ball(radius).mass(mass), material).build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.collider_set);
        }
        BodyHandle(handle)
    }

    /// The controllable robot: an upright sphere with the robot material.
    pub fn add_robot(&mut self, body: &BodyConfig, position: Vec3) -> BodyHandle {
        self.add_ball(
            position,
            body.radius,
            body.mass,
            body.linear_damping,
            body.angular_damping,
            true,
            MaterialTag::Robot,
        )
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    /// Advance one fixed step and report every touching pair.
    pub fn step(&mut self) -> Vec<ContactEvent> {
        let pre_velocities: HashMap<RigidBodyHandle, Vec3> = self
            .rigid_body_set
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .map(|(handle, body)| (handle, from_vector(body.linvel())))
            .collect();

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &self.hooks,
            &(),
        );

        self.contacts(&pre_velocities)
    }

    fn contacts(&self, pre_velocities: &HashMap<RigidBodyHandle, Vec3>) -> Vec<ContactEvent> {
        let pre_velocity = |body: Option<RigidBodyHandle>| {
            body.and_then(|h| pre_velocities.get(&h).copied())
                .unwrap_or(Vec3::ZERO)
        };

        let mut events = Vec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let Some(manifold) = pair
                .manifolds
                .iter()
                .find(|m| !m.data.solver_contacts.is_empty())
            else {
                continue;
            };
            let (Some(c1), Some(c2)) = (
                self.collider_set.get(pair.collider1),
                self.collider_set.get(pair.collider2),
            ) else {
                continue;
            };
            events.push(ContactEvent {
                body_a: c1.parent().map(BodyHandle),
                body_b: c2.parent().map(BodyHandle),
                material_a: material_of(c1),
                material_b: material_of(c2),
                normal: from_vector(&manifold.data.normal),
                pre_velocity_a: pre_velocity(c1.parent()),
                pre_velocity_b: pre_velocity(c2.parent()),
            });
        }
        events
    }

    fn body_material(&self, body: &RigidBody) -> MaterialTag {
        body.colliders()
            .first()
            .and_then(|h| self.collider_set.get(*h))
            .map(material_of)
            .unwrap_or_default()
    }
}

impl PhysicsBackend for PhysicsWorld {
    fn read_body(&self, handle: BodyHandle) -> Option<RigidBodyState> {
        let body = self.rigid_body_set.get(handle.0)?;
        let mask = rotation_mask(body);
        Some(RigidBodyState {
            position: from_vector(body.translation()),
            linear_velocity: from_vector(body.linvel()),
            angular_velocity: from_vector(body.angvel()) * mask,
            orientation: from_rotation(body.rotation()),
            force: from_vector(&body.user_force()),
            torque: from_vector(&body.user_torque()) * mask,
            material: self.body_material(body),
        })
    }

    /// Material is a property of the body's collider and is not written.
    fn write_body(&mut self, handle: BodyHandle, state: &RigidBodyState) {
        let Some(body) = self.rigid_body_set.get_mut(handle.0) else {
            return;
        };
        let mask = rotation_mask(body);
        body.set_translation(to_vector(state.position), true);
        body.set_rotation(to_rotation(state.orientation), true);
        body.set_linvel(to_vector(state.linear_velocity), true);
        body.set_angvel(to_vector(state.angular_velocity * mask), true);
        body.reset_forces(true);
        body.add_force(to_vector(state.force), true);
        body.reset_torques(true);
        body.add_torque(to_vector(state.torque * mask), true);
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle.0) {
            body.add_force(to_vector(force), true);
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle.0) {
            body.apply_impulse(to_vector(impulse), true);
        }
    }

    fn raycast_closest(
        &self,
        origin: Vec3,
        end: Vec3,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit> {
        let segment = end - origin;
        let length = segment.length();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = segment / length;
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(dir));
        let filter = match exclude {
            Some(body) => QueryFilter::default().exclude_rigid_body(body.0),
            None => QueryFilter::default(),
        };
        let (_, distance) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            length,
            true,
            filter,
        )?;
        Some(RayHit {
            distance,
            point: origin + dir * distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn world_with_robot(y: f32) -> (PhysicsWorld, BodyHandle) {
        let mut world = PhysicsWorld::new(&PhysicsWorldConfig::default());
        world.add_ground();
        let robot = world.add_robot(&BodyConfig::default(), Vec3::new(0.0, y, 0.0));
        (world, robot)
    }

    #[test]
    fn test_body_falls_under_gravity() {
        let (mut world, robot) = world_with_robot(5.0);
        world.step();
        let s = world.read_body(robot).unwrap();
        // One step of -12 m/s², less a little linear damping.
        assert!(s.linear_velocity.y < -0.19 && s.linear_velocity.y > -0.21);
        assert!(s.position.y < 5.0);
        assert_eq!(s.material, MaterialTag::Robot);
    }

    #[test]
    fn test_impulse_scales_by_inverse_mass() {
        let (mut world, robot) = world_with_robot(5.0);
        world.apply_impulse(robot, Vec3::new(10.0, 0.0, 0.0));
        let s = world.read_body(robot).unwrap();
        assert_relative_eq!(s.linear_velocity.x, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_force_applies_every_step_until_rewritten() {
        let (mut world, robot) = world_with_robot(20.0);
        world.apply_force(robot, Vec3::new(20.0, 0.0, 0.0));
        for _ in 0..3 {
            world.step();
        }
        let s = world.read_body(robot).unwrap();
        assert_eq!(s.force, Vec3::new(20.0, 0.0, 0.0));
        // Three steps of 10 m/s².
        assert!(s.linear_velocity.x > 0.45 && s.linear_velocity.x < 0.51);

        let mut cleared = s;
        cleared.force = Vec3::ZERO;
        world.write_body(robot, &cleared);
        world.step();
        let after = world.read_body(robot).unwrap();
        assert!(after.linear_velocity.x <= s.linear_velocity.x);
    }

    #[test]
    fn test_write_masks_pitch_and_roll() {
        let (mut world, robot) = world_with_robot(5.0);
        let mut s = world.read_body(robot).unwrap();
        s.angular_velocity = Vec3::new(1.0, 2.0, 3.0);
        s.torque = Vec3::new(4.0, 5.0, 6.0);
        s.orientation = Quat::from_rotation_y(0.25);
        world.write_body(robot, &s);
        let back = world.read_body(robot).unwrap();
        assert_eq!(back.angular_velocity, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(back.torque, Vec3::new(0.0, 5.0, 0.0));
        assert!(back.orientation.abs_diff_eq(Quat::from_rotation_y(0.25), 1e-6));
    }

    #[test]
    fn test_unknown_body_reads_none() {
        let (mut world, _) = world_with_robot(5.0);
        let missing = BodyHandle(RigidBodyHandle::invalid());
        assert!(world.read_body(missing).is_none());
        // Writes and loads on a missing body are ignored.
        world.write_body(missing, &RigidBodyState::at_rest(Vec3::ZERO, MaterialTag::Robot));
        world.apply_impulse(missing, Vec3::Y);
    }

    #[test]
    fn test_down_ray_hits_ground_and_skips_excluded_body() {
        let (mut world, robot) = world_with_robot(2.0);
        world.step();
        let y = world.read_body(robot).unwrap().position.y;
        let origin = Vec3::new(0.0, y, 0.0);

        let hit = world
            .raycast_closest(origin, origin - Vec3::Y * 3.0, Some(robot))
            .unwrap();
        assert_relative_eq!(hit.distance, y, epsilon = 1e-3);
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-3);

        // Without the exclusion the ray starts inside the robot.
        let inside = world
            .raycast_closest(origin, origin - Vec3::Y * 3.0, None)
            .unwrap();
        assert_eq!(inside.distance, 0.0);

        // Segments that stop short of the ground miss.
        assert!(world
            .raycast_closest(origin, origin - Vec3::Y * 0.5, Some(robot))
            .is_none());
    }

    #[test]
    fn test_ground_contact_reports_pre_step_velocity() {
        let (mut world, robot) = world_with_robot(0.39);
        let mut s = world.read_body(robot).unwrap();
        s.linear_velocity = Vec3::new(0.0, -3.0, 0.0);
        world.write_body(robot, &s);

        let events = world.step();
        let ev = events
            .iter()
            .find(|e| e.body_a == Some(robot) || e.body_b == Some(robot))
            .expect("robot touches the ground");
        let (toward_robot, pre, other) = if ev.body_b == Some(robot) {
            (ev.normal, ev.pre_velocity_b, ev.material_a)
        } else {
            (-ev.normal, ev.pre_velocity_a, ev.material_b)
        };
        assert!(toward_robot.y > 0.9);
        assert_eq!(pre, Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(other, MaterialTag::Default);
    }

    #[test]
    fn test_wall_material_survives_to_contact() {
        let mut world = PhysicsWorld::new(&PhysicsWorldConfig::default());
        world.add_static_box(Vec3::new(0.0, 1.0, 1.0), Vec3::new(2.0, 1.0, 0.5), MaterialTag::Wall);
        let robot = world.add_robot(&BodyConfig::default(), Vec3::new(0.0, 1.0, 0.15));
        let events = world.step();
        assert!(events.iter().any(|e| {
            (e.body_a == Some(robot) && e.material_b == MaterialTag::Wall)
                || (e.body_b == Some(robot) && e.material_a == MaterialTag::Wall)
        }));
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 2);
    }
}
