use glam::Mat4;
use hecs::World;

use crate::backend::PhysicsBackend;
use crate::components::{LocalTransform, PhysicsBody, PreviousPosition, RenderTransform};

/// Copy each linked body's pose into its entity, keeping the old position
/// in `PreviousPosition` for interpolation. Run after every physics step.
pub fn pull_physics_poses<B: PhysicsBackend>(world: &mut World, physics: &B) {
    for (_entity, (body, local, prev)) in
        world.query_mut::<(&PhysicsBody, &mut LocalTransform, &mut PreviousPosition)>()
    {
        if let Some(state) = physics.read_body(body.0) {
            prev.0 = local.position;
            local.position = state.position;
            local.rotation = state.orientation;
        }
    }
}

/// Copy physics transforms into `RenderTransform` for the rendering collaborator.
///
/// `alpha` is the render interpolation factor (0..1): how far into the current
/// physics step this frame falls. Bodies with a `PreviousPosition` have their
/// translation lerped between the previous and current physics position,
/// which hides fixed-timestep stutter.
pub fn transform_sync_system(world: &mut World, alpha: f32) {
    for (_entity, (local, prev, render)) in world.query_mut::<(
        &LocalTransform,
        Option<&PreviousPosition>,
        &mut RenderTransform,
    )>() {
        render.0 = match prev {
            Some(prev) => {
                let pos = prev.0.lerp(local.position, alpha);
                Mat4::from_rotation_translation(local.rotation, pos)
            }
            None => local.matrix(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BodyConfig, PhysicsWorldConfig};
    use crate::physics::PhysicsWorld;
    use glam::Vec3;

    #[test]
    fn test_interpolates_between_physics_steps() {
        let mut world = World::new();
        let e = world.spawn((
            LocalTransform::new(Vec3::new(2.0, 0.0, 0.0)),
            PreviousPosition(Vec3::ZERO),
            RenderTransform(Mat4::IDENTITY),
        ));
        transform_sync_system(&mut world, 0.25);
        let m = world.get::<&RenderTransform>(e).unwrap().0;
        assert!((m.w_axis.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_without_history_uses_current_pose() {
        let mut world = World::new();
        let e = world.spawn((
            LocalTransform::new(Vec3::new(0.0, 3.0, 0.0)),
            RenderTransform(Mat4::IDENTITY),
        ));
        transform_sync_system(&mut world, 0.5);
        let m = world.get::<&RenderTransform>(e).unwrap().0;
        assert_eq!(m.w_axis.y, 3.0);
    }

    #[test]
    fn test_pull_follows_the_body_and_keeps_history() {
        let mut physics = PhysicsWorld::new(&PhysicsWorldConfig::default());
        let spawn = Vec3::new(0.0, 5.0, 0.0);
        let body = physics.add_robot(&BodyConfig::default(), spawn);
        let mut world = World::new();
        let e = world.spawn((
            PhysicsBody(body),
            LocalTransform::new(spawn),
            PreviousPosition(spawn),
        ));

        physics.step();
        pull_physics_poses(&mut world, &physics);

        let local = *world.get::<&LocalTransform>(e).unwrap();
        assert!(local.position.y < spawn.y);
        assert_eq!(world.get::<&PreviousPosition>(e).unwrap().0, spawn);
    }
}
