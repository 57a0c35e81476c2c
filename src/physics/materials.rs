use rapier3d::geometry::Collider;
use rapier3d::pipeline::{ContactModificationContext, PhysicsHooks};

use crate::backend::MaterialTag;
use crate::config::{ContactMaterial, ContactMaterials};

/// Surface tag stored on a collider by [`super::PhysicsWorld`].
pub fn material_of(collider: &Collider) -> MaterialTag {
    MaterialTag::from_bits(collider.user_data)
}

/// What one material pair does to each solver contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairTuning {
    pub friction: f32,
    pub restitution: f32,
    /// Multiplies the penetration the solver sees. Below one the pair is softer
    /// than the default pairing and sinks further before being pushed apart.
    pub penetration_scale: f32,
}

impl PairTuning {
    fn resolve(material: &ContactMaterial, reference: &ContactMaterial, dt: f32) -> Self {
        let reference_rate = reference.correction_rate(dt);
        let penetration_scale = if reference_rate > 0.0 {
            (material.correction_rate(dt) / reference_rate).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            friction: material.friction,
            restitution: material.restitution,
            penetration_scale,
        }
    }
}

/// Rewrites rapier's solver contacts from the contact-material table.
pub struct MaterialHooks {
    materials: ContactMaterials,
    dt: f32,
}

impl MaterialHooks {
    pub fn new(materials: &ContactMaterials, dt: f32) -> Self {
        Self {
            materials: materials.clone(),
            dt,
        }
    }

    pub fn tuning(&self, a: MaterialTag, b: MaterialTag) -> PairTuning {
        PairTuning::resolve(self.materials.lookup(a, b), &self.materials.default, self.dt)
    }
}

impl PhysicsHooks for MaterialHooks {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let (Some(c1), Some(c2)) = (
            context.colliders.get(context.collider1),
            context.colliders.get(context.collider2),
        ) else {
            return;
        };
        let tuning = self.tuning(material_of(c1), material_of(c2));
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = tuning.friction;
            contact.restitution = tuning.restitution;
            if contact.dist < 0.0 {
                contact.dist *= tuning.penetration_scale;
            }
        }
    }
}
