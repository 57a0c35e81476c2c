use glam::Vec3;

use crate::backend::{MaterialTag, RigidBodyHandle};
use crate::physics::ContactEvent;

/// Handle returned by [`CollisionBus::subscribe`]. Dropping it does not
/// unsubscribe; hand it back to [`CollisionBus::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionSubscription {
    id: u64,
    body: RigidBodyHandle,
}

/// A contact seen from one subscribed body.
#[derive(Clone, Copy, Debug)]
pub struct BodyContact {
    pub other_material: MaterialTag,
    /// Points from the other surface toward the subscribed body.
    pub normal: Vec3,
    /// The subscribed body's velocity before the contact solver ran.
    pub pre_velocity: Vec3,
}

/// Routes backend contacts to the bodies that asked for them.
#[derive(Default)]
pub struct CollisionBus {
    next_id: u64,
    subscriptions: Vec<CollisionSubscription>,
}

impl CollisionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, body: RigidBodyHandle) -> CollisionSubscription {
        self.next_id += 1;
        let sub = CollisionSubscription {
            id: self.next_id,
            body,
        };
        self.subscriptions.push(sub);
        sub
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, sub: CollisionSubscription) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != sub.id);
        self.subscriptions.len() != before
    }

    pub fn is_subscribed(&self, sub: CollisionSubscription) -> bool {
        self.subscriptions.iter().any(|s| s.id == sub.id)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Re-express each contact from the point of view of every subscriber it involves.
    pub fn dispatch(&self, events: &[ContactEvent]) -> Vec<(CollisionSubscription, BodyContact)> {
        let mut out = Vec::new();
        for ev in events {
            for sub in &self.subscriptions {
                let contact = if ev.body_a == Some(sub.body) {
                    BodyContact {
                        other_material: ev.material_b,
                        normal: -ev.normal,
                        pre_velocity: ev.pre_velocity_a,
                    }
                } else if ev.body_b == Some(sub.body) {
                    BodyContact {
                        other_material: ev.material_a,
                        normal: ev.normal,
                        pre_velocity: ev.pre_velocity_b,
                    }
                } else {
                    continue;
                };
                out.push((*sub, contact));
            }
        }
        out
    }
}
