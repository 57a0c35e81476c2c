mod contacts;
mod transform;

pub use contacts::{BodyContact, CollisionBus, CollisionSubscription};
pub use transform::{pull_physics_poses, transform_sync_system};
