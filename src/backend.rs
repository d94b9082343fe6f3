//! Physics backend abstraction.
//!
//! The motion controller computes velocities; a backend owns the body those
//! velocities apply to. This trait is the whole seam: which component stores
//! linear velocity, how to read and write it, and a plugin that installs the
//! backend's contact detection. Swapping physics engines means implementing
//! these four items.

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

/// Trait for physics backend integrations.
///
/// The built-in `rapier2d` feature provides `Rapier2dBackend`. A custom
/// kinematic mover can implement this over its own velocity component; the
/// only hard requirement is that the backend also keeps each character's
/// [`ContactFlags`](crate::intent::ContactFlags) current, which is what the
/// [`plugin`](Self::plugin) hook is for.
pub trait PhysicsBackend: 'static + Send + Sync {
    /// The component this backend stores linear velocity in.
    type VelocityComponent: Component<Mutability = Mutable>;

    /// Plugin installing the backend's detection systems.
    fn plugin() -> impl Plugin;

    /// Reads the linear velocity from the backend's component.
    fn velocity(component: &Self::VelocityComponent) -> Vec2;

    /// Writes a linear velocity into the backend's component.
    fn set_velocity(component: &mut Self::VelocityComponent, velocity: Vec2);
}

/// Empty plugin for backends that need no extra setup.
///
/// Useful when contact detection is handled by game code writing
/// [`ContactFlags`](crate::intent::ContactFlags) directly.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
