//! # `platformer_controller`
//!
//! A tunable 2D platformer motion controller with physics backend
//! abstraction.
//!
//! The crate turns per-frame input and contact facts into character
//! velocities, animation states and semantic events:
//! - Walking and sprinting with ground and air friction
//! - Jumping with coyote time, input buffering, a hold bonus, and a
//!   walk-off-the-ledge grace that still feels fair
//! - A double/triple jump combo with a spinning third jump
//! - Wall slide and wall jump with a short steering lock
//! - Ground pound with a stall, a fast fall, and an impact event
//! - Squash and stretch hints for juicing the sprite
//!
//! ## Architecture
//!
//! All motion rules live in [`MotionController::advance`], a pure state
//! transition over plain data. Systems around it do the plumbing: a backend
//! (Rapier2D included) refreshes [`ContactFlags`] and stores velocity, a
//! driver steps every controller each physics tick, and marker components
//! ([`Grounded`], [`Airborne`], [`TouchingWall`]) stay in sync for queries.
//! Because `advance` never touches the ECS, the whole state machine is
//! testable without a physics world.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_rapier2d::prelude::*;
//! use platformer_controller::prelude::*;
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(100.0))
//!     .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
//!     .run();
//! ```
//!
//! [`MotionController::advance`]: controller::MotionController::advance
//! [`ContactFlags`]: intent::ContactFlags
//! [`Grounded`]: state::Grounded
//! [`Airborne`]: state::Airborne
//! [`TouchingWall`]: state::TouchingWall

use bevy::prelude::*;

pub mod backend;
pub mod controller;
pub mod intent;
pub mod params;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::PhysicsBackend;
    pub use crate::controller::{
        ControllerEvent, FrameOutput, MotionController, MotionHints, VisualEffect,
    };
    pub use crate::intent::{ContactFlags, InputIntent};
    pub use crate::params::PhysicsParams;
    pub use crate::state::{Airborne, Grounded, MotionState, TouchingWall, WallSide};
    pub use crate::systems::{
        GroundPoundLandedEvent, KeyBindings, LandedEvent, MotionControllerSet, PlayerControlled,
        VisualEffectRequest,
    };
    pub use crate::PlatformerControllerPlugin;

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dCharacterBundle};
}

/// Main plugin for the platformer motion controller.
///
/// Generic over a physics backend `B` which owns velocity storage and
/// contact detection. All motion systems run in `FixedUpdate`, chained as
/// [`MotionControllerSet::Detection`], [`MotionControllerSet::Advance`],
/// [`MotionControllerSet::Sync`]; keyboard input is gathered in `Update`.
///
/// [`MotionControllerSet::Detection`]: systems::MotionControllerSet::Detection
/// [`MotionControllerSet::Advance`]: systems::MotionControllerSet::Advance
/// [`MotionControllerSet::Sync`]: systems::MotionControllerSet::Sync
pub struct PlatformerControllerPlugin<B: backend::PhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::PhysicsBackend> Default for PlatformerControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::PhysicsBackend> Plugin for PlatformerControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<params::PhysicsParams>();
        app.register_type::<intent::InputIntent>();
        app.register_type::<intent::ContactFlags>();
        app.register_type::<controller::MotionController>();
        app.register_type::<controller::MotionHints>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::TouchingWall>();
        app.register_type::<systems::PlayerControlled>();

        app.add_event::<systems::LandedEvent>();
        app.add_event::<systems::GroundPoundLandedEvent>();
        app.add_event::<systems::VisualEffectRequest>();

        app.init_resource::<systems::KeyBindings>();

        app.configure_sets(
            FixedUpdate,
            (
                systems::MotionControllerSet::Detection,
                systems::MotionControllerSet::Advance,
                systems::MotionControllerSet::Sync,
            )
                .chain(),
        );

        // The backend plugin installs its detection systems into the
        // Detection set.
        app.add_plugins(B::plugin());

        // Headless apps have no keyboard resource; skip input gathering there.
        app.add_systems(
            Update,
            systems::gather_player_input.run_if(resource_exists::<ButtonInput<KeyCode>>),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::drive_motion_controllers::<B>
                    .in_set(systems::MotionControllerSet::Advance),
                systems::sync_state_markers.in_set(systems::MotionControllerSet::Sync),
            ),
        );
    }
}
