//! Per-frame inputs to the motion controller.
//!
//! Two things are fed in each tick: what the player wants
//! ([`InputIntent`]) and what the physics body is touching
//! ([`ContactFlags`]). Both are plain data so any input source or physics
//! backend can fill them in.

use bevy::prelude::*;

/// Player intent for one frame.
///
/// The built-in keyboard system writes this every frame, but an AI driver or
/// a replay player can write it just as well. Held semantics: a field is
/// `true` for every frame the corresponding control is down.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct InputIntent {
    /// Move left.
    pub left: bool,
    /// Move right.
    pub right: bool,
    /// Jump is held.
    pub jump: bool,
    /// Down is held. Triggers a ground pound while airborne.
    pub down: bool,
    /// Sprint modifier is held.
    pub sprint: bool,
}

impl InputIntent {
    /// Net horizontal direction: -1 for left, +1 for right, 0 when neither
    /// or both are held.
    pub fn horizontal_axis(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Which sides of the body are pressed against solid geometry this frame.
///
/// The physics backend refreshes this before the controller runs. `down`
/// doubles as the grounded test.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct ContactFlags {
    /// Touching a wall on the left.
    pub left: bool,
    /// Touching a wall on the right.
    pub right: bool,
    /// Standing on something.
    pub down: bool,
    /// Head against a ceiling.
    pub up: bool,
}

impl ContactFlags {
    /// No contact on any side.
    pub fn none() -> Self {
        Self::default()
    }

    /// Standing on the ground, nothing else touching.
    pub fn grounded() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    /// Airborne against a wall on the left.
    pub fn wall_left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    /// Airborne against a wall on the right.
    pub fn wall_right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }
}
