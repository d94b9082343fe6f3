//! Motion states and state marker components.
//!
//! [`MotionState`] is the controller's animation-facing state machine value.
//! The marker components ([`Grounded`], [`Airborne`], [`TouchingWall`]) are
//! kept in sync by the controller systems so game code can use them in query
//! filters without reading the controller itself.

use bevy::prelude::*;

use crate::intent::ContactFlags;

/// The animation-facing motion state of a character.
///
/// Exactly one state is active per frame. Transitions follow the per-frame
/// update in [`MotionController::advance`](crate::controller::MotionController::advance);
/// game code should treat this as read-only and map it to animation clips.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MotionState {
    /// Standing still on the ground.
    #[default]
    Idle,
    /// Moving on the ground below sprint intent.
    Walk,
    /// Moving on the ground with sprint held.
    Sprint,
    /// Rising through the air after a jump, or any upward airborne motion.
    Jump,
    /// Falling, including walking off a ledge.
    Fall,
    /// Pressed against a wall while airborne, descending slowly.
    WallSlide,
    /// Stalling or fast-falling from a down press in the air.
    GroundPound,
    /// The spinning third jump of a combo.
    TripleJump,
    /// Goal reached. Absorbing: the character freezes until respawn.
    LevelClear,
}

impl MotionState {
    /// Whether this state is a player-initiated rising jump arc.
    ///
    /// Only these states honor the jump-hold gravity bonus.
    pub fn is_jump_arc(&self) -> bool {
        matches!(self, MotionState::Jump | MotionState::TripleJump)
    }

    /// Whether this state plays out on the ground.
    pub fn is_grounded_state(&self) -> bool {
        matches!(
            self,
            MotionState::Idle | MotionState::Walk | MotionState::Sprint
        )
    }
}

/// Which side the character's wall contact is on.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WallSide {
    /// No wall contact.
    #[default]
    None,
    /// Wall on the left.
    Left,
    /// Wall on the right.
    Right,
}

impl WallSide {
    /// Derives the wall side from contact flags. A left contact wins when
    /// both sides touch at once.
    pub fn from_contacts(contacts: &ContactFlags) -> Self {
        if contacts.left {
            WallSide::Left
        } else if contacts.right {
            WallSide::Right
        } else {
            WallSide::None
        }
    }

    /// Horizontal unit direction pointing into the wall, 0 when none.
    pub fn toward(&self) -> f32 {
        match self {
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
            WallSide::None => 0.0,
        }
    }

    /// Horizontal unit direction pointing away from the wall, 0 when none.
    pub fn away(&self) -> f32 {
        -self.toward()
    }

    /// Whether any wall is being touched.
    pub fn touching(&self) -> bool {
        *self != WallSide::None
    }
}

/// Marker component indicating the character is standing on ground.
///
/// Added and removed automatically from contact detection. Mutually
/// exclusive with [`Airborne`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is in the air.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character is touching a wall.
///
/// Carries the contact side so queries can filter on it directly.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct TouchingWall {
    /// Which side the wall is on.
    pub side: WallSide,
}

impl TouchingWall {
    /// Creates a wall touch record for the given side.
    pub fn new(side: WallSide) -> Self {
        Self { side }
    }

    /// Check if the wall is on the left side.
    pub fn is_left(&self) -> bool {
        self.side == WallSide::Left
    }

    /// Check if the wall is on the right side.
    pub fn is_right(&self) -> bool {
        self.side == WallSide::Right
    }
}
