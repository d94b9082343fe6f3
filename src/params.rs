//! Tuning parameters for platformer motion.
//!
//! All values live in one flat table so a game can tweak the feel of a
//! character in a single place. Distances are in world units (pixels for a
//! pixel-art game), times in seconds, velocities in units per second. The
//! vertical axis points up: gravity and terminal velocity are stored as
//! positive magnitudes and applied downward by the controller.

use bevy::prelude::*;

/// Complete tuning table for one character.
///
/// Attach this next to a [`MotionController`](crate::controller::MotionController)
/// and the controller reads it every frame. Values can be changed at runtime;
/// the controller picks up the new numbers on the next tick.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsParams {
    // === Gravity Settings ===
    /// Downward acceleration in units/s².
    pub gravity: f32,
    /// Maximum falling speed. Falls are clamped to this magnitude.
    pub terminal_velocity: f32,

    // === Ground Movement Settings ===
    /// Horizontal acceleration while walking, in units/s².
    pub acceleration: f32,
    /// Horizontal acceleration while sprinting, in units/s².
    pub sprint_acceleration: f32,
    /// Per-frame velocity retention on the ground with no input (0..1).
    pub friction: f32,
    /// Per-frame velocity retention in the air with no input (0..1).
    pub air_friction: f32,
    /// Horizontal speed cap while walking.
    pub walk_max_speed: f32,
    /// Horizontal speed cap while sprinting.
    pub sprint_max_speed: f32,

    // === Jump Settings ===
    /// Upward launch speed of a normal jump.
    pub jump_velocity: f32,
    /// Gravity multiplier applied while the jump button is held during the
    /// rising arc. Values below 1.0 make held jumps reach higher.
    pub jump_hold_gravity_scale: f32,
    /// How many frames the hold bonus lasts after a launch.
    pub jump_hold_frames: u32,
    /// Grace period after walking off a ledge during which a jump still fires.
    pub coyote_time: f32,
    /// How long a jump press stays valid before landing.
    pub jump_buffer_time: f32,

    // === Wall Settings ===
    /// Maximum downward speed while sliding against a wall.
    pub wall_slide_speed: f32,
    /// Horizontal speed imparted by a wall jump, away from the wall.
    pub wall_jump_horizontal_velocity: f32,
    /// Upward speed imparted by a wall jump.
    pub wall_jump_vertical_velocity: f32,
    /// How long horizontal input is ignored after a wall jump.
    pub wall_jump_lock_time: f32,

    // === Ground Pound Settings ===
    /// Hang time at the start of a ground pound before the fast fall.
    pub ground_pound_stall_time: f32,
    /// Downward acceleration during the pound fall. Replaces normal gravity.
    pub ground_pound_gravity: f32,
    /// Falling speed cap during the pound fall.
    pub ground_pound_terminal_velocity: f32,
    /// Minimum fall distance for a pound landing to count as an impact.
    pub ground_pound_min_height: f32,

    // === Jump Combo Settings ===
    /// Upward launch speed of the third jump in a combo.
    pub triple_jump_vertical_velocity: f32,
    /// Multiplier applied to horizontal speed on a triple jump launch.
    pub triple_jump_horizontal_boost: f32,
    /// Maximum gap between successive jumps for the combo to continue.
    pub jump_combo_window: f32,
    /// Whether lingering on the ground past the combo window resets the
    /// combo counter.
    pub jump_combo_reset_on_land: bool,

    // === Visual Hint Settings ===
    /// Sprite scale suggested on a hard landing (wide and short).
    pub squash_land_scale: Vec2,
    /// Sprite scale suggested on a jump launch (narrow and tall).
    pub stretch_jump_scale: Vec2,
    /// How long a squash or stretch should take to relax back to normal.
    pub squash_stretch_duration: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            terminal_velocity: 720.0,

            acceleration: 480.0,
            sprint_acceleration: 620.0,
            friction: 0.82,
            air_friction: 0.98,
            walk_max_speed: 180.0,
            sprint_max_speed: 320.0,

            jump_velocity: 420.0,
            jump_hold_gravity_scale: 0.45,
            jump_hold_frames: 12,
            coyote_time: 0.12,
            jump_buffer_time: 0.15,

            wall_slide_speed: 120.0,
            wall_jump_horizontal_velocity: 280.0,
            wall_jump_vertical_velocity: 380.0,
            wall_jump_lock_time: 0.18,

            ground_pound_stall_time: 0.2,
            ground_pound_gravity: 2400.0,
            ground_pound_terminal_velocity: 900.0,
            ground_pound_min_height: 40.0,

            triple_jump_vertical_velocity: 480.0,
            triple_jump_horizontal_boost: 1.25,
            jump_combo_window: 0.35,
            jump_combo_reset_on_land: true,

            squash_land_scale: Vec2::new(1.25, 0.7),
            stretch_jump_scale: Vec2::new(0.85, 1.2),
            squash_stretch_duration: 0.12,
        }
    }
}

impl PhysicsParams {
    /// Default tuning for a player character.
    pub fn player() -> Self {
        Self::default()
    }

    /// A lighter, airier feel: slower falls and a longer ledge grace.
    pub fn floaty() -> Self {
        Self {
            gravity: 900.0,
            terminal_velocity: 600.0,
            jump_velocity: 380.0,
            coyote_time: 0.16,
            ..Self::default()
        }
    }

    /// A heavier feel: fast falls, strong jumps, grippier ground.
    pub fn heavy() -> Self {
        Self {
            gravity: 1500.0,
            jump_velocity: 460.0,
            friction: 0.7,
            air_friction: 0.95,
            ..Self::default()
        }
    }

    /// Sets the gravity magnitude.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Sets the maximum falling speed.
    pub fn with_terminal_velocity(mut self, speed: f32) -> Self {
        self.terminal_velocity = speed;
        self
    }

    /// Sets the normal jump launch speed.
    pub fn with_jump_velocity(mut self, speed: f32) -> Self {
        self.jump_velocity = speed;
        self
    }

    /// Sets the ledge grace period.
    pub fn with_coyote_time(mut self, seconds: f32) -> Self {
        self.coyote_time = seconds;
        self
    }

    /// Sets how long a jump press stays valid before landing.
    pub fn with_jump_buffer_time(mut self, seconds: f32) -> Self {
        self.jump_buffer_time = seconds;
        self
    }

    /// Sets the walking and sprinting speed caps.
    pub fn with_max_speeds(mut self, walk: f32, sprint: f32) -> Self {
        self.walk_max_speed = walk;
        self.sprint_max_speed = sprint;
        self
    }

    /// Sets the ground and air friction factors.
    pub fn with_friction(mut self, ground: f32, air: f32) -> Self {
        self.friction = ground;
        self.air_friction = air;
        self
    }

    /// Sets the wall jump impulse, horizontal then vertical.
    pub fn with_wall_jump(mut self, horizontal: f32, vertical: f32) -> Self {
        self.wall_jump_horizontal_velocity = horizontal;
        self.wall_jump_vertical_velocity = vertical;
        self
    }

    /// Sets the combo window between successive jumps.
    pub fn with_combo_window(mut self, seconds: f32) -> Self {
        self.jump_combo_window = seconds;
        self
    }

    /// Sets the minimum fall distance for a pound impact.
    pub fn with_ground_pound_min_height(mut self, height: f32) -> Self {
        self.ground_pound_min_height = height;
        self
    }

    /// Horizontal acceleration for the current sprint state.
    pub fn run_acceleration(&self, sprinting: bool) -> f32 {
        if sprinting {
            self.sprint_acceleration
        } else {
            self.acceleration
        }
    }

    /// Horizontal speed cap for the current sprint state.
    pub fn top_speed(&self, sprinting: bool) -> f32 {
        if sprinting {
            self.sprint_max_speed
        } else {
            self.walk_max_speed
        }
    }

    /// Velocity retention factor for the current surface.
    pub fn surface_friction(&self, on_ground: bool) -> f32 {
        if on_ground {
            self.friction
        } else {
            self.air_friction
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn tuning_table_round_trips_through_ron() {
        let params = PhysicsParams::heavy().with_combo_window(0.5);
        let text = ron::to_string(&params).unwrap();
        let back: PhysicsParams = ron::from_str(&text).unwrap();
        assert_eq!(back, params);
    }
}
