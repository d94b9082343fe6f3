//! The per-frame motion state machine.
//!
//! [`MotionController`] holds everything a platformer character remembers
//! between frames: its motion state, jump combo progress, coyote and buffer
//! timers, wall jump lock, and ground pound bookkeeping. Each physics tick
//! the driver calls [`MotionController::advance`] with the frame's inputs and
//! gets back the velocity to apply, presentation hints, and any semantic
//! events that fired.
//!
//! `advance` is a pure state transition over plain data. It never touches the
//! ECS or the physics backend, which is what makes the whole machine testable
//! frame by frame without a physics world.

use bevy::prelude::*;

use crate::intent::{ContactFlags, InputIntent};
use crate::params::PhysicsParams;
use crate::state::{MotionState, WallSide};

/// Gravity multiplier while descending against a wall.
const WALL_SLIDE_GRAVITY_SCALE: f32 = 0.2;
/// Horizontal speed below which velocity no longer flips facing.
const FACING_DEADZONE: f32 = 10.0;
/// Horizontal speed above which grounded motion reads as walking.
const WALK_SPEED_THRESHOLD: f32 = 20.0;
/// Spin added per frame of a triple jump, in quarter turns.
const TRIPLE_JUMP_SPIN_STEP: f32 = 0.25;

/// Semantic events emitted by [`MotionController::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The character regained ground contact this frame.
    Landed,
    /// A ground pound ended on the ground after falling at least
    /// `ground_pound_min_height`.
    GroundPoundLanded,
}

/// Sprite deformation suggested by the controller.
///
/// The controller never touches transforms itself; it emits these and the
/// host decides how to animate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualEffect {
    /// Tall and narrow, suggested on jump launches.
    Stretch,
    /// Wide and short, suggested on landings.
    Squash,
}

/// Presentation hints mirrored onto the character every frame.
///
/// `facing_right` drives sprite flipping, `angle` the triple jump spin. Both
/// are suggestions; the host applies them to whatever visual it owns.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct MotionHints {
    /// Which way the character faces.
    pub facing_right: bool,
    /// Sprite rotation in radians. Nonzero only during a triple jump spin.
    pub angle: f32,
}

impl Default for MotionHints {
    fn default() -> Self {
        Self {
            facing_right: true,
            angle: 0.0,
        }
    }
}

/// Everything one call to [`MotionController::advance`] produces.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Velocity the host should apply to the physics body.
    pub velocity: Vec2,
    /// Facing and rotation for the sprite.
    pub hints: MotionHints,
    /// Sprite deformation to start this frame, if any.
    pub effect: Option<VisualEffect>,
    /// Semantic events that fired this frame, in order.
    pub events: Vec<ControllerEvent>,
}

/// Frame-to-frame motion state for one platformer character.
///
/// Attach next to a [`PhysicsParams`] and an [`InputIntent`]; the plugin's
/// driver system calls [`advance`](Self::advance) every physics tick. All
/// fields are private so state can only change through the per-frame
/// transition, which keeps the invariants (timer ranges, combo bounds, the
/// absorbing level clear state) in one place.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct MotionController {
    state: MotionState,
    facing_right: bool,
    on_ground: bool,
    wall_side: WallSide,
    sprint_held: bool,
    jump_count: u8,
    last_jump_time: f32,
    ground_contact_time: f32,
    wall_jump_lock_until: f32,
    coyote_timer: f32,
    jump_buffer_timer: f32,
    jump_hold_timer: u32,
    ground_pound_active: bool,
    ground_pound_stall_timer: f32,
    ground_pound_start_height: f32,
    spin_progress: f32,
    jump_was_held: bool,
}

impl Default for MotionController {
    fn default() -> Self {
        Self {
            state: MotionState::Idle,
            facing_right: true,
            on_ground: false,
            wall_side: WallSide::None,
            sprint_held: false,
            jump_count: 0,
            // Far enough in the past that the first jump can never chain.
            last_jump_time: f32::NEG_INFINITY,
            ground_contact_time: 0.0,
            wall_jump_lock_until: 0.0,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            jump_hold_timer: 0,
            ground_pound_active: false,
            ground_pound_stall_timer: 0.0,
            ground_pound_start_height: 0.0,
            spin_progress: 0.0,
            jump_was_held: false,
        }
    }
}

impl MotionController {
    /// Creates a controller in the idle state, facing right.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current motion state.
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Which way the character faces.
    pub fn facing_right(&self) -> bool {
        self.facing_right
    }

    /// Whether the character stood on ground last frame.
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Whether the character touched a wall last frame.
    pub fn touching_wall(&self) -> bool {
        self.wall_side.touching()
    }

    /// Side of the current wall contact.
    pub fn wall_side(&self) -> WallSide {
        self.wall_side
    }

    /// Jumps taken in the current combo, saturating at 2.
    pub fn jump_count(&self) -> u8 {
        self.jump_count
    }

    /// Whether a ground pound is in progress (stall or fast fall).
    pub fn is_ground_pounding(&self) -> bool {
        self.ground_pound_active
    }

    /// Seconds of ledge grace left.
    pub fn coyote_time_remaining(&self) -> f32 {
        self.coyote_timer
    }

    /// Seconds the buffered jump press stays valid.
    pub fn jump_buffer_remaining(&self) -> f32 {
        self.jump_buffer_timer
    }

    /// Freezes the character in the level clear state.
    ///
    /// Absorbing: every later [`advance`](Self::advance) returns zero
    /// velocity and no events until [`reset`](Self::reset).
    pub fn trigger_level_clear(&mut self) {
        self.state = MotionState::LevelClear;
    }

    /// Returns the controller to its spawn state. Used on respawn.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Visual response to a landing reported by the host.
    ///
    /// Returns `None` when the landing ends a ground pound; the pound has
    /// its own impact event and gets no squash.
    pub fn notify_landed(&self) -> Option<VisualEffect> {
        if self.state == MotionState::GroundPound {
            None
        } else {
            Some(VisualEffect::Squash)
        }
    }

    /// Runs one frame of the motion state machine.
    ///
    /// `position` and `velocity` describe the physics body before the frame,
    /// `now` is wall-clock seconds, `dt` the frame delta (must be positive).
    /// The returned [`FrameOutput::velocity`] is what the body should move
    /// with; the caller owns writing it back to the backend.
    pub fn advance(
        &mut self,
        params: &PhysicsParams,
        intent: InputIntent,
        contacts: ContactFlags,
        position: Vec2,
        velocity: Vec2,
        now: f32,
        dt: f32,
    ) -> FrameOutput {
        debug_assert!(dt > 0.0, "advance called with non-positive dt");

        let mut v = velocity;
        let mut events = Vec::new();
        let mut effect = None;

        // Level clear is absorbing: the character stays frozen in place.
        if self.state == MotionState::LevelClear {
            return self.output(Vec2::ZERO, None, events);
        }

        // Ceiling contact cancels upward motion.
        if contacts.up && v.y > 0.0 {
            v.y = 0.0;
        }

        // Ground and wall bookkeeping.
        let was_on_ground = self.on_ground;
        self.on_ground = contacts.down;
        self.wall_side = WallSide::from_contacts(&contacts);
        if self.on_ground {
            self.coyote_timer = params.coyote_time;
            self.ground_contact_time += dt;
            if self.ground_contact_time > params.jump_combo_window
                && params.jump_combo_reset_on_land
            {
                self.jump_count = 0;
            }
            if self.state != MotionState::GroundPound {
                self.ground_pound_active = false;
            }
            if !was_on_ground {
                events.push(ControllerEvent::Landed);
            }
        } else {
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);
            self.ground_contact_time = 0.0;
        }

        // Pressing down in the air starts a ground pound.
        if intent.down && !self.on_ground && !self.ground_pound_active {
            self.ground_pound_active = true;
            self.ground_pound_stall_timer = params.ground_pound_stall_time;
            self.ground_pound_start_height = position.y;
            self.state = MotionState::GroundPound;
            v = Vec2::ZERO;
        }

        // A fresh jump press arms the buffer; holding does not re-arm it.
        if intent.jump && !self.jump_was_held {
            self.jump_buffer_timer = params.jump_buffer_time;
        }
        self.jump_buffer_timer = (self.jump_buffer_timer - dt).max(0.0);
        self.jump_was_held = intent.jump;

        // A ground pound owns the whole frame: stall in place, then fast
        // fall under its own gravity until ground contact.
        if self.ground_pound_active {
            if self.ground_pound_stall_timer > 0.0 {
                self.ground_pound_stall_timer -= dt;
                v = Vec2::ZERO;
            }
            if self.ground_pound_stall_timer <= 0.0 {
                v.y -= params.ground_pound_gravity * dt;
                v.y = v.y.max(-params.ground_pound_terminal_velocity);
                if self.on_ground {
                    let fall_distance = self.ground_pound_start_height - position.y;
                    if fall_distance >= params.ground_pound_min_height {
                        events.push(ControllerEvent::GroundPoundLanded);
                    }
                    self.ground_pound_active = false;
                }
            }
            return self.output(v, None, events);
        }

        // Wall slide: airborne against a wall, pressing into it or falling.
        if !self.on_ground && self.wall_side.touching() {
            let toward_wall = (self.wall_side == WallSide::Left && intent.left)
                || (self.wall_side == WallSide::Right && intent.right);
            if toward_wall || v.y < 0.0 {
                self.state = MotionState::WallSlide;
                v.y = v.y.max(-params.wall_slide_speed);
            }
        }

        // Horizontal input. A wall jump locks this out briefly so the
        // away-from-wall impulse cannot be steered back immediately.
        self.sprint_held = intent.sprint;
        if now >= self.wall_jump_lock_until {
            let axis = intent.horizontal_axis();
            if axis != 0.0 {
                v.x += axis * params.run_acceleration(self.sprint_held) * dt;
                self.facing_right = axis > 0.0;
            } else {
                v.x *= params.surface_friction(self.on_ground);
            }
            let top_speed = params.top_speed(self.sprint_held);
            v.x = v.x.clamp(-top_speed, top_speed);
        }

        // Jumps. Wall jumps fire on a held press against a wall; ground and
        // coyote jumps need a buffered press and remaining ground grace.
        if intent.jump && !self.on_ground && self.wall_side.touching() {
            effect = Some(self.launch_wall_jump(params, &mut v, now));
            self.jump_buffer_timer = 0.0;
            self.coyote_timer = 0.0;
        } else if self.jump_buffer_timer > 0.0
            && self.coyote_timer > 0.0
            && now >= self.wall_jump_lock_until
        {
            let within_combo = now - self.last_jump_time <= params.jump_combo_window;
            effect = Some(if within_combo && self.jump_count >= 2 {
                self.launch_triple_jump(params, &mut v, now)
            } else {
                self.launch_normal_jump(params, &mut v, now)
            });
            self.jump_buffer_timer = 0.0;
            self.coyote_timer = 0.0;
        }

        // Gravity. A wall slide falls at reduced gravity; a held jump press
        // lightens gravity for a few frames so the arc rises higher.
        let mut gravity = params.gravity;
        if self.state == MotionState::WallSlide && v.y <= 0.0 {
            gravity *= WALL_SLIDE_GRAVITY_SCALE;
        } else if self.state.is_jump_arc()
            && intent.jump
            && self.jump_hold_timer < params.jump_hold_frames
        {
            gravity *= params.jump_hold_gravity_scale;
            self.jump_hold_timer += 1;
        }
        v.y -= gravity * dt;

        // Fall speed caps, slide cap last so it always holds while sliding.
        v.y = v.y.max(-params.terminal_velocity);
        if self.state == MotionState::WallSlide {
            v.y = v.y.max(-params.wall_slide_speed);
        }

        // Facing follows horizontal velocity outside the dead zone.
        if v.x > FACING_DEADZONE {
            self.facing_right = true;
        } else if v.x < -FACING_DEADZONE {
            self.facing_right = false;
        }

        // State for animation.
        if self.state == MotionState::TripleJump {
            self.spin_progress += TRIPLE_JUMP_SPIN_STEP;
            if v.y < 0.0 {
                self.state = MotionState::Fall;
                self.spin_progress = 0.0;
            }
        } else if self.on_ground {
            self.spin_progress = 0.0;
            self.state = if v.x.abs() > WALK_SPEED_THRESHOLD {
                if self.sprint_held {
                    MotionState::Sprint
                } else {
                    MotionState::Walk
                }
            } else {
                MotionState::Idle
            };
        } else if self.state != MotionState::WallSlide || !self.wall_side.touching() {
            self.state = if v.y > 0.0 {
                MotionState::Jump
            } else {
                MotionState::Fall
            };
        }

        self.output(v, effect, events)
    }

    fn launch_wall_jump(&mut self, params: &PhysicsParams, v: &mut Vec2, now: f32) -> VisualEffect {
        let direction = self.wall_side.away();
        self.wall_jump_lock_until = now + params.wall_jump_lock_time;
        v.x = direction * params.wall_jump_horizontal_velocity;
        v.y = params.wall_jump_vertical_velocity;
        self.facing_right = direction > 0.0;
        self.jump_count = 0;
        self.last_jump_time = now;
        self.state = MotionState::Jump;
        self.jump_hold_timer = 0;
        VisualEffect::Stretch
    }

    fn launch_normal_jump(
        &mut self,
        params: &PhysicsParams,
        v: &mut Vec2,
        now: f32,
    ) -> VisualEffect {
        v.y = params.jump_velocity;
        self.jump_count = (self.jump_count + 1).min(2);
        self.last_jump_time = now;
        self.state = MotionState::Jump;
        self.jump_hold_timer = 0;
        VisualEffect::Stretch
    }

    fn launch_triple_jump(
        &mut self,
        params: &PhysicsParams,
        v: &mut Vec2,
        now: f32,
    ) -> VisualEffect {
        // The horizontal boost is deliberately left unclamped for the launch
        // frame; the next frame's input step reins it back in.
        v.x *= params.triple_jump_horizontal_boost;
        v.y = params.triple_jump_vertical_velocity;
        self.jump_count = 0;
        self.last_jump_time = now;
        self.state = MotionState::TripleJump;
        self.jump_hold_timer = 0;
        self.spin_progress = 0.0;
        VisualEffect::Stretch
    }

    fn output(
        &self,
        velocity: Vec2,
        effect: Option<VisualEffect>,
        events: Vec<ControllerEvent>,
    ) -> FrameOutput {
        FrameOutput {
            velocity,
            hints: MotionHints {
                facing_right: self.facing_right,
                angle: self.spin_angle(),
            },
            effect,
            events,
        }
    }

    /// Sprite rotation in radians. The spin turns with the facing direction:
    /// clockwise when facing right, counterclockwise when facing left.
    fn spin_angle(&self) -> f32 {
        let quarter_turns = self.spin_progress * std::f32::consts::FRAC_PI_2;
        if self.facing_right {
            -quarter_turns
        } else {
            quarter_turns
        }
    }
}
