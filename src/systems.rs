//! Controller driver systems.
//!
//! Three stages run in order every physics tick: backend detection refreshes
//! [`ContactFlags`], [`drive_motion_controllers`] steps each character's
//! state machine and writes the resulting velocity back through the backend,
//! and [`sync_state_markers`] catches the marker components up with the new
//! frame. Keyboard input is gathered separately in `Update` so no press can
//! fall between physics ticks.

use bevy::prelude::*;

use crate::backend::PhysicsBackend;
use crate::controller::{ControllerEvent, MotionController, MotionHints, VisualEffect};
use crate::intent::{ContactFlags, InputIntent};
use crate::params::PhysicsParams;
use crate::state::{Airborne, Grounded, TouchingWall, WallSide};

/// System sets for the controller stages, chained in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionControllerSet {
    /// Backend contact detection refreshing [`ContactFlags`].
    Detection,
    /// The per-character state machine step.
    Advance,
    /// Marker components catching up with the new frame.
    Sync,
}

/// Keyboard bindings for player-controlled characters.
///
/// Each action accepts several keys; any of them held counts as the action
/// being held.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    /// Keys that move left.
    pub left: Vec<KeyCode>,
    /// Keys that move right.
    pub right: Vec<KeyCode>,
    /// Keys that jump.
    pub jump: Vec<KeyCode>,
    /// Keys that press down (ground pound in the air).
    pub down: Vec<KeyCode>,
    /// Keys that sprint.
    pub sprint: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec![KeyCode::ArrowLeft, KeyCode::KeyA],
            right: vec![KeyCode::ArrowRight, KeyCode::KeyD],
            jump: vec![KeyCode::Space],
            down: vec![KeyCode::ArrowDown, KeyCode::KeyS],
            sprint: vec![KeyCode::ShiftLeft, KeyCode::ShiftRight],
        }
    }
}

/// Marker for characters whose [`InputIntent`] is filled from the keyboard.
///
/// Leave it off AI or replay driven characters and write their intent from
/// your own systems instead.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct PlayerControlled;

/// A character regained ground contact.
#[derive(Event, Debug, Clone, Copy)]
pub struct LandedEvent {
    /// The character that landed.
    pub entity: Entity,
}

/// A ground pound hit the floor after a tall enough fall.
#[derive(Event, Debug, Clone, Copy)]
pub struct GroundPoundLandedEvent {
    /// The character that pounded.
    pub entity: Entity,
}

/// The controller suggests a sprite deformation.
#[derive(Event, Debug, Clone, Copy)]
pub struct VisualEffectRequest {
    /// The character the effect belongs to.
    pub entity: Entity,
    /// Which deformation to play.
    pub effect: VisualEffect,
}

/// Fills [`InputIntent`] from the keyboard for [`PlayerControlled`]
/// characters. Multiple bound keys are OR-combined per action.
pub fn gather_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut q_players: Query<&mut InputIntent, With<PlayerControlled>>,
) {
    let intent = InputIntent {
        left: keyboard.any_pressed(bindings.left.iter().copied()),
        right: keyboard.any_pressed(bindings.right.iter().copied()),
        jump: keyboard.any_pressed(bindings.jump.iter().copied()),
        down: keyboard.any_pressed(bindings.down.iter().copied()),
        sprint: keyboard.any_pressed(bindings.sprint.iter().copied()),
    };
    for mut player_intent in &mut q_players {
        player_intent.set_if_neq(intent);
    }
}

/// Steps every character's state machine one physics tick.
///
/// Reads the body state through the backend, runs
/// [`MotionController::advance`], writes the velocity back, and fans the
/// frame's events out to the app.
pub fn drive_motion_controllers<B: PhysicsBackend>(
    time: Res<Time>,
    mut q_characters: Query<(
        Entity,
        &PhysicsParams,
        &InputIntent,
        &ContactFlags,
        &GlobalTransform,
        &mut B::VelocityComponent,
        &mut MotionController,
        &mut MotionHints,
    )>,
    mut landed_events: EventWriter<LandedEvent>,
    mut pound_events: EventWriter<GroundPoundLandedEvent>,
    mut effect_requests: EventWriter<VisualEffectRequest>,
) {
    // Fall back to a nominal tick when the clock has not advanced, which
    // happens in tests driving the schedule by hand.
    let dt = time.delta_secs();
    let dt = if dt > 0.0 { dt } else { 1.0 / 60.0 };
    let now = time.elapsed_secs();

    for (entity, params, intent, contacts, transform, mut velocity, mut controller, mut hints) in
        &mut q_characters
    {
        let previous_state = controller.state();
        let position = transform.translation().truncate();
        let output = controller.advance(
            params,
            *intent,
            *contacts,
            position,
            B::velocity(&velocity),
            now,
            dt,
        );

        B::set_velocity(&mut velocity, output.velocity);
        hints.set_if_neq(output.hints);

        if controller.state() != previous_state {
            debug!(
                "motion state of {entity:?}: {previous_state:?} -> {:?}",
                controller.state()
            );
        }

        if let Some(effect) = output.effect {
            effect_requests.write(VisualEffectRequest { entity, effect });
        }
        for event in &output.events {
            match event {
                ControllerEvent::Landed => {
                    landed_events.write(LandedEvent { entity });
                    if let Some(effect) = controller.notify_landed() {
                        effect_requests.write(VisualEffectRequest { entity, effect });
                    }
                }
                ControllerEvent::GroundPoundLanded => {
                    pound_events.write(GroundPoundLandedEvent { entity });
                }
            }
        }
    }
}

/// Keeps [`Grounded`], [`Airborne`] and [`TouchingWall`] in line with the
/// frame's contact flags.
pub fn sync_state_markers(
    mut commands: Commands,
    q_characters: Query<
        (
            Entity,
            &ContactFlags,
            Has<Grounded>,
            Has<Airborne>,
            Option<&TouchingWall>,
        ),
        With<MotionController>,
    >,
) {
    for (entity, contacts, has_grounded, has_airborne, wall) in &q_characters {
        if contacts.down {
            if !has_grounded {
                commands.entity(entity).insert(Grounded).remove::<Airborne>();
            }
        } else if !has_airborne || has_grounded {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        let side = WallSide::from_contacts(contacts);
        if side.touching() {
            if wall.map(|w| w.side) != Some(side) {
                commands.entity(entity).insert(TouchingWall::new(side));
            }
        } else if wall.is_some() {
            commands.entity(entity).remove::<TouchingWall>();
        }
    }
}
