//! Rapier2D physics backend implementation.
//!
//! This backend stores character motion in `bevy_rapier2d`'s [`Velocity`]
//! component and refreshes [`ContactFlags`] every physics tick with four
//! short shapecasts around the collider. Enable with the `rapier2d` feature.

use bevy::prelude::*;
use bevy_rapier2d::parry::shape::Segment;
use bevy_rapier2d::prelude::*;

use crate::backend::PhysicsBackend;
use crate::controller::MotionController;
use crate::intent::ContactFlags;
use crate::systems::MotionControllerSet;

/// How far beyond the collider face a surface still counts as touching.
const CONTACT_SKIN: f32 = 2.0;
/// Contact probes span this fraction of the collider face, keeping a side
/// wall from reading as floor and a floor from reading as wall.
const PROBE_INSET: f32 = 0.8;

/// Rapier2D backend for the motion controller.
///
/// Character bodies are dynamic with rotation locked and Rapier gravity
/// disabled; the controller owns gravity and writes [`Velocity`] directly.
/// Spawn characters with [`Rapier2dCharacterBundle`] plus a [`Collider`].
pub struct Rapier2dBackend;

impl PhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn velocity(component: &Velocity) -> Vec2 {
        component.linvel
    }

    fn set_velocity(component: &mut Velocity, velocity: Vec2) {
        component.linvel = velocity;
    }
}

/// Plugin installing the Rapier contact detection system.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            update_contact_flags.in_set(MotionControllerSet::Detection),
        );
    }
}

/// Sweep a segment from the body center toward one face and report whether
/// solid geometry sits within reach.
fn probe_contact(
    context: &RapierContext,
    origin: Vec2,
    direction: Vec2,
    half_spread: f32,
    max_distance: f32,
    exclude_entity: Entity,
    collision_groups: Option<CollisionGroups>,
) -> bool {
    // The segment lies across the cast direction so the whole face is
    // covered, not just its midpoint.
    let across = direction.perp();
    let a = across * -half_spread;
    let b = across * half_spread;
    let shape = Segment::new(a.into(), b.into());

    let mut filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors();
    if let Some(groups) = collision_groups {
        filter = filter.groups(groups);
    }

    context
        .cast_shape(
            origin,
            0.0,
            direction,
            &shape,
            ShapeCastOptions {
                max_time_of_impact: max_distance,
                stop_at_penetration: false,
                ..default()
            },
            filter,
        )
        .is_some()
}

/// Half extents of the supported collider shapes, for probe sizing.
fn collider_half_extents(collider: &Collider) -> Vec2 {
    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let half_height = (segment.a().y - segment.b().y).abs() / 2.0;
        Vec2::new(capsule.radius(), half_height + capsule.radius())
    } else if let Some(ball) = collider.as_ball() {
        Vec2::splat(ball.radius())
    } else if let Some(cuboid) = collider.as_cuboid() {
        cuboid.half_extents()
    } else {
        // Fallback probe size for compound or mesh colliders.
        Vec2::splat(8.0)
    }
}

/// Refreshes every character's [`ContactFlags`] from four short shapecasts.
///
/// Collision groups on the character are honored, and sensors never count
/// as contact.
pub fn update_contact_flags(
    rapier_context: ReadRapierContext,
    mut q_characters: Query<
        (
            Entity,
            &GlobalTransform,
            &Collider,
            &mut ContactFlags,
            Option<&CollisionGroups>,
        ),
        With<MotionController>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, collider, mut contacts, collision_groups) in &mut q_characters {
        let position = transform.translation().truncate();
        let half = collider_half_extents(collider);
        let groups = collision_groups.copied();

        let next = ContactFlags {
            left: probe_contact(
                &context,
                position,
                Vec2::NEG_X,
                half.y * PROBE_INSET,
                half.x + CONTACT_SKIN,
                entity,
                groups,
            ),
            right: probe_contact(
                &context,
                position,
                Vec2::X,
                half.y * PROBE_INSET,
                half.x + CONTACT_SKIN,
                entity,
                groups,
            ),
            down: probe_contact(
                &context,
                position,
                Vec2::NEG_Y,
                half.x * PROBE_INSET,
                half.y + CONTACT_SKIN,
                entity,
                groups,
            ),
            up: probe_contact(
                &context,
                position,
                Vec2::Y,
                half.x * PROBE_INSET,
                half.y + CONTACT_SKIN,
                entity,
                groups,
            ),
        };
        contacts.set_if_neq(next);
    }
}

/// Bundle for spawning a character body on the Rapier backend.
///
/// The body is dynamic so solid geometry still pushes it around, but
/// everything the controller owns is taken away from Rapier: rotation is
/// locked, gravity scale is zero, and the contact material is frictionless
/// so walls never slow a slide on their own.
///
/// # Example
///
/// ```ignore
/// commands.spawn((
///     Transform::from_xyz(0.0, 100.0, 0.0),
///     MotionController::new(),
///     PhysicsParams::player(),
///     InputIntent::default(),
///     ContactFlags::default(),
///     MotionHints::default(),
///     PlayerControlled,
///     Rapier2dCharacterBundle::new(),
///     Collider::cuboid(14.0, 22.0),
/// ));
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// The rigid body type, dynamic by default.
    pub rigid_body: RigidBody,
    /// Linear velocity, written by the controller every tick.
    pub velocity: Velocity,
    /// Rotation stays locked; the spin hint is visual only.
    pub locked_axes: LockedAxes,
    /// Zero. The controller integrates gravity itself.
    pub gravity_scale: GravityScale,
    /// Frictionless contact material.
    pub friction: Friction,
    /// No bounce on landings.
    pub restitution: Restitution,
    /// Characters never sleep; a stalled ground pound would otherwise
    /// let the body doze off mid-air.
    pub sleeping: Sleeping,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    /// Creates the standard platformer body.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            gravity_scale: GravityScale(0.0),
            friction: Friction {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
            restitution: Restitution {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
            sleeping: Sleeping::disabled(),
        }
    }

    /// Sets the rigid body type, for kinematic or scripted characters.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }
}
