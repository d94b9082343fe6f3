//! Playground Example
//!
//! A playable level exercising the whole move set:
//! - A long floor for walking, sprinting and jump combos
//! - Floating platforms for coyote jumps and ground pounds
//! - A chute of two tall walls for wall slides and wall jumps
//! - A goal flag on top of the chute that freezes the character
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Move horizontally
//! - **Shift** (hold): Sprint
//! - **Space**: Jump (hold for height, chain three for a triple jump)
//! - **S/Down** (in the air): Ground pound
//! - **R**: Respawn
//!
//! The camera follows the player and shakes on a ground pound impact.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use platformer_controller::prelude::*;

// ==================== Constants ====================

const PLAYER_HALF_EXTENTS: Vec2 = Vec2::new(14.0, 22.0);
const SPAWN_POSITION: Vec2 = Vec2::new(-380.0, 40.0);

const PX_PER_M: f32 = 100.0; // Pixels per meter for Rapier

const CAMERA_LERP_RATE: f32 = 5.0;
const CAMERA_SHAKE_TIME: f32 = 0.3;
const CAMERA_SHAKE_STRENGTH: f32 = 6.0;

const BLOCK_COLOR: Color = Color::srgb(0.3, 0.3, 0.35);
const PLATFORM_COLOR: Color = Color::srgb(0.4, 0.5, 0.3);
const PLAYER_COLOR: Color = Color::srgb(0.2, 0.6, 0.9);
const FLAG_COLOR: Color = Color::srgb(0.95, 0.8, 0.2);

// ==================== Markers ====================

#[derive(Component)]
struct PlayerBody;

#[derive(Component)]
struct PlayerSprite;

#[derive(Component)]
struct GoalFlag;

#[derive(Component)]
struct FollowCamera;

#[derive(Component)]
struct ClearBanner;

/// Entities the single-player systems address directly.
#[derive(Resource)]
struct PlayerHandles {
    body: Entity,
    sprite: Entity,
}

/// Relaxes the sprite back to its normal scale after a squash or stretch.
#[derive(Component)]
struct ScaleTween {
    from: Vec2,
    timer: Timer,
}

/// Time left on the ground pound camera shake.
#[derive(Resource, Default)]
struct CameraShake {
    time_left: f32,
}

// ==================== Main ====================

fn playground_params() -> PhysicsParams {
    // A full hop keeps the character airborne for about 0.7 s, so the combo
    // window has to stretch past that for triples to chain on flat ground.
    PhysicsParams::player().with_combo_window(0.9)
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Platformer Controller Playground".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(
            PX_PER_M,
        ))
        // Motion controller
        .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
        .init_resource::<CameraShake>()
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                apply_motion_hints,
                start_scale_tweens,
                run_scale_tweens,
                check_goal_reached,
                respawn,
                shake_on_pound,
                follow_player,
            ),
        )
        .run();
}

// ==================== Setup ====================

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        FollowCamera,
        Transform::from_translation(Vec3::new(SPAWN_POSITION.x, 100.0, 0.0)),
    ));

    spawn_level(&mut commands);
    spawn_goal(&mut commands);
    let handles = spawn_player(&mut commands);
    commands.insert_resource(handles);

    commands.spawn((
        Text::new("A/D: Move | Shift: Sprint | Space: Jump | S: Slam | R: Respawn"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn spawn_level(commands: &mut Commands) {
    // Floor, top surface at y = 0
    spawn_block(
        commands,
        Vec2::new(0.0, -20.0),
        Vec2::new(460.0, 20.0),
        BLOCK_COLOR,
    );

    // Boundary walls
    spawn_block(
        commands,
        Vec2::new(-470.0, 220.0),
        Vec2::new(10.0, 240.0),
        BLOCK_COLOR,
    );
    spawn_block(
        commands,
        Vec2::new(470.0, 220.0),
        Vec2::new(10.0, 240.0),
        BLOCK_COLOR,
    );

    // Stepping platforms up the left side
    spawn_block(
        commands,
        Vec2::new(-200.0, 90.0),
        Vec2::new(60.0, 10.0),
        PLATFORM_COLOR,
    );
    spawn_block(
        commands,
        Vec2::new(-40.0, 170.0),
        Vec2::new(50.0, 10.0),
        PLATFORM_COLOR,
    );
    spawn_block(
        commands,
        Vec2::new(110.0, 250.0),
        Vec2::new(50.0, 10.0),
        PLATFORM_COLOR,
    );

    // Wall jump chute on the right, open at the top
    spawn_block(
        commands,
        Vec2::new(260.0, 150.0),
        Vec2::new(10.0, 150.0),
        BLOCK_COLOR,
    );
    spawn_block(
        commands,
        Vec2::new(360.0, 210.0),
        Vec2::new(10.0, 210.0),
        BLOCK_COLOR,
    );
}

fn spawn_block(commands: &mut Commands, position: Vec2, half_size: Vec2, color: Color) {
    commands.spawn((
        Sprite::from_color(color, half_size * 2.0),
        Transform::from_translation(position.extend(0.0)),
        RigidBody::Fixed,
        Collider::cuboid(half_size.x, half_size.y),
    ));
}

fn spawn_goal(commands: &mut Commands) {
    // On top of the taller chute wall. A sensor so the body passes through.
    commands.spawn((
        GoalFlag,
        Sprite::from_color(FLAG_COLOR, Vec2::new(16.0, 40.0)),
        Transform::from_translation(Vec3::new(360.0, 440.0, 0.0)),
        Collider::cuboid(8.0, 20.0),
        Sensor,
        ActiveEvents::COLLISION_EVENTS,
    ));
}

fn spawn_player(commands: &mut Commands) -> PlayerHandles {
    let mut sprite = Entity::PLACEHOLDER;
    let body = commands
        .spawn((
            PlayerBody,
            PlayerControlled,
            Transform::from_translation(SPAWN_POSITION.extend(1.0)),
            Visibility::default(),
            MotionController::new(),
            playground_params(),
            InputIntent::default(),
            ContactFlags::default(),
            MotionHints::default(),
            Rapier2dCharacterBundle::new(),
            Collider::cuboid(PLAYER_HALF_EXTENTS.x, PLAYER_HALF_EXTENTS.y),
        ))
        .with_children(|parent| {
            // The sprite is a child so spins and squashes never touch the
            // physics body's transform.
            sprite = parent
                .spawn((
                    PlayerSprite,
                    Sprite::from_color(PLAYER_COLOR, PLAYER_HALF_EXTENTS * 2.0),
                    Transform::default(),
                ))
                .id();
        })
        .id();

    PlayerHandles { body, sprite }
}

// ==================== Presentation ====================

/// Mirrors facing and spin rotation from the controller onto the sprite.
fn apply_motion_hints(
    handles: Res<PlayerHandles>,
    q_hints: Query<&MotionHints>,
    mut q_sprites: Query<(&mut Sprite, &mut Transform), With<PlayerSprite>>,
) {
    let Ok(hints) = q_hints.get(handles.body) else {
        return;
    };
    let Ok((mut sprite, mut transform)) = q_sprites.get_mut(handles.sprite) else {
        return;
    };
    sprite.flip_x = !hints.facing_right;
    transform.rotation = Quat::from_rotation_z(hints.angle);
}

/// Starts a squash or stretch whenever the controller suggests one.
fn start_scale_tweens(
    mut commands: Commands,
    mut requests: EventReader<VisualEffectRequest>,
    handles: Res<PlayerHandles>,
    q_params: Query<&PhysicsParams>,
) {
    for request in requests.read() {
        if request.entity != handles.body {
            continue;
        }
        let Ok(params) = q_params.get(handles.body) else {
            continue;
        };
        let from = match request.effect {
            VisualEffect::Squash => params.squash_land_scale,
            VisualEffect::Stretch => params.stretch_jump_scale,
        };
        commands.entity(handles.sprite).insert(ScaleTween {
            from,
            timer: Timer::from_seconds(params.squash_stretch_duration, TimerMode::Once),
        });
    }
}

fn run_scale_tweens(
    mut commands: Commands,
    time: Res<Time>,
    mut q_tweens: Query<(Entity, &mut ScaleTween, &mut Transform)>,
) {
    for (entity, mut tween, mut transform) in &mut q_tweens {
        tween.timer.tick(time.delta());
        let scale = tween.from.lerp(Vec2::ONE, tween.timer.fraction());
        transform.scale = scale.extend(1.0);
        if tween.timer.finished() {
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<ScaleTween>();
        }
    }
}

fn shake_on_pound(
    mut shake: ResMut<CameraShake>,
    mut pounds: EventReader<GroundPoundLandedEvent>,
) {
    if pounds.read().next().is_some() {
        shake.time_left = CAMERA_SHAKE_TIME;
    }
}

fn follow_player(
    time: Res<Time>,
    mut shake: ResMut<CameraShake>,
    handles: Res<PlayerHandles>,
    q_bodies: Query<&Transform, (With<PlayerBody>, Without<FollowCamera>)>,
    mut q_cameras: Query<&mut Transform, With<FollowCamera>>,
) {
    let Ok(player) = q_bodies.get(handles.body) else {
        return;
    };
    let target = player.translation.truncate() + Vec2::new(0.0, 60.0);
    for mut camera in &mut q_cameras {
        let current = camera.translation.truncate();
        let mut next = current.lerp(target, (CAMERA_LERP_RATE * time.delta_secs()).min(1.0));
        if shake.time_left > 0.0 {
            shake.time_left -= time.delta_secs();
            let falloff = (shake.time_left / CAMERA_SHAKE_TIME).max(0.0);
            next.y += CAMERA_SHAKE_STRENGTH * falloff * (time.elapsed_secs() * 60.0).sin();
        }
        camera.translation.x = next.x;
        camera.translation.y = next.y;
    }
}

// ==================== Goal and Respawn ====================

/// Touching the flag freezes the character in the level clear state.
fn check_goal_reached(
    mut commands: Commands,
    mut collisions: EventReader<CollisionEvent>,
    q_flags: Query<(), With<GoalFlag>>,
    handles: Res<PlayerHandles>,
    mut q_bodies: Query<(&mut MotionController, &mut Velocity)>,
) {
    for event in collisions.read() {
        let CollisionEvent::Started(a, b, _) = event else {
            continue;
        };
        let touched_flag = (q_flags.contains(*a) && *b == handles.body)
            || (q_flags.contains(*b) && *a == handles.body);
        if !touched_flag {
            continue;
        }
        let Ok((mut controller, mut velocity)) = q_bodies.get_mut(handles.body) else {
            continue;
        };
        if controller.state() == MotionState::LevelClear {
            continue;
        }
        info!("level clear");
        controller.trigger_level_clear();
        velocity.linvel = Vec2::ZERO;
        commands.spawn((
            ClearBanner,
            Text::new("Level clear! Press R to play again"),
            TextFont {
                font_size: 32.0,
                ..default()
            },
            TextColor(FLAG_COLOR),
            Node {
                position_type: PositionType::Absolute,
                top: Val::Percent(40.0),
                left: Val::Percent(32.0),
                ..default()
            },
        ));
    }
}

/// R puts the character back at the spawn point with a fresh controller.
fn respawn(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    handles: Res<PlayerHandles>,
    q_banners: Query<Entity, With<ClearBanner>>,
    mut q_bodies: Query<(&mut Transform, &mut Velocity, &mut MotionController)>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }
    let Ok((mut transform, mut velocity, mut controller)) = q_bodies.get_mut(handles.body) else {
        return;
    };
    transform.translation = SPAWN_POSITION.extend(1.0);
    velocity.linvel = Vec2::ZERO;
    controller.reset();
    for banner in &q_banners {
        commands.entity(banner).despawn();
    }
}
