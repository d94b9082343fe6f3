//! Frame-by-frame tests of the motion state machine.
//!
//! These drive `MotionController::advance` directly with scripted input and
//! contact sequences, integrating position by hand the way a host would. No
//! physics world is involved, so timing windows (coyote, buffer, combo,
//! steering lock) can be checked to the frame.

use bevy::prelude::*;
use platformer_controller::prelude::*;

const DT: f32 = 1.0 / 60.0;

/// Hand-integrated simulation of one character.
struct Sim {
    controller: MotionController,
    params: PhysicsParams,
    position: Vec2,
    velocity: Vec2,
    now: f32,
}

impl Sim {
    fn new(params: PhysicsParams) -> Self {
        Self {
            controller: MotionController::new(),
            params,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            now: 0.0,
        }
    }

    /// Advances one frame, then integrates position from the returned
    /// velocity.
    fn step(&mut self, intent: InputIntent, contacts: ContactFlags) -> FrameOutput {
        let out = self.controller.advance(
            &self.params,
            intent,
            contacts,
            self.position,
            self.velocity,
            self.now,
            DT,
        );
        self.velocity = out.velocity;
        self.position += self.velocity * DT;
        self.now += DT;
        out
    }

    /// A few grounded frames so contact bookkeeping settles.
    fn settle_on_ground(&mut self) {
        for _ in 0..3 {
            self.step(InputIntent::default(), ContactFlags::grounded());
        }
        self.position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }
}

fn idle() -> InputIntent {
    InputIntent::default()
}

fn jump_held() -> InputIntent {
    InputIntent {
        jump: true,
        ..InputIntent::default()
    }
}

fn left_held() -> InputIntent {
    InputIntent {
        left: true,
        ..InputIntent::default()
    }
}

fn right_held() -> InputIntent {
    InputIntent {
        right: true,
        ..InputIntent::default()
    }
}

fn down_held() -> InputIntent {
    InputIntent {
        down: true,
        ..InputIntent::default()
    }
}

mod coyote_time {
    use super::*;

    #[test]
    fn jump_still_fires_shortly_after_leaving_a_ledge() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();

        // Walk off: four airborne frames is well inside the grace window.
        for _ in 0..4 {
            sim.step(idle(), ContactFlags::none());
        }
        assert!(sim.controller.coyote_time_remaining() > 0.0);

        let out = sim.step(jump_held(), ContactFlags::none());
        assert!(out.velocity.y > 0.0, "coyote jump launches upward");
        assert_eq!(sim.controller.state(), MotionState::Jump);
    }

    #[test]
    fn jump_does_nothing_once_the_grace_expires() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();

        // Ten airborne frames exceed the 0.12 s default window.
        for _ in 0..10 {
            sim.step(idle(), ContactFlags::none());
        }
        assert_eq!(sim.controller.coyote_time_remaining(), 0.0);

        for _ in 0..30 {
            let out = sim.step(jump_held(), ContactFlags::none());
            assert!(out.velocity.y < 0.0, "no midair jump without a wall");
        }
        assert_eq!(sim.controller.state(), MotionState::Fall);
    }
}

mod jump_buffer {
    use super::*;

    #[test]
    fn press_before_landing_fires_on_the_landing_frame() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 100.0;

        for _ in 0..5 {
            sim.step(idle(), ContactFlags::none());
        }
        // Press four frames before touchdown and keep holding.
        for _ in 0..4 {
            sim.step(jump_held(), ContactFlags::none());
        }
        let out = sim.step(jump_held(), ContactFlags::grounded());

        assert!(out.events.contains(&ControllerEvent::Landed));
        assert!(out.velocity.y > 0.0, "buffered jump fires as the feet touch");
        assert_eq!(sim.controller.state(), MotionState::Jump);
    }

    #[test]
    fn buffered_press_survives_an_early_release() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 60.0;

        for _ in 0..5 {
            sim.step(idle(), ContactFlags::none());
        }
        sim.step(jump_held(), ContactFlags::none());
        sim.step(idle(), ContactFlags::none());
        sim.step(idle(), ContactFlags::none());

        let out = sim.step(idle(), ContactFlags::grounded());
        assert!(out.velocity.y > 0.0, "a tap three frames before landing still counts");
    }

    #[test]
    fn stale_press_expires_before_landing() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 200.0;

        sim.step(jump_held(), ContactFlags::none());
        // Keep falling past the 0.15 s buffer window.
        for _ in 0..11 {
            sim.step(idle(), ContactFlags::none());
        }
        assert_eq!(sim.controller.jump_buffer_remaining(), 0.0);

        let out = sim.step(idle(), ContactFlags::grounded());
        assert!(out.velocity.y <= 0.0, "expired press must not launch");
        assert_eq!(sim.controller.state(), MotionState::Idle);
    }

    #[test]
    fn holding_jump_never_rearms_the_buffer() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();

        // Launch, then hold jump through a full second of air time.
        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(sim.controller.jump_count(), 1);
        for _ in 0..60 {
            sim.step(jump_held(), ContactFlags::none());
        }

        assert_eq!(sim.controller.jump_count(), 1, "held button fires exactly once");
        assert_eq!(sim.controller.jump_buffer_remaining(), 0.0);
    }
}

mod triple_jump {
    use super::*;

    /// Two short scripted hops that leave the combo at two jumps.
    fn two_quick_jumps(sim: &mut Sim) {
        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(sim.controller.jump_count(), 1);
        sim.step(idle(), ContactFlags::none());
        sim.step(idle(), ContactFlags::none());
        sim.step(idle(), ContactFlags::grounded());

        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(sim.controller.jump_count(), 2);
        sim.step(idle(), ContactFlags::none());
        sim.step(idle(), ContactFlags::none());
        sim.step(idle(), ContactFlags::grounded());
    }

    #[test]
    fn third_quick_jump_launches_the_spin() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();
        two_quick_jumps(&mut sim);

        // Carry some run speed into the third launch.
        sim.velocity.x = 200.0;
        let out = sim.step(jump_held(), ContactFlags::grounded());

        assert_eq!(sim.controller.state(), MotionState::TripleJump);
        assert_eq!(sim.controller.jump_count(), 0, "combo resets on the triple");

        // Ground friction runs before the launch, then the boost multiplies
        // what is left. The boost itself is not speed-capped.
        let expected_x =
            200.0 * sim.params.friction * sim.params.triple_jump_horizontal_boost;
        assert!(
            (out.velocity.x - expected_x).abs() < 1e-3,
            "launch x: {} vs {}",
            out.velocity.x,
            expected_x
        );
        assert!(
            out.velocity.y > sim.params.jump_velocity,
            "triple launches harder than a normal jump: {}",
            out.velocity.y
        );
        println!(
            "PROOF: triple launch velocity = ({}, {})",
            out.velocity.x, out.velocity.y
        );
    }

    #[test]
    fn fourth_jump_behaves_like_a_first_jump() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();
        two_quick_jumps(&mut sim);
        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(sim.controller.state(), MotionState::TripleJump);

        sim.step(idle(), ContactFlags::none());
        sim.step(idle(), ContactFlags::none());
        sim.step(idle(), ContactFlags::grounded());

        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(sim.controller.state(), MotionState::Jump);
        assert_eq!(sim.controller.jump_count(), 1);
    }

    #[test]
    fn lingering_on_the_ground_lapses_the_combo() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();
        two_quick_jumps(&mut sim);

        // Half a second on the ground exceeds the 0.35 s combo window.
        for _ in 0..30 {
            sim.step(idle(), ContactFlags::grounded());
        }
        assert_eq!(sim.controller.jump_count(), 0);

        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(
            sim.controller.state(),
            MotionState::Jump,
            "lapsed combo falls back to a normal jump"
        );
    }

    #[test]
    fn spin_runs_while_rising_and_resets_on_the_way_down() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();
        two_quick_jumps(&mut sim);
        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(sim.controller.state(), MotionState::TripleJump);

        let out = sim.step(idle(), ContactFlags::none());
        assert!(
            out.hints.angle < 0.0,
            "facing right spins clockwise: {}",
            out.hints.angle
        );

        let mut tipped_over = false;
        for _ in 0..120 {
            let out = sim.step(idle(), ContactFlags::none());
            if sim.controller.state() == MotionState::Fall {
                assert_eq!(out.hints.angle, 0.0, "spin resets when the arc tips over");
                tipped_over = true;
                break;
            }
        }
        assert!(tipped_over, "triple jump must eventually tip into a fall");
    }
}

mod ground_pound {
    use super::*;

    #[test]
    fn pound_stalls_in_place_then_fast_falls() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 400.0;
        for _ in 0..5 {
            sim.step(idle(), ContactFlags::none());
        }

        let out = sim.step(down_held(), ContactFlags::none());
        assert_eq!(sim.controller.state(), MotionState::GroundPound);
        assert_eq!(out.velocity, Vec2::ZERO, "trigger frame pins the body");

        // The 0.2 s stall holds for ten more full frames.
        for _ in 0..10 {
            let out = sim.step(down_held(), ContactFlags::none());
            assert_eq!(out.velocity, Vec2::ZERO, "stall pins the body");
        }
        let mut falling = false;
        for _ in 0..3 {
            let out = sim.step(down_held(), ContactFlags::none());
            if out.velocity.y < 0.0 {
                falling = true;
                break;
            }
        }
        assert!(falling, "fast fall starts when the stall runs out");

        // The pound has its own, harder speed cap.
        for _ in 0..60 {
            sim.step(down_held(), ContactFlags::none());
        }
        assert_eq!(sim.velocity.y, -sim.params.ground_pound_terminal_velocity);
        println!("PROOF: pound fall speed pinned at {}", sim.velocity.y);
    }

    #[test]
    fn impact_event_requires_the_minimum_fall() {
        let pound_landings = |start_height: f32| -> usize {
            let mut sim = Sim::new(PhysicsParams::default());
            sim.position.y = start_height;
            let mut count = 0;
            for _ in 0..400 {
                let contacts = if sim.position.y <= 0.0 {
                    ContactFlags::grounded()
                } else {
                    ContactFlags::none()
                };
                let out = sim.step(down_held(), contacts);
                count += out
                    .events
                    .iter()
                    .filter(|e| **e == ControllerEvent::GroundPoundLanded)
                    .count();
                if sim.position.y <= 0.0 && !sim.controller.is_ground_pounding() {
                    break;
                }
            }
            count
        };

        assert_eq!(pound_landings(200.0), 1, "tall pound lands with impact");
        assert_eq!(pound_landings(20.0), 0, "short pound lands quietly");
    }

    #[test]
    fn pound_wins_over_wall_slide() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 100.0;
        sim.step(idle(), ContactFlags::none());

        let intent = InputIntent {
            down: true,
            left: true,
            ..InputIntent::default()
        };
        sim.step(intent, ContactFlags::wall_left());
        assert_eq!(sim.controller.state(), MotionState::GroundPound);
    }
}

mod wall_motion {
    use super::*;

    #[test]
    fn slide_caps_descent_at_the_slide_speed() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 400.0;

        for _ in 0..120 {
            let out = sim.step(left_held(), ContactFlags::wall_left());
            if sim.controller.state() == MotionState::WallSlide {
                assert!(
                    out.velocity.y >= -sim.params.wall_slide_speed,
                    "slide never falls faster than the cap: {}",
                    out.velocity.y
                );
            }
        }
        assert_eq!(sim.controller.state(), MotionState::WallSlide);
        assert_eq!(sim.velocity.y, -sim.params.wall_slide_speed);
    }

    #[test]
    fn rising_past_a_wall_without_pressing_is_not_a_slide() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 100.0;
        sim.velocity.y = 300.0;

        sim.step(idle(), ContactFlags::wall_left());
        assert_eq!(sim.controller.state(), MotionState::Jump);

        // Pressing into the wall engages the slide even while rising.
        let mut pressing = Sim::new(PhysicsParams::default());
        pressing.position.y = 100.0;
        pressing.velocity.y = 300.0;
        pressing.step(left_held(), ContactFlags::wall_left());
        assert_eq!(pressing.controller.state(), MotionState::WallSlide);
    }

    #[test]
    fn wall_jump_kicks_away_and_locks_steering() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 200.0;

        // Fall against the right wall, pressing into it.
        for _ in 0..4 {
            sim.step(right_held(), ContactFlags::wall_right());
        }
        assert_eq!(sim.controller.state(), MotionState::WallSlide);

        let launch = InputIntent {
            jump: true,
            right: true,
            ..InputIntent::default()
        };
        let out = sim.step(launch, ContactFlags::wall_right());
        assert_eq!(out.velocity.x, -sim.params.wall_jump_horizontal_velocity);
        assert!(out.velocity.y > 0.0);
        assert!(!sim.controller.facing_right(), "launch faces away from the wall");
        assert_eq!(out.effect, Some(VisualEffect::Stretch));

        // Steering back toward the wall is ignored while the lock holds.
        for _ in 0..9 {
            let out = sim.step(right_held(), ContactFlags::none());
            assert_eq!(
                out.velocity.x, -sim.params.wall_jump_horizontal_velocity,
                "lock preserves the kick"
            );
        }
        // Once it expires the same input pulls back in.
        for _ in 0..20 {
            sim.step(right_held(), ContactFlags::none());
        }
        assert!(
            sim.velocity.x > -sim.params.wall_jump_horizontal_velocity,
            "steering works again after the lock: {}",
            sim.velocity.x
        );
    }

    #[test]
    fn wall_jump_resets_the_combo() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();
        sim.step(jump_held(), ContactFlags::grounded());
        assert_eq!(sim.controller.jump_count(), 1);

        sim.step(idle(), ContactFlags::none());
        let launch = InputIntent {
            jump: true,
            ..InputIntent::default()
        };
        sim.step(launch, ContactFlags::wall_left());
        assert_eq!(sim.controller.jump_count(), 0);
    }
}

mod falling {
    use super::*;

    #[test]
    fn free_fall_caps_at_terminal_velocity() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 2000.0;

        for _ in 0..120 {
            sim.step(idle(), ContactFlags::none());
        }
        assert_eq!(sim.velocity.y, -sim.params.terminal_velocity);

        // The clamp is idempotent frame over frame.
        let out = sim.step(idle(), ContactFlags::none());
        assert_eq!(out.velocity.y, -sim.params.terminal_velocity);
    }

    #[test]
    fn touchdown_emits_exactly_one_landing() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.position.y = 60.0;

        let mut landings = 0;
        for _ in 0..200 {
            let contacts = if sim.position.y <= 0.0 {
                ContactFlags::grounded()
            } else {
                ContactFlags::none()
            };
            let out = sim.step(idle(), contacts);
            landings += out
                .events
                .iter()
                .filter(|e| **e == ControllerEvent::Landed)
                .count();
        }
        assert_eq!(landings, 1);
    }
}

mod jump_hold {
    use super::*;

    fn apex_height(hold_after_launch: bool) -> f32 {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();
        sim.step(jump_held(), ContactFlags::grounded());

        let mut peak = 0.0_f32;
        for _ in 0..120 {
            let intent = if hold_after_launch { jump_held() } else { idle() };
            sim.step(intent, ContactFlags::none());
            peak = peak.max(sim.position.y);
        }
        peak
    }

    #[test]
    fn holding_the_button_raises_the_apex() {
        let held = apex_height(true);
        let tapped = apex_height(false);
        println!("PROOF: apex held={held} tapped={tapped}");
        assert!(
            held > tapped + 5.0,
            "held jump must rise clearly higher: {held} vs {tapped}"
        );
    }
}

mod movement {
    use super::*;

    #[test]
    fn walking_accelerates_and_caps_at_walk_speed() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();

        for _ in 0..60 {
            sim.step(right_held(), ContactFlags::grounded());
        }
        assert_eq!(sim.velocity.x, sim.params.walk_max_speed);
        assert_eq!(sim.controller.state(), MotionState::Walk);
        assert!(sim.controller.facing_right());
    }

    #[test]
    fn sprinting_caps_higher_and_reads_as_sprint() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();

        let sprint_right = InputIntent {
            right: true,
            sprint: true,
            ..InputIntent::default()
        };
        for _ in 0..60 {
            sim.step(sprint_right, ContactFlags::grounded());
        }
        assert_eq!(sim.velocity.x, sim.params.sprint_max_speed);
        assert_eq!(sim.controller.state(), MotionState::Sprint);
    }

    #[test]
    fn releasing_input_bleeds_speed_through_friction() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();
        for _ in 0..60 {
            sim.step(right_held(), ContactFlags::grounded());
        }

        let before = sim.velocity.x;
        sim.step(idle(), ContactFlags::grounded());
        let after = sim.velocity.x;
        assert!(after < before, "ground friction bleeds speed");
        assert!((after - before * sim.params.friction).abs() < 1e-3);

        // Idle once slow enough.
        for _ in 0..60 {
            sim.step(idle(), ContactFlags::grounded());
        }
        assert_eq!(sim.controller.state(), MotionState::Idle);
    }

    #[test]
    fn facing_ignores_tiny_drifts() {
        let mut sim = Sim::new(PhysicsParams::default());
        sim.settle_on_ground();

        // A small leftward drift below the dead zone keeps the old facing.
        sim.velocity.x = -5.0;
        sim.step(idle(), ContactFlags::grounded());
        assert!(sim.controller.facing_right());

        sim.velocity.x = -50.0;
        sim.step(idle(), ContactFlags::grounded());
        assert!(!sim.controller.facing_right());
    }
}
