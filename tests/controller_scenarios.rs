//! End-to-end scenarios: the controller driven through `GameWorld` with the
//! rapier world, contact materials and collision bus in the loop.

use approx::assert_relative_eq;
use glam::Vec3;
use hecs::World;

use hopbot::config::ControllerConfig;
use hopbot::controller::{AnimationClip, EffectKind, MAX_PENDING_EVENTS};
use hopbot::engine::input::MovementIntent;
use hopbot::engine::time::{Clock, ManualClock};
use hopbot::scene::prefabs::{spawn_ground, spawn_robot, spawn_wall};
use hopbot::{
    ControllerEvent, GameConfig, GameWorld, PhysicsBackend, PhysicsWorld, RigidBodyState,
    TickReport,
};

const DT: f32 = 1.0 / 60.0;

struct Sim {
    game: GameWorld,
    clock: ManualClock,
    events: Vec<ControllerEvent>,
}

impl Sim {
    fn new(game: GameWorld) -> Self {
        Self {
            game,
            clock: ManualClock::new(0),
            events: Vec::new(),
        }
    }

    fn course() -> Self {
        Self::new(GameWorld::new(GameConfig::default()))
    }

    fn step(&mut self, intent: MovementIntent) -> TickReport {
        self.clock.advance_secs(DT);
        let report = self.game.tick(DT, self.clock.now_ms(), &intent);
        self.events.extend(self.game.drain_events());
        report
    }

    fn run(&mut self, frames: usize, intent: MovementIntent) {
        for _ in 0..frames {
            self.step(intent);
        }
    }

    fn body(&self) -> RigidBodyState {
        let handle = self.game.controller().body();
        self.game.physics().read_body(handle).unwrap()
    }

    fn set_body(&mut self, state: RigidBodyState) {
        let handle = self.game.controller().body();
        self.game.physics_mut().write_body(handle, &state);
    }

    fn saw(&self, event: ControllerEvent) -> bool {
        self.events.contains(&event)
    }
}

fn idle() -> MovementIntent {
    MovementIntent::default()
}

fn forward() -> MovementIntent {
    MovementIntent {
        forward: true,
        ..Default::default()
    }
}

fn jump() -> MovementIntent {
    MovementIntent {
        jump: true,
        ..Default::default()
    }
}

#[test]
fn reset_then_idle_tick_only_falls() {
    let mut sim = Sim::course();
    assert_eq!(sim.body().position, Vec3::Y);

    let report = sim.step(idle());
    assert_eq!(report.substeps, 1);
    assert_eq!(report.contacts, 0);

    let v = sim.body().linear_velocity;
    assert_eq!(v.x, 0.0);
    assert_eq!(v.z, 0.0);
    // One step of gravity, slightly damped.
    assert!(v.y < -0.19 && v.y > -0.2 - 1e-6, "vy = {}", v.y);
    assert_eq!(sim.game.controller().bonus(), 0.0);
}

#[test]
fn robot_settles_and_reports_ground() {
    let mut sim = Sim::course();
    sim.run(90, idle());
    assert!(sim.game.controller().on_ground());
    let body = sim.body();
    assert_relative_eq!(body.position.y, 0.4, epsilon = 0.02);
    assert!(body.linear_velocity.length() < 0.05);
    assert_eq!(sim.game.controller().animation(), AnimationClip::Idle);
}

#[test]
fn grounded_jump_launches_and_leaves_ground() {
    let mut sim = Sim::course();
    sim.run(90, idle());
    assert!(sim.game.controller().on_ground());

    sim.step(jump());
    let ctl = sim.game.controller();
    assert_relative_eq!(ctl.bonus(), 1.6);
    assert_eq!(ctl.animation(), AnimationClip::Jump);
    assert!(sim.body().linear_velocity.y > 4.5);
    assert!(sim.saw(ControllerEvent::Jumped {
        air_hop: false,
        bonus: 1.6
    }));

    sim.step(jump());
    assert!(!sim.game.controller().on_ground());
    // Holding jump does not fire again.
    assert_relative_eq!(sim.game.controller().bonus(), 1.6);
}

#[test]
fn repeated_hops_build_bonus_up_to_cap() {
    let mut sim = Sim::course();
    sim.run(90, idle());

    let mut pressed_last = false;
    for _ in 0..900 {
        let press = sim.game.controller().on_ground() && !pressed_last;
        sim.step(if press { jump() } else { idle() });
        pressed_last = press;
    }

    let bonuses: Vec<f32> = sim
        .events
        .iter()
        .filter_map(|e| match e {
            ControllerEvent::Jumped { air_hop: false, bonus } => Some(*bonus),
            _ => None,
        })
        .collect();
    assert!(bonuses.len() >= 8, "only {} jumps", bonuses.len());
    for pair in bonuses.windows(2).take(4) {
        assert!(pair[1] > pair[0], "{bonuses:?}");
    }
    assert!(bonuses.iter().all(|&b| b <= 10.0));
    assert!(sim.game.controller().bonus() <= 10.0);
}

#[test]
fn air_hop_fires_mid_flight_when_moving() {
    let mut sim = Sim::course();
    sim.run(60, forward());
    assert!(sim.game.controller().on_ground());

    sim.step(MovementIntent {
        jump: true,
        ..forward()
    });
    sim.run(24, forward());
    assert!(!sim.game.controller().on_ground());
    sim.step(MovementIntent {
        jump: true,
        ..forward()
    });

    let hop = sim.events.iter().find_map(|e| match e {
        ControllerEvent::Jumped {
            air_hop: true,
            bonus,
        } => Some(*bonus),
        _ => None,
    });
    assert_relative_eq!(hop.unwrap(), 1.6 + 1.15, epsilon = 1e-5);
}

#[test]
fn horizontal_speed_never_exceeds_scaled_cap() {
    let mut sim = Sim::course();
    for _ in 0..180 {
        sim.step(forward());
        let cap = 6.8 * sim.game.controller().status().movement_multiplier();
        let speed = sim.body().horizontal_speed();
        assert!(speed <= cap + 1e-4, "speed {speed} over cap {cap}");
    }
}

#[test]
fn configured_speed_cap_is_respected() {
    let config = GameConfig::from_toml_str("[controller.movement]\nmax_speed = 3.0\n").unwrap();
    let mut sim = Sim::new(GameWorld::new(config));
    let mut top = 0.0f32;
    for _ in 0..90 {
        sim.step(forward());
        top = top.max(sim.body().horizontal_speed());
    }
    assert!(top <= 3.0 + 1e-4);
    assert!(top > 2.5);
}

#[test]
fn running_into_wall_stuns_then_recovers() {
    let mut sim = Sim::course();
    let mut frames = 0;
    while !sim.game.controller().status().is_stunned() {
        sim.step(forward());
        frames += 1;
        assert!(frames < 300, "never reached the wall");
    }
    assert!(sim.saw(ControllerEvent::EffectVisualChanged {
        kind: EffectKind::Stun,
        active: true
    }));
    assert!(!sim.game.controller().status().is_slowed());
    // Bounced back off the wall.
    assert!(sim.body().linear_velocity.z < 0.0);

    sim.run(90, idle());
    assert!(!sim.game.controller().status().is_stunned());
    assert!(sim.saw(ControllerEvent::EffectVisualChanged {
        kind: EffectKind::Stun,
        active: false
    }));
}

#[test]
fn moderate_wall_hit_slows_without_stun() {
    let config = GameConfig::default();
    let mut world = World::new();
    let mut physics = PhysicsWorld::new(&config.physics);
    spawn_ground(&mut physics);
    spawn_wall(&mut world, &mut physics, Vec3::new(0.0, 1.0, 1.5), Vec3::new(2.0, 1.0, 0.5));
    let robot = spawn_robot(&mut world, &mut physics, &config.controller.body, Vec3::Y);
    let mut sim = Sim::new(GameWorld::with_world(world, physics, robot, config));
    sim.run(60, idle());

    let mut body = sim.body();
    body.linear_velocity = Vec3::new(0.0, 0.0, 4.0);
    sim.set_body(body);
    sim.run(30, idle());

    let status = sim.game.controller().status();
    assert!(status.is_slowed());
    assert!(!status.is_stunned());
    assert_relative_eq!(status.movement_multiplier(), 0.25);
}

#[test]
fn opposite_intents_cancel_without_panicking() {
    let mut sim = Sim::course();
    sim.run(60, idle());
    let everything = MovementIntent {
        forward: true,
        backward: true,
        turn_left: true,
        turn_right: true,
        jump: false,
    };
    sim.run(60, everything);
    assert_eq!(sim.game.controller().heading(), 0.0);
    assert!(sim.body().horizontal_speed() < 1e-3);
}

#[test]
fn flying_out_of_bounds_respawns() {
    let mut sim = Sim::course();
    sim.run(30, idle());
    let mut body = sim.body();
    body.position = Vec3::new(2.0, 10.0, -1.0);
    body.linear_velocity = Vec3::new(0.0, 3.0, 0.0);
    sim.set_body(body);

    sim.step(idle());
    assert!(sim.saw(ControllerEvent::Respawned));
    let spawn = ControllerConfig::default().bounds.spawn;
    assert_eq!(sim.game.controller().position(), spawn);
    assert_eq!(sim.body().linear_velocity, Vec3::ZERO);
}

#[test]
fn walking_the_course_collects_pickups() {
    let mut sim = Sim::course();
    sim.run(110, forward());
    assert_eq!(sim.game.pickups_collected(), 3);
}

#[test]
fn standing_still_collects_nothing() {
    let mut sim = Sim::course();
    let mut body = sim.body();
    body.position = Vec3::new(0.0, 0.4, 3.0);
    sim.set_body(body);
    sim.run(60, idle());
    assert_eq!(sim.game.pickups_collected(), 0);
}

#[test]
fn reset_clears_gameplay_state() {
    let mut sim = Sim::course();
    sim.run(90, idle());
    sim.step(jump());
    sim.run(30, forward());

    sim.game.reset();
    let ctl = sim.game.controller();
    assert_eq!(ctl.bonus(), 0.0);
    assert_eq!(ctl.heading(), 0.0);
    assert!(!ctl.on_ground());
    assert_eq!(ctl.animation(), AnimationClip::Idle);
    assert_eq!(sim.body().position, Vec3::Y);
    assert_eq!(sim.game.bus().len(), 1);
}

#[test]
fn teardown_stops_contact_delivery() {
    let mut sim = Sim::course();
    sim.run(60, idle());
    assert!(sim.step(idle()).contacts > 0);

    sim.game.teardown();
    assert!(sim.game.bus().is_empty());
    assert_eq!(sim.step(idle()).contacts, 0);
}

#[test]
fn touchdown_counts_as_grounded_before_the_next_ray_sample() {
    let mut sim = Sim::course();
    // The ray samples at 16 ms and 266 ms both see the robot in the air. It
    // touches down near 316 ms; the next sample would not run until 516 ms.
    while sim.clock.now_ms() < 450 {
        sim.step(idle());
    }
    assert!(sim.game.controller().on_ground());
    assert!(sim.body().position.y < 0.45);
}

/// Forward acceleration over 0.2 s of driving, measured per physics step
/// that ran under the movement force.
fn forward_acceleration_at(fps: f32) -> f32 {
    let dt = 1.0 / fps;
    let mut game = GameWorld::new(GameConfig::default());
    let fixed_dt = game.config().physics.fixed_dt;
    let mut clock = ManualClock::new(0);

    for _ in 0..fps as usize {
        clock.advance_secs(dt);
        game.tick(dt, clock.now_ms(), &idle());
    }
    game.drain_events();

    // Steps of the first frame run before the controller has pushed.
    let mut driven_steps = 0;
    for frame in 0..(0.2 * fps).round() as usize {
        clock.advance_secs(dt);
        let report = game.tick(dt, clock.now_ms(), &forward());
        if frame > 0 {
            driven_steps += report.substeps;
        }
    }
    let body = game.physics().read_body(game.controller().body()).unwrap();
    body.horizontal_speed() / (driven_steps as f32 * fixed_dt)
}

#[test]
fn forward_acceleration_does_not_depend_on_frame_rate() {
    let at_60 = forward_acceleration_at(60.0);
    // 50 N on 2 kg, less ground friction.
    assert!(at_60 > 15.0 && at_60 < 25.5, "a = {at_60}");
    for fps in [30.0, 120.0] {
        let a = forward_acceleration_at(fps);
        assert_relative_eq!(a, at_60, max_relative = 0.05);
    }
}

#[test]
fn undrained_events_stay_bounded() {
    let mut game = GameWorld::new(GameConfig::default());
    let mut clock = ManualClock::new(0);
    let body = game.controller().body();
    for _ in 0..MAX_PENDING_EVENTS + 50 {
        let mut state = game.physics().read_body(body).unwrap();
        state.position.y = 20.0;
        game.physics_mut().write_body(body, &state);
        clock.advance_secs(DT);
        game.tick(DT, clock.now_ms(), &idle());
    }
    let events = game.drain_events();
    assert_eq!(events.len(), MAX_PENDING_EVENTS);
    assert!(events.iter().all(|e| *e == ControllerEvent::Respawned));
}
