use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use hopbot::controller::ControllerEvent;
use hopbot::engine::input::{InputState, KeyBindings};
use hopbot::engine::time::{Clock, FrameTimer, ManualClock};
use hopbot::{GameConfig, GameWorld};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Stand still at spawn.
    Idle,
    /// Walk forward through the pickups, then turn.
    Walk,
    /// Run forward tapping jump to build bunny-hop momentum.
    Bhop,
    /// Run flat out into the far wall.
    Wall,
}

#[derive(Parser)]
#[command(name = "hopbot", about = "Headless robot controller simulation")]
struct Args {
    /// TOML game config. Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 6.0)]
    seconds: f32,

    #[arg(long, value_enum, default_value_t = Scenario::Walk)]
    scenario: Scenario,

    /// Frame rate fed to the fixed-step accumulator.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Keys held at simulated time `t` seconds.
fn scripted_keys(scenario: Scenario, t: f32) -> &'static [&'static str] {
    match scenario {
        Scenario::Idle => &[],
        Scenario::Walk if t < 3.0 => &["w"],
        Scenario::Walk if t < 4.0 => &["w", "a"],
        Scenario::Walk => &["ArrowUp"],
        Scenario::Bhop => {
            // Tap jump for 100 ms every half second.
            if (t * 1000.0) as u64 % 500 < 100 {
                &["up", "space"]
            } else {
                &["up"]
            }
        }
        Scenario::Wall => &["up"],
    }
}

#[derive(Default)]
struct EventTally {
    jumps: u32,
    air_hops: u32,
    respawns: u32,
    effect_changes: u32,
    animation_cues: u32,
}

impl EventTally {
    fn record(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Jumped { air_hop: false, .. } => self.jumps += 1,
            ControllerEvent::Jumped { air_hop: true, .. } => self.air_hops += 1,
            ControllerEvent::Respawned => self.respawns += 1,
            ControllerEvent::EffectVisualChanged { kind, active } => {
                tracing::info!(?kind, active, "status effect visual");
                self.effect_changes += 1;
            }
            ControllerEvent::AnimationCue { .. } => self.animation_cues += 1,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &args.config {
        Some(path) => GameConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    anyhow::ensure!(args.fps > 0.0, "--fps must be positive");
    anyhow::ensure!(args.seconds >= 0.0, "--seconds must not be negative");

    let mut game = GameWorld::new(config);
    let bindings = KeyBindings::default();
    let mut input = InputState::default();
    let mut clock = ManualClock::new(0);
    let mut tally = EventTally::default();
    let mut timer = FrameTimer::new();

    let frame_dt = 1.0 / args.fps;
    let frames = (args.seconds * args.fps).round() as u64;
    tracing::info!(scenario = ?args.scenario, frames, "starting simulation");

    for frame in 0..frames {
        let t = frame as f32 * frame_dt;
        input.release_all();
        for key in scripted_keys(args.scenario, t) {
            input.press(key);
        }
        clock.advance_secs(frame_dt);

        let report = game.tick(frame_dt, clock.now_ms(), &input.intent(&bindings));
        for event in game.drain_events() {
            tally.record(&event);
        }
        if report.pickups_collected > 0 {
            tracing::info!(t, total = game.pickups_collected(), "pickup");
        }
    }
    timer.tick();

    let robot = game.controller();
    let pos = robot.position();
    tracing::info!(
        x = pos.x,
        y = pos.y,
        z = pos.z,
        heading = robot.heading(),
        on_ground = robot.on_ground(),
        bonus = robot.bonus(),
        stunned = robot.status().is_stunned(),
        slowed = robot.status().is_slowed(),
        animation = robot.animation().name(),
        "final state"
    );
    tracing::info!(
        pickups = game.pickups_collected(),
        jumps = tally.jumps,
        air_hops = tally.air_hops,
        respawns = tally.respawns,
        effect_changes = tally.effect_changes,
        animation_cues = tally.animation_cues,
        wall_ms = (timer.dt * 1000.0) as u64,
        "simulation finished"
    );

    game.teardown();
    Ok(())
}
