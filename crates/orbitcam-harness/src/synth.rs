#![forbid(unsafe_code)]

//! Synthetic gesture generator.
//!
//! Produces deterministic pointer scripts for each gesture the tracker
//! recognizes, plus a random [`Scenario::Storm`] for fault injection. The same
//! scenario, seed, and frame count always yield the same frames.
//!
//! | Scenario | Script |
//! |----------|--------|
//! | `tap` | press, hold briefly, release |
//! | `double-tap-drag` | tap, then press and drag vertically |
//! | `pinch` | two pointers closing or spreading |
//! | `twist` | two pointers rotating about their midpoint |
//! | `drag` | one pointer dragging (pan) |
//! | `orbit` | one pointer dragging in navigation mode |
//! | `wheel` | hovering cursor with scroll input |
//! | `storm` | random phases, ids, positions, and scroll |

use std::f32::consts::TAU;
use std::path::PathBuf;

use clap::Args;
use orbitcam_core::glam::Vec2;
use orbitcam_core::{GestureSettings, PerspectiveScene, PointerEvent, PointerPhase, UiRegion};
use tracing::{debug, info};

use crate::determinism::{DeterminismFixture, fixture_frame_hz};
use crate::error::Result;
use crate::trace::{TraceFrame, TraceHeader, TracePointer, write_trace_file};

/// Seed used when neither `--seed` nor `ORBITCAM_SEED` is given.
pub const DEFAULT_SEED: u64 = 0x0b17_ca3e;

/// Height of the UI strip in storm scenes.
pub const STORM_TOOLBAR_HEIGHT: f32 = 0.08;

/// Shortest trace any scenario produces.
pub const MIN_FRAMES: usize = 8;

/// Gesture script to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Scenario {
    Tap,
    DoubleTapDrag,
    Pinch,
    Twist,
    Drag,
    Orbit,
    Wheel,
    Storm,
}

impl Scenario {
    pub const ALL: [Scenario; 8] = [
        Self::Tap,
        Self::DoubleTapDrag,
        Self::Pinch,
        Self::Twist,
        Self::Drag,
        Self::Orbit,
        Self::Wheel,
        Self::Storm,
    ];

    /// Name used in session names and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::DoubleTapDrag => "double_tap_drag",
            Self::Pinch => "pinch",
            Self::Twist => "twist",
            Self::Drag => "drag",
            Self::Orbit => "orbit",
            Self::Wheel => "wheel",
            Self::Storm => "storm",
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SynthArgs {
    #[arg(value_enum)]
    pub scenario: Scenario,

    /// Output path. A `.gz` extension implies `--gzip`.
    #[arg(long, short)]
    pub out: PathBuf,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 120)]
    pub frames: usize,

    /// Gzip-compress the trace.
    #[arg(long)]
    pub gzip: bool,

    /// Settings file (TOML or JSON) recorded in the trace header.
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

pub fn run_synth(args: SynthArgs) -> Result<()> {
    let fixture = match args.seed {
        Some(seed) => DeterminismFixture::new_with("synth", seed, true, fixture_frame_hz()),
        None => DeterminismFixture::new("synth", DEFAULT_SEED),
    };
    debug!(env = ?fixture.env_snapshot(), "synth fixture");
    let gzip = args.gzip || args.out.extension().is_some_and(|ext| ext == "gz");

    let mut header = header_for(args.scenario, &fixture);
    if let Some(path) = &args.settings {
        header = header.with_settings(GestureSettings::from_file(path)?);
    }
    let frames = generate(args.scenario, &fixture, args.frames);
    write_trace_file(&args.out, &header, &frames, gzip)?;

    info!(
        scenario = args.scenario.name(),
        seed = fixture.seed(),
        frames = frames.len(),
        gzip,
        "synthetic trace written"
    );
    println!(
        "wrote {} frames of {} (seed {}) to {}",
        frames.len(),
        args.scenario.name(),
        fixture.seed(),
        args.out.display()
    );
    Ok(())
}

// ============================================================================
// Generation
// ============================================================================

/// Simple deterministic PRNG (xorshift64) for reproducible scripts.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform integer in `[0, n)`; zero when `n == 0`.
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.next_u64() % n
    }

    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// +1 or -1.
    pub fn sign(&mut self) -> f32 {
        if self.chance(0.5) { 1.0 } else { -1.0 }
    }

    fn point(&mut self, margin: f32) -> Vec2 {
        Vec2::new(self.range(margin, 1.0 - margin), self.range(margin, 1.0 - margin))
    }
}

/// Frames under construction, clocked by the fixture.
struct Timeline<'a> {
    fixture: &'a DeterminismFixture,
    frames: Vec<TraceFrame>,
}

impl<'a> Timeline<'a> {
    fn new(fixture: &'a DeterminismFixture, capacity: usize) -> Self {
        Self {
            fixture,
            frames: Vec::with_capacity(capacity),
        }
    }

    fn step(&mut self, pointers: &[(u32, PointerPhase, Vec2)]) -> &mut TraceFrame {
        let time = self.fixture.frame_time(self.frames.len() as u64);
        let mut frame = TraceFrame::at(time);
        for &(id, phase, position) in pointers {
            let event = PointerEvent::new(id, phase, position, time.now);
            frame.pointers.push(TracePointer::from_event(&event));
        }
        let index = self.frames.len();
        self.frames.push(frame);
        &mut self.frames[index]
    }

    fn pad_to(&mut self, total: usize) {
        while self.frames.len() < total {
            self.step(&[]);
        }
    }

    fn remaining(&self, total: usize, reserved: usize) -> usize {
        total.saturating_sub(self.frames.len() + reserved).max(1)
    }
}

/// Header describing a synthetic session.
pub fn header_for(scenario: Scenario, fixture: &DeterminismFixture) -> TraceHeader {
    TraceHeader::new(format!("{}_{}", scenario.name(), fixture.run_id()))
        .with_seed(fixture.seed())
        .with_scene(scene_for(scenario))
}

/// Storm pointers land on a toolbar strip along the bottom edge now and then.
fn scene_for(scenario: Scenario) -> PerspectiveScene {
    let scene = PerspectiveScene::default();
    match scenario {
        Scenario::Storm => {
            scene.with_ui_region(UiRegion::new(Vec2::ZERO, Vec2::new(1.0, STORM_TOOLBAR_HEIGHT)))
        }
        _ => scene,
    }
}

/// Generate `frames` frames (at least [`MIN_FRAMES`]) of `scenario`.
pub fn generate(scenario: Scenario, fixture: &DeterminismFixture, frames: usize) -> Vec<TraceFrame> {
    let total = frames.max(MIN_FRAMES);
    let mut rng = Rng::new(fixture.seed() ^ (scenario as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    let mut timeline = Timeline::new(fixture, total);

    match scenario {
        Scenario::Tap => tap(&mut timeline, &mut rng),
        Scenario::DoubleTapDrag => double_tap_drag(&mut timeline, &mut rng, total),
        Scenario::Pinch => two_finger(&mut timeline, &mut rng, total, false),
        Scenario::Twist => two_finger(&mut timeline, &mut rng, total, true),
        Scenario::Drag => drag(&mut timeline, &mut rng, total, false),
        Scenario::Orbit => drag(&mut timeline, &mut rng, total, true),
        Scenario::Wheel => wheel(&mut timeline, &mut rng, total),
        Scenario::Storm => storm(&mut timeline, &mut rng, total),
    }

    timeline.pad_to(total);
    timeline.frames.truncate(total);
    timeline.frames
}

fn tap(timeline: &mut Timeline<'_>, rng: &mut Rng) {
    let p = rng.point(0.2);
    timeline.step(&[(1, PointerPhase::Began, p)]);
    timeline.step(&[(1, PointerPhase::Held, p)]);
    timeline.step(&[(1, PointerPhase::Ended, p)]);
}

fn double_tap_drag(timeline: &mut Timeline<'_>, rng: &mut Rng, total: usize) {
    let p = rng.point(0.3);
    timeline.step(&[(1, PointerPhase::Began, p)]);
    timeline.step(&[(1, PointerPhase::Ended, p)]);
    timeline.step(&[]);
    timeline.step(&[(2, PointerPhase::Began, p)]);

    let steps = timeline.remaining(total, 1);
    let travel = rng.range(0.1, 0.25) * rng.sign();
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        timeline.step(&[(2, PointerPhase::Held, p + Vec2::new(0.0, travel * t))]);
    }
    timeline.step(&[(2, PointerPhase::Ended, p + Vec2::new(0.0, travel))]);
}

fn two_finger(timeline: &mut Timeline<'_>, rng: &mut Rng, total: usize, twist: bool) {
    let center = Vec2::new(rng.range(0.4, 0.6), rng.range(0.4, 0.6));
    let start_radius = rng.range(0.1, 0.2);
    let end_radius = if twist {
        start_radius
    } else if rng.chance(0.5) {
        start_radius * 0.4
    } else {
        start_radius * 1.8
    };
    let start_angle = rng.range(0.0, TAU);
    let sweep = if twist {
        rng.range(0.5, 1.5) * rng.sign()
    } else {
        0.0
    };

    let fingers = |radius: f32, angle: f32| {
        let offset = Vec2::from_angle(angle) * radius;
        (center - offset, center + offset)
    };

    let (a, b) = fingers(start_radius, start_angle);
    timeline.step(&[(1, PointerPhase::Began, a), (2, PointerPhase::Began, b)]);

    let steps = timeline.remaining(total, 1);
    let mut last = (a, b);
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let radius = start_radius + (end_radius - start_radius) * t;
        last = fingers(radius, start_angle + sweep * t);
        timeline.step(&[(1, PointerPhase::Held, last.0), (2, PointerPhase::Held, last.1)]);
    }
    timeline.step(&[(1, PointerPhase::Ended, last.0), (2, PointerPhase::Ended, last.1)]);
}

fn drag(timeline: &mut Timeline<'_>, rng: &mut Rng, total: usize, navigating: bool) {
    let start = rng.point(0.3);
    let heading = Vec2::from_angle(rng.range(0.0, TAU)) * rng.range(0.1, 0.3);

    timeline
        .step(&[(1, PointerPhase::Began, start)])
        .navigating = navigating;

    let steps = timeline.remaining(total, 1);
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        timeline
            .step(&[(1, PointerPhase::Held, start + heading * t)])
            .navigating = navigating;
    }
    timeline
        .step(&[(1, PointerPhase::Ended, start + heading)])
        .navigating = navigating;
}

fn wheel(timeline: &mut Timeline<'_>, rng: &mut Rng, total: usize) {
    let cursor = rng.point(0.2);
    let direction = rng.sign();
    for _ in 0..total {
        let notches = rng.range(0.5, 3.0) * direction;
        let frame = timeline.step(&[(0, PointerPhase::Hovered, cursor)]);
        frame.scroll = [0.0, notches];
    }
}

fn storm(timeline: &mut Timeline<'_>, rng: &mut Rng, total: usize) {
    let mut navigating = false;
    for _ in 0..total {
        if rng.chance(0.05) {
            navigating = !navigating;
        }
        let count = rng.below(4) as usize;
        let mut pointers = Vec::with_capacity(count);
        for _ in 0..count {
            let id = 1 + rng.below(4) as u32;
            let phase = PointerPhase::ALL[rng.below(PointerPhase::ALL.len() as u64) as usize];
            pointers.push((id, phase, rng.point(0.0)));
        }
        let scroll = if rng.chance(0.1) {
            rng.range(-3.0, 3.0)
        } else {
            0.0
        };
        let frame = timeline.step(&pointers);
        frame.navigating = navigating;
        frame.true_north = rng.chance(0.02);
        frame.scroll = [0.0, scroll];
    }
}
