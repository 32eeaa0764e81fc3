#![forbid(unsafe_code)]

//! Deterministic replay of gesture traces.
//!
//! Each frame of a [`TraceFile`] is fed through a fresh [`GestureTracker`]
//! built from the trace header. Every output is folded into a BLAKE3 digest
//! over the exact bit patterns of the signals, so two replays agree only if
//! they are bit-identical.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use orbitcam_core::{GestureOutput, GestureSettings, GestureTracker};
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::determinism::DeterminismFixture;
use crate::error::{HarnessError, Result};
use crate::synth::DEFAULT_SEED;
use crate::trace::{TraceFile, TraceReader};

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Trace file (`.jsonl` or `.jsonl.gz`).
    pub trace: PathBuf,

    /// Settings file (TOML or JSON) overriding the trace header.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Include per-frame outputs in the JSON report.
    #[arg(long = "per-frame", requires = "json")]
    pub per_frame: bool,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// Trace file (`.jsonl` or `.jsonl.gz`).
    pub trace: PathBuf,

    /// Expected hex digest. Without it, the trace is replayed `--runs` times
    /// and the digests must agree.
    #[arg(long)]
    pub expect: Option<String>,

    #[arg(long, default_value_t = 2)]
    pub runs: usize,
}

/// One frame's resolved output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOutcome {
    pub frame: u64,
    pub output: GestureOutput,
}

/// Result of replaying a trace.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub session_name: String,
    pub frames: u64,
    pub events: u64,
    /// Hex BLAKE3 digest of every frame output.
    pub digest: String,
    /// Frames won by each gesture, keyed by gesture name.
    pub gesture_frames: BTreeMap<&'static str, u64>,
    pub outcomes: Vec<FrameOutcome>,
}

impl ReplayReport {
    /// Output of the last frame, if any.
    #[must_use]
    pub fn final_output(&self) -> Option<&GestureOutput> {
        self.outcomes.last().map(|o| &o.output)
    }
}

fn hash_outcome(hasher: &mut blake3::Hasher, frame: u64, output: &GestureOutput) {
    hasher.update(&frame.to_le_bytes());
    hasher.update(&output.zoom_fraction.to_bits().to_le_bytes());
    hasher.update(&output.rotation_angle_degrees.to_bits().to_le_bytes());
    for axis in output.camera_movement.to_array() {
        hasher.update(&axis.to_bits().to_le_bytes());
    }
    hasher.update(&[u8::from(output.is_zooming), output.gesture as u8]);
}

/// Replay `trace` and fingerprint its outputs.
///
/// `settings` overrides the settings recorded in the header.
pub fn replay_trace(trace: &TraceFile, settings: Option<GestureSettings>) -> Result<ReplayReport> {
    let header = trace.validate()?;
    let settings = settings.unwrap_or_else(|| header.settings.clone());
    let mut tracker = GestureTracker::try_new(settings)?;
    let scene = &header.scene;

    let _span = info_span!("replay", session = %header.session_name).entered();

    let mut hasher = blake3::Hasher::new();
    let mut outcomes = Vec::new();
    let mut gesture_frames = BTreeMap::new();
    let mut events = 0u64;

    for frame in trace.frames() {
        tracker.set_navigating(frame.navigating);
        tracker.set_true_north_facing(frame.true_north);
        for event in frame.events()? {
            tracker.append_event(event);
            events += 1;
        }
        tracker.append_scroll_delta(frame.scroll_delta());

        let output = tracker.resolve(scene, frame.time());
        hash_outcome(&mut hasher, frame.frame, &output);
        *gesture_frames.entry(output.gesture.name()).or_insert(0) += 1;
        outcomes.push(FrameOutcome {
            frame: frame.frame,
            output,
        });
    }

    let digest = hasher.finalize().to_hex().to_string();
    debug!(frames = outcomes.len(), %digest, "replay.complete");

    Ok(ReplayReport {
        session_name: header.session_name.clone(),
        frames: outcomes.len() as u64,
        events,
        digest,
        gesture_frames,
        outcomes,
    })
}

/// Replay `runs` times and require identical digests.
///
/// Returns the agreed digest.
pub fn verify_determinism(trace: &TraceFile, runs: usize) -> Result<String> {
    if runs == 0 {
        return Err(HarnessError::invalid("runs must be at least 1"));
    }
    let expected = replay_trace(trace, None)?.digest;
    for _ in 1..runs {
        let actual = replay_trace(trace, None)?.digest;
        if actual != expected {
            return Err(HarnessError::ChecksumMismatch { expected, actual });
        }
    }
    Ok(expected)
}

/// Replay once and compare against a known digest.
pub fn verify_digest(trace: &TraceFile, expected: &str) -> Result<ReplayReport> {
    let report = replay_trace(trace, None)?;
    if !report.digest.eq_ignore_ascii_case(expected.trim()) {
        return Err(HarnessError::ChecksumMismatch {
            expected: expected.trim().to_string(),
            actual: report.digest,
        });
    }
    Ok(report)
}

pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let trace = TraceReader::open(&args.trace)?;
    let seed = trace.validate()?.seed.unwrap_or(DEFAULT_SEED);
    debug!(env = ?DeterminismFixture::new("replay", seed).env_snapshot(), "replay fixture");
    let settings = args
        .settings
        .as_ref()
        .map(GestureSettings::from_file)
        .transpose()?;
    let mut report = replay_trace(&trace, settings)?;
    info!(
        trace = %args.trace.display(),
        frames = report.frames,
        digest = %report.digest,
        "replay finished"
    );

    if args.json {
        if !args.per_frame {
            report.outcomes.clear();
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("session  {}", report.session_name);
    println!("frames   {} ({} events)", report.frames, report.events);
    for (gesture, count) in &report.gesture_frames {
        println!("  {gesture:<16} {count}");
    }
    if let Some(last) = report.final_output() {
        let m = last.camera_movement;
        println!(
            "final    zoom={:.4} rotation={:.3} movement=({:.3}, {:.3}, {:.3})",
            last.zoom_fraction, last.rotation_angle_degrees, m.x, m.y, m.z
        );
    }
    println!("digest   {}", report.digest);
    Ok(())
}

pub fn run_verify(args: VerifyArgs) -> Result<()> {
    let trace = TraceReader::open(&args.trace)?;
    let digest = match args.expect.as_deref() {
        Some(expected) => verify_digest(&trace, expected)?.digest,
        None => verify_determinism(&trace, args.runs)?,
    };
    println!("ok {digest}");
    Ok(())
}
