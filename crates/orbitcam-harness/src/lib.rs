#![forbid(unsafe_code)]

//! Trace tooling for `orbitcam-core`.
//!
//! # Role in orbitcam
//! `orbitcam-harness` pins gesture behavior down with recorded input. It
//! writes and reads JSONL gesture traces, replays them through a
//! [`GestureTracker`](orbitcam_core::GestureTracker), and fingerprints the
//! outputs with BLAKE3 so regressions show up as digest changes.
//!
//! # Primary responsibilities
//! - **Traces**: header/frame/summary JSONL, plain or gzip.
//! - **Replay**: per-frame outputs, gesture histogram, digest.
//! - **Synthesis**: seeded scripts for every gesture plus a random storm.
//! - **CLI**: `synth`, `replay`, `verify`, `list-scenarios`.

pub mod cli;
pub mod determinism;
pub mod error;
pub mod replay;
pub mod synth;
pub mod trace;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{HarnessError, Result};
pub use replay::{ReplayReport, replay_trace, verify_determinism, verify_digest};
pub use synth::{Scenario, generate};
pub use trace::{TraceFile, TraceFrame, TraceHeader, TraceReader, TraceWriter};
