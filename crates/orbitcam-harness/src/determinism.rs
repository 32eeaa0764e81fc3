#![forbid(unsafe_code)]

//! Deterministic fixtures for synthetic traces and replay runs.
//!
//! Centralizes seed selection, the synthetic frame clock, and environment
//! capture so generated traces hash the same on every machine.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use orbitcam_core::FrameTime;

/// Default synthetic frame rate.
pub const DEFAULT_FRAME_HZ: u32 = 60;

/// Shared deterministic fixture for a harness run.
#[derive(Debug, Clone)]
pub struct DeterminismFixture {
    seed: u64,
    deterministic: bool,
    frame_hz: u32,
    run_id: String,
}

impl DeterminismFixture {
    /// Create a fixture from the environment, falling back to `default_seed`.
    pub fn new(prefix: &str, default_seed: u64) -> Self {
        let deterministic = deterministic_mode();
        let seed = fixture_seed(default_seed);
        Self::new_with(prefix, seed, deterministic, fixture_frame_hz())
    }

    /// Create a fixture with explicit configuration (used by tests).
    pub fn new_with(prefix: &str, seed: u64, deterministic: bool, frame_hz: u32) -> Self {
        let run_id = if deterministic {
            format!("{prefix}_seed{seed}")
        } else {
            format!("{prefix}_{}_{}", std::process::id(), unix_secs())
        };
        Self {
            seed,
            deterministic,
            frame_hz: frame_hz.max(1),
            run_id,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// True when deterministic mode is enabled.
    pub fn deterministic(&self) -> bool {
        self.deterministic
    }

    /// Stable run identifier, used as the trace session name.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Seconds per synthetic frame.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.frame_hz as f32
    }

    /// Clock for synthetic frame `index` (1-based frame numbers).
    ///
    /// `now` is computed from the index rather than accumulated so long
    /// traces do not drift.
    pub fn frame_time(&self, index: u64) -> FrameTime {
        let frame = index + 1;
        let now = frame as f64 / f64::from(self.frame_hz);
        FrameTime::new(frame, now, self.frame_delta())
    }

    /// Environment fields for logging, in stable key order.
    pub fn env_snapshot(&self) -> BTreeMap<&'static str, String> {
        let mut fields = BTreeMap::new();
        fields.insert("seed", self.seed.to_string());
        fields.insert("deterministic", self.deterministic.to_string());
        fields.insert("frame_hz", self.frame_hz.to_string());
        fields.insert("run_id", self.run_id.clone());
        fields.insert("rust_log", std::env::var("RUST_LOG").unwrap_or_default());
        fields
    }
}

/// True when `ORBITCAM_DETERMINISTIC` is set to a truthy value.
pub fn deterministic_mode() -> bool {
    env_flag("ORBITCAM_DETERMINISTIC")
}

/// Choose a seed from the environment or use the provided default.
pub fn fixture_seed(default_seed: u64) -> u64 {
    env_u64("ORBITCAM_SEED").unwrap_or(default_seed)
}

/// Synthetic frame rate from `ORBITCAM_FRAME_HZ`.
pub fn fixture_frame_hz() -> u32 {
    env_u64("ORBITCAM_FRAME_HZ")
        .and_then(|hz| u32::try_from(hz).ok())
        .filter(|hz| *hz > 0)
        .unwrap_or(DEFAULT_FRAME_HZ)
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_flag(key: &str) -> bool {
    matches!(
        std::env::var(key).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    )
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
