#![forbid(unsafe_code)]

//! Core: multi-pointer gesture disambiguation for map cameras.
//!
//! # Role in orbitcam
//! `orbitcam-core` turns raw per-frame pointer input (touches, mouse buttons,
//! wheel deltas) into three continuous camera control signals: a normalized
//! zoom fraction, an accumulated rotation angle, and a camera translation.
//! Converting those signals into an actual camera pose, and animating between
//! poses, is left to the host.
//!
//! # Primary responsibilities
//! - **Event model**: [`PointerEvent`] records collected into a per-frame
//!   [`FrameBatch`].
//! - **Resolvers**: pinch zoom and twist ([`pinch`]), tap-tap-drag zoom
//!   ([`double_tap`]), and single-pointer orbit/pan ([`swipe`]).
//! - **Orchestration**: [`GestureTracker`] runs the resolvers in priority
//!   order once per frame and owns every piece of mutable state.
//! - **Collaborators**: the [`SceneView`] and [`UiOcclusion`] traits describe
//!   what the tracker needs from the host. [`PerspectiveScene`] is a ready-made
//!   implementation.
//!
//! # How it fits in the system
//! `orbitcam-harness` records [`PointerEvent`] streams as traces, replays them
//! through a [`GestureTracker`] and fingerprints the outputs, so every
//! behavior here can be pinned by a deterministic replay.

pub mod double_tap;
pub mod event;
pub mod geometry;
pub mod output;
pub mod pinch;
pub mod scene;
pub mod settings;
pub mod swipe;
pub mod tracker;

pub use double_tap::{DoubleTapPhase, DoubleTapZoom};
pub use event::{
    FrameBatch, FrameTime, PhaseError, PointerEvent, PointerId, PointerPhase, SourceId,
};
pub use geometry::Ray;
pub use output::{CameraSignals, GestureOutput, ResolvedGesture};
pub use pinch::{PinchOutcome, PinchResolver, TrackedPointer};
pub use scene::{PerspectiveScene, SceneView, UiOcclusion, UiRegion};
pub use settings::{GestureSettings, SettingsError};
pub use swipe::{SwipeContext, SwipeMode, SwipeResolver};
pub use tracker::GestureTracker;

pub use glam;
