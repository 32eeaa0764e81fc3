#![forbid(unsafe_code)]

//! Per-frame pointer input.
//!
//! The host input layer produces one [`PointerEvent`] per pointer per frame and
//! appends it to the tracker's [`FrameBatch`]. Devices that report continuous
//! deltas (mouse wheels, trackpads) additionally accumulate a scroll vector on
//! the batch. The batch is cleared once the frame has been resolved, so no
//! resolver may keep indices or references into it across frames.
//!
//! # Design Notes
//!
//! - Positions are normalized viewport coordinates (`0..=1` on both axes,
//!   origin bottom-left). Pixel and DPI conversions belong to the host.
//! - Timestamps are unscaled seconds on the host clock, the same clock that
//!   drives [`FrameTime::now`].
//! - The phase set is closed. Decoding an unknown wire code is the only way to
//!   observe an invalid phase, and it surfaces as [`PhaseError`].

use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity of a pointer (finger, mouse cursor) across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct PointerId(pub u32);

/// Identity of the device that produced an event.
///
/// A press and its release share a source even when the platform recycles
/// pointer ids between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct SourceId(pub u32);

/// Lifecycle phase of a pointer within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointerPhase {
    /// Pointer went down this frame.
    Began,
    /// Pointer is still down (moved or stationary).
    Held,
    /// Pointer was released.
    Ended,
    /// Pointer was taken away by the platform (palm rejection, focus loss).
    Canceled,
    /// Pointer is over the surface without being pressed.
    Hovered,
}

impl PointerPhase {
    /// All phases in wire-code order.
    pub const ALL: [PointerPhase; 5] = [
        PointerPhase::Began,
        PointerPhase::Held,
        PointerPhase::Ended,
        PointerPhase::Canceled,
        PointerPhase::Hovered,
    ];

    /// `Began` or `Held`.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Held)
    }

    /// `Ended` or `Canceled`.
    #[inline]
    #[must_use]
    pub const fn is_release(self) -> bool {
        matches!(self, Self::Ended | Self::Canceled)
    }

    /// Stable wire code used by traces.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Began => 0,
            Self::Held => 1,
            Self::Ended => 2,
            Self::Canceled => 3,
            Self::Hovered => 4,
        }
    }

    /// Short lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Began => "began",
            Self::Held => "held",
            Self::Ended => "ended",
            Self::Canceled => "canceled",
            Self::Hovered => "hovered",
        }
    }
}

/// A wire code outside the closed phase set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown pointer phase code {0}")]
pub struct PhaseError(pub u8);

impl TryFrom<u8> for PointerPhase {
    type Error = PhaseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(PhaseError(code))
    }
}

/// One pointer's state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointerEvent {
    /// Pointer identity.
    pub id: PointerId,
    /// Producing device.
    pub source: SourceId,
    /// Phase this frame.
    pub phase: PointerPhase,
    /// Normalized viewport position.
    pub position: Vec2,
    /// Host timestamp in seconds.
    pub time: f64,
    /// Wheel/trackpad delta carried by this event, if any.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub scroll_delta: Option<Vec2>,
}

impl PointerEvent {
    /// Create an event whose source id equals its pointer id.
    #[must_use]
    pub fn new(id: u32, phase: PointerPhase, position: Vec2, time: f64) -> Self {
        Self {
            id: PointerId(id),
            source: SourceId(id),
            phase,
            position,
            time,
            scroll_delta: None,
        }
    }

    /// Shorthand for a `Began` event.
    #[must_use]
    pub fn began(id: u32, position: Vec2, time: f64) -> Self {
        Self::new(id, PointerPhase::Began, position, time)
    }

    /// Shorthand for a `Held` event.
    #[must_use]
    pub fn held(id: u32, position: Vec2, time: f64) -> Self {
        Self::new(id, PointerPhase::Held, position, time)
    }

    /// Shorthand for an `Ended` event.
    #[must_use]
    pub fn ended(id: u32, position: Vec2, time: f64) -> Self {
        Self::new(id, PointerPhase::Ended, position, time)
    }

    /// Shorthand for a `Canceled` event.
    #[must_use]
    pub fn canceled(id: u32, position: Vec2, time: f64) -> Self {
        Self::new(id, PointerPhase::Canceled, position, time)
    }

    /// Shorthand for a `Hovered` event.
    #[must_use]
    pub fn hovered(id: u32, position: Vec2, time: f64) -> Self {
        Self::new(id, PointerPhase::Hovered, position, time)
    }

    /// Override the source id.
    #[must_use]
    pub const fn with_source(mut self, source: u32) -> Self {
        self.source = SourceId(source);
        self
    }

    /// Attach a scroll delta.
    #[must_use]
    pub const fn with_scroll(mut self, delta: Vec2) -> Self {
        self.scroll_delta = Some(delta);
        self
    }
}

/// Host clock for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameTime {
    /// Monotonic frame counter. Consecutive frames differ by exactly one.
    pub frame: u64,
    /// Unscaled seconds since an arbitrary epoch.
    pub now: f64,
    /// Unscaled seconds since the previous frame.
    pub delta: f32,
}

impl FrameTime {
    /// Create a frame timestamp.
    #[must_use]
    pub const fn new(frame: u64, now: f64, delta: f32) -> Self {
        Self { frame, now, delta }
    }

    /// The frame that immediately follows this one after `delta` seconds.
    #[must_use]
    pub fn next(self, delta: f32) -> Self {
        Self {
            frame: self.frame.wrapping_add(1),
            now: self.now + f64::from(delta),
            delta,
        }
    }
}

/// Events collected for the current frame.
///
/// Resolvers may *claim* an event so lower-priority resolvers skip it. Claims
/// live only as long as the frame.
#[derive(Debug, Clone, Default)]
pub struct FrameBatch {
    events: Vec<PointerEvent>,
    claimed: Vec<bool>,
    scroll_delta: Vec2,
}

impl FrameBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(4),
            claimed: Vec::with_capacity(4),
            scroll_delta: Vec2::ZERO,
        }
    }

    /// Append an event. Any scroll delta it carries is accumulated.
    pub fn push(&mut self, event: PointerEvent) {
        if let Some(delta) = event.scroll_delta {
            self.scroll_delta += delta;
        }
        self.events.push(event);
        self.claimed.push(false);
    }

    /// Accumulate a scroll delta reported outside of any pointer event.
    pub fn add_scroll_delta(&mut self, delta: Vec2) {
        self.scroll_delta += delta;
    }

    /// Scroll delta accumulated this frame.
    #[inline]
    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Number of events in the batch.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events were appended this frame.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in arrival order.
    #[inline]
    pub fn events(&self) -> &[PointerEvent] {
        &self.events
    }

    /// Iterate `(index, event)` pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PointerEvent)> {
        self.events.iter().enumerate()
    }

    /// Events not yet claimed by a resolver.
    pub fn unclaimed(&self) -> impl Iterator<Item = (usize, &PointerEvent)> {
        self.events
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.claimed[*idx])
    }

    /// Mark an event as consumed. Out-of-range indices are ignored.
    pub fn claim(&mut self, index: usize) {
        if let Some(slot) = self.claimed.get_mut(index) {
            *slot = true;
        }
    }

    /// Whether the event at `index` has been claimed.
    #[must_use]
    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed.get(index).copied().unwrap_or(false)
    }

    /// Index of the first event matching `pred`.
    pub fn position(&self, mut pred: impl FnMut(&PointerEvent) -> bool) -> Option<usize> {
        self.events.iter().position(|e| pred(e))
    }

    /// Drop all events, claims, and the scroll delta.
    pub fn clear(&mut self) {
        self.events.clear();
        self.claimed.clear();
        self.scroll_delta = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_codes_round_trip() {
        for phase in PointerPhase::ALL {
            assert_eq!(PointerPhase::try_from(phase.code()), Ok(phase));
        }
    }

    #[test]
    fn unknown_phase_code_is_rejected() {
        assert_eq!(PointerPhase::try_from(5), Err(PhaseError(5)));
        assert_eq!(
            PhaseError(200).to_string(),
            "unknown pointer phase code 200"
        );
    }

    #[test]
    fn phase_predicates() {
        assert!(PointerPhase::Began.is_active());
        assert!(PointerPhase::Held.is_active());
        assert!(!PointerPhase::Hovered.is_active());
        assert!(PointerPhase::Ended.is_release());
        assert!(PointerPhase::Canceled.is_release());
        assert!(!PointerPhase::Held.is_release());
    }

    #[test]
    fn batch_accumulates_scroll_from_events_and_host() {
        let mut batch = FrameBatch::new();
        batch.push(PointerEvent::hovered(0, Vec2::splat(0.5), 0.0).with_scroll(Vec2::new(0.0, 1.0)));
        batch.add_scroll_delta(Vec2::new(0.0, 2.0));
        assert_eq!(batch.scroll_delta(), Vec2::new(0.0, 3.0));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn claims_hide_events_until_clear() {
        let mut batch = FrameBatch::new();
        batch.push(PointerEvent::began(1, Vec2::ZERO, 0.0));
        batch.push(PointerEvent::began(2, Vec2::ONE, 0.0));
        batch.claim(0);
        batch.claim(99);

        assert!(batch.is_claimed(0));
        assert!(!batch.is_claimed(1));
        let ids: Vec<_> = batch.unclaimed().map(|(_, e)| e.id).collect();
        assert_eq!(ids, vec![PointerId(2)]);

        batch.clear();
        assert!(batch.is_empty());
        assert!(!batch.is_claimed(0));
        assert_eq!(batch.scroll_delta(), Vec2::ZERO);
    }

    #[test]
    fn frame_time_next_advances_counter_and_clock() {
        let t = FrameTime::new(7, 1.0, 0.016);
        let n = t.next(0.5);
        assert_eq!(n.frame, 8);
        assert!((n.now - 1.5).abs() < 1e-9);
        assert_eq!(n.delta, 0.5);
    }
}
