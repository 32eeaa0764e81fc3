#![forbid(unsafe_code)]

//! Tap, tap, drag zoom.
//!
//! A press and release followed by a second press within
//! [`GestureSettings::double_tap_max_time_seconds`] turns the second pointer
//! into a vertical zoom slider for as long as it stays down.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──Began──▶ AwaitingFirstRelease ──release──▶ AwaitingSecondPress
//!    ▲                   │ timeout                        │ Began     │ timeout
//!    │◀──────────────────┘                                ▼           │
//!    │◀───────────── no Held/Began for pointer ──────── Dragging      │
//!    │◀───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The timeout is measured from the first press and only applies while the
//! second press is still outstanding. Once dragging, the gesture lasts until
//! the second pointer stops reporting.
//!
//! Events the recognizer consumes (the second press and its drag updates) are
//! claimed on the batch so the pan/orbit resolver ignores them.

use glam::Vec2;

use crate::event::{FrameBatch, PointerId, PointerPhase, SourceId};
use crate::geometry::clamp01;
use crate::scene::UiOcclusion;
use crate::settings::GestureSettings;

/// Recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoubleTapPhase {
    /// No candidate tap.
    #[default]
    Idle,
    /// First pointer pressed, waiting for it to lift.
    AwaitingFirstRelease,
    /// First tap complete, waiting for the second press.
    AwaitingSecondPress,
    /// Second pointer down, vertical motion drives zoom.
    Dragging,
}

impl DoubleTapPhase {
    /// Short lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingFirstRelease => "awaiting_first_release",
            Self::AwaitingSecondPress => "awaiting_second_press",
            Self::Dragging => "dragging",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FirstTap {
    source: SourceId,
    time: f64,
}

/// Double-tap-drag zoom recognizer.
#[derive(Debug, Clone, Default)]
pub struct DoubleTapZoom {
    phase: DoubleTapPhase,
    first_tap: Option<FirstTap>,
    drag_pointer: Option<PointerId>,
    last_drag_position: Vec2,
}

impl DoubleTapZoom {
    /// Create an idle recognizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> DoubleTapPhase {
        self.phase
    }

    /// Drop any candidate and return to [`DoubleTapPhase::Idle`].
    pub fn reset(&mut self) {
        if self.phase != DoubleTapPhase::Idle {
            tracing::trace!(from = self.phase.name(), "double_tap.reset");
        }
        *self = Self::default();
    }

    /// Advance the recognizer by one frame.
    ///
    /// Returns `true` while the gesture owns the frame (second press captured
    /// or dragging). `zoom` is adjusted in place and always left in `[0, 1]`.
    pub fn update(
        &mut self,
        batch: &mut FrameBatch,
        ui: &impl UiOcclusion,
        now: f64,
        settings: &GestureSettings,
        zoom: &mut f32,
    ) -> bool {
        if self.timed_out(now, settings.double_tap_max_time_seconds) {
            tracing::debug!(from = self.phase.name(), now, "double_tap.timeout");
            self.reset();
            return false;
        }

        if self.phase == DoubleTapPhase::Idle {
            self.capture_first_tap(batch, ui);
            return false;
        }

        if self.phase == DoubleTapPhase::AwaitingFirstRelease {
            let Some(first) = self.first_tap else {
                self.reset();
                return false;
            };
            let released = batch
                .events()
                .iter()
                .any(|e| e.phase.is_release() && e.source == first.source);
            if !released {
                return false;
            }
            self.phase = DoubleTapPhase::AwaitingSecondPress;
            tracing::trace!(source = first.source.0, "double_tap.first_release");
        }

        match self.phase {
            DoubleTapPhase::AwaitingSecondPress => self.capture_second_tap(batch, ui),
            DoubleTapPhase::Dragging => self.drag(batch, settings.double_tap_zoom_speed, zoom),
            DoubleTapPhase::Idle | DoubleTapPhase::AwaitingFirstRelease => false,
        }
    }

    fn timed_out(&self, now: f64, max_time: f64) -> bool {
        let waiting = matches!(
            self.phase,
            DoubleTapPhase::AwaitingFirstRelease | DoubleTapPhase::AwaitingSecondPress
        );
        match self.first_tap {
            Some(first) if waiting => now - first.time > max_time,
            _ => false,
        }
    }

    fn capture_first_tap(&mut self, batch: &FrameBatch, ui: &impl UiOcclusion) {
        let Some(event) = batch
            .events()
            .iter()
            .find(|e| e.phase == PointerPhase::Began && !ui.is_over_ui(e.position))
        else {
            return;
        };
        self.first_tap = Some(FirstTap {
            source: event.source,
            time: event.time,
        });
        self.phase = DoubleTapPhase::AwaitingFirstRelease;
        tracing::trace!(
            pointer = event.id.0,
            time = event.time,
            "double_tap.first_tap"
        );
    }

    fn capture_second_tap(&mut self, batch: &mut FrameBatch, ui: &impl UiOcclusion) -> bool {
        let Some(index) =
            batch.position(|e| e.phase == PointerPhase::Began && !ui.is_over_ui(e.position))
        else {
            return false;
        };
        let event = batch.events()[index];
        batch.claim(index);

        self.drag_pointer = Some(event.id);
        self.last_drag_position = event.position;
        self.phase = DoubleTapPhase::Dragging;
        tracing::debug!(
            pointer = event.id.0,
            x = event.position.x,
            y = event.position.y,
            "double_tap.drag_start"
        );
        true
    }

    fn drag(&mut self, batch: &mut FrameBatch, speed: f32, zoom: &mut f32) -> bool {
        let Some(pointer) = self.drag_pointer else {
            self.reset();
            return false;
        };
        let Some(index) = batch.position(|e| e.id == pointer && e.phase.is_active()) else {
            self.reset();
            return false;
        };
        let event = batch.events()[index];
        batch.claim(index);

        if event.phase == PointerPhase::Held {
            let dy = event.position.y - self.last_drag_position.y;
            *zoom = clamp01(*zoom - dy * speed);
            self.last_drag_position = event.position;
        }
        true
    }
}
