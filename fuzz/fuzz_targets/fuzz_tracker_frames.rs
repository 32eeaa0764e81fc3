#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use orbitcam_core::glam::Vec2;
use orbitcam_core::{
    FrameTime, GestureSettings, GestureTracker, PerspectiveScene, PointerEvent, PointerPhase,
    UiRegion,
};

#[derive(Debug, Arbitrary)]
struct FuzzPointer {
    id: u8,
    source: u8,
    phase: u8,
    x: i16,
    y: i16,
}

#[derive(Debug, Arbitrary)]
struct FuzzFrame {
    delta_ms: u8,
    scroll: i8,
    navigating: bool,
    true_north: bool,
    pointers: Vec<FuzzPointer>,
}

fn coord(raw: i16) -> f32 {
    // Slightly beyond the viewport on both sides.
    f32::from(raw) / f32::from(i16::MAX) * 0.75 + 0.5
}

fuzz_target!(|frames: Vec<FuzzFrame>| {
    let scene = PerspectiveScene::default()
        .with_ui_region(UiRegion::new(Vec2::new(0.0, 0.9), Vec2::new(1.0, 1.0)));
    let mut tracker = GestureTracker::new(GestureSettings::default());
    let mut time = FrameTime::default();

    for frame in frames.iter().take(512) {
        time = time.next(f32::from(frame.delta_ms) / 1000.0);
        tracker.set_navigating(frame.navigating);
        tracker.set_true_north_facing(frame.true_north);
        for p in frame.pointers.iter().take(8) {
            let phase = PointerPhase::ALL[usize::from(p.phase) % PointerPhase::ALL.len()];
            let position = Vec2::new(coord(p.x), coord(p.y));
            let event = PointerEvent::new(u32::from(p.id % 6), phase, position, time.now)
                .with_source(u32::from(p.source % 6));
            tracker.append_event(event);
        }
        tracker.append_scroll_delta(Vec2::new(0.0, f32::from(frame.scroll) / 16.0));

        let out = tracker.resolve(&scene, time);

        // Post-conditions that must always hold:
        assert!((0.0..=1.0).contains(&out.zoom_fraction), "zoom out of range");
        assert!(out.rotation_angle_degrees.is_finite(), "rotation not finite");
        assert!(out.camera_movement.is_finite(), "movement not finite");
        assert!(tracker.tracked_pointer_count() <= 2, "more than two tracked");
        assert!(tracker.pending_events().is_empty(), "batch not cleared");
    }
});
