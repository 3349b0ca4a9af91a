use std::sync::Arc;

use nalgebra::{Point2, Vector2};
use pagelock_core::{FrameSize, Quad};
use pagelock_template::{PageExtent, PageTemplate, TemplateMatcher, TemplateTable};
use pagelock_tracker::{
    DetectionResult, FrameTracker, MarkerEvent, TrackerParams, ALIGN_MESSAGE,
};

fn matcher() -> TemplateMatcher {
    let tall = PageTemplate::from_extent(
        "tall",
        "test",
        PageExtent {
            offset_x: 0.0,
            offset_y: 1.0,
            width_units: 1.0,
            height_units: 2.0,
        },
    );
    let mut templates = pagelock_template::builtin_templates();
    templates.push(tall);
    TemplateMatcher::new(Arc::new(TemplateTable::new(templates).expect("table")))
}

fn identity_tracker() -> FrameTracker {
    let mut t = FrameTracker::new(matcher(), TrackerParams::default()).expect("tracker");
    t.set_source(FrameSize::new(640.0, 640.0), 0);
    t.set_preview(FrameSize::new(640.0, 640.0));
    t
}

fn marker(payload: &str, quad: Quad) -> MarkerEvent {
    MarkerEvent::new(payload, quad.corners())
}

fn unit_marker() -> Quad {
    Quad::from_rect(100.0, 100.0, 100.0, 100.0)
}

fn run(t: &mut FrameTracker, ev: Option<&MarkerEvent>, frames: usize) -> DetectionResult {
    let mut last = DetectionResult::default();
    for _ in 0..frames {
        last = t.process(ev).expect("viewport ready");
    }
    last
}

#[test]
fn reference_marker_resolves_reference_page() {
    let mut t = identity_tracker();
    let r = run(&mut t, Some(&marker("tall", unit_marker())), 3);

    assert!(r.match_found);
    let page = r.page_overlay.expect("page overlay");
    assert_eq!(page.top_left, Point2::new(100.0, 0.0));
    assert_eq!(page.top_right, Point2::new(200.0, 0.0));
    assert_eq!(page.bottom_right, Point2::new(200.0, 200.0));
    assert_eq!(page.bottom_left, Point2::new(100.0, 200.0));
    assert_eq!(r.template.map(|t| t.key), Some("tall".to_string()));
}

#[test]
fn overlays_are_mapped_into_a_cropped_rotated_preview() {
    let mut t = FrameTracker::new(matcher(), TrackerParams::default()).expect("tracker");
    // effective 1600x1200 source into 800x1200: scale 1, 400 px cropped per side
    t.set_source(FrameSize::new(1200.0, 1600.0), 90);
    t.set_preview(FrameSize::new(800.0, 1200.0));

    let r = run(
        &mut t,
        Some(&marker("tall", Quad::from_rect(500.0, 500.0, 100.0, 100.0))),
        3,
    );
    assert!(r.match_found);
    assert_eq!(
        r.marker_overlay,
        Some(Quad::from_rect(100.0, 500.0, 100.0, 100.0))
    );
    assert_eq!(
        r.page_overlay,
        Some(Quad::from_rect(100.0, 400.0, 100.0, 200.0))
    );
    assert_eq!(t.viewport().recomputations(), 1);
}

#[test]
fn losing_the_marker_resets_both_tracks() {
    let mut t = identity_tracker();
    let ev = marker("tall", unit_marker());
    assert!(run(&mut t, Some(&ev), 3).match_found);

    let lost = t.process(None).expect("process");
    assert_eq!(lost, DetectionResult::default());
    assert!(t.marker_stabilizer().last().is_none());
    assert!(t.page_stabilizer().last().is_none());

    // the lock has to be re-earned
    let again = t.process(Some(&ev)).expect("process");
    assert!(!again.match_found);
    assert_eq!(again.validation_message.as_deref(), Some(ALIGN_MESSAGE));
    assert!(run(&mut t, Some(&ev), 2).match_found);
}

#[test]
fn short_corner_list_counts_as_no_marker() {
    let mut t = identity_tracker();
    run(&mut t, Some(&marker("tall", unit_marker())), 2);

    let short = MarkerEvent {
        payload: Some("tall".into()),
        corners: Some(unit_marker().corners()[..3].to_vec()),
    };
    let r = t.process(Some(&short)).expect("process");
    assert!(r.is_empty());
    assert!(t.marker_stabilizer().last().is_none());
}

#[test]
fn unknown_payload_keeps_only_the_marker_track() {
    let mut t = identity_tracker();
    run(&mut t, Some(&marker("tall", unit_marker())), 2);
    assert!(t.page_stabilizer().last().is_some());

    let r = t
        .process(Some(&marker("not a form", unit_marker())))
        .expect("process");
    assert!(!r.match_found);
    assert!(r.page_overlay.is_none());
    assert!(r.payload.is_none());
    assert!(r.validation_message.is_none());
    assert_eq!(r.marker_overlay, Some(unit_marker()));
    assert!(t.page_stabilizer().last().is_none());
    assert_eq!(t.marker_stabilizer().stable_frames(), 3);
}

#[test]
fn tilted_page_reports_rotation_first() {
    let mut t = identity_tracker();
    let tilted = Quad::from_rect(300.0, 300.0, 60.0, 60.0).apply_rotation(40.0, None);
    let r = run(&mut t, Some(&marker("tall", tilted)), 4);

    assert!(!r.match_found);
    assert!(r.page_overlay.is_none());
    let msg = r.validation_message.expect("message");
    assert!(
        msg.starts_with("Rotate camera to align with page ("),
        "unexpected message {msg:?}"
    );
}

#[test]
fn single_frame_glitch_is_absorbed() {
    let mut t = identity_tracker();
    let ev = marker("tall", unit_marker());
    assert!(run(&mut t, Some(&ev), 3).match_found);

    // the glitch frame keeps the old marker but is not trusted
    let glitch = marker("tall", unit_marker().translate(Vector2::new(300.0, 0.0)));
    let r = t.process(Some(&glitch)).expect("process");
    assert!(!r.match_found);
    assert!(r.page_overlay.is_none());
    assert_eq!(r.marker_overlay, Some(unit_marker()));
    assert_eq!(r.validation_message.as_deref(), Some(ALIGN_MESSAGE));

    // the lock comes straight back without being re-earned
    let r = t.process(Some(&ev)).expect("process");
    assert!(r.match_found);
    assert_eq!(
        r.page_overlay,
        Some(Quad::from_rect(100.0, 0.0, 100.0, 200.0))
    );
}

#[test]
fn held_translation_after_lock_is_followed() {
    let mut t = identity_tracker();
    assert!(run(&mut t, Some(&marker("tall", unit_marker())), 3).match_found);

    let moved = marker("tall", unit_marker().translate(Vector2::new(60.0, 0.0)));
    let r = run(&mut t, Some(&moved), 60);
    assert!(r.match_found);
    assert_eq!(
        r.marker_overlay,
        Some(Quad::from_rect(160.0, 100.0, 100.0, 100.0))
    );
    assert_eq!(
        r.page_overlay,
        Some(Quad::from_rect(160.0, 0.0, 100.0, 200.0))
    );
}

#[test]
fn held_translation_is_followed_through_the_median_window() {
    let params = TrackerParams {
        page_median_window: 5,
        ..TrackerParams::default()
    };
    let mut t = FrameTracker::new(matcher(), params).expect("tracker");
    t.set_source(FrameSize::new(640.0, 640.0), 0);
    t.set_preview(FrameSize::new(640.0, 640.0));
    assert!(run(&mut t, Some(&marker("tall", unit_marker())), 3).match_found);

    let moved = marker("tall", unit_marker().translate(Vector2::new(60.0, 0.0)));
    let first = t.process(Some(&moved)).expect("process");
    assert!(!first.match_found);

    let r = run(&mut t, Some(&moved), 80);
    assert!(r.match_found);
    assert_eq!(
        r.page_overlay,
        Some(Quad::from_rect(160.0, 0.0, 100.0, 200.0))
    );
}

fn tall_form_tracker(params: TrackerParams) -> (FrameTracker, Quad) {
    let mut t = FrameTracker::new(TemplateMatcher::default(), params).expect("tracker");
    t.set_source(FrameSize::new(1080.0, 1920.0), 0);
    t.set_preview(FrameSize::new(1080.0, 1920.0));
    (t, Quad::from_rect(100.0, 1700.0, 60.0, 60.0))
}

#[test]
fn held_rotation_after_lock_is_never_trusted_by_default() {
    let (mut t, still) = tall_form_tracker(TrackerParams::default());
    assert!(run(&mut t, Some(&marker("04o", still)), 3).match_found);

    // the page corners sit far from the marker, so every page frame jumps
    let turned = marker("04o", still.apply_rotation(20.0, None));
    let r = run(&mut t, Some(&turned), 100);
    assert!(!r.match_found);
    assert!(r.page_overlay.is_none());
    assert_eq!(r.validation_message.as_deref(), Some(ALIGN_MESSAGE));
    assert!(t.page_stabilizer().consecutive_rejections() > 0);
}

#[test]
fn held_rotation_after_lock_reseeds_with_rejection_limit() {
    let mut params = TrackerParams::default();
    params.marker.max_consecutive_rejections = 3;
    params.page.max_consecutive_rejections = 3;
    let (mut t, still) = tall_form_tracker(params);
    assert!(run(&mut t, Some(&marker("04o", still)), 3).match_found);

    let turned = marker("04o", still.apply_rotation(20.0, None));
    let r = run(&mut t, Some(&turned), 100);
    assert!(r.match_found);
    let page = r.page_overlay.expect("page overlay");
    assert!(
        (page.rotation_angle_deg() - 20.0).abs() < 0.5,
        "page angle {}",
        page.rotation_angle_deg()
    );
}

#[test]
fn builtin_form_locks_with_default_matcher() {
    let mut t = FrameTracker::new(TemplateMatcher::default(), TrackerParams::default())
        .expect("tracker");
    t.set_source(FrameSize::new(1080.0, 1920.0), 0);
    t.set_preview(FrameSize::new(1080.0, 1920.0));

    let marker_quad = Quad::from_rect(100.0, 1500.0, 80.0, 80.0);
    let r = run(&mut t, Some(&marker("P01 V1F T02 S000", marker_quad)), 3);
    assert!(r.match_found);
    let page = r.page_overlay.expect("page");
    // 9.5 x 12.5 marker units, top edge 11.5 units above the marker
    assert_eq!(page.top_left, Point2::new(100.0, 580.0));
    assert_eq!(page.bottom_right, Point2::new(860.0, 1580.0));
}
