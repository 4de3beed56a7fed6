//! Integration tests for the frame transform engine


use framefit::adjustment::AdjustmentValues;
use framefit::config::TransformTuning;
use framefit::frame::default_frames;
use framefit::frame::Frame;
use framefit::geometry::{Point3, Size};
use framefit::transform::{
    classify_fit, compute_preview_transform, compute_transform, FitCategory,
};
use test_helpers::reference_landmarks;

fn frame_of_width(width_mm: f64) -> Frame {
    let mut frame = default_frames().remove(0);
    frame.width_mm = width_mm;
    frame
}

#[test]
fn test_null_safety_over_degenerate_inputs() {
    let tuning = TransformTuning::default();
    let frame = frame_of_width(130.0);
    let lm = reference_landmarks();
    let good = Size::new(400.0, 500.0);

    let degenerate = [
        Size::new(0.0, 500.0),
        Size::new(400.0, 0.0),
        Size::new(-400.0, 500.0),
        Size::new(400.0, -500.0),
        Size::new(0.0, 0.0),
    ];
    for bad in degenerate {
        assert!(
            compute_transform(&frame, &lm, 130.0, bad, good, &tuning).is_none(),
            "container {bad:?}"
        );
        assert!(
            compute_transform(&frame, &lm, 130.0, good, bad, &tuning).is_none(),
            "natural {bad:?}"
        );
        assert!(compute_preview_transform(&frame, &lm, 130.0, bad, good, &tuning).is_none());
    }
    for bad_width in [0.0, -1.0, -130.0] {
        assert!(compute_transform(&frame, &lm, bad_width, good, good, &tuning).is_none());
        assert!(compute_preview_transform(&frame, &lm, bad_width, good, good, &tuning).is_none());
    }
}

#[test]
fn test_outputs_are_always_finite() {
    let tuning = TransformTuning::default();
    let frame = frame_of_width(135.0);
    let lm = reference_landmarks();
    // A grid of odd but non-degenerate geometries must never produce NaN
    for (cw, ch) in [(1.0, 1000.0), (1920.0, 2.0), (333.0, 333.0)] {
        for (nw, nh) in [(4032.0, 3024.0), (100.0, 100.0), (1.0, 1.0)] {
            let t = compute_transform(
                &frame,
                &lm,
                130.0,
                Size::new(cw, ch),
                Size::new(nw, nh),
                &tuning,
            )
            .unwrap();
            assert!(t.mid_x.is_finite() && t.mid_y.is_finite());
            assert!(t.scale_factor.is_finite() && t.angle_rad.is_finite());
        }
    }
}

#[test]
fn test_fit_boundaries_are_exact() {
    let tuning = TransformTuning::default();
    let face = 130.0;
    assert_eq!(classify_fit(face - 3.0, face, &tuning), FitCategory::Tight);
    assert_eq!(classify_fit(face - 2.99, face, &tuning), FitCategory::Perfect);
    assert_eq!(classify_fit(face + 5.0, face, &tuning), FitCategory::Loose);
    assert_eq!(classify_fit(face + 4.99, face, &tuning), FitCategory::Perfect);
}

#[test]
fn test_end_to_end_reference_scenario() {
    // Spec scenario: face 130 mm, eyes at (0.40, 0.45)/(0.60, 0.45),
    // container 400x500, natural 800x1000. Cover scale = 0.5, no offsets,
    // face edges land 240 container px apart.
    let tuning = TransformTuning::default();
    let frame = frame_of_width(130.0);
    let t = compute_transform(
        &frame,
        &reference_landmarks(),
        130.0,
        Size::new(400.0, 500.0),
        Size::new(800.0, 1000.0),
        &tuning,
    )
    .unwrap();

    // Desired on-screen width: 130 mm at 240/130 px per mm = 240 px
    let expected_scale = 240.0 / tuning.reference_asset_width_px;
    assert!((t.scale_factor - expected_scale).abs() < 1e-12);
    assert_eq!(t.fit, FitCategory::Perfect);
    assert_eq!(t.angle_rad, 0.0);
    assert!((t.mid_x - 200.0).abs() < 1e-9);
}

#[test]
fn test_cover_crop_shifts_anchor() {
    // A container taller than the image crops horizontally; the anchor must follow
    let tuning = TransformTuning::default();
    let frame = frame_of_width(130.0);
    let t = compute_transform(
        &frame,
        &reference_landmarks(),
        130.0,
        Size::new(300.0, 600.0),
        Size::new(800.0, 1000.0),
        &tuning,
    )
    .unwrap();
    // scale = max(300/800, 600/1000) = 0.6; offset_x = (300 - 480) / 2 = -90
    assert!((t.mid_x - (0.5 * 800.0 * 0.6 - 90.0)).abs() < 1e-9);
}

#[test]
fn test_rotation_snap_window() {
    let tuning = TransformTuning::default();
    let frame = frame_of_width(130.0);
    let container = Size::new(400.0, 400.0);
    let natural = Size::new(1000.0, 1000.0);

    let mut lm = reference_landmarks();
    // 2.9 degrees of roll: tan(2.9°) * 0.2 horizontal separation
    let dy = 0.2 * (2.9_f64).to_radians().tan();
    lm.right_eye = Point3::new(0.60, 0.45 + dy, 0.0);
    let snapped = compute_transform(&frame, &lm, 130.0, container, natural, &tuning).unwrap();
    assert_eq!(snapped.angle_rad, 0.0);

    let dy = 0.2 * (3.1_f64).to_radians().tan();
    lm.right_eye = Point3::new(0.60, 0.45 + dy, 0.0);
    let kept = compute_transform(&frame, &lm, 130.0, container, natural, &tuning).unwrap();
    assert!((kept.angle_rad.to_degrees() - 3.1).abs() < 0.01);
}

#[test]
fn test_adjustment_composition_is_stateless() {
    let tuning = TransformTuning::default();
    let frame = frame_of_width(130.0);
    let t = compute_transform(
        &frame,
        &reference_landmarks(),
        130.0,
        Size::new(400.0, 500.0),
        Size::new(800.0, 1000.0),
        &tuning,
    )
    .unwrap();

    let adj = AdjustmentValues {
        offset_x: 7.0,
        offset_y: 3.0,
        scale_adjust: 0.9,
        rotation_adjust: -2.0,
    };
    let a = t.composed(&adj);
    let b = t.composed(&adj);
    assert_eq!(a, b);
    // Composing never mutates the base
    assert_eq!(t.composed(&AdjustmentValues::default()).x, t.mid_x);
}

#[test]
fn test_wider_face_shrinks_scale() {
    let tuning = TransformTuning::default();
    let frame = frame_of_width(130.0);
    let lm = reference_landmarks();
    let container = Size::new(400.0, 500.0);
    let natural = Size::new(800.0, 1000.0);

    let narrow = compute_transform(&frame, &lm, 120.0, container, natural, &tuning).unwrap();
    let wide = compute_transform(&frame, &lm, 150.0, container, natural, &tuning).unwrap();
    // Same pixels, more millimeters: each mm is fewer pixels, so the frame
    // needs fewer pixels on screen
    assert!(wide.scale_factor < narrow.scale_factor);
}

#[test]
fn test_preview_scale_clamp_bounds() {
    let tuning = TransformTuning::default();
    let lm = reference_landmarks();
    let container = Size::new(400.0, 500.0);
    let natural = Size::new(800.0, 1000.0);

    let huge = compute_preview_transform(
        &frame_of_width(1000.0),
        &lm,
        130.0,
        container,
        natural,
        &tuning,
    )
    .unwrap();
    assert_eq!(huge.scale, tuning.preview_max_scale);

    let tiny = compute_preview_transform(
        &frame_of_width(1.0),
        &lm,
        130.0,
        container,
        natural,
        &tuning,
    )
    .unwrap();
    assert_eq!(tiny.scale, tuning.preview_min_scale);
}
