//! Benchmarks for the per-cycle hot paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use framefit::config::{FitConfig, TransformTuning};
use framefit::frame::default_frames;
use framefit::geometry::{Point3, Size};
use framefit::image_quality::QualitySample;
use framefit::landmarks::FaceLandmarks;
use framefit::transform::compute_transform;
use framefit::validation::CaptureValidator;

fn landmarks() -> FaceLandmarks {
    FaceLandmarks {
        left_eye: Point3::new(0.40, 0.45, 0.0),
        right_eye: Point3::new(0.60, 0.45, 0.0),
        nose_tip: Point3::new(0.50, 0.55, 0.0),
        left_ear: Point3::new(0.20, 0.50, 0.0),
        right_ear: Point3::new(0.80, 0.50, 0.0),
        chin: Point3::new(0.50, 0.70, 0.0),
        forehead: Point3::new(0.50, 0.20, 0.0),
        left_eye_upper: Point3::new(0.40, 0.43, 0.0),
        left_eye_lower: Point3::new(0.40, 0.47, 0.0),
        right_eye_upper: Point3::new(0.60, 0.43, 0.0),
        right_eye_lower: Point3::new(0.60, 0.47, 0.0),
        face_left: Point3::new(0.40, 0.50, 0.0),
        face_right: Point3::new(0.60, 0.50, 0.0),
        bridge: Some(Point3::new(0.50, 0.44, 0.0)),
    }
}

fn benchmark_transform(c: &mut Criterion) {
    let tuning = TransformTuning::default();
    let frame = default_frames().remove(0);
    let lm = landmarks();
    let container = Size::new(400.0, 500.0);
    let natural = Size::new(1280.0, 720.0);

    c.bench_function("compute_transform", |b| {
        b.iter(|| {
            compute_transform(
                black_box(&frame),
                black_box(&lm),
                black_box(130.0),
                container,
                natural,
                &tuning,
            )
        });
    });
}

fn benchmark_validation(c: &mut Criterion) {
    let lm = landmarks();
    let quality = QualitySample {
        brightness: 150.0,
        contrast: 0.6,
    };

    c.bench_function("validator_evaluate", |b| {
        let mut validator = CaptureValidator::new(&FitConfig::default());
        b.iter(|| validator.evaluate(black_box(Some(&lm)), 1, quality));
    });
}

criterion_group!(benches, benchmark_transform, benchmark_validation);
criterion_main!(benches);
