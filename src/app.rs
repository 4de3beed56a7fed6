//! Detection pipeline: throttled capture cycles with explicit cancellation.
//!
//! The pipeline is single-threaded and cooperative. Each cycle takes one
//! camera frame, runs the detector, validates the capture and, when every
//! check passes, derives the PD measurement. Cycles are throttled to a fixed
//! cadence regardless of the camera frame rate; the loop checks a stop token
//! every iteration and releases the frame source on exit.

use crate::config::FitConfig;
use crate::image_quality;
use crate::landmarks::{FaceLandmarks, LandmarkDetector};
use crate::measurement::{self, PdMeasurement, ReferenceWidth};
use crate::validation::{CaptureValidator, ValidationState};
use crate::Result;
use image::RgbImage;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Camera permission/device state.
///
/// Denied is distinct from a generic failure so the UI can render specific
/// remediation copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Requesting,
    Granted,
    Denied,
    Error,
}

impl CameraState {
    /// Remediation copy for the non-working states
    #[must_use]
    pub fn remediation(self) -> Option<&'static str> {
        match self {
            Self::Requesting | Self::Granted => None,
            Self::Denied => Some(
                "Camera access was denied. Please allow camera access in your browser settings.",
            ),
            Self::Error => Some("No camera found. Please connect a camera and try again."),
        }
    }
}

/// Camera or video frame source, consumed at its interface boundary.
pub trait FrameSource {
    /// Next frame, or `None` when the stream has ended
    ///
    /// # Errors
    ///
    /// Returns an error when the device fails mid-stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Release the underlying device. Called once when the loop exits.
    fn release(&mut self) {}
}

/// Cooperative cancellation handle for the detection loop
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop after the current cycle
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// Result of one detection cycle
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub validation: ValidationState,
    /// Present only when every check passed this cycle
    pub measurement: Option<PdMeasurement>,
}

/// The per-cycle detection pipeline
pub struct CapturePipeline {
    detector: Box<dyn LandmarkDetector>,
    validator: CaptureValidator,
    reference: ReferenceWidth,
    min_interval: Duration,
    last_process: Option<Instant>,
}

impl CapturePipeline {
    #[must_use]
    pub fn new(detector: Box<dyn LandmarkDetector>, config: &FitConfig) -> Self {
        Self {
            detector,
            validator: CaptureValidator::new(config),
            reference: ReferenceWidth::assumed(),
            min_interval: Duration::from_millis(config.detection.min_interval_ms),
            last_process: None,
        }
    }

    /// Install a face-width reference, e.g. after a remote measurement call
    pub fn set_reference_width(&mut self, reference: ReferenceWidth) {
        self.reference = reference;
    }

    #[must_use]
    pub fn reference_width(&self) -> ReferenceWidth {
        self.reference
    }

    /// Process one frame if the cadence allows it; `None` means the frame was
    /// skipped by throttling, not that detection failed.
    pub fn process(&mut self, image: &RgbImage) -> Option<CycleResult> {
        let now = Instant::now();
        if let Some(last) = self.last_process {
            if now.duration_since(last) < self.min_interval {
                return None;
            }
        }
        self.last_process = Some(now);
        Some(self.run_cycle(image))
    }

    /// Run one detection cycle unconditionally
    pub fn run_cycle(&mut self, image: &RgbImage) -> CycleResult {
        let quality = image_quality::analyze(image);

        // Detector failure degrades to a no-face cycle
        let faces = match self.detector.detect(image) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("landmark detection failed: {e}");
                Vec::new()
            }
        };
        let face_count = faces.len();
        let landmarks = faces.first().and_then(|mesh| {
            match FaceLandmarks::from_mesh(mesh) {
                Ok(lm) => Some(lm),
                Err(e) => {
                    warn!("unusable face mesh: {e}");
                    None
                }
            }
        });

        let validation = self.validator.evaluate(landmarks.as_ref(), face_count, quality);

        let measurement = if validation.all_checks_passed {
            landmarks.as_ref().and_then(|lm| {
                measurement::measure(lm, self.reference.value(), f64::from(image.width()))
            })
        } else {
            None
        };

        CycleResult {
            validation,
            measurement,
        }
    }

    /// Drive the pipeline over a frame source until the source ends or the
    /// stop token fires. The source is released on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error when the frame source fails mid-stream; the source is
    /// still released first.
    pub fn run<F>(
        &mut self,
        source: &mut dyn FrameSource,
        stop: &StopToken,
        mut on_cycle: F,
    ) -> Result<()>
    where
        F: FnMut(&CycleResult),
    {
        info!("starting detection loop at {:?} cadence", self.min_interval);
        let result = loop {
            if stop.is_stopped() {
                info!("detection loop stopped by token");
                break Ok(());
            }
            match source.next_frame() {
                Ok(Some(image)) => {
                    if let Some(cycle) = self.process(&image) {
                        on_cycle(&cycle);
                    } else {
                        // Ahead of cadence: yield instead of spinning
                        std::thread::sleep(Duration::from_millis(5));
                    }
                }
                Ok(None) => {
                    info!("frame source ended");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }
        };
        source.release();
        self.validator.reset();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use crate::landmarks::mesh_index;

    struct StubDetector {
        faces: Vec<Vec<Point3>>,
    }

    impl LandmarkDetector for StubDetector {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<Vec<Point3>>> {
            Ok(self.faces.clone())
        }
    }

    fn centered_mesh() -> Vec<Point3> {
        let mut mesh = vec![Point3::default(); 478];
        mesh[mesh_index::LEFT_IRIS] = Point3::new(0.4, 0.45, 0.0);
        mesh[mesh_index::RIGHT_IRIS] = Point3::new(0.6, 0.45, 0.0);
        mesh[mesh_index::NOSE_TIP] = Point3::new(0.5, 0.55, 0.0);
        mesh[mesh_index::CHIN] = Point3::new(0.5, 0.7, 0.0);
        mesh[mesh_index::FOREHEAD] = Point3::new(0.5, 0.2, 0.0);
        mesh[mesh_index::LEFT_EYE_UPPER] = Point3::new(0.4, 0.43, 0.0);
        mesh[mesh_index::LEFT_EYE_LOWER] = Point3::new(0.4, 0.47, 0.0);
        mesh[mesh_index::RIGHT_EYE_UPPER] = Point3::new(0.6, 0.43, 0.0);
        mesh[mesh_index::RIGHT_EYE_LOWER] = Point3::new(0.6, 0.47, 0.0);
        // FACE_LEFT/RIGHT share indices with the ears
        mesh[mesh_index::FACE_LEFT] = Point3::new(0.4, 0.5, 0.0);
        mesh[mesh_index::FACE_RIGHT] = Point3::new(0.6, 0.5, 0.0);
        mesh[mesh_index::BRIDGE] = Point3::new(0.5, 0.44, 0.0);
        mesh
    }

    fn bright_image() -> RgbImage {
        RgbImage::from_fn(64, 64, |x, _y| {
            // Dark left half, bright right half: good mean and strong contrast
            if x < 32 {
                image::Rgb([90, 90, 90])
            } else {
                image::Rgb([210, 210, 210])
            }
        })
    }

    #[test]
    fn test_passing_cycle_produces_measurement() {
        let detector = StubDetector {
            faces: vec![centered_mesh()],
        };
        let mut pipeline = CapturePipeline::new(Box::new(detector), &FitConfig::default());
        let cycle = pipeline.run_cycle(&bright_image());
        assert!(
            cycle.validation.all_checks_passed,
            "checks: {:?}",
            cycle
                .validation
                .checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| (c.id, c.message.clone()))
                .collect::<Vec<_>>()
        );
        let m = cycle.measurement.expect("measurement for a passing cycle");
        assert!(m.pd_millimeters > 0.0);
    }

    #[test]
    fn test_no_face_cycle_has_no_measurement() {
        let detector = StubDetector { faces: vec![] };
        let mut pipeline = CapturePipeline::new(Box::new(detector), &FitConfig::default());
        let cycle = pipeline.run_cycle(&bright_image());
        assert!(!cycle.validation.face_detected);
        assert!(cycle.measurement.is_none());
    }

    #[test]
    fn test_two_faces_block_measurement() {
        let detector = StubDetector {
            faces: vec![centered_mesh(), centered_mesh()],
        };
        let mut pipeline = CapturePipeline::new(Box::new(detector), &FitConfig::default());
        let cycle = pipeline.run_cycle(&bright_image());
        assert!(cycle.validation.face_detected);
        assert_eq!(cycle.validation.face_count, 2);
        assert!(!cycle.validation.all_checks_passed);
        assert!(cycle.measurement.is_none());
    }

    struct FailingDetector;

    impl LandmarkDetector for FailingDetector {
        fn detect(&mut self, _image: &RgbImage) -> Result<Vec<Vec<Point3>>> {
            Err(crate::Error::Detector("backend crashed".to_string()))
        }
    }

    #[test]
    fn test_detector_failure_degrades_to_no_face() {
        let mut pipeline = CapturePipeline::new(Box::new(FailingDetector), &FitConfig::default());
        let cycle = pipeline.run_cycle(&bright_image());
        assert!(!cycle.validation.face_detected);
        assert!(cycle.measurement.is_none());
    }

    struct CountingSource {
        frames_left: usize,
        released: bool,
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self) -> Result<Option<RgbImage>> {
            if self.frames_left == 0 {
                return Ok(None);
            }
            self.frames_left -= 1;
            Ok(Some(RgbImage::new(8, 8)))
        }

        fn release(&mut self) {
            self.released = true;
        }
    }

    #[test]
    fn test_run_releases_source_at_stream_end() {
        let detector = StubDetector { faces: vec![] };
        let mut pipeline = CapturePipeline::new(Box::new(detector), &FitConfig::default());
        let mut source = CountingSource {
            frames_left: 2,
            released: false,
        };
        let stop = StopToken::new();
        pipeline.run(&mut source, &stop, |_| {}).unwrap();
        assert!(source.released);
    }

    #[test]
    fn test_stop_token_halts_before_first_frame() {
        let detector = StubDetector { faces: vec![] };
        let mut pipeline = CapturePipeline::new(Box::new(detector), &FitConfig::default());
        let mut source = CountingSource {
            frames_left: 1000,
            released: false,
        };
        let stop = StopToken::new();
        stop.stop();
        pipeline.run(&mut source, &stop, |_| {}).unwrap();
        assert_eq!(source.frames_left, 1000);
        assert!(source.released);
    }

    #[test]
    fn test_remediation_copy() {
        assert!(CameraState::Granted.remediation().is_none());
        assert!(CameraState::Denied.remediation().unwrap().contains("denied"));
    }
}
