//! Headless try-on harness: run the fitting pipeline over a captured photo
//! and a detector mesh dump, then report the checklist, measurement,
//! candidate frames and overlay transform.

use anyhow::{bail, Context, Result};
use clap::Parser;
use framefit::app::CapturePipeline;
use framefit::config::{DeviceProfile, FitConfig};
use framefit::frame::{default_frames, CatalogSource, Frame, FrameRecord};
use framefit::geometry::{Point3, Size};
use framefit::guidance::{GuidanceController, GuidanceSink};
use framefit::landmarks::LandmarkDetector;
use framefit::measurement::{FaceMeasurements, ReferenceWidth};
use framefit::selector;
use framefit::session::{save_session, CaptureData};
use framefit::transform::compute_transform;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Captured photo to analyze
    #[arg(short, long)]
    image: PathBuf,

    /// Detector mesh dump (JSON: array of faces, each an array of [x, y, z])
    #[arg(short, long)]
    mesh: PathBuf,

    /// Frame catalog records (JSON array); built-in frames when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Base URL/path for overlay assets referenced by catalog records
    #[arg(long, default_value = "/vto")]
    image_base: String,

    /// SKU to try on (defaults to the first best match)
    #[arg(long)]
    sku: Option<String>,

    /// Measured face width in millimeters (otherwise the assumed average)
    #[arg(long)]
    face_width_mm: Option<f64>,

    /// Display container size, e.g. 400x500
    #[arg(long, default_value = "400x500")]
    container: String,

    /// Device profile (mobile, desktop)
    #[arg(short, long)]
    profile: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Save the capture session as JSON when all checks pass
    #[arg(long)]
    session_out: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Detector backend replaying a recorded mesh dump
struct ReplayDetector {
    faces: Vec<Vec<Point3>>,
}

impl LandmarkDetector for ReplayDetector {
    fn detect(&mut self, _image: &image::RgbImage) -> framefit::Result<Vec<Vec<Point3>>> {
        Ok(self.faces.clone())
    }
}

/// Guidance sink printing to stdout
struct PrintSink;

impl GuidanceSink for PrintSink {
    fn speak(&mut self, message: &str) {
        println!("guidance: {message}");
    }
}

fn parse_container(spec: &str) -> Result<Size> {
    let (w, h) = spec
        .split_once(['x', 'X'])
        .with_context(|| format!("container must look like 400x500, got {spec}"))?;
    let width: f64 = w.trim().parse().context("container width")?;
    let height: f64 = h.trim().parse().context("container height")?;
    if width <= 0.0 || height <= 0.0 {
        bail!("container dimensions must be positive");
    }
    Ok(Size::new(width, height))
}

fn load_mesh(path: &PathBuf) -> Result<Vec<Vec<Point3>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading mesh dump {}", path.display()))?;
    let raw: Vec<Vec<[f64; 3]>> = serde_json::from_str(&content).context("parsing mesh dump")?;
    Ok(raw
        .into_iter()
        .map(|face| {
            face.into_iter()
                .map(|[x, y, z]| Point3::new(x, y, z))
                .collect()
        })
        .collect())
}

/// Catalog source backed by a JSON record dump
struct JsonCatalog {
    records: Vec<FrameRecord>,
}

impl JsonCatalog {
    fn open(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let records = serde_json::from_str(&content).context("parsing catalog")?;
        Ok(Self { records })
    }
}

impl CatalogSource for JsonCatalog {
    fn frame_by_sku(&mut self, sku: &str) -> framefit::Result<FrameRecord> {
        self.records
            .iter()
            .find(|r| r.skuid == sku)
            .cloned()
            .ok_or_else(|| framefit::Error::Catalog(format!("unknown SKU {sku}")))
    }

    fn frames(&mut self, limit: usize) -> framefit::Result<Vec<FrameRecord>> {
        Ok(self.records.iter().take(limit).cloned().collect())
    }
}

fn load_catalog(path: &PathBuf, image_base: &str) -> Result<Vec<Frame>> {
    let mut source = JsonCatalog::open(path)?;
    let records = source.frames(1000).context("listing catalog frames")?;
    Ok(records
        .iter()
        .map(|record| Frame::from_record(record, image_base))
        .collect())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match FitConfig::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {e}. Using defaults.");
                FitConfig::default()
            }
        }
    } else {
        FitConfig::default()
    };
    if let Some(profile) = &args.profile {
        config.profile = match profile.as_str() {
            "mobile" => DeviceProfile::Mobile,
            "desktop" => DeviceProfile::Desktop,
            other => bail!("unknown device profile {other}"),
        };
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let container = parse_container(&args.container)?;

    let photo = image::open(&args.image)
        .with_context(|| format!("opening {}", args.image.display()))?
        .to_rgb8();
    let natural = Size::new(f64::from(photo.width()), f64::from(photo.height()));
    let faces = load_mesh(&args.mesh)?;

    let reference = match args.face_width_mm {
        Some(mm) if mm > 0.0 => ReferenceWidth::Measured(mm),
        Some(mm) => bail!("face width must be positive, got {mm}"),
        None => ReferenceWidth::assumed(),
    };

    let mut pipeline = CapturePipeline::new(Box::new(ReplayDetector { faces }), &config);
    pipeline.set_reference_width(reference);
    let cycle = pipeline.run_cycle(&photo);

    println!("Capture checklist:");
    for check in &cycle.validation.checks {
        let mark = if check.passed { "ok " } else { "FAIL" };
        println!("  [{mark}] {:<16} {}", check.label, check.message);
    }

    let mut guidance = GuidanceController::new(Box::new(PrintSink), &config.guidance);
    guidance.speak_guidance(&cycle.validation.checks);

    let face_width_mm = reference.value();
    let Some(measurement) = cycle.measurement else {
        println!("Capture not usable yet; no measurement this cycle.");
        return Ok(());
    };
    println!(
        "PD: {:.0} mm ({:.1} px at {:.4} mm/px, face {:.0} px wide)",
        measurement.pd_millimeters,
        measurement.pd_pixels,
        measurement.mm_per_pixel,
        measurement.face_width_pixels,
    );

    let catalog = match &args.catalog {
        Some(path) => load_catalog(path, &args.image_base)?,
        None => default_frames(),
    };
    let candidates = selector::candidate_frames(
        catalog,
        face_width_mm,
        default_frames(),
        &config.selection,
    );
    let selection = selector::select(&candidates, face_width_mm, &config.selection);
    println!(
        "Frames: {} best match(es), {} other (face width {face_width_mm:.0} mm)",
        selection.best.len(),
        selection.other.len(),
    );

    let chosen = match &args.sku {
        Some(sku) => candidates
            .iter()
            .find(|f| &f.id == sku)
            .cloned()
            .with_context(|| format!("SKU {sku} not in the candidate list"))?,
        None => selection
            .best
            .first()
            .or_else(|| selection.other.first())
            .cloned()
            .context("no candidate frames at all")?,
    };

    let landmarks = cycle
        .validation
        .landmarks
        .context("passing cycle always carries landmarks")?;
    let transform = compute_transform(
        &chosen,
        &landmarks,
        face_width_mm,
        container,
        natural,
        &config.transform,
    )
    .context("transform is defined for a passing capture")?;
    println!(
        "{} ({:.0} mm): anchor ({:.1}, {:.1}), scale {:.3}, roll {:.1} deg -> {}",
        chosen.name,
        chosen.width_mm,
        transform.mid_x,
        transform.mid_y,
        transform.scale_factor,
        transform.angle_rad.to_degrees(),
        transform.fit.label(),
    );

    if let Some(path) = &args.session_out {
        let measurements = FaceMeasurements {
            pd: measurement.pd_millimeters,
            pd_left: measurement.pd_millimeters / 2.0,
            pd_right: measurement.pd_millimeters / 2.0,
            nose_bridge_left: 0.0,
            nose_bridge_right: 0.0,
            face_width: face_width_mm,
            face_height: 0.0,
            face_ratio: 0.0,
        };
        let session = CaptureData::new(landmarks, measurements, String::new());
        save_session(path, &session)?;
        info!("capture session saved to {}", path.display());
    }

    Ok(())
}
