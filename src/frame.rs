//! Frame catalog entities and the dimension-string format.

use crate::adjustment::AdjustmentValues;
use crate::constants::LENS_HEIGHT_RATIO;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Frame shape category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FrameShape {
    Rectangular,
    Round,
    Aviator,
    CatEye,
    Square,
    #[default]
    Generic,
}

impl FrameShape {
    /// Map a free-form catalog shape label onto a category
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let s = label.to_lowercase();
        if s.contains("round") {
            Self::Round
        } else if s.contains("square") {
            Self::Square
        } else if s.contains("aviator") {
            Self::Aviator
        } else if s.contains("cat") || s.contains("eye") {
            Self::CatEye
        } else if s.contains("rectangular") || s.contains("rectangle") {
            Self::Rectangular
        } else {
            Self::Generic
        }
    }
}

/// Physical frame dimensions parsed from a catalog dimension string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedDimensions {
    pub lens_width: f64,
    /// Optional 5th part, derived as ~0.6x lens width when missing
    pub lens_height: f64,
    pub nose_bridge: f64,
    pub temple_length: f64,
    /// Total frame width; derived as 2x lens + bridge when the string omits it
    pub width: f64,
}

const DEFAULT_DIMENSIONS: ParsedDimensions = ParsedDimensions {
    lens_width: 50.0,
    lens_height: 30.0,
    nose_bridge: 18.0,
    temple_length: 135.0,
    width: 130.0,
};

/// Parse a catalog dimension string.
///
/// Accepted formats (all values mm, hyphen/en-dash/em-dash separated):
/// `lens-bridge-temple`, `lens-bridge-width-temple`, and
/// `lens-height-bridge-width-temple`. Malformed or missing input falls back
/// to the default dimensions rather than failing; browsing must not dead-end
/// on a bad record.
#[must_use]
pub fn parse_dimensions(dimensions: Option<&str>) -> ParsedDimensions {
    let Some(raw) = dimensions else {
        return DEFAULT_DIMENSIONS;
    };
    let parts: Vec<f64> = raw
        .trim()
        .split(['-', '\u{2013}', '\u{2014}'])
        .filter_map(|p| p.trim().parse::<f64>().ok())
        .collect();
    if parts.len() < 3 {
        return DEFAULT_DIMENSIONS;
    }

    let lens_width = parts[0];
    let has_lens_height = parts.len() >= 5;
    let lens_height = if has_lens_height {
        parts[1]
    } else {
        (lens_width * LENS_HEIGHT_RATIO).round()
    };
    let nose_bridge = if has_lens_height { parts[2] } else { parts[1] };
    let width = if has_lens_height {
        parts[3]
    } else if parts.len() >= 4 {
        parts[2]
    } else {
        2.0 * lens_width + nose_bridge
    };
    let temple_length = if has_lens_height {
        parts[4]
    } else if parts.len() >= 4 {
        parts[3]
    } else {
        parts[2]
    };

    ParsedDimensions {
        lens_width,
        lens_height,
        nose_bridge,
        temple_length,
        width,
    }
}

/// Catalog frame entity with physical dimensions in millimeters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: String,
    pub name: String,
    /// Overlay asset reference (URL or path)
    pub image_ref: String,
    pub shape: FrameShape,
    pub color: String,
    pub width_mm: f64,
    pub lens_width_mm: f64,
    pub lens_height_mm: f64,
    pub nose_bridge_mm: f64,
    pub temple_length_mm: f64,
    /// Stored fine-tune offsets this frame's adjustments reset to
    #[serde(default)]
    pub default_offsets: AdjustmentValues,
}

/// Catalog record as returned by the frame catalog source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub skuid: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Structured dimension string, e.g. "51-18-142-41"
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default, alias = "frame_color")]
    pub color: Option<String>,
}

impl Frame {
    /// Build a frame entity from a catalog record, falling back to default
    /// dimensions when the record is incomplete.
    #[must_use]
    pub fn from_record(record: &FrameRecord, image_base: &str) -> Self {
        let dims = parse_dimensions(record.dimensions.as_deref());
        Self {
            id: record.skuid.clone(),
            name: record.name.clone().unwrap_or_else(|| record.skuid.clone()),
            image_ref: overlay_image_ref(image_base, &record.skuid),
            shape: record
                .shape
                .as_deref()
                .map(FrameShape::from_label)
                .unwrap_or_default(),
            color: record.color.clone().unwrap_or_else(|| "\u{2014}".to_string()),
            width_mm: dims.width,
            lens_width_mm: dims.lens_width,
            lens_height_mm: dims.lens_height,
            nose_bridge_mm: dims.nose_bridge,
            temple_length_mm: dims.temple_length,
            default_offsets: AdjustmentValues::default(),
        }
    }
}

/// Overlay asset location for a SKU
#[must_use]
pub fn overlay_image_ref(image_base: &str, skuid: &str) -> String {
    format!("{}/{}_VTO.png", image_base.trim_end_matches('/'), skuid)
}

/// Frame catalog source, consumed at its interface boundary.
pub trait CatalogSource {
    /// Fetch a single frame record by SKU
    ///
    /// # Errors
    ///
    /// Returns an error when the SKU is unknown or the source is unreachable.
    fn frame_by_sku(&mut self, sku: &str) -> Result<FrameRecord>;

    /// Fetch up to `limit` frame records
    ///
    /// # Errors
    ///
    /// Returns an error when the source is unreachable.
    fn frames(&mut self, limit: usize) -> Result<Vec<FrameRecord>>;
}

/// Built-in frames shown before any catalog is available, and the fallback
/// when the candidate filter matches nothing.
#[must_use]
pub fn default_frames() -> Vec<Frame> {
    vec![
        Frame {
            id: "1".to_string(),
            name: "Pink Cat-Eye".to_string(),
            image_ref: "/frames/frame1.png".to_string(),
            shape: FrameShape::CatEye,
            color: "Pink".to_string(),
            width_mm: 127.0,
            lens_width_mm: 50.0,
            lens_height_mm: 30.0,
            nose_bridge_mm: 15.0,
            temple_length_mm: 135.0,
            default_offsets: AdjustmentValues::default(),
        },
        Frame {
            id: "2".to_string(),
            name: "Blue Round".to_string(),
            image_ref: "/frames/frame2.png".to_string(),
            shape: FrameShape::Round,
            color: "Blue".to_string(),
            width_mm: 122.0,
            lens_width_mm: 44.0,
            lens_height_mm: 28.0,
            nose_bridge_mm: 18.0,
            temple_length_mm: 125.0,
            default_offsets: AdjustmentValues::default(),
        },
        Frame {
            id: "3".to_string(),
            name: "Black Aviator".to_string(),
            image_ref: "/frames/frame3.png".to_string(),
            shape: FrameShape::Aviator,
            color: "Black".to_string(),
            width_mm: 141.0,
            lens_width_mm: 55.0,
            lens_height_mm: 34.0,
            nose_bridge_mm: 18.0,
            temple_length_mm: 142.0,
            default_offsets: AdjustmentValues::default(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_four_part_string() {
        let dims = parse_dimensions(Some("51-18-142-41"));
        assert_eq!(dims.lens_width, 51.0);
        assert_eq!(dims.nose_bridge, 18.0);
        assert_eq!(dims.width, 142.0);
        assert_eq!(dims.temple_length, 41.0);
        // Derived: round(51 * 0.6)
        assert_eq!(dims.lens_height, 31.0);
    }

    #[test]
    fn test_parse_five_part_string() {
        let dims = parse_dimensions(Some("51-32-18-142-41"));
        assert_eq!(dims.lens_width, 51.0);
        assert_eq!(dims.lens_height, 32.0);
        assert_eq!(dims.nose_bridge, 18.0);
        assert_eq!(dims.width, 142.0);
        assert_eq!(dims.temple_length, 41.0);
    }

    #[test]
    fn test_parse_three_part_string_derives_width() {
        let dims = parse_dimensions(Some("50-18-135"));
        assert_eq!(dims.lens_width, 50.0);
        assert_eq!(dims.nose_bridge, 18.0);
        assert_eq!(dims.width, 118.0); // 2 * 50 + 18
        assert_eq!(dims.temple_length, 135.0);
    }

    #[test]
    fn test_parse_tolerates_dash_variants_and_spaces() {
        let dims = parse_dimensions(Some(" 51 \u{2013} 18 \u{2014} 142 - 41 "));
        assert_eq!(dims.width, 142.0);
    }

    #[test]
    fn test_malformed_strings_fall_back_to_defaults() {
        for bad in [None, Some(""), Some("not-a-size"), Some("51-18")] {
            let dims = parse_dimensions(bad);
            assert_eq!(dims, DEFAULT_DIMENSIONS, "input {bad:?}");
        }
    }

    #[test]
    fn test_shape_from_label() {
        assert_eq!(FrameShape::from_label("Round Metal"), FrameShape::Round);
        assert_eq!(FrameShape::from_label("cat-eye"), FrameShape::CatEye);
        assert_eq!(FrameShape::from_label("Rectangle"), FrameShape::Rectangular);
        assert_eq!(FrameShape::from_label("wayfarer"), FrameShape::Generic);
    }

    #[test]
    fn test_frame_from_record() {
        let record = FrameRecord {
            skuid: "E10A1012".to_string(),
            name: None,
            dimensions: Some("51-18-142-41".to_string()),
            shape: Some("Aviator".to_string()),
            color: Some("Gunmetal".to_string()),
        };
        let frame = Frame::from_record(&record, "https://cdn.example.com/vto/");
        assert_eq!(frame.name, "E10A1012");
        assert_eq!(frame.width_mm, 142.0);
        assert_eq!(frame.shape, FrameShape::Aviator);
        assert_eq!(
            frame.image_ref,
            "https://cdn.example.com/vto/E10A1012_VTO.png"
        );
    }

    #[test]
    fn test_record_json_shape() {
        let record: FrameRecord = serde_json::from_str(
            r#"{"skuid":"E10A8615","name":"Aero","dimensions":"49-20-138-40","shape":"round","frame_color":"Black"}"#,
        )
        .unwrap();
        assert_eq!(record.color.as_deref(), Some("Black"));
        let frame = Frame::from_record(&record, "/vto");
        assert_eq!(frame.shape, FrameShape::Round);
        assert_eq!(frame.width_mm, 138.0);
    }
}
