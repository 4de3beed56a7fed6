//! Candidate frame selection against the measured face width.

use crate::config::SelectionConfig;
use crate::frame::Frame;
use log::debug;

/// Catalog subset split into best matches and the rest
#[derive(Debug, Clone, Default)]
pub struct FrameSelection {
    pub best: Vec<Frame>,
    pub other: Vec<Frame>,
}

/// Whether a frame width is close enough to the face width to flag as best
#[must_use]
pub fn is_best_match(frame_width_mm: f64, face_width_mm: f64, tolerance_mm: f64) -> bool {
    (frame_width_mm - face_width_mm).abs() <= tolerance_mm
}

/// Split a catalog subset into best matches vs. the rest.
///
/// Without a usable face width there is nothing to match against: everything
/// lands in `other` and browsing continues unranked.
#[must_use]
pub fn select(catalog: &[Frame], face_width_mm: f64, config: &SelectionConfig) -> FrameSelection {
    if face_width_mm <= 0.0 {
        return FrameSelection {
            best: Vec::new(),
            other: catalog.to_vec(),
        };
    }

    let mut selection = FrameSelection::default();
    for frame in catalog {
        if is_best_match(frame.width_mm, face_width_mm, config.best_match_tolerance_mm) {
            selection.best.push(frame.clone());
        } else {
            selection.other.push(frame.clone());
        }
    }
    selection
}

/// Build the default candidate list: frames whose width falls in
/// [face, face + window] mm. When nothing matches, fall back to the supplied
/// default set; browsing must never dead-end on an empty list.
#[must_use]
pub fn candidate_frames(
    catalog: Vec<Frame>,
    face_width_mm: f64,
    defaults: Vec<Frame>,
    config: &SelectionConfig,
) -> Vec<Frame> {
    let width = if face_width_mm > 0.0 {
        face_width_mm
    } else {
        config.fallback_face_width_mm
    };
    let max_width = width + config.candidate_window_mm;

    let filtered: Vec<Frame> = catalog
        .into_iter()
        .filter(|frame| frame.width_mm >= width && frame.width_mm <= max_width)
        .collect();

    if filtered.is_empty() {
        debug!("no catalog frame in [{width}, {max_width}] mm, falling back to default set");
        defaults
    } else {
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::default_frames;

    fn frame_of_width(id: &str, width_mm: f64) -> Frame {
        let mut frame = default_frames().remove(0);
        frame.id = id.to_string();
        frame.width_mm = width_mm;
        frame
    }

    #[test]
    fn test_best_match_boundary_is_inclusive() {
        let config = SelectionConfig::default();
        let catalog = vec![
            frame_of_width("at-bound", 138.0),    // face + 8.0
            frame_of_width("past-bound", 138.01), // face + 8.01
            frame_of_width("below", 122.0),       // face - 8.0
        ];
        let selection = select(&catalog, 130.0, &config);
        let best_ids: Vec<&str> = selection.best.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(best_ids, ["at-bound", "below"]);
        assert_eq!(selection.other.len(), 1);
        assert_eq!(selection.other[0].id, "past-bound");
    }

    #[test]
    fn test_no_measurement_ranks_nothing() {
        let config = SelectionConfig::default();
        let catalog = vec![frame_of_width("a", 130.0)];
        let selection = select(&catalog, 0.0, &config);
        assert!(selection.best.is_empty());
        assert_eq!(selection.other.len(), 1);
    }

    #[test]
    fn test_candidate_window() {
        let config = SelectionConfig::default();
        let catalog = vec![
            frame_of_width("too-narrow", 129.0),
            frame_of_width("lower-edge", 130.0),
            frame_of_width("upper-edge", 145.0),
            frame_of_width("too-wide", 146.0),
        ];
        let candidates = candidate_frames(catalog, 130.0, default_frames(), &config);
        let ids: Vec<&str> = candidates.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["lower-edge", "upper-edge"]);
    }

    #[test]
    fn test_empty_window_falls_back_to_defaults() {
        let config = SelectionConfig::default();
        let catalog = vec![frame_of_width("way-off", 90.0)];
        let candidates = candidate_frames(catalog, 130.0, default_frames(), &config);
        assert_eq!(candidates.len(), default_frames().len());
    }

    #[test]
    fn test_missing_measurement_uses_fallback_width() {
        let config = SelectionConfig::default();
        let catalog = vec![
            frame_of_width("fits-fallback", 135.0), // in [130, 145]
            frame_of_width("out", 100.0),
        ];
        let candidates = candidate_frames(catalog, 0.0, default_frames(), &config);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "fits-fallback");
    }
}
