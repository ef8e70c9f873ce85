use serde::{Deserialize, Serialize};

use crate::error::FusionError;

/// Sentinel face id marking a person ROI with no matching face.
pub const UNMATCHED_FACE_ID: &str = "-1";

/// Substring a visual-clues ROI label must contain to be fusion-eligible.
pub const PERSON_LABEL: &str = "person";

/// Axis-aligned bounding box in image pixel coordinates.
///
/// `x1 < x2` and `y1 < y2` by convention, but not enforced: degenerate
/// boxes are possible input and yield zero area in the geometry metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Parse the visual-clues wire form: a bracketed, comma-delimited
    /// string of four floats, e.g. `"[12.0, 34.5, 120.0, 250.0]"`.
    pub fn parse(raw: &str) -> Result<Self, FusionError> {
        let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
        let coords: Vec<f64> = trimmed
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| FusionError::MalformedBox(format!("non-numeric coordinate in {raw:?}")))?;

        if coords.len() != 4 {
            return Err(FusionError::MalformedBox(format!(
                "expected 4 coordinates, got {} in {raw:?}",
                coords.len()
            )));
        }

        let bbox = Self::new(coords[0], coords[1], coords[2], coords[3]);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Reject non-finite coordinates. A NaN or infinity must surface as a
    /// defined error before it can silently poison the overlap metrics.
    pub fn validate(&self) -> Result<(), FusionError> {
        let coords = [self.x1, self.y1, self.x2, self.y2];
        if coords.iter().all(|c| c.is_finite()) {
            Ok(())
        } else {
            Err(FusionError::MalformedBox(format!(
                "non-finite coordinate in {coords:?}"
            )))
        }
    }

    /// Value-equality key for hash maps. Boxes are compared as coordinate
    /// tuples, never by detection identity.
    pub fn bits(&self) -> [u64; 4] {
        [
            self.x1.to_bits(),
            self.y1.to_bits(),
            self.x2.to_bits(),
            self.y2.to_bits(),
        ]
    }
}

/// One labeled face box from the REID stream. Unique per frame by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceDetection {
    pub id: String,
    pub bbox: BBox,
    pub actor_name: Option<String>,
}

/// One frame of REID detections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReidFrame {
    pub frame_num: i64,
    pub faces: Vec<FaceDetection>,
}

/// Raw visual-clues ROI as stored: bbox still in wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualClueRoi {
    pub roi_id: String,
    /// Bracketed comma-delimited coordinate string, parsed by [`BBox::parse`].
    pub bbox: String,
    pub bbox_object: String,
}

/// Visual-clues record for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualClues {
    pub url: String,
    pub rois: Vec<VisualClueRoi>,
}

impl VisualClues {
    /// Person-labeled ROIs with their boxes parsed. A malformed box is
    /// fatal for the frame — no partial candidate generation.
    pub fn person_rois(&self) -> Result<Vec<PersonRoi>, FusionError> {
        self.rois
            .iter()
            .filter(|roi| roi.bbox_object.contains(PERSON_LABEL))
            .map(|roi| {
                Ok(PersonRoi {
                    roi_id: roi.roi_id.clone(),
                    bbox: BBox::parse(&roi.bbox)?,
                    label: roi.bbox_object.clone(),
                })
            })
            .collect()
    }
}

/// A fusion-eligible person ROI, parsed and filtered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRoi {
    pub roi_id: String,
    pub bbox: BBox,
    pub label: String,
}

/// A (face, person) pairing above the overlap threshold. Ephemeral:
/// exists only while resolving one frame.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub face_id: String,
    pub roi_id: String,
    pub face_bbox: BBox,
    pub person_bbox: BBox,
    /// Containment score that admitted this pair.
    pub score: f64,
    /// Area of the smaller box — matching-confidence proxy.
    pub smallest_area: f64,
    /// Plain IoU, kept for diagnostics.
    pub iou: f64,
}

/// One matched (or explicitly unmatched) person ROI in a fusion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiEntry {
    pub face_id: String,
    pub vc_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reid_name: Option<String>,
}

/// Per-frame fusion output, keyed by `(movie_id, frame_num)`.
///
/// Created fresh per frame, immutable once assembled, superseded (not
/// merged) when fusion is re-run for the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionRecord {
    pub movie_id: String,
    pub frame_num: i64,
    pub rois: Vec<RoiEntry>,
    pub face_ids_not_matched: Vec<String>,
}
