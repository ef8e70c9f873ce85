//! Candidate generation: pair every face box with every person ROI whose
//! containment score clears the threshold.

use crate::error::FusionError;
use crate::geometry;
use crate::types::{Candidate, FaceDetection, PersonRoi};

/// Default overlap threshold. Deliberately strict: only near-full
/// containment of the face box inside the person box qualifies.
pub const OVERLAP_THRESHOLD: f64 = 0.97;

/// Build all (face, person) candidates for one frame.
///
/// O(F×R) over the frame's detections — F and R are a handful of people
/// per frame, no indexing needed. Output order is generation order (faces
/// outer, ROIs inner); the conflict resolver's tie-breaks depend on it.
///
/// Every box is validated first: a malformed box is fatal for the whole
/// frame's candidate generation rather than a silent zero score.
pub fn generate_candidates(
    faces: &[FaceDetection],
    rois: &[PersonRoi],
    threshold: f64,
) -> Result<Vec<Candidate>, FusionError> {
    for face in faces {
        face.bbox.validate()?;
    }
    for roi in rois {
        roi.bbox.validate()?;
    }

    let mut candidates = Vec::new();
    for face in faces {
        for roi in rois {
            let score = geometry::containment_score(&face.bbox, &roi.bbox);
            if score > threshold {
                let candidate = Candidate {
                    face_id: face.id.clone(),
                    roi_id: roi.roi_id.clone(),
                    face_bbox: face.bbox,
                    person_bbox: roi.bbox,
                    score,
                    smallest_area: geometry::smallest_area(&face.bbox, &roi.bbox),
                    iou: geometry::union_iou(&face.bbox, &roi.bbox),
                };
                tracing::debug!(
                    face_id = %candidate.face_id,
                    roi_id = %candidate.roi_id,
                    score,
                    iou = candidate.iou,
                    "candidate above threshold"
                );
                candidates.push(candidate);
            }
        }
    }

    Ok(candidates)
}
