//! Frame assembly: combine the resolved match set with the frame's full
//! id sets into the final [`FusionRecord`].

use std::collections::HashMap;

use crate::types::{Candidate, FaceDetection, FusionRecord, RoiEntry, UNMATCHED_FACE_ID};

/// Read-only identity-to-actor-name lookup.
///
/// Passed into assembly rather than held as ambient global state so the
/// core stays a pure function of its inputs.
pub trait ActorDirectory {
    fn actor_name_for(&self, face_id: &str) -> Option<String>;
}

impl ActorDirectory for HashMap<String, String> {
    fn actor_name_for(&self, face_id: &str) -> Option<String> {
        self.get(face_id).cloned()
    }
}

/// Empty directory for callers without a name table.
pub struct NoDirectory;

impl ActorDirectory for NoDirectory {
    fn actor_name_for(&self, _face_id: &str) -> Option<String> {
        None
    }
}

/// Assemble the per-frame fusion record.
///
/// Matched pairs are emitted in resolution order, then every unconsumed
/// person ROI as a sentinel entry, and every unconsumed face id goes to
/// `face_ids_not_matched`. A frame with zero face detections yields a
/// record whose person ROIs are all sentinel entries — "fusion ran,
/// nothing to fuse", distinct from a missing record. Pure and idempotent.
pub fn assemble_frame(
    movie_id: &str,
    frame_num: i64,
    resolved: &[Candidate],
    faces: &[FaceDetection],
    person_roi_ids: &[String],
    directory: &dyn ActorDirectory,
) -> FusionRecord {
    let mut remaining_faces: Vec<String> = faces.iter().map(|f| f.id.clone()).collect();
    let mut remaining_rois: Vec<String> = person_roi_ids.to_vec();

    let mut rois = Vec::with_capacity(person_roi_ids.len());
    for matched in resolved {
        remaining_faces.retain(|id| id != &matched.face_id);
        remaining_rois.retain(|id| id != &matched.roi_id);

        // The REID stream's own label wins; the external directory is the
        // fallback for faces it never named.
        let reid_name = faces
            .iter()
            .find(|f| f.id == matched.face_id)
            .and_then(|f| f.actor_name.clone())
            .or_else(|| directory.actor_name_for(&matched.face_id));

        rois.push(RoiEntry {
            face_id: matched.face_id.clone(),
            vc_id: matched.roi_id.clone(),
            reid_name,
        });
    }

    for vc_id in remaining_rois {
        rois.push(RoiEntry {
            face_id: UNMATCHED_FACE_ID.to_string(),
            vc_id,
            reid_name: None,
        });
    }

    FusionRecord {
        movie_id: movie_id.to_string(),
        frame_num,
        rois,
        face_ids_not_matched: remaining_faces,
    }
}
