//! Fusion orchestrator: run candidate generation, conflict resolution and
//! frame assembly over every REID frame of one unit of work (a movie).

use std::time::{Duration, Instant};

use crate::assembler::{self, ActorDirectory};
use crate::candidates::{self, OVERLAP_THRESHOLD};
use crate::error::FusionError;
use crate::resolver;
use crate::types::{Candidate, FaceDetection, FusionRecord, ReidFrame, VisualClues};

/// Read side of the external detection store.
pub trait DetectionStore {
    /// All REID frames recorded for a movie, ordered by frame number.
    /// An empty result means fusion cannot run for the unit.
    fn fetch_reid_frames(&self, movie_id: &str) -> Result<Vec<ReidFrame>, FusionError>;

    /// The visual-clues record for one frame, if present.
    fn fetch_visual_clues(
        &self,
        movie_id: &str,
        frame_num: i64,
    ) -> Result<Option<VisualClues>, FusionError>;
}

/// Write side: persist one fusion record per frame, overwriting any record
/// already stored under the same `(movie_id, frame_num)` key.
pub trait FusionSink {
    fn persist(&self, record: &FusionRecord) -> Result<(), FusionError>;
}

/// Tunables for one fusion run.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    pub overlap_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: OVERLAP_THRESHOLD,
        }
    }
}

/// Outcome of a successful unit of work.
#[derive(Debug)]
pub struct FusionSummary {
    pub frames_fused: usize,
    pub faces_matched: usize,
    pub elapsed: Duration,
}

/// Intermediate per-frame state between the resolution and assembly passes.
struct FrameResolution {
    frame_num: i64,
    faces: Vec<FaceDetection>,
    person_roi_ids: Vec<String>,
    resolved: Vec<Candidate>,
}

/// Fuse every REID frame of one movie and persist a record per frame.
///
/// Frames are independent units; no state is carried across them. The unit
/// aborts — with nothing persisted — when the movie has no REID frames or
/// when any REID frame lacks its visual-clues counterpart: a partially
/// fused movie would be indistinguishable from a complete one.
pub fn run_fusion<S, K, D>(
    store: &S,
    sink: &K,
    directory: &D,
    config: &FusionConfig,
    movie_id: &str,
) -> Result<FusionSummary, FusionError>
where
    S: DetectionStore + ?Sized,
    K: FusionSink + ?Sized,
    D: ActorDirectory,
{
    let start = Instant::now();
    tracing::info!(movie_id, "starting fusion");

    let reid_frames = store.fetch_reid_frames(movie_id)?;
    if reid_frames.is_empty() {
        return Err(FusionError::MissingPrimaryData {
            movie_id: movie_id.to_string(),
        });
    }

    // First pass: generate and resolve candidates per frame. Any missing
    // correlated record aborts before a single write happens.
    let mut resolutions = Vec::with_capacity(reid_frames.len());
    for frame in reid_frames {
        let clues = store
            .fetch_visual_clues(movie_id, frame.frame_num)?
            .ok_or_else(|| FusionError::MissingCorrelatedData {
                movie_id: movie_id.to_string(),
                frame_num: frame.frame_num,
            })?;

        let person_rois = clues.person_rois()?;
        let candidates =
            candidates::generate_candidates(&frame.faces, &person_rois, config.overlap_threshold)?;
        let resolved = resolver::resolve_conflicts(candidates);

        tracing::debug!(
            movie_id,
            frame_num = frame.frame_num,
            faces = frame.faces.len(),
            persons = person_rois.len(),
            matches = resolved.len(),
            "frame resolved"
        );

        resolutions.push(FrameResolution {
            frame_num: frame.frame_num,
            faces: frame.faces,
            person_roi_ids: person_rois.into_iter().map(|r| r.roi_id).collect(),
            resolved,
        });
    }

    // Second pass: assemble and persist one record per frame.
    let mut faces_matched = 0;
    let frames_fused = resolutions.len();
    for frame in resolutions {
        let record = assembler::assemble_frame(
            movie_id,
            frame.frame_num,
            &frame.resolved,
            &frame.faces,
            &frame.person_roi_ids,
            directory,
        );
        faces_matched += frame.resolved.len();
        sink.persist(&record)?;
    }

    let elapsed = start.elapsed();
    tracing::info!(movie_id, frames_fused, faces_matched, ?elapsed, "fusion complete");

    Ok(FusionSummary {
        frames_fused,
        faces_matched,
        elapsed,
    })
}
