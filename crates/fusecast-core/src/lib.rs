//! fusecast-core — Face/person bounding-box fusion engine.
//!
//! Reconciles two pre-computed per-frame detection streams — REID face
//! boxes and "visual clues" person ROIs — into a one-to-one (or explicitly
//! unmatched) assignment per frame. Pure and synchronous; persistence is
//! behind the [`pipeline::DetectionStore`] and [`pipeline::FusionSink`]
//! traits.

pub mod assembler;
pub mod candidates;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod resolver;
pub mod types;

pub use assembler::ActorDirectory;
pub use error::FusionError;
pub use pipeline::{DetectionStore, FusionConfig, FusionSink, FusionSummary};
pub use types::{
    BBox, Candidate, FaceDetection, FusionRecord, PersonRoi, ReidFrame, RoiEntry, VisualClues,
    UNMATCHED_FACE_ID,
};
