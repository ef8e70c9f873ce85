use thiserror::Error;

/// Errors produced while fusing one unit of work (a movie).
///
/// A per-unit error aborts that unit's processing; the driver is expected
/// to log it with the unit id and move on to the next unit. EmptyDetections
/// is deliberately NOT an error — a frame with zero faces produces an
/// explicit empty record and the unit continues.
#[derive(Error, Debug)]
pub enum FusionError {
    #[error("no REID frames found for {movie_id}")]
    MissingPrimaryData { movie_id: String },

    #[error("visual clues record missing for {movie_id} frame {frame_num}")]
    MissingCorrelatedData { movie_id: String, frame_num: i64 },

    #[error("malformed bounding box: {0}")]
    MalformedBox(String),

    #[error("detection store: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FusionError {
    /// Wrap a collaborator I/O error.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        FusionError::Store(Box::new(err))
    }
}
