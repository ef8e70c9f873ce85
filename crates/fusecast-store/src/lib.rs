//! fusecast-store — SQLite-backed detection store and fusion sink.
//!
//! Detections and fusion records are kept as JSON documents keyed by
//! `(movie_id, frame_num)`, mirroring the document-store layout the
//! detection pipelines write into. Implements the core's
//! [`DetectionStore`] and [`FusionSink`] traits.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

use fusecast_core::{
    DetectionStore, FusionError, FusionRecord, FusionSink, ReidFrame, VisualClues,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("document decode: {0}")]
    Json(#[from] serde_json::Error),
}

/// SQLite store holding REID frames, visual-clues records and fusion output.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if necessary) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn };
        store.init_schema()?;
        tracing::info!(path = %path.as_ref().display(), "detection store opened");
        Ok(store)
    }

    /// In-memory store, used by tests and one-off runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reid_frames (
                 movie_id  TEXT NOT NULL,
                 frame_num INTEGER NOT NULL,
                 doc_json  TEXT NOT NULL,
                 PRIMARY KEY (movie_id, frame_num)
             );
             CREATE TABLE IF NOT EXISTS visual_clues (
                 movie_id  TEXT NOT NULL,
                 frame_num INTEGER NOT NULL,
                 doc_json  TEXT NOT NULL,
                 PRIMARY KEY (movie_id, frame_num)
             );
             CREATE TABLE IF NOT EXISTS fusion (
                 movie_id  TEXT NOT NULL,
                 frame_num INTEGER NOT NULL,
                 doc_json  TEXT NOT NULL,
                 PRIMARY KEY (movie_id, frame_num)
             );",
        )?;
        Ok(())
    }

    /// Seed REID frames for a movie (ingest tooling and tests).
    pub fn put_reid_frames(&self, movie_id: &str, frames: &[ReidFrame]) -> Result<(), StoreError> {
        for frame in frames {
            self.conn.execute(
                "INSERT OR REPLACE INTO reid_frames (movie_id, frame_num, doc_json)
                 VALUES (?1, ?2, ?3)",
                (movie_id, frame.frame_num, serde_json::to_string(frame)?),
            )?;
        }
        Ok(())
    }

    /// Seed one visual-clues record.
    pub fn put_visual_clues(
        &self,
        movie_id: &str,
        frame_num: i64,
        clues: &VisualClues,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO visual_clues (movie_id, frame_num, doc_json)
             VALUES (?1, ?2, ?3)",
            (movie_id, frame_num, serde_json::to_string(clues)?),
        )?;
        Ok(())
    }

    /// Read back a persisted fusion record, if any.
    pub fn get_fusion_record(
        &self,
        movie_id: &str,
        frame_num: i64,
    ) -> Result<Option<FusionRecord>, StoreError> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT doc_json FROM fusion WHERE movie_id = ?1 AND frame_num = ?2",
                (movie_id, frame_num),
                |row| row.get(0),
            )
            .optional()?;

        doc.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    fn fetch_reid_frames_impl(&self, movie_id: &str) -> Result<Vec<ReidFrame>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_json FROM reid_frames WHERE movie_id = ?1 ORDER BY frame_num",
        )?;
        let rows = stmt.query_map([movie_id], |row| row.get::<_, String>(0))?;

        let mut frames = Vec::new();
        for row in rows {
            frames.push(serde_json::from_str(&row?)?);
        }
        Ok(frames)
    }

    fn fetch_visual_clues_impl(
        &self,
        movie_id: &str,
        frame_num: i64,
    ) -> Result<Option<VisualClues>, StoreError> {
        let doc: Option<String> = self
            .conn
            .query_row(
                "SELECT doc_json FROM visual_clues WHERE movie_id = ?1 AND frame_num = ?2",
                (movie_id, frame_num),
                |row| row.get(0),
            )
            .optional()?;

        doc.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }
}

impl DetectionStore for SqliteStore {
    fn fetch_reid_frames(&self, movie_id: &str) -> Result<Vec<ReidFrame>, FusionError> {
        self.fetch_reid_frames_impl(movie_id).map_err(FusionError::store)
    }

    fn fetch_visual_clues(
        &self,
        movie_id: &str,
        frame_num: i64,
    ) -> Result<Option<VisualClues>, FusionError> {
        self.fetch_visual_clues_impl(movie_id, frame_num)
            .map_err(FusionError::store)
    }
}

impl FusionSink for SqliteStore {
    fn persist(&self, record: &FusionRecord) -> Result<(), FusionError> {
        let doc = serde_json::to_string(record)
            .map_err(|e| FusionError::store(StoreError::from(e)))?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO fusion (movie_id, frame_num, doc_json)
                 VALUES (?1, ?2, ?3)",
                (&record.movie_id, record.frame_num, doc),
            )
            .map_err(|e| FusionError::store(StoreError::from(e)))?;

        tracing::debug!(
            movie_id = %record.movie_id,
            frame_num = record.frame_num,
            rois = record.rois.len(),
            "fusion record persisted"
        );
        Ok(())
    }
}
