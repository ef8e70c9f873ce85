//! Flat-file cast list: line N holds the actor name for face id N.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use fusecast_core::ActorDirectory;

/// Actor-name lookup loaded from a plain text file, one name per line.
/// Face ids are the zero-based line numbers, matching the id space the
/// REID pipeline was trained against.
#[derive(Debug, Default)]
pub struct CastList {
    names: HashMap<String, String>,
}

impl CastList {
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let list = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.as_ref().display(),
            entries = list.names.len(),
            "cast list loaded"
        );
        Ok(list)
    }

    pub fn from_reader(reader: impl BufRead) -> std::io::Result<Self> {
        let mut names = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let name = line?.trim_end().to_string();
            if !name.is_empty() {
                names.insert(idx.to_string(), name);
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl ActorDirectory for CastList {
    fn actor_name_for(&self, face_id: &str) -> Option<String> {
        self.names.get(face_id).cloned()
    }
}
