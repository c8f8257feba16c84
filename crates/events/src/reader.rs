//! JSONL journal reader - sequential reader for replay

use crate::error::EventError;
use crate::record::JournalRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// First sequence of a segment file, from its name
fn segment_sequence(path: &Path) -> Option<u64> {
    if path.extension()? != "jsonl" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

/// Sequential journal reader for replay and audit
pub struct JournalReader {
    files: Vec<PathBuf>,
}

impl JournalReader {
    /// Collect the segment files of a directory (missing directory = empty journal).
    /// Files that are not `<sequence>.jsonl` segments are ignored.
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let file_path = entry?.path();
                if let Some(first) = segment_sequence(&file_path) {
                    files.push((first, file_path));
                }
            }
        }

        files.sort();
        let files = files.into_iter().map(|(_, file)| file).collect();

        Ok(Self { files })
    }

    /// Journal files in replay order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read all records from all segments in sequence order
    pub fn read_all(&self) -> Result<Vec<JournalRecord>, EventError> {
        let mut records = Vec::new();

        for file_path in &self.files {
            let file = File::open(file_path)?;
            let reader = BufReader::new(file);

            for (idx, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: JournalRecord =
                    serde_json::from_str(&line).map_err(|e| EventError::InvalidFile {
                        file: file_path.display().to_string(),
                        line: idx + 1,
                        reason: e.to_string(),
                    })?;
                records.push(record);
            }
        }

        Ok(records)
    }
}
