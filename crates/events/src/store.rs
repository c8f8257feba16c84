//! JSONL journal store - append-only segment writer
//!
//! Every store lifetime writes one segment file named after the sequence of
//! its first record, zero-padded, so file-name order is sequence order no
//! matter what the wall clock did in between.

use crate::error::EventError;
use crate::record::JournalRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Segment file holding records starting at `first_sequence`
pub fn segment_file_name(first_sequence: u64) -> String {
    format!("{:020}.jsonl", first_sequence)
}

/// Append-only JSONL journal writer
pub struct JournalStore {
    dir: PathBuf,
    segment: Option<BufWriter<File>>,
}

impl JournalStore {
    /// Prepare a store in `dir`. The segment file is created on first append.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, EventError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, segment: None })
    }

    /// Append a record and flush it to disk
    pub fn append(&mut self, record: &JournalRecord) -> Result<(), EventError> {
        let json = serde_json::to_string(record)?;

        if self.segment.is_none() {
            let path = self.dir.join(segment_file_name(record.sequence));
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            self.segment = Some(BufWriter::new(file));
        }

        if let Some(writer) = self.segment.as_mut() {
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_names_sort_by_sequence() {
        let mut names = vec![segment_file_name(120), segment_file_name(9), segment_file_name(1)];
        names.sort();
        assert_eq!(
            names,
            vec![segment_file_name(1), segment_file_name(9), segment_file_name(120)]
        );
        assert_eq!(segment_file_name(1), "00000000000000000001.jsonl");
    }

    #[test]
    fn test_no_file_until_first_append() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let _store = JournalStore::new(temp_dir.path()).unwrap();
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
