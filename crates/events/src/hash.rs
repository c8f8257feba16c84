//! Hash chain utilities for journal integrity

use crate::error::EventError;
use crate::record::JournalRecord;
use sha2::{Digest, Sha256};
use std::fmt;

/// `prev_hash` of the first record
pub const GENESIS_HASH: &str = "GENESIS";

/// Calculate SHA256 hash of record content (excluding the hash field itself)
pub fn calculate_record_hash(record: &JournalRecord) -> Result<String, EventError> {
    let mut hasher = Sha256::new();

    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.timestamp.to_rfc3339().as_bytes());
    hasher.update(record.correlation_id.as_bytes());
    hasher.update(record.caller.as_bytes());
    hasher.update(serde_json::to_vec(&record.call)?);
    hasher.update(serde_json::to_vec(&record.events)?);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify hash chain integrity
pub fn verify_chain(records: &[JournalRecord]) -> Result<(), ChainError> {
    let mut prev_hash = GENESIS_HASH.to_string();
    let mut expected_sequence = 1;

    for record in records {
        if record.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            });
        }

        if record.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: record.sequence,
                expected: prev_hash,
                actual: record.prev_hash.clone(),
            });
        }

        let calculated = calculate_record_hash(record).map_err(|e| ChainError::Unhashable {
            sequence: record.sequence,
            reason: e.to_string(),
        })?;
        if record.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: record.sequence,
                expected: calculated,
                actual: record.hash.clone(),
            });
        }

        prev_hash = record.hash.clone();
        expected_sequence += 1;
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },
    InvalidSequence {
        expected: u64,
        actual: u64,
    },
    Unhashable {
        sequence: u64,
        reason: String,
    },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::BrokenLink {
                sequence,
                expected,
                actual,
            } => write!(
                f,
                "Broken link at seq {}: expected prev_hash '{}', got '{}'",
                sequence, expected, actual
            ),
            ChainError::InvalidHash {
                sequence,
                expected,
                actual,
            } => write!(
                f,
                "Invalid hash at seq {}: expected '{}', got '{}'",
                sequence, expected, actual
            ),
            ChainError::InvalidSequence { expected, actual } => {
                write!(f, "Invalid sequence: expected {}, got {}", expected, actual)
            }
            ChainError::Unhashable { sequence, reason } => {
                write!(f, "Cannot hash record at seq {}: {}", sequence, reason)
            }
        }
    }
}

impl std::error::Error for ChainError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::Call;
    use chrono::Utc;
    use hub_core::{Address, Amount};

    fn chain(n: u64) -> Vec<JournalRecord> {
        let mut records = Vec::new();
        let mut prev_hash = GENESIS_HASH.to_string();
        for sequence in 1..=n {
            let mut record = JournalRecord {
                sequence,
                prev_hash: prev_hash.clone(),
                hash: String::new(),
                timestamp: Utc::now(),
                correlation_id: format!("corr-{}", sequence),
                caller: Address::from_low_u8(1),
                call: Call::Receive {
                    value: Amount::new(sequence as u128),
                },
                events: Vec::new(),
            };
            record.hash = calculate_record_hash(&record).unwrap();
            prev_hash = record.hash.clone();
            records.push(record);
        }
        records
    }

    #[test]
    fn test_valid_chain() {
        assert!(verify_chain(&chain(3)).is_ok());
        assert!(verify_chain(&[]).is_ok());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let records = chain(1);
        assert_eq!(calculate_record_hash(&records[0]).unwrap(), records[0].hash);
        assert_eq!(records[0].hash.len(), 64);
    }

    #[test]
    fn test_tampered_call_detected() {
        let mut records = chain(3);
        records[1].call = Call::Receive {
            value: Amount::new(1_000_000),
        };
        assert!(matches!(
            verify_chain(&records),
            Err(ChainError::InvalidHash { sequence: 2, .. })
        ));
    }

    #[test]
    fn test_dropped_record_detected() {
        let mut records = chain(3);
        records.remove(1);
        assert!(matches!(
            verify_chain(&records),
            Err(ChainError::InvalidSequence { expected: 2, actual: 3 })
        ));
    }
}
