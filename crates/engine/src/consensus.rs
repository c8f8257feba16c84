//! Approval threshold arithmetic

use hub_ledger::HubError;

/// Absolute number of matching votes needed to resolve a transaction.
///
/// `clamp(ceil(min(percentage, 100) * voters / 100), 1, voters)`, in
/// integer arithmetic. Zero voters and a zero percentage are rejected
/// rather than producing a zero threshold.
///
/// # Example
/// ```
/// use hub_engine::consensus_threshold;
///
/// assert_eq!(consensus_threshold(30, 3).unwrap(), 1);
/// assert_eq!(consensus_threshold(34, 3).unwrap(), 2);
/// assert_eq!(consensus_threshold(101, 3).unwrap(), 3);
/// assert!(consensus_threshold(0, 3).is_err());
/// ```
pub fn consensus_threshold(percentage: u64, voters: usize) -> Result<u64, HubError> {
    if voters == 0 {
        return Err(HubError::InvalidConsensusConfiguration(
            "Transaction request without voters is impossible",
        ));
    }

    let percentage = percentage.min(100);
    if percentage == 0 {
        return Err(HubError::InvalidConsensusConfiguration(
            "Transaction request with zero consensusPercentage is impossible",
        ));
    }

    let voters = voters as u128;
    let threshold = (percentage as u128 * voters).div_ceil(100).clamp(1, voters);
    Ok(threshold as u64)
}
