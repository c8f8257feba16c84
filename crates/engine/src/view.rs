//! Read-only snapshots returned by the query operations

use hub_core::{Address, Amount, Title, TxStatus, VoteStatus};
use hub_ledger::{Profile, Transaction};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AccountView {
    pub balance: Amount,
    pub profiles_size: usize,
}

/// Profile summary. Unknown and removed ids read as the all-zero default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProfileView {
    pub owner: Address,
    pub title: Title,
    pub consensus_percentage: u64,
    pub requesters_size: usize,
    pub voters_size: usize,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            owner: profile.owner(),
            title: profile.title(),
            consensus_percentage: profile.consensus_percentage(),
            requesters_size: profile.requesters().len(),
            voters_size: profile.voters().len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    pub account: Address,
    pub by: Address,
    pub to: Address,
    pub amount: Amount,
    pub consensus: u64,
    pub status: TxStatus,
    pub approval_count: u64,
    pub reject_count: u64,
    pub voters_size: usize,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            account: tx.account(),
            by: tx.by(),
            to: tx.to(),
            amount: tx.amount(),
            consensus: tx.consensus(),
            status: tx.status(),
            approval_count: tx.approval_count(),
            reject_count: tx.reject_count(),
            voters_size: tx.voters().len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoterView {
    pub addr: Address,
    pub status: VoteStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_profile_json() {
        let json = serde_json::to_value(ProfileView::default()).unwrap();
        assert_eq!(json["owner"], format!("0x{}", "0".repeat(40)));
        assert_eq!(json["consensus_percentage"], 0);
        assert_eq!(json["voters_size"], 0);
    }

    #[test]
    fn test_transaction_json_uses_names() {
        let view = TransactionView {
            account: Address::from_low_u8(1),
            by: Address::from_low_u8(2),
            to: Address::from_low_u8(3),
            amount: Amount::new(25),
            consensus: 2,
            status: TxStatus::Pending,
            approval_count: 1,
            reject_count: 0,
            voters_size: 3,
        };
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["amount"], "25");
    }
}
