//! Transaction ledger - withdrawal requests and their votes
//!
//! Transactions are append-only: ids are dense and never reused, and once
//! a transaction leaves `Pending` its record is frozen.
//!
//! Voting is split in two phases so the engine can keep every call
//! all-or-nothing: `prepare_vote` validates and computes the outcome
//! without writing, `commit_vote` applies a prepared plan and cannot fail.

use crate::error::HubError;
use hub_core::{Address, Amount, IndexedSet, TxId, TxStatus, VoteStatus};
use std::collections::HashMap;

/// Input for `TransactionLedger::create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Funding account
    pub account: Address,
    /// Requester
    pub by: Address,
    /// Recipient
    pub to: Address,
    pub amount: Amount,
    /// Absolute number of matching votes that resolves the transaction
    pub consensus: u64,
    /// Voter set of the profile at request time, in profile order
    pub voters: Vec<Address>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    id: TxId,
    account: Address,
    by: Address,
    to: Address,
    amount: Amount,
    consensus: u64,
    status: TxStatus,
    approval_count: u64,
    reject_count: u64,
    voters: IndexedSet<Address>,
    votes: HashMap<Address, VoteStatus>,
}

impl Transaction {
    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn by(&self) -> Address {
        self.by
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn consensus(&self) -> u64 {
        self.consensus
    }

    pub fn status(&self) -> TxStatus {
        self.status
    }

    pub fn approval_count(&self) -> u64 {
        self.approval_count
    }

    pub fn reject_count(&self) -> u64 {
        self.reject_count
    }

    pub fn voters(&self) -> &IndexedSet<Address> {
        &self.voters
    }

    /// Current decision of `voter`, or None if not eligible
    pub fn vote_of(&self, voter: &Address) -> Option<VoteStatus> {
        self.votes.get(voter).copied()
    }

    /// Voter at snapshot position `idx` with their current decision
    pub fn voter_at(&self, idx: usize) -> Option<(Address, VoteStatus)> {
        let voter = *self.voters.get(idx)?;
        let status = self.vote_of(&voter).unwrap_or(VoteStatus::Unset);
        Some((voter, status))
    }

    /// Every address whose transaction index lists this transaction
    fn participants(&self) -> impl Iterator<Item = Address> + '_ {
        [self.account, self.by, self.to]
            .into_iter()
            .chain(self.voters.iter().copied())
    }
}

/// Validated, not yet applied vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotePlan {
    pub tx_id: TxId,
    pub voter: Address,
    pub decision: VoteStatus,
    pub account: Address,
    pub by: Address,
    pub to: Address,
    pub amount: Amount,
    /// Counters after this vote
    pub approval_count: u64,
    pub reject_count: u64,
    /// Terminal status this vote triggers, if any
    pub resolution: Option<TxStatus>,
}

/// Owner of every `Transaction` plus the per-address index
#[derive(Debug, Default)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
    by_address: HashMap<Address, IndexedSet<TxId>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next `create` will hand out
    pub fn last_uid(&self) -> TxId {
        TxId(self.transactions.len() as u64)
    }

    pub fn get(&self, id: &TxId) -> Option<&Transaction> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.transactions.get(idx))
    }

    fn get_mut(&mut self, id: &TxId) -> Option<&mut Transaction> {
        usize::try_from(id.0)
            .ok()
            .and_then(|idx| self.transactions.get_mut(idx))
    }

    /// Store a new pending transaction and index it under every participant
    pub fn create(&mut self, new: NewTransaction) -> TxId {
        let id = self.last_uid();

        let mut voters = IndexedSet::new();
        let mut votes = HashMap::new();
        for voter in new.voters {
            if voters.insert(voter) {
                votes.insert(voter, VoteStatus::Pending);
            }
        }

        let tx = Transaction {
            id,
            account: new.account,
            by: new.by,
            to: new.to,
            amount: new.amount,
            consensus: new.consensus,
            status: TxStatus::Pending,
            approval_count: 0,
            reject_count: 0,
            voters,
            votes,
        };

        for address in tx.participants() {
            self.by_address.entry(address).or_default().insert(id);
        }
        self.transactions.push(tx);
        id
    }

    /// Number of transactions touching `address`
    pub fn tx_size(&self, address: &Address) -> usize {
        self.by_address.get(address).map(IndexedSet::len).unwrap_or(0)
    }

    /// Transaction id at position `idx` of `address`'s index
    pub fn tx_at(&self, address: &Address, idx: usize) -> Result<TxId, HubError> {
        self.by_address
            .get(address)
            .and_then(|ids| ids.get(idx))
            .copied()
            .ok_or_else(|| HubError::not_found("Transaction at index"))
    }

    /// Size of the voter snapshot of `id`
    pub fn voters_size(&self, id: &TxId) -> Result<usize, HubError> {
        self.get(id)
            .map(|tx| tx.voters.len())
            .ok_or_else(|| HubError::not_found("Transaction"))
    }

    /// Voter at snapshot position `idx` of `id`
    pub fn voter_at(&self, id: &TxId, idx: usize) -> Result<(Address, VoteStatus), HubError> {
        self.get(id)
            .and_then(|tx| tx.voter_at(idx))
            .ok_or_else(|| HubError::not_found("Voter at index"))
    }

    /// Validate a vote and compute its effect without writing anything.
    ///
    /// Checks run in this order: transaction exists, voter is eligible,
    /// voting is open, voter has not voted, decision is Approve/Reject.
    pub fn prepare_vote(
        &self,
        id: &TxId,
        voter: &Address,
        decision: VoteStatus,
    ) -> Result<VotePlan, HubError> {
        let tx = self.get(id).ok_or_else(|| HubError::not_found("Transaction"))?;
        let current = tx.vote_of(voter).ok_or(HubError::PermissionDenied)?;

        if tx.status.is_terminal() {
            return Err(HubError::VotingClosed);
        }
        if current != VoteStatus::Pending {
            return Err(HubError::DuplicateVote);
        }
        if !decision.is_decision() {
            return Err(HubError::InvalidVoteValue(decision));
        }

        let (approval_count, reject_count) = if decision == VoteStatus::Approve {
            (tx.approval_count + 1, tx.reject_count)
        } else {
            (tx.approval_count, tx.reject_count + 1)
        };

        let resolution = if approval_count == tx.consensus {
            Some(TxStatus::Approved)
        } else if reject_count == tx.consensus {
            Some(TxStatus::Rejected)
        } else {
            None
        };

        Ok(VotePlan {
            tx_id: tx.id,
            voter: *voter,
            decision,
            account: tx.account,
            by: tx.by,
            to: tx.to,
            amount: tx.amount,
            approval_count,
            reject_count,
            resolution,
        })
    }

    /// Apply a plan produced by `prepare_vote` against the current state
    pub fn commit_vote(&mut self, plan: &VotePlan) {
        if let Some(tx) = self.get_mut(&plan.tx_id) {
            tx.votes.insert(plan.voter, plan.decision);
            tx.approval_count = plan.approval_count;
            tx.reject_count = plan.reject_count;
            if let Some(status) = plan.resolution {
                tx.status = status;
            }
        }
    }

    /// `prepare_vote` followed by `commit_vote`
    pub fn record_vote(
        &mut self,
        id: &TxId,
        voter: &Address,
        decision: VoteStatus,
    ) -> Result<VotePlan, HubError> {
        let plan = self.prepare_vote(id, voter, decision)?;
        self.commit_vote(&plan);
        Ok(plan)
    }
}
