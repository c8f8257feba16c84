//! Hub - the ledger state and every operation on it

use crate::consensus::consensus_threshold;
use crate::receipt::{Outcome, Receipt};
use crate::view::{AccountView, ProfileView, TransactionView, VoterView};
use hub_core::{Address, Amount, ProfileId, Role, Title, TxId, TxStatus, VoteStatus};
use hub_events::{Call, HubEvent};
use hub_ledger::{AccountLedger, HubError, NewTransaction, ProfileStore, TransactionLedger};
use tracing::{debug, info};

/// Accounts, profiles and transactions of one hub.
///
/// Mutating methods take the authenticated caller explicitly and return a
/// `Receipt` carrying the emitted events.
#[derive(Debug, Default)]
pub struct Hub {
    accounts: AccountLedger,
    profiles: ProfileStore,
    transactions: TransactionLedger,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    // === Accounts ===

    /// Credit `value` to `account`. Returns the new balance.
    pub fn receive_amount(&mut self, account: Address, value: Amount) -> Result<Receipt<Amount>, HubError> {
        let balance = self.accounts.deposit(account, value)?;
        debug!(%account, %value, %balance, "Deposit received");
        Ok(Receipt::new(balance))
    }

    /// Bare value transfer: credited to the sender
    pub fn receive(&mut self, caller: Address, value: Amount) -> Result<Receipt<Amount>, HubError> {
        self.receive_amount(caller, value)
    }

    pub fn account(&self, address: &Address) -> AccountView {
        AccountView {
            balance: self.accounts.balance(address),
            profiles_size: self.accounts.profiles_size(address),
        }
    }

    // === Profiles ===

    /// Create an empty profile owned by the caller
    pub fn add_profile(&mut self, caller: Address) -> Result<Receipt<ProfileId>, HubError> {
        let id = self.profiles.create(&mut self.accounts, caller)?;
        debug!(owner = %caller, profile_id = %id, "Profile created");
        Ok(Receipt::new(id))
    }

    pub fn profile_id_at(&self, address: &Address, idx: usize) -> Result<ProfileId, HubError> {
        self.accounts.profile_id_at(address, idx)
    }

    pub fn edit_profile(
        &mut self,
        caller: Address,
        profile_id: ProfileId,
        title: Title,
        consensus_percentage: u64,
    ) -> Result<Receipt<()>, HubError> {
        self.profiles
            .edit(&profile_id, &caller, title, consensus_percentage)?;
        debug!(%profile_id, %title, consensus_percentage, "Profile edited");
        Ok(Receipt::new(()))
    }

    pub fn remove_profile(&mut self, caller: Address, profile_id: ProfileId) -> Result<Receipt<()>, HubError> {
        self.profiles
            .remove(&mut self.accounts, &profile_id, &caller)?;
        debug!(owner = %caller, %profile_id, "Profile removed");
        Ok(Receipt::new(()))
    }

    pub fn profile(&self, profile_id: &ProfileId) -> ProfileView {
        self.profiles
            .get(profile_id)
            .map(ProfileView::from)
            .unwrap_or_default()
    }

    /// Grant `role` to `user`. Returns false when `user` already had it.
    pub fn add_profile_role(
        &mut self,
        caller: Address,
        profile_id: ProfileId,
        user: Address,
        role: Role,
    ) -> Result<Receipt<bool>, HubError> {
        let added = self.profiles.add_role(&profile_id, &caller, user, role)?;
        debug!(%profile_id, %user, %role, added, "Role granted");
        Ok(Receipt::new(added))
    }

    /// Revoke `role` from `user`. Returns false when `user` did not have it.
    pub fn remove_profile_role(
        &mut self,
        caller: Address,
        profile_id: ProfileId,
        user: Address,
        role: Role,
    ) -> Result<Receipt<bool>, HubError> {
        let removed = self
            .profiles
            .remove_role(&profile_id, &caller, &user, role)?;
        debug!(%profile_id, %user, %role, removed, "Role revoked");
        Ok(Receipt::new(removed))
    }

    pub fn profile_role_at(&self, profile_id: &ProfileId, idx: usize, role: Role) -> Result<Address, HubError> {
        self.profiles.role_at(profile_id, idx, role)
    }

    // === Transactions ===

    /// Open a withdrawal of `amount` from `account` to `to`, governed by
    /// `profile_id`. The amount is escrowed immediately.
    pub fn add_request(
        &mut self,
        caller: Address,
        account: Address,
        profile_id: ProfileId,
        amount: Amount,
        to: Address,
    ) -> Result<Receipt<TxId>, HubError> {
        let profile = self
            .profiles
            .get(&profile_id)
            .filter(|p| p.owner() == account && p.requesters().contains(&caller))
            .ok_or(HubError::PermissionDenied)?;

        let voters = profile.voters().to_vec();
        let consensus = consensus_threshold(profile.consensus_percentage(), voters.len())?;

        // Escrow is the only fallible write; everything after it succeeds.
        self.accounts.debit(account, amount)?;

        let uid = self.transactions.create(NewTransaction {
            account,
            by: caller,
            to,
            amount,
            consensus,
            voters: voters.clone(),
        });

        info!(
            tx_id = %uid,
            %account,
            by = %caller,
            %to,
            %amount,
            consensus,
            voters = voters.len(),
            "Transaction requested"
        );

        Ok(Receipt::with_events(
            uid,
            vec![HubEvent::TransactionRequest {
                uid,
                by: caller,
                account,
                to,
                amount,
                voters,
            }],
        ))
    }

    /// Next transaction id to be assigned
    pub fn last_uid(&self) -> TxId {
        self.transactions.last_uid()
    }

    pub fn transaction(&self, tx_id: &TxId) -> Result<TransactionView, HubError> {
        self.transactions
            .get(tx_id)
            .map(TransactionView::from)
            .ok_or(HubError::NotFound { what: "Transaction" })
    }

    /// Number of transactions `address` participates in, under any role
    pub fn tx_size(&self, address: &Address) -> usize {
        self.transactions.tx_size(address)
    }

    pub fn tx_at(&self, address: &Address, idx: usize) -> Result<TxId, HubError> {
        self.transactions.tx_at(address, idx)
    }

    pub fn tx_voters_size(&self, tx_id: &TxId) -> Result<usize, HubError> {
        self.transactions.voters_size(tx_id)
    }

    pub fn tx_voter_at(&self, tx_id: &TxId, idx: usize) -> Result<VoterView, HubError> {
        let (addr, status) = self.transactions.voter_at(tx_id, idx)?;
        Ok(VoterView { addr, status })
    }

    /// Cast the caller's decision on a pending transaction.
    ///
    /// Reaching the threshold pays out to the recipient (approve) or
    /// refunds the funding account (reject). Returns the status after the
    /// vote.
    pub fn vote(&mut self, caller: Address, tx_id: TxId, status: VoteStatus) -> Result<Receipt<TxStatus>, HubError> {
        let plan = self.transactions.prepare_vote(&tx_id, &caller, status)?;

        if let Some(resolution) = plan.resolution {
            let payee = match resolution {
                TxStatus::Approved => plan.to,
                _ => plan.account,
            };
            self.accounts.credit(payee, plan.amount)?;
        }
        self.transactions.commit_vote(&plan);

        debug!(
            %tx_id,
            voter = %caller,
            decision = %status,
            approvals = plan.approval_count,
            rejects = plan.reject_count,
            "Vote recorded"
        );

        let mut events = vec![HubEvent::TransactionVote {
            uid: tx_id,
            voter: caller,
            account: plan.account,
            status,
        }];

        let after = match plan.resolution {
            Some(resolution) => {
                info!(%tx_id, status = %resolution, amount = %plan.amount, "Transaction resolved");
                events.push(HubEvent::TransactionResponse {
                    uid: tx_id,
                    account: plan.account,
                    by: plan.by,
                    to: plan.to,
                    status: resolution,
                });
                resolution
            }
            None => TxStatus::Pending,
        };

        Ok(Receipt::with_events(after, events))
    }

    // === Dispatch ===

    /// Execute a journaled call on behalf of `caller`
    pub fn apply(&mut self, caller: Address, call: &Call) -> Result<Receipt<Outcome>, HubError> {
        match *call {
            Call::ReceiveAmount { account, value } => {
                Ok(self.receive_amount(account, value)?.map(Outcome::Balance))
            }
            Call::Receive { value } => Ok(self.receive(caller, value)?.map(Outcome::Balance)),
            Call::AddProfile => Ok(self.add_profile(caller)?.map(Outcome::Profile)),
            Call::EditProfile {
                profile_id,
                title,
                consensus_percentage,
            } => Ok(self
                .edit_profile(caller, profile_id, title, consensus_percentage)?
                .map(|_| Outcome::Done)),
            Call::RemoveProfile { profile_id } => Ok(self
                .remove_profile(caller, profile_id)?
                .map(|_| Outcome::Done)),
            Call::AddProfileRole {
                profile_id,
                user,
                role,
            } => Ok(self
                .add_profile_role(caller, profile_id, user, role)?
                .map(|_| Outcome::Done)),
            Call::RemoveProfileRole {
                profile_id,
                user,
                role,
            } => Ok(self
                .remove_profile_role(caller, profile_id, user, role)?
                .map(|_| Outcome::Done)),
            Call::AddRequest {
                account,
                profile_id,
                amount,
                to,
            } => Ok(self
                .add_request(caller, account, profile_id, amount, to)?
                .map(Outcome::Transaction)),
            Call::Vote { tx_id, status } => Ok(self.vote(caller, tx_id, status)?.map(Outcome::Status)),
        }
    }
}
