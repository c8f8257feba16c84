//! Account ledger - balances and profile lists per address
//!
//! Accounts are created lazily on first touch and never deleted.

use crate::error::HubError;
use hub_core::{Address, Amount, IndexedSet, ProfileId};
use std::collections::HashMap;

/// Balance-holding record keyed by address
#[derive(Debug, Clone, Default)]
pub struct Account {
    balance: Amount,
    /// Insertion order, reshuffled by swap-remove
    profile_ids: IndexedSet<ProfileId>,
}

impl Account {
    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn profile_ids(&self) -> &IndexedSet<ProfileId> {
        &self.profile_ids
    }
}

/// Owner of every `Account`
#[derive(Debug, Default)]
pub struct AccountLedger {
    accounts: HashMap<Address, Account>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an account without creating it
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Balance of `address` (zero for unknown addresses)
    pub fn balance(&self, address: &Address) -> Amount {
        self.accounts
            .get(address)
            .map(Account::balance)
            .unwrap_or(Amount::ZERO)
    }

    /// Number of live profiles owned by `address`
    pub fn profiles_size(&self, address: &Address) -> usize {
        self.accounts
            .get(address)
            .map(|a| a.profile_ids.len())
            .unwrap_or(0)
    }

    /// Profile id at list position `idx`
    pub fn profile_id_at(&self, address: &Address, idx: usize) -> Result<ProfileId, HubError> {
        self.accounts
            .get(address)
            .and_then(|a| a.profile_ids.get(idx))
            .copied()
            .ok_or_else(|| HubError::not_found("Profile at index"))
    }

    /// Credit incoming funds, creating the account if needed.
    ///
    /// Returns the new balance.
    pub fn deposit(&mut self, address: Address, amount: Amount) -> Result<Amount, HubError> {
        let balance = self.balance(&address).checked_add(amount);
        let balance = balance.ok_or(HubError::AmountOverflow(address))?;
        self.accounts.entry(address).or_default().balance = balance;
        Ok(balance)
    }

    /// Unconditional increment (refunds, payouts). Same rules as `deposit`.
    pub fn credit(&mut self, address: Address, amount: Amount) -> Result<Amount, HubError> {
        self.deposit(address, amount)
    }

    /// Take `amount` out of the balance, or fail without touching it
    pub fn debit(&mut self, address: Address, amount: Amount) -> Result<Amount, HubError> {
        let available = self.balance(&address);
        let balance = available
            .checked_sub(amount)
            .ok_or(HubError::InsufficientBalance {
                available,
                required: amount,
            })?;
        self.accounts.entry(address).or_default().balance = balance;
        Ok(balance)
    }

    /// Append `id` to the owner's profile list
    pub fn add_profile_id(&mut self, owner: Address, id: ProfileId) {
        self.accounts.entry(owner).or_default().profile_ids.insert(id);
    }

    /// Swap-remove `id` from the owner's profile list.
    ///
    /// Callers check existence first; an absent id is ignored.
    pub fn remove_profile_id(&mut self, owner: &Address, id: &ProfileId) {
        if let Some(account) = self.accounts.get_mut(owner) {
            account.profile_ids.remove(id);
        }
    }
}
