//! Profile store - spending policies and their role sets
//!
//! Every mutating call requires the caller to be the profile owner.
//! A missing profile and a foreign profile are indistinguishable to the
//! caller: both are `PermissionDenied`.

use crate::account::AccountLedger;
use crate::error::HubError;
use hub_core::{Address, IndexedSet, ProfileId, Role, Title};
use std::collections::HashMap;

/// A named spending policy under an account
#[derive(Debug, Clone)]
pub struct Profile {
    owner: Address,
    title: Title,
    /// Stored as given; values above 100 behave as 100 when consumed
    consensus_percentage: u64,
    requesters: IndexedSet<Address>,
    voters: IndexedSet<Address>,
}

impl Profile {
    fn new(owner: Address) -> Self {
        Self {
            owner,
            title: Title::EMPTY,
            consensus_percentage: 0,
            requesters: IndexedSet::new(),
            voters: IndexedSet::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn title(&self) -> Title {
        self.title
    }

    pub fn consensus_percentage(&self) -> u64 {
        self.consensus_percentage
    }

    pub fn requesters(&self) -> &IndexedSet<Address> {
        &self.requesters
    }

    pub fn voters(&self) -> &IndexedSet<Address> {
        &self.voters
    }

    /// The set backing `role`
    pub fn members(&self, role: Role) -> &IndexedSet<Address> {
        match role {
            Role::Requester => &self.requesters,
            Role::Voter => &self.voters,
        }
    }

    fn members_mut(&mut self, role: Role) -> &mut IndexedSet<Address> {
        match role {
            Role::Requester => &mut self.requesters,
            Role::Voter => &mut self.voters,
        }
    }
}

/// Owner of every live `Profile`
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<ProfileId, Profile>,
    next_id: ProfileId,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live profile by id
    pub fn get(&self, id: &ProfileId) -> Option<&Profile> {
        self.profiles.get(id)
    }

    /// Live profile owned by `caller`, or `PermissionDenied`
    pub fn owned_by(&self, id: &ProfileId, caller: &Address) -> Result<&Profile, HubError> {
        match self.profiles.get(id) {
            Some(profile) if profile.owner == *caller => Ok(profile),
            _ => Err(HubError::PermissionDenied),
        }
    }

    fn owned_by_mut(&mut self, id: &ProfileId, caller: &Address) -> Result<&mut Profile, HubError> {
        match self.profiles.get_mut(id) {
            Some(profile) if profile.owner == *caller => Ok(profile),
            _ => Err(HubError::PermissionDenied),
        }
    }

    /// Allocate a fresh, empty profile for `owner` and list it on the account
    pub fn create(&mut self, accounts: &mut AccountLedger, owner: Address) -> Result<ProfileId, HubError> {
        if owner.is_zero() {
            return Err(HubError::PermissionDenied);
        }
        let id = self.next_id;
        self.next_id = id.next();
        self.profiles.insert(id, Profile::new(owner));
        accounts.add_profile_id(owner, id);
        Ok(id)
    }

    /// Overwrite title and percentage
    pub fn edit(
        &mut self,
        id: &ProfileId,
        caller: &Address,
        title: Title,
        consensus_percentage: u64,
    ) -> Result<(), HubError> {
        let profile = self.owned_by_mut(id, caller)?;
        profile.title = title;
        profile.consensus_percentage = consensus_percentage;
        Ok(())
    }

    /// Drop the profile and detach it from the owner's list.
    ///
    /// The id is retired; a later `create` gets a new id with empty roles.
    pub fn remove(
        &mut self,
        accounts: &mut AccountLedger,
        id: &ProfileId,
        caller: &Address,
    ) -> Result<(), HubError> {
        self.owned_by(id, caller)?;
        if let Some(profile) = self.profiles.remove(id) {
            accounts.remove_profile_id(&profile.owner, id);
        }
        Ok(())
    }

    /// Grant `role` to `user`. Granting an existing member changes nothing.
    pub fn add_role(
        &mut self,
        id: &ProfileId,
        caller: &Address,
        user: Address,
        role: Role,
    ) -> Result<bool, HubError> {
        let profile = self.owned_by_mut(id, caller)?;
        Ok(profile.members_mut(role).insert(user))
    }

    /// Revoke `role` from `user`. Revoking a non-member is a no-op, not an error.
    pub fn remove_role(
        &mut self,
        id: &ProfileId,
        caller: &Address,
        user: &Address,
        role: Role,
    ) -> Result<bool, HubError> {
        let profile = self.owned_by_mut(id, caller)?;
        Ok(profile.members_mut(role).remove(user))
    }

    /// Member of `role` at position `idx`
    pub fn role_at(&self, id: &ProfileId, idx: usize, role: Role) -> Result<Address, HubError> {
        self.profiles
            .get(id)
            .and_then(|p| p.members(role).get(idx))
            .copied()
            .ok_or_else(|| HubError::not_found("User at index"))
    }
}
