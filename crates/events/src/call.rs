//! Mutating calls as data
//!
//! Every state-changing operation has a `Call` variant. The caller is not
//! part of the call; it travels next to it (see `JournalRecord`).

use hub_core::{Address, Amount, ProfileId, Role, Title, TxId, VoteStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    /// Value-bearing deposit into `account`
    ReceiveAmount { account: Address, value: Amount },

    /// Bare value transfer, credited to the caller
    Receive { value: Amount },

    AddProfile,

    EditProfile {
        profile_id: ProfileId,
        title: Title,
        consensus_percentage: u64,
    },

    RemoveProfile { profile_id: ProfileId },

    AddProfileRole {
        profile_id: ProfileId,
        user: Address,
        role: Role,
    },

    RemoveProfileRole {
        profile_id: ProfileId,
        user: Address,
        role: Role,
    },

    AddRequest {
        account: Address,
        profile_id: ProfileId,
        amount: Amount,
        to: Address,
    },

    Vote { tx_id: TxId, status: VoteStatus },
}

impl Call {
    /// Operation name, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Call::ReceiveAmount { .. } => "receive_amount",
            Call::Receive { .. } => "receive",
            Call::AddProfile => "add_profile",
            Call::EditProfile { .. } => "edit_profile",
            Call::RemoveProfile { .. } => "remove_profile",
            Call::AddProfileRole { .. } => "add_profile_role",
            Call::RemoveProfileRole { .. } => "remove_profile_role",
            Call::AddRequest { .. } => "add_request",
            Call::Vote { .. } => "vote",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let call = Call::Vote {
            tx_id: TxId(7),
            status: VoteStatus::Reject,
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["op"], "vote");
        assert_eq!(json["tx_id"], 7);
        assert_eq!(json["status"], "reject");
    }

    #[test]
    fn test_unit_variant_parses() {
        let call: Call = serde_json::from_str(r#"{"op":"add_profile"}"#).unwrap();
        assert_eq!(call, Call::AddProfile);
        assert_eq!(call.name(), "add_profile");
    }
}
