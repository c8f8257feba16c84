//! Identifiers, the profile title buffer, and the wire-coded enums
//!
//! Numeric codes match the external interface:
//! `Role`: REQUESTER = 0, VOTER = 1.
//! `VoteStatus` / `TxStatus`: UNSET = 0, PENDING = 1, APPROVE(D) = 2, REJECT(ED) = 3.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Errors converting wire codes and titles
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Unknown {kind} code: {code}")]
    UnknownCode { kind: &'static str, code: u8 },

    #[error("Title exceeds {max} bytes: {len}")]
    TitleTooLong { max: usize, len: usize },

    #[error("Invalid hex title: {0}")]
    InvalidTitleHex(String),
}

/// Handle of a profile. Allocated monotonically, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub u64);

/// Handle of a transaction. Allocated monotonically from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub u64);

macro_rules! id_impls {
    ($ty:ident) => {
        impl $ty {
            /// The id following this one
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u64> for $ty {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_impls!(ProfileId);
id_impls!(TxId);

/// Capacity of a profile title in bytes
pub const TITLE_LEN: usize = 32;

/// Fixed-capacity, zero-padded profile title.
///
/// # Example
/// ```
/// use hub_core::Title;
///
/// let title: Title = "0x42".parse().unwrap();
/// assert_eq!(title.as_bytes()[0], 0x42);
/// assert!(title.as_bytes()[1..].iter().all(|b| *b == 0));
/// assert_eq!(title.to_string(), format!("0x42{}", "0".repeat(62)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title([u8; TITLE_LEN]);

impl Title {
    /// The all-zero title
    pub const EMPTY: Self = Self([0u8; TITLE_LEN]);

    /// Copy `bytes` into a zero-padded title
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodeError> {
        if bytes.len() > TITLE_LEN {
            return Err(CodeError::TitleTooLong {
                max: TITLE_LEN,
                len: bytes.len(),
            });
        }
        let mut buf = [0u8; TITLE_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decode hex digits (no `0x` prefix) into a zero-padded title
    pub fn from_hex(digits: &str) -> Result<Self, CodeError> {
        let bytes = hex::decode(digits).map_err(|e| CodeError::InvalidTitleHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TITLE_LEN] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; TITLE_LEN]
    }

    /// Human-readable text: zero bytes dropped, invalid UTF-8 replaced
    pub fn text(&self) -> String {
        let bytes: Vec<u8> = self.0.iter().copied().filter(|b| *b != 0).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// `0x`-prefixed input is hex-decoded, anything else is taken as UTF-8 text.
/// Text that itself starts with `0x` has to go through `from_slice`.
impl FromStr for Title {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x") {
            Some(digits) => Self::from_hex(digits),
            None => Self::from_slice(s.as_bytes()),
        }
    }
}

impl TryFrom<String> for Title {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Title> for String {
    fn from(title: Title) -> Self {
        title.to_string()
    }
}

/// Profile role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May open withdrawal requests
    Requester,
    /// Must approve or reject requests
    Voter,
}

/// Per-voter decision, also the argument of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    /// Placeholder, never a legal vote
    Unset,
    /// Eligible voter who has not voted yet
    Pending,
    Approve,
    Reject,
}

/// Transaction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Unset,
    Pending,
    Approved,
    Rejected,
}

impl Role {
    pub fn code(&self) -> u8 {
        match self {
            Role::Requester => 0,
            Role::Voter => 1,
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Role::Requester),
            1 => Ok(Role::Voter),
            code => Err(CodeError::UnknownCode { kind: "role", code }),
        }
    }
}

impl VoteStatus {
    pub fn code(&self) -> u8 {
        match self {
            VoteStatus::Unset => 0,
            VoteStatus::Pending => 1,
            VoteStatus::Approve => 2,
            VoteStatus::Reject => 3,
        }
    }

    /// True for the two decisions a voter may cast
    pub fn is_decision(&self) -> bool {
        matches!(self, VoteStatus::Approve | VoteStatus::Reject)
    }
}

impl TryFrom<u8> for VoteStatus {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(VoteStatus::Unset),
            1 => Ok(VoteStatus::Pending),
            2 => Ok(VoteStatus::Approve),
            3 => Ok(VoteStatus::Reject),
            code => Err(CodeError::UnknownCode { kind: "vote status", code }),
        }
    }
}

impl TxStatus {
    pub fn code(&self) -> u8 {
        match self {
            TxStatus::Unset => 0,
            TxStatus::Pending => 1,
            TxStatus::Approved => 2,
            TxStatus::Rejected => 3,
        }
    }

    /// Approved and Rejected are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Approved | TxStatus::Rejected)
    }
}

impl TryFrom<u8> for TxStatus {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TxStatus::Unset),
            1 => Ok(TxStatus::Pending),
            2 => Ok(TxStatus::Approved),
            3 => Ok(TxStatus::Rejected),
            code => Err(CodeError::UnknownCode { kind: "transaction status", code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes() {
        assert_eq!(Role::Requester.code(), 0);
        assert_eq!(Role::Voter.code(), 1);
        assert_eq!(VoteStatus::Unset.code(), 0);
        assert_eq!(VoteStatus::Reject.code(), 3);
        assert_eq!(TxStatus::Approved.code(), 2);

        assert_eq!(Role::try_from(1), Ok(Role::Voter));
        assert_eq!(VoteStatus::try_from(2), Ok(VoteStatus::Approve));
        assert!(matches!(
            VoteStatus::try_from(9),
            Err(CodeError::UnknownCode { code: 9, .. })
        ));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("voter".parse::<Role>().unwrap(), Role::Voter);
        assert_eq!("REQUESTER".parse::<Role>().unwrap(), Role::Requester);
        assert_eq!("approve".parse::<VoteStatus>().unwrap(), VoteStatus::Approve);
        assert_eq!(TxStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_only_approve_and_reject_are_decisions() {
        assert!(VoteStatus::Approve.is_decision());
        assert!(VoteStatus::Reject.is_decision());
        assert!(!VoteStatus::Unset.is_decision());
        assert!(!VoteStatus::Pending.is_decision());
    }

    #[test]
    fn test_title_from_text() {
        let title: Title = "payroll".parse().unwrap();
        assert_eq!(title.text(), "payroll");
        assert_eq!(&title.as_bytes()[..7], b"payroll");
    }

    #[test]
    fn test_title_hex_prefix() {
        let title: Title = "0x666f7264".parse().unwrap();
        assert_eq!(title.text(), "ford");
        assert_eq!(Title::from_hex("666f7264").unwrap(), title);

        assert!(matches!(
            "0xford".parse::<Title>(),
            Err(CodeError::InvalidTitleHex(_))
        ));
        assert_eq!(Title::from_slice(b"0xford").unwrap().text(), "0xford");
    }

    #[test]
    fn test_title_too_long() {
        let long = "x".repeat(TITLE_LEN + 1);
        assert!(matches!(
            long.parse::<Title>(),
            Err(CodeError::TitleTooLong { len: 33, .. })
        ));
    }

    #[test]
    fn test_title_display_is_zero_padded() {
        assert_eq!(Title::EMPTY.to_string(), format!("0x{}", "0".repeat(64)));
        assert!(Title::EMPTY.is_empty());
    }

    #[test]
    fn test_ids() {
        assert_eq!(TxId(3).next(), TxId(4));
        assert_eq!("12".parse::<ProfileId>().unwrap(), ProfileId(12));
    }
}
