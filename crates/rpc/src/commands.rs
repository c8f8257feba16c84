//! CLI commands

use hub_core::{Address, Amount, CodeError, ProfileId, Role, Title, TxId, VoteStatus};
use hub_engine::{Outcome, VoterView};
use hub_events::Call;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

use crate::context::Committed;
use crate::service::HubHandle;

/// Submit a mutating call and report its events
async fn submit(
    handle: &HubHandle,
    caller: Address,
    call: Call,
    correlation_id: &str,
) -> Result<Committed, anyhow::Error> {
    let committed = handle.commit(caller, call, correlation_id).await?;
    for event in &committed.record.events {
        println!("   📣 {}", serde_json::to_string(event)?);
    }
    Ok(committed)
}

/// Parse an enum argument given by name or by its numeric wire code
pub fn parse_coded<T>(s: &str) -> Result<T, String>
where
    T: FromStr + TryFrom<u8>,
    <T as FromStr>::Err: Display,
    <T as TryFrom<u8>>::Error: Display,
{
    match s.parse::<u8>() {
        Ok(code) => T::try_from(code).map_err(|e| e.to_string()),
        Err(_) => s.parse::<T>().map_err(|e| e.to_string()),
    }
}

/// Title from a CLI argument: plain text, or hex digits when `hex` is set
pub fn parse_title(raw: &str, hex: bool) -> Result<Title, CodeError> {
    if hex {
        Title::from_hex(raw.strip_prefix("0x").unwrap_or(raw))
    } else {
        Title::from_slice(raw.as_bytes())
    }
}

fn print_json(value: &impl Serialize) -> Result<(), anyhow::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Credit `amount` to `account`
pub async fn deposit(
    handle: &HubHandle,
    caller: Address,
    account: Address,
    amount: Amount,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let committed = submit(handle, caller, Call::ReceiveAmount { account, value: amount }, correlation_id).await?;
    if let Outcome::Balance(balance) = committed.outcome {
        println!(
            "✅ Deposited {} to {} (balance: {}, seq: {})",
            amount, account, balance, committed.record.sequence
        );
    }
    Ok(())
}

/// Credit `amount` to the caller
pub async fn receive(
    handle: &HubHandle,
    caller: Address,
    amount: Amount,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let committed = submit(handle, caller, Call::Receive { value: amount }, correlation_id).await?;
    if let Outcome::Balance(balance) = committed.outcome {
        println!(
            "✅ Received {} for {} (balance: {}, seq: {})",
            amount, caller, balance, committed.record.sequence
        );
    }
    Ok(())
}

pub async fn account(handle: &HubHandle, address: Address) -> Result<(), anyhow::Error> {
    print_json(&handle.account(address).await?)
}

pub async fn add_profile(handle: &HubHandle, caller: Address, correlation_id: &str) -> Result<(), anyhow::Error> {
    let committed = submit(handle, caller, Call::AddProfile, correlation_id).await?;
    if let Outcome::Profile(id) = committed.outcome {
        println!("✅ Created profile {} for {}", id, caller);
    }
    Ok(())
}

pub async fn profile_id_at(handle: &HubHandle, address: Address, idx: usize) -> Result<(), anyhow::Error> {
    let id = handle.query(move |hub| hub.profile_id_at(&address, idx)).await??;
    println!("{}", id);
    Ok(())
}

pub async fn edit_profile(
    handle: &HubHandle,
    caller: Address,
    profile_id: ProfileId,
    title: Title,
    consensus_percentage: u64,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let call = Call::EditProfile {
        profile_id,
        title,
        consensus_percentage,
    };
    submit(handle, caller, call, correlation_id).await?;
    println!(
        "✅ Profile {} updated: title {:?}, consensus {}%",
        profile_id,
        title.text(),
        consensus_percentage
    );
    Ok(())
}

pub async fn remove_profile(
    handle: &HubHandle,
    caller: Address,
    profile_id: ProfileId,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    submit(handle, caller, Call::RemoveProfile { profile_id }, correlation_id).await?;
    println!("✅ Profile {} removed", profile_id);
    Ok(())
}

pub async fn profile(handle: &HubHandle, profile_id: ProfileId) -> Result<(), anyhow::Error> {
    print_json(&handle.profile(profile_id).await?)
}

pub async fn add_role(
    handle: &HubHandle,
    caller: Address,
    profile_id: ProfileId,
    user: Address,
    role: Role,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let call = Call::AddProfileRole {
        profile_id,
        user,
        role,
    };
    submit(handle, caller, call, correlation_id).await?;
    println!("✅ {} is a {} of profile {}", user, role, profile_id);
    Ok(())
}

pub async fn remove_role(
    handle: &HubHandle,
    caller: Address,
    profile_id: ProfileId,
    user: Address,
    role: Role,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let call = Call::RemoveProfileRole {
        profile_id,
        user,
        role,
    };
    submit(handle, caller, call, correlation_id).await?;
    println!("✅ {} is no longer a {} of profile {}", user, role, profile_id);
    Ok(())
}

pub async fn role_at(handle: &HubHandle, profile_id: ProfileId, idx: usize, role: Role) -> Result<(), anyhow::Error> {
    let user = handle
        .query(move |hub| hub.profile_role_at(&profile_id, idx, role))
        .await??;
    println!("{}", user);
    Ok(())
}

/// Open a withdrawal request
pub async fn request(
    handle: &HubHandle,
    caller: Address,
    account: Address,
    profile_id: ProfileId,
    amount: Amount,
    to: Address,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let call = Call::AddRequest {
        account,
        profile_id,
        amount,
        to,
    };
    let committed = submit(handle, caller, call, correlation_id).await?;
    if let Outcome::Transaction(tx_id) = committed.outcome {
        println!(
            "✅ Transaction {} requested: {} from {} to {} (seq: {})",
            tx_id, amount, account, to, committed.record.sequence
        );
    }
    Ok(())
}

pub async fn vote(
    handle: &HubHandle,
    caller: Address,
    tx_id: TxId,
    status: VoteStatus,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let committed = submit(handle, caller, Call::Vote { tx_id, status }, correlation_id).await?;
    if let Outcome::Status(after) = committed.outcome {
        println!("✅ {} voted {} on transaction {} (now {})", caller, status, tx_id, after);
    }
    Ok(())
}

pub async fn tx(handle: &HubHandle, tx_id: TxId) -> Result<(), anyhow::Error> {
    print_json(&handle.transaction(tx_id).await?)
}

/// Every transaction `address` takes part in
pub async fn txs(handle: &HubHandle, address: Address) -> Result<(), anyhow::Error> {
    let ids = handle
        .query(move |hub| {
            (0..hub.tx_size(&address))
                .map(|idx| hub.tx_at(&address, idx))
                .collect::<Result<Vec<_>, _>>()
        })
        .await??;

    if ids.is_empty() {
        println!("No transactions for {}", address);
        return Ok(());
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

pub async fn voters(handle: &HubHandle, tx_id: TxId) -> Result<(), anyhow::Error> {
    let voters = handle
        .query(move |hub| {
            let size = hub.tx_voters_size(&tx_id)?;
            (0..size)
                .map(|idx| hub.tx_voter_at(&tx_id, idx))
                .collect::<Result<Vec<VoterView>, _>>()
        })
        .await??;
    print_json(&voters)
}

/// Verify the journal hash chain
pub async fn audit(handle: &HubHandle) -> Result<(), anyhow::Error> {
    match handle.audit().await {
        Ok(count) => {
            println!("✅ Hash chain verified ({} records)", count);
            Ok(())
        }
        Err(e) => {
            println!("❌ {}", e);
            anyhow::bail!("journal audit failed")
        }
    }
}
