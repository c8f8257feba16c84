//! Integration tests for the hub
//!
//! These tests drive the full stack: calls through `AppContext` and
//! `HubService`, the JSONL journal on disk, and replay on reopen.

use async_trait::async_trait;
use hub_core::{Address, Amount, ProfileId, Role, Title, TxId, TxStatus, VoteStatus};
use hub_engine::{HubError, Outcome};
use hub_events::{Call, EventError, EventSink, HubEvent, JournalReader, MemorySink};
use hub_rpc::{commands, AppContext, CommitError, ContextError, HubConfig, HubService, ServiceError};
use std::sync::Arc;
use tempfile::TempDir;

const OWNER: Address = Address::from_low_u8(0x01);
const REQUESTER: Address = Address::from_low_u8(0x02);
const PAYEE: Address = Address::from_low_u8(0x03);
const V1: Address = Address::from_low_u8(0x11);
const V2: Address = Address::from_low_u8(0x12);
const V3: Address = Address::from_low_u8(0x13);

fn amount(val: u128) -> Amount {
    Amount::new(val)
}

fn commit(ctx: &mut AppContext, caller: Address, call: Call) -> Outcome {
    ctx.commit(caller, call, "test").unwrap().outcome
}

/// Owner funded with `balance`, profile 0 with one requester and V3, V2, V1
/// added as voters in that order
fn seed(ctx: &mut AppContext, balance: u128, percentage: u64) {
    commit(ctx, OWNER, Call::ReceiveAmount { account: OWNER, value: amount(balance) });
    commit(ctx, OWNER, Call::AddProfile);
    commit(
        ctx,
        OWNER,
        Call::EditProfile {
            profile_id: ProfileId(0),
            title: Title::from_slice(b"payroll").unwrap(),
            consensus_percentage: percentage,
        },
    );
    commit(
        ctx,
        OWNER,
        Call::AddProfileRole {
            profile_id: ProfileId(0),
            user: REQUESTER,
            role: Role::Requester,
        },
    );
    for voter in [V3, V2, V1] {
        commit(
            ctx,
            OWNER,
            Call::AddProfileRole {
                profile_id: ProfileId(0),
                user: voter,
                role: Role::Voter,
            },
        );
    }
}

fn request(value: u128) -> Call {
    Call::AddRequest {
        account: OWNER,
        profile_id: ProfileId(0),
        amount: amount(value),
        to: PAYEE,
    }
}

fn vote(tx: u64, status: VoteStatus) -> Call {
    Call::Vote {
        tx_id: TxId(tx),
        status,
    }
}

/// Test: deposit → profile → request → votes → payout
#[test]
fn test_full_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::new(temp_dir.path()).unwrap();
    assert_eq!(ctx.last_sequence(), 0);

    seed(&mut ctx, 1_000, 67);
    assert_eq!(ctx.last_sequence(), 7);

    let committed = ctx.commit(REQUESTER, request(400), "req-1").unwrap();
    assert_eq!(committed.outcome, Outcome::Transaction(TxId(0)));
    assert_eq!(committed.record.correlation_id, "req-1");
    match &committed.record.events[..] {
        [HubEvent::TransactionRequest { voters, .. }] => assert_eq!(voters, &vec![V3, V2, V1]),
        other => panic!("unexpected events: {:?}", other),
    }

    let hub = ctx.hub();
    assert_eq!(hub.account(&OWNER).balance, amount(600));
    assert_eq!(hub.transaction(&TxId(0)).unwrap().consensus, 3);

    assert_eq!(
        commit(&mut ctx, V1, vote(0, VoteStatus::Approve)),
        Outcome::Status(TxStatus::Pending)
    );
    assert_eq!(
        commit(&mut ctx, V2, vote(0, VoteStatus::Approve)),
        Outcome::Status(TxStatus::Pending)
    );
    let last = ctx.commit(V3, vote(0, VoteStatus::Approve), "final").unwrap();
    assert_eq!(last.outcome, Outcome::Status(TxStatus::Approved));
    assert_eq!(last.record.events.len(), 2);

    let hub = ctx.hub();
    assert_eq!(hub.account(&PAYEE).balance, amount(400));
    assert_eq!(hub.account(&OWNER).balance, amount(600));
    let tx = hub.transaction(&TxId(0)).unwrap();
    assert_eq!(tx.status, TxStatus::Approved);
    assert_eq!(tx.approval_count, 3);
    assert_eq!(hub.tx_voter_at(&TxId(0), 0).unwrap().addr, V3);
}

/// Test: rejected calls do not reach the journal
#[test]
fn test_failed_calls_not_journaled() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::new(temp_dir.path()).unwrap();
    seed(&mut ctx, 100, 50);
    let before = ctx.last_sequence();

    let err = ctx.commit(REQUESTER, request(101), "too-much").unwrap_err();
    assert!(matches!(
        err,
        CommitError::Rejected(HubError::InsufficientBalance { .. })
    ));
    let err = ctx.commit(PAYEE, request(1), "not-requester").unwrap_err();
    assert!(matches!(err, CommitError::Rejected(HubError::PermissionDenied)));
    let err = ctx
        .commit(PAYEE, Call::RemoveProfile { profile_id: ProfileId(0) }, "not-owner")
        .unwrap_err();
    assert!(matches!(err, CommitError::Rejected(HubError::PermissionDenied)));

    assert_eq!(ctx.last_sequence(), before);
    let records = JournalReader::from_directory(ctx.journal_path())
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(records.len() as u64, before);
    assert_eq!(ctx.hub().last_uid(), TxId(0));
}

/// Test: reopening replays the journal into identical state
#[test]
fn test_replay_restores_state() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut ctx = AppContext::new(temp_dir.path()).unwrap();
        seed(&mut ctx, 500, 34);
        commit(&mut ctx, REQUESTER, request(100));
        commit(&mut ctx, REQUESTER, request(50));
        commit(&mut ctx, V2, vote(0, VoteStatus::Reject));
        commit(&mut ctx, V1, vote(1, VoteStatus::Approve));
        commit(
            &mut ctx,
            OWNER,
            Call::RemoveProfileRole {
                profile_id: ProfileId(0),
                user: V3,
                role: Role::Voter,
            },
        );
        commit(&mut ctx, PAYEE, Call::Receive { value: amount(5) });
    }

    let mut ctx = AppContext::new(temp_dir.path()).unwrap();
    assert_eq!(ctx.last_sequence(), 13);
    let hub = ctx.hub();

    assert_eq!(hub.account(&OWNER).balance, amount(350));
    assert_eq!(hub.account(&PAYEE).balance, amount(5));
    assert_eq!(hub.transaction(&TxId(0)).unwrap().status, TxStatus::Pending);
    assert_eq!(hub.transaction(&TxId(1)).unwrap().status, TxStatus::Pending);
    assert_eq!(hub.transaction(&TxId(0)).unwrap().reject_count, 1);
    assert_eq!(hub.profile(&ProfileId(0)).voters_size, 2);
    assert_eq!(hub.last_uid(), TxId(2));
    assert_eq!(hub.tx_size(&V3), 2);

    // the chain continues where it left off
    commit(&mut ctx, V3, vote(0, VoteStatus::Reject));
    assert_eq!(ctx.last_sequence(), 14);
    assert_eq!(ctx.hub().transaction(&TxId(0)).unwrap().status, TxStatus::Rejected);
    assert_eq!(ctx.hub().account(&OWNER).balance, amount(450));
    assert_eq!(ctx.audit().unwrap(), 14);

    // one segment per session
    let reader = JournalReader::from_directory(ctx.journal_path()).unwrap();
    assert_eq!(reader.files().len(), 2);
}

/// Test: 66% of four voter additions naming three addresses gives threshold 2
#[test]
fn test_duplicate_voter_addition() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::new(temp_dir.path()).unwrap();
    seed(&mut ctx, 10, 66);
    commit(
        &mut ctx,
        OWNER,
        Call::AddProfileRole {
            profile_id: ProfileId(0),
            user: V2,
            role: Role::Voter,
        },
    );

    assert_eq!(ctx.hub().profile(&ProfileId(0)).voters_size, 3);
    commit(&mut ctx, REQUESTER, request(1));
    assert_eq!(ctx.hub().transaction(&TxId(0)).unwrap().consensus, 2);
}

/// Test: a reused profile slot starts clean
#[test]
fn test_removed_profile_is_zeroed() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::new(temp_dir.path()).unwrap();
    seed(&mut ctx, 10, 100);

    commit(&mut ctx, OWNER, Call::RemoveProfile { profile_id: ProfileId(0) });
    let view = ctx.hub().profile(&ProfileId(0));
    assert_eq!(view.owner, Address::ZERO);
    assert_eq!(view.voters_size, 0);
    assert_eq!(ctx.hub().account(&OWNER).profiles_size, 0);

    let fresh = commit(&mut ctx, OWNER, Call::AddProfile);
    assert_eq!(fresh, Outcome::Profile(ProfileId(1)));
    assert_eq!(ctx.hub().profile_id_at(&OWNER, 0).unwrap(), ProfileId(1));
    assert_eq!(ctx.hub().profile(&ProfileId(1)).requesters_size, 0);

    // the old id is gone for requests too
    let err = ctx.commit(REQUESTER, request(1), "stale").unwrap_err();
    assert!(matches!(err, CommitError::Rejected(HubError::PermissionDenied)));
}

/// Test: editing a journaled record breaks the chain
#[test]
fn test_tamper_detection() {
    let temp_dir = TempDir::new().unwrap();
    let journal = {
        let mut ctx = AppContext::new(temp_dir.path()).unwrap();
        seed(&mut ctx, 100, 50);
        assert_eq!(ctx.audit().unwrap(), 7);
        ctx.journal_path().to_path_buf()
    };

    let files = JournalReader::from_directory(&journal).unwrap().files().to_vec();
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(&files[0]).unwrap();
    assert!(content.contains(r#""value":"100""#));
    std::fs::write(&files[0], content.replacen(r#""value":"100""#, r#""value":"999""#, 1)).unwrap();

    let err = AppContext::new(temp_dir.path()).err().unwrap();
    assert!(matches!(err, ContextError::Chain(_)));

    // without verification the altered call is replayed as written
    let config = HubConfig {
        data_dir: temp_dir.path().to_path_buf(),
        verify_chain_on_start: false,
        ..HubConfig::default()
    };
    let ctx = AppContext::open(&config).unwrap();
    assert_eq!(ctx.hub().account(&OWNER).balance, amount(999));
    assert!(matches!(ctx.audit(), Err(ContextError::Chain(_))));
}

/// Test: replay disabled starts empty but keeps the chain going
#[test]
fn test_replay_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let no_replay = HubConfig {
        data_dir: temp_dir.path().to_path_buf(),
        replay_on_start: false,
        ..HubConfig::default()
    };

    // an empty journal has nothing to skip, so commits go through
    {
        let mut ctx = AppContext::open(&no_replay).unwrap();
        seed(&mut ctx, 500, 50);
        commit(&mut ctx, REQUESTER, request(100));
        assert_eq!(ctx.last_sequence(), 8);
    }

    {
        let mut ctx = AppContext::open(&no_replay).unwrap();
        assert_eq!(ctx.hub().account(&OWNER).balance, Amount::ZERO);
        assert_eq!(ctx.last_sequence(), 8);

        let err = ctx.commit(OWNER, Call::AddProfile, "test").unwrap_err();
        assert!(matches!(err, CommitError::ReadOnly));
        let err = ctx.commit(REQUESTER, request(100), "test").unwrap_err();
        assert!(matches!(err, CommitError::ReadOnly));
        assert_eq!(ctx.last_sequence(), 8);
        assert_eq!(ctx.audit().unwrap(), 8);
    }

    // nothing from the skipped session leaks into the journal
    let mut ctx = AppContext::new(temp_dir.path()).unwrap();
    assert_eq!(ctx.hub().account(&OWNER).balance, amount(400));
    assert_eq!(ctx.hub().transaction(&TxId(0)).unwrap().status, TxStatus::Pending);
    assert_eq!(ctx.hub().last_uid(), TxId(1));

    commit(&mut ctx, OWNER, Call::AddProfile);
    commit(&mut ctx, REQUESTER, request(50));
    assert_eq!(ctx.last_sequence(), 10);
    assert_eq!(ctx.audit().unwrap(), 10);
}

/// Sink that always fails
struct BrokenSink;

#[async_trait]
impl EventSink for BrokenSink {
    fn name(&self) -> &str {
        "broken"
    }

    async fn publish(&self, _event: &HubEvent) -> Result<(), EventError> {
        Err(EventError::SinkFailed {
            name: "broken".to_string(),
            reason: "unavailable".to_string(),
        })
    }
}

/// Test: the service applies calls one at a time and feeds sinks in order
#[tokio::test]
async fn test_service_serializes_calls() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = AppContext::new(temp_dir.path()).unwrap();
    seed(&mut ctx, 1_000, 30);

    let memory = MemorySink::new();
    let sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(BrokenSink), Arc::new(memory.clone())];
    let (handle, task) = HubService::spawn(ctx, sinks, 4);

    let mut tasks = Vec::new();
    for i in 0..20u128 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .commit(REQUESTER, request(10 + i), format!("req-{}", i))
                .await
                .unwrap()
        }));
    }

    let mut sequences = Vec::new();
    let mut ids = Vec::new();
    for task in tasks {
        let committed = task.await.unwrap();
        sequences.push(committed.record.sequence);
        if let Outcome::Transaction(id) = committed.outcome {
            ids.push(id.0);
        }
    }
    sequences.sort_unstable();
    ids.sort_unstable();
    assert_eq!(sequences, (8..28).collect::<Vec<u64>>());
    assert_eq!(ids, (0..20).collect::<Vec<u64>>());

    // 1000 - sum(10..30)
    assert_eq!(handle.account(OWNER).await.unwrap().balance, amount(610));
    assert_eq!(handle.last_uid().await.unwrap(), TxId(20));

    let resolved = handle
        .commit(V1, vote(3, VoteStatus::Approve), "vote")
        .await
        .unwrap();
    assert_eq!(resolved.outcome, Outcome::Status(TxStatus::Approved));

    let err = handle
        .commit(V1, vote(3, VoteStatus::Reject), "late")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Commit(CommitError::Rejected(HubError::VotingClosed))
    ));

    let tx = handle.transaction(TxId(3)).await.unwrap();
    assert_eq!(tx.status, TxStatus::Approved);
    assert!(matches!(
        handle.transaction(TxId(99)).await,
        Err(ServiceError::Query(HubError::NotFound { .. }))
    ));
    assert_eq!(handle.audit().await.unwrap(), 28);

    let events = memory.events();
    assert_eq!(events.len(), 22);
    assert!(events[..20].iter().all(|e| e.name() == "TransactionRequest"));
    assert_eq!(events[20].name(), "TransactionVote");
    assert_eq!(events[21].name(), "TransactionResponse");

    drop(handle);
    task.await.unwrap();
}

/// Test: reads queued behind a write observe it
#[tokio::test]
async fn test_service_read_after_write() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(temp_dir.path()).unwrap();
    let (handle, task) = HubService::spawn(ctx, Vec::new(), 1);

    let writer = handle.clone();
    let write = tokio::spawn(async move {
        writer
            .commit(OWNER, Call::Receive { value: amount(42) }, "w")
            .await
            .unwrap()
    });
    write.await.unwrap();

    let view = handle.account(OWNER).await.unwrap();
    assert_eq!(view.balance, amount(42));
    let profile = handle
        .query(|hub| hub.profile(&ProfileId(7)))
        .await
        .unwrap();
    assert_eq!(profile, Default::default());

    drop(handle);
    task.await.unwrap();
}

/// Test: `hub audit` fails when the chain is broken
#[tokio::test]
async fn test_audit_command_fails_on_broken_chain() {
    let temp_dir = TempDir::new().unwrap();
    let journal = {
        let mut ctx = AppContext::new(temp_dir.path()).unwrap();
        seed(&mut ctx, 100, 50);
        ctx.journal_path().to_path_buf()
    };

    let config = HubConfig {
        data_dir: temp_dir.path().to_path_buf(),
        verify_chain_on_start: false,
        ..HubConfig::default()
    };
    let (handle, task) = HubService::spawn(AppContext::open(&config).unwrap(), Vec::new(), 4);
    assert!(commands::audit(&handle).await.is_ok());

    let files = JournalReader::from_directory(&journal).unwrap().files().to_vec();
    let content = std::fs::read_to_string(&files[0]).unwrap();
    std::fs::write(&files[0], content.replacen(r#""value":"100""#, r#""value":"999""#, 1)).unwrap();

    assert!(commands::audit(&handle).await.is_err());

    drop(handle);
    task.await.unwrap();
}
