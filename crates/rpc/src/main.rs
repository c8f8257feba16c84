//! Hub CLI - Main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use hub_core::{Address, Amount, ProfileId, Role, TxId, VoteStatus};
use hub_events::{EventSink, LogSink};
use hub_rpc::{commands, AppContext, HubConfig, HubService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "hub")]
#[command(about = "Hub - custodial multi-party approval ledger", long_about = None)]
struct Cli {
    /// Data directory path (overrides config and HUB_DATA_DIR)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Address the call is made from
    #[arg(long, global = true)]
    caller: Option<Address>,

    /// Correlation ID for mutating calls (random when omitted)
    #[arg(long, global = true)]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deposit funds into an account
    Deposit {
        account: Address,
        amount: Amount,
    },

    /// Deposit funds into the caller's own account
    Receive {
        amount: Amount,
    },

    /// Show balance and profile count of an account
    Account {
        address: Address,
    },

    /// Create an empty profile owned by the caller
    AddProfile,

    /// Profile id at a position in an account's profile list
    ProfileIdAt {
        address: Address,
        idx: usize,
    },

    /// Set title and consensus percentage of a profile
    EditProfile {
        id: ProfileId,
        /// Title text, up to 32 bytes
        title: String,
        percentage: u64,
        /// Read the title as hex digits instead of text
        #[arg(long)]
        hex: bool,
    },

    /// Delete a profile
    RemoveProfile {
        id: ProfileId,
    },

    /// Show a profile
    Profile {
        id: ProfileId,
    },

    /// Grant a role (requester|voter, or code 0|1)
    AddRole {
        id: ProfileId,
        user: Address,
        #[arg(value_parser = commands::parse_coded::<Role>)]
        role: Role,
    },

    /// Revoke a role (requester|voter, or code 0|1)
    RemoveRole {
        id: ProfileId,
        user: Address,
        #[arg(value_parser = commands::parse_coded::<Role>)]
        role: Role,
    },

    /// Member of a role at a position
    RoleAt {
        id: ProfileId,
        idx: usize,
        #[arg(value_parser = commands::parse_coded::<Role>)]
        role: Role,
    },

    /// Request a withdrawal from an account under a profile
    Request {
        account: Address,
        profile: ProfileId,
        amount: Amount,
        to: Address,
    },

    /// Vote on a pending transaction (approve|reject, or code 2|3)
    Vote {
        tx: TxId,
        #[arg(value_parser = commands::parse_coded::<VoteStatus>)]
        status: VoteStatus,
    },

    /// Show a transaction
    Tx {
        id: TxId,
    },

    /// List transactions an address takes part in
    Txs {
        address: Address,
    },

    /// List the voters of a transaction and their votes
    Voters {
        tx: TxId,
    },

    /// Audit the journal (verify hash chain)
    Audit,
}

fn require_caller(caller: Option<Address>) -> anyhow::Result<Address> {
    caller.context("--caller is required for this command")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = HubConfig::load(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_dir = data;
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ctx = AppContext::open(&config)
        .with_context(|| format!("failed to open journal under {}", config.data_dir.display()))?;
    let sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(LogSink)];
    let (handle, task) = HubService::spawn(ctx, sinks, config.channel_capacity);

    let correlation_id = cli.correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let caller = cli.caller;

    match cli.command {
        Commands::Deposit { account, amount } => {
            let caller = caller.unwrap_or(account);
            commands::deposit(&handle, caller, account, amount, &correlation_id).await?;
        }

        Commands::Receive { amount } => {
            commands::receive(&handle, require_caller(caller)?, amount, &correlation_id).await?;
        }

        Commands::Account { address } => {
            commands::account(&handle, address).await?;
        }

        Commands::AddProfile => {
            commands::add_profile(&handle, require_caller(caller)?, &correlation_id).await?;
        }

        Commands::ProfileIdAt { address, idx } => {
            commands::profile_id_at(&handle, address, idx).await?;
        }

        Commands::EditProfile {
            id,
            title,
            percentage,
            hex,
        } => {
            let title = commands::parse_title(&title, hex)?;
            commands::edit_profile(&handle, require_caller(caller)?, id, title, percentage, &correlation_id)
                .await?;
        }

        Commands::RemoveProfile { id } => {
            commands::remove_profile(&handle, require_caller(caller)?, id, &correlation_id).await?;
        }

        Commands::Profile { id } => {
            commands::profile(&handle, id).await?;
        }

        Commands::AddRole { id, user, role } => {
            commands::add_role(&handle, require_caller(caller)?, id, user, role, &correlation_id).await?;
        }

        Commands::RemoveRole { id, user, role } => {
            commands::remove_role(&handle, require_caller(caller)?, id, user, role, &correlation_id).await?;
        }

        Commands::RoleAt { id, idx, role } => {
            commands::role_at(&handle, id, idx, role).await?;
        }

        Commands::Request {
            account,
            profile,
            amount,
            to,
        } => {
            commands::request(
                &handle,
                require_caller(caller)?,
                account,
                profile,
                amount,
                to,
                &correlation_id,
            )
            .await?;
        }

        Commands::Vote { tx, status } => {
            commands::vote(&handle, require_caller(caller)?, tx, status, &correlation_id).await?;
        }

        Commands::Tx { id } => {
            commands::tx(&handle, id).await?;
        }

        Commands::Txs { address } => {
            commands::txs(&handle, address).await?;
        }

        Commands::Voters { tx } => {
            commands::voters(&handle, tx).await?;
        }

        Commands::Audit => {
            commands::audit(&handle).await?;
        }
    }

    // Let the service flush and stop
    drop(handle);
    task.await?;

    Ok(())
}
