// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::utils::format_ether;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use pharos_routine::app::config::GlobalSettings;
use pharos_routine::app::logging::setup_logging;
use pharos_routine::domain::error::AppError;
use pharos_routine::infrastructure::data::ledger::{AmountLedger, LedgerLock};
use pharos_routine::infrastructure::network::client::{ChainClient, RpcChainClient};
use pharos_routine::infrastructure::network::gas::GasOracle;
use pharos_routine::infrastructure::network::provider::ConnectionFactory;
use pharos_routine::infrastructure::publish::{GitPublisher, LedgerPublisher, NoopPublisher};
use pharos_routine::services::execution::{EngineConfig, TransactionEngine};
use pharos_routine::services::sequencer::{TaskName, TaskSequencer};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "daily wrap/swap/unwrap routine")]
struct Cli {
    /// Task to run, e.g. Wrap1, SwapIntermediateToFinal or RunAll
    task: TaskName,

    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Sign and log every call without broadcasting or touching the ledger
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Keep ledger updates local
    #[arg(long, default_value_t = false)]
    no_publish: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(&settings.log_level(), settings.log_json);

    if let Err(e) = run(cli, settings).await {
        tracing::error!(error = %e, "Routine failed");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, settings: GlobalSettings) -> Result<(), AppError> {
    let signer = PrivateKeySigner::from_str(settings.wallet_key.trim())
        .map_err(|e| AppError::Config(format!("Invalid wallet key: {e}")))?;
    let endpoint = settings.endpoint();
    let routine = settings.routine_config()?;

    let provider = ConnectionFactory::for_endpoint(&endpoint)?;
    let gas_oracle = GasOracle::new(provider.clone(), settings.max_gas_price_gwei);
    let client: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(provider, gas_oracle));

    let remote_chain = client.chain_id().await?;
    if remote_chain != endpoint.chain_id {
        return Err(AppError::Config(format!(
            "RPC {} reports chain {remote_chain}, expected {}",
            endpoint.rpc_url, endpoint.chain_id
        )));
    }
    let balance = client.native_balance(signer.address()).await?;
    tracing::info!(
        target: "config",
        chain_id = remote_chain,
        rpc = %endpoint.rpc_url,
        wallet = %signer.address(),
        balance = %format_ether(balance),
        ledger = %routine.ledger_path.display(),
        dry_run = cli.dry_run,
        "Routine configured"
    );

    for target in routine.contracts.all() {
        tracing::debug!(
            target: "config",
            contract = %target,
            calls = %target.kind.signatures().join(","),
            "Contract target"
        );
    }

    let _lock = LedgerLock::acquire(&routine.ledger_path)?;
    let ledger = AmountLedger::load(&routine.ledger_path);

    let publisher: Arc<dyn LedgerPublisher> = if settings.git_publish && !cli.no_publish && !cli.dry_run {
        Arc::new(GitPublisher::new(
            settings.git_identity(),
            settings.git_commit_message.clone(),
        ))
    } else {
        Arc::new(NoopPublisher)
    };

    let engine = TransactionEngine::new(
        client,
        signer,
        EngineConfig {
            chain_id: endpoint.chain_id,
            receipt_poll: settings.receipt_poll(),
            dry_run: cli.dry_run,
        },
    );
    let mut sequencer = TaskSequencer::new(engine, routine, ledger, publisher);

    let outcomes = sequencer.run(cli.task).await?;
    for outcome in &outcomes {
        let hashes = outcome
            .receipts
            .iter()
            .map(|r| format!("{:#x}", r.tx_hash))
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(target: "sequencer", task = %outcome.task, txs = %hashes, "Done");
    }
    Ok(())
}
