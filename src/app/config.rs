// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::data_path::resolve_data_path;
use crate::data::contracts::ContractSet;
use crate::domain::constants;
use crate::domain::error::AppError;
use crate::domain::types::ChainEndpoint;
use crate::infrastructure::publish::GitIdentity;
use crate::services::routing::Router;
use crate::services::routing::encoders::RouterEncoding;
use crate::services::sequencer::{GasLimits, RoutineConfig};
use alloy::primitives::U256;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub log_json: bool,
    pub data_dir: Option<String>,

    // Identity
    #[serde(default)]
    pub wallet_key: String,
    /// Accepted when `wallet_key` is absent; the scheduler exports this name.
    pub private_key: Option<String>,

    // Chain
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    // Ledger
    #[serde(default = "default_amounts_file")]
    pub amounts_file: String,
    #[serde(default)]
    pub clear_consumed_amounts: bool,

    // Transaction
    #[serde(default = "default_min_native_balance_wei")]
    pub min_native_balance_wei: u64,
    #[serde(default = "default_max_gas")]
    pub max_gas_price_gwei: u64,
    #[serde(default = "default_wrap_gas_limit")]
    pub wrap_gas_limit: u64,
    #[serde(default = "default_approve_gas_limit")]
    pub approve_gas_limit: u64,
    #[serde(default = "default_swap_gas_limit")]
    pub swap_gas_limit: u64,
    #[serde(default = "default_swap_deadline_secs")]
    pub swap_deadline_secs: u64,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    #[serde(default = "default_receipt_confirm_blocks")]
    pub receipt_confirm_blocks: u64,

    // Routers
    #[serde(default = "default_dex_1_encoding")]
    pub dex_1_encoding: String,
    #[serde(default = "default_dex_2_encoding")]
    pub dex_2_encoding: String,
    #[serde(default = "default_multicall_fee_tier")]
    pub multicall_fee_tier: u32,

    // Publishing
    #[serde(default = "default_true")]
    pub git_publish: bool,
    #[serde(default = "default_git_user_name")]
    pub git_user_name: String,
    #[serde(default = "default_git_user_email")]
    pub git_user_email: String,
    #[serde(default = "default_git_commit_message")]
    pub git_commit_message: String,
}

// Defaults
fn default_true() -> bool {
    true
}
fn default_rpc_url() -> String {
    constants::DEFAULT_RPC_URL.to_string()
}
fn default_chain_id() -> u64 {
    constants::CHAIN_PHAROS_TESTNET
}
fn default_amounts_file() -> String {
    constants::DEFAULT_AMOUNTS_FILE.to_string()
}
fn default_min_native_balance_wei() -> u64 {
    constants::MIN_NATIVE_BALANCE_WEI as u64
}
fn default_max_gas() -> u64 {
    constants::DEFAULT_MAX_GAS_PRICE_GWEI
}
fn default_wrap_gas_limit() -> u64 {
    constants::DEFAULT_WRAP_GAS_LIMIT
}
fn default_approve_gas_limit() -> u64 {
    constants::DEFAULT_APPROVE_GAS_LIMIT
}
fn default_swap_gas_limit() -> u64 {
    constants::DEFAULT_SWAP_GAS_LIMIT
}
fn default_swap_deadline_secs() -> u64 {
    constants::DEFAULT_SWAP_DEADLINE_SECS
}
fn default_receipt_poll_ms() -> u64 {
    constants::DEFAULT_RECEIPT_POLL_MS
}
fn default_receipt_timeout_ms() -> u64 {
    constants::DEFAULT_RECEIPT_TIMEOUT_MS
}
fn default_receipt_confirm_blocks() -> u64 {
    constants::DEFAULT_RECEIPT_CONFIRM_BLOCKS
}
fn default_dex_1_encoding() -> String {
    "fee_on_transfer".to_string()
}
fn default_dex_2_encoding() -> String {
    "multicall".to_string()
}
fn default_multicall_fee_tier() -> u32 {
    constants::DEFAULT_MULTICALL_FEE_TIER
}
fn default_git_user_name() -> String {
    "GitHub Action Bot".to_string()
}
fn default_git_user_email() -> String {
    "action@github.com".to_string()
}
fn default_git_commit_message() -> String {
    "Update token amounts via script".to_string()
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = path {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Precedence: CLI (in main) > env/.env > config file.
        builder = builder.add_source(Environment::default());

        let mut settings: GlobalSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&mut self) -> Result<(), AppError> {
        if self.wallet_key.trim().is_empty() {
            self.wallet_key = self
                .private_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string)
                .ok_or_else(|| {
                    AppError::Config("WALLET_KEY (or PRIVATE_KEY) is missing".to_string())
                })?;
        }
        self.private_key = None;

        Url::parse(self.rpc_url.trim())
            .map_err(|e| AppError::Config(format!("Invalid RPC_URL '{}': {e}", self.rpc_url)))?;
        if self.chain_id == 0 {
            return Err(AppError::Config("CHAIN_ID must be non-zero".to_string()));
        }
        if self.receipt_poll_ms == 0 || self.receipt_timeout_ms == 0 {
            return Err(AppError::Config(
                "RECEIPT_POLL_MS and RECEIPT_TIMEOUT_MS must be non-zero".to_string(),
            ));
        }
        if self.receipt_poll_ms > self.receipt_timeout_ms {
            tracing::warn!(
                target: "config",
                poll_ms = self.receipt_poll_ms,
                timeout_ms = self.receipt_timeout_ms,
                "Receipt poll interval exceeds timeout; only one poll will run"
            );
        }
        Ok(())
    }

    pub fn endpoint(&self) -> ChainEndpoint {
        ChainEndpoint {
            rpc_url: self.rpc_url.trim().to_string(),
            chain_id: self.chain_id,
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        resolve_data_path(&self.amounts_file, self.data_dir.as_deref())
    }

    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn git_identity(&self) -> GitIdentity {
        GitIdentity {
            name: self.git_user_name.clone(),
            email: self.git_user_email.clone(),
        }
    }

    fn router(&self, target: crate::data::contracts::ContractTarget, encoding: &str) -> Result<Router, AppError> {
        let encoder = encoding.parse::<RouterEncoding>()?.encoder(self.multicall_fee_tier)?;
        tracing::debug!(target: "config", router = %target, encoder = encoder.name(), "Router configured");
        Ok(Router::new(target, Arc::from(encoder)))
    }

    /// Assemble the immutable routine description handed to the sequencer.
    pub fn routine_config(&self) -> Result<RoutineConfig, AppError> {
        let contracts = ContractSet::default();
        let dex_1 = self.router(contracts.dex_1_router.clone(), &self.dex_1_encoding)?;
        let dex_2 = self.router(contracts.dex_2_router.clone(), &self.dex_2_encoding)?;
        Ok(RoutineConfig {
            contracts,
            dex_1,
            dex_2,
            small_native_amount: U256::from(constants::SMALL_NATIVE_AMOUNT_WEI),
            large_native_amount: U256::from(constants::LARGE_NATIVE_AMOUNT_WEI),
            min_native_balance: U256::from(self.min_native_balance_wei),
            gas: GasLimits {
                wrap: self.wrap_gas_limit,
                approve: self.approve_gas_limit,
                swap: self.swap_gas_limit,
            },
            swap_deadline: Duration::from_secs(self.swap_deadline_secs),
            confirmations: self.receipt_confirm_blocks.max(1),
            receipt_timeout: Duration::from_millis(self.receipt_timeout_ms),
            clear_consumed_amounts: self.clear_consumed_amounts,
            ledger_path: self.ledger_path(),
        })
    }

    /// Filter directive for `setup_logging`; `RUST_LOG` wins when set.
    pub fn log_level(&self) -> String {
        std::env::var("RUST_LOG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| if self.debug { "debug" } else { "info" }.to_string())
    }
}
