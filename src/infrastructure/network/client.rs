// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::retry::{READ_ATTEMPTS, READ_INITIAL_DELAY, retry_async};
use crate::data::contracts::IERC20;
use crate::domain::types::Receipt;
use crate::network::gas::{GasFees, GasOracle};
use crate::network::provider::HttpProvider;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::Provider;
use async_trait::async_trait;

/// Everything the engine and sequencer need from the network.
///
/// `send_raw_transaction` errors mean the node refused the payload; callers
/// classify them as submission failures. Every other method is a read.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, AppError>;

    async fn block_number(&self) -> Result<u64, AppError>;

    async fn native_balance(&self, owner: Address) -> Result<U256, AppError>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, AppError>;

    /// Nonce including transactions still in the mempool.
    async fn pending_nonce(&self, owner: Address) -> Result<u64, AppError>;

    async fn fees(&self) -> Result<GasFees, AppError>;

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, AppError>;

    /// `None` while the transaction is unknown or not yet mined.
    async fn receipt(&self, hash: B256) -> Result<Option<Receipt>, AppError>;
}

/// [`ChainClient`] over a single JSON-RPC HTTP endpoint.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: HttpProvider,
    gas_oracle: GasOracle,
}

impl RpcChainClient {
    pub fn new(provider: HttpProvider, gas_oracle: GasOracle) -> Self {
        Self {
            provider,
            gas_oracle,
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> Result<u64, AppError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| AppError::Connection(format!("chain_id failed: {e}")))
    }

    async fn block_number(&self) -> Result<u64, AppError> {
        let provider = self.provider.clone();
        retry_async(
            "eth_blockNumber",
            move |_| {
                let provider = provider.clone();
                async move { provider.get_block_number().await }
            },
            READ_ATTEMPTS,
            READ_INITIAL_DELAY,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Failed to fetch block number: {e}")))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, AppError> {
        let provider = self.provider.clone();
        retry_async(
            "eth_getBalance",
            move |_| {
                let provider = provider.clone();
                async move { provider.get_balance(owner).await }
            },
            READ_ATTEMPTS,
            READ_INITIAL_DELAY,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Balance check failed: {e}")))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, AppError> {
        let contract = IERC20::new(token, self.provider.clone());
        retry_async(
            "balanceOf",
            move |_| {
                let contract = contract.clone();
                async move { contract.balanceOf(owner).call().await }
            },
            READ_ATTEMPTS,
            READ_INITIAL_DELAY,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Token balance failed for {token:#x}: {e}")))
    }

    async fn pending_nonce(&self, owner: Address) -> Result<u64, AppError> {
        let provider = self.provider.clone();
        retry_async(
            "eth_getTransactionCount",
            move |_| {
                let provider = provider.clone();
                async move { provider.get_transaction_count(owner).pending().await }
            },
            READ_ATTEMPTS,
            READ_INITIAL_DELAY,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Failed to fetch nonce: {e}")))
    }

    async fn fees(&self) -> Result<GasFees, AppError> {
        self.gas_oracle.estimate_eip1559_fees().await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, AppError> {
        let pending = self
            .provider
            .send_raw_transaction(raw.as_ref())
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, hash: B256) -> Result<Option<Receipt>, AppError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| AppError::Connection(format!("Receipt lookup failed: {e}")))?;

        Ok(receipt.and_then(|rcpt| {
            rcpt.block_number.map(|block_number| Receipt {
                tx_hash: rcpt.transaction_hash,
                block_number,
                success: rcpt.status(),
                gas_used: rcpt.gas_used,
            })
        }))
    }
}
