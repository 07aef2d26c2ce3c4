// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::domain::types::{PendingCall, Receipt, TransactionHandle};
use crate::network::client::ChainClient;
use crate::network::nonce::NonceManager;
use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::eips::eip2930::AccessList;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, Bytes, TxKind};
use alloy::signers::local::PrivateKeySigner;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub chain_id: u64,
    pub receipt_poll: Duration,
    /// Sign and log calls without broadcasting them.
    pub dry_run: bool,
}

/// Submits calls from the single signing account and waits for their
/// receipts. Calls are strictly sequential: one nonce slot per submission,
/// and callers await confirmation before building the next call.
pub struct TransactionEngine {
    client: Arc<dyn ChainClient>,
    signer: PrivateKeySigner,
    nonces: NonceManager,
    config: EngineConfig,
}

impl TransactionEngine {
    pub fn new(client: Arc<dyn ChainClient>, signer: PrivateKeySigner, config: EngineConfig) -> Self {
        let nonces = NonceManager::new(client.clone(), signer.address());
        Self {
            client,
            signer,
            nonces,
            config,
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    fn sign(&self, call: &PendingCall, nonce: u64, max_fee: u128, priority: u128) -> Result<(Bytes, B256), AppError> {
        let mut tx = TxEip1559 {
            chain_id: self.config.chain_id,
            nonce,
            max_priority_fee_per_gas: priority,
            max_fee_per_gas: max_fee,
            gas_limit: call.gas_limit,
            to: TxKind::Call(call.to),
            value: call.value,
            access_list: AccessList::default(),
            input: call.calldata.clone(),
        };

        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx).map_err(|e| {
            AppError::Submission {
                label: call.label.clone(),
                reason: format!("Sign tx failed: {e}"),
            }
        })?;
        let signed: TxEnvelope = tx.into_signed(sig).into();
        Ok((signed.encoded_2718().into(), *signed.tx_hash()))
    }

    /// The reserved slot was never used; hand it out again.
    async fn resync_after_failure(&self) {
        if let Err(e) = self.nonces.resync().await {
            tracing::warn!(target: "engine", error = %e, "Nonce resync after failed submission failed");
        }
    }

    /// Sign and broadcast `call`, consuming one nonce.
    pub async fn submit(&self, call: &PendingCall) -> Result<TransactionHandle, AppError> {
        let fees = self.client.fees().await?;
        let nonce = self.nonces.reserve().await?;
        let (raw, local_hash) = match self.sign(
            call,
            nonce,
            fees.max_fee_per_gas,
            fees.max_priority_fee_per_gas,
        ) {
            Ok(signed) => signed,
            Err(e) => {
                self.resync_after_failure().await;
                return Err(e);
            }
        };

        if self.config.dry_run {
            tracing::info!(
                target: "engine",
                label = %call.label,
                to = %call.to,
                value = %call.value,
                nonce,
                calldata = %call.calldata,
                "Dry-run: would broadcast"
            );
            return Ok(TransactionHandle {
                hash: local_hash,
                nonce,
                label: call.label.clone(),
            });
        }

        let hash = match self.client.send_raw_transaction(raw).await {
            Ok(hash) => hash,
            Err(e) => {
                self.resync_after_failure().await;
                return Err(AppError::Submission {
                    label: call.label.clone(),
                    reason: e.to_string(),
                });
            }
        };
        if hash != local_hash {
            tracing::warn!(target: "engine", node = %hash, local = %local_hash, "Node reported a different tx hash");
        }

        tracing::info!(
            target: "engine",
            label = %call.label,
            hash = %hash,
            nonce,
            to = %call.to,
            value = %call.value,
            gas_limit = call.gas_limit,
            max_fee = fees.max_fee_per_gas,
            "Transaction submitted"
        );
        Ok(TransactionHandle {
            hash,
            nonce,
            label: call.label.clone(),
        })
    }

    async fn qualifying_receipt(&self, hash: B256, confirmations: u64) -> Result<Option<Receipt>, AppError> {
        let Some(receipt) = self.client.receipt(hash).await? else {
            return Ok(None);
        };
        if confirmations <= 1 {
            return Ok(Some(receipt));
        }
        let latest = self.client.block_number().await?;
        let depth = latest.saturating_sub(receipt.block_number).saturating_add(1);
        Ok((depth >= confirmations).then_some(receipt))
    }

    /// Wait until `handle` is mined `confirmations` deep. A reverted receipt
    /// is still a receipt; only the absence of one before `timeout` is an error.
    pub async fn await_confirmation(
        &self,
        handle: &TransactionHandle,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<Receipt, AppError> {
        if self.config.dry_run {
            return Ok(Receipt {
                tx_hash: handle.hash,
                block_number: 0,
                success: true,
                gas_used: 0,
            });
        }

        let deadline = Instant::now() + timeout;
        loop {
            match self.qualifying_receipt(handle.hash, confirmations).await {
                Ok(Some(receipt)) => {
                    tracing::info!(target: "engine", label = %handle.label, receipt = %receipt, "Transaction mined");
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(target: "engine", hash = %handle.hash, error = %e, "Receipt poll failed");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(AppError::Timeout {
                    hash: format!("{:#x}", handle.hash),
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.config.receipt_poll.min(deadline - now)).await;
        }
    }

    /// Submit, wait, and treat a reverted receipt as failure.
    pub async fn execute(
        &self,
        call: PendingCall,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<Receipt, AppError> {
        let handle = self.submit(&call).await?;
        let receipt = self.await_confirmation(&handle, confirmations, timeout).await?;
        if !receipt.success {
            tracing::error!(target: "engine", label = %call.label, hash = %receipt.tx_hash, "Transaction reverted");
            return Err(AppError::Reverted {
                hash: format!("{:#x}", receipt.tx_hash),
                label: call.label,
            });
        }
        Ok(receipt)
    }
}
