// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, B256, Bytes, U256};
use std::fmt;

/// Read/write channel configuration. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
    pub rpc_url: String,
    pub chain_id: u64,
}

/// A state-changing call that has not been submitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub to: Address,
    pub calldata: Bytes,
    pub value: U256,
    pub gas_limit: u64,
    /// Unix timestamp after which a router rejects the call, if time-bounded.
    pub deadline: Option<u64>,
    /// Short human label used in logs and errors, e.g. `approve TETHER`.
    pub label: String,
}

impl PendingCall {
    pub fn new(to: Address, calldata: impl Into<Bytes>, gas_limit: u64, label: impl Into<String>) -> Self {
        Self {
            to,
            calldata: calldata.into(),
            value: U256::ZERO,
            gas_limit,
            deadline: None,
            label: label.into(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Proof of broadcast; the only way to wait for a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHandle {
    pub hash: B256,
    pub nonce: u64,
    pub label: String,
}

/// Mined outcome of a submitted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub success: bool,
    pub gas_used: u64,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#x} block={} status={} gas_used={}",
            self.tx_hash,
            self.block_number,
            if self.success { "success" } else { "reverted" },
            self.gas_used
        )
    }
}
