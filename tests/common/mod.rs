// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>
#![allow(dead_code)]

//! Scripted in-memory chain used by the integration tests.

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use pharos_routine::data::contracts::ContractSet;
use pharos_routine::domain::error::AppError;
use pharos_routine::domain::types::Receipt;
use pharos_routine::network::client::ChainClient;
use pharos_routine::network::gas::GasFees;
use pharos_routine::services::execution::{EngineConfig, TransactionEngine};
use pharos_routine::services::routing::Router;
use pharos_routine::services::routing::encoders::RouterEncoding;
use pharos_routine::services::sequencer::{GasLimits, RoutineConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub const CHAIN_ID: u64 = 688_688;

#[derive(Debug, Clone)]
pub struct SentTx {
    pub hash: B256,
    pub to: Address,
    pub input: Bytes,
    pub value: U256,
    pub nonce: u64,
}

#[derive(Default)]
struct State {
    block: u64,
    advance_blocks_on_read: bool,
    native_balance: U256,
    token_balances: HashMap<Address, U256>,
    /// (nth accepted tx, token, balance once that tx is mined), 1-based.
    balance_after: Vec<(usize, Address, U256)>,
    revert_nth: Option<usize>,
    reject_sends: bool,
    never_mine: bool,
    mine_delay: Duration,
    pending_nonce: u64,
    pending_nonce_reads: usize,
    sent: Vec<SentTx>,
    mined: HashMap<B256, (Instant, Receipt)>,
}

pub struct FakeChain {
    state: Mutex<State>,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                block: 100,
                native_balance: U256::from(1_000_000_000_000_000_000u128),
                ..State::default()
            }),
        })
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn set_native_balance(&self, amount: U256) {
        self.with(|s| s.native_balance = amount);
    }

    pub fn set_token_balance(&self, token: Address, amount: U256) {
        self.with(|s| {
            s.token_balances.insert(token, amount);
        });
    }

    pub fn balance_after_tx(&self, nth: usize, token: Address, amount: U256) {
        self.with(|s| s.balance_after.push((nth, token, amount)));
    }

    pub fn revert_nth(&self, nth: usize) {
        self.with(|s| s.revert_nth = Some(nth));
    }

    pub fn reject_sends(&self, reject: bool) {
        self.with(|s| s.reject_sends = reject);
    }

    pub fn never_mine(&self) {
        self.with(|s| s.never_mine = true);
    }

    pub fn mine_delay(&self, delay: Duration) {
        self.with(|s| s.mine_delay = delay);
    }

    pub fn advance_blocks_on_read(&self) {
        self.with(|s| s.advance_blocks_on_read = true);
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.with(|s| s.sent.clone())
    }

    pub fn pending_nonce_reads(&self) -> usize {
        self.with(|s| s.pending_nonce_reads)
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn chain_id(&self) -> Result<u64, AppError> {
        Ok(CHAIN_ID)
    }

    async fn block_number(&self) -> Result<u64, AppError> {
        Ok(self.with(|s| {
            let current = s.block;
            if s.advance_blocks_on_read {
                s.block += 1;
            }
            current
        }))
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256, AppError> {
        Ok(self.with(|s| s.native_balance))
    }

    async fn token_balance(&self, token: Address, _owner: Address) -> Result<U256, AppError> {
        Ok(self.with(|s| s.token_balances.get(&token).copied().unwrap_or_default()))
    }

    async fn pending_nonce(&self, _owner: Address) -> Result<u64, AppError> {
        Ok(self.with(|s| {
            s.pending_nonce_reads += 1;
            s.pending_nonce
        }))
    }

    async fn fees(&self) -> Result<GasFees, AppError> {
        Ok(GasFees {
            max_fee_per_gas: 3_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
            base_fee_per_gas: 1_000_000_000,
        })
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, AppError> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| AppError::Connection(format!("undecodable tx: {e}")))?;
        self.with(|s| {
            if s.reject_sends {
                return Err(AppError::Connection("nonce too low".to_string()));
            }
            let hash = *envelope.tx_hash();
            let tx = SentTx {
                hash,
                to: envelope.to().unwrap_or_default(),
                input: envelope.input().clone(),
                value: envelope.value(),
                nonce: envelope.nonce(),
            };
            s.sent.push(tx);
            s.pending_nonce = envelope.nonce() + 1;
            let nth = s.sent.len();

            if !s.never_mine {
                s.block += 1;
                let success = s.revert_nth != Some(nth);
                if success {
                    for (at, token, amount) in s.balance_after.clone() {
                        if at == nth {
                            s.token_balances.insert(token, amount);
                        }
                    }
                }
                let receipt = Receipt {
                    tx_hash: hash,
                    block_number: s.block,
                    success,
                    gas_used: 21_000,
                };
                s.mined.insert(hash, (Instant::now() + s.mine_delay, receipt));
            }
            Ok(hash)
        })
    }

    async fn receipt(&self, hash: B256) -> Result<Option<Receipt>, AppError> {
        Ok(self.with(|s| {
            s.mined
                .get(&hash)
                .filter(|(visible_at, _)| Instant::now() >= *visible_at)
                .map(|(_, receipt)| *receipt)
        }))
    }
}

pub fn engine(chain: Arc<FakeChain>, dry_run: bool) -> TransactionEngine {
    engine_with_signer(chain, PrivateKeySigner::random(), dry_run)
}

pub fn engine_with_signer(
    chain: Arc<FakeChain>,
    signer: PrivateKeySigner,
    dry_run: bool,
) -> TransactionEngine {
    TransactionEngine::new(
        chain,
        signer,
        EngineConfig {
            chain_id: CHAIN_ID,
            receipt_poll: Duration::from_millis(10),
            dry_run,
        },
    )
}

pub fn routine(ledger_path: &Path, clear_consumed_amounts: bool) -> RoutineConfig {
    let contracts = ContractSet::default();
    let dex_1 = RouterEncoding::FeeOnTransfer
        .encoder(3_000)
        .expect("fee-on-transfer encoder");
    let dex_2 = RouterEncoding::Multicall
        .encoder(3_000)
        .expect("multicall encoder");
    RoutineConfig {
        dex_1: Router::new(contracts.dex_1_router.clone(), Arc::from(dex_1)),
        dex_2: Router::new(contracts.dex_2_router.clone(), Arc::from(dex_2)),
        contracts,
        small_native_amount: U256::from(1_000_000_000_000_000u128),
        large_native_amount: U256::from(10_000_000_000_000_000u128),
        min_native_balance: U256::from(1_000_000_000_000_000u128),
        gas: GasLimits {
            wrap: 100_000,
            approve: 100_000,
            swap: 450_000,
        },
        swap_deadline: Duration::from_secs(600),
        confirmations: 1,
        receipt_timeout: Duration::from_secs(5),
        clear_consumed_amounts,
        ledger_path: ledger_path.to_path_buf(),
    }
}
