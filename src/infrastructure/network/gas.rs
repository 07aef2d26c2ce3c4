// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::retry::{READ_ATTEMPTS, READ_INITIAL_DELAY, retry_async};
use crate::network::provider::HttpProvider;
use alloy::providers::Provider;
use alloy::rpc::types::BlockNumberOrTag;
use std::sync::{Arc, Mutex};

const GWEI: u128 = 1_000_000_000;
const FALLBACK_BASE_FEE: u128 = GWEI;
const FALLBACK_PRIORITY_FEE: u128 = GWEI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasFees {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub base_fee_per_gas: u128,
}

impl GasFees {
    /// Clamp both fee fields so that neither exceeds `cap_wei`.
    pub fn capped(self, cap_wei: u128) -> Self {
        let max_fee_per_gas = self.max_fee_per_gas.min(cap_wei);
        Self {
            max_fee_per_gas,
            max_priority_fee_per_gas: self.max_priority_fee_per_gas.min(max_fee_per_gas),
            base_fee_per_gas: self.base_fee_per_gas,
        }
    }
}

#[derive(Clone)]
pub struct GasOracle {
    provider: HttpProvider,
    cap_wei: u128,
    last_good: Arc<Mutex<Option<GasFees>>>,
}

impl GasOracle {
    pub fn new(provider: HttpProvider, max_gas_price_gwei: u64) -> Self {
        Self {
            provider,
            cap_wei: (max_gas_price_gwei as u128).saturating_mul(GWEI),
            last_good: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn estimate_eip1559_fees(&self) -> Result<GasFees, AppError> {
        let fees = match self.from_fee_history().await {
            Ok(Some(fees)) => fees,
            Ok(None) | Err(_) => {
                let cached = self.last_good.lock().ok().and_then(|guard| *guard);
                match cached {
                    Some(fees) => fees,
                    None => self.fallback_estimate().await?,
                }
            }
        };
        let fees = fees.capped(self.cap_wei);
        if let Ok(mut guard) = self.last_good.lock() {
            *guard = Some(fees);
        }
        tracing::debug!(
            target: "gas",
            max_fee = fees.max_fee_per_gas,
            priority = fees.max_priority_fee_per_gas,
            base = fees.base_fee_per_gas,
            "Fee estimate"
        );
        Ok(fees)
    }

    async fn from_fee_history(&self) -> Result<Option<GasFees>, AppError> {
        let provider = self.provider.clone();
        let history = retry_async(
            "eth_feeHistory",
            move |_| {
                let provider = provider.clone();
                async move {
                    provider
                        .get_fee_history(5, BlockNumberOrTag::Latest, &[50.0f64])
                        .await
                }
            },
            READ_ATTEMPTS,
            READ_INITIAL_DELAY,
        )
        .await
        .map_err(|e| AppError::Connection(format!("Fee History failed: {}", e)))?;

        let rewards: Vec<u128> = history
            .reward
            .as_ref()
            .map(|blocks| blocks.iter().filter_map(|b| b.first().copied()).collect())
            .unwrap_or_default();
        Ok(fees_from_samples(&history.base_fee_per_gas, &rewards))
    }

    async fn fallback_estimate(&self) -> Result<GasFees, AppError> {
        // Some public RPCs disable eth_feeHistory.
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| AppError::Connection(format!("Latest block fetch failed: {}", e)))?;

        let base: u128 = block
            .as_ref()
            .and_then(|b| b.header.base_fee_per_gas)
            .map(|v| v as u128)
            .unwrap_or(FALLBACK_BASE_FEE);

        let priority: u128 = self
            .provider
            .get_max_priority_fee_per_gas()
            .await
            .unwrap_or(FALLBACK_PRIORITY_FEE);

        tracing::debug!(target: "gas", base, priority, "Fee history unavailable, using latest block");
        Ok(compose(base, priority))
    }
}

/// `base_fees` is the `eth_feeHistory` series whose last element is the
/// next block's base fee; `rewards` holds one median tip per sampled block.
pub fn fees_from_samples(base_fees: &[u128], rewards: &[u128]) -> Option<GasFees> {
    let next_base = *base_fees.last()?;
    let next_base = if next_base == 0 {
        // Nodes that return zeroes: fall back to the previous block plus 12.5%.
        base_fees
            .iter()
            .rev()
            .nth(1)
            .map(|b| b.saturating_mul(1125) / 1000)
            .unwrap_or(0)
    } else {
        next_base
    };

    let tips: Vec<u128> = rewards.iter().copied().filter(|r| *r > 0).collect();
    let priority = if tips.is_empty() {
        FALLBACK_PRIORITY_FEE
    } else {
        tips.iter().sum::<u128>() / tips.len() as u128
    };
    Some(compose(next_base, priority))
}

fn compose(next_base: u128, priority: u128) -> GasFees {
    GasFees {
        // Double the base fee so one or two full blocks do not strand the tx.
        max_fee_per_gas: next_base.saturating_mul(2).saturating_add(priority),
        max_priority_fee_per_gas: priority,
        base_fee_per_gas: next_base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_non_zero_tips() {
        let fees = fees_from_samples(&[10, 10, 12], &[0, 4, 6]).unwrap();
        assert_eq!(fees.base_fee_per_gas, 12);
        assert_eq!(fees.max_priority_fee_per_gas, 5);
        assert_eq!(fees.max_fee_per_gas, 29);
    }

    #[test]
    fn zero_next_base_uses_previous_block() {
        let fees = fees_from_samples(&[1000, 0], &[]).unwrap();
        assert_eq!(fees.base_fee_per_gas, 1125);
        assert_eq!(fees.max_priority_fee_per_gas, FALLBACK_PRIORITY_FEE);
    }

    #[test]
    fn empty_history_yields_nothing() {
        assert!(fees_from_samples(&[], &[1]).is_none());
    }

    #[test]
    fn cap_bounds_priority_too() {
        let fees = GasFees {
            max_fee_per_gas: 500,
            max_priority_fee_per_gas: 300,
            base_fee_per_gas: 100,
        }
        .capped(200);
        assert_eq!(fees.max_fee_per_gas, 200);
        assert_eq!(fees.max_priority_fee_per_gas, 200);
    }
}
