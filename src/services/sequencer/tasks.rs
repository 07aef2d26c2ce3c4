// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::contracts::{ContractSet, ContractTarget};
use crate::services::routing::Router;
use alloy::primitives::{Address, U256};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    Wrap1,
    Wrap2,
    Unwrap1,
    Unwrap2,
    SwapToIntermediateA,
    SwapToIntermediateB,
    SwapIntermediateToFinal,
    SwapFinalBackToNative,
    SwapOtherIntermediateBackToNative,
    RunAll,
}

impl TaskName {
    /// `RunAll` order; mirrors the daily schedule.
    pub const RUN_ALL_ORDER: [TaskName; 9] = [
        TaskName::Wrap2,
        TaskName::SwapToIntermediateA,
        TaskName::Wrap1,
        TaskName::SwapToIntermediateB,
        TaskName::SwapIntermediateToFinal,
        TaskName::SwapOtherIntermediateBackToNative,
        TaskName::SwapFinalBackToNative,
        TaskName::Unwrap2,
        TaskName::Unwrap1,
    ];

    pub const ALL: [TaskName; 10] = [
        TaskName::Wrap1,
        TaskName::Wrap2,
        TaskName::Unwrap1,
        TaskName::Unwrap2,
        TaskName::SwapToIntermediateA,
        TaskName::SwapToIntermediateB,
        TaskName::SwapIntermediateToFinal,
        TaskName::SwapFinalBackToNative,
        TaskName::SwapOtherIntermediateBackToNative,
        TaskName::RunAll,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::Wrap1 => "Wrap1",
            TaskName::Wrap2 => "Wrap2",
            TaskName::Unwrap1 => "Unwrap1",
            TaskName::Unwrap2 => "Unwrap2",
            TaskName::SwapToIntermediateA => "SwapToIntermediateA",
            TaskName::SwapToIntermediateB => "SwapToIntermediateB",
            TaskName::SwapIntermediateToFinal => "SwapIntermediateToFinal",
            TaskName::SwapFinalBackToNative => "SwapFinalBackToNative",
            TaskName::SwapOtherIntermediateBackToNative => "SwapOtherIntermediateBackToNative",
            TaskName::RunAll => "RunAll",
        }
    }

    /// Build the step list for a single task. `RunAll` has no plan of its own.
    pub fn plan(self, routine: &RoutineConfig) -> Option<TaskPlan> {
        let c = &routine.contracts;
        let plan = match self {
            TaskName::Wrap1 => TaskPlan::Wrap {
                wrapper: c.wrapper_1.clone(),
                amount: routine.large_native_amount,
            },
            TaskName::Wrap2 => TaskPlan::Wrap {
                wrapper: c.wrapper_2.clone(),
                amount: routine.small_native_amount,
            },
            TaskName::Unwrap1 => TaskPlan::Unwrap {
                wrapper: c.wrapper_1.clone(),
                amount: routine.large_native_amount,
            },
            TaskName::Unwrap2 => TaskPlan::Unwrap {
                wrapper: c.wrapper_2.clone(),
                amount: routine.small_native_amount,
            },
            TaskName::SwapToIntermediateA => TaskPlan::SwapNativeForToken {
                router: routine.dex_1.clone(),
                amount: routine.small_native_amount,
                path: vec![c.wrapper_2.address, c.usdc_old.address],
                output: c.usdc_old.clone(),
            },
            TaskName::SwapToIntermediateB => TaskPlan::SwapNativeForToken {
                router: routine.dex_1.clone(),
                amount: routine.small_native_amount,
                path: vec![c.wrapper_2.address, c.tether.address],
                output: c.tether.clone(),
            },
            TaskName::SwapIntermediateToFinal => TaskPlan::SwapTokenForToken {
                router: routine.dex_2.clone(),
                input: c.tether.clone(),
                output: c.usdc.clone(),
                path: vec![c.tether.address, c.usdc.address],
            },
            TaskName::SwapOtherIntermediateBackToNative => TaskPlan::SwapTokenForNative {
                router: routine.dex_2.clone(),
                input: c.usdc_old.clone(),
                path: vec![c.usdc_old.address, c.wrapper_1.address],
                settlement: NativeSettlement::Router,
            },
            TaskName::SwapFinalBackToNative => TaskPlan::SwapTokenForNative {
                router: routine.dex_1.clone(),
                input: c.usdc.clone(),
                path: vec![c.usdc.address, c.wrapper_2.address],
                settlement: NativeSettlement::Unwrap(c.wrapper_2.clone()),
            },
            TaskName::RunAll => return None,
        };
        Some(plan)
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskName {
    type Err = AppError;

    /// Case, `_` and `-` are ignored, so the scheduler's `SWAP_TETHER_TO_USDC`
    /// style names keep working alongside the current ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let task = match key.as_str() {
            "wrap1" => TaskName::Wrap1,
            "wrap2" => TaskName::Wrap2,
            "unwrap1" => TaskName::Unwrap1,
            "unwrap2" => TaskName::Unwrap2,
            "swaptointermediatea" | "swaptousdcold" => TaskName::SwapToIntermediateA,
            "swaptointermediateb" | "swaptotether" => TaskName::SwapToIntermediateB,
            "swapintermediatetofinal" | "swaptethertousdc" => TaskName::SwapIntermediateToFinal,
            "swapfinalbacktonative" | "swapusdctophrs" => TaskName::SwapFinalBackToNative,
            "swapotherintermediatebacktonative" | "swapusdcoldtophrs" => {
                TaskName::SwapOtherIntermediateBackToNative
            }
            "runall" => TaskName::RunAll,
            _ => {
                let known: Vec<&str> = TaskName::ALL.iter().map(|t| t.as_str()).collect();
                return Err(AppError::Config(format!(
                    "unknown task '{}'; expected one of {}",
                    s.trim(),
                    known.join(", ")
                )));
            }
        };
        Ok(task)
    }
}

/// How a token-to-native swap ends up holding native currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeSettlement {
    /// The router unwraps and pays native directly.
    Router,
    /// The router pays the wrapped token; its whole balance is unwrapped after.
    Unwrap(ContractTarget),
}

/// Archetype of a single task. Token targets double as ledger keys.
#[derive(Debug, Clone)]
pub enum TaskPlan {
    Wrap {
        wrapper: ContractTarget,
        amount: U256,
    },
    Unwrap {
        wrapper: ContractTarget,
        amount: U256,
    },
    SwapNativeForToken {
        router: Router,
        amount: U256,
        path: Vec<Address>,
        output: ContractTarget,
    },
    SwapTokenForToken {
        router: Router,
        input: ContractTarget,
        output: ContractTarget,
        path: Vec<Address>,
    },
    SwapTokenForNative {
        router: Router,
        input: ContractTarget,
        path: Vec<Address>,
        settlement: NativeSettlement,
    },
}

impl TaskPlan {
    /// Ledger entry that must exist before the task may submit anything.
    pub fn ledger_dependency(&self) -> Option<&ContractTarget> {
        match self {
            TaskPlan::SwapTokenForToken { input, .. } | TaskPlan::SwapTokenForNative { input, .. } => {
                Some(input)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasLimits {
    pub wrap: u64,
    pub approve: u64,
    pub swap: u64,
}

/// Immutable description of the routine, injected into the sequencer.
#[derive(Debug, Clone)]
pub struct RoutineConfig {
    pub contracts: ContractSet,
    pub dex_1: Router,
    pub dex_2: Router,
    pub small_native_amount: U256,
    pub large_native_amount: U256,
    pub min_native_balance: U256,
    pub gas: GasLimits,
    pub swap_deadline: Duration,
    pub confirmations: u64,
    pub receipt_timeout: Duration,
    /// Drop a ledger entry once a swap has spent it.
    pub clear_consumed_amounts: bool,
    pub ledger_path: PathBuf,
}
