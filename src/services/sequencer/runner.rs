// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::contracts::{ContractTarget, IERC20, IWrapper};
use crate::data::ledger::AmountLedger;
use crate::domain::constants::NATIVE_SYMBOL;
use crate::domain::types::{PendingCall, Receipt};
use crate::infrastructure::publish::{LedgerPublisher, publish_best_effort};
use crate::services::execution::TransactionEngine;
use crate::services::routing::Router;
use crate::services::routing::encoders::SwapRequest;
use crate::services::sequencer::tasks::{NativeSettlement, RoutineConfig, TaskName, TaskPlan};
use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use std::sync::Arc;

/// What a completed task did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub task: TaskName,
    pub receipts: Vec<Receipt>,
    /// Ledger entries written by this task, in write order.
    pub ledger_updates: Vec<(String, U256)>,
}

impl TaskOutcome {
    fn new(task: TaskName) -> Self {
        Self {
            task,
            receipts: Vec::new(),
            ledger_updates: Vec::new(),
        }
    }
}

/// Runs named tasks to completion against one engine and one ledger.
///
/// The ledger is read once by the caller and handed in; every
/// balance-changing step writes it back before the next step starts.
pub struct TaskSequencer {
    engine: TransactionEngine,
    routine: RoutineConfig,
    ledger: AmountLedger,
    publisher: Arc<dyn LedgerPublisher>,
}

impl TaskSequencer {
    pub fn new(
        engine: TransactionEngine,
        routine: RoutineConfig,
        ledger: AmountLedger,
        publisher: Arc<dyn LedgerPublisher>,
    ) -> Self {
        Self {
            engine,
            routine,
            ledger,
            publisher,
        }
    }

    pub fn ledger(&self) -> &AmountLedger {
        &self.ledger
    }

    /// Run `task`; `RunAll` runs its constituents in order and stops at the
    /// first failure, returning that error untouched.
    pub async fn run(&mut self, task: TaskName) -> Result<Vec<TaskOutcome>, AppError> {
        if task != TaskName::RunAll {
            return Ok(vec![self.run_single(task).await?]);
        }

        let mut outcomes = Vec::with_capacity(TaskName::RUN_ALL_ORDER.len());
        for step in TaskName::RUN_ALL_ORDER {
            match self.run_single(step).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(
                        target: "sequencer",
                        task = %step,
                        completed = outcomes.len(),
                        error = %e,
                        "RunAll aborted"
                    );
                    return Err(e);
                }
            }
        }
        Ok(outcomes)
    }

    async fn run_single(&mut self, task: TaskName) -> Result<TaskOutcome, AppError> {
        let plan = task
            .plan(&self.routine)
            .ok_or_else(|| AppError::Config(format!("{task} is not a single task")))?;
        tracing::info!(
            target: "sequencer",
            task = %task,
            at = %chrono::Utc::now().to_rfc2822(),
            "Task started"
        );

        self.ensure_funding().await?;
        if let Some(input) = plan.ledger_dependency() {
            self.ledger.required_amount(input.name)?;
        }

        let mut outcome = TaskOutcome::new(task);
        match plan {
            TaskPlan::Wrap { wrapper, amount } => {
                self.wrap(&mut outcome, &wrapper, amount).await?;
            }
            TaskPlan::Unwrap { wrapper, amount } => {
                self.unwrap(&mut outcome, &wrapper, amount).await?;
            }
            TaskPlan::SwapNativeForToken {
                router,
                amount,
                path,
                output,
            } => {
                self.swap_native_for_token(&mut outcome, &router, amount, path, &output)
                    .await?;
            }
            TaskPlan::SwapTokenForToken {
                router,
                input,
                output,
                path,
            } => {
                let amount = self.ledger.required_amount(input.name)?;
                self.swap_token_for_token(&mut outcome, &router, &input, &output, amount, path)
                    .await?;
            }
            TaskPlan::SwapTokenForNative {
                router,
                input,
                path,
                settlement,
            } => {
                let amount = self.ledger.required_amount(input.name)?;
                self.swap_token_for_native(&mut outcome, &router, &input, amount, path, settlement)
                    .await?;
            }
        }

        tracing::info!(
            target: "sequencer",
            task = %task,
            transactions = outcome.receipts.len(),
            ledger_updates = outcome.ledger_updates.len(),
            at = %chrono::Utc::now().to_rfc2822(),
            "Task completed"
        );
        Ok(outcome)
    }

    async fn ensure_funding(&self) -> Result<(), AppError> {
        let balance = self
            .engine
            .client()
            .native_balance(self.engine.address())
            .await?;
        tracing::info!(target: "sequencer", balance = %format_ether(balance), "Native balance");
        if balance < self.routine.min_native_balance {
            return Err(AppError::InsufficientFunds {
                required: format!("{} {NATIVE_SYMBOL}", format_ether(self.routine.min_native_balance)),
                available: format!("{} {NATIVE_SYMBOL}", format_ether(balance)),
            });
        }
        Ok(())
    }

    async fn token_balance(&self, token: Address) -> Result<U256, AppError> {
        self.engine
            .client()
            .token_balance(token, self.engine.address())
            .await
    }

    async fn execute(&self, outcome: &mut TaskOutcome, call: PendingCall) -> Result<Receipt, AppError> {
        let receipt = self
            .engine
            .execute(call, self.routine.confirmations, self.routine.receipt_timeout)
            .await?;
        outcome.receipts.push(receipt);
        Ok(receipt)
    }

    fn deadline(&self) -> u64 {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        now.saturating_add(self.routine.swap_deadline.as_secs())
    }

    fn swap_request(&self, amount_in: U256, path: Vec<Address>) -> SwapRequest {
        SwapRequest {
            amount_in,
            amount_out_min: U256::ZERO,
            path,
            recipient: self.engine.address(),
            deadline: self.deadline(),
        }
    }

    async fn wrap(&self, outcome: &mut TaskOutcome, wrapper: &ContractTarget, amount: U256) -> Result<(), AppError> {
        let call = PendingCall::new(
            wrapper.address,
            IWrapper::depositCall {}.abi_encode(),
            self.routine.gas.wrap,
            format!("wrap {} into {}", format_ether(amount), wrapper.name),
        )
        .with_value(amount);
        self.execute(outcome, call).await?;
        Ok(())
    }

    async fn unwrap(&self, outcome: &mut TaskOutcome, wrapper: &ContractTarget, amount: U256) -> Result<(), AppError> {
        let wrapped = self.token_balance(wrapper.address).await?;
        if wrapped < amount {
            return Err(AppError::InsufficientFunds {
                required: format!("{} {}", format_ether(amount), wrapper.name),
                available: format!("{} {}", format_ether(wrapped), wrapper.name),
            });
        }
        self.withdraw(outcome, wrapper, amount).await
    }

    async fn withdraw(&self, outcome: &mut TaskOutcome, wrapper: &ContractTarget, amount: U256) -> Result<(), AppError> {
        let call = PendingCall::new(
            wrapper.address,
            IWrapper::withdrawCall { amount }.abi_encode(),
            self.routine.gas.wrap,
            format!("unwrap {} from {}", format_ether(amount), wrapper.name),
        );
        self.execute(outcome, call).await?;
        Ok(())
    }

    async fn approve(
        &self,
        outcome: &mut TaskOutcome,
        token: &ContractTarget,
        spender: &ContractTarget,
        amount: U256,
    ) -> Result<(), AppError> {
        let call = PendingCall::new(
            token.address,
            IERC20::approveCall {
                spender: spender.address,
                amount,
            }
            .abi_encode(),
            self.routine.gas.approve,
            format!("approve {amount} {} for {}", token.name, spender.name),
        );
        self.execute(outcome, call).await?;
        Ok(())
    }

    async fn swap_native_for_token(
        &mut self,
        outcome: &mut TaskOutcome,
        router: &Router,
        amount: U256,
        path: Vec<Address>,
        output: &ContractTarget,
    ) -> Result<(), AppError> {
        let req = self.swap_request(amount, path);
        let calldata = router.encoder.swap_exact_native_for_tokens(&req)?;
        let call = PendingCall::new(
            router.target.address,
            calldata,
            self.routine.gas.swap,
            format!("swap {} native for {} on {}", format_ether(amount), output.name, router.target.name),
        )
        .with_value(amount)
        .with_deadline(req.deadline);
        self.execute(outcome, call).await?;

        let received = self.token_balance(output.address).await?;
        self.commit_ledger(outcome, &[(output, received)], None).await
    }

    async fn swap_token_for_token(
        &mut self,
        outcome: &mut TaskOutcome,
        router: &Router,
        input: &ContractTarget,
        output: &ContractTarget,
        amount: U256,
        path: Vec<Address>,
    ) -> Result<(), AppError> {
        self.approve(outcome, input, &router.target, amount).await?;

        let req = self.swap_request(amount, path);
        let calldata = router.encoder.swap_exact_tokens_for_tokens(&req)?;
        let call = PendingCall::new(
            router.target.address,
            calldata,
            self.routine.gas.swap,
            format!("swap {amount} {} for {} on {}", input.name, output.name, router.target.name),
        )
        .with_deadline(req.deadline);
        self.execute(outcome, call).await?;

        let received = self.token_balance(output.address).await?;
        self.commit_ledger(outcome, &[(output, received)], Some(input))
            .await
    }

    async fn swap_token_for_native(
        &mut self,
        outcome: &mut TaskOutcome,
        router: &Router,
        input: &ContractTarget,
        amount: U256,
        path: Vec<Address>,
        settlement: NativeSettlement,
    ) -> Result<(), AppError> {
        self.approve(outcome, input, &router.target, amount).await?;

        let wrapped_before = match &settlement {
            NativeSettlement::Unwrap(wrapper) => self.token_balance(wrapper.address).await?,
            NativeSettlement::Router => U256::ZERO,
        };

        let req = self.swap_request(amount, path);
        let (calldata, label) = match &settlement {
            NativeSettlement::Router => (
                router.encoder.swap_exact_tokens_for_native(&req)?,
                format!("swap {amount} {} for native on {}", input.name, router.target.name),
            ),
            NativeSettlement::Unwrap(wrapper) => (
                router.encoder.swap_exact_tokens_for_tokens(&req)?,
                format!(
                    "swap {amount} {} for {} on {}",
                    input.name, wrapper.name, router.target.name
                ),
            ),
        };
        let call = PendingCall::new(router.target.address, calldata, self.routine.gas.swap, label)
            .with_deadline(req.deadline);
        self.execute(outcome, call).await?;

        if let NativeSettlement::Unwrap(wrapper) = &settlement {
            // Only the swap output; earlier deposits belong to the unwrap tasks.
            let received = self
                .token_balance(wrapper.address)
                .await?
                .saturating_sub(wrapped_before);
            if received.is_zero() {
                tracing::warn!(target: "sequencer", wrapper = %wrapper, "Swap left no wrapped output to unwrap");
            } else {
                tracing::info!(target: "sequencer", amount = %format_ether(received), wrapper = %wrapper, "Unwrapping swap output");
                self.withdraw(outcome, wrapper, received).await?;
            }
        }

        self.commit_ledger(outcome, &[], Some(input)).await
    }

    /// Record post-confirmation balances, optionally drop the spent entry,
    /// persist, and notify the publisher. No-op when nothing changes.
    async fn commit_ledger(
        &mut self,
        outcome: &mut TaskOutcome,
        observed: &[(&ContractTarget, U256)],
        consumed: Option<&ContractTarget>,
    ) -> Result<(), AppError> {
        let clear = consumed.filter(|_| self.routine.clear_consumed_amounts);
        if observed.is_empty() && clear.is_none() {
            return Ok(());
        }

        if self.engine.is_dry_run() {
            for (token, amount) in observed {
                tracing::info!(target: "ledger", token = token.name, amount = %amount, "Dry-run: would record");
            }
            return Ok(());
        }

        let mut next = self.ledger.clone();
        for (token, amount) in observed {
            next.record(token.name, *amount);
        }
        if let Some(spent) = clear {
            next.remove(spent.name);
        }
        next.persist(&self.routine.ledger_path)?;
        self.ledger = next;

        for (token, amount) in observed {
            tracing::info!(target: "ledger", token = token.name, amount = %amount, "Recorded balance");
            outcome.ledger_updates.push((token.name.to_string(), *amount));
        }
        publish_best_effort(self.publisher.as_ref(), &self.routine.ledger_path).await;
        Ok(())
    }
}
