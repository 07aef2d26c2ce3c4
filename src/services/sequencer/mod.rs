// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod runner;
pub mod tasks;

pub use runner::{TaskOutcome, TaskSequencer};
pub use tasks::{GasLimits, NativeSettlement, RoutineConfig, TaskName, TaskPlan};
