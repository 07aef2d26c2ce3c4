// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod engine;

pub use engine::{EngineConfig, TransactionEngine};
