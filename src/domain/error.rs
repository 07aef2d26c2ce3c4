// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed to endpoint: {0}")]
    Connection(String),

    #[error("Insufficient funds. Required: {required}, Available: {available}")]
    InsufficientFunds { required: String, available: String },

    #[error("No usable ledger amount for {token}; the step that records it was skipped or failed")]
    MissingAmount { token: String },

    #[error("Transaction rejected before inclusion ({label}): {reason}")]
    Submission { label: String, reason: String },

    #[error("Transaction reverted: {hash} ({label})")]
    Reverted { hash: String, label: String },

    #[error("No receipt for {hash} after {waited_ms}ms")]
    Timeout { hash: String, waited_ms: u64 },

    #[error("Ledger error at {path}: {reason}")]
    Ledger { path: String, reason: String },

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
