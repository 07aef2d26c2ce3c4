// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::data_path::lock_path_for;
use crate::common::error::AppError;
use crate::domain::constants::LEGACY_LEDGER_KEYS;
use alloy::primitives::U256;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Token symbol -> last observed balance, as a decimal string.
///
/// This file is the only state that survives between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountLedger {
    entries: BTreeMap<String, String>,
}

impl AmountLedger {
    /// Read the ledger, treating a missing or unreadable file as empty.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(target: "ledger", path = %path.display(), "No ledger yet; starting empty");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(target: "ledger", path = %path.display(), error = %e, "Ledger unreadable; starting empty");
                return Self::default();
            }
        };
        match Self::from_json_str(&raw) {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!(target: "ledger", path = %path.display(), error = %e, "Ledger malformed; starting empty");
                Self::default()
            }
        }
    }

    /// Parse a ledger document. Numbers are accepted alongside strings and
    /// keys from earlier revisions are renamed to their current symbol.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: BTreeMap<String, Value> = serde_json::from_str(raw)?;
        let mut entries = BTreeMap::new();
        for (key, value) in parsed {
            let amount = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => {
                    tracing::warn!(target: "ledger", key = %key, value = %other, "Skipping non-amount ledger entry");
                    continue;
                }
            };
            entries.insert(key, amount);
        }
        for (legacy, current) in LEGACY_LEDGER_KEYS {
            if let Some(amount) = entries.remove(legacy) {
                entries.entry(current.to_string()).or_insert(amount);
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    /// The amount a dependent step must spend. Absent, zero or unparsable
    /// entries all mean the recording step did not happen.
    pub fn required_amount(&self, token: &str) -> Result<U256, AppError> {
        let missing = || AppError::MissingAmount {
            token: token.to_string(),
        };
        let raw = self.entries.get(token).ok_or_else(missing)?;
        let amount = U256::from_str_radix(raw.trim(), 10).map_err(|_| missing())?;
        if amount.is_zero() {
            return Err(missing());
        }
        Ok(amount)
    }

    pub fn record(&mut self, token: &str, amount: U256) {
        self.entries.insert(token.to_string(), amount.to_string());
    }

    pub fn remove(&mut self, token: &str) -> Option<String> {
        self.entries.remove(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_pretty_json(&self) -> String {
        // BTreeMap<String, String> always serializes.
        serde_json::to_string_pretty(&self.entries).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn persist(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ledger_err(path, e))?;
        }
        fs::write(path, self.to_pretty_json()).map_err(|e| ledger_err(path, e))?;
        tracing::info!(target: "ledger", path = %path.display(), entries = self.entries.len(), "Ledger written");
        Ok(())
    }
}

fn ledger_err(path: &Path, e: std::io::Error) -> AppError {
    AppError::Ledger {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Exclusive marker that keeps two scheduled runs from interleaving ledger
/// reads and writes. Released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
}

impl LedgerLock {
    pub fn acquire(ledger_path: &Path) -> Result<Self, AppError> {
        let path = lock_path_for(ledger_path);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::Config(format!(
                    "another run holds {}; remove it if no run is active",
                    path.display()
                )));
            }
            Err(e) => return Err(ledger_err(&path, e)),
        };
        // Informational only.
        let _ = writeln!(file, "{}", std::process::id());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(target: "ledger", path = %self.path.display(), error = %e, "Failed to release ledger lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = AmountLedger::load(&dir.path().join("amounts.json"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amounts.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AmountLedger::load(&path).is_empty());
    }

    #[test]
    fn legacy_keys_are_migrated() {
        let ledger =
            AmountLedger::from_json_str(r#"{"TETHER_USD_amount": "42", "USDC": 7}"#).unwrap();
        assert_eq!(ledger.get("TETHER"), Some("42"));
        assert_eq!(ledger.get("USDC"), Some("7"));
        assert_eq!(ledger.get("TETHER_USD_amount"), None);
    }

    #[test]
    fn current_key_wins_over_legacy() {
        let ledger =
            AmountLedger::from_json_str(r#"{"USDC_amount": "1", "USDC": "2"}"#).unwrap();
        assert_eq!(ledger.get("USDC"), Some("2"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn zero_and_absent_amounts_are_missing() {
        let ledger =
            AmountLedger::from_json_str(r#"{"TETHER": "0", "USDC": "abc"}"#).unwrap();
        for token in ["TETHER", "USDC", "USDC_OLD"] {
            assert!(matches!(
                ledger.required_amount(token),
                Err(AppError::MissingAmount { token: t }) if t == token
            ));
        }
    }

    #[test]
    fn persists_two_space_indented_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("amounts.json");
        let mut ledger = AmountLedger::default();
        ledger.record("USDC", U256::from(1_234_567u64));
        ledger.persist(&path).unwrap();

        let body = fs::read_to_string(&path).unwrap();
        assert_eq!(body, "{\n  \"USDC\": \"1234567\"\n}");
        assert_eq!(AmountLedger::load(&path), ledger);
    }

    #[test]
    fn lock_is_exclusive_and_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("amounts.json");

        let lock = LedgerLock::acquire(&ledger_path).unwrap();
        assert!(lock.path().exists());
        assert!(matches!(
            LedgerLock::acquire(&ledger_path),
            Err(AppError::Config(_))
        ));

        drop(lock);
        assert!(LedgerLock::acquire(&ledger_path).is_ok());
    }
}
