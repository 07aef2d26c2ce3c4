// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "DATA_DIR";

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

fn env_data_dir() -> Option<String> {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the ledger file location.
///
/// Absolute paths are kept. Relative paths are joined onto `DATA_DIR`
/// (env first, then the configured value) or, when neither is set, the
/// working directory the scheduler launched us from. The ledger lives
/// next to the checkout so the publisher can commit it.
pub fn resolve_data_path(raw_path: &str, configured_data_dir: Option<&str>) -> PathBuf {
    let as_path = PathBuf::from(raw_path.trim());
    if as_path.is_absolute() {
        return as_path;
    }
    let data_dir = env_data_dir().or_else(|| {
        configured_data_dir
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    });
    match data_dir {
        Some(dir) => absolute(PathBuf::from(dir)).join(as_path),
        None => absolute(as_path),
    }
}

/// Sibling lock file guarding a data file against overlapping invocations.
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}
