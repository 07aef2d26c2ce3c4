// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

pub mod data_path;
pub mod retry;

// Shared alias for the crate-wide error type.
pub use crate::domain::error;
