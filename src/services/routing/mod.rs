// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod encoders;
pub mod routers;

use crate::data::contracts::ContractTarget;
use encoders::CalldataEncoder;
use std::sync::Arc;

/// A deployed router and the encoder that speaks its dialect.
#[derive(Debug, Clone)]
pub struct Router {
    pub target: ContractTarget,
    pub encoder: Arc<dyn CalldataEncoder>,
}

impl Router {
    pub fn new(target: ContractTarget, encoder: Arc<dyn CalldataEncoder>) -> Self {
        Self { target, encoder }
    }
}
