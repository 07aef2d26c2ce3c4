// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::constants;
use alloy::primitives::Address;
use alloy::sol;
use alloy::sol_types::SolCall;
use std::fmt;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    interface IWrapper {
        function deposit() external payable;
        function withdraw(uint256 amount) external;
        function balanceOf(address owner) external view returns (uint256);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Wrapper,
    Erc20,
    Router,
}

impl ContractKind {
    /// Canonical signatures callable on this kind of contract.
    pub fn signatures(self) -> Vec<&'static str> {
        match self {
            ContractKind::Wrapper => vec![
                IWrapper::depositCall::SIGNATURE,
                IWrapper::withdrawCall::SIGNATURE,
                IWrapper::balanceOfCall::SIGNATURE,
            ],
            ContractKind::Erc20 => vec![
                IERC20::approveCall::SIGNATURE,
                IERC20::allowanceCall::SIGNATURE,
                IERC20::balanceOfCall::SIGNATURE,
            ],
            // Router surfaces differ per deployment; see `services::routing`.
            ContractKind::Router => Vec::new(),
        }
    }
}

/// A deployed contract the routine talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTarget {
    pub name: &'static str,
    pub address: Address,
    pub kind: ContractKind,
}

impl ContractTarget {
    pub const fn new(name: &'static str, address: Address, kind: ContractKind) -> Self {
        Self {
            name,
            address,
            kind,
        }
    }
}

impl fmt::Display for ContractTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:#x})", self.name, self.address)
    }
}

/// The fixed set of contracts the daily routine uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSet {
    pub wrapper_1: ContractTarget,
    pub wrapper_2: ContractTarget,
    pub dex_1_router: ContractTarget,
    pub dex_2_router: ContractTarget,
    pub usdc_old: ContractTarget,
    pub tether: ContractTarget,
    pub usdc: ContractTarget,
}

impl Default for ContractSet {
    fn default() -> Self {
        Self {
            wrapper_1: ContractTarget::new("WRAPPER_1", constants::WRAPPER_1, ContractKind::Wrapper),
            wrapper_2: ContractTarget::new("WRAPPER_2", constants::WRAPPER_2, ContractKind::Wrapper),
            dex_1_router: ContractTarget::new(
                "DEX_1_ROUTER",
                constants::DEX_1_ROUTER,
                ContractKind::Router,
            ),
            dex_2_router: ContractTarget::new(
                "DEX_2_ROUTER",
                constants::DEX_2_ROUTER,
                ContractKind::Router,
            ),
            usdc_old: ContractTarget::new(constants::LEDGER_USDC_OLD, constants::USDC_OLD, ContractKind::Erc20),
            tether: ContractTarget::new(constants::LEDGER_TETHER, constants::TETHER, ContractKind::Erc20),
            usdc: ContractTarget::new(constants::LEDGER_USDC, constants::USDC, ContractKind::Erc20),
        }
    }
}

impl ContractSet {
    pub fn all(&self) -> [&ContractTarget; 7] {
        [
            &self.wrapper_1,
            &self.wrapper_2,
            &self.dex_1_router,
            &self.dex_2_router,
            &self.usdc_old,
            &self.tether,
            &self.usdc,
        ]
    }
}
