// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_PHAROS_TESTNET: u64 = 688_688;
pub const DEFAULT_RPC_URL: &str = "https://testnet.dplabs-internal.com";
pub const NATIVE_SYMBOL: &str = "PHRS";

// =============================================================================
// DEPLOYED CONTRACTS (Pharos testnet)
// =============================================================================

pub const WRAPPER_1: Address = address!("3019B247381c850ab53Dc0EE53bCe7A07Ea9155f");
pub const WRAPPER_2: Address = address!("76aaaDA469D23216bE5f7C596fA25F282Ff9b364");
pub const DEX_1_ROUTER: Address = address!("1A4DE519154Ae51200b0Ad7c90F7faC75547888a");
pub const DEX_2_ROUTER: Address = address!("3541423f25A1Ca5C98fdBCf478405d3f0aaD1164");
pub const USDC_OLD: Address = address!("ad902cf99c2de2f1ba5ec4d642fd7e49cae9ee37");
pub const TETHER: Address = address!("d4071393f8716661958f766df660033b3d35fd29");
pub const USDC: Address = address!("72df0bcd7276f2dfbac900d1ce63c272c4bccced");

// Ledger keys
pub const LEDGER_USDC_OLD: &str = "USDC_OLD";
pub const LEDGER_TETHER: &str = "TETHER";
pub const LEDGER_USDC: &str = "USDC";

/// Keys written by earlier revisions of the routine, mapped to their current symbol.
pub const LEGACY_LEDGER_KEYS: [(&str, &str); 3] = [
    ("USDC_OLD_amount", LEDGER_USDC_OLD),
    ("TETHER_USD_amount", LEDGER_TETHER),
    ("USDC_amount", LEDGER_USDC),
];

// =============================================================================
// AMOUNTS (wei of the 18-decimal native unit)
// =============================================================================

/// 0.001 native
pub const SMALL_NATIVE_AMOUNT_WEI: u128 = 1_000_000_000_000_000;
/// 0.01 native
pub const LARGE_NATIVE_AMOUNT_WEI: u128 = 10_000_000_000_000_000;
/// Tasks refuse to start below this balance.
pub const MIN_NATIVE_BALANCE_WEI: u128 = SMALL_NATIVE_AMOUNT_WEI;

// =============================================================================
// GAS & TRANSACTION CONSTANTS
// =============================================================================

pub const DEFAULT_WRAP_GAS_LIMIT: u64 = 100_000;
pub const DEFAULT_APPROVE_GAS_LIMIT: u64 = 100_000;
pub const DEFAULT_SWAP_GAS_LIMIT: u64 = 450_000;
pub const DEFAULT_MAX_GAS_PRICE_GWEI: u64 = 200;
pub const DEFAULT_MULTICALL_FEE_TIER: u32 = 3_000;

pub const DEFAULT_SWAP_DEADLINE_SECS: u64 = 600;
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 2_000;
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 600_000;
pub const DEFAULT_RECEIPT_CONFIRM_BLOCKS: u64 = 1;

pub const DEFAULT_AMOUNTS_FILE: &str = "amounts.json";
