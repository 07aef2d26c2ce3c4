// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::services::routing::routers::{MulticallDeadline, UniV2Router, V3SwapRouter02};
use alloy::primitives::aliases::U24;
use alloy::primitives::{Address, Bytes, U160, U256, keccak256};
use alloy::sol_types::abi::TokenSeq;
use alloy::sol_types::{SolCall, SolType, SolValue};
use std::fmt;
use std::str::FromStr;

/// Inputs shared by every router entry point the routine uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub amount_in: U256,
    pub amount_out_min: U256,
    /// Token hops, first is spent and last is received. Native legs use the
    /// wrapped token address.
    pub path: Vec<Address>,
    pub recipient: Address,
    pub deadline: u64,
}

impl SwapRequest {
    fn checked_path(&self) -> Result<&[Address], AppError> {
        if self.path.len() < 2 {
            return Err(AppError::Config(format!(
                "swap path needs at least two tokens, got {}",
                self.path.len()
            )));
        }
        Ok(&self.path)
    }
}

/// Builds swap calldata for one deployed router.
///
/// Implementations are pure: equal requests give equal bytes.
pub trait CalldataEncoder: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn swap_exact_native_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError>;

    fn swap_exact_tokens_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError>;

    fn swap_exact_tokens_for_native(&self, req: &SwapRequest) -> Result<Bytes, AppError>;
}

/// First four bytes of the keccak hash of a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `selector ++ abi_encode_params(params)`, skipping any generated binding.
pub fn encode_with_selector<T>(selector: [u8; 4], params: &T) -> Bytes
where
    T: SolValue,
    for<'a> <T::SolType as SolType>::Token<'a>: TokenSeq<'a>,
{
    let encoded = params.abi_encode_params();
    let mut out = Vec::with_capacity(4 + encoded.len());
    out.extend_from_slice(&selector);
    out.extend_from_slice(&encoded);
    out.into()
}

// =============================================================================
// Stock V2 router
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardV2Encoder;

impl CalldataEncoder for StandardV2Encoder {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn swap_exact_native_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        let call = UniV2Router::swapExactETHForTokensCall {
            amountOutMin: req.amount_out_min,
            path: req.checked_path()?.to_vec(),
            to: req.recipient,
            deadline: U256::from(req.deadline),
        };
        Ok(call.abi_encode().into())
    }

    fn swap_exact_tokens_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        let call = UniV2Router::swapExactTokensForTokensCall {
            amountIn: req.amount_in,
            amountOutMin: req.amount_out_min,
            path: req.checked_path()?.to_vec(),
            to: req.recipient,
            deadline: U256::from(req.deadline),
        };
        Ok(call.abi_encode().into())
    }

    fn swap_exact_tokens_for_native(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        let call = UniV2Router::swapExactTokensForETHCall {
            amountIn: req.amount_in,
            amountOutMin: req.amount_out_min,
            path: req.checked_path()?.to_vec(),
            to: req.recipient,
            deadline: U256::from(req.deadline),
        };
        Ok(call.abi_encode().into())
    }
}

// =============================================================================
// Fee-on-transfer entry points, encoded from raw selectors
// =============================================================================

const FOT_NATIVE_FOR_TOKENS: &str =
    "swapExactETHForTokensSupportingFeeOnTransferTokens(uint256,address[],address,uint256)";
const FOT_TOKENS_FOR_TOKENS: &str =
    "swapExactTokensForTokensSupportingFeeOnTransferTokens(uint256,uint256,address[],address,uint256)";
const FOT_TOKENS_FOR_NATIVE: &str =
    "swapExactTokensForETHSupportingFeeOnTransferTokens(uint256,uint256,address[],address,uint256)";

/// Router whose only working swap functions are the fee-on-transfer variants.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeeOnTransferEncoder;

impl FeeOnTransferEncoder {
    fn token_input(signature: &str, req: &SwapRequest) -> Result<Bytes, AppError> {
        let params = (
            req.amount_in,
            req.amount_out_min,
            req.checked_path()?.to_vec(),
            req.recipient,
            U256::from(req.deadline),
        );
        Ok(encode_with_selector(selector(signature), &params))
    }
}

impl CalldataEncoder for FeeOnTransferEncoder {
    fn name(&self) -> &'static str {
        "fee_on_transfer"
    }

    fn swap_exact_native_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        let params = (
            req.amount_out_min,
            req.checked_path()?.to_vec(),
            req.recipient,
            U256::from(req.deadline),
        );
        Ok(encode_with_selector(selector(FOT_NATIVE_FOR_TOKENS), &params))
    }

    fn swap_exact_tokens_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        Self::token_input(FOT_TOKENS_FOR_TOKENS, req)
    }

    fn swap_exact_tokens_for_native(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        Self::token_input(FOT_TOKENS_FOR_NATIVE, req)
    }
}

// =============================================================================
// V3-style router behind multicall(uint256 deadline, bytes[] data)
// =============================================================================

/// SwapRouter02 sentinel for "keep the output in the router".
const ADDRESS_THIS: Address = Address::with_last_byte(2);
const MAX_FEE_TIER: u32 = (1 << 24) - 1;

#[derive(Debug, Clone, Copy)]
pub struct MulticallEncoder {
    fee_tier: u32,
}

impl MulticallEncoder {
    pub fn new(fee_tier: u32) -> Result<Self, AppError> {
        if fee_tier > MAX_FEE_TIER {
            return Err(AppError::Config(format!(
                "multicall fee tier {fee_tier} does not fit in uint24"
            )));
        }
        Ok(Self { fee_tier })
    }

    fn packed_path(&self, path: &[Address]) -> Bytes {
        let fee = self.fee_tier.to_be_bytes();
        let mut out = Vec::with_capacity(path.len() * 23);
        for (i, token) in path.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(&fee[1..]);
            }
            out.extend_from_slice(token.as_slice());
        }
        out.into()
    }

    fn swap_leg(&self, req: &SwapRequest, recipient: Address) -> Result<Bytes, AppError> {
        let path = req.checked_path()?;
        let leg = if path.len() == 2 {
            V3SwapRouter02::exactInputSingleCall {
                params: V3SwapRouter02::ExactInputSingleParams {
                    tokenIn: path[0],
                    tokenOut: path[1],
                    fee: U24::from(self.fee_tier),
                    recipient,
                    amountIn: req.amount_in,
                    amountOutMinimum: req.amount_out_min,
                    sqrtPriceLimitX96: U160::ZERO,
                },
            }
            .abi_encode()
        } else {
            V3SwapRouter02::exactInputCall {
                params: V3SwapRouter02::ExactInputParams {
                    path: self.packed_path(path),
                    recipient,
                    amountIn: req.amount_in,
                    amountOutMinimum: req.amount_out_min,
                },
            }
            .abi_encode()
        };
        Ok(leg.into())
    }

    fn wrap(&self, deadline: u64, data: Vec<Bytes>) -> Bytes {
        MulticallDeadline::multicallCall {
            deadline: U256::from(deadline),
            data,
        }
        .abi_encode()
        .into()
    }
}

impl CalldataEncoder for MulticallEncoder {
    fn name(&self) -> &'static str {
        "multicall"
    }

    fn swap_exact_native_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        // The router wraps msg.value itself when tokenIn is the wrapped token.
        let leg = self.swap_leg(req, req.recipient)?;
        Ok(self.wrap(req.deadline, vec![leg]))
    }

    fn swap_exact_tokens_for_tokens(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        let leg = self.swap_leg(req, req.recipient)?;
        Ok(self.wrap(req.deadline, vec![leg]))
    }

    fn swap_exact_tokens_for_native(&self, req: &SwapRequest) -> Result<Bytes, AppError> {
        let leg = self.swap_leg(req, ADDRESS_THIS)?;
        let unwrap = V3SwapRouter02::unwrapWETH9Call {
            amountMinimum: req.amount_out_min,
            recipient: req.recipient,
        }
        .abi_encode();
        Ok(self.wrap(req.deadline, vec![leg, unwrap.into()]))
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Which [`CalldataEncoder`] a router is driven with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterEncoding {
    Standard,
    FeeOnTransfer,
    Multicall,
}

impl RouterEncoding {
    pub fn encoder(self, fee_tier: u32) -> Result<Box<dyn CalldataEncoder>, AppError> {
        Ok(match self {
            RouterEncoding::Standard => Box::new(StandardV2Encoder),
            RouterEncoding::FeeOnTransfer => Box::new(FeeOnTransferEncoder),
            RouterEncoding::Multicall => Box::new(MulticallEncoder::new(fee_tier)?),
        })
    }
}

impl FromStr for RouterEncoding {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" | "v2" => Ok(RouterEncoding::Standard),
            "fee_on_transfer" | "fot" => Ok(RouterEncoding::FeeOnTransfer),
            "multicall" | "v3" => Ok(RouterEncoding::Multicall),
            other => Err(AppError::Config(format!(
                "unknown router encoding '{other}' (expected standard, fee_on_transfer or multicall)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::hex;

    const A: Address = Address::repeat_byte(0xaa);
    const B: Address = Address::repeat_byte(0xbb);
    const C: Address = Address::repeat_byte(0xcc);
    const ME: Address = Address::repeat_byte(0x11);

    fn req(path: Vec<Address>) -> SwapRequest {
        SwapRequest {
            amount_in: U256::from(1_000_000u64),
            amount_out_min: U256::ZERO,
            path,
            recipient: ME,
            deadline: 1_700_000_600,
        }
    }

    fn word(v: u64) -> String {
        format!("{v:064x}")
    }

    fn addr_word(a: Address) -> String {
        format!("{:0>64}", hex::encode(a.as_slice()))
    }

    #[test]
    fn selectors_match_known_values() {
        assert_eq!(selector(FOT_TOKENS_FOR_TOKENS), [0x5c, 0x11, 0xd7, 0x95]);
        assert_eq!(selector(FOT_NATIVE_FOR_TOKENS), [0xb6, 0xf9, 0xde, 0x95]);
        assert_eq!(selector(FOT_TOKENS_FOR_NATIVE), [0x79, 0x1a, 0xc9, 0x47]);
        assert_eq!(
            MulticallDeadline::multicallCall::SELECTOR,
            [0x5a, 0xe4, 0x01, 0xdc]
        );
        assert_eq!(
            V3SwapRouter02::exactInputSingleCall::SELECTOR,
            [0x04, 0xe4, 0x5a, 0xaf]
        );
        assert_eq!(
            V3SwapRouter02::unwrapWETH9Call::SELECTOR,
            [0x49, 0x40, 0x4b, 0x7c]
        );
    }

    #[test]
    fn fee_on_transfer_tokens_matches_known_bytes() {
        let got = FeeOnTransferEncoder
            .swap_exact_tokens_for_tokens(&req(vec![A, B]))
            .unwrap();
        let expected = [
            "5c11d795".to_string(),
            word(1_000_000),
            word(0),
            word(0xa0),
            addr_word(ME),
            word(1_700_000_600),
            word(2),
            addr_word(A),
            addr_word(B),
        ]
        .concat();
        assert_eq!(hex::encode(&got), expected);
    }

    #[test]
    fn raw_selector_encoding_agrees_with_binding() {
        let r = req(vec![A, B, C]);
        let generated =
            UniV2Router::swapExactTokensForETHSupportingFeeOnTransferTokensCall {
                amountIn: r.amount_in,
                amountOutMin: r.amount_out_min,
                path: r.path.clone(),
                to: r.recipient,
                deadline: U256::from(r.deadline),
            }
            .abi_encode();
        let ours = FeeOnTransferEncoder.swap_exact_tokens_for_native(&r).unwrap();
        assert_eq!(ours.as_ref(), generated.as_slice());
    }

    #[test]
    fn standard_uses_stock_selectors() {
        let r = req(vec![A, B]);
        let enc = StandardV2Encoder;
        assert_eq!(
            &enc.swap_exact_native_for_tokens(&r).unwrap()[..4],
            &[0x7f, 0xf3, 0x6a, 0xb5]
        );
        assert_eq!(
            &enc.swap_exact_tokens_for_tokens(&r).unwrap()[..4],
            &[0x38, 0xed, 0x17, 0x39]
        );
        assert_eq!(
            &enc.swap_exact_tokens_for_native(&r).unwrap()[..4],
            &[0x18, 0xcb, 0xaf, 0xe5]
        );
    }

    #[test]
    fn encoders_are_deterministic() {
        let encoders: Vec<Box<dyn CalldataEncoder>> = vec![
            Box::new(StandardV2Encoder),
            Box::new(FeeOnTransferEncoder),
            Box::new(MulticallEncoder::new(500).unwrap()),
        ];
        let r = req(vec![A, B, C]);
        for enc in encoders {
            assert_eq!(
                enc.swap_exact_tokens_for_tokens(&r).unwrap(),
                enc.swap_exact_tokens_for_tokens(&r.clone()).unwrap(),
                "{}",
                enc.name()
            );
            assert_eq!(
                enc.swap_exact_native_for_tokens(&r).unwrap(),
                enc.swap_exact_native_for_tokens(&r).unwrap(),
                "{}",
                enc.name()
            );
        }
    }

    #[test]
    fn multicall_native_out_unwraps_to_recipient() {
        let enc = MulticallEncoder::new(3000).unwrap();
        let r = req(vec![A, B]);
        let data = enc.swap_exact_tokens_for_native(&r).unwrap();
        let decoded = MulticallDeadline::multicallCall::abi_decode(&data).unwrap();

        assert_eq!(decoded.deadline, U256::from(r.deadline));
        assert_eq!(decoded.data.len(), 2);

        let swap = V3SwapRouter02::exactInputSingleCall::abi_decode(&decoded.data[0]).unwrap();
        assert_eq!(swap.params.recipient, ADDRESS_THIS);
        assert_eq!(swap.params.fee, U24::from(3000u32));
        assert_eq!(swap.params.amountIn, r.amount_in);

        let unwrap = V3SwapRouter02::unwrapWETH9Call::abi_decode(&decoded.data[1]).unwrap();
        assert_eq!(unwrap.recipient, ME);
    }

    #[test]
    fn multicall_multi_hop_packs_path() {
        let enc = MulticallEncoder::new(500).unwrap();
        let data = enc.swap_exact_tokens_for_tokens(&req(vec![A, B, C])).unwrap();
        let decoded = MulticallDeadline::multicallCall::abi_decode(&data).unwrap();
        let leg = V3SwapRouter02::exactInputCall::abi_decode(&decoded.data[0]).unwrap();

        let path = leg.params.path;
        assert_eq!(path.len(), 20 + 3 + 20 + 3 + 20);
        assert_eq!(&path[..20], A.as_slice());
        assert_eq!(&path[20..23], &[0x00, 0x01, 0xf4]);
        assert_eq!(&path[43..46], &[0x00, 0x01, 0xf4]);
        assert_eq!(&path[46..], C.as_slice());
    }

    #[test]
    fn short_path_is_rejected() {
        let err = FeeOnTransferEncoder
            .swap_exact_tokens_for_tokens(&req(vec![A]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn fee_tier_must_fit_uint24() {
        assert!(MulticallEncoder::new(1 << 24).is_err());
        assert!(MulticallEncoder::new(10_000).is_ok());
    }

    #[test]
    fn parses_encoding_names() {
        assert_eq!(
            "fee-on-transfer".parse::<RouterEncoding>().unwrap(),
            RouterEncoding::FeeOnTransfer
        );
        assert_eq!(
            " Multicall ".parse::<RouterEncoding>().unwrap(),
            RouterEncoding::Multicall
        );
        assert!("uniswap".parse::<RouterEncoding>().is_err());
    }
}
