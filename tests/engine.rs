// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

mod common;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use common::FakeChain;
use pharos_routine::domain::error::AppError;
use pharos_routine::domain::types::PendingCall;
use std::time::Duration;

fn call(label: &str) -> PendingCall {
    PendingCall::new(Address::repeat_byte(0x11), vec![0xd0, 0xe3, 0x0d, 0xb0], 100_000, label)
        .with_value(U256::from(5u64))
}

#[tokio::test]
async fn sequential_calls_use_consecutive_nonces() {
    let chain = FakeChain::new();
    let engine = common::engine(chain.clone(), false);

    engine.execute(call("first"), 1, Duration::from_secs(1)).await.expect("first");
    engine.execute(call("second"), 1, Duration::from_secs(1)).await.expect("second");

    let sent = chain.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].nonce, 0);
    assert_eq!(sent[1].nonce, 1);
    assert_eq!(sent[0].value, U256::from(5u64));
    assert_eq!(chain.pending_nonce_reads(), 1);
}

#[tokio::test]
async fn reverted_receipt_is_an_error_naming_the_call() {
    let chain = FakeChain::new();
    chain.revert_nth(1);
    let engine = common::engine(chain.clone(), false);

    let err = engine
        .execute(call("approve TETHER"), 1, Duration::from_secs(1))
        .await
        .unwrap_err();
    let sent = chain.sent();
    match err {
        AppError::Reverted { hash, label } => {
            assert_eq!(label, "approve TETHER");
            assert_eq!(hash, format!("{:#x}", sent[0].hash));
        }
        other => panic!("expected revert, got {other:?}"),
    }
}

#[tokio::test]
async fn await_confirmation_returns_reverted_receipt_without_failing() {
    let chain = FakeChain::new();
    chain.revert_nth(1);
    let engine = common::engine(chain, false);

    let handle = engine.submit(&call("wrap")).await.expect("submit");
    let receipt = engine
        .await_confirmation(&handle, 1, Duration::from_secs(1))
        .await
        .expect("receipt");
    assert!(!receipt.success);
    assert_eq!(receipt.tx_hash, handle.hash);
}

#[tokio::test(start_paused = true)]
async fn missing_receipt_times_out() {
    let chain = FakeChain::new();
    chain.never_mine();
    let engine = common::engine(chain, false);

    let handle = engine.submit(&call("swap")).await.expect("submit");
    let err = engine
        .await_confirmation(&handle, 1, Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Timeout { waited_ms: 1_000, .. }));
}

#[tokio::test(start_paused = true)]
async fn receipt_arriving_just_before_deadline_is_accepted() {
    let chain = FakeChain::new();
    chain.mine_delay(Duration::from_millis(995));
    let engine = common::engine(chain, false);

    let receipt = engine
        .execute(call("swap"), 1, Duration::from_secs(1))
        .await
        .expect("mined in time");
    assert!(receipt.success);
}

#[tokio::test(start_paused = true)]
async fn waits_for_requested_confirmation_depth() {
    let chain = FakeChain::new();
    chain.advance_blocks_on_read();
    let engine = common::engine(chain, false);

    let receipt = engine
        .execute(call("wrap"), 3, Duration::from_secs(5))
        .await
        .expect("confirmed");
    assert_eq!(receipt.block_number, 101);
}

#[tokio::test]
async fn rejected_broadcast_is_a_submission_error_and_resyncs_nonce() {
    let chain = FakeChain::new();
    chain.reject_sends(true);
    let engine = common::engine(chain.clone(), false);

    let err = engine.submit(&call("unwrap")).await.unwrap_err();
    assert!(matches!(err, AppError::Submission { ref label, .. } if label == "unwrap"));
    assert!(chain.sent().is_empty());
    assert_eq!(chain.pending_nonce_reads(), 2);

    chain.reject_sends(false);
    engine.submit(&call("unwrap")).await.expect("retry");
    assert_eq!(chain.sent()[0].nonce, 0);
}

#[tokio::test]
async fn dry_run_never_broadcasts() {
    let chain = FakeChain::new();
    let engine = common::engine(chain.clone(), true);

    let receipt = engine
        .execute(call("wrap"), 1, Duration::from_secs(1))
        .await
        .expect("dry run");
    assert!(receipt.success);
    assert!(chain.sent().is_empty());
}

#[tokio::test]
async fn signing_failure_releases_the_reserved_nonce() {
    let chain = FakeChain::new();
    // A signer pinned to another chain refuses to sign for this one.
    let mismatched = PrivateKeySigner::random().with_chain_id(Some(1));
    let engine = common::engine_with_signer(chain.clone(), mismatched, false);

    let err = engine.submit(&call("wrap")).await.unwrap_err();
    assert!(matches!(err, AppError::Submission { ref reason, .. } if reason.contains("Sign tx failed")));
    assert!(chain.sent().is_empty());
    assert_eq!(chain.pending_nonce_reads(), 2);
}
