// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::error::AppError;
use crate::network::client::ChainClient;
use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Hands out sequential nonces for the single signing account.
///
/// The first reservation seeds from the pending on-chain count; later ones
/// increment locally. After a rejected broadcast the slot is unknown, so the
/// engine calls [`NonceManager::resync`] before trying anything else.
#[derive(Clone)]
pub struct NonceManager {
    client: Arc<dyn ChainClient>,
    address: Address,
    local_nonce: Arc<Mutex<Option<u64>>>,
}

impl NonceManager {
    pub fn new(client: Arc<dyn ChainClient>, address: Address) -> Self {
        Self {
            client,
            address,
            local_nonce: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn reserve(&self) -> Result<u64, AppError> {
        let mut nonce_guard = self.local_nonce.lock().await;

        if let Some(nonce) = *nonce_guard {
            *nonce_guard = Some(nonce + 1);
            return Ok(nonce);
        }

        let on_chain_nonce = self.client.pending_nonce(self.address).await?;
        *nonce_guard = Some(on_chain_nonce + 1);
        tracing::debug!(target: "nonce", nonce = on_chain_nonce, "Seeded nonce from chain");
        Ok(on_chain_nonce)
    }

    pub async fn resync(&self) -> Result<(), AppError> {
        let mut nonce_guard = self.local_nonce.lock().await;
        let on_chain_nonce = self.client.pending_nonce(self.address).await?;
        *nonce_guard = Some(on_chain_nonce);
        tracing::info!(target: "nonce", nonce = on_chain_nonce, "Nonce resynced");
        Ok(())
    }
}
