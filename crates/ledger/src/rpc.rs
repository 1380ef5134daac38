//! JSON-RPC implementation of the `Ledger` trait.
//!
//! Talks to an RPC gateway exposing the AssetToken and Marketplace
//! contracts' named methods. State-changing calls are two-phase: `tx.send`
//! submits and returns a transaction hash, then the gateway is polled with
//! `tx.receipt` until the transaction is confirmed or reverted. There is no
//! client-imposed confirmation timeout; a submitted transaction is
//! irrevocable and abandoning the poll does not undo it.
//!
//! Receipt polls are read-only and safely repeatable, so a transient
//! transport failure mid-poll is retried a bounded number of times rather
//! than abandoning a transaction that may still confirm. Submissions
//! themselves are never retried.

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::types::{
    Auction, AssetRequest, KycRequest, Listing, Receipt, Signer, TxHash, is_valid_address,
};
use crate::Ledger;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Consecutive transport failures tolerated while polling a receipt
const MAX_RECEIPT_POLL_RETRIES: u32 = 5;

/// Whether a failed receipt poll should be repeated. Only transport
/// failures qualify: a rejection or an undecodable payload is the gateway
/// answering, and repeating the read will not change the answer.
fn retry_receipt_poll(error: &LedgerError, failures: u32) -> bool {
    error.is_transport() && failures < MAX_RECEIPT_POLL_RETRIES
}

pub struct HttpLedger {
    config: LedgerConfig,
    client: reqwest::Client,
}

impl HttpLedger {
    /// Build a gateway handle from validated configuration.
    /// Fails at startup on bad configuration, never lazily on first use.
    pub fn new(config: LedgerConfig) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid ledger configuration: {}", e))?;
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transport(format!(
                "gateway returned {} {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;

        // A JSON-RPC error is the ledger answering: carry its message verbatim
        if let Some(err) = envelope.get("error") {
            let reason = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown ledger error")
                .to_string();
            return Err(LedgerError::Rejected { reason });
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| LedgerError::InvalidResponse("missing result field".to_string()))
    }

    /// Submit a state-changing contract call and await its confirmation
    async fn send(
        &self,
        contract: &str,
        method: &str,
        signer: &Signer,
        args: Value,
    ) -> Result<Receipt> {
        if !is_valid_address(&signer.address) {
            return Err(LedgerError::SignerUnavailable);
        }

        let result = self
            .rpc(
                "tx.send",
                json!({
                    "contract": contract,
                    "method": method,
                    "from": signer.address,
                    "args": args,
                }),
            )
            .await?;

        let tx_hash = result
            .get("txHash")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LedgerError::InvalidResponse("tx.send returned no txHash".to_string()))?;

        debug!(%tx_hash, method, "transaction submitted, awaiting confirmation");
        self.wait_for_receipt(TxHash(tx_hash)).await
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt> {
        let interval = Duration::from_secs(self.config.confirm_interval_secs);
        let mut failures = 0u32;
        loop {
            let result = match self.rpc("tx.receipt", json!({ "txHash": tx_hash.0 })).await {
                Ok(result) => {
                    failures = 0;
                    result
                }
                Err(e) if retry_receipt_poll(&e, failures) => {
                    failures += 1;
                    warn!(tx_hash = %tx_hash, error = %e, failures, "receipt poll failed, retrying");
                    sleep(interval).await;
                    continue;
                }
                Err(e) => return Err(e),
            };
            match result.get("status").and_then(|v| v.as_str()) {
                Some("confirmed") => {
                    let request_id = result.get("requestId").and_then(|v| v.as_u64());
                    debug!(tx_hash = %tx_hash, ?request_id, "transaction confirmed");
                    return Ok(Receipt {
                        tx_hash,
                        request_id,
                    });
                }
                Some("reverted") => {
                    let reason = result
                        .get("reason")
                        .and_then(|v| v.as_str())
                        .unwrap_or("execution reverted")
                        .to_string();
                    return Err(LedgerError::Rejected { reason });
                }
                Some("pending") | None => sleep(interval).await,
                Some(other) => {
                    return Err(LedgerError::InvalidResponse(format!(
                        "unknown receipt status: {}",
                        other
                    )));
                }
            }
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        contract: &str,
        method: &str,
        args: Value,
    ) -> Result<T> {
        let result = self
            .rpc(
                "state.query",
                json!({
                    "contract": contract,
                    "method": method,
                    "args": args,
                }),
            )
            .await?;
        serde_json::from_value(result).map_err(|e| LedgerError::InvalidResponse(e.to_string()))
    }

    fn asset_token(&self) -> &str {
        &self.config.asset_token_address
    }

    fn marketplace(&self) -> &str {
        &self.config.marketplace_address
    }
}

#[async_trait]
impl Ledger for HttpLedger {
    async fn submit_kyc(
        &self,
        signer: &Signer,
        legal_name: &str,
        id_number: &str,
        evidence_uri: &str,
    ) -> Result<Receipt> {
        self.send(
            self.asset_token(),
            "submitKYC",
            signer,
            json!({
                "name": legal_name,
                "idNumber": id_number,
                "ipfsURI": evidence_uri,
            }),
        )
        .await
    }

    async fn verify_kyc(&self, signer: &Signer, request_id: u64) -> Result<TxHash> {
        let receipt = self
            .send(
                self.asset_token(),
                "verifyKYC",
                signer,
                json!({ "requestId": request_id }),
            )
            .await?;
        Ok(receipt.tx_hash)
    }

    async fn is_kyc_verified(&self, address: &str) -> Result<bool> {
        self.query(
            self.asset_token(),
            "isKYCVerified",
            json!({ "address": address }),
        )
        .await
    }

    async fn kyc_request_count(&self) -> Result<u64> {
        self.query(self.asset_token(), "kycRequestCounter", json!({}))
            .await
    }

    async fn kyc_request(&self, index: u64) -> Result<Option<KycRequest>> {
        self.query(
            self.asset_token(),
            "kycRequest",
            json!({ "index": index }),
        )
        .await
    }

    async fn submit_asset(
        &self,
        signer: &Signer,
        asset_uri: &str,
        document_uri: &str,
        owner_name: &str,
        owner_id_number: &str,
        amount: u64,
    ) -> Result<Receipt> {
        self.send(
            self.asset_token(),
            "submitAsset",
            signer,
            json!({
                "assetURI": asset_uri,
                "documentURI": document_uri,
                "ownerName": owner_name,
                "ownerIdNumber": owner_id_number,
                "amount": amount,
            }),
        )
        .await
    }

    async fn approve_asset(
        &self,
        signer: &Signer,
        request_id: u64,
        recipient: &str,
    ) -> Result<TxHash> {
        let receipt = self
            .send(
                self.asset_token(),
                "approveAsset",
                signer,
                json!({
                    "requestId": request_id,
                    "recipient": recipient,
                }),
            )
            .await?;
        Ok(receipt.tx_hash)
    }

    async fn asset_request_count(&self) -> Result<u64> {
        self.query(self.asset_token(), "requestCounter", json!({}))
            .await
    }

    async fn asset_request(&self, index: u64) -> Result<Option<AssetRequest>> {
        self.query(
            self.asset_token(),
            "pendingAsset",
            json!({ "index": index }),
        )
        .await
    }

    async fn list_token(
        &self,
        signer: &Signer,
        token_id: u64,
        price: u128,
        amount: u64,
    ) -> Result<TxHash> {
        let receipt = self
            .send(
                self.marketplace(),
                "listToken",
                signer,
                json!({
                    "tokenId": token_id,
                    "price": price.to_string(),
                    "amount": amount,
                }),
            )
            .await?;
        Ok(receipt.tx_hash)
    }

    async fn buy_token(&self, signer: &Signer, token_id: u64, value: u128) -> Result<TxHash> {
        let receipt = self
            .send(
                self.marketplace(),
                "buyToken",
                signer,
                json!({
                    "tokenId": token_id,
                    "value": value.to_string(),
                }),
            )
            .await?;
        Ok(receipt.tx_hash)
    }

    async fn token_count(&self) -> Result<u64> {
        self.query(self.marketplace(), "tokenCounter", json!({}))
            .await
    }

    async fn token_uri(&self, token_id: u64) -> Result<Option<String>> {
        self.query(
            self.marketplace(),
            "tokenURI",
            json!({ "tokenId": token_id }),
        )
        .await
    }

    async fn listing(&self, token_id: u64) -> Result<Option<Listing>> {
        self.query(
            self.marketplace(),
            "listing",
            json!({ "tokenId": token_id }),
        )
        .await
    }

    async fn start_auction(
        &self,
        signer: &Signer,
        token_id: u64,
        start_price: u128,
        amount: u64,
        duration_secs: u64,
    ) -> Result<TxHash> {
        let receipt = self
            .send(
                self.marketplace(),
                "startAuction",
                signer,
                json!({
                    "tokenId": token_id,
                    "startPrice": start_price.to_string(),
                    "amount": amount,
                    "duration": duration_secs,
                }),
            )
            .await?;
        Ok(receipt.tx_hash)
    }

    async fn bid(&self, signer: &Signer, token_id: u64, value: u128) -> Result<TxHash> {
        let receipt = self
            .send(
                self.marketplace(),
                "bid",
                signer,
                json!({
                    "tokenId": token_id,
                    "value": value.to_string(),
                }),
            )
            .await?;
        Ok(receipt.tx_hash)
    }

    async fn end_auction(&self, signer: &Signer, token_id: u64) -> Result<TxHash> {
        let receipt = self
            .send(
                self.marketplace(),
                "endAuction",
                signer,
                json!({ "tokenId": token_id }),
            )
            .await?;
        Ok(receipt.tx_hash)
    }

    async fn auction(&self, token_id: u64) -> Result<Option<Auction>> {
        self.query(
            self.marketplace(),
            "auction",
            json!({ "tokenId": token_id }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_poll_retries_transport_within_bound() {
        let transport = LedgerError::Transport("connection reset".to_string());
        assert!(retry_receipt_poll(&transport, 0));
        assert!(retry_receipt_poll(&transport, MAX_RECEIPT_POLL_RETRIES - 1));
        assert!(!retry_receipt_poll(&transport, MAX_RECEIPT_POLL_RETRIES));
    }

    #[test]
    fn test_receipt_poll_never_repeats_definitive_answers() {
        assert!(!retry_receipt_poll(&LedgerError::rejected("reverted"), 0));
        assert!(!retry_receipt_poll(
            &LedgerError::InvalidResponse("garbage".to_string()),
            0
        ));
        assert!(!retry_receipt_poll(&LedgerError::SignerUnavailable, 0));
    }
}
