//! Auction workflow: timed-auction lifecycle against ledger auction state.
//!
//! State machine: NotStarted -> Active -> Ended. The ledger owns every
//! authoritative comparison (current highest bid, deadline); this workflow
//! performs only the cheap pre-checks that avoid pointless transaction
//! submission and never re-derives ledger invariants from cached state.

use crate::error::{Error, Result};
use rwa_ledger::{parse_units, Ledger, Signer, TxHash};
use std::sync::Arc;
use tracing::info;

/// Auctions must run for at least one hour
pub const MIN_AUCTION_DURATION_SECS: u64 = 3600;

pub struct AuctionWorkflow {
    ledger: Arc<dyn Ledger>,
}

impl AuctionWorkflow {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Start an auction: NotStarted -> Active. The deadline is computed by
    /// the ledger as now + `duration_secs`, never client-side.
    pub async fn start(
        &self,
        signer: &Signer,
        token_id: u64,
        start_price_text: &str,
        amount: u64,
        duration_secs: u64,
    ) -> Result<TxHash> {
        let start_price =
            parse_units(start_price_text).map_err(|e| Error::validation(e.to_string()))?;
        if start_price == 0 {
            return Err(Error::validation("start price must be greater than zero"));
        }
        if amount == 0 {
            return Err(Error::validation("auction amount must be a positive integer"));
        }
        if duration_secs < MIN_AUCTION_DURATION_SECS {
            return Err(Error::validation(format!(
                "auction duration must be at least {} seconds, got {}",
                MIN_AUCTION_DURATION_SECS, duration_secs
            )));
        }

        let tx_hash = self
            .ledger
            .start_auction(signer, token_id, start_price, amount, duration_secs)
            .await?;
        info!(token_id, start_price_text, amount, duration_secs, %tx_hash, "auction started");
        Ok(tx_hash)
    }

    /// Place a bid. Only a cheap positivity check happens here; whether the
    /// bid beats the current highest and lands before the deadline is the
    /// ledger's call. A rejected bid is surfaced, never resubmitted: being
    /// outbid in the interim requires the user to re-decide.
    pub async fn bid(&self, signer: &Signer, token_id: u64, amount_text: &str) -> Result<TxHash> {
        let value = parse_units(amount_text).map_err(|e| Error::validation(e.to_string()))?;
        if value == 0 {
            return Err(Error::validation("bid amount must be greater than zero"));
        }

        let tx_hash = self.ledger.bid(signer, token_id, value).await?;
        info!(token_id, amount_text, %tx_hash, "bid placed");
        Ok(tx_hash)
    }

    /// End an elapsed auction: Active -> Ended. Settlement is the ledger's
    /// responsibility; ending early surfaces the ledger's rejection.
    pub async fn end(&self, signer: &Signer, token_id: u64) -> Result<TxHash> {
        let tx_hash = self.ledger.end_auction(signer, token_id).await?;
        info!(token_id, %tx_hash, "auction ended");
        Ok(tx_hash)
    }
}
