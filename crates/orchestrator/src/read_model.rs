//! Reconciliation: assembles a transient read-model from ledger counters,
//! per-index records and the content-store documents they reference.
//!
//! Every build re-derives the full result from current ledger state; the
//! output is disposable and must be treated as potentially stale the moment
//! it is returned. A single unreadable record or document never aborts a
//! build: the entry is skipped with a diagnostic.

use crate::error::{Error, Result};
use futures::future::join_all;
use rwa_ipfs::ContentStore;
use rwa_ledger::{format_units, Ledger};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// Bound on concurrent per-index fetches so a large counter does not
/// overwhelm the content store
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// Metadata document stored for an asset or token
#[derive(Debug, Clone, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct PendingKyc {
    pub request_id: u64,
    pub subject: String,
    pub legal_name: String,
    pub id_number: String,
    pub evidence_uri: String,
    /// Locator of the id image, merged in from the evidence document
    pub id_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PendingAsset {
    pub request_id: u64,
    pub metadata: AssetMetadata,
    pub document_uri: String,
    pub owner_name: String,
    pub owner_id_number: String,
    pub submitter: String,
}

#[derive(Debug, Clone)]
pub struct ActiveListing {
    pub token_id: u64,
    pub seller: String,
    /// Display price, formatted by the canonical unit conversion
    pub price: String,
    pub metadata: AssetMetadata,
}

#[derive(Debug, Clone)]
pub struct ActiveAuction {
    pub token_id: u64,
    pub seller: String,
    /// Highest bid if any bids were placed, else the start price
    pub current_bid: String,
    pub amount: u64,
    pub end_time: u64,
    pub highest_bidder: Option<String>,
    pub metadata: AssetMetadata,
}

pub struct ReadModel {
    ledger: Arc<dyn Ledger>,
    store: Arc<dyn ContentStore>,
}

impl ReadModel {
    pub fn new(ledger: Arc<dyn Ledger>, store: Arc<dyn ContentStore>) -> Self {
        Self { ledger, store }
    }

    /// Scan `[0, count)` concurrently under the fan-out bound, keep the
    /// entries `fetch` resolves to, and re-sort by index for determinism.
    async fn scan<T, F, Fut>(&self, count: u64, what: &'static str, fetch: F) -> Vec<T>
    where
        F: Fn(u64) -> Fut,
        Fut: std::future::Future<Output = Result<Option<(u64, T)>>>,
    {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES));
        let futures = (0..count).map(|index| {
            let semaphore = Arc::clone(&semaphore);
            let fut = fetch(index);
            async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };
                match fut.await {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(index, what, error = %e, "skipping unreadable entry");
                        None
                    }
                }
            }
        });

        let mut entries: Vec<(u64, T)> = join_all(futures).await.into_iter().flatten().collect();
        entries.sort_by_key(|(index, _)| *index);
        entries.into_iter().map(|(_, entry)| entry).collect()
    }

    /// All unverified KYC requests, with their evidence documents merged in
    pub async fn pending_kyc(&self) -> Result<Vec<PendingKyc>> {
        let count = self.ledger.kyc_request_count().await?;
        Ok(self
            .scan(count, "kyc request", |index| async move {
                let Some(request) = self.ledger.kyc_request(index).await? else {
                    return Ok(None);
                };
                if request.verified {
                    return Ok(None);
                }
                let document = self
                    .store
                    .fetch_document(&request.evidence_uri)
                    .await
                    .map_err(|e| Error::storage("fetching KYC evidence", e))?;
                let id_image = document
                    .get("idImage")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                Ok(Some((
                    index,
                    PendingKyc {
                        request_id: index,
                        subject: request.subject,
                        legal_name: request.legal_name,
                        id_number: request.id_number,
                        evidence_uri: request.evidence_uri,
                        id_image,
                    },
                )))
            })
            .await)
    }

    /// All unapproved asset requests, with their metadata documents merged in
    pub async fn pending_assets(&self) -> Result<Vec<PendingAsset>> {
        let count = self.ledger.asset_request_count().await?;
        Ok(self
            .scan(count, "asset request", |index| async move {
                let Some(request) = self.ledger.asset_request(index).await? else {
                    return Ok(None);
                };
                if request.approved {
                    return Ok(None);
                }
                let document = self
                    .store
                    .fetch_document(&request.asset_uri)
                    .await
                    .map_err(|e| Error::storage("fetching asset metadata", e))?;
                let metadata: AssetMetadata = serde_json::from_value(document).map_err(|e| {
                    Error::validation(format!("malformed asset metadata: {}", e))
                })?;
                Ok(Some((
                    index,
                    PendingAsset {
                        request_id: index,
                        metadata,
                        document_uri: request.document_uri,
                        owner_name: request.owner_name,
                        owner_id_number: request.owner_id_number,
                        submitter: request.submitter,
                    },
                )))
            })
            .await)
    }

    /// All currently active fixed-price listings
    pub async fn active_listings(&self) -> Result<Vec<ActiveListing>> {
        let count = self.ledger.token_count().await?;
        Ok(self
            .scan(count, "listing", |token_id| async move {
                let Some(listing) = self.ledger.listing(token_id).await? else {
                    return Ok(None);
                };
                if !listing.is_active {
                    return Ok(None);
                }
                let metadata = self.token_metadata(token_id).await?;
                Ok(Some((
                    token_id,
                    ActiveListing {
                        token_id,
                        seller: listing.seller,
                        price: format_units(listing.price),
                        metadata,
                    },
                )))
            })
            .await)
    }

    /// All currently active auctions
    pub async fn active_auctions(&self) -> Result<Vec<ActiveAuction>> {
        let count = self.ledger.token_count().await?;
        Ok(self
            .scan(count, "auction", |token_id| async move {
                let Some(auction) = self.ledger.auction(token_id).await? else {
                    return Ok(None);
                };
                if !auction.active {
                    return Ok(None);
                }
                let metadata = self.token_metadata(token_id).await?;
                let current = if auction.highest_bid > 0 {
                    auction.highest_bid
                } else {
                    auction.start_price
                };
                Ok(Some((
                    token_id,
                    ActiveAuction {
                        token_id,
                        seller: auction.seller,
                        current_bid: format_units(current),
                        amount: auction.amount,
                        end_time: auction.end_time,
                        highest_bidder: auction.highest_bidder,
                        metadata,
                    },
                )))
            })
            .await)
    }

    async fn token_metadata(&self, token_id: u64) -> Result<AssetMetadata> {
        let uri = self
            .ledger
            .token_uri(token_id)
            .await?
            .ok_or_else(|| Error::validation(format!("token {} has no metadata URI", token_id)))?;
        let document = self
            .store
            .fetch_document(&uri)
            .await
            .map_err(|e| Error::storage("fetching token metadata", e))?;
        serde_json::from_value(document)
            .map_err(|e| Error::validation(format!("malformed token metadata: {}", e)))
    }
}
