//! Off-chain orchestration for the RWA marketplace.
//!
//! Sequences the multi-step operations that span content-store uploads,
//! ledger transaction submission and local state: KYC submission and
//! approval, asset tokenization, fixed-price trading, timed auctions, and
//! the read-model reconciliation that assembles a consistent view of what
//! the ledger currently believes.
//!
//! The ledger and the content store are the only authorities. Everything
//! held here is a disposable projection, and every workflow takes its
//! clients by injection so the whole layer runs unchanged against fakes.

pub mod asset;
pub mod auction;
pub mod config;
pub mod error;
pub mod kyc;
pub mod marketplace;
pub mod read_model;

pub use asset::{AssetFields, AssetSubmission, AssetWorkflow};
pub use auction::{AuctionWorkflow, MIN_AUCTION_DURATION_SECS};
pub use config::Config;
pub use error::{Error, Result};
pub use kyc::{KycSubmission, KycWorkflow};
pub use marketplace::MarketplaceWorkflow;
pub use read_model::{
    ActiveAuction, ActiveListing, AssetMetadata, PendingAsset, PendingKyc, ReadModel,
};

use rwa_ipfs::{ContentStore, PinataClient};
use rwa_ledger::{HttpLedger, Ledger};
use std::sync::Arc;

/// The full set of workflows over one ledger and one content store.
///
/// Clients are constructed once per process and shared as immutable
/// handles; there is no hidden module-level state.
pub struct Orchestrator {
    pub kyc: KycWorkflow,
    pub assets: AssetWorkflow,
    pub marketplace: MarketplaceWorkflow,
    pub auctions: AuctionWorkflow,
    pub read_model: ReadModel,
}

impl Orchestrator {
    pub fn new(ledger: Arc<dyn Ledger>, store: Arc<dyn ContentStore>) -> Self {
        Self {
            kyc: KycWorkflow::new(ledger.clone(), store.clone()),
            assets: AssetWorkflow::new(ledger.clone(), store.clone()),
            marketplace: MarketplaceWorkflow::new(ledger.clone()),
            auctions: AuctionWorkflow::new(ledger.clone()),
            read_model: ReadModel::new(ledger, store),
        }
    }

    /// Build production clients from validated configuration.
    /// Fails here, at startup, on any configuration problem.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let ledger = HttpLedger::new(config.ledger)?;
        let store = PinataClient::new(config.pinata)
            .map_err(|e| anyhow::anyhow!("invalid content store configuration: {}", e))?;
        Ok(Self::new(Arc::new(ledger), Arc::new(store)))
    }
}
