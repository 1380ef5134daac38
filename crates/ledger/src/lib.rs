//! Ledger Gateway - abstraction over the on-chain side of the RWA marketplace
//!
//! This crate defines the `Ledger` trait through which every workflow drives
//! the AssetToken and Marketplace contracts, plus a JSON-RPC implementation
//! (`HttpLedger`) for talking to an RPC gateway that exposes the contracts'
//! named methods.
//!
//! A state-changing call either confirms, after which the corresponding
//! ledger-side state change is visible to subsequent queries, or fails
//! before confirmation with no partial state visible. Confirmation has no
//! latency bound; callers must treat it as a potentially long-running await.

use async_trait::async_trait;

pub mod config;
pub mod error;
pub mod rpc;
pub mod types;
pub mod units;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use rpc::HttpLedger;
pub use types::{
    Auction, AssetRequest, KycRequest, Listing, Receipt, Signer, TxHash, is_valid_address,
};
pub use units::{format_units, parse_units, UnitsError};

/// The ledger boundary every workflow depends on.
///
/// Mutating calls take an explicit [`Signer`]; queries are read-only and
/// side-effect free. Implementations serialize nothing client-side: the
/// ledger itself is the sole writer of record and the authority for every
/// invariant (one active KYC request per subject, one-way approvals,
/// monotonic bids, fixed auction deadlines).
#[async_trait]
pub trait Ledger: Send + Sync {
    // ===== Identity verification =====

    /// Record a KYC request carrying the evidence document locator.
    /// The returned receipt includes the ledger-assigned request ordinal.
    async fn submit_kyc(
        &self,
        signer: &Signer,
        legal_name: &str,
        id_number: &str,
        evidence_uri: &str,
    ) -> Result<Receipt>;

    /// Approve a pending KYC request by ordinal. Rejected by the ledger if
    /// the request is already verified or does not exist.
    async fn verify_kyc(&self, signer: &Signer, request_id: u64) -> Result<TxHash>;

    /// Whether an address has passed verification
    async fn is_kyc_verified(&self, address: &str) -> Result<bool>;

    /// Monotonically increasing count of KYC requests ever submitted
    async fn kyc_request_count(&self) -> Result<u64>;

    /// The request recorded at `index`, if any
    async fn kyc_request(&self, index: u64) -> Result<Option<KycRequest>>;

    // ===== Asset tokenization =====

    /// Record an asset tokenization request referencing already-stored
    /// metadata and ownership-proof locators
    async fn submit_asset(
        &self,
        signer: &Signer,
        asset_uri: &str,
        document_uri: &str,
        owner_name: &str,
        owner_id_number: &str,
        amount: u64,
    ) -> Result<Receipt>;

    /// Approve a pending asset request, minting the token to `recipient`.
    /// Approval is a one-way transition enforced by the ledger.
    async fn approve_asset(
        &self,
        signer: &Signer,
        request_id: u64,
        recipient: &str,
    ) -> Result<TxHash>;

    async fn asset_request_count(&self) -> Result<u64>;

    async fn asset_request(&self, index: u64) -> Result<Option<AssetRequest>>;

    // ===== Marketplace =====

    /// List `amount` units of a token at `price` base units
    async fn list_token(
        &self,
        signer: &Signer,
        token_id: u64,
        price: u128,
        amount: u64,
    ) -> Result<TxHash>;

    /// Buy a listed token, moving exactly `value` base units
    async fn buy_token(&self, signer: &Signer, token_id: u64, value: u128) -> Result<TxHash>;

    /// Count of tokens minted so far
    async fn token_count(&self) -> Result<u64>;

    /// Metadata locator for a minted token
    async fn token_uri(&self, token_id: u64) -> Result<Option<String>>;

    async fn listing(&self, token_id: u64) -> Result<Option<Listing>>;

    // ===== Auctions =====

    /// Start a timed auction. `end_time` is computed ledger-side as
    /// now + `duration_secs` to avoid clock-skew disputes.
    async fn start_auction(
        &self,
        signer: &Signer,
        token_id: u64,
        start_price: u128,
        amount: u64,
        duration_secs: u64,
    ) -> Result<TxHash>;

    /// Place a bid of `value` base units. The monotonic-bid and deadline
    /// comparisons are authoritative on the ledger side.
    async fn bid(&self, signer: &Signer, token_id: u64, value: u128) -> Result<TxHash>;

    /// End an elapsed auction; settlement is the ledger's responsibility
    async fn end_auction(&self, signer: &Signer, token_id: u64) -> Result<TxHash>;

    async fn auction(&self, token_id: u64) -> Result<Option<Auction>>;
}
