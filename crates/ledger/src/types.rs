//! Domain types shared between the ledger gateway and the workflows.
//!
//! All records below are transient copies of ledger state: the ledger is the
//! sole source of truth and anything read here may be stale the instant it
//! is returned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An explicit signing identity for a state-changing call.
///
/// Every mutating gateway method takes a `Signer` rather than relying on an
/// ambient process-wide wallet, so multi-admin setups need no redesign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    pub address: String,
}

impl Signer {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Hash of a submitted ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Confirmation receipt for a state-changing call.
///
/// `request_id` is present for submissions that make the ledger assign a new
/// ordinal (KYC and asset requests); it is parsed out of the confirmed
/// receipt, never derived client-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx_hash: TxHash,
    #[serde(default)]
    pub request_id: Option<u64>,
}

/// One identity-verification request as recorded on the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRequest {
    pub subject: String,
    pub legal_name: String,
    pub id_number: String,
    pub evidence_uri: String,
    pub verified: bool,
}

/// One pending (or approved) asset tokenization request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    pub asset_uri: String,
    pub document_uri: String,
    pub owner_name: String,
    pub owner_id_number: String,
    pub submitter: String,
    pub approved: bool,
}

/// Base-unit amounts travel as decimal strings: JSON numbers cannot carry
/// a full u128 without loss.
pub(crate) mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

/// Fixed-price listing state for one token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub token_id: u64,
    pub seller: String,
    /// Price in base units (18 decimals)
    #[serde(with = "u128_string")]
    pub price: u128,
    pub amount: u64,
    pub is_active: bool,
}

/// Timed-auction state for one token.
///
/// `highest_bid` is non-decreasing while the auction is active and
/// `end_time` is fixed at creation; both are enforced by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub token_id: u64,
    pub seller: String,
    #[serde(with = "u128_string")]
    pub start_price: u128,
    pub amount: u64,
    /// Absolute unix timestamp, computed by the ledger at start
    pub end_time: u64,
    #[serde(with = "u128_string")]
    pub highest_bid: u128,
    pub highest_bidder: Option<String>,
    pub active: bool,
}

/// Check that an address has the expected ledger shape: 0x plus 40 hex chars
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_address() {
        assert!(is_valid_address(
            "0x1234567890123456789012345678901234567890"
        ));
        assert!(is_valid_address(
            "0xAbCdEf0123456789012345678901234567890abc"
        ));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("1234567890123456789012345678901234567890"));
        assert!(!is_valid_address("0x12345"));
        assert!(!is_valid_address(
            "0x12345678901234567890123456789012345678xy"
        ));
    }

    #[test]
    fn test_receipt_decodes_optional_request_id() {
        let with_id: Receipt =
            serde_json::from_str(r#"{"txHash":"0xabc","requestId":3}"#).unwrap();
        assert_eq!(with_id.request_id, Some(3));

        let without_id: Receipt = serde_json::from_str(r#"{"txHash":"0xabc"}"#).unwrap();
        assert!(without_id.request_id.is_none());
    }
}
