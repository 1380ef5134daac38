//! Error taxonomy for the orchestration layer.
//!
//! The variants distinguish what a caller most needs to know after a
//! failure: nothing happened at all (`Validation`, `Storage`), the ledger
//! answered and said no (`Ledger` with a rejection), the outcome is unknown
//! (`Ledger` with a transport failure), content was stored but the ledger
//! step failed afterwards (`UploadedNotRecorded`), or the ledger recorded
//! the request but the confirmed receipt was missing its ordinal
//! (`RecordedWithoutId`).

use rwa_ipfs::StorageError;
use rwa_ledger::{LedgerError, TxHash};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied input violates a precondition; resolved locally,
    /// never triggers a network call
    #[error("validation error: {0}")]
    Validation(String),

    /// A content store write or read failed; `step` names the operation so
    /// the caller knows how far the submission got
    #[error("storage failure while {step}: {source}")]
    Storage {
        step: &'static str,
        #[source]
        source: StorageError,
    },

    /// A ledger call failed with no store writes ahead of it
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Store writes confirmed but the ledger call that should have
    /// referenced them failed. The listed locators are durable; the caller
    /// may retry the ledger step without re-uploading.
    #[error("uploaded to content store but not recorded on ledger (stored: {locators:?}): {source}")]
    UploadedNotRecorded {
        locators: Vec<String>,
        #[source]
        source: LedgerError,
    },

    /// The ledger confirmed the submission but the receipt carried no
    /// request ordinal. The request IS recorded and the locators are
    /// durable; only the id lookup needs retrying, never the submission
    /// or the uploads.
    #[error("submission confirmed in {tx_hash} but receipt carried no request id (stored: {locators:?})")]
    RecordedWithoutId {
        locators: Vec<String>,
        tx_hash: TxHash,
    },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(step: &'static str, source: StorageError) -> Self {
        Self::Storage { step, source }
    }

    /// True for caller-input problems (the 4xx side of the process
    /// boundary); everything else is a backend failure
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Locators that were durably stored before the failure, if any
    pub fn orphaned_locators(&self) -> Option<&[String]> {
        match self {
            Self::UploadedNotRecorded { locators, .. } => Some(locators),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_caller_error() {
        assert!(Error::validation("missing name").is_caller_error());
        assert!(!Error::Ledger(LedgerError::SignerUnavailable).is_caller_error());
        assert!(!Error::storage(
            "pinning id image",
            StorageError::Unavailable("down".to_string())
        )
        .is_caller_error());
    }

    #[test]
    fn test_orphaned_locators() {
        let err = Error::UploadedNotRecorded {
            locators: vec!["ipfs://a".to_string(), "ipfs://b".to_string()],
            source: LedgerError::Transport("unreachable".to_string()),
        };
        assert_eq!(err.orphaned_locators().map(|l| l.len()), Some(2));

        assert!(Error::validation("x").orphaned_locators().is_none());
    }

    #[test]
    fn test_recorded_without_id_is_not_an_unrecorded_failure() {
        let err = Error::RecordedWithoutId {
            locators: vec!["ipfs://a".to_string(), "ipfs://b".to_string()],
            tx_hash: TxHash("0xabc".to_string()),
        };
        assert!(!err.is_caller_error());
        assert!(err.orphaned_locators().is_none());
        assert!(err.to_string().contains("0xabc"));
    }

    #[test]
    fn test_storage_error_names_step() {
        let err = Error::storage(
            "pinning ownership document",
            StorageError::Unavailable("503".to_string()),
        );
        assert!(err.to_string().contains("pinning ownership document"));
    }
}
