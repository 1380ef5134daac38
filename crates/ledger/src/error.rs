//! Error types for ledger gateway operations

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur when driving the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No usable signing identity for a state-changing call
    #[error("no signer available for ledger call")]
    SignerUnavailable,

    /// The call was submitted but the ledger reverted it.
    /// `reason` carries the ledger-supplied revert string verbatim.
    #[error("rejected by ledger: {reason}")]
    Rejected { reason: String },

    /// The ledger endpoint could not be reached at all; whether the
    /// call took effect could not be determined
    #[error("ledger transport failure: {0}")]
    Transport(String),

    /// The gateway answered with a payload we could not decode
    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

impl LedgerError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// The revert reason, if this error is a ledger rejection
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason } => Some(reason),
            _ => None,
        }
    }

    /// True when the outcome of the call is unknown (endpoint unreachable).
    /// Rejections are not transport errors: the ledger did answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reason() {
        let err = LedgerError::rejected("KYC already verified");
        assert_eq!(err.rejection_reason(), Some("KYC already verified"));

        let err = LedgerError::Transport("connection refused".to_string());
        assert_eq!(err.rejection_reason(), None);
    }

    #[test]
    fn test_is_transport() {
        assert!(LedgerError::Transport("timeout".to_string()).is_transport());
        assert!(!LedgerError::rejected("reverted").is_transport());
        assert!(!LedgerError::SignerUnavailable.is_transport());
    }

    #[test]
    fn test_display_carries_reason_verbatim() {
        let err = LedgerError::rejected("Auction: bid below current highest");
        assert_eq!(
            err.to_string(),
            "rejected by ledger: Auction: bid below current highest"
        );
    }
}
