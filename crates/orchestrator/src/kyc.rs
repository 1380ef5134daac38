//! Identity verification workflow: KYC submission, approval and status.

use crate::error::{Error, Result};
use rwa_ipfs::ContentStore;
use rwa_ledger::{Ledger, Signer, TxHash, is_valid_address};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outcome of a confirmed KYC submission
#[derive(Debug, Clone)]
pub struct KycSubmission {
    /// Ordinal assigned by the ledger, never reused
    pub request_id: u64,
    /// Locator of the stored evidence document
    pub evidence_uri: String,
    pub tx_hash: TxHash,
}

pub struct KycWorkflow {
    ledger: Arc<dyn Ledger>,
    store: Arc<dyn ContentStore>,
}

impl KycWorkflow {
    pub fn new(ledger: Arc<dyn Ledger>, store: Arc<dyn ContentStore>) -> Self {
        Self { ledger, store }
    }

    /// Submit a KYC request for the signer's address.
    ///
    /// Storage writes are strictly sequenced ahead of the ledger call: the
    /// ledger submission embeds the evidence locator and cannot be
    /// retro-fitted, so it is not issued until both pins have confirmed.
    pub async fn submit(
        &self,
        signer: &Signer,
        legal_name: &str,
        id_number: &str,
        id_image: &[u8],
        image_name: &str,
    ) -> Result<KycSubmission> {
        if !is_valid_address(&signer.address) {
            return Err(Error::validation("subject address is not a valid address"));
        }
        if legal_name.trim().is_empty() {
            return Err(Error::validation("legal name is required"));
        }
        if id_number.trim().is_empty() {
            return Err(Error::validation("id number is required"));
        }
        if id_image.is_empty() {
            return Err(Error::validation("id image is required"));
        }

        let image_uri = self
            .store
            .store_bytes(id_image, image_name)
            .await
            .map_err(|e| Error::storage("pinning id image", e))?;

        let document = json!({
            "name": legal_name,
            "idNumber": id_number,
            "idImage": image_uri,
        });
        let evidence_uri = self
            .store
            .store_document(&document)
            .await
            .map_err(|e| Error::storage("pinning evidence document", e))?;

        debug!(%evidence_uri, "evidence stored, recording KYC request on ledger");
        let locators = vec![image_uri, evidence_uri.clone()];
        let receipt = self
            .ledger
            .submit_kyc(signer, legal_name, id_number, &evidence_uri)
            .await
            .map_err(|source| Error::UploadedNotRecorded {
                locators: locators.clone(),
                source,
            })?;

        // Confirmed but id-less: the request is on the ledger, so this must
        // not surface as a failure a caller would answer by resubmitting
        let request_id = receipt.request_id.ok_or_else(|| Error::RecordedWithoutId {
            locators,
            tx_hash: receipt.tx_hash.clone(),
        })?;

        info!(request_id, subject = %signer.address, tx_hash = %receipt.tx_hash, "KYC request recorded");
        Ok(KycSubmission {
            request_id,
            evidence_uri,
            tx_hash: receipt.tx_hash,
        })
    }

    /// Approve a pending request by ordinal. Whether the request exists and
    /// is still unverified is ledger-owned policy, not re-validated here; a
    /// second approval surfaces the ledger's rejection.
    pub async fn approve(&self, signer: &Signer, request_id: u64) -> Result<TxHash> {
        let tx_hash = self.ledger.verify_kyc(signer, request_id).await?;
        info!(request_id, %tx_hash, "KYC request approved");
        Ok(tx_hash)
    }

    /// Current verification status for an address.
    ///
    /// Degrades to `false` when ledger state is unreachable so downstream
    /// gating fails safe; safe to call before any wallet exists.
    pub async fn is_verified(&self, address: &str) -> bool {
        match self.ledger.is_kyc_verified(address).await {
            Ok(verified) => verified,
            Err(e) => {
                warn!(address, error = %e, "verification status unreachable, treating as not verified");
                false
            }
        }
    }

    /// Re-read verification status whenever an external wallet notifier
    /// reports an account change, forwarding `(address, verified)` pairs
    /// until either channel closes.
    pub async fn watch_wallet_changes(
        &self,
        mut changes: mpsc::Receiver<String>,
        statuses: mpsc::Sender<(String, bool)>,
    ) {
        while let Some(address) = changes.recv().await {
            let verified = self.is_verified(&address).await;
            debug!(address, verified, "wallet changed, refreshed verification status");
            if statuses.send((address, verified)).await.is_err() {
                break;
            }
        }
    }
}
