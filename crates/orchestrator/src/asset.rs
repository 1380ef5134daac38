//! Asset submission workflow: tokenizable-asset intake and approval.

use crate::error::{Error, Result};
use rwa_ipfs::ContentStore;
use rwa_ledger::{Ledger, Signer, TxHash, is_valid_address};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Each submission tokenizes a single unit of the asset
const TOKEN_UNITS_PER_SUBMISSION: u64 = 1;

/// Caller-supplied fields describing the asset and its owner
#[derive(Debug, Clone)]
pub struct AssetFields {
    pub name: String,
    pub description: String,
    pub owner_name: String,
    pub owner_id_number: String,
}

/// Outcome of a confirmed asset submission
#[derive(Debug, Clone)]
pub struct AssetSubmission {
    pub request_id: u64,
    /// Locator of the stored metadata document
    pub asset_uri: String,
    /// Locator of the stored ownership proof
    pub document_uri: String,
    pub tx_hash: TxHash,
}

pub struct AssetWorkflow {
    ledger: Arc<dyn Ledger>,
    store: Arc<dyn ContentStore>,
}

impl AssetWorkflow {
    pub fn new(ledger: Arc<dyn Ledger>, store: Arc<dyn ContentStore>) -> Self {
        Self { ledger, store }
    }

    /// Submit a tokenization request.
    ///
    /// Write-before-reference ordering: asset image, ownership document and
    /// metadata document are all durably stored before the ledger call that
    /// embeds their locators is issued.
    pub async fn submit(
        &self,
        signer: &Signer,
        fields: &AssetFields,
        asset_image: &[u8],
        image_name: &str,
        ownership_document: &[u8],
        document_name: &str,
    ) -> Result<AssetSubmission> {
        if !is_valid_address(&signer.address) {
            return Err(Error::validation("submitter address is not a valid address"));
        }
        for (value, field) in [
            (&fields.name, "asset name"),
            (&fields.description, "asset description"),
            (&fields.owner_name, "owner name"),
            (&fields.owner_id_number, "owner id number"),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("{} is required", field)));
            }
        }
        if asset_image.is_empty() {
            return Err(Error::validation("asset image is required"));
        }
        if ownership_document.is_empty() {
            return Err(Error::validation("ownership document is required"));
        }

        let image_uri = self
            .store
            .store_bytes(asset_image, image_name)
            .await
            .map_err(|e| Error::storage("pinning asset image", e))?;

        let document_uri = self
            .store
            .store_bytes(ownership_document, document_name)
            .await
            .map_err(|e| Error::storage("pinning ownership document", e))?;

        let metadata = json!({
            "name": fields.name,
            "description": fields.description,
            "image": image_uri,
        });
        let asset_uri = self
            .store
            .store_document(&metadata)
            .await
            .map_err(|e| Error::storage("pinning asset metadata", e))?;

        debug!(%asset_uri, %document_uri, "asset content stored, recording request on ledger");
        let locators = vec![image_uri, document_uri.clone(), asset_uri.clone()];
        let receipt = self
            .ledger
            .submit_asset(
                signer,
                &asset_uri,
                &document_uri,
                &fields.owner_name,
                &fields.owner_id_number,
                TOKEN_UNITS_PER_SUBMISSION,
            )
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

        info!(request_id, submitter = %signer.address, tx_hash = %receipt.tx_hash, "asset request recorded");
        Ok(AssetSubmission {
            request_id,
            asset_uri,
            document_uri,
            tx_hash: receipt.tx_hash,
        })
    }

    /// Approve a pending request, minting the token to `recipient`.
    ///
    /// The recipient is validated before any network call; approval itself
    /// is a one-way transition enforced by the ledger.
    pub async fn approve(
        &self,
        signer: &Signer,
        request_id: u64,
        recipient: &str,
    ) -> Result<TxHash> {
        if !is_valid_address(recipient) {
            return Err(Error::validation(format!(
                "recipient is not a valid address: {:?}",
                recipient
            )));
        }

        let tx_hash = self.ledger.approve_asset(signer, request_id, recipient).await?;
        info!(request_id, recipient, %tx_hash, "asset request approved");
        Ok(tx_hash)
    }
}
