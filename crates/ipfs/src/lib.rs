//! Content store client for the RWA marketplace.
//!
//! Uploads opaque bytes and JSON documents to a content-addressed pinning
//! service and returns gateway URIs that any reader can dereference. The
//! store is append-only: once a locator is returned no further write is
//! performed against it.
//!
//! This client deliberately does not retry failed writes. A retried pin may
//! create a duplicate, orphaned object, so the decision to retry belongs to
//! the calling workflow.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

/// Result type alias for content store operations
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be reached or rejected the write
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a payload we could not decode
    #[error("unexpected content store response: {0}")]
    InvalidResponse(String),
}

/// The content store boundary the workflows depend on.
///
/// `store_*` return a dereferenceable locator only after the write has been
/// durably pinned; `fetch_document` is what the read-model uses to follow
/// locators embedded in ledger records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Pin raw bytes under `name`, returning a gateway URI
    async fn store_bytes(&self, bytes: &[u8], name: &str) -> Result<String>;

    /// Pin a JSON document, returning a gateway URI
    async fn store_document(&self, document: &Value) -> Result<String>;

    /// Dereference a locator and parse the object as JSON
    async fn fetch_document(&self, locator: &str) -> Result<Value>;
}

/// Credentials and endpoints for the Pinata pinning API.
///
/// Credentials are validated here, at construction time: their absence is a
/// configuration error at startup, not a failure at first use.
#[derive(Debug, Clone)]
pub struct PinataConfig {
    pub api_key: String,
    pub secret_api_key: String,
    pub api_url: String,
    pub gateway_url: String,
}

impl PinataConfig {
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
            api_url: "https://api.pinata.cloud".to_string(),
            gateway_url: "https://gateway.pinata.cloud/ipfs/".to_string(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.api_key.is_empty() {
            return Err("pinata api_key cannot be empty".to_string());
        }
        if self.secret_api_key.is_empty() {
            return Err("pinata secret_api_key cannot be empty".to_string());
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err("pinata api_url must start with http:// or https://".to_string());
        }
        Ok(())
    }
}

pub struct PinataClient {
    config: PinataConfig,
    client: reqwest::Client,
}

impl PinataClient {
    pub fn new(config: PinataConfig) -> std::result::Result<Self, String> {
        config.validate()?;
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    fn gateway_url(&self, hash: &str) -> String {
        format!("{}{}", self.config.gateway_url, hash)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_api_key)
    }

    /// Pull the content hash out of a pinning response and turn it into a
    /// gateway URI
    fn locator_from_response(&self, info: &Value) -> Result<String> {
        info.get("IpfsHash")
            .and_then(|v| v.as_str())
            .map(|hash| self.gateway_url(hash))
            .ok_or_else(|| {
                StorageError::InvalidResponse("pin response carried no IpfsHash".to_string())
            })
    }
}

#[async_trait]
impl ContentStore for PinataClient {
    async fn store_bytes(&self, bytes: &[u8], name: &str) -> Result<String> {
        let url = format!("{}/pinning/pinFileToIPFS", self.config.api_url);
        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let start = Instant::now();
        let response = self
            .authorized(self.client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, name, "file pin failed");
            return Err(StorageError::Unavailable(format!(
                "pin rejected with {} {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let info: Value = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        let locator = self.locator_from_response(&info)?;
        debug!(name, %locator, elapsed = ?start.elapsed(), "file pinned");
        Ok(locator)
    }

    async fn store_document(&self, document: &Value) -> Result<String> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.config.api_url);

        let start = Instant::now();
        let response = self
            .authorized(self.client.post(&url))
            .json(document)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, "document pin failed");
            return Err(StorageError::Unavailable(format!(
                "pin rejected with {} {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let info: Value = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        let locator = self.locator_from_response(&info)?;
        debug!(%locator, elapsed = ?start.elapsed(), "document pinned");
        Ok(locator)
    }

    async fn fetch_document(&self, locator: &str) -> Result<Value> {
        if locator.is_empty() {
            return Err(StorageError::InvalidResponse(
                "empty locator".to_string(),
            ));
        }

        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Unavailable(format!(
                "fetch of {} failed with {}",
                locator, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_credentials() {
        assert!(PinataConfig::new("", "secret").validate().is_err());
        assert!(PinataConfig::new("key", "").validate().is_err());
        assert!(PinataConfig::new("key", "secret").validate().is_ok());
    }

    #[test]
    fn test_client_rejects_bad_config_at_construction() {
        assert!(PinataClient::new(PinataConfig::new("", "")).is_err());
    }

    #[test]
    fn test_gateway_url() {
        let client = PinataClient::new(PinataConfig::new("key", "secret")).unwrap();
        assert_eq!(
            client.gateway_url("QmTest123"),
            "https://gateway.pinata.cloud/ipfs/QmTest123"
        );
    }

    #[test]
    fn test_locator_from_response() {
        let client = PinataClient::new(PinataConfig::new("key", "secret")).unwrap();
        let info = serde_json::json!({ "IpfsHash": "QmAbc" });
        assert_eq!(
            client.locator_from_response(&info).unwrap(),
            "https://gateway.pinata.cloud/ipfs/QmAbc"
        );

        let empty = serde_json::json!({});
        assert!(client.locator_from_response(&empty).is_err());
    }
}
