//! Marketplace workflow: fixed-price listing and purchase.

use crate::error::{Error, Result};
use rwa_ledger::{parse_units, Ledger, Signer, TxHash};
use std::sync::Arc;
use tracing::info;

pub struct MarketplaceWorkflow {
    ledger: Arc<dyn Ledger>,
}

impl MarketplaceWorkflow {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// List `amount` units of a token at the given human-entered price.
    /// The decimal-to-base-unit conversion happens here, once, through the
    /// canonical `parse_units`.
    pub async fn list(
        &self,
        signer: &Signer,
        token_id: u64,
        price_text: &str,
        amount: u64,
    ) -> Result<TxHash> {
        let price = parse_units(price_text).map_err(|e| Error::validation(e.to_string()))?;
        if price == 0 {
            return Err(Error::validation("listing price must be greater than zero"));
        }
        if amount == 0 {
            return Err(Error::validation("listing amount must be a positive integer"));
        }

        let tx_hash = self.ledger.list_token(signer, token_id, price, amount).await?;
        info!(token_id, price_text, amount, %tx_hash, "token listed");
        Ok(tx_hash)
    }

    /// Buy a listed token, moving exactly the listed price. The same
    /// canonical conversion is used so the value matches the listing to the
    /// base unit.
    pub async fn buy(&self, signer: &Signer, token_id: u64, price_text: &str) -> Result<TxHash> {
        let value = parse_units(price_text).map_err(|e| Error::validation(e.to_string()))?;
        if value == 0 {
            return Err(Error::validation("purchase price must be greater than zero"));
        }

        let tx_hash = self.ledger.buy_token(signer, token_id, value).await?;
        info!(token_id, price_text, %tx_hash, "token bought");
        Ok(tx_hash)
    }
}
