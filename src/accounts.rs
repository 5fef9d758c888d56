// Linked accounts: Tropicard and crypto self-charge

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::Error;

/// Payload for [`Client::add_tropicard_account`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTropicardAccountRequest {
    pub tropicard_number: String,
    pub pin: String,
}

/// A deposit address for a specific network and currency
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CryptoAddress {
    pub address: String,
    pub network: String,
    pub currency: String,
}

/// Crypto deposit addresses and the fees applied on self-charge
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CryptoAddressesResponse {
    /// Fee as a percentage scaled by 100 (300 = 3.00%)
    pub fee_percent: i32,
    /// Fixed fee in cents
    pub fee_fixed: i32,
    pub accounts: Vec<CryptoAddress>,
}

impl Client {
    /// Link a Tropicard to the user's account.
    ///
    /// The platform does not document the response shape; expect an `id`
    /// field usable with the other account endpoints.
    pub async fn add_tropicard_account(
        &self,
        request: &AddTropicardAccountRequest,
    ) -> Result<Value, Error> {
        self.request(Method::POST, "/accounts/", Some(request)).await
    }

    /// Crypto deposit addresses for funding a specific account
    pub async fn crypto_addresses(&self, account_id: &str) -> Result<CryptoAddressesResponse, Error> {
        let path = format!("/accounts/{account_id}/selfcharge/crypto");
        self.request(Method::GET, &path, None::<&()>).await
    }
}
