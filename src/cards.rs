// Payment cards (hosted payment links)

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::Error;

/// A payment card: a shareable link that charges the payer on open
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentCard {
    pub id: i64,
    pub reference: String,
    pub concept: String,
    pub description: String,
    /// Amount in cents
    pub amount: i64,
    pub currency: String,
    pub single_use: bool,
    pub expiration_days: i32,
    pub state: i32,
    pub short_url: String,
    pub payment_url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for [`Client::create_payment_card`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentCardRequest {
    pub concept: String,
    /// Amount in cents
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_use: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_failed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_notification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_payment: Option<bool>,
}

#[derive(Deserialize)]
struct ListPaymentCardsResponse {
    #[serde(default)]
    items: Vec<PaymentCard>,
}

impl Client {
    /// List the user's payment cards
    pub async fn payment_cards(&self) -> Result<Vec<PaymentCard>, Error> {
        let response: ListPaymentCardsResponse = self
            .request(Method::GET, "/paymentcards/", None::<&()>)
            .await?;
        Ok(response.items)
    }

    /// A single payment card
    pub async fn payment_card(&self, id: i64) -> Result<PaymentCard, Error> {
        let path = format!("/paymentcards/{id}");
        self.request(Method::GET, &path, None::<&()>).await
    }

    /// Create a payment card
    pub async fn create_payment_card(
        &self,
        request: &CreatePaymentCardRequest,
    ) -> Result<PaymentCard, Error> {
        self.request(Method::POST, "/paymentcards/", Some(request))
            .await
    }

    /// Delete a payment card
    pub async fn delete_payment_card(&self, id: i64) -> Result<(), Error> {
        let path = format!("/paymentcards/{id}");
        self.request_unit(Method::DELETE, &path, None::<&()>).await
    }
}
