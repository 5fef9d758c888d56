// Beneficiary (deposit account) management

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::Error;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CountryDestination {
    pub id: i64,
    pub name: String,
    pub sepa_zone: bool,
    pub slug: String,
    pub calling_code: i32,
}

/// An account the beneficiary may receive funds through
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AllowedAccount {
    pub id: i64,
    pub alias: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: i32,
}

/// A beneficiary record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DepositAccount {
    pub id: i64,
    pub account_number: String,
    pub first_name: String,
    pub last_name: String,
    pub alias: String,
    pub swift: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub person_type: i32,
    /// "active" on some endpoints, an integer on others
    pub state: Value,
    pub country_destination_id: i64,
    pub document_number: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    pub country_destination: Option<CountryDestination>,
    pub payment_methods: Vec<String>,
    pub allowed_accounts: Vec<AllowedAccount>,
    pub allowed: bool,
}

/// Payload for [`Client::create_deposit_account`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositAccountRequest {
    pub account_number: String,
    pub first_name: String,
    pub last_name: String,
    pub country_destination_id: i64,
    #[serde(rename = "type")]
    pub kind: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swift: Option<String>,
}

/// Payload for [`Client::update_deposit_account`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepositAccountRequest {
    pub id: i64,
    pub alias: String,
}

/// Payload for [`Client::validate_account_number`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccountNumberRequest {
    pub account_number: String,
    pub country_destination_id: i64,
    #[serde(rename = "type")]
    pub kind: i32,
    pub currency: String,
    pub payment_type: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidateAccountNumberResponse {
    pub valid: bool,
    /// May be null
    #[serde(rename = "type")]
    pub kind: Value,
    pub error_code: Value,
    pub error_message: Value,
}

#[derive(Deserialize)]
struct ListDepositAccountsResponse {
    #[serde(default)]
    items: Vec<DepositAccount>,
}

fn listing_path(limit: u32, offset: u32, search: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut has_params = false;

    if limit > 0 {
        query.append_pair("limit", &limit.to_string());
        has_params = true;
    }
    if offset > 0 {
        query.append_pair("offset", &offset.to_string());
        has_params = true;
    }
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        query.append_pair("search", search);
        has_params = true;
    }

    if has_params {
        format!("/depositaccounts/?{}", query.finish())
    } else {
        "/depositaccounts/".to_string()
    }
}

impl Client {
    /// Create a new beneficiary record
    pub async fn create_deposit_account(
        &self,
        request: &CreateDepositAccountRequest,
    ) -> Result<DepositAccount, Error> {
        self.request(Method::POST, "/depositaccounts/", Some(request))
            .await
    }

    /// List beneficiaries, optionally narrowed by a search term
    pub async fn deposit_accounts(
        &self,
        limit: u32,
        offset: u32,
        search: Option<&str>,
    ) -> Result<Vec<DepositAccount>, Error> {
        let path = listing_path(limit, offset, search);
        let response: ListDepositAccountsResponse =
            self.request(Method::GET, &path, None::<&()>).await?;
        Ok(response.items)
    }

    /// A single beneficiary
    pub async fn deposit_account(&self, id: i64) -> Result<DepositAccount, Error> {
        let path = format!("/depositaccounts/{id}");
        self.request(Method::GET, &path, None::<&()>).await
    }

    /// Update a beneficiary's alias
    pub async fn update_deposit_account(
        &self,
        request: &UpdateDepositAccountRequest,
    ) -> Result<DepositAccount, Error> {
        self.request(Method::PUT, "/depositaccounts/", Some(request))
            .await
    }

    /// Delete a beneficiary; requires a security code sent to the user
    pub async fn delete_deposit_account(
        &self,
        id: i64,
        security_code: &str,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct DeleteRequest<'a> {
            security_code: &'a str,
        }

        let path = format!("/depositaccounts/{id}");
        self.request_unit(Method::DELETE, &path, Some(&DeleteRequest { security_code }))
            .await
    }

    /// Check an account number's format and existence for a destination
    pub async fn validate_account_number(
        &self,
        request: &ValidateAccountNumberRequest,
    ) -> Result<ValidateAccountNumberResponse, Error> {
        self.request(
            Method::POST,
            "/depositaccounts/validateaccountnumber",
            Some(request),
        )
        .await
    }
}
