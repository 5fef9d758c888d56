// Movement listing and the GraphQL business search

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::Error;
use crate::users::User;

/// Lifecycle states a movement passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl MovementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementState::Pending => "pending",
            MovementState::Completed => "completed",
            MovementState::Failed => "failed",
            MovementState::Cancelled => "cancelled",
        }
    }
}

/// A transaction record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Movement {
    /// Integer on REST endpoints, string on GraphQL
    pub id: Value,
    /// Amount in cents
    pub amount: i64,
    pub currency: String,
    /// Kept as the raw string; endpoints disagree on casing
    pub state: String,
    pub reference: String,
    pub created_at: String,
    pub completed_at: String,
    pub balance_before: i64,
    pub balance_after: i64,
    /// Populated by the GraphQL search
    pub recipient: Option<User>,
    pub sender: Option<User>,
    pub account: Option<Value>,
}

/// Filter criteria for movement listings
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_gte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_lte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Only honored by the GraphQL search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListMovementsResponse {
    pub items: Vec<Movement>,
    pub total_count: i64,
    pub has_more: bool,
}

const MOVEMENTS_QUERY: &str = "query GetMovements($filter: MovementFilter, $pagination: Pagination) { movements(filter: $filter, pagination: $pagination) { items { id amount state currency createdAt completedAt balanceBefore balanceAfter reference recipient { name email } sender { name email } } totalCount } }";

/// Append `limit`, `offset` and the JSON-encoded filter to a listing path.
/// Zero limit/offset are left out, matching the platform's defaults.
fn listing_path(
    base: &str,
    limit: u32,
    offset: u32,
    filter: Option<&MovementFilter>,
) -> Result<String, Error> {
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
    if let Some(filter) = filter {
        let encoded = serde_json::to_string(filter).map_err(Error::Encode)?;
        query.append_pair("query", &encoded);
        has_params = true;
    }

    if has_params {
        Ok(format!("{}?{}", base, query.finish()))
    } else {
        Ok(base.to_string())
    }
}

impl Client {
    /// List movements for the authenticated user
    pub async fn movements(
        &self,
        limit: u32,
        offset: u32,
        filter: Option<&MovementFilter>,
    ) -> Result<ListMovementsResponse, Error> {
        let path = listing_path("/movements/", limit, offset, filter)?;
        self.request(Method::GET, &path, None::<&()>).await
    }

    /// List movements for a specific account
    pub async fn account_movements(
        &self,
        account_id: &str,
        limit: u32,
        offset: u32,
        filter: Option<&MovementFilter>,
    ) -> Result<ListMovementsResponse, Error> {
        let base = format!("/accounts/{account_id}/movements");
        let path = listing_path(&base, limit, offset, filter)?;
        self.request(Method::GET, &path, None::<&()>).await
    }

    /// Advanced movement search through the GraphQL business endpoint
    pub async fn search_movements(
        &self,
        filter: Option<&MovementFilter>,
        limit: u32,
        offset: u32,
    ) -> Result<ListMovementsResponse, Error> {
        #[derive(Serialize)]
        struct Pagination {
            limit: u32,
            offset: u32,
        }

        #[derive(Serialize)]
        struct Variables<'a> {
            filter: Option<&'a MovementFilter>,
            pagination: Pagination,
        }

        #[derive(Deserialize)]
        struct Data {
            movements: ListMovementsResponse,
        }

        let variables = Variables {
            filter,
            pagination: Pagination { limit, offset },
        };

        let data: Data = self
            .graphql("/movements/business", MOVEMENTS_QUERY, &variables)
            .await?;
        Ok(data.movements)
    }
}
