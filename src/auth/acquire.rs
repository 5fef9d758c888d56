// Token acquisition
// One client-credentials grant against the environment's token endpoint

use chrono::{Duration, Utc};
use reqwest::Client;

use super::types::{Credentials, Token, TokenRequest, TokenResponse};
use crate::error::{probe_error_body, Error};

/// Exchange the stored credentials for a fresh access token.
///
/// Failures are never retried here; whether re-acquisition is worthwhile is
/// the pipeline's decision.
pub(crate) async fn client_credentials_grant(
    http: &Client,
    token_url: &str,
    credentials: &Credentials,
) -> Result<Token, Error> {
    tracing::debug!(url = %token_url, "requesting access token");

    let grant = TokenRequest {
        grant_type: "client_credentials",
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
    };

    let response = http
        .post(token_url)
        .json(&grant)
        .send()
        .await
        .map_err(Error::Network)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let (_, message) = probe_error_body(&body);
        tracing::warn!(
            status = status.as_u16(),
            "token endpoint rejected the grant"
        );
        return Err(Error::Auth {
            status: Some(status.as_u16()),
            message: message.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        });
    }

    let body = response.bytes().await.map_err(Error::Network)?;
    let parsed: TokenResponse =
        serde_json::from_slice(&body).map_err(|source| Error::Decode { source, body })?;

    if parsed.access_token.is_empty() {
        return Err(Error::Auth {
            status: Some(status.as_u16()),
            message: "token endpoint returned an empty access token".to_string(),
        });
    }

    let expires_at = Utc::now() + Duration::seconds(parsed.expires_in as i64);
    tracing::debug!(expires_at = %expires_at.to_rfc3339(), "access token issued");

    Ok(Token {
        access_token: parsed.access_token,
        expires_at,
    })
}
