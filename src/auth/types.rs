// Authentication types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Application credentials for the client-credentials grant.
/// Supplied once at construction, owned by the token manager, never exposed.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// An access token and its expiry
#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// True while the token is strictly more than `margin` away from expiry
    pub fn is_fresh(&self, margin: Duration) -> bool {
        Utc::now() + margin < self.expires_at
    }
}

/// Client-credentials grant request body
#[derive(Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Token endpoint success payload
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds from the moment of issuance
    pub expires_in: u64,
    #[serde(default)]
    #[allow(dead_code)]
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_respects_margin() {
        let token = Token {
            access_token: "tok".to_string(),
            expires_at: Utc::now() + Duration::seconds(120),
        };

        // Expires in 2 minutes: fresh under a 60s margin, stale under 5 minutes
        assert!(token.is_fresh(Duration::seconds(60)));
        assert!(!token.is_fresh(Duration::seconds(300)));
    }

    #[test]
    fn expired_token_is_never_fresh() {
        let token = Token {
            access_token: "tok".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(!token.is_fresh(Duration::zero()));
    }

    #[test]
    fn token_response_tolerates_missing_token_type() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":3600}"#).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, 3600);
        assert_eq!(parsed.token_type, "");
    }
}
