// Token manager
// Caches the access token and guarantees single-flight acquisition

use std::sync::Arc;

use chrono::Duration;
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};

use super::acquire;
use super::types::{Credentials, Token};
use crate::error::Error;

/// Owns the OAuth2 client-credentials token lifecycle.
///
/// Cheap to clone; all clones share one cache and one refresh gate, so any
/// number of in-flight calls observe a single token acquisition.
#[derive(Clone)]
pub(crate) struct TokenManager {
    inner: Arc<Inner>,
}

struct Inner {
    credentials: Credentials,
    token_url: String,
    http: Client,

    /// How long before expiry a cached token stops being handed out
    refresh_margin: Duration,

    /// Cached token; the fast path reads this without touching the gate
    cached: RwLock<Option<Token>>,

    /// Serializes the check-and-acquire sequence so that racing callers
    /// trigger exactly one network acquisition
    refresh_gate: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        http: Client,
        token_url: String,
        credentials: Credentials,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                credentials,
                token_url,
                http,
                refresh_margin,
                cached: RwLock::new(None),
                refresh_gate: Mutex::new(()),
            }),
        }
    }

    /// Return a token valid for at least the refresh margin, acquiring a new
    /// one if the cache is empty or stale.
    pub async fn token(&self) -> Result<Token, Error> {
        if let Some(token) = self.fresh_cached().await {
            return Ok(token);
        }

        let _gate = self.inner.refresh_gate.lock().await;

        // Another caller may have finished acquiring while we waited
        if let Some(token) = self.fresh_cached().await {
            return Ok(token);
        }

        self.acquire_and_cache().await
    }

    /// Discard the cached token and acquire a new one.
    /// Invoked after the API rejects a request as unauthorized.
    pub async fn force_refresh(&self) -> Result<Token, Error> {
        let _gate = self.inner.refresh_gate.lock().await;
        tracing::debug!("discarding cached token for a forced refresh");
        self.inner.cached.write().await.take();
        self.acquire_and_cache().await
    }

    async fn fresh_cached(&self) -> Option<Token> {
        let cached = self.inner.cached.read().await;
        cached
            .as_ref()
            .filter(|token| token.is_fresh(self.inner.refresh_margin))
            .cloned()
    }

    /// Run the grant on a detached task. A caller dropping its future must
    /// not abort an acquisition other callers are waiting on, so the task
    /// writes the cache itself and survives any single waiter.
    async fn acquire_and_cache(&self) -> Result<Token, Error> {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let token = acquire::client_credentials_grant(
                &inner.http,
                &inner.token_url,
                &inner.credentials,
            )
            .await?;
            *inner.cached.write().await = Some(token.clone());
            Ok(token)
        });

        match task.await {
            Ok(result) => result,
            Err(join) => Err(Error::Auth {
                status: None,
                message: format!("token acquisition task failed: {join}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures::future;

    fn manager_for(server: &mockito::ServerGuard) -> TokenManager {
        TokenManager::new(
            Client::new(),
            format!("{}/access/token", server.url()),
            Credentials {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
            },
            Duration::seconds(60),
        )
    }

    async fn seed(manager: &TokenManager, access_token: &str, lifetime_secs: i64) {
        *manager.inner.cached.write().await = Some(Token {
            access_token: access_token.to_string(),
            expires_at: Utc::now() + Duration::seconds(lifetime_secs),
        });
    }

    #[tokio::test]
    async fn fresh_cached_token_skips_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/access/token")
            .expect(0)
            .create_async()
            .await;

        let manager = manager_for(&server);
        seed(&manager, "CACHED", 3600).await;

        let token = manager.token().await.expect("cached token is returned");
        assert_eq!(token.access_token, "CACHED");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn token_inside_margin_is_reacquired() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/access/token")
            .with_status(200)
            .with_body(r#"{"access_token":"FRESH","expires_in":3600,"token_type":"Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let manager = manager_for(&server);
        // Expires in 30s, margin is 60s: must not be handed out
        seed(&manager, "STALE", 30).await;

        let token = manager.token().await.expect("stale token is replaced");
        assert_eq!(token.access_token, "FRESH");
        assert!(token.is_fresh(Duration::seconds(60)));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_acquisition() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/access/token")
            .with_status(200)
            .with_body(r#"{"access_token":"SHARED","expires_in":3600,"token_type":"Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let manager = manager_for(&server);
        let results =
            future::join_all((0..8).map(|_| manager.token())).await;

        for result in results {
            let token = result.expect("every caller gets a token");
            assert_eq!(token.access_token, "SHARED");
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn force_refresh_discards_a_valid_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/access/token")
            .with_status(200)
            .with_body(r#"{"access_token":"NEW","expires_in":3600,"token_type":"Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let manager = manager_for(&server);
        seed(&manager, "OLD", 3600).await;

        let token = manager.force_refresh().await.expect("refresh succeeds");
        assert_eq!(token.access_token, "NEW");

        // The cache now serves the new token without another acquisition
        let token = manager.token().await.expect("cache holds the new token");
        assert_eq!(token.access_token, "NEW");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn acquisition_failure_caches_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/access/token")
            .with_status(400)
            .with_body(r#"{"message":"invalid client"}"#)
            .expect(2)
            .create_async()
            .await;

        let manager = manager_for(&server);

        let err = manager.token().await.expect_err("grant is rejected");
        assert!(matches!(err, Error::Auth { status: Some(400), .. }));

        // A second call goes back to the network instead of serving a cache
        let err = manager.token().await.expect_err("still rejected");
        assert!(matches!(err, Error::Auth { status: Some(400), .. }));

        mock.assert_async().await;
    }
}
