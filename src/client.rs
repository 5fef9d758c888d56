// Tropipay client and request pipeline
// One logical call: resolve the URL, attach a valid token, send, decode or
// map the failure, with a single forced-refresh retry on 401

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use chrono::Duration as ChronoDuration;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::{Credentials, TokenManager};
use crate::config::Environment;
use crate::error::{api_error, Error};

const USER_AGENT: &str = concat!("tropipay-rs/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Tropipay API client.
///
/// Created once and shared: it is cheap to clone, and all clones share the
/// transport and the token cache. Any number of calls may be in flight
/// concurrently; the first one (and any that finds the token near expiry)
/// transparently acquires a token, and racing calls share that acquisition.
///
/// Dropping the future returned by any call aborts its in-flight request.
/// A token refresh other calls are waiting on is never aborted that way.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    environment: Environment,
    base_url: String,
    auth: TokenManager,
}

impl Client {
    /// Client for the given credentials against the production environment
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::builder(client_id, client_secret).build()
    }

    /// Start configuring a client
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            environment: Environment::Production,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            http: None,
        }
    }

    /// The environment this client was built against
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Send a request and decode the JSON response body into `T`
    pub(crate) async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.send(method, path, body).await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode { source, body })
    }

    /// Send a request, discarding any response body on success.
    /// Used by fire-and-forget endpoints whose responses carry no payload.
    pub(crate) async fn request_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), Error>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, body).await.map(|_| ())
    }

    /// POST a GraphQL document and unwrap the `{data, errors}` envelope.
    ///
    /// An HTTP 200 carrying a non-empty `errors` array is a logical failure
    /// and surfaces as an API error even though the transport succeeded.
    pub(crate) async fn graphql<V, T>(
        &self,
        path: &str,
        query: &str,
        variables: &V,
    ) -> Result<T, Error>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = GraphQlRequest { query, variables };
        let body = self.send(Method::POST, path, Some(&request)).await?;

        let envelope: GraphQlEnvelope<T> = serde_json::from_slice(&body)
            .map_err(|source| Error::Decode { source, body: body.clone() })?;

        if let Some(first) = envelope.errors.into_iter().next() {
            return Err(Error::Api {
                status: StatusCode::OK.as_u16(),
                code: None,
                message: first.message,
                body,
            });
        }

        envelope.data.ok_or_else(|| Error::Api {
            status: StatusCode::OK.as_u16(),
            code: None,
            message: "GraphQL response carried no data".to_string(),
            body,
        })
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Bytes, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        // Serialized once; the retry resends the identical payload
        let payload = match body {
            Some(body) => Some(Bytes::from(
                serde_json::to_vec(body).map_err(Error::Encode)?,
            )),
            None => None,
        };

        let token = self.auth.token().await?;
        tracing::debug!(method = %method, url = %url, "sending request");
        let response = self
            .dispatch(&method, &url, payload.as_ref(), &token.access_token)
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            // One forced refresh, one resend; whatever the second attempt
            // yields is final
            tracing::debug!(url = %url, "unauthorized, refreshing token and retrying once");
            let token = self.auth.force_refresh().await?;
            self.dispatch(&method, &url, payload.as_ref(), &token.access_token)
                .await?
        } else {
            response
        };

        let status = response.status();
        let body = response.bytes().await.map_err(Error::Network)?;
        if status.is_success() {
            Ok(body)
        } else {
            tracing::warn!(status = status.as_u16(), url = %url, "request rejected");
            Err(api_error(status.as_u16(), body))
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &str,
        payload: Option<&Bytes>,
        access_token: &str,
    ) -> Result<reqwest::Response, Error> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json");

        if let Some(payload) = payload {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(payload.clone());
        }

        request.send().await.map_err(Error::Network)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    client_id: String,
    client_secret: String,
    environment: Environment,
    base_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    refresh_margin: Duration,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Target environment; defaults to production
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the base URL (and with it the token endpoint).
    /// Intended for mock servers and self-hosted gateways.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Per-request timeout; defaults to 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connection timeout; defaults to 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// How long before expiry a cached token is refreshed instead of being
    /// handed out; defaults to 60 seconds
    pub fn refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Use a pre-built transport instead of constructing one.
    /// Timeout settings on this builder are ignored when set.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Client, Error> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(Error::Config(
                "client id and client secret must be non-empty".to_string(),
            ));
        }

        let refresh_margin = ChronoDuration::from_std(self.refresh_margin)
            .map_err(|_| Error::Config("refresh margin out of range".to_string()))?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(self.timeout)
                .connect_timeout(self.connect_timeout)
                .build()
                .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?,
        };

        let (base_url, token_url) = match self.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/').to_string();
                let token_url = format!("{base}/access/token");
                (base, token_url)
            }
            None => (
                self.environment.base_url().to_string(),
                self.environment.token_url(),
            ),
        };

        let auth = TokenManager::new(
            http.clone(),
            token_url,
            Credentials {
                client_id: self.client_id,
                client_secret: self.client_secret,
            },
            refresh_margin,
        );

        Ok(Client {
            http,
            environment: self.environment,
            base_url,
            auth,
        })
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V: ?Sized> {
    query: &'a str,
    variables: &'a V,
}

#[derive(Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_are_rejected() {
        let err = Client::builder("", "secret").build().expect_err("empty id");
        assert!(matches!(err, Error::Config(_)));

        let err = Client::builder("id", "").build().expect_err("empty secret");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_to_production() {
        let client = Client::new("id", "secret").expect("client builds");
        assert_eq!(client.environment(), Environment::Production);
        assert_eq!(client.base_url, Environment::Production.base_url());
    }

    #[test]
    fn base_url_override_is_normalized() {
        let client = Client::builder("id", "secret")
            .environment(Environment::Sandbox)
            .base_url("http://127.0.0.1:8099/api/v2/")
            .build()
            .expect("client builds");
        assert_eq!(client.base_url, "http://127.0.0.1:8099/api/v2");
    }

    #[test]
    fn debug_output_holds_no_secrets() {
        let client = Client::new("id", "super-secret").expect("client builds");
        let debug = format!("{client:?}");
        assert!(debug.contains("Production"));
        assert!(!debug.contains("super-secret"));
    }
}
