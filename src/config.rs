// Environment selection
// Sandbox and production map to fixed base and token-endpoint URLs

use std::fmt;

/// Deployment target a client is pinned to for its whole lifetime.
///
/// Sandbox keeps test traffic isolated from live financial operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Sandbox,
    /// Live environment
    Production,
}

impl Environment {
    /// Base URL every resource path is appended to
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://tropipay-dev.herokuapp.com/api/v2",
            Environment::Production => "https://www.tropipay.com/api/v2",
        }
    }

    /// Endpoint the client-credentials grant is posted to
    pub fn token_url(&self) -> String {
        format!("{}/access/token", self.base_url())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => f.write_str("sandbox"),
            Environment::Production => f.write_str("production"),
        }
    }
}
