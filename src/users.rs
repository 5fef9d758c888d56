// User profile and account-security endpoints

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Client;
use crate::error::Error;

/// A user profile.
///
/// Absent fields deserialize to their defaults; the GraphQL search returns
/// partial profiles (name and email only) through the same shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub state: i32,
    pub kyc_level: i32,
    /// Balance in cents
    pub balance: i64,
    pub pending_in: i64,
    pub pending_out: i64,
    pub two_fa_mode: i32,
    pub logo: String,
    pub created_at: String,
    pub updated_at: String,
    pub group: Option<Value>,
    pub user_detail: Option<Value>,
    pub options: Option<Value>,
}

/// Payload for [`Client::send_security_code`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSecurityCodeRequest {
    /// Delivery channel: "sms" or "email"
    #[serde(rename = "type")]
    pub kind: String,
    /// Required when the channel is sms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calling_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Required when the channel is email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Payload for [`Client::validate_security_token`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSecurityTokenRequest {
    pub security_code: String,
    /// "sms", "email" or "totp"
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidateSecurityTokenResponse {
    pub is_valid: bool,
    pub user: User,
    pub token: String,
}

/// Payload for [`Client::configure_two_factor`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureTwoFactorRequest {
    pub enabled: bool,
    /// "totp" or "sms"
    #[serde(rename = "type")]
    pub kind: String,
    pub security_code: String,
}

/// Secret and provisioning QR code for TOTP setup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TwoFactorSecretResponse {
    pub secret: String,
    pub qr_code_url: String,
}

/// Payload for [`Client::change_password`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_pass: String,
    pub new_pass: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisableUserResponse {
    pub success: bool,
    pub message: String,
}

impl Client {
    /// Profile of the authenticated user
    pub async fn user_profile(&self) -> Result<User, Error> {
        self.request(Method::GET, "/users/profile", None::<&()>).await
    }

    /// Send a security code to the user's phone or email
    pub async fn send_security_code(
        &self,
        request: &SendSecurityCodeRequest,
    ) -> Result<(), Error> {
        self.request_unit(Method::POST, "/users/sendSecurityCode", Some(request))
            .await
    }

    /// Validate a security code previously sent to the user
    pub async fn validate_security_token(
        &self,
        request: &ValidateSecurityTokenRequest,
    ) -> Result<ValidateSecurityTokenResponse, Error> {
        self.request(Method::POST, "/users/validateToken", Some(request))
            .await
    }

    /// Enable or disable two-factor authentication
    pub async fn configure_two_factor(
        &self,
        request: &ConfigureTwoFactorRequest,
    ) -> Result<(), Error> {
        self.request_unit(Method::POST, "/users/2fa", Some(request))
            .await
    }

    /// Generate a new TOTP secret for setting up two-factor authentication
    pub async fn two_factor_secret(&self) -> Result<TwoFactorSecretResponse, Error> {
        self.request(Method::POST, "/users/2fa/secret", None::<&()>)
            .await
    }

    /// Change the account password
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), Error> {
        self.request_unit(Method::POST, "/users/pass", Some(request))
            .await
    }

    /// Disable the user account
    pub async fn disable_account(&self) -> Result<DisableUserResponse, Error> {
        self.request(Method::POST, "/users/disable", None::<&()>).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_tolerates_partial_payloads() {
        let user: User =
            serde_json::from_str(r#"{"name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.id, "");
        assert_eq!(user.balance, 0);
        assert!(user.group.is_none());
    }

    #[test]
    fn security_code_request_omits_unused_channel_fields() {
        let request = SendSecurityCodeRequest {
            kind: "email".to_string(),
            calling_code: None,
            phone: None,
            email: Some("ada@example.com".to_string()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "email", "email": "ada@example.com"})
        );
    }

    #[test]
    fn two_factor_secret_uses_platform_field_names() {
        let response: TwoFactorSecretResponse = serde_json::from_str(
            r#"{"secret":"JBSWY3DP","qrCodeUrl":"https://example.com/qr.png"}"#,
        )
        .unwrap();
        assert_eq!(response.secret, "JBSWY3DP");
        assert_eq!(response.qr_code_url, "https://example.com/qr.png");
    }
}
