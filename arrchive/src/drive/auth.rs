//! Google service-account authentication.
//!
//! Signs an RS256 JWT with the service account's private key and exchanges it
//! for a bearer token (OAuth 2.0 JWT bearer grant). Tokens are cached and
//! refreshed shortly before they expire.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::utils::errors::{ArrchiveError, Result};

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.metadata",
];
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Service account credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key_id: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > Utc::now()
    }
}

/// Issues bearer tokens for a service account
pub struct Authenticator {
    http: reqwest::Client,
    credentials: ServiceAccount,
    token_url: String,
    cached: Mutex<Option<AccessToken>>,
}

impl Authenticator {
    pub fn new(credentials: ServiceAccount) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Override the token endpoint
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Return a valid bearer token, requesting a new one when the cached token is
    /// missing or about to expire.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.token.clone());
        }

        let token = self.request_token().await?;
        let value = token.token.clone();
        *cached = Some(token);

        Ok(value)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            iss: &self.credentials.client_email,
            scope: SCOPES.join(" "),
            aud: &self.token_url,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.credentials.private_key_id.clone());

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now).map_err(|e| {
            ArrchiveError::Authentication(format!("failed to sign assertion: {}", e))
        })?;

        debug!("Requesting access token from {}", self.token_url);

        let resp = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ArrchiveError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let body: TokenResponse = resp.json().await?;
        let expires_in = body.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);

        info!("Authenticated as {}", self.credentials.client_email);

        Ok(AccessToken {
            token: body.access_token,
            expires_at: now + Duration::seconds(expires_in),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) const TEST_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pem");

    pub(crate) fn test_account() -> ServiceAccount {
        ServiceAccount {
            client_email: "arrchive@project.iam.gserviceaccount.com".to_string(),
            private_key_id: "key-id".to_string(),
            private_key: TEST_KEY.to_string(),
        }
    }

    pub(crate) async fn mock_token_endpoint(server: &MockServer, token: &str) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant-type%3Ajwt-bearer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "expires_in": 3599,
                "token_type": "Bearer",
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let rendered = format!("{:?}", test_account());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("PRIVATE KEY"));
    }

    #[tokio::test]
    async fn test_access_token_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test",
                "expires_in": 3599,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = Authenticator::new(test_account())
            .with_token_url(format!("{}/token", server.uri()));

        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_an_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let auth = Authenticator::new(test_account())
            .with_token_url(format!("{}/token", server.uri()));

        let err = auth.access_token().await.unwrap_err();
        assert!(matches!(err, ArrchiveError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_malformed_key_is_an_authentication_error() {
        let mut account = test_account();
        account.private_key = "not a key".to_string();

        let auth = Authenticator::new(account).with_token_url("http://127.0.0.1:9/token");

        let err = auth.access_token().await.unwrap_err();
        assert!(matches!(err, ArrchiveError::Authentication(_)));
    }
}
