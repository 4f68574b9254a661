use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{detail_message, CatalogError, Result};
use crate::model::Identity;

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/auth/signup";

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const SIGNUP_FAILED: &str = "Signup failed. Please try again.";

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-blank.
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(CatalogError::validation("Email and password are required"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl SignupRequest {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let blank = [&self.email, &self.username, &self.password]
            .iter()
            .any(|field| field.trim().is_empty());
        if blank {
            return Err(CatalogError::validation("All fields are required"));
        }
        Ok(())
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The remote collaborator that decides whether credentials are valid.
#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity>;
    async fn register(&self, request: &SignupRequest) -> Result<()>;
}

/// Login payload as the auth service reports it. Only the token may be present,
/// in which case the identity falls back to the submitted email.
#[derive(Deserialize)]
struct AuthResponse {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Auth service reached over HTTP with JSON bodies
#[derive(Clone)]
pub struct HttpAuthService {
    http: Client,
    base: String,
}

impl HttpAuthService {
    pub fn new(http: Client, auth_base: &str) -> Self {
        Self {
            http,
            base: auth_base.trim_end_matches('/').to_string(),
        }
    }

    async fn rejection(response: reqwest::Response, fallback: &str) -> CatalogError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "Auth service rejected request");
        CatalogError::auth(detail_message(&body).unwrap_or_else(|| fallback.to_string()))
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity> {
        crate::log_api_request!("login", email = %credentials.email);
        let response = self
            .http
            .post(format!("{}{LOGIN_PATH}", self.base))
            .json(credentials)
            .send()
            .await
            .map_err(CatalogError::Network)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, LOGIN_FAILED).await);
        }

        let text = response.text().await.map_err(CatalogError::Network)?;
        let body: AuthResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(error = %e, body = %text, "Unreadable login response");
            CatalogError::auth(LOGIN_FAILED)
        })?;
        Ok(Identity {
            email: body
                .email
                .filter(|email| !email.is_empty())
                .unwrap_or_else(|| credentials.email.clone()),
            username: body.username,
            full_name: body.full_name,
            access_token: body.access_token,
            token_type: body.token_type,
        })
    }

    async fn register(&self, request: &SignupRequest) -> Result<()> {
        crate::log_api_request!("signup", email = %request.email);
        let response = self
            .http
            .post(format!("{}{SIGNUP_PATH}", self.base))
            .json(request)
            .send()
            .await
            .map_err(CatalogError::Network)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, SIGNUP_FAILED).await);
        }
        Ok(())
    }
}
