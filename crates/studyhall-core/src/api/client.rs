//! HTTP client for the studyhall identity service.
//!
//! This module defines the [`IdentityService`] trait the session manager
//! depends on, and [`IdentityClient`], the reqwest-backed implementation
//! that talks to the real service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::credentials::Credential;
use crate::models::UserIdentity;

use super::IdentityError;

/// HTTP request timeout in seconds.
/// 30s allows for slow service responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Result of a successful signup or signin: the credential to persist and
/// the identity it belongs to.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub credential: Credential,
    pub user: UserIdentity,
}

/// The remote identity service, as seen by the session manager.
///
/// `IdentityClient` is the production implementation; tests substitute
/// scripted doubles.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create a new account and issue a credential for it.
    async fn create_account(&self, email: &str, password: &str)
        -> Result<AuthGrant, IdentityError>;

    /// Authenticate an existing account and issue a credential.
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthGrant, IdentityError>;

    /// Exchange a credential for the identity it proves.
    async fn resolve_current_user(
        &self,
        credential: &Credential,
    ) -> Result<UserIdentity, IdentityError>;

    /// Invalidate a credential server-side. Best-effort; callers ignore failures.
    async fn invalidate_session(&self, credential: &Credential) -> Result<(), IdentityError>;
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
    user: UserIdentity,
}

impl From<AuthResponse> for AuthGrant {
    fn from(resp: AuthResponse) -> Self {
        AuthGrant {
            credential: Credential::new(resp.access_token, resp.refresh_token),
            user: resp.user,
        }
    }
}

/// Identity service client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
}

impl IdentityClient {
    /// Create a new client for the service at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Shared body of signup and signin: post email/password, decode the
    /// grant, mapping failures through `map_err`.
    async fn request_grant(
        &self,
        path: &str,
        email: &str,
        password: &str,
        map_err: fn(reqwest::StatusCode, &str) -> IdentityError,
    ) -> Result<AuthGrant, IdentityError> {
        let response = self
            .client
            .post(self.url(path))
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_err(status, &body));
        }

        let auth: AuthResponse = response.json().await?;
        debug!(user_id = %auth.user.id, "Received credential grant");
        Ok(auth.into())
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthGrant, IdentityError> {
        self.request_grant(
            "/auth/signup",
            email,
            password,
            IdentityError::from_signup_status,
        )
        .await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthGrant, IdentityError> {
        self.request_grant(
            "/auth/signin",
            email,
            password,
            IdentityError::from_signin_status,
        )
        .await
    }

    async fn resolve_current_user(
        &self,
        credential: &Credential,
    ) -> Result<UserIdentity, IdentityError> {
        let response = self
            .client
            .get(self.url("/auth/user"))
            .bearer_auth(&credential.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::from_resolve_status(status, &body));
        }

        Ok(response.json().await?)
    }

    async fn invalidate_session(&self, credential: &Credential) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.url("/auth/signout"))
            .bearer_auth(&credential.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::from_resolve_status(status, &body));
        }

        Ok(())
    }
}
