//! TokenProvider trait and AccessToken

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::AuthError;

/// A bearer token with optional expiration and refresh token.
#[derive(Clone)]
pub struct AccessToken {
    /// The bearer token sent in the `Authorization` header.
    pub access_token: String,
    /// When the token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token for obtaining new access tokens without signing in again.
    pub refresh_token: Option<String>,
}

impl AccessToken {
    /// Creates a new access token with just the token string.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
            refresh_token: None,
        }
    }

    /// Creates a new access token with expiration and refresh token.
    pub fn with_refresh(
        access_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Returns `true` if the token has expired.
    ///
    /// Returns `false` if expiration time is unknown.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns `true` if the token will expire within the given duration.
    ///
    /// Returns `false` if expiration time is unknown.
    pub fn expires_within(&self, duration: chrono::Duration) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() + duration >= exp)
    }

    /// Returns `true` if a refresh token is available.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// A short prefix of the token, safe to log.
    pub fn redacted(&self) -> String {
        let prefix: String = self.access_token.chars().take(12).collect();
        format!("{}...", prefix)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &self.redacted())
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Source of bearer tokens for outgoing requests.
///
/// The client calls `get_token` before each request that needs
/// authentication. Implementations return a cached token while it is valid
/// and refresh or re-authenticate transparently. A provider with no signed-in
/// user returns [`AuthError::NotSignedIn`].
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use delivery_lib::auth::{AccessToken, TokenProvider};
/// use delivery_lib::error::AuthError;
///
/// struct EnvTokenProvider;
///
/// #[async_trait]
/// impl TokenProvider for EnvTokenProvider {
///     async fn get_token(&self, _force_refresh: bool) -> Result<AccessToken, AuthError> {
///         std::env::var("DELIVERY_TOKEN")
///             .map(AccessToken::new)
///             .map_err(|_| AuthError::NotSignedIn)
///     }
/// }
/// ```
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns the current bearer token.
    ///
    /// With `force_refresh` the provider must not return its cached token.
    async fn get_token(&self, force_refresh: bool) -> Result<AccessToken, AuthError>;

    /// Forgets the signed-in user. Later calls to `get_token` fail with
    /// [`AuthError::NotSignedIn`].
    async fn sign_out(&self) {}
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn get_token(&self, force_refresh: bool) -> Result<AccessToken, AuthError> {
        (**self).get_token(force_refresh).await
    }

    async fn sign_out(&self) {
        (**self).sign_out().await
    }
}

/// A token provider that returns a fixed token until signed out.
///
/// # Example
///
/// ```
/// use delivery_lib::auth::StaticTokenProvider;
///
/// let provider = StaticTokenProvider::new("my-access-token");
/// ```
#[derive(Debug)]
pub struct StaticTokenProvider {
    token: RwLock<Option<AccessToken>>,
}

impl StaticTokenProvider {
    /// Creates a new static token provider with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::from_token(AccessToken::new(access_token))
    }

    /// Creates a new static token provider from an existing AccessToken.
    pub fn from_token(token: AccessToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }

    /// A provider with no signed-in user.
    pub fn signed_out() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self, _force_refresh: bool) -> Result<AccessToken, AuthError> {
        self.token.read().await.clone().ok_or(AuthError::NotSignedIn)
    }

    async fn sign_out(&self) {
        *self.token.write().await = None;
    }
}
