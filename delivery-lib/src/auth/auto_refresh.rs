//! Automatic token refresh handling.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::AccessToken;
use super::TokenProvider;
use crate::error::AuthError;

/// Authentication flows that can obtain and refresh tokens.
///
/// Used with [`AutoRefreshTokenProvider`] for automatic token management.
#[async_trait]
pub trait AuthFlow: Send + Sync {
    /// Authenticates and obtains a new access token.
    async fn authenticate(&self) -> Result<AccessToken, AuthError>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError>;
}

struct Session {
    token: Option<AccessToken>,
    signed_out: bool,
}

/// A token provider that caches and refreshes tokens from an [`AuthFlow`].
///
/// - Returns the cached token while it is valid
/// - Refreshes with the refresh token when the token is expiring soon or a
///   refresh is forced
/// - Falls back to full authentication if refresh fails
///
/// After [`sign_out`](TokenProvider::sign_out) no authentication happens
/// until [`sign_in`](AutoRefreshTokenProvider::sign_in) is called.
///
/// # Example
///
/// ```ignore
/// use delivery_lib::auth::{AutoRefreshTokenProvider, IdentityPasswordFlow};
/// use delivery_lib::DeliveryClient;
///
/// let flow = IdentityPasswordFlow::new(api_key, "admin@example.com", "secret");
/// let provider = AutoRefreshTokenProvider::new(flow);
///
/// let client = DeliveryClient::builder()
///     .url("http://localhost:5000")
///     .token_provider(provider)
///     .build();
/// ```
pub struct AutoRefreshTokenProvider<F> {
    flow: F,
    session: RwLock<Session>,
    /// Refresh this long before actual expiry
    refresh_buffer: Duration,
}

impl<F: AuthFlow> AutoRefreshTokenProvider<F> {
    /// Creates a provider that authenticates lazily on first use.
    ///
    /// Tokens are refreshed 5 minutes before they expire.
    pub fn new(flow: F) -> Self {
        Self::with_refresh_buffer(flow, Duration::from_secs(300))
    }

    /// Creates a provider with a custom refresh buffer.
    pub fn with_refresh_buffer(flow: F, refresh_buffer: Duration) -> Self {
        Self {
            flow,
            session: RwLock::new(Session {
                token: None,
                signed_out: false,
            }),
            refresh_buffer,
        }
    }

    /// The wrapped flow.
    pub fn flow(&self) -> &F {
        &self.flow
    }

    /// Authenticates now and caches the token, re-enabling a provider that
    /// was signed out.
    pub async fn sign_in(&self) -> Result<AccessToken, AuthError> {
        let token = self.flow.authenticate().await?;
        let mut session = self.session.write().await;
        session.token = Some(token.clone());
        session.signed_out = false;
        log::info!("Signed in");
        Ok(token)
    }

    /// Returns `true` unless the provider was signed out.
    pub async fn is_signed_in(&self) -> bool {
        !self.session.read().await.signed_out
    }

    /// Clears the cached token, forcing re-authentication on next request.
    pub async fn clear_token(&self) {
        self.session.write().await.token = None;
    }

    fn fresh<'a>(&self, token: Option<&'a AccessToken>) -> Option<&'a AccessToken> {
        let buffer =
            chrono::Duration::from_std(self.refresh_buffer).unwrap_or(chrono::Duration::zero());
        token.filter(|token| !token.expires_within(buffer))
    }
}

#[async_trait]
impl<F: AuthFlow> TokenProvider for AutoRefreshTokenProvider<F> {
    async fn get_token(&self, force_refresh: bool) -> Result<AccessToken, AuthError> {
        // Fast path: valid cached token
        if !force_refresh {
            let session = self.session.read().await;
            if session.signed_out {
                return Err(AuthError::NotSignedIn);
            }
            if let Some(token) = self.fresh(session.token.as_ref()) {
                return Ok(token.clone());
            }
        }

        let mut session = self.session.write().await;
        if session.signed_out {
            return Err(AuthError::NotSignedIn);
        }

        // Another task may have refreshed while we waited for the lock
        if !force_refresh && let Some(token) = self.fresh(session.token.as_ref()) {
            return Ok(token.clone());
        }

        let refresh_token = session
            .token
            .as_ref()
            .and_then(|token| token.refresh_token.clone());

        let new_token = match refresh_token {
            Some(refresh_token) => match self.flow.refresh(&refresh_token).await {
                Ok(token) => token,
                Err(e) => {
                    log::warn!("Token refresh failed, signing in again: {}", e);
                    self.flow.authenticate().await?
                }
            },
            None => self.flow.authenticate().await?,
        };

        log::trace!("Obtained token {}", new_token.redacted());
        session.token = Some(new_token.clone());
        Ok(new_token)
    }

    async fn sign_out(&self) {
        let mut session = self.session.write().await;
        session.token = None;
        session.signed_out = true;
        log::info!("Signed out");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct CountingFlow {
        authenticated: AtomicUsize,
        refreshed: AtomicUsize,
        fail_refresh: bool,
        expires_in_minutes: i64,
    }

    #[async_trait]
    impl AuthFlow for CountingFlow {
        async fn authenticate(&self) -> Result<AccessToken, AuthError> {
            let n = self.authenticated.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::with_refresh(
                format!("auth-{}", n),
                Some(Utc::now() + chrono::Duration::minutes(self.expires_in_minutes)),
                "refresh",
            ))
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<AccessToken, AuthError> {
            if self.fail_refresh {
                return Err(AuthError::TokenExpired {
                    message: "TOKEN_EXPIRED".into(),
                });
            }
            let n = self.refreshed.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::with_refresh(
                format!("refresh-{}", n),
                Some(Utc::now() + chrono::Duration::minutes(self.expires_in_minutes)),
                "refresh",
            ))
        }
    }

    #[tokio::test]
    async fn test_caches_valid_token() {
        let provider = AutoRefreshTokenProvider::new(CountingFlow {
            expires_in_minutes: 60,
            ..Default::default()
        });
        assert_eq!(provider.get_token(false).await.unwrap().access_token, "auth-1");
        assert_eq!(provider.get_token(false).await.unwrap().access_token, "auth-1");
        assert_eq!(provider.flow().authenticated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_uses_refresh_token() {
        let provider = AutoRefreshTokenProvider::new(CountingFlow {
            expires_in_minutes: 60,
            ..Default::default()
        });
        provider.get_token(false).await.unwrap();
        assert_eq!(provider.get_token(true).await.unwrap().access_token, "refresh-1");
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed() {
        let provider = AutoRefreshTokenProvider::new(CountingFlow {
            expires_in_minutes: 2,
            ..Default::default()
        });
        provider.get_token(false).await.unwrap();
        assert_eq!(provider.get_token(false).await.unwrap().access_token, "refresh-1");
    }

    #[tokio::test]
    async fn test_failed_refresh_falls_back_to_authenticate() {
        let provider = AutoRefreshTokenProvider::new(CountingFlow {
            expires_in_minutes: 60,
            fail_refresh: true,
            ..Default::default()
        });
        provider.get_token(false).await.unwrap();
        assert_eq!(provider.get_token(true).await.unwrap().access_token, "auth-2");
    }

    #[tokio::test]
    async fn test_sign_out_blocks_until_sign_in() {
        let provider = AutoRefreshTokenProvider::new(CountingFlow {
            expires_in_minutes: 60,
            ..Default::default()
        });
        provider.get_token(false).await.unwrap();
        provider.sign_out().await;

        assert!(matches!(provider.get_token(false).await, Err(AuthError::NotSignedIn)));
        assert!(matches!(provider.get_token(true).await, Err(AuthError::NotSignedIn)));
        assert!(!provider.is_signed_in().await);

        provider.sign_in().await.unwrap();
        assert_eq!(provider.get_token(false).await.unwrap().access_token, "auth-2");
    }
}
