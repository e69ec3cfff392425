//! Bearer token middleware

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Request;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderValue;
use url::Url;

use super::TokenProvider;
use crate::error::AuthError;
use crate::error::Error;
use crate::middleware::RequestMiddleware;

type Predicate = Arc<dyn Fn(&Url) -> bool + Send + Sync>;

/// Decides which URLs receive the bearer token.
#[derive(Clone)]
pub struct AuthScope {
    predicate: Predicate,
}

impl AuthScope {
    /// Requests to the API's origin, or to any path containing `/api/`.
    pub fn api(api_url: &Url) -> Self {
        let host = api_url.host_str().map(str::to_owned);
        let port = api_url.port_or_known_default();
        Self::custom(move |url| {
            let same_origin = host.is_some()
                && url.host_str() == host.as_deref()
                && url.port_or_known_default() == port;
            same_origin || url.path().contains("/api/")
        })
    }

    /// Every request.
    pub fn all() -> Self {
        Self::custom(|_| true)
    }

    pub fn custom(predicate: impl Fn(&Url) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, url: &Url) -> bool {
        (self.predicate)(url)
    }
}

impl std::fmt::Debug for AuthScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthScope").finish_non_exhaustive()
    }
}

/// Attaches `Authorization: Bearer <token>` to requests inside its scope.
///
/// Without a signed-in user the request goes out unchanged.
#[derive(Clone)]
pub struct BearerAuth {
    provider: Arc<dyn TokenProvider>,
    scope: AuthScope,
}

impl BearerAuth {
    pub fn new(provider: Arc<dyn TokenProvider>, scope: AuthScope) -> Self {
        Self { provider, scope }
    }
}

#[async_trait]
impl RequestMiddleware for BearerAuth {
    async fn handle(&self, mut request: Request) -> Result<Request, Error> {
        if !self.scope.matches(request.url()) {
            return Ok(request);
        }

        let token = match self.provider.get_token(false).await {
            Ok(token) => token,
            Err(AuthError::NotSignedIn) => {
                log::trace!("No signed-in user, sending {} without token", request.url());
                return Ok(request);
            }
            Err(e) => return Err(e.into()),
        };

        let mut value = HeaderValue::from_str(&token.as_bearer())
            .map_err(|e| AuthError::Parse(format!("invalid token: {}", e)))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        log::trace!("Attached token {} to {}", token.redacted(), request.url());

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use super::*;
    use crate::auth::StaticTokenProvider;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn request(s: &str) -> Request {
        Request::new(Method::GET, url(s))
    }

    #[test]
    fn test_api_scope() {
        let scope = AuthScope::api(&url("http://localhost:5000"));
        assert!(scope.matches(&url("http://localhost:5000/orders")));
        assert!(scope.matches(&url("https://example.com/api/orders")));
        assert!(!scope.matches(&url("http://localhost:5001/orders")));
        assert!(!scope.matches(&url("https://maps.example.com/tiles")));
    }

    #[tokio::test]
    async fn test_attaches_token_in_scope() {
        let auth = BearerAuth::new(
            Arc::new(StaticTokenProvider::new("abc")),
            AuthScope::api(&url("http://localhost:5000")),
        );

        let inside = auth.handle(request("http://localhost:5000/orders")).await.unwrap();
        assert_eq!(inside.headers().get(AUTHORIZATION).unwrap(), "Bearer abc");

        let outside = auth.handle(request("https://maps.example.com/x")).await.unwrap();
        assert!(outside.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_signed_out_passes_through() {
        let auth = BearerAuth::new(Arc::new(StaticTokenProvider::signed_out()), AuthScope::all());
        let request = auth.handle(request("http://localhost:5000/orders")).await.unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}
