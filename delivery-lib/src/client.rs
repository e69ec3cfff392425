//! Main DeliveryClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::api::DashboardService;
use crate::api::PhotosService;
use crate::api::ResourceService;
use crate::auth::AuthScope;
use crate::auth::BearerAuth;
use crate::auth::TokenProvider;
use crate::config::DeliveryConfig;
use crate::error::ApiError;
use crate::error::Error;
use crate::middleware::RequestMiddleware;
use crate::middleware::RequestPipeline;
use crate::model::Resource;

/// The client for the delivery backend REST API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks.
///
/// # Example
///
/// ```ignore
/// use delivery_lib::{DeliveryClient, auth::StaticTokenProvider, model::Product};
///
/// let client = DeliveryClient::builder()
///     .url("http://localhost:5000")
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()?;
///
/// let products = client.resource::<Product>().list().await?;
/// ```
#[derive(Clone)]
pub struct DeliveryClient {
    pub(crate) inner: Arc<DeliveryClientInner>,
}

pub(crate) struct DeliveryClientInner {
    pub(crate) base_url: Url,
    pub(crate) stats_url: Option<Url>,
    pub(crate) token_provider: Arc<dyn TokenProvider>,
    pub(crate) pipeline: RequestPipeline,
    pub(crate) http_client: Client,
    pub(crate) timeout: Option<Duration>,
}

impl DeliveryClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> DeliveryClientBuilder<Missing, Missing> {
        DeliveryClientBuilder::new()
    }

    /// Builds a client from a [`DeliveryConfig`].
    pub fn from_config<T: TokenProvider + 'static>(
        config: &DeliveryConfig,
        provider: T,
    ) -> Result<Self, Error> {
        let mut builder = Self::builder()
            .url(config.api_url.clone())
            .token_provider(provider);
        if let Some(stats_url) = &config.stats_url {
            builder = builder.stats_url(stats_url.clone());
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// CRUD access to one resource collection.
    pub fn resource<R: Resource>(&self) -> ResourceService<R> {
        ResourceService::new(self.clone())
    }

    /// Photo metadata and uploads.
    pub fn photos(&self) -> PhotosService {
        PhotosService::new(self.clone())
    }

    /// Pre-computed dashboard statistics.
    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.clone())
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the statistics server URL, if configured.
    pub fn stats_url(&self) -> Option<&Url> {
        self.inner.stats_url.as_ref()
    }

    /// Returns the token provider used by the bearer middleware.
    pub fn token_provider(&self) -> &Arc<dyn TokenProvider> {
        &self.inner.token_provider
    }

    /// Signs the current user out of the token provider.
    pub async fn sign_out(&self) {
        self.inner.token_provider.sign_out().await;
    }
}

impl std::fmt::Debug for DeliveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("stats_url", &self.inner.stats_url.as_ref().map(Url::as_str))
            .field("pipeline", &self.inner.pipeline)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url.trim()).map_err(|e| Error::Api(ApiError::InvalidUrl(format!("{}: {}", url, e))))
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`DeliveryClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The backend API base URL
/// - `token_provider` - A [`TokenProvider`] implementation
///
/// # Example
///
/// ```ignore
/// let client = DeliveryClient::builder()
///     .url("http://localhost:5000")
///     .token_provider(my_provider)
///     .stats_url("https://stats.example.com")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct DeliveryClientBuilder<U, P> {
    url: U,
    token_provider: P,
    stats_url: Option<String>,
    auth_scope: Option<AuthScope>,
    middleware: Vec<Arc<dyn RequestMiddleware>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl DeliveryClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token_provider: Missing,
            stats_url: None,
            auth_scope: None,
            middleware: Vec::new(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for DeliveryClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> DeliveryClientBuilder<Missing, P> {
    /// Sets the backend API base URL.
    pub fn url(self, url: impl Into<String>) -> DeliveryClientBuilder<Set<String>, P> {
        DeliveryClientBuilder {
            url: Set(url.into()),
            token_provider: self.token_provider,
            stats_url: self.stats_url,
            auth_scope: self.auth_scope,
            middleware: self.middleware,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> DeliveryClientBuilder<U, Missing> {
    /// Sets the token provider for authentication.
    pub fn token_provider<T: TokenProvider + 'static>(
        self,
        provider: T,
    ) -> DeliveryClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        DeliveryClientBuilder {
            url: self.url,
            token_provider: Set(Arc::new(provider) as Arc<dyn TokenProvider>),
            stats_url: self.stats_url,
            auth_scope: self.auth_scope,
            middleware: self.middleware,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, P> DeliveryClientBuilder<U, P> {
    /// Sets the dashboard statistics server URL.
    pub fn stats_url(mut self, url: impl Into<String>) -> Self {
        self.stats_url = Some(url.into());
        self
    }

    /// Restricts which URLs receive the bearer token.
    ///
    /// Defaults to [`AuthScope::api`] for the configured URL.
    pub fn auth_scope(mut self, scope: AuthScope) -> Self {
        self.auth_scope = Some(scope);
        self
    }

    /// Adds a middleware stage run after bearer authentication.
    pub fn middleware(mut self, stage: impl RequestMiddleware + 'static) -> Self {
        self.middleware.push(Arc::new(stage));
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl DeliveryClientBuilder<Set<String>, Set<Arc<dyn TokenProvider>>> {
    /// Builds the [`DeliveryClient`].
    ///
    /// Fails with [`ApiError::InvalidUrl`] if a URL does not parse.
    pub fn build(self) -> Result<DeliveryClient, Error> {
        let base_url = parse_url(&self.url.0)?;
        let stats_url = self.stats_url.as_deref().map(parse_url).transpose()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        let token_provider = self.token_provider.0;
        let scope = self
            .auth_scope
            .unwrap_or_else(|| AuthScope::api(&base_url));

        let mut pipeline =
            RequestPipeline::new().with(BearerAuth::new(token_provider.clone(), scope));
        for stage in self.middleware {
            pipeline.push(stage);
        }

        Ok(DeliveryClient {
            inner: Arc::new(DeliveryClientInner {
                base_url,
                stats_url,
                token_provider,
                pipeline,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = DeliveryClient::builder()
            .url("not a url")
            .token_provider(StaticTokenProvider::new("t"))
            .build();
        assert!(matches!(result, Err(Error::Api(ApiError::InvalidUrl(_)))));
    }

    #[test]
    fn test_builder_pipeline_has_bearer_stage() {
        let client = DeliveryClient::builder()
            .url("http://localhost:5000")
            .token_provider(StaticTokenProvider::new("t"))
            .stats_url("https://stats.example.com/")
            .build()
            .unwrap();
        assert_eq!(client.inner.pipeline.len(), 1);
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");
        assert!(client.stats_url().is_some());
    }
}
