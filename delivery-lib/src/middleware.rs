//! Request middleware run before every dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Request;

use crate::error::Error;

/// A stage that may rewrite an outgoing request before it is sent.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use delivery_lib::middleware::RequestMiddleware;
///
/// struct UserAgent;
///
/// #[async_trait]
/// impl RequestMiddleware for UserAgent {
///     async fn handle(&self, mut request: reqwest::Request) -> Result<reqwest::Request, delivery_lib::Error> {
///         request.headers_mut().insert(
///             reqwest::header::USER_AGENT,
///             reqwest::header::HeaderValue::from_static("delivery-admin"),
///         );
///         Ok(request)
///     }
/// }
/// ```
#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    async fn handle(&self, request: Request) -> Result<Request, Error>;
}

/// Ordered chain of [`RequestMiddleware`] stages.
#[derive(Clone, Default)]
pub struct RequestPipeline {
    stages: Vec<Arc<dyn RequestMiddleware>>,
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage; stages run in insertion order.
    pub fn with(mut self, stage: impl RequestMiddleware + 'static) -> Self {
        self.push(Arc::new(stage));
        self
    }

    pub fn push(&mut self, stage: Arc<dyn RequestMiddleware>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage in order; the first error aborts the chain.
    pub async fn run(&self, mut request: Request) -> Result<Request, Error> {
        for stage in &self.stages {
            request = stage.handle(request).await?;
        }
        Ok(request)
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use reqwest::header::HeaderValue;

    use super::*;

    struct Tag(&'static str);

    #[async_trait]
    impl RequestMiddleware for Tag {
        async fn handle(&self, mut request: Request) -> Result<Request, Error> {
            let previous = request
                .headers()
                .get("x-trace")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let value = format!("{}{}", previous, self.0);
            request.headers_mut().insert(
                "x-trace",
                HeaderValue::from_str(&value).map_err(|e| Error::Config(e.to_string()))?,
            );
            Ok(request)
        }
    }

    struct Reject;

    #[async_trait]
    impl RequestMiddleware for Reject {
        async fn handle(&self, _request: Request) -> Result<Request, Error> {
            Err(Error::Config("rejected".into()))
        }
    }

    fn request() -> Request {
        Request::new(Method::GET, "http://localhost:5000/products".parse().unwrap())
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let pipeline = RequestPipeline::new().with(Tag("a")).with(Tag("b"));
        let request = pipeline.run(request()).await.unwrap();
        assert_eq!(request.headers().get("x-trace").unwrap(), "ab");
    }

    #[tokio::test]
    async fn test_error_aborts_chain() {
        let pipeline = RequestPipeline::new().with(Reject).with(Tag("a"));
        assert!(matches!(pipeline.run(request()).await, Err(Error::Config(_))));
    }
}
