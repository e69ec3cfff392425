//! Request dispatch shared by every service.

use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::DeliveryClient;
use crate::error::ApiError;
use crate::error::Error;

impl DeliveryClient {
    /// `{base}/{path}`, tolerating slashes on either side.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        join_url(&self.inner.base_url, path)
    }

    /// `{stats_url}/{path}`; a client without a stats server is a config error.
    pub(crate) fn stats_endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self
            .inner
            .stats_url
            .as_ref()
            .ok_or_else(|| Error::Config("no statistics server URL configured".into()))?;
        join_url(base, path)
    }

    pub(crate) fn http(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.http_client.request(method, url)
    }

    /// Runs the middleware pipeline and sends the request.
    ///
    /// Non-2xx responses become [`ApiError::Http`] with the normalised
    /// message.
    pub(crate) async fn send(&self, mut builder: RequestBuilder) -> Result<Response, Error> {
        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }
        let request = builder.build().map_err(ApiError::from)?;
        let request = self.inner.pipeline.run(request).await?;

        log::debug!("{} {}", request.method(), request.url());

        let response = self
            .inner
            .http_client
            .execute(request)
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response_body(status, &body);
        log::debug!("Request failed: {}", err);
        Err(err.into())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let response = self.send(self.http(Method::GET, url)).await?;
        read_json(response).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        let payload = serde_json::to_vec(body)?;
        let builder = self
            .http(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        let response = self.send(builder).await?;
        read_json(response).await
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            ApiError::Timeout(self.inner.timeout.unwrap_or_default()).into()
        } else {
            ApiError::Network(err).into()
        }
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let text = response.text().await.map_err(ApiError::from)?;
    serde_json::from_str(&text)
        .map_err(|e| ApiError::parse_with_body(e.to_string(), text).into())
}

fn join_url(base: &Url, path: &str) -> Result<Url, Error> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", joined, e)).into())
}
