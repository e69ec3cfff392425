use std::marker::PhantomData;

use reqwest::Method;
use serde::Deserialize;

use crate::DeliveryClient;
use crate::error::Error;
use crate::error::Validate;
use crate::model::Resource;

/// Backend acknowledgement of a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: String,
}

/// CRUD operations on one resource collection (`{api}/{R::PATH}`).
///
/// `create` and `update` validate the payload first and return
/// [`Error::Validation`] without touching the network when it fails.
///
/// # Example
///
/// ```ignore
/// use delivery_lib::model::Product;
///
/// let products = client.resource::<Product>();
/// let all = products.list().await?;
/// products.delete(all[0].id.unwrap_or_default()).await?;
/// ```
pub struct ResourceService<R> {
    client: DeliveryClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<R> std::fmt::Debug for ResourceService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("resource", &std::any::type_name::<R>())
            .finish()
    }
}

impl<R> ResourceService<R> {
    pub(crate) fn new(client: DeliveryClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub async fn list(&self) -> Result<Vec<R>, Error> {
        let url = self.client.endpoint(R::PATH)?;
        self.client.get_json(url).await
    }

    pub async fn get(&self, id: i64) -> Result<R, Error> {
        let url = self.client.endpoint(&format!("{}/{}", R::PATH, id))?;
        self.client.get_json(url).await
    }

    pub async fn create(&self, payload: &R) -> Result<R, Error> {
        payload.validate()?;
        let url = self.client.endpoint(R::PATH)?;
        let created: R = self.client.send_json(Method::POST, url, payload).await?;
        log::info!("Created {} {:?}", R::NAME, created.id());
        Ok(created)
    }

    pub async fn update(&self, id: i64, payload: &R) -> Result<R, Error> {
        payload.validate()?;
        let url = self.client.endpoint(&format!("{}/{}", R::PATH, id))?;
        let updated = self.client.send_json(Method::PUT, url, payload).await?;
        log::info!("Updated {} {}", R::NAME, id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteResponse, Error> {
        let url = self.client.endpoint(&format!("{}/{}", R::PATH, id))?;
        let response = self
            .client
            .send(self.client.http(Method::DELETE, url))
            .await?;
        let text = response.text().await.unwrap_or_default();
        log::info!("Deleted {} {}", R::NAME, id);
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }
}
