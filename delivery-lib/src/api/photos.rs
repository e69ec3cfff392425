use std::path::Path;

use reqwest::Method;
use reqwest::multipart::Form;
use reqwest::multipart::Part;

use super::DeleteResponse;
use super::ResourceService;
use crate::DeliveryClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Photo;

/// An image to upload.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    /// Content type is guessed from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads an image from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    fn into_part(self) -> Result<Part, Error> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|e| ApiError::from(e).into())
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Photos attached to issues.
///
/// The backend serves the image itself at `/photos/{id}`, so metadata for a
/// single photo is looked up in the list.
#[derive(Debug, Clone)]
pub struct PhotosService {
    client: DeliveryClient,
    resource: ResourceService<Photo>,
}

impl PhotosService {
    pub(crate) fn new(client: DeliveryClient) -> Self {
        let resource = ResourceService::new(client.clone());
        Self { client, resource }
    }

    pub async fn list(&self) -> Result<Vec<Photo>, Error> {
        self.resource.list().await
    }

    /// Metadata of one photo, found in the list.
    pub async fn get(&self, id: i64) -> Result<Photo, Error> {
        self.list()
            .await?
            .into_iter()
            .find(|photo| photo.id == Some(id))
            .ok_or(Error::NotFound {
                resource: "photo",
                id,
            })
    }

    /// Creates a photo record from JSON metadata only.
    pub async fn create(&self, payload: &Photo) -> Result<Photo, Error> {
        self.resource.create(payload).await
    }

    pub async fn update(&self, id: i64, payload: &Photo) -> Result<Photo, Error> {
        self.resource.update(id, payload).await
    }

    pub async fn delete(&self, id: i64) -> Result<DeleteResponse, Error> {
        self.resource.delete(id).await
    }

    /// Uploads an image with no metadata.
    pub async fn upload(&self, file: PhotoFile) -> Result<Photo, Error> {
        self.create_with_file(file, &[]).await
    }

    /// Uploads an image with metadata fields; empty values are skipped.
    pub async fn create_with_file(
        &self,
        file: PhotoFile,
        metadata: &[(&str, String)],
    ) -> Result<Photo, Error> {
        let mut form = Form::new().part("file", file.into_part()?);
        for (name, value) in metadata {
            if !value.is_empty() {
                form = form.text(name.to_string(), value.clone());
            }
        }

        let url = self.client.endpoint("photos/upload")?;
        let response = self
            .client
            .send(self.client.http(Method::POST, url).multipart(form))
            .await?;
        let photo: Photo = super::request::read_json(response).await?;
        log::info!("Uploaded photo {:?}", photo.id);
        Ok(photo)
    }

    /// Raw image bytes.
    pub async fn image(&self, id: i64) -> Result<Vec<u8>, Error> {
        let url = self.client.endpoint(&format!("photos/{}", id))?;
        let response = self.client.send(self.client.http(Method::GET, url)).await?;
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("crash.JPG"), "image/jpeg");
        assert_eq!(guess_content_type("a.png"), "image/png");
        assert_eq!(guess_content_type("noext"), "application/octet-stream");
    }
}
