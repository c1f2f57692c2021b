//! Image upload to external file storage.
//!
//! The admin form hands the chosen image to this service, which forwards it
//! as a multipart request and returns the public URL the storage service
//! assigns. The service may answer with a single object or a list of them;
//! the first URL wins.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::UploadsConfig;

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum UploadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The file is not an image.
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    /// The file exceeds the configured limit.
    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    /// No file was sent.
    #[error("No file provided")]
    Missing,
}

/// An image received from the admin form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check content type and size before forwarding.
    ///
    /// # Errors
    ///
    /// `Missing` for an empty file, `UnsupportedType` for non-images,
    /// `TooLarge` above `max_bytes`.
    pub fn validate(&self, max_bytes: usize) -> Result<(), UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::Missing);
        }
        if !self.content_type.starts_with("image/") {
            return Err(UploadError::UnsupportedType(self.content_type.clone()));
        }
        if self.bytes.len() > max_bytes {
            return Err(UploadError::TooLarge {
                size: self.bytes.len(),
                max: max_bytes,
            });
        }
        Ok(())
    }
}

/// Storage backend for product images.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store an image and return its public URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, UploadError>;
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Many(Vec<UploadedFile>),
    One(UploadedFile),
}

impl UploadResponse {
    fn into_url(self) -> Option<String> {
        match self {
            Self::Many(files) => files.into_iter().next().map(|f| f.url),
            Self::One(file) => Some(file.url),
        }
    }
}

/// HTTP client for the upload endpoint.
#[derive(Clone)]
pub struct UploadClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl UploadClient {
    /// Create a new upload client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &UploadsConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ImageStorage for UploadClient {
    #[instrument(skip(self, image), fields(file_name = %image.file_name, size = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> Result<String, UploadError> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Parse(e.to_string()))?;

        body.into_url()
            .ok_or_else(|| UploadError::Parse("response contained no files".to_string()))
    }
}
