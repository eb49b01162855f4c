//! Image hosting destinations.
//!
//! The relocation engine only sees the [`ImageHost`] trait; [`HttpImageHost`]
//! speaks the multipart upload contract: one `file` part in, a JSON object
//! with a `url` field out.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ImageFailure;
use crate::resolve::VerifiedImage;

/// A sink that accepts image bytes and returns a reachable URL.
///
/// Implementations must tolerate concurrent calls; the engine does not
/// serialize access.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image: VerifiedImage) -> Result<String, ImageFailure>;
}

/// Uploads to an HTTP endpoint as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct HttpImageHost {
    client: Client,
    upload_url: Url,
}

impl HttpImageHost {
    pub fn new(client: Client, upload_url: Url) -> Self {
        Self { client, upload_url }
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, image: VerifiedImage) -> Result<String, ImageFailure> {
        let file_name = image.file_name();
        let mime = image.mime_type();
        debug!(%file_name, bytes = image.bytes.len(), "uploading image");

        let part = Part::bytes(image.bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(ImageFailure::upload)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(ImageFailure::upload)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageFailure::upload(format!("HTTP {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ImageFailure::upload(format!("invalid response body: {e}")))?;

        extract_url(&payload).ok_or(ImageFailure::MissingUrl)
    }
}

/// The non-empty `url` string of an upload response.
fn extract_url(payload: &Value) -> Option<String> {
    payload
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
}
