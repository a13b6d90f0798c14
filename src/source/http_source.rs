use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::AppError;
use crate::source::MapSource;

/// Plain GET of a published map image. No auth, no extra headers, no retries.
pub struct HttpSource {
    url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

fn is_image_content_type(value: &str) -> bool {
    value
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

#[async_trait]
impl MapSource for HttpSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, AppError> {
        info!(url = %self.url, "fetching map image");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(&self.url, format!("HTTP status {status}")));
        }

        // A missing content type is left for the decoder to judge.
        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !is_image_content_type(content_type) {
                return Err(AppError::fetch(
                    &self.url,
                    format!("expected an image, got content type {content_type:?}"),
                ));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(&self.url, e))?;
        debug!(url = %self.url, len = bytes.len(), "map image downloaded");
        Ok(bytes.to_vec())
    }
}
