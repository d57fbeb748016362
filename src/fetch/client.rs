use super::FetchService;
use crate::error::FetchError;
use crate::models::ImageSource;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use std::time::Duration;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new_with_client(client))
    }

    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchService for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ImageSource> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self.client.get(parsed).send().await.map_err(|e| {
            tracing::error!("Failed to download {}: {}", url, e);
            FetchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Upstream returned status {} for {}", status, url);
            return Err(FetchError::Status(status.as_u16()).into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(FetchError::from)?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);

        Ok(ImageSource::new(url, body, content_type.as_deref()))
    }
}
