//! Request pipeline shared by the single-image and batch endpoints.

use crate::fetch::{FetchService, HttpFetcher};
use crate::image::{ImageService, Transcoder};
use crate::models::{BatchItem, Config, EncodedResult};
use crate::Result;
use tracing::{error, info, warn};

/// Downloads a remote image and re-encodes it.
pub struct App {
    fetcher: Box<dyn FetchService>,
    transcoder: Box<dyn ImageService>,
    config: Config,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub fetcher: Box<dyn FetchService>,
    pub transcoder: Box<dyn ImageService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, config: Config) -> Self {
        Self {
            fetcher: services.fetcher,
            transcoder: services.transcoder,
            config,
        }
    }

    /// Construct the production pipeline: an HTTP fetcher bounded by the
    /// configured timeout and a transcoder capped at the configured size.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Box::new(HttpFetcher::new(config.fetch_timeout)?);
        let transcoder = Box::new(Transcoder::new(config.max_dimension));

        Ok(Self::with_services(
            AppServices {
                fetcher,
                transcoder,
            },
            config,
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Single-image pipeline. Sources above the size ceiling are returned
    /// as downloaded.
    pub async fn compress(&self, url: &str, quality: i64) -> Result<EncodedResult> {
        info!("Processing {} (quality {})", url, quality);

        let source = self.fetcher.fetch(url).await?;

        if source.len() > self.config.max_source_bytes {
            warn!(
                "Image too large ({:.2} MB) for {}, returning original",
                source.len() as f64 / (1024.0 * 1024.0),
                url
            );
            return Ok(source.passthrough());
        }

        self.transcoder.transcode(&source, quality).await
    }

    /// Batch pipeline. URLs are handled one after another; any URL that
    /// fails is left out of the result.
    pub async fn compress_batch(&self, urls: &[String], quality: i64) -> Vec<BatchItem> {
        let mut items = Vec::with_capacity(urls.len());

        for url in urls {
            match self.compress_batch_item(url, quality).await {
                Ok(result) => items.push(BatchItem::new(url, &result)),
                Err(e) => error!("Failed to process {}: {}", url, e),
            }
        }

        info!("Batch finished: {}/{} images processed", items.len(), urls.len());
        items
    }

    async fn compress_batch_item(&self, url: &str, quality: i64) -> Result<EncodedResult> {
        info!("Processing {} (quality {})", url, quality);
        let source = self.fetcher.fetch(url).await?;
        self.transcoder.transcode(&source, quality).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::MockFetcher;
    use crate::image::MockTranscoder;
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn app(fetcher: MockFetcher, transcoder: MockTranscoder, config: Config) -> App {
        App::with_services(
            AppServices {
                fetcher: Box::new(fetcher),
                transcoder: Box::new(transcoder),
            },
            config,
        )
    }

    #[tokio::test]
    async fn test_compress_runs_fetch_then_transcode() {
        let fetcher = MockFetcher::new().with_image("https://a/x.png", vec![1, 2], Some("image/png"));
        let transcoder = MockTranscoder::new();
        let qualities = transcoder.qualities_handle();
        let app = app(fetcher, transcoder, Config::default());

        let result = app.compress("https://a/x.png", 65).await.unwrap();

        assert_eq!(result.content_type, "image/webp");
        assert_eq!(result.bytes.as_ref(), &[1, 2]);
        assert_eq!(*qualities.lock().unwrap(), vec![65]);
    }

    #[tokio::test]
    async fn test_compress_oversized_source_passes_through() {
        let fetcher =
            MockFetcher::new().with_image("https://a/huge.png", vec![7; 64], Some("image/png"));
        let transcoder = MockTranscoder::new();
        let qualities = transcoder.qualities_handle();
        let config = Config {
            max_source_bytes: 32,
            ..Config::default()
        };
        let app = app(fetcher, transcoder, config);

        let result = app.compress("https://a/huge.png", 80).await.unwrap();

        assert_eq!(result.content_type, "image/png");
        assert_eq!(result.bytes.len(), 64);
        assert!(qualities.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_compress_propagates_fetch_error() {
        let fetcher = MockFetcher::new().with_failure("https://a/404.png", FetchError::Status(404));
        let app = app(fetcher, MockTranscoder::new(), Config::default());

        let err = app.compress("https://a/404.png", 80).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::Status(404))));
    }

    #[tokio::test]
    async fn test_batch_drops_failures_and_keeps_order() {
        let fetcher = MockFetcher::new()
            .with_image("https://good/a.png", vec![1], Some("image/png"))
            .with_failure("https://bad-host/b.jpg", FetchError::Timeout)
            .with_image("https://good/c.png", vec![3], None);
        let app = app(fetcher.clone(), MockTranscoder::new(), Config::default());

        let urls = vec![
            "https://good/a.png".to_string(),
            "https://bad-host/b.jpg".to_string(),
            "https://good/c.png".to_string(),
        ];
        let items = app.compress_batch(&urls, 80).await;

        let returned: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(returned, vec!["https://good/a.png", "https://good/c.png"]);
        assert_eq!(items[0].base64_url, "data:image/webp;base64,AQ==");
        assert_eq!(fetcher.get_fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_batch_ignores_size_ceiling() {
        let fetcher =
            MockFetcher::new().with_image("https://a/huge.png", vec![7; 64], Some("image/png"));
        let transcoder = MockTranscoder::new();
        let qualities = transcoder.qualities_handle();
        let config = Config {
            max_source_bytes: 32,
            ..Config::default()
        };
        let app = app(fetcher, transcoder, config);

        let items = app.compress_batch(&["https://a/huge.png".to_string()], 80).await;

        assert_eq!(items.len(), 1);
        assert_eq!(qualities.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_transcode_failure_is_omitted() {
        let fetcher = MockFetcher::new().with_image("https://a/x.png", vec![1], None);
        let app = app(fetcher, MockTranscoder::new().with_failure(true), Config::default());

        let items = app.compress_batch(&["https://a/x.png".to_string()], 80).await;
        assert!(items.is_empty());
    }
}
