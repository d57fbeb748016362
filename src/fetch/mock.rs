use super::FetchService;
use crate::error::FetchError;
use crate::models::ImageSource;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory fetcher: URLs registered with [`MockFetcher::with_image`]
/// resolve to their bytes, everything else fails with a network error.
#[derive(Clone)]
pub struct MockFetcher {
    images: Arc<Mutex<HashMap<String, (Vec<u8>, Option<String>)>>>,
    failures: Arc<Mutex<HashMap<String, FetchError>>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            fetch_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image(self, url: &str, data: Vec<u8>, content_type: Option<&str>) -> Self {
        self.images
            .lock()
            .unwrap()
            .insert(url.to_string(), (data, content_type.map(str::to_string)));
        self
    }

    pub fn with_failure(self, url: &str, error: FetchError) -> Self {
        self.failures.lock().unwrap().insert(url.to_string(), error);
        self
    }

    pub fn get_fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchService for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<ImageSource> {
        *self.fetch_count.lock().unwrap() += 1;

        if let Some(error) = self.failures.lock().unwrap().get(url) {
            return Err(error.clone().into());
        }

        let images = self.images.lock().unwrap();
        match images.get(url) {
            Some((data, content_type)) => Ok(ImageSource::new(
                url,
                Bytes::from(data.clone()),
                content_type.as_deref(),
            )),
            None => Err(FetchError::Network(format!("No mock image for {}", url)).into()),
        }
    }
}
