//! Remote image download
//!
//! Retrieves the raw bytes of a remote image over HTTP with a bounded
//! timeout, along with the content-type the upstream declared.

pub mod client;
pub mod mock;

pub use client::HttpFetcher;
pub use mock::MockFetcher;

use crate::models::ImageSource;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FetchService: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ImageSource>;
}
