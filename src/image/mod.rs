//! Image inspection and re-encoding
//!
//! Reads the metadata of a downloaded image, decides whether it needs to be
//! scaled down, and re-encodes it into a smaller web format (WebP,
//! progressive JPEG or GIF) or hands it back untouched.

pub mod format;
pub mod metadata;
pub mod mock;
pub mod processor;
pub mod resize;

pub use format::SourceFormat;
pub use metadata::{read_metadata, DetectedFormat, ImageMetadata};
pub use mock::MockTranscoder;
pub use processor::Transcoder;
pub use resize::ResizePolicy;

use crate::models::{EncodedResult, ImageSource};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn transcode(&self, source: &ImageSource, quality: i64) -> Result<EncodedResult>;
}
