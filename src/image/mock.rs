use super::ImageService;
use crate::models::{EncodedResult, ImageSource};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Echoes the source bytes back under a fixed content-type and records the
/// quality each call was made with.
pub struct MockTranscoder {
    content_type: String,
    qualities: Arc<Mutex<Vec<i64>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self {
            content_type: "image/webp".to_string(),
            qualities: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_transcode_count(&self) -> usize {
        self.qualities.lock().unwrap().len()
    }

    pub fn get_qualities(&self) -> Vec<i64> {
        self.qualities.lock().unwrap().clone()
    }

    /// Shared handle onto the recorded qualities, usable after the mock has
    /// been boxed into an [`crate::app::App`].
    pub fn qualities_handle(&self) -> Arc<Mutex<Vec<i64>>> {
        Arc::clone(&self.qualities)
    }
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockTranscoder {
    async fn transcode(&self, source: &ImageSource, quality: i64) -> Result<EncodedResult> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Encode("Mock failure".to_string()));
        }

        self.qualities.lock().unwrap().push(quality);
        Ok(EncodedResult::new(
            source.raw_bytes.clone(),
            &self.content_type,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn source() -> ImageSource {
        ImageSource::new("https://a/x.png", Bytes::from_static(b"data"), Some("image/png"))
    }

    #[tokio::test]
    async fn test_mock_transcoder_echoes_bytes() {
        let transcoder = MockTranscoder::new().with_content_type("image/jpeg");

        let result = transcoder.transcode(&source(), 42).await.unwrap();

        assert_eq!(result.bytes, Bytes::from_static(b"data"));
        assert_eq!(result.content_type, "image/jpeg");
        assert_eq!(transcoder.get_transcode_count(), 1);
        assert_eq!(transcoder.get_qualities(), vec![42]);
    }

    #[tokio::test]
    async fn test_mock_transcoder_failure() {
        let transcoder = MockTranscoder::new().with_failure(true);

        assert!(transcoder.transcode(&source(), 80).await.is_err());
        assert_eq!(transcoder.get_transcode_count(), 0);
    }
}
