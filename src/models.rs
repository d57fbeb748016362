use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quality used when a request omits it or sends something non-numeric.
pub const DEFAULT_QUALITY: i64 = 80;

/// Content-type reported when the upstream response has none.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw bytes of a downloaded image, as the upstream served them.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub url: String,
    pub raw_bytes: Bytes,
    pub declared_content_type: String,
}

impl ImageSource {
    pub fn new(url: impl Into<String>, raw_bytes: Bytes, declared_content_type: Option<&str>) -> Self {
        Self {
            url: url.into(),
            raw_bytes,
            declared_content_type: declared_content_type
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.raw_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_bytes.is_empty()
    }

    /// The source handed back untouched, with the upstream content-type.
    pub fn passthrough(&self) -> EncodedResult {
        EncodedResult {
            bytes: self.raw_bytes.clone(),
            content_type: self.declared_content_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResult {
    pub bytes: Bytes,
    pub content_type: String,
}

impl EncodedResult {
    pub fn new(bytes: impl Into<Bytes>, content_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.to_string(),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

// HTTP request/response models
#[derive(Debug, Deserialize)]
pub struct CompressQuery {
    pub url: Option<String>,
    pub quality: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub quality: Option<QualityInput>,
    pub arr: Vec<String>,
}

/// Batch clients send quality either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QualityInput {
    Number(f64),
    Text(String),
}

impl QualityInput {
    /// Resolve to an integer quality without range checking.
    pub fn resolve(&self) -> i64 {
        match self {
            QualityInput::Number(n) if *n == 0.0 || !n.is_finite() => DEFAULT_QUALITY,
            QualityInput::Number(n) => n.trunc() as i64,
            QualityInput::Text(s) => quality_from_text(Some(s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchItem {
    #[serde(rename = "base64URL")]
    pub base64_url: String,
    pub url: String,
}

impl BatchItem {
    pub fn new(url: &str, result: &EncodedResult) -> Self {
        Self {
            base64_url: result.to_data_uri(),
            url: url.to_string(),
        }
    }
}

/// Parse a quality string the lenient way: leading integer digits win,
/// anything unparseable or empty falls back to [`DEFAULT_QUALITY`].
pub fn quality_from_text(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_QUALITY;
    };

    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i64>()
        .map(|v| sign * v)
        .unwrap_or(DEFAULT_QUALITY)
}

/// Out-of-range qualities are replaced by the default rather than rejected.
pub fn clamp_quality(quality: i64) -> i64 {
    if (1..=100).contains(&quality) {
        quality
    } else {
        tracing::warn!(
            "Quality {} out of range, using {}",
            quality,
            DEFAULT_QUALITY
        );
        DEFAULT_QUALITY
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_dimension: u32,
    pub max_source_bytes: usize,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_dimension: 600,
            max_source_bytes: 10 * 1024 * 1024,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn with_bind(mut self, host: String, port: u16) -> Self {
        self.host = host;
        self.port = port;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
