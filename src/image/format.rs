use super::metadata::ImageMetadata;

pub const GIF: &str = "image/gif";
pub const JPEG: &str = "image/jpeg";
pub const SVG: &str = "image/svg+xml";
pub const WEBP: &str = "image/webp";

/// Encoding branch a source image falls into.
///
/// Variants are listed in match priority: an animated GIF is recognised
/// from its decoded frames before any URL or content-type hint is looked
/// at, the rest by URL suffix or declared content-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    AnimatedGif,
    Png,
    Jpeg,
    StaticGif,
    WebP,
    Svg,
    Unsupported,
}

impl SourceFormat {
    pub fn classify(metadata: &ImageMetadata, url: &str, content_type: &str) -> Self {
        if metadata.is_animated() {
            return SourceFormat::AnimatedGif;
        }

        let url = url.to_ascii_lowercase();
        let content_type = content_type.to_ascii_lowercase();
        let matches = |suffixes: &[&str], mime: &str| {
            suffixes.iter().any(|s| url.ends_with(s)) || content_type.contains(mime)
        };

        if matches(&[".png"], "image/png") {
            SourceFormat::Png
        } else if matches(&[".jpg", ".jpeg"], "image/jpeg") {
            SourceFormat::Jpeg
        } else if matches(&[".gif"], "image/gif") {
            SourceFormat::StaticGif
        } else if matches(&[".webp"], "image/webp") {
            SourceFormat::WebP
        } else if matches(&[".svg"], "image/svg") {
            SourceFormat::Svg
        } else {
            SourceFormat::Unsupported
        }
    }

    /// Content-type of the produced bytes; `None` keeps the upstream one.
    pub fn output_content_type(self) -> Option<&'static str> {
        match self {
            SourceFormat::AnimatedGif => Some(GIF),
            SourceFormat::Png | SourceFormat::StaticGif | SourceFormat::WebP => Some(WEBP),
            SourceFormat::Jpeg => Some(JPEG),
            SourceFormat::Svg => Some(SVG),
            SourceFormat::Unsupported => None,
        }
    }
}
