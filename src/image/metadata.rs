use crate::{Error, Result};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

/// How far into the payload to look for an `<svg` root element.
const SVG_SNIFF_LEN: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Svg,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: DetectedFormat,
    pub frame_count: usize,
}

impl ImageMetadata {
    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn is_animated(&self) -> bool {
        self.format == DetectedFormat::Gif && self.frame_count > 1
    }
}

/// Inspect raw bytes. Only GIFs are fully decoded, to count their frames.
///
/// SVG is recognised by its markup since the raster decoders cannot read
/// it; its dimensions are reported as zero because it is never resized.
pub fn read_metadata(bytes: &[u8]) -> Result<ImageMetadata> {
    if looks_like_svg(bytes) {
        return Ok(ImageMetadata {
            width: 0,
            height: 0,
            format: DetectedFormat::Svg,
            frame_count: 1,
        });
    }

    let format = image::guess_format(bytes)
        .map_err(|e| Error::Decode(format!("Unrecognized image data: {}", e)))?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| Error::Decode(format!("Failed to read {:?} dimensions: {}", format, e)))?;

    let detected = match format {
        ImageFormat::Png => DetectedFormat::Png,
        ImageFormat::Jpeg => DetectedFormat::Jpeg,
        ImageFormat::Gif => DetectedFormat::Gif,
        ImageFormat::WebP => DetectedFormat::WebP,
        _ => DetectedFormat::Other,
    };

    let frame_count = match detected {
        DetectedFormat::Gif => count_gif_frames(bytes)?,
        _ => 1,
    };

    Ok(ImageMetadata {
        width,
        height,
        format: detected,
        frame_count,
    })
}

fn count_gif_frames(bytes: &[u8]) -> Result<usize> {
    let decoder = GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| Error::Decode(format!("Failed to open GIF: {}", e)))?;

    // A truncated trailing frame still leaves the frames before it usable.
    let count = decoder
        .into_frames()
        .take_while(|frame| frame.is_ok())
        .count();

    if count == 0 {
        return Err(Error::Decode("GIF contains no decodable frames".to_string()));
    }
    Ok(count)
}

/// True when the root element is `<svg`. A BOM, the XML prolog, comments
/// and an svg doctype may precede it; any other first element rejects.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);
    let mut rest = text.trim_start_matches('\u{feff}');

    loop {
        rest = rest.trim_start();
        let (terminator, is_doctype) = if rest.starts_with("<?") {
            ("?>", false)
        } else if rest.starts_with("<!--") {
            ("-->", false)
        } else if rest
            .get(..9)
            .is_some_and(|p| p.eq_ignore_ascii_case("<!doctype"))
        {
            (">", true)
        } else {
            break;
        };

        let Some(end) = rest.find(terminator) else {
            return false;
        };
        if is_doctype && !rest[..end].to_ascii_lowercase().contains("svg") {
            return false;
        }
        rest = &rest[end + terminator.len()..];
    }

    rest.strip_prefix("<svg")
        .and_then(|after| after.chars().next())
        .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
}
