use super::format::{self, SourceFormat};
use super::metadata::read_metadata;
use super::resize::ResizePolicy;
use super::ImageService;
use crate::models::{EncodedResult, ImageSource};
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage, Frame};
use std::io::Cursor;
use tracing::{info, warn};

pub struct Transcoder {
    max_dimension: u32,
}

impl Transcoder {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    fn transcode_sync(
        source: ImageSource,
        quality: i64,
        max_dimension: u32,
    ) -> Result<EncodedResult> {
        let metadata = read_metadata(&source.raw_bytes)?;
        let policy = ResizePolicy::for_dimensions(metadata.width, metadata.height, max_dimension);
        let target = policy.target_dimensions(metadata.width, metadata.height);
        let source_format =
            SourceFormat::classify(&metadata, &source.url, &source.declared_content_type);

        let resizable = !matches!(source_format, SourceFormat::Svg | SourceFormat::Unsupported);
        if resizable && !policy.is_empty() {
            info!(
                "Resizing {} from {}x{} to {}x{}",
                source.url, metadata.width, metadata.height, target.0, target.1
            );
        }

        match source_format {
            SourceFormat::AnimatedGif => {
                if policy.is_empty() {
                    info!("Animated GIF {} needs no resize", source.url);
                    return Ok(EncodedResult::new(source.raw_bytes, format::GIF));
                }
                let bytes = resize_animated_gif(&source.raw_bytes, target)?;
                Ok(EncodedResult::new(bytes, format::GIF))
            }
            SourceFormat::Png | SourceFormat::StaticGif | SourceFormat::WebP => {
                let quality = lossy_quality(quality)?;
                let image = decode_resized(&source.raw_bytes, policy, target)?;
                Ok(EncodedResult::new(encode_webp(&image, quality), format::WEBP))
            }
            SourceFormat::Jpeg => {
                let quality = lossy_quality(quality)?;
                let image = decode_resized(&source.raw_bytes, policy, target)?;
                Ok(EncodedResult::new(
                    encode_progressive_jpeg(&image, quality)?,
                    format::JPEG,
                ))
            }
            SourceFormat::Svg => Ok(EncodedResult::new(source.raw_bytes, format::SVG)),
            SourceFormat::Unsupported => {
                warn!(
                    "Unsupported format for {} ({}), returning original",
                    source.url, source.declared_content_type
                );
                Ok(source.passthrough())
            }
        }
    }
}

#[async_trait]
impl ImageService for Transcoder {
    async fn transcode(&self, source: &ImageSource, quality: i64) -> Result<EncodedResult> {
        tokio::task::spawn_blocking({
            let source = source.clone();
            let max_dimension = self.max_dimension;
            move || Self::transcode_sync(source, quality, max_dimension)
        })
        .await
        .map_err(|e| Error::Invariant(format!("Image processing task join error: {}", e)))?
    }
}

fn lossy_quality(quality: i64) -> Result<u8> {
    u8::try_from(quality)
        .ok()
        .filter(|q| (1..=100).contains(q))
        .ok_or_else(|| Error::Encode(format!("Quality {} outside 1..=100", quality)))
}

fn decode_resized(bytes: &[u8], policy: ResizePolicy, target: (u32, u32)) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| Error::Decode(format!("Failed to decode image: {}", e)))?;

    if policy.is_empty() {
        return Ok(image);
    }
    Ok(image.resize_exact(target.0, target.1, FilterType::Lanczos3))
}

fn encode_webp(image: &DynamicImage, quality: u8) -> Vec<u8> {
    if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode(f32::from(quality))
            .to_vec()
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
            .encode(f32::from(quality))
            .to_vec()
    }
}

fn encode_progressive_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let width = u16::try_from(rgb.width())
        .map_err(|_| Error::Encode(format!("Width {} too large for JPEG", rgb.width())))?;
    let height = u16::try_from(rgb.height())
        .map_err(|_| Error::Encode(format!("Height {} too large for JPEG", rgb.height())))?;

    let mut buffer = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut buffer, quality);
    encoder.set_progressive(true);
    encoder
        .encode(rgb.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| Error::Encode(format!("JPEG encoding failed: {}", e)))?;

    Ok(buffer)
}

fn resize_animated_gif(bytes: &[u8], target: (u32, u32)) -> Result<Vec<u8>> {
    let decoder = GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| Error::Decode(format!("Failed to open GIF: {}", e)))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| Error::Decode(format!("Failed to decode GIF frames: {}", e)))?;

    let resized = frames.into_iter().map(|frame| {
        let delay = frame.delay();
        let buffer =
            image::imageops::resize(frame.buffer(), target.0, target.1, FilterType::Lanczos3);
        Frame::from_parts(buffer, 0, 0, delay)
    });

    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| Error::Encode(format!("GIF encoding failed: {}", e)))?;
        encoder
            .encode_frames(resized)
            .map_err(|e| Error::Encode(format!("GIF encoding failed: {}", e)))?;
    }

    Ok(buffer)
}
