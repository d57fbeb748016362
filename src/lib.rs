//! Image compression proxy - fetches remote images and re-encodes them
//!
//! Downloads an image by URL, scales it so its longest side fits within a
//! fixed maximum, and re-encodes it as WebP, progressive JPEG or GIF. Served
//! over HTTP either as raw bytes or as a batch of base64 data URIs.

pub mod app;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod image;
pub mod models;

pub use error::{Error, FetchError, Result};
