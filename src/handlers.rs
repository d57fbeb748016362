//! HTTP endpoints
//!
//! Thin adapters over [`App`]: they normalise the request, run the shared
//! pipeline and shape the response. Pipeline failures never surface as
//! error bodies; the single-image endpoint redirects to the original image
//! and the batch endpoint leaves the URL out.

use crate::app::App;
use crate::models::{
    clamp_quality, quality_from_text, BatchRequest, CompressQuery, EncodedResult, QualityInput,
    DEFAULT_QUALITY,
};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use reqwest::Url;
use tracing::{error, info};

/// Largest accepted batch request body.
const JSON_BODY_LIMIT: usize = 100 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
        .route("/curucucha", web::get().to(health))
        .route("/compress-image", web::get().to(compress_image))
        .route("/compress-image-batch", web::post().to(compress_image_batch));
}

/// Liveness check
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "Despiértate y anda" }))
}

/// `GET /compress-image?url=..&quality=..`
pub async fn compress_image(
    req: HttpRequest,
    app: web::Data<App>,
    query: web::Query<CompressQuery>,
) -> HttpResponse {
    let query = query.into_inner();

    let Some(url) = query.url.filter(|u| !u.is_empty()) else {
        error!("Image URL not provided");
        return bad_request("Image URL not provided.");
    };

    if let Err(e) = Url::parse(&url) {
        error!("Invalid image URL {}: {}", url, e);
        return bad_request("Invalid image URL.");
    }

    let quality = clamp_quality(quality_from_text(query.quality.as_deref()));

    info!(
        "Compress request from {} for {}",
        req.connection_info().realip_remote_addr().unwrap_or("unknown"),
        url
    );

    match app.compress(&url, quality).await {
        Ok(result) => image_response(result),
        Err(e) => {
            error!("Error processing {}: {}", url, e);
            HttpResponse::Found()
                .insert_header((header::LOCATION, url))
                .finish()
        }
    }
}

/// `POST /compress-image-batch` with `{ "quality": .., "arr": [..] }`
pub async fn compress_image_batch(
    app: web::Data<App>,
    payload: web::Json<BatchRequest>,
) -> HttpResponse {
    let request = payload.into_inner();
    let quality = request
        .quality
        .as_ref()
        .map(QualityInput::resolve)
        .unwrap_or(DEFAULT_QUALITY);

    let items = app.compress_batch(&request.arr, quality).await;
    HttpResponse::Ok().json(items)
}

fn image_response(result: EncodedResult) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(result.content_type)
        .insert_header((header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .insert_header((header::PRAGMA, "no-cache"))
        .insert_header((header::EXPIRES, "0"))
        .body(result.bytes)
}

fn bad_request(message: &'static str) -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body(message)
}
