use actix_cors::Cors;
use actix_web::{web, HttpServer};
use anyhow::Result;
use clap::Parser;
use image_compress_proxy::app::App;
use image_compress_proxy::handlers;
use image_compress_proxy::models::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-compress-proxy")]
#[command(about = "Fetch remote images and serve them re-encoded and scaled down")]
struct CliArgs {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
}

/// Any origin may call the service; responses carry a literal `*`.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_compress_proxy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::default().with_bind(args.host, args.port);
    let bind_address = config.bind_address();

    let app = web::Data::new(App::new(config)?);

    info!("Server listening on {}", bind_address);

    HttpServer::new(move || {
        actix_web::App::new()
            .app_data(app.clone())
            .wrap(cors())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    info!("Server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{cors, CliArgs};
    use actix_web::{test, web};
    use clap::Parser;
    use image_compress_proxy::handlers;

    #[actix_web::test]
    async fn test_cors_allows_any_origin_with_wildcard() {
        let app = test::init_service(
            actix_web::App::new()
                .wrap(cors())
                .route("/curucucha", web::get().to(handlers::health)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/curucucha")
            .insert_header(("Origin", "https://shop.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .unwrap()
                .to_str()
                .unwrap(),
            "*"
        );
    }

    #[::core::prelude::v1::test]
    fn test_cli_port_flag() {
        let args = CliArgs::try_parse_from(["image-compress-proxy", "--port", "8080"]).unwrap();
        assert_eq!(args.port, 8080);
    }

    #[::core::prelude::v1::test]
    fn test_cli_rejects_non_numeric_port() {
        assert!(CliArgs::try_parse_from(["image-compress-proxy", "--port", "http"]).is_err());
    }
}
