use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod crawler;
mod db;
mod engine;
mod model;
mod normalize;
mod service;

use crawler::Crawler;
use db::repository::ScanRepository;
use model::Config;
use service::ScanService;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    // Initialize PostgreSQL database
    let db_pool = db::create_pool()
        .await
        .expect("Failed to create database pool");

    // Initialize database schema
    db::init_schema(&db_pool)
        .await
        .expect("Failed to initialize database schema");

    // Create services
    let repository = ScanRepository::new(db_pool.clone());
    let scan_service = web::Data::new(ScanService::new(repository, &config.engines));
    let crawler = web::Data::new(Crawler::new(&config.engines));
    let db_pool = web::Data::new(db_pool);

    tracing::info!("Starting accessibility scan worker on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(scan_service.clone())
            .app_data(crawler.clone())
            .app_data(db_pool.clone())
            .configure(api::crawl::configure)
            .configure(api::scan::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
