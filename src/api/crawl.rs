//! REST API endpoint for page discovery

use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ApiError;
use crate::crawler::Crawler;
use crate::model::CrawledPage;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CrawlRequest {
    /// Absolute, scheme-prefixed seed URL
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CrawlResponse {
    pub success: bool,
    pub data: Vec<CrawledPage>,
}

/// Discover candidate pages under the seed URL's directory
#[utoipa::path(
    post,
    path = "/crawl",
    request_body = CrawlRequest,
    responses(
        (status = 200, description = "Pages discovered", body = CrawlResponse),
        (status = 400, description = "Invalid seed URL"),
        (status = 500, description = "Seed page could not be loaded")
    ),
    tag = "crawl"
)]
#[post("/crawl")]
pub async fn crawl(
    crawler: web::Data<Crawler>,
    body: web::Json<CrawlRequest>,
) -> Result<impl Responder, ApiError> {
    let pages = crawler.discover(&body.url).await?;

    Ok(HttpResponse::Ok().json(CrawlResponse {
        success: true,
        data: pages,
    }))
}

/// Configure crawl routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(crawl);
}
