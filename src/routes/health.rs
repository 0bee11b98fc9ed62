use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::config::get_config;

#[axum::debug_handler]
pub async fn index() -> impl IntoResponse {
    let body = json!({
        "service": "Bemlo Vacancy Scraper",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /": "This help",
            "GET /health": "Health check",
            "GET /stats": "Database statistics",
            "GET /vacancies": "List vacancies (params: profession, region, status, limit, offset)",
            "GET /vacancy/{id}": "Vacancy detail",
            "GET /vacancy/{id}/shifts": "Shifts for one vacancy",
            "GET /export": "Download CSV",
            "POST /scrape": "Trigger a scrape cycle"
        }
    });
    (StatusCode::OK, Json(body))
}

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let config = get_config();
    let body = json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "configured": config.has_credentials(),
    });
    (StatusCode::OK, Json(body))
}
