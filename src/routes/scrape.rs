use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::{error::Result, AppState};

/// Runs one synchronous scrape cycle and returns its summary.
#[axum::debug_handler]
pub async fn trigger_scrape(State(state): State<AppState>) -> Result<impl IntoResponse> {
    info!("Scrape triggered over HTTP");
    let summary = state.scrape_service.run().await?;
    Ok(Json(summary))
}
