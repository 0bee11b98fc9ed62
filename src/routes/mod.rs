pub mod export;
pub mod health;
pub mod scrape;
pub mod vacancy;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/stats", get(vacancy::get_stats))
        .route("/vacancies", get(vacancy::list_vacancies))
        .route("/vacancy/:id", get(vacancy::get_vacancy))
        .route("/vacancy/:id/shifts", get(vacancy::get_vacancy_shifts))
        .route("/export", get(export::export_csv))
        .route("/scrape", post(scrape::trigger_scrape))
        .with_state(state)
}
