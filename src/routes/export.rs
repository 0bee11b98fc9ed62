use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{error::Result, services::export_service::ExportService, AppState};

/// Download all vacancies as CSV
#[axum::debug_handler]
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let vacancies = state.vacancy_service.export_rows().await?;
    let buffer = ExportService::vacancies_csv(&vacancies)?;

    let filename = format!(
        "bemlo_vacancies_{}.csv",
        chrono::Utc::now().format("%Y%m%d_%H%M")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
