use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::stats_dto::StatsResponse,
    dto::vacancy_dto::{
        ShiftListResponse, VacancyDetailResponse, VacancyListQuery, VacancyListResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/vacancies",
    params(
        ("profession" = Option<String>, Query, description = "Filter by profession"),
        ("region" = Option<String>, Query, description = "Filter by region"),
        ("status" = Option<String>, Query, description = "Filter by dynamic status"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "List of vacancies", body = Json<VacancyListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_vacancies(
    State(state): State<AppState>,
    Query(query): Query<VacancyListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.vacancy_service.list(query).await?;
    Ok(Json(VacancyListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/vacancy/{id}",
    params(
        ("id" = String, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Vacancy with detail and child records", body = Json<VacancyDetailResponse>),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vacancy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let bundle = state.vacancy_service.get_by_id(&id).await?;
    Ok(Json(VacancyDetailResponse::from(bundle)))
}

#[utoipa::path(
    get,
    path = "/vacancy/{id}/shifts",
    params(
        ("id" = String, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Shifts for the vacancy", body = Json<ShiftListResponse>),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn get_vacancy_shifts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let shifts = state.vacancy_service.shifts_for(&id).await?;
    Ok(Json(ShiftListResponse {
        vacancy_id: id,
        shifts: shifts.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Store statistics", body = Json<StatsResponse>)
    )
)]
#[axum::debug_handler]
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.vacancy_service.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}
