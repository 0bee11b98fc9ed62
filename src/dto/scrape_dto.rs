use serde::{Deserialize, Serialize};

use crate::scraper::models::ParsedVacancy;

/// Summary returned by `POST /scrape` and mirrored into the webhook message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSummary {
    pub started_at: String,
    pub duration_seconds: f64,
    pub total_fetched: i64,
    pub new_count: i64,
    pub updated_count: i64,
    pub unchanged_count: i64,
    pub new_vacancies: Vec<NewVacancySummary>,
    pub updates: Vec<VacancyUpdateSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVacancySummary {
    pub id: String,
    pub title: String,
    pub profession: String,
    pub municipality: String,
    pub region: String,
    pub rate: f64,
    pub scope_hours: f64,
    pub unit_name: String,
    pub orderer_name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyUpdateSummary {
    pub id: String,
    pub title: String,
    pub changes: Vec<String>,
}

impl From<&ParsedVacancy> for NewVacancySummary {
    fn from(value: &ParsedVacancy) -> Self {
        Self {
            id: value.id.clone(),
            title: value.title.clone(),
            profession: value.profession.clone(),
            municipality: value.municipality.clone(),
            region: value.region.clone(),
            rate: value.procured_amount,
            scope_hours: value.scope_hours,
            unit_name: value.unit_name.clone(),
            orderer_name: value.orderer_name.clone(),
            url: format!("https://app.bemlo.com/vacancies/{}", value.id),
        }
    }
}
