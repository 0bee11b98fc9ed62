use serde::{Deserialize, Serialize};

use crate::models::scrape_run::ScrapeRun;
use crate::services::vacancy_service::StoreStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_vacancies: i64,
    pub by_profession: Vec<ProfessionCount>,
    pub by_region: Vec<RegionCount>,
    pub avg_doctor_rate: f64,
    pub avg_nurse_rate: f64,
    pub recent_scrapes: Vec<ScrapeRunSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionCount {
    pub profession: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRunSummary {
    pub timestamp: i64,
    pub total: i64,
    pub new: i64,
    pub updated: i64,
}

impl From<ScrapeRun> for ScrapeRunSummary {
    fn from(value: ScrapeRun) -> Self {
        Self {
            timestamp: value.scraped_at,
            total: value.total_fetched,
            new: value.new_count,
            updated: value.updated_count,
        }
    }
}

impl From<StoreStats> for StatsResponse {
    fn from(value: StoreStats) -> Self {
        Self {
            total_vacancies: value.total_vacancies,
            by_profession: value
                .by_profession
                .into_iter()
                .map(|(profession, count)| ProfessionCount { profession, count })
                .collect(),
            by_region: value
                .by_region
                .into_iter()
                .map(|(region, count)| RegionCount { region, count })
                .collect(),
            avg_doctor_rate: value.avg_doctor_rate,
            avg_nurse_rate: value.avg_nurse_rate,
            recent_scrapes: value.recent_scrapes.into_iter().map(Into::into).collect(),
        }
    }
}
