use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One scraped vacancy row. Portal timestamps are stored as delivered
/// (epoch milliseconds); the scrape bookkeeping columns are unix seconds.
/// `raw_data` keeps the listing node verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
    pub id: String,
    pub title: String,
    pub profession: String,
    pub specializations: String,
    pub municipality: String,
    pub region: String,
    pub job_starts_at: Option<i64>,
    pub job_ends_at: Option<i64>,
    pub procured_amount: f64,
    pub procured_amount_currency: String,
    pub scope_hours: f64,
    pub fill_rate: f64,
    pub dynamic_status: String,
    pub tender_id: String,
    pub tender_title: String,
    pub unit_id: String,
    pub unit_name: String,
    pub orderer_id: String,
    pub orderer_name: String,
    pub last_application_date: Option<i64>,
    pub created_at: Option<i64>,
    pub announced_at: Option<i64>,
    pub scraped_at: i64,
    pub first_seen_at: i64,
    pub last_updated_at: i64,
    pub raw_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VacancyDetail {
    pub vacancy_id: String,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub billing_reference: Option<String>,
    pub invoice_address: Option<String>,
}
