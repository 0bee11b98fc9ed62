use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Bookkeeping row written after every scrape cycle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScrapeRun {
    pub id: i64,
    pub scraped_at: i64,
    pub total_fetched: i64,
    pub new_count: i64,
    pub updated_count: i64,
    pub duration_seconds: f64,
}
