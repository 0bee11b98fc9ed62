use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shift {
    pub id: String,
    pub vacancy_id: String,
    pub shift_date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f64,
    pub status: String,
}
