use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceGroup {
    pub id: i64,
    pub vacancy_id: String,
    pub specialization: String,
    pub price: f64,
    pub currency: String,
}
