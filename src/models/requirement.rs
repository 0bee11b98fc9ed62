use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Requirement {
    pub id: i64,
    pub vacancy_id: String,
    pub category: String,
    pub name: String,
}
