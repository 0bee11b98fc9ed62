use chrono::Utc;
use sqlx::SqlitePool;

use crate::dto::vacancy_dto::VacancyListQuery;
use crate::error::{Error, Result};
use crate::models::price_group::PriceGroup;
use crate::models::requirement::Requirement;
use crate::models::scrape_run::ScrapeRun;
use crate::models::shift::Shift;
use crate::models::vacancy::{Vacancy, VacancyDetail};
use crate::scraper::models::{ParsedDetail, ParsedVacancy};

const VACANCY_COLUMNS: &str = "id, title, profession, specializations, municipality, region, job_starts_at, job_ends_at, procured_amount, procured_amount_currency, scope_hours, fill_rate, dynamic_status, tender_id, tender_title, unit_id, unit_name, orderer_id, orderer_name, last_application_date, created_at, announced_at, scraped_at, first_seen_at, last_updated_at, raw_data";

const DEFAULT_PAGE_LIMIT: i64 = 100;
const MAX_PAGE_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct VacancyService {
    pool: SqlitePool,
}

/// Result of one upsert. `Updated` carries the fields whose value changed
/// since the previous scrape (fill rate, dynamic status, procured amount).
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Inserted,
    Updated { changes: Vec<String> },
}

pub struct VacancyList {
    pub items: Vec<Vacancy>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// A vacancy row together with its 1:1 detail and child records.
pub struct VacancyBundle {
    pub vacancy: Vacancy,
    pub detail: Option<VacancyDetail>,
    pub requirements: Vec<Requirement>,
    pub price_groups: Vec<PriceGroup>,
}

pub struct StoreStats {
    pub total_vacancies: i64,
    pub by_profession: Vec<(String, i64)>,
    pub by_region: Vec<(String, i64)>,
    pub avg_doctor_rate: f64,
    pub avg_nurse_rate: f64,
    pub recent_scrapes: Vec<ScrapeRun>,
}

impl VacancyService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent save keyed by the portal's vacancy id. An existing row only
    /// gets its volatile columns and scrape timestamps refreshed.
    pub async fn upsert(&self, parsed: &ParsedVacancy) -> Result<UpsertOutcome> {
        let now = Utc::now().timestamp();

        let existing = sqlx::query_as::<_, (f64, String, f64)>(
            "SELECT fill_rate, dynamic_status, procured_amount FROM vacancies WHERE id = ?",
        )
        .bind(&parsed.id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            None => {
                sqlx::query(&format!(
                    "INSERT INTO vacancies ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    VACANCY_COLUMNS
                ))
                .bind(&parsed.id)
                .bind(&parsed.title)
                .bind(&parsed.profession)
                .bind(&parsed.specializations)
                .bind(&parsed.municipality)
                .bind(&parsed.region)
                .bind(parsed.job_starts_at)
                .bind(parsed.job_ends_at)
                .bind(parsed.procured_amount)
                .bind(&parsed.procured_amount_currency)
                .bind(parsed.scope_hours)
                .bind(parsed.fill_rate)
                .bind(&parsed.dynamic_status)
                .bind(&parsed.tender_id)
                .bind(&parsed.tender_title)
                .bind(&parsed.unit_id)
                .bind(&parsed.unit_name)
                .bind(&parsed.orderer_id)
                .bind(&parsed.orderer_name)
                .bind(parsed.last_application_date)
                .bind(parsed.created_at)
                .bind(parsed.announced_at)
                .bind(now)
                .bind(now)
                .bind(now)
                .bind(&parsed.raw_data)
                .execute(&self.pool)
                .await?;

                Ok(UpsertOutcome::Inserted)
            }
            Some((fill_rate, dynamic_status, procured_amount)) => {
                let mut changes = Vec::new();
                if fill_rate != parsed.fill_rate {
                    changes.push("fill_rate".to_string());
                }
                if dynamic_status != parsed.dynamic_status {
                    changes.push("dynamic_status".to_string());
                }
                if procured_amount != parsed.procured_amount {
                    changes.push("procured_amount".to_string());
                }

                sqlx::query(
                    "UPDATE vacancies SET fill_rate = ?, dynamic_status = ?, procured_amount = ?, scraped_at = ?, last_updated_at = ?, raw_data = ? WHERE id = ?",
                )
                .bind(parsed.fill_rate)
                .bind(&parsed.dynamic_status)
                .bind(parsed.procured_amount)
                .bind(now)
                .bind(now)
                .bind(&parsed.raw_data)
                .bind(&parsed.id)
                .execute(&self.pool)
                .await?;

                Ok(UpsertOutcome::Updated { changes })
            }
        }
    }

    /// Replaces the 1:1 detail row and all child records for one vacancy.
    pub async fn replace_children(&self, vacancy_id: &str, detail: &ParsedDetail) -> Result<()> {
        sqlx::query(
            "INSERT INTO vacancy_details (vacancy_id, description, contact_name, contact_email, contact_phone, billing_reference, invoice_address) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(vacancy_id) DO UPDATE SET description = excluded.description, contact_name = excluded.contact_name, contact_email = excluded.contact_email, contact_phone = excluded.contact_phone, billing_reference = excluded.billing_reference, invoice_address = excluded.invoice_address",
        )
        .bind(vacancy_id)
        .bind(&detail.description)
        .bind(&detail.contact_name)
        .bind(&detail.contact_email)
        .bind(&detail.contact_phone)
        .bind(&detail.billing_reference)
        .bind(&detail.invoice_address)
        .execute(&self.pool)
        .await?;

        sqlx::query("DELETE FROM shifts WHERE vacancy_id = ?")
            .bind(vacancy_id)
            .execute(&self.pool)
            .await?;
        // Shift ids are portal-global; OR REPLACE covers a shift that moved
        // here while another vacancy still holds its old row.
        for shift in &detail.shifts {
            sqlx::query(
                "INSERT OR REPLACE INTO shifts (id, vacancy_id, shift_date, start_time, end_time, duration_hours, status) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&shift.id)
            .bind(vacancy_id)
            .bind(&shift.shift_date)
            .bind(&shift.start_time)
            .bind(&shift.end_time)
            .bind(shift.duration_hours)
            .bind(&shift.status)
            .execute(&self.pool)
            .await?;
        }

        sqlx::query("DELETE FROM requirements WHERE vacancy_id = ?")
            .bind(vacancy_id)
            .execute(&self.pool)
            .await?;
        for requirement in &detail.requirements {
            sqlx::query("INSERT INTO requirements (vacancy_id, category, name) VALUES (?, ?, ?)")
                .bind(vacancy_id)
                .bind(&requirement.category)
                .bind(&requirement.name)
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("DELETE FROM price_groups WHERE vacancy_id = ?")
            .bind(vacancy_id)
            .execute(&self.pool)
            .await?;
        for group in &detail.price_groups {
            sqlx::query(
                "INSERT INTO price_groups (vacancy_id, specialization, price, currency) VALUES (?, ?, ?, ?)",
            )
            .bind(vacancy_id)
            .bind(&group.specialization)
            .bind(group.price)
            .bind(&group.currency)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    pub async fn list(&self, query: VacancyListQuery) -> Result<VacancyList> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let offset = query.offset.unwrap_or(0).max(0);

        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(profession) = query.profession.filter(|value| !value.is_empty()) {
            filters.push("profession = ?");
            args.push(profession);
        }
        if let Some(region) = query.region.filter(|value| !value.is_empty()) {
            filters.push("region = ?");
            args.push(region);
        }
        if let Some(status) = query.status.filter(|value| !value.is_empty()) {
            filters.push("dynamic_status = ?");
            args.push(status);
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            "SELECT {} FROM vacancies {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            VACANCY_COLUMNS, where_clause
        );
        let total_query = format!("SELECT COUNT(*) FROM vacancies {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Vacancy>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(limit).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        Ok(VacancyList {
            items,
            total,
            limit,
            offset,
        })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<VacancyBundle> {
        let vacancy = sqlx::query_as::<_, Vacancy>(&format!(
            "SELECT {} FROM vacancies WHERE id = ?",
            VACANCY_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let detail = sqlx::query_as::<_, VacancyDetail>(
            "SELECT vacancy_id, description, contact_name, contact_email, contact_phone, billing_reference, invoice_address FROM vacancy_details WHERE vacancy_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let requirements = sqlx::query_as::<_, Requirement>(
            "SELECT id, vacancy_id, category, name FROM requirements WHERE vacancy_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let price_groups = sqlx::query_as::<_, PriceGroup>(
            "SELECT id, vacancy_id, specialization, price, currency FROM price_groups WHERE vacancy_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(VacancyBundle {
            vacancy,
            detail,
            requirements,
            price_groups,
        })
    }

    pub async fn shifts_for(&self, vacancy_id: &str) -> Result<Vec<Shift>> {
        let exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vacancies WHERE id = ?")
                .bind(vacancy_id)
                .fetch_one(&self.pool)
                .await?;
        if exists == 0 {
            return Err(Error::NotFound("Vacancy not found".to_string()));
        }

        let shifts = sqlx::query_as::<_, Shift>(
            "SELECT id, vacancy_id, shift_date, start_time, end_time, duration_hours, status FROM shifts WHERE vacancy_id = ? ORDER BY shift_date, start_time",
        )
        .bind(vacancy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        let total_vacancies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vacancies")
            .fetch_one(&self.pool)
            .await?;

        let by_profession = sqlx::query_as::<_, (String, i64)>(
            "SELECT profession, COUNT(*) AS count FROM vacancies GROUP BY profession ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let by_region = sqlx::query_as::<_, (String, i64)>(
            "SELECT region, COUNT(*) AS count FROM vacancies GROUP BY region ORDER BY count DESC LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await?;

        let avg_doctor_rate = self.average_rate("DOCTOR").await?;
        let avg_nurse_rate = self.average_rate("NURSE").await?;

        let recent_scrapes = sqlx::query_as::<_, ScrapeRun>(
            "SELECT id, scraped_at, total_fetched, new_count, updated_count, duration_seconds FROM scrape_history ORDER BY scraped_at DESC LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(StoreStats {
            total_vacancies,
            by_profession,
            by_region,
            avg_doctor_rate,
            avg_nurse_rate,
            recent_scrapes,
        })
    }

    async fn average_rate(&self, profession: &str) -> Result<f64> {
        let avg = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(procured_amount) FROM vacancies WHERE profession = ?",
        )
        .bind(profession)
        .fetch_one(&self.pool)
        .await?;
        Ok(avg.unwrap_or(0.0))
    }

    pub async fn export_rows(&self) -> Result<Vec<Vacancy>> {
        let rows = sqlx::query_as::<_, Vacancy>(&format!(
            "SELECT {} FROM vacancies ORDER BY created_at DESC",
            VACANCY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn record_scrape(
        &self,
        scraped_at: i64,
        total_fetched: i64,
        new_count: i64,
        updated_count: i64,
        duration_seconds: f64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO scrape_history (scraped_at, total_fetched, new_count, updated_count, duration_seconds) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(scraped_at)
        .bind(total_fetched)
        .bind(new_count)
        .bind(updated_count)
        .bind(duration_seconds)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
