use serde::{Deserialize, Serialize};

use crate::models::price_group::PriceGroup;
use crate::models::requirement::Requirement;
use crate::models::shift::Shift;
use crate::models::vacancy::{Vacancy, VacancyDetail};
use crate::services::vacancy_service::{VacancyBundle, VacancyList};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VacancyListQuery {
    pub profession: Option<String>,
    pub region: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyResponse {
    pub id: String,
    pub title: String,
    pub profession: String,
    pub specializations: Vec<String>,
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
    pub first_seen_at: i64,
    pub last_updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyListResponse {
    pub items: Vec<VacancyResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyDetailInfo {
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub billing_reference: Option<String>,
    pub invoice_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementResponse {
    pub category: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceGroupResponse {
    pub specialization: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyDetailResponse {
    pub vacancy: VacancyResponse,
    pub detail: Option<VacancyDetailInfo>,
    pub requirements: Vec<RequirementResponse>,
    pub price_groups: Vec<PriceGroupResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftResponse {
    pub id: String,
    pub shift_date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftListResponse {
    pub vacancy_id: String,
    pub shifts: Vec<ShiftResponse>,
}

impl From<Vacancy> for VacancyResponse {
    fn from(value: Vacancy) -> Self {
        let specializations = serde_json::from_str(&value.specializations).unwrap_or_default();
        Self {
            id: value.id,
            title: value.title,
            profession: value.profession,
            specializations,
            municipality: value.municipality,
            region: value.region,
            job_starts_at: value.job_starts_at,
            job_ends_at: value.job_ends_at,
            procured_amount: value.procured_amount,
            procured_amount_currency: value.procured_amount_currency,
            scope_hours: value.scope_hours,
            fill_rate: value.fill_rate,
            dynamic_status: value.dynamic_status,
            tender_id: value.tender_id,
            tender_title: value.tender_title,
            unit_id: value.unit_id,
            unit_name: value.unit_name,
            orderer_id: value.orderer_id,
            orderer_name: value.orderer_name,
            last_application_date: value.last_application_date,
            created_at: value.created_at,
            announced_at: value.announced_at,
            first_seen_at: value.first_seen_at,
            last_updated_at: value.last_updated_at,
        }
    }
}

impl From<VacancyList> for VacancyListResponse {
    fn from(value: VacancyList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            limit: value.limit,
            offset: value.offset,
        }
    }
}

impl From<VacancyDetail> for VacancyDetailInfo {
    fn from(value: VacancyDetail) -> Self {
        Self {
            description: value.description,
            contact_name: value.contact_name,
            contact_email: value.contact_email,
            contact_phone: value.contact_phone,
            billing_reference: value.billing_reference,
            invoice_address: value.invoice_address,
        }
    }
}

impl From<Requirement> for RequirementResponse {
    fn from(value: Requirement) -> Self {
        Self {
            category: value.category,
            name: value.name,
        }
    }
}

impl From<PriceGroup> for PriceGroupResponse {
    fn from(value: PriceGroup) -> Self {
        Self {
            specialization: value.specialization,
            price: value.price,
            currency: value.currency,
        }
    }
}

impl From<VacancyBundle> for VacancyDetailResponse {
    fn from(value: VacancyBundle) -> Self {
        Self {
            vacancy: value.vacancy.into(),
            detail: value.detail.map(Into::into),
            requirements: value.requirements.into_iter().map(Into::into).collect(),
            price_groups: value.price_groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Shift> for ShiftResponse {
    fn from(value: Shift) -> Self {
        Self {
            id: value.id,
            shift_date: value.shift_date,
            start_time: value.start_time,
            end_time: value.end_time,
            duration_hours: value.duration_hours,
            status: value.status,
        }
    }
}
