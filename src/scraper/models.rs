use serde::Deserialize;
use serde_json::Value;

/// One page of the `VacanciesList` GraphQL connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyPage {
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<VacancyEdge>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// The listing node is kept as raw JSON so the stored `raw_data` column
/// preserves fields the flattener does not pick out.
#[derive(Debug, Clone, Deserialize)]
pub struct VacancyEdge {
    pub node: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VacancyDetailNode {
    pub id: String,
    pub description: Option<String>,
    pub contact: Option<ContactNode>,
    pub billing: Option<BillingNode>,
    pub requirements: Option<RequirementsNode>,
    pub shifts: Vec<ShiftNode>,
    pub price_groups: Vec<PriceGroupNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactNode {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingNode {
    pub reference: Option<String>,
    pub invoice_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequirementsNode {
    pub documents: Vec<String>,
    pub experience: Vec<String>,
    pub journal_systems: Vec<String>,
    pub specializations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShiftNode {
    pub id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f64,
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceGroupNode {
    pub specialization: String,
    pub price: f64,
    pub currency: Option<String>,
}

/// Listing node flattened into the storage row shape. The persistence layer
/// adds the scrape timestamps on save.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVacancy {
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
    pub raw_data: String,
}

/// Detail node flattened into the child-record shapes stored per vacancy.
#[derive(Debug, Clone, Default)]
pub struct ParsedDetail {
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub billing_reference: Option<String>,
    pub invoice_address: Option<String>,
    pub requirements: Vec<ParsedRequirement>,
    pub shifts: Vec<ParsedShift>,
    pub price_groups: Vec<ParsedPriceGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequirement {
    pub category: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedShift {
    pub id: String,
    pub shift_date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPriceGroup {
    pub specialization: String,
    pub price: f64,
    pub currency: String,
}
