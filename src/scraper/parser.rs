use serde_json::Value;

use super::models::{
    ParsedDetail, ParsedPriceGroup, ParsedRequirement, ParsedShift, ParsedVacancy,
    VacancyDetailNode,
};
use crate::error::{Error, Result};

pub const REQUIREMENT_DOCUMENT: &str = "DOCUMENT";
pub const REQUIREMENT_EXPERIENCE: &str = "EXPERIENCE";
pub const REQUIREMENT_JOURNAL_SYSTEM: &str = "JOURNAL_SYSTEM";
pub const REQUIREMENT_SPECIALIZATION: &str = "SPECIALIZATION";

const DEFAULT_SHIFT_STATUS: &str = "VACANT";
const DEFAULT_CURRENCY: &str = "SEK";

/// Flattens a raw listing node (vacancy + nested tender/unit/orderer) into
/// the storage row shape. The node itself is kept verbatim in `raw_data`.
pub fn flatten_vacancy(node: &Value) -> Result<ParsedVacancy> {
    let id = node
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Fetch("Vacancy node missing id".to_string()))?;

    let tender = node.get("tender").cloned().unwrap_or(Value::Null);
    let unit = tender.get("unit").cloned().unwrap_or(Value::Null);
    let orderer = tender.get("orderer").cloned().unwrap_or(Value::Null);

    let specializations = match node.get("specializations") {
        Some(Value::Null) | None => "[]".to_string(),
        Some(value) => value.to_string(),
    };

    Ok(ParsedVacancy {
        id: id.to_string(),
        title: text(node, "title"),
        profession: text(node, "profession"),
        specializations,
        municipality: text(node, "municipality"),
        region: text(node, "region"),
        job_starts_at: epoch(node, "jobStartsAt"),
        job_ends_at: epoch(node, "jobEndsAt"),
        procured_amount: number(node, "procuredAmount"),
        procured_amount_currency: text_or(node, "procuredAmountCurrency", DEFAULT_CURRENCY),
        scope_hours: number(&tender, "scope"),
        fill_rate: number(&tender, "fillRate"),
        dynamic_status: text(&tender, "dynamicStatus"),
        tender_id: text(&tender, "id"),
        tender_title: text(&tender, "title"),
        unit_id: text(&unit, "id"),
        unit_name: text(&unit, "name"),
        orderer_id: text(&orderer, "id"),
        orderer_name: text(&orderer, "displayName"),
        last_application_date: epoch(node, "lastApplicationDate"),
        created_at: epoch(node, "createdAt"),
        announced_at: epoch(&tender, "announcedAt"),
        raw_data: node.to_string(),
    })
}

/// Flattens a detail node into the child records stored per vacancy. The
/// four requirement lists fan out into one categorized row each.
pub fn flatten_detail(node: &VacancyDetailNode) -> ParsedDetail {
    let contact = node.contact.clone().unwrap_or_default();
    let billing = node.billing.clone().unwrap_or_default();
    let lists = node.requirements.clone().unwrap_or_default();

    let mut requirements = Vec::new();
    for (category, names) in [
        (REQUIREMENT_DOCUMENT, &lists.documents),
        (REQUIREMENT_EXPERIENCE, &lists.experience),
        (REQUIREMENT_JOURNAL_SYSTEM, &lists.journal_systems),
        (REQUIREMENT_SPECIALIZATION, &lists.specializations),
    ] {
        for name in names {
            requirements.push(ParsedRequirement {
                category: category.to_string(),
                name: name.clone(),
            });
        }
    }

    let shifts = node
        .shifts
        .iter()
        .filter(|shift| !shift.id.is_empty())
        .map(|shift| ParsedShift {
            id: shift.id.clone(),
            shift_date: shift.date.clone(),
            start_time: shift.start_time.clone(),
            end_time: shift.end_time.clone(),
            duration_hours: shift.duration_hours,
            status: if shift.status.is_empty() {
                DEFAULT_SHIFT_STATUS.to_string()
            } else {
                shift.status.clone()
            },
        })
        .collect();

    let price_groups = node
        .price_groups
        .iter()
        .map(|group| ParsedPriceGroup {
            specialization: group.specialization.clone(),
            price: group.price,
            currency: group
                .currency
                .clone()
                .filter(|currency| !currency.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
        .collect();

    ParsedDetail {
        description: node.description.clone(),
        contact_name: contact.name,
        contact_email: contact.email,
        contact_phone: contact.phone,
        billing_reference: billing.reference,
        invoice_address: billing.invoice_address,
        requirements,
        shifts,
        price_groups,
    }
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn text_or(value: &Value, key: &str, default: &str) -> String {
    match value.get(key).and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default.to_string(),
    }
}

fn number(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or_default()
}

fn epoch(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(Value::as_i64)
}
