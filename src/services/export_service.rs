use crate::error::{Error, Result};
use crate::models::vacancy::Vacancy;

/// Column set matching the original export format consumed downstream.
const EXPORT_HEADER: [&str; 18] = [
    "id",
    "title",
    "profession",
    "specializations",
    "municipality",
    "region",
    "job_starts_at",
    "job_ends_at",
    "procured_amount",
    "procured_amount_currency",
    "scope_hours",
    "fill_rate",
    "dynamic_status",
    "unit_name",
    "orderer_name",
    "last_application_date",
    "created_at",
    "first_seen_at",
];

pub struct ExportService;

impl ExportService {
    /// Serializes vacancies as CSV: one header row, one row per vacancy.
    pub fn vacancies_csv(vacancies: &[Vacancy]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(EXPORT_HEADER)?;

        for vacancy in vacancies {
            writer.write_record([
                vacancy.id.clone(),
                vacancy.title.clone(),
                vacancy.profession.clone(),
                vacancy.specializations.clone(),
                vacancy.municipality.clone(),
                vacancy.region.clone(),
                optional_number(vacancy.job_starts_at),
                optional_number(vacancy.job_ends_at),
                vacancy.procured_amount.to_string(),
                vacancy.procured_amount_currency.clone(),
                vacancy.scope_hours.to_string(),
                vacancy.fill_rate.to_string(),
                vacancy.dynamic_status.clone(),
                vacancy.unit_name.clone(),
                vacancy.orderer_name.clone(),
                optional_number(vacancy.last_application_date),
                optional_number(vacancy.created_at),
                vacancy.first_seen_at.to_string(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| Error::Internal(format!("CSV buffer error: {}", e)))
    }
}

fn optional_number(value: Option<i64>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vacancy(id: &str, title: &str) -> Vacancy {
        Vacancy {
            id: id.to_string(),
            title: title.to_string(),
            profession: "NURSE".to_string(),
            specializations: "[\"IVA\"]".to_string(),
            municipality: "Umeå".to_string(),
            region: "Västerbotten".to_string(),
            job_starts_at: Some(1760000000),
            job_ends_at: None,
            procured_amount: 780.5,
            procured_amount_currency: "SEK".to_string(),
            scope_hours: 160.0,
            fill_rate: 0.25,
            dynamic_status: "OPEN".to_string(),
            tender_id: "tender-1".to_string(),
            tender_title: "Bemanning".to_string(),
            unit_id: "unit-1".to_string(),
            unit_name: "IVA".to_string(),
            orderer_id: "org-1".to_string(),
            orderer_name: "Region Västerbotten".to_string(),
            last_application_date: None,
            created_at: Some(1755000000),
            announced_at: None,
            scraped_at: 1755100000,
            first_seen_at: 1755100000,
            last_updated_at: 1755100000,
            raw_data: "{}".to_string(),
        }
    }

    #[test]
    fn writes_header_plus_one_row_per_vacancy() {
        let rows = vec![vacancy("vac-1", "Natt IVA"), vacancy("vac-2", "Dag kirurg")];
        let bytes = ExportService::vacancies_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let header = reader.headers().unwrap().clone();
        assert_eq!(header.len(), 18);
        assert_eq!(&header[0], "id");
        assert_eq!(&header[17], "first_seen_at");

        let records: Vec<csv::StringRecord> =
            reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "vac-1");
        assert_eq!(&records[0][8], "780.5");
        assert_eq!(&records[1][1], "Dag kirurg");
        assert_eq!(&records[0][7], "");
    }

    #[test]
    fn empty_store_yields_header_only() {
        let bytes = ExportService::vacancies_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("id,title,profession"));
    }
}
