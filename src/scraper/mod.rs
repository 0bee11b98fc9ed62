pub mod auth;
pub mod fetcher;
pub mod models;
pub mod parser;

use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use crate::dto::scrape_dto::{NewVacancySummary, ScrapeSummary, VacancyUpdateSummary};
use crate::error::{Error, Result};
use crate::services::notify_service::NotifyService;
use crate::services::vacancy_service::{UpsertOutcome, VacancyService};
use auth::BemloAuth;
use fetcher::BemloFetcher;
use models::ParsedVacancy;

/// Browser origin the portal expects on every request.
pub(crate) const APP_ORIGIN: &str = "https://app.bemlo.com";
pub(crate) const APP_REFERER: &str = "https://app.bemlo.com/";

/// At most this many update briefs are included in the scrape summary.
const MAX_UPDATE_BRIEFS: usize = 10;

/// Runs one full scrape cycle: authenticate, list every page, fetch each
/// vacancy's detail, then persist. Nothing is written before all fetching
/// succeeded, so a failed cycle leaves the store untouched.
#[derive(Clone)]
pub struct ScrapeService {
    auth: BemloAuth,
    fetcher: BemloFetcher,
    vacancy_service: VacancyService,
    notify_service: NotifyService,
}

impl ScrapeService {
    pub fn new(
        client: Client,
        base_url: String,
        email: String,
        password: String,
        vacancy_service: VacancyService,
        notify_service: NotifyService,
    ) -> Self {
        let auth = BemloAuth::new(client.clone(), base_url.clone(), email, password);
        let fetcher = BemloFetcher::new(client, base_url, auth.clone());
        Self {
            auth,
            fetcher,
            vacancy_service,
            notify_service,
        }
    }

    pub async fn run(&self) -> Result<ScrapeSummary> {
        if !self.auth.has_credentials() {
            return Err(Error::Auth(
                "BEMLO_EMAIL and BEMLO_PASSWORD are required".to_string(),
            ));
        }

        let started = Utc::now();
        info!("Starting scrape cycle");

        let nodes = self.fetcher.fetch_all_vacancies().await?;
        let mut parsed = Vec::with_capacity(nodes.len());
        for node in &nodes {
            parsed.push(parser::flatten_vacancy(node)?);
        }

        let mut details = Vec::new();
        for vacancy in &parsed {
            match self.fetcher.fetch_vacancy_detail(&vacancy.id).await? {
                Some(node) => details.push((vacancy.id.clone(), parser::flatten_detail(&node))),
                None => warn!(
                    "Vacancy {} disappeared before its detail fetch, skipping",
                    vacancy.id
                ),
            }
        }

        let mut new_count = 0i64;
        let mut updated_count = 0i64;
        let mut new_vacancies: Vec<ParsedVacancy> = Vec::new();
        let mut updates: Vec<(ParsedVacancy, Vec<String>)> = Vec::new();

        for vacancy in &parsed {
            match self.vacancy_service.upsert(vacancy).await? {
                UpsertOutcome::Inserted => {
                    new_count += 1;
                    new_vacancies.push(vacancy.clone());
                }
                UpsertOutcome::Updated { changes } if !changes.is_empty() => {
                    updated_count += 1;
                    updates.push((vacancy.clone(), changes));
                }
                UpsertOutcome::Updated { .. } => {}
            }
        }

        for (vacancy_id, detail) in &details {
            self.vacancy_service
                .replace_children(vacancy_id, detail)
                .await?;
        }

        let duration_seconds = (Utc::now() - started).num_milliseconds() as f64 / 1000.0;
        let total_fetched = parsed.len() as i64;
        self.vacancy_service
            .record_scrape(
                started.timestamp(),
                total_fetched,
                new_count,
                updated_count,
                duration_seconds,
            )
            .await?;

        let summary = ScrapeSummary {
            started_at: started.to_rfc3339(),
            duration_seconds,
            total_fetched,
            new_count,
            updated_count,
            unchanged_count: total_fetched - new_count - updated_count,
            new_vacancies: new_vacancies.iter().map(NewVacancySummary::from).collect(),
            updates: updates
                .into_iter()
                .take(MAX_UPDATE_BRIEFS)
                .map(|(vacancy, changes)| VacancyUpdateSummary {
                    id: vacancy.id,
                    title: vacancy.title,
                    changes,
                })
                .collect(),
        };

        if summary.new_count > 0 {
            if let Err(error) = self
                .notify_service
                .notify_new_vacancies(&summary.new_vacancies)
                .await
            {
                warn!("Webhook notification failed: {}", error);
            }
        }

        info!(
            "Scrape cycle finished: {} fetched, {} new, {} updated in {:.1}s",
            summary.total_fetched, summary.new_count, summary.updated_count, summary.duration_seconds
        );
        Ok(summary)
    }
}
