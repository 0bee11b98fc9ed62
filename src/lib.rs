pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod scraper;
pub mod services;

use reqwest::Client;
use sqlx::SqlitePool;

use crate::scraper::ScrapeService;
use crate::services::{notify_service::NotifyService, vacancy_service::VacancyService};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub vacancy_service: VacancyService,
    pub notify_service: NotifyService,
    pub scrape_service: ScrapeService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let vacancy_service = VacancyService::new(pool.clone());
        let notify_service = NotifyService::new(http_client.clone(), config.webhook_url.clone());
        let scrape_service = ScrapeService::new(
            http_client,
            config.bemlo_base_url.clone(),
            config.bemlo_email.clone().unwrap_or_default(),
            config.bemlo_password.clone().unwrap_or_default(),
            vacancy_service.clone(),
            notify_service.clone(),
        );

        Self {
            pool,
            vacancy_service,
            notify_service,
            scrape_service,
        }
    }
}
