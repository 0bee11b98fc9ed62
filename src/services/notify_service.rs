use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

use crate::dto::scrape_dto::NewVacancySummary;

/// How many new vacancies the webhook message lists before truncating.
const MESSAGE_VACANCY_LIMIT: usize = 5;

/// Pushes a plain-text summary to an optional webhook when a scrape found
/// new vacancies. Failures are reported to the caller but must never fail
/// the scrape itself.
#[derive(Clone)]
pub struct NotifyService {
    client: Client,
    webhook_url: Option<String>,
}

impl NotifyService {
    pub fn new(client: Client, webhook_url: Option<String>) -> Self {
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());

        if let Some(ref url) = webhook_url {
            info!("Webhook notifications enabled: {}", url);
        } else {
            info!("Webhook notifications disabled (WEBHOOK_URL not set or empty)");
        }

        Self {
            client,
            webhook_url,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub async fn notify_new_vacancies(
        &self,
        new_vacancies: &[NewVacancySummary],
    ) -> Result<(), String> {
        let webhook_url = match &self.webhook_url {
            Some(url) => url,
            None => return Ok(()),
        };
        if new_vacancies.is_empty() {
            return Ok(());
        }

        let message = build_message(new_vacancies);

        let response = self
            .client
            .post(webhook_url)
            .timeout(std::time::Duration::from_secs(10))
            .json(&json!({ "text": message }))
            .send()
            .await
            .map_err(|e| format!("Webhook request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            error!("Webhook returned status {}", status);
            return Err(format!("Webhook returned status {}", status));
        }

        info!(
            "Webhook notified about {} new vacancies",
            new_vacancies.len()
        );
        Ok(())
    }
}

fn build_message(new_vacancies: &[NewVacancySummary]) -> String {
    let mut message = format!("🏥 *{} new Bemlo vacancies*\n", new_vacancies.len());
    for vacancy in new_vacancies.iter().take(MESSAGE_VACANCY_LIMIT) {
        message.push_str(&format!(
            "• {} - {} @ {} ({} SEK)\n",
            vacancy.title, vacancy.profession, vacancy.municipality, vacancy.rate
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str) -> NewVacancySummary {
        NewVacancySummary {
            id: "vac-1".to_string(),
            title: title.to_string(),
            profession: "NURSE".to_string(),
            municipality: "Umeå".to_string(),
            region: "Västerbotten".to_string(),
            rate: 780.0,
            scope_hours: 160.0,
            unit_name: "IVA".to_string(),
            orderer_name: "Region Västerbotten".to_string(),
            url: "https://app.bemlo.com/vacancies/vac-1".to_string(),
        }
    }

    #[test]
    fn message_lists_at_most_five_vacancies() {
        let vacancies: Vec<NewVacancySummary> =
            (0..7).map(|i| summary(&format!("Pass {}", i))).collect();
        let message = build_message(&vacancies);

        assert!(message.starts_with("🏥 *7 new Bemlo vacancies*"));
        assert_eq!(message.matches("• ").count(), 5);
        assert!(message.contains("Pass 4"));
        assert!(!message.contains("Pass 5"));
    }

    #[test]
    fn disabled_service_reports_disabled() {
        let service = NotifyService::new(Client::new(), Some("   ".to_string()));
        assert!(!service.is_enabled());
    }
}
