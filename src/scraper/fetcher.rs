use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::auth::BemloAuth;
use super::models::{VacancyDetailNode, VacancyPage};
use super::{APP_ORIGIN, APP_REFERER};
use crate::error::{Error, Result};

/// Listing page size requested from the portal.
const PAGE_SIZE: i64 = 30;
/// Hard cap on listing pages per scrape cycle.
const MAX_PAGES: usize = 20;

const VACANCIES_QUERY: &str = r#"
query VacanciesList($afterCursor: String, $filter: VacancyFilter!, $orderBy: VacancyOrderBy!, $orderDir: OrderByDirection!, $take: Int!) {
  allVacancies(
    afterCursor: $afterCursor
    filter: $filter
    orderBy: $orderBy
    orderDir: $orderDir
    take: $take
  ) {
    pageInfo {
      hasNextPage
      startCursor
      endCursor
    }
    edges {
      cursor
      node {
        createdAt
        hasLastApplicationDate
        id
        profession
        specializations
        isViewed
        jobType
        jobEndsAt
        jobStartsAt
        lastApplicationDate
        reviewStatus
        procuredAmount
        procuredAmountCurrency
        municipality
        region
        tender {
          id
          title
          extensionForId
          announcedAt
          startsAt
          endsAt
          scope
          lastPresentationDate
          pricing
          scheduleType
          dynamicStatus
          urgentShiftsCount
          fillRate
          unit {
            id
            name
            municipality
          }
          orderer {
            id
            displayName
          }
        }
        title
      }
    }
  }
}
"#;

const VACANCY_DETAIL_QUERY: &str = r#"
query VacancyDetail($id: ID!) {
  vacancy(id: $id) {
    id
    description
    contact {
      name
      email
      phone
    }
    billing {
      reference
      invoiceAddress
    }
    requirements {
      documents
      experience
      journalSystems
      specializations
    }
    shifts {
      id
      date
      startTime
      endTime
      durationHours
      status
    }
    priceGroups {
      specialization
      price
      currency
    }
  }
}
"#;

/// GraphQL client for the portal's vacancy API. A 401 answer triggers one
/// token refresh and one retry.
#[derive(Clone)]
pub struct BemloFetcher {
    client: Client,
    base_url: String,
    auth: BemloAuth,
}

impl BemloFetcher {
    pub fn new(client: Client, base_url: String, auth: BemloAuth) -> Self {
        Self {
            client,
            base_url,
            auth,
        }
    }

    /// Fetches every listing page up to the page cap, returning the raw
    /// vacancy nodes in listing order.
    pub async fn fetch_all_vacancies(&self) -> Result<Vec<Value>> {
        let mut nodes = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0;

        while page < MAX_PAGES {
            info!("Fetching vacancy page {}", page + 1);
            let result = self.fetch_vacancy_page(cursor.as_deref()).await?;
            nodes.extend(result.edges.into_iter().map(|edge| edge.node));
            page += 1;

            if !result.page_info.has_next_page || result.page_info.end_cursor.is_none() {
                break;
            }
            cursor = result.page_info.end_cursor;
        }

        info!("Fetched {} vacancies across {} pages", nodes.len(), page);
        Ok(nodes)
    }

    pub async fn fetch_vacancy_page(&self, after_cursor: Option<&str>) -> Result<VacancyPage> {
        let mut variables = json!({
            "filter": {
                "AND": [
                    {"tender": {"doesAcceptPresentations": true}},
                    {}
                ]
            },
            "take": PAGE_SIZE,
            "orderBy": "CREATED_AT",
            "orderDir": "DESC",
        });
        if let Some(cursor) = after_cursor {
            variables["afterCursor"] = json!(cursor);
        }

        let data = self
            .graphql("VacanciesList", VACANCIES_QUERY, &variables)
            .await?;
        let page = data
            .get("allVacancies")
            .cloned()
            .ok_or_else(|| Error::Fetch("GraphQL response missing allVacancies".to_string()))?;
        serde_json::from_value(page)
            .map_err(|e| Error::Fetch(format!("Unexpected allVacancies shape: {}", e)))
    }

    /// Fetches the detail node for one vacancy. Returns `None` when the
    /// vacancy no longer exists on the portal.
    pub async fn fetch_vacancy_detail(&self, id: &str) -> Result<Option<VacancyDetailNode>> {
        let variables = json!({ "id": id });
        let data = self
            .graphql("VacancyDetail", VACANCY_DETAIL_QUERY, &variables)
            .await?;
        match data.get("vacancy") {
            None | Some(Value::Null) => Ok(None),
            Some(node) => serde_json::from_value(node.clone())
                .map(Some)
                .map_err(|e| Error::Fetch(format!("Unexpected vacancy detail shape: {}", e))),
        }
    }

    async fn graphql(&self, operation: &str, query: &str, variables: &Value) -> Result<Value> {
        let token = self.auth.access_token().await?;
        let mut response = self.post(operation, query, variables, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("GraphQL request unauthorized, refreshing token");
            let token = self.auth.refresh().await?;
            response = self.post(operation, query, variables, &token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "GraphQL request failed with status {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("Invalid GraphQL response: {}", e)))?;
        if let Some(errors) = body.get("errors") {
            return Err(Error::Fetch(format!("GraphQL errors: {}", errors)));
        }
        Ok(body.get("data").cloned().unwrap_or_default())
    }

    async fn post(
        &self,
        operation: &str,
        query: &str,
        variables: &Value,
        token: &str,
    ) -> Result<reqwest::Response> {
        let payload = json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        });

        let response = self
            .client
            .post(format!("{}/graphql", self.base_url))
            .bearer_auth(token)
            .header("st-auth-mode", "header")
            .header(header::ORIGIN, APP_ORIGIN)
            .header(header::REFERER, APP_REFERER)
            .json(&payload)
            .send()
            .await?;
        Ok(response)
    }
}
