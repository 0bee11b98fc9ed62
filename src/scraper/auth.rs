use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use reqwest::header::{self, HeaderMap};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{APP_ORIGIN, APP_REFERER};
use crate::error::{Error, Result};

/// Tokens are considered expired this many seconds before their `exp` claim.
const TOKEN_EXPIRY_BUFFER_SECS: i64 = 300;
/// Fallback lifetime when the access token's expiry cannot be decoded.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Session tokens issued by the portal's SuperTokens endpoints. They arrive
/// in response headers, not the body.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub front_token: Option<String>,
    pub expires_at: i64,
}

impl SessionTokens {
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.expires_at - TOKEN_EXPIRY_BUFFER_SECS
    }
}

/// Email/password authenticator for the Bemlo portal. Keeps the current
/// session tokens behind a mutex so concurrent callers share one session.
#[derive(Clone)]
pub struct BemloAuth {
    client: Client,
    base_url: String,
    email: String,
    password: String,
    tokens: Arc<Mutex<Option<SessionTokens>>>,
}

impl BemloAuth {
    pub fn new(client: Client, base_url: String, email: String, password: String) -> Self {
        Self {
            client,
            base_url,
            email,
            password,
            tokens: Arc::new(Mutex::new(None)),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }

    /// Returns a valid access token, signing in or refreshing as needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut guard = self.tokens.lock().await;
        let next = match guard.as_ref() {
            None => self.login().await?,
            Some(current) if current.is_expired() => self.refresh_tokens(current).await?,
            Some(current) => return Ok(current.access_token.clone()),
        };
        let access_token = next.access_token.clone();
        *guard = Some(next);
        Ok(access_token)
    }

    /// Forces a token refresh, e.g. after the API answered 401 despite an
    /// apparently valid token.
    pub async fn refresh(&self) -> Result<String> {
        let mut guard = self.tokens.lock().await;
        let next = match guard.as_ref() {
            Some(current) => self.refresh_tokens(current).await?,
            None => self.login().await?,
        };
        let access_token = next.access_token.clone();
        *guard = Some(next);
        Ok(access_token)
    }

    async fn login(&self) -> Result<SessionTokens> {
        info!("Signing in to Bemlo as {}", self.email);

        let url = format!("{}/auth/signin", self.base_url);
        let body = json!({
            "formFields": [
                {"id": "email", "value": self.email},
                {"id": "password", "value": self.password},
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("rid", "emailpassword")
            .header(header::ORIGIN, APP_ORIGIN)
            .header(header::REFERER, APP_REFERER)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Sign-in request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Sign-in failed with status {}: {}",
                status, text
            )));
        }

        let headers = response.headers().clone();
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Invalid sign-in response: {}", e)))?;
        if body.get("status").and_then(Value::as_str) != Some("OK") {
            return Err(Error::Auth(format!("Sign-in rejected: {}", body)));
        }

        let access_token = header_value(&headers, "st-access-token")
            .ok_or_else(|| Error::Auth("No st-access-token in sign-in response".to_string()))?;
        let refresh_token = header_value(&headers, "st-refresh-token");
        let front_token = header_value(&headers, "front-token");
        let expires_at = decode_jwt_expiry(&access_token)
            .unwrap_or_else(|| Utc::now().timestamp() + DEFAULT_TOKEN_TTL_SECS);

        info!("Signed in, session token expires at {}", expires_at);
        Ok(SessionTokens {
            access_token,
            refresh_token,
            front_token,
            expires_at,
        })
    }

    async fn refresh_tokens(&self, current: &SessionTokens) -> Result<SessionTokens> {
        let refresh_token = match &current.refresh_token {
            Some(token) => token.clone(),
            None => {
                warn!("No refresh token on hand, signing in again");
                return self.login().await;
            }
        };

        info!("Refreshing Bemlo session token");
        let url = format!("{}/auth/session/refresh", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("rid", "session")
            .header(header::AUTHORIZATION, format!("Bearer {}", refresh_token))
            .header(header::ORIGIN, APP_ORIGIN)
            .header(header::REFERER, APP_REFERER)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(
                "Token refresh returned status {}, signing in again",
                response.status()
            );
            return self.login().await;
        }

        let access_token = match header_value(response.headers(), "st-access-token") {
            Some(token) => token,
            None => {
                warn!("No access token in refresh response, signing in again");
                return self.login().await;
            }
        };
        let refresh_token = header_value(response.headers(), "st-refresh-token")
            .or_else(|| current.refresh_token.clone());
        let front_token =
            header_value(response.headers(), "front-token").or_else(|| current.front_token.clone());
        let expires_at = decode_jwt_expiry(&access_token)
            .unwrap_or_else(|| Utc::now().timestamp() + DEFAULT_TOKEN_TTL_SECS);

        info!("Session token refreshed, expires at {}", expires_at);
        Ok(SessionTokens {
            access_token,
            refresh_token,
            front_token,
            expires_at,
        })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Pulls the `exp` claim out of a JWT without verifying the signature. The
/// token only needs to be fresh enough for the portal to accept it.
fn decode_jwt_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp").and_then(Value::as_i64)
}
