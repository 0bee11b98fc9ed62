use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub bemlo_base_url: String,
    pub bemlo_email: Option<String>,
    pub bemlo_password: Option<String>,
    pub webhook_url: Option<String>,
    pub worker_threads: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            port: get_env_parse_or("PORT", 8080)?,
            database_url: get_env_or("DATABASE_URL", "sqlite:///tmp/bemlo_vacancies.db"),
            bemlo_base_url: get_env_or("BEMLO_BASE_URL", "https://api.bemlo.ai"),
            bemlo_email: get_env_opt("BEMLO_EMAIL"),
            bemlo_password: get_env_opt("BEMLO_PASSWORD"),
            webhook_url: get_env_opt("WEBHOOK_URL"),
            worker_threads: get_env_parse_or("WORKER_THREADS", 4)?,
        })
    }

    /// Both portal credentials are present, so a scrape can authenticate.
    pub fn has_credentials(&self) -> bool {
        self.bemlo_email.is_some() && self.bemlo_password.is_some()
    }
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
