use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

use crate::error::{DashboardError, Result};

/// One trading day of price and volume data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: i64,
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// January 1st of `today`'s year through `today`
    pub fn year_to_date(today: NaiveDate) -> Self {
        let jan_1 = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
        Self { start: jan_1, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A listed company: display name and exchange ticker code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub code: String,
}

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LISTING_CACHE_PATH: &str = "krx_listing.csv";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Credentials and endpoints, loaded once at start-up
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub openai_api_key: String,
    pub database_url_override: Option<String>,
    pub openai_api_base: String,
    pub openai_model: String,
    pub listing_cache_path: String,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("openai_api_key", &"***")
            .field("database_url_override", &self.database_url_override)
            .field("openai_api_base", &self.openai_api_base)
            .field("openai_model", &self.openai_model)
            .field("listing_cache_path", &self.listing_cache_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from a `KEY=value` settings file. Values are taken
    /// literally, `$` included.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let values = parse_settings(&text).map_err(|e| in_file(e, &path.display()))?;

        Self::from_lookup(|key| values.get(key).cloned(), |key| key)
    }

    /// Load configuration from environment variables. Database keys are read
    /// as `DB_HOST`, `DB_USER`, `DB_PASSWD` and `DB_NAME`. A `.env` file in the
    /// working directory fills in names the environment leaves unset.
    pub fn from_env() -> Result<Self> {
        let dotenv = match std::fs::read_to_string(".env") {
            Ok(text) => parse_settings(&text).map_err(|e| in_file(e, &".env"))?,
            Err(_) => HashMap::new(),
        };

        Self::from_lookup(
            |key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()),
            env_name,
        )
    }

    fn from_lookup<F>(lookup: F, name: fn(&str) -> &str) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(name(key)).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| DashboardError::Config(format!("{} is required", name(key))))
        };

        Ok(Config {
            host: required("HOST")?,
            user: required("USER")?,
            password: required("PASSWD")?,
            database: required("DB")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            database_url_override: get("DATABASE_URL"),
            openai_api_base: get("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            openai_model: get("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            listing_cache_path: get("LISTING_CACHE_PATH")
                .unwrap_or_else(|| DEFAULT_LISTING_CACHE_PATH.to_string()),
            http_timeout_secs: get("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }

    /// Connection URL for the store: `DATABASE_URL` if set, otherwise MySQL
    /// assembled from HOST/USER/PASSWD/DB with credentials percent-encoded
    pub fn database_url(&self) -> Result<String> {
        if let Some(url) = &self.database_url_override {
            return Ok(url.clone());
        }

        let invalid = |what: &str| DashboardError::Config(format!("invalid {} for database URL", what));

        let mut url = Url::parse(&format!("mysql://{}", self.host)).map_err(|_| invalid("HOST"))?;
        url.set_username(&self.user).map_err(|_| invalid("USER"))?;
        url.set_password(Some(&self.password)).map_err(|_| invalid("PASSWD"))?;
        url.set_path(&format!("/{}", self.database));
        Ok(url.to_string())
    }
}

fn in_file(err: DashboardError, file: &dyn std::fmt::Display) -> DashboardError {
    match err {
        DashboardError::Config(msg) => DashboardError::Config(format!("{}: {}", file, msg)),
        other => other,
    }
}

/// Environment variable holding a config key
fn env_name(key: &str) -> &str {
    match key {
        "HOST" => "DB_HOST",
        "USER" => "DB_USER",
        "PASSWD" => "DB_PASSWD",
        "DB" => "DB_NAME",
        other => other,
    }
}

/// Parse `KEY=value` lines. Blank lines and `#` comments are skipped, an
/// `export ` prefix is allowed, and one pair of matching quotes around the
/// value is removed. Nothing is expanded.
pub fn parse_settings(text: &str) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let (key, value) = line.split_once('=').ok_or_else(|| {
            DashboardError::Config(format!("line {}: expected KEY=value", index + 1))
        })?;
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DashboardError::Config(format!("line {}: invalid key '{}'", index + 1, key)));
        }

        values.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    Ok(values)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    // Unquoted values may carry a trailing ` # comment`
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    }
}
