//! Error types for the dashboard library

use thiserror::Error;

/// Errors raised by the store, the fetch pipeline and the completion client
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Missing or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any failure reported by the relational store
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No listing entry carries this display name
    #[error("No listed company named '{name}'{}", suggestion_suffix(.suggestions))]
    TickerNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    /// Several listing entries share this display name
    #[error("Company name '{name}' matches several tickers: {}", .codes.join(", "))]
    AmbiguousTicker { name: String, codes: Vec<String> },

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// The provider returned nothing for the requested window
    #[error("No price data for {symbol} between {start} and {end}")]
    EmptySeries {
        symbol: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Market-data provider answered with something unusable
    #[error("Market data provider error: {0}")]
    Provider(String),

    /// Listing download could not be parsed
    #[error("Listing error: {0}")]
    Listing(String),

    /// Completion endpoint returned a non-success status
    #[error("Completion request failed with status {status}: {body}")]
    Completion { status: u16, body: String },

    /// Completion response did not carry choices[0].message.content
    #[error("Malformed completion response: {0}")]
    MalformedCompletion(String),
}

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
