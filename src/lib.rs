pub mod api;
pub mod dashboard;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod session;
pub mod ui;
pub mod utils;

pub use error::{DashboardError, Result};
