//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

use crate::repository::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::store::DEFAULT_STATEMENT_TIMEOUT_SECS;

/// Library configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Page size when callers do not ask for one (default: 50, max 200).
    pub default_page_size: u32,

    /// Statement timeout for listing queries in seconds (default: 10).
    pub statement_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let default_page_size: u32 = env::var("RESOURCE_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .context("RESOURCE_PAGE_SIZE must be a valid u32")?;

        let statement_timeout_secs = env::var("RESOURCE_STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_STATEMENT_TIMEOUT_SECS.to_string())
            .parse()
            .context("RESOURCE_STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            database_url,
            database_max_connections,
            default_page_size: default_page_size.clamp(1, MAX_PAGE_SIZE),
            statement_timeout_secs,
        })
    }
}
