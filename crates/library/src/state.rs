//! Shared library state for an embedding page-rendering layer.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::kinds::{KindCatalog, PgKindCatalog};
use crate::repository::ResourceRepository;
use crate::store::PgResourceStore;

/// Shared library state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct LibraryState {
    inner: Arc<LibraryStateInner>,
}

struct LibraryStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    resources: ResourceRepository,

    kinds: Arc<dyn KindCatalog>,
}

impl LibraryState {
    /// Connect to the database and wire up the repository.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;
        info!(
            max_connections = config.database_max_connections,
            "database pool created"
        );

        Ok(Self::from_pool(db, config))
    }

    /// Build state over an existing pool.
    pub fn from_pool(db: PgPool, config: &Config) -> Self {
        let store = PgResourceStore::new(db.clone())
            .with_statement_timeout(config.statement_timeout_secs);
        let resources = ResourceRepository::new(Arc::new(store))
            .with_default_page_size(config.default_page_size);
        let kinds: Arc<dyn KindCatalog> = Arc::new(PgKindCatalog::new(db.clone()));

        Self {
            inner: Arc::new(LibraryStateInner {
                db,
                resources,
                kinds,
            }),
        }
    }

    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub fn resources(&self) -> &ResourceRepository {
        &self.inner.resources
    }

    pub fn kinds(&self) -> &dyn KindCatalog {
        self.inner.kinds.as_ref()
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
