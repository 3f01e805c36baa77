//! PostgreSQL resource store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use super::query_builder::ResourceQueryBuilder;
use super::{ResourceQuery, ResourceStore, RowPage};
use crate::error::StoreError;
use crate::models::ResourceRow;

/// Default statement timeout for listing queries, in seconds.
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 10;

/// Resource store backed by the `resource` table.
#[derive(Clone)]
pub struct PgResourceStore {
    pool: PgPool,
    statement_timeout_secs: u64,
}

impl PgResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout_secs: DEFAULT_STATEMENT_TIMEOUT_SECS,
        }
    }

    /// Override the statement timeout applied to listing queries.
    pub fn with_statement_timeout(mut self, secs: u64) -> Self {
        self.statement_timeout_secs = secs.max(1);
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ResourceStore for PgResourceStore {
    async fn list(&self, query: &ResourceQuery) -> Result<RowPage, StoreError> {
        let builder = ResourceQueryBuilder::new(query);

        // Count and page run in one transaction so SET LOCAL scopes the
        // timeout to these two statements.
        let mut tx = self.pool.begin().await.inspect_err(|e| {
            warn!(error = %e, "failed to begin resource query transaction");
        })?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}s'",
            self.statement_timeout_secs
        ))
        .execute(&mut *tx)
        .await?;

        let count_sql = builder.build_count();
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .inspect_err(|e| warn!(error = %e, "resource count query failed"))?;

        let main_sql = builder.build();
        debug!(sql = %main_sql, "listing resources");
        let rows = sqlx::query_as::<_, ResourceRow>(&main_sql)
            .fetch_all(&mut *tx)
            .await
            .inspect_err(|e| warn!(error = %e, "resource list query failed"))?;

        tx.commit().await?;

        Ok(RowPage {
            rows,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> Result<ResourceRow, StoreError> {
        let sql = ResourceQueryBuilder::build_find_by_slug(slug, include_unpublished);
        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| {
                if !matches!(e, sqlx::Error::RowNotFound) {
                    warn!(error = %e, slug, "resource lookup failed");
                }
            })?;
        Ok(row)
    }
}
