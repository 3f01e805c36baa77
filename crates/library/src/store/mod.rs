//! Resource store collaborator.
//!
//! The repository talks to the system of record through [`ResourceStore`].
//! Two implementations ship with the crate:
//! - [`PgResourceStore`]: PostgreSQL via sqlx, SQL built with SeaQuery
//! - [`MemoryResourceStore`]: the same query semantics over in-memory rows

mod memory;
mod postgres;
mod query_builder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::ResourceRow;
use crate::repository::{NormalizedResourceFilters, PageRange};

pub use memory::MemoryResourceStore;
pub use postgres::{DEFAULT_STATEMENT_TIMEOUT_SECS, PgResourceStore};
pub use query_builder::{ResourceQueryBuilder, escape_like_wildcards};

/// A filtered, ordered, paged listing request.
///
/// Rows are ordered by publication date, then creation time, both
/// descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuery {
    pub filters: NormalizedResourceFilters,
    /// When false, only published rows match.
    pub include_unpublished: bool,
    /// Inclusive row range.
    pub range: PageRange,
}

/// One page of rows plus the unpaginated match count.
#[derive(Debug, Clone, Default)]
pub struct RowPage {
    pub rows: Vec<ResourceRow>,
    pub total: u64,
}

/// Tabular store holding resource rows.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Run a listing query.
    async fn list(&self, query: &ResourceQuery) -> Result<RowPage, StoreError>;

    /// Fetch the row with exactly this slug.
    ///
    /// Returns [`StoreError::NotFound`] when nothing matches.
    async fn find_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> Result<ResourceRow, StoreError>;
}
