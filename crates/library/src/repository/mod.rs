//! Resource repository.
//!
//! Normalizes caller filters, resolves pagination, queries the store and maps
//! rows into [`Resource`] values. Store failures propagate unchanged; the
//! store's "no row" signal becomes `None` for slug lookups.

mod aggregate;
mod filters;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LibraryResult;
use crate::models::Resource;
use crate::slug::normalize_resource_slug;
use crate::store::{ResourceQuery, ResourceStore};

pub use aggregate::{
    format_resource_date, format_resource_date_short, get_resource_tags, get_resource_years,
};
pub use filters::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, NormalizedResourceFilters, PageRange, Pagination,
    ResourceFilters, normalize_filters,
};

/// Options for [`ResourceRepository::list_resources`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOptions {
    /// Requested page (1-indexed).
    pub page: Option<i64>,
    /// Requested page size.
    pub page_size: Option<i64>,
    /// Include unpublished rows (admin views).
    #[serde(default)]
    pub include_unpublished: bool,
}

/// Options for [`ResourceRepository::get_resource_by_slug`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GetOptions {
    #[serde(default)]
    pub include_unpublished: bool,
}

/// One page of resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceListResult {
    pub items: Vec<Resource>,

    /// Total matching rows (before paging).
    pub total: u64,

    /// Current page number (1-indexed).
    pub page: u32,

    pub page_size: u32,

    /// Whether rows exist past this page.
    pub has_more: bool,
}

/// Read access to the resource library.
#[derive(Clone)]
pub struct ResourceRepository {
    store: Arc<dyn ResourceStore>,
    default_page_size: u32,
}

impl ResourceRepository {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used when the caller does not request one.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// List resources matching `filters`, newest first.
    pub async fn list_resources(
        &self,
        filters: &ResourceFilters,
        options: &ListOptions,
    ) -> LibraryResult<ResourceListResult> {
        let filters = normalize_filters(filters);
        let pagination =
            Pagination::resolve(options.page, options.page_size, self.default_page_size);
        let range = pagination.range();

        debug!(
            ?filters,
            page = pagination.page,
            page_size = pagination.page_size,
            from = range.from,
            to = range.to,
            include_unpublished = options.include_unpublished,
            "listing resources"
        );

        let query = ResourceQuery {
            filters,
            include_unpublished: options.include_unpublished,
            range,
        };
        let page = self.store.list(&query).await?;

        Ok(ResourceListResult {
            items: page.rows.into_iter().map(Resource::from).collect(),
            total: page.total,
            page: pagination.page,
            page_size: pagination.page_size,
            has_more: page.total > range.to + 1,
        })
    }

    /// Fetch one resource by slug.
    ///
    /// The slug is normalized before comparison. Returns `None` when nothing
    /// visible matches.
    pub async fn get_resource_by_slug(
        &self,
        slug: &str,
        options: &GetOptions,
    ) -> LibraryResult<Option<Resource>> {
        let slug = normalize_resource_slug(slug);
        if slug.is_empty() {
            return Ok(None);
        }

        match self
            .store
            .find_by_slug(&slug, options.include_unpublished)
            .await
        {
            Ok(row) => Ok(Some(Resource::from(row))),
            Err(e) if e.is_not_found() => {
                debug!(slug = %slug, "resource not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
