//! In-memory resource store.
//!
//! Evaluates [`ResourceQuery`] over a fixed set of rows with the same
//! semantics as the PostgreSQL store. Useful for previews and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use super::{ResourceQuery, ResourceStore, RowPage};
use crate::error::StoreError;
use crate::models::ResourceRow;
use crate::repository::NormalizedResourceFilters;

/// Read-only store over rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    rows: Vec<ResourceRow>,
}

impl MemoryResourceStore {
    pub fn new(rows: Vec<ResourceRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn visible(row: &ResourceRow, include_unpublished: bool) -> bool {
    include_unpublished || row.is_published
}

fn contains_ignore_case(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(needle))
}

fn has_tag(tags: Option<&Value>, tag: &str) -> bool {
    tags.and_then(Value::as_array).is_some_and(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.to_lowercase() == tag)
    })
}

fn in_year(date: NaiveDate, year: i32) -> bool {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1);
    match (start, end) {
        (Some(start), Some(end)) => date >= start && date < end,
        _ => false,
    }
}

fn matches(row: &ResourceRow, filters: &NormalizedResourceFilters) -> bool {
    if let Some(kind) = &filters.kind
        && row.kind != *kind
    {
        return false;
    }
    if let Some(tag) = &filters.tag
        && !has_tag(row.tags.as_ref(), tag)
    {
        return false;
    }
    if let Some(year) = filters.year_number()
        && !in_year(row.published_on, year)
    {
        return false;
    }
    if let Some(q) = &filters.q {
        let needle = q.to_lowercase();
        return contains_ignore_case(Some(&row.title), &needle)
            || contains_ignore_case(row.summary.as_deref(), &needle)
            || contains_ignore_case(row.location.as_deref(), &needle);
    }
    true
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn list(&self, query: &ResourceQuery) -> Result<RowPage, StoreError> {
        let mut matched: Vec<&ResourceRow> = self
            .rows
            .iter()
            .filter(|row| visible(row, query.include_unpublished))
            .filter(|row| matches(row, &query.filters))
            .collect();

        matched.sort_by(|a, b| {
            b.published_on
                .cmp(&a.published_on)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = matched.len() as u64;
        let from = usize::try_from(query.range.from).unwrap_or(usize::MAX);
        let take = usize::try_from(query.range.row_count()).unwrap_or(usize::MAX);
        let rows = matched.into_iter().skip(from).take(take).cloned().collect();

        Ok(RowPage { rows, total })
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> Result<ResourceRow, StoreError> {
        self.rows
            .iter()
            .find(|row| row.slug == slug && visible(row, include_unpublished))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
