//! Resource kind lookup.
//!
//! The set of kinds lives in the database as the `resource_kind` enum. It is
//! only used to present filter options.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{LibraryResult, StoreError};

/// One selectable kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindOption {
    pub value: String,
    pub label: String,
}

impl KindOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let label = kind_label(&value);
        Self { value, label }
    }
}

/// Human-readable label for a kind value: `press-item` becomes "Press item".
pub fn kind_label(value: &str) -> String {
    let words: Vec<&str> = value
        .split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .collect();

    let mut label = words.join(" ").to_lowercase();
    if let Some(first) = label.get(..1) {
        label = format!("{}{}", first.to_uppercase(), &label[1..]);
    }
    label
}

/// Source of the valid kind values.
#[async_trait]
pub trait KindCatalog: Send + Sync {
    async fn kinds(&self) -> LibraryResult<Vec<KindOption>>;
}

/// Reads kinds from the `resource_kind` enum, in declaration order.
pub struct PgKindCatalog {
    pool: PgPool,
}

impl PgKindCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KindCatalog for PgKindCatalog {
    async fn kinds(&self) -> LibraryResult<Vec<KindOption>> {
        let values: Vec<String> =
            sqlx::query_scalar("SELECT unnest(enum_range(NULL::resource_kind))::text")
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::from)?;

        Ok(values.into_iter().map(KindOption::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_from_values() {
        assert_eq!(kind_label("press-item"), "Press item");
        assert_eq!(kind_label("dataset"), "Dataset");
        assert_eq!(kind_label("DELEGATION_REPORT"), "Delegation report");
        assert_eq!(kind_label(""), "");
    }

    #[test]
    fn option_carries_label() {
        let option = KindOption::new("press-item");
        assert_eq!(option.value, "press-item");
        assert_eq!(option.label, "Press item");
    }
}
