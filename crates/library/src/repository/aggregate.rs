//! Helpers over an already-fetched resource list.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::models::Resource;

/// Distinct publication years, newest first, as 4-digit strings.
pub fn get_resource_years(resources: &[Resource]) -> Vec<String> {
    let years: BTreeSet<i32> = resources.iter().map(|r| r.published_on.year()).collect();
    years
        .into_iter()
        .rev()
        .filter(|y| (0..=9999).contains(y))
        .map(|y| format!("{y:04}"))
        .collect()
}

/// Distinct lower-cased tags, sorted lexically.
pub fn get_resource_tags(resources: &[Resource]) -> Vec<String> {
    let tags: BTreeSet<String> = resources
        .iter()
        .flat_map(|r| r.tags.iter())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    tags.into_iter().collect()
}

/// Long display date, e.g. "March 5, 2024".
pub fn format_resource_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// ISO date, e.g. "2024-03-05".
pub fn format_resource_date_short(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
