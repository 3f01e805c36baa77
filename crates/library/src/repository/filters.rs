//! Listing filters and pagination.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Filter intent as supplied by the caller (e.g. from a query string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilters {
    pub q: Option<String>,
    pub kind: Option<String>,
    pub tag: Option<String>,
    pub year: Option<String>,
}

/// Validated filters; every field is a usable value or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResourceFilters {
    pub q: Option<String>,
    pub kind: Option<String>,
    /// Trimmed, then lower-cased.
    pub tag: Option<String>,
    /// Exactly four ASCII digits.
    pub year: Option<String>,
}

impl NormalizedResourceFilters {
    /// The year as a number, when set.
    pub fn year_number(&self) -> Option<i32> {
        self.year.as_deref().and_then(|y| y.parse().ok())
    }
}

/// Trim, coercing the empty string to `None`.
fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_four_digit_year(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize caller filters. Total: never fails.
pub fn normalize_filters(filters: &ResourceFilters) -> NormalizedResourceFilters {
    NormalizedResourceFilters {
        q: trimmed(filters.q.as_deref()),
        kind: trimmed(filters.kind.as_deref()),
        tag: trimmed(filters.tag.as_deref()).map(|t| t.to_lowercase()),
        year: filters
            .year
            .as_deref()
            .filter(|y| is_four_digit_year(y))
            .map(str::to_string),
    }
}

/// Inclusive, zero-based row range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub from: u64,
    pub to: u64,
}

impl PageRange {
    /// Number of rows covered by the range (never zero).
    pub fn row_count(&self) -> u64 {
        self.to - self.from + 1
    }
}

/// Resolved pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-indexed page.
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    /// Resolve requested values: `page` is at least 1 and `page_size` is
    /// clamped into `[1, MAX_PAGE_SIZE]`, falling back to `default_page_size`.
    pub fn resolve(page: Option<i64>, page_size: Option<i64>, default_page_size: u32) -> Self {
        let page = page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;
        let page_size = page_size
            .unwrap_or(i64::from(default_page_size))
            .clamp(1, i64::from(MAX_PAGE_SIZE)) as u32;
        Self { page, page_size }
    }

    /// Row range for this page.
    pub fn range(&self) -> PageRange {
        let from = u64::from(self.page - 1) * u64::from(self.page_size);
        PageRange {
            from,
            to: from + u64::from(self.page_size) - 1,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::resolve(None, None, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(
        q: Option<&str>,
        kind: Option<&str>,
        tag: Option<&str>,
        year: Option<&str>,
    ) -> ResourceFilters {
        ResourceFilters {
            q: q.map(str::to_string),
            kind: kind.map(str::to_string),
            tag: tag.map(str::to_string),
            year: year.map(str::to_string),
        }
    }

    #[test]
    fn all_absent_normalizes_to_all_none() {
        assert_eq!(
            normalize_filters(&ResourceFilters::default()),
            NormalizedResourceFilters::default()
        );
    }

    #[test]
    fn trims_and_lowercases_tag() {
        let normalized = normalize_filters(&filters(None, None, Some("  Housing Law "), None));
        assert_eq!(normalized.tag.as_deref(), Some("housing law"));
    }

    #[test]
    fn blank_strings_become_none() {
        let normalized = normalize_filters(&filters(Some("   "), Some(""), Some(" "), Some("")));
        assert_eq!(normalized, NormalizedResourceFilters::default());
    }

    #[test]
    fn q_is_trimmed_not_lowercased() {
        let normalized = normalize_filters(&filters(Some("  Tenant Rights "), None, None, None));
        assert_eq!(normalized.q.as_deref(), Some("Tenant Rights"));
    }

    #[test]
    fn year_requires_exactly_four_digits() {
        assert_eq!(
            normalize_filters(&filters(None, None, None, Some("2024"))).year.as_deref(),
            Some("2024")
        );
        for bad in ["202", "20244", "abcd", "", " 2024", "２０２４"] {
            assert_eq!(
                normalize_filters(&filters(None, None, None, Some(bad))).year,
                None,
                "year {bad:?}"
            );
        }
    }

    #[test]
    fn year_number_parses() {
        let normalized = normalize_filters(&filters(None, None, None, Some("1999")));
        assert_eq!(normalized.year_number(), Some(1999));
    }

    #[test]
    fn pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p, Pagination { page: 1, page_size: 50 });
        assert_eq!(p.range(), PageRange { from: 0, to: 49 });
    }

    #[test]
    fn pagination_math() {
        let p = Pagination::resolve(Some(3), Some(20), DEFAULT_PAGE_SIZE);
        assert_eq!(p.range(), PageRange { from: 40, to: 59 });
        assert_eq!(p.range().row_count(), 20);
    }

    #[test]
    fn pagination_clamps() {
        assert_eq!(Pagination::resolve(None, Some(500), DEFAULT_PAGE_SIZE).page_size, 200);
        assert_eq!(Pagination::resolve(None, Some(0), DEFAULT_PAGE_SIZE).page_size, 1);
        assert_eq!(Pagination::resolve(None, Some(-7), DEFAULT_PAGE_SIZE).page_size, 1);
        assert_eq!(Pagination::resolve(Some(0), None, DEFAULT_PAGE_SIZE).page, 1);
        assert_eq!(Pagination::resolve(Some(-3), None, DEFAULT_PAGE_SIZE).page, 1);
    }

    #[test]
    fn pagination_uses_configured_default() {
        assert_eq!(Pagination::resolve(None, None, 25).page_size, 25);
        assert_eq!(Pagination::resolve(None, None, 900).page_size, 200);
    }
}
