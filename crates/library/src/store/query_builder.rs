//! Resource query builder using SeaQuery.
//!
//! Generates PostgreSQL for listing and single-row lookups:
//! - canonical column projection (`kind` cast to text)
//! - publication visibility
//! - kind / tag / year / free-text predicates
//! - ordering and inclusive row ranges

use sea_query::{
    Alias, Asterisk, Cond, Expr, Iden, Order, PostgresQueryBuilder, Query, SelectStatement,
};

use super::ResourceQuery;
use crate::repository::NormalizedResourceFilters;

/// Resource table and columns.
#[derive(Iden, Clone, Copy)]
enum ResourceCol {
    #[iden = "resource"]
    Table,
    Id,
    Slug,
    Title,
    PublishedOn,
    Summary,
    Location,
    Tags,
    Attachments,
    Embed,
    EmbedPlacement,
    BodyHtml,
    IsPublished,
    CoverImageUrl,
    CreatedAt,
    UpdatedAt,
}

/// Columns selected as-is; `kind` is added separately as text.
const SELECT_COLUMNS: [ResourceCol; 15] = [
    ResourceCol::Id,
    ResourceCol::Slug,
    ResourceCol::Title,
    ResourceCol::PublishedOn,
    ResourceCol::Summary,
    ResourceCol::Location,
    ResourceCol::Tags,
    ResourceCol::Attachments,
    ResourceCol::Embed,
    ResourceCol::EmbedPlacement,
    ResourceCol::BodyHtml,
    ResourceCol::IsPublished,
    ResourceCol::CoverImageUrl,
    ResourceCol::CreatedAt,
    ResourceCol::UpdatedAt,
];

/// Columns matched by the free-text `q` filter.
const SEARCH_COLUMNS: [&str; 3] = ["title", "summary", "location"];

/// Escape `%`, `_` and `\` so they match literally inside LIKE patterns.
pub fn escape_like_wildcards(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Query builder for resource listings.
pub struct ResourceQueryBuilder<'a> {
    query: &'a ResourceQuery,
}

impl<'a> ResourceQueryBuilder<'a> {
    pub fn new(query: &'a ResourceQuery) -> Self {
        Self { query }
    }

    /// Build the paged SELECT.
    pub fn build(&self) -> String {
        let mut select = base_select();

        self.add_filters(&mut select);

        select
            .order_by((ResourceCol::Table, ResourceCol::PublishedOn), Order::Desc)
            .order_by((ResourceCol::Table, ResourceCol::CreatedAt), Order::Desc)
            .limit(self.query.range.row_count())
            .offset(self.query.range.from);

        select.to_string(PostgresQueryBuilder)
    }

    /// Build the COUNT over the same (unpaginated) filter.
    pub fn build_count(&self) -> String {
        let mut select = Query::select();
        select
            .expr(Expr::col(Asterisk).count())
            .from(ResourceCol::Table);

        self.add_filters(&mut select);

        select.to_string(PostgresQueryBuilder)
    }

    /// Build an exact-slug lookup returning at most one row.
    pub fn build_find_by_slug(slug: &str, include_unpublished: bool) -> String {
        let mut select = base_select();
        select.and_where(Expr::col((ResourceCol::Table, ResourceCol::Slug)).eq(slug));
        if !include_unpublished {
            select.and_where(Expr::col((ResourceCol::Table, ResourceCol::IsPublished)).eq(true));
        }
        select.limit(1);
        select.to_string(PostgresQueryBuilder)
    }

    fn add_filters(&self, select: &mut SelectStatement) {
        if !self.query.include_unpublished {
            select.and_where(Expr::col((ResourceCol::Table, ResourceCol::IsPublished)).eq(true));
        }
        add_filter_conditions(select, &self.query.filters);
    }
}

fn base_select() -> SelectStatement {
    let mut select = Query::select();
    select
        .columns(SELECT_COLUMNS.map(|col| (ResourceCol::Table, col)))
        .expr_as(Expr::cust(r#""resource"."kind"::text"#), Alias::new("kind"))
        .from(ResourceCol::Table);
    select
}

fn add_filter_conditions(select: &mut SelectStatement, filters: &NormalizedResourceFilters) {
    if let Some(kind) = &filters.kind {
        select.and_where(Expr::cust_with_values(
            r#""resource"."kind"::text = $1"#,
            [kind.clone()],
        ));
    }

    // Stored tags are not guaranteed lower-case, so compare lower(tag) against
    // the pre-lowered filter. Non-array tag values never match.
    if let Some(tag) = &filters.tag {
        select.and_where(Expr::cust_with_values(
            r#"CASE WHEN jsonb_typeof("resource"."tags") = 'array' THEN EXISTS (SELECT 1 FROM jsonb_array_elements_text("resource"."tags") AS t(tag) WHERE lower(t.tag) = $1) ELSE false END"#,
            [tag.clone()],
        ));
    }

    if let Some(year) = filters.year_number() {
        let start = format!("{year:04}-01-01");
        let end = format!("{:04}-01-01", year + 1);
        select
            .and_where(Expr::col((ResourceCol::Table, ResourceCol::PublishedOn)).gte(start))
            .and_where(Expr::col((ResourceCol::Table, ResourceCol::PublishedOn)).lt(end));
    }

    if let Some(q) = &filters.q {
        let pattern = format!("%{}%", escape_like_wildcards(q));
        let mut any = Cond::any();
        for column in SEARCH_COLUMNS {
            any = any.add(Expr::cust_with_values(
                format!(r#""resource"."{column}" ILIKE $1"#),
                [pattern.clone()],
            ));
        }
        select.cond_where(any);
    }
}
