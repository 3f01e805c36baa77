//! Resource library test utilities.
//!
//! Fixture builders that produce resource rows the way the store persists
//! them: loosely-typed JSON, including payloads that predate the current
//! embed and attachment shapes.

use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

/// Create a published test resource row with default values.
pub fn test_resource(slug: &str, title: &str) -> TestResource {
    TestResource {
        id: Uuid::now_v7(),
        slug: slug.to_string(),
        title: title.to_string(),
        kind: "document".to_string(),
        published_on: "2024-01-15".to_string(),
        summary: None,
        location: None,
        tags: json!([]),
        attachments: json!([]),
        embed: JsonValue::Null,
        embed_placement: JsonValue::Null,
        body_html: JsonValue::Null,
        is_published: true,
        cover_image_url: None,
        created_at: "2024-01-15T09:00:00Z".to_string(),
        updated_at: "2024-01-15T09:00:00Z".to_string(),
    }
}

/// A resource row builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestResource {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub kind: String,
    /// `YYYY-MM-DD`.
    pub published_on: String,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub tags: JsonValue,
    pub attachments: JsonValue,
    pub embed: JsonValue,
    pub embed_placement: JsonValue,
    pub body_html: JsonValue,
    pub is_published: bool,
    pub cover_image_url: Option<String>,
    /// RFC 3339.
    pub created_at: String,
    pub updated_at: String,
}

impl TestResource {
    /// Set the kind.
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }

    /// Set the publication date (`YYYY-MM-DD`).
    pub fn published_on(mut self, date: &str) -> Self {
        self.published_on = date.to_string();
        self
    }

    /// Set the creation timestamp (RFC 3339).
    pub fn created_at(mut self, timestamp: &str) -> Self {
        self.created_at = timestamp.to_string();
        self
    }

    /// Set as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    /// Set tags from strings.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = json!(tags);
        self
    }

    /// Set the raw stored tags value (any shape).
    pub fn with_raw_tags(mut self, tags: JsonValue) -> Self {
        self.tags = tags;
        self
    }

    /// Add a well-formed attachment.
    pub fn with_attachment(mut self, label: &str, url: &str) -> Self {
        if let Some(list) = self.attachments.as_array_mut() {
            list.push(json!({ "label": label, "url": url }));
        }
        self
    }

    /// Set the raw stored attachments value (any shape).
    pub fn with_raw_attachments(mut self, attachments: JsonValue) -> Self {
        self.attachments = attachments;
        self
    }

    /// Set the raw stored embed value (any shape).
    pub fn with_embed(mut self, embed: JsonValue) -> Self {
        self.embed = embed;
        self
    }

    pub fn with_placement(mut self, placement: &str) -> Self {
        self.embed_placement = json!(placement);
        self
    }

    pub fn with_body(mut self, html: &str) -> Self {
        self.body_html = json!(html);
        self
    }

    pub fn with_cover_image(mut self, url: &str) -> Self {
        self.cover_image_url = Some(url.to_string());
        self
    }

    /// The row as the store would return it.
    pub fn to_row_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "slug": self.slug,
            "title": self.title,
            "kind": self.kind,
            "published_on": self.published_on,
            "summary": self.summary,
            "location": self.location,
            "tags": self.tags,
            "attachments": self.attachments,
            "embed": self.embed,
            "embed_placement": self.embed_placement,
            "body_html": self.body_html,
            "is_published": self.is_published,
            "cover_image_url": self.cover_image_url,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// Stored embed payloads, valid and malformed.
pub mod embeds {
    use serde_json::{Value, json};

    pub fn google_doc() -> Value {
        json!({ "type": "google-doc", "url": "https://docs.google.com/document/d/abc/preview" })
    }

    pub fn pdf() -> Value {
        json!({ "type": "pdf", "url": "https://drive.google.com/file/d/abc/preview" })
    }

    pub fn youtube() -> Value {
        json!({ "type": "video", "url": "https://www.youtube.com/embed/abc", "provider": "youtube" })
    }

    pub fn external() -> Value {
        json!({ "type": "external", "url": "https://example.org/report", "label": "Full report" })
    }

    pub fn html(markup: &str) -> Value {
        json!({ "type": "html", "html": markup })
    }

    /// One valid payload per variant.
    pub fn all_valid() -> Vec<Value> {
        vec![
            google_doc(),
            pdf(),
            youtube(),
            external(),
            html("<p>Embedded</p>"),
        ]
    }

    /// Payloads that must normalize to no embed.
    pub fn malformed() -> Vec<Value> {
        vec![
            json!({ "type": "google-doc" }),
            json!({ "type": "pdf", "url": null }),
            json!({ "type": "video", "url": "https://vimeo.com/1" }),
            json!({ "type": "video", "url": "https://vimeo.com/1", "provider": "tiktok" }),
            json!({ "type": "html", "html": 12 }),
            json!({ "type": "carousel", "url": "https://example.org" }),
            json!({ "url": "https://example.org" }),
            json!("https://www.youtube.com/embed/abc"),
            json!([]),
        ]
    }
}

/// Assertion helpers for rendered markup.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_builder() {
        let row = test_resource("annual-report", "Annual Report")
            .unpublished()
            .with_kind("report")
            .with_tags(&["Housing"])
            .with_attachment("PDF", "https://example.org/a.pdf")
            .to_row_json();

        assert_eq!(row["slug"], "annual-report");
        assert_eq!(row["kind"], "report");
        assert_eq!(row["is_published"], false);
        assert_eq!(row["tags"], json!(["Housing"]));
        assert_eq!(row["attachments"].as_array().map(Vec::len), Some(1));
        assert!(row["embed"].is_null());
    }

    #[test]
    fn test_embed_fixtures() {
        assert_eq!(embeds::all_valid().len(), 5);
        assert!(!embeds::malformed().is_empty());
    }

    #[test]
    fn test_assertions() {
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
    }
}
