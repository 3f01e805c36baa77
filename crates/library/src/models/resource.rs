//! Resource model and row normalization.
//!
//! Rows come back from the store loosely typed: `tags`, `attachments` and
//! `embed` are JSON columns whose shape has drifted over time. Mapping a row
//! into a [`Resource`] never fails; malformed fragments are dropped.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{LibraryError, LibraryResult};
use crate::hosts::{assert_allowed_embed_url, url_host};
use crate::sanitize::sanitize_embed_html;

/// Raw resource row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    /// Content category (Postgres enum, selected as text).
    pub kind: String,
    pub published_on: NaiveDate,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub tags: Option<Value>,
    pub attachments: Option<Value>,
    pub embed: Option<Value>,
    pub embed_placement: Option<String>,
    pub body_html: Option<String>,
    pub is_published: bool,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One publishable library entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier.
    pub id: Uuid,

    /// URL-safe slug (unique).
    pub slug: String,

    pub title: String,

    /// Content category.
    pub kind: String,

    /// Publication date.
    pub published_on: NaiveDate,

    pub summary: Option<String>,

    pub location: Option<String>,

    /// Tags in stored order.
    pub tags: Vec<String>,

    pub attachments: Vec<ResourceAttachment>,

    pub embed: Option<ResourceEmbed>,

    pub embed_placement: EmbedPlacement,

    /// Body markup; must go through the sanitizer before render.
    pub body_html: String,

    pub is_published: bool,

    pub cover_image_url: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A labelled link attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttachment {
    pub label: String,
    pub url: String,
}

/// Where the embed renders relative to the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedPlacement {
    #[default]
    Above,
    Below,
}

impl EmbedPlacement {
    /// Parse a stored placement, defaulting to `Above` for anything else.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("below") => EmbedPlacement::Below,
            _ => EmbedPlacement::Above,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedPlacement::Above => "above",
            EmbedPlacement::Below => "below",
        }
    }
}

/// Video hosting provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    Youtube,
    Vimeo,
}

impl VideoProvider {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "youtube" => Some(VideoProvider::Youtube),
            "vimeo" => Some(VideoProvider::Vimeo),
            _ => None,
        }
    }

    /// Hosts that serve this provider's player.
    fn hosts(&self) -> &'static [&'static str] {
        match self {
            VideoProvider::Youtube => &[
                "www.youtube.com",
                "youtube.com",
                "www.youtube-nocookie.com",
                "youtube-nocookie.com",
            ],
            VideoProvider::Vimeo => &["player.vimeo.com", "vimeo.com"],
        }
    }
}

/// Rich embed attached to a resource, keyed by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ResourceEmbed {
    GoogleDoc {
        url: String,
    },
    Pdf {
        url: String,
    },
    Video {
        url: String,
        provider: VideoProvider,
    },
    External {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Html {
        html: String,
    },
}

impl ResourceEmbed {
    /// Rebuild an embed from an untyped JSON value.
    ///
    /// Returns `None` unless the value is an object whose `type` names a known
    /// variant and every required field of that variant is a non-empty string.
    /// A variant is never partially constructed.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = obj.get("type")?.as_str()?;

        match kind {
            "google-doc" => Some(ResourceEmbed::GoogleDoc {
                url: required_text(obj, "url")?,
            }),
            "pdf" => Some(ResourceEmbed::Pdf {
                url: required_text(obj, "url")?,
            }),
            "video" => {
                let url = required_text(obj, "url")?;
                let provider = VideoProvider::parse(obj.get("provider")?.as_str()?)?;
                Some(ResourceEmbed::Video { url, provider })
            }
            "external" => {
                let url = required_text(obj, "url")?;
                let label = match obj.get("label") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) if s.is_empty() => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(_) => return None,
                };
                Some(ResourceEmbed::External { url, label })
            }
            "html" => Some(ResourceEmbed::Html {
                html: required_text(obj, "html")?,
            }),
            _ => None,
        }
    }

    /// The `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceEmbed::GoogleDoc { .. } => "google-doc",
            ResourceEmbed::Pdf { .. } => "pdf",
            ResourceEmbed::Video { .. } => "video",
            ResourceEmbed::External { .. } => "external",
            ResourceEmbed::Html { .. } => "html",
        }
    }

    /// URL to load in an iframe, for the frame-rendered variants.
    pub fn iframe_src(&self) -> Option<&str> {
        match self {
            ResourceEmbed::GoogleDoc { url }
            | ResourceEmbed::Pdf { url }
            | ResourceEmbed::Video { url, .. } => Some(url),
            ResourceEmbed::External { .. } | ResourceEmbed::Html { .. } => None,
        }
    }

    /// Validate an embed before it is saved.
    ///
    /// Frame-rendered variants must point at an allowed host, videos must be
    /// served by their declared provider, and external links must be http(s).
    /// Raw HTML is sanitized at render time instead.
    pub fn validate(&self, context: &str) -> LibraryResult<()> {
        match self {
            ResourceEmbed::GoogleDoc { url } | ResourceEmbed::Pdf { url } => {
                assert_allowed_embed_url(url, context)?;
            }
            ResourceEmbed::Video { url, provider } => {
                assert_allowed_embed_url(url, context)?;
                let host = url_host(url);
                if !provider.hosts().contains(&host.as_str()) {
                    return Err(LibraryError::InvalidEmbed {
                        context: context.to_string(),
                        reason: format!("video host {host} does not match provider {provider:?}"),
                    });
                }
            }
            ResourceEmbed::External { url, .. } => {
                let scheme_ok = url::Url::parse(url)
                    .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
                    .unwrap_or(false);
                if !scheme_ok {
                    return Err(LibraryError::InvalidEmbed {
                        context: context.to_string(),
                        reason: format!("external link must be an http(s) URL: {url}"),
                    });
                }
            }
            ResourceEmbed::Html { .. } => {}
        }
        Ok(())
    }
}

/// Read a required string field; missing, non-string, or empty yields `None`.
fn required_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Coerce a scalar JSON value to trimmed text.
fn coerce_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Normalize a stored embed value; anything off-shape becomes `None`.
pub fn normalize_embed(value: Option<&Value>) -> Option<ResourceEmbed> {
    match value? {
        Value::Null => None,
        other => ResourceEmbed::from_value(other),
    }
}

/// Normalize stored attachments, dropping every entry that is not a plain
/// object with a non-empty `label` and `url`.
pub fn normalize_attachments(value: Option<&Value>) -> Vec<ResourceAttachment> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let label = coerce_text(obj.get("label"))?;
            let url = coerce_text(obj.get("url"))?;
            Some(ResourceAttachment { label, url })
        })
        .collect()
}

/// Normalize stored tags; only list-shaped values survive, and only their
/// string elements.
pub fn normalize_tags(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        let embed = normalize_embed(row.embed.as_ref());
        if embed.is_none() && row.embed.as_ref().is_some_and(|v| !v.is_null()) {
            debug!(slug = %row.slug, "dropping malformed embed");
        }

        let attachments = normalize_attachments(row.attachments.as_ref());
        let stored_attachments = row
            .attachments
            .as_ref()
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if attachments.len() < stored_attachments {
            debug!(
                slug = %row.slug,
                dropped = stored_attachments - attachments.len(),
                "dropping malformed attachments"
            );
        }

        Self {
            id: row.id,
            tags: normalize_tags(row.tags.as_ref()),
            attachments,
            embed,
            embed_placement: EmbedPlacement::from_stored(row.embed_placement.as_deref()),
            body_html: row.body_html.unwrap_or_default(),
            slug: row.slug,
            title: row.title,
            kind: row.kind,
            published_on: row.published_on,
            summary: row.summary,
            location: row.location,
            is_published: row.is_published,
            cover_image_url: row.cover_image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Resource {
    /// Sanitized markup for an `html` embed, `None` for other variants.
    pub fn sanitized_embed_html(&self) -> Option<String> {
        match &self.embed {
            Some(ResourceEmbed::Html { html }) => Some(sanitize_embed_html(html)),
            _ => None,
        }
    }

    /// Sanitized body markup.
    pub fn sanitized_body_html(&self) -> String {
        sanitize_embed_html(&self.body_html)
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}
