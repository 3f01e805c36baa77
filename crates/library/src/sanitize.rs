//! Embed HTML sanitizer.
//!
//! Staff-authored markup (the `html` embed variant and resource bodies) runs
//! through a fixed pipeline before it reaches a browser:
//! - allowlist: ammonia's conservative tag set plus `iframe`, with per-tag
//!   attribute lists and http/https/mailto URL schemes
//! - iframe host rewrite: frames on unknown hosts become empty placeholders
//! - iframe host filter: any frame still failing the host gate is removed
//! - defaults: lazy loading and a referrer policy on frames, `rel`/`target`
//!   on links, unless the author set them
//!
//! The stages after the allowlist re-parse the markup with `scraper` and
//! serialize the tree themselves, escaping every attribute value and text
//! node. They never edit serialized HTML in place.
//!
//! Every stage is infallible. Anything that fails to parse is treated as
//! unsafe and dropped.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::Builder;
use scraper::{ElementRef, Html, Node};
use tracing::debug;
use url::Url;

use crate::hosts::{is_allowed_embed_host, url_host};

/// Attributes an `iframe` may carry.
const IFRAME_ATTRIBUTES: &[&str] = &[
    "src",
    "title",
    "allow",
    "allowfullscreen",
    "loading",
    "referrerpolicy",
];

/// Attributes an anchor may carry.
const ANCHOR_ATTRIBUTES: &[&str] = &["href", "title", "rel", "target"];

/// Schemes allowed in any URL attribute. Frames are narrowed to http(s).
const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

const IFRAME_DEFAULTS: &[(&str, &str)] = &[
    ("loading", "lazy"),
    ("referrerpolicy", "no-referrer-when-downgrade"),
];

const ANCHOR_DEFAULTS: &[(&str, &str)] = &[("rel", "noopener noreferrer"), ("target", "_blank")];

/// Elements serialized without content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// One stage of the sanitizer pipeline.
pub trait HtmlFilter: Send + Sync {
    /// Stage name for debugging.
    fn name(&self) -> &str;

    /// Process the input markup and return the filtered output.
    fn process(&self, input: &str) -> String;
}

/// Pipeline of HTML filters applied in sequence.
pub struct FilterPipeline {
    filters: Vec<Box<dyn HtmlFilter>>,
}

impl FilterPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add<F: HtmlFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// The embed sanitizer pipeline.
    pub fn embed() -> Self {
        Self::new()
            .add(AllowlistFilter)
            .add(IframeHostRewrite)
            .add(IframeHostFilter)
            .add(IframeDefaults)
            .add(AnchorDefaults)
    }

    /// Names of the stages, in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Process markup through all filters in the pipeline.
    pub fn process(&self, input: &str) -> String {
        self.filters
            .iter()
            .fold(input.to_string(), |acc, filter| filter.process(&acc))
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::embed()
    }
}

static EMBED_PIPELINE: LazyLock<FilterPipeline> = LazyLock::new(FilterPipeline::embed);

/// Sanitize staff-authored HTML for rendering.
pub fn sanitize_embed_html(html: &str) -> String {
    EMBED_PIPELINE.process(html)
}

/// Whether a frame source passes the host gate: http(s) on an allowed host.
///
/// Unparseable sources have an empty host and fail.
pub fn is_allowed_frame_src(src: &str) -> bool {
    let Ok(url) = Url::parse(src) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(is_allowed_embed_host)
}

static ALLOWLIST: LazyLock<Builder<'static>> = LazyLock::new(AllowlistFilter::builder);

/// Tag/attribute/scheme allowlist, backed by ammonia.
pub struct AllowlistFilter;

impl AllowlistFilter {
    fn builder() -> Builder<'static> {
        let mut builder = Builder::default();
        builder
            .add_tags(&["iframe"])
            .generic_attributes(HashSet::new())
            .add_tag_attributes("iframe", IFRAME_ATTRIBUTES)
            .rm_tag_attributes("a", &["hreflang"])
            .add_tag_attributes("a", ANCHOR_ATTRIBUTES)
            .link_rel(None)
            .url_schemes(URL_SCHEMES.iter().copied().collect())
            .attribute_filter(filter_attribute);
        builder
    }
}

/// Drop frame sources that are not http(s) or fail the host gate.
fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if element == "iframe" && attribute == "src" && !is_allowed_frame_src(value) {
        return None;
    }
    Some(Cow::Borrowed(value))
}

impl HtmlFilter for AllowlistFilter {
    fn name(&self) -> &str {
        "allowlist"
    }

    fn process(&self, input: &str) -> String {
        ALLOWLIST.clean(input).to_string()
    }
}

/// Rewrites frames whose source fails the host gate to an empty placeholder.
pub struct IframeHostRewrite;

impl HtmlFilter for IframeHostRewrite {
    fn name(&self) -> &str {
        "iframe_host_rewrite"
    }

    fn process(&self, input: &str) -> String {
        rewrite_fragment(input, &|name: &str, attrs: &[(String, String)]| {
            if name == "iframe" && !frame_passes_gate(attrs) {
                Rewrite::Attributes(Vec::new())
            } else {
                Rewrite::Keep
            }
        })
    }
}

/// Removes every frame that fails the host gate, placeholders included.
pub struct IframeHostFilter;

impl HtmlFilter for IframeHostFilter {
    fn name(&self) -> &str {
        "iframe_host_filter"
    }

    fn process(&self, input: &str) -> String {
        rewrite_fragment(input, &|name: &str, attrs: &[(String, String)]| {
            if name != "iframe" || frame_passes_gate(attrs) {
                return Rewrite::Keep;
            }
            let host = frame_src(attrs).map(url_host).unwrap_or_default();
            debug!(host = %host, "dropping iframe with disallowed source");
            Rewrite::Drop
        })
    }
}

/// Adds `loading` and `referrerpolicy` to frames that lack them.
pub struct IframeDefaults;

impl HtmlFilter for IframeDefaults {
    fn name(&self) -> &str {
        "iframe_defaults"
    }

    fn process(&self, input: &str) -> String {
        rewrite_fragment(input, &|name: &str, attrs: &[(String, String)]| match name {
            "iframe" => Rewrite::Attributes(with_defaults(attrs, IFRAME_DEFAULTS)),
            _ => Rewrite::Keep,
        })
    }
}

/// Adds `rel` and `target` to anchors that lack them.
pub struct AnchorDefaults;

impl HtmlFilter for AnchorDefaults {
    fn name(&self) -> &str {
        "anchor_defaults"
    }

    fn process(&self, input: &str) -> String {
        rewrite_fragment(input, &|name: &str, attrs: &[(String, String)]| match name {
            "a" => Rewrite::Attributes(with_defaults(attrs, ANCHOR_DEFAULTS)),
            _ => Rewrite::Keep,
        })
    }
}

type Attributes = Vec<(String, String)>;

/// What a tree stage does with one element.
enum Rewrite {
    Keep,
    /// Keep the element with these attributes instead.
    Attributes(Attributes),
    /// Remove the element and its content.
    Drop,
}

/// Parse `input` as a body fragment, apply `rewrite` to every element and
/// serialize the result.
fn rewrite_fragment(
    input: &str,
    rewrite: &dyn Fn(&str, &[(String, String)]) -> Rewrite,
) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    write_children(fragment.root_element(), rewrite, &mut out);
    out
}

fn write_children(
    parent: ElementRef<'_>,
    rewrite: &dyn Fn(&str, &[(String, String)]) -> Rewrite,
    out: &mut String,
) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    write_element(element, rewrite, out);
                }
            }
            // Comments and the like never survive the allowlist.
            _ => {}
        }
    }
}

fn write_element(
    element: ElementRef<'_>,
    rewrite: &dyn Fn(&str, &[(String, String)]) -> Rewrite,
    out: &mut String,
) {
    let name = element.value().name();
    let attrs: Attributes = element
        .value()
        .attrs()
        .filter(|(attr, _)| is_plain_attribute_name(attr))
        .map(|(attr, value)| (attr.to_string(), value.to_string()))
        .collect();

    let attrs = match rewrite(name, &attrs) {
        Rewrite::Keep => attrs,
        Rewrite::Attributes(replaced) => replaced,
        Rewrite::Drop => return,
    };

    out.push('<');
    out.push_str(name);
    for (attr, value) in &attrs {
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    // Frame content is never rendered.
    if name != "iframe" {
        write_children(element, rewrite, out);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn is_plain_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':'))
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

fn frame_src(attrs: &[(String, String)]) -> Option<&str> {
    attrs
        .iter()
        .find(|(name, _)| name == "src")
        .map(|(_, value)| value.as_str())
}

fn frame_passes_gate(attrs: &[(String, String)]) -> bool {
    frame_src(attrs).is_some_and(is_allowed_frame_src)
}

/// `attrs` plus every default whose name is not already present.
fn with_defaults(attrs: &[(String, String)], defaults: &[(&str, &str)]) -> Attributes {
    let mut merged = attrs.to_vec();
    for (name, value) in defaults {
        if !attrs.iter().any(|(existing, _)| existing == name) {
            merged.push((name.to_string(), value.to_string()));
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn drops_iframe_on_unknown_host() {
        let output = sanitize_embed_html(r#"<iframe src="https://evil.example.com/x"></iframe>"#);
        assert!(!output.contains("<iframe"), "got: {output}");
        assert!(!output.contains("evil.example.com"));
    }

    #[test]
    fn keeps_allowed_iframe_with_defaults() {
        let output =
            sanitize_embed_html(r#"<iframe src="https://www.youtube.com/embed/1"></iframe>"#);
        assert!(output.contains(r#"src="https://www.youtube.com/embed/1""#), "got: {output}");
        assert!(output.contains(r#"loading="lazy""#));
        assert!(output.contains(r#"referrerpolicy="no-referrer-when-downgrade""#));
    }

    #[test]
    fn keeps_author_frame_settings() {
        let output = sanitize_embed_html(
            r#"<iframe src="https://player.vimeo.com/video/9" loading="eager" referrerpolicy="origin" allowfullscreen></iframe>"#,
        );
        assert!(output.contains(r#"loading="eager""#), "got: {output}");
        assert!(output.contains(r#"referrerpolicy="origin""#));
        assert!(!output.contains("lazy"));
        assert!(output.contains("allowfullscreen"));
    }

    #[test]
    fn strips_disallowed_iframe_attributes() {
        let output = sanitize_embed_html(
            r#"<iframe src="https://docs.google.com/d/1" onload="alert(1)" style="x" width="600"></iframe>"#,
        );
        assert!(output.contains("docs.google.com"), "got: {output}");
        assert!(!output.contains("onload"));
        assert!(!output.contains("style"));
        assert!(!output.contains("width"));
    }

    #[test]
    fn drops_iframe_with_plain_http_on_unknown_host_and_bad_scheme() {
        let output = sanitize_embed_html(
            r#"<iframe src="javascript:alert(1)"></iframe><iframe src="data:text/html,hi"></iframe>"#,
        );
        assert!(!output.contains("<iframe"), "got: {output}");
    }

    #[test]
    fn drops_iframe_without_source() {
        let output = sanitize_embed_html(r#"<p>a</p><iframe title="empty"></iframe>"#);
        assert!(!output.contains("<iframe"), "got: {output}");
        assert!(output.contains("<p>a</p>"));
    }

    #[test]
    fn drops_iframe_with_malformed_source() {
        let output = sanitize_embed_html(r#"<iframe src="https://"></iframe>"#);
        assert!(!output.contains("<iframe"), "got: {output}");
    }

    #[test]
    fn removes_scripts_and_handlers() {
        let output = sanitize_embed_html(
            r#"<p onclick="x()">Safe</p><script>alert('xss')</script><img src="x.png" onerror="bad()">"#,
        );
        assert!(!output.contains("script"));
        assert!(!output.contains("onclick"));
        assert!(!output.contains("onerror"));
        assert!(output.contains("Safe"));
    }

    #[test]
    fn anchors_get_link_defaults() {
        let output = sanitize_embed_html(r#"<a href="https://example.org">Site</a>"#);
        assert!(output.contains(r#"rel="noopener noreferrer""#), "got: {output}");
        assert!(output.contains(r#"target="_blank""#));
    }

    #[test]
    fn anchors_keep_author_rel_and_target() {
        let output = sanitize_embed_html(
            r#"<a href="https://example.org" rel="nofollow" target="_self" title="t">Site</a>"#,
        );
        assert!(output.contains(r#"rel="nofollow""#), "got: {output}");
        assert!(output.contains(r#"target="_self""#));
        assert!(output.contains(r#"title="t""#));
        assert!(!output.contains("noopener"));
    }

    #[test]
    fn anchors_allow_mailto_but_not_javascript() {
        let mail = sanitize_embed_html(r#"<a href="mailto:desk@example.org">Mail</a>"#);
        assert!(mail.contains(r#"href="mailto:desk@example.org""#), "got: {mail}");

        let js = sanitize_embed_html(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!js.contains("javascript"), "got: {js}");
    }

    #[test]
    fn mailto_frame_source_is_rejected() {
        let output = sanitize_embed_html(r#"<iframe src="mailto:a@b.c"></iframe>"#);
        assert!(!output.contains("<iframe"), "got: {output}");
    }

    #[test]
    fn query_strings_survive_escaping() {
        let output = sanitize_embed_html(
            r#"<iframe src="https://www.youtube.com/embed/1?start=3&amp;rel=0"></iframe>"#,
        );
        assert!(output.contains("<iframe"), "got: {output}");
        assert!(output.contains("start=3&amp;rel=0"));
    }

    #[test]
    fn sanitizer_is_deterministic() {
        let input = r#"<h2>Title</h2><iframe src="https://vimeo.com/1"></iframe><a href="/x">x</a>"#;
        assert_eq!(sanitize_embed_html(input), sanitize_embed_html(input));
    }

    #[test]
    fn host_filter_removes_placeholders() {
        let output = IframeHostFilter.process("<p>x</p><iframe></iframe>");
        assert_eq!(output, "<p>x</p>");
    }

    #[test]
    fn host_rewrite_empties_unknown_frames() {
        let output = IframeHostRewrite
            .process(r#"<iframe src="https://evil.example.com/" title="t">inner</iframe>"#);
        assert_eq!(output, "<iframe></iframe>");
    }

    #[test]
    fn markup_inside_attribute_values_stays_inert() {
        let output =
            sanitize_embed_html(r#"<img src="x.png" alt="<a><script>alert(1)</script>">"#);
        assert!(!output.contains("<a"), "got: {output}");
        assert!(!output.contains("<script"), "got: {output}");
        assert!(!output.contains("noopener"), "got: {output}");
        assert!(output.contains("&lt;a&gt;"), "got: {output}");
    }

    #[test]
    fn frame_text_inside_attribute_does_not_swallow_markup() {
        let output = sanitize_embed_html(
            r#"<img src="x.png" alt="<iframe x>"><iframe src="https://www.youtube.com/embed/1"></iframe><p>after</p>"#,
        );
        assert_eq!(output.matches("<iframe").count(), 1, "got: {output}");
        assert!(output.contains(r#"src="https://www.youtube.com/embed/1""#), "got: {output}");
        assert!(output.contains(r#"loading="lazy""#), "got: {output}");
        assert!(output.contains("<p>after</p>"), "got: {output}");
        assert!(output.contains("&lt;iframe x&gt;"), "got: {output}");
    }

    #[test]
    fn quotes_and_angles_in_titles_are_escaped() {
        let output =
            sanitize_embed_html(r#"<a href="https://example.org" title='say "<a>" & go'>x</a>"#);
        assert_eq!(output.matches("<a ").count(), 1, "got: {output}");
        assert!(
            output.contains(r#"title="say &quot;&lt;a&gt;&quot; &amp; go""#),
            "got: {output}"
        );
        assert!(output.contains(r#"rel="noopener noreferrer""#), "got: {output}");
    }

    #[test]
    fn defaults_stage_escapes_values_it_reserializes() {
        let output = AnchorDefaults.process(r#"<img alt="&lt;a&gt;"><a href="/x">x</a>"#);
        assert!(output.contains(r#"alt="&lt;a&gt;""#), "got: {output}");
        assert_eq!(output.matches("<a ").count(), 1, "got: {output}");
        assert!(output.contains(r#"target="_blank""#), "got: {output}");
    }

    #[test]
    fn text_is_escaped_on_reserialize() {
        let output = IframeDefaults.process("<p>1 &lt; 2 &amp; 3</p>");
        assert_eq!(output, "<p>1 &lt; 2 &amp; 3</p>");
    }

    #[test]
    fn pipeline_stage_order() {
        assert_eq!(
            FilterPipeline::default().stage_names(),
            vec![
                "allowlist",
                "iframe_host_rewrite",
                "iframe_host_filter",
                "iframe_defaults",
                "anchor_defaults"
            ]
        );
    }

    #[test]
    fn frame_src_gate() {
        assert!(is_allowed_frame_src("https://www.youtube.com/embed/1"));
        assert!(is_allowed_frame_src("http://player.vimeo.com/video/1"));
        assert!(!is_allowed_frame_src("https://evil.example.com"));
        assert!(!is_allowed_frame_src("/relative/path"));
    }
}
