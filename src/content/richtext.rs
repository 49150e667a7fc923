//! Prismic structured text rendering
//!
//! Structured text arrives as a flat list of block nodes (`paragraph`,
//! `heading2`, `list-item`, ...) whose inline formatting is described by
//! `spans` holding UTF-16 offsets into the node text.

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// One block of structured text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Image nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Embed nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<serde_json::Value>,
}

impl RichTextNode {
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.to_string(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    fn is_textual(&self) -> bool {
        !matches!(self.kind.as_str(), "image" | "embed")
    }
}

/// Inline formatting over `start..end` (UTF-16 code units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

/// Link or label payload of a span
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Plain text of all textual nodes, joined by a single space
pub fn as_text(nodes: &[RichTextNode]) -> String {
    nodes
        .iter()
        .filter(|n| n.is_textual())
        .map(|n| n.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// HTML markup for structured text
pub fn as_html(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    let mut open_list: Option<&'static str> = None;

    for node in nodes {
        let list_tag = match node.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                out.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        out.push_str(&render_node(node));
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{}>", tag));
    }

    out
}

fn render_node(node: &RichTextNode) -> String {
    let inner = || render_spans(&node.text, &node.spans);
    match node.kind.as_str() {
        "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
            let level = &node.kind["heading".len()..];
            format!("<h{}>{}</h{}>", level, inner(), level)
        }
        "preformatted" => format!("<pre>{}</pre>", inner()),
        "list-item" | "o-list-item" => format!("<li>{}</li>", inner()),
        "image" => format!(
            r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
            html_escape(node.url.as_deref().unwrap_or("")),
            html_escape(node.alt.as_deref().unwrap_or(""))
        ),
        "embed" => {
            let oembed = node.oembed.as_ref();
            let html = oembed
                .and_then(|o| o.get("html"))
                .and_then(|h| h.as_str())
                .unwrap_or("");
            let provider = oembed
                .and_then(|o| o.get("provider_name"))
                .and_then(|p| p.as_str())
                .unwrap_or("");
            let embed_url = oembed
                .and_then(|o| o.get("embed_url"))
                .and_then(|u| u.as_str())
                .unwrap_or("");
            format!(
                r#"<div data-oembed="{}" data-oembed-provider="{}">{}</div>"#,
                html_escape(embed_url),
                html_escape(&provider.to_lowercase()),
                html
            )
        }
        _ => format!("<p>{}</p>", inner()),
    }
}

/// Apply inline spans to text, escaping the text itself
fn render_spans(text: &str, spans: &[Span]) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let len = units.len();

    let mut spans: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len)
        .collect();
    // Outer spans first so tags nest
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut bounds: Vec<usize> = vec![0, len];
    for span in &spans {
        bounds.push(span.start);
        bounds.push(span.end.min(len));
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut out = String::new();
    for window in bounds.windows(2) {
        let (from, to) = (window[0], window[1]);
        let segment = String::from_utf16_lossy(&units[from..to]);
        let active: Vec<&Span> = spans
            .iter()
            .copied()
            .filter(|s| s.start <= from && s.end >= to)
            .collect();

        for span in &active {
            out.push_str(&open_tag(span));
        }
        out.push_str(&html_escape(&segment).replace('\n', "<br />"));
        for span in active.iter().rev() {
            out.push_str(close_tag(span));
        }
    }

    out
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let href = match data.link_type.as_deref() {
                Some("Document") => data
                    .uid
                    .as_deref()
                    .map(super::post_path)
                    .unwrap_or_else(|| "#".to_string()),
                _ => data.url.clone().unwrap_or_else(|| "#".to_string()),
            };
            let target = match data.target.as_deref() {
                Some(t) => format!(r#" target="{}" rel="noopener""#, html_escape(t)),
                None => String::new(),
            };
            format!(r#"<a href="{}"{}>"#, html_escape(&href), target)
        }
        "label" => format!(
            r#"<span class="{}">"#,
            html_escape(data.label.as_deref().unwrap_or(""))
        ),
        _ => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}
