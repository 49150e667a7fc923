//! Predicate queries against `/documents/search`

use reqwest::Url;

use super::error::{CmsError, CmsResult};
use crate::preview::PreviewMode;

/// Largest page size the Prismic API accepts
pub const MAX_PAGE_SIZE: usize = 100;

/// A single Prismic predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `[at(path, "value")]`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    fn render(&self) -> String {
        match self {
            Predicate::At { path, value } => format!("[at({}, {})]", path, quote(value)),
        }
    }
}

/// Document search query
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    /// Field projection hints (`type.field`)
    pub fetch: Vec<String>,
    pub page_size: Option<usize>,
    pub preview: PreviewMode,
}

impl Query {
    /// All documents of a custom type
    pub fn documents(doc_type: &str) -> Self {
        Self::default().predicate(Predicate::at("document.type", doc_type))
    }

    /// The document of `doc_type` with the given uid
    pub fn by_uid(doc_type: &str, uid: &str) -> Self {
        Self::default().predicate(Predicate::at(&format!("my.{}.uid", doc_type), uid))
    }

    /// The document with the given id, whatever its type
    pub fn by_id(id: &str) -> Self {
        Self::default().predicate(Predicate::at("document.id", id))
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.clamp(1, MAX_PAGE_SIZE));
        self
    }

    pub fn preview(mut self, preview: &PreviewMode) -> Self {
        self.preview = preview.clone();
        self
    }

    /// The `q` parameter, e.g. `[[at(document.type, "posts")]]`
    pub fn predicates_param(&self) -> String {
        let inner: String = self.predicates.iter().map(Predicate::render).collect();
        format!("[{}]", inner)
    }

    /// Full search URL for the given endpoint and ref
    pub fn to_url(
        &self,
        endpoint: &str,
        reference: &str,
        access_token: Option<&str>,
    ) -> CmsResult<Url> {
        let base = format!("{}/documents/search", endpoint.trim_end_matches('/'));
        let mut url = Url::parse(&base).map_err(|e| CmsError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", reference);
            if !self.predicates.is_empty() {
                pairs.append_pair("q", &self.predicates_param());
            }
            if !self.fetch.is_empty() {
                pairs.append_pair("fetch", &self.fetch.join(","));
            }
            if let Some(size) = self.page_size {
                pairs.append_pair("pageSize", &size.to_string());
            }
            if let Some(token) = access_token {
                pairs.append_pair("access_token", token);
            }
        }

        Ok(url)
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
