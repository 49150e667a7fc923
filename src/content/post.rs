//! Post models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::richtext::RichTextNode;
use crate::cms::{CmsResult, Document, SearchResponse};

/// A post as listed on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// URL-friendly identifier
    pub uid: String,

    /// First publication date (absent for never-published drafts)
    pub first_publication_date: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryFields {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    author: String,
}

impl PostSummary {
    /// Build a summary from a CMS document; documents without a uid have no page
    pub fn from_document(doc: &Document) -> CmsResult<Option<Self>> {
        let Some(uid) = doc.uid.clone() else {
            tracing::warn!("Skipping document {} without uid", doc.id);
            return Ok(None);
        };
        let fields: SummaryFields = if doc.data.is_null() {
            SummaryFields::default()
        } else {
            doc.data_as()?
        };

        Ok(Some(Self {
            uid,
            first_publication_date: doc.first_publication_date,
            title: fields.title,
            subtitle: fields.subtitle,
            author: fields.author,
        }))
    }

    /// Link target for this post
    pub fn path(&self) -> String {
        post_path(&self.uid)
    }
}

/// One batch of summaries plus the cursor to the next batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

impl PostPage {
    pub fn from_response(response: &SearchResponse) -> CmsResult<Self> {
        let mut results = Vec::with_capacity(response.results.len());
        for doc in &response.results {
            if let Some(summary) = PostSummary::from_document(doc)? {
                results.push(summary);
            }
        }
        Ok(Self {
            results,
            next_page: response.next_page.clone().filter(|n| !n.is_empty()),
        })
    }
}

/// Link to a neighbouring post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavPost {
    pub uid: String,
    pub title: String,
}

impl NavPost {
    pub fn path(&self) -> String {
        post_path(&self.uid)
    }
}

impl From<&PostSummary> for NavPost {
    fn from(summary: &PostSummary) -> Self {
        Self {
            uid: summary.uid.clone(),
            title: summary.title.clone(),
        }
    }
}

/// Banner image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A titled section of a post body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub body: Vec<RichTextNode>,
}

/// A full post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentBlock>,
    pub previous_post: Option<NavPost>,
    pub next_post: Option<NavPost>,
}

#[derive(Debug, Deserialize)]
struct DetailFields {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    banner: Option<Banner>,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

impl PostDetail {
    pub fn from_document(doc: &Document) -> CmsResult<Self> {
        let fields: DetailFields = doc.data_as()?;
        Ok(Self {
            uid: doc.uid.clone().unwrap_or_else(|| doc.id.clone()),
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date,
            title: fields.title,
            author: fields.author,
            banner: fields.banner.unwrap_or_default(),
            content: fields.content,
            previous_post: None,
            next_post: None,
        })
    }

    /// Attach neighbour links
    pub fn with_neighbours(mut self, previous: Option<NavPost>, next: Option<NavPost>) -> Self {
        self.previous_post = previous;
        self.next_post = next;
        self
    }

    /// Whether the post changed after its first publication
    pub fn was_edited(&self) -> bool {
        match (self.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) => first != last,
            _ => false,
        }
    }

    pub fn path(&self) -> String {
        post_path(&self.uid)
    }
}

/// `/post/<uid>/`
pub fn post_path(uid: &str) -> String {
    format!("/post/{}/", uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: serde_json::Value) -> Document {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_summary_from_document() {
        let d = doc(serde_json::json!({
            "id": "1",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {
                "title": "Como utilizar Hooks",
                "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                "author": "Joseph Oliveira"
            }
        }));
        let summary = PostSummary::from_document(&d).unwrap().unwrap();
        assert_eq!(summary.uid, "como-utilizar-hooks");
        assert_eq!(summary.author, "Joseph Oliveira");
        assert!(summary.first_publication_date.is_some());
        assert_eq!(summary.path(), "/post/como-utilizar-hooks/");
    }

    #[test]
    fn test_summary_without_uid_is_skipped() {
        let d = doc(serde_json::json!({"id": "1", "data": {"title": "x"}}));
        assert!(PostSummary::from_document(&d).unwrap().is_none());
    }

    #[test]
    fn test_page_from_response_keeps_order_and_cursor() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "results": [
                {"id": "1", "uid": "b", "data": {"title": "B"}},
                {"id": "2", "data": {"title": "no uid"}},
                {"id": "3", "uid": "a", "data": {"title": "A"}}
            ]
        }))
        .unwrap();
        let page = PostPage::from_response(&response).unwrap();
        let uids: Vec<_> = page.results.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, vec!["b", "a"]);
        assert!(page.next_page.is_some());
    }

    #[test]
    fn test_detail_from_document() {
        let d = doc(serde_json::json!({
            "id": "1",
            "uid": "criando-um-app-cra-do-zero",
            "first_publication_date": "2021-03-25T19:27:35+0000",
            "last_publication_date": "2021-03-26T10:01:00+0000",
            "data": {
                "title": "Criando um app CRA do zero",
                "author": "Danilo Vieira",
                "banner": {"url": "https://images.prismic.io/banner.png", "alt": null},
                "content": [{
                    "heading": "Proin et varius",
                    "body": [{"type": "paragraph", "text": "Lorem ipsum", "spans": []}]
                }]
            }
        }));
        let detail = PostDetail::from_document(&d).unwrap();
        assert_eq!(detail.title, "Criando um app CRA do zero");
        assert_eq!(
            detail.banner.url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(detail.content.len(), 1);
        assert_eq!(detail.content[0].body[0].text, "Lorem ipsum");
        assert!(detail.was_edited());
    }

    #[test]
    fn test_not_edited_when_dates_match() {
        let d = doc(serde_json::json!({
            "id": "1",
            "uid": "x",
            "first_publication_date": "2021-03-25T19:27:35+0000",
            "last_publication_date": "2021-03-25T19:27:35+0000",
            "data": {}
        }));
        let detail = PostDetail::from_document(&d).unwrap();
        assert!(!detail.was_edited());
        assert!(detail.content.is_empty());
        assert_eq!(detail.banner, Banner::default());
    }
}
