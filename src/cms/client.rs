//! Prismic API client

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::error::{CmsError, CmsResult};
use super::query::Query;
use super::types::{ApiInfo, Document, SearchResponse};
use crate::config::PrismicConfig;
use crate::preview::PreviewMode;

/// Read access to a headless CMS repository
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Run a predicate query and return one page of results
    async fn query(&self, query: &Query) -> CmsResult<SearchResponse>;

    /// Follow a `next_page` cursor returned by a previous query
    async fn fetch_page(&self, cursor: &str) -> CmsResult<SearchResponse>;

    /// Forget any cached view of the published content
    async fn refresh(&self) -> CmsResult<()> {
        Ok(())
    }
}

/// Convenience lookups built on [`CmsClient::query`]
#[async_trait]
pub trait CmsClientExt: CmsClient {
    /// Fetch the document of `doc_type` whose uid is `uid`
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        preview: &PreviewMode,
    ) -> CmsResult<Document> {
        let query = Query::by_uid(doc_type, uid).page_size(1).preview(preview);
        first_result(self.query(&query).await?, uid)
    }

    /// Fetch a document by its id
    async fn get_by_id(&self, id: &str, preview: &PreviewMode) -> CmsResult<Document> {
        let query = Query::by_id(id).page_size(1).preview(preview);
        first_result(self.query(&query).await?, id)
    }
}

impl<T: CmsClient + ?Sized> CmsClientExt for T {}

fn first_result(response: SearchResponse, key: &str) -> CmsResult<Document> {
    response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| CmsError::NotFound(key.to_string()))
}

/// reqwest-backed client for the Prismic REST API v2
///
/// The master ref moves on every publish, so it is cached for `ref_ttl` only.
pub struct PrismicClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
    ref_ttl: Duration,
    master_ref: Mutex<Option<(String, Instant)>>,
}

impl fmt::Debug for PrismicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrismicClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("ref_ttl", &self.ref_ttl)
            .finish_non_exhaustive()
    }
}

impl PrismicClient {
    /// Create a client from repository settings
    pub fn new(config: &PrismicConfig) -> CmsResult<Self> {
        let endpoint = Url::parse(config.endpoint.trim()).map_err(|e| CmsError::InvalidUrl {
            url: config.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("prismic-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            ref_ttl: Duration::from_secs(config.ref_ttl_secs),
            master_ref: Mutex::new(None),
        })
    }

    /// The master ref, re-read from the API root once the cached one is older than `ref_ttl`
    pub async fn master_ref(&self) -> CmsResult<String> {
        let mut cached = self.master_ref.lock().await;
        if let Some((master, fetched_at)) = cached.as_ref() {
            if fetched_at.elapsed() < self.ref_ttl {
                return Ok(master.clone());
            }
        }

        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        let info: ApiInfo = self.get_json(url).await?;
        let master = info
            .master_ref()
            .ok_or(CmsError::MissingMasterRef)?
            .to_string();
        tracing::debug!("Resolved master ref {}", master);

        *cached = Some((master.clone(), Instant::now()));
        Ok(master)
    }

    /// Resolve a cursor against the endpoint, refusing foreign hosts
    fn resolve_cursor(&self, cursor: &str) -> CmsResult<Url> {
        let mut url = self
            .endpoint
            .join(cursor)
            .map_err(|e| CmsError::InvalidUrl {
                url: cursor.to_string(),
                reason: e.to_string(),
            })?;

        if url.host_str() != self.endpoint.host_str() {
            return Err(CmsError::InvalidUrl {
                url: cursor.to_string(),
                reason: "cursor points outside the CMS repository".to_string(),
            });
        }

        if let Some(token) = &self.access_token {
            if !url.query_pairs().any(|(k, _)| k == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }

        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> CmsResult<T> {
        tracing::debug!("GET {}", redact(&url));
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status,
                url: redact(&url),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CmsClient for PrismicClient {
    async fn query(&self, query: &Query) -> CmsResult<SearchResponse> {
        let reference = match query.preview.draft_ref() {
            Some(draft) => draft.to_string(),
            None => self.master_ref().await?,
        };
        let url = query.to_url(
            self.endpoint.as_str(),
            &reference,
            self.access_token.as_deref(),
        )?;
        self.get_json(url).await
    }

    async fn fetch_page(&self, cursor: &str) -> CmsResult<SearchResponse> {
        let url = self.resolve_cursor(cursor)?;
        self.get_json(url).await
    }

    async fn refresh(&self) -> CmsResult<()> {
        self.master_ref.lock().await.take();
        Ok(())
    }
}

/// URL without the access token, for logs and errors
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
