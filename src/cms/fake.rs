//! In-memory and in-process CMS doubles used by unit tests

use async_trait::async_trait;
use axum::extract::{Query as Params, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{CmsClient, CmsError, CmsResult, Predicate, Query, SearchResponse};

/// Serves a fixed document set, paginated through `/page/<n>?size=<s>` cursors
pub struct FakeCms {
    documents: Mutex<Vec<serde_json::Value>>,
    refs: Mutex<Vec<Option<String>>>,
    offline: AtomicBool,
}

impl FakeCms {
    pub fn new(documents: Vec<serde_json::Value>) -> Self {
        Self {
            documents: Mutex::new(documents),
            refs: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// A published post document
    pub fn post(uid: &str, title: &str, published: &str) -> serde_json::Value {
        serde_json::json!({
            "id": format!("id-{}", uid),
            "uid": uid,
            "type": "posts",
            "first_publication_date": published,
            "last_publication_date": published,
            "data": {
                "title": title,
                "subtitle": format!("About {}", title),
                "author": "Ana",
                "banner": {"url": null, "alt": null},
                "content": [{
                    "heading": "Intro",
                    "body": [{"type": "paragraph", "text": "Lorem ipsum", "spans": []}]
                }]
            }
        })
    }

    pub fn push(&self, document: serde_json::Value) {
        self.documents.lock().unwrap().push(document);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Draft refs seen by `query`, `None` for published reads
    pub fn refs(&self) -> Vec<Option<String>> {
        self.refs.lock().unwrap().clone()
    }

    fn check_online(&self) -> CmsResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CmsError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                url: "fake".to_string(),
            });
        }
        Ok(())
    }

    fn page(&self, matching: Vec<serde_json::Value>, page: usize, size: usize) -> SearchResponse {
        let total = matching.len();
        let results = matching
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .collect::<Vec<_>>();
        let next_page = (page * size < total).then(|| format!("/page/{}?size={}", page + 1, size));
        serde_json::from_value(serde_json::json!({
            "page": page,
            "next_page": next_page,
            "results": results,
        }))
        .unwrap()
    }
}

fn matches(document: &serde_json::Value, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::At { path, value } => {
            let field = match path.as_str() {
                "document.type" => "type",
                "document.id" => "id",
                p if p.ends_with(".uid") => "uid",
                _ => return true,
            };
            document[field].as_str() == Some(value.as_str())
        }
    }
}

#[async_trait]
impl CmsClient for FakeCms {
    async fn query(&self, query: &Query) -> CmsResult<SearchResponse> {
        self.check_online()?;
        self.refs
            .lock()
            .unwrap()
            .push(query.preview.draft_ref().map(String::from));

        let matching: Vec<_> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| query.predicates.iter().all(|p| matches(d, p)))
            .cloned()
            .collect();
        Ok(self.page(matching, 1, query.page_size.unwrap_or(20)))
    }

    async fn fetch_page(&self, cursor: &str) -> CmsResult<SearchResponse> {
        self.check_online()?;
        let parsed = cursor
            .strip_prefix("/page/")
            .and_then(|rest| rest.split_once("?size="))
            .and_then(|(page, size)| Some((page.parse().ok()?, size.parse().ok()?)));
        let Some((page, size)) = parsed else {
            return Err(CmsError::NotFound(cursor.to_string()));
        };
        let all = self.documents.lock().unwrap().clone();
        Ok(self.page(all, page, size))
    }
}

/// Prismic-compatible HTTP repository; every publish moves the master ref
#[derive(Clone, Default)]
pub struct FakeRepository {
    releases: Arc<Mutex<Vec<Vec<serde_json::Value>>>>,
    root_reads: Arc<AtomicUsize>,
}

impl FakeRepository {
    pub fn new(documents: Vec<serde_json::Value>) -> Self {
        let repository = Self::default();
        repository.releases.lock().unwrap().push(documents);
        repository
    }

    /// Publish a document under a new master ref
    pub fn publish(&self, document: serde_json::Value) {
        let mut releases = self.releases.lock().unwrap();
        let mut next = releases.last().cloned().unwrap_or_default();
        next.push(document);
        releases.push(next);
    }

    pub fn master_ref(&self) -> String {
        format!("MASTER{}", self.releases.lock().unwrap().len())
    }

    /// Times the API root was read
    pub fn root_reads(&self) -> usize {
        self.root_reads.load(Ordering::SeqCst)
    }

    /// Serve on an ephemeral port and return the API endpoint
    pub async fn serve(self) -> String {
        let app = Router::new()
            .route("/api/v2", get(api_root))
            .route("/api/v2/documents/search", get(search))
            .with_state(self);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v2", addr)
    }

    fn release(&self, reference: &str) -> Option<Vec<serde_json::Value>> {
        let index: usize = reference.strip_prefix("MASTER")?.parse().ok()?;
        let releases = self.releases.lock().unwrap();
        index.checked_sub(1).and_then(|i| releases.get(i)).cloned()
    }
}

async fn api_root(State(repository): State<FakeRepository>) -> Json<serde_json::Value> {
    repository.root_reads.fetch_add(1, Ordering::SeqCst);
    Json(serde_json::json!({
        "refs": [{"ref": repository.master_ref(), "isMasterRef": true}]
    }))
}

async fn search(
    State(repository): State<FakeRepository>,
    Params(params): Params<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let reference = params.get("ref").map(String::as_str).unwrap_or_default();
    let documents = repository.release(reference).ok_or(StatusCode::NOT_FOUND)?;

    let q = params.get("q").map(String::as_str).unwrap_or_default();
    let results: Vec<_> = documents
        .into_iter()
        .filter(|d| {
            let uid = d["uid"].as_str().unwrap_or_default();
            !q.contains(".uid") || q.contains(&format!("\"{}\"", uid))
        })
        .collect();

    Ok(Json(serde_json::json!({
        "page": 1,
        "next_page": null,
        "results": results,
    })))
}
