//! Home page pagination against a canned CMS

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use prismic_blog::cms::{CmsClient, CmsError, CmsResult, Query, SearchResponse};
use prismic_blog::config::SiteConfig;
use prismic_blog::generator::Generator;
use prismic_blog::pagination::LoadMore;
use prismic_blog::preview::PreviewMode;
use prismic_blog::Blog;

/// First query returns three posts and `/p2`; `/p2` returns two more and ends
struct MockCms {
    cursors: Mutex<Vec<String>>,
}

fn page(uids: &[&str], next_page: Option<&str>) -> SearchResponse {
    let results: Vec<serde_json::Value> = uids
        .iter()
        .map(|uid| {
            serde_json::json!({
                "id": uid,
                "uid": uid,
                "type": "posts",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "data": {"title": uid, "subtitle": "", "author": "Ana"}
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({
        "next_page": next_page,
        "results": results
    }))
    .unwrap()
}

#[async_trait]
impl CmsClient for MockCms {
    async fn query(&self, _query: &Query) -> CmsResult<SearchResponse> {
        Ok(page(&["one", "two", "three"], Some("/p2")))
    }

    async fn fetch_page(&self, cursor: &str) -> CmsResult<SearchResponse> {
        self.cursors.lock().unwrap().push(cursor.to_string());
        match cursor {
            "/p2" => Ok(page(&["four", "five"], None)),
            _ => Err(CmsError::NotFound(cursor.to_string())),
        }
    }
}

#[tokio::test]
async fn load_more_appends_and_hides_control() {
    let dir = tempfile::tempdir().unwrap();
    let blog = Blog::with_config(dir.path(), SiteConfig::default());
    let cms = Arc::new(MockCms {
        cursors: Mutex::new(Vec::new()),
    });
    let generator = Generator::new(&blog, cms.clone()).unwrap();
    let preview = PreviewMode::Published;

    let mut list = generator.first_page(&preview).await.unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.has_more());

    let html = generator.render_home(&list, &preview).unwrap();
    assert!(html.contains(r#"id="load-more""#));
    assert!(html.contains("/api/posts?cursor=%2Fp2"));

    let outcome = list.load_more(cms.as_ref()).await.unwrap();
    assert_eq!(outcome, LoadMore::Appended(2));
    assert_eq!(list.len(), 5);
    assert!(!list.has_more());

    let uids: Vec<_> = list.results().iter().map(|p| p.uid.as_str()).collect();
    assert_eq!(uids, vec!["one", "two", "three", "four", "five"]);

    let html = generator.render_home(&list, &preview).unwrap();
    assert!(!html.contains(r#"id="load-more""#));
    assert_eq!(html.matches(r#"class="post-item""#).count(), 5);

    // Exhausted: no further request reaches the CMS
    assert_eq!(list.load_more(cms.as_ref()).await.unwrap(), LoadMore::Exhausted);
    assert_eq!(*cms.cursors.lock().unwrap(), vec!["/p2".to_string()]);
}
