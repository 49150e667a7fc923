//! Build-time enumeration of post pages

use std::cmp::Ordering;

use crate::cms::{CmsClient, CmsResult, Query};
use crate::config::PrismicConfig;
use crate::content::{NavPost, PostPage, PostSummary};
use crate::pagination::PostList;
use crate::preview::PreviewMode;

/// Every post known at build time, oldest first
#[derive(Debug, Clone, Default)]
pub struct StaticPaths {
    posts: Vec<PostSummary>,
    /// Unknown uids are resolved on demand by the server
    pub fallback: bool,
}

impl StaticPaths {
    /// Wrap an already fetched listing
    pub fn from_posts(mut posts: Vec<PostSummary>) -> Self {
        // Stable sort: equal dates keep CMS order
        posts.sort_by(|a, b| chronological(a, b));
        Self {
            posts,
            fallback: true,
        }
    }

    /// Fetch the full listing, following `next_page` until exhausted
    pub async fn resolve(
        client: &dyn CmsClient,
        config: &PrismicConfig,
        preview: &PreviewMode,
    ) -> CmsResult<Self> {
        let query = Query::documents(&config.document_type)
            .fetch(config.summary_fields())
            .page_size(config.paths_page_size)
            .preview(preview);

        let first = PostPage::from_response(&client.query(&query).await?)?;
        let mut list = PostList::from_page(first);
        list.load_all(client).await?;

        tracing::info!("Found {} posts", list.len());
        Ok(Self::from_posts(list.into_results()))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.posts.iter().map(|p| p.uid.as_str())
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.uids().any(|u| u == uid)
    }

    /// Older and newer neighbours of `uid`
    pub fn adjacent(&self, uid: &str) -> (Option<NavPost>, Option<NavPost>) {
        let Some(index) = self.posts.iter().position(|p| p.uid == uid) else {
            return (None, None);
        };
        let previous = index
            .checked_sub(1)
            .and_then(|i| self.posts.get(i))
            .map(NavPost::from);
        let next = self.posts.get(index + 1).map(NavPost::from);
        (previous, next)
    }
}

/// Ascending by first publication; undated posts go last
fn chronological(a: &PostSummary, b: &PostSummary) -> Ordering {
    match (a.first_publication_date, b.first_publication_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
