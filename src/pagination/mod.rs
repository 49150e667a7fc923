//! Incremental post list ("load more")
//!
//! [`PostList`] owns the summaries loaded so far and the CMS cursor to the
//! next batch. A load is split into `begin_load` / `finish_load` so callers
//! sharing a list behind a lock never hold it across the network fetch; the
//! in-flight flag makes a second `begin_load` a no-op until the first ends.

use serde::Serialize;
use std::collections::HashSet;

use crate::cms::{CmsClient, CmsError, CmsResult};
use crate::content::{PostPage, PostSummary};

/// Result of a `load_more` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// A batch of `n` posts was appended
    Appended(usize),
    /// No cursor left, nothing was fetched
    Exhausted,
    /// Another load is still running, nothing was fetched
    InFlight,
}

/// Accumulated post summaries plus the cursor to the next batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostList {
    results: Vec<PostSummary>,
    next_page: Option<String>,
    #[serde(skip)]
    loading: bool,
}

impl PostList {
    /// Seed the list with the first batch
    pub fn from_page(page: PostPage) -> Self {
        Self {
            results: page.results,
            next_page: page.next_page,
            loading: false,
        }
    }

    /// An empty list that continues from `cursor`
    pub fn resume(cursor: &str) -> Self {
        Self {
            results: Vec::new(),
            next_page: Some(cursor.to_string()),
            loading: false,
        }
    }

    pub fn results(&self) -> &[PostSummary] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PostSummary> {
        self.results
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether the "load more" control should be offered
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Claim the cursor for a fetch; `None` when exhausted or already loading
    pub fn begin_load(&mut self) -> Option<String> {
        if self.loading {
            return None;
        }
        let cursor = self.next_page.clone()?;
        self.loading = true;
        Some(cursor)
    }

    /// Append a fetched batch and advance the cursor. Returns the batch size.
    pub fn finish_load(&mut self, page: PostPage) -> usize {
        let added = page.results.len();
        self.results.extend(page.results);
        self.next_page = page.next_page;
        self.loading = false;
        added
    }

    /// Give up on a failed fetch; results and cursor stay as they were
    pub fn abort_load(&mut self) {
        self.loading = false;
    }

    /// Fetch the next batch and append it
    pub async fn load_more(&mut self, client: &dyn CmsClient) -> CmsResult<LoadMore> {
        let Some(cursor) = self.begin_load() else {
            return Ok(if self.loading {
                LoadMore::InFlight
            } else {
                LoadMore::Exhausted
            });
        };

        let fetched = match client.fetch_page(&cursor).await {
            Ok(response) => PostPage::from_response(&response),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(page) => {
                let added = self.finish_load(page);
                tracing::debug!("Loaded {} more posts ({} total)", added, self.len());
                Ok(LoadMore::Appended(added))
            }
            Err(e) => {
                self.abort_load();
                Err(e)
            }
        }
    }

    /// Follow the cursor until the listing is exhausted
    ///
    /// A cursor seen twice is an error. An empty batch that still carries a
    /// cursor ends the walk.
    pub async fn load_all(&mut self, client: &dyn CmsClient) -> CmsResult<usize> {
        let start = self.len();
        let mut followed = HashSet::new();

        loop {
            if let Some(cursor) = self.next_page() {
                if !followed.insert(cursor.to_string()) {
                    return Err(CmsError::CursorLoop(cursor.to_string()));
                }
            }
            match self.load_more(client).await? {
                LoadMore::Appended(0) if self.has_more() => {
                    tracing::warn!("CMS returned an empty page with a cursor, stopping");
                    break;
                }
                LoadMore::Appended(_) => {}
                LoadMore::Exhausted | LoadMore::InFlight => break,
            }
        }

        Ok(self.len() - start)
    }
}
