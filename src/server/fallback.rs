//! On-demand generation of posts that were not known at build time

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::FallbackConfig;
use crate::generator::{is_not_found, post_file, Generator};
use crate::preview::PreviewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    /// The CMS had no such post at this instant
    Missing(Instant),
}

/// What a request for an ungenerated post should get
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The caller owns the resolution and must start it
    Started,
    /// Someone else is already resolving this uid, or the registry is full
    Pending,
    /// The CMS recently reported no such post
    Missing,
}

/// At most one resolution per uid; remembers unknown uids for a while
pub struct FallbackRegistry {
    entries: Mutex<HashMap<String, Status>>,
    missing_ttl: Duration,
    capacity: usize,
}

impl FallbackRegistry {
    pub fn new(missing_ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            missing_ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(config: &FallbackConfig) -> Self {
        Self::new(
            Duration::from_secs(config.missing_ttl_secs),
            config.max_entries,
        )
    }

    /// Claim the resolution of `uid`
    pub async fn claim(&self, uid: &str) -> Lookup {
        let mut entries = self.entries.lock().await;
        match entries.get(uid).copied() {
            Some(Status::Pending) => return Lookup::Pending,
            Some(Status::Missing(at)) if at.elapsed() < self.missing_ttl => {
                return Lookup::Missing
            }
            Some(Status::Missing(_)) => {
                entries.remove(uid);
            }
            None => {}
        }

        if entries.len() >= self.capacity {
            self.evict_expired(&mut entries);
        }
        if entries.len() >= self.capacity {
            tracing::warn!("Fallback registry full, deferring {}", uid);
            return Lookup::Pending;
        }

        entries.insert(uid.to_string(), Status::Pending);
        Lookup::Started
    }

    async fn finish(&self, uid: &str, missing: bool) {
        let mut entries = self.entries.lock().await;
        if missing {
            entries.insert(uid.to_string(), Status::Missing(Instant::now()));
        } else {
            entries.remove(uid);
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<String, Status>) {
        let ttl = self.missing_ttl;
        entries.retain(|_, status| match status {
            Status::Pending => true,
            Status::Missing(at) => at.elapsed() < ttl,
        });
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Render `uid`, write it next to the generated pages and settle the registry
pub async fn resolve(generator: Arc<Generator>, registry: Arc<FallbackRegistry>, uid: String) {
    tracing::info!("Generating post {} on demand", uid);

    let result = match generator
        .render_post_on_demand(&uid, &PreviewMode::Published)
        .await
    {
        Ok(html) => generator.write_page(&post_file(&uid), &html).map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => registry.finish(&uid, false).await,
        Err(e) => {
            let missing = is_not_found(&e);
            if missing {
                tracing::info!("Post {} does not exist", uid);
            } else {
                // Cleared so the next request retries
                tracing::warn!("Failed to generate post {}: {:#}", uid, e);
            }
            registry.finish(&uid, missing).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FallbackRegistry {
        FallbackRegistry::new(Duration::from_secs(60), 16)
    }

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let registry = registry();
        assert_eq!(registry.claim("a").await, Lookup::Started);
        assert_eq!(registry.claim("a").await, Lookup::Pending);
        assert_eq!(registry.claim("b").await, Lookup::Started);
    }

    #[tokio::test]
    async fn test_finish_missing_and_retry() {
        let registry = registry();
        registry.claim("gone").await;
        registry.finish("gone", true).await;
        assert_eq!(registry.claim("gone").await, Lookup::Missing);

        registry.claim("flaky").await;
        registry.finish("flaky", false).await;
        assert_eq!(registry.claim("flaky").await, Lookup::Started);
    }

    #[tokio::test]
    async fn test_missing_expires() {
        let registry = FallbackRegistry::new(Duration::from_millis(30), 16);
        registry.claim("late").await;
        registry.finish("late", true).await;
        assert_eq!(registry.claim("late").await, Lookup::Missing);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(registry.claim("late").await, Lookup::Started);
    }

    #[tokio::test]
    async fn test_registry_is_bounded() {
        let registry = FallbackRegistry::new(Duration::from_millis(30), 2);
        assert_eq!(registry.claim("a").await, Lookup::Started);
        assert_eq!(registry.claim("b").await, Lookup::Started);
        assert_eq!(registry.claim("c").await, Lookup::Pending);
        assert_eq!(registry.len().await, 2);

        // Expired misses make room again
        registry.finish("a", true).await;
        registry.finish("b", true).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(registry.claim("c").await, Lookup::Started);
        assert_eq!(registry.len().await, 1);
    }
}
