//! Headless CMS adapter (Prismic REST API v2)
//!
//! [`CmsClient`] is the seam the rest of the crate depends on; the
//! [`PrismicClient`] implementation is constructed from the site
//! configuration and passed explicitly, so tests can swap in a fake.

mod client;
mod error;
mod query;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{CmsClient, CmsClientExt, PrismicClient};
pub use error::{CmsError, CmsResult};
pub use query::{Predicate, Query, MAX_PAGE_SIZE};
pub use types::{prismic_date, ApiInfo, ApiRef, Document, SearchResponse};
