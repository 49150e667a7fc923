//! Configuration module

mod site;

pub use site::SiteConfig;
pub use site::CommentsConfig;
pub use site::FallbackConfig;
pub use site::PrismicConfig;
pub use site::ReadingConfig;
pub use site::{ACCESS_TOKEN_ENV, ENDPOINT_ENV};
