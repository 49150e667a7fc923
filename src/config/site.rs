//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Environment variable overriding `prismic.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable overriding `prismic.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub language_dir: String,

    // Date / Time format (date-fns style tokens)
    pub date_format: String,
    pub edited_format: String,

    // Headless CMS
    #[serde(default)]
    pub prismic: PrismicConfig,

    // Post detail
    #[serde(default)]
    pub reading: ReadingConfig,
    #[serde(default)]
    pub comments: CommentsConfig,

    // On-demand post pages
    #[serde(default)]
    pub fallback: FallbackConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: String::new(),

            url: "http://localhost:3000".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            language_dir: "languages".to_string(),

            date_format: "dd MMM yyyy".to_string(),
            edited_format: "'* editado em' dd MMM yyyy', às' HH:mm".to_string(),

            prismic: PrismicConfig::default(),
            reading: ReadingConfig::default(),
            comments: CommentsConfig::default(),
            fallback: FallbackConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    /// Override CMS credentials; empty values are ignored
    pub fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Using Prismic endpoint from environment");
            self.prismic.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            self.prismic.access_token = Some(token);
        }
    }

    /// Parsed display timezone, UTC when unset or unknown
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, falling back to UTC", self.timezone);
                chrono_tz::UTC
            }
        }
    }
}

/// Prismic repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    /// API entry point, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
    /// Posts per batch on the home page and for each "load more"
    pub page_size: usize,
    /// Batch size used when enumerating every post at build time
    pub paths_page_size: usize,
    pub timeout_secs: u64,
    /// How long the published master ref is reused before the API root is read again
    pub ref_ttl_secs: u64,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 3,
            paths_page_size: 100,
            timeout_secs: 10,
            ref_ttl_secs: 5,
        }
    }
}

impl PrismicConfig {
    /// Fields requested for post summaries (`fetch` projection)
    pub fn summary_fields(&self) -> Vec<String> {
        ["title", "subtitle", "author"]
            .iter()
            .map(|field| format!("{}.{}", self.document_type, field))
            .collect()
    }
}

/// Reading time estimate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: crate::content::DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

/// utterances comments widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// `owner/name` of the GitHub repository; empty disables the widget
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}

impl CommentsConfig {
    pub fn enabled(&self) -> bool {
        !self.repo.trim().is_empty()
    }
}

/// Bookkeeping of posts generated on demand by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Seconds a uid the CMS did not know keeps answering 404
    pub missing_ttl_secs: u64,
    /// Upper bound on uids tracked at once
    pub max_entries: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            missing_ttl_secs: 60,
            max_entries: 1024,
        }
    }
}
