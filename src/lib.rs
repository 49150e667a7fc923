//! prismic-blog: a static blog generator backed by the Prismic headless CMS
//!
//! Posts are fetched from the Prismic REST API and rendered with embedded
//! Tera templates. The bundled server serves the generated pages, renders
//! posts published after the last build on demand, proxies the home page
//! "load more" control and supports preview mode.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pagination;
pub mod preview;
pub mod server;
pub mod templates;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{CmsClient, PrismicClient};
use generator::Generator;

/// The blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: PathBuf,
    /// Language overrides
    pub language_dir: PathBuf,
}

impl Blog {
    /// Create a new blog from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let language_dir = base_dir.join(&config.language_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
            language_dir,
        }
    }

    /// Client for the configured Prismic repository
    pub fn client(&self) -> Result<PrismicClient> {
        if self.config.prismic.endpoint.trim().is_empty() {
            bail!(
                "No Prismic endpoint configured. Set prismic.endpoint in _config.yml or {}",
                config::ENDPOINT_ENV
            );
        }
        Ok(PrismicClient::new(&self.config.prismic)?)
    }

    /// Built-in translations merged with the site's language files
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::with_builtin(&self.config.language)?;
        i18n.load_languages(&self.language_dir)?;
        Ok(i18n)
    }

    /// Generator talking to the configured repository
    pub fn generator(&self) -> Result<Generator> {
        let client: Arc<dyn CmsClient> = Arc::new(self.client()?);
        Generator::new(self, client)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
