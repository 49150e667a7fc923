//! Initialize a new blog

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Site
title: spacetraveling
description: ''
language: pt-BR
timezone: America/Sao_Paulo

# URL
url: http://localhost:3000

# Directory
public_dir: public
static_dir: static
language_dir: languages

# Dates (date-fns style tokens, quoted text is literal)
date_format: dd MMM yyyy
edited_format: "'* editado em' dd MMM yyyy', às' HH:mm"

# Headless CMS
# PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override these
prismic:
  endpoint: ''
  access_token: ''
  document_type: posts
  page_size: 3
  paths_page_size: 100
  timeout_secs: 10
  ref_ttl_secs: 5

# Post detail
reading:
  words_per_minute: 150

# utterances, disabled while repo is empty
comments:
  repo: ''
  issue_term: pathname
  theme: github-dark

# Posts published after the last build
fallback:
  missing_ttl_secs: 60
  max_entries: 1024
"#;

const LOGO: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="26"><text x="0" y="20" font-family="sans-serif" font-size="22" fill="#fff">spacetraveling.</text></svg>
"##;

const STYLE: &str = r#"body { margin: 0; background: #1a1d23; color: #d7d7d7; font-family: Inter, sans-serif; }
.container { max-width: 720px; margin: 0 auto; padding: 0 1rem; }
.header { padding: 4rem 1rem 3rem; }
.post-item a { color: inherit; text-decoration: none; }
.post-item h2 { color: #fff; margin-bottom: 0.5rem; }
.post-info { display: flex; gap: 1.5rem; font-size: 0.875rem; }
.load-more { background: none; border: 0; color: #ff57b2; cursor: pointer; font-size: 1.125rem; margin: 4rem 0; }
.load-more:disabled { opacity: 0.5; cursor: default; }
.banner img { width: 100%; max-height: 400px; object-fit: cover; }
.post-navigation { display: flex; justify-content: space-between; border-top: 1px solid #383f48; padding: 3rem 0; }
.preview-exit a { display: block; background: #ff57b2; color: #fff; padding: 1rem; border-radius: 8px; text-align: center; }
"#;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        bail!("{:?} already exists", config_path);
    }

    // Create directory structure
    fs::create_dir_all(target_dir.join("static/images"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;
    fs::create_dir_all(target_dir.join("languages"))?;

    fs::write(&config_path, CONFIG_TEMPLATE)?;
    fs::write(target_dir.join("static/images/logo.svg"), LOGO)?;
    fs::write(target_dir.join("static/css/style.css"), STYLE)?;

    tracing::debug!("Wrote {:?}", config_path);
    Ok(())
}
