//! Generator module - renders CMS content into static HTML using built-in Tera templates

mod paths;

pub use paths::StaticPaths;

use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tera::Context;
use walkdir::WalkDir;

use crate::cms::{CmsClient, CmsClientExt, CmsError, Query};
use crate::content::{self, NavPost, PostDetail, PostPage, PostSummary};
use crate::helpers::{date_xml, format_in_tz, html_escape, load_more_url};
use crate::i18n::I18n;
use crate::pagination::PostList;
use crate::preview::PreviewMode;
use crate::templates::{
    base_context, insert_comments, NavLink, PostItemData, PostPageData, SiteData, TemplateRenderer,
};
use crate::Blog;

/// Static site generator backed by the CMS
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    client: Arc<dyn CmsClient>,
    i18n: I18n,
    translations: HashMap<String, String>,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, client: Arc<dyn CmsClient>) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let i18n = blog.i18n()?;
        let translations = i18n.get_all_translations();

        Ok(Self {
            blog: blog.clone(),
            renderer,
            client,
            i18n,
            translations,
        })
    }

    pub fn client(&self) -> &dyn CmsClient {
        self.client.as_ref()
    }

    /// Generate the entire site
    pub async fn generate(&self, preview: &PreviewMode) -> Result<StaticPaths> {
        // Ensure public directory exists
        fs::create_dir_all(&self.blog.public_dir)?;

        // Copy images, css, etc.
        self.copy_static_assets()?;

        // Home page with the first batch
        let home = self.first_page(preview).await?;
        let html = self.render_home(&home, preview)?;
        self.write_page("index.html", &html)?;

        // One page per post
        let paths = StaticPaths::resolve(self.client(), &self.blog.config.prismic, preview)
            .await
            .context("Failed to list posts")?;

        for uid in paths.uids() {
            let html = self
                .render_post(uid, &paths, preview)
                .await
                .with_context(|| format!("Failed to render post {}", uid))?;
            self.write_page(&post_file(uid), &html)?;
        }

        tracing::info!("Generated {} post pages", paths.posts().len());
        Ok(paths)
    }

    /// The first batch of the home page listing
    pub async fn first_page(&self, preview: &PreviewMode) -> Result<PostList> {
        let prismic = &self.blog.config.prismic;
        let query = Query::documents(&prismic.document_type)
            .fetch(prismic.summary_fields())
            .page_size(prismic.page_size)
            .preview(preview);

        let response = self.client.query(&query).await?;
        Ok(PostList::from_page(PostPage::from_response(&response)?))
    }

    /// Home page: the list so far plus the load-more control
    pub fn render_home(&self, list: &PostList, preview: &PreviewMode) -> Result<String> {
        let mut context = self.create_base_context(preview);
        context.insert("posts", &self.post_items(list.results()));
        context.insert("load_more_url", &list.next_page().map(load_more_url));
        self.renderer.render("index.html", &context)
    }

    /// Markup for a batch appended by the load-more control
    pub fn render_post_list_fragment(&self, posts: &[PostSummary]) -> Result<String> {
        let mut context = self.create_base_context(&PreviewMode::Published);
        context.insert("posts", &self.post_items(posts));
        self.renderer.render("partials/post_list.html", &context)
    }

    /// Fetch, assemble and render one post
    pub async fn render_post(
        &self,
        uid: &str,
        paths: &StaticPaths,
        preview: &PreviewMode,
    ) -> Result<String> {
        let document = self
            .client
            .get_by_uid(&self.blog.config.prismic.document_type, uid, preview)
            .await?;

        let (previous, next) = paths.adjacent(uid);
        let detail = PostDetail::from_document(&document)?.with_neighbours(previous, next);

        let mut context = self.create_base_context(preview);
        context.insert("post", &self.post_page_data(&detail));
        insert_comments(&mut context, &self.blog.config.comments);
        self.renderer.render("post.html", &context)
    }

    /// Render a post that was not known when the site was generated
    ///
    /// A published lookup that comes back empty is retried once against a
    /// freshly read master ref.
    pub async fn render_post_on_demand(&self, uid: &str, preview: &PreviewMode) -> Result<String> {
        match self.render_with_fresh_paths(uid, preview).await {
            Err(e) if is_not_found(&e) && !preview.is_active() => {
                tracing::debug!("Post {} not found, refreshing the master ref", uid);
                self.client.refresh().await?;
                self.render_with_fresh_paths(uid, preview).await
            }
            result => result,
        }
    }

    async fn render_with_fresh_paths(&self, uid: &str, preview: &PreviewMode) -> Result<String> {
        let paths = StaticPaths::resolve(self.client(), &self.blog.config.prismic, preview).await?;
        self.render_post(uid, &paths, preview).await
    }

    /// Interim page shown while a fallback page is being built
    pub fn render_loading(&self) -> Result<String> {
        let context = self.create_base_context(&PreviewMode::Published);
        self.renderer.render("loading.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        let context = self.create_base_context(&PreviewMode::Published);
        self.renderer.render("not_found.html", &context)
    }

    /// Write a page below the public directory
    pub fn write_page(&self, relative: &str, html: &str) -> Result<PathBuf> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(output_path)
    }

    fn create_base_context(&self, preview: &PreviewMode) -> Context {
        let site = SiteData {
            title: html_escape(&self.blog.config.title),
            language: self.blog.config.language.clone(),
        };
        let mut context = base_context(&site, &self.translations);
        context.insert("preview", &preview.is_active());
        context
    }

    fn post_items(&self, posts: &[PostSummary]) -> Vec<PostItemData> {
        posts.iter().map(|p| self.post_item(p)).collect()
    }

    fn post_item(&self, post: &PostSummary) -> PostItemData {
        let (date, datetime) = self.display_date(post.first_publication_date.as_ref());
        PostItemData {
            title: html_escape(&post.title),
            subtitle: html_escape(&post.subtitle),
            author: html_escape(&post.author),
            date,
            datetime,
            path: post.path(),
        }
    }

    fn post_page_data(&self, post: &PostDetail) -> PostPageData {
        let config = &self.blog.config;
        let assembled = content::assemble(post, config.reading.words_per_minute);
        let (date, datetime) = self.display_date(post.first_publication_date.as_ref());

        let edited = post
            .last_publication_date
            .filter(|_| post.was_edited())
            .map(|last| format_in_tz(&last, config.tz(), &config.edited_format, &self.i18n));

        let blocks = assembled
            .blocks
            .into_iter()
            .map(|mut block| {
                block.heading = html_escape(&block.heading);
                block
            })
            .collect();

        PostPageData {
            title: html_escape(&post.title),
            author: html_escape(&post.author),
            banner_url: post.banner.url.as_deref().map(html_escape),
            banner_alt: html_escape(post.banner.alt.as_deref().unwrap_or_default()),
            date,
            datetime,
            edited,
            reading_minutes: assembled.reading_minutes,
            blocks,
            previous: post.previous_post.as_ref().map(nav_link),
            next: post.next_post.as_ref().map(nav_link),
        }
    }

    fn display_date(&self, date: Option<&chrono::DateTime<chrono::Utc>>) -> (String, String) {
        let config = &self.blog.config;
        match date {
            Some(d) => (
                format_in_tz(d, config.tz(), &config.date_format, &self.i18n),
                date_xml(d),
            ),
            None => (String::new(), String::new()),
        }
    }

    /// Copy static assets (images, css, etc.)
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

/// Whether `e` is the CMS saying the document does not exist
pub fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<CmsError>()
        .map(CmsError::is_not_found)
        .unwrap_or(false)
}

/// `post/<uid>/index.html`
pub fn post_file(uid: &str) -> String {
    format!("post/{}/index.html", uid)
}

fn nav_link(post: &NavPost) -> NavLink {
    NavLink {
        title: html_escape(&post.title),
        path: post.path(),
    }
}
