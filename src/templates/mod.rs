//! Built-in blog templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::CommentsConfig;
use crate::content::RenderedBlock;

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Text from the CMS is escaped when the page data is built; rich text
        // bodies are already markup
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("loading.html", include_str!("blog/loading.html")),
            ("not_found.html", include_str!("blog/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/post_list.html",
                include_str!("blog/partials/post_list.html"),
            ),
            (
                "partials/post_item.html",
                include_str!("blog/partials/post_item.html"),
            ),
            (
                "partials/comments.html",
                include_str!("blog/partials/comments.html"),
            ),
            (
                "partials/preview_button.html",
                include_str!("blog/partials/preview_button.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
}

/// One entry of the post list
#[derive(Debug, Clone, Serialize)]
pub struct PostItemData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Display date, empty when unpublished
    pub date: String,
    pub datetime: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub title: String,
    pub path: String,
}

/// A full post page
#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub date: String,
    pub datetime: String,
    /// "edited at" line, only for posts changed after publication
    pub edited: Option<String>,
    pub reading_minutes: u64,
    pub blocks: Vec<RenderedBlock>,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
}

/// Context shared by every page
pub fn base_context(site: &SiteData, translations: &HashMap<String, String>) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("t", translations);
    context.insert("preview", &false);
    context
}

/// Context for the comments partial
pub fn insert_comments(context: &mut Context, comments: &CommentsConfig) {
    context.insert("comments_enabled", &comments.enabled());
    context.insert("comments", comments);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        let site = SiteData {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
        };
        let mut t = HashMap::new();
        t.insert("load_more".to_string(), "Carregar mais posts".to_string());
        t.insert("minutes".to_string(), "min".to_string());
        t.insert("previous_post".to_string(), "Post anterior".to_string());
        t.insert("next_post".to_string(), "Próximo post".to_string());
        t.insert("exit_preview".to_string(), "Sair do modo Preview".to_string());
        base_context(&site, &t)
    }

    fn item(title: &str) -> PostItemData {
        PostItemData {
            title: title.to_string(),
            subtitle: "sub".to_string(),
            author: "Ana".to_string(),
            date: "15 mar 2021".to_string(),
            datetime: "2021-03-15T19:25:28.000+00:00".to_string(),
            path: "/post/x/".to_string(),
        }
    }

    fn page() -> PostPageData {
        PostPageData {
            title: "Post".to_string(),
            author: "Ana".to_string(),
            banner_url: None,
            banner_alt: String::new(),
            date: "15 mar 2021".to_string(),
            datetime: String::new(),
            edited: None,
            reading_minutes: 4,
            blocks: vec![RenderedBlock {
                heading: "Intro".to_string(),
                body: "<p>Hello <strong>there</strong></p>".to_string(),
                words: 3,
            }],
            previous: Some(NavLink {
                title: "Older".to_string(),
                path: "/post/older/".to_string(),
            }),
            next: None,
        }
    }

    #[test]
    fn test_index_with_and_without_load_more() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = context();
        ctx.insert("posts", &vec![item("A"), item("B")]);
        ctx.insert("load_more_url", &Some("/api/posts?cursor=abc"));
        let html = renderer.render("index.html", &ctx).unwrap();
        assert!(html.contains(r#"data-endpoint="/api/posts?cursor=abc""#));
        assert!(html.contains(r#"id="load-more""#));
        assert!(html.contains("Carregar mais posts"));

        ctx.insert("load_more_url", &None::<String>);
        let html = renderer.render("index.html", &ctx).unwrap();
        assert!(!html.contains(r#"id="load-more""#));
        assert_eq!(html.matches(r#"class="post-item""#).count(), 2);
    }

    #[test]
    fn test_post_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = context();
        ctx.insert("post", &page());
        insert_comments(&mut ctx, &CommentsConfig::default());
        let html = renderer.render("post.html", &ctx).unwrap();

        assert!(html.contains("<p>Hello <strong>there</strong></p>"));
        assert!(html.contains("4 min"));
        assert!(html.contains("Post anterior"));
        assert!(!html.contains("Próximo post"));
        assert!(!html.contains("utteranc.es"));
        assert!(!html.contains("/api/exit-preview"));
    }

    #[test]
    fn test_post_page_preview_and_comments() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = context();
        ctx.insert("post", &page());
        ctx.insert("preview", &true);
        let comments = CommentsConfig {
            repo: "someone/comments".to_string(),
            ..CommentsConfig::default()
        };
        insert_comments(&mut ctx, &comments);
        let html = renderer.render("post.html", &ctx).unwrap();

        assert!(html.contains(r#"repo="someone/comments""#));
        assert!(html.contains("/api/exit-preview"));
    }

    #[test]
    fn test_blank_comments_repo_hides_widget() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = context();
        ctx.insert("post", &page());
        let comments = CommentsConfig {
            repo: "   ".to_string(),
            ..CommentsConfig::default()
        };
        insert_comments(&mut ctx, &comments);
        let html = renderer.render("post.html", &ctx).unwrap();
        assert!(!html.contains("utteranc.es"));
    }

    #[test]
    fn test_post_list_fragment() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = context();
        ctx.insert("posts", &vec![item("Only")]);
        let html = renderer.render("partials/post_list.html", &ctx).unwrap();
        assert!(html.contains("<h2>Only</h2>"));
        assert!(!html.contains("<html"));
    }
}
