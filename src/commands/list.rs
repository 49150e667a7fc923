//! List posts stored in the CMS

use anyhow::Result;

use crate::generator::StaticPaths;
use crate::helpers::full_url_for;
use crate::preview::PreviewMode;
use crate::Blog;

/// Print the home page batch, or every post with `all`
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let generator = blog.generator()?;
    let preview = PreviewMode::Published;

    let posts = if all {
        StaticPaths::resolve(generator.client(), &blog.config.prismic, &preview)
            .await?
            .posts()
            .to_vec()
    } else {
        let list = generator.first_page(&preview).await?;
        if list.has_more() {
            println!("(first {} posts, use --all for the rest)", list.len());
        }
        list.into_results()
    };

    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = post
            .first_publication_date
            .map(|d| d.with_timezone(&blog.config.tz()).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!(
            "  {} - {} [{}]",
            date,
            post.title,
            full_url_for(&blog.config.url, &post.path())
        );
    }

    Ok(())
}
