//! Generate static files

use anyhow::Result;

use crate::preview::PreviewMode;
use crate::Blog;

/// Fetch every post from the CMS and write the site
pub async fn run(blog: &Blog, preview: &PreviewMode) -> Result<()> {
    let start = std::time::Instant::now();

    if let Some(reference) = preview.draft_ref() {
        tracing::info!("Generating from preview ref {}", reference);
    }

    let generator = blog.generator()?;
    let paths = generator.generate(preview).await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts in {:.2}s",
        paths.posts().len(),
        duration.as_secs_f64()
    );

    Ok(())
}
