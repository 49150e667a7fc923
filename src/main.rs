//! CLI entry point for prismic-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prismic_blog::preview::PreviewMode;
use prismic_blog::Blog;

#[derive(Parser)]
#[command(name = "prismic-blog")]
#[command(author, version)]
#[command(about = "A static blog generator backed by the Prismic headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files from the CMS
    #[command(alias = "g")]
    Generate {
        /// Build from a preview ref instead of the published content
        #[arg(long)]
        preview_ref: Option<String>,
    },

    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Serve the existing public folder without generating first
        #[arg(long)]
        skip_generate: bool,
    },

    /// Clean the public folder
    Clean,

    /// List posts stored in the CMS
    List {
        /// Follow pagination and list every post
        #[arg(short, long)]
        all: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "prismic_blog=debug,info"
    } else {
        "prismic_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            prismic_blog::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::Generate { preview_ref } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");

            let preview = PreviewMode::from_ref(preview_ref.as_deref());
            prismic_blog::commands::generate::run(&blog, &preview).await?;
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            open,
            skip_generate,
        } => {
            let blog = Blog::new(&base_dir)?;
            let generator = blog.generator()?;

            if !skip_generate {
                tracing::info!("Generating static files...");
                generator.generate(&PreviewMode::Published).await?;
            }

            tracing::info!("Starting server at http://{}:{}", ip, port);
            prismic_blog::server::start(&blog, generator, &ip, port, open).await?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { all } => {
            let blog = Blog::new(&base_dir)?;
            prismic_blog::commands::list::run(&blog, all).await?;
        }

        Commands::Version => {
            println!("prismic-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
