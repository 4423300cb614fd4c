//! CLI entry point for postdex

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postdex::query::QueryEngine;
use postdex::report::BatchOutcome;
use postdex::Postdex;

#[derive(Parser)]
#[command(name = "postdex")]
#[command(version)]
#[command(about = "A content model and indexing pipeline for Markdown blog posts", long_about = None)]
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
    /// Ingest the content directory and report validation results
    Ingest,

    /// List posts in date-descending order
    #[command(alias = "ls")]
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Posts per page (defaults to the configured per_page)
        #[arg(short = 's', long)]
        page_size: Option<usize>,

        /// Only posts carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a single post by slug
    Show {
        /// Slug of the post
        slug: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List tags with post counts
    Tags,

    /// List featured posts
    Featured {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postdex=debug,info"
    } else {
        "postdex=info"
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

    let app = Postdex::new(&base_dir)?;

    match cli.command {
        Commands::Ingest => {
            let changes = app.pending_changes();
            tracing::info!("Changes since last ingest: {}", changes.summary());

            let (_index, report) = app.ingest()?;
            for diagnostic in report.diagnostics() {
                println!(
                    "  {} [{}] {}",
                    diagnostic.source, diagnostic.kind, diagnostic.message
                );
            }
            println!("{}", report.summary());

            if report.outcome() == BatchOutcome::Failed {
                std::process::exit(1);
            }
        }

        Commands::List {
            page,
            page_size,
            tag,
            json,
        } => {
            let (index, _) = app.ingest()?;
            let engine = QueryEngine::new(&index);
            let page_size = page_size.unwrap_or(app.config.per_page);

            let results = match &tag {
                Some(tag) => engine.filter_by_tag(tag, page, page_size),
                None => engine.list(page, page_size),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!(
                    "Posts ({} total, page {}/{}):",
                    results.total, results.page, results.total_pages
                );
                for post in &results.items {
                    println!(
                        "  {} - {} [{}]",
                        post.date.format("%Y-%m-%d"),
                        post.title,
                        post.slug
                    );
                }
            }
        }

        Commands::Show { slug, json } => {
            let (index, _) = app.ingest()?;
            let engine = QueryEngine::new(&index);

            match engine.get_by_slug(&slug) {
                Some(post) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(post)?);
                    } else {
                        println!("{}", post.title);
                        println!("{}", post.date.format("%Y-%m-%d"));
                        if !post.tags.is_empty() {
                            let tags: Vec<_> = post.tags.iter().map(String::as_str).collect();
                            println!("tags: {}", tags.join(", "));
                        }
                        if post.featured {
                            println!("featured");
                        }
                        if !post.excerpt.is_empty() {
                            println!("\n{}", post.excerpt);
                        }
                        println!("\n{}", post.body);
                    }
                }
                None => {
                    eprintln!("No post with slug `{}`", slug);
                    std::process::exit(1);
                }
            }
        }

        Commands::Tags => {
            let (index, _) = app.ingest()?;
            let engine = QueryEngine::new(&index);
            let tags = engine.tags();
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }

        Commands::Featured { json } => {
            let (index, _) = app.ingest()?;
            let engine = QueryEngine::new(&index);
            let featured = engine.list_featured();

            if json {
                println!("{}", serde_json::to_string_pretty(&featured)?);
            } else {
                println!("Featured posts ({}):", featured.len());
                for post in featured {
                    println!(
                        "  {} - {} [{}]",
                        post.date.format("%Y-%m-%d"),
                        post.title,
                        post.slug
                    );
                }
            }
        }
    }

    Ok(())
}
