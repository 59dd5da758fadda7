//! Seed the beauty blog: categories, authors, tags and four bilingual posts.
//!
//! Usage: `cargo run --bin seed-blogs`
//!
//! Safe to run repeatedly; existing taxonomy is reused and posts whose slug is
//! taken are skipped.

use clap::Parser;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sawavo::{api::AppState, config::Config, db};

#[derive(Parser)]
#[command(name = "seed-blogs")]
#[command(about = "Seed the Sawavo beauty blog posts")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sawavo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args).await {
        tracing::error!("Blog seeding failed: {:#}", e);
        eprintln!("Error seeding blog posts: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::load_with_env(Path::new(&args.config))?;
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;

    let state = AppState::new(pool, config)?;
    let report = state.blog_service.seed_beauty_blog().await?;

    println!("Categories: {}", report.categories);
    println!("Tags: {}", report.tags);
    println!(
        "Authors: {} created, {} existing",
        report.authors_created, report.authors_existing
    );
    println!(
        "Posts: {} created, {} skipped",
        report.posts_created, report.posts_skipped
    );
    Ok(())
}
