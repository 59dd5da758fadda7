//! Create the admin account, or reset its password if one exists.
//!
//! Usage: `cargo run --bin create-admin -- --password <password>`

use clap::Parser;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sawavo::{api::AppState, config::Config, db, services::AdminBootstrap};

#[derive(Parser)]
#[command(name = "create-admin")]
#[command(about = "Create the Sawavo admin user or reset its password")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: String,

    /// Admin email, used when no admin exists yet
    #[arg(long, env = "SAWAVO_ADMIN_EMAIL", default_value = "admin@sawavo.com")]
    email: String,

    /// Password to set (at least 8 characters)
    #[arg(long, env = "SAWAVO_ADMIN_PASSWORD")]
    password: String,
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
        tracing::error!("Failed to create admin user: {:#}", e);
        eprintln!("Error creating admin user: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::load_with_env(Path::new(&args.config))?;
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;

    let state = AppState::new(pool, config)?;
    match state.user_service.ensure_admin(&args.email, &args.password).await? {
        AdminBootstrap::Created(user) => {
            println!("Admin user created successfully:");
            println!("Email: {}", user.email);
            println!("Role: {}", user.role);
            println!("ID: {}", user.id);
        }
        AdminBootstrap::PasswordReset(user) => {
            println!("Admin user already exists: {}", user.email);
            println!("Admin password updated");
        }
    }
    Ok(())
}
