//! Command line admin for the Sawavo product catalog.
//!
//! Usage:
//! ```text
//! sawavo-admin login --email admin@sawavo.com --password ...
//! export SAWAVO_ADMIN_TOKEN=<printed token>
//! sawavo-admin list --filter low-stock --search serum
//! sawavo-admin delete-all --confirm "DELETE ALL PRODUCTS"
//! ```

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sawavo::admin::{
    main_image_url, ApiClient, DeleteAllConfirmation, ProductFilter, ProductListState, SearchDebouncer,
    DEFAULT_DELAY, DEFAULT_PAGE_SIZE,
};
use sawavo::models::ProductQuery;

#[derive(Parser)]
#[command(name = "sawavo-admin")]
#[command(about = "Manage Sawavo products through the admin API")]
struct Cli {
    /// API root
    #[arg(long, env = "NEXT_PUBLIC_API_URL", default_value = "http://localhost:4008/api/v1")]
    api_url: String,

    /// Session token from `login`
    #[arg(long, env = "SAWAVO_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and print the session token
    Login {
        #[arg(long, env = "SAWAVO_ADMIN_EMAIL")]
        email: String,
        #[arg(long, env = "SAWAVO_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List active products
    List {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
        /// all, featured, today-deal, low-stock or new
        #[arg(long, default_value = "all")]
        filter: ProductFilter,
    },
    /// Search interactively: each line on stdin is a new search text
    Browse {
        #[arg(long, default_value = "all")]
        filter: ProductFilter,
    },
    /// Delete one product
    Delete { id: String },
    /// Delete several products
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every product and image
    DeleteAll {
        /// Must be exactly "DELETE ALL PRODUCTS"
        #[arg(long)]
        confirm: String,
        /// Skip the interactive warning
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sawavo=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut client = ApiClient::new(&cli.api_url)?;
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.email, user.role);
            if let Some(token) = client.token() {
                println!("{}", token);
            }
        }
        Command::List {
            page,
            limit,
            search,
            filter,
        } => {
            let mut state = ProductListState::new();
            state.set_filter(filter);
            if let Some(search) = search {
                state.set_search(search);
            }
            // size first, since a size change resets the page
            state.set_page(0, limit);
            state.set_page(page.saturating_sub(1), limit);
            load(&client, &mut state).await;
            print_products(&state);
        }
        Command::Browse { filter } => browse(&client, filter).await,
        Command::Delete { id } => {
            client.delete_product(&id).await?;
            println!("Deleted product {}", id);
        }
        Command::BulkDelete { ids } => {
            let deleted = client.delete_products(&ids).await?;
            println!("Deleted {} of {} products", deleted, ids.len());
        }
        Command::DeleteAll { confirm, yes } => {
            let total = client
                .list_products(&ProductQuery {
                    limit: 1,
                    ..Default::default()
                })
                .await?
                .pagination
                .total;

            let mut confirmation = DeleteAllConfirmation::new(total);
            println!("{}", confirmation.warning());
            if yes || ask_yes_no("Continue? [y/N] ").await? {
                confirmation.acknowledge();
            }
            let phrase = confirmation.verify(&confirm)?;

            let outcome = client.delete_all_products(phrase).await?;
            println!(
                "Deleted {} products and {} images",
                outcome.deleted_products_count, outcome.deleted_images_count
            );
        }
    }
    Ok(())
}

/// Fetch the state's current page; a failure leaves an empty list
async fn load(client: &ApiClient, state: &mut ProductListState) {
    state.begin_loading();
    match client.list_products(&state.to_query()).await {
        Ok(page) => state.apply_page(page),
        Err(e) => {
            eprintln!("Failed to load products: {}", e);
            state.apply_failure();
        }
    }
}

async fn browse(client: &ApiClient, filter: ProductFilter) {
    let (tx, mut debouncer) = SearchDebouncer::new(DEFAULT_DELAY);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut state = ProductListState::new();
    state.set_filter(filter);
    load(client, &mut state).await;
    print_products(&state);

    while let Some(search) = debouncer.next().await {
        state.set_search(search);
        load(client, &mut state).await;
        print_products(&state);
    }
}

fn print_products(state: &ProductListState) {
    let query = state.to_query();
    let total_pages = (state.total() as u64).div_ceil(u64::from(state.page_size())).max(1);
    println!(
        "Products ({}) - page {}/{} - filter: {}",
        state.total(),
        query.page,
        total_pages,
        state.filter()
    );
    if state.products().is_empty() {
        println!("  No products found");
        return;
    }
    for product in state.products() {
        let stock = if product.is_low_stock() {
            format!("{} (low)", product.stock_quantity)
        } else {
            product.stock_quantity.to_string()
        };
        println!(
            "  {}  {:<32} {:>9.2}  stock {:<9} {}",
            product.id,
            product.title,
            product.price,
            stock,
            main_image_url(product).unwrap_or("-")
        );
    }
}

async fn ask_yes_no(prompt: &str) -> anyhow::Result<bool> {
    println!("{}", prompt);
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
