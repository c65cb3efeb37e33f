use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;

use lavka::catalog::{DemoStore, Ecommerce};
use lavka::cli::{Cli, Commands};
use lavka::core::config;
use lavka::core::money::format_price;
use lavka::recommend::Recommender;
use lavka::storage::create_pool;
use lavka::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();
    pretty_env_logger::init_timed();

    // Log panics from spawned handler tasks instead of dying silently
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    match cli.command {
        Some(Commands::SeedInfo) => print_seed_info().await,
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let bot = create_bot()?;
    let bot_info = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    setup_bot_commands(&bot).await?;

    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH)
            .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    log::info!("Database ready at {}", *config::DATABASE_PATH);

    let store: Arc<dyn Ecommerce> = Arc::new(DemoStore::new());

    let recommender = Recommender::from_env().map(Arc::new);
    if recommender.is_some() {
        log::info!("Product recommendations enabled (model: {})", *config::llm::MODEL);
    } else {
        log::info!("Product recommendations disabled (LLM_API_KEY unset)");
    }

    if config::PAYMENT_PROVIDER_TOKEN.is_none() {
        log::warn!("BOT_TELEGRAM_PAYMENT_PROVIDER_TOKEN unset, checkout will be unavailable");
    }

    let handler_deps = HandlerDeps::new(Arc::clone(&db_pool), store, recommender);
    let handler = schema(handler_deps);

    log::info!("Starting bot in long polling mode");
    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Print the generated demo catalog (categories and products) and exit.
async fn print_seed_info() -> Result<()> {
    let store = DemoStore::new();
    let currency = store.currency().to_string();

    for category in store.categories(None).await? {
        println!("{} (#{})", category.name, category.id);
        print_category(&store, category.id, &currency, 1).await?;
    }
    Ok(())
}

async fn print_category(store: &DemoStore, category_id: i64, currency: &str, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    for product in store.browse_products(None, Some(category_id), None).await? {
        let discount = product
            .discount_percent()
            .map(|p| format!(" ({p}% off)"))
            .unwrap_or_default();
        println!(
            "{}#{} {} - {}{}",
            indent,
            product.id,
            product.name,
            format_price(product.sale_price_cents(), currency),
            discount
        );
    }
    for child in store.categories(Some(category_id)).await? {
        println!("{}{} (#{})", indent, child.name, child.id);
        for product in store.browse_products(None, Some(child.id), None).await? {
            println!(
                "{}  #{} {} - {}",
                indent,
                product.id,
                product.name,
                format_price(product.sale_price_cents(), currency)
            );
        }
    }
    Ok(())
}
