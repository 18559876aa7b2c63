mod bulk;
mod commands;
mod config;
mod handlers;
mod links;
pub mod menus;
mod storages;

use std::sync::Arc;

use clap::Parser;
use config::Args;
use handlers::{handle_callback_query, handle_text_message};
use links::{GplinksShortener, LinkShortenerTrait};
use storages::{MemoryCatalogStorage, PostgrestCatalogStorage, Storage, StorageTrait};
use teloxide::prelude::*;

#[tokio::main]
async fn main() {
    // Variables from .env are defaults; the real environment wins
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => eprintln!("Failed to load .env: {}", e),
        _ => {}
    }
    let args = Args::parse();

    pretty_env_logger::init();
    log::info!("Starting catalog bot in {:?} mode...", args.mode);

    let bot = Bot::new(&args.bot_token);
    let bot_name = match bot.get_me().await {
        Ok(me) => me.username().to_string(),
        Err(e) => {
            log::error!("Failed to get bot info, check the token: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize main storage based on CLI arguments
    let storage = match (&args.catalog_yaml, &args.supabase_url, &args.supabase_key) {
        (Some(path), _, _) => {
            log::info!("Using in-memory catalog from {:?}", path);
            match MemoryCatalogStorage::load_yaml(path.clone()).await {
                Ok(catalog) => Storage::new().catalog_storage(catalog),
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        (None, Some(url), Some(key)) => {
            log::info!("Using Supabase catalog at {}", url);
            Storage::new().catalog_storage(PostgrestCatalogStorage::new(url, key.clone()))
        }
        // clap requires the Supabase options when there is no catalog file
        _ => {
            log::error!("No catalog configured");
            std::process::exit(2);
        }
    };

    let gplinks = GplinksShortener::new(&args.gplinks_url, args.gplinks_token.clone());
    if !gplinks.is_configured() {
        log::warn!("GPLINKS_API_TOKEN is not set, link shortening will fail");
    }

    let storage: Arc<dyn StorageTrait> = Arc::new(storage);
    let shortener: Arc<dyn LinkShortenerTrait> = Arc::new(gplinks);
    let settings = Arc::new(args.settings(bot_name));

    let handler = dptree::entry()
        .branch(
            Update::filter_message().branch(
                dptree::filter(|msg: Message| msg.text().is_some() || msg.caption().is_some())
                    .endpoint(handle_text_message),
            ),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback_query));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![storage, shortener, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
