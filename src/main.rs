use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use gemrelay::bot;
use gemrelay::config::Config;
use gemrelay::gemini::GeminiClient;
use gemrelay::liveness;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    info!("🚀 Starting gemrelay...");
    info!(
        "TELEGRAM_BOT_TOKEN: {}",
        Config::describe_secret(Some(&config.telegram_bot_token))
    );
    info!(
        "GOOGLE_API_KEY: {}",
        Config::describe_secret(config.google_api_key.as_deref())
    );

    liveness::spawn(liveness::BIND_ADDR.to_string());

    let bot = Bot::new(&config.telegram_bot_token);
    let gemini = Arc::new(GeminiClient::new(config.google_api_key));

    if gemini.is_enabled() {
        let gemini = gemini.clone();
        tokio::spawn(async move {
            match gemini.list_models().await {
                Ok(models) => {
                    info!("Available models:");
                    for model in models {
                        info!("- {} | supports: {:?}", model.name, model.supported_generation_methods);
                    }
                }
                Err(e) => warn!("Error listing models: {e}"),
            }
        });
    }

    let handler = dptree::entry().branch(Update::filter_message().endpoint(bot::handle_message));

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![gemini])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
}
