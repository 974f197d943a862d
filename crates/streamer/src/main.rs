mod config;

use std::time::Duration;

use backend::{ClientPool, TelegramClient};
use config::Config;
use fileserver::{FileServerApi, ServerState};
use telegram::{telegram, LinkSettings};
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let clients: Vec<TelegramClient> = config
        .tokens
        .iter()
        .map(|token| {
            let bot = match &config.api_url {
                Some(url) => Bot::new(token).set_api_url(url.clone()),
                None => Bot::new(token),
            };
            TelegramClient::new(bot, config.bin_channel)
        })
        .collect();

    let main_client = clients
        .first()
        .cloned()
        .ok_or("no bot token configured")?;
    let bot = main_client.bot().clone();
    let me = bot.get_me().await?;
    tracing::info!(
        "Logged in as @{} with {} client(s)",
        me.username(),
        clients.len()
    );

    if let Err(err) = telegram::set_bot_commands(&bot).await {
        tracing::warn!("Failed to register bot commands: {}", err);
    }

    let shutdown = CancellationToken::new();

    let state = ServerState::new(
        ClientPool::new(clients.clone()),
        me.username().to_string(),
        config.stream_settings(),
    );
    let server = FileServerApi::new(state);
    let host = config.bind_address.clone();
    let port = config.port;
    let server_shutdown = shutdown.clone();
    let server_task = tokio::spawn(async move {
        if let Err(err) = server.serve(&host, port, server_shutdown).await {
            tracing::error!("File server failed: {}", err);
        }
    });

    // Periodic cleanup of expired file and path entries
    let cleanup_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = cleanup_shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let removed: usize = clients.iter().map(TelegramClient::cleanup).sum();
                    if removed > 0 {
                        tracing::info!("Cleaned up {} expired entries", removed);
                    }
                }
            }
        }
    });

    let links = LinkSettings::new(
        config.public_url(),
        config.bin_channel,
        &config.fqdn,
        &config.bind_address,
    );
    tracing::info!("Serving links under {}", links.base_url);

    Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![main_client, links])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    shutdown.cancel();
    server_task.await?;
    Ok(())
}
