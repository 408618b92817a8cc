mod bot;
mod config;
mod console;
mod container;
mod daemon;
mod logwatch;
mod monitor;
mod playtime;
mod properties;
mod telegram;

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use bot::dispatcher::Dispatcher;
use bot::fanout::Broadcaster;
use config::config::Config;
use console::rcon::{GameConsole, RconConsole};
use container::control::{DockerControl, ServerControl};
use logwatch::tailer::LogWatcher;
use telegram::client::{ChatApi, TelegramClient};

/// Delay before retrying a failed long-poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "craftctl")]
#[command(about = "Telegram control bot for a containerized Minecraft server", long_about = None)]
struct Cli {
    /// Verbose tracing output
    #[arg(long = "dev")]
    dev: bool,

    /// Path to config.json
    #[arg(long = "config", default_value = "config.json")]
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.dev {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    daemon::start::print_banner();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", cli.config, e);
            return;
        }
    };
    daemon::start::check_paths(&config);

    let control = match DockerControl::new(config.docker.container_name.clone()) {
        Ok(control) => Arc::new(control),
        Err(e) => {
            eprintln!("✗ Docker Error: {}", e);
            eprintln!("  Please ensure the Docker daemon is running and try again.");
            return;
        }
    };

    let console: Arc<dyn GameConsole> = match RconConsole::new(config.docker.container_name.clone())
    {
        Ok(console) => Arc::new(console),
        Err(e) => {
            eprintln!("✗ Docker Error: {}", e);
            return;
        }
    };

    let client = Arc::new(TelegramClient::new(&config.telegram.token));
    let chat: Arc<dyn ChatApi> = client.clone();

    let notifier = Arc::new(Broadcaster::new(
        chat.clone(),
        config.telegram.allowed_chat_ids.clone(),
    ));

    // Background task: tail the server log and relay events to chat.
    match LogWatcher::new(
        config.docker.container_name.clone(),
        control.clone(),
        console.clone(),
        notifier.clone(),
    ) {
        Ok(watcher) => {
            tokio::spawn(watcher.run());
        }
        Err(e) => {
            tracing::error!("Failed to start log monitor: {}", e);
        }
    }

    // Background task: memory watchdog.
    tokio::spawn(monitor::resources::run(
        control.clone(),
        notifier.clone(),
        config.monitoring.clone(),
    ));

    let dispatcher = Dispatcher::new(
        chat,
        console,
        control.clone() as Arc<dyn ServerControl>,
        &config,
    );

    tracing::info!("Bot started, polling for updates");

    // Ingestion loop: long-poll, dispatch, repeat. `offset` confirms
    // processed updates so Telegram never redelivers them.
    let mut offset: Option<i64> = None;
    loop {
        match client.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    dispatcher.handle_update(update).await;
                }
            }
            Err(e) => {
                tracing::error!("Update poll failed: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}
