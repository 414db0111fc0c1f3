use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tallybot::{
    chat::Bot,
    clock::VoteClock,
    config::BotConfig,
    processor::CommandProcessor,
    publish::{FsArchiveStore, GitPublisher, PageOptions, Publisher},
    resolver::ResolverConfig,
    server,
    state::{export::SessionExport, VoteSession},
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tallybot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting tallybot...");

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    let clock = VoteClock::new(config.timezone);

    let resolver = ResolverConfig::from_env().build_resolver();

    let git = config
        .publish_git
        .then(|| GitPublisher::new(&config.output_dir));
    let publisher = Publisher::new(
        &config.output_dir,
        PageOptions::live(config.stream_url.clone()),
        git,
    );
    let archives = Arc::new(FsArchiveStore::new(
        publisher.archive_dir(),
        config.stream_url.clone(),
    ));

    // Restore the previous session, or start fresh in the current week
    let session = match SessionExport::load(&config.session_file).await {
        Ok(Some(export)) => {
            tracing::info!(
                week = %export.week,
                items = export.items.len(),
                exported_at = %export.exported_at,
                "Restored saved session"
            );
            export.into_session()
        }
        Ok(None) => VoteSession::new(clock.week_of(chrono::Utc::now())),
        Err(e) => {
            tracing::error!("Refusing to start over a broken session file: {}", e);
            std::process::exit(1);
        }
    };

    let processor = CommandProcessor::new(session, clock, config.admin.clone(), resolver, archives);

    if let Some(addr) = config.http_addr {
        if let Err(e) = server::spawn(addr, &config.output_dir).await {
            tracing::error!(%addr, "Failed to start HTTP server: {}", e);
            std::process::exit(1);
        }
    }

    let bot = Bot::new(
        config.chat.clone(),
        processor,
        publisher,
        &config.session_file,
        config.cooldown,
    );

    tokio::select! {
        result = bot.run() => {
            if let Err(e) = result {
                tracing::error!("Bot stopped: {}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }
}
