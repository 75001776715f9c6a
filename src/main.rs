use anyhow::Result;
use episode_watch::config::Config;
use episode_watch::feed::fetcher::PageFetcher;
use episode_watch::notify::telegram::TelegramNotifier;
use episode_watch::state::FileMarkerStore;
use episode_watch::watcher::{WatchSettings, Watcher};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("episode_watch=info")),
        )
        .with_writer(std::io::stdout)
        .init();

    let config = Config::load_or_default(Path::new("config.toml"))?;

    // Load .env before reading credentials
    Config::load_env_file();
    let credentials = Config::credentials();

    let source = PageFetcher::new(&config.source)?;
    let notifier = TelegramNotifier::new(&config.telegram, &credentials)?;
    let store = FileMarkerStore::new(config.state.path.clone());

    let watcher = Watcher::new(
        WatchSettings::from(&config),
        Box::new(source),
        Box::new(notifier),
        Box::new(store),
    )?;

    watcher.run().await?;
    Ok(())
}
