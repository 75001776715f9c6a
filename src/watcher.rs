//! The polling loop: load the marker once, then fetch, compare, notify and
//! persist on a fixed interval until the process is killed.

use crate::config::Config;
use crate::error::WatchError;
use crate::feed::extract::TitleExtractor;
use crate::feed::PageSource;
use crate::notify::{inventory_message, new_episode_message, Notifier};
use crate::state::MarkerStore;
use anyhow::Result;
use std::time::Duration;

/// Everything the loop needs to know up front. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub page_url: String,
    pub marker_class: String,
    pub check_interval: Duration,
    pub announce_inventory: bool,
}

impl From<&Config> for WatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_url: config.source.url.clone(),
            marker_class: config.source.marker_class.clone(),
            check_interval: config.schedule.check_interval(),
            announce_inventory: config.schedule.announce_inventory,
        }
    }
}

/// What one polling step found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Newest title differed from the marker. `delivered` reports whether the
    /// notifier accepted the message; the marker moves either way.
    NewEpisode { title: String, delivered: bool },
    Unchanged,
    NoTitles,
    /// Newest matching link had no text (an image-only link, say).
    BlankTitle,
}

pub struct Watcher {
    settings: WatchSettings,
    extractor: TitleExtractor,
    source: Box<dyn PageSource>,
    notifier: Box<dyn Notifier>,
    store: Box<dyn MarkerStore>,
    last_seen: Option<String>,
}

impl Watcher {
    pub fn new(
        settings: WatchSettings,
        source: Box<dyn PageSource>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn MarkerStore>,
    ) -> Result<Self> {
        let extractor = TitleExtractor::new(&settings.marker_class)?;
        Ok(Self {
            settings,
            extractor,
            source,
            notifier,
            store,
            last_seen: None,
        })
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Load the marker and, when configured, send the inventory dump.
    /// Only a failed marker load is fatal.
    pub async fn startup(&mut self) -> Result<(), WatchError> {
        self.last_seen = self.store.load()?;
        match &self.last_seen {
            Some(title) => tracing::info!(title = %title, "last notified episode"),
            None => tracing::info!("no episode notified yet"),
        }

        if self.settings.announce_inventory {
            if let Err(e) = self.announce_inventory().await {
                tracing::error!(kind = ?e.kind(), error = %e, "inventory announcement failed");
            }
        }
        Ok(())
    }

    /// Send every title currently on the page in one message. Does not touch
    /// the marker. Returns whether a message was delivered.
    pub async fn announce_inventory(&self) -> Result<bool, WatchError> {
        let titles = self.current_titles().await?;
        if titles.is_empty() {
            tracing::info!("page lists no episodes, skipping inventory");
            return Ok(false);
        }
        tracing::info!(count = titles.len(), "announcing listed episodes");
        let message = inventory_message(&titles, &self.settings.page_url);
        Ok(self.notifier.notify(&message).await)
    }

    /// One POLLING step. Errors are returned untouched; [`Watcher::run`]
    /// decides they are not fatal.
    pub async fn poll(&mut self) -> Result<CycleOutcome, WatchError> {
        let titles = self.current_titles().await?;
        let Some(newest) = titles.into_iter().next() else {
            tracing::info!("no episode titles found on page");
            return Ok(CycleOutcome::NoTitles);
        };

        if newest.is_empty() {
            tracing::info!("newest episode link has no text, no new episodes");
            return Ok(CycleOutcome::BlankTitle);
        }

        if self.last_seen.as_deref() == Some(newest.as_str()) {
            tracing::info!("no new episodes");
            return Ok(CycleOutcome::Unchanged);
        }

        tracing::info!(title = %newest, "new episode found");
        let message = new_episode_message(&newest, &self.settings.page_url);
        let delivered = self.notifier.notify(&message).await;
        if !delivered {
            tracing::warn!(title = %newest, "notification not delivered, recording episode anyway");
        }

        self.store.save(&newest)?;
        self.last_seen = Some(newest.clone());
        Ok(CycleOutcome::NewEpisode {
            title: newest,
            delivered,
        })
    }

    /// STARTUP once, then POLLING and SLEEPING forever. Returns only when
    /// startup fails.
    pub async fn run(mut self) -> Result<(), WatchError> {
        self.startup().await?;
        tracing::info!(
            url = %self.settings.page_url,
            interval_s = self.settings.check_interval.as_secs(),
            "watching for new episodes"
        );

        loop {
            tracing::info!("checking for new episodes");
            if let Err(e) = self.poll().await {
                tracing::error!(kind = ?e.kind(), error = %e, "episode check failed");
            }
            tokio::time::sleep(self.settings.check_interval).await;
        }
    }

    async fn current_titles(&self) -> Result<Vec<String>, WatchError> {
        let markup = self.source.fetch(&self.settings.page_url).await?;
        Ok(self.extractor.extract(&markup))
    }
}
