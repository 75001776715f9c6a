//! Plain HTTP GET of the watched page.

use super::PageSource;
use crate::config::SourceConfig;
use crate::error::WatchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build page HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    /// One attempt, no retry. A non-success status is a transport failure.
    async fn fetch(&self, url: &str) -> Result<String, WatchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WatchError::transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WatchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| WatchError::transport(url, e))
    }
}
