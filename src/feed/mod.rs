pub mod extract;
pub mod fetcher;

use crate::error::WatchError;
use async_trait::async_trait;

/// Something that can hand back the raw markup of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, WatchError>;
}
