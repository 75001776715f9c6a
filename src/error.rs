use std::path::PathBuf;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure kinds a single polling cycle can hit.
///
/// Markup that does not parse is not an error: the extractor yields no titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Persistence,
    Notification,
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("{url} answered HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("state file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("message rejected (HTTP {status}): {body}")]
    Notification { status: u16, body: String },
}

impl WatchError {
    pub fn transport(url: &str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::HttpStatus { .. } => ErrorKind::Transport,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Notification { .. } => ErrorKind::Notification,
        }
    }
}
