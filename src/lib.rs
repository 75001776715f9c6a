pub mod config;
pub mod error;
pub mod feed;
pub mod notify;
pub mod state;
pub mod watcher;
