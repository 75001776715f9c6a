use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_FILE: &str = ".env";

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// The page being watched and how episode titles are recognised on it.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Class carried by the `<a>` elements holding episode titles.
    #[serde(default = "default_marker_class")]
    pub marker_class: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_url() -> String {
    "https://solotorrent.org/series/silo/".to_string()
}
fn default_marker_class() -> String {
    "title".to_string()
}
fn default_request_timeout() -> u64 { 30_000 }
fn default_user_agent() -> String {
    concat!("episode-watch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            marker_class: default_marker_class(),
            request_timeout_ms: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_check_interval")]
    pub check_interval_s: u64,
    /// Send one message listing every title on the page before the first check.
    #[serde(default)]
    pub announce_inventory: bool,
}

fn default_check_interval() -> u64 { 3600 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_interval_s: default_check_interval(),
            announce_inventory: false,
        }
    }
}

impl ScheduleConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_s)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("latest_episode.txt")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { path: default_state_path() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { api_base: default_api_base() }
    }
}

/// Bot token and destination chat. Either may be empty when the
/// environment does not provide it.
#[derive(Clone, Default)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &if self.bot_token.is_empty() { "" } else { "<redacted>" })
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse config TOML")?;
        if config.schedule.check_interval_s == 0 {
            anyhow::bail!("schedule.check_interval_s must be at least 1 second");
        }
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (key, value) in parse_env_lines(&content) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Read the bot credentials once. Missing values stay empty; nothing
    /// validates them beyond a warning.
    pub fn credentials() -> Credentials {
        let bot_token = read_env(BOT_TOKEN_VAR);
        let chat_id = read_env(CHAT_ID_VAR);
        if bot_token.is_empty() || chat_id.is_empty() {
            tracing::warn!(
                "{} or {} is not set; notifications will be rejected",
                BOT_TOKEN_VAR,
                CHAT_ID_VAR
            );
        }
        Credentials { bot_token, chat_id }
    }
}

fn read_env(key: &str) -> String {
    std::env::var(key).map(|v| sanitize_key(&v)).unwrap_or_default()
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
fn parse_env_lines(content: &str) -> Vec<(&str, &str)> {
    // Strip BOM if present (common on Windows-created files)
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"').trim_matches('\'')))
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from a key value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.source.url, "https://solotorrent.org/series/silo/");
        assert_eq!(config.source.marker_class, "title");
        assert_eq!(config.schedule.check_interval(), Duration::from_secs(3600));
        assert!(!config.schedule.announce_inventory);
        assert_eq!(config.state.path, PathBuf::from("latest_episode.txt"));
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    }

    #[test]
    fn test_partial_config_overrides() {
        let config = Config::from_toml(
            r#"
            [source]
            url = "https://example.org/show/"
            marker_class = "episode-link"

            [schedule]
            check_interval_s = 60
            announce_inventory = true
            "#,
        )
        .unwrap();
        assert_eq!(config.source.url, "https://example.org/show/");
        assert_eq!(config.source.marker_class, "episode-link");
        assert_eq!(config.source.request_timeout_ms, 30_000);
        assert_eq!(config.schedule.check_interval_s, 60);
        assert!(config.schedule.announce_inventory);
        assert_eq!(config.state.path, PathBuf::from("latest_episode.txt"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(Config::from_toml("[schedule]\ncheck_interval_s = \"soon\"").is_err());
    }

    #[test]
    fn test_zero_interval_is_error() {
        let err = Config::from_toml("[schedule]\ncheck_interval_s = 0").unwrap_err();
        assert!(err.to_string().contains("check_interval_s"));
        assert!(Config::from_toml("[schedule]\ncheck_interval_s = 1").is_ok());
    }

    #[test]
    fn test_missing_config_file_falls_back() {
        let config = Config::load_or_default(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(config.schedule.check_interval_s, 3600);
    }

    #[test]
    fn test_parse_env_lines() {
        let content = "\u{feff}# bot\nTELEGRAM_BOT_TOKEN=\"123:abc\"\n\nTELEGRAM_CHAT_ID='42'\r\nbroken line\n";
        let pairs = parse_env_lines(content);
        assert_eq!(
            pairs,
            vec![("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "42")]
        );
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("\u{feff}123:abc\r\n"), "123:abc");
        assert_eq!(sanitize_key(" 42\u{200b} "), "42");
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = Credentials {
            bot_token: "123:secret".to_string(),
            chat_id: "42".to_string(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("42"));
    }
}
