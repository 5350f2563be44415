use std::{env, fmt, fs, io, path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitoring::checker::HTTP_TIMEOUT_SECONDS;
use crate::monitoring::scheduler::DEFAULT_INTERVAL_SECONDS;
use crate::monitoring::types::Target;
use crate::monitoring::validation::{validate_target, validate_timeout};
use crate::telegram::DEFAULT_API_BASE;

/// Environment variable overriding `bot_token`
pub const BOT_TOKEN_ENV: &str = "PINGWATCH_BOT_TOKEN";
/// Environment variable overriding `chat_id`
pub const CHAT_ID_ENV: &str = "PINGWATCH_CHAT_ID";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", .path.display())]
    ParseFailed { path: path::PathBuf, source: toml::de::Error },
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config path available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
    #[error("no config found, a template was written to {}; fill it in and restart", .0.display())]
    TemplateWritten(path::PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host name, IP address, or http(s) URL to watch
    pub target: String,
    /// Telegram bot token
    pub bot_token: String,
    /// Chat that receives transition notifications
    pub chat_id: String,
    /// Seconds between checks, 0 means the default
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_http_timeout() -> u64 {
    HTTP_TIMEOUT_SECONDS
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/pingwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("pingwatch/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: "192.168.1.1".into(),
            bot_token: String::new(),
            chat_id: String::new(),
            ping_interval: DEFAULT_INTERVAL_SECONDS,
            http_timeout_seconds: default_http_timeout(),
            api_base: default_api_base(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitor")?;
        write_1(f, "Target", &self.target)?;
        write_1(f, "Interval (s)", &self.interval().as_secs())?;
        write_1(f, "HTTP Timeout (s)", &self.http_timeout_seconds)?;
        write_title_1(f, "Telegram")?;
        write_1(f, "API Base", &self.api_base)?;
        write_1(f, "Bot Token", &mask(&self.bot_token))?;
        write_1(f, "Chat ID", &self.chat_id)?;

        Ok(())
    }
}

/// Keep the bot id part of a token (`123456:ABC...`) and hide the secret
fn mask(token: &str) -> String {
    match token.split_once(':') {
        Some((id, _)) => format!("{id}:****"),
        None if token.is_empty() => "(unset)".to_string(),
        None => "****".to_string(),
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Writes a template to ~/.config/pingwatch/config.toml, or the
    /// specified path, when no config exists yet and returns
    /// [`Error::TemplateWritten`] so the operator can fill it in.
    /// `PINGWATCH_BOT_TOKEN` and `PINGWATCH_CHAT_ID` override the file.
    ///
    /// ```rust,ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if !config_path.exists() {
            Self::default().write_config(&config_path)?;
            return Err(Error::TemplateWritten(config_path));
        }

        let mut config = Self::read_config(&config_path)?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn read_config(path: &path::Path) -> Result<Self, Error> {
        let raw_string = fs::read_to_string(path)
            .map_err(|source| Error::ReadFailed { path: path.to_path_buf(), source })?;

        toml::from_str(raw_string.as_str())
            .map_err(|source| Error::ParseFailed { path: path.to_path_buf(), source })
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| Error::WriteFailed { path: parent.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| Error::WriteFailed { path: path.to_path_buf(), source })
    }

    /// Replace credentials with values from `lookup` where present and non-empty
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(BOT_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.bot_token = token;
        }
        if let Some(chat_id) = lookup(CHAT_ID_ENV).filter(|v| !v.is_empty()) {
            self.chat_id = chat_id;
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.target.trim().is_empty() {
            return Err(Error::Invalid("target must be set".into()));
        }
        if self.bot_token.trim().is_empty() {
            return Err(Error::Invalid(format!("bot_token must be set (or {BOT_TOKEN_ENV})")));
        }
        if self.chat_id.trim().is_empty() {
            return Err(Error::Invalid(format!("chat_id must be set (or {CHAT_ID_ENV})")));
        }

        validate_target(&self.target()).map_err(|e| Error::Invalid(e.to_string()))?;
        validate_timeout(self.http_timeout_seconds).map_err(|e| Error::Invalid(e.to_string()))?;

        Ok(())
    }

    pub fn target(&self) -> Target {
        Target::parse(&self.target)
    }

    /// Check interval, falling back to the default when unset
    pub fn interval(&self) -> Duration {
        let seconds = match self.ping_interval {
            0 => DEFAULT_INTERVAL_SECONDS,
            seconds => seconds,
        };
        Duration::from_secs(seconds)
    }
}
