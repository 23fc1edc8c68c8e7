//! # Remote Configuration
//!
//! Configuration for the intent classifier and the persistence webhook.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DUKA_GEMINI_API_KEY=...   (or GEMINI_API_KEY)                      │
//! │     DUKA_WEBHOOK_URL=https://script.google.com/macros/s/.../exec       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/remote.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.duka.pos/remote.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no API key (offline), no webhook (local only)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # remote.toml
//! [classifier]
//! api_key = "..."
//! model = "gemini-2.5-flash"
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! timeout_secs = 30
//!
//! [sink]
//! webhook_url = "https://script.google.com/macros/s/XXXX/exec"
//! timeout_secs = 15
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{RemoteError, RemoteResult};

// =============================================================================
// Classifier Settings
// =============================================================================

/// Settings for the hosted language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// API key. Without one the assistant runs offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name used in the `generateContent` path.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout (seconds).
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_classifier_timeout() -> u64 {
    30
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        ClassifierSettings {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_classifier_timeout(),
        }
    }
}

impl ClassifierSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn validate(&self) -> RemoteResult<()> {
        if self.model.trim().is_empty() {
            return Err(RemoteError::InvalidConfig("classifier model must not be empty".into()));
        }
        validate_http_url("classifier endpoint", &self.endpoint)?;
        if self.timeout_secs == 0 {
            return Err(RemoteError::InvalidConfig(
                "classifier timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Replaces invalid fields with defaults. The API key is kept.
    fn repair(&mut self) {
        let defaults = ClassifierSettings::default();
        if self.model.trim().is_empty() {
            self.model = defaults.model;
        }
        if validate_http_url("classifier endpoint", &self.endpoint).is_err() {
            self.endpoint = defaults.endpoint;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = defaults.timeout_secs;
        }
    }
}

// =============================================================================
// Sink Settings
// =============================================================================

/// Settings for the spreadsheet webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkSettings {
    /// Webhook URL. Without one sales stay local.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Request timeout (seconds).
    #[serde(default = "default_sink_timeout")]
    pub timeout_secs: u64,
}

fn default_sink_timeout() -> u64 {
    15
}

impl Default for SinkSettings {
    fn default() -> Self {
        SinkSettings {
            webhook_url: None,
            timeout_secs: default_sink_timeout(),
        }
    }
}

impl SinkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    pub fn validate(&self) -> RemoteResult<()> {
        if let Some(ref url) = self.webhook_url {
            validate_http_url("webhook URL", url)?;
        }
        if self.timeout_secs == 0 {
            return Err(RemoteError::InvalidConfig(
                "webhook timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Drops an unusable URL, so sales stay local, and restores a zero timeout.
    fn repair(&mut self) {
        if let Some(ref url) = self.webhook_url {
            if validate_http_url("webhook URL", url).is_err() {
                self.webhook_url = None;
            }
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_sink_timeout();
        }
    }
}

// =============================================================================
// Main Remote Configuration
// =============================================================================

/// Complete remote configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub classifier: ClassifierSettings,

    #[serde(default)]
    pub sink: SinkSettings,
}

impl RemoteConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (remote.toml)
    /// 3. Environment variables
    ///
    /// Fails on the first unreadable file or invalid value.
    pub fn load(config_path: Option<PathBuf>) -> RemoteResult<Self> {
        let mut config = Self::read_file(config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config without failing.
    ///
    /// An unreadable file falls back to defaults before the environment is
    /// applied; an invalid section is reset on its own (see [`Self::repair`]).
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load_lenient(config_path, |key| std::env::var(key).ok())
    }

    fn load_lenient<F>(config_path: Option<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::read_file(config_path).unwrap_or_else(|e| {
            warn!("Failed to read remote config file: {}. Using defaults.", e);
            Self::default()
        });
        config.apply_overrides(lookup);
        config.repair();
        config
    }

    fn read_file(config_path: Option<PathBuf>) -> RemoteResult<Self> {
        match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading remote config from file");
                let contents = std::fs::read_to_string(&path)?;
                Ok(toml::from_str(&contents)?)
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> RemoteResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| RemoteError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Remote config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> RemoteResult<()> {
        self.classifier.validate()?;
        self.sink.validate()
    }

    /// Resets each invalid value to its default, leaving valid ones alone.
    ///
    /// A bad webhook URL turns forwarding off but keeps the classifier, and a
    /// bad classifier endpoint never touches the webhook.
    pub fn repair(&mut self) {
        if let Err(e) = self.classifier.validate() {
            warn!("Invalid classifier settings: {}. Resetting to defaults.", e);
            self.classifier.repair();
        }
        if let Err(e) = self.sink.validate() {
            warn!("Invalid webhook settings: {}. Resetting to defaults.", e);
            self.sink.repair();
        }
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("DUKA_GEMINI_API_KEY").or_else(|| lookup("GEMINI_API_KEY")) {
            debug!("Overriding classifier API key from environment");
            self.classifier.api_key = Some(key);
        }

        if let Some(model) = lookup("DUKA_GEMINI_MODEL") {
            debug!(model = %model, "Overriding classifier model from environment");
            self.classifier.model = model;
        }

        if let Some(endpoint) = lookup("DUKA_GEMINI_ENDPOINT") {
            debug!(
                host = %host_of(&endpoint),
                "Overriding classifier endpoint from environment"
            );
            self.classifier.endpoint = endpoint;
        }

        if let Some(url) = lookup("DUKA_WEBHOOK_URL") {
            debug!(host = %host_of(&url), "Overriding webhook URL from environment");
            self.sink.webhook_url = Some(url);
        }

        if let Some(secs) = lookup("DUKA_CLASSIFIER_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.classifier.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid DUKA_CLASSIFIER_TIMEOUT_SECS"),
            }
        }

        if let Some(secs) = lookup("DUKA_SINK_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.sink.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid DUKA_SINK_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "duka", "pos")
            .map(|dirs| dirs.config_dir().join("remote.toml"))
    }
}

/// Parses and checks an `http(s)` URL.
///
/// Errors name the host at most; a webhook URL is itself the credential.
pub(crate) fn validate_http_url(what: &str, raw: &str) -> RemoteResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| RemoteError::InvalidUrl(format!("{what}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(RemoteError::InvalidUrl(format!(
            "{what} must start with http:// or https://, got scheme '{}'",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Host part of a URL, for logs.
pub(crate) fn url_host(url: &Url) -> &str {
    url.host_str().unwrap_or("<no host>")
}

fn host_of(raw: &str) -> String {
    Url::parse(raw.trim())
        .map(|url| url_host(&url).to_string())
        .unwrap_or_else(|_| "<invalid url>".to_string())
}
