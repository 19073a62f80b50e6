/*
 * @file config.rs
 * @brief Runtime configuration loading and defaults
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Runtime configuration loaded from `config.json` and the environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::Error;
use crate::summary::{AliasTable, FilterRules};

/// Path to the JSON configuration file that holds runtime defaults.
pub const CONFIG_PATH: &str = "config.json";

/// Hub address used when neither the config file nor `HUB_URL` sets one.
const FALLBACK_HUB_URL: &str = "http://homeassistant.local:8123";

/// Default chat model for the Gemini backend.
const FALLBACK_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default chat model for the Ollama backend.
const FALLBACK_OLLAMA_MODEL: &str = "llama3.2:3b";

/// Per-request socket timeout applied to every HTTP call.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Number of prior messages included in each prompt.
const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Which chat backend answers the prompts.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Ollama,
}

impl std::str::FromStr for LlmProvider {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(LlmProvider::Gemini),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(Error::Config(format!("unknown LLM provider '{}'", other))),
        }
    }
}

/// Strongly typed representation of `config.json`.
///
/// Every field has a serde default so a partial file is valid.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "fallback_hub_url")]
    pub hub_url: String,
    #[serde(default)]
    pub hub_token: String,
    #[serde(default)]
    pub llm_provider: LlmProvider,
    #[serde(default)]
    pub llm_model: Option<String>,
    #[serde(default)]
    pub llm_api_key: String,
    #[serde(default)]
    pub llm_base_url: Option<String>,
    /// Entity identifier to nickname.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default = "default_blocked_keywords")]
    pub blocked_keywords: Vec<String>,
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
    /// Substrings a `sensor.*` identifier must contain. Empty disables the rule.
    #[serde(default = "default_sensor_keywords")]
    pub sensor_keywords: Vec<String>,
    #[serde(default = "default_true")]
    pub forecasts: bool,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default)]
    pub history_path: Option<PathBuf>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub speak_replies: bool,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hub_url: fallback_hub_url(),
            hub_token: String::new(),
            llm_provider: LlmProvider::default(),
            llm_model: None,
            llm_api_key: String::new(),
            llm_base_url: None,
            aliases: BTreeMap::new(),
            blocked_keywords: default_blocked_keywords(),
            allowed_domains: default_allowed_domains(),
            sensor_keywords: default_sensor_keywords(),
            forecasts: true,
            history_window: DEFAULT_HISTORY_WINDOW,
            history_path: None,
            voice: None,
            speak_replies: false,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Loads the configuration file, falling back to defaults when it is
    /// missing or invalid, then applies environment overrides.
    pub fn load(path: &Path) -> Self {
        let mut config = match Self::from_file(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("{:#}; using default configuration", err);
                Self::default()
            }
        };
        config.apply_env();
        config
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Config load error ({})", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Config parse error ({})", path.display()))
    }

    /// Overrides secrets and endpoints from environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("HUB_URL") {
            self.hub_url = url;
        }
        if let Ok(token) = env::var("HUB_TOKEN") {
            self.hub_token = token;
        }
        if let Some(provider) = env::var("LLM_PROVIDER").ok().and_then(|p| p.parse().ok()) {
            self.llm_provider = provider;
        }
        if let Ok(model) = env::var("LLM_MODEL") {
            self.llm_model = Some(model);
        }
        if let Ok(key) = env::var("LLM_API_KEY").or_else(|_| env::var("GEMINI_API_KEY")) {
            self.llm_api_key = key;
        }
        if let Ok(base) = env::var("LLM_BASE_URL") {
            self.llm_base_url = Some(base);
        }
        if let Ok(voice) = env::var("HEARTH_VOICE") {
            self.voice = Some(voice);
        }
        if let Ok(path) = env::var("HEARTH_HISTORY") {
            self.history_path = Some(PathBuf::from(path));
        }
    }

    /// Checks that the secrets needed for a turn are present.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first missing value.
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if self.hub_url.trim().is_empty() {
            return Err(Error::Config("hub URL is empty (set HUB_URL)".to_string()));
        }
        if self.hub_token.trim().is_empty() {
            return Err(Error::Config("hub token is missing (set HUB_TOKEN)".to_string()));
        }
        if self.llm_provider == LlmProvider::Gemini && self.llm_api_key.trim().is_empty() {
            return Err(Error::Config(
                "LLM API key is missing (set LLM_API_KEY or GEMINI_API_KEY)".to_string(),
            ));
        }
        Ok(())
    }

    /// Model identifier, defaulting per provider.
    pub fn model(&self) -> String {
        self.llm_model.clone().unwrap_or_else(|| match self.llm_provider {
            LlmProvider::Gemini => FALLBACK_GEMINI_MODEL.to_string(),
            LlmProvider::Ollama => FALLBACK_OLLAMA_MODEL.to_string(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            blocked_keywords: self.blocked_keywords.clone(),
            allowed_domains: self.allowed_domains.clone(),
            sensor_keywords: self.sensor_keywords.clone(),
        }
    }

    pub fn alias_table(&self) -> AliasTable {
        AliasTable::new(self.aliases.clone())
    }
}

fn fallback_hub_url() -> String {
    FALLBACK_HUB_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_window() -> usize {
    DEFAULT_HISTORY_WINDOW
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Telemetry-style names that flood the prompt without helping the model.
fn default_blocked_keywords() -> Vec<String> {
    [
        "Voltage",
        "Current",
        "Power factor",
        "Frequency",
        "Energy",
        "Apparent power",
        "CPU usage",
        "SSID",
        "IP Address",
        "Uptime",
        "Signal strength",
        "BSSID",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_allowed_domains() -> Vec<String> {
    [
        "light",
        "switch",
        "sensor",
        "climate",
        "cover",
        "lock",
        "weather",
        "media_player",
        "person",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_sensor_keywords() -> Vec<String> {
    ["temp", "humid", "battery"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"hub_url": "http://ha:8123", "hub_token": "t"}"#).unwrap();
        assert_eq!(cfg.hub_url, "http://ha:8123");
        assert_eq!(cfg.history_window, 5);
        assert!(cfg.allowed_domains.contains(&"weather".to_string()));
        assert!(cfg.blocked_keywords.contains(&"Voltage".to_string()));
        assert_eq!(cfg.llm_provider, LlmProvider::Gemini);
    }

    #[test]
    fn operator_lists_replace_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"allowed_domains": ["light"], "blocked_keywords": [], "sensor_keywords": []}"#,
        )
        .unwrap();
        let rules = cfg.filter_rules();
        assert_eq!(rules.allowed_domains, vec!["light".to_string()]);
        assert!(rules.blocked_keywords.is_empty());
        assert!(rules.sensor_keywords.is_empty());
    }

    #[test]
    fn validate_requires_hub_token() {
        let cfg = AppConfig {
            llm_api_key: "k".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn ollama_needs_no_api_key() {
        let cfg = AppConfig {
            hub_token: "t".to_string(),
            llm_provider: LlmProvider::Ollama,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.model(), "llama3.2:3b");
    }

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("Ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert!("gpt".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("hearth_missing_config.json");
        assert!(AppConfig::from_file(&path).is_err());
    }
}
