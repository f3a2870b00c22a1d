//! Configuration system for `aierror`.
//!
//! Everything the analyzer needs is carried in a [`Config`] value. Only
//! [`Config::from_env`] touches the process environment.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::providers::{Credentials, ProviderKind};

/// Local Ollama fallback settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LocalConfig {
    /// Fall back to the local server when hosted providers fail
    pub enabled: bool,
    /// Ollama generate endpoint
    pub url: String,
    /// Model name passed to Ollama
    pub model: String,
    /// Generation-length cap (`num_predict`)
    pub num_predict: u32,
    /// Request timeout in seconds; 0 means the default
    pub timeout_secs: u64,
}

const DEFAULT_LOCAL_TIMEOUT_SECS: u64 = 60;

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:11434/api/generate".to_string(),
            model: "phi3".to_string(),
            num_predict: 200,
            timeout_secs: DEFAULT_LOCAL_TIMEOUT_SECS,
        }
    }
}

impl LocalConfig {
    /// Request timeout, with zero mapped to the default
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_LOCAL_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

/// Model identifiers for the hosted providers
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    pub gemini: String,
    pub deepseek: String,
    pub openai: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gemini: "gemini-1.5-flash".to_string(),
            deepseek: "deepseek-chat".to_string(),
            openai: "gpt-4o-mini".to_string(),
        }
    }
}

impl ModelConfig {
    /// Model for a provider; `None` for the local provider
    pub fn for_provider(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::Gemini => Some(&self.gemini),
            ProviderKind::DeepSeek => Some(&self.deepseek),
            ProviderKind::OpenAI => Some(&self.openai),
            ProviderKind::Local => None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Dump raw provider bodies on stderr when a response can't be used
    pub debug: bool,
    pub local: LocalConfig,
    pub models: ModelConfig,
    /// API keys are never read from the config file
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Config {
    /// Build the full configuration: `.env`, config file, then environment
    pub fn from_env() -> Self {
        // A missing or unreadable .env is not an error
        let _ = dotenvy::dotenv();

        let mut config = Self::load();
        config.credentials = Credentials::from_env();
        config.apply_env_overrides();
        config
    }

    /// Load config from file, returning default config if file doesn't exist
    pub fn load() -> Self {
        Self::load_from_path(Self::config_path())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| toml::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Get the config file path (~/.config/aierror/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aierror").join("config.toml"))
    }

    /// Builder: replace the credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| env::var(name).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| lookup(name).is_some_and(|v| v == "1");

        // AIERROR_DEBUG=1 dumps raw responses
        if flag("AIERROR_DEBUG") {
            self.debug = true;
        }
        // AIERROR_NO_LOCAL=1 skips the Ollama fallback
        if flag("AIERROR_NO_LOCAL") {
            self.local.enabled = false;
        }
    }
}

/// Generate default config as TOML string
pub fn generate_default_config() -> String {
    r#"# aierror configuration
# Place this file at ~/.config/aierror/config.toml
#
# API keys are read from the environment (or a .env file), never from here:
#   GEMINI_API_KEY, DEEPSEEK_API_KEY, OPENAI_API_KEY
# Providers are tried in that order; the local server is the last resort.

# Dump raw provider responses to stderr when they can't be used
debug = false

[local]
# Fall back to a local Ollama server (default: true)
enabled = true
url = "http://localhost:11434/api/generate"
model = "phi3"
# Maximum tokens to generate
num_predict = 200
timeout_secs = 60

[models]
gemini = "gemini-1.5-flash"
deepseek = "deepseek-chat"
openai = "gpt-4o-mini"

# Environment variable overrides:
# AIERROR_DEBUG=1    - Enable debug dumps
# AIERROR_NO_LOCAL=1 - Disable the local fallback
"#
    .to_string()
}

/// Print the default config to stdout
pub fn print_default_config() {
    print!("{}", generate_default_config());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.debug);
        assert!(config.local.enabled);
        assert_eq!(config.local.url, "http://localhost:11434/api/generate");
        assert_eq!(config.local.model, "phi3");
        assert_eq!(config.local.num_predict, 200);
        assert_eq!(config.local.timeout_secs, 60);
        assert_eq!(config.models.gemini, "gemini-1.5-flash");
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let parsed: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_from_path_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[local]\nmodel = \"llama3\"\nenabled = false").unwrap();

        let config = Config::load_from_path(Some(file.path().to_path_buf()));
        assert_eq!(config.local.model, "llama3");
        assert!(!config.local.enabled);
        assert_eq!(config.local.num_predict, 200);
        assert_eq!(config.models.openai, "gpt-4o-mini");
    }

    #[test]
    fn test_load_from_path_invalid_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is = = not toml").unwrap();

        let config = Config::load_from_path(Some(file.path().to_path_buf()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_missing_path() {
        let config = Config::load_from_path(Some(PathBuf::from("/nonexistent/aierror.toml")));
        assert_eq!(config, Config::default());
        assert_eq!(Config::load_from_path(None), Config::default());
    }

    #[test]
    fn test_models_for_provider() {
        let models = ModelConfig::default();
        assert_eq!(models.for_provider(ProviderKind::DeepSeek), Some("deepseek-chat"));
        assert_eq!(models.for_provider(ProviderKind::Local), None);
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let mut local = LocalConfig::default();
        assert_eq!(local.timeout(), Duration::from_secs(60));

        local.timeout_secs = 0;
        assert_eq!(local.timeout(), Duration::from_secs(60));

        local.timeout_secs = 5;
        assert_eq!(local.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_only_honor_literal_one() {
        let mut config = Config::default();
        config.apply_overrides_from(|name| match name {
            "AIERROR_DEBUG" => Some("true".to_string()),
            "AIERROR_NO_LOCAL" => Some("0".to_string()),
            _ => None,
        });
        assert!(!config.debug);
        assert!(config.local.enabled);

        config.apply_overrides_from(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides_set_debug_and_disable_local() {
        env::set_var("AIERROR_DEBUG", "1");
        env::set_var("AIERROR_NO_LOCAL", "1");

        let mut config = Config::default();
        config.apply_env_overrides();

        env::remove_var("AIERROR_DEBUG");
        env::remove_var("AIERROR_NO_LOCAL");

        assert!(config.debug);
        assert!(!config.local.enabled);
    }

    #[test]
    fn test_with_credentials() {
        let config = Config::default()
            .with_credentials(Credentials::new().with(ProviderKind::Gemini, "g-key"));
        assert_eq!(config.credentials.get(ProviderKind::Gemini), Some("g-key"));
    }
}
