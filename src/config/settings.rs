//! Configuration settings for the assay query service.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub oracle: OracleConfig,
    pub analytics: AnalyticsProviderConfig,
    pub seo: SeoProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            oracle: OracleConfig::default(),
            analytics: AnalyticsProviderConfig::default(),
            seo: SeoProviderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        // Try standard config locations
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("assay.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("assay/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".assay/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.oracle.base_url.is_empty() {
            return Err(ConfigError::MissingField("oracle.base_url".to_string()).into());
        }
        if self.oracle.model.is_empty() {
            return Err(ConfigError::MissingField("oracle.model".to_string()).into());
        }
        if self.oracle.max_retries == 0 {
            return Err(ConfigError::Invalid("oracle.max_retries must be > 0".to_string()).into());
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".to_string()).into());
        }

        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Text-generation oracle configuration (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Base URL for the chat completions API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key (loaded from environment if not set)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum attempts per completion
    pub max_retries: u32,
    /// Base backoff delay in milliseconds, doubled per attempt
    pub retry_base_delay_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_retries: 5,
            retry_base_delay_ms: 1000,
        }
    }
}

impl OracleConfig {
    /// Resolve the API key from config or the `ORACLE_API_KEY` env var.
    pub fn resolve_api_key(&self) -> Result<String> {
        resolve_credential(&self.api_key, &None, "ORACLE_API_KEY")
    }
}

/// Analytics report provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsProviderConfig {
    /// Base URL for the analytics data API
    pub base_url: String,
    /// Bearer token (loaded from file or environment if not set)
    pub access_token: Option<String>,
    /// Path to a file whose contents are the bearer token
    pub credentials_path: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnalyticsProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://analyticsdata.googleapis.com".to_string(),
            access_token: None,
            credentials_path: None,
            timeout_secs: 30,
        }
    }
}

impl AnalyticsProviderConfig {
    /// Resolve the bearer token from config, token file, or
    /// the `ANALYTICS_ACCESS_TOKEN` env var.
    pub fn resolve_token(&self) -> Result<String> {
        resolve_credential(
            &self.access_token,
            &self.credentials_path,
            "ANALYTICS_ACCESS_TOKEN",
        )
    }
}

/// SEO spreadsheet provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoProviderConfig {
    /// Base URL for the spreadsheet values API
    pub base_url: String,
    /// Spreadsheet identifier holding the crawl export
    pub spreadsheet_id: String,
    /// Cell range to fetch
    pub range: String,
    /// Bearer token (loaded from file or environment if not set)
    pub access_token: Option<String>,
    /// Path to a file whose contents are the bearer token
    pub credentials_path: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// How long a fetched dataset stays fresh
    pub cache_ttl_secs: u64,
}

impl Default for SeoProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: String::new(),
            range: "Sheet1!A1:ZZ".to_string(),
            access_token: None,
            credentials_path: None,
            timeout_secs: 30,
            cache_ttl_secs: 300,
        }
    }
}

impl SeoProviderConfig {
    /// Resolve the bearer token from config, token file, or
    /// the `SHEETS_ACCESS_TOKEN` env var.
    pub fn resolve_token(&self) -> Result<String> {
        resolve_credential(
            &self.access_token,
            &self.credentials_path,
            "SHEETS_ACCESS_TOKEN",
        )
    }
}

/// Credential lookup chain: explicit value, token file, environment.
fn resolve_credential(
    explicit: &Option<String>,
    file_path: &Option<String>,
    env_var: &str,
) -> Result<String> {
    if let Some(value) = explicit {
        if !value.is_empty() {
            return Ok(value.clone());
        }
    }

    if let Some(path) = file_path {
        let expanded = shellexpand::tilde(path);
        let content = std::fs::read_to_string(expanded.as_ref()).map_err(|e| {
            ConfigError::MissingCredential(format!("failed to read {}: {}", path, e))
        })?;
        let token = content.trim();
        if token.is_empty() {
            return Err(
                ConfigError::MissingCredential(format!("token file {} is empty", path)).into(),
            );
        }
        return Ok(token.to_string());
    }

    std::env::var(env_var).ok().filter(|v| !v.is_empty()).ok_or_else(|| {
        ConfigError::MissingCredential(format!("set {} or configure a token", env_var)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.oracle.max_retries, 5);
        assert_eq!(config.oracle.timeout_secs, 60);
        assert_eq!(config.seo.cache_ttl_secs, 300);
        assert_eq!(config.seo.range, "Sheet1!A1:ZZ");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [oracle]
            model = "gpt-4o"
            max_retries = 3

            [seo]
            spreadsheet_id = "abc123"
            cache_ttl_secs = 60
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.oracle.model, "gpt-4o");
        assert_eq!(config.oracle.max_retries, 3);
        assert_eq!(config.seo.spreadsheet_id, "abc123");
        assert_eq!(config.seo.cache_ttl_secs, 60);
    }

    #[test]
    fn test_validate_empty_model() {
        let toml = r#"
            [oracle]
            model = ""
        "#;

        let result = Config::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_retries() {
        let toml = r#"
            [oracle]
            max_retries = 0
        "#;

        let result = Config::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 3000").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_credential_from_explicit_value() {
        let token = resolve_credential(
            &Some("tok-123".to_string()),
            &None,
            "ASSAY_TEST_UNSET_VAR",
        )
        .unwrap();
        assert_eq!(token, "tok-123");
    }

    #[test]
    fn test_credential_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  tok-from-file  ").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let token =
            resolve_credential(&None, &Some(path), "ASSAY_TEST_UNSET_VAR").unwrap();
        assert_eq!(token, "tok-from-file");
    }

    #[test]
    fn test_credential_missing() {
        let result = resolve_credential(&None, &None, "ASSAY_TEST_UNSET_VAR");
        assert!(result.is_err());
    }
}
