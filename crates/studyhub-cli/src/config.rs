use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{debug, warn};

use studyhub_core::GatewayConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_base_url() -> String {
    studyhub_core::providers::openai::DEFAULT_OPENAI_BASE_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    studyhub_core::providers::gemini::DEFAULT_GEMINI_BASE_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.studyhub".to_string()
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".studyhub")
}

impl HubConfig {
    /// Load the config file, or fall back to defaults when none exists yet.
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = custom_path
            .clone()
            .unwrap_or_else(|| config_dir().join("config.toml"));

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config at {}", path.display()));
            }
        };

        // Expand environment variables before parsing
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            openai_model: self.providers.openai.model.clone(),
            openai_base_url: self.providers.openai.base_url.clone(),
            gemini_model: self.providers.gemini.model.clone(),
            gemini_base_url: self.providers.gemini.base_url.clone(),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid server address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }

    /// Resolve the data directory, expanding a leading `~/`.
    pub fn data_dir(&self) -> PathBuf {
        let raw = &self.storage.data_dir;
        if let Some(rest) = raw.strip_prefix("~/") {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(rest)
        } else {
            PathBuf::from(raw)
        }
    }
}

/// Allowlist of environment variable names that may be expanded in config files.
/// This prevents an attacker who can modify the config from reading arbitrary env vars.
const ALLOWED_ENV_VARS: &[&str] = &["OPENAI_API_KEY", "GEMINI_API_KEY", "HOME", "USER"];

fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while pos < result.len() {
        if let Some(start) = result[pos..].find("${") {
            let abs_start = pos + start;
            if let Some(end) = result[abs_start..].find('}') {
                let var_name = result[abs_start + 2..abs_start + end].to_string();

                // Only expand variables in the allowlist
                let value = if ALLOWED_ENV_VARS.contains(&var_name.as_str()) {
                    std::env::var(&var_name).unwrap_or_default()
                } else {
                    warn!(
                        "Skipping expansion of unrecognized env var '{}' in config (not in allowlist)",
                        var_name
                    );
                    // Leave the ${VAR} unexpanded so it's obvious
                    pos = abs_start + end + 1;
                    continue;
                };

                let value_len = value.len();
                result = format!(
                    "{}{}{}",
                    &result[..abs_start],
                    value,
                    &result[abs_start + end + 1..]
                );
                pos = abs_start + value_len; // Skip past the expanded value
            } else {
                break;
            }
        } else {
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.providers.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.providers.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.storage.data_dir, "~/.studyhub");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: HubConfig = toml::from_str(
            r#"
            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.providers.gemini.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = Some(PathBuf::from("/nonexistent/studyhub/config.toml"));
        let config = HubConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 5001);
    }

    #[test]
    fn test_expand_env_vars_allowlist() {
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        let expanded = expand_env_vars("key = \"${OPENAI_API_KEY}\"");
        assert_eq!(expanded, "key = \"sk-test\"");

        let untouched = expand_env_vars("key = \"${SECRET_THING}\"");
        assert_eq!(untouched, "key = \"${SECRET_THING}\"");
    }

    #[test]
    fn test_bind_addr() {
        let config = HubConfig::default();
        assert_eq!(config.bind_addr().unwrap().port(), 5001);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: HubConfig = toml::from_str(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config.server.port, 5001);
    }
}
