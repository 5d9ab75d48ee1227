use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_AGENT_URL: &str =
    "https://agent-prod.studio.lyzr.ai/v3/inference/chat/";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Proxy server configuration, read from the environment once at startup
/// and passed by reference from then on.
///
/// A missing API key is not a startup error: the server still runs and
/// answers 500 on every chat request until the operator sets the key.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub agent_url: String,
    pub api_key: Option<String>,
    pub user_id: String,
    pub agent_id: String,
    pub session_id: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            listen_addr: env_or("MENTOR_LISTEN", DEFAULT_LISTEN_ADDR),
            agent_url: env_or("MENTOR_AGENT_URL", DEFAULT_AGENT_URL),
            api_key: std::env::var("MENTOR_API_KEY").ok().filter(|k| !k.is_empty()),
            user_id: env_or("MENTOR_USER_ID", ""),
            agent_id: env_or("MENTOR_AGENT_ID", ""),
            session_id: env_or("MENTOR_SESSION_ID", ""),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Client-side settings, stored as JSON under the user config directory.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientConfig {
    pub server_url: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self { server_url: None }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Resolution order: environment, then config file, then the default.
    pub fn server_url(&self) -> String {
        std::env::var("MENTOR_SERVER_URL")
            .ok()
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("mentor").join("config.json"))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mentor").join("config.json");

        let config = ClientConfig {
            server_url: Some("http://10.0.0.2:5000".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = ClientConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server_url.as_deref(), Some("http://10.0.0.2:5000"));
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ClientConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert!(loaded.server_url.is_none());
    }
}
