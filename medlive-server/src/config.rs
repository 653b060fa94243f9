//! Configuration management

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where transcript events come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineSource {
    /// JSON-lines records on this process' stdin
    Stdin,
    /// External recognizer process (see `EngineConfig::command`)
    Command,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub source: EngineSource,

    /// Recognizer executable, used when `source = "command"`
    pub command: String,

    /// Arguments for the recognizer executable
    pub args: Vec<String>,

    /// Model selection override
    /// Options: "auto" (GPU-based), or any model name the recognizer accepts
    pub model_override: String,

    /// Transcription language
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source: EngineSource::Stdin,
            command: String::new(),
            args: Vec::new(),
            model_override: "auto".to_string(),
            language: "de".to_string(),
        }
    }
}

/// Noise filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Partial transcripts matching one of these (trimmed, case-insensitive) are dropped
    pub suppressed_phrases: Vec<String>,

    /// Final transcripts with at most this many characters are dropped
    pub min_final_chars: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            suppressed_phrases: crate::filter::DEFAULT_SUPPRESSED_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            min_final_chars: crate::filter::DEFAULT_MIN_FINAL_CHARS,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Listen address
    pub bind_address: String,

    /// Listen port
    pub port: u16,

    /// PEM certificate chain
    pub cert_path: PathBuf,

    /// PEM private key
    pub key_path: PathBuf,

    /// Frames buffered per client before it counts as unreachable
    pub outbound_queue: usize,

    /// Seconds allowed for the TLS + WebSocket handshake
    pub handshake_timeout_secs: u64,

    pub engine: EngineConfig,

    pub filter: FilterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            bind_address: "0.0.0.0".to_string(),
            port: 5001,
            cert_path: PathBuf::from("server.crt"),
            key_path: PathBuf::from("server.key"),
            outbound_queue: 256,
            handshake_timeout_secs: 10,
            engine: EngineConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the default location, or create it
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    /// Load configuration from `config_path`, writing defaults if it does not exist.
    ///
    /// Not validated here: command-line overrides are applied first, then
    /// the caller runs [`ServerConfig::validate`].
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context("Failed to read config file")?;

            let mut config: ServerConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            config.config_path = config_path.to_path_buf();
            config
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                ..Self::default()
            };
            config.save()
                .context("Failed to save default config")?;
            config
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if self.outbound_queue == 0 {
            bail!("outbound_queue must be at least 1");
        }
        if self.engine.source == EngineSource::Command && self.engine.command.trim().is_empty() {
            bail!("engine.source = \"command\" requires engine.command");
        }
        Ok(())
    }

    /// `bind_address:port`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("MedLive")
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("medlive")
        };

        config_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5001);
        assert_eq!(config.listen_address(), "0.0.0.0:5001");
        assert_eq!(config.filter.min_final_chars, 3);
        assert_eq!(config.filter.suppressed_phrases.len(), 4);
        assert_eq!(config.engine.source, EngineSource::Stdin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ServerConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.config_path, path);
        assert_eq!(config.port, 5001);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
port = 6001

[engine]
source = "command"
command = "python"
args = ["recognizer.py"]
"#,
        )
        .unwrap();

        let config = ServerConfig::load_from(&path).unwrap();
        assert_eq!(config.port, 6001);
        assert_eq!(config.engine.source, EngineSource::Command);
        assert_eq!(config.engine.args, vec!["recognizer.py".to_string()]);
        assert_eq!(config.engine.language, "de");
        assert_eq!(config.outbound_queue, 256);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = 0\n").unwrap();
        assert!(ServerConfig::load_from(&path).unwrap().validate().is_err());

        std::fs::write(&path, "[engine]\nsource = \"command\"\n").unwrap();
        assert!(ServerConfig::load_from(&path).unwrap().validate().is_err());

        std::fs::write(&path, "port = \"not a number\"\n").unwrap();
        assert!(ServerConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.config_path = dir.path().join("config.toml");
        config.filter.suppressed_phrases.push("untertitel.".to_string());
        config.save().unwrap();

        let loaded = ServerConfig::load_from(&config.config_path).unwrap();
        assert_eq!(loaded.filter.suppressed_phrases.len(), 5);
    }
}
