//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILREPLY_CONFIG` (environment variable)
//! 2. `~/.config/mailreply/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailreply\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compose::reply::ThreadingMode;
use crate::parser::body::ResolveOptions;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Body resolution settings.
    pub resolve: ResolveConfig,
    /// Reply composition settings.
    pub compose: ComposeConfig,
    /// List preview settings.
    pub preview: PreviewConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override directory for the log file.
    pub log_dir: Option<PathBuf>,
}

/// Body resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Skip parts with malformed base64 instead of decoding them best-effort.
    pub strict_decoding: bool,
}

/// Reply composition settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Value of the `From` header on replies.
    pub from: String,
    /// "provider-id" or "message-id".
    pub threading: ThreadingMode,
}

/// List preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Reduce HTML bodies to plain text.
    pub strip_html: bool,
    /// Truncate bodies to this many characters (0 = no limit).
    pub max_chars: usize,
    /// Subject shown when the message has none.
    pub empty_subject: String,
    /// Body shown when no body could be resolved.
    pub empty_body: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            from: "me".to_string(),
            threading: ThreadingMode::ProviderId,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            strip_html: false,
            max_chars: 0,
            empty_subject: "No Subject".to_string(),
            empty_body: "No body content".to_string(),
        }
    }
}

impl ResolveConfig {
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            strict: self.strict_decoding,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILREPLY_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailreply").join("config.toml"))
}

/// Return the directory for the log file.
pub fn log_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.log_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailreply")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert!(!cfg.resolve.strict_decoding);
        assert_eq!(cfg.compose.from, "me");
        assert_eq!(cfg.compose.threading, ThreadingMode::ProviderId);
        assert_eq!(cfg.preview.empty_subject, "No Subject");
        assert_eq!(cfg.preview.empty_body, "No body content");
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.compose, cfg.compose);
        assert_eq!(parsed.preview.max_chars, cfg.preview.max_chars);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[compose]
threading = "message-id"

[resolve]
strict_decoding = true
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.compose.threading, ThreadingMode::MessageId);
        assert!(cfg.resolve.options().strict);
        // Other fields use defaults
        assert_eq!(cfg.compose.from, "me");
        assert_eq!(cfg.general.log_level, "warn");
        assert!(!cfg.preview.strip_html);
    }

    #[test]
    fn test_unknown_threading_mode_is_rejected() {
        let bad = "[compose]\nthreading = \"subject\"\n";
        assert!(toml::from_str::<Config>(bad).is_err());
    }

    #[test]
    fn test_log_dir_override() {
        let mut cfg = Config::default();
        cfg.general.log_dir = Some(PathBuf::from("/tmp/mailreply-logs"));
        assert_eq!(log_dir(&cfg), PathBuf::from("/tmp/mailreply-logs"));
    }
}
