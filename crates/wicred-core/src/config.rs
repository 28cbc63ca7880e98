use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{WicredError, WicredResult};

/// Top-level configuration (loaded from wicred.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WicredConfig {
    pub keys: KeyStoreConfig,
    pub logging: LoggingConfig,
}

/// Where the persisted RSA keypair lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStoreConfig {
    /// Private key PEM path (default: /private.pem, matching the
    /// controller's flash filesystem layout)
    pub private_key: PathBuf,
    /// Public key PEM path (default: /public.pem)
    pub public_key: PathBuf,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            private_key: PathBuf::from("/private.pem"),
            public_key: PathBuf::from("/public.pem"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub log_level: String,
    /// Log format: "json" or "text"
    pub log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            log_format: "text".into(),
        }
    }
}

impl WicredConfig {
    /// Load configuration from a TOML file. Missing file yields defaults.
    pub fn load(path: &Path) -> WicredResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| WicredError::Config(format!("parsing {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = WicredConfig::load(Path::new("/nonexistent/wicred.toml")).unwrap();
        assert_eq!(cfg.keys.private_key, PathBuf::from("/private.pem"));
        assert_eq!(cfg.logging.log_level, "info");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wicred.toml");
        std::fs::write(&path, "[keys]\nprivate_key = \"/data/priv.pem\"\n").unwrap();

        let cfg = WicredConfig::load(&path).unwrap();
        assert_eq!(cfg.keys.private_key, PathBuf::from("/data/priv.pem"));
        assert_eq!(cfg.keys.public_key, PathBuf::from("/public.pem"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wicred.toml");
        std::fs::write(&path, "keys = not-a-table").unwrap();

        let err = WicredConfig::load(&path).unwrap_err();
        assert!(matches!(err, WicredError::Config(_)));
    }
}
