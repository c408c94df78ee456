use crate::config::types::Config;
use crate::error::{QueryDiffError, Result};
use log::debug;
use std::path::Path;

/// Configuration loader trait
pub trait ConfigLoader {
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config>;
    fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<Config>;
}

/// Default configuration loader implementation
pub struct DefaultConfigLoader;

impl ConfigLoader for DefaultConfigLoader {
    /// Load configuration from a kamoshika.toml file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = std::fs::read_to_string(&path).map_err(|_| QueryDiffError::ConfigNotFound {
            path: path.as_ref().to_path_buf(),
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load and validate configuration with enhanced error context
    fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(QueryDiffError::ConfigNotFound {
                path: path_ref.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path_ref).map_err(QueryDiffError::Io)?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            QueryDiffError::invalid_config(format!(
                "Failed to parse TOML in {}: {}",
                path_ref.display(),
                e
            ))
        })?;

        config.validate_with_context(path_ref)?;
        debug!(
            "loaded config ({}): {} servers, {} requests, post process mode '{}'",
            path_ref.display(),
            config.servers.len(),
            config.requests.len(),
            config.post_process.mode
        );
        Ok(config)
    }
}

impl Config {
    /// Load configuration without validation
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_from_file(path)
    }

    /// Load configuration and validate it
    pub fn load_with_validation<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_with_validation(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        match Config::load_with_validation(&path) {
            Err(QueryDiffError::ConfigNotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kamoshika.toml");
        std::fs::write(
            &path,
            "server = [\"http://127.0.0.1:1/\"]\n[[request]]\ncase-id = \"smoke\"\n",
        )
        .unwrap();

        let config = Config::load_with_validation(&path).unwrap();
        assert_eq!(config.requests.len(), 1);
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "server = [").unwrap();

        let error = Config::load_with_validation(&path).unwrap_err();
        assert!(error.to_string().contains("broken.toml"));
    }
}
