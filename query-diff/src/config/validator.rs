use crate::config::types::Config;
use crate::error::{QueryDiffError, Result};
use reqwest::Method;
use std::collections::HashSet;
use std::path::Path;

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_with_context("configuration")
    }

    /// Validation with the config file named in every message
    pub fn validate_with_context<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path_str = config_path.as_ref().to_string_lossy();

        if self.servers.is_empty() {
            return Err(QueryDiffError::invalid_config(format!(
                "No servers configured in {}. Add at least one entry to `server`.",
                config_path_str
            )));
        }

        for (index, server) in self.servers.iter().enumerate() {
            url::Url::parse(server).map_err(|e| {
                QueryDiffError::invalid_config(format!(
                    "Server {} ('{}') in {} is not a valid URL: {}",
                    index + 1,
                    server,
                    config_path_str,
                    e
                ))
            })?;
        }

        if Method::from_bytes(self.query.method.as_bytes()).is_err() {
            return Err(QueryDiffError::invalid_config(format!(
                "Invalid HTTP method '{}' in [query] of {}",
                self.query.method, config_path_str
            )));
        }

        let mut seen = HashSet::new();
        for request in &self.requests {
            if !seen.insert(request.case_id.as_str()) {
                return Err(QueryDiffError::invalid_config(format!(
                    "Duplicate case-id '{}' in {}",
                    request.case_id, config_path_str
                )));
            }
        }

        if self.diff_viewer.command.trim().is_empty() {
            return Err(QueryDiffError::invalid_config(format!(
                "Empty diff viewer command in [diff-viewer] of {}",
                config_path_str
            )));
        }

        Ok(())
    }
}
