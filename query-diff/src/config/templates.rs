use crate::error::{QueryDiffError, Result};

/// Generate default kamoshika.toml template with examples
pub fn generate_default_config_template() -> String {
    r#"# Kamoshika configuration
# Every request is sent to each server in order; the Nth server's response
# is saved as {file_name_prefix}{N}{file_name_postfix}.

server = [
    "http://localhost:8080/api",
    "http://localhost:8081/api",
]

# Query execution settings (optional)
[query]
method = "POST"
# form | json | query (GET always sends parameters as the query string)
body = "form"
timeout_seconds = 30
follow_redirects = true
# Abort the run when a server answers with a non-2xx status
fail_on_error_status = false

[query.headers]
"User-Agent" = "kamoshika/0.1"

# Post-process settings applied to every captured response
[post-query-filters]
# disabled | xml
mode = "xml"
file_name_prefix = "response_"
file_name_postfix = ".xml"

# External diff viewer, launched with the processed files in server order
[diff-viewer]
command = "meld"
args = []

# Request definitions, selected by case-id on the command line
[[request]]
case-id = "smoke"

[[request]]
case-id = "search"
parameter = { q = "hello", limit = 10 }
header = { "X-Trace" = "1" }
"#
    .to_string()
}

/// Write the template to `config_path` unless a file already exists there.
///
/// Returns whether a file was generated.
pub fn ensure_config_file_exists(config_path: &str, force_generate: bool) -> Result<bool> {
    use std::fs;
    use std::path::Path;

    let path = Path::new(config_path);
    if path.exists() || !force_generate {
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(QueryDiffError::Io)?;
    }
    fs::write(path, generate_default_config_template()).map_err(QueryDiffError::Io)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MODE_XML};
    use tempfile::TempDir;

    #[test]
    fn test_template_is_valid_config() {
        let config: Config = toml::from_str(&generate_default_config_template()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.post_process.mode, MODE_XML);
        assert!(config.get_request("smoke").is_ok());
    }

    #[test]
    fn test_ensure_config_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kamoshika.toml");
        let path_str = path.to_string_lossy().to_string();

        assert!(!ensure_config_file_exists(&path_str, false).unwrap());
        assert!(!path.exists());

        assert!(ensure_config_file_exists(&path_str, true).unwrap());
        assert!(path.exists());

        // existing files are never overwritten
        std::fs::write(&path, "server = []").unwrap();
        assert!(!ensure_config_file_exists(&path_str, true).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "server = []");
    }
}
