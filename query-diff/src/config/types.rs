use crate::error::{QueryDiffError, Result};
use crate::persist::FileNaming;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Post-process mode that leaves captured files untouched
pub const MODE_DISABLED: &str = "disabled";
/// Post-process mode that pretty-prints XML responses
pub const MODE_XML: &str = "xml";

/// Main configuration structure, loaded from kamoshika.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Servers queried in order; the Nth server owns file index N
    #[serde(rename = "server")]
    pub servers: Vec<String>,
    /// Query execution settings
    #[serde(default)]
    pub query: QueryConfig,
    /// Post-process settings applied to captured responses
    #[serde(default, rename = "post-query-filters")]
    pub post_process: PostProcessConfig,
    /// External diff viewer
    #[serde(default, rename = "diff-viewer")]
    pub diff_viewer: DiffViewerConfig,
    /// Request definitions keyed by case id
    #[serde(default, rename = "request")]
    pub requests: Vec<Request>,
}

/// A single request definition
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Request {
    /// Key selecting this request on the command line
    #[serde(rename = "case-id")]
    pub case_id: String,
    /// Payload sent to every server
    #[serde(default)]
    pub parameter: toml::Table,
    /// Request-specific headers
    pub header: Option<BTreeMap<String, String>>,
}

impl Request {
    /// Create a request with no parameters and no headers
    pub fn new<S: Into<String>>(case_id: S) -> Self {
        Self {
            case_id: case_id.into(),
            parameter: toml::Table::new(),
            header: None,
        }
    }
}

/// How the request parameter payload is put on the wire
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// application/x-www-form-urlencoded body
    #[default]
    Form,
    /// JSON body
    Json,
    /// URL query string
    Query,
}

/// Query execution settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// HTTP method used for every server
    pub method: String,
    /// Parameter encoding; GET always uses the query string
    pub body: BodyEncoding,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Whether to follow redirects
    pub follow_redirects: bool,
    /// Treat non-2xx responses as transport failures
    pub fail_on_error_status: bool,
    /// Headers sent with every request; request headers take precedence
    pub headers: BTreeMap<String, String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            method: "POST".to_string(),
            body: BodyEncoding::Form,
            timeout_seconds: 30,
            follow_redirects: true,
            fail_on_error_status: false,
            headers: BTreeMap::new(),
        }
    }
}

/// Post-process settings: normalization mode and file naming template
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PostProcessConfig {
    /// Format tag selecting the normalizer (`disabled`, `xml`, ...)
    #[serde(alias = "post_process")]
    pub mode: String,
    /// Prefix of every file written to the output directory
    pub file_name_prefix: String,
    /// Postfix (usually the extension) of every file written
    pub file_name_postfix: String,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            mode: MODE_DISABLED.to_string(),
            file_name_prefix: "response_".to_string(),
            file_name_postfix: ".txt".to_string(),
        }
    }
}

impl PostProcessConfig {
    /// Create a config for `mode` with the given naming template
    pub fn new<M, P, S>(mode: M, prefix: P, postfix: S) -> Self
    where
        M: Into<String>,
        P: Into<String>,
        S: Into<String>,
    {
        Self {
            mode: mode.into(),
            file_name_prefix: prefix.into(),
            file_name_postfix: postfix.into(),
        }
    }

    /// File naming template shared by raw captures and processed files
    pub fn naming(&self) -> FileNaming {
        FileNaming::new(&self.file_name_prefix, &self.file_name_postfix)
    }
}

/// External diff viewer settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiffViewerConfig {
    /// Program to launch
    pub command: String,
    /// Extra arguments placed before the file paths
    pub args: Vec<String>,
}

impl Default for DiffViewerConfig {
    fn default() -> Self {
        Self {
            command: "meld".to_string(),
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Find the request for `case_id`
    pub fn get_request(&self, case_id: &str) -> Result<&Request> {
        self.requests
            .iter()
            .find(|request| request.case_id == case_id)
            .ok_or_else(|| {
                let available = self
                    .requests
                    .iter()
                    .map(|request| request.case_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                QueryDiffError::ConfigLookup {
                    case_id: case_id.to_string(),
                    available: if available.is_empty() {
                        "none".to_string()
                    } else {
                        available
                    },
                }
            })
    }

    /// Ordered server list
    pub fn server_list(&self) -> &[String] {
        &self.servers
    }

    pub fn post_process_config(&self) -> &PostProcessConfig {
        &self.post_process
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query
    }

    pub fn diff_viewer_config(&self) -> &DiffViewerConfig {
        &self.diff_viewer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
server = ["http://a.example/api", "http://b.example/api"]

[post-query-filters]
post_process = "xml"
file_name_prefix = "resp_"
file_name_postfix = ".out"

[[request]]
case-id = "smoke"

[[request]]
case-id = "search"
parameter = { q = "hello", limit = 10 }
header = { "X-Trace" = "1" }
"#;

    #[test]
    fn test_parse_sample_config() {
        let config: Config = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.server_list(), ["http://a.example/api", "http://b.example/api"]);
        assert_eq!(config.post_process_config().mode, MODE_XML);
        assert_eq!(config.post_process_config().file_name_prefix, "resp_");
        assert_eq!(config.query_config().method, "POST");
        assert_eq!(config.query_config().timeout_seconds, 30);
        assert_eq!(config.diff_viewer_config().command, "meld");
    }

    #[test]
    fn test_get_request_by_case_id() {
        let config: Config = toml::from_str(SAMPLE).unwrap();

        let smoke = config.get_request("smoke").unwrap();
        assert!(smoke.parameter.is_empty());
        assert!(smoke.header.is_none());

        let search = config.get_request("search").unwrap();
        assert_eq!(search.parameter.get("q").and_then(|v| v.as_str()), Some("hello"));
        assert_eq!(search.header.as_ref().unwrap().get("X-Trace"), Some(&"1".to_string()));
    }

    #[test]
    fn test_get_request_not_found() {
        let config: Config = toml::from_str(SAMPLE).unwrap();

        match config.get_request("missing") {
            Err(QueryDiffError::ConfigLookup { case_id, available }) => {
                assert_eq!(case_id, "missing");
                assert_eq!(available, "smoke, search");
            }
            other => panic!("expected ConfigLookup, got {:?}", other),
        }
    }

    #[test]
    fn test_post_process_defaults() {
        let config: Config = toml::from_str("server = [\"http://a\"]").unwrap();
        let post = config.post_process_config();

        assert_eq!(post.mode, MODE_DISABLED);
        assert_eq!(post.naming().raw_file_name(1), "response_1.txt");
    }
}
