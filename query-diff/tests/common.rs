//! Shared helpers for query-diff integration tests

#![allow(dead_code)]

use query_diff::{Config, DiffViewer, QueryDiffError, Result};
use std::path::PathBuf;
use std::sync::Mutex;

/// Build a config for `servers` with the given post process settings
pub fn create_test_config(servers: &[String], mode: &str, prefix: &str, postfix: &str) -> Config {
    let server_list = servers
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ");

    let content = format!(
        r#"server = [{servers}]

[query]
method = "POST"
timeout_seconds = 5

[post-query-filters]
mode = "{mode}"
file_name_prefix = "{prefix}"
file_name_postfix = "{postfix}"

[[request]]
case-id = "smoke"

[[request]]
case-id = "search"
parameter = {{ q = "hello", limit = 10 }}
header = {{ "X-Trace" = "1" }}
"#,
        servers = server_list,
        mode = mode,
        prefix = prefix,
        postfix = postfix,
    );

    toml::from_str(&content).expect("test config must parse")
}

/// Diff viewer that records every invocation instead of launching anything
#[derive(Default)]
pub struct RecordingViewer {
    pub fail: bool,
    calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl RecordingViewer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }
}

impl DiffViewer for RecordingViewer {
    fn command(&self) -> &str {
        "recording-viewer"
    }

    fn invoke(&self, paths: &[PathBuf]) -> Result<()> {
        self.calls.lock().unwrap().push(paths.to_vec());
        if self.fail {
            return Err(QueryDiffError::diff_invocation("recording-viewer", "launch refused"));
        }
        Ok(())
    }
}

/// An address nothing listens on
pub const UNREACHABLE_SERVER: &str = "http://127.0.0.1:9/";

pub fn xml_body(server: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><response><server>{}</server><items><item id=\"1\"/><item id=\"2\"/></items></response>",
        server
    )
}
