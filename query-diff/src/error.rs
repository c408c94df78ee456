use thiserror::Error;
use std::path::PathBuf;

/// Result type alias for query-diff operations
pub type Result<T> = std::result::Result<T, QueryDiffError>;

/// Error types for the query / post-process / diff pipeline
#[derive(Debug, Error)]
pub enum QueryDiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Request '{case_id}' not found. Available case ids: {available}")]
    ConfigLookup {
        case_id: String,
        available: String,
    },

    #[error("Query {index}/{total} to {server} failed: {message}")]
    Transport {
        index: usize,
        total: usize,
        server: String,
        message: String,
    },

    #[error("Post process of file {index} ({}) failed: {message}", path.display())]
    MalformedInput {
        index: usize,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch diff viewer '{command}': {message}")]
    DiffInvocation { command: String, message: String },
}

impl QueryDiffError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new transport error for the server at `index` (1-based)
    pub fn transport<S: Into<String>, M: Into<String>>(
        index: usize,
        total: usize,
        server: S,
        message: M,
    ) -> Self {
        Self::Transport {
            index,
            total,
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new malformed input error for the file at `index` (1-based)
    pub fn malformed_input<P: Into<PathBuf>, S: Into<String>>(
        index: usize,
        path: P,
        message: S,
    ) -> Self {
        Self::MalformedInput {
            index,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new persist error
    pub fn persist<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    /// Create a new diff invocation error
    pub fn diff_invocation<S: Into<String>, M: Into<String>>(command: S, message: M) -> Self {
        Self::DiffInvocation {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole run.
    ///
    /// Normalization failures (including a capture that can no longer be
    /// read back) and diff viewer failures are reported per item and leave
    /// the run in a degraded but completed state.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::MalformedInput { .. } | Self::DiffInvocation { .. } | Self::Io(_)
        )
    }
}
