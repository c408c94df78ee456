use query_diff::QueryDiffError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query diff error: {0}")]
    QueryDiff(#[from] QueryDiffError),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("{0}")]
    Other(String),

    #[error("{0}: {1}")]
    WithContext(String, Box<CliError>),
}

impl CliError {
    pub fn with_context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext(context.into(), Box::new(self))
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Io(err) => format!("I/O operation failed: {err}"),
            Self::QueryDiff(err) => query_diff_message(err),
            Self::Logger(err) => format!("Failed to initialize logging: {err}"),
            Self::Other(msg) => msg.clone(),
            Self::WithContext(ctx, err) => format!("{ctx}: {}", err.user_message()),
        }
    }
}

fn query_diff_message(err: &QueryDiffError) -> String {
    match err {
        QueryDiffError::ConfigNotFound { path } => {
            format!(
                "Configuration file not found: {} (run with --init to create one)",
                path.display()
            )
        }
        QueryDiffError::ConfigLookup { case_id, available } => {
            format!("Unknown case id '{case_id}'. Available case ids: {available}")
        }
        other => other.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

pub trait ResultExt<T, E> {
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<CliError>,
{
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| {
            let cli_err: CliError = err.into();
            cli_err.with_context(context())
        })
    }
}
