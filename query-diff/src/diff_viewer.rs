use crate::config::DiffViewerConfig;
use crate::error::{QueryDiffError, Result};
use crate::traits::DiffViewer;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Launches an external program with the files as positional arguments
#[derive(Debug, Clone)]
pub struct CommandDiffViewer {
    command: String,
    args: Vec<String>,
}

impl CommandDiffViewer {
    pub fn new<S: Into<String>>(command: S, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &DiffViewerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    /// Configured arguments followed by `paths`, order untouched
    pub fn arguments(&self, paths: &[PathBuf]) -> Vec<OsString> {
        self.args
            .iter()
            .map(OsString::from)
            .chain(paths.iter().map(|path| path.as_os_str().to_os_string()))
            .collect()
    }
}

impl DiffViewer for CommandDiffViewer {
    fn command(&self) -> &str {
        &self.command
    }

    /// Spawn the viewer and return without waiting for it
    fn invoke(&self, paths: &[PathBuf]) -> Result<()> {
        Command::new(&self.command)
            .args(self.arguments(paths))
            .stdin(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|e| QueryDiffError::diff_invocation(&self.command, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_keep_order() {
        let viewer = CommandDiffViewer::new("meld", vec!["--newtab".to_string()]);
        let paths = vec![
            PathBuf::from("out/resp_2f.xml"),
            PathBuf::from("out/resp_1f.xml"),
            PathBuf::from("out/resp_3.xml"),
        ];

        assert_eq!(
            viewer.arguments(&paths),
            vec![
                OsString::from("--newtab"),
                OsString::from("out/resp_2f.xml"),
                OsString::from("out/resp_1f.xml"),
                OsString::from("out/resp_3.xml"),
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = DiffViewerConfig {
            command: "vimdiff".to_string(),
            args: vec!["-R".to_string()],
        };
        let viewer = CommandDiffViewer::from_config(&config);
        assert_eq!(viewer.command(), "vimdiff");
        assert_eq!(viewer.arguments(&[]), vec![OsString::from("-R")]);
    }

    #[test]
    fn test_missing_program_is_reported() {
        let viewer = CommandDiffViewer::new("kamoshika-no-such-viewer", Vec::new());
        let error = viewer.invoke(&[PathBuf::from("a")]).unwrap_err();

        assert!(matches!(error, QueryDiffError::DiffInvocation { .. }));
        assert!(error.to_string().contains("kamoshika-no-such-viewer"));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_returns_immediately() {
        let viewer = CommandDiffViewer::new("true", Vec::new());
        assert!(viewer.invoke(&[PathBuf::from("a"), PathBuf::from("b")]).is_ok());
    }
}
