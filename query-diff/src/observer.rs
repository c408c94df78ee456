//! Observability handle passed explicitly into every pipeline component.
//!
//! Pipeline components never log directly; they report [`RunEvent`]s to the
//! [`Observer`] they were given. [`LogObserver`] forwards events to the
//! `log` facade, tests can record them instead. Only config loading and the
//! HTTP client emit their own `debug!` traces.

use crate::pipeline::PipelineState;
use log::{debug, error, info, warn};
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// Pipeline stage that owns a per-item event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Query,
    PostProcess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::PostProcess => write!(f, "post process"),
        }
    }
}

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    ItemStarted {
        stage: Stage,
        index: usize,
        total: usize,
    },
    ItemFinished {
        stage: Stage,
        index: usize,
        total: usize,
        path: PathBuf,
    },
    ItemFailed {
        stage: Stage,
        index: usize,
        total: usize,
        message: String,
    },
    /// Encoding detection was inconclusive and fell back to a default
    EncodingFallback {
        path: PathBuf,
        encoding: &'static str,
        reason: String,
    },
    EncodingDetected {
        path: PathBuf,
        encoding: &'static str,
    },
    DiffLaunched {
        command: String,
        files: usize,
    },
    DiffFailed {
        message: String,
    },
}

/// Receives run events
pub trait Observer: Send + Sync {
    fn notify(&self, event: &RunEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&self, event: &RunEvent) {
        match event {
            RunEvent::StateChanged { from, to } => debug!("pipeline state: {:?} -> {:?}", from, to),
            RunEvent::ItemStarted { stage, index, total } => info!("start {} {}/{}", stage, index, total),
            RunEvent::ItemFinished {
                stage,
                index,
                total,
                path,
            } => info!("end {} {}/{} ({})", stage, index, total, path.display()),
            RunEvent::ItemFailed {
                stage: Stage::PostProcess,
                index,
                total,
                message,
            } => warn!("post process {}/{} fell back to raw capture: {}", index, total, message),
            RunEvent::ItemFailed {
                stage: Stage::Query,
                index,
                total,
                message,
            } => error!("query {}/{} failed: {}", index, total, message),
            RunEvent::EncodingFallback {
                path,
                encoding,
                reason,
            } => warn!(
                "could not detect encoding of {} ({}), assuming {}",
                path.display(),
                reason,
                encoding
            ),
            RunEvent::EncodingDetected { path, encoding } => {
                debug!("encoding of {}: {}", path.display(), encoding)
            }
            RunEvent::DiffLaunched { command, files } => {
                info!("launched diff viewer '{}' with {} files", command, files)
            }
            RunEvent::DiffFailed { message } => error!("diff viewer failed: {}", message),
        }
    }
}

/// Keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// States entered by the pipeline, in order
    pub fn states(&self) -> Vec<PipelineState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::StateChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn notify(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.notify(&RunEvent::StateChanged {
            from: PipelineState::Idle,
            to: PipelineState::Fetching,
        });
        observer.notify(&RunEvent::ItemStarted {
            stage: Stage::Query,
            index: 1,
            total: 2,
        });
        observer.notify(&RunEvent::StateChanged {
            from: PipelineState::Fetching,
            to: PipelineState::Failed,
        });

        assert_eq!(observer.events().len(), 3);
        assert_eq!(
            observer.states(),
            vec![PipelineState::Fetching, PipelineState::Failed]
        );
    }

    #[test]
    fn test_log_observer_accepts_every_event() {
        let observer = LogObserver;
        observer.notify(&RunEvent::ItemFailed {
            stage: Stage::PostProcess,
            index: 1,
            total: 1,
            message: "bad xml".to_string(),
        });
        observer.notify(&RunEvent::DiffFailed {
            message: "not found".to_string(),
        });
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Query.to_string(), "query");
        assert_eq!(Stage::PostProcess.to_string(), "post process");
    }
}
