use crate::config::{Config, PostProcessConfig, Request};
use crate::encoding::EncodingDetector;
use crate::error::Result;
use crate::normalize::NormalizerRegistry;
use crate::observer::{Observer, RunEvent};
use crate::persist::FilePersister;
use crate::post_process::PostProcessOrchestrator;
use crate::query::QueryOrchestrator;
use crate::traits::{DiffViewer, ResponseFetcher};
use crate::types::{ItemFailure, ProcessedFile, SavedFile};
use std::path::PathBuf;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    Fetching,
    Persisted,
    PostProcessing,
    Processed,
    Diffing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Fetching, Persisted)
                | (Fetching, Failed)
                | (Persisted, PostProcessing)
                | (PostProcessing, Processed)
                | (PostProcessing, Failed)
                | (Processed, Diffing)
                | (Processed, Done)
                | (Diffing, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub case_id: String,
    pub state: PipelineState,
    /// Raw captures, in server order
    pub saved: Vec<SavedFile>,
    /// Files handed to the diff viewer, in server order
    pub processed: Vec<ProcessedFile>,
    /// Files whose post process fell back to the raw capture
    pub failures: Vec<ItemFailure>,
    pub diff_launched: bool,
    pub diff_error: Option<String>,
}

impl PipelineReport {
    /// Completed, but some item or the diff viewer failed
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty() || self.diff_error.is_some()
    }

    pub fn processed_paths(&self) -> Vec<PathBuf> {
        self.processed.iter().map(|file| file.path.clone()).collect()
    }
}

/// Sequences fetch + persist, post process and diff for one case
pub struct Pipeline<'a, F: ResponseFetcher> {
    fetcher: &'a F,
    viewer: Option<&'a dyn DiffViewer>,
    registry: NormalizerRegistry,
    detector: EncodingDetector,
    persister: FilePersister,
    observer: &'a dyn Observer,
    fail_on_error_status: bool,
    state: PipelineState,
}

impl<'a, F: ResponseFetcher> Pipeline<'a, F> {
    pub fn new(fetcher: &'a F, persister: FilePersister, observer: &'a dyn Observer) -> Self {
        Self {
            fetcher,
            viewer: None,
            registry: NormalizerRegistry::with_defaults(),
            detector: EncodingDetector::new(),
            persister,
            observer,
            fail_on_error_status: false,
            state: PipelineState::Idle,
        }
    }

    /// Launch `viewer` once the files are processed; without one the run
    /// ends after post processing
    pub fn with_viewer(mut self, viewer: &'a dyn DiffViewer) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn with_fail_on_error_status(mut self, fail_on_error_status: bool) -> Self {
        self.fail_on_error_status = fail_on_error_status;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Look up `case_id` in `config` and run it against the configured servers.
    ///
    /// An unknown case id is reported before anything is written.
    pub async fn run_case(&mut self, config: &Config, case_id: &str) -> Result<PipelineReport> {
        let request = config.get_request(case_id)?;
        self.run(config.server_list(), request, config.post_process_config())
            .await
    }

    pub async fn run(
        &mut self,
        servers: &[String],
        request: &Request,
        post_process: &PostProcessConfig,
    ) -> Result<PipelineReport> {
        self.state = PipelineState::Idle;

        self.transition(PipelineState::Fetching);
        let fetched = self.fetch_all(servers, request, post_process).await;
        let saved = match fetched {
            Ok(saved) => saved,
            Err(e) => {
                self.transition(PipelineState::Failed);
                return Err(e);
            }
        };
        self.transition(PipelineState::Persisted);

        self.transition(PipelineState::PostProcessing);
        let processed = PostProcessOrchestrator::new(
            &self.registry,
            &self.detector,
            &self.persister,
            self.observer,
        )
        .run(&saved, post_process);
        let outcome = match processed {
            Ok(outcome) => outcome,
            Err(e) => {
                self.transition(PipelineState::Failed);
                return Err(e);
            }
        };
        self.transition(PipelineState::Processed);

        let mut report = PipelineReport {
            case_id: request.case_id.clone(),
            state: self.state,
            saved,
            processed: outcome.files,
            failures: outcome.failures,
            diff_launched: false,
            diff_error: None,
        };

        if let Some(viewer) = self.viewer.filter(|_| !report.processed.is_empty()) {
            self.transition(PipelineState::Diffing);
            let paths = report.processed_paths();
            match viewer.invoke(&paths) {
                Ok(()) => {
                    report.diff_launched = true;
                    self.observer.notify(&RunEvent::DiffLaunched {
                        command: viewer.command().to_string(),
                        files: paths.len(),
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    self.observer.notify(&RunEvent::DiffFailed {
                        message: message.clone(),
                    });
                    report.diff_error = Some(message);
                }
            }
        }

        self.transition(PipelineState::Done);
        report.state = self.state;
        Ok(report)
    }

    async fn fetch_all(
        &self,
        servers: &[String],
        request: &Request,
        post_process: &PostProcessConfig,
    ) -> Result<Vec<SavedFile>> {
        self.persister.ensure_structure()?;
        QueryOrchestrator::new(
            self.fetcher,
            &self.persister,
            post_process.naming(),
            self.observer,
        )
        .with_fail_on_error_status(self.fail_on_error_status)
        .run(servers, request)
        .await
    }

    fn transition(&mut self, to: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "invalid pipeline transition {:?} -> {:?}",
            self.state,
            to
        );
        self.observer.notify(&RunEvent::StateChanged {
            from: self.state,
            to,
        });
        self.state = to;
    }
}
