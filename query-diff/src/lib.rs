//! Query Diff - send one request to several servers and compare the answers
//!
//! This crate fans a single request definition out to an ordered list of
//! servers, saves every response body under a deterministic name, optionally
//! normalizes the captures (XML pretty-printing with encoding detection) and
//! hands the resulting files to an external diff viewer.

// Core modules
pub mod config;
pub mod error;
pub mod types;
pub mod traits;
pub mod observer;

// Leaf components
pub mod http;
pub mod persist;
pub mod encoding;
pub mod normalize;
pub mod diff_viewer;

// Orchestration
pub mod query;
pub mod post_process;
pub mod pipeline;

// Re-export main types for convenience
pub use config::{Config, PostProcessConfig, QueryConfig, Request};
pub use diff_viewer::CommandDiffViewer;
pub use encoding::{DetectedEncoding, DetectionSource, EncodingDetector};
pub use error::{QueryDiffError, Result};
pub use http::HttpFetcher;
pub use normalize::{IdentityNormalizer, NormalizerRegistry, XmlNormalizer};
pub use observer::{LogObserver, Observer, RecordingObserver, RunEvent, Stage};
pub use persist::{FileNaming, FilePersister};
pub use pipeline::{Pipeline, PipelineReport, PipelineState};
pub use post_process::{PostProcessOrchestrator, PostProcessOutcome};
pub use query::QueryOrchestrator;
pub use traits::{DiffViewer, NormalizeContext, Normalizer, ResponseFetcher};
pub use types::{HttpResponse, ItemFailure, ProcessedFile, ResponseRecord, SavedFile};

/// Run `case_id` from `config` over HTTP, writing into `out_dir`.
///
/// The diff viewer from the config is launched unless `launch_viewer` is
/// false. Events are reported to `observer`.
pub async fn run_query_diff<P: AsRef<std::path::Path>>(
    config: &Config,
    case_id: &str,
    out_dir: P,
    launch_viewer: bool,
    observer: &dyn Observer,
) -> Result<PipelineReport> {
    let fetcher = HttpFetcher::new(config.query_config())?;
    let viewer = CommandDiffViewer::from_config(config.diff_viewer_config());

    let mut pipeline = Pipeline::new(&fetcher, FilePersister::new(out_dir), observer)
        .with_fail_on_error_status(config.query_config().fail_on_error_status);
    if launch_viewer {
        pipeline = pipeline.with_viewer(&viewer);
    }

    pipeline.run_case(config, case_id).await
}
